//! Model provider tests
//!
//! Uses an instrumented artifact store to verify memoization and the
//! fallback policies without touching real model files.

use parking_lot::Mutex;
use ricegrain_classifiers::{
    ArtifactStore, Classifier, FallbackPolicy, ForestParams, ModelArtifact, ModelOrigin,
    ModelProvider, RandomForest, SyntheticConfig,
};
use ricegrain_core::{Error, FeatureVector, Result, RiceClass, FEATURE_COUNT};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Artifact store that counts reads and serves configurable bytes
struct CountingStore {
    contents: Mutex<Option<Vec<u8>>>,
    reads: AtomicU32,
}

impl CountingStore {
    fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            contents: Mutex::new(Some(bytes)),
            reads: AtomicU32::new(0),
        }
    }

    fn missing() -> Self {
        Self {
            contents: Mutex::new(None),
            reads: AtomicU32::new(0),
        }
    }

    fn set_bytes(&self, bytes: Vec<u8>) {
        *self.contents.lock() = Some(bytes);
    }

    fn reads(&self) -> u32 {
        self.reads.load(Ordering::Relaxed)
    }
}

impl ArtifactStore for CountingStore {
    fn read(&self) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.contents
            .lock()
            .clone()
            .ok_or_else(|| Error::model_load("artifact missing"))
    }

    fn location(&self) -> String {
        "memory://counting".to_string()
    }
}

fn trained_artifact_bytes() -> Vec<u8> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for i in 0..30 {
        let small = 10_000.0 + i as f64 * 40.0;
        let large = 14_000.0 + i as f64 * 40.0;
        x.push([small, 420.0, 180.0, 90.0, 0.85, small + 300.0, 0.6]);
        y.push(1);
        x.push([large, 480.0, 210.0, 95.0, 0.88, large + 300.0, 0.6]);
        y.push(0);
    }
    let params = ForestParams {
        n_estimators: 12,
        max_features: Some(FEATURE_COUNT),
        random_state: Some(11),
        ..Default::default()
    };
    let forest = RandomForest::fit(&x, &y, &params).unwrap();
    ModelArtifact::random_forest(forest)
        .to_json()
        .unwrap()
        .into_bytes()
}

fn small_synthetic() -> SyntheticConfig {
    SyntheticConfig {
        n_estimators: 8,
        seed: Some(42),
        ..Default::default()
    }
}

#[test]
fn test_load_is_memoized() {
    let store = Arc::new(CountingStore::with_bytes(trained_artifact_bytes()));
    let provider = ModelProvider::from_store(store.clone(), FallbackPolicy::Strict);

    let first = provider.load().unwrap();
    let second = provider.load().unwrap();

    assert_eq!(store.reads(), 1);
    assert!(first.same_instance(&second));

    let features = FeatureVector::default();
    assert_eq!(
        first.classifier().predict_proba(&features).unwrap(),
        second.classifier().predict_proba(&features).unwrap()
    );
}

#[test]
fn test_artifact_model_is_used() {
    let store = Arc::new(CountingStore::with_bytes(trained_artifact_bytes()));
    let provider = ModelProvider::from_store(store, FallbackPolicy::Strict);

    let model = provider.load().unwrap();
    assert!(matches!(model.origin(), ModelOrigin::Artifact { .. }));
    assert_eq!(model.classifier().name(), "random_forest");

    // Learned rule: small grains are Osmancik, large grains Cammeo
    let small = FeatureVector::from_array([10_100.0, 420.0, 180.0, 90.0, 0.85, 10_400.0, 0.6]);
    let large = FeatureVector::from_array([14_600.0, 480.0, 210.0, 95.0, 0.88, 14_900.0, 0.6]);
    assert_eq!(model.classifier().predict(&small).unwrap(), RiceClass::Osmancik);
    assert_eq!(model.classifier().predict(&large).unwrap(), RiceClass::Cammeo);
}

#[test]
fn test_permissive_fallback_on_missing_artifact() {
    let store = Arc::new(CountingStore::missing());
    let provider = ModelProvider::from_store(store.clone(), FallbackPolicy::Permissive)
        .with_synthetic(small_synthetic());

    let model = provider.load().unwrap();
    assert!(model.origin().is_degraded());

    let features = FeatureVector::default();
    let class = model.classifier().predict(&features).unwrap();
    let proba = model.classifier().predict_proba(&features).unwrap();
    assert!(proba.get(class) >= 0.5);

    // The synthetic model is memoized too
    provider.load().unwrap();
    assert_eq!(store.reads(), 1);
}

#[test]
fn test_permissive_fallback_on_missing_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ModelProvider::from_path(dir.path().join("model.json"), FallbackPolicy::Permissive)
        .with_synthetic(small_synthetic());

    let model = provider.load().unwrap();
    assert!(matches!(model.origin(), ModelOrigin::Synthetic { .. }));
    assert!(model.classifier().classify(&FeatureVector::default()).is_ok());
}

#[test]
fn test_permissive_fallback_on_corrupt_artifact() {
    let store = Arc::new(CountingStore::with_bytes(b"not a model".to_vec()));
    let provider = ModelProvider::from_store(store, FallbackPolicy::Permissive)
        .with_synthetic(small_synthetic());

    let model = provider.load().unwrap();
    match model.origin() {
        ModelOrigin::Synthetic { reason } => assert!(reason.contains("corrupt")),
        other => panic!("Expected synthetic origin, got {:?}", other),
    }
}

#[test]
fn test_strict_policy_surfaces_load_error() {
    let store = Arc::new(CountingStore::missing());
    let provider = ModelProvider::from_store(store, FallbackPolicy::Strict);

    let err = provider.load().unwrap_err();
    assert!(matches!(err, Error::ModelLoad(_)));
    assert!(!provider.is_loaded());
}

#[test]
fn test_strict_failure_is_not_memoized() {
    let store = Arc::new(CountingStore::missing());
    let provider = ModelProvider::from_store(store.clone(), FallbackPolicy::Strict);

    assert!(provider.load().is_err());

    store.set_bytes(trained_artifact_bytes());
    let model = provider.load().unwrap();
    assert!(matches!(model.origin(), ModelOrigin::Artifact { .. }));
    assert_eq!(store.reads(), 2);
}

#[test]
fn test_artifact_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, trained_artifact_bytes()).unwrap();

    let provider = ModelProvider::from_path(&path, FallbackPolicy::Strict);
    let model = provider.load().unwrap();

    match model.origin() {
        ModelOrigin::Artifact { location } => assert!(location.ends_with("model.json")),
        other => panic!("Expected artifact origin, got {:?}", other),
    }
}
