//! Router tests driven through `tower::ServiceExt::oneshot`

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ricegrain_app::config::{AppConfig, ModelSource};
use ricegrain_app::server::build_app;
use ricegrain_app::state::AppState;
use ricegrain_classifiers::synthetic::{self, SyntheticConfig};
use ricegrain_classifiers::{FallbackPolicy, ModelArtifact};
use ricegrain_core::Error;
use ricegrain_policy::PolicyKind;
use serde_json::{json, Value};
use tower::ServiceExt;

fn mock_config(policy: PolicyKind) -> AppConfig {
    let mut config = AppConfig::default();
    config.model.source = ModelSource::Mock;
    config.decision.policy = policy;
    config
}

fn app_with(config: AppConfig) -> (Router, AppState) {
    let state = AppState::new(config).unwrap();
    (build_app(state.clone()), state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn post_json(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn default_named_input() -> Value {
    json!({
        "Area": 12000.0,
        "Perimeter": 400.0,
        "MajorAxisLength": 200.0,
        "MinorAxisLength": 100.0,
        "Eccentricity": 0.8,
        "ConvexArea": 12500.0,
        "Extent": 0.75
    })
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let (status, body) = get(app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_predict_named_columns_with_mock() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let (status, body) = post_json(app, "/api/predict", default_named_input().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "Cammeo");
    assert_eq!(body["predicted_class"], "Cammeo");
    assert_eq!(body["message"], "The predicted rice type is: **Cammeo**");
    assert_eq!(body["probabilities"]["Cammeo"], 0.7);
    assert_eq!(body["probabilities"]["Osmancik"], 0.3);
    assert_eq!(body["origin"]["type"], "mock");
    assert_eq!(body["degraded"], false);
    assert_eq!(body["chart"]["y_range"], json!([0.0, 1.0]));
    assert!(body["chart_html"].as_str().unwrap().contains("probability-chart"));
}

#[tokio::test]
async fn test_predict_raw_features_with_mock() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let input = json!({ "features": [13000.0, 400.0, 200.0, 100.0, 0.8, 12500.0, 0.75] });
    let (status, body) = post_json(app, "/api/predict", input.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "Osmancik");
    assert_eq!(body["probabilities"]["Osmancik"], 0.8);
}

#[tokio::test]
async fn test_default_config_with_mock_is_cammeo() {
    let mut config = AppConfig::default();
    config.model.source = ModelSource::Mock;
    let (app, _) = app_with(config);

    let (status, body) = post_json(app.clone(), "/api/predict", default_named_input().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "Cammeo");
    assert_eq!(body["probabilities"]["Cammeo"], 0.7);

    let mut input = default_named_input();
    input["Area"] = json!(13000.0);
    let (status, body) = post_json(app, "/api/predict", input.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "Osmancik");
}

#[tokio::test]
async fn test_threshold_policy_reports_uncertain() {
    let (app, _) = app_with(mock_config(PolicyKind::Threshold));
    let (status, body) = post_json(app, "/api/predict", default_named_input().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "Uncertain");
    assert_eq!(body["predicted_class"], "Cammeo");
    assert_eq!(body["message"], "The predicted rice type is: **Uncertain**");
}

#[tokio::test]
async fn test_wrong_feature_count_is_bad_request() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let input = json!({ "features": [12000.0, 400.0, 200.0, 100.0, 0.8, 12500.0] });
    let (status, body) = post_json(app, "/api/predict", input.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_input");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let (status, body) = post_json(app, "/api/predict", "{\"Area\": ".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_input");
}

#[tokio::test]
async fn test_negative_measurement_is_bad_request() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let mut input = default_named_input();
    input["Perimeter"] = json!(-1.0);
    let (status, _) = post_json(app, "/api/predict", input.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unit_range_clamped_by_default() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let mut input = default_named_input();
    input["Eccentricity"] = json!(1.5);
    let (status, body) = post_json(app, "/api/predict", input.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"]["Eccentricity"], 1.0);
}

#[tokio::test]
async fn test_unit_range_rejected_without_clamping() {
    let mut config = mock_config(PolicyKind::Argmax);
    config.input.clamp_unit_range = false;
    let (app, _) = app_with(config);

    let mut input = default_named_input();
    input["Extent"] = json!(1.2);
    let (status, body) = post_json(app, "/api/predict", input.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("Extent"));
}

#[tokio::test]
async fn test_config_reports_model_and_policy() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let (status, body) = get(app, "/api/config").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision"]["policy"], "argmax");
    assert_eq!(body["decision"]["threshold"], Value::Null);
    assert_eq!(body["model"]["source"], "mock");
    assert_eq!(body["model"]["classifier"], "mock_area_threshold");
    assert_eq!(body["model"]["degraded"], false);
    assert!(!body["about"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_defaults_endpoint() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let (status, body) = get(app, "/api/defaults").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"]["Area"], 12000.0);
    assert_eq!(body["features"]["Extent"], 0.75);
    assert_eq!(body["fields"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_stats_count_decisions_and_errors() {
    let (app, state) = app_with(mock_config(PolicyKind::Argmax));

    post_json(app.clone(), "/api/predict", default_named_input().to_string()).await;
    post_json(app.clone(), "/api/predict", "not json".to_string()).await;

    let (status, body) = get(app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predictions"], 1);
    assert_eq!(body["labels"]["Cammeo"], 1);
    assert_eq!(body["prediction_errors"], 1);
    assert_eq!(state.metrics.snapshot().predictions, 1);
}

#[tokio::test]
async fn test_prometheus_endpoint_without_exporter() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_index_page_served() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("Rice Type Classification"));
}

async fn preflight(app: Router, origin: &str) -> Option<String> {
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/predict")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .map(|value| value.to_str().unwrap().to_string())
}

#[tokio::test]
async fn test_cors_follows_configured_port() {
    let mut config = mock_config(PolicyKind::Argmax);
    config.server.port = 8080;
    let (app, _) = app_with(config);

    assert_eq!(
        preflight(app.clone(), "http://127.0.0.1:8080").await.as_deref(),
        Some("http://127.0.0.1:8080")
    );
    assert_eq!(
        preflight(app.clone(), "http://localhost:8080").await.as_deref(),
        Some("http://localhost:8080")
    );
    assert_eq!(preflight(app.clone(), "http://127.0.0.1:3000").await, None);
    assert_eq!(preflight(app, "http://evil.example:8080").await, None);
}

#[tokio::test]
async fn test_unknown_asset_is_not_found() {
    let (app, _) = app_with(mock_config(PolicyKind::Argmax));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/missing.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(Request::builder().uri("/classify").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html"
    );
}

#[tokio::test]
async fn test_permissive_fallback_is_flagged_degraded() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.model.path = dir.path().join("missing.json");
    config.model.fallback = FallbackPolicy::Permissive;
    config.model.synthetic = SyntheticConfig {
        n_estimators: 10,
        seed: Some(42),
        ..Default::default()
    };
    let (app, _) = app_with(config);

    let (status, body) = get(app.clone(), "/api/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"]["degraded"], true);
    assert_eq!(body["model"]["origin"]["type"], "synthetic");

    let (status, body) = post_json(app, "/api/predict", default_named_input().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degraded"], true);
    let p0 = body["probabilities"]["Cammeo"].as_f64().unwrap();
    let p1 = body["probabilities"]["Osmancik"].as_f64().unwrap();
    assert!((p0 + p1 - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_strict_fallback_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.model.path = dir.path().join("missing.json");
    config.model.fallback = FallbackPolicy::Strict;

    match AppState::new(config) {
        Err(Error::ModelLoad(_)) => {}
        Err(other) => panic!("Expected model load error, got {:?}", other),
        Ok(_) => panic!("Expected strict startup to fail"),
    }
}

#[tokio::test]
async fn test_exported_artifact_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let forest = synthetic::synthesize(&SyntheticConfig {
        n_estimators: 10,
        seed: Some(7),
        ..Default::default()
    })
    .unwrap();
    ModelArtifact::random_forest(forest).save(&path).unwrap();

    let mut config = AppConfig::default();
    config.model.path = path;
    config.model.fallback = FallbackPolicy::Strict;
    let (app, _) = app_with(config);

    let (status, body) = get(app.clone(), "/api/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"]["origin"]["type"], "artifact");
    assert_eq!(body["model"]["classifier"], "random_forest");

    let (status, body) = post_json(app, "/api/predict", default_named_input().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let label = body["label"].as_str().unwrap();
    assert!(["Cammeo", "Osmancik", "Uncertain"].contains(&label));
}
