//! Random forest classifier over the seven grain measurements.
//!
//! Trees are CART trees split on Gini impurity. Each tree is fit on a
//! bootstrap sample and considers a random subset of features at every
//! split. Leaves keep their per-class sample counts so the forest can report
//! probabilities as the mean of the leaf class distributions; the predicted
//! class is the most probable one, ties going to class 0.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ricegrain_core::{ClassProbabilities, Error, FeatureVector, Result, RiceClass, FEATURE_COUNT};
use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;

/// Number of classes every tree distinguishes
const N_CLASSES: usize = 2;

/// A node in a decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal node: samples with `x[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Leaf with the training class counts that reached it
    Leaf { counts: [usize; N_CLASSES] },
}

impl TreeNode {
    /// Leaf nodes have depth 0
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaf_distribution(&self, x: &[f64]) -> Result<[f64; N_CLASSES]> {
        let mut node = self;
        loop {
            match node {
                Self::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = x.get(*feature).ok_or_else(|| {
                        Error::prediction(format!(
                            "tree splits on feature {} but input has {} features",
                            feature,
                            x.len()
                        ))
                    })?;
                    node = if *value <= *threshold { left } else { right };
                }
                Self::Leaf { counts } => {
                    let total: usize = counts.iter().sum();
                    if total == 0 {
                        return Err(Error::prediction("reached an empty leaf"));
                    }
                    let total = total as f64;
                    return Ok([counts[0] as f64 / total, counts[1] as f64 / total]);
                }
            }
        }
    }

    fn check(&self, n_features: usize) -> std::result::Result<(), String> {
        match self {
            Self::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(format!(
                        "split on feature {} exceeds feature count {}",
                        feature, n_features
                    ));
                }
                if !threshold.is_finite() {
                    return Err(format!("split on feature {} has a non-finite threshold", feature));
                }
                left.check(n_features)?;
                right.check(n_features)
            }
            Self::Leaf { counts } => {
                if counts.iter().sum::<usize>() == 0 {
                    Err("leaf holds no samples".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Hyper-parameters for fitting a forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_estimators: usize,

    /// Maximum tree depth (`None` grows until leaves are pure)
    pub max_depth: Option<usize>,

    /// Minimum samples required to split a node
    pub min_samples_split: usize,

    /// Features considered per split (`None` uses the square root rule)
    pub max_features: Option<usize>,

    /// Seed for reproducible fits
    pub random_state: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            random_state: None,
        }
    }
}

impl ForestParams {
    fn features_per_split(&self, n_features: usize) -> usize {
        self.max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features)
    }
}

/// Bagged ensemble of decision trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<TreeNode>,
    n_features: usize,
}

impl RandomForest {
    /// Name reported by [`Classifier::name`]
    pub const NAME: &'static str = "random_forest";

    /// Build a forest from already grown trees
    pub fn from_trees(trees: Vec<TreeNode>, n_features: usize) -> Result<Self> {
        let forest = Self { trees, n_features };
        forest.validate()?;
        Ok(forest)
    }

    /// Fit a forest on rows of features and binary labels
    pub fn fit(x: &[[f64; FEATURE_COUNT]], y: &[usize], params: &ForestParams) -> Result<Self> {
        if x.is_empty() {
            return Err(Error::model_load("cannot fit a forest on zero samples"));
        }
        if x.len() != y.len() {
            return Err(Error::model_load(format!(
                "feature rows ({}) and labels ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        if let Some(label) = y.iter().find(|&&label| label >= N_CLASSES) {
            return Err(Error::model_load(format!("label {} is not binary", label)));
        }
        if x.iter().flatten().any(|v| !v.is_finite()) {
            return Err(Error::model_load("training features must be finite"));
        }
        if params.n_estimators == 0 {
            return Err(Error::model_load("a forest needs at least one tree"));
        }

        let mut rng = match params.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let builder = TreeBuilder {
            x,
            y,
            params,
            features_per_split: params.features_per_split(FEATURE_COUNT),
        };

        let n_samples = x.len();
        let trees = (0..params.n_estimators)
            .map(|_| {
                let bootstrap: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                builder.grow(bootstrap, 0, &mut rng)
            })
            .collect();

        Ok(Self {
            trees,
            n_features: FEATURE_COUNT,
        })
    }

    /// Check structural invariants of a deserialized forest
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::model_load("forest contains no trees"));
        }
        if self.n_features != FEATURE_COUNT {
            return Err(Error::model_load(format!(
                "forest expects {} features, rice grains have {}",
                self.n_features, FEATURE_COUNT
            )));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.check(self.n_features)
                .map_err(|e| Error::model_load(format!("tree {}: {}", idx, e)))?;
        }
        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    fn mean_distribution(&self, x: &[f64]) -> Result<[f64; N_CLASSES]> {
        if self.trees.is_empty() {
            return Err(Error::prediction("forest contains no trees"));
        }
        let mut sum = [0.0; N_CLASSES];
        for tree in &self.trees {
            let dist = tree.leaf_distribution(x)?;
            sum[0] += dist[0];
            sum[1] += dist[1];
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

impl Classifier for RandomForest {
    fn predict(&self, features: &FeatureVector) -> Result<RiceClass> {
        let dist = self.mean_distribution(&features.to_array())?;
        let class = if dist[1] > dist[0] { 1 } else { 0 };
        RiceClass::from_index(class)
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<ClassProbabilities> {
        let dist = self.mean_distribution(&features.to_array())?;
        ClassProbabilities::new(dist[0], dist[1])
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

struct TreeBuilder<'a> {
    x: &'a [[f64; FEATURE_COUNT]],
    y: &'a [usize],
    params: &'a ForestParams,
    features_per_split: usize,
}

impl TreeBuilder<'_> {
    fn grow(&self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> TreeNode {
        let counts = self.class_counts(&indices);

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_deep = self.params.max_depth.is_some_and(|max| depth >= max);
        if pure || too_deep || indices.len() < self.params.min_samples_split {
            return TreeNode::Leaf { counts };
        }

        let candidates =
            rand::seq::index::sample(rng, FEATURE_COUNT, self.features_per_split).into_vec();
        let Some((feature, threshold)) = self.best_split(&indices, &candidates, &counts) else {
            return TreeNode::Leaf { counts };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x[i][feature] <= threshold);
        if left.is_empty() || right.is_empty() {
            return TreeNode::Leaf { counts };
        }

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.grow(left, depth + 1, rng)),
            right: Box::new(self.grow(right, depth + 1, rng)),
        }
    }

    fn class_counts(&self, indices: &[usize]) -> [usize; N_CLASSES] {
        let mut counts = [0; N_CLASSES];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }

    /// Sweep sorted values of each candidate feature and keep the midpoint
    /// threshold with the lowest weighted child impurity.
    fn best_split(
        &self,
        indices: &[usize],
        candidates: &[usize],
        counts: &[usize; N_CLASSES],
    ) -> Option<(usize, f64)> {
        let n = indices.len();
        let parent = gini(counts, n);
        let mut best: Option<(usize, f64, f64)> = None;

        for &feature in candidates {
            let mut column: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (self.x[i][feature], self.y[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = [0usize; N_CLASSES];
            for split in 1..n {
                left[column[split - 1].1] += 1;
                let (lo, hi) = (column[split - 1].0, column[split].0);
                if lo == hi {
                    continue;
                }

                let right = [counts[0] - left[0], counts[1] - left[1]];
                let impurity = (split as f64 * gini(&left, split)
                    + (n - split) as f64 * gini(&right, n - split))
                    / n as f64;

                if impurity < parent && best.map_or(true, |(_, _, b)| impurity < b) {
                    best = Some((feature, midpoint(lo, hi), impurity));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}

/// Threshold strictly below `hi`, so `lo` goes left and `hi` goes right
fn midpoint(lo: f64, hi: f64) -> f64 {
    // Halving first keeps the sum finite for values near f64::MAX
    let mid = lo / 2.0 + hi / 2.0;
    if mid >= hi || mid < lo {
        lo
    } else {
        mid
    }
}

fn gini(counts: &[usize; N_CLASSES], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}
