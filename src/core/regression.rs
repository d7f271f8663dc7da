//! Inference for the regression model kinds a valuation artifact can carry.
//!
//! Models are deserialized from the `model` object of an artifact file and
//! validated against the artifact's declared feature count before use.
//!
//! # JSON Format (linear)
//!
//! ```json
//! { "model_type": "linear", "intercept": 13.5, "coefficients": [0.01, 0.02] }
//! ```
//!
//! # JSON Format (gradient boosted trees)
//!
//! ```json
//! {
//!   "model_type": "gradient_boosted",
//!   "base_score": 13.2,
//!   "learning_rate": 0.1,
//!   "trees": [
//!     { "nodes": [
//!       { "feature": 2, "threshold": 70.0, "left": 1, "right": 2 },
//!       { "feature": -1, "value": -0.4 },
//!       { "feature": -1, "value": 0.6 }
//!     ] }
//!   ]
//! }
//! ```
//!
//! # Tree Traversal
//!
//! - Start at node 0
//! - `feature == -1` marks a leaf; its `value` is the tree's contribution
//! - Otherwise go `left` when `features[feature] <= threshold` or is NaN,
//!   else `right`
//! - Child indices must point forward, so traversal always terminates

use serde::Deserialize;
use std::sync::Arc;

/// A fitted regression function over an ordered feature row
///
/// Implementors must be `Send + Sync`: one instance is shared read-only by
/// every worker once loaded.
pub trait RegressionModel: Send + Sync + std::fmt::Debug {
    /// Raw model output for one row, in schema order
    fn predict(&self, features: &[f64]) -> f64;

    /// Number of features expected
    fn n_features(&self) -> usize;

    /// Short model kind name for logging
    fn kind(&self) -> &'static str;
}

/// Serialized model description as found in artifact files
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    GradientBoosted {
        base_score: f64,
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        trees: Vec<TreeSpec>,
    },
}

fn default_learning_rate() -> f64 { 1.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<TreeNode>,
}

/// A single node of a regression tree
#[derive(Debug, Clone, Deserialize)]
pub struct TreeNode {
    /// Feature index to split on (-1 for leaf nodes)
    pub feature: i32,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default = "no_child")]
    pub left: i32,
    #[serde(default = "no_child")]
    pub right: i32,
    /// Leaf contribution (None for internal nodes)
    #[serde(default)]
    pub value: Option<f64>,
}

fn no_child() -> i32 { -1 }

impl ModelSpec {
    /// Validate the description and build a shareable model
    ///
    /// # Errors
    /// Returns a description of the first structural problem found.
    pub fn build(self, n_features: usize) -> Result<Arc<dyn RegressionModel>, String> {
        match self {
            ModelSpec::Linear { intercept, coefficients } => {
                Ok(Arc::new(LinearRegressor::new(intercept, coefficients, n_features)?))
            }
            ModelSpec::GradientBoosted { base_score, learning_rate, trees } => {
                let trees = trees.into_iter().map(|t| t.nodes).collect();
                Ok(Arc::new(GradientBoostedTrees::new(
                    base_score,
                    learning_rate,
                    trees,
                    n_features,
                )?))
            }
        }
    }
}

/// `intercept + Σ coefficient_i * x_i`
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>, n_features: usize) -> Result<Self, String> {
        if coefficients.len() != n_features {
            return Err(format!(
                "Linear model has {} coefficients, expected {}",
                coefficients.len(),
                n_features
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err("Linear model contains non-finite parameters".to_string());
        }
        Ok(Self { intercept, coefficients })
    }
}

impl RegressionModel for LinearRegressor {
    fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

/// Additive tree ensemble: `base_score + learning_rate * Σ tree(x)`
#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    base_score: f64,
    learning_rate: f64,
    trees: Vec<Vec<TreeNode>>,
    n_features: usize,
}

impl GradientBoostedTrees {
    pub fn new(
        base_score: f64,
        learning_rate: f64,
        trees: Vec<Vec<TreeNode>>,
        n_features: usize,
    ) -> Result<Self, String> {
        if !base_score.is_finite() {
            return Err(format!("Invalid base_score: {}", base_score));
        }
        if learning_rate <= 0.0 || learning_rate > 1.0 {
            return Err(format!(
                "Invalid learning_rate: {} (should be 0 < lr <= 1)",
                learning_rate
            ));
        }
        for (i, nodes) in trees.iter().enumerate() {
            validate_tree(nodes, n_features).map_err(|e| format!("Tree {}: {}", i, e))?;
        }

        Ok(Self {
            base_score,
            learning_rate,
            trees,
            n_features,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn validate_tree(nodes: &[TreeNode], n_features: usize) -> Result<(), String> {
    if nodes.is_empty() {
        return Err("tree has no nodes".to_string());
    }

    for (idx, node) in nodes.iter().enumerate() {
        if node.feature < 0 {
            match node.value {
                Some(v) if v.is_finite() => {}
                _ => return Err(format!("leaf {} has no finite value", idx)),
            }
            continue;
        }

        if node.feature as usize >= n_features {
            return Err(format!(
                "node {} splits on feature {} but only {} features exist",
                idx, node.feature, n_features
            ));
        }

        for child in [node.left, node.right] {
            if child <= idx as i32 || child as usize >= nodes.len() {
                return Err(format!("node {} has invalid child index {}", idx, child));
            }
        }
    }

    Ok(())
}

#[inline]
fn traverse(nodes: &[TreeNode], features: &[f64]) -> f64 {
    let mut idx = 0usize;
    loop {
        let node = &nodes[idx];
        if node.feature < 0 {
            return node.value.unwrap_or(0.0);
        }

        let x = features
            .get(node.feature as usize)
            .copied()
            .unwrap_or(f64::NAN);

        idx = if x.is_nan() || x <= node.threshold {
            node.left as usize
        } else {
            node.right as usize
        };
    }
}

impl RegressionModel for GradientBoostedTrees {
    fn predict(&self, features: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|nodes| traverse(nodes, features)).sum();
        self.base_score + self.learning_rate * sum
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn kind(&self) -> &'static str {
        "gradient_boosted"
    }
}
