//! Gradient-boosted tree classifier with logistic loss.
//!
//! The classic binomial-deviance formulation: the initial score is the
//! log-odds of the base rate; each round fits a regression tree to the
//! residuals `y - p`, replaces the leaf values with the Newton step
//! `Σ residual / Σ p(1-p)`, and adds the tree scaled by the learning rate.
//! Probabilities come back through the sigmoid. There is no row or feature
//! subsampling, so fitting is fully deterministic for a fixed dataset and
//! config; the seed participates only in the config fingerprint.

use super::tree::{RegressionTree, TreeParams};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boosting hyperparameters. Defaults mirror the standard
/// gradient-boosting-classifier configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbdtConfig {
    pub n_trees: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

/// Errors from model fitting.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training labels contain a single class; cannot fit a classifier")]
    SingleClass,
}

/// A fitted gradient-boosted binary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtClassifier {
    config: GbdtConfig,
    n_features: usize,
    initial_score: f64,
    trees: Vec<RegressionTree>,
}

impl GbdtClassifier {
    /// Fit the ensemble on an encoded feature matrix and 0/1 labels.
    pub fn fit(x: ArrayView2<f64>, y: &[f64], config: GbdtConfig) -> Result<Self, ModelError> {
        let n = x.nrows();
        if n == 0 || y.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let positives = y.iter().filter(|&&v| v > 0.5).count();
        if positives == 0 || positives == n {
            return Err(ModelError::SingleClass);
        }

        let prior = positives as f64 / n as f64;
        let initial_score = (prior / (1.0 - prior)).ln();

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_leaf: config.min_samples_leaf,
        };

        let mut scores = vec![initial_score; n];
        let mut trees = Vec::with_capacity(config.n_trees);

        for round in 0..config.n_trees {
            let probabilities: Vec<f64> = scores.iter().map(|&s| sigmoid(s)).collect();
            let residuals: Vec<f64> = y
                .iter()
                .zip(&probabilities)
                .map(|(yi, pi)| yi - pi)
                .collect();

            let mut tree = RegressionTree::fit(x, &residuals, &params);

            // Newton leaf update: replace each leaf's mean residual with
            // Σr / Σp(1-p) over the samples landing in it.
            let mut numerator = vec![0.0; tree.node_count()];
            let mut denominator = vec![0.0; tree.node_count()];
            let mut assignment = vec![0usize; n];
            for i in 0..n {
                let leaf = tree.leaf_for(x.row(i));
                assignment[i] = leaf;
                numerator[leaf] += residuals[i];
                denominator[leaf] += probabilities[i] * (1.0 - probabilities[i]);
            }
            for node in 0..tree.node_count() {
                if !tree.is_leaf(node) {
                    continue;
                }
                let value = if denominator[node] > 1e-12 {
                    numerator[node] / denominator[node]
                } else {
                    0.0
                };
                tree.set_leaf_value(node, value);
            }

            for i in 0..n {
                scores[i] += config.learning_rate * tree.leaf_value(assignment[i]);
            }
            trees.push(tree);

            if round == 0 || (round + 1) % 25 == 0 {
                log::debug!("boosting round {}/{}", round + 1, config.n_trees);
            }
        }

        Ok(Self {
            config,
            n_features: x.ncols(),
            initial_score,
            trees,
        })
    }

    /// Positive-class probability for one encoded row.
    pub fn predict_proba_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut score = self.initial_score;
        for tree in &self.trees {
            score += self.config.learning_rate * tree.predict_row(row);
        }
        sigmoid(score)
    }

    /// Positive-class probabilities for every row of a feature matrix.
    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Vec<f64> {
        (0..x.nrows())
            .map(|i| self.predict_proba_row(x.row(i)))
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn config(&self) -> &GbdtConfig {
        &self.config
    }
}

fn sigmoid(score: f64) -> f64 {
    1.0 / (1.0 + (-score).exp())
}
