//! Gradient-boosted tree model.

pub mod gbdt;
pub mod tree;

pub use gbdt::{GbdtClassifier, GbdtConfig, ModelError};
pub use tree::{RegressionTree, TreeParams};
