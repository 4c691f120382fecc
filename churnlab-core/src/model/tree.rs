//! Depth-limited least-squares regression trees.
//!
//! These are the weak learners of the boosted ensemble: each tree fits the
//! current residuals by exhaustive split search (maximizing squared-error
//! reduction), with the per-feature scans parallelized across features via
//! rayon. Nodes live in an arena `Vec` so the fitted tree serializes as
//! plain data.

use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Fit parameters for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

/// One arena node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A fitted regression tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Fit a tree minimizing squared error against `targets`.
    pub fn fit(x: ArrayView2<f64>, targets: &[f64], params: &TreeParams) -> Self {
        let mut nodes = Vec::new();
        let indices: Vec<usize> = (0..x.nrows()).collect();
        build_node(&mut nodes, x, targets, indices, 0, params);
        Self { nodes }
    }

    /// Predicted value for one encoded row.
    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        match &self.nodes[self.leaf_for(row)] {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split { .. } => unreachable!("leaf_for returns a leaf node"),
        }
    }

    /// Arena index of the leaf this row lands in.
    pub fn leaf_for(&self, row: ArrayView1<f64>) -> usize {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                TreeNode::Leaf { .. } => return node,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_leaf(&self, node: usize) -> bool {
        matches!(self.nodes[node], TreeNode::Leaf { .. })
    }

    /// Leaf value at `node`. Zero for split nodes.
    pub fn leaf_value(&self, node: usize) -> f64 {
        match &self.nodes[node] {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split { .. } => 0.0,
        }
    }

    /// Replace the value stored at a leaf (used by the boosting leaf update).
    pub fn set_leaf_value(&mut self, node: usize, value: f64) {
        if let TreeNode::Leaf { value: slot } = &mut self.nodes[node] {
            *slot = value;
        }
    }
}

fn build_node(
    nodes: &mut Vec<TreeNode>,
    x: ArrayView2<f64>,
    targets: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: &TreeParams,
) -> usize {
    let node_id = nodes.len();
    nodes.push(TreeNode::Leaf { value: 0.0 });

    let can_split = depth < params.max_depth && indices.len() >= 2 * params.min_samples_leaf;
    let candidate = if can_split {
        best_split(x, targets, &indices, params.min_samples_leaf)
    } else {
        None
    };

    match candidate {
        Some(split) => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&i| x[[i, split.feature]] <= split.threshold);

            let left = build_node(nodes, x, targets, left_idx, depth + 1, params);
            let right = build_node(nodes, x, targets, right_idx, depth + 1, params);
            nodes[node_id] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
        }
        None => {
            nodes[node_id] = TreeNode::Leaf {
                value: subset_mean(targets, &indices),
            };
        }
    }

    node_id
}

fn subset_mean(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

/// Best split over all features, or None when no split improves the loss.
///
/// Ties break toward the lower feature index then the lower threshold, so
/// the result is independent of rayon's reduction order.
fn best_split(
    x: ArrayView2<f64>,
    targets: &[f64],
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    (0..x.ncols())
        .into_par_iter()
        .filter_map(|feature| best_split_for_feature(x, targets, indices, feature, min_samples_leaf))
        .reduce_with(|a, b| match compare_candidates(&a, &b) {
            Ordering::Less => b,
            _ => a,
        })
}

fn compare_candidates(a: &SplitCandidate, b: &SplitCandidate) -> Ordering {
    a.gain
        .partial_cmp(&b.gain)
        .unwrap_or(Ordering::Equal)
        .then(b.feature.cmp(&a.feature))
        .then(b.threshold.partial_cmp(&a.threshold).unwrap_or(Ordering::Equal))
}

fn best_split_for_feature(
    x: ArrayView2<f64>,
    targets: &[f64],
    indices: &[usize],
    feature: usize,
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    let mut order: Vec<usize> = indices.to_vec();
    order.sort_by(|&a, &b| {
        x[[a, feature]]
            .partial_cmp(&x[[b, feature]])
            .unwrap_or(Ordering::Equal)
    });

    let n = order.len();
    let total_sum: f64 = order.iter().map(|&i| targets[i]).sum();
    let parent_score = total_sum * total_sum / n as f64;

    let mut left_sum = 0.0;
    let mut best: Option<(f64, f64)> = None; // (gain, threshold)

    for position in 0..n - 1 {
        let index = order[position];
        left_sum += targets[index];

        let value = x[[index, feature]];
        let next_value = x[[order[position + 1], feature]];
        if value == next_value {
            continue;
        }

        let left_count = position + 1;
        let right_count = n - left_count;
        if left_count < min_samples_leaf || right_count < min_samples_leaf {
            continue;
        }

        let right_sum = total_sum - left_sum;
        let score = left_sum * left_sum / left_count as f64
            + right_sum * right_sum / right_count as f64;
        let gain = score - parent_score;

        if best.map_or(true, |(g, _)| gain > g) {
            best = Some((gain, 0.5 * (value + next_value)));
        }
    }

    let (gain, threshold) = best?;
    if gain <= 1e-12 {
        return None;
    }
    Some(SplitCandidate {
        feature,
        threshold,
        gain,
    })
}
