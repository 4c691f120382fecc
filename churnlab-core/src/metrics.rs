//! Evaluation metrics — pure functions over labels and scores.
//!
//! Every metric is a pure function: labels and probabilities in, scalar out.
//! No dependencies on the trainer, pipeline, or model. Degenerate input
//! (empty sets, a single class) yields 0.0 rather than an error.

use serde::{Deserialize, Serialize};

/// The three persisted evaluation metrics for a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub roc_auc: f64,
    pub accuracy: f64,
    pub f1: f64,
}

impl EvaluationMetrics {
    /// Compute all metrics from labels and positive-class probabilities,
    /// thresholding at `threshold` for the label-based metrics.
    pub fn compute(labels: &[f64], probabilities: &[f64], threshold: f64) -> Self {
        let predicted = threshold_labels(probabilities, threshold);
        Self {
            roc_auc: roc_auc(labels, probabilities),
            accuracy: accuracy(labels, &predicted),
            f1: f1_score(labels, &predicted),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Area under the ROC curve via the average-rank (Mann–Whitney) statistic.
///
/// Tied scores receive their average rank, so heavily quantized
/// probabilities are handled correctly. Returns 0.0 if either class is
/// absent.
pub fn roc_auc(labels: &[f64], scores: &[f64]) -> f64 {
    debug_assert_eq!(labels.len(), scores.len());
    let n = labels.len();
    let positives = labels.iter().filter(|&&l| l > 0.5).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return 0.0;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks (1-based) with tie groups sharing their mean rank.
    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let average = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = average;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(label, _)| **label > 0.5)
        .map(|(_, rank)| *rank)
        .sum();

    let pos = positives as f64;
    let neg = negatives as f64;
    (positive_rank_sum - pos * (pos + 1.0) / 2.0) / (pos * neg)
}

/// Fraction of predicted labels matching the true labels.
pub fn accuracy(labels: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(labels.len(), predicted.len());
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels
        .iter()
        .zip(predicted)
        .filter(|(l, p)| (**l > 0.5) == (**p > 0.5))
        .count();
    correct as f64 / labels.len() as f64
}

/// F1 score of the positive class: harmonic mean of precision and recall.
///
/// Returns 0.0 when there are no positive predictions or no positive labels.
pub fn f1_score(labels: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(labels.len(), predicted.len());

    let mut true_positives = 0usize;
    let mut false_positives = 0usize;
    let mut false_negatives = 0usize;
    for (label, prediction) in labels.iter().zip(predicted) {
        match (*label > 0.5, *prediction > 0.5) {
            (true, true) => true_positives += 1,
            (false, true) => false_positives += 1,
            (true, false) => false_negatives += 1,
            (false, false) => {}
        }
    }

    let denominator = 2 * true_positives + false_positives + false_negatives;
    if denominator == 0 {
        return 0.0;
    }
    2.0 * true_positives as f64 / denominator as f64
}

/// Threshold probabilities into 0/1 labels (positive when strictly above).
pub fn threshold_labels(probabilities: &[f64], threshold: f64) -> Vec<f64> {
    probabilities
        .iter()
        .map(|&p| if p > threshold { 1.0 } else { 0.0 })
        .collect()
}
