//! Seeded stratified train/test split.
//!
//! Shuffles each class independently with a `StdRng` seeded from a fixed
//! value, then holds out the requested fraction of every class. The split is
//! deterministic for a given seed regardless of row order within classes of
//! the input, and both subsets preserve the full set's class balance.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices for the two halves of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified split of `labels` into train and test index sets.
///
/// `test_fraction` of each class (rounded, clamped so neither side of a
/// class with at least two members is empty) goes to the test set. A class
/// with a single member stays in the training set.
pub fn stratified_split(labels: &[f64], test_fraction: f64, seed: u64) -> SplitIndices {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut positives: Vec<usize> = Vec::new();
    let mut negatives: Vec<usize> = Vec::new();
    for (i, &label) in labels.iter().enumerate() {
        if label > 0.5 {
            positives.push(i);
        } else {
            negatives.push(i);
        }
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for mut class in [negatives, positives] {
        if class.is_empty() {
            continue;
        }
        class.shuffle(&mut rng);

        let n_test = if class.len() < 2 {
            0
        } else {
            let target = (class.len() as f64 * test_fraction).round() as usize;
            target.clamp(1, class.len() - 1)
        };

        let (test_part, train_part) = class.split_at(n_test);
        test.extend_from_slice(test_part);
        train.extend_from_slice(train_part);
    }

    // Shuffle once more so subset order does not encode the class.
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    SplitIndices { train, test }
}
