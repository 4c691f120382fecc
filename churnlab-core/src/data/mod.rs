//! Dataset acquisition, loading, and splitting.

pub mod dataset;
pub mod fetch;
pub mod split;

pub use dataset::{DataError, Dataset};
pub use fetch::{fetch_dataset, FetchError};
pub use split::{stratified_split, SplitIndices};
