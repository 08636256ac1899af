//! Train/test splitting of a dataset around a target column

use std::fmt;

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::error::{PrepError, Result};

/// Default proportion of rows assigned to the test set
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Default seed for the row shuffle
pub const DEFAULT_SEED: u64 = 42;

/// Train/test partition of features and labels.
///
/// `train_indices` and `test_indices` hold the original row positions in the
/// order the rows appear in the corresponding frames. Together they cover
/// every row of the input exactly once.
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Series,
    pub y_test: Series,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Shuffled split with a fixed test fraction and seed
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    test_fraction: f64,
    seed: u64,
}

impl Default for TrainTestSplit {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
        }
    }
}

impl TrainTestSplit {
    /// Fails unless `0 < test_fraction < 1`
    pub fn new(test_fraction: f64, seed: u64) -> Result<Self> {
        if !(test_fraction.is_finite() && test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(PrepError::InvalidTestFraction(test_fraction));
        }
        Ok(Self {
            test_fraction,
            seed,
        })
    }

    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of (train, test) rows for a dataset of `rows` rows
    pub fn partition_sizes(&self, rows: usize) -> Result<(usize, usize)> {
        let test_rows = (self.test_fraction * rows as f64).ceil() as usize;
        if rows == 0 || test_rows == 0 || test_rows >= rows {
            return Err(PrepError::EmptySplit { rows, test_rows });
        }
        Ok((rows - test_rows, test_rows))
    }

    /// Shuffle `0..rows` with the seed; the first `test` indices are the test set.
    pub fn partition_indices(&self, rows: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        let (_, test_rows) = self.partition_sizes(rows)?;

        let mut indices: Vec<usize> = (0..rows).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let train = indices.split_off(test_rows);
        Ok((train, indices))
    }

    pub fn split_data(&self, df: &DataFrame, target_column: &str) -> Result<SplitResult> {
        info!("Performing simple train-test split");

        let target = df
            .column(target_column)
            .map_err(|_| unknown_column(df, target_column))?
            .as_materialized_series()
            .clone();
        let features = df.drop(target_column)?;

        let (train_indices, test_indices) = self.partition_indices(df.height())?;
        let train_idx = to_idx_ca(&train_indices);
        let test_idx = to_idx_ca(&test_indices);

        let result = SplitResult {
            x_train: features.take(&train_idx)?,
            x_test: features.take(&test_idx)?,
            y_train: target.take(&train_idx)?,
            y_test: target.take(&test_idx)?,
            train_indices,
            test_indices,
        };

        info!(
            "Train-test split completed: {} train rows, {} test rows",
            result.train_indices.len(),
            result.test_indices.len()
        );
        Ok(result)
    }
}

fn unknown_column(df: &DataFrame, column: &str) -> PrepError {
    PrepError::UnknownColumn {
        column: column.to_string(),
        available: df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

fn to_idx_ca(indices: &[usize]) -> IdxCa {
    let values: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    IdxCa::from_vec(PlSmallStr::from_static("idx"), values)
}

/// A data splitting strategy
#[derive(Debug, Clone, PartialEq)]
pub enum SplitStrategy {
    TrainTest(TrainTestSplit),
}

impl SplitStrategy {
    pub fn split_data(&self, df: &DataFrame, target_column: &str) -> Result<SplitResult> {
        match self {
            SplitStrategy::TrainTest(strategy) => strategy.split_data(df, target_column),
        }
    }
}

impl Default for SplitStrategy {
    fn default() -> Self {
        SplitStrategy::TrainTest(TrainTestSplit::default())
    }
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitStrategy::TrainTest(s) => write!(
                f,
                "train/test split (test fraction {}, seed {})",
                s.test_fraction, s.seed
            ),
        }
    }
}

impl From<TrainTestSplit> for SplitStrategy {
    fn from(strategy: TrainTestSplit) -> Self {
        SplitStrategy::TrainTest(strategy)
    }
}

/// Holds the current split strategy and forwards datasets to it
#[derive(Debug, Clone, Default)]
pub struct DataSplitter {
    strategy: SplitStrategy,
}

impl DataSplitter {
    pub fn new(strategy: impl Into<SplitStrategy>) -> Self {
        Self {
            strategy: strategy.into(),
        }
    }

    /// Replace the strategy used by subsequent calls
    pub fn set_strategy(&mut self, strategy: impl Into<SplitStrategy>) {
        info!("Switching data splitting strategy");
        self.strategy = strategy.into();
    }

    pub fn strategy(&self) -> &SplitStrategy {
        &self.strategy
    }

    pub fn split(&self, df: &DataFrame, target_column: &str) -> Result<SplitResult> {
        info!("Splitting data using {}", self.strategy);
        self.strategy.split_data(df, target_column)
    }
}
