//! End-to-end preparation run: load, handle missing values, split

use std::path::PathBuf;
use std::time::{Duration, Instant};

use polars::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::pipeline::loader::{LoaderFactory, DEFAULT_EXTRACT_DIR};
use crate::pipeline::missing::{count_missing_cells, MissingValueHandler, MissingValueStrategy};
use crate::pipeline::split::{DataSplitter, SplitResult, SplitStrategy};
use crate::pipeline::tabular::TabularReadOptions;

/// Everything a preparation run needs
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub archive: PathBuf,
    pub extract_dir: PathBuf,
    pub target_column: String,
    pub missing: MissingValueStrategy,
    pub split: SplitStrategy,
    pub read_options: TabularReadOptions,
}

impl PipelineConfig {
    /// Config with default extraction directory, fill-with-mean and an 80/20 split
    pub fn new(archive: impl Into<PathBuf>, target_column: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
            extract_dir: PathBuf::from(DEFAULT_EXTRACT_DIR),
            target_column: target_column.into(),
            missing: MissingValueStrategy::Fill(Default::default()),
            split: SplitStrategy::default(),
            read_options: TabularReadOptions::default(),
        }
    }
}

/// Wall-clock time spent in each stage
#[derive(Debug, Clone, Copy, Default)]
pub struct StageTimings {
    pub load: Duration,
    pub missing: Duration,
    pub split: Duration,
}

/// Result of a preparation run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// (rows, columns) as loaded
    pub loaded_shape: (usize, usize),
    /// (rows, columns) after missing value handling
    pub cleaned_shape: (usize, usize),
    pub missing_before: usize,
    pub missing_after: usize,
    pub split: SplitResult,
    pub timings: StageTimings,
}

impl PipelineOutput {
    pub fn new(
        loaded_shape: (usize, usize),
        cleaned: &CleanedDataset,
        split: SplitResult,
        timings: StageTimings,
    ) -> Self {
        Self {
            loaded_shape,
            cleaned_shape: cleaned.frame.shape(),
            missing_before: cleaned.missing_before,
            missing_after: cleaned.missing_after,
            split,
            timings,
        }
    }
}

/// Dataset after missing value handling, with missing cell counts around it
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    pub frame: DataFrame,
    pub missing_before: usize,
    pub missing_after: usize,
}

/// Load the archive named in `config`, clean it and split it.
///
/// Library entry point for a whole run. Callers that report progress
/// between stages use [`load_with_config`], [`clean_with_config`] and
/// [`split_with_config`] directly.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput> {
    let mut timings = StageTimings::default();

    let start = Instant::now();
    let df = load_with_config(config)?;
    timings.load = start.elapsed();

    let start = Instant::now();
    let cleaned = clean_with_config(config, &df)?;
    timings.missing = start.elapsed();

    let start = Instant::now();
    let split = split_with_config(config, &cleaned.frame)?;
    timings.split = start.elapsed();

    Ok(PipelineOutput::new(df.shape(), &cleaned, split, timings))
}

/// Load the configured archive through the loader factory
pub fn load_with_config(config: &PipelineConfig) -> Result<DataFrame> {
    let extension = config
        .archive
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let loader = LoaderFactory::get_data_loader_in(extension, &config.extract_dir)?
        .with_read_options(config.read_options);
    loader.load(&config.archive)
}

/// Apply the configured missing value strategy
pub fn clean_with_config(config: &PipelineConfig, df: &DataFrame) -> Result<CleanedDataset> {
    let handler = MissingValueHandler::new(config.missing.clone());
    let missing_before = count_missing_cells(df);
    let frame = handler.handle_missing_values(df)?;
    let missing_after = count_missing_cells(&frame);

    info!(
        "Missing value handling finished: {} missing cell(s) before, {} after",
        missing_before, missing_after
    );

    Ok(CleanedDataset {
        frame,
        missing_before,
        missing_after,
    })
}

/// Split a cleaned dataset with the configured strategy around the target column
pub fn split_with_config(config: &PipelineConfig, df: &DataFrame) -> Result<SplitResult> {
    DataSplitter::new(config.split.clone()).split(df, &config.target_column)
}
