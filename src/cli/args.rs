//! Command-line argument definitions using clap

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::pipeline::{
    Axis, DropMissingValues, FillMethod, FillMissingValues, FillValue, InspectionStrategy,
    MissingValueStrategy, PipelineConfig, SplitStrategy, TabularReadOptions, TrainTestSplit,
    DEFAULT_EXTRACT_DIR, DEFAULT_INFER_SCHEMA_LENGTH,
};

/// Pricewise - Load, clean and split house-price datasets shipped as zip archives
#[derive(Parser, Debug)]
#[command(name = "pricewise")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_negates_reqs = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input archive path (.zip containing one CSV, JSON, XLSX or XLS file)
    #[arg(short, long, required = true)]
    pub input: Option<PathBuf>,

    /// Target column name (becomes the label of the split)
    #[arg(short, long, default_value = "price")]
    pub target: String,

    /// Directory the archive is extracted into
    #[arg(long, default_value = DEFAULT_EXTRACT_DIR)]
    pub extract_dir: PathBuf,

    /// Missing value handling strategy
    #[arg(long, value_enum, default_value_t = CliMissing::Fill)]
    pub missing: CliMissing,

    /// Axis for the drop strategy
    #[arg(long, value_enum, default_value_t = CliAxis::Rows)]
    pub axis: CliAxis,

    /// Minimum number of present values a row or column needs to be kept
    /// (drop strategy only). Default: every value must be present.
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Fill method: mean, median, mode or constant.
    /// Unknown names leave the data unchanged with a warning.
    #[arg(long, default_value = "mean")]
    pub fill_method: String,

    /// Value used by the constant fill method.
    /// Parsed as a boolean, then an integer, then a float, else kept as text.
    #[arg(long)]
    pub fill_value: Option<String>,

    /// Fraction of rows assigned to the test set, strictly between 0 and 1
    #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Seed for the row shuffle
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Print inspection reports of the loaded data (repeatable)
    #[arg(long, value_enum)]
    pub inspect: Vec<CliInspectKind>,

    /// Directory to write train.csv and test.csv into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Write a JSON run report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Only log warnings and errors
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Number of rows to use for CSV schema inference.
    /// Use 0 for a full table scan.
    #[arg(long, default_value_t = DEFAULT_INFER_SCHEMA_LENGTH)]
    pub infer_schema_length: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load an archive and print inspection reports only
    Inspect {
        /// Input archive path
        archive: PathBuf,

        /// Report kinds to print (repeatable). Default: all of them.
        #[arg(long, value_enum)]
        kind: Vec<CliInspectKind>,

        /// Directory the archive is extracted into
        #[arg(long, default_value = DEFAULT_EXTRACT_DIR)]
        extract_dir: PathBuf,
    },
}

/// Missing value strategy names accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliMissing {
    Drop,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliAxis {
    Rows,
    Columns,
}

impl From<CliAxis> for Axis {
    fn from(axis: CliAxis) -> Self {
        match axis {
            CliAxis::Rows => Axis::Rows,
            CliAxis::Columns => Axis::Columns,
        }
    }
}

/// Inspection report kinds accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliInspectKind {
    Dtypes,
    Summary,
    Missing,
}

impl From<CliInspectKind> for InspectionStrategy {
    fn from(kind: CliInspectKind) -> Self {
        match kind {
            CliInspectKind::Dtypes => InspectionStrategy::DataTypes,
            CliInspectKind::Summary => InspectionStrategy::SummaryStatistics,
            CliInspectKind::Missing => InspectionStrategy::MissingValues,
        }
    }
}

/// Map requested kinds to strategies, keeping order and dropping repeats
pub fn inspection_strategies(kinds: &[CliInspectKind]) -> Vec<InspectionStrategy> {
    let mut strategies: Vec<InspectionStrategy> = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let strategy = InspectionStrategy::from(*kind);
        if !strategies.contains(&strategy) {
            strategies.push(strategy);
        }
    }
    strategies
}

impl Cli {
    /// Build the missing value strategy from --missing and its options
    pub fn missing_strategy(&self) -> Result<MissingValueStrategy> {
        let strategy = match self.missing {
            CliMissing::Drop => DropMissingValues::new(self.axis.into(), self.threshold).into(),
            CliMissing::Fill => {
                let value = self.fill_value.as_deref().map(FillValue::parse);
                let method = FillMethod::parse(&self.fill_method, value)
                    .context("Invalid fill options")?;
                FillMissingValues::new(method).into()
            }
        };
        Ok(strategy)
    }

    /// Build the split strategy from --test-size and --seed
    pub fn split_strategy(&self) -> Result<SplitStrategy> {
        let split = TrainTestSplit::new(self.test_size, self.seed)
            .context("Invalid split options")?;
        Ok(split.into())
    }

    /// Assemble the run configuration for the main pipeline
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let input = self.input.as_ref().ok_or_else(|| {
            anyhow::anyhow!("Input archive is required. Use -i/--input to specify a file.")
        })?;

        let mut config = PipelineConfig::new(input, &self.target);
        config.extract_dir = self.extract_dir.clone();
        config.missing = self.missing_strategy()?;
        config.split = self.split_strategy()?;
        config.read_options = TabularReadOptions {
            infer_schema_length: self.infer_schema_length,
        };
        Ok(config)
    }
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}
