//! Error types for dataset loading, cleaning and splitting.
//!
//! This module defines the `PrepError` enum shared by every pipeline stage.
//! Loader-stage variants are fatal to a `load` call, splitter-stage variants
//! are fatal to a `split` call. An unknown fill method is deliberately *not*
//! an error: the missing-value handler logs a warning and returns the data
//! unchanged.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing a dataset.
#[derive(Debug, Error)]
pub enum PrepError {
    /// The archive extension is not handled by the selected loader.
    #[error("Unsupported container format: {} (expected a .zip archive)", .path.display())]
    UnsupportedContainerFormat {
        /// Path that was passed to the loader
        path: PathBuf,
    },

    /// The loader factory has no implementation for this extension.
    #[error("No data loader available for file extension: '{extension}'")]
    NoLoaderAvailable {
        /// Extension as given by the caller
        extension: String,
    },

    /// Extraction produced no file with a supported tabular extension.
    #[error(
        "No supported file found in {}. Supported types: .csv, .json, .xlsx, .xls",
        .dir.display()
    )]
    NoSupportedFileFound {
        /// Directory the archive was extracted into
        dir: PathBuf,
    },

    /// Extraction produced more than one supported file.
    ///
    /// The loader refuses to pick one; the caller has to repackage the
    /// archive or parse the intended file with `read_tabular_file`.
    #[error("Multiple supported files found, refusing to guess: {}", format_paths(.candidates))]
    AmbiguousFileSelection {
        /// Every supported file found in the archive
        candidates: Vec<PathBuf>,
    },

    /// No parser is registered for the file's extension.
    #[error("Unsupported tabular format: {}", .path.display())]
    UnsupportedTabularFormat {
        /// File that could not be parsed
        path: PathBuf,
    },

    /// The spreadsheet has no worksheet or no header row.
    #[error("Spreadsheet has no data in its first worksheet: {}", .path.display())]
    EmptyWorksheet {
        /// Spreadsheet path
        path: PathBuf,
    },

    /// The constant fill method was chosen without a fill value.
    #[error("Fill method 'constant' requires a fill value")]
    MissingFillValue,

    /// A requested column does not exist in the dataset.
    #[error("Column '{column}' not found in dataset. Available columns: {available:?}")]
    UnknownColumn {
        /// Requested column name
        column: String,
        /// Columns present in the dataset
        available: Vec<String>,
    },

    /// Test fraction outside the open interval (0, 1).
    #[error("Test fraction must be between 0 and 1 (exclusive), got {0}")]
    InvalidTestFraction(f64),

    /// The split would leave the train or the test set empty.
    #[error("Cannot split {rows} row(s) with {test_rows} test row(s): train and test sets must both be non-empty")]
    EmptySplit {
        /// Rows in the dataset
        rows: usize,
        /// Rows that would be assigned to the test set
        test_rows: usize,
    },

    /// The dataset has no columns to summarize.
    #[error("Input dataset is empty")]
    EmptyDataset,

    /// I/O error while reading or extracting files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip archive could not be read.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Spreadsheet could not be read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl PrepError {
    /// Stable machine-readable code, attached to the binary's failure logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedContainerFormat { .. } => "UNSUPPORTED_CONTAINER_FORMAT",
            Self::NoLoaderAvailable { .. } => "NO_LOADER_AVAILABLE",
            Self::NoSupportedFileFound { .. } => "NO_SUPPORTED_FILE_FOUND",
            Self::AmbiguousFileSelection { .. } => "AMBIGUOUS_FILE_SELECTION",
            Self::UnsupportedTabularFormat { .. } => "UNSUPPORTED_TABULAR_FORMAT",
            Self::EmptyWorksheet { .. } => "EMPTY_WORKSHEET",
            Self::MissingFillValue => "MISSING_FILL_VALUE",
            Self::UnknownColumn { .. } => "UNKNOWN_COLUMN",
            Self::InvalidTestFraction(_) => "INVALID_TEST_FRACTION",
            Self::EmptySplit { .. } => "EMPTY_SPLIT",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::Io(_) => "IO_ERROR",
            Self::Archive(_) => "ARCHIVE_ERROR",
            Self::Spreadsheet(_) => "SPREADSHEET_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }
}

/// Result type alias for preparation operations.
pub type Result<T> = std::result::Result<T, PrepError>;

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
