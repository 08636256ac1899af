//! JSON run report
//!
//! Records what a preparation run was asked to do and what it produced:
//! input archive, strategies, shapes before and after cleaning, split sizes
//! and per-stage timings.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{InspectionReport, PipelineConfig, PipelineOutput};

/// Shape of a frame at one point of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShapeInfo {
    pub rows: usize,
    pub columns: usize,
}

impl From<(usize, usize)> for ShapeInfo {
    fn from((rows, columns): (usize, usize)) -> Self {
        Self { rows, columns }
    }
}

/// Strategies used in the run
#[derive(Debug, Clone, Serialize)]
pub struct StrategySettings {
    pub missing: String,
    pub split: String,
}

/// Missing cell counts around the handling stage
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MissingCells {
    pub before: usize,
    pub after: usize,
}

/// Sizes of the produced partitions
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SplitSizes {
    pub train: usize,
    pub test: usize,
    pub features: usize,
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo {
    pub load_ms: u64,
    pub missing_ms: u64,
    pub split_ms: u64,
    pub total_ms: u64,
}

/// Complete run report
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub pricewise_version: String,
    pub input_file: String,
    pub extract_dir: String,
    pub target_column: String,
    pub strategies: StrategySettings,
    pub loaded: ShapeInfo,
    pub cleaned: ShapeInfo,
    pub missing_cells: MissingCells,
    pub split: SplitSizes,
    pub timing: TimingInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inspections: Vec<InspectionReport>,
}

impl RunReport {
    pub fn new(config: &PipelineConfig, output: &PipelineOutput) -> Self {
        let timings = &output.timings;
        let total = timings.load + timings.missing + timings.split;

        Self {
            generated_at: Utc::now().to_rfc3339(),
            pricewise_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: config.archive.display().to_string(),
            extract_dir: config.extract_dir.display().to_string(),
            target_column: config.target_column.clone(),
            strategies: StrategySettings {
                missing: config.missing.to_string(),
                split: config.split.to_string(),
            },
            loaded: output.loaded_shape.into(),
            cleaned: output.cleaned_shape.into(),
            missing_cells: MissingCells {
                before: output.missing_before,
                after: output.missing_after,
            },
            split: SplitSizes {
                train: output.split.x_train.height(),
                test: output.split.x_test.height(),
                features: output.split.x_train.width(),
            },
            timing: TimingInfo {
                load_ms: millis(timings.load),
                missing_ms: millis(timings.missing),
                split_ms: millis(timings.split),
                total_ms: millis(total),
            },
            inspections: Vec::new(),
        }
    }

    /// Attach inspection reports produced during the run
    pub fn with_inspections(mut self, inspections: Vec<InspectionReport>) -> Self {
        self.inspections = inspections;
        self
    }
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

/// Export the run report to a JSON file
pub fn export_run_report(report: &RunReport, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize run report to JSON")?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write run report to {}", output_path.display()))?;

    Ok(())
}
