//! Basic dataset inspection: column types, summary statistics, missing counts

use std::fmt;

use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::error::{PrepError, Result};
use crate::pipeline::missing::column_mode;

/// Type and non-null count of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnTypeInfo {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub nulls: usize,
}

/// Describe-style statistics of a numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Describe-style statistics of a non-numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub name: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

/// Missing value count of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingCount {
    pub name: String,
    pub missing: usize,
    pub ratio: f64,
}

/// Output of a [`DataInspector`] run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InspectionReport {
    DataTypes {
        columns: Vec<ColumnTypeInfo>,
    },
    Summary {
        numeric: Vec<NumericSummary>,
        categorical: Vec<CategoricalSummary>,
    },
    Missing {
        rows: usize,
        columns: Vec<MissingCount>,
    },
}

/// Available inspection strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionStrategy {
    DataTypes,
    SummaryStatistics,
    MissingValues,
}

impl InspectionStrategy {
    pub const ALL: [InspectionStrategy; 3] = [
        InspectionStrategy::DataTypes,
        InspectionStrategy::SummaryStatistics,
        InspectionStrategy::MissingValues,
    ];

    pub fn inspect(&self, df: &DataFrame) -> Result<InspectionReport> {
        match self {
            InspectionStrategy::DataTypes => Ok(inspect_data_types(df)),
            InspectionStrategy::SummaryStatistics => inspect_summary(df),
            InspectionStrategy::MissingValues => Ok(inspect_missing(df)),
        }
    }
}

impl fmt::Display for InspectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectionStrategy::DataTypes => write!(f, "data types"),
            InspectionStrategy::SummaryStatistics => write!(f, "summary statistics"),
            InspectionStrategy::MissingValues => write!(f, "missing values"),
        }
    }
}

/// Holds the current inspection strategy and runs it on datasets
#[derive(Debug, Clone)]
pub struct DataInspector {
    strategy: InspectionStrategy,
}

impl DataInspector {
    pub fn new(strategy: InspectionStrategy) -> Self {
        Self { strategy }
    }

    /// Replace the strategy used by subsequent calls
    pub fn set_strategy(&mut self, strategy: InspectionStrategy) {
        info!("Switching data inspection strategy to {}", strategy);
        self.strategy = strategy;
    }

    pub fn strategy(&self) -> InspectionStrategy {
        self.strategy
    }

    pub fn execute_inspection(&self, df: &DataFrame) -> Result<InspectionReport> {
        info!("Executing {} inspection", self.strategy);
        self.strategy.inspect(df)
    }
}

fn inspect_data_types(df: &DataFrame) -> InspectionReport {
    let columns = df
        .get_columns()
        .iter()
        .map(|c| ColumnTypeInfo {
            name: c.name().to_string(),
            dtype: c.dtype().to_string(),
            non_null: c.len() - c.null_count(),
            nulls: c.null_count(),
        })
        .collect();

    InspectionReport::DataTypes { columns }
}

fn inspect_summary(df: &DataFrame) -> Result<InspectionReport> {
    if df.width() == 0 {
        return Err(PrepError::EmptyDataset);
    }

    let mut numeric = Vec::new();
    let mut categorical = Vec::new();

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if series.dtype().is_primitive_numeric() {
            numeric.push(numeric_summary(series)?);
        } else {
            categorical.push(categorical_summary(series)?);
        }
    }

    Ok(InspectionReport::Summary {
        numeric,
        categorical,
    })
}

fn numeric_summary(series: &Series) -> Result<NumericSummary> {
    let as_float = series.cast(&DataType::Float64)?;
    let mut values: Vec<f64> = as_float.f64()?.into_iter().flatten().collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let mean = if count > 0 {
        Some(values.iter().sum::<f64>() / count as f64)
    } else {
        None
    };
    // Sample standard deviation (ddof = 1)
    let std = match mean {
        Some(m) if count > 1 => {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            Some((ss / (count - 1) as f64).sqrt())
        }
        _ => None,
    };

    Ok(NumericSummary {
        name: series.name().to_string(),
        count,
        mean,
        std,
        min: values.first().copied(),
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values.last().copied(),
    })
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

fn categorical_summary(series: &Series) -> Result<CategoricalSummary> {
    let present = series.drop_nulls();
    let (top, freq) = match column_mode(series)? {
        Some((mode, freq)) => (Some(any_value_text(&mode.get(0)?)), freq),
        None => (None, 0),
    };

    Ok(CategoricalSummary {
        name: series.name().to_string(),
        count: present.len(),
        unique: present.n_unique()?,
        top,
        freq,
    })
}

fn any_value_text(value: &AnyValue) -> String {
    match value {
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Count missing values per column, keeping only columns with at least one.
///
/// Sorted by missing count descending, then by column name.
pub fn analyze_missing_values(df: &DataFrame) -> Vec<MissingCount> {
    let rows = df.height();
    let mut counts: Vec<MissingCount> = df
        .get_columns()
        .iter()
        .filter(|c| c.null_count() > 0)
        .map(|c| MissingCount {
            name: c.name().to_string(),
            missing: c.null_count(),
            ratio: c.null_count() as f64 / rows as f64,
        })
        .collect();

    counts.sort_by(|a, b| b.missing.cmp(&a.missing).then_with(|| a.name.cmp(&b.name)));
    counts
}

fn inspect_missing(df: &DataFrame) -> InspectionReport {
    InspectionReport::Missing {
        rows: df.height(),
        columns: analyze_missing_values(df),
    }
}
