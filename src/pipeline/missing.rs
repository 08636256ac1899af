//! Missing value handling: drop and fill strategies
//!
//! A [`MissingValueHandler`] holds one [`MissingValueStrategy`] at a time and
//! forwards datasets to it. Replacing the strategy with
//! [`MissingValueHandler::set_strategy`] only affects later calls.
//!
//! Every strategy borrows its input and returns a new `DataFrame`; the
//! caller's frame is never modified.

use std::fmt;

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{PrepError, Result};

/// Direction along which [`DropMissingValues`] removes data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Drop rows that have too few present values
    Rows,
    /// Drop columns that have too few present values
    Columns,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Rows => write!(f, "rows"),
            Axis::Columns => write!(f, "columns"),
        }
    }
}

/// Drop rows or columns whose non-missing count is below a threshold.
///
/// With `threshold: None` every cell must be present: a row needs one value
/// per column, a column needs one value per row.
#[derive(Debug, Clone, PartialEq)]
pub struct DropMissingValues {
    pub axis: Axis,
    pub threshold: Option<usize>,
}

impl Default for DropMissingValues {
    fn default() -> Self {
        Self {
            axis: Axis::Rows,
            threshold: None,
        }
    }
}

impl DropMissingValues {
    pub fn new(axis: Axis, threshold: Option<usize>) -> Self {
        Self { axis, threshold }
    }

    pub fn handle(&self, df: &DataFrame) -> Result<DataFrame> {
        info!(
            "Dropping missing values with axis={} and threshold={:?}",
            self.axis, self.threshold
        );

        let cleaned = match self.axis {
            Axis::Rows => drop_sparse_rows(df, self.threshold)?,
            Axis::Columns => drop_sparse_columns(df, self.threshold)?,
        };

        info!(
            "Missing values dropped: {:?} -> {:?}",
            df.shape(),
            cleaned.shape()
        );
        Ok(cleaned)
    }
}

fn drop_sparse_rows(df: &DataFrame, threshold: Option<usize>) -> Result<DataFrame> {
    let required = threshold.unwrap_or(df.width());

    let mut present_counts = vec![0usize; df.height()];
    for column in df.get_columns() {
        let present = column.as_materialized_series().is_not_null();
        for (count, is_present) in present_counts.iter_mut().zip(&present) {
            if is_present == Some(true) {
                *count += 1;
            }
        }
    }

    let keep: BooleanChunked = present_counts.iter().map(|&c| c >= required).collect();
    Ok(df.filter(&keep)?)
}

fn drop_sparse_columns(df: &DataFrame, threshold: Option<usize>) -> Result<DataFrame> {
    let required = threshold.unwrap_or(df.height());

    let keep: Vec<PlSmallStr> = df
        .get_columns()
        .iter()
        .filter(|c| c.len() - c.null_count() >= required)
        .map(|c| c.name().clone())
        .collect();

    Ok(df.select(keep)?)
}

/// Value used by [`FillMethod::Constant`]
#[derive(Debug, Clone, PartialEq)]
pub enum FillValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl FillValue {
    /// Parse user input: bool, then integer, then float, else string
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "true" => return FillValue::Bool(true),
            "false" => return FillValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return FillValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return FillValue::Float(f);
        }
        FillValue::Str(raw.to_string())
    }
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillValue::Int(v) => write!(f, "{}", v),
            FillValue::Float(v) => write!(f, "{}", v),
            FillValue::Str(v) => write!(f, "{}", v),
            FillValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Imputation method for [`FillMissingValues`]
#[derive(Debug, Clone, PartialEq)]
pub enum FillMethod {
    /// Per-column mean of numeric columns
    Mean,
    /// Per-column median of numeric columns
    Median,
    /// Most frequent value of every column; ties go to the smallest value
    Mode,
    /// The same value in every column
    Constant(FillValue),
    /// Unrecognized method name, handled as a logged no-op
    Unknown(String),
}

impl FillMethod {
    /// Resolve a method name (case-insensitive).
    ///
    /// Unrecognized names are kept as [`FillMethod::Unknown`] rather than
    /// rejected; only `constant` without a value is an error.
    pub fn parse(name: &str, fill_value: Option<FillValue>) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "mean" => Ok(FillMethod::Mean),
            "median" => Ok(FillMethod::Median),
            "mode" => Ok(FillMethod::Mode),
            "constant" => fill_value
                .map(FillMethod::Constant)
                .ok_or(PrepError::MissingFillValue),
            _ => Ok(FillMethod::Unknown(name.to_string())),
        }
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillMethod::Mean => write!(f, "mean"),
            FillMethod::Median => write!(f, "median"),
            FillMethod::Mode => write!(f, "mode"),
            FillMethod::Constant(v) => write!(f, "constant ({})", v),
            FillMethod::Unknown(name) => write!(f, "{}", name),
        }
    }
}

/// Impute missing cells with a statistic or a constant
#[derive(Debug, Clone, PartialEq)]
pub struct FillMissingValues {
    pub method: FillMethod,
}

impl Default for FillMissingValues {
    fn default() -> Self {
        Self::new(FillMethod::Mean)
    }
}

impl FillMissingValues {
    pub fn new(method: FillMethod) -> Self {
        Self { method }
    }

    pub fn handle(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Filling missing values with method = {}", self.method);

        let filled = match &self.method {
            FillMethod::Mean => fill_numeric(df, NumericStatistic::Mean)?,
            FillMethod::Median => fill_numeric(df, NumericStatistic::Median)?,
            FillMethod::Mode => fill_mode(df)?,
            FillMethod::Constant(value) => fill_constant(df, value)?,
            FillMethod::Unknown(name) => {
                warn!("Unknown method '{}'. No missing values filled", name);
                return Ok(df.clone());
            }
        };

        info!("Missing values filled");
        Ok(filled)
    }
}

#[derive(Debug, Clone, Copy)]
enum NumericStatistic {
    Mean,
    Median,
}

fn fill_numeric(df: &DataFrame, statistic: NumericStatistic) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if !series.dtype().is_primitive_numeric() || series.null_count() == 0 {
            columns.push(column.clone());
            continue;
        }

        let value = match statistic {
            NumericStatistic::Mean => series.mean(),
            NumericStatistic::Median => series.median(),
        };
        // All-missing column: nothing to compute from
        let Some(value) = value else {
            columns.push(column.clone());
            continue;
        };
        debug!("Filling '{}' with {:?} {}", series.name(), statistic, value);

        let widened = series.cast(&DataType::Float64)?;
        let fill = Series::new(series.name().clone(), [value]);
        columns.push(fill_nulls_with(&widened, &fill)?.into());
    }

    Ok(DataFrame::new(columns)?)
}

fn fill_mode(df: &DataFrame) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if series.null_count() == 0 {
            columns.push(column.clone());
            continue;
        }

        match column_mode(series)? {
            Some((mode, _)) => {
                debug!("Filling '{}' with mode {:?}", series.name(), mode.get(0)?);
                columns.push(fill_nulls_with(series, &mode)?.into());
            }
            None => columns.push(column.clone()),
        }
    }

    Ok(DataFrame::new(columns)?)
}

fn fill_constant(df: &DataFrame, value: &FillValue) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if series.null_count() == 0 {
            columns.push(column.clone());
            continue;
        }

        let (base, fill) = constant_fill_pair(series, value)?;
        columns.push(fill_nulls_with(&base, &fill)?.into());
    }

    Ok(DataFrame::new(columns)?)
}

/// Pick the dtype a constant fill lands in and build the one-value fill series.
///
/// Numeric into numeric keeps the column type, except a float (or an integer
/// that does not fit) into an integer column, which widens to Float64.
/// String into String and bool into Boolean keep the type. Any other pairing
/// converts the column to String.
fn constant_fill_pair(series: &Series, value: &FillValue) -> Result<(Series, Series)> {
    let name = series.name().clone();
    let dtype = series.dtype();

    let pair = match value {
        FillValue::Int(v) if dtype.is_primitive_numeric() => {
            match Series::new(name.clone(), [*v]).strict_cast(dtype) {
                Ok(fill) => (series.clone(), fill),
                Err(_) => (
                    series.cast(&DataType::Float64)?,
                    Series::new(name, [*v as f64]),
                ),
            }
        }
        FillValue::Float(v) if dtype.is_float() => {
            (series.clone(), Series::new(name, [*v]).cast(dtype)?)
        }
        FillValue::Float(v) if dtype.is_primitive_numeric() => {
            (series.cast(&DataType::Float64)?, Series::new(name, [*v]))
        }
        FillValue::Str(v) if dtype == &DataType::String => {
            (series.clone(), Series::new(name, [v.as_str()]))
        }
        FillValue::Bool(v) if dtype == &DataType::Boolean => {
            (series.clone(), Series::new(name, [*v]))
        }
        other => (
            series.cast(&DataType::String)?,
            Series::new(name, [other.to_string()]),
        ),
    };

    Ok(pair)
}

/// Replace the nulls of `series` with the single value held by `value`.
///
/// `value` must have length 1 and the same dtype as `series`.
fn fill_nulls_with(series: &Series, value: &Series) -> Result<Series> {
    let fill = value.new_from_index(0, series.len());
    let present = series.is_not_null();
    Ok(series.zip_with(&present, &fill)?)
}

/// Most frequent non-missing value of a column and its frequency.
///
/// Values are sorted ascending before counting, so when several values tie
/// for the highest frequency the smallest one wins. Returns `None` for a
/// column with no present values. The mode is returned as a length-1 series
/// with the column's dtype.
pub fn column_mode(series: &Series) -> Result<Option<(Series, usize)>> {
    let present = series.drop_nulls();
    if present.is_empty() {
        return Ok(None);
    }

    let sorted = present.sort(SortOptions::default())?;

    let mut best_start = 0;
    let mut best_len = 0;
    let mut run_start = 0;
    let mut run_value = sorted.get(0)?;
    for i in 1..=sorted.len() {
        let next = if i < sorted.len() {
            Some(sorted.get(i)?)
        } else {
            None
        };
        if next.as_ref() != Some(&run_value) {
            let run_len = i - run_start;
            // Strictly greater: an equal run later in sort order never wins
            if run_len > best_len {
                best_start = run_start;
                best_len = run_len;
            }
            if let Some(value) = next {
                run_start = i;
                run_value = value;
            }
        }
    }

    Ok(Some((sorted.slice(best_start as i64, 1), best_len)))
}

/// Total number of missing cells in a dataset
pub fn count_missing_cells(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|c| c.null_count()).sum()
}

/// A missing value handling strategy
#[derive(Debug, Clone, PartialEq)]
pub enum MissingValueStrategy {
    Drop(DropMissingValues),
    Fill(FillMissingValues),
}

impl MissingValueStrategy {
    pub fn handle(&self, df: &DataFrame) -> Result<DataFrame> {
        match self {
            MissingValueStrategy::Drop(strategy) => strategy.handle(df),
            MissingValueStrategy::Fill(strategy) => strategy.handle(df),
        }
    }
}

impl fmt::Display for MissingValueStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingValueStrategy::Drop(s) => match s.threshold {
                Some(t) => write!(f, "drop {} (threshold {})", s.axis, t),
                None => write!(f, "drop {} (any missing)", s.axis),
            },
            MissingValueStrategy::Fill(s) => write!(f, "fill with {}", s.method),
        }
    }
}

impl From<DropMissingValues> for MissingValueStrategy {
    fn from(strategy: DropMissingValues) -> Self {
        MissingValueStrategy::Drop(strategy)
    }
}

impl From<FillMissingValues> for MissingValueStrategy {
    fn from(strategy: FillMissingValues) -> Self {
        MissingValueStrategy::Fill(strategy)
    }
}

/// Holds the current missing value strategy and forwards datasets to it
#[derive(Debug, Clone)]
pub struct MissingValueHandler {
    strategy: MissingValueStrategy,
}

impl MissingValueHandler {
    pub fn new(strategy: impl Into<MissingValueStrategy>) -> Self {
        Self {
            strategy: strategy.into(),
        }
    }

    /// Replace the strategy used by subsequent calls
    pub fn set_strategy(&mut self, strategy: impl Into<MissingValueStrategy>) {
        info!("Switching missing value handling strategy");
        self.strategy = strategy.into();
    }

    pub fn strategy(&self) -> &MissingValueStrategy {
        &self.strategy
    }

    pub fn handle_missing_values(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Executing missing value handling strategy: {}", self.strategy);
        self.strategy.handle(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_value_parse() {
        assert_eq!(FillValue::parse("TRUE"), FillValue::Bool(true));
        assert_eq!(FillValue::parse("42"), FillValue::Int(42));
        assert_eq!(FillValue::parse("2.5"), FillValue::Float(2.5));
        assert_eq!(
            FillValue::parse("unknown"),
            FillValue::Str("unknown".to_string())
        );
    }

    #[test]
    fn test_fill_method_parse() {
        assert_eq!(FillMethod::parse("Mean", None).unwrap(), FillMethod::Mean);
        assert_eq!(
            FillMethod::parse("interpolate", None).unwrap(),
            FillMethod::Unknown("interpolate".to_string())
        );
        assert!(matches!(
            FillMethod::parse("constant", None),
            Err(PrepError::MissingFillValue)
        ));
        assert_eq!(
            FillMethod::parse("constant", Some(FillValue::Int(0))).unwrap(),
            FillMethod::Constant(FillValue::Int(0))
        );
    }

    #[test]
    fn test_column_mode_tie_takes_smallest() {
        let s = Series::new("x".into(), &[Some(3i64), Some(1), Some(3), Some(1), None]);
        let (mode, freq) = column_mode(&s).unwrap().unwrap();
        assert_eq!(mode.get(0).unwrap(), AnyValue::Int64(1));
        assert_eq!(freq, 2);
    }

    #[test]
    fn test_column_mode_last_run_wins_when_longest() {
        let s = Series::new("x".into(), &["b", "a", "c", "c", "c"]);
        let (mode, freq) = column_mode(&s).unwrap().unwrap();
        assert_eq!(mode.get(0).unwrap(), AnyValue::String("c"));
        assert_eq!(freq, 3);
    }

    #[test]
    fn test_column_mode_all_missing() {
        let s = Series::new("x".into(), &[None::<f64>, None]);
        assert!(column_mode(&s).unwrap().is_none());
    }

    #[test]
    fn test_strategy_display() {
        let drop: MissingValueStrategy = DropMissingValues::new(Axis::Columns, Some(3)).into();
        assert_eq!(drop.to_string(), "drop columns (threshold 3)");
        let fill: MissingValueStrategy = FillMissingValues::new(FillMethod::Median).into();
        assert_eq!(fill.to_string(), "fill with median");
    }
}
