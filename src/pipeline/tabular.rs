//! Tabular file readers (CSV, JSON records, XLSX/XLS)

use std::fs::File;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use tracing::debug;

use crate::error::{PrepError, Result};

/// Default number of rows used for CSV schema inference
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 10_000;

/// Cell texts read as missing values, in CSV fields and spreadsheet cells
pub const MISSING_VALUE_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True when a cell text is one of [`MISSING_VALUE_TOKENS`]
pub fn is_missing_token(text: &str) -> bool {
    MISSING_VALUE_TOKENS.contains(&text)
}

/// Tabular file formats with a registered parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Json,
    Spreadsheet,
}

impl TabularFormat {
    /// Every extension the loader looks for inside an archive
    pub const SUPPORTED_EXTENSIONS: [&'static str; 4] = ["csv", "json", "xlsx", "xls"];

    /// Resolve a format from a file extension (case-insensitive, no leading dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Resolve a format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Options for parsing tabular files
#[derive(Debug, Clone, Copy)]
pub struct TabularReadOptions {
    /// Number of rows to use for CSV schema inference (0 = full scan)
    pub infer_schema_length: usize,
}

impl Default for TabularReadOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

/// Parse a tabular file into a DataFrame, choosing the parser by extension
pub fn read_tabular_file(path: &Path) -> Result<DataFrame> {
    read_tabular_file_with(path, &TabularReadOptions::default())
}

/// Parse a tabular file with explicit read options
pub fn read_tabular_file_with(path: &Path, options: &TabularReadOptions) -> Result<DataFrame> {
    let format = TabularFormat::from_path(path).ok_or_else(|| PrepError::UnsupportedTabularFormat {
        path: path.to_path_buf(),
    })?;

    debug!("Parsing {} as {:?}", path.display(), format);

    let df = match format {
        TabularFormat::Csv => read_csv(path, options.infer_schema_length)?,
        TabularFormat::Json => read_json_records(path)?,
        TabularFormat::Spreadsheet => read_spreadsheet(path)?,
    };

    nan_to_null(&df)
}

fn read_csv(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let null_values = NullValues::AllColumns(
        MISSING_VALUE_TOKENS
            .iter()
            .map(|token| PlSmallStr::from(*token))
            .collect(),
    );

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(schema_length)
        .map_parse_options(move |opts| opts.with_null_values(Some(null_values.clone())))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(df)
}

/// Float NaN counts as missing: replace it with null in every float column
fn nan_to_null(df: &DataFrame) -> Result<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|column| {
            let series = column.as_materialized_series();
            let name = series.name().clone();
            let cleaned: Column = match series.dtype() {
                DataType::Float64 => series
                    .f64()?
                    .into_iter()
                    .map(|v| v.filter(|x| !x.is_nan()))
                    .collect::<Float64Chunked>()
                    .with_name(name)
                    .into_series()
                    .into(),
                DataType::Float32 => series
                    .f32()?
                    .into_iter()
                    .map(|v| v.filter(|x| !x.is_nan()))
                    .collect::<Float32Chunked>()
                    .with_name(name)
                    .into_series()
                    .into(),
                _ => column.clone(),
            };
            Ok(cleaned)
        })
        .collect::<Result<Vec<Column>>>()?;

    Ok(DataFrame::new(columns)?)
}

/// Reads a JSON array of record objects, e.g. `[{"a": 1}, {"a": 2}]`
fn read_json_records(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = JsonReader::new(file).finish()?;
    Ok(df)
}

/// Reads the first worksheet; the first row holds the column names.
fn read_spreadsheet(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(empty_worksheet(path)),
    };

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| empty_worksheet(path))?;
    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("column_{}", i),
            other => other.to_string(),
        })
        .collect();

    let mut cells: Vec<Vec<&Data>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (col_idx, cell) in row.iter().enumerate().take(names.len()) {
            cells[col_idx].push(cell);
        }
    }

    let columns = names
        .iter()
        .zip(cells.iter())
        .map(|(name, values)| spreadsheet_column(name, values))
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

fn empty_worksheet(path: &Path) -> PrepError {
    PrepError::EmptyWorksheet {
        path: PathBuf::from(path),
    }
}

/// Empty cells, cell errors (`#N/A`, `#DIV/0!`, ...) and missing-value
/// texts such as `NA` become missing values.
fn is_missing_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => is_missing_token(s),
        Data::Float(f) => f.is_nan(),
        _ => false,
    }
}

/// Infer a column type from its cells: Int64, Float64, Boolean, else String
fn spreadsheet_column(name: &str, cells: &[&Data]) -> Column {
    let present = || cells.iter().filter(|c| !is_missing_cell(c));

    let all_numeric = present().all(|c| matches!(c, Data::Int(_) | Data::Float(_)));
    let all_integral = present().all(|c| match c {
        Data::Int(_) => true,
        Data::Float(f) => f.fract() == 0.0 && f.abs() < i64::MAX as f64,
        _ => false,
    });
    let all_bool = present().all(|c| matches!(c, Data::Bool(_)));
    let has_values = present().next().is_some();

    let col_name: PlSmallStr = name.into();

    if has_values && all_integral {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                _ if is_missing_cell(c) => None,
                Data::Int(i) => Some(*i),
                Data::Float(f) => Some(*f as i64),
                _ => None,
            })
            .collect();
        Column::new(col_name, values)
    } else if all_numeric {
        // Also covers all-missing columns, which pandas reads as float NaN
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                _ if is_missing_cell(c) => None,
                Data::Int(i) => Some(*i as f64),
                Data::Float(f) => Some(*f),
                _ => None,
            })
            .collect();
        Column::new(col_name, values)
    } else if all_bool {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Data::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        Column::new(col_name, values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|c| {
                if is_missing_cell(c) {
                    None
                } else {
                    Some(c.to_string())
                }
            })
            .collect();
        Column::new(col_name, values)
    }
}
