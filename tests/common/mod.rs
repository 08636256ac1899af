//! Shared test utilities and fixture generators
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;
use ::zip::write::SimpleFileOptions;
use ::zip::ZipWriter;

/// Small house-price CSV: 3 rows, `price` missing on the last row
pub const HOUSE_CSV: &str = "bedrooms,price\n2,100000\n3,200000\n4,\n";

/// Wider listing CSV with a text column and gaps in several columns
pub const LISTINGS_CSV: &str = "\
area,bedrooms,furnishing,price
7420,4,furnished,13300000
8960,,furnished,12250000
9960,3,semi-furnished,
7500,4,,12215000
7420,4,furnished,11410000
";

/// Same records as [`HOUSE_CSV`] in pandas `orient="records"` layout
pub const HOUSE_JSON: &str =
    r#"[{"bedrooms":2,"price":100000},{"bedrooms":3,"price":200000},{"bedrooms":4,"price":null}]"#;

/// House CSV using text markers for missing cells instead of empty fields
pub const HOUSE_NA_CSV: &str = "area,lot_frontage,price\n100,NA,1000\n200,60,2000\n300,80,NaN\n";

/// Listing workbook with one blank header cell and three missing cells:
///
/// | area | (blank) | furnishing     | price    |
/// |------|---------|----------------|----------|
/// | 7420 | 1       | furnished      | 13300000 |
/// | 8960 | 2       |                | NA       |
/// | 9960 |         | semi-furnished | 12250000 |
pub fn create_listings_xlsx() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    sheet.write_string(0, 0, "area").unwrap();
    sheet.write_string(0, 2, "furnishing").unwrap();
    sheet.write_string(0, 3, "price").unwrap();

    sheet.write_number(1, 0, 7420).unwrap();
    sheet.write_number(1, 1, 1).unwrap();
    sheet.write_string(1, 2, "furnished").unwrap();
    sheet.write_number(1, 3, 13300000).unwrap();

    sheet.write_number(2, 0, 8960).unwrap();
    sheet.write_number(2, 1, 2).unwrap();
    sheet.write_string(2, 3, "NA").unwrap();

    sheet.write_number(3, 0, 9960).unwrap();
    sheet.write_string(3, 2, "semi-furnished").unwrap();
    sheet.write_number(3, 3, 12250000).unwrap();

    workbook.save_to_buffer().unwrap()
}

/// A workbook whose only worksheet has no cells
pub fn create_empty_xlsx() -> Vec<u8> {
    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    workbook.save_to_buffer().unwrap()
}

/// Write a zip archive at `path` holding the given `(name, contents)` entries
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(contents).unwrap();
    }
    zip.finish().unwrap();
}

/// Create a temporary directory containing `name` as a zip of `entries`.
///
/// Returns the directory guard, the archive path and an extraction directory
/// inside the same temporary directory.
pub fn create_temp_zip(name: &str, entries: &[(&str, &[u8])]) -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join(name);
    write_zip(&archive, entries);
    let extract_dir = temp_dir.path().join("extracted_data");
    (temp_dir, archive, extract_dir)
}

/// The house dataset zipped as `data.zip`
pub fn create_house_zip() -> (TempDir, PathBuf, PathBuf) {
    create_temp_zip("data.zip", &[("house.csv", HOUSE_CSV.as_bytes())])
}

/// In-memory frame matching [`LISTINGS_CSV`]
pub fn create_listings_dataframe() -> DataFrame {
    df! {
        "area" => [7420i64, 8960, 9960, 7500, 7420],
        "bedrooms" => [Some(4i64), None, Some(3), Some(4), Some(4)],
        "furnishing" => [
            Some("furnished"),
            Some("furnished"),
            Some("semi-furnished"),
            None,
            Some("furnished"),
        ],
        "price" => [Some(13300000i64), Some(12250000), None, Some(12215000), Some(11410000)],
    }
    .unwrap()
}

/// A frame of `rows` rows with a float feature, an integer feature and a label
pub fn create_numeric_dataframe(rows: usize) -> DataFrame {
    let feature: Vec<f64> = (0..rows).map(|i| i as f64 * 1.5).collect();
    let rooms: Vec<i64> = (0..rows).map(|i| (i % 5) as i64 + 1).collect();
    let price: Vec<f64> = (0..rows).map(|i| 1000.0 + i as f64).collect();
    df! {
        "area" => feature,
        "rooms" => rooms,
        "price" => price,
    }
    .unwrap()
}

/// Read the `f64` values of a column, keeping missing entries as `None`
pub fn f64_values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

/// Assert the (rows, columns) shape of a frame
pub fn assert_shape(df: &DataFrame, rows: usize, cols: usize) {
    assert_eq!(
        df.shape(),
        (rows, cols),
        "expected {} rows × {} cols, got {:?}",
        rows,
        cols,
        df.shape()
    );
}
