//! Tests for archive extraction and tabular file loading

mod common;

use common::*;
use polars::prelude::*;
use pricewise::error::PrepError;
use pricewise::pipeline::{
    count_missing_cells, get_column_names, load_dataset, read_tabular_file, DatasetLoader,
    FillMethod, FillMissingValues, LoaderFactory, ZipDatasetLoader,
};
use tempfile::TempDir;

#[test]
fn test_load_csv_from_zip() {
    let (_dir, archive, extract_dir) = create_house_zip();

    let df = ZipDatasetLoader::new(&extract_dir).load(&archive).unwrap();

    assert_shape(&df, 3, 2);
    assert_eq!(get_column_names(&df), vec!["bedrooms", "price"]);
    assert_eq!(df.column("price").unwrap().null_count(), 1);
    assert!(extract_dir.join("house.csv").exists());
}

#[test]
fn test_repeated_load_overwrites_extracted_files() {
    let (_dir, archive, extract_dir) = create_house_zip();
    let loader = ZipDatasetLoader::new(&extract_dir);

    let first = loader.load(&archive).unwrap();
    let second = loader.load(&archive).unwrap();

    assert!(first.equals_missing(&second));
}

#[test]
fn test_load_json_records_from_zip() {
    let (_dir, archive, extract_dir) =
        create_temp_zip("data.zip", &[("house.json", HOUSE_JSON.as_bytes())]);

    let df = load_dataset(&archive, &extract_dir).unwrap();

    assert_shape(&df, 3, 2);
    assert_eq!(
        f64_values(&df, "bedrooms"),
        vec![Some(2.0), Some(3.0), Some(4.0)]
    );
    assert_eq!(df.column("price").unwrap().null_count(), 1);
}

#[test]
fn test_load_file_in_nested_directory() {
    let (_dir, archive, extract_dir) =
        create_temp_zip("data.zip", &[("raw/2024/house.csv", HOUSE_CSV.as_bytes())]);

    let df = load_dataset(&archive, &extract_dir).unwrap();

    assert_shape(&df, 3, 2);
    assert!(extract_dir.join("raw/2024/house.csv").exists());
}

#[test]
fn test_uppercase_extensions_are_supported() {
    let (_dir, archive, extract_dir) =
        create_temp_zip("DATA.ZIP", &[("HOUSE.CSV", HOUSE_CSV.as_bytes())]);

    let df = load_dataset(&archive, &extract_dir).unwrap();
    assert_shape(&df, 3, 2);
}

#[test]
fn test_non_zip_path_is_rejected_by_zip_loader() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.tar");
    std::fs::write(&path, b"not an archive").unwrap();

    let result = ZipDatasetLoader::new(temp_dir.path().join("out")).load(&path);

    assert!(matches!(
        result,
        Err(PrepError::UnsupportedContainerFormat { .. })
    ));
}

#[test]
fn test_archive_without_supported_file() {
    let (_dir, archive, extract_dir) =
        create_temp_zip("data.zip", &[("readme.txt", b"nothing to see".as_slice())]);

    let result = load_dataset(&archive, &extract_dir);

    assert!(matches!(result, Err(PrepError::NoSupportedFileFound { .. })));
}

#[test]
fn test_archive_with_two_supported_files_is_ambiguous() {
    let (_dir, archive, extract_dir) = create_temp_zip(
        "data.zip",
        &[
            ("train.csv", HOUSE_CSV.as_bytes()),
            ("extra.json", HOUSE_JSON.as_bytes()),
        ],
    );

    match load_dataset(&archive, &extract_dir) {
        Err(PrepError::AmbiguousFileSelection { candidates }) => {
            assert_eq!(candidates.len(), 2);
            assert!(candidates[0].ends_with("extra.json"));
            assert!(candidates[1].ends_with("train.csv"));
        }
        other => panic!("expected AmbiguousFileSelection, got {:?}", other),
    }
}

#[test]
fn test_macos_metadata_entries_are_ignored() {
    let (_dir, archive, extract_dir) = create_temp_zip(
        "data.zip",
        &[
            ("house.csv", HOUSE_CSV.as_bytes()),
            ("__MACOSX/._house.csv", b"\x00\x05\x16\x07".as_slice()),
        ],
    );

    let df = load_dataset(&archive, &extract_dir).unwrap();
    assert_shape(&df, 3, 2);
}

#[test]
fn test_stale_files_in_extract_dir_are_not_considered() {
    let (_dir, archive, extract_dir) = create_house_zip();
    std::fs::create_dir_all(&extract_dir).unwrap();
    std::fs::write(extract_dir.join("old.csv"), "a,b\n1,2\n").unwrap();

    let df = load_dataset(&archive, &extract_dir).unwrap();
    assert_eq!(get_column_names(&df), vec!["bedrooms", "price"]);
}

#[test]
fn test_missing_archive_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = load_dataset(
        &temp_dir.path().join("absent.zip"),
        &temp_dir.path().join("out"),
    );

    let err = result.unwrap_err();
    assert!(matches!(err, PrepError::Io(_)));
    assert_eq!(err.error_code(), "IO_ERROR");
}

#[test]
fn test_corrupt_archive_is_archive_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.zip");
    std::fs::write(&path, b"definitely not a zip file").unwrap();

    let result = load_dataset(&path, &temp_dir.path().join("out"));
    assert!(matches!(result, Err(PrepError::Archive(_))));
}

#[test]
fn test_factory_selects_zip_loader() {
    for ext in [".zip", "zip", ".ZIP"] {
        let loader = LoaderFactory::get_data_loader(ext).unwrap();
        assert!(matches!(loader, DatasetLoader::Zip(_)), "extension {}", ext);
    }
}

#[test]
fn test_factory_unknown_extension() {
    let err = LoaderFactory::get_data_loader(".7z").unwrap_err();
    assert_eq!(err.error_code(), "NO_LOADER_AVAILABLE");
    assert!(err.to_string().contains(".7z"));
}

#[test]
fn test_factory_loader_uses_given_extract_dir() {
    let (_dir, archive, extract_dir) = create_house_zip();

    let loader = LoaderFactory::get_data_loader_in("zip", &extract_dir).unwrap();
    loader.load(&archive).unwrap();

    assert!(extract_dir.join("house.csv").exists());
}

#[test]
fn test_read_plain_csv_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("listings.csv");
    std::fs::write(&path, LISTINGS_CSV).unwrap();

    let df = read_tabular_file(&path).unwrap();

    assert_shape(&df, 5, 4);
    assert_eq!(df.column("furnishing").unwrap().dtype(), &DataType::String);
    assert_eq!(df.column("bedrooms").unwrap().null_count(), 1);
}

#[test]
fn test_read_unsupported_tabular_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.parquet");
    std::fs::write(&path, b"PAR1").unwrap();

    assert!(matches!(
        read_tabular_file(&path),
        Err(PrepError::UnsupportedTabularFormat { .. })
    ));
}

#[test]
fn test_csv_missing_markers_are_read_as_missing() {
    let (_dir, archive, extract_dir) =
        create_temp_zip("data.zip", &[("house.csv", HOUSE_NA_CSV.as_bytes())]);

    let df = load_dataset(&archive, &extract_dir).unwrap();

    assert_shape(&df, 3, 3);
    assert!(df.column("lot_frontage").unwrap().dtype().is_primitive_numeric());
    assert!(df.column("price").unwrap().dtype().is_primitive_numeric());
    assert_eq!(count_missing_cells(&df), 2);

    let filled = FillMissingValues::new(FillMethod::Mean).handle(&df).unwrap();
    assert_eq!(
        f64_values(&filled, "lot_frontage"),
        vec![Some(70.0), Some(60.0), Some(80.0)]
    );
    assert_eq!(
        f64_values(&filled, "price"),
        vec![Some(1000.0), Some(2000.0), Some(1500.0)]
    );
}

#[test]
fn test_csv_float_nan_is_missing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("areas.csv");
    std::fs::write(&path, "area,price\n1.5,nan\n2.5,3.25\n-nan,4.0\n").unwrap();

    let df = read_tabular_file(&path).unwrap();

    assert_eq!(df.column("area").unwrap().dtype(), &DataType::Float64);
    assert_eq!(f64_values(&df, "area"), vec![Some(1.5), Some(2.5), None]);
    assert_eq!(f64_values(&df, "price"), vec![None, Some(3.25), Some(4.0)]);
}

#[test]
fn test_load_xlsx_from_zip() {
    let workbook = create_listings_xlsx();
    let (_dir, archive, extract_dir) =
        create_temp_zip("data.zip", &[("listings.xlsx", workbook.as_slice())]);

    let df = load_dataset(&archive, &extract_dir).unwrap();

    assert_shape(&df, 3, 4);
    assert_eq!(
        get_column_names(&df),
        vec!["area", "column_1", "furnishing", "price"]
    );
    assert_eq!(df.column("area").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("column_1").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("furnishing").unwrap().dtype(), &DataType::String);
    assert_eq!(df.column("price").unwrap().dtype(), &DataType::Int64);

    assert_eq!(df.column("column_1").unwrap().null_count(), 1);
    assert_eq!(df.column("furnishing").unwrap().null_count(), 1);
    assert_eq!(df.column("price").unwrap().null_count(), 1);
    assert_eq!(
        f64_values(&df, "area"),
        vec![Some(7420.0), Some(8960.0), Some(9960.0)]
    );
}

#[test]
fn test_read_empty_worksheet() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.xlsx");
    std::fs::write(&path, create_empty_xlsx()).unwrap();

    match read_tabular_file(&path) {
        Err(PrepError::EmptyWorksheet { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected EmptyWorksheet, got {:?}", other),
    }
}
