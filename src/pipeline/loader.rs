//! Dataset loader for zip archives containing a single tabular file

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{debug, info, warn};
use ::zip::ZipArchive;

use crate::error::{PrepError, Result};
use crate::pipeline::tabular::{read_tabular_file_with, TabularFormat, TabularReadOptions};

/// Directory archives are extracted into, relative to the working directory
pub const DEFAULT_EXTRACT_DIR: &str = "extracted_data";

/// Loader for `.zip` archives.
///
/// Extracts the archive into `extract_dir`, then parses the one supported
/// tabular file it contained. Re-running on the same archive overwrites the
/// previously extracted files.
#[derive(Debug, Clone)]
pub struct ZipDatasetLoader {
    pub extract_dir: PathBuf,
    pub read_options: TabularReadOptions,
}

impl Default for ZipDatasetLoader {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACT_DIR)
    }
}

impl ZipDatasetLoader {
    pub fn new(extract_dir: impl Into<PathBuf>) -> Self {
        Self {
            extract_dir: extract_dir.into(),
            read_options: TabularReadOptions::default(),
        }
    }

    pub fn with_read_options(mut self, read_options: TabularReadOptions) -> Self {
        self.read_options = read_options;
        self
    }

    /// Extract a zip archive and load its single supported file
    pub fn load(&self, path: &Path) -> Result<DataFrame> {
        if normalize_extension(&path_extension(path)) != "zip" {
            return Err(PrepError::UnsupportedContainerFormat {
                path: path.to_path_buf(),
            });
        }

        info!(
            "Extracting {} into {}",
            path.display(),
            self.extract_dir.display()
        );
        let extracted = self.extract(path)?;

        let data_file = select_supported_file(&self.extract_dir, &extracted)?;
        info!("Loading {}", data_file.display());

        let df = read_tabular_file_with(&data_file, &self.read_options)?;
        let (rows, cols) = df.shape();
        info!("Loaded dataset with {} rows and {} columns", rows, cols);

        Ok(df)
    }

    /// Extract every entry, returning the extracted file paths.
    ///
    /// Existing files are truncated and rewritten. Entries whose names
    /// resolve outside the extraction directory are skipped.
    fn extract(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        fs::create_dir_all(&self.extract_dir)?;

        let mut extracted = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;

            let Some(relative) = entry.enclosed_name() else {
                warn!("Skipping archive entry with unsafe path: {}", entry.name());
                continue;
            };
            let out_path = self.extract_dir.join(&relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)?;
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&out_path)?;
            io::copy(&mut entry, &mut out)?;
            debug!("Extracted {}", out_path.display());

            extracted.push(out_path);
        }

        Ok(extracted)
    }
}

/// Loader implementations, keyed by container format
#[derive(Debug, Clone)]
pub enum DatasetLoader {
    Zip(ZipDatasetLoader),
}

impl DatasetLoader {
    pub fn with_read_options(self, read_options: TabularReadOptions) -> Self {
        match self {
            DatasetLoader::Zip(loader) => {
                DatasetLoader::Zip(loader.with_read_options(read_options))
            }
        }
    }

    pub fn load(&self, path: &Path) -> Result<DataFrame> {
        match self {
            DatasetLoader::Zip(loader) => loader.load(path),
        }
    }
}

/// Selects a loader implementation by container extension
pub struct LoaderFactory;

impl LoaderFactory {
    /// Get a loader for an extension such as `.zip` (leading dot optional)
    pub fn get_data_loader(extension: &str) -> Result<DatasetLoader> {
        Self::get_data_loader_in(extension, DEFAULT_EXTRACT_DIR)
    }

    /// Get a loader that extracts into a specific directory
    pub fn get_data_loader_in(
        extension: &str,
        extract_dir: impl Into<PathBuf>,
    ) -> Result<DatasetLoader> {
        match normalize_extension(extension).as_str() {
            "zip" => Ok(DatasetLoader::Zip(ZipDatasetLoader::new(extract_dir))),
            _ => Err(PrepError::NoLoaderAvailable {
                extension: extension.to_string(),
            }),
        }
    }
}

/// Load a dataset archive, choosing the loader from the path's extension
pub fn load_dataset(path: &Path, extract_dir: &Path) -> Result<DataFrame> {
    let extension = path_extension(path);
    let loader = LoaderFactory::get_data_loader_in(&extension, extract_dir)?;
    loader.load(path)
}

/// Get column names of a loaded dataset
pub fn get_column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn path_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

/// macOS archive metadata (`__MACOSX/`, `._name`) is never a dataset
fn is_archive_metadata(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == "__MACOSX")
        || path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("._"))
}

/// Pick the single supported file among the extracted ones
fn select_supported_file(extract_dir: &Path, extracted: &[PathBuf]) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = extracted
        .iter()
        .filter(|p| !is_archive_metadata(p))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| {
                    TabularFormat::SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str())
                })
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(PrepError::NoSupportedFileFound {
            dir: extract_dir.to_path_buf(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => Err(PrepError::AmbiguousFileSelection { candidates }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".ZIP"), "zip");
        assert_eq!(normalize_extension("zip"), "zip");
        assert_eq!(normalize_extension(""), "");
    }

    #[test]
    fn test_archive_metadata_is_ignored() {
        assert!(is_archive_metadata(Path::new("out/__MACOSX/house.csv")));
        assert!(is_archive_metadata(Path::new("out/._house.csv")));
        assert!(!is_archive_metadata(Path::new("out/house.csv")));
    }

    #[test]
    fn test_select_single_candidate() {
        let files = vec![PathBuf::from("out/readme.txt"), PathBuf::from("out/house.CSV")];
        let selected = select_supported_file(Path::new("out"), &files).unwrap();
        assert_eq!(selected, PathBuf::from("out/house.CSV"));
    }

    #[test]
    fn test_select_reports_ambiguity_sorted() {
        let files = vec![PathBuf::from("out/b.json"), PathBuf::from("out/a.csv")];
        match select_supported_file(Path::new("out"), &files) {
            Err(PrepError::AmbiguousFileSelection { candidates }) => {
                assert_eq!(
                    candidates,
                    vec![PathBuf::from("out/a.csv"), PathBuf::from("out/b.json")]
                );
            }
            other => panic!("expected AmbiguousFileSelection, got {:?}", other),
        }
    }

    #[test]
    fn test_factory_rejects_unknown_extension() {
        let result = LoaderFactory::get_data_loader(".rar");
        assert!(matches!(
            result,
            Err(PrepError::NoLoaderAvailable { ref extension }) if extension == ".rar"
        ));
    }
}
