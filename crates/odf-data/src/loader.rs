//! Collection pipeline: reads per-file ODF records and combines them into a
//! single [`Store`].
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers used by the higher-level pipeline.

use indexmap::IndexMap;
use odf_core::{Descriptor, ResolveError, Store, normalize_identifier};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::clean::clean_descriptor;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading, resolving or writing ODF data.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The source path is not a directory.
    #[error("not a directory: {dir}")]
    NotADirectory { dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Writing an output file failed.
    #[error("serialization error in {file}: {detail}")]
    Serialize { file: PathBuf, detail: String },

    /// An identifier appeared more than once under `CollisionPolicy::Error`.
    #[error("duplicate identifier '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// Inheritance resolution hit malformed input.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Every file in `dir` with a supported extension, sorted by path.
/// Subdirectories and other files are skipped.
pub fn list_record_files(dir: &Path) -> Result<Vec<PathBuf>, DataLoadError> {
    if !dir.is_dir() {
        return Err(DataLoadError::NotADirectory {
            dir: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if detect_format(&path).is_err() {
            debug!(file = %path.display(), "skipping unsupported file");
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Json => serde_json::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Toml => toml::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
    }
}

/// Read a combined or resolved store written by an earlier stage.
pub fn read_store(path: &Path) -> Result<Store, DataLoadError> {
    deserialize_file(path)
}

// ===========================================================================
// Collection
// ===========================================================================

/// What to do when the same identifier is collected twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later record replaces the earlier one in place.
    #[default]
    LastWins,
    /// The first record is kept.
    FirstWins,
    /// Fail with [`DataLoadError::DuplicateName`].
    Error,
}

/// Options for [`collect_records`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectOptions {
    pub collision: CollisionPolicy,
    /// Strip one pair of wrapping double quotes from string values.
    pub strip_quotes: bool,
    /// Turn numeric-looking strings into numbers.
    pub coerce_numbers: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            collision: CollisionPolicy::LastWins,
            strip_quotes: true,
            coerce_numbers: false,
        }
    }
}

/// Check whether an identifier already exists in the store, returning a
/// `DuplicateName` error if so.
pub fn check_duplicate(store: &Store, name: &str, file: &Path) -> Result<(), DataLoadError> {
    if store.contains(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Scan `dir` for record files and combine them into one store.
///
/// Each file holds a mapping of identifier to descriptor. Identifiers are
/// normalized to lowercase with the `.odf` suffix. Files are read in sorted
/// order, so collisions resolve deterministically.
pub fn collect_records(dir: &Path, options: &CollectOptions) -> Result<Store, DataLoadError> {
    let mut store = Store::new();

    for file in list_record_files(dir)? {
        let records: IndexMap<String, Descriptor> = deserialize_file(&file)?;
        info!(file = %file.display(), objects = records.len(), "read record file");

        for (raw_id, mut descriptor) in records {
            let id = normalize_identifier(&raw_id);
            match options.collision {
                CollisionPolicy::LastWins => {}
                CollisionPolicy::FirstWins if store.contains(&id) => {
                    debug!(identifier = %id, file = %file.display(), "keeping first record");
                    continue;
                }
                CollisionPolicy::FirstWins => {}
                CollisionPolicy::Error => check_duplicate(&store, &id, &file)?,
            }
            clean_descriptor(&mut descriptor, options);
            store.insert(id, descriptor);
        }
    }

    info!(objects = store.len(), dir = %dir.display(), "collected records");
    Ok(store)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use odf_core::PropertyValue;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "odf_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("odf.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("odf.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("odf.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        assert!(matches!(
            detect_format(Path::new("tank.odf")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("tank")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // find_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_found_and_missing() {
        let dir = make_test_dir("find");
        assert_eq!(find_data_file(&dir, "odf").unwrap(), None);

        fs::write(dir.join("odf.toml"), "").unwrap();
        assert_eq!(find_data_file(&dir, "odf").unwrap(), Some(dir.join("odf.toml")));

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("odf.ron"), "()").unwrap();
        fs::write(dir.join("odf.json"), "{}").unwrap();

        assert!(matches!(
            find_data_file(&dir, "odf"),
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // list_record_files
    // -----------------------------------------------------------------------

    #[test]
    fn list_record_files_sorted_and_filtered() {
        let dir = make_test_dir("list");
        fs::write(dir.join("b.json"), "{}").unwrap();
        fs::write(dir.join("a.ron"), "{}").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::create_dir_all(dir.join("nested.json")).unwrap();

        let files = list_record_files(&dir).unwrap();
        assert_eq!(files, vec![dir.join("a.ron"), dir.join("b.json")]);

        cleanup(&dir);
    }

    #[test]
    fn list_record_files_rejects_non_directory() {
        let result = list_record_files(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(DataLoadError::NotADirectory { .. })));
    }

    // -----------------------------------------------------------------------
    // collect_records
    // -----------------------------------------------------------------------

    #[test]
    fn collect_normalizes_identifiers_and_strips_quotes() {
        let dir = make_test_dir("collect_norm");
        fs::write(
            dir.join("vehicles.json"),
            r#"{"IVTank": {"GameObjectClass": {"unitName": "\"Tank\"", "classLabel": "tank"}}}"#,
        )
        .unwrap();

        let store = collect_records(&dir, &CollectOptions::default()).unwrap();
        let tank = store.get("ivtank.odf").unwrap();
        assert_eq!(tank.property("GameObjectClass", "unitName"), Some(&PropertyValue::from("Tank")));

        cleanup(&dir);
    }

    #[test]
    fn collect_reads_ron_and_toml() {
        let dir = make_test_dir("collect_formats");
        fs::write(dir.join("a.ron"), r#"{"scout.odf": {"CraftClass": {"speed": 40}}}"#).unwrap();
        fs::write(
            dir.join("b.toml"),
            "[\"gun.odf\".WeaponClass]\nordName = \"shell\"\n",
        )
        .unwrap();

        let store = collect_records(&dir, &CollectOptions::default()).unwrap();
        assert_eq!(store.get("scout.odf").unwrap().property("CraftClass", "speed"), Some(&PropertyValue::Integer(40)));
        assert_eq!(store.get("gun.odf").unwrap().property("WeaponClass", "ordName"), Some(&PropertyValue::from("shell")));

        cleanup(&dir);
    }

    #[test]
    fn collect_last_wins_by_default() {
        let dir = make_test_dir("collect_last");
        fs::write(dir.join("1.json"), r#"{"tank.odf": {"A": {"v": 1}}, "other.odf": {}}"#).unwrap();
        fs::write(dir.join("2.json"), r#"{"TANK": {"A": {"v": 2}}}"#).unwrap();

        let store = collect_records(&dir, &CollectOptions::default()).unwrap();
        assert_eq!(store.get("tank.odf").unwrap().property("A", "v"), Some(&PropertyValue::Integer(2)));
        // replaced records keep their first position
        assert_eq!(store.identifiers().collect::<Vec<_>>(), vec!["tank.odf", "other.odf"]);

        cleanup(&dir);
    }

    #[test]
    fn collect_first_wins() {
        let dir = make_test_dir("collect_first");
        fs::write(dir.join("1.json"), r#"{"tank.odf": {"A": {"v": 1}}}"#).unwrap();
        fs::write(dir.join("2.json"), r#"{"tank.odf": {"A": {"v": 2}}}"#).unwrap();

        let options = CollectOptions {
            collision: CollisionPolicy::FirstWins,
            ..CollectOptions::default()
        };
        let store = collect_records(&dir, &options).unwrap();
        assert_eq!(store.get("tank.odf").unwrap().property("A", "v"), Some(&PropertyValue::Integer(1)));

        cleanup(&dir);
    }

    #[test]
    fn collect_duplicate_is_error_when_asked() {
        let dir = make_test_dir("collect_dup");
        fs::write(dir.join("1.json"), r#"{"tank.odf": {}}"#).unwrap();
        fs::write(dir.join("2.json"), r#"{"Tank.ODF": {}}"#).unwrap();

        let options = CollectOptions {
            collision: CollisionPolicy::Error,
            ..CollectOptions::default()
        };
        let result = collect_records(&dir, &options);
        assert!(matches!(
            result,
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "tank.odf"
        ));

        cleanup(&dir);
    }

    #[test]
    fn collect_malformed_section_is_parse_error() {
        let dir = make_test_dir("collect_malformed");
        fs::write(dir.join("bad.json"), r#"{"tank.odf": {"GameObjectClass": [1, 2]}}"#).unwrap();

        let result = collect_records(&dir, &CollectOptions::default());
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Error display / conversion
    // -----------------------------------------------------------------------

    #[test]
    fn error_display_messages() {
        let e = DataLoadError::DuplicateName {
            file: PathBuf::from("weapons.json"),
            name: "gstab.odf".to_string(),
        };
        assert!(format!("{e}").contains("gstab.odf"));

        let e = DataLoadError::Parse {
            file: PathBuf::from("bad.json"),
            detail: "syntax error".to_string(),
        };
        assert!(format!("{e}").contains("bad.json"));
        assert!(format!("{e}").contains("syntax error"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let data_err: DataLoadError = io_err.into();
        assert!(matches!(data_err, DataLoadError::Io(_)));
        assert!(format!("{data_err}").contains("file not found"));
    }
}
