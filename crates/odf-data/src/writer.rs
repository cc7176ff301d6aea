//! JSON output for pipeline stages.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;
use tracing::debug;

use crate::loader::DataLoadError;

const INDENT: &[u8] = b"    ";

/// Serialize `value` as pretty JSON with four-space indentation.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write `value` to `path` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DataLoadError> {
    let text = to_json_string(value).map_err(|e| DataLoadError::Serialize {
        file: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, text)?;
    debug!(file = %path.display(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use odf_core::test_utils::*;
    use std::path::PathBuf;

    #[test]
    fn four_space_indent_and_key_order() {
        let s = store(&[("b.odf", labelled("CraftClass", "a")), ("a.odf", descriptor(&[]))]);
        let text = to_json_string(&s).unwrap();
        assert!(text.starts_with("{\n    \"b.odf\": {\n        \"CraftClass\": {\n"));
        assert!(text.find("b.odf").unwrap() < text.find("\"a.odf\"").unwrap());
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn write_json_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("odf_writer_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path: PathBuf = dir.join("nested").join("out.json");

        write_json(&path, &store(&[("tank.odf", descriptor(&[]))])).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n    \"tank.odf\": {}\n}\n");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
