use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use docdrift_engine::ComprehensiveScoreMatrix;

use crate::error::IoError;

/// SHA-256 of the file bytes as 64 lowercase hex digits.
pub fn fingerprint(path: &Path) -> Result<String, IoError> {
    let bytes = std::fs::read(path).map_err(|e| IoError::read(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Pretty JSON with a trailing newline. Parent directories are created.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IoError> {
    let write_err = |message: String| IoError::Write {
        path: path.to_path_buf(),
        message,
    };
    let mut json = serde_json::to_string_pretty(value).map_err(|e| write_err(e.to_string()))?;
    json.push('\n');
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
    }
    std::fs::write(path, json).map_err(|e| write_err(e.to_string()))
}

/// Read a comprehensive score matrix written by `score`.
pub fn read_matrix(path: &Path) -> Result<ComprehensiveScoreMatrix, IoError> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::read(path, e))?;
    serde_json::from_str(&text).map_err(|e| IoError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_of_known_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.csv");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            fingerprint(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn fingerprint_of_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = fingerprint(&dir.path().join("gone.csv")).unwrap_err();
        assert!(matches!(err, IoError::NotFound(_)));
    }

    #[test]
    fn write_json_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/artifact.json");
        write_json(&path, &serde_json::json!({ "ok": true })).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap()["ok"], true);
    }
}
