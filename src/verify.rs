// src/verify.rs

//! Integrity check for written output files
//!
//! After the rehashed output is written, each hashed file's name should
//! embed the short hash of its bytes on disk. This check is separate from
//! the in-memory pass and only reads files.

use crate::error::{Error, Result};
use crate::hash::HashConfig;
use std::path::Path;
use tracing::debug;

/// Check that the file at `path` embeds the short hash of its content
pub fn verify_output_file(path: &Path, config: &HashConfig) -> Result<()> {
    let content = std::fs::read(path)?;
    let expected = config.compute(&content)?.short;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if name.contains(&expected) {
        debug!("Verified {} ({})", name, expected);
        Ok(())
    } else {
        Err(Error::OutputHashMismatch {
            asset: name,
            expected,
        })
    }
}

/// Check each of `names` under `dir`, collecting every failure
///
/// Returns the failed file names with their errors; an empty list means
/// every file passed.
pub fn verify_output_files<'a, I>(dir: &Path, names: I, config: &HashConfig) -> Vec<(String, Error)>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter_map(|name| {
            verify_output_file(&dir.join(name), config)
                .err()
                .map(|e| (name.to_string(), e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgorithm;
    use tempfile::TempDir;

    fn config() -> HashConfig {
        HashConfig::new(HashAlgorithm::Sha256).with_length(8)
    }

    #[test]
    fn test_verify_matching_file() {
        let dir = TempDir::new().unwrap();
        let short = config().compute(b"body{}").unwrap().short;
        let path = dir.path().join(format!("style.{}.css", short));
        std::fs::write(&path, b"body{}").unwrap();

        assert!(verify_output_file(&path, &config()).is_ok());
    }

    #[test]
    fn test_verify_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("style.00000000.css");
        std::fs::write(&path, b"body{}").unwrap();

        let err = verify_output_file(&path, &config()).unwrap_err();
        match err {
            Error::OutputHashMismatch { asset, expected } => {
                assert_eq!(asset, "style.00000000.css");
                assert_eq!(expected, config().compute(b"body{}").unwrap().short);
            }
            other => panic!("expected OutputHashMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = verify_output_file(&dir.path().join("nope.js"), &config()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_verify_many() {
        let dir = TempDir::new().unwrap();
        let short = config().compute(b"a").unwrap().short;
        let good = format!("a.{}.js", short);
        std::fs::write(dir.path().join(&good), b"a").unwrap();
        std::fs::write(dir.path().join("b.deadbeef.js"), b"b").unwrap();

        let failures = verify_output_files(dir.path(), [good.as_str(), "b.deadbeef.js"], &config());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "b.deadbeef.js");
    }
}
