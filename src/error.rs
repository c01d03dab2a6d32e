// src/error.rs

//! Error types for the rehash pass

use thiserror::Error;

use crate::hash::HashError;

/// Errors that can occur while rehashing and repropagating build output
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid hash, extension or filter configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A content container the matcher cannot rewrite
    #[error("Unsupported asset type '{kind}' in {file} while replacing '{token}'")]
    UnsupportedAssetType {
        file: String,
        token: String,
        kind: String,
    },

    /// A chunk lists a file that is not in the asset store
    #[error("Asset not found: {name}")]
    MissingAsset { name: String },

    /// Validation found files still referencing replaced hashes
    #[error("Stale hash references remain in: {}", files.join(", "))]
    StaleReference { files: Vec<String> },

    /// A written file does not embed the hash of its own content
    #[error("Output hash mismatch for {asset}: expected name to contain {expected}")]
    OutputHashMismatch { asset: String, expected: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl From<HashError> for Error {
    fn from(err: HashError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::Configuration(format!("invalid pattern: {}", err))
    }
}

/// Result type for rehash operations
pub type Result<T> = std::result::Result<T, Error>;
