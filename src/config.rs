// src/config.rs

//! Configuration for the rehash pass
//!
//! # Example rehash.toml
//!
//! ```toml
//! [hash]
//! function = "md5"
//! digest = "hex"
//! length = 20
//!
//! [output]
//! # Files with these extensions are renamed after their content hash
//! primary_extensions = [".js", ".css"]
//!
//! # Secondary files matching this pattern receive rewritten references
//! include = "\\.map$"
//!
//! # enforce | report | off
//! validation = "enforce"
//! ```
//!
//! Every field is optional; defaults match a stock bundler setup.

use crate::error::{Error, Result};
use crate::hash::{HashConfig, HashError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// Inclusion pattern that matches every file
pub const MATCH_ALL: &str = "^.*$";

static MATCH_ALL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(MATCH_ALL).unwrap());

/// Complete pass configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RehashConfig {
    pub hash: HashConfig,
    pub output: OutputConfig,
}

impl RehashConfig {
    /// Parse and validate a TOML configuration
    ///
    /// Unknown hash functions or digest encodings are configuration errors,
    /// not parse errors.
    pub fn parse(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let config = Self {
            hash: file.hash.resolve()?,
            output: file.output,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Serialize the configuration back to TOML
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        let file = ConfigFile {
            hash: HashSection::from(&self.hash),
            output: self.output.clone(),
        };
        toml::to_string_pretty(&file)
    }

    /// Check every setting before the pass touches any output
    pub fn validate(&self) -> Result<()> {
        self.hash.validate()?;

        if self.output.primary_extensions.is_empty() {
            return Err(Error::Configuration(
                "primary_extensions must not be empty".to_string(),
            ));
        }
        if let Some(ext) = self
            .output
            .primary_extensions
            .iter()
            .find(|ext| ext.is_empty())
        {
            return Err(Error::Configuration(format!(
                "invalid primary extension '{}'",
                ext
            )));
        }

        InclusionFilter::new(&self.output.include)?;
        Ok(())
    }
}

/// On-disk layout of [`RehashConfig`]
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    hash: HashSection,
    output: OutputConfig,
}

/// `[hash]` table, with names kept as strings until they are resolved
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct HashSection {
    function: String,
    digest: String,
    length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    salt: Option<String>,
}

impl Default for HashSection {
    fn default() -> Self {
        Self::from(&HashConfig::default())
    }
}

impl From<&HashConfig> for HashSection {
    fn from(config: &HashConfig) -> Self {
        Self {
            function: config.algorithm.name().to_string(),
            digest: config.encoding.name().to_string(),
            length: config.length,
            // TOML strings are UTF-8; binary salts are only settable in code
            salt: config
                .salt
                .as_deref()
                .map(|salt| String::from_utf8_lossy(salt).into_owned()),
        }
    }
}

impl HashSection {
    fn resolve(self) -> std::result::Result<HashConfig, HashError> {
        Ok(HashConfig {
            algorithm: self.function.parse()?,
            encoding: self.digest.parse()?,
            length: self.length,
            salt: self.salt.map(String::into_bytes),
        })
    }
}

/// Output file handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Extensions of primary (renamed) files
    pub primary_extensions: Vec<String>,

    /// Regex selecting which secondary files are rewritten and validated
    pub include: String,

    /// Post-pass stale reference check
    pub validation: ValidationMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            primary_extensions: vec![".js".to_string(), ".css".to_string()],
            include: MATCH_ALL.to_string(),
            validation: ValidationMode::default(),
        }
    }
}

impl OutputConfig {
    /// Whether `name` is a primary output file
    pub fn is_primary(&self, name: &str) -> bool {
        self.primary_extensions
            .iter()
            .any(|ext| name.ends_with(ext.as_str()))
    }
}

/// What to do when stale hash references survive the pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Fail the pass
    #[default]
    Enforce,
    /// Log and list stale files in the report
    Report,
    /// Skip the scan
    Off,
}

impl From<bool> for ValidationMode {
    fn from(validate: bool) -> Self {
        if validate { Self::Enforce } else { Self::Off }
    }
}

/// Compiled inclusion pattern for secondary files
#[derive(Debug, Clone)]
pub struct InclusionFilter {
    pattern: Regex,
}

impl InclusionFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::Configuration(format!("invalid include pattern '{}': {}", pattern, e)))?;
        Ok(Self { pattern })
    }

    /// Filter that accepts every file name
    pub fn all() -> Self {
        Self {
            pattern: MATCH_ALL_RE.clone(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for InclusionFilter {
    fn default() -> Self {
        Self::all()
    }
}
