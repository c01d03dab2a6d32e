// src/hash.rs

//! Content hashing for hashed output file names
//!
//! A build names its output files after a digest of their content, e.g.
//! `app.3f2a9c1b.js`. This module computes that digest with a configurable
//! algorithm, text encoding, truncation length and optional salt:
//!
//! | Algorithm | Crate | Output |
//! |-----------|-------|--------|
//! | MD5 | `md-5` | 128 bits |
//! | SHA-256 / SHA-512 | `sha2` | 256 / 512 bits |
//! | XXH64 / XXH128 | `xxhash-rust` (xxh3) | 64 / 128 bits |
//!
//! The full digest is encoded as hex or base64; the leading `length`
//! characters form the short hash embedded in file names.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use md5::Md5;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use xxhash_rust::xxh3::Xxh3;

/// Default short hash length, in encoded characters
pub const DEFAULT_HASH_LENGTH: usize = 20;

/// Hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// MD5 (128-bit), the usual bundler default
    #[default]
    Md5,
    /// SHA-256 (256-bit)
    Sha256,
    /// SHA-512 (512-bit)
    Sha512,
    /// XXH3 64-bit, non-cryptographic
    Xxh64,
    /// XXH3 128-bit, non-cryptographic
    Xxh128,
}

impl HashAlgorithm {
    /// Get the raw digest length in bytes
    #[inline]
    pub const fn output_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
            Self::Xxh64 => 8,
            Self::Xxh128 => 16,
        }
    }

    /// Get the algorithm name as a string
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Xxh64 => "xxh64",
            Self::Xxh128 => "xxh128",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "sha512" | "sha-512" => Ok(Self::Sha512),
            "xxh64" | "xxh3" => Ok(Self::Xxh64),
            "xxh128" | "xxhash" => Ok(Self::Xxh128),
            _ => Err(HashError::UnknownAlgorithm(s.to_string())),
        }
    }
}


/// Text encoding applied to the raw digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DigestEncoding {
    /// Lowercase hexadecimal
    #[default]
    Hex,
    /// Standard base64 with padding
    Base64,
    /// URL-safe base64 without padding
    Base64Url,
}

impl DigestEncoding {
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
        }
    }

    /// Length of `raw_len` encoded bytes, in characters
    pub const fn encoded_len(&self, raw_len: usize) -> usize {
        match self {
            Self::Hex => raw_len * 2,
            Self::Base64 => raw_len.div_ceil(3) * 4,
            Self::Base64Url => (raw_len * 4).div_ceil(3),
        }
    }

    fn encode(&self, raw: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode(raw),
            Self::Base64 => STANDARD.encode(raw),
            Self::Base64Url => URL_SAFE_NO_PAD.encode(raw),
        }
    }
}

impl fmt::Display for DigestEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DigestEncoding {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            "base64url" | "base64-url" => Ok(Self::Base64Url),
            _ => Err(HashError::UnknownEncoding(s.to_string())),
        }
    }
}


/// Hash configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("unknown digest encoding: {0}")]
    UnknownEncoding(String),

    /// Short length is zero or longer than the encoded digest
    #[error("invalid hash length {length}: must be between 1 and {max}")]
    InvalidLength { length: usize, max: usize },
}

/// How file-name hashes are computed
///
/// Loaded from the `[hash]` table of a [`RehashConfig`](crate::RehashConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashConfig {
    /// Digest function
    pub algorithm: HashAlgorithm,
    /// Text encoding of the digest
    pub encoding: DigestEncoding,
    /// Number of leading encoded characters used as the short hash
    pub length: usize,
    /// Bytes appended to the content before hashing
    pub salt: Option<Vec<u8>>,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            encoding: DigestEncoding::default(),
            length: DEFAULT_HASH_LENGTH,
            salt: None,
        }
    }
}

impl HashConfig {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    pub fn with_encoding(mut self, encoding: DigestEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// Length of the full encoded digest
    pub fn full_len(&self) -> usize {
        self.encoding.encoded_len(self.algorithm.output_len())
    }

    /// Check that the short length fits the encoded digest
    pub fn validate(&self) -> Result<(), HashError> {
        let max = self.full_len();
        if self.length == 0 || self.length > max {
            return Err(HashError::InvalidLength {
                length: self.length,
                max,
            });
        }
        Ok(())
    }

    /// Hash `content` (plus salt) with this configuration
    pub fn compute(&self, content: &[u8]) -> Result<HashOutput, HashError> {
        compute(content, self)
    }
}

/// Full and truncated digest of one piece of content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashOutput {
    /// Complete encoded digest
    pub full: String,
    /// Leading `length` characters of `full`, embedded in file names
    pub short: String,
}

impl fmt::Display for HashOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short)
    }
}

/// Incremental hasher for any supported algorithm
pub struct Hasher {
    algorithm: HashAlgorithm,
    state: HasherState,
}

enum HasherState {
    Md5(Md5),
    Sha256(Sha256),
    Sha512(Box<Sha512>),
    Xxh3(Box<Xxh3>),
}

impl Hasher {
    /// Create a new hasher with the specified algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let state = match algorithm {
            HashAlgorithm::Md5 => HasherState::Md5(Md5::new()),
            HashAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => HasherState::Sha512(Box::new(Sha512::new())),
            HashAlgorithm::Xxh64 | HashAlgorithm::Xxh128 => {
                HasherState::Xxh3(Box::new(Xxh3::new()))
            }
        };
        Self { algorithm, state }
    }

    /// Update the hasher with more data
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Md5(hasher) => hasher.update(data),
            HasherState::Sha256(hasher) => hasher.update(data),
            HasherState::Sha512(hasher) => hasher.update(data),
            HasherState::Xxh3(hasher) => hasher.update(data),
        }
    }

    /// Finalize and return the raw digest bytes
    pub fn finalize(self) -> Vec<u8> {
        match self.state {
            HasherState::Md5(hasher) => hasher.finalize().to_vec(),
            HasherState::Sha256(hasher) => hasher.finalize().to_vec(),
            HasherState::Sha512(hasher) => hasher.finalize().to_vec(),
            HasherState::Xxh3(hasher) => match self.algorithm {
                HashAlgorithm::Xxh64 => hasher.digest().to_be_bytes().to_vec(),
                _ => hasher.digest128().to_be_bytes().to_vec(),
            },
        }
    }

    /// Get the algorithm being used
    #[inline]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

/// Compute the full and short hash of `content` under `config`
///
/// The digest input is the content followed by the salt, if any.
pub fn compute(content: &[u8], config: &HashConfig) -> Result<HashOutput, HashError> {
    config.validate()?;

    let mut hasher = Hasher::new(config.algorithm);
    hasher.update(content);
    if let Some(salt) = &config.salt {
        hasher.update(salt);
    }

    let full = config.encoding.encode(&hasher.finalize());
    // Encoded digests are ASCII, so byte slicing is char slicing
    let short = full[..config.length].to_string();
    Ok(HashOutput { full, short })
}
