// src/source.rs

//! Content containers for build output files
//!
//! A file's content is not always a flat buffer: bundlers compose output
//! from wrapped, cached and concatenated sources. [`Source`] models each of
//! these shapes as one variant, and every variant supports the same two
//! operations:
//!
//! - [`Source::replace`]: rewrite every literal occurrence of a token
//! - [`Source::contains`]: test for any occurrence of a [`TokenPattern`]
//!
//! Tokens are always literals. They are escaped before being compiled into
//! a search pattern, so characters like `+` or `.` in a base64 or dotted
//! hash never act as regex syntax.

use regex::bytes::{NoExpand as BytesNoExpand, Regex as BytesRegex};
use regex::{NoExpand, Regex};
use std::borrow::Cow;
use thiserror::Error;

/// Errors raised by content matching
#[derive(Error, Debug)]
pub enum SourceError {
    /// The container cannot be searched or rewritten
    #[error("unsupported asset type: {kind}")]
    Unsupported { kind: String },

    /// Token could not be compiled into a search pattern
    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// One or more literal tokens compiled into a single search pattern
#[derive(Debug, Clone)]
pub struct TokenPattern {
    tokens: Vec<String>,
    /// None when there is nothing to match
    compiled: Option<(Regex, BytesRegex)>,
}

impl TokenPattern {
    /// Build a pattern matching any of `tokens`
    ///
    /// Empty tokens are dropped; an empty string would match everywhere.
    pub fn new<I, S>(tokens: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t| !t.is_empty())
            .collect();
        // Longest first so a token that prefixes another never shadows it
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        tokens.dedup();

        if tokens.is_empty() {
            return Ok(Self {
                tokens,
                compiled: None,
            });
        }

        let union = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let compiled = Some((Regex::new(&union)?, BytesRegex::new(&union)?));

        Ok(Self { tokens, compiled })
    }

    /// Build a pattern for a single literal token
    pub fn literal(token: &str) -> Result<Self, regex::Error> {
        Self::new([token])
    }

    /// The tokens this pattern matches, longest first
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_none()
    }

    /// Whether any token occurs in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.as_ref().is_some_and(|(re, _)| re.is_match(text))
    }

    fn is_match_bytes(&self, bytes: &[u8]) -> bool {
        self.compiled
            .as_ref()
            .is_some_and(|(_, re)| re.is_match(bytes))
    }

    fn replace_text(&self, text: String, replacement: &str) -> String {
        match &self.compiled {
            Some((re, _)) => re.replace_all(&text, NoExpand(replacement)).into_owned(),
            None => text,
        }
    }

    fn replace_bytes(&self, bytes: Vec<u8>, replacement: &str) -> Vec<u8> {
        match &self.compiled {
            Some((_, re)) => re
                .replace_all(&bytes, BytesNoExpand(replacement.as_bytes()))
                .into_owned(),
            None => bytes,
        }
    }
}

/// Content of one output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Text buffer
    Raw(String),
    /// Byte buffer, matched byte-wise
    Buffer(Vec<u8>),
    /// Inner source rendered after a text prefix
    Prefixed { prefix: String, inner: Box<Source> },
    /// Inner source with an optional cached rendering
    Cached {
        inner: Box<Source>,
        cache: Option<Vec<u8>>,
    },
    /// Children rendered in order
    Concat(Vec<Source>),
    /// Content from a producer that cannot be rewritten
    Foreign { kind: String, bytes: Vec<u8> },
}

impl Source {
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    pub fn prefixed(prefix: impl Into<String>, inner: Source) -> Self {
        Self::Prefixed {
            prefix: prefix.into(),
            inner: Box::new(inner),
        }
    }

    /// Wrap `inner` and cache its current rendering
    pub fn cached(inner: Source) -> Self {
        let cache = Some(inner.bytes().into_owned());
        Self::Cached {
            inner: Box::new(inner),
            cache,
        }
    }

    pub fn concat(children: Vec<Source>) -> Self {
        Self::Concat(children)
    }

    pub fn foreign(kind: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Foreign {
            kind: kind.into(),
            bytes: bytes.into(),
        }
    }

    /// Name of the container shape, for diagnostics
    pub fn kind(&self) -> &str {
        match self {
            Self::Raw(_) => "raw",
            Self::Buffer(_) => "buffer",
            Self::Prefixed { .. } => "prefixed",
            Self::Cached { .. } => "cached",
            Self::Concat(_) => "concat",
            Self::Foreign { kind, .. } => kind,
        }
    }

    /// Render the full content
    pub fn bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Self::Raw(text) => Cow::Borrowed(text.as_bytes()),
            Self::Buffer(bytes) | Self::Foreign { bytes, .. } => Cow::Borrowed(bytes.as_slice()),
            Self::Prefixed { prefix, inner } => {
                let mut out = prefix.as_bytes().to_vec();
                out.extend_from_slice(&inner.bytes());
                Cow::Owned(out)
            }
            Self::Cached {
                cache: Some(cache), ..
            } => Cow::Borrowed(cache.as_slice()),
            Self::Cached { inner, cache: None } => inner.bytes(),
            Self::Concat(children) => {
                let mut out = Vec::new();
                for child in children {
                    out.extend_from_slice(&child.bytes());
                }
                Cow::Owned(out)
            }
        }
    }

    /// Render the content as text, replacing invalid UTF-8
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every literal occurrence of `old` with `new`
    pub fn replace(self, old: &str, new: &str) -> Result<Self, SourceError> {
        let pattern = TokenPattern::literal(old)?;
        self.replace_pattern(&pattern, new)
    }

    /// Replace every match of `pattern` with `replacement`
    pub fn replace_pattern(self, pattern: &TokenPattern, replacement: &str) -> Result<Self, SourceError> {
        match self {
            Self::Raw(text) => Ok(Self::Raw(pattern.replace_text(text, replacement))),
            Self::Buffer(bytes) => Ok(Self::Buffer(pattern.replace_bytes(bytes, replacement))),
            Self::Prefixed { prefix, inner } => Ok(Self::Prefixed {
                prefix: pattern.replace_text(prefix, replacement),
                inner: Box::new(inner.replace_pattern(pattern, replacement)?),
            }),
            Self::Cached { inner, .. } => {
                let inner = inner.replace_pattern(pattern, replacement)?;
                Ok(Self::cached(inner))
            }
            Self::Concat(children) => children
                .into_iter()
                .map(|child| child.replace_pattern(pattern, replacement))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Concat),
            Self::Foreign { kind, .. } => Err(SourceError::Unsupported { kind }),
        }
    }

    /// Check whether any token of `pattern` occurs in this source
    pub fn contains(&self, pattern: &TokenPattern) -> Result<bool, SourceError> {
        match self {
            Self::Raw(text) => Ok(pattern.is_match(text)),
            Self::Buffer(bytes) => Ok(pattern.is_match_bytes(bytes)),
            Self::Prefixed { prefix, inner } => {
                Ok(pattern.is_match(prefix) || inner.contains(pattern)?)
            }
            Self::Cached { inner, .. } => inner.contains(pattern),
            Self::Concat(children) => {
                for child in children {
                    if child.contains(pattern)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Foreign { kind, .. } => Err(SourceError::Unsupported { kind: kind.clone() }),
        }
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Self::Raw(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Self::Raw(text)
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffer(bytes)
    }
}
