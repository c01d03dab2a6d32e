// src/rehash/validate.rs

//! Safety net: scan the output for tokens that were replaced but survive
//!
//! Matching hashes by substring assumes hash values are unique in the
//! output. This scan catches the cases where that assumption, the
//! processing order or the inclusion filter left a stale reference behind.

use super::NameMap;
use crate::config::{InclusionFilter, OutputConfig};
use crate::error::{Error, Result};
use crate::output::BuildOutput;
use crate::source::{SourceError, TokenPattern};
use std::collections::HashSet;

/// Files of `output` that still contain a changed token from `name_map`
///
/// Primary files are always scanned, by name and by content; secondary
/// files only by content and only when they match `filter`, since files
/// outside the filter were never rewritten. Each file is listed once, in
/// chunk order.
pub fn find_stale(
    output: &BuildOutput,
    name_map: &NameMap,
    filter: &InclusionFilter,
    config: &OutputConfig,
) -> Result<Vec<String>> {
    let pattern = TokenPattern::new(name_map.changed().map(|(old, _)| old))?;
    if pattern.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    let mut stale = Vec::new();

    for chunk in &output.chunks {
        for file in &chunk.files {
            if !config.is_primary(file) && !filter.matches(file) {
                continue;
            }
            if !seen.insert(file.as_str()) {
                continue;
            }

            // A primary still named after a replaced token was never renamed,
            // so references rewritten to the new token point at nothing
            if config.is_primary(file) && pattern.is_match(file) {
                stale.push(file.clone());
                continue;
            }

            let asset = output.assets.require(file)?;
            let found = asset.source.contains(&pattern).map_err(|e| match e {
                SourceError::Unsupported { kind } => Error::UnsupportedAssetType {
                    file: file.clone(),
                    token: pattern.tokens().join("|"),
                    kind,
                },
                SourceError::Pattern(e) => e.into(),
            })?;
            if found {
                stale.push(file.clone());
            }
        }
    }

    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use crate::source::Source;

    fn output() -> BuildOutput {
        let mut output = BuildOutput::new();
        output
            .add_chunk(
                Chunk::new(1u64, "def456")
                    .with_file("app.def456.js")
                    .with_file("thatfile.js.map"),
            )
            .add_chunk(Chunk::new(2u64, "fff000").with_file("other.fff000.js"))
            .add_asset("app.def456.js", "ok")
            .add_asset("thatfile.js.map", "still points at abc123")
            .add_asset("other.fff000.js", "clean");
        output
    }

    #[test]
    fn test_finds_stale_file() {
        let mut map = NameMap::new();
        map.insert("abc123", "def456").unwrap();
        let stale = find_stale(&output(), &map, &InclusionFilter::all(), &OutputConfig::default())
            .unwrap();
        assert_eq!(stale, vec!["thatfile.js.map"]);
    }

    #[test]
    fn test_unchanged_tokens_ignored() {
        let mut map = NameMap::new();
        map.insert("abc123", "abc123").unwrap();
        let stale = find_stale(&output(), &map, &InclusionFilter::all(), &OutputConfig::default())
            .unwrap();
        assert!(stale.is_empty());
    }

    #[test]
    fn test_filtered_secondary_exempt() {
        let mut map = NameMap::new();
        map.insert("abc123", "def456").unwrap();
        let filter = InclusionFilter::new(r"\.css\.map$").unwrap();
        let stale = find_stale(&output(), &map, &filter, &OutputConfig::default()).unwrap();
        assert!(stale.is_empty());
    }

    #[test]
    fn test_primary_always_scanned() {
        let mut output = output();
        output.add_asset("other.fff000.js", "load('abc123')");
        let mut map = NameMap::new();
        map.insert("abc123", "def456").unwrap();
        let filter = InclusionFilter::new("^$").unwrap();
        let stale = find_stale(&output, &map, &filter, &OutputConfig::default()).unwrap();
        assert_eq!(stale, vec!["other.fff000.js"]);
    }

    #[test]
    fn test_primary_named_after_old_token_is_stale() {
        let mut output = output();
        output
            .add_chunk(Chunk::new(3u64, "def456").with_file("app.abc123.css"))
            .add_asset("app.abc123.css", "body{}");
        let mut map = NameMap::new();
        map.insert("abc123", "def456").unwrap();
        let filter = InclusionFilter::new("^$").unwrap();
        let stale = find_stale(&output, &map, &filter, &OutputConfig::default()).unwrap();
        assert_eq!(stale, vec!["app.abc123.css"]);
    }

    #[test]
    fn test_foreign_source_is_unsupported() {
        let mut output = output();
        output.add_asset("other.fff000.js", Source::foreign("webassembly", vec![0, 97]));
        let mut map = NameMap::new();
        map.insert("abc123", "def456").unwrap();
        let filter = InclusionFilter::new("^$").unwrap();
        match find_stale(&output, &map, &filter, &OutputConfig::default()) {
            Err(Error::UnsupportedAssetType { file, token, kind }) => {
                assert_eq!(file, "other.fff000.js");
                assert_eq!(token, "abc123");
                assert_eq!(kind, "webassembly");
            }
            other => panic!("expected UnsupportedAssetType, got {:?}", other),
        }
    }
}
