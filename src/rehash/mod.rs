// src/rehash/mod.rs

//! The rehash and repropagate pass
//!
//! Some output files embed the hashes of other files (a runtime chunk that
//! loads `lazy.abc123.js`, a source map naming its script). Once those
//! references are rewritten the embedding file's own content hash is stale,
//! so its name must change too, and so on down the chain.
//!
//! # Architecture
//!
//! - **rename**: rehashes one chunk's primary files and records
//!   `old token -> new token`
//! - **propagate**: rewrites recorded tokens inside file contents
//! - **validate**: scans the finished output for tokens that survived
//!
//! [`Rehasher::run`] orders the chunks (runtime chunks last, then by id) and
//! folds over them, so each chunk sees every replacement made by the
//! chunks before it.

mod propagate;
mod rename;
mod validate;

pub use propagate::{propagate, propagate_into_primaries};
pub use rename::{ChunkRehash, rehash_chunk};
pub use validate::find_stale;

use crate::chunk::ChunkId;
use crate::config::{InclusionFilter, RehashConfig, ValidationMode};
use crate::error::{Error, Result};
use crate::hash::HashConfig;
use crate::output::BuildOutput;
use crate::source::TokenPattern;
use tracing::{debug, info, warn};

/// One `old -> new` entry with the compiled search pattern for `old`
#[derive(Debug, Clone)]
struct Entry {
    old: String,
    new: String,
    pattern: TokenPattern,
}

/// Ordered mapping from replaced hash tokens to their new values
///
/// Each old token's search pattern is compiled once, when the token is
/// first inserted, and reused by every later propagation step.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    entries: Vec<Entry>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `old -> new`, overwriting an earlier value for `old`
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) -> Result<()> {
        let (old, new) = (old.into(), new.into());
        if let Some(entry) = self.entries.iter_mut().find(|e| e.old == old) {
            entry.new = new;
            return Ok(());
        }

        let pattern = TokenPattern::literal(&old)?;
        self.entries.push(Entry { old, new, pattern });
        Ok(())
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.old == old)
            .map(|e| e.new.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|e| (e.old.as_str(), e.new.as_str()))
    }

    /// Entries whose value differs from the key
    pub fn changed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(old, new)| old != new)
    }

    /// Compiled pattern and replacement of every changed entry
    pub fn replacements(&self) -> impl Iterator<Item = (&TokenPattern, &str)> {
        self.entries
            .iter()
            .filter(|e| e.old != e.new)
            .map(|e| (&e.pattern, e.new.as_str()))
    }

    /// Merge every entry of `other` into this map
    pub fn extend(&mut self, other: &NameMap) {
        for entry in &other.entries {
            match self.entries.iter_mut().find(|e| e.old == entry.old) {
                Some(existing) => existing.new.clone_from(&entry.new),
                None => self.entries.push(entry.clone()),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for NameMap {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for NameMap {}

/// One renamed primary file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub chunk: ChunkId,
    pub from: String,
    pub to: String,
}

/// Outcome of a completed pass
#[derive(Debug, Clone, Default)]
pub struct RehashReport {
    /// Renames in processing order
    pub renames: Vec<Rename>,
    /// Every token replacement recorded during the pass
    pub name_map: NameMap,
    /// Primary files left unrenamed because their token owner is unknown
    pub unresolved: Vec<String>,
    /// Files with stale references, filled in report-only validation
    pub stale: Vec<String>,
}

impl RehashReport {
    /// New name of the file previously called `old`
    pub fn renamed(&self, old: &str) -> Option<&str> {
        self.renames
            .iter()
            .find(|r| r.from == old)
            .map(|r| r.to.as_str())
    }

    fn absorb(&mut self, outcome: ChunkRehash) {
        self.renames.extend(outcome.renames);
        self.unresolved.extend(outcome.unresolved);
    }
}

/// Runs the rehash pass over a build's output
#[derive(Debug, Clone)]
pub struct Rehasher {
    config: RehashConfig,
    filter: InclusionFilter,
}

impl Rehasher {
    /// Create a rehasher, rejecting invalid configuration up front
    pub fn new(config: RehashConfig) -> Result<Self> {
        config.validate()?;
        let filter = InclusionFilter::new(&config.output.include)?;
        Ok(Self { config, filter })
    }

    pub fn config(&self) -> &RehashConfig {
        &self.config
    }

    /// Rehash every chunk of `output`, then validate
    ///
    /// Work happens on a copy of `output` that replaces it only once every
    /// chunk was processed, so a fatal error leaves `output` untouched.
    /// Validation runs after that, and a stale reference error does not
    /// undo the applied renames.
    pub fn run(&self, output: &mut BuildOutput) -> Result<RehashReport> {
        let order = output.processing_order();
        info!(
            "Rehashing {} chunks ({} assets) with {}",
            order.len(),
            output.assets.len(),
            self.config.hash.algorithm
        );

        let mut working = output.clone();
        let mut name_map = NameMap::new();
        let mut report = RehashReport::default();

        for index in order {
            let BuildOutput {
                chunks,
                modules,
                assets,
            } = &mut working;
            let chunk = &mut chunks[index];
            debug!("Processing chunk {} (runtime: {})", chunk.id, chunk.has_runtime);

            propagate(chunk, assets, &name_map, &self.filter, &self.config.output)?;
            propagate_into_primaries(chunk, assets, &name_map, &self.config.output)?;

            let outcome = rehash_chunk(
                chunk,
                modules,
                assets,
                &self.config.hash,
                &self.config.output,
                &mut name_map,
            )?;

            // Own secondary files (source maps) name the files just renamed
            propagate(chunk, assets, &outcome.recorded, &self.filter, &self.config.output)?;

            report.absorb(outcome);
        }

        *output = working;
        report.name_map = name_map;
        info!(
            "Renamed {} files, {} unresolved",
            report.renames.len(),
            report.unresolved.len()
        );

        self.validate(output, &mut report)?;
        Ok(report)
    }

    fn validate(&self, output: &BuildOutput, report: &mut RehashReport) -> Result<()> {
        let mode = self.config.output.validation;
        if mode == ValidationMode::Off {
            return Ok(());
        }

        let stale = find_stale(output, &report.name_map, &self.filter, &self.config.output)?;
        if stale.is_empty() {
            debug!("No stale hash references found");
            return Ok(());
        }

        warn!("Stale hash references remain in: {}", stale.join(", "));
        match mode {
            ValidationMode::Enforce => Err(Error::StaleReference { files: stale }),
            _ => {
                report.stale = stale;
                Ok(())
            }
        }
    }
}

/// Run the pass with a hash configuration and inclusion pattern
///
/// `validate` selects between enforced validation and none.
pub fn run(
    output: &mut BuildOutput,
    hash: &HashConfig,
    include: &str,
    validate: bool,
) -> Result<RehashReport> {
    let mut config = RehashConfig::default();
    config.hash = hash.clone();
    config.output.include = include.to_string();
    config.output.validation = ValidationMode::from(validate);
    Rehasher::new(config)?.run(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use crate::hash::HashAlgorithm;

    #[test]
    fn test_name_map_insert_and_order() {
        let mut map = NameMap::new();
        map.insert("bbb", "111").unwrap();
        map.insert("aaa", "222").unwrap();
        map.insert("bbb", "333").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("bbb"), Some("333"));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("bbb", "333"), ("aaa", "222")]);
    }

    #[test]
    fn test_name_map_changed() {
        let mut map = NameMap::new();
        map.insert("same", "same").unwrap();
        map.insert("old", "new").unwrap();
        assert_eq!(map.changed().collect::<Vec<_>>(), vec![("old", "new")]);
        let replacements: Vec<_> = map
            .replacements()
            .map(|(pattern, new)| (pattern.tokens().to_vec(), new))
            .collect();
        assert_eq!(replacements, vec![(vec!["old".to_string()], "new")]);

        let mut merged = NameMap::new();
        merged.extend(&map);
        assert_eq!(merged, map);
    }

    #[test]
    fn test_rehasher_rejects_bad_config() {
        let mut config = RehashConfig::default();
        config.hash.length = 0;
        assert!(matches!(Rehasher::new(config), Err(Error::Configuration(_))));

        let mut config = RehashConfig::default();
        config.output.include = "[".to_string();
        assert!(matches!(Rehasher::new(config), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_config_error_leaves_output_untouched() {
        let mut output = BuildOutput::new();
        output
            .add_chunk(Chunk::new(1u64, "abc123").with_file("a.abc123.js"))
            .add_asset("a.abc123.js", "x");
        let before = output.clone();

        let bad = HashConfig::new(HashAlgorithm::Md5).with_length(99);
        assert!(run(&mut output, &bad, "^.*$", true).is_err());
        assert_eq!(output, before);
    }

    #[test]
    fn test_report_renamed_lookup() {
        let mut output = BuildOutput::new();
        output
            .add_chunk(Chunk::new(1u64, "abc123").with_file("a.abc123.js"))
            .add_asset("a.abc123.js", "x");

        let hash = HashConfig::new(HashAlgorithm::Sha256).with_length(6);
        let report = run(&mut output, &hash, "^.*$", true).unwrap();
        let short = hash.compute(b"x").unwrap().short;
        assert_eq!(report.renamed("a.abc123.js"), Some(format!("a.{}.js", short).as_str()));
        assert_eq!(report.renamed("missing.js"), None);
    }
}
