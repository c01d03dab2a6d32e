// src/rehash/propagate.rs

//! Rewriting old hash tokens inside chunk file contents

use super::NameMap;
use crate::assets::AssetStore;
use crate::chunk::Chunk;
use crate::config::{InclusionFilter, OutputConfig};
use crate::error::{Error, Result};
use crate::source::{Source, SourceError, TokenPattern};
use tracing::debug;

fn unsupported(err: SourceError, file: &str, pattern: &TokenPattern) -> Error {
    match err {
        SourceError::Unsupported { kind } => Error::UnsupportedAssetType {
            file: file.to_string(),
            token: pattern.tokens().join("|"),
            kind,
        },
        SourceError::Pattern(e) => e.into(),
    }
}

/// Apply every changed entry of `name_map` to the content of `file`
///
/// Returns whether the content changed.
fn rewrite_file(assets: &mut AssetStore, file: &str, name_map: &NameMap) -> Result<bool> {
    let rewritten = assets.update_source(file, |source| {
        let mut updated: Option<Source> = None;
        for (pattern, new) in name_map.replacements() {
            let current = updated.as_ref().unwrap_or(source);
            if !current
                .contains(pattern)
                .map_err(|e| unsupported(e, file, pattern))?
            {
                continue;
            }

            let base = updated.take().unwrap_or_else(|| source.clone());
            updated = Some(
                base.replace_pattern(pattern, new)
                    .map_err(|e| unsupported(e, file, pattern))?,
            );
        }
        Ok(updated)
    })?;

    if rewritten {
        debug!("Rewrote hash references in {}", file);
    }
    Ok(rewritten)
}

/// Rewrite old tokens in the secondary files of `chunk`
///
/// Only non-primary files matching `filter` are considered. Returns the
/// number of files whose content changed.
pub fn propagate(
    chunk: &Chunk,
    assets: &mut AssetStore,
    name_map: &NameMap,
    filter: &InclusionFilter,
    output: &OutputConfig,
) -> Result<usize> {
    if name_map.replacements().next().is_none() {
        return Ok(0);
    }

    let mut rewritten = 0;
    for file in chunk
        .files
        .iter()
        .filter(|file| !output.is_primary(file) && filter.matches(file))
    {
        if rewrite_file(assets, file, name_map)? {
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

/// Rewrite old tokens in the primary files of `chunk`
///
/// Runs before the chunk is rehashed so the new hash covers references to
/// chunks processed earlier. The inclusion filter does not apply.
pub fn propagate_into_primaries(
    chunk: &Chunk,
    assets: &mut AssetStore,
    name_map: &NameMap,
    output: &OutputConfig,
) -> Result<usize> {
    if name_map.replacements().next().is_none() {
        return Ok(0);
    }

    let mut rewritten = 0;
    for file in chunk.files.iter().filter(|file| output.is_primary(file)) {
        if rewrite_file(assets, file, name_map)? {
            rewritten += 1;
        }
    }
    Ok(rewritten)
}
