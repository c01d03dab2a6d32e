// src/rehash/rename.rs

//! Rehashing a single chunk's primary files
//!
//! The primary file name embeds either the chunk's own token or a token
//! borrowed from one of its modules. Whichever matches is replaced by the
//! short hash of the file's final content, and the owner's hash fields are
//! updated to match.

use super::{NameMap, Rename};
use crate::assets::AssetStore;
use crate::chunk::{Chunk, Module, ModuleId};
use crate::config::OutputConfig;
use crate::error::Result;
use crate::hash::{HashConfig, HashOutput};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// What rehashing one chunk did
#[derive(Debug, Clone, Default)]
pub struct ChunkRehash {
    /// Files renamed, in chunk file order
    pub renames: Vec<Rename>,
    /// Token replacements recorded by this chunk
    pub recorded: NameMap,
    /// Primary files whose hash provenance could not be determined
    pub unresolved: Vec<String>,
}

/// Where a primary file's embedded token came from
enum Provenance {
    Chunk,
    Module(ModuleId),
}

/// Find which token `file` currently embeds
fn find_provenance(
    file: &str,
    chunk: &Chunk,
    modules: &BTreeMap<ModuleId, Module>,
) -> Option<(Provenance, String)> {
    if !chunk.rendered_hash.is_empty() && file.contains(&chunk.rendered_hash) {
        return Some((Provenance::Chunk, chunk.rendered_hash.clone()));
    }

    chunk
        .modules
        .iter()
        .filter_map(|id| modules.get(id))
        .find(|module| !module.rendered_hash.is_empty() && file.contains(&module.rendered_hash))
        .map(|module| (Provenance::Module(module.id.clone()), module.rendered_hash.clone()))
}

/// Recompute hashes for the primary files of `chunk` and rename them
///
/// Records `old token -> new short hash` in `name_map` for every renamed
/// file. Primary files whose name embeds neither the chunk's token nor any
/// module token are left alone and listed in [`ChunkRehash::unresolved`].
/// Secondary file contents are never touched here.
pub fn rehash_chunk(
    chunk: &mut Chunk,
    modules: &mut BTreeMap<ModuleId, Module>,
    assets: &mut AssetStore,
    hash_config: &HashConfig,
    output: &OutputConfig,
    name_map: &mut NameMap,
) -> Result<ChunkRehash> {
    let mut outcome = ChunkRehash::default();

    for index in 0..chunk.files.len() {
        let file = chunk.files[index].clone();
        if !output.is_primary(&file) {
            continue;
        }

        let HashOutput { full, short } = hash_config.compute(&assets.require(&file)?.source.bytes())?;

        let Some((provenance, old)) = find_provenance(&file, chunk, modules) else {
            warn!(
                "Cannot determine hash provenance of {} in chunk {}, leaving it unrenamed",
                file, chunk.id
            );
            outcome.unresolved.push(file);
            continue;
        };

        match provenance {
            Provenance::Chunk => {
                chunk.hash = full;
                chunk.rendered_hash = short.clone();
            }
            Provenance::Module(id) => {
                if let Some(module) = modules.get_mut(&id) {
                    debug!("{} borrows the hash of module {}", file, id);
                    module.hash = full;
                    module.rendered_hash = short.clone();
                }
            }
        }

        outcome.recorded.insert(old.clone(), short.clone())?;

        let new_name = file.replacen(&old, &short, 1);
        if new_name == file {
            debug!("{} is unchanged", file);
            continue;
        }

        assets.rename(&file, &new_name)?;
        chunk.files[index] = new_name.clone();
        debug!("Renamed {} -> {}", file, new_name);

        outcome.renames.push(Rename {
            chunk: chunk.id.clone(),
            from: file,
            to: new_name,
        });
    }

    name_map.extend(&outcome.recorded);
    Ok(outcome)
}
