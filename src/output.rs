// src/output.rs

//! The build output handed to the rehash pass

use crate::assets::AssetStore;
use crate::chunk::{Chunk, ChunkId, Module, ModuleId};
use crate::source::Source;
use std::collections::BTreeMap;

/// Chunks, the shared module table and the asset store of one build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    pub chunks: Vec<Chunk>,
    pub modules: BTreeMap<ModuleId, Module>,
    pub assets: AssetStore,
}

impl BuildOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chunk(&mut self, chunk: Chunk) -> &mut Self {
        self.chunks.push(chunk);
        self
    }

    pub fn add_module(&mut self, module: Module) -> &mut Self {
        self.modules.insert(module.id.clone(), module);
        self
    }

    pub fn add_asset(&mut self, name: impl Into<String>, source: impl Into<Source>) -> &mut Self {
        self.assets.insert(name, source);
        self
    }

    pub fn chunk(&self, id: &ChunkId) -> Option<&Chunk> {
        self.chunks.iter().find(|c| &c.id == id)
    }

    pub fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.get(id)
    }

    /// Indices of `chunks` in processing order: chunks without a runtime
    /// first, then runtime chunks, each group by ascending id
    pub fn processing_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.chunks.len()).collect();
        order.sort_by(|&a, &b| self.chunks[a].order_key().cmp(&self.chunks[b].order_key()));
        order
    }
}
