// src/chunk.rs

//! Chunks and modules of a finished build
//!
//! A chunk is a dependency-grouped unit of output: usually one primary file
//! (script or stylesheet) whose name embeds a content hash, plus secondary
//! files such as source maps. A chunk's primary file name may embed either
//! the chunk's own hash or the hash of one of its modules, so both carry a
//! `rendered_hash` token.

use std::fmt;

/// Chunk identity, ordered numerically before named ids
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChunkId {
    Index(u64),
    Named(String),
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{}", index),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

impl From<u64> for ChunkId {
    fn from(index: u64) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ChunkId {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

/// Module identity within a build
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(pub String);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A constituent of one or more chunks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub id: ModuleId,
    /// Full digest
    pub hash: String,
    /// Token that may appear in a chunk's primary file name
    pub rendered_hash: String,
}

impl Module {
    pub fn new(id: impl Into<ModuleId>, rendered_hash: impl Into<String>) -> Self {
        let rendered_hash = rendered_hash.into();
        Self {
            id: id.into(),
            hash: rendered_hash.clone(),
            rendered_hash,
        }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }
}

/// A unit of build output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    /// Output file names, replaced in place on rename
    pub files: Vec<String>,
    /// Full digest
    pub hash: String,
    /// Token embedded in the primary file name
    pub rendered_hash: String,
    /// Whether this chunk bootstraps and loads other chunks
    pub has_runtime: bool,
    /// Ids into the build's module table
    pub modules: Vec<ModuleId>,
}

impl Chunk {
    pub fn new(id: impl Into<ChunkId>, rendered_hash: impl Into<String>) -> Self {
        let rendered_hash = rendered_hash.into();
        Self {
            id: id.into(),
            files: Vec::new(),
            hash: rendered_hash.clone(),
            rendered_hash,
            has_runtime: false,
            modules: Vec::new(),
        }
    }

    pub fn with_file(mut self, name: impl Into<String>) -> Self {
        self.files.push(name.into());
        self
    }

    pub fn with_module(mut self, id: impl Into<ModuleId>) -> Self {
        self.modules.push(id.into());
        self
    }

    pub fn with_runtime(mut self, has_runtime: bool) -> Self {
        self.has_runtime = has_runtime;
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    /// Processing order key: runtime chunks last, then by id
    pub fn order_key(&self) -> (bool, &ChunkId) {
        (self.has_runtime, &self.id)
    }
}
