// src/lib.rs

//! Rehash: post-build hash repropagation
//!
//! Bundlers name output files after a content hash (`app.3f2a9c.js`) and
//! embed those names in other outputs: runtime chunks load lazy chunks by
//! hashed name, source maps name their scripts. When a referenced name
//! changes, the referencing file's content and therefore its own hash
//! change as well. This crate runs the pass that settles those hashes.
//!
//! # Architecture
//!
//! - **source**: content containers and literal token matching
//! - **hash**: configurable content hashing (algorithm, encoding, length, salt)
//! - **rehash**: per-chunk rename, reference propagation, ordering, validation
//! - **verify**: optional check of files written to disk
//!
//! # Example
//!
//! ```
//! use rehash::{BuildOutput, Chunk, RehashConfig, Rehasher};
//!
//! let mut output = BuildOutput::new();
//! output
//!     .add_chunk(Chunk::new(1u64, "abc123").with_file("app.abc123.js"))
//!     .add_asset("app.abc123.js", "console.log('app')");
//!
//! let rehasher = Rehasher::new(RehashConfig::default()).unwrap();
//! let report = rehasher.run(&mut output).unwrap();
//! assert_eq!(report.renames.len(), 1);
//! assert!(!output.assets.contains("app.abc123.js"));
//! ```

pub mod assets;
pub mod chunk;
pub mod config;
mod error;
pub mod hash;
pub mod output;
pub mod rehash;
pub mod source;
pub mod verify;

pub use assets::{Asset, AssetStore};
pub use chunk::{Chunk, ChunkId, Module, ModuleId};
pub use config::{InclusionFilter, OutputConfig, RehashConfig, ValidationMode};
pub use error::{Error, Result};
pub use hash::{DigestEncoding, HashAlgorithm, HashConfig, HashOutput, Hasher};
pub use output::BuildOutput;
pub use rehash::{NameMap, Rename, RehashReport, Rehasher};
pub use source::{Source, TokenPattern};
pub use verify::{verify_output_file, verify_output_files};
