// tests/common/mod.rs

//! Shared fixtures for rehash pass integration tests.

#![allow(dead_code)]

use rehash::{
    BuildOutput, Chunk, HashAlgorithm, HashConfig, Module, RehashConfig, Rehasher,
    ValidationMode,
};

/// Hash settings used across tests: short SHA-256 hex tokens.
pub fn hash_config() -> HashConfig {
    HashConfig::new(HashAlgorithm::Sha256).with_length(8)
}

/// Short hash of `content` under [`hash_config`].
pub fn short(content: &str) -> String {
    hash_config().compute(content.as_bytes()).unwrap().short
}

/// Rehasher with test hash settings and the given validation mode.
pub fn rehasher(validation: ValidationMode) -> Rehasher {
    let mut config = RehashConfig::default();
    config.hash = hash_config();
    config.output.validation = validation;
    Rehasher::new(config).unwrap()
}

/// A single chunk with a script and its source map.
///
/// The source map names the script by its current hash.
pub fn single_chunk_app() -> BuildOutput {
    let mut output = BuildOutput::new();
    output
        .add_chunk(
            Chunk::new(1u64, "abc123")
                .with_file("app.abc123.js")
                .with_file("app.abc123.js.map"),
        )
        .add_asset("app.abc123.js", "console.log('app')")
        .add_asset("app.abc123.js.map", "{\"file\":\"app.abc123.js\",\"mappings\":\"AAAA\"}");
    output
}

/// A runtime entry chunk that loads a lazy chunk by hashed name.
///
/// - chunk 0 (runtime): `main.rrr000.js` + map, loads `lazy.abc123.js`
/// - chunk 5: `lazy.abc123.js`, whose name borrows nothing
/// - chunk 7: `vendor.mod789.js`, named after module `./vendor.js`
pub fn runtime_app() -> BuildOutput {
    let mut output = BuildOutput::new();
    output
        .add_chunk(
            Chunk::new(0u64, "rrr000")
                .with_runtime(true)
                .with_file("main.rrr000.js")
                .with_file("main.rrr000.js.map"),
        )
        .add_chunk(Chunk::new(5u64, "abc123").with_file("lazy.abc123.js"))
        .add_chunk(
            Chunk::new(7u64, "xyz000")
                .with_file("vendor.mod789.js")
                .with_module("./vendor.js"),
        )
        .add_module(Module::new("./vendor.js", "mod789"))
        .add_asset(
            "main.rrr000.js",
            "__load('lazy.abc123.js');__load('vendor.mod789.js');",
        )
        .add_asset("main.rrr000.js.map", "{\"file\":\"main.rrr000.js\"}")
        .add_asset("lazy.abc123.js", "export const lazy = 1;")
        .add_asset("vendor.mod789.js", "export const vendor = 2;");
    output
}
