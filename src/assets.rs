// src/assets.rs

//! Asset store: output file contents keyed by file name
//!
//! Chunks only hold file names; content lives here. Renaming a file moves
//! its entry to the new key and updates the asset's own name field.

use crate::error::{Error, Result};
use crate::source::Source;
use std::collections::BTreeMap;
use tracing::debug;

/// A named output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// File name, kept equal to the store key
    pub name: String,
    pub source: Source,
}

impl Asset {
    pub fn new(name: impl Into<String>, source: impl Into<Source>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Mapping from file name to asset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetStore {
    assets: BTreeMap<String, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the asset named `name`
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<Source>) {
        let asset = Asset::new(name, source);
        self.assets.insert(asset.name.clone(), asset);
    }

    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.assets.get(name)
    }

    /// Look up an asset, failing if it is absent
    pub fn require(&self, name: &str) -> Result<&Asset> {
        self.assets.get(name).ok_or_else(|| Error::MissingAsset {
            name: name.to_string(),
        })
    }

    pub fn remove(&mut self, name: &str) -> Option<Asset> {
        self.assets.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// File names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// Rewrite an asset's content through `f`
    ///
    /// `f` receives the current content and returns its replacement, or
    /// `None` to keep it. Returns whether the content was replaced. On error
    /// the asset is left as it was.
    pub fn update_source<F>(&mut self, name: &str, f: F) -> Result<bool>
    where
        F: FnOnce(&Source) -> Result<Option<Source>>,
    {
        let asset = self.assets.get_mut(name).ok_or_else(|| Error::MissingAsset {
            name: name.to_string(),
        })?;
        match f(&asset.source)? {
            Some(updated) => {
                asset.source = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Move the asset at `old` to `new`, updating its name
    ///
    /// An existing asset at `new` is replaced.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return self.require(old).map(|_| ());
        }

        let mut asset = self.assets.remove(old).ok_or_else(|| Error::MissingAsset {
            name: old.to_string(),
        })?;
        asset.name = new.to_string();

        if let Some(existing) = self.assets.insert(new.to_string(), asset) {
            debug!("Rename {} -> {} replaced existing asset {}", old, new, existing.name);
        }
        Ok(())
    }
}

impl FromIterator<Asset> for AssetStore {
    fn from_iter<I: IntoIterator<Item = Asset>>(iter: I) -> Self {
        let assets = iter
            .into_iter()
            .map(|asset| (asset.name.clone(), asset))
            .collect();
        Self { assets }
    }
}
