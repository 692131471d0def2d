//! Static part metadata: identifier → label / material / description.
//!
//! The table is loaded once from a JSON object and never mutated:
//!
//! ```json
//! { "LeftWing": { "label": "Wing", "material": "Aluminum", "description": "Left wing assembly" } }
//! ```

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartMetadata {
    pub label: String,
    pub material: String,
    pub description: String,
}

impl PartMetadata {
    #[must_use]
    pub fn new(label: impl Into<String>, material: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            material: material.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataTable {
    entries: FxHashMap<String, PartMetadata>,
}

impl MetadataTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Exact-identifier lookup.
    #[must_use]
    pub fn get(&self, part: &str) -> Option<&PartMetadata> {
        self.entries.get(part)
    }

    #[must_use]
    pub fn with_entry(mut self, part: impl Into<String>, metadata: PartMetadata) -> Self {
        self.entries.insert(part.into(), metadata);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, PartMetadata)> for MetadataTable {
    fn from_iter<I: IntoIterator<Item = (String, PartMetadata)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
