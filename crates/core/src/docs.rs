//! Documentation lookup.
//!
//! Symbol keys follow the XML-doc convention: `T:` for types, `P:` for
//! members, `F:` for enum constants and `M:` for operations.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::LoadError;

/// Looks up human-readable documentation for a symbol.
pub trait DocProvider {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Provider that never has documentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDocs;

impl DocProvider for NoDocs {
    fn lookup(&self, _key: &str) -> Option<String> {
        None
    }
}

/// In-memory symbol map, usually loaded from a JSON object.
#[derive(Debug, Clone, Default)]
pub struct DocMap {
    entries: HashMap<String, String>,
}

impl DocMap {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let entries = serde_json::from_str(json).map_err(LoadError::Docs)?;
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DocProvider for DocMap {
    fn lookup(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

pub fn type_key(type_name: &str) -> String {
    format!("T:{type_name}")
}

pub fn member_key(type_name: &str, member: &str) -> String {
    format!("P:{type_name}.{member}")
}

pub fn constant_key(type_name: &str, constant: &str) -> String {
    format!("F:{type_name}.{constant}")
}

pub fn operation_key(container: &str, operation: &str) -> String {
    format!("M:{container}.{operation}")
}
