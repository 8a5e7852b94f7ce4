//! Generator configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;
use crate::metadata::{MemberDescriptor, TypeDescriptor, Visibility};

/// Options recognized by the compiler and the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Appended to every source namespace, e.g. `Shop.Models` → `Shop.Models.Client`.
    pub namespace_suffix: String,
    /// Appended to container short names, e.g. `Orders` → `OrdersClient`.
    pub container_suffix: String,
    /// Which record members are exposed.
    pub cherry_pick: CherryPick,
    /// Resolve sequence-like generics as arrays.
    pub sequence_to_array: bool,
    /// Append `Of{TypeName}` to overload suffixes.
    pub disambiguate_by_type: bool,
    pub body_serialization: BodySerialization,
    pub output_flavors: Vec<OutputFlavor>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace_suffix: ".Client".to_string(),
            container_suffix: "Client".to_string(),
            cherry_pick: CherryPick::default(),
            sequence_to_array: true,
            disambiguate_by_type: false,
            body_serialization: BodySerialization::default(),
            output_flavors: vec![OutputFlavor::Fetch],
        }
    }
}

impl GeneratorConfig {
    /// Parse a configuration from a TOML string. Missing keys take defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Target namespace for a source namespace.
    pub fn target_namespace(&self, source_namespace: &str) -> String {
        if source_namespace.is_empty() {
            self.namespace_suffix.trim_start_matches('.').to_string()
        } else {
            format!("{source_namespace}{}", self.namespace_suffix)
        }
    }
}

/// How a request body is serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodySerialization {
    #[default]
    Json,
    FormUrlEncoded,
}

/// Target syntax printed by the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFlavor {
    /// TypeScript classes calling `fetch`.
    Fetch,
    /// TypeScript classes calling an axios instance.
    Axios,
}

impl OutputFlavor {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFlavor::Fetch => "fetch",
            OutputFlavor::Axios => "axios",
        }
    }
}

/// Decides which record members appear in a generated declaration.
pub trait MemberFilter {
    fn include(&self, owner: &TypeDescriptor, member: &MemberDescriptor) -> bool;
}

impl<F> MemberFilter for F
where
    F: Fn(&TypeDescriptor, &MemberDescriptor) -> bool,
{
    fn include(&self, owner: &TypeDescriptor, member: &MemberDescriptor) -> bool {
        self(owner, member)
    }
}

/// Built-in member selection policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CherryPick {
    /// Every member.
    All,
    /// Public members only.
    Public,
    /// Public members not annotated as ignored.
    #[default]
    PublicNotIgnored,
}

impl MemberFilter for CherryPick {
    fn include(&self, _owner: &TypeDescriptor, member: &MemberDescriptor) -> bool {
        match self {
            CherryPick::All => true,
            CherryPick::Public => member.visibility == Visibility::Public,
            CherryPick::PublicNotIgnored => {
                member.visibility == Visibility::Public && !member.ignored
            }
        }
    }
}
