//! Run-scoped set of types slated for declaration generation.

use std::collections::{HashMap, HashSet};

use crate::metadata::TypeDescriptor;

/// Pending types keyed by qualified name.
///
/// Seeded once per run and only read afterwards; there is no removal.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
    namespaces: HashSet<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add descriptors to the pending set. A repeated name keeps the first
    /// registration.
    pub fn register<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        for descriptor in descriptors {
            if self.types.contains_key(&descriptor.name) {
                tracing::debug!(name = %descriptor.name, "type already registered");
                continue;
            }
            self.namespaces.insert(descriptor.namespace.clone());
            self.types.insert(descriptor.name.clone(), descriptor);
        }
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.types.contains_key(qualified_name)
    }

    pub fn get(&self, qualified_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(qualified_name)
    }

    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
