//! Second pass over the assembled graph.
//!
//! Rewrites record base references whose namespace is part of the run, then
//! checks that every namespaced reference points at a generated declaration.
//! Names outside the run are kept verbatim and reported once each.

use std::collections::{BTreeSet, HashSet};

use crate::config::GeneratorConfig;
use crate::error::{CompileError, Diagnostic};
use crate::ir::{DeclarationKind, NamespaceGroup, TypeRef};
use crate::naming::short_name;
use crate::registry::TypeRegistry;

pub fn link(
    groups: &mut [NamespaceGroup],
    registry: &TypeRegistry,
    config: &GeneratorConfig,
) -> Result<Vec<Diagnostic>, CompileError> {
    rewrite_bases(groups, registry, config);
    let external = validate(groups)?;
    tracing::debug!(external = external.len(), "linked declaration graph");
    Ok(external
        .into_iter()
        .map(|reference| Diagnostic::ExternalReference { reference })
        .collect())
}

fn rewrite_bases(groups: &mut [NamespaceGroup], registry: &TypeRegistry, config: &GeneratorConfig) {
    let records = groups
        .iter_mut()
        .flat_map(|group| group.declarations.iter_mut())
        .filter_map(|declaration| match &mut declaration.kind {
            DeclarationKind::Record(record) => record.base.as_mut(),
            DeclarationKind::Enumeration(_) => None,
        });
    for base in records {
        // A registered base is placed by its registration, so a base
        // descriptor without a namespace still links.
        let (namespace, name) = match registry.get(&base.source_name) {
            Some(descriptor) => (
                config.target_namespace(&descriptor.namespace),
                short_name(&descriptor.name, &descriptor.namespace),
            ),
            None if registry.contains_namespace(&base.source_namespace) => (
                config.target_namespace(&base.source_namespace),
                short_name(&base.source_name, &base.source_namespace),
            ),
            None => continue,
        };
        let TypeRef::Named { args, .. } = &mut base.target else {
            continue;
        };
        let args = std::mem::take(args);
        base.target = TypeRef::Named {
            namespace: Some(namespace),
            name,
            args,
        };
    }
}

/// Returns the sorted set of external names.
fn validate(groups: &[NamespaceGroup]) -> Result<BTreeSet<String>, CompileError> {
    let declared: HashSet<(&str, &str)> = groups
        .iter()
        .flat_map(|group| {
            group
                .declarations
                .iter()
                .map(|declaration| (group.namespace.as_str(), declaration.name.as_str()))
        })
        .collect();

    let mut external = BTreeSet::new();
    for (context, ty) in references(groups) {
        let mut dangling = None;
        ty.walk(&mut |nested| {
            let TypeRef::Named {
                namespace, name, ..
            } = nested
            else {
                return;
            };
            match namespace {
                Some(ns) if !declared.contains(&(ns.as_str(), name.as_str())) => {
                    dangling.get_or_insert_with(|| format!("{ns}.{name}"));
                }
                Some(_) => {}
                None => {
                    external.insert(name.clone());
                }
            }
        });
        if let Some(reference) = dangling {
            return Err(CompileError::UnresolvedReference { context, reference });
        }
    }
    Ok(external)
}

/// Every type reference in the graph, with a description of where it sits.
fn references(groups: &[NamespaceGroup]) -> Vec<(String, &TypeRef)> {
    let mut refs = Vec::new();
    for group in groups {
        for declaration in &group.declarations {
            let DeclarationKind::Record(record) = &declaration.kind else {
                continue;
            };
            let owner = format!("{}.{}", group.namespace, declaration.name);
            if let Some(base) = &record.base {
                refs.push((format!("{owner} (base)"), &base.target));
            }
            for field in &record.fields {
                refs.push((format!("{owner}.{}", field.name), &field.ty));
            }
        }
        for container in &group.containers {
            for function in &container.functions {
                let owner = format!("{}.{}.{}", group.namespace, container.name, function.name);
                refs.push((format!("{owner} (return)"), &function.returns));
                for param in &function.params {
                    refs.push((format!("{owner}({})", param.name), &param.ty));
                }
            }
        }
    }
    refs
}
