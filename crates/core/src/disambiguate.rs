//! Renames client functions that share a name inside one container.

use std::collections::HashMap;

use crate::error::Diagnostic;
use crate::ir::{ClientFunction, Container, NamespaceGroup};
use crate::naming::title_case;

/// Trailing parameter left out of overload suffixes.
const CALLBACK_PARAMETER: &str = "callback";

/// Rename colliding functions in place, container by container.
///
/// Every member of a colliding group becomes `{Name}By{Suffix}And{Suffix}...`.
/// Containers without collisions are left untouched. Names that still
/// collide afterwards are reported.
pub fn disambiguate(groups: &mut [NamespaceGroup], by_type: bool) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for group in groups.iter_mut() {
        for container in &mut group.containers {
            let renamed = rename_collisions(container, by_type);
            if renamed > 0 {
                tracing::debug!(container = %container.name, renamed, "disambiguated overloads");
            }
            for name in collisions(&container.functions) {
                tracing::warn!(container = %container.name, %name, "overload still ambiguous");
                diagnostics.push(Diagnostic::UnresolvedOverload {
                    container: container.name.clone(),
                    name,
                });
            }
        }
    }
    diagnostics
}

/// Returns how many functions were renamed.
fn rename_collisions(container: &mut Container, by_type: bool) -> usize {
    let mut renamed = 0;
    for indices in groups_by_name(&container.functions) {
        if indices.len() < 2 {
            continue;
        }
        for index in indices {
            let function = &mut container.functions[index];
            function.name = overload_name(function, by_type);
            renamed += 1;
        }
    }
    renamed
}

/// Indices of functions grouped by name, in order of first appearance.
fn groups_by_name(functions: &[ClientFunction]) -> Vec<Vec<usize>> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (index, function) in functions.iter().enumerate() {
        let slot = *slots.entry(function.name.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(index);
    }
    groups
}

fn collisions(functions: &[ClientFunction]) -> Vec<String> {
    groups_by_name(functions)
        .into_iter()
        .filter(|indices| indices.len() > 1)
        .map(|indices| functions[indices[0]].name.clone())
        .collect()
}

fn overload_name(function: &ClientFunction, by_type: bool) -> String {
    let mut params = function.params.as_slice();
    if let Some((last, rest)) = params.split_last()
        && last.name.eq_ignore_ascii_case(CALLBACK_PARAMETER)
    {
        params = rest;
    }
    if params.is_empty() {
        return function.name.clone();
    }
    let suffixes: Vec<String> = params
        .iter()
        .map(|param| {
            let mut suffix = title_case(&param.name);
            if by_type {
                suffix.push_str("Of");
                suffix.push_str(&param.type_token);
            }
            suffix
        })
        .collect();
    format!("{}By{}", function.name, suffixes.join("And"))
}
