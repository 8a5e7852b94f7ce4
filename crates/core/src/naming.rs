//! Name manipulation shared by the compiler passes.

use crate::metadata::{GenericKind, TypeDescriptor, TypeKind};

/// Remove CLR generic arity markers: `Shop.Page`1` → `Shop.Page`.
pub fn strip_generic_arity(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '`' {
            while chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                chars.next();
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Declared name of a type inside its namespace, arity removed.
///
/// Nested types (`Outer+Inner`) are flattened to `Outer_Inner`.
pub fn short_name(qualified: &str, namespace: &str) -> String {
    let local = if !namespace.is_empty()
        && let Some(rest) = qualified
            .strip_prefix(namespace)
            .and_then(|rest| rest.strip_prefix('.'))
    {
        rest
    } else {
        qualified.rsplit('.').next().unwrap_or(qualified)
    };
    strip_generic_arity(local).replace('+', "_")
}

/// Namespace part of a qualified name: `Shop.Models.Order` → `Shop.Models`.
pub fn namespace_of(qualified: &str) -> &str {
    qualified.rsplit_once('.').map_or("", |(ns, _)| ns)
}

/// Title-case an identifier: `user_name` → `UserName`, `id` → `Id`.
pub fn title_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if c == '_' || c == '-' || c == ' ' || c == '.' {
            upper_next = true;
            continue;
        }
        if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Compact type name used in overload suffixes: `System.Int32` → `Int32`,
/// `Int32[]` → `Int32Array`, `List<String>` → `ListOfString`.
pub fn type_token(ty: &TypeDescriptor) -> String {
    match &ty.kind {
        TypeKind::Array { element, .. } => format!("{}Array", type_token(element)),
        TypeKind::Generic {
            generic: GenericKind::Nullable | GenericKind::Deferred,
            args,
        } if args.len() == 1 => type_token(&args[0]),
        TypeKind::Generic { args, .. } => {
            let head = identifier_chars(&short_name(&ty.name, &ty.namespace));
            if args.is_empty() {
                head
            } else {
                let args: Vec<_> = args.iter().map(type_token).collect();
                format!("{head}Of{}", args.join("And"))
            }
        }
        _ => identifier_chars(&short_name(&ty.name, &ty.namespace)),
    }
}

fn identifier_chars(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
