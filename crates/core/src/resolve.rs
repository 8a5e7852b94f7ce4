//! Source type → target type reference.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::config::GeneratorConfig;
use crate::ir::{ClientPrimitive, TupleShape, TypeRef};
use crate::metadata::{GenericKind, PrimitiveKind, TypeDescriptor, TypeKind};
use crate::naming::{short_name, strip_generic_arity};
use crate::registry::TypeRegistry;

/// Framework types with a fixed client-side meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnown {
    /// Action results, response messages, files and streams.
    RawResponse,
    /// `object`, dynamic objects and JSON document nodes.
    LooseObject,
    /// A typed action-result wrapper; only its argument matters.
    Unwrap,
    /// `System.Void`.
    Void,
}

/// Substitutions keyed by qualified name with the generic arity removed.
static WELL_KNOWN: LazyLock<HashMap<&'static str, WellKnown>> = LazyLock::new(|| {
    [
        ("Microsoft.AspNetCore.Mvc.IActionResult", WellKnown::RawResponse),
        ("Microsoft.AspNetCore.Mvc.ActionResult", WellKnown::RawResponse),
        ("Microsoft.AspNetCore.Mvc.FileResult", WellKnown::RawResponse),
        ("Microsoft.AspNetCore.Http.IResult", WellKnown::RawResponse),
        ("System.Web.Http.IHttpActionResult", WellKnown::RawResponse),
        ("System.Net.Http.HttpResponseMessage", WellKnown::RawResponse),
        ("System.IO.Stream", WellKnown::RawResponse),
        ("System.Object", WellKnown::LooseObject),
        ("System.Dynamic.ExpandoObject", WellKnown::LooseObject),
        ("Newtonsoft.Json.Linq.JObject", WellKnown::LooseObject),
        ("Newtonsoft.Json.Linq.JToken", WellKnown::LooseObject),
        ("System.Text.Json.JsonElement", WellKnown::LooseObject),
        ("System.Text.Json.Nodes.JsonNode", WellKnown::LooseObject),
        ("System.Void", WellKnown::Void),
    ]
    .into_iter()
    .collect()
});

/// Look up a descriptor in the well-known table.
///
/// The generic `ActionResult<T>` wrapper is distinguished from the bare
/// `ActionResult` by its single argument.
pub fn well_known(ty: &TypeDescriptor) -> Option<WellKnown> {
    let key = strip_generic_arity(&ty.name);
    let found = WELL_KNOWN.get(key.as_str()).copied()?;
    match (found, &ty.kind) {
        (WellKnown::RawResponse, TypeKind::Generic { args, .. }) if args.len() == 1 => {
            Some(WellKnown::Unwrap)
        }
        _ => Some(found),
    }
}

/// Maps source descriptors to target references.
///
/// Pure and deterministic: the same descriptor always yields the same
/// reference within a run.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a TypeRegistry,
    config: &'a GeneratorConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a TypeRegistry, config: &'a GeneratorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &'a GeneratorConfig {
        self.config
    }

    pub fn resolve(&self, ty: &TypeDescriptor) -> TypeRef {
        if self.registry.contains(&ty.name) {
            return self.pending(ty);
        }
        match &ty.kind {
            TypeKind::Primitive { primitive } => TypeRef::Primitive(client_primitive(*primitive)),
            TypeKind::String => TypeRef::Primitive(ClientPrimitive::String),
            TypeKind::Enum => TypeRef::Primitive(ClientPrimitive::Integer),
            TypeKind::Array { rank, element } => TypeRef::Array {
                element: Box::new(self.resolve(element)),
                rank: *rank,
            },
            TypeKind::Generic { generic, args } => self.generic(ty, *generic, args),
            TypeKind::GenericParameter => TypeRef::TypeParameter(ty.name.clone()),
            TypeKind::Custom => substitute(ty),
        }
    }

    /// Reference to a type declared in this run.
    fn pending(&self, ty: &TypeDescriptor) -> TypeRef {
        let args = match &ty.kind {
            TypeKind::Generic { args, .. } if !args.is_empty() => {
                args.iter().map(|arg| self.resolve(arg)).collect()
            }
            _ => ty
                .type_params
                .iter()
                .map(|param| TypeRef::TypeParameter(param.clone()))
                .collect(),
        };
        TypeRef::Named {
            namespace: Some(self.config.target_namespace(&ty.namespace)),
            name: short_name(&ty.name, &ty.namespace),
            args,
        }
    }

    fn generic(&self, ty: &TypeDescriptor, generic: GenericKind, args: &[TypeDescriptor]) -> TypeRef {
        match (generic, args) {
            (GenericKind::Nullable, [inner]) => TypeRef::nullable(self.resolve(inner)),
            (GenericKind::Tuple, _) if !args.is_empty() => {
                let slots = args.iter().map(|arg| self.resolve(arg)).collect();
                TypeRef::Tuple(TupleShape::fold(slots))
            }
            (GenericKind::Dictionary, [key, value]) => TypeRef::Dictionary {
                key: Box::new(self.resolve(key)),
                value: Box::new(self.resolve(value)),
            },
            (GenericKind::Deferred, []) => TypeRef::Void,
            (GenericKind::Deferred, [inner]) => self.resolve(inner),
            (GenericKind::Sequence, [element]) => {
                let element = Box::new(self.resolve(element));
                if self.config.sequence_to_array {
                    TypeRef::Array { element, rank: 1 }
                } else {
                    TypeRef::Sequence(element)
                }
            }
            _ => match well_known(ty) {
                Some(WellKnown::Unwrap) if args.len() == 1 => self.resolve(&args[0]),
                Some(found) => substitution(found),
                None => TypeRef::Named {
                    namespace: None,
                    name: strip_generic_arity(&ty.name),
                    args: args.iter().map(|arg| self.resolve(arg)).collect(),
                },
            },
        }
    }
}

/// Well-known substitution, or the type's own qualified name.
fn substitute(ty: &TypeDescriptor) -> TypeRef {
    match well_known(ty) {
        Some(found) => substitution(found),
        None => TypeRef::named(None, ty.name.clone()),
    }
}

fn substitution(found: WellKnown) -> TypeRef {
    match found {
        WellKnown::RawResponse => TypeRef::RawResponse,
        WellKnown::LooseObject | WellKnown::Unwrap => TypeRef::LooseObject,
        WellKnown::Void => TypeRef::Void,
    }
}

fn client_primitive(primitive: PrimitiveKind) -> ClientPrimitive {
    match primitive {
        PrimitiveKind::Boolean => ClientPrimitive::Boolean,
        PrimitiveKind::Char => ClientPrimitive::String,
        PrimitiveKind::Byte
        | PrimitiveKind::SByte
        | PrimitiveKind::Int16
        | PrimitiveKind::UInt16
        | PrimitiveKind::Int32
        | PrimitiveKind::UInt32
        | PrimitiveKind::Int64
        | PrimitiveKind::UInt64 => ClientPrimitive::Integer,
        PrimitiveKind::Single | PrimitiveKind::Double => ClientPrimitive::Float,
        PrimitiveKind::Decimal => ClientPrimitive::Decimal,
        PrimitiveKind::Guid => ClientPrimitive::Guid,
        PrimitiveKind::DateTime | PrimitiveKind::DateTimeOffset => ClientPrimitive::DateTime,
        PrimitiveKind::TimeSpan => ClientPrimitive::Duration,
        PrimitiveKind::Uri => ClientPrimitive::Uri,
    }
}
