//! The client declaration graph handed to emitters.

use std::fmt;

use super::types::TypeRef;
use crate::metadata::HttpMethod;

/// Declarations and containers of one target namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceGroup {
    /// Target namespace (source namespace plus suffix).
    pub namespace: String,
    pub source_namespace: String,
    pub declarations: Vec<Declaration>,
    pub containers: Vec<Container>,
}

impl NamespaceGroup {
    pub fn new(namespace: String, source_namespace: String) -> Self {
        Self {
            namespace,
            source_namespace,
            declarations: Vec::new(),
            containers: Vec::new(),
        }
    }
}

/// One emitted data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Declared name inside the namespace, e.g. `Order` or `Page`.
    pub name: String,
    /// Qualified source name, e.g. `Shop.Models.Page`1`.
    pub source_name: String,
    pub doc: Option<String>,
    pub kind: DeclarationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    Record(RecordDecl),
    Enumeration(EnumDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDecl {
    /// Non-empty for generic records.
    pub type_params: Vec<String>,
    pub fields: Vec<Field>,
    pub base: Option<BaseRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub required: bool,
    pub doc: Option<String>,
}

/// Base type of a record. `target` starts as the bare qualified name and is
/// rewritten by the linker when the base lives in a namespace of this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRef {
    pub source_name: String,
    pub source_namespace: String,
    pub target: TypeRef,
}

/// Enumeration with compacted member values.
///
/// Member `i` implicitly has value `index_base + i`; `explicit` is set only
/// where the underlying value differs from that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    pub index_base: i64,
    pub members: Vec<EnumMemberDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMemberDecl {
    pub name: String,
    pub explicit: Option<i64>,
    pub doc: Option<String>,
}

impl EnumDecl {
    /// Build from `(name, value, doc)` triples in declaration order.
    pub fn compact(members: impl IntoIterator<Item = (String, i64, Option<String>)>) -> Self {
        let members: Vec<_> = members.into_iter().collect();
        let index_base = members.first().map_or(0, |(_, value, _)| *value);
        let members = members
            .into_iter()
            .enumerate()
            .map(|(position, (name, value, doc))| {
                // An implicit value past `i64::MAX` cannot exist; spell it out.
                let implicit = index_base.checked_add(position as i64);
                EnumMemberDecl {
                    name,
                    explicit: (implicit != Some(value)).then_some(value),
                    doc,
                }
            })
            .collect();
        Self {
            index_base,
            members,
        }
    }

    /// Underlying `(name, value)` pairs, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.members.iter().enumerate().map(|(position, member)| {
            let value = member
                .explicit
                .or_else(|| self.index_base.checked_add(position as i64))
                .unwrap_or(self.index_base);
            (member.name.as_str(), value)
        })
    }
}

/// A generated class owning client callables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Generated name, e.g. `OrdersClient`.
    pub name: String,
    /// Qualified source name, e.g. `Shop.Controllers.OrdersController`.
    pub source_name: String,
    pub functions: Vec<ClientFunction>,
}

/// One generated callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFunction {
    /// Generated name; rewritten by the disambiguator on collisions.
    pub name: String,
    /// Action name in the host framework.
    pub source_name: String,
    pub verb: HttpMethod,
    pub params: Vec<FormalParameter>,
    pub returns: TypeRef,
    pub strategy: ReturnStrategy,
    pub uri: UriTemplate,
    /// Name of the body parameter, if any.
    pub body: Option<String>,
    pub headers: Vec<HeaderBinding>,
    pub doc: Option<String>,
}

impl ClientFunction {
    pub fn param(&self, name: &str) -> Option<&FormalParameter> {
        self.params.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalParameter {
    pub name: String,
    pub ty: TypeRef,
    /// Compact source type name used for overload suffixes.
    pub type_token: String,
    pub optional: bool,
    pub role: ParameterRole,
}

/// Which part of the request a formal parameter feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRole {
    Path,
    Query,
    Header,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBinding {
    pub header: String,
    pub parameter: String,
    pub optional: bool,
}

/// How a generated callable reads its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnStrategy {
    /// Raw body stream / binary payload.
    Stream,
    /// Untyped JSON handed back as-is.
    DynamicPassthrough,
    /// Body text; a no-content status yields null.
    StringPassthrough,
    /// Scalar parsed from the body.
    PrimitiveParse,
    /// Structured JSON deserialized into the declared type.
    ComplexDeserialize,
    /// Nothing to read.
    NoContent,
}

/// One handler per return strategy.
pub trait ReturnStrategyVisitor {
    type Output;

    fn stream(&mut self) -> Self::Output;
    fn dynamic_passthrough(&mut self) -> Self::Output;
    fn string_passthrough(&mut self) -> Self::Output;
    fn primitive_parse(&mut self) -> Self::Output;
    fn complex_deserialize(&mut self) -> Self::Output;
    fn no_content(&mut self) -> Self::Output;
}

impl ReturnStrategy {
    pub fn accept<V: ReturnStrategyVisitor>(self, visitor: &mut V) -> V::Output {
        match self {
            ReturnStrategy::Stream => visitor.stream(),
            ReturnStrategy::DynamicPassthrough => visitor.dynamic_passthrough(),
            ReturnStrategy::StringPassthrough => visitor.string_passthrough(),
            ReturnStrategy::PrimitiveParse => visitor.primitive_parse(),
            ReturnStrategy::ComplexDeserialize => visitor.complex_deserialize(),
            ReturnStrategy::NoContent => visitor.no_content(),
        }
    }
}

/// URI construction: path segments followed by query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriTemplate {
    pub segments: Vec<UriSegment>,
    pub query: Vec<QueryPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriSegment {
    Literal(String),
    /// Encoded parameter value. Catch-all values keep their `/` separators.
    Parameter { parameter: String, catch_all: bool },
}

/// One query-string entry. Optional entries are omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPart {
    pub key: String,
    pub parameter: String,
    pub optional: bool,
    /// Array values repeat the key once per element.
    pub repeated: bool,
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                UriSegment::Literal(text) => f.write_str(text)?,
                UriSegment::Parameter {
                    parameter,
                    catch_all: true,
                } => write!(f, "{{*{parameter}}}")?,
                UriSegment::Parameter { parameter, .. } => write!(f, "{{{parameter}}}")?,
            }
        }
        for (i, part) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            let opt = if part.optional { "?" } else { "" };
            write!(f, "{sep}{}={{{}{opt}}}", part.key, part.parameter)?;
        }
        Ok(())
    }
}
