//! Input model: reflected type metadata and remote-operation descriptions.
//!
//! This is the shape a host-framework exporter hands to the compiler. It is
//! deserialized from JSON and never mutated afterwards.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;

/// One reflected source type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    /// Fully qualified name, e.g. `Shop.Models.Order` or `Shop.Models.Page`1`.
    pub name: String,
    /// Source namespace, e.g. `Shop.Models`.
    #[serde(default)]
    pub namespace: String,
    pub kind: TypeKind,
    /// Data members, in declaration order (records only).
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
    /// Base type, if the record derives from another record.
    #[serde(default)]
    pub base: Option<Box<TypeDescriptor>>,
    /// Named integer constants, in declaration order (enums only).
    #[serde(default)]
    pub enum_members: Vec<EnumMember>,
    /// Open type parameters of a generic definition, e.g. `["T"]`.
    #[serde(default)]
    pub type_params: Vec<String>,
    /// Documentation symbol key overriding the default `T:{name}`.
    #[serde(default)]
    pub doc_key: Option<String>,
}

/// Closed classification of a source type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TypeKind {
    Primitive {
        primitive: PrimitiveKind,
    },
    String,
    Enum,
    Array {
        #[serde(default = "default_rank")]
        rank: u32,
        element: Box<TypeDescriptor>,
    },
    Generic {
        generic: GenericKind,
        #[serde(default)]
        args: Vec<TypeDescriptor>,
    },
    /// An open type parameter (`T`) inside a generic definition.
    GenericParameter,
    Custom,
}

fn default_rank() -> u32 {
    1
}

/// Scalar source types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    Boolean,
    Char,
    Byte,
    SByte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    Guid,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    Uri,
}

/// Which family a closed generic type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenericKind {
    /// `Nullable<T>`
    Nullable,
    /// `Tuple<T1, ..., TN>`
    Tuple,
    /// `Dictionary<K, V>`
    Dictionary,
    /// `Task<T>` / `Task`: a value produced later.
    Deferred,
    /// `IEnumerable<T>`, `List<T>`, ...
    Sequence,
    /// Any user-defined generic type.
    Custom,
}

/// One data member of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Annotated as always present.
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub visibility: Visibility,
    /// Annotated as excluded from serialization.
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub doc_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Private,
}

/// One named constant of an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    #[serde(default)]
    pub doc_key: Option<String>,
}

/// Where a request supplies one parameter's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum BindingSource {
    Path,
    Query,
    Body,
    Header,
    #[default]
    Unbound,
    /// A source outside the known set, kept so it can be reported.
    Unknown(String),
}

impl From<String> for BindingSource {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "path" | "route" => BindingSource::Path,
            "query" => BindingSource::Query,
            "body" => BindingSource::Body,
            "header" => BindingSource::Header,
            "" | "unbound" | "none" => BindingSource::Unbound,
            _ => BindingSource::Unknown(value),
        }
    }
}

impl fmt::Display for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingSource::Path => f.write_str("path"),
            BindingSource::Query => f.write_str("query"),
            BindingSource::Body => f.write_str("body"),
            BindingSource::Header => f.write_str("header"),
            BindingSource::Unbound => f.write_str("unbound"),
            BindingSource::Unknown(other) => f.write_str(other),
        }
    }
}

/// One parameter of a remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterBinding {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(default)]
    pub source: BindingSource,
    /// The parameter has a default value and may be omitted.
    #[serde(default)]
    pub optional: bool,
}

/// HTTP method of a remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    /// A verb outside the supported set.
    Other(String),
}

impl From<String> for HttpMethod {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            "HEAD" => HttpMethod::Head,
            "OPTIONS" => HttpMethod::Options,
            _ => HttpMethod::Other(value),
        }
    }
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Other(verb) => verb,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, HttpMethod::Other(_))
    }
}

/// One remote operation exposed by the host framework.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOperation {
    /// Action name, e.g. `Get`.
    pub name: String,
    /// Qualified owning type, e.g. `Shop.Controllers.OrdersController`.
    pub container: String,
    pub verb: HttpMethod,
    /// Route template, e.g. `api/orders/{id:int}`.
    pub route: String,
    #[serde(default)]
    pub parameters: Vec<ParameterBinding>,
    /// Declared response type; `None` when the action returns nothing.
    #[serde(default)]
    pub response: Option<TypeDescriptor>,
    #[serde(default)]
    pub doc_key: Option<String>,
}

/// Source of the types and operations to compile.
pub trait MetadataProvider {
    fn types(&self) -> &[TypeDescriptor];
    fn operations(&self) -> &[ApiOperation];
}

/// Metadata document as exported by the host framework.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMetadata {
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    #[serde(default)]
    pub operations: Vec<ApiOperation>,
}

impl ApiMetadata {
    /// Parse a metadata document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(LoadError::Metadata)
    }

    /// Read and parse a metadata document from disk.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }
}

impl MetadataProvider for ApiMetadata {
    fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    fn operations(&self) -> &[ApiOperation] {
        &self.operations
    }
}

impl TypeDescriptor {
    /// Build a descriptor with no members, base or type parameters.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind,
            members: Vec::new(),
            base: None,
            enum_members: Vec::new(),
            type_params: Vec::new(),
            doc_key: None,
        }
    }

    /// A `System.*` primitive descriptor.
    pub fn primitive(primitive: PrimitiveKind) -> Self {
        Self::new(
            format!("System.{}", primitive.source_name()),
            "System",
            TypeKind::Primitive { primitive },
        )
    }

    pub fn string() -> Self {
        Self::new("System.String", "System", TypeKind::String)
    }

    /// A closed generic descriptor named after its definition.
    pub fn generic(
        name: impl Into<String>,
        namespace: impl Into<String>,
        generic: GenericKind,
        args: Vec<TypeDescriptor>,
    ) -> Self {
        Self::new(name, namespace, TypeKind::Generic { generic, args })
    }

    pub fn array(element: TypeDescriptor, rank: u32) -> Self {
        let brackets = format!("[{}]", ",".repeat(rank.saturating_sub(1) as usize));
        let name = format!("{}{brackets}", element.name);
        let namespace = element.namespace.clone();
        Self::new(
            name,
            namespace,
            TypeKind::Array {
                rank,
                element: Box::new(element),
            },
        )
    }

    /// Generic arguments of a closed generic, empty otherwise.
    pub fn generic_args(&self) -> &[TypeDescriptor] {
        match &self.kind {
            TypeKind::Generic { args, .. } => args,
            _ => &[],
        }
    }
}

impl PrimitiveKind {
    /// Short CLR-style name, e.g. `Int32`.
    pub fn source_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::SByte => "SByte",
            PrimitiveKind::Int16 => "Int16",
            PrimitiveKind::UInt16 => "UInt16",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::UInt32 => "UInt32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::UInt64 => "UInt64",
            PrimitiveKind::Single => "Single",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::Decimal => "Decimal",
            PrimitiveKind::Guid => "Guid",
            PrimitiveKind::DateTime => "DateTime",
            PrimitiveKind::DateTimeOffset => "DateTimeOffset",
            PrimitiveKind::TimeSpan => "TimeSpan",
            PrimitiveKind::Uri => "Uri",
        }
    }
}
