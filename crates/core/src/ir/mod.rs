//! Intermediate representation produced by the compiler passes.
//!
//! - `types`: resolved target type references (`TypeRef`, `TupleShape`)
//! - `graph`: the declaration graph (namespace groups, declarations,
//!   containers, client functions, return strategies)

mod graph;
mod types;

pub use graph::{
    BaseRef, ClientFunction, Container, Declaration, DeclarationKind, EnumDecl, EnumMemberDecl,
    Field, FormalParameter, HeaderBinding, NamespaceGroup, ParameterRole, QueryPart, RecordDecl,
    ReturnStrategy, ReturnStrategyVisitor, UriSegment, UriTemplate,
};
pub use types::{ClientPrimitive, TUPLE_POSITIONAL_LIMIT, TupleShape, TypeRef};
