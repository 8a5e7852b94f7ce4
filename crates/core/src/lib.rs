//! Client declaration compiler.
//!
//! Turns reflected server-side type metadata and remote-operation
//! descriptions into a graph of client declarations (records, enumerations,
//! client containers with callable functions), then prints that graph as
//! TypeScript.
//!
//! The passes of one run:
//! 1. Register: declarable types are entered into a [`TypeRegistry`]
//! 2. Assemble: registered types become namespace-grouped declarations
//! 3. Compile: each operation becomes a [`ClientFunction`] in a container
//! 4. Link: record bases are rewritten and every reference is validated
//! 5. Disambiguate: colliding function names get parameter suffixes
//! 6. Emit: the graph is lowered and printed once per output flavor

#![forbid(unsafe_code)]
#![deny(unused_must_use, missing_debug_implementations)]

pub mod assemble;
pub mod compile;
pub mod config;
pub mod disambiguate;
pub mod docs;
pub mod emit;
pub mod error;
pub mod ir;
pub mod link;
pub mod metadata;
pub mod naming;
pub mod pipeline;
pub mod registry;
pub mod resolve;

pub use config::{BodySerialization, CherryPick, GeneratorConfig, MemberFilter, OutputFlavor};
pub use docs::{DocMap, DocProvider, NoDocs};
pub use emit::{RenderedFile, render, render_all};
pub use error::{CompileError, Diagnostic, LoadError};
pub use ir::{ClientFunction, NamespaceGroup, ReturnStrategy, TypeRef};
pub use metadata::{ApiMetadata, ApiOperation, MetadataProvider, TypeDescriptor};
pub use pipeline::{GenerationOutput, Generator};
pub use registry::TypeRegistry;
pub use resolve::Resolver;
