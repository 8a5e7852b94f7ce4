//! Error and diagnostic types.
//!
//! Fatal problems are `CompileError`s and abort the run on the first one
//! found. Recoverable problems are `Diagnostic`s, collected and returned next
//! to the finished graph.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal compilation error. The run produces no output.
#[derive(Debug, Error)]
pub enum CompileError {
    /// More than one parameter is bound to the request body.
    #[error(
        "{container}.{operation}: ambiguous request body, parameters {} are all body-bound",
        .parameters.join(", ")
    )]
    AmbiguousBody {
        container: String,
        operation: String,
        parameters: Vec<String>,
    },

    /// A complex type is bound to the path, query string or a header.
    #[error(
        "{container}.{operation}: parameter '{parameter}' of type '{type_name}' is bound to {binding}, \
         but only primitives, enums and simple arrays can be carried there"
    )]
    UnbindableComplexParameter {
        container: String,
        operation: String,
        parameter: String,
        type_name: String,
        binding: String,
    },

    /// A binding source outside {path, query, body, header, unbound}.
    #[error(
        "{container}.{operation}: parameter '{parameter}' has unresolvable binding source '{binding}'"
    )]
    UnresolvableBinding {
        container: String,
        operation: String,
        parameter: String,
        binding: String,
    },

    /// A required route placeholder with no parameter to fill it.
    #[error(
        "{container}.{operation}: route placeholder '{{{placeholder}}}' in '{route}' has no matching parameter"
    )]
    UnboundRoutePlaceholder {
        container: String,
        operation: String,
        route: String,
        placeholder: String,
    },

    /// A reference into a generated namespace with no declaration behind it.
    #[error("{context}: '{reference}' does not resolve to any generated declaration")]
    UnresolvedReference { context: String, reference: String },
}

/// Error reading one of the compiler's inputs.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse metadata: {0}")]
    Metadata(#[source] serde_json::Error),

    #[error("failed to parse documentation map: {0}")]
    Docs(#[source] serde_json::Error),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Recoverable problem found during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A pending type that is neither record-like nor enum-like.
    UnsupportedTypeShape { type_name: String, reason: String },
    /// An operation whose verb is outside the supported set.
    UnsupportedVerb {
        container: String,
        operation: String,
        verb: String,
    },
    /// A name resolved to itself because it is not generated in this run.
    ExternalReference { reference: String },
    /// Callables that still share a name after disambiguation.
    UnresolvedOverload { container: String, name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedTypeShape { type_name, reason } => {
                write!(f, "skipped type '{type_name}': {reason}")
            }
            Diagnostic::UnsupportedVerb {
                container,
                operation,
                verb,
            } => write!(
                f,
                "skipped operation {container}.{operation}: unsupported HTTP verb '{verb}'"
            ),
            Diagnostic::ExternalReference { reference } => write!(
                f,
                "'{reference}' is not generated in this run and is referenced as-is"
            ),
            Diagnostic::UnresolvedOverload { container, name } => write!(
                f,
                "{container}: callables named '{name}' still collide after disambiguation"
            ),
        }
    }
}
