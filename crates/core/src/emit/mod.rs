//! TypeScript client output.
//!
//! - `ast`: TypeScript syntax tree (types, expressions, statements, classes)
//! - `lower`: declaration graph → syntax tree
//! - `style`: per-flavor request sending and response read-back
//! - `print`: syntax tree → source text (via the `Emit` trait)
//! - `utils`: identifier and string helpers

pub mod ast;
mod lower;
mod print;
mod style;
pub mod utils;

use crate::config::{GeneratorConfig, OutputFlavor};
use crate::ir::NamespaceGroup;

pub use lower::{lower_module, map_type, return_type};
pub use style::{AxiosStyle, BindingStyle, FetchStyle, Request, encode_body, style_for};

/// Trait for emitting TypeScript code from tree nodes.
pub trait Emit {
    fn emit(&self) -> String;
}

/// One generated source file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub path: String,
    pub contents: String,
}

/// File name used for a flavor, e.g. `fetch-client.ts`.
pub fn file_name(flavor: OutputFlavor) -> String {
    format!("{}-client.ts", flavor.as_str())
}

/// Print the graph for one output flavor.
pub fn render(
    groups: &[NamespaceGroup],
    config: &GeneratorConfig,
    flavor: OutputFlavor,
) -> RenderedFile {
    let style = style_for(flavor);
    let contents = lower_module(groups, config, style.as_ref()).emit();
    tracing::debug!(
        flavor = flavor.as_str(),
        bytes = contents.len(),
        "rendered client"
    );
    RenderedFile {
        path: file_name(flavor),
        contents,
    }
}

/// Print one file per configured flavor, each flavor once.
pub fn render_all(groups: &[NamespaceGroup], config: &GeneratorConfig) -> Vec<RenderedFile> {
    let mut flavors = config.output_flavors.clone();
    flavors.sort_unstable();
    flavors.dedup();
    flavors
        .into_iter()
        .map(|flavor| render(groups, config, flavor))
        .collect()
}
