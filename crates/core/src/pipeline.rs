//! One generation run: registry → assembler → operation compiler → linker →
//! disambiguator.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::assemble::{Assembler, partition_declarable};
use crate::compile::{CompileOutcome, OperationCompiler, container_base_name};
use crate::config::{GeneratorConfig, MemberFilter};
use crate::disambiguate::disambiguate;
use crate::docs::DocProvider;
use crate::error::{CompileError, Diagnostic};
use crate::ir::{Container, NamespaceGroup};
use crate::link::link;
use crate::metadata::MetadataProvider;
use crate::naming::namespace_of;
use crate::registry::TypeRegistry;
use crate::resolve::Resolver;

/// Finished graph plus the warnings collected on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutput {
    pub groups: Vec<NamespaceGroup>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationOutput {
    pub fn declaration_count(&self) -> usize {
        self.groups.iter().map(|g| g.declarations.len()).sum()
    }

    pub fn function_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.containers)
            .map(|c| c.functions.len())
            .sum()
    }
}

/// Runs the compiler passes. Each run uses a fresh registry.
pub struct Generator {
    config: GeneratorConfig,
    filter: Option<Box<dyn MemberFilter>>,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("custom_filter", &self.filter.is_some())
            .finish()
    }
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            filter: None,
        }
    }

    /// Replace the configured cherry-pick policy.
    pub fn with_member_filter(mut self, filter: impl MemberFilter + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Compile metadata into a declaration graph, stopping at the first
    /// fatal error.
    pub fn run(
        &self,
        metadata: &dyn MetadataProvider,
        docs: &dyn DocProvider,
    ) -> Result<GenerationOutput, CompileError> {
        let (pending, mut diagnostics) = partition_declarable(metadata.types());

        let mut registry = TypeRegistry::new();
        registry.register(pending.iter().cloned());
        info!(
            types = registry.len(),
            operations = metadata.operations().len(),
            "starting generation"
        );

        let resolver = Resolver::new(&registry, &self.config);
        let filter: &dyn MemberFilter = match &self.filter {
            Some(filter) => &**filter,
            None => &self.config.cherry_pick,
        };
        let mut groups = Assembler::new(resolver, filter, docs).assemble(&pending);

        let compiler = OperationCompiler::new(resolver, docs);
        let mut containers: BTreeMap<(String, String), Container> = BTreeMap::new();
        for op in metadata.operations() {
            let function = match compiler.compile(op)? {
                CompileOutcome::Compiled(function) => function,
                CompileOutcome::Skipped(diagnostic) => {
                    diagnostics.push(diagnostic);
                    continue;
                }
            };
            let source_namespace = namespace_of(&op.container).to_string();
            let name = format!(
                "{}{}",
                container_base_name(&op.container),
                self.config.container_suffix
            );
            containers
                .entry((source_namespace, name.clone()))
                .or_insert_with(|| Container {
                    name,
                    source_name: op.container.clone(),
                    functions: Vec::new(),
                })
                .functions
                .push(function);
        }
        place_containers(&mut groups, containers, &self.config);

        diagnostics.extend(link(&mut groups, &registry, &self.config)?);
        diagnostics.extend(disambiguate(&mut groups, self.config.disambiguate_by_type));

        let output = GenerationOutput {
            groups,
            diagnostics,
        };
        for diagnostic in &output.diagnostics {
            warn!("{diagnostic}");
        }
        info!(
            namespaces = output.groups.len(),
            declarations = output.declaration_count(),
            functions = output.function_count(),
            warnings = output.diagnostics.len(),
            "generation finished"
        );
        Ok(output)
    }
}

/// Attach containers to the group of their source namespace, creating groups
/// as needed. Keeps groups ordered by namespace.
fn place_containers(
    groups: &mut Vec<NamespaceGroup>,
    containers: BTreeMap<(String, String), Container>,
    config: &GeneratorConfig,
) {
    for ((source_namespace, _), container) in containers {
        let target = config.target_namespace(&source_namespace);
        let index = match groups.iter().position(|g| g.namespace == target) {
            Some(index) => index,
            None => {
                groups.push(NamespaceGroup::new(target, source_namespace));
                groups.len() - 1
            }
        };
        groups[index].containers.push(container);
    }
    groups.sort_by(|a, b| a.namespace.cmp(&b.namespace));
}
