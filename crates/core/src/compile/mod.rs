//! Remote operation → client callable.
//!
//! Each operation is compiled on its own:
//! 1. every binding is checked (known source, simple type when URI-bound)
//! 2. at most one binding may feed the request body
//! 3. the route is parsed and placeholders are matched to bindings
//! 4. the remaining bindings become query entries or request headers
//! 5. the response type picks a return strategy

mod returns;
mod route;

use crate::docs::{self, DocProvider};
use crate::error::{CompileError, Diagnostic};
use crate::ir::{
    ClientFunction, FormalParameter, HeaderBinding, ParameterRole, QueryPart, TypeRef,
    UriSegment, UriTemplate,
};
use crate::metadata::{
    ApiOperation, BindingSource, GenericKind, ParameterBinding, TypeDescriptor, TypeKind,
};
use crate::naming::{namespace_of, short_name, type_token};
use crate::resolve::Resolver;

pub use returns::classify as classify_return;
pub use route::{RoutePart, parse as parse_route};

/// Result of compiling one operation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Compiled(ClientFunction),
    Skipped(Diagnostic),
}

/// Short container name with the host framework's `Controller` suffix removed.
pub fn container_base_name(container: &str) -> String {
    let short = short_name(container, namespace_of(container));
    match short.strip_suffix("Controller") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => short,
    }
}

/// Compiles operations against one resolver.
pub struct OperationCompiler<'a> {
    resolver: Resolver<'a>,
    docs: &'a dyn DocProvider,
}

impl std::fmt::Debug for OperationCompiler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationCompiler")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl<'a> OperationCompiler<'a> {
    pub fn new(resolver: Resolver<'a>, docs: &'a dyn DocProvider) -> Self {
        Self { resolver, docs }
    }

    pub fn compile(&self, op: &ApiOperation) -> Result<CompileOutcome, CompileError> {
        if !op.verb.is_supported() {
            tracing::warn!(
                container = %op.container,
                operation = %op.name,
                verb = op.verb.as_str(),
                "skipping operation with unsupported verb"
            );
            return Ok(CompileOutcome::Skipped(Diagnostic::UnsupportedVerb {
                container: op.container.clone(),
                operation: op.name.clone(),
                verb: op.verb.as_str().to_string(),
            }));
        }

        check_bindings(op)?;

        let (uri, roles) = uri_template(op)?;
        let mut params = Vec::with_capacity(op.parameters.len());
        let mut body = None;
        let mut headers = Vec::new();
        for (binding, role) in op.parameters.iter().zip(roles) {
            match role {
                ParameterRole::Body => body = Some(binding.name.clone()),
                ParameterRole::Header => headers.push(HeaderBinding {
                    header: binding.name.clone(),
                    parameter: binding.name.clone(),
                    optional: binding.optional,
                }),
                ParameterRole::Path | ParameterRole::Query => {}
            }
            params.push(FormalParameter {
                name: binding.name.clone(),
                ty: self.resolver.resolve(&binding.ty),
                type_token: type_token(&binding.ty),
                optional: binding.optional,
                role,
            });
        }

        let returns = op
            .response
            .as_ref()
            .map_or(TypeRef::Void, |ty| self.resolver.resolve(ty));
        let strategy = classify_return(op.response.as_ref());
        let doc = match &op.doc_key {
            Some(key) => self.docs.lookup(key),
            None => self.docs.lookup(&docs::operation_key(&op.container, &op.name)),
        };

        tracing::debug!(
            container = %op.container,
            operation = %op.name,
            uri = %uri,
            ?strategy,
            "compiled operation"
        );

        Ok(CompileOutcome::Compiled(ClientFunction {
            name: op.name.clone(),
            source_name: op.name.clone(),
            verb: op.verb.clone(),
            params,
            returns,
            strategy,
            uri,
            body,
            headers,
            doc,
        }))
    }
}

/// Build the URI template and assign a role to every binding, in
/// declaration order.
fn uri_template(op: &ApiOperation) -> Result<(UriTemplate, Vec<ParameterRole>), CompileError> {
    let mut roles: Vec<Option<ParameterRole>> = op
        .parameters
        .iter()
        .map(|binding| match binding.source {
            BindingSource::Body => Some(ParameterRole::Body),
            BindingSource::Header => Some(ParameterRole::Header),
            _ => None,
        })
        .collect();

    let controller = container_base_name(&op.container);
    let mut template = UriTemplate::default();
    for part in parse_route(&op.route, &controller, &op.name) {
        match part {
            RoutePart::Literal(text) => push_literal(&mut template.segments, &text),
            RoutePart::Placeholder {
                name,
                optional,
                catch_all,
            } => {
                let bound = op.parameters.iter().enumerate().position(|(i, binding)| {
                    roles[i].is_none()
                        && matches!(
                            binding.source,
                            BindingSource::Path | BindingSource::Unbound
                        )
                        && binding.name.eq_ignore_ascii_case(&name)
                });
                match bound {
                    Some(index) => {
                        roles[index] = Some(ParameterRole::Path);
                        template.segments.push(UriSegment::Parameter {
                            parameter: op.parameters[index].name.clone(),
                            catch_all,
                        });
                    }
                    None if optional => {
                        tracing::debug!(
                            operation = %op.name,
                            placeholder = %name,
                            "dropping unbound optional placeholder"
                        );
                        trim_trailing_slash(&mut template.segments);
                    }
                    None => {
                        return Err(CompileError::UnboundRoutePlaceholder {
                            container: op.container.clone(),
                            operation: op.name.clone(),
                            route: op.route.clone(),
                            placeholder: name,
                        });
                    }
                }
            }
        }
    }

    let roles: Vec<ParameterRole> = op
        .parameters
        .iter()
        .zip(roles)
        .map(|(binding, role)| match role {
            Some(role) => role,
            None => {
                template.query.push(QueryPart {
                    key: binding.name.clone(),
                    parameter: binding.name.clone(),
                    optional: binding.optional || is_nullable(&binding.ty),
                    repeated: is_collection(&binding.ty),
                });
                ParameterRole::Query
            }
        })
        .collect();
    Ok((template, roles))
}

/// Reject unknown sources, complex URI-bound types and multiple bodies.
fn check_bindings(op: &ApiOperation) -> Result<(), CompileError> {
    let mut bodies = Vec::new();
    for binding in &op.parameters {
        match &binding.source {
            BindingSource::Unknown(source) => {
                return Err(CompileError::UnresolvableBinding {
                    container: op.container.clone(),
                    operation: op.name.clone(),
                    parameter: binding.name.clone(),
                    binding: source.clone(),
                });
            }
            BindingSource::Body => bodies.push(binding.name.clone()),
            BindingSource::Path
            | BindingSource::Query
            | BindingSource::Header
            | BindingSource::Unbound => check_simple(op, binding)?,
        }
    }
    if bodies.len() > 1 {
        return Err(CompileError::AmbiguousBody {
            container: op.container.clone(),
            operation: op.name.clone(),
            parameters: bodies,
        });
    }
    Ok(())
}

fn check_simple(op: &ApiOperation, binding: &ParameterBinding) -> Result<(), CompileError> {
    if is_simple(&binding.ty) {
        return Ok(());
    }
    Err(CompileError::UnbindableComplexParameter {
        container: op.container.clone(),
        operation: op.name.clone(),
        parameter: binding.name.clone(),
        type_name: binding.ty.name.clone(),
        binding: binding.source.to_string(),
    })
}

fn peel_nullable(ty: &TypeDescriptor) -> &TypeDescriptor {
    match &ty.kind {
        TypeKind::Generic {
            generic: GenericKind::Nullable,
            args,
        } if args.len() == 1 => peel_nullable(&args[0]),
        _ => ty,
    }
}

fn is_nullable(ty: &TypeDescriptor) -> bool {
    matches!(
        ty.kind,
        TypeKind::Generic {
            generic: GenericKind::Nullable,
            ..
        }
    )
}

fn is_scalar(ty: &TypeDescriptor) -> bool {
    matches!(
        peel_nullable(ty).kind,
        TypeKind::Primitive { .. } | TypeKind::String | TypeKind::Enum
    )
}

/// Element type of a one-dimensional array or sequence.
fn collection_element(ty: &TypeDescriptor) -> Option<&TypeDescriptor> {
    match &peel_nullable(ty).kind {
        TypeKind::Array { rank: 1, element } => Some(element),
        TypeKind::Generic {
            generic: GenericKind::Sequence,
            args,
        } if args.len() == 1 => Some(&args[0]),
        _ => None,
    }
}

fn is_collection(ty: &TypeDescriptor) -> bool {
    collection_element(ty).is_some()
}

/// Primitives, strings, enums and one-dimensional collections of those.
fn is_simple(ty: &TypeDescriptor) -> bool {
    is_scalar(ty) || collection_element(ty).is_some_and(is_scalar)
}

/// Append literal text, merging into a preceding literal segment.
fn push_literal(segments: &mut Vec<UriSegment>, text: &str) {
    if let Some(UriSegment::Literal(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(UriSegment::Literal(text.to_string()));
    }
}

fn trim_trailing_slash(segments: &mut [UriSegment]) {
    if let Some(UriSegment::Literal(text)) = segments.last_mut()
        && text.len() > 1
        && text.ends_with('/')
    {
        text.pop();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::docs::NoDocs;
    use crate::ir::{ClientPrimitive, ReturnStrategy};
    use crate::metadata::{HttpMethod, PrimitiveKind};
    use crate::registry::TypeRegistry;

    fn int() -> TypeDescriptor {
        TypeDescriptor::primitive(PrimitiveKind::Int32)
    }

    fn order() -> TypeDescriptor {
        TypeDescriptor::new("Shop.Models.Order", "Shop.Models", TypeKind::Custom)
    }

    fn bind(name: &str, ty: TypeDescriptor, source: BindingSource) -> ParameterBinding {
        ParameterBinding {
            name: name.into(),
            ty,
            source,
            optional: false,
        }
    }

    fn op(verb: &str, route: &str, parameters: Vec<ParameterBinding>) -> ApiOperation {
        ApiOperation {
            name: "Get".into(),
            container: "Shop.Controllers.OrdersController".into(),
            verb: HttpMethod::from(verb.to_string()),
            route: route.into(),
            parameters,
            response: Some(order()),
            doc_key: None,
        }
    }

    fn compile(op: &ApiOperation) -> Result<CompileOutcome, CompileError> {
        let mut registry = TypeRegistry::new();
        registry.register([order()]);
        let config = GeneratorConfig::default();
        OperationCompiler::new(Resolver::new(&registry, &config), &NoDocs).compile(op)
    }

    fn compiled(op: &ApiOperation) -> ClientFunction {
        match compile(op).unwrap() {
            CompileOutcome::Compiled(function) => function,
            CompileOutcome::Skipped(diagnostic) => panic!("skipped: {diagnostic}"),
        }
    }

    #[test]
    fn test_container_base_name() {
        assert_eq!(container_base_name("Shop.Controllers.OrdersController"), "Orders");
        assert_eq!(container_base_name("Shop.Controllers.Controller"), "Controller");
        assert_eq!(container_base_name("Shop.Api.Reports"), "Reports");
    }

    #[test]
    fn test_path_and_query_parameters() {
        let mut page = bind("page", int(), BindingSource::Query);
        page.optional = true;
        let function = compiled(&op(
            "GET",
            "api/orders/{id:int}",
            vec![bind("id", int(), BindingSource::Path), page],
        ));
        assert_eq!(function.uri.to_string(), "/api/orders/{id}?page={page?}");
        assert_eq!(function.params.len(), 2);
        assert_eq!(function.params[0].role, ParameterRole::Path);
        assert_eq!(function.params[1].role, ParameterRole::Query);
        assert_eq!(function.params[0].ty, TypeRef::Primitive(ClientPrimitive::Integer));
        assert_eq!(function.params[0].type_token, "Int32");
        assert_eq!(function.strategy, ReturnStrategy::ComplexDeserialize);
        assert_eq!(
            function.returns,
            TypeRef::named(Some("Shop.Models.Client".into()), "Order")
        );
    }

    #[test]
    fn test_unbound_simple_parameter_fills_placeholder() {
        let function = compiled(&op(
            "GET",
            "api/orders/{id}",
            vec![bind("Id", int(), BindingSource::Unbound)],
        ));
        assert_eq!(function.uri.to_string(), "/api/orders/{Id}");
    }

    #[test]
    fn test_path_binding_without_placeholder_goes_to_query() {
        let function = compiled(&op(
            "GET",
            "api/orders",
            vec![bind("id", int(), BindingSource::Path)],
        ));
        assert_eq!(function.uri.to_string(), "/api/orders?id={id}");
        assert_eq!(function.params[0].role, ParameterRole::Query);
    }

    #[test]
    fn test_body_and_headers() {
        let function = compiled(&op(
            "POST",
            "api/orders",
            vec![
                bind("order", order(), BindingSource::Body),
                bind("X-Tenant", TypeDescriptor::string(), BindingSource::Header),
            ],
        ));
        assert_eq!(function.body.as_deref(), Some("order"));
        assert_eq!(function.headers.len(), 1);
        assert_eq!(function.headers[0].header, "X-Tenant");
        assert!(function.uri.query.is_empty());
    }

    #[test]
    fn test_ambiguous_body_is_fatal() {
        let err = compile(&op(
            "POST",
            "api/orders",
            vec![
                bind("order", order(), BindingSource::Body),
                bind("audit", order(), BindingSource::Body),
            ],
        ))
        .unwrap_err();
        match err {
            CompileError::AmbiguousBody {
                container,
                operation,
                parameters,
            } => {
                assert_eq!(container, "Shop.Controllers.OrdersController");
                assert_eq!(operation, "Get");
                assert_eq!(parameters, vec!["order", "audit"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_complex_query_parameter_is_fatal() {
        let err = compile(&op(
            "GET",
            "api/orders",
            vec![bind("filter", order(), BindingSource::Query)],
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnbindableComplexParameter { ref parameter, .. } if parameter == "filter"
        ));
    }

    #[test]
    fn test_simple_arrays_repeat_in_query() {
        let ids = bind("ids", TypeDescriptor::array(int(), 1), BindingSource::Query);
        let function = compiled(&op("GET", "api/orders", vec![ids]));
        assert!(function.uri.query[0].repeated);

        let grid = bind("grid", TypeDescriptor::array(int(), 2), BindingSource::Query);
        assert!(compile(&op("GET", "api/orders", vec![grid])).is_err());
    }

    #[test]
    fn test_unknown_binding_source_is_fatal() {
        let err = compile(&op(
            "GET",
            "api/orders",
            vec![bind("session", TypeDescriptor::string(), BindingSource::Unknown("Cookie".into()))],
        ))
        .unwrap_err();
        assert!(matches!(err, CompileError::UnresolvableBinding { .. }));
    }

    #[test]
    fn test_required_placeholder_without_binding_is_fatal() {
        let err = compile(&op("GET", "api/orders/{id}", vec![])).unwrap_err();
        assert!(matches!(err, CompileError::UnboundRoutePlaceholder { .. }));
    }

    #[test]
    fn test_optional_placeholder_without_binding_is_dropped() {
        let function = compiled(&op("GET", "api/orders/{id?}", vec![]));
        assert_eq!(function.uri.to_string(), "/api/orders");
    }

    #[test]
    fn test_consecutive_optional_placeholders_dropped() {
        let function = compiled(&op("GET", "api/{a?}/{b?}", vec![]));
        assert_eq!(
            function.uri.segments,
            vec![UriSegment::Literal("/api".into())]
        );

        let function = compiled(&op("GET", "api/{a?}/tail", vec![]));
        assert_eq!(function.uri.to_string(), "/api/tail");
    }

    #[test]
    fn test_unsupported_verb_is_skipped() {
        let outcome = compile(&op("PROPFIND", "api/orders", vec![])).unwrap();
        assert!(matches!(
            outcome,
            CompileOutcome::Skipped(Diagnostic::UnsupportedVerb { .. })
        ));
    }

    #[test]
    fn test_no_response_is_void() {
        let mut operation = op("DELETE", "api/orders", vec![]);
        operation.response = None;
        let function = compiled(&operation);
        assert_eq!(function.returns, TypeRef::Void);
        assert_eq!(function.strategy, ReturnStrategy::NoContent);
    }
}
