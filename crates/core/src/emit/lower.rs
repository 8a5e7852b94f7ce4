//! Declaration graph → TypeScript syntax tree.

use super::Emit;
use super::ast::{
    ObjectEntry, TemplatePart, TsClass, TsEnumMember, TsExpr, TsMethod, TsModule, TsNamespace, TsParam,
    TsPrimitive, TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind, VarKind,
};
use super::style::{BindingStyle, Request, encode_body};
use super::utils::{camel_case, sanitize_identifier};
use crate::config::GeneratorConfig;
use crate::ir::{
    ClientFunction, ClientPrimitive, Container, Declaration, DeclarationKind, EnumDecl,
    NamespaceGroup, QueryPart, RecordDecl, ReturnStrategy, TupleShape, TypeRef, UriSegment,
};

const HEADER: &str = "// Generated by typeweave. Do not edit.\n/* eslint-disable */";

/// Locals every method body declares; parameters with these names get a
/// trailing underscore.
const METHOD_LOCALS: &[&str] = &["url", "res", "query", "search", "headers", "item"];

/// Lower a whole graph using one binding style.
pub fn lower_module(
    groups: &[NamespaceGroup],
    config: &GeneratorConfig,
    style: &dyn BindingStyle,
) -> TsModule {
    TsModule {
        header: HEADER.to_string(),
        preamble: style.preamble(),
        namespaces: groups
            .iter()
            .map(|group| lower_namespace(group, config, style))
            .collect(),
    }
}

fn lower_namespace(
    group: &NamespaceGroup,
    config: &GeneratorConfig,
    style: &dyn BindingStyle,
) -> TsNamespace {
    TsNamespace {
        name: group.namespace.clone(),
        types: group.declarations.iter().map(lower_declaration).collect(),
        classes: group
            .containers
            .iter()
            .map(|container| lower_container(container, config, style))
            .collect(),
    }
}

// =============================================================================
// Types
// =============================================================================

/// TypeScript type for a resolved reference.
pub fn map_type(ty: &TypeRef) -> TsType {
    match ty {
        TypeRef::Primitive(primitive) => TsType::Primitive(map_primitive(*primitive)),
        TypeRef::Named {
            namespace,
            name,
            args,
        } => {
            let name = match namespace {
                Some(ns) => format!("{ns}.{name}"),
                None => name.clone(),
            };
            TsType::generic(name, args.iter().map(map_type).collect())
        }
        TypeRef::Array { element, rank } => (0..(*rank).max(1))
            .fold(map_type(element), |inner, _| TsType::Array(Box::new(inner))),
        TypeRef::Nullable(inner) => map_type(inner).or_null(),
        TypeRef::Tuple(shape) => tuple_type(shape),
        TypeRef::Dictionary { key, value } => TsType::Record {
            key: Box::new(dictionary_key(map_type(key))),
            value: Box::new(map_type(value)),
        },
        TypeRef::Sequence(element) => TsType::generic("ReadonlyArray", vec![map_type(element)]),
        TypeRef::RawResponse => TsType::reference("Blob"),
        TypeRef::LooseObject => TsType::Primitive(TsPrimitive::Unknown),
        TypeRef::TypeParameter(name) => TsType::reference(name.clone()),
        TypeRef::Void => TsType::Primitive(TsPrimitive::Void),
    }
}

fn map_primitive(primitive: ClientPrimitive) -> TsPrimitive {
    match primitive {
        ClientPrimitive::Boolean => TsPrimitive::Boolean,
        ClientPrimitive::Integer | ClientPrimitive::Float | ClientPrimitive::Decimal => {
            TsPrimitive::Number
        }
        ClientPrimitive::String
        | ClientPrimitive::Guid
        | ClientPrimitive::DateTime
        | ClientPrimitive::Duration
        | ClientPrimitive::Uri => TsPrimitive::String,
    }
}

/// `{ item1: A; ...; item7: G; rest: { item1: H } }`
fn tuple_type(shape: &TupleShape<TypeRef>) -> TsType {
    let mut props: Vec<TsProp> = shape
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| TsProp {
            name: TupleShape::<TypeRef>::field_name(i + 1),
            ty: map_type(item),
            optional: false,
            doc: None,
        })
        .collect();
    if let Some(rest) = &shape.rest {
        props.push(TsProp {
            name: "rest".into(),
            ty: tuple_type(rest),
            optional: false,
            doc: None,
        });
    }
    TsType::Object(props)
}

/// `Record` keys must be string or number.
fn dictionary_key(key: TsType) -> TsType {
    match key {
        TsType::Primitive(TsPrimitive::String | TsPrimitive::Number) => key,
        _ => TsType::Primitive(TsPrimitive::String),
    }
}

/// Value type a method resolves to, before wrapping in `Promise`.
pub fn return_type(strategy: ReturnStrategy, returns: &TypeRef) -> TsType {
    match strategy {
        ReturnStrategy::Stream => TsType::reference("Blob"),
        ReturnStrategy::DynamicPassthrough => TsType::Primitive(TsPrimitive::Unknown),
        ReturnStrategy::StringPassthrough => TsType::Primitive(TsPrimitive::String).or_null(),
        ReturnStrategy::NoContent => TsType::Primitive(TsPrimitive::Void),
        ReturnStrategy::PrimitiveParse | ReturnStrategy::ComplexDeserialize => map_type(returns),
    }
}

fn or_undefined(ty: TsType) -> TsType {
    let undefined = TsType::Primitive(TsPrimitive::Undefined);
    match ty {
        TsType::Union(mut members) => {
            members.push(undefined);
            TsType::Union(members)
        }
        other => TsType::Union(vec![other, undefined]),
    }
}

// =============================================================================
// Declarations
// =============================================================================

fn lower_declaration(decl: &Declaration) -> TsTypeDef {
    let kind = match &decl.kind {
        DeclarationKind::Record(record) => lower_record(record),
        DeclarationKind::Enumeration(enumeration) => lower_enum(enumeration),
    };
    TsTypeDef {
        name: decl.name.clone(),
        doc: decl.doc.clone(),
        kind,
    }
}

fn lower_record(record: &RecordDecl) -> TypeDefKind {
    TypeDefKind::Interface {
        type_params: record.type_params.clone(),
        extends: record.base.as_ref().map(|base| map_type(&base.target)),
        properties: record
            .fields
            .iter()
            .map(|field| TsProp {
                name: camel_case(&field.name),
                ty: map_type(&field.ty),
                optional: !field.required,
                doc: field.doc.clone(),
            })
            .collect(),
    }
}

/// TypeScript numbers enum members from 0 and then previous + 1, so an
/// initializer is printed only where that rule gives the wrong value.
fn lower_enum(decl: &EnumDecl) -> TypeDefKind {
    let mut next = 0_i64;
    let members = decl
        .values()
        .zip(&decl.members)
        .map(|((name, value), member)| {
            let initializer = (value != next).then_some(value);
            next = value.saturating_add(1);
            TsEnumMember {
                name: name.to_string(),
                initializer,
                doc: member.doc.clone(),
            }
        })
        .collect();
    TypeDefKind::Enum { members }
}

// =============================================================================
// Clients
// =============================================================================

fn lower_container(
    container: &Container,
    config: &GeneratorConfig,
    style: &dyn BindingStyle,
) -> TsClass {
    TsClass {
        name: container.name.clone(),
        doc: None,
        constructor_params: style.constructor_params(),
        methods: container
            .functions
            .iter()
            .map(|function| lower_function(function, config, style))
            .collect(),
    }
}

/// Identifier a parameter is bound to inside a generated method.
fn local_name(name: &str) -> String {
    let mut ident = sanitize_identifier(name);
    if METHOD_LOCALS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

fn lower_function(
    function: &ClientFunction,
    config: &GeneratorConfig,
    style: &dyn BindingStyle,
) -> TsMethod {
    let params = function
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let ty = map_type(&param.ty);
            // Optional slots must trail; earlier ones take `undefined` instead.
            let trailing = function.params[i..].iter().all(|p| p.optional);
            TsParam {
                name: local_name(&param.name),
                ty: if param.optional && !trailing {
                    or_undefined(ty)
                } else {
                    ty
                },
                optional: param.optional && trailing,
            }
        })
        .collect();

    let mut body = url_statements(function);
    let has_headers = !function.headers.is_empty() || function.body.is_some();
    let encoded = function
        .body
        .as_deref()
        .map(|name| encode_body(config.body_serialization, TsExpr::ident(local_name(name))));
    if has_headers {
        body.extend(header_statements(function, encoded.as_ref().map(|(_, ct)| *ct)));
    }
    body.extend(style.send(
        Request {
            method: function.verb.as_str(),
            has_headers,
            body: encoded.map(|(expr, _)| expr),
        },
        function.strategy,
    ));
    let value = return_type(function.strategy, &function.returns);
    body.extend(style.read_back(function.strategy, &value));

    let route = format!("{} {}", function.verb.as_str(), function.uri);
    TsMethod {
        name: camel_case(&function.name),
        doc: Some(match &function.doc {
            Some(doc) => format!("{doc}\n\n{route}"),
            None => route,
        }),
        params,
        return_type: value.promise(),
        body,
        is_async: true,
    }
}

fn is_optional(function: &ClientFunction, parameter: &str) -> bool {
    function.param(parameter).is_some_and(|p| p.optional)
}

fn present(ident: &str) -> TsExpr {
    TsExpr::Raw(format!("{ident} !== undefined && {ident} !== null"))
}

fn url_statements(function: &ClientFunction) -> Vec<TsStmt> {
    let mut parts = vec![TemplatePart::Dynamic(TsExpr::ident("this").member("baseUrl"))];
    for segment in &function.uri.segments {
        match segment {
            UriSegment::Literal(text) => parts.push(TemplatePart::Static(text.clone())),
            UriSegment::Parameter {
                parameter,
                catch_all,
            } => {
                let mut value = local_name(parameter);
                if is_optional(function, parameter) {
                    value = format!("{value} ?? \"\"");
                }
                let encoded = if *catch_all {
                    format!("String({value}).split(\"/\").map(encodeURIComponent).join(\"/\")")
                } else {
                    format!("encodeURIComponent(String({value}))")
                };
                parts.push(TemplatePart::Dynamic(TsExpr::Raw(encoded)));
            }
        }
    }

    let mut stmts = Vec::new();
    if !function.uri.query.is_empty() {
        stmts.push(TsStmt::VarDecl {
            kind: VarKind::Const,
            name: "query".into(),
            init: TsExpr::Raw("new URLSearchParams()".into()),
        });
        stmts.extend(function.uri.query.iter().map(query_statement));
        stmts.push(TsStmt::VarDecl {
            kind: VarKind::Const,
            name: "search".into(),
            init: TsExpr::call(TsExpr::ident("query").member("toString"), vec![]),
        });
        parts.push(TemplatePart::Dynamic(TsExpr::Raw(
            "search ? `?${search}` : \"\"".into(),
        )));
    }
    stmts.push(TsStmt::VarDecl {
        kind: VarKind::Const,
        name: "url".into(),
        init: TsExpr::Template(parts),
    });
    stmts
}

fn query_statement(part: &QueryPart) -> TsStmt {
    let ident = local_name(&part.parameter);
    let key = TsExpr::string(part.key.clone());
    if part.repeated {
        let source = if part.optional {
            format!("{ident} ?? []")
        } else {
            ident
        };
        return TsStmt::Raw(format!(
            "for (const item of {source}) {{\n  query.append({}, String(item));\n}}",
            key.emit()
        ));
    }
    let set = TsStmt::Expr(TsExpr::call(
        TsExpr::ident("query").member("set"),
        vec![
            key,
            TsExpr::call(TsExpr::ident("String"), vec![TsExpr::ident(ident.clone())]),
        ],
    ));
    if part.optional {
        TsStmt::If {
            cond: present(&ident),
            then_body: vec![set],
        }
    } else {
        set
    }
}

fn header_statements(function: &ClientFunction, content_type: Option<&str>) -> Vec<TsStmt> {
    let mut entries = Vec::new();
    if let Some(content_type) = content_type {
        entries.push(ObjectEntry::Property {
            key: "Content-Type".into(),
            value: TsExpr::string(content_type),
        });
    }
    let mut conditional = Vec::new();
    for binding in &function.headers {
        let ident = local_name(&binding.parameter);
        let value = TsExpr::call(TsExpr::ident("String"), vec![TsExpr::ident(ident.clone())]);
        if binding.optional || is_optional(function, &binding.parameter) {
            conditional.push(TsStmt::If {
                cond: present(&ident),
                then_body: vec![TsStmt::Raw(format!(
                    "headers[{}] = {};",
                    TsExpr::string(binding.header.clone()).emit(),
                    value.emit()
                ))],
            });
        } else {
            entries.push(ObjectEntry::Property {
                key: binding.header.clone(),
                value,
            });
        }
    }
    let mut stmts = vec![TsStmt::VarDecl {
        kind: VarKind::Const,
        name: "headers: Record<string, string>".into(),
        init: TsExpr::Object(entries),
    }];
    stmts.extend(conditional);
    stmts
}
