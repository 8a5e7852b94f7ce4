#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use typeweave_core::ir::{
    ClientFunction, ClientPrimitive, Container, DeclarationKind, NamespaceGroup, RecordDecl,
    ReturnStrategy, TypeRef,
};
use typeweave_core::{
    ApiMetadata, CompileError, Diagnostic, DocMap, GenerationOutput, Generator, GeneratorConfig,
    NoDocs, OutputFlavor, render, render_all,
};

const SHOP: &str = include_str!("fixtures/shop.json");
const DOCS: &str = include_str!("fixtures/docs.json");

fn generate(config: GeneratorConfig) -> GenerationOutput {
    let metadata = ApiMetadata::from_json(SHOP).unwrap();
    let docs = DocMap::from_json(DOCS).unwrap();
    Generator::new(config).run(&metadata, &docs).unwrap()
}

fn group<'a>(output: &'a GenerationOutput, namespace: &str) -> &'a NamespaceGroup {
    output
        .groups
        .iter()
        .find(|g| g.namespace == namespace)
        .unwrap_or_else(|| panic!("missing namespace {namespace}"))
}

fn record<'a>(group: &'a NamespaceGroup, name: &str) -> &'a RecordDecl {
    let decl = group.declarations.iter().find(|d| d.name == name).unwrap();
    match &decl.kind {
        DeclarationKind::Record(record) => record,
        DeclarationKind::Enumeration(_) => panic!("{name} is an enumeration"),
    }
}

fn container<'a>(output: &'a GenerationOutput, name: &str) -> &'a Container {
    group(output, "Shop.Controllers.Client")
        .containers
        .iter()
        .find(|c| c.name == name)
        .unwrap()
}

fn function<'a>(container: &'a Container, name: &str) -> &'a ClientFunction {
    container.functions.iter().find(|f| f.name == name).unwrap()
}

fn models(name: &str) -> TypeRef {
    TypeRef::named(Some("Shop.Models.Client".into()), name)
}

#[test]
fn test_namespaces_are_suffixed_and_sorted() {
    let output = generate(GeneratorConfig::default());
    let namespaces: Vec<_> = output.groups.iter().map(|g| g.namespace.as_str()).collect();
    assert_eq!(
        namespaces,
        vec!["Shop.Common.Client", "Shop.Controllers.Client", "Shop.Models.Client"]
    );
    let names: Vec<_> = group(&output, "Shop.Models.Client")
        .declarations
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, vec!["Order", "OrderLine", "OrderStatus", "Page"]);
}

#[test]
fn test_warnings_are_collected_not_fatal() {
    let output = generate(GeneratorConfig::default());
    assert_eq!(output.diagnostics.len(), 2);
    assert!(matches!(
        &output.diagnostics[0],
        Diagnostic::UnsupportedTypeShape { type_name, .. } if type_name == "Shop.Models.Pair"
    ));
    assert!(matches!(
        &output.diagnostics[1],
        Diagnostic::UnsupportedVerb { verb, .. } if verb == "LOCK"
    ));
}

#[test]
fn test_record_fields_docs_and_linked_base() {
    let output = generate(GeneratorConfig::default());
    let models_group = group(&output, "Shop.Models.Client");
    let order = record(models_group, "Order");

    let fields: Vec<_> = order.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        fields,
        vec!["Number", "Status", "Lines", "PlacedAt", "Attributes"]
    );
    assert_eq!(
        order.fields[0].doc.as_deref(),
        Some("Human-readable order number.")
    );
    assert_eq!(order.fields[1].ty, models("OrderStatus"));
    assert_eq!(
        order.fields[2].ty,
        TypeRef::Array {
            element: Box::new(models("OrderLine")),
            rank: 1,
        }
    );
    assert_eq!(
        order.fields[3].ty,
        TypeRef::nullable(TypeRef::Primitive(ClientPrimitive::DateTime))
    );

    let base = order.base.as_ref().unwrap();
    assert_eq!(
        base.target,
        TypeRef::named(Some("Shop.Common.Client".into()), "Entity")
    );

    let doc = models_group
        .declarations
        .iter()
        .find(|d| d.name == "Order")
        .and_then(|d| d.doc.as_deref());
    assert_eq!(doc, Some("A customer order."));
}

#[test]
fn test_generic_record_keeps_type_parameters() {
    let output = generate(GeneratorConfig::default());
    let page = record(group(&output, "Shop.Models.Client"), "Page");
    assert_eq!(page.type_params, vec!["T".to_string()]);
    assert_eq!(
        page.fields[0].ty,
        TypeRef::Array {
            element: Box::new(TypeRef::TypeParameter("T".into())),
            rank: 1,
        }
    );
}

#[test]
fn test_enum_members_are_compacted() {
    let output = generate(GeneratorConfig::default());
    let decl = group(&output, "Shop.Models.Client")
        .declarations
        .iter()
        .find(|d| d.name == "OrderStatus")
        .unwrap();
    let DeclarationKind::Enumeration(status) = &decl.kind else {
        panic!("OrderStatus is an enumeration");
    };
    assert_eq!(status.index_base, 1);
    let explicit: Vec<_> = status.members.iter().map(|m| m.explicit).collect();
    assert_eq!(explicit, vec![None, None, Some(10)]);
    assert_eq!(
        status.members[2].doc.as_deref(),
        Some("Cancelled by the customer.")
    );
}

#[test]
fn test_containers_and_overloads() {
    let output = generate(GeneratorConfig::default());
    let names: Vec<_> = group(&output, "Shop.Controllers.Client")
        .containers
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["FilesClient", "OrdersClient"]);

    let orders = container(&output, "OrdersClient");
    let functions: Vec<_> = orders.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        functions,
        vec!["GetById", "GetByPageAndTags", "Create", "Invoice", "Note", "Count"]
    );
}

#[test]
fn test_overloads_by_type() {
    let config = GeneratorConfig {
        disambiguate_by_type: true,
        ..GeneratorConfig::default()
    };
    let output = generate(config);
    let orders = container(&output, "OrdersClient");
    assert_eq!(orders.functions[0].name, "GetByIdOfInt32");
    assert!(orders.functions[1].name.starts_with("GetByPageOfInt32AndTagsOf"));
}

#[test]
fn test_compiled_operations() {
    let output = generate(GeneratorConfig::default());
    let orders = container(&output, "OrdersClient");

    let get = function(orders, "GetById");
    assert_eq!(get.uri.to_string(), "/api/Orders/{id}");
    assert_eq!(get.doc.as_deref(), Some("Loads one order."));
    assert_eq!(get.strategy, ReturnStrategy::ComplexDeserialize);
    assert_eq!(get.returns, models("Order"));

    let list = function(orders, "GetByPageAndTags");
    assert_eq!(list.uri.to_string(), "/api/orders?page={page?}&tags={tags}");
    assert!(list.uri.query[1].repeated);
    assert_eq!(
        list.returns,
        TypeRef::Named {
            namespace: Some("Shop.Models.Client".into()),
            name: "Page".into(),
            args: vec![models("Order")],
        }
    );

    let create = function(orders, "Create");
    assert_eq!(create.body.as_deref(), Some("order"));
    assert_eq!(create.headers[0].header, "X-Tenant");
    assert_eq!(create.strategy, ReturnStrategy::NoContent);
    assert_eq!(create.returns, TypeRef::Void);

    let invoice = function(orders, "Invoice");
    assert_eq!(invoice.uri.to_string(), "/api/orders/{id}/invoice");
    assert_eq!(invoice.strategy, ReturnStrategy::Stream);

    assert_eq!(
        function(orders, "Note").strategy,
        ReturnStrategy::StringPassthrough
    );
    let count = function(orders, "Count");
    assert_eq!(count.strategy, ReturnStrategy::PrimitiveParse);
    assert_eq!(count.returns, TypeRef::Primitive(ClientPrimitive::Integer));

    let files = container(&output, "FilesClient");
    let fetch = function(files, "Fetch");
    assert_eq!(fetch.uri.to_string(), "/files/{*path}");
    assert_eq!(fetch.strategy, ReturnStrategy::Stream);
}

#[test]
fn test_runs_are_deterministic() {
    let first = generate(GeneratorConfig::default());
    let second = generate(GeneratorConfig::default());
    assert_eq!(first, second);
    let config = GeneratorConfig::default();
    assert_eq!(
        render_all(&first.groups, &config),
        render_all(&second.groups, &config)
    );
}

#[test]
fn test_render_fetch_client() {
    let config = GeneratorConfig::default();
    let output = generate(config.clone());
    let file = render(&output.groups, &config, OutputFlavor::Fetch);
    let ts = file.contents;

    assert!(ts.contains("export namespace Shop.Models.Client {"));
    assert!(ts.contains("  /** A customer order. */\n  export interface Order extends Shop.Common.Client.Entity {\n"));
    assert!(ts.contains("    lines?: Shop.Models.Client.OrderLine[];\n"));
    assert!(ts.contains("    placedAt?: string | null;\n"));
    assert!(ts.contains("    attributes?: Record<string, number>;\n"));
    assert!(!ts.contains("internalNote"));
    assert!(ts.contains("  export interface Page<T> {\n    items: T[];\n    total: number;\n  }\n"));
    assert!(ts.contains(
        "  export enum OrderStatus {\n    Pending = 1,\n    Shipped,\n    /** Cancelled by the customer. */\n    Cancelled = 10,\n  }\n"
    ));
    assert!(ts.contains(
        "async getByPageAndTags(page: number | undefined, tags: string[]): Promise<Shop.Models.Client.Page<Shop.Models.Client.Order>> {"
    ));
    assert!(ts.contains("async create(order: Shop.Models.Client.Order, xTenant: string): Promise<void> {"));
    assert!(ts.contains("async note(id: number): Promise<string | null> {"));
    assert!(ts.contains("async fetch(path: string): Promise<Blob> {"));
    assert!(ts.contains("String(path).split(\"/\").map(encodeURIComponent).join(\"/\")"));
}

#[test]
fn test_render_axios_client() {
    let config = GeneratorConfig {
        output_flavors: vec![OutputFlavor::Axios],
        ..GeneratorConfig::default()
    };
    let output = generate(config.clone());
    let files = render_all(&output.groups, &config);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "axios-client.ts");
    assert!(files[0].contents.contains("constructor(private readonly http: AxiosInstance"));
    assert!(files[0].contents.contains("responseType: \"blob\""));
    assert!(!files[0].contents.contains("ApiError"));
}

#[test]
fn test_sequence_kept_when_not_flattened() {
    let config = GeneratorConfig {
        sequence_to_array: false,
        ..GeneratorConfig::default()
    };
    let output = generate(config.clone());
    let order = record(group(&output, "Shop.Models.Client"), "Order");
    assert_eq!(
        order.fields[2].ty,
        TypeRef::Sequence(Box::new(models("OrderLine")))
    );
    let ts = render(&output.groups, &config, OutputFlavor::Fetch).contents;
    assert!(ts.contains("lines?: ReadonlyArray<Shop.Models.Client.OrderLine>;"));
}

#[test]
fn test_unbound_required_placeholder_is_fatal() {
    let json = r#"{
      "operations": [{
        "name": "Get",
        "container": "Shop.OrdersController",
        "verb": "GET",
        "route": "orders/{id}"
      }]
    }"#;
    let metadata = ApiMetadata::from_json(json).unwrap();
    let err = Generator::new(GeneratorConfig::default())
        .run(&metadata, &NoDocs)
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnboundRoutePlaceholder { ref placeholder, .. } if placeholder == "id"
    ));
}

#[test]
fn test_complex_query_parameter_is_fatal() {
    let json = r#"{
      "types": [{ "name": "Shop.Filter", "namespace": "Shop", "kind": { "type": "custom" } }],
      "operations": [{
        "name": "Search",
        "container": "Shop.OrdersController",
        "verb": "GET",
        "route": "orders",
        "parameters": [
          { "name": "filter", "type": { "name": "Shop.Filter", "namespace": "Shop", "kind": { "type": "custom" } }, "source": "query" }
        ]
      }]
    }"#;
    let metadata = ApiMetadata::from_json(json).unwrap();
    let err = Generator::new(GeneratorConfig::default())
        .run(&metadata, &NoDocs)
        .unwrap_err();
    assert!(matches!(err, CompileError::UnbindableComplexParameter { .. }));
}

#[test]
fn test_repeated_type_is_declared_once() {
    let json = r#"{
      "types": [
        { "name": "Shop.Order", "namespace": "Shop", "kind": { "type": "enum" },
          "enumMembers": [{ "name": "Open", "value": 0 }, { "name": "Closed", "value": 1 }] },
        { "name": "Shop.Order", "namespace": "Shop", "kind": { "type": "enum" },
          "enumMembers": [{ "name": "Open", "value": 0 }] }
      ]
    }"#;
    let metadata = ApiMetadata::from_json(json).unwrap();
    let config = GeneratorConfig::default();
    let output = Generator::new(config.clone()).run(&metadata, &NoDocs).unwrap();
    assert_eq!(output.declaration_count(), 1);
    let ts = render(&output.groups, &config, OutputFlavor::Fetch).contents;
    assert_eq!(ts.matches("export enum Order").count(), 1);
    assert!(ts.contains("    Closed,\n"));
}
