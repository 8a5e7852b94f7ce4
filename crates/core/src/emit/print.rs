//! `Emit` implementations for the TypeScript tree.

use super::Emit;
use super::ast::{
    ObjectEntry, TemplatePart, TsClass, TsEnumMember, TsExpr, TsLiteral, TsMethod, TsModule,
    TsNamespace, TsParam, TsPrimitive, TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind, VarKind,
};
use super::utils::{escape_js_string, escape_template, quote_if_needed};

const INDENT: &str = "  ";

// =============================================================================
// Types
// =============================================================================

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Undefined => "undefined",
            TsPrimitive::Void => "void",
            TsPrimitive::Unknown => "unknown",
        }
        .to_string()
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                if matches!(**inner, TsType::Union(_)) {
                    format!("({})[]", inner.emit())
                } else {
                    format!("{}[]", inner.emit())
                }
            }
            TsType::Union(members) => join(members, " | "),
            TsType::Object(props) => {
                if props.is_empty() {
                    "{}".to_string()
                } else {
                    let parts: Vec<_> = props.iter().map(Emit::emit).collect();
                    format!("{{ {} }}", parts.join("; "))
                }
            }
            TsType::Record { key, value } => format!("Record<{}, {}>", key.emit(), value.emit()),
            TsType::Ref { name, args } if args.is_empty() => name.clone(),
            TsType::Ref { name, args } => format!("{name}<{}>", join(args, ", ")),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        format!("{}{opt}: {}", quote_if_needed(&self.name), self.ty.emit())
    }
}

fn join<T: Emit>(items: &[T], sep: &str) -> String {
    items.iter().map(Emit::emit).collect::<Vec<_>>().join(sep)
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call { callee, args } => format!("{}({})", callee.emit(), join(args, ", ")),
            TsExpr::Member { object, prop } => format!("{}.{prop}", object.emit()),
            TsExpr::Template(parts) => {
                let content: String = parts
                    .iter()
                    .map(|part| match part {
                        TemplatePart::Static(s) => escape_template(s),
                        TemplatePart::Dynamic(e) => format!("${{{}}}", e.emit()),
                    })
                    .collect();
                format!("`{content}`")
            }
            TsExpr::Await(expr) => format!("await {}", expr.emit()),
            TsExpr::New { callee, args } => format!("new {}({})", callee.emit(), join(args, ", ")),
            TsExpr::Object(entries) => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                let parts: Vec<_> = entries
                    .iter()
                    .map(|entry| match entry {
                        ObjectEntry::Property { key, value } => {
                            format!("{}: {}", quote_if_needed(key), value.emit())
                        }
                        ObjectEntry::Spread(expr) => format!("...{}", expr.emit()),
                    })
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
            TsExpr::Cast { expr, ty } => format!("{} as {}", expr.emit(), ty.emit()),
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        format!("{}{opt}: {}", self.name, self.ty.emit())
    }
}

// =============================================================================
// Statements
// =============================================================================

impl TsStmt {
    /// Emit with the given indentation level (2 spaces per level).
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        match self {
            TsStmt::VarDecl { kind, name, init } => {
                let kind = match kind {
                    VarKind::Const => "const",
                    VarKind::Let => "let",
                };
                format!("{prefix}{kind} {name} = {};\n", init.emit())
            }
            TsStmt::Expr(expr) => format!("{prefix}{};\n", expr.emit()),
            TsStmt::Return(Some(expr)) => format!("{prefix}return {};\n", expr.emit()),
            TsStmt::Return(None) => format!("{prefix}return;\n"),
            TsStmt::If { cond, then_body } => {
                let mut output = format!("{prefix}if ({}) {{\n", cond.emit());
                for stmt in then_body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
            TsStmt::Raw(code) => indent_lines(code, &prefix),
        }
    }
}

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

fn indent_lines(code: &str, prefix: &str) -> String {
    code.lines()
        .map(|line| {
            if line.is_empty() {
                "\n".to_string()
            } else {
                format!("{prefix}{line}\n")
            }
        })
        .collect()
}

fn doc_comment(doc: Option<&str>, prefix: &str) -> String {
    let Some(doc) = doc else {
        return String::new();
    };
    let lines: Vec<&str> = doc.lines().map(str::trim).collect();
    if let [single] = lines.as_slice() {
        return format!("{prefix}/** {} */\n", single.replace("*/", "*\\/"));
    }
    let mut output = format!("{prefix}/**\n");
    for line in lines {
        let line = line.replace("*/", "*\\/");
        if line.is_empty() {
            output.push_str(&format!("{prefix} *\n"));
        } else {
            output.push_str(&format!("{prefix} * {line}\n"));
        }
    }
    output.push_str(&format!("{prefix} */\n"));
    output
}

// =============================================================================
// Declarations
// =============================================================================

impl TsTypeDef {
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        let inner = INDENT.repeat(indent + 1);
        let mut output = doc_comment(self.doc.as_deref(), &prefix);
        match &self.kind {
            TypeDefKind::Interface {
                type_params,
                extends,
                properties,
            } => {
                output.push_str(&format!("{prefix}export interface {}", self.name));
                if !type_params.is_empty() {
                    output.push_str(&format!("<{}>", type_params.join(", ")));
                }
                if let Some(base) = extends {
                    output.push_str(&format!(" extends {}", base.emit()));
                }
                output.push_str(" {\n");
                for prop in properties {
                    output.push_str(&doc_comment(prop.doc.as_deref(), &inner));
                    output.push_str(&format!("{inner}{};\n", prop.emit()));
                }
                output.push_str(&format!("{prefix}}}\n"));
            }
            TypeDefKind::Enum { members } => {
                output.push_str(&format!("{prefix}export enum {} {{\n", self.name));
                for member in members {
                    output.push_str(&member.emit_indented(indent + 1));
                }
                output.push_str(&format!("{prefix}}}\n"));
            }
        }
        output
    }
}

impl TsEnumMember {
    fn emit_indented(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        let mut output = doc_comment(self.doc.as_deref(), &prefix);
        let name = quote_if_needed(&self.name);
        match self.initializer {
            Some(value) => output.push_str(&format!("{prefix}{name} = {value},\n")),
            None => output.push_str(&format!("{prefix}{name},\n")),
        }
        output
    }
}

impl TsMethod {
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        let mut output = doc_comment(self.doc.as_deref(), &prefix);
        let async_kw = if self.is_async { "async " } else { "" };
        output.push_str(&format!(
            "{prefix}{async_kw}{}({}): {} {{\n",
            self.name,
            join(&self.params, ", "),
            self.return_type.emit()
        ));
        for stmt in &self.body {
            output.push_str(&stmt.emit_indented(indent + 1));
        }
        output.push_str(&format!("{prefix}}}\n"));
        output
    }
}

impl TsClass {
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        let inner = INDENT.repeat(indent + 1);
        let mut output = doc_comment(self.doc.as_deref(), &prefix);
        output.push_str(&format!("{prefix}export class {} {{\n", self.name));
        output.push_str(&format!("{inner}constructor({}) {{}}\n", self.constructor_params));
        for method in &self.methods {
            output.push('\n');
            output.push_str(&method.emit_indented(indent + 1));
        }
        output.push_str(&format!("{prefix}}}\n"));
        output
    }
}

impl Emit for TsNamespace {
    fn emit(&self) -> String {
        let mut blocks: Vec<String> = self.types.iter().map(|t| t.emit_indented(1)).collect();
        blocks.extend(self.classes.iter().map(|c| c.emit_indented(1)));
        format!("export namespace {} {{\n{}}}\n", self.name, blocks.join("\n"))
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut sections = vec![self.header.clone()];
        sections.extend(self.preamble.iter().cloned());
        sections.extend(self.namespaces.iter().map(Emit::emit));
        let mut output = sections
            .iter()
            .map(|s| s.trim_end())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        output.push('\n');
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number() -> TsType {
        TsType::Primitive(TsPrimitive::Number)
    }

    #[test]
    fn test_emit_types() {
        assert_eq!(TsType::Array(Box::new(number())).emit(), "number[]");
        assert_eq!(
            TsType::Array(Box::new(number().or_null())).emit(),
            "(number | null)[]"
        );
        assert_eq!(
            TsType::generic("Page", vec![TsType::reference("A.Order")]).emit(),
            "Page<A.Order>"
        );
        assert_eq!(
            TsType::Record {
                key: Box::new(TsType::Primitive(TsPrimitive::String)),
                value: Box::new(number()),
            }
            .emit(),
            "Record<string, number>"
        );
    }

    #[test]
    fn test_or_null_does_not_duplicate() {
        let ty = number().or_null().or_null();
        assert_eq!(ty.emit(), "number | null");
    }

    #[test]
    fn test_emit_object_type() {
        let ty = TsType::Object(vec![
            TsProp {
                name: "item1".into(),
                ty: number(),
                optional: false,
                doc: None,
            },
            TsProp {
                name: "rest".into(),
                ty: TsType::Object(vec![]),
                optional: false,
                doc: None,
            },
        ]);
        assert_eq!(ty.emit(), "{ item1: number; rest: {} }");
    }

    #[test]
    fn test_emit_template_escapes_static_text() {
        let expr = TsExpr::Template(vec![
            TemplatePart::Static("/a`b/".into()),
            TemplatePart::Dynamic(TsExpr::ident("id")),
        ]);
        assert_eq!(expr.emit(), "`/a\\`b/${id}`");
    }

    #[test]
    fn test_emit_interface_with_docs() {
        let def = TsTypeDef {
            name: "Order".into(),
            doc: Some("An order.".into()),
            kind: TypeDefKind::Interface {
                type_params: vec![],
                extends: Some(TsType::reference("Shop.Common.Client.Entity")),
                properties: vec![TsProp {
                    name: "id".into(),
                    ty: number(),
                    optional: false,
                    doc: Some("Identifier.\nNever reused.".into()),
                }],
            },
        };
        let expected = "/** An order. */\n\
export interface Order extends Shop.Common.Client.Entity {\n  \
/**\n   * Identifier.\n   * Never reused.\n   */\n  \
id: number;\n}\n";
        assert_eq!(def.emit_indented(0), expected);
    }

    #[test]
    fn test_emit_enum() {
        let def = TsTypeDef {
            name: "Weekday".into(),
            doc: None,
            kind: TypeDefKind::Enum {
                members: vec![
                    TsEnumMember {
                        name: "Sat".into(),
                        initializer: Some(1),
                        doc: None,
                    },
                    TsEnumMember {
                        name: "Sun".into(),
                        initializer: None,
                        doc: None,
                    },
                ],
            },
        };
        assert_eq!(
            def.emit_indented(0),
            "export enum Weekday {\n  Sat = 1,\n  Sun,\n}\n"
        );
    }

    #[test]
    fn test_emit_if_statement() {
        let stmt = TsStmt::If {
            cond: TsExpr::Raw("res.status === 204".into()),
            then_body: vec![TsStmt::Return(Some(TsExpr::Literal(TsLiteral::Null)))],
        };
        assert_eq!(
            stmt.emit_indented(1),
            "  if (res.status === 204) {\n    return null;\n  }\n"
        );
    }

    #[test]
    fn test_emit_namespace_with_class() {
        let ns = TsNamespace {
            name: "Shop.Client".into(),
            types: vec![],
            classes: vec![TsClass {
                name: "OrdersClient".into(),
                doc: None,
                constructor_params: "private readonly baseUrl: string = \"\"".into(),
                methods: vec![TsMethod {
                    name: "list".into(),
                    doc: None,
                    params: vec![],
                    return_type: TsType::Primitive(TsPrimitive::Void).promise(),
                    body: vec![TsStmt::Return(None)],
                    is_async: true,
                }],
            }],
        };
        let expected = "export namespace Shop.Client {\n  \
export class OrdersClient {\n    \
constructor(private readonly baseUrl: string = \"\") {}\n\n    \
async list(): Promise<void> {\n      return;\n    }\n  }\n}\n";
        assert_eq!(ns.emit(), expected);
    }
}
