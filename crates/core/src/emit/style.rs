//! How each output flavor sends a request and reads the response back.

use super::ast::{ObjectEntry, TsExpr, TsLiteral, TsPrimitive, TsStmt, TsType, VarKind};
use crate::config::{BodySerialization, OutputFlavor};
use crate::ir::{ReturnStrategy, ReturnStrategyVisitor};

/// Error class thrown by fetch clients on non-success statuses.
const API_ERROR_CLASS: &str = r#"export class ApiError extends Error {
  status: number;
  statusText: string;
  body: string;

  constructor(status: number, statusText: string, body: string) {
    super(`HTTP ${status}: ${statusText}`);
    this.name = "ApiError";
    this.status = status;
    this.statusText = statusText;
    this.body = body;
  }
}"#;

/// Request pieces a method body has already prepared. `url` and, when
/// `has_headers` is set, `headers` are locals in scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Request<'a> {
    pub method: &'a str,
    pub has_headers: bool,
    pub body: Option<TsExpr>,
}

/// Flavor-specific parts of a generated client.
pub trait BindingStyle {
    fn flavor(&self) -> OutputFlavor;

    /// Imports and helpers printed once per file.
    fn preamble(&self) -> Vec<String>;

    /// Parameter list of every client class constructor. Must declare
    /// `baseUrl`.
    fn constructor_params(&self) -> String;

    /// Statements that send the request and bind the response to `res`.
    fn send(&self, request: Request<'_>, strategy: ReturnStrategy) -> Vec<TsStmt>;

    /// Statements that turn `res` into the method's return value.
    fn read_back(&self, strategy: ReturnStrategy, returns: &TsType) -> Vec<TsStmt>;
}

pub fn style_for(flavor: OutputFlavor) -> Box<dyn BindingStyle> {
    match flavor {
        OutputFlavor::Fetch => Box::new(FetchStyle),
        OutputFlavor::Axios => Box::new(AxiosStyle),
    }
}

/// Serialized body expression and the content type announcing it.
pub fn encode_body(serialization: BodySerialization, value: TsExpr) -> (TsExpr, &'static str) {
    match serialization {
        BodySerialization::Json => (
            TsExpr::call(TsExpr::ident("JSON").member("stringify"), vec![value]),
            "application/json",
        ),
        BodySerialization::FormUrlEncoded => (
            TsExpr::New {
                callee: Box::new(TsExpr::ident("URLSearchParams")),
                args: vec![TsExpr::Cast {
                    expr: Box::new(TsExpr::Cast {
                        expr: Box::new(value),
                        ty: TsType::Primitive(TsPrimitive::Unknown),
                    }),
                    ty: TsType::Record {
                        key: Box::new(TsType::Primitive(TsPrimitive::String)),
                        value: Box::new(TsType::Primitive(TsPrimitive::String)),
                    },
                }],
            },
            "application/x-www-form-urlencoded",
        ),
    }
}

fn property(key: &str, value: TsExpr) -> ObjectEntry {
    ObjectEntry::Property {
        key: key.to_string(),
        value,
    }
}

fn request_options(request: Request<'_>, body_key: &str) -> Vec<ObjectEntry> {
    let mut entries = vec![property("method", TsExpr::string(request.method))];
    if request.has_headers {
        entries.push(property("headers", TsExpr::ident("headers")));
    }
    if let Some(body) = request.body {
        entries.push(property(body_key, body));
    }
    entries
}

fn return_null_on_no_content() -> TsStmt {
    TsStmt::If {
        cond: TsExpr::Raw("res.status === 204".into()),
        then_body: vec![TsStmt::Return(Some(TsExpr::Literal(TsLiteral::Null)))],
    }
}

/// Nullable responses arrive as an empty 204.
fn admits_null(ty: &TsType) -> bool {
    matches!(ty, TsType::Union(members) if members.contains(&TsType::Primitive(TsPrimitive::Null)))
}

/// `return value;`, preceded by the 204 guard when the type admits `null`.
fn return_nullable(value: TsExpr, ty: &TsType) -> Vec<TsStmt> {
    let mut stmts = Vec::with_capacity(2);
    if admits_null(ty) {
        stmts.push(return_null_on_no_content());
    }
    stmts.push(TsStmt::Return(Some(value)));
    stmts
}

fn cast(expr: TsExpr, ty: &TsType) -> TsExpr {
    TsExpr::Cast {
        expr: Box::new(expr),
        ty: ty.clone(),
    }
}

// =============================================================================
// fetch
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchStyle;

impl BindingStyle for FetchStyle {
    fn flavor(&self) -> OutputFlavor {
        OutputFlavor::Fetch
    }

    fn preamble(&self) -> Vec<String> {
        vec![API_ERROR_CLASS.to_string()]
    }

    fn constructor_params(&self) -> String {
        "private readonly baseUrl: string = \"\", private readonly init: RequestInit = {}".into()
    }

    fn send(&self, request: Request<'_>, _strategy: ReturnStrategy) -> Vec<TsStmt> {
        let mut options = vec![ObjectEntry::Spread(TsExpr::ident("this").member("init"))];
        options.extend(request_options(request, "body"));
        let call = TsExpr::call(
            TsExpr::ident("fetch"),
            vec![TsExpr::ident("url"), TsExpr::Object(options)],
        );
        vec![
            TsStmt::VarDecl {
                kind: VarKind::Const,
                name: "res".into(),
                init: call.awaited(),
            },
            TsStmt::If {
                cond: TsExpr::Raw("!res.ok".into()),
                then_body: vec![TsStmt::Raw(
                    "throw new ApiError(res.status, res.statusText, await res.text());".into(),
                )],
            },
        ]
    }

    fn read_back(&self, strategy: ReturnStrategy, returns: &TsType) -> Vec<TsStmt> {
        strategy.accept(&mut FetchReadBack { returns })
    }
}

struct FetchReadBack<'a> {
    returns: &'a TsType,
}

impl FetchReadBack<'_> {
    fn res_call(method: &str) -> TsExpr {
        TsExpr::call(TsExpr::ident("res").member(method), vec![]).awaited()
    }
}

impl ReturnStrategyVisitor for FetchReadBack<'_> {
    type Output = Vec<TsStmt>;

    fn stream(&mut self) -> Vec<TsStmt> {
        vec![TsStmt::Return(Some(Self::res_call("blob")))]
    }

    fn dynamic_passthrough(&mut self) -> Vec<TsStmt> {
        vec![TsStmt::Return(Some(Self::res_call("json")))]
    }

    fn string_passthrough(&mut self) -> Vec<TsStmt> {
        vec![
            return_null_on_no_content(),
            TsStmt::Return(Some(Self::res_call("text"))),
        ]
    }

    fn primitive_parse(&mut self) -> Vec<TsStmt> {
        let parse = TsExpr::call(
            TsExpr::ident("JSON").member("parse"),
            vec![Self::res_call("text")],
        );
        return_nullable(cast(parse, self.returns), self.returns)
    }

    fn complex_deserialize(&mut self) -> Vec<TsStmt> {
        let json = TsExpr::Raw("(await res.json())".into());
        return_nullable(cast(json, self.returns), self.returns)
    }

    fn no_content(&mut self) -> Vec<TsStmt> {
        vec![TsStmt::Return(None)]
    }
}

// =============================================================================
// axios
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct AxiosStyle;

impl BindingStyle for AxiosStyle {
    fn flavor(&self) -> OutputFlavor {
        OutputFlavor::Axios
    }

    fn preamble(&self) -> Vec<String> {
        vec!["import type { AxiosInstance } from \"axios\";".to_string()]
    }

    fn constructor_params(&self) -> String {
        "private readonly http: AxiosInstance, private readonly baseUrl: string = \"\"".into()
    }

    fn send(&self, request: Request<'_>, strategy: ReturnStrategy) -> Vec<TsStmt> {
        let mut options = vec![property("url", TsExpr::ident("url"))];
        options.extend(request_options(request, "data"));
        if let Some(response_type) = strategy.accept(&mut AxiosResponseType) {
            options.push(property("responseType", TsExpr::string(response_type)));
        }
        let call = TsExpr::call(
            TsExpr::ident("this").member("http").member("request"),
            vec![TsExpr::Object(options)],
        );
        vec![TsStmt::VarDecl {
            kind: VarKind::Const,
            name: "res".into(),
            init: call.awaited(),
        }]
    }

    fn read_back(&self, strategy: ReturnStrategy, returns: &TsType) -> Vec<TsStmt> {
        strategy.accept(&mut AxiosReadBack { returns })
    }
}

/// `responseType` option; `None` keeps axios' JSON default.
struct AxiosResponseType;

impl ReturnStrategyVisitor for AxiosResponseType {
    type Output = Option<&'static str>;

    fn stream(&mut self) -> Self::Output {
        Some("blob")
    }

    fn dynamic_passthrough(&mut self) -> Self::Output {
        None
    }

    fn string_passthrough(&mut self) -> Self::Output {
        Some("text")
    }

    fn primitive_parse(&mut self) -> Self::Output {
        None
    }

    fn complex_deserialize(&mut self) -> Self::Output {
        None
    }

    fn no_content(&mut self) -> Self::Output {
        None
    }
}

struct AxiosReadBack<'a> {
    returns: &'a TsType,
}

impl ReturnStrategyVisitor for AxiosReadBack<'_> {
    type Output = Vec<TsStmt>;

    fn stream(&mut self) -> Vec<TsStmt> {
        vec![TsStmt::Return(Some(cast(TsExpr::ident("res").member("data"), self.returns)))]
    }

    fn dynamic_passthrough(&mut self) -> Vec<TsStmt> {
        vec![TsStmt::Return(Some(TsExpr::ident("res").member("data")))]
    }

    fn string_passthrough(&mut self) -> Vec<TsStmt> {
        let data = cast(
            TsExpr::ident("res").member("data"),
            &TsType::Primitive(TsPrimitive::String),
        );
        vec![return_null_on_no_content(), TsStmt::Return(Some(data))]
    }

    fn primitive_parse(&mut self) -> Vec<TsStmt> {
        self.complex_deserialize()
    }

    fn complex_deserialize(&mut self) -> Vec<TsStmt> {
        return_nullable(
            cast(TsExpr::ident("res").member("data"), self.returns),
            self.returns,
        )
    }

    fn no_content(&mut self) -> Vec<TsStmt> {
        vec![TsStmt::Return(None)]
    }
}
