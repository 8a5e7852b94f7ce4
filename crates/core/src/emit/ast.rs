//! TypeScript syntax tree.
//!
//! Only the constructs the client printer needs: types, a handful of
//! expressions and statements, interfaces, enums, classes and namespaces.

/// TypeScript type.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    Primitive(TsPrimitive),
    /// `T[]`
    Array(Box<TsType>),
    /// `A | B`
    Union(Vec<TsType>),
    /// `{ a: string; b?: number }`
    Object(Vec<TsProp>),
    /// `Record<K, V>`
    Record { key: Box<TsType>, value: Box<TsType> },
    /// Named type with optional arguments: `Page<Order>`.
    Ref { name: String, args: Vec<TsType> },
}

impl TsType {
    pub fn reference(name: impl Into<String>) -> Self {
        TsType::Ref {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TsType>) -> Self {
        TsType::Ref {
            name: name.into(),
            args,
        }
    }

    /// `T | null`, without duplicating an existing `null` member.
    pub fn or_null(self) -> Self {
        let null = TsType::Primitive(TsPrimitive::Null);
        match self {
            TsType::Union(mut members) => {
                if !members.contains(&null) {
                    members.push(null);
                }
                TsType::Union(members)
            }
            TsType::Primitive(TsPrimitive::Null) => self,
            other => TsType::Union(vec![other, null]),
        }
    }

    pub fn promise(self) -> Self {
        TsType::generic("Promise", vec![self])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Void,
    Unknown,
}

/// Object-type or interface property.
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    String(String),
    Int(i64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    Ident(String),
    Literal(TsLiteral),
    /// `callee(a, b)`
    Call { callee: Box<TsExpr>, args: Vec<TsExpr> },
    /// `object.prop`
    Member { object: Box<TsExpr>, prop: String },
    /// `` `static${dynamic}` ``
    Template(Vec<TemplatePart>),
    /// `await expr`
    Await(Box<TsExpr>),
    /// `new Callee(a, b)`
    New { callee: Box<TsExpr>, args: Vec<TsExpr> },
    /// `{ key: value, ...spread }`
    Object(Vec<ObjectEntry>),
    /// `expr as Type`
    Cast { expr: Box<TsExpr>, ty: TsType },
    /// Code that does not fit the tree.
    Raw(String),
}

impl TsExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    pub fn call(callee: TsExpr, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn member(self, prop: impl Into<String>) -> Self {
        TsExpr::Member {
            object: Box::new(self),
            prop: prop.into(),
        }
    }

    pub fn awaited(self) -> Self {
        TsExpr::Await(Box::new(self))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Static(String),
    Dynamic(TsExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEntry {
    Property { key: String, value: TsExpr },
    Spread(TsExpr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Const,
    Let,
}

/// Statement in a method body.
#[derive(Debug, Clone, PartialEq)]
pub enum TsStmt {
    VarDecl {
        kind: VarKind,
        name: String,
        init: TsExpr,
    },
    Expr(TsExpr),
    Return(Option<TsExpr>),
    If {
        cond: TsExpr,
        then_body: Vec<TsStmt>,
    },
    /// Lines emitted verbatim at the current indentation.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
}

/// Interface or enum inside a namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    pub name: String,
    pub doc: Option<String>,
    pub kind: TypeDefKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    Interface {
        type_params: Vec<String>,
        extends: Option<TsType>,
        properties: Vec<TsProp>,
    },
    /// Members with an initializer where TypeScript's auto-increment would
    /// produce a different value.
    Enum { members: Vec<TsEnumMember> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsEnumMember {
    pub name: String,
    pub initializer: Option<i64>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsMethod {
    pub name: String,
    pub doc: Option<String>,
    pub params: Vec<TsParam>,
    pub return_type: TsType,
    pub body: Vec<TsStmt>,
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsClass {
    pub name: String,
    pub doc: Option<String>,
    /// Constructor parameter list, printed verbatim.
    pub constructor_params: String,
    pub methods: Vec<TsMethod>,
}

/// `export namespace A.B { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct TsNamespace {
    pub name: String,
    pub types: Vec<TsTypeDef>,
    pub classes: Vec<TsClass>,
}

/// Complete output file.
#[derive(Debug, Clone, PartialEq)]
pub struct TsModule {
    pub header: String,
    /// Imports and shared helpers printed before the namespaces.
    pub preamble: Vec<String>,
    pub namespaces: Vec<TsNamespace>,
}
