//! Target type references.
//!
//! A `TypeRef` is the language-agnostic result of resolving one source type.
//! Emitters map it to concrete syntax.

use std::fmt;

use serde_json::{Map, Value};

/// Number of positional slots a tuple carries before folding into `rest`.
pub const TUPLE_POSITIONAL_LIMIT: usize = 7;

/// Reference to a client-side type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(ClientPrimitive),
    /// Named type. `namespace` is `None` for names outside the run, which are
    /// referenced exactly as the host framework spelled them.
    Named {
        namespace: Option<String>,
        name: String,
        args: Vec<TypeRef>,
    },
    Array {
        element: Box<TypeRef>,
        rank: u32,
    },
    Nullable(Box<TypeRef>),
    Tuple(TupleShape<TypeRef>),
    Dictionary {
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
    /// Generic sequence container, used when sequences are not flattened.
    Sequence(Box<TypeRef>),
    /// Untyped response body (action results, streams, files).
    RawResponse,
    /// Loosely typed object (`object`, `dynamic`, JSON nodes).
    LooseObject,
    TypeParameter(String),
    /// No value.
    Void,
}

/// Scalar client types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientPrimitive {
    Boolean,
    Integer,
    Float,
    Decimal,
    String,
    Guid,
    DateTime,
    Duration,
    Uri,
}

impl ClientPrimitive {
    pub fn as_str(self) -> &'static str {
        match self {
            ClientPrimitive::Boolean => "boolean",
            ClientPrimitive::Integer => "integer",
            ClientPrimitive::Float => "float",
            ClientPrimitive::Decimal => "decimal",
            ClientPrimitive::String => "string",
            ClientPrimitive::Guid => "guid",
            ClientPrimitive::DateTime => "datetime",
            ClientPrimitive::Duration => "duration",
            ClientPrimitive::Uri => "uri",
        }
    }
}

impl TypeRef {
    pub fn named(namespace: Option<String>, name: impl Into<String>) -> Self {
        TypeRef::Named {
            namespace,
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Wrap as nullable, without stacking nullable markers.
    pub fn nullable(inner: TypeRef) -> Self {
        match inner {
            TypeRef::Nullable(_) => inner,
            other => TypeRef::Nullable(Box::new(other)),
        }
    }

    /// Visit this reference and every reference nested inside it.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TypeRef)) {
        visit(self);
        match self {
            TypeRef::Named { args, .. } => args.iter().for_each(|arg| arg.walk(visit)),
            TypeRef::Array { element, .. }
            | TypeRef::Nullable(element)
            | TypeRef::Sequence(element) => element.walk(visit),
            TypeRef::Tuple(shape) => shape.iter().for_each(|item| item.walk(visit)),
            TypeRef::Dictionary { key, value } => {
                key.walk(visit);
                value.walk(visit);
            }
            TypeRef::Primitive(_)
            | TypeRef::RawResponse
            | TypeRef::LooseObject
            | TypeRef::TypeParameter(_)
            | TypeRef::Void => {}
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.as_str()),
            TypeRef::Named {
                namespace,
                name,
                args,
            } => {
                if let Some(ns) = namespace {
                    write!(f, "{ns}.")?;
                }
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    write_list(f, args)?;
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeRef::Array { element, rank } => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                write!(f, "{element}[{commas}]")
            }
            TypeRef::Nullable(inner) => write!(f, "{inner}?"),
            TypeRef::Tuple(shape) => {
                f.write_str("(")?;
                write_list(f, &shape.items)?;
                if let Some(rest) = &shape.rest {
                    write!(f, ", rest: {}", TypeRef::Tuple((**rest).clone()))?;
                }
                f.write_str(")")
            }
            TypeRef::Dictionary { key, value } => write!(f, "Dictionary<{key}, {value}>"),
            TypeRef::Sequence(element) => write!(f, "Sequence<{element}>"),
            TypeRef::RawResponse => f.write_str("response"),
            TypeRef::LooseObject => f.write_str("object"),
            TypeRef::TypeParameter(name) => f.write_str(name),
            TypeRef::Void => f.write_str("void"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeRef]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Positional slots folded into groups of at most seven, with the overflow
/// nested in `rest`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleShape<T> {
    pub items: Vec<T>,
    pub rest: Option<Box<TupleShape<T>>>,
}

impl<T> TupleShape<T> {
    /// Fold a flat slot list: 8 slots become 7 items plus a 1-slot `rest`.
    pub fn fold(mut slots: Vec<T>) -> Self {
        if slots.len() <= TUPLE_POSITIONAL_LIMIT {
            return Self {
                items: slots,
                rest: None,
            };
        }
        let overflow = slots.split_off(TUPLE_POSITIONAL_LIMIT);
        Self {
            items: slots,
            rest: Some(Box::new(Self::fold(overflow))),
        }
    }

    /// Flatten back into the original slot order.
    pub fn unfold(self) -> Vec<T> {
        let mut slots = self.items;
        if let Some(rest) = self.rest {
            slots.extend(rest.unfold());
        }
        slots
    }

    /// Total number of slots, including nested ones.
    pub fn len(&self) -> usize {
        self.items.len() + self.rest.as_ref().map_or(0, |rest| rest.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots in positional order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        let nested = self.rest.iter().flat_map(|rest| rest.iter());
        Box::new(self.items.iter().chain(nested))
    }

    /// Field name of the n-th positional slot (1-based), e.g. `item3`.
    pub fn field_name(position: usize) -> String {
        format!("item{position}")
    }
}

impl TupleShape<Value> {
    /// Encode as the JSON object a generated client exchanges:
    /// `{ "item1": .., ..., "item7": .., "rest": { "item1": .. } }`.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        for (i, item) in self.items.iter().enumerate() {
            object.insert(Self::field_name(i + 1), item.clone());
        }
        if let Some(rest) = &self.rest {
            object.insert("rest".to_string(), rest.to_value());
        }
        Value::Object(object)
    }

    /// Decode a JSON object produced by [`TupleShape::to_value`].
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut items = Vec::new();
        for position in 1..=TUPLE_POSITIONAL_LIMIT {
            match object.get(&Self::field_name(position)) {
                Some(item) => items.push(item.clone()),
                None => break,
            }
        }
        let rest = match object.get("rest") {
            Some(rest) => Some(Box::new(Self::from_value(rest)?)),
            None => None,
        };
        Some(Self { items, rest })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fold_eight_slots() {
        let shape = TupleShape::fold((1..=8).collect::<Vec<i32>>());
        assert_eq!(shape.items, vec![1, 2, 3, 4, 5, 6, 7]);
        let rest = shape.rest.as_ref().unwrap();
        assert_eq!(rest.items, vec![8]);
        assert!(rest.rest.is_none());
        assert_eq!(shape.len(), 8);
        assert_eq!(shape.unfold(), (1..=8).collect::<Vec<i32>>());
    }

    #[test]
    fn test_fold_fifteen_slots_nests_twice() {
        let shape = TupleShape::fold((1..=15).collect::<Vec<i32>>());
        let rest = shape.rest.as_ref().unwrap();
        assert_eq!(rest.items.len(), 7);
        assert_eq!(rest.rest.as_ref().unwrap().items, vec![15]);
        assert_eq!(shape.iter().copied().collect::<Vec<_>>(), (1..=15).collect::<Vec<_>>());
    }

    #[test]
    fn test_small_tuple_is_not_folded() {
        let shape = TupleShape::fold(vec!["a", "b"]);
        assert!(shape.rest.is_none());
        assert_eq!(shape.len(), 2);
    }

    #[test]
    fn test_json_value_round_trip() {
        let values: Vec<Value> = vec![
            json!(1),
            json!("two"),
            json!(3.5),
            json!(true),
            json!(null),
            json!([6]),
            json!({ "seven": 7 }),
            json!("eight"),
        ];
        let encoded = TupleShape::fold(values.clone()).to_value();
        assert_eq!(encoded["item7"], json!({ "seven": 7 }));
        assert_eq!(encoded["rest"]["item1"], json!("eight"));
        assert!(encoded.get("item8").is_none());

        let decoded = TupleShape::from_value(&encoded).unwrap();
        assert_eq!(decoded.unfold(), values);
    }

    #[test]
    fn test_display_nesting() {
        let ty = TypeRef::Named {
            namespace: Some("Shop.Client".into()),
            name: "Page".into(),
            args: vec![
                TypeRef::Primitive(ClientPrimitive::String),
                TypeRef::Array {
                    element: Box::new(TypeRef::Primitive(ClientPrimitive::Integer)),
                    rank: 2,
                },
            ],
        };
        assert_eq!(ty.to_string(), "Shop.Client.Page<string, integer[,]>");
    }

    #[test]
    fn test_nullable_does_not_stack() {
        let once = TypeRef::nullable(TypeRef::Primitive(ClientPrimitive::Integer));
        let twice = TypeRef::nullable(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_walk_visits_nested() {
        let ty = TypeRef::Dictionary {
            key: Box::new(TypeRef::Primitive(ClientPrimitive::String)),
            value: Box::new(TypeRef::named(Some("A".into()), "B")),
        };
        let mut seen = Vec::new();
        ty.walk(&mut |t| seen.push(t.to_string()));
        assert_eq!(seen, vec!["Dictionary<string, A.B>", "string", "A.B"]);
    }
}
