// Closed schema vocabulary produced by the resolver. No declaration types here.

use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ty {
    Primitive {
        kind: NumKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<Format>,
    },
    String,
    Boolean,
    Object,                  // opaque / unstructured
    Class(TypeDefRef),       // handle only, never the structure inline
    Array { items: Box<Ty> },
    Map { key: Box<Ty>, value: Box<Ty> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumKind {
    WholeNumber,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Int32,
    Int64,
    Float,
    Double,
}

/// Reference to a structured type definition owned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDefRef {
    pub name: String,
}

impl Ty {
    pub fn whole(format: Option<Format>) -> Self {
        Ty::Primitive { kind: NumKind::WholeNumber, format }
    }

    pub fn number(format: Option<Format>) -> Self {
        Ty::Primitive { kind: NumKind::Number, format }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Ty::Class(TypeDefRef { name: name.into() })
    }

    pub fn array_of(items: Ty) -> Self {
        Ty::Array { items: Box::new(items) }
    }

    pub fn map_of(key: Ty, value: Ty) -> Self {
        Ty::Map { key: Box::new(key), value: Box::new(value) }
    }

    /// Wrap once in `Array` when the visit was reached through an array or a container.
    pub(crate) fn wrap_if(self, wrap: bool) -> Self {
        if wrap { Ty::array_of(self) } else { self }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Ty::Array { .. } | Ty::Map { .. })
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Ty::Primitive { .. })
    }

    pub fn is_whole_number(&self) -> bool {
        matches!(self, Ty::Primitive { kind: NumKind::WholeNumber, .. })
    }

    pub fn format(&self) -> Option<Format> {
        match self {
            Ty::Primitive { format, .. } => *format,
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Int32 => "int32",
            Format::Int64 => "int64",
            Format::Float => "float",
            Format::Double => "double",
        })
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Primitive { kind, format } => {
                let base = match kind {
                    NumKind::WholeNumber => "integer",
                    NumKind::Number => "number",
                };
                match format {
                    Some(fmt_) => write!(f, "{base}({fmt_})"),
                    None => f.write_str(base),
                }
            }
            Ty::String => f.write_str("string"),
            Ty::Boolean => f.write_str("boolean"),
            Ty::Object => f.write_str("object"),
            Ty::Class(def) => f.write_str(&def.name),
            Ty::Array { items } => write!(f, "array<{items}>"),
            Ty::Map { key, value } => write!(f, "map<{key}, {value}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_nested_shapes() {
        let ty = Ty::map_of(
            Ty::String,
            Ty::array_of(Ty::array_of(Ty::whole(Some(Format::Int32)))),
        );
        insta::assert_snapshot!(ty, @"map<string, array<array<integer(int32)>>>");
        insta::assert_snapshot!(Ty::class("com.acme.Order"), @"com.acme.Order");
        insta::assert_snapshot!(Ty::number(None), @"number");
    }

    #[test]
    fn serde_is_tagged_by_type() {
        let ty = Ty::array_of(Ty::number(Some(Format::Double)));
        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(json, serde_json::json!({
            "type": "array",
            "items": { "type": "primitive", "kind": "number", "format": "double" }
        }));
        let back: Ty = serde_json::from_value(json).unwrap();
        assert_eq!(back, ty);
    }

    #[test]
    fn class_refs_deserialize_from_name() {
        let ty: Ty = serde_json::from_value(serde_json::json!({
            "type": "class", "name": "com.acme.Node"
        })).unwrap();
        assert_eq!(ty, Ty::class("com.acme.Node"));
        assert!(!ty.is_container());
    }

    #[test]
    fn wrap_if_wraps_once() {
        assert_eq!(Ty::Object.wrap_if(false), Ty::Object);
        assert_eq!(Ty::Object.wrap_if(true), Ty::array_of(Ty::Object));
        assert!(Ty::map_of(Ty::String, Ty::Object).is_container());
        assert!(Ty::whole(None).is_whole_number());
        assert!(!Ty::number(None).is_whole_number());
    }
}
