//! JSON-schema-ish rendering of resolved types.
//!
//! Class references point at `#/definitions/<name>`; [`definitions`] builds
//! that section from classified declarations.

use serde_json::{json, Map, Value};

use crate::ir::{NumKind, Ty};
use crate::resolve::DeclarationSchema;

pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

pub fn schema_of(ty: &Ty) -> Value {
    match ty {
        Ty::Primitive { kind, format } => {
            let mut o = match kind {
                NumKind::WholeNumber => json!({ "type": "integer" }),
                NumKind::Number => json!({ "type": "number" }),
            };
            if let Some(f) = format {
                o["format"] = Value::from(f.to_string());
            }
            o
        }
        Ty::String => json!({ "type": "string" }),
        Ty::Boolean => json!({ "type": "boolean" }),
        Ty::Object => json!({ "type": "object" }),
        Ty::Class(def) => json!({ "$ref": format!("{DEFINITIONS_PREFIX}{}", def.name) }),
        Ty::Array { items } => json!({ "type": "array", "items": schema_of(items) }),
        Ty::Map { key, value } => {
            let mut o = json!({
                "type": "object",
                "additionalProperties": schema_of(value),
            });
            if let Some(pattern) = key_pattern(key) {
                o["propertyNames"] = json!({ "pattern": pattern });
            }
            o
        }
    }
}

// Map keys are always JSON strings; only numeric keys get a textual constraint.
fn key_pattern(key: &Ty) -> Option<&'static str> {
    match key {
        Ty::Primitive { kind: NumKind::WholeNumber, .. } => Some("^-?[0-9]+$"),
        Ty::Primitive { kind: NumKind::Number, .. } => Some("^-?[0-9]+(\\.[0-9]+)?([eE][-+]?[0-9]+)?$"),
        _ => None,
    }
}

/// A declaration with members is an object of its properties; one without
/// is whatever its own type resolved to.
pub fn declaration_schema(decl: &DeclarationSchema) -> Value {
    let mut o = if decl.members.is_empty() {
        schema_of(&decl.ty)
    } else {
        let props: Map<String, Value> = decl
            .members
            .iter()
            .map(|(name, ty)| (name.clone(), schema_of(ty)))
            .collect();
        json!({ "type": "object", "properties": props })
    };
    o["title"] = Value::from(decl.name.clone());
    o
}

pub fn definitions<'a>(decls: impl IntoIterator<Item = &'a DeclarationSchema>) -> Value {
    let defs: Map<String, Value> = decls
        .into_iter()
        .map(|d| (d.name.clone(), declaration_schema(d)))
        .collect();
    json!({ "definitions": defs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Format;
    use indexmap::IndexMap;

    #[test]
    fn scalars_carry_formats() {
        assert_eq!(schema_of(&Ty::whole(Some(Format::Int64))), json!({ "type": "integer", "format": "int64" }));
        assert_eq!(schema_of(&Ty::number(None)), json!({ "type": "number" }));
        assert_eq!(schema_of(&Ty::Boolean), json!({ "type": "boolean" }));
    }

    #[test]
    fn containers_and_refs() {
        let ty = Ty::map_of(Ty::String, Ty::array_of(Ty::class("com.acme.Order")));
        assert_eq!(schema_of(&ty), json!({
            "type": "object",
            "additionalProperties": {
                "type": "array",
                "items": { "$ref": "#/definitions/com.acme.Order" }
            }
        }));
        let keyed = Ty::map_of(Ty::whole(Some(Format::Int32)), Ty::Object);
        assert_eq!(schema_of(&keyed)["propertyNames"], json!({ "pattern": "^-?[0-9]+$" }));
        let decimal = Ty::map_of(Ty::number(None), Ty::Object);
        assert_eq!(
            schema_of(&decimal)["propertyNames"]["pattern"],
            json!("^-?[0-9]+(\\.[0-9]+)?([eE][-+]?[0-9]+)?$")
        );
        // non-numeric keys carry no key constraint at all
        let by_class = Ty::map_of(Ty::class("com.acme.Key"), Ty::Object);
        assert!(schema_of(&by_class).get("propertyNames").is_none());
        assert!(schema_of(&Ty::map_of(Ty::String, Ty::Object)).get("propertyNames").is_none());
    }

    #[test]
    fn declarations_become_definitions() {
        let mut members = IndexMap::new();
        members.insert("id".to_string(), Ty::whole(Some(Format::Int64)));
        members.insert("tags".to_string(), Ty::array_of(Ty::String));
        let order = DeclarationSchema { name: "com.acme.Order".into(), ty: Ty::class("com.acme.Order"), members };
        let status = DeclarationSchema { name: "com.acme.Status".into(), ty: Ty::String, members: IndexMap::new() };

        let doc = definitions([&order, &status]);
        assert_eq!(doc, json!({
            "definitions": {
                "com.acme.Order": {
                    "type": "object",
                    "title": "com.acme.Order",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "tags": { "type": "array", "items": { "type": "string" } }
                    }
                },
                "com.acme.Status": { "type": "string", "title": "com.acme.Status" }
            }
        }));
        let keys: Vec<_> = doc["definitions"]["com.acme.Order"]["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, ["id", "tags"]);
    }
}
