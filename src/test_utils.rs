//! Builders shared by unit tests.

use crate::decl::{PrimitiveKind, TypeRef};

pub fn declared(name: &str) -> TypeRef {
    TypeRef::declared(name)
}

pub fn string() -> TypeRef {
    declared("java.lang.String")
}

pub fn object() -> TypeRef {
    declared("java.lang.Object")
}

pub fn int() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Int)
}

pub fn byte() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Byte)
}

pub fn double() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Double)
}

pub fn boolean() -> TypeRef {
    TypeRef::Primitive(PrimitiveKind::Boolean)
}

pub fn list_of(item: TypeRef) -> TypeRef {
    TypeRef::generic("java.util.List", [item])
}

pub fn map_of(key: TypeRef, value: TypeRef) -> TypeRef {
    TypeRef::generic("java.util.Map", [key, value])
}
