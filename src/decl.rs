//! Declaration graph the resolver reads from.
//!
//! A [`TypeRef`] is a *use* of a type (`List<Foo>`, `int[]`, `? extends Bar`);
//! a [`Declaration`] is the named class/interface/enum behind a declared use.
//! Declarations reference each other by fully-qualified name, so the graph may
//! be cyclic. Nothing here is mutated by the resolver.

use std::fmt;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::ir::Ty;

// ------------------------------- Type uses -------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    Declared {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeRef>,
    },
    Array(Box<TypeRef>),
    Var {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bound: Option<Box<TypeRef>>,
    },
    Wildcard {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extends: Option<Box<TypeRef>>,
    },
}

impl TypeRef {
    pub fn declared(name: impl Into<String>) -> Self {
        TypeRef::Declared { name: name.into(), args: Vec::new() }
    }

    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = TypeRef>) -> Self {
        TypeRef::Declared { name: name.into(), args: args.into_iter().collect() }
    }

    pub fn array(component: TypeRef) -> Self {
        TypeRef::Array(Box::new(component))
    }

    pub fn var(name: impl Into<String>, bound: Option<TypeRef>) -> Self {
        TypeRef::Var { name: name.into(), bound: bound.map(Box::new) }
    }

    pub fn wildcard(extends: Option<TypeRef>) -> Self {
        TypeRef::Wildcard { extends: extends.map(Box::new) }
    }

    /// Fully-qualified name of a declared use.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            TypeRef::Declared { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Declared { args, .. } => args,
            _ => &[],
        }
    }

    /// Replace type variables named in `params` with the matching `args`.
    /// Unmatched variables (and a raw use with no args) are left alone.
    pub fn substitute(&self, params: &[String], args: &[TypeRef]) -> TypeRef {
        if params.is_empty() || args.is_empty() {
            return self.clone();
        }
        match self {
            TypeRef::Var { name, .. } => params
                .iter()
                .position(|p| p == name)
                .and_then(|i| args.get(i))
                .cloned()
                .unwrap_or_else(|| self.clone()),
            TypeRef::Declared { name, args: inner } => TypeRef::Declared {
                name: name.clone(),
                args: inner.iter().map(|a| a.substitute(params, args)).collect(),
            },
            TypeRef::Array(c) => TypeRef::Array(Box::new(c.substitute(params, args))),
            TypeRef::Wildcard { extends } => TypeRef::Wildcard {
                extends: extends.as_ref().map(|b| Box::new(b.substitute(params, args))),
            },
            TypeRef::Primitive(_) => self.clone(),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{p}"),
            TypeRef::Declared { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, a) in args.iter().enumerate() {
                        if i > 0 { f.write_str(", ")?; }
                        write!(f, "{a}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeRef::Array(c) => write!(f, "{c}[]"),
            TypeRef::Var { name, .. } => f.write_str(name),
            TypeRef::Wildcard { extends: None } => f.write_str("?"),
            TypeRef::Wildcard { extends: Some(b) } => write!(f, "? extends {b}"),
        }
    }
}

// ------------------------------ Declarations ------------------------------ //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    #[default]
    Class,
    Interface,
    Enum,
}

/// Adaptation metadata: `target` is the adapting type that replaces the
/// adapted one. `adapted` is only meaningful at package level, where a
/// missing value is the "default" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterAnnotation {
    pub target: TypeRef,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub adapted: Option<TypeRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializationOverride {
    #[serde(default)]
    pub custom_serializer: bool,
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub substitute: Option<TypeRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QNameBase {
    #[default]
    Uri,
    Qname,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QNameEnum {
    #[serde(default)]
    pub base: QNameBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_part: Option<String>,
    #[serde(default)]
    pub exclude: bool,
    /// Catch-all constant for qnames that match no other value.
    #[serde(default)]
    pub unknown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<AdapterAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(default)]
    pub kind: DeclKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialize: Option<SerializationOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<AdapterAnnotation>,
    /// Excluded from binding; narrows to `Object` as a collection component.
    #[serde(default)]
    pub transient: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qname_enum: Option<QNameEnum>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<EnumConstant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self { name: name.into(), kind, ..Self::default() }
    }

    pub fn package(&self) -> &str {
        package_of(&self.name)
    }

    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.name)
    }

    /// The declaration used as a type, parameterized by its own variables.
    pub fn as_type(&self) -> TypeRef {
        TypeRef::generic(
            self.name.clone(),
            self.type_params.iter().map(|p| TypeRef::var(p.clone(), None)),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adapters: Vec<AdapterAnnotation>,
}

pub fn package_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
}

pub fn simple_name_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, simple)| simple).unwrap_or(name)
}

// --------------------------------- Source --------------------------------- //

/// Read-only oracle over the declaration graph. Unknown names are "no match".
pub trait TypeSource: Sync {
    fn declaration(&self, name: &str) -> Option<&Declaration>;
    fn package(&self, name: &str) -> Option<&Package>;
}

/// No declarations at all; every query misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl TypeSource for EmptySource {
    fn declaration(&self, _name: &str) -> Option<&Declaration> { None }
    fn package(&self, _name: &str) -> Option<&Package> { None }
}

/// A loaded description of a program: declarations, packages and registry input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    #[serde(default, with = "by_name")]
    pub declarations: IndexMap<String, Declaration>,
    #[serde(default, with = "packages_by_name")]
    pub packages: IndexMap<String, Package>,
    /// Pre-resolved schema types, keyed by fully-qualified name.
    #[serde(default)]
    pub known: IndexMap<String, Ty>,
    /// Names that have a structured type definition.
    #[serde(default)]
    pub definitions: IndexSet<String>,
    #[serde(default)]
    pub settings: Settings,
}

impl Model {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, decl: Declaration) -> &mut Self {
        self.declarations.insert(decl.name.clone(), decl);
        self
    }

    pub fn insert_package(&mut self, pkg: Package) -> &mut Self {
        self.packages.insert(pkg.name.clone(), pkg);
        self
    }

    /// Fold another model in; later entries win on name clashes.
    pub fn merge(&mut self, other: Model) {
        self.declarations.extend(other.declarations);
        self.packages.extend(other.packages);
        self.known.extend(other.known);
        self.definitions.extend(other.definitions);
        self.settings.merge(other.settings);
    }
}

impl TypeSource for Model {
    fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }
}

// Declarations and packages are written as lists in files; keyed by name in memory.
mod by_name {
    use super::Declaration;
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(map: &IndexMap<String, Declaration>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(map.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<IndexMap<String, Declaration>, D::Error> {
        let list = Vec::<Declaration>::deserialize(d)?;
        Ok(list.into_iter().map(|x| (x.name.clone(), x)).collect())
    }
}

mod packages_by_name {
    use super::Package;
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(map: &IndexMap<String, Package>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(map.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<IndexMap<String, Package>, D::Error> {
        let list = Vec::<Package>::deserialize(d)?;
        Ok(list.into_iter().map(|x| (x.name.clone(), x)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_reads_like_source() {
        let ty = TypeRef::generic("java.util.Map", [
            TypeRef::declared("java.lang.String"),
            TypeRef::array(TypeRef::Primitive(PrimitiveKind::Int)),
        ]);
        insta::assert_snapshot!(ty, @"java.util.Map<java.lang.String, int[]>");
        let wild = TypeRef::generic("java.util.List", [
            TypeRef::wildcard(Some(TypeRef::declared("com.acme.Shape"))),
        ]);
        insta::assert_snapshot!(wild, @"java.util.List<? extends com.acme.Shape>");
    }

    #[test]
    fn substitute_replaces_vars_deeply() {
        let sup = TypeRef::generic("java.util.Collection", [
            TypeRef::array(TypeRef::var("E", None)),
        ]);
        let out = sup.substitute(&["E".to_string()], &[TypeRef::declared("com.acme.Node")]);
        assert_eq!(out, TypeRef::generic("java.util.Collection", [
            TypeRef::array(TypeRef::declared("com.acme.Node")),
        ]));
    }

    #[test]
    fn substitute_leaves_raw_use_alone() {
        let sup = TypeRef::generic("java.util.Collection", [TypeRef::var("E", None)]);
        assert_eq!(sup.substitute(&["E".to_string()], &[]), sup);
    }

    #[test]
    fn package_and_simple_names() {
        assert_eq!(package_of("com.acme.Order"), "com.acme");
        assert_eq!(simple_name_of("com.acme.Order"), "Order");
        assert_eq!(package_of("Order"), "");
        assert_eq!(simple_name_of("Order"), "Order");
    }

    #[test]
    fn model_reads_declaration_lists() {
        let src = indoc::indoc! {r#"
            {
              "declarations": [
                { "name": "com.acme.Box", "type_params": ["T"],
                  "members": [ { "name": "value", "ty": { "var": { "name": "T" } } } ] }
              ],
              "packages": [ { "name": "com.acme", "namespace": "urn:acme:" } ]
            }
        "#};
        let model: Model = serde_json::from_str(src).unwrap();
        let decl = model.declaration("com.acme.Box").unwrap();
        assert_eq!(decl.kind, DeclKind::Class);
        assert_eq!(decl.members[0].ty, TypeRef::var("T", None));
        assert_eq!(decl.as_type().to_string(), "com.acme.Box<T>");
        assert_eq!(model.package("com.acme").unwrap().namespace.as_deref(), Some("urn:acme:"));
        assert!(model.declaration("com.acme.Missing").is_none());
    }
}
