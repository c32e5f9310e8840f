//! Client-side type names for a generated PHP client.
//!
//! A consumer of the declaration model alongside the schema resolver: same
//! container recognition and type-level adapters, different vocabulary.

use indexmap::IndexMap;

use crate::config::Settings;
use crate::decl::{DeclKind, Declaration, Member, PrimitiveKind, TypeRef, TypeSource};
use crate::error::ConfigError;
use crate::resolve::{AdapterCache, AdapterResolver, Containers, Position, RecursionStack, Wrapping};

const MIXED: &str = "mixed";
const ARRAY: &str = "array";
const PACKAGE_SEPARATOR: &str = "\\";

const CLASS_CONVERSIONS: &[(&str, &str)] = &[
    ("java.lang.Boolean", "boolean"),
    ("java.lang.String", "string"),
    ("java.lang.Integer", "integer"),
    ("java.lang.Short", "integer"),
    ("java.lang.Byte", "integer"),
    ("java.lang.Double", "double"),
    ("java.lang.Long", "integer"),
    ("java.math.BigInteger", "integer"),
    ("java.math.BigDecimal", "integer"),
    ("java.lang.Float", "double"),
    ("java.lang.Character", "string"),
    ("java.util.Date", "integer"),
    ("java.sql.Timestamp", "integer"),
    ("javax.activation.DataHandler", "byte[]"),
    ("java.awt.Image", "byte[]"),
    ("javax.xml.transform.Source", "string"),
    ("javax.xml.namespace.QName", "string"),
    ("java.net.URI", "string"),
    ("java.util.UUID", "string"),
    ("javax.xml.datatype.XMLGregorianCalendar", "integer"),
    ("java.util.GregorianCalendar", "integer"),
    ("java.util.Calendar", "integer"),
    ("javax.xml.datatype.Duration", "string"),
    ("javax.xml.bind.JAXBElement", "mixed"),
    ("java.lang.Object", "mixed"),
];

pub struct ClientNames<'a, S: ?Sized> {
    source: &'a S,
    settings: &'a Settings,
    containers: Containers<'a, S>,
    adapters: AdapterCache,
    class_conversions: IndexMap<String, String>,
    /// `(from, to)` package prefixes, longest `from` first.
    package_conversions: Vec<(String, String)>,
}

impl<'a, S: TypeSource + ?Sized> ClientNames<'a, S> {
    pub fn new(source: &'a S, settings: &'a Settings) -> Self {
        Self {
            source,
            settings,
            containers: Containers::new(source, settings),
            adapters: AdapterCache::new(),
            class_conversions: CLASS_CONVERSIONS
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            package_conversions: Vec::new(),
        }
    }

    pub fn with_package_conversions(mut self, conversions: impl IntoIterator<Item = (String, String)>) -> Self {
        self.package_conversions.extend(conversions);
        self.package_conversions.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    /// Client package for a source package: the longest matching prefix is
    /// replaced, then segments are joined with `\`.
    pub fn convert_package(&self, package: &str) -> String {
        let converted = self
            .package_conversions
            .iter()
            .find(|(from, _)| {
                package == from.as_str() || package.strip_prefix(from.as_str()).is_some_and(|rest| rest.starts_with('.'))
            })
            .map(|(from, to)| format!("{to}{}", &package[from.len()..]))
            .unwrap_or_else(|| package.to_string());
        converted.replace('.', PACKAGE_SEPARATOR)
    }

    pub fn type_name_for(&self, ty: &TypeRef) -> String {
        self.convert(ty, &mut RecursionStack::new())
    }

    /// A member's client type. Adapters are looked up on the member, the
    /// element type and `owner`'s package, in that order; an adapter replaces
    /// the element and a stripped container layer comes back as `[]`.
    pub fn member_type_name(&self, owner: &Declaration, member: &Member) -> Result<String, ConfigError> {
        let ty = member.type_hint.as_ref().unwrap_or(&member.ty);
        let position = Position {
            member: member.adapter.as_ref(),
            package: Some(owner.package()),
        };
        let resolver = AdapterResolver::new(
            self.source,
            Containers::new(self.source, self.settings),
            &self.adapters,
        );
        Ok(match resolver.resolve(position, ty)? {
            Some(adaptation) => {
                let name = self.type_name_for(&adaptation.adapting);
                match adaptation.wrapping {
                    Wrapping::None => name,
                    Wrapping::Array | Wrapping::Collection => with_brackets(name),
                }
            }
            None => self.type_name_for(ty),
        })
    }

    pub fn declaration_name(&self, decl: &Declaration) -> String {
        self.convert_declaration(&decl.name, Some(decl), &mut RecursionStack::new())
    }

    fn convert(&self, ty: &TypeRef, stack: &mut RecursionStack) -> String {
        match ty {
            TypeRef::Primitive(kind) => primitive_name(*kind).to_string(),
            TypeRef::Array(component) => with_brackets(self.convert(component, stack)),
            TypeRef::Var { bound, .. } => self.convert_bound(bound.as_deref(), stack),
            TypeRef::Wildcard { extends } => self.convert_bound(extends.as_deref(), stack),
            TypeRef::Declared { name, args } => {
                let decl = self.source.declaration(name);
                if decl.is_some_and(|d| d.kind == DeclKind::Enum) {
                    return "string".to_string();
                }
                if self.containers.is_collection(ty) || self.containers.is_stream(ty) {
                    return match args.as_slice() {
                        [component] => with_brackets(self.convert(component, stack)),
                        _ => ARRAY.to_string(),
                    };
                }
                self.convert_declaration(name, decl, stack)
            }
        }
    }

    fn convert_bound(&self, bound: Option<&TypeRef>, stack: &mut RecursionStack) -> String {
        match bound {
            Some(bound) => self.convert(bound, stack),
            None => MIXED.to_string(),
        }
    }

    fn convert_declaration(&self, name: &str, decl: Option<&Declaration>, stack: &mut RecursionStack) -> String {
        if let Some(converted) = self.class_conversions.get(name) {
            return converted.clone();
        }
        if decl.is_some_and(|d| d.kind == DeclKind::Enum) {
            return "string".to_string();
        }
        let as_type = TypeRef::declared(name);
        if self.containers.is_collection(&as_type)
            || self.containers.is_stream(&as_type)
            || self.containers.is_map(&as_type)
        {
            return ARRAY.to_string();
        }

        if let Some(adapter) = decl.and_then(|d| d.adapter.as_ref()) {
            if adapter.target.declared_name() != Some(name) {
                if stack.contains(name) {
                    tracing::debug!(name, "adapter chain loops back; using mixed");
                    return MIXED.to_string();
                }
                let mut frame = stack.enter(name);
                return self.convert(&adapter.target, &mut frame);
            }
        }

        let package = crate::decl::package_of(name);
        let simple = decl
            .and_then(|d| d.client_name.as_deref())
            .unwrap_or_else(|| crate::decl::simple_name_of(name));
        if package.is_empty() {
            format!("{PACKAGE_SEPARATOR}{simple}")
        } else {
            format!("{PACKAGE_SEPARATOR}{}{PACKAGE_SEPARATOR}{simple}", self.convert_package(package))
        }
    }
}

fn primitive_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "boolean",
        PrimitiveKind::Byte | PrimitiveKind::Int | PrimitiveKind::Short | PrimitiveKind::Long => "integer",
        PrimitiveKind::Float | PrimitiveKind::Double => "double",
        PrimitiveKind::Char => "string",
    }
}

fn with_brackets(component: String) -> String {
    if component == MIXED { component } else { format!("{component}[]") }
}

/// Client simple name, optionally followed by the type parameters (`Page<T>`).
pub fn simple_name_with_params(decl: &Declaration, with_params: bool) -> String {
    let mut name = decl.client_name.clone().unwrap_or_else(|| decl.simple_name().to_string());
    if with_params && !decl.type_params.is_empty() {
        name.push('<');
        name.push_str(&decl.type_params.join(", "));
        name.push('>');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{AdapterAnnotation, Model, Package};
    use crate::test_utils::*;

    fn model() -> Model {
        let mut m = Model::new();
        m.insert(Declaration::new("com.acme.Status", DeclKind::Enum));
        let mut order = Declaration::new("com.acme.api.Order", DeclKind::Class);
        order.client_name = Some("PurchaseOrder".into());
        m.insert(order);
        let mut money = Declaration::new("com.acme.Money", DeclKind::Class);
        money.adapter = Some(AdapterAnnotation { target: declared("java.math.BigDecimal"), adapted: None });
        m.insert(money);
        let mut index = Declaration::new("com.acme.Index", DeclKind::Class);
        index.supertypes.push(map_of(string(), string()));
        m.insert(index);

        // adapters that point at each other
        let mut ping = Declaration::new("com.acme.Ping", DeclKind::Class);
        ping.adapter = Some(AdapterAnnotation { target: declared("com.acme.Pong"), adapted: None });
        let mut pong = Declaration::new("com.acme.Pong", DeclKind::Class);
        pong.adapter = Some(AdapterAnnotation { target: declared("com.acme.Ping"), adapted: None });
        m.insert(ping).insert(pong);

        m.insert(Declaration::new("com.acme.Instant", DeclKind::Class));
        m.insert_package(Package {
            name: "com.acme.api".into(),
            adapters: vec![AdapterAnnotation {
                target: declared("java.lang.Long"),
                adapted: Some(declared("com.acme.Instant")),
            }],
            ..Package::default()
        });
        m
    }

    #[test]
    fn scalars_and_conversions() {
        let m = model();
        let names = ClientNames::new(&m, &m.settings);
        assert_eq!(names.type_name_for(&int()), "integer");
        assert_eq!(names.type_name_for(&double()), "double");
        assert_eq!(names.type_name_for(&declared("java.util.Date")), "integer");
        assert_eq!(names.type_name_for(&object()), "mixed");
        assert_eq!(names.type_name_for(&declared("com.acme.Status")), "string");
        assert_eq!(names.type_name_for(&declared("com.acme.Money")), "integer");
    }

    #[test]
    fn containers_become_arrays() {
        let m = model();
        let names = ClientNames::new(&m, &m.settings);
        assert_eq!(names.type_name_for(&list_of(string())), "string[]");
        assert_eq!(names.type_name_for(&list_of(object())), "mixed");
        assert_eq!(names.type_name_for(&declared("java.util.List")), "array");
        assert_eq!(names.type_name_for(&map_of(string(), int())), "array");
        assert_eq!(names.type_name_for(&declared("com.acme.Index")), "array");
        assert_eq!(names.type_name_for(&TypeRef::array(TypeRef::array(int()))), "integer[][]");
        assert_eq!(names.type_name_for(&TypeRef::var("T", None)), "mixed");
        assert_eq!(names.type_name_for(&list_of(TypeRef::wildcard(Some(string())))), "string[]");
    }

    #[test]
    fn classes_use_converted_package() {
        let m = model();
        let names = ClientNames::new(&m, &m.settings)
            .with_package_conversions([
                ("com.acme".to_string(), "Acme".to_string()),
                ("com.acme.api".to_string(), "Acme.Api".to_string()),
            ]);
        insta::assert_snapshot!(names.type_name_for(&declared("com.acme.api.Order")), @r"\Acme\Api\PurchaseOrder");
        insta::assert_snapshot!(names.type_name_for(&declared("com.acme.model.Item")), @r"\Acme\model\Item");
        insta::assert_snapshot!(names.type_name_for(&declared("com.acmecorp.Item")), @r"\com\acmecorp\Item");
        insta::assert_snapshot!(names.type_name_for(&declared("Item")), @r"\Item");
    }

    #[test]
    fn adapter_cycles_are_mixed() {
        let m = model();
        let names = ClientNames::new(&m, &m.settings);
        assert_eq!(names.type_name_for(&declared("com.acme.Ping")), "mixed");
    }

    fn member(ty: TypeRef, adapter: Option<TypeRef>) -> Member {
        Member {
            name: "value".into(),
            ty,
            type_hint: None,
            adapter: adapter.map(|target| AdapterAnnotation { target, adapted: None }),
        }
    }

    #[test]
    fn member_adapters_keep_the_container_layer() {
        let m = model();
        let names = ClientNames::new(&m, &m.settings);
        let owner = Declaration::new("com.acme.Holder", DeclKind::Class);
        let name = |ty, adapter| names.member_type_name(&owner, &member(ty, adapter)).unwrap();

        assert_eq!(name(list_of(declared("com.acme.Instant")), Some(declared("java.lang.Long"))), "integer[]");
        assert_eq!(name(TypeRef::array(declared("com.acme.Instant")), Some(string())), "string[]");
        assert_eq!(name(declared("com.acme.Instant"), Some(declared("java.lang.Long"))), "integer");
        // type-level adapter on the element
        assert_eq!(name(list_of(declared("com.acme.Money")), None), "integer[]");
        // no package adapters outside com.acme.api
        assert_eq!(name(declared("com.acme.Instant"), None), r"\com\acme\Instant");
    }

    #[test]
    fn package_adapters_apply_to_members() {
        let m = model();
        let names = ClientNames::new(&m, &m.settings);
        let owner = Declaration::new("com.acme.api.Order", DeclKind::Class);
        let name = |ty, adapter| names.member_type_name(&owner, &member(ty, adapter)).unwrap();

        assert_eq!(name(declared("com.acme.Instant"), None), "integer");
        assert_eq!(name(list_of(declared("com.acme.Instant")), None), "integer[]");
        // member beats package
        assert_eq!(name(declared("com.acme.Instant"), Some(string())), "string");
    }

    #[test]
    fn bad_package_adapters_fail_member_names() {
        let mut m = model();
        m.insert_package(Package {
            name: "com.acme.bad".into(),
            adapters: vec![AdapterAnnotation { target: string(), adapted: None }],
            ..Package::default()
        });
        let names = ClientNames::new(&m, &m.settings);
        let owner = Declaration::new("com.acme.bad.Order", DeclKind::Class);
        let err = names.member_type_name(&owner, &member(declared("com.acme.Instant"), None)).unwrap_err();
        assert!(matches!(err, ConfigError::PackageAdapterWithoutType { .. }));
    }

    #[test]
    fn simple_names_with_params() {
        let mut page = Declaration::new("com.acme.Page", DeclKind::Class);
        page.type_params = vec!["T".into(), "K".into()];
        assert_eq!(simple_name_with_params(&page, true), "Page<T, K>");
        assert_eq!(simple_name_with_params(&page, false), "Page");
        page.client_name = Some("ResultPage".into());
        assert_eq!(simple_name_with_params(&page, true), "ResultPage<T, K>");
    }
}
