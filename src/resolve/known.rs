//! Known-type registry: schema types the resolver never re-derives.

use indexmap::{IndexMap, IndexSet};

use crate::decl::Model;
use crate::ir::{Format, Ty, TypeDefRef};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    known: IndexMap<String, Ty>,
    definitions: IndexSet<String>,
}

impl Registry {
    /// An empty registry; every lookup misses.
    pub fn new() -> Self { Self::default() }

    /// JDK value types, mapped the way the JSON binding writes them.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        let strings = [
            "java.lang.String",
            "java.lang.Character",
            "java.util.UUID",
            "java.net.URI",
            "java.net.URL",
            "javax.xml.namespace.QName",
            "java.util.Locale",
            "java.util.TimeZone",
            "javax.xml.datatype.Duration",
        ];
        for name in strings {
            r.register(name, Ty::String);
        }
        let timestamps = [
            "java.util.Date",
            "java.util.Calendar",
            "java.util.GregorianCalendar",
            "java.sql.Timestamp",
            "javax.xml.datatype.XMLGregorianCalendar",
        ];
        for name in timestamps {
            r.register(name, Ty::whole(Some(Format::Int64)));
        }
        r.register("java.lang.Boolean", Ty::Boolean)
            .register("java.lang.Integer", Ty::whole(Some(Format::Int32)))
            .register("java.lang.Long", Ty::whole(Some(Format::Int64)))
            .register("java.lang.Short", Ty::whole(None))
            .register("java.lang.Byte", Ty::whole(None))
            .register("java.math.BigInteger", Ty::whole(None))
            .register("java.lang.Float", Ty::number(Some(Format::Float)))
            .register("java.lang.Double", Ty::number(Some(Format::Double)))
            .register("java.math.BigDecimal", Ty::number(None))
            .register("java.lang.Object", Ty::Object);
        r
    }

    /// Builtins overlaid with whatever the model registers.
    pub fn for_model(model: &Model) -> Self {
        let mut r = Self::with_builtins();
        for (name, ty) in &model.known {
            r.register(name.clone(), ty.clone());
        }
        for name in &model.definitions {
            r.define(name.clone());
        }
        r
    }

    pub fn register(&mut self, name: impl Into<String>, ty: Ty) -> &mut Self {
        self.known.insert(name.into(), ty);
        self
    }

    pub fn define(&mut self, name: impl Into<String>) -> &mut Self {
        self.definitions.insert(name.into());
        self
    }

    pub fn lookup_known(&self, name: &str) -> Option<&Ty> {
        self.known.get(name)
    }

    pub fn lookup_definition(&self, name: &str) -> Option<TypeDefRef> {
        self.definitions
            .get(name)
            .map(|n| TypeDefRef { name: n.clone() })
    }
}
