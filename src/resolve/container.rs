//! Collection / stream / map recognition and component normalization.
//!
//! A declared use is a container if its name is a configured root or if any
//! supertype reaches one. Supertypes are walked with type-argument
//! substitution so `NodeList extends ArrayList<Node>` yields `Node`.

use std::collections::HashSet;

use crate::config::Settings;
use crate::decl::{TypeRef, TypeSource};

pub struct Containers<'a, S: ?Sized> {
    source: &'a S,
    settings: &'a Settings,
}

impl<'a, S: TypeSource + ?Sized> Containers<'a, S> {
    pub fn new(source: &'a S, settings: &'a Settings) -> Self {
        Self { source, settings }
    }

    fn object(&self) -> TypeRef {
        TypeRef::declared(self.settings.object_type.clone())
    }

    /// The root use reached from `ty`, with `ty`'s arguments carried through.
    fn find_root(&self, ty: &TypeRef, is_root: &dyn Fn(&str) -> bool) -> Option<TypeRef> {
        let mut visited = HashSet::new();
        self.walk(ty, is_root, &mut visited)
    }

    fn walk(
        &self,
        ty: &TypeRef,
        is_root: &dyn Fn(&str) -> bool,
        visited: &mut HashSet<String>,
    ) -> Option<TypeRef> {
        let name = ty.declared_name()?;
        if is_root(name) {
            return Some(ty.clone());
        }
        if !visited.insert(name.to_string()) {
            return None;
        }
        let decl = self.source.declaration(name)?;
        decl.supertypes.iter().find_map(|sup| {
            let sup = sup.substitute(&decl.type_params, ty.type_args());
            self.walk(&sup, is_root, visited)
        })
    }

    pub fn is_collection(&self, ty: &TypeRef) -> bool {
        self.find_root(ty, &|n: &str| self.settings.is_collection_root(n)).is_some()
    }

    pub fn is_stream(&self, ty: &TypeRef) -> bool {
        self.find_root(ty, &|n: &str| self.settings.is_stream_root(n)).is_some()
    }

    pub fn is_map(&self, ty: &TypeRef) -> bool {
        self.find_root(ty, &|n: &str| self.settings.is_map_root(n)).is_some()
    }

    /// Element type of an array, collection or stream; `None` for anything else.
    pub fn component_type(&self, ty: &TypeRef) -> Option<TypeRef> {
        if let TypeRef::Array(component) = ty {
            return Some((**component).clone());
        }
        let root = self.find_root(ty, &|n: &str| {
            self.settings.is_collection_root(n) || self.settings.is_stream_root(n)
        })?;
        let component = match root.type_args() {
            [single] => match single {
                TypeRef::Wildcard { extends: Some(bound) } => (**bound).clone(),
                TypeRef::Wildcard { extends: None } => self.object(),
                other => other.clone(),
            },
            _ => self.object(),
        };
        Some(self.narrow_transient(component))
    }

    // A transient, unadapted element cannot be bound; treat it as Object.
    fn narrow_transient(&self, component: TypeRef) -> TypeRef {
        let narrowed = component
            .declared_name()
            .and_then(|n| self.source.declaration(n))
            .is_some_and(|d| d.transient && d.adapter.is_none());
        if narrowed {
            tracing::trace!(component = %component, "narrowing transient component to object");
            self.object()
        } else {
            component
        }
    }

    /// Key and value of a map-like use; a raw map is `(Object, Object)`.
    pub fn map_type(&self, ty: &TypeRef) -> Option<(TypeRef, TypeRef)> {
        let root = self.find_root(ty, &|n: &str| self.settings.is_map_root(n))?;
        match root.type_args() {
            [key, value] => Some((key.clone(), value.clone())),
            _ => Some((self.object(), self.object())),
        }
    }

    /// Strip one array or collection layer, reporting which one was stripped.
    pub fn unwrap_element(&self, ty: &TypeRef) -> (TypeRef, Wrapping) {
        match ty {
            TypeRef::Array(c) => ((**c).clone(), Wrapping::Array),
            TypeRef::Declared { .. } if self.is_map(ty) => (ty.clone(), Wrapping::None),
            TypeRef::Declared { .. } => match self.component_type(ty) {
                Some(c) => (c, Wrapping::Collection),
                None => (ty.clone(), Wrapping::None),
            },
            _ => (ty.clone(), Wrapping::None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapping {
    None,
    Array,
    Collection,
}
