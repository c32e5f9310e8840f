//! Type model resolution: declared types in, closed schema types out.
//!
//! The visitor dispatches on the kind of a [`TypeRef`] and threads a small
//! [`Ctx`] (was this reached through an array? through a container?) plus a
//! [`RecursionStack`] of the declared types currently being visited.
//!
//! Override precedence for a declared type, lowest to highest:
//! - type hint on the declaration
//! - custom serializer (opaque `Object`), then its substitute `as` type
//! - the declaration's own adapter, which discards everything above
//!
//! Only when none of these produced a result are maps, collections and the
//! known-type registry consulted. Anything still unresolved is `Object`.
pub mod adapter;
pub mod container;
pub mod guard;
pub mod known;
pub mod primitive;
pub mod qname;

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::config::Settings;
use crate::decl::{DeclKind, Declaration, Member, PrimitiveKind, TypeRef, TypeSource};
use crate::error::ConfigError;
use crate::ir::Ty;

pub use adapter::{AdapterCache, AdapterLevel, AdapterResolver, Adaptation, Position};
pub use container::{Containers, Wrapping};
pub use guard::RecursionStack;
pub use known::Registry;

/// Nested uses of one generic declaration allowed on a single path.
const MAX_NESTED_USES: usize = 16;

// ------------------------------- Context --------------------------------- //

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ctx {
    pub in_array: bool,
    pub in_collection: bool,
}

impl Ctx {
    pub fn array() -> Self { Self { in_array: true, in_collection: false } }

    pub fn collection() -> Self { Self { in_array: false, in_collection: true } }

    fn for_wrapping(wrapping: Wrapping) -> Self {
        match wrapping {
            Wrapping::None => Self::default(),
            Wrapping::Array => Self::array(),
            Wrapping::Collection => Self::collection(),
        }
    }

    /// Both flags collapse into a single `Array` layer.
    pub fn wraps(self) -> bool {
        self.in_array || self.in_collection
    }
}

/// A declaration's own schema type plus one per member, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationSchema {
    pub name: String,
    pub ty: Ty,
    pub members: IndexMap<String, Ty>,
}

// ------------------------------- Resolver -------------------------------- //

pub struct Resolver<'a, S: ?Sized> {
    source: &'a S,
    registry: &'a Registry,
    adapters: &'a AdapterCache,
    settings: &'a Settings,
}

impl<'a, S: TypeSource + ?Sized> Resolver<'a, S> {
    pub fn new(
        source: &'a S,
        registry: &'a Registry,
        adapters: &'a AdapterCache,
        settings: &'a Settings,
    ) -> Self {
        Self { source, registry, adapters, settings }
    }

    pub fn containers(&self) -> Containers<'a, S> {
        Containers::new(self.source, self.settings)
    }

    pub fn adapter_resolver(&self) -> AdapterResolver<'a, S> {
        AdapterResolver::new(self.source, self.containers(), self.adapters)
    }

    /// Classify one root type with a fresh recursion guard.
    pub fn classify(&self, ty: &TypeRef) -> Result<Ty, ConfigError> {
        let mut stack = RecursionStack::new();
        self.classify_in(ty, Ctx::default(), &mut stack)
    }

    /// Classify under an explicit context, sharing the caller's guard.
    pub fn classify_in(&self, ty: &TypeRef, ctx: Ctx, stack: &mut RecursionStack) -> Result<Ty, ConfigError> {
        self.visit(ty, ctx, stack)
    }

    /// Classify a member of `owner`.
    ///
    /// A member type hint replaces the declared type outright. Adapters are
    /// then looked up on the member, the element type and `owner`'s package,
    /// in that order; an adapter applies to the element and the container's
    /// wrapping is kept.
    pub fn classify_member(&self, owner: &Declaration, member: &Member) -> Result<Ty, ConfigError> {
        let mut stack = RecursionStack::new();
        let ty = member.type_hint.as_ref().unwrap_or(&member.ty);
        let position = Position {
            member: member.adapter.as_ref(),
            package: Some(owner.package()),
        };
        match self.adapter_resolver().resolve(position, ty)? {
            Some(adaptation) => {
                let ctx = Ctx::for_wrapping(adaptation.wrapping);
                self.visit(&adaptation.adapting, ctx, &mut stack)
            }
            None => self.visit(ty, Ctx::default(), &mut stack),
        }
    }

    pub fn classify_declaration(&self, decl: &Declaration) -> Result<DeclarationSchema, ConfigError> {
        let ty = self.classify(&decl.as_type())?;
        let mut members = IndexMap::with_capacity(decl.members.len());
        for member in &decl.members {
            members.insert(member.name.clone(), self.classify_member(decl, member)?);
        }
        Ok(DeclarationSchema { name: decl.name.clone(), ty, members })
    }

    /// Classify many declarations in parallel. Each root gets its own guard;
    /// the registry and adapter cache are shared.
    pub fn classify_all(&self, decls: &[&Declaration]) -> Vec<Result<DeclarationSchema, ConfigError>> {
        decls.par_iter().map(|d| self.classify_declaration(d)).collect()
    }

    // ------------------------------- Visitor ------------------------------- //

    fn visit(&self, ty: &TypeRef, ctx: Ctx, stack: &mut RecursionStack) -> Result<Ty, ConfigError> {
        tracing::trace!(ty = %ty, ?ctx, depth = stack.len(), "visit");
        match ty {
            TypeRef::Primitive(kind) => Ok(visit_primitive(*kind, ctx)),
            TypeRef::Declared { name, .. } => self.visit_declared(ty, name, ctx, stack),
            TypeRef::Array(component) => self.visit_array(component, stack),
            TypeRef::Var { bound, .. } => self.visit_bounded(bound.as_deref(), ctx, stack),
            TypeRef::Wildcard { extends } => self.visit_bounded(extends.as_deref(), ctx, stack),
        }
    }

    fn visit_declared(
        &self,
        ty: &TypeRef,
        name: &str,
        ctx: Ctx,
        stack: &mut RecursionStack,
    ) -> Result<Ty, ConfigError> {
        let containers = self.containers();
        let key = ty.to_string();
        // a use whose arguments grow on every expansion never repeats exactly
        if stack.contains(&key) || stack.uses_of(name) >= MAX_NESTED_USES {
            let broken = if containers.is_collection(ty) {
                Ty::array_of(Ty::Object)
            } else {
                Ty::Object
            };
            tracing::debug!(ty = %key, result = %broken, "breaking recursive reference");
            return Ok(broken);
        }

        let mut frame = stack.enter(&key);
        let decl = self.source.declaration(name);
        let mut result: Option<Ty> = None;

        if let Some(hint) = decl.and_then(|d| d.type_hint.as_ref()) {
            result = Some(self.visit(hint, Ctx::default(), &mut frame)?);
        }

        if let Some(serialize) = decl.and_then(|d| d.serialize.as_ref()) {
            if serialize.custom_serializer {
                // the serializer's real shape is unknowable
                result = Some(Ty::Object);
            }
            if let Some(substitute) = &serialize.substitute {
                result = Some(self.visit(substitute, Ctx::default(), &mut frame)?);
            }
        }

        let adaptation = decl.and_then(|d| self.adapter_resolver().for_declaration(d, ty));
        match adaptation {
            Some(adaptation) => {
                result = Some(self.visit(&adaptation.adapting, Ctx::default(), &mut frame)?);
            }
            None if result.is_none() => {
                if let Some((key, value)) = containers.map_type(ty) {
                    let key = self.visit(&key, Ctx::default(), &mut frame)?;
                    let value = self.visit(&value, Ctx::default(), &mut frame)?;
                    result = Some(Ty::map_of(key, value));
                } else if let Some(component) = containers.component_type(ty) {
                    // the component visit does its own wrapping
                    return self.visit(&component, Ctx::collection(), &mut frame);
                } else {
                    result = self.known_type(name, decl, ctx)?;
                }
            }
            None => {}
        }

        let resolved = result.unwrap_or_else(|| {
            tracing::debug!(name, "no schema type found; falling back to object");
            Ty::Object
        });
        Ok(resolved.wrap_if(ctx.wraps()))
    }

    fn known_type(&self, name: &str, decl: Option<&Declaration>, ctx: Ctx) -> Result<Option<Ty>, ConfigError> {
        // undeclared names are treated as plain classes
        let kind = decl.map_or(DeclKind::Class, |d| d.kind);
        match kind {
            DeclKind::Class | DeclKind::Enum => {
                let qname = decl
                    .filter(|d| d.kind == DeclKind::Enum)
                    .and_then(|d| d.qname_enum.as_ref().map(|info| (d, info)));
                if let Some((d, info)) = qname {
                    qname::enum_values(d, info, self.source.package(d.package()))?;
                    return Ok(Some(Ty::String));
                }
                if let Some(known) = self.registry.lookup_known(name) {
                    return Ok(Some(known.clone()));
                }
                Ok(self.registry.lookup_definition(name).map(Ty::Class))
            }
            DeclKind::Interface => Ok(ctx.in_collection.then_some(Ty::Object)),
        }
    }

    // An enclosing context never adds a layer on top of an array's own.
    fn visit_array(&self, component: &TypeRef, stack: &mut RecursionStack) -> Result<Ty, ConfigError> {
        if let TypeRef::Array(inner) = component {
            // one layer per dimension
            return Ok(Ty::array_of(self.visit_array(inner, stack)?));
        }
        self.visit(component, Ctx::array(), stack)
    }

    fn visit_bounded(
        &self,
        bound: Option<&TypeRef>,
        ctx: Ctx,
        stack: &mut RecursionStack,
    ) -> Result<Ty, ConfigError> {
        let ty = match bound {
            None => Ty::Object,
            Some(bound) => self.visit(bound, Ctx::default(), stack)?,
        };
        Ok(ty.wrap_if(ctx.wraps()))
    }
}

fn visit_primitive(kind: PrimitiveKind, ctx: Ctx) -> Ty {
    if ctx.in_array && kind == PrimitiveKind::Byte {
        // byte[] is written as a base64 string
        return Ty::String;
    }
    primitive::primitive_ty(kind).wrap_if(ctx.wraps())
}
