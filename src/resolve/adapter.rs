//! Adapter lookup: member annotation, then the element type's own, then the
//! enclosing package's table.
//!
//! Package tables are built once per package and shared for the rest of the
//! process. A table that fails to build keeps failing with the same error.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::decl::{AdapterAnnotation, Declaration, TypeRef, TypeSource};
use crate::error::ConfigError;
use super::container::{Containers, Wrapping};

/// Adapted type name → package-level annotation.
pub type AdapterTable = IndexMap<String, AdapterAnnotation>;

type Slot = Arc<OnceCell<Result<AdapterTable, ConfigError>>>;

#[derive(Debug, Default)]
pub struct AdapterCache {
    tables: RwLock<HashMap<String, Slot>>,
}

impl AdapterCache {
    pub fn new() -> Self { Self::default() }

    fn slot(&self, package: &str) -> Slot {
        if let Some(slot) = self.tables.read().get(package) {
            return slot.clone();
        }
        self.tables.write().entry(package.to_string()).or_default().clone()
    }

    /// Adapter registered for `adapted` in `package`, building the table on first use.
    pub fn lookup<S: TypeSource + ?Sized>(
        &self,
        source: &S,
        package: &str,
        adapted: &str,
    ) -> Result<Option<AdapterAnnotation>, ConfigError> {
        let slot = self.slot(package);
        match slot.get_or_init(|| build_table(source, package)) {
            Ok(table) => Ok(table.get(adapted).cloned()),
            Err(err) => Err(err.clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn build_table<S: TypeSource + ?Sized>(source: &S, package: &str) -> Result<AdapterTable, ConfigError> {
    let mut table = AdapterTable::new();
    let Some(pkg) = source.package(package) else {
        return Ok(table);
    };
    for info in &pkg.adapters {
        let Some(adapted) = &info.adapted else {
            return Err(ConfigError::PackageAdapterWithoutType { package: package.to_string() });
        };
        let Some(name) = adapted.declared_name() else {
            return Err(ConfigError::UnadaptableType {
                package: package.to_string(),
                ty: adapted.to_string(),
            });
        };
        table.insert(name.to_string(), info.clone());
    }
    tracing::trace!(package, adapters = table.len(), "built package adapter table");
    Ok(table)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterLevel {
    Member,
    Type,
    Package,
}

/// Where an adaptation is being looked up.
#[derive(Debug, Clone, Copy, Default)]
pub struct Position<'p> {
    pub member: Option<&'p AdapterAnnotation>,
    pub package: Option<&'p str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adaptation {
    /// Type classified in place of the adapted element.
    pub adapting: TypeRef,
    pub level: AdapterLevel,
    /// Container layer that was stripped to reach the adapted element.
    pub wrapping: Wrapping,
}

pub struct AdapterResolver<'a, S: ?Sized> {
    source: &'a S,
    containers: Containers<'a, S>,
    cache: &'a AdapterCache,
}

impl<'a, S: TypeSource + ?Sized> AdapterResolver<'a, S> {
    pub fn new(source: &'a S, containers: Containers<'a, S>, cache: &'a AdapterCache) -> Self {
        Self { source, containers, cache }
    }

    /// The adaptation applying to `ty` at `position`, if any.
    ///
    /// Containers are unwrapped first; the adaptation targets the element.
    /// An adapter whose adapting type is the element itself is ignored.
    pub fn resolve(&self, position: Position<'_>, ty: &TypeRef) -> Result<Option<Adaptation>, ConfigError> {
        let (element, wrapping) = self.containers.unwrap_element(ty);

        let mut found = position.member.map(|info| (info.clone(), AdapterLevel::Member));
        if let Some(name) = element.declared_name() {
            if found.is_none() {
                found = self
                    .source
                    .declaration(name)
                    .and_then(|d| d.adapter.clone())
                    .map(|info| (info, AdapterLevel::Type));
            }
            if found.is_none() {
                if let Some(package) = position.package {
                    found = self
                        .cache
                        .lookup(self.source, package, name)?
                        .map(|info| (info, AdapterLevel::Package));
                }
            }
        }

        let Some((info, level)) = found else {
            return Ok(None);
        };
        if info.target == element {
            tracing::debug!(element = %element, ?level, "ignoring no-op adapter");
            return Ok(None);
        }
        tracing::debug!(element = %element, adapting = %info.target, ?level, "adapter applies");
        Ok(Some(Adaptation { adapting: info.target, level, wrapping }))
    }

    /// Adaptation declared on `decl` itself, for a use `ty` of it. No unwrapping.
    pub fn for_declaration(&self, decl: &Declaration, ty: &TypeRef) -> Option<Adaptation> {
        let info = decl.adapter.as_ref()?;
        if info.target == *ty || info.target == decl.as_type() {
            tracing::debug!(declaration = %decl.name, "ignoring no-op adapter");
            return None;
        }
        Some(Adaptation {
            adapting: info.target.clone(),
            level: AdapterLevel::Type,
            wrapping: Wrapping::None,
        })
    }
}
