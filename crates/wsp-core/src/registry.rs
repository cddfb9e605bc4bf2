//! Type mapping registry and finders.
//!
//! The registry holds two immutable tables built once: the **primary** table
//! (read and write) and the **legacy** table (read only, consulted by name).
//! Values and contexts can contribute further [`TypeMappingFinder`]s, and a
//! read-mostly extension chain accepts finders registered at runtime.
//!
//! # Resolution order
//!
//! By name (thaw): primary, legacy, the caller's fallback finders, then the
//! extension chain.
//!
//! By type (freeze): primary, the value's own associated mapping, the
//! value's subtype finder, the context finders (innermost first), then the
//! extension chain.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::{Result, WspError};
use crate::mapping::{TypeMapping, core_mappings};
use crate::model::{PolicyObject, TypeRef};
use crate::version::Version;

/// Source of type mappings outside the registry's own tables.
pub trait TypeMappingFinder: Send + Sync + Debug {
    fn by_external_name(&self, name: &str) -> Option<Arc<dyn TypeMapping>>;

    /// Mapping for `ty`, excluding mappings introduced after `version`.
    fn by_type(&self, ty: TypeRef, version: Option<&Version>) -> Option<Arc<dyn TypeMapping>>;
}

/// Returns true if `mapping` exists in the target `version`.
pub(crate) fn admits(mapping: &dyn TypeMapping, version: Option<&Version>) -> bool {
    match (mapping.since_version(), version) {
        (Some(since), Some(target)) => since <= target,
        _ => true,
    }
}

// =============================================================================
// MAPPING TABLE
// =============================================================================

/// Indexed list of mappings, unique by external name.
///
/// When several mappings govern the same type, the first one inserted is
/// the one found by type.
#[derive(Debug, Default, Clone)]
pub struct MappingTable {
    mappings: Vec<Arc<dyn TypeMapping>>,
    by_name: HashMap<String, usize>,
    by_type: HashMap<TypeRef, usize>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_mappings(mappings: impl IntoIterator<Item = Arc<dyn TypeMapping>>) -> Result<Self> {
        let mut table = Self::new();
        for mapping in mappings {
            table.insert(mapping)?;
        }
        Ok(table)
    }

    /// Adds a mapping after validating it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the mapping is inconsistent or its
    /// external name is already taken.
    pub fn insert(&mut self, mapping: Arc<dyn TypeMapping>) -> Result<()> {
        mapping.validate()?;
        let name = mapping.external_name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(WspError::configuration(format!(
                "duplicate external name {name}"
            )));
        }
        let index = self.mappings.len();
        self.by_name.insert(name, index);
        self.by_type.entry(mapping.mapped_type()).or_insert(index);
        self.mappings.push(mapping);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn TypeMapping>> {
        self.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl TypeMappingFinder for MappingTable {
    fn by_external_name(&self, name: &str) -> Option<Arc<dyn TypeMapping>> {
        self.by_name
            .get(name)
            .and_then(|&index| self.mappings.get(index))
            .cloned()
    }

    fn by_type(&self, ty: TypeRef, version: Option<&Version>) -> Option<Arc<dyn TypeMapping>> {
        self.by_type
            .get(&ty)
            .and_then(|&index| self.mappings.get(index))
            .filter(|mapping| admits(mapping.as_ref(), version))
            .cloned()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// The set of mappings used by readers and writers.
///
/// Tables are immutable after [`build`](TypeMappingRegistryBuilder::build);
/// only the extension chain changes afterwards.
#[derive(Debug)]
pub struct TypeMappingRegistry {
    primary: MappingTable,
    legacy: MappingTable,
    extensions: RwLock<Vec<Arc<dyn TypeMappingFinder>>>,
}

impl TypeMappingRegistry {
    pub fn builder() -> TypeMappingRegistryBuilder {
        TypeMappingRegistryBuilder::default()
    }

    /// Registry holding only the core mappings.
    pub fn core() -> Result<Self> {
        Self::builder().build()
    }

    pub fn primary(&self) -> &MappingTable {
        &self.primary
    }

    pub fn legacy(&self) -> &MappingTable {
        &self.legacy
    }

    /// Appends a finder to the extension chain.
    pub fn register_finder(&self, finder: Arc<dyn TypeMappingFinder>) {
        let mut extensions = self
            .extensions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        extensions.push(finder);
    }

    fn find_extension<T>(&self, find: impl Fn(&dyn TypeMappingFinder) -> Option<T>) -> Option<T> {
        let extensions = self
            .extensions
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        extensions.iter().find_map(|finder| find(finder.as_ref()))
    }

    /// Looks up the mapping for an external name. Used on thaw only.
    ///
    /// Absent entries in `fallback` are skipped.
    pub fn resolve_by_name(
        &self,
        name: &str,
        fallback: &[Option<Arc<dyn TypeMappingFinder>>],
    ) -> Option<Arc<dyn TypeMapping>> {
        if let Some(mapping) = self.primary.by_external_name(name) {
            return Some(mapping);
        }
        if let Some(mapping) = self.legacy.by_external_name(name) {
            debug!(name, "resolved through legacy mapping");
            return Some(mapping);
        }
        fallback
            .iter()
            .flatten()
            .find_map(|finder| finder.by_external_name(name))
            .or_else(|| self.find_extension(|finder| finder.by_external_name(name)))
    }

    /// Looks up the mapping for a runtime type. Used on freeze only.
    ///
    /// `object` supplies the polymorphic capability hooks; `finders` are the
    /// write context's finders, outermost first.
    pub fn resolve_by_type(
        &self,
        ty: TypeRef,
        object: Option<&dyn PolicyObject>,
        finders: &[Arc<dyn TypeMappingFinder>],
        version: Option<&Version>,
    ) -> Option<Arc<dyn TypeMapping>> {
        if let Some(mapping) = self.primary.by_type(ty, version) {
            return Some(mapping);
        }
        if let Some(object) = object {
            if let Some(mapping) = object
                .type_mapping()
                .filter(|mapping| mapping.mapped_type() == ty && admits(mapping.as_ref(), version))
            {
                return Some(mapping);
            }
            if let Some(mapping) = object
                .subtype_finder()
                .and_then(|finder| finder.by_type(ty, version))
            {
                return Some(mapping);
            }
        }
        finders
            .iter()
            .rev()
            .find_map(|finder| finder.by_type(ty, version))
            .or_else(|| self.find_extension(|finder| finder.by_type(ty, version)))
    }
}

/// Collects mappings for a [`TypeMappingRegistry`].
#[derive(Debug, Default)]
pub struct TypeMappingRegistryBuilder {
    primary: Vec<Arc<dyn TypeMapping>>,
    legacy: Vec<Arc<dyn TypeMapping>>,
    finders: Vec<Arc<dyn TypeMappingFinder>>,
}

impl TypeMappingRegistryBuilder {
    #[must_use]
    pub fn mapping(mut self, mapping: Arc<dyn TypeMapping>) -> Self {
        self.primary.push(mapping);
        self
    }

    #[must_use]
    pub fn mappings(mut self, mappings: impl IntoIterator<Item = Arc<dyn TypeMapping>>) -> Self {
        self.primary.extend(mappings);
        self
    }

    /// Adds a read-only mapping, consulted by name after the primary table.
    #[must_use]
    pub fn legacy_mapping(mut self, mapping: Arc<dyn TypeMapping>) -> Self {
        self.legacy.push(mapping);
        self
    }

    #[must_use]
    pub fn legacy_mappings(
        mut self,
        mappings: impl IntoIterator<Item = Arc<dyn TypeMapping>>,
    ) -> Self {
        self.legacy.extend(mappings);
        self
    }

    #[must_use]
    pub fn finder(mut self, finder: Arc<dyn TypeMappingFinder>) -> Self {
        self.finders.push(finder);
        self
    }

    /// Builds the registry. Core mappings are always included first.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for duplicate external names within a
    /// table or for mappings that fail validation.
    pub fn build(self) -> Result<TypeMappingRegistry> {
        let primary = MappingTable::from_mappings(core_mappings()?.into_iter().chain(self.primary))?;
        let legacy = MappingTable::from_mappings(self.legacy)?;
        debug!(
            primary = primary.len(),
            legacy = legacy.len(),
            extensions = self.finders.len(),
            "built type mapping registry"
        );
        Ok(TypeMappingRegistry {
            primary,
            legacy,
            extensions: RwLock::new(self.finders),
        })
    }
}
