//! Per-operation state passed explicitly through every freeze and thaw call.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::WriteOptions;
use crate::dom::Element;
use crate::error::{Result, WspError};
use crate::mapping::TypeMapping;
use crate::model::{PolicyObject, TypeRef, TypedValue, Value};
use crate::registry::{TypeMappingFinder, TypeMappingRegistry};
use crate::visitor::WspVisitor;
use crate::wire::{L7_NAMESPACE, NULL_SUFFIX, REFERENCE_SUFFIX};

/// State of a single write.
///
/// Mappings that know about polymorphic subtypes push a finder for the
/// duration of their freeze with [`with_finder`](Self::with_finder).
pub struct WriteContext<'a> {
    registry: &'a TypeMappingRegistry,
    options: &'a WriteOptions,
    finders: Vec<Arc<dyn TypeMappingFinder>>,
    depth: usize,
}

impl<'a> WriteContext<'a> {
    pub fn new(registry: &'a TypeMappingRegistry, options: &'a WriteOptions) -> Self {
        Self {
            registry,
            options,
            finders: Vec::new(),
            depth: 0,
        }
    }

    pub fn options(&self) -> &WriteOptions {
        self.options
    }

    /// Returns true when dual-shape mappings should write their legacy shape.
    pub fn legacy_compatible(&self) -> bool {
        self.options.legacy_compatible
    }

    /// Resolves the mapping for `ty`, using `object` for capability hooks.
    pub fn resolve(
        &self,
        ty: TypeRef,
        object: Option<&dyn PolicyObject>,
    ) -> Option<Arc<dyn TypeMapping>> {
        self.registry.resolve_by_type(
            ty,
            object,
            &self.finders,
            self.options.target_version.as_ref(),
        )
    }

    fn require(
        &self,
        ty: TypeRef,
        object: Option<&dyn PolicyObject>,
    ) -> Result<Arc<dyn TypeMapping>> {
        self.resolve(ty, object)
            .ok_or_else(|| WspError::NoMappingForType {
                type_name: ty.name().to_string(),
            })
    }

    /// Freezes `value` with the mapping resolved from its declared type.
    pub fn freeze_value(&mut self, value: &TypedValue, into: &mut Element) -> Result<()> {
        let mapping = self.require(value.ty(), value.value().and_then(Value::as_object))?;
        self.freeze_with(mapping.as_ref(), value, into)
    }

    /// Freezes `value` with an explicit mapping.
    pub fn freeze_with(
        &mut self,
        mapping: &dyn TypeMapping,
        value: &TypedValue,
        into: &mut Element,
    ) -> Result<()> {
        self.descend(mapping, |cx| mapping.freeze(cx, value, into))
    }

    /// Freezes a borrowed object anonymously with the mapping of its
    /// runtime type.
    pub fn freeze_object(&mut self, object: &dyn PolicyObject, into: &mut Element) -> Result<()> {
        let mapping = self.require(object.type_ref(), Some(object))?;
        self.freeze_object_with(mapping.as_ref(), object, into)
    }

    /// Freezes a borrowed object anonymously with an explicit mapping.
    pub fn freeze_object_with(
        &mut self,
        mapping: &dyn TypeMapping,
        object: &dyn PolicyObject,
        into: &mut Element,
    ) -> Result<()> {
        self.descend(mapping, |cx| mapping.freeze_object(cx, object, into))
    }

    fn descend(
        &mut self,
        mapping: &dyn TypeMapping,
        freeze: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        self.depth += 1;
        let result = if self.depth > self.options.max_depth {
            Err(WspError::TooDeeplyNested {
                limit: self.options.max_depth,
            })
        } else {
            trace!(mapping = mapping.external_name(), depth = self.depth, "freeze");
            freeze(self)
        };
        self.depth -= 1;
        result
    }

    /// Runs `f` with `finder` pushed on the finder stack.
    pub fn with_finder<R>(
        &mut self,
        finder: Option<Arc<dyn TypeMappingFinder>>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let pushed = match finder {
            Some(finder) => {
                self.finders.push(finder);
                true
            }
            None => false,
        };
        let result = f(self);
        if pushed {
            self.finders.pop();
        }
        result
    }
}

/// State of a single read.
pub struct ReadContext<'a> {
    registry: &'a TypeMappingRegistry,
    visitor: &'a dyn WspVisitor,
    finders: Vec<Arc<dyn TypeMappingFinder>>,
    depth: usize,
    max_depth: usize,
}

impl<'a> ReadContext<'a> {
    pub fn new(
        registry: &'a TypeMappingRegistry,
        visitor: &'a dyn WspVisitor,
        max_depth: usize,
    ) -> Self {
        Self {
            registry,
            visitor,
            finders: Vec::new(),
            depth: 0,
            max_depth,
        }
    }

    pub fn visitor(&self) -> &'a dyn WspVisitor {
        self.visitor
    }

    fn fallback_finders(&self) -> Vec<Option<Arc<dyn TypeMappingFinder>>> {
        self.finders
            .iter()
            .rev()
            .cloned()
            .map(Some)
            .chain(std::iter::once(self.visitor.type_mapping_finder()))
            .collect()
    }

    /// Finds the mapping for an element.
    ///
    /// Named-form elements are recognised by an attribute keyed with a
    /// mapping's external name (optionally with the `Null` or `Reference`
    /// suffix). Anything else resolves by its local name.
    pub fn resolve_element(&self, source: &Element) -> Option<Arc<dyn TypeMapping>> {
        let fallback = self.fallback_finders();
        let resolve = |name: &str| self.registry.resolve_by_name(name, &fallback);

        for attr in source.plain_attributes() {
            if attr
                .name
                .namespace()
                .is_some_and(|namespace| namespace != L7_NAMESPACE)
            {
                continue;
            }
            let key = attr.name.local.as_str();
            if let Some(mapping) = resolve(key) {
                return Some(mapping);
            }
            let base = key
                .strip_suffix(NULL_SUFFIX)
                .or_else(|| key.strip_suffix(REFERENCE_SUFFIX))
                .filter(|base| !base.is_empty());
            if let Some(mapping) = base.and_then(resolve) {
                return Some(mapping);
            }
        }
        resolve(source.local_name())
    }

    /// Thaws an element, routing recoverable failures through the visitor.
    ///
    /// The visitor may supply a substitute element, which is thawed once;
    /// a second failure propagates.
    pub fn thaw_element(&mut self, source: &Element) -> Result<TypedValue> {
        self.depth += 1;
        let result = if self.depth > self.max_depth {
            Err(WspError::TooDeeplyNested {
                limit: self.max_depth,
            })
        } else {
            self.thaw_recovering(source)
        };
        self.depth -= 1;
        result
    }

    fn thaw_recovering(&mut self, source: &Element) -> Result<TypedValue> {
        match self.thaw_once(source) {
            Err(err) if err.is_recoverable() => {
                debug!(
                    element = %source.name.qualified(),
                    error = %err,
                    "handing unresolved element to visitor"
                );
                // The visitor may snapshot the whole subtree.
                if source.exceeds_depth(self.max_depth - self.depth + 1) {
                    return Err(WspError::TooDeeplyNested {
                        limit: self.max_depth,
                    });
                }
                let substitute = self.visitor.invalid_element(source, err)?;
                self.thaw_once(&substitute)
            }
            other => other,
        }
    }

    fn thaw_once(&mut self, source: &Element) -> Result<TypedValue> {
        let mapping =
            self.resolve_element(source)
                .ok_or_else(|| WspError::UnknownElement {
                    name: source.local_name().to_string(),
                })?;
        trace!(
            element = source.local_name(),
            mapping = mapping.external_name(),
            depth = self.depth,
            "thaw"
        );
        mapping.thaw(self, source)
    }

    /// Reports a property that could not be applied to `target`.
    pub fn unknown_property(
        &self,
        target: &mut dyn PolicyObject,
        source: &Element,
        property: &str,
        value: &TypedValue,
        error: WspError,
    ) -> Result<()> {
        self.visitor
            .unknown_property(target, source, property, value, error)
    }

    /// Runs `f` with `finder` pushed on the finder stack.
    pub fn with_finder<R>(
        &mut self,
        finder: Option<Arc<dyn TypeMappingFinder>>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let pushed = match finder {
            Some(finder) => {
                self.finders.push(finder);
                true
            }
            None => false,
        };
        let result = f(self);
        if pushed {
            self.finders.pop();
        }
        result
    }
}
