//! Error recovery policies for thaw.
//!
//! Every recoverable problem met while thawing is handed to a
//! [`WspVisitor`]. [`StrictVisitor`] escalates, making reads all-or-nothing.
//! [`PermissiveVisitor`] quarantines unknown elements as
//! [`UnknownAssertion`](crate::model::UnknownAssertion) placeholders and
//! drops unknown properties. [`InterceptingVisitor`] decorates either one
//! with property shims that translate deprecated encodings.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::dom::Element;
use crate::error::{Result, WspError};
use crate::mapping::framing;
use crate::model::{PolicyObject, PropertyError, TypeRef, TypedValue};
use crate::registry::TypeMappingFinder;
use crate::xml;

/// Recovery policy consulted during thaw.
pub trait WspVisitor {
    /// Called when `source` cannot be thawed.
    ///
    /// Returns a substitute element to thaw instead, or an error to abort.
    fn invalid_element(&self, source: &Element, error: WspError) -> Result<Element>;

    /// Called when a thawed `value` cannot be applied to `target` as `property`.
    fn unknown_property(
        &self,
        target: &mut dyn PolicyObject,
        source: &Element,
        property: &str,
        value: &TypedValue,
        error: WspError,
    ) -> Result<()>;

    /// Extra finder consulted during name resolution.
    fn type_mapping_finder(&self) -> Option<Arc<dyn TypeMappingFinder>> {
        None
    }
}

fn escalate(source: &Element, error: WspError) -> WspError {
    WspError::InvalidPolicy {
        element: source.local_name().to_string(),
        source: Box::new(error),
    }
}

// =============================================================================
// STRICT
// =============================================================================

/// Aborts on the first recoverable problem.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictVisitor;

impl WspVisitor for StrictVisitor {
    fn invalid_element(&self, source: &Element, error: WspError) -> Result<Element> {
        Err(escalate(source, error))
    }

    fn unknown_property(
        &self,
        _target: &mut dyn PolicyObject,
        source: &Element,
        _property: &str,
        _value: &TypedValue,
        error: WspError,
    ) -> Result<()> {
        Err(escalate(source, error))
    }
}

// =============================================================================
// PERMISSIVE
// =============================================================================

/// Quarantines unknown elements and drops unknown properties.
#[derive(Debug, Default, Clone)]
pub struct PermissiveVisitor {
    finder: Option<Arc<dyn TypeMappingFinder>>,
}

impl PermissiveVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permissive visitor that also resolves names through `finder`.
    pub fn with_finder(finder: Arc<dyn TypeMappingFinder>) -> Self {
        Self {
            finder: Some(finder),
        }
    }
}

impl WspVisitor for PermissiveVisitor {
    fn invalid_element(&self, source: &Element, error: WspError) -> Result<Element> {
        warn!(
            element = %source.name.qualified(),
            error = %error,
            "quarantining unrecognized policy element"
        );
        Ok(quarantine_element(source, &error))
    }

    fn unknown_property(
        &self,
        target: &mut dyn PolicyObject,
        _source: &Element,
        property: &str,
        _value: &TypedValue,
        error: WspError,
    ) -> Result<()> {
        warn!(
            owner = target.type_ref().name(),
            property,
            error = %error,
            "dropping unrecognized property"
        );
        Ok(())
    }

    fn type_mapping_finder(&self) -> Option<Arc<dyn TypeMappingFinder>> {
        self.finder.clone()
    }
}

/// Builds the `<L7p:UnknownAssertion>` element that replaces `source`.
///
/// The original markup is captured as a standalone fragment. If it is
/// nested too deeply or cannot be serialized, a copy without children is
/// tried before giving up on the snapshot.
pub fn quarantine_element(source: &Element, error: &WspError) -> Element {
    let full = if source.exceeds_depth(xml::MAX_NESTING) {
        Err(WspError::TooDeeplyNested {
            limit: xml::MAX_NESTING,
        })
    } else {
        xml::to_fragment(source)
    };
    let snapshot = full
        .or_else(|err| {
            debug!(error = %err, "falling back to a shallow snapshot");
            xml::to_fragment(&source.shallow_copy())
        })
        .ok();

    let mut element = framing::element("UnknownAssertion");
    element.push_element(framing::text_element(
        "DetailMessage",
        "stringValue",
        Some(&error.to_string()),
    ));
    element.push_element(framing::text_element(
        "ElementName",
        "stringValue",
        Some(source.local_name()),
    ));
    if let Some(snapshot) = snapshot {
        element.push_element(framing::reference_element(
            "OriginalXml",
            "stringValue",
            &snapshot,
        ));
    }
    element
}

// =============================================================================
// INTERCEPTING
// =============================================================================

type ShimHandler =
    Arc<dyn Fn(&mut dyn PolicyObject, &TypedValue) -> std::result::Result<(), PropertyError> + Send + Sync>;

/// Translates one deprecated property of one owner type.
#[derive(Clone)]
pub struct PropertyShim {
    owner: TypeRef,
    property: String,
    handler: ShimHandler,
}

impl PropertyShim {
    pub fn new(
        owner: TypeRef,
        property: impl Into<String>,
        handler: impl Fn(&mut dyn PolicyObject, &TypedValue) -> std::result::Result<(), PropertyError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            owner,
            property: property.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn owner(&self) -> TypeRef {
        self.owner
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    fn matches(&self, owner: TypeRef, property: &str) -> bool {
        self.owner == owner && self.property == property
    }
}

impl fmt::Debug for PropertyShim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyShim")
            .field("owner", &self.owner.name())
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

/// Applies matching shims before falling back to the wrapped visitor.
///
/// A shim only fires while populating an object of its owner type; if it
/// fails, the wrapped visitor sees the original error.
#[derive(Debug, Clone)]
pub struct InterceptingVisitor<V> {
    inner: V,
    shims: Vec<PropertyShim>,
}

impl<V: WspVisitor> InterceptingVisitor<V> {
    pub fn new(inner: V, shims: Vec<PropertyShim>) -> Self {
        Self { inner, shims }
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }
}

impl<V: WspVisitor> WspVisitor for InterceptingVisitor<V> {
    fn invalid_element(&self, source: &Element, error: WspError) -> Result<Element> {
        self.inner.invalid_element(source, error)
    }

    fn unknown_property(
        &self,
        target: &mut dyn PolicyObject,
        source: &Element,
        property: &str,
        value: &TypedValue,
        error: WspError,
    ) -> Result<()> {
        let owner = target.type_ref();
        for shim in self.shims.iter().filter(|shim| shim.matches(owner, property)) {
            match (shim.handler)(&mut *target, value) {
                Ok(()) => {
                    debug!(owner = owner.name(), property, "translated legacy property");
                    return Ok(());
                }
                Err(err) => {
                    debug!(owner = owner.name(), property, error = %err, "legacy property shim declined");
                }
            }
        }
        self.inner
            .unknown_property(target, source, property, value, error)
    }

    fn type_mapping_finder(&self) -> Option<Arc<dyn TypeMappingFinder>> {
        self.inner.type_mapping_finder()
    }
}
