//! Type mappings: per-type freeze and thaw behaviour.
//!
//! A [`TypeMapping`] converts values of one runtime type to and from XML.
//! Two wire shapes exist for every mapping:
//!
//! - **named** form, used for properties: an element named by the property
//!   carrying a single attribute keyed by the mapping's external name, e.g.
//!   `<L7p:Realm stringValue="x"/>`;
//! - **anonymous** form, used for assertions: an element named by the
//!   external name itself, e.g. `<L7p:HttpBasic/>`.
//!
//! The mapping structs here are orthogonal; shared wire helpers live in
//! [`framing`].

use std::fmt::Debug;
use std::sync::Arc;

use crate::context::{ReadContext, WriteContext};
use crate::dom::Element;
use crate::error::{Result, WspError};
use crate::model::{PolicyObject, TypeRef, TypedValue};
use crate::version::Version;

pub mod abstract_type;
pub mod array;
pub mod basic;
pub mod bean;
pub mod composite;
pub mod enums;
pub mod framing;
pub mod legacy;
pub mod unknown;

pub use abstract_type::AbstractTypeMapping;
pub use array::ArrayTypeMapping;
pub use basic::BasicTypeMapping;
pub use bean::BeanTypeMapping;
pub use composite::CompositeTypeMapping;
pub use enums::{EnumSetTypeMapping, EnumTypeMapping};
pub use legacy::RenamedTypeMapping;
pub use unknown::UnknownAssertionMapping;

/// Freeze/thaw behaviour for one runtime type.
pub trait TypeMapping: Send + Sync + Debug {
    /// Runtime type handled by this mapping.
    fn mapped_type(&self) -> TypeRef;

    /// Wire name: the anonymous element name, or the named-form attribute key.
    fn external_name(&self) -> &str;

    /// Product version that introduced this mapping, if any.
    fn since_version(&self) -> Option<&Version> {
        None
    }

    /// Returns true for polymorphic mappings that redelegate to a runtime type.
    fn is_abstract(&self) -> bool {
        false
    }

    /// Short label of the mapping family, for listings.
    fn describe(&self) -> &'static str;

    /// Checks descriptor consistency when a registry is built.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Appends the XML form of `value` as a child of `into`.
    fn freeze(&self, cx: &mut WriteContext<'_>, value: &TypedValue, into: &mut Element)
    -> Result<()>;

    /// Appends the anonymous form of a borrowed object.
    ///
    /// Containers override this to avoid copying their subtree; the default
    /// freezes a copy.
    fn freeze_object(
        &self,
        cx: &mut WriteContext<'_>,
        object: &dyn PolicyObject,
        into: &mut Element,
    ) -> Result<()> {
        self.freeze(cx, &TypedValue::object(object.clone_object()), into)
    }

    /// Reconstructs a value from `source`.
    fn thaw(&self, cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue>;
}

/// Rejects values whose declared type differs from the mapping's type.
pub(crate) fn check_type(mapping: &dyn TypeMapping, value: &TypedValue) -> Result<()> {
    if value.ty() == mapping.mapped_type() {
        Ok(())
    } else {
        Err(WspError::TypeMismatch {
            expected: mapping.mapped_type().name().to_string(),
            found: value.ty().name().to_string(),
        })
    }
}

/// Rejects borrowed objects whose runtime type differs from the mapping's type.
pub(crate) fn check_object_type(
    mapping: &dyn TypeMapping,
    object: &dyn PolicyObject,
) -> Result<()> {
    if object.type_ref() == mapping.mapped_type() {
        Ok(())
    } else {
        Err(WspError::TypeMismatch {
            expected: mapping.mapped_type().name().to_string(),
            found: object.type_ref().name().to_string(),
        })
    }
}

/// Mappings every registry carries: scalars, string arrays, the three
/// composite containers and the quarantine placeholder.
pub fn core_mappings() -> Result<Vec<Arc<dyn TypeMapping>>> {
    use crate::model::types::{STRING, STRING_ARRAY};

    let mut mappings: Vec<Arc<dyn TypeMapping>> = vec![
        Arc::new(BasicTypeMapping::boolean()),
        Arc::new(BasicTypeMapping::boxed_boolean()),
        Arc::new(BasicTypeMapping::int()),
        Arc::new(BasicTypeMapping::boxed_int()),
        Arc::new(BasicTypeMapping::long()),
        Arc::new(BasicTypeMapping::boxed_long()),
        Arc::new(BasicTypeMapping::double()),
        Arc::new(BasicTypeMapping::string()),
        Arc::new(ArrayTypeMapping::new(&STRING_ARRAY, &STRING, "stringArrayValue")),
        Arc::new(UnknownAssertionMapping::new()),
    ];
    for token in ["All", "OneOrMore", "ExactlyOne"] {
        mappings.push(Arc::new(CompositeTypeMapping::new(token)?));
    }
    Ok(mappings)
}
