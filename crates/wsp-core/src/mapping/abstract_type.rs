//! Polymorphic mapping for properties declared with an abstract type.
//!
//! The concrete value is written with the mapping of its runtime type,
//! wrapped in a named element:
//!
//! ```xml
//! <L7p:CustomAssertion customAssertionData="included">
//!     <L7p:RateLimitCustomAssertion>...</L7p:RateLimitCustomAssertion>
//! </L7p:CustomAssertion>
//! ```

use super::framing::{self, NamedValue};
use super::{TypeMapping, check_type};
use crate::context::{ReadContext, WriteContext};
use crate::dom::Element;
use crate::error::{Result, WspError};
use crate::model::types::UNKNOWN_ASSERTION;
use crate::model::{TypeRef, TypedValue, Value};
use crate::wire::INCLUDED;

#[derive(Debug, Clone)]
pub struct AbstractTypeMapping {
    ty: TypeRef,
    external_name: String,
}

impl AbstractTypeMapping {
    pub fn new(ty: TypeRef, external_name: &str) -> Self {
        Self {
            ty,
            external_name: external_name.to_string(),
        }
    }

    fn loop_error(&self, to: &dyn TypeMapping) -> WspError {
        WspError::DelegationLoop {
            from: self.external_name.clone(),
            to: to.external_name().to_string(),
        }
    }

    /// Freezes the concrete value anonymously with its runtime mapping.
    fn freeze_concrete(
        &self,
        cx: &mut WriteContext<'_>,
        value: &Value,
        into: &mut Element,
    ) -> Result<()> {
        let Value::Object(object) = value else {
            return Err(WspError::TypeMismatch {
                expected: self.ty.name().to_string(),
                found: value.describe(),
            });
        };
        let runtime = object.type_ref();
        // Quarantined payloads are re-emitted through the placeholder mapping.
        if !runtime.is_assignable_to(self.ty) && runtime != &UNKNOWN_ASSERTION {
            return Err(WspError::TypeMismatch {
                expected: self.ty.name().to_string(),
                found: runtime.name().to_string(),
            });
        }
        let delegate = cx
            .resolve(runtime, Some(object.as_ref()))
            .ok_or_else(|| WspError::NoMappingForType {
                type_name: runtime.name().to_string(),
            })?;
        if delegate.is_abstract() {
            return Err(self.loop_error(delegate.as_ref()));
        }
        cx.freeze_object_with(delegate.as_ref(), object.as_ref(), into)
    }
}

impl TypeMapping for AbstractTypeMapping {
    fn mapped_type(&self) -> TypeRef {
        self.ty
    }

    fn external_name(&self) -> &str {
        &self.external_name
    }

    fn is_abstract(&self) -> bool {
        true
    }

    fn describe(&self) -> &'static str {
        "abstract"
    }

    fn freeze(
        &self,
        cx: &mut WriteContext<'_>,
        value: &TypedValue,
        into: &mut Element,
    ) -> Result<()> {
        check_type(self, value)?;
        match (value.name(), value.value()) {
            (Some(name), None) => {
                into.push_element(framing::null_element(name, &self.external_name));
                Ok(())
            }
            (Some(name), Some(inner)) => {
                let mut wrapper = framing::included_element(name, &self.external_name);
                self.freeze_concrete(cx, inner, &mut wrapper)?;
                into.push_element(wrapper);
                Ok(())
            }
            (None, Some(inner)) => self.freeze_concrete(cx, inner, into),
            (None, None) => Err(WspError::malformed("anonymous null value")),
        }
    }

    fn thaw(&self, cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        let name = source.local_name();
        match framing::named_value(source, &self.external_name) {
            None => Err(WspError::malformed(format!(
                "{} can only be read as a named property",
                self.external_name
            ))),
            Some(NamedValue::Null) => Ok(TypedValue::named(self.ty, name, None)),
            Some(NamedValue::Text(text)) if text != INCLUDED => Err(WspError::InvalidFormat {
                type_name: self.ty.name().to_string(),
                text,
                message: format!("expected \"{INCLUDED}\""),
            }),
            Some(NamedValue::Text(_)) => {
                let mut children = source.child_elements();
                let (Some(child), None) = (children.next(), children.next()) else {
                    return Err(WspError::malformed(format!(
                        "{name} must hold exactly one concrete value"
                    )));
                };
                if let Some(delegate) = cx.resolve_element(child)
                    && delegate.is_abstract()
                {
                    return Err(self.loop_error(delegate.as_ref()));
                }
                let concrete = cx.thaw_element(child)?;
                Ok(TypedValue::named(self.ty, name, concrete.into_value()))
            }
        }
    }
}
