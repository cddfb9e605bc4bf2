//! Composite container mapping.
//!
//! ```xml
//! <wsp:All wsp:Usage="Required" L7p:Enabled="false">
//!     <L7p:HttpBasic/>
//! </wsp:All>
//! ```
//!
//! `L7p:Enabled` is only written for disabled containers. Children are
//! frozen anonymously, in order, each with the mapping of its runtime type.

use super::{TypeMapping, check_object_type, check_type};
use crate::context::{ReadContext, WriteContext};
use crate::dom::{Element, QName};
use crate::error::{Result, WspError};
use crate::model::{
    Assertion, CompositeAssertion, CompositeKind, PolicyObject, TypeRef, TypedValue, Value,
};
use crate::wire::{ENABLED, L7_NAMESPACE, L7_PREFIX, REQUIRED, USAGE};

#[derive(Debug, Clone)]
pub struct CompositeTypeMapping {
    kind: CompositeKind,
}

impl CompositeTypeMapping {
    /// Mapping for the container named `token`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless `token` is `All`, `OneOrMore`
    /// or `ExactlyOne`.
    pub fn new(token: &str) -> Result<Self> {
        CompositeKind::from_token(token)
            .map(|kind| Self { kind })
            .ok_or_else(|| WspError::configuration(format!("unknown composite kind {token}")))
    }

    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    fn container<'v>(&self, object: &'v dyn PolicyObject) -> Result<&'v dyn Assertion> {
        object
            .as_assertion()
            .filter(|assertion| assertion.children().is_some())
            .ok_or_else(|| WspError::TypeMismatch {
                expected: self.kind.type_ref().name().to_string(),
                found: object.type_ref().name().to_string(),
            })
    }

    /// Writes the container element; children are borrowed, not copied.
    fn freeze_container(
        &self,
        cx: &mut WriteContext<'_>,
        object: &dyn PolicyObject,
        into: &mut Element,
    ) -> Result<()> {
        let container = self.container(object)?;

        let mut element =
            Element::new(QName::wsp(self.kind.token())).with_attribute(QName::wsp(USAGE), REQUIRED);
        if !container.is_enabled() {
            element.set_attribute(
                QName::new(Some(L7_NAMESPACE), Some(L7_PREFIX), ENABLED),
                "false",
            );
        }
        for child in container.children().unwrap_or_default() {
            let child: &dyn PolicyObject = child.as_ref();
            cx.freeze_object(child, &mut element)?;
        }
        into.push_element(element);
        Ok(())
    }
}

fn is_disabled(source: &Element) -> bool {
    source
        .attribute(Some(L7_NAMESPACE), ENABLED)
        .or_else(|| source.attribute(None, ENABLED))
        .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("false"))
}

impl TypeMapping for CompositeTypeMapping {
    fn mapped_type(&self) -> TypeRef {
        self.kind.type_ref()
    }

    fn external_name(&self) -> &str {
        self.kind.token()
    }

    fn describe(&self) -> &'static str {
        "composite"
    }

    fn freeze(
        &self,
        cx: &mut WriteContext<'_>,
        value: &TypedValue,
        into: &mut Element,
    ) -> Result<()> {
        check_type(self, value)?;
        if value.name().is_some() {
            return Err(WspError::malformed(format!(
                "{} cannot be written as a named property",
                self.kind.token()
            )));
        }
        match value.value() {
            Some(Value::Object(object)) => self.freeze_container(cx, object.as_ref(), into),
            Some(other) => Err(WspError::TypeMismatch {
                expected: self.kind.type_ref().name().to_string(),
                found: other.describe(),
            }),
            None => Err(WspError::malformed(format!(
                "{} cannot be null",
                self.kind.token()
            ))),
        }
    }

    fn freeze_object(
        &self,
        cx: &mut WriteContext<'_>,
        object: &dyn PolicyObject,
        into: &mut Element,
    ) -> Result<()> {
        check_object_type(self, object)?;
        self.freeze_container(cx, object, into)
    }

    fn thaw(&self, cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        let mut composite = CompositeAssertion::new(self.kind);
        if is_disabled(source) {
            composite.set_enabled(false);
        }
        for child in source.child_elements() {
            let thawed = cx.thaw_element(child)?;
            let object = match thawed.into_value() {
                Some(Value::Object(object)) => object,
                Some(other) => {
                    return Err(WspError::NotAnAssertion {
                        type_name: other.describe(),
                    });
                }
                None => {
                    return Err(WspError::UnresolvedChild {
                        container: self.kind.token().to_string(),
                        element: child.local_name().to_string(),
                    });
                }
            };
            let type_name = object.type_ref().name().to_string();
            let assertion = object
                .into_assertion()
                .ok_or(WspError::NotAnAssertion { type_name })?;
            composite.push(assertion);
        }
        Ok(TypedValue::object(Box::new(composite)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_unknown_kind_is_a_configuration_error() {
        let err = CompositeTypeMapping::new("AnyOf").expect_err("not a container");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("AnyOf"));
    }

    #[test]
    fn test_known_kinds() {
        for kind in CompositeKind::ALL_KINDS {
            let mapping = CompositeTypeMapping::new(kind.token()).expect("kind");
            assert_eq!(mapping.kind(), kind);
            assert_eq!(mapping.external_name(), kind.token());
        }
    }
}
