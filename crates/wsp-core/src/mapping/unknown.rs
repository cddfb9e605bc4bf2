//! Mapping for quarantine placeholders.

use super::bean::BeanTypeMapping;
use super::{TypeMapping, check_type};
use crate::context::{ReadContext, WriteContext};
use crate::dom::{Element, Node};
use crate::error::Result;
use crate::model::property::opt_string_value;
use crate::model::types::{STRING, UNKNOWN_ASSERTION};
use crate::model::{Property, TypeRef, TypedValue, UnknownAssertion, Value};

/// Re-emits the captured markup of an [`UnknownAssertion`] verbatim, or
/// falls back to the bean form when nothing was captured.
#[derive(Debug, Clone)]
pub struct UnknownAssertionMapping {
    bean: BeanTypeMapping,
}

impl UnknownAssertionMapping {
    pub fn new() -> Self {
        let bean = BeanTypeMapping::new(&UNKNOWN_ASSERTION, "UnknownAssertion", || {
            Box::new(UnknownAssertion::default())
        })
        .properties([
            Property::enabled(),
            Property::new::<UnknownAssertion>(
                "ElementName",
                &STRING,
                |a| a.element_name.clone().map(Value::Str),
                |a, v| {
                    a.element_name = opt_string_value(v)?;
                    Ok(())
                },
            ),
            Property::new::<UnknownAssertion>(
                "OriginalXml",
                &STRING,
                |a| a.original_xml.clone().map(Value::Str),
                |a, v| {
                    a.original_xml = opt_string_value(v)?;
                    Ok(())
                },
            ),
            Property::new::<UnknownAssertion>(
                "DetailMessage",
                &STRING,
                |a| a.detail_message.clone().map(Value::Str),
                |a, v| {
                    a.detail_message = opt_string_value(v)?;
                    Ok(())
                },
            ),
        ]);
        Self { bean }
    }
}

impl Default for UnknownAssertionMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeMapping for UnknownAssertionMapping {
    fn mapped_type(&self) -> TypeRef {
        &UNKNOWN_ASSERTION
    }

    fn external_name(&self) -> &str {
        self.bean.external_name()
    }

    fn describe(&self) -> &'static str {
        "placeholder"
    }

    fn validate(&self) -> Result<()> {
        self.bean.validate()
    }

    fn freeze(
        &self,
        cx: &mut WriteContext<'_>,
        value: &TypedValue,
        into: &mut Element,
    ) -> Result<()> {
        check_type(self, value)?;
        let captured = value
            .value()
            .and_then(Value::as_object)
            .and_then(|object| object.as_any().downcast_ref::<UnknownAssertion>())
            .and_then(|unknown| unknown.original_xml.clone());
        match captured {
            Some(markup) if value.name().is_none() => {
                into.push(Node::Raw(markup));
                Ok(())
            }
            _ => self.bean.freeze(cx, value, into),
        }
    }

    fn thaw(&self, cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        self.bean.thaw(cx, source)
    }
}
