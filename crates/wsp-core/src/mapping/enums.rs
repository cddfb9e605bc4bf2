//! Enumeration and enumeration-set mappings.

use std::collections::BTreeSet;

use tracing::warn;

use super::framing::{self, NamedValue};
use super::{TypeMapping, check_type};
use crate::context::{ReadContext, WriteContext};
use crate::dom::Element;
use crate::error::{Result, WspError};
use crate::model::{TypeRef, TypedValue, Value, WireEnum};
use crate::version::Version;

fn require_name<'v>(value: &'v TypedValue, external_name: &str) -> Result<&'v str> {
    value.name().ok_or_else(|| {
        WspError::malformed(format!(
            "{external_name} values can only be written as named properties"
        ))
    })
}

/// Named-form mapping for one enumeration constant, written by name.
#[derive(Debug, Clone)]
pub struct EnumTypeMapping {
    ty: TypeRef,
    external_name: String,
    constants: Vec<&'static str>,
    since: Option<Version>,
}

impl EnumTypeMapping {
    pub fn new<E: WireEnum>(ty: TypeRef, external_name: &str) -> Self {
        Self {
            ty,
            external_name: external_name.to_string(),
            constants: E::wire_names(),
            since: None,
        }
    }

    #[must_use]
    pub fn since(mut self, version: Version) -> Self {
        self.since = Some(version);
        self
    }

    fn constant(&self, name: &str) -> Option<&'static str> {
        self.constants.iter().copied().find(|constant| *constant == name)
    }
}

impl TypeMapping for EnumTypeMapping {
    fn mapped_type(&self) -> TypeRef {
        self.ty
    }

    fn external_name(&self) -> &str {
        &self.external_name
    }

    fn since_version(&self) -> Option<&Version> {
        self.since.as_ref()
    }

    fn describe(&self) -> &'static str {
        "enum"
    }

    fn freeze(
        &self,
        _cx: &mut WriteContext<'_>,
        value: &TypedValue,
        into: &mut Element,
    ) -> Result<()> {
        check_type(self, value)?;
        let name = require_name(value, &self.external_name)?;
        let text = match value.value() {
            None => None,
            Some(Value::Enum(constant)) if self.constant(constant).is_some() => Some(*constant),
            Some(other) => {
                return Err(WspError::TypeMismatch {
                    expected: self.ty.name().to_string(),
                    found: other.describe(),
                });
            }
        };
        into.push_element(framing::text_element(name, &self.external_name, text));
        Ok(())
    }

    fn thaw(&self, _cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        let name = source.local_name();
        let value = match framing::named_value(source, &self.external_name) {
            None => {
                return Err(WspError::MissingValue {
                    element: name.to_string(),
                    external_name: self.external_name.clone(),
                });
            }
            Some(NamedValue::Null) => None,
            Some(NamedValue::Text(text)) => match self.constant(text.trim()) {
                Some(constant) => Some(Value::Enum(constant)),
                None => {
                    warn!(
                        property = name,
                        constant = %text,
                        enumeration = self.ty.name(),
                        "ignoring unknown enumeration constant"
                    );
                    None
                }
            },
        };
        Ok(TypedValue::named(self.ty, name, value))
    }
}

/// Named-form mapping for a set of enumeration constants, written as a
/// comma list in declaration order.
#[derive(Debug, Clone)]
pub struct EnumSetTypeMapping {
    ty: TypeRef,
    external_name: String,
    constants: Vec<&'static str>,
    since: Option<Version>,
}

impl EnumSetTypeMapping {
    pub fn new<E: WireEnum>(ty: TypeRef, external_name: &str) -> Self {
        Self {
            ty,
            external_name: external_name.to_string(),
            constants: E::wire_names(),
            since: None,
        }
    }

    #[must_use]
    pub fn since(mut self, version: Version) -> Self {
        self.since = Some(version);
        self
    }
}

impl TypeMapping for EnumSetTypeMapping {
    fn mapped_type(&self) -> TypeRef {
        self.ty
    }

    fn external_name(&self) -> &str {
        &self.external_name
    }

    fn since_version(&self) -> Option<&Version> {
        self.since.as_ref()
    }

    fn describe(&self) -> &'static str {
        "enum set"
    }

    fn freeze(
        &self,
        _cx: &mut WriteContext<'_>,
        value: &TypedValue,
        into: &mut Element,
    ) -> Result<()> {
        check_type(self, value)?;
        let name = require_name(value, &self.external_name)?;
        let text = match value.value() {
            None => None,
            Some(Value::EnumSet(members)) => Some(
                self.constants
                    .iter()
                    .filter(|constant| members.contains(*constant))
                    .copied()
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            Some(other) => {
                return Err(WspError::TypeMismatch {
                    expected: self.ty.name().to_string(),
                    found: other.describe(),
                });
            }
        };
        into.push_element(framing::text_element(
            name,
            &self.external_name,
            text.as_deref(),
        ));
        Ok(())
    }

    fn thaw(&self, _cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        let name = source.local_name();
        let text = match framing::named_value(source, &self.external_name) {
            None => {
                return Err(WspError::MissingValue {
                    element: name.to_string(),
                    external_name: self.external_name.clone(),
                });
            }
            Some(NamedValue::Null) => return Ok(TypedValue::named(self.ty, name, None)),
            Some(NamedValue::Text(text)) => text,
        };
        let mut members = BTreeSet::new();
        for token in text.split(',').map(str::trim).filter(|token| !token.is_empty()) {
            match self.constants.iter().find(|constant| **constant == token) {
                Some(constant) => {
                    members.insert(*constant);
                }
                None => warn!(
                    property = name,
                    constant = token,
                    enumeration = self.ty.name(),
                    "ignoring unknown enumeration constant"
                ),
            }
        }
        Ok(TypedValue::named(
            self.ty,
            name,
            Some(Value::EnumSet(members)),
        ))
    }
}
