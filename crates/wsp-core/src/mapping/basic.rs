//! Scalar mappings: primitives, boxed primitives, strings and
//! string-constructible types.

use tracing::trace;

use super::framing::{self, NamedValue};
use super::{TypeMapping, check_type};
use crate::context::{ReadContext, WriteContext};
use crate::dom::Element;
use crate::error::{Result, WspError};
use crate::model::types::{
    BOOLEAN, BOXED_BOOLEAN, BOXED_INT, BOXED_LONG, DOUBLE, INT, LONG, STRING,
};
use crate::model::{TypeRef, TypedValue, Value};
use crate::version::Version;

/// Parses wire text into a value.
pub type ParseFn = fn(&str) -> std::result::Result<Value, String>;
/// Formats a value as wire text; `None` if the value has the wrong shape.
pub type FormatFn = fn(&Value) -> Option<String>;

#[derive(Debug, Clone, Copy)]
enum Codec {
    Bool,
    Int,
    Long,
    Double,
    Str,
    Custom { parse: ParseFn, format: FormatFn },
}

/// Named-form mapping for a value written as attribute text.
#[derive(Debug, Clone)]
pub struct BasicTypeMapping {
    ty: TypeRef,
    external_name: String,
    nullable: bool,
    codec: Codec,
    since: Option<Version>,
}

impl BasicTypeMapping {
    fn scalar(ty: TypeRef, external_name: &str, nullable: bool, codec: Codec) -> Self {
        Self {
            ty,
            external_name: external_name.to_string(),
            nullable,
            codec,
            since: None,
        }
    }

    pub fn boolean() -> Self {
        Self::scalar(&BOOLEAN, "booleanValue", false, Codec::Bool)
    }

    pub fn boxed_boolean() -> Self {
        Self::scalar(&BOXED_BOOLEAN, "boxedBooleanValue", true, Codec::Bool)
    }

    pub fn int() -> Self {
        Self::scalar(&INT, "intValue", false, Codec::Int)
    }

    pub fn boxed_int() -> Self {
        Self::scalar(&BOXED_INT, "boxedIntegerValue", true, Codec::Int)
    }

    pub fn long() -> Self {
        Self::scalar(&LONG, "longValue", false, Codec::Long)
    }

    pub fn boxed_long() -> Self {
        Self::scalar(&BOXED_LONG, "boxedLongValue", true, Codec::Long)
    }

    pub fn double() -> Self {
        Self::scalar(&DOUBLE, "doubleValue", false, Codec::Double)
    }

    pub fn string() -> Self {
        Self::scalar(&STRING, "stringValue", true, Codec::Str)
    }

    /// Nullable type converted through a parse/format pair.
    pub fn string_constructor(
        ty: TypeRef,
        external_name: &str,
        parse: ParseFn,
        format: FormatFn,
    ) -> Self {
        Self::scalar(ty, external_name, true, Codec::Custom { parse, format })
    }

    #[must_use]
    pub fn since(mut self, version: Version) -> Self {
        self.since = Some(version);
        self
    }

    fn format(&self, value: &Value) -> Option<String> {
        match (self.codec, value) {
            (Codec::Bool, Value::Bool(flag)) => Some(flag.to_string()),
            (Codec::Int, Value::Int(number)) => Some(number.to_string()),
            (Codec::Long, Value::Long(number)) => Some(number.to_string()),
            (Codec::Double, Value::Double(number)) => Some(number.to_string()),
            (Codec::Str, Value::Str(text)) => Some(text.clone()),
            (Codec::Custom { format, .. }, value) => format(value),
            _ => None,
        }
    }

    fn parse(&self, text: &str) -> std::result::Result<Value, String> {
        match self.codec {
            Codec::Bool => {
                let trimmed = text.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err("expected true or false".to_string())
                }
            }
            Codec::Int => text
                .trim()
                .parse()
                .map(Value::Int)
                .map_err(|err| err.to_string()),
            Codec::Long => text
                .trim()
                .parse()
                .map(Value::Long)
                .map_err(|err| err.to_string()),
            Codec::Double => text
                .trim()
                .parse()
                .map(Value::Double)
                .map_err(|err| err.to_string()),
            Codec::Str => Ok(Value::Str(text.to_string())),
            Codec::Custom { parse, .. } => parse(text),
        }
    }
}

impl TypeMapping for BasicTypeMapping {
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
        match self.codec {
            Codec::Custom { .. } => "string-constructible",
            _ => "scalar",
        }
    }

    fn freeze(
        &self,
        _cx: &mut WriteContext<'_>,
        value: &TypedValue,
        into: &mut Element,
    ) -> Result<()> {
        check_type(self, value)?;
        let Some(name) = value.name() else {
            return Err(WspError::malformed(format!(
                "{} values can only be written as named properties",
                self.external_name
            )));
        };
        let text = match value.value() {
            None if self.nullable => None,
            None => {
                return Err(WspError::UnexpectedNull {
                    type_name: self.ty.name().to_string(),
                    name: name.to_string(),
                });
            }
            Some(inner) => Some(self.format(inner).ok_or_else(|| WspError::TypeMismatch {
                expected: self.ty.name().to_string(),
                found: inner.describe(),
            })?),
        };
        trace!(property = name, key = %self.external_name, "freezing scalar");
        into.push_element(framing::text_element(
            name,
            &self.external_name,
            text.as_deref(),
        ));
        Ok(())
    }

    fn thaw(&self, _cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        let name = source.local_name();
        match framing::named_value(source, &self.external_name) {
            None => Err(WspError::MissingValue {
                element: name.to_string(),
                external_name: self.external_name.clone(),
            }),
            Some(NamedValue::Null) if self.nullable => Ok(TypedValue::named(self.ty, name, None)),
            Some(NamedValue::Null) => Err(WspError::UnexpectedNull {
                type_name: self.ty.name().to_string(),
                name: name.to_string(),
            }),
            Some(NamedValue::Text(text)) => {
                let value = self
                    .parse(&text)
                    .map_err(|message| WspError::InvalidFormat {
                        type_name: self.ty.name().to_string(),
                        text: text.clone(),
                        message,
                    })?;
                Ok(TypedValue::named(self.ty, name, Some(value)))
            }
        }
    }
}
