//! Homogeneous collection mapping.
//!
//! ```xml
//! <L7p:Addresses stringArrayValue="included">
//!     <L7p:item stringValue="a@example.com"/>
//!     <L7p:item stringValue="b@example.com"/>
//! </L7p:Addresses>
//! ```

use tracing::debug;

use super::framing::{self, NamedValue};
use super::{TypeMapping, check_type};
use crate::context::{ReadContext, WriteContext};
use crate::dom::Element;
use crate::error::{Result, WspError};
use crate::model::types::{BOOLEAN, BOXED_BOOLEAN, BOXED_INT, BOXED_LONG, INT, LONG};
use crate::model::{TypeRef, TypedValue, Value};
use crate::version::Version;
use crate::wire::{INCLUDED, ITEM};

#[derive(Debug, Clone)]
pub struct ArrayTypeMapping {
    ty: TypeRef,
    element_ty: TypeRef,
    external_name: String,
    since: Option<Version>,
}

impl ArrayTypeMapping {
    pub fn new(ty: TypeRef, element_ty: TypeRef, external_name: &str) -> Self {
        Self {
            ty,
            element_ty,
            external_name: external_name.to_string(),
            since: None,
        }
    }

    #[must_use]
    pub fn since(mut self, version: Version) -> Self {
        self.since = Some(version);
        self
    }

    /// Returns true if a member thawed as `ty` belongs in this collection.
    ///
    /// A primitive member is accepted where its boxed type is expected and
    /// the other way round.
    fn accepts_member(&self, ty: TypeRef) -> bool {
        ty.is_assignable_to(self.element_ty)
            || [(&BOOLEAN, &BOXED_BOOLEAN), (&INT, &BOXED_INT), (&LONG, &BOXED_LONG)]
                .iter()
                .any(|&(primitive, boxed)| {
                    (ty == primitive && self.element_ty == boxed)
                        || (ty == boxed && self.element_ty == primitive)
                })
    }

    fn incompatible(&self, found: String) -> WspError {
        WspError::IncompatibleMember {
            collection: self.external_name.clone(),
            expected: self.element_ty.name().to_string(),
            found,
        }
    }
}

impl TypeMapping for ArrayTypeMapping {
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
        "collection"
    }

    fn freeze(
        &self,
        cx: &mut WriteContext<'_>,
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
        let items = match value.value() {
            None => {
                into.push_element(framing::null_element(name, &self.external_name));
                return Ok(());
            }
            Some(Value::List(items)) => items,
            Some(other) => {
                return Err(WspError::TypeMismatch {
                    expected: self.ty.name().to_string(),
                    found: other.describe(),
                });
            }
        };

        let mut element = framing::included_element(name, &self.external_name);
        for item in items {
            if !item.conforms_to(self.element_ty) {
                return Err(self.incompatible(item.describe()));
            }
            let member = TypedValue::named(self.element_ty, ITEM, Some(item.clone()));
            cx.freeze_value(&member, &mut element)?;
        }
        into.push_element(element);
        Ok(())
    }

    fn thaw(&self, cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        let name = source.local_name();
        match framing::named_value(source, &self.external_name) {
            None => Err(WspError::MissingValue {
                element: name.to_string(),
                external_name: self.external_name.clone(),
            }),
            Some(NamedValue::Null) => Ok(TypedValue::named(self.ty, name, None)),
            Some(NamedValue::Text(text)) if text != INCLUDED => Err(WspError::InvalidFormat {
                type_name: self.ty.name().to_string(),
                text,
                message: format!("expected \"{INCLUDED}\""),
            }),
            Some(NamedValue::Text(_)) => {
                let mut items = Vec::new();
                for child in source.child_elements() {
                    if child.local_name() != ITEM {
                        debug!(collection = name, element = child.local_name(), "unexpected collection member name");
                    }
                    let member = cx.thaw_element(child)?;
                    if !self.accepts_member(member.ty()) {
                        return Err(self.incompatible(member.ty().name().to_string()));
                    }
                    match member.into_value() {
                        None => {
                            return Err(WspError::malformed(format!(
                                "collection {name} contains a null member"
                            )));
                        }
                        Some(item) => items.push(item),
                    }
                }
                Ok(TypedValue::named(self.ty, name, Some(Value::List(items))))
            }
        }
    }
}
