//! Bean mapping: a default-constructible object described by a property table.
//!
//! Anonymous form (assertions):
//!
//! ```xml
//! <L7p:HttpBasic>
//!     <L7p:Realm stringValue="secure"/>
//! </L7p:HttpBasic>
//! ```
//!
//! Named form (complex properties) uses the `included` sentinel:
//!
//! ```xml
//! <L7p:RecipientContext xmlSecurityRecipientContext="included">
//!     <L7p:Actor stringValue="actor"/>
//! </L7p:RecipientContext>
//! ```
//!
//! Properties equal to their value on a freshly constructed instance are
//! not written.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::trace;

use super::framing::{self, NamedValue};
use super::{TypeMapping, check_object_type, check_type};
use crate::context::{ReadContext, WriteContext};
use crate::dom::Element;
use crate::error::{Result, WspError};
use crate::model::{PolicyObject, Property, PropertyError, TypeRef, TypedValue, Value};
use crate::registry::TypeMappingFinder;
use crate::version::Version;
use crate::wire::INCLUDED;

/// Constructs a default instance of the mapped type.
pub type Factory = fn() -> Box<dyn PolicyObject>;

#[derive(Debug, Clone)]
pub struct BeanTypeMapping {
    ty: TypeRef,
    external_name: String,
    factory: Factory,
    properties: Vec<Property>,
    subtype_finder: Option<Arc<dyn TypeMappingFinder>>,
    since: Option<Version>,
}

impl BeanTypeMapping {
    pub fn new(ty: TypeRef, external_name: &str, factory: Factory) -> Self {
        Self {
            ty,
            external_name: external_name.to_string(),
            factory,
            properties: Vec::new(),
            subtype_finder: None,
            since: None,
        }
    }

    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self.properties.sort_by_key(Property::name);
        self
    }

    #[must_use]
    pub fn properties(mut self, properties: impl IntoIterator<Item = Property>) -> Self {
        self.properties.extend(properties);
        self.properties.sort_by_key(Property::name);
        self
    }

    /// Finder pushed on the context while this bean is frozen or thawed.
    #[must_use]
    pub fn subtype_finder(mut self, finder: Arc<dyn TypeMappingFinder>) -> Self {
        self.subtype_finder = Some(finder);
        self
    }

    #[must_use]
    pub fn since(mut self, version: Version) -> Self {
        self.since = Some(version);
        self
    }

    pub fn new_instance(&self) -> Box<dyn PolicyObject> {
        (self.factory)()
    }

    /// Writes the non-default properties of `object` under `element`.
    pub fn freeze_properties(
        &self,
        cx: &mut WriteContext<'_>,
        object: &dyn PolicyObject,
        element: &mut Element,
    ) -> Result<()> {
        let defaults = self.new_instance();
        cx.with_finder(self.subtype_finder.clone(), |cx| -> Result<()> {
            for property in self.properties.iter().filter(|p| p.is_readable()) {
                let current = property
                    .get(object)
                    .map_err(|err| self.getter_failed(object, err))?;
                let default = property
                    .get(defaults.as_ref())
                    .map_err(|err| self.getter_failed(object, err))?;
                if current == default {
                    continue;
                }
                trace!(bean = %self.external_name, property = property.name(), "freezing property");
                let value = TypedValue::named(property.ty(), property.name(), current);
                cx.freeze_value(&value, element)?;
            }
            Ok(())
        })
    }

    fn getter_failed(&self, object: &dyn PolicyObject, err: PropertyError) -> WspError {
        WspError::TypeMismatch {
            expected: self.ty.name().to_string(),
            found: format!("{} ({err})", object.type_ref().name()),
        }
    }

    /// Finds a setter for `name` accepting `ty`, widening up the type's
    /// ancestors.
    fn find_setter(&self, name: &str, ty: TypeRef) -> Option<&Property> {
        ty.ancestors().find_map(|candidate| {
            self.properties
                .iter()
                .find(|property| property.name() == name && property.ty() == candidate)
        })
    }

    /// Thaws every child of `source` and applies it to a fresh instance.
    pub fn thaw_properties(
        &self,
        cx: &mut ReadContext<'_>,
        source: &Element,
    ) -> Result<Box<dyn PolicyObject>> {
        let mut target = self.new_instance();
        cx.with_finder(self.subtype_finder.clone(), |cx| -> Result<()> {
            for child in source.child_elements() {
                let value = cx.thaw_element(child)?;
                let name = value.name().unwrap_or(child.local_name()).to_string();
                let outcome = match self.find_setter(&name, value.ty()) {
                    Some(property) => property
                        .set(target.as_mut(), value.value().cloned())
                        .map_err(Some),
                    None => Err(None),
                };
                if let Err(cause) = outcome {
                    let error = WspError::UnknownProperty {
                        owner: self.ty.name().to_string(),
                        property: name.clone(),
                        source: cause,
                    };
                    cx.unknown_property(target.as_mut(), child, &name, &value, error)?;
                }
            }
            Ok(())
        })?;
        Ok(target)
    }
}

impl TypeMapping for BeanTypeMapping {
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
        "bean"
    }

    fn validate(&self) -> Result<()> {
        let instance = self.new_instance();
        if instance.type_ref() != self.ty {
            return Err(WspError::configuration(format!(
                "factory for {} builds {}",
                self.external_name,
                instance.type_ref().name()
            )));
        }
        let signatures: HashSet<(&str, TypeRef)> = self
            .properties
            .iter()
            .map(|property| (property.name(), property.ty()))
            .collect();
        if signatures.len() != self.properties.len() {
            return Err(WspError::configuration(format!(
                "{} declares the same property twice",
                self.external_name
            )));
        }
        Ok(())
    }

    fn freeze(&self, cx: &mut WriteContext<'_>, value: &TypedValue, into: &mut Element) -> Result<()> {
        check_type(self, value)?;
        let object = match value.value() {
            Some(Value::Object(object)) => object.as_ref(),
            Some(other) => {
                return Err(WspError::TypeMismatch {
                    expected: self.ty.name().to_string(),
                    found: other.describe(),
                });
            }
            None => {
                let name = value.name().unwrap_or(&self.external_name);
                into.push_element(framing::null_element(name, &self.external_name));
                return Ok(());
            }
        };
        let mut element = match value.name() {
            Some(name) => framing::included_element(name, &self.external_name),
            None => framing::element(&self.external_name),
        };
        self.freeze_properties(cx, object, &mut element)?;
        into.push_element(element);
        Ok(())
    }

    fn freeze_object(
        &self,
        cx: &mut WriteContext<'_>,
        object: &dyn PolicyObject,
        into: &mut Element,
    ) -> Result<()> {
        check_object_type(self, object)?;
        let mut element = framing::element(&self.external_name);
        self.freeze_properties(cx, object, &mut element)?;
        into.push_element(element);
        Ok(())
    }

    fn thaw(&self, cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        match framing::named_value(source, &self.external_name) {
            None => {
                let object = self.thaw_properties(cx, source)?;
                Ok(TypedValue::anonymous(self.ty, Value::Object(object)))
            }
            Some(NamedValue::Null) => Ok(TypedValue::named(self.ty, source.local_name(), None)),
            Some(NamedValue::Text(text)) if text == INCLUDED => {
                let object = self.thaw_properties(cx, source)?;
                Ok(TypedValue::named(
                    self.ty,
                    source.local_name(),
                    Some(Value::Object(object)),
                ))
            }
            Some(NamedValue::Text(text)) => Err(WspError::InvalidFormat {
                type_name: self.ty.name().to_string(),
                text,
                message: format!("expected \"{INCLUDED}\""),
            }),
        }
    }
}
