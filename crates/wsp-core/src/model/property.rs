//! Explicit property tables.
//!
//! A bean mapping describes its value type through a list of [`Property`]
//! entries, each pairing a wire name and declared type with an accessor and
//! a mutator over the concrete struct. Entries without a getter are
//! write-only: they accept older encodings on thaw and are never emitted.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::enums::WireEnum;
use super::object::PolicyObject;
use super::types::{BOOLEAN, TypeRef};
use super::value::Value;

/// Failure to read or apply a property value.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum PropertyError {
    #[error("expected {expected} but got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("null is not allowed")]
    NullNotAllowed,

    #[error("{0}")]
    Invalid(String),

    #[error("property belongs to {expected}, not {found}")]
    WrongOwner {
        expected: &'static str,
        found: &'static str,
    },
}

type Getter =
    Arc<dyn Fn(&dyn PolicyObject) -> Result<Option<Value>, PropertyError> + Send + Sync>;
type Setter = Arc<
    dyn Fn(&mut dyn PolicyObject, Option<Value>) -> Result<(), PropertyError> + Send + Sync,
>;

/// One entry in a bean's property table.
#[derive(Clone)]
pub struct Property {
    name: &'static str,
    ty: TypeRef,
    getter: Option<Getter>,
    setter: Setter,
}

impl Property {
    /// Readable and writable property of `T`.
    pub fn new<T: PolicyObject>(
        name: &'static str,
        ty: TypeRef,
        get: fn(&T) -> Option<Value>,
        set: fn(&mut T, Option<Value>) -> Result<(), PropertyError>,
    ) -> Self {
        let getter: Getter = Arc::new(move |object: &dyn PolicyObject| {
            let found = object.type_ref().name();
            let target = object
                .as_any()
                .downcast_ref::<T>()
                .ok_or(PropertyError::WrongOwner {
                    expected: std::any::type_name::<T>(),
                    found,
                })?;
            Ok(get(target))
        });
        Self {
            getter: Some(getter),
            ..Self::write_only(name, ty, set)
        }
    }

    /// Setter-only property of `T`.
    pub fn write_only<T: PolicyObject>(
        name: &'static str,
        ty: TypeRef,
        set: fn(&mut T, Option<Value>) -> Result<(), PropertyError>,
    ) -> Self {
        let setter: Setter = Arc::new(move |object: &mut dyn PolicyObject, value| {
            let found = object.type_ref().name();
            let target = object
                .as_any_mut()
                .downcast_mut::<T>()
                .ok_or(PropertyError::WrongOwner {
                    expected: std::any::type_name::<T>(),
                    found,
                })?;
            set(target, value)
        });
        Self {
            name,
            ty,
            getter: None,
            setter,
        }
    }

    /// The `Enabled` flag shared by every assertion.
    pub fn enabled() -> Self {
        let getter: Getter = Arc::new(|object: &dyn PolicyObject| {
            object
                .as_assertion()
                .map(|assertion| Some(Value::Bool(assertion.is_enabled())))
                .ok_or(PropertyError::WrongOwner {
                    expected: "Assertion",
                    found: object.type_ref().name(),
                })
        });
        let setter: Setter = Arc::new(|object: &mut dyn PolicyObject, value| {
            let found = object.type_ref().name();
            let enabled = bool_value(value)?;
            let assertion = object.as_assertion_mut().ok_or(PropertyError::WrongOwner {
                expected: "Assertion",
                found,
            })?;
            assertion.set_enabled(enabled);
            Ok(())
        });
        Self {
            name: "Enabled",
            ty: &BOOLEAN,
            getter: Some(getter),
            setter,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    /// Reads the property; write-only properties read as `None`.
    pub fn get(&self, object: &dyn PolicyObject) -> Result<Option<Value>, PropertyError> {
        match &self.getter {
            Some(getter) => getter(object),
            None => Ok(None),
        }
    }

    pub fn set(
        &self,
        object: &mut dyn PolicyObject,
        value: Option<Value>,
    ) -> Result<(), PropertyError> {
        (self.setter)(object, value)
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("ty", &self.ty.name())
            .field("readable", &self.is_readable())
            .finish()
    }
}

// =============================================================================
// SETTER HELPERS
// =============================================================================

fn mismatch(expected: &'static str, found: &Value) -> PropertyError {
    PropertyError::TypeMismatch {
        expected,
        found: found.describe(),
    }
}

pub fn bool_value(value: Option<Value>) -> Result<bool, PropertyError> {
    match value {
        Some(Value::Bool(flag)) => Ok(flag),
        Some(other) => Err(mismatch("boolean", &other)),
        None => Err(PropertyError::NullNotAllowed),
    }
}

pub fn int_value(value: Option<Value>) -> Result<i32, PropertyError> {
    match value {
        Some(Value::Int(number)) => Ok(number),
        Some(other) => Err(mismatch("int", &other)),
        None => Err(PropertyError::NullNotAllowed),
    }
}

pub fn opt_string_value(value: Option<Value>) -> Result<Option<String>, PropertyError> {
    match value {
        Some(Value::Str(text)) => Ok(Some(text)),
        Some(other) => Err(mismatch("string", &other)),
        None => Ok(None),
    }
}

pub fn string_value(value: Option<Value>) -> Result<String, PropertyError> {
    opt_string_value(value)?.ok_or(PropertyError::NullNotAllowed)
}

/// Collection members, with null read as an empty collection.
pub fn list_value(value: Option<Value>) -> Result<Vec<Value>, PropertyError> {
    match value {
        Some(Value::List(items)) => Ok(items),
        Some(other) => Err(mismatch("list", &other)),
        None => Ok(Vec::new()),
    }
}

pub fn string_list_value(value: Option<Value>) -> Result<Vec<String>, PropertyError> {
    list_value(value)?
        .into_iter()
        .map(|item| string_value(Some(item)))
        .collect()
}

/// Downcasts an object value to a concrete bean type.
pub fn object_value<T: PolicyObject>(value: Option<Value>) -> Result<Option<T>, PropertyError> {
    match value {
        Some(Value::Object(object)) => {
            let found = object.type_ref().name().to_string();
            object
                .into_any()
                .downcast::<T>()
                .map(|concrete| Some(*concrete))
                .map_err(|_| PropertyError::TypeMismatch {
                    expected: std::any::type_name::<T>(),
                    found,
                })
        }
        Some(other) => Err(mismatch(std::any::type_name::<T>(), &other)),
        None => Ok(None),
    }
}

/// Object value of any runtime type, for polymorphic properties.
pub fn dyn_object_value(
    value: Option<Value>,
) -> Result<Option<Box<dyn PolicyObject>>, PropertyError> {
    match value {
        Some(Value::Object(object)) => Ok(Some(object)),
        Some(other) => Err(mismatch("object", &other)),
        None => Ok(None),
    }
}

pub fn enum_value<E: WireEnum>(value: Option<Value>) -> Result<Option<E>, PropertyError> {
    match value {
        Some(Value::Enum(name)) => E::from_wire(name)
            .map(Some)
            .ok_or_else(|| PropertyError::Invalid(format!("unknown constant {name}"))),
        Some(other) => Err(mismatch("enum", &other)),
        None => Ok(None),
    }
}

pub fn enum_set_value<E: WireEnum>(value: Option<Value>) -> Result<BTreeSet<E>, PropertyError> {
    match value {
        Some(Value::EnumSet(names)) => Ok(names.into_iter().filter_map(E::from_wire).collect()),
        Some(other) => Err(mismatch("enum set", &other)),
        None => Ok(BTreeSet::new()),
    }
}

/// Getter side of [`enum_set_value`].
pub fn enum_set_to_value<E: WireEnum>(set: &BTreeSet<E>) -> Value {
    Value::EnumSet(set.iter().map(|constant| constant.wire_name()).collect())
}
