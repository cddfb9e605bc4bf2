//! Values and the typed value carrier exchanged by every mapping.

use std::collections::BTreeSet;

use super::object::PolicyObject;
use super::types::{
    BOOLEAN, BOXED_BOOLEAN, BOXED_INT, BOXED_LONG, DOUBLE, INT, LONG, STRING, TypeRef,
};

fn scalars() -> [TypeRef; 7] {
    [
        &BOOLEAN,
        &BOXED_BOOLEAN,
        &INT,
        &BOXED_INT,
        &LONG,
        &BOXED_LONG,
        &DOUBLE,
    ]
}

/// A runtime value held by a policy object property.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    /// Plain strings and string-constructible values.
    Str(String),
    /// Enumeration constant, by wire name.
    Enum(&'static str),
    /// Set of enumeration constants, by wire name.
    EnumSet(BTreeSet<&'static str>),
    /// Homogeneous collection members.
    List(Vec<Value>),
    /// Complex value: an assertion, bean or polymorphic object.
    Object(Box<dyn PolicyObject>),
}

impl Value {
    /// Short label used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Value::Bool(_) => "boolean".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Long(_) => "long".to_string(),
            Value::Double(_) => "double".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::Enum(_) => "enum".to_string(),
            Value::EnumSet(_) => "enum set".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Object(object) => object.type_ref().name().to_string(),
        }
    }

    /// Returns true if this value has a shape that may be stored where `ty`
    /// is expected.
    pub fn conforms_to(&self, ty: TypeRef) -> bool {
        let numeric = |candidates: &[TypeRef]| candidates.contains(&ty);
        match self {
            Value::Bool(_) => numeric(&[&BOOLEAN, &BOXED_BOOLEAN]),
            Value::Int(_) => numeric(&[&INT, &BOXED_INT]),
            Value::Long(_) => numeric(&[&LONG, &BOXED_LONG]),
            Value::Double(_) => ty == &DOUBLE,
            Value::Str(_) => !numeric(&scalars()),
            Value::Object(object) => object.type_ref().is_assignable_to(ty),
            Value::Enum(_) | Value::EnumSet(_) | Value::List(_) => {
                ty != &STRING && !numeric(&scalars())
            }
        }
    }

    pub fn as_object(&self) -> Option<&dyn PolicyObject> {
        match self {
            Value::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }
}

/// A value tagged with its declared type and, for the named form, the
/// property name it belongs to.
///
/// A typed value always has a type. A null value is only representable in
/// the named form, so `value == None` implies `name.is_some()`; the
/// constructors enforce this.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    ty: TypeRef,
    value: Option<Value>,
    name: Option<String>,
}

impl TypedValue {
    /// Anonymous (unnamed) value. Never null.
    pub fn anonymous(ty: TypeRef, value: Value) -> Self {
        Self {
            ty,
            value: Some(value),
            name: None,
        }
    }

    /// Named value, possibly null.
    pub fn named(ty: TypeRef, name: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            ty,
            value,
            name: Some(name.into()),
        }
    }

    /// Anonymous value for an object, typed by its runtime type.
    pub fn object(object: Box<dyn PolicyObject>) -> Self {
        Self::anonymous(object.type_ref(), Value::Object(object))
    }

    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}
