//! Object traits implemented by every policy value type.
//!
//! [`PolicyObject`] is the minimal surface the codec needs from a complex
//! value: its runtime type, downcasting, cloning and equality (provided by
//! the blanket [`DynObject`] impl), and two optional capability hooks that
//! let a value contribute type mappings for its own subtypes.
//! [`Assertion`] adds the `enabled` flag and, for containers, children.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use super::types::TypeRef;
use crate::mapping::TypeMapping;
use crate::registry::TypeMappingFinder;

/// Object-safe plumbing implemented automatically for every
/// `PolicyObject + Clone + PartialEq`.
pub trait DynObject: Any + Debug + Send + Sync {
    fn clone_object(&self) -> Box<dyn PolicyObject>;
    fn eq_object(&self, other: &dyn PolicyObject) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> DynObject for T
where
    T: PolicyObject + Clone + PartialEq,
{
    fn clone_object(&self) -> Box<dyn PolicyObject> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn PolicyObject) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A complex value that can be frozen to and thawed from XML.
pub trait PolicyObject: DynObject {
    /// Runtime type used to resolve this value's type mapping.
    fn type_ref(&self) -> TypeRef;

    fn as_assertion(&self) -> Option<&dyn Assertion> {
        None
    }

    fn as_assertion_mut(&mut self) -> Option<&mut dyn Assertion> {
        None
    }

    /// Converts into an assertion, or `None` if this value is not one.
    fn into_assertion(self: Box<Self>) -> Option<Box<dyn Assertion>> {
        None
    }

    /// Finder for mappings of this value's subtypes.
    fn subtype_finder(&self) -> Option<Arc<dyn TypeMappingFinder>> {
        None
    }

    /// Mapping directly associated with this value's runtime type.
    fn type_mapping(&self) -> Option<Arc<dyn TypeMapping>> {
        None
    }
}

/// Cloning for assertion trait objects.
pub trait DynAssertion {
    fn clone_assertion(&self) -> Box<dyn Assertion>;
}

impl<T> DynAssertion for T
where
    T: Assertion + Clone,
{
    fn clone_assertion(&self) -> Box<dyn Assertion> {
        Box::new(self.clone())
    }
}

/// A node in a policy tree.
pub trait Assertion: PolicyObject + DynAssertion {
    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Ordered children, for composite containers.
    fn children(&self) -> Option<&[Box<dyn Assertion>]> {
        None
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Box<dyn Assertion>>> {
        None
    }
}

impl Clone for Box<dyn PolicyObject> {
    fn clone(&self) -> Self {
        self.clone_object()
    }
}

impl PartialEq for dyn PolicyObject {
    fn eq(&self, other: &Self) -> bool {
        self.eq_object(other)
    }
}

impl Clone for Box<dyn Assertion> {
    fn clone(&self) -> Self {
        self.clone_assertion()
    }
}

impl PartialEq for dyn Assertion {
    fn eq(&self, other: &Self) -> bool {
        let other: &dyn PolicyObject = other;
        self.eq_object(other)
    }
}

/// Implements [`PolicyObject`] for a bean with no capability hooks.
#[macro_export]
macro_rules! impl_policy_object {
    ($ty:ty, $type_ref:expr) => {
        impl $crate::model::PolicyObject for $ty {
            fn type_ref(&self) -> $crate::model::TypeRef {
                $type_ref
            }
        }
    };
}

/// Implements [`PolicyObject`] and [`Assertion`] for a leaf assertion struct
/// with an `enabled: bool` field.
#[macro_export]
macro_rules! impl_assertion {
    ($ty:ty, $type_ref:expr) => {
        impl $crate::model::PolicyObject for $ty {
            fn type_ref(&self) -> $crate::model::TypeRef {
                $type_ref
            }

            fn as_assertion(&self) -> Option<&dyn $crate::model::Assertion> {
                Some(self)
            }

            fn as_assertion_mut(&mut self) -> Option<&mut dyn $crate::model::Assertion> {
                Some(self)
            }

            fn into_assertion(
                self: Box<Self>,
            ) -> Option<Box<dyn $crate::model::Assertion>> {
                Some(self)
            }
        }

        impl $crate::model::Assertion for $ty {
            fn is_enabled(&self) -> bool {
                self.enabled
            }

            fn set_enabled(&mut self, enabled: bool) {
                self.enabled = enabled;
            }
        }
    };
}
