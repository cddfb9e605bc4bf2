//! In-memory policy model: runtime types, values, and the object traits
//! implemented by assertions and beans.

pub mod composite;
pub mod enums;
pub mod object;
pub mod property;
pub mod types;
pub mod unknown;
pub mod value;

pub use composite::{CompositeAssertion, CompositeKind};
pub use enums::WireEnum;
pub use object::{Assertion, DynAssertion, DynObject, PolicyObject};
pub use property::{Property, PropertyError};
pub use types::{TypeInfo, TypeRef};
pub use unknown::UnknownAssertion;
pub use value::{TypedValue, Value};
