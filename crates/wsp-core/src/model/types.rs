//! Nominal runtime types.
//!
//! Every value that crosses a freeze or thaw boundary is tagged with a
//! [`TypeRef`]. Types form a single-inheritance hierarchy through their
//! optional parent, which drives setter widening, collection assignability
//! and the "is this an assertion" check on policy roots.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Static description of a nominal type.
#[derive(Debug)]
pub struct TypeInfo {
    name: &'static str,
    parent: Option<&'static TypeInfo>,
}

/// Shared handle to a [`TypeInfo`].
pub type TypeRef = &'static TypeInfo;

impl TypeInfo {
    /// Declares a type. Intended for `static` items.
    pub const fn new(name: &'static str, parent: Option<&'static TypeInfo>) -> Self {
        Self { name, parent }
    }

    /// Type name, unique within a registry.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn parent(&self) -> Option<TypeRef> {
        self.parent
    }

    /// Iterates this type followed by each of its ancestors.
    pub fn ancestors(&'static self) -> impl Iterator<Item = TypeRef> {
        std::iter::successors(Some(self), |ty| ty.parent)
    }

    /// Returns true if a value of this type may be stored where `target` is expected.
    pub fn is_assignable_to(&'static self, target: TypeRef) -> bool {
        self.ancestors().any(|ty| ty == target)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// =============================================================================
// BUILT-IN TYPES
// =============================================================================

pub static OBJECT: TypeInfo = TypeInfo::new("Object", None);

pub static BOOLEAN: TypeInfo = TypeInfo::new("boolean", None);
pub static BOXED_BOOLEAN: TypeInfo = TypeInfo::new("Boolean", Some(&OBJECT));
pub static INT: TypeInfo = TypeInfo::new("int", None);
pub static BOXED_INT: TypeInfo = TypeInfo::new("Integer", Some(&OBJECT));
pub static LONG: TypeInfo = TypeInfo::new("long", None);
pub static BOXED_LONG: TypeInfo = TypeInfo::new("Long", Some(&OBJECT));
pub static DOUBLE: TypeInfo = TypeInfo::new("double", None);
pub static STRING: TypeInfo = TypeInfo::new("String", Some(&OBJECT));
pub static STRING_ARRAY: TypeInfo = TypeInfo::new("String[]", Some(&OBJECT));

/// Root of every policy assertion.
pub static ASSERTION: TypeInfo = TypeInfo::new("Assertion", Some(&OBJECT));
pub static COMPOSITE_ASSERTION: TypeInfo =
    TypeInfo::new("CompositeAssertion", Some(&ASSERTION));
pub static ALL: TypeInfo = TypeInfo::new("AllAssertion", Some(&COMPOSITE_ASSERTION));
pub static ONE_OR_MORE: TypeInfo =
    TypeInfo::new("OneOrMoreAssertion", Some(&COMPOSITE_ASSERTION));
pub static EXACTLY_ONE: TypeInfo =
    TypeInfo::new("ExactlyOneAssertion", Some(&COMPOSITE_ASSERTION));
pub static UNKNOWN_ASSERTION: TypeInfo = TypeInfo::new("UnknownAssertion", Some(&ASSERTION));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignability_follows_parents() {
        assert!(ALL.is_assignable_to(&ASSERTION));
        assert!(ALL.is_assignable_to(&OBJECT));
        assert!(!ASSERTION.is_assignable_to(&ALL));
        assert!(!INT.is_assignable_to(&OBJECT));
    }

    #[test]
    fn test_ancestors_start_with_self() {
        let names: Vec<_> = EXACTLY_ONE.ancestors().map(TypeInfo::name).collect();
        assert_eq!(
            names,
            vec![
                "ExactlyOneAssertion",
                "CompositeAssertion",
                "Assertion",
                "Object"
            ]
        );
    }
}
