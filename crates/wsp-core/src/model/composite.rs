//! Composite container assertions.

use super::object::{Assertion, PolicyObject};
use super::types::{ALL, EXACTLY_ONE, ONE_OR_MORE, TypeRef};

/// Logical combinator of a composite container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    All,
    OneOrMore,
    ExactlyOne,
}

impl CompositeKind {
    pub const ALL_KINDS: [CompositeKind; 3] = [
        CompositeKind::All,
        CompositeKind::OneOrMore,
        CompositeKind::ExactlyOne,
    ];

    /// Element local name used on the wire.
    pub fn token(self) -> &'static str {
        match self {
            CompositeKind::All => "All",
            CompositeKind::OneOrMore => "OneOrMore",
            CompositeKind::ExactlyOne => "ExactlyOne",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL_KINDS.into_iter().find(|kind| kind.token() == token)
    }

    pub fn type_ref(self) -> TypeRef {
        match self {
            CompositeKind::All => &ALL,
            CompositeKind::OneOrMore => &ONE_OR_MORE,
            CompositeKind::ExactlyOne => &EXACTLY_ONE,
        }
    }
}

/// Ordered list of child assertions combined by a [`CompositeKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeAssertion {
    kind: CompositeKind,
    enabled: bool,
    children: Vec<Box<dyn Assertion>>,
}

impl CompositeAssertion {
    pub fn new(kind: CompositeKind) -> Self {
        Self {
            kind,
            enabled: true,
            children: Vec::new(),
        }
    }

    pub fn all(children: Vec<Box<dyn Assertion>>) -> Self {
        Self::new(CompositeKind::All).with_children(children)
    }

    pub fn one_or_more(children: Vec<Box<dyn Assertion>>) -> Self {
        Self::new(CompositeKind::OneOrMore).with_children(children)
    }

    pub fn exactly_one(children: Vec<Box<dyn Assertion>>) -> Self {
        Self::new(CompositeKind::ExactlyOne).with_children(children)
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Box<dyn Assertion>>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    pub fn push(&mut self, child: Box<dyn Assertion>) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl PolicyObject for CompositeAssertion {
    fn type_ref(&self) -> TypeRef {
        self.kind.type_ref()
    }

    fn as_assertion(&self) -> Option<&dyn Assertion> {
        Some(self)
    }

    fn as_assertion_mut(&mut self) -> Option<&mut dyn Assertion> {
        Some(self)
    }

    fn into_assertion(self: Box<Self>) -> Option<Box<dyn Assertion>> {
        Some(self)
    }
}

impl Assertion for CompositeAssertion {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn children(&self) -> Option<&[Box<dyn Assertion>]> {
        Some(&self.children)
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Box<dyn Assertion>>> {
        Some(&mut self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_round_trip() {
        for kind in CompositeKind::ALL_KINDS {
            assert_eq!(CompositeKind::from_token(kind.token()), Some(kind));
        }
        assert_eq!(CompositeKind::from_token("AnyOf"), None);
    }

    #[test]
    fn test_equality_covers_children() {
        let left = CompositeAssertion::all(vec![Box::new(CompositeAssertion::new(
            CompositeKind::ExactlyOne,
        ))]);
        let mut right = left.clone();
        assert_eq!(left, right);
        right.push(Box::new(CompositeAssertion::new(CompositeKind::All)));
        assert_ne!(left, right);
    }
}
