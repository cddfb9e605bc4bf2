//! Namespace-aware XML element tree.
//!
//! Names are stored resolved: every element and attribute carries its
//! namespace URI alongside the prefix it was written with. Namespace
//! declarations are kept as ordinary attributes in the `xmlns` namespace so
//! they survive a parse/serialize cycle.

use crate::wire::{L7_NAMESPACE, L7_PREFIX, WSP_NAMESPACE, WSP_PREFIX, XMLNS_NAMESPACE};

/// A resolved element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(namespace: Option<&str>, prefix: Option<&str>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local: local.into(),
        }
    }

    /// Unqualified name with no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(None, None, local)
    }

    /// Name in the product namespace, `L7p:` prefixed.
    pub fn l7(local: impl Into<String>) -> Self {
        Self::new(Some(L7_NAMESPACE), Some(L7_PREFIX), local)
    }

    /// Name in the WS-Policy namespace, `wsp:` prefixed.
    pub fn wsp(local: impl Into<String>) -> Self {
        Self::new(Some(WSP_NAMESPACE), Some(WSP_PREFIX), local)
    }

    /// Name as written: `prefix:local` or `local`.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns true if this is an `xmlns` or `xmlns:p` declaration.
    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace() == Some(XMLNS_NAMESPACE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// A child node of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    /// Pre-serialized markup copied verbatim on output.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace()
    }

    /// Returns true if this element has the given namespace and local name.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace() == Some(namespace) && self.local_name() == local
    }

    /// Sets an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|attr| attr.name.namespace == name.namespace && attr.name.local == name.local)
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: QName, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Declares `prefix` (or the default namespace when `None`) on this element.
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: &str) {
        let name = match prefix {
            Some(prefix) => QName::new(Some(XMLNS_NAMESPACE), Some("xmlns"), prefix),
            None => QName::new(Some(XMLNS_NAMESPACE), None, "xmlns"),
        };
        self.set_attribute(name, uri);
    }

    /// Looks up an attribute value by namespace and local name.
    pub fn attribute(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.namespace() == namespace && attr.name.local == local)
            .map(|attr| attr.value.as_str())
    }

    /// Attributes other than namespace declarations.
    pub fn plain_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(|attr| !attr.name.is_namespace_declaration())
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn push_element(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Concatenated text and CDATA content of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Copy of this element with its attributes but none of its children.
    /// Returns true if elements nest more than `limit` levels deep below
    /// and including this one. Walks without recursion.
    pub fn exceeds_depth(&self, limit: usize) -> bool {
        let mut stack = vec![(self, 1usize)];
        while let Some((element, depth)) = stack.pop() {
            if depth > limit {
                return true;
            }
            stack.extend(element.child_elements().map(|child| (child, depth + 1)));
        }
        false
    }

    pub fn shallow_copy(&self) -> Self {
        Self {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attribute_replaces() {
        let mut element = Element::new(QName::l7("Realm"));
        element.set_attribute(QName::local("stringValue"), "a");
        element.set_attribute(QName::local("stringValue"), "b");
        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.attribute(None, "stringValue"), Some("b"));
    }

    #[test]
    fn test_declarations_are_not_plain_attributes() {
        let mut element = Element::new(QName::wsp("Policy"));
        element.declare_namespace(Some("wsp"), WSP_NAMESPACE);
        element.set_attribute(QName::local("Id"), "p1");
        let plain: Vec<_> = element
            .plain_attributes()
            .map(|attr| attr.name.local.as_str())
            .collect();
        assert_eq!(plain, vec!["Id"]);
        assert_eq!(element.name.qualified(), "wsp:Policy");
    }

    #[test]
    fn test_text_joins_cdata_and_text() {
        let mut element = Element::new(QName::l7("Message"));
        element.push(Node::Text("a".to_string()));
        element.push(Node::CData("b".to_string()));
        assert_eq!(element.text(), "ab");
    }

    #[test]
    fn test_exceeds_depth_counts_element_levels() {
        let mut leaf = Element::new(QName::local("c"));
        leaf.push(Node::Text("deep".to_string()));
        let mut middle = Element::new(QName::local("b"));
        middle.push_element(Element::new(QName::local("sibling")));
        middle.push_element(leaf);
        let mut root = Element::new(QName::local("a"));
        root.push_element(middle);

        assert!(!root.exceeds_depth(3));
        assert!(root.exceeds_depth(2));
        assert!(Element::new(QName::local("x")).exceeds_depth(0));
    }
}
