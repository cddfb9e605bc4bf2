//! Wire helpers shared by the mapping structs.

use crate::dom::{Element, Node, QName};
use crate::wire::{INCLUDED, INLINE, L7_NAMESPACE, NULL_MARKER, NULL_SUFFIX, REFERENCE_SUFFIX};

/// Value carried by a named-form element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamedValue {
    Text(String),
    Null,
}

fn key_attribute<'e>(source: &'e Element, key: &str) -> Option<&'e str> {
    source
        .attribute(None, key)
        .or_else(|| source.attribute(Some(L7_NAMESPACE), key))
}

/// Returns true if `source` is a named-form element keyed by `key`.
pub fn is_named(source: &Element, key: &str) -> bool {
    named_value(source, key).is_some()
}

/// Reads the named-form value keyed by `key`: the plain attribute, the
/// `Null` marker, or the `Reference` form whose body holds the text.
pub fn named_value(source: &Element, key: &str) -> Option<NamedValue> {
    if let Some(text) = key_attribute(source, key) {
        return Some(NamedValue::Text(text.to_string()));
    }
    if key_attribute(source, &format!("{key}{NULL_SUFFIX}")).is_some() {
        return Some(NamedValue::Null);
    }
    if key_attribute(source, &format!("{key}{REFERENCE_SUFFIX}")).is_some() {
        return Some(NamedValue::Text(source.text()));
    }
    None
}

/// Bare element in the product namespace.
pub fn element(local: &str) -> Element {
    Element::new(QName::l7(local))
}

/// `<L7p:name keyNull="null"/>`
pub fn null_element(name: &str, key: &str) -> Element {
    element(name).with_attribute(QName::local(format!("{key}{NULL_SUFFIX}")), NULL_MARKER)
}

/// `<L7p:name key="included"/>`, the header of a complex named value.
pub fn included_element(name: &str, key: &str) -> Element {
    element(name).with_attribute(QName::local(key), INCLUDED)
}

/// `<L7p:name keyReference="inline"><![CDATA[text]]></L7p:name>`
pub fn reference_element(name: &str, key: &str, text: &str) -> Element {
    let mut element =
        element(name).with_attribute(QName::local(format!("{key}{REFERENCE_SUFFIX}")), INLINE);
    element.push(Node::CData(text.to_string()));
    element
}

/// Named-form text value. Multi-line text switches to the reference form,
/// since attribute values cannot carry line breaks.
pub fn text_element(name: &str, key: &str, text: Option<&str>) -> Element {
    match text {
        None => null_element(name, key),
        Some(text) if text.contains(['\n', '\r']) => reference_element(name, key, text),
        Some(text) => element(name).with_attribute(QName::local(key), text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_element_shapes() {
        let plain = text_element("Realm", "stringValue", Some("x"));
        assert_eq!(
            named_value(&plain, "stringValue"),
            Some(NamedValue::Text("x".to_string()))
        );

        let null = text_element("Realm", "stringValue", None);
        assert_eq!(null.attribute(None, "stringValueNull"), Some("null"));
        assert_eq!(named_value(&null, "stringValue"), Some(NamedValue::Null));

        let multi = text_element("Message", "stringValue", Some("a\nb"));
        assert_eq!(multi.attribute(None, "stringValueReference"), Some("inline"));
        assert_eq!(
            named_value(&multi, "stringValue"),
            Some(NamedValue::Text("a\nb".to_string()))
        );
    }

    #[test]
    fn test_other_keys_are_not_named() {
        let plain = text_element("Realm", "stringValue", Some("x"));
        assert!(!is_named(&plain, "booleanValue"));
    }
}
