//! Parsing and serialization between XML text and the [`dom`](crate::dom) tree.
//!
//! Parsing uses `quick_xml::Reader` with an explicit namespace scope stack;
//! whitespace-only text is dropped. Serialization uses `quick_xml::Writer`:
//! indented for whole documents, compact for fragments.

use std::io::Write;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::dom::{Attribute, Element, Node, QName};
use crate::error::{Result, WspError};
use crate::wire::{XML_NAMESPACE, XMLNS_NAMESPACE};

/// Indentation width of serialized documents.
const INDENT: usize = 4;

/// Element nesting accepted by [`parse`].
pub const MAX_NESTING: usize = 1024;

struct Scope {
    prefix: Option<String>,
    uri: String,
}

// =============================================================================
// PARSING
// =============================================================================

/// Parses a document and returns its root element.
pub fn parse(xml: &str) -> Result<Element> {
    parse_with_limit(xml, MAX_NESTING)
}

/// Parses a document, failing once elements nest deeper than `limit`.
///
/// Trees are dropped recursively, so the limit also bounds the stack used
/// when the result goes out of scope.
pub fn parse_with_limit(xml: &str, limit: usize) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut scopes: Vec<Scope> = Vec::new();
    let mut open: Vec<(Element, usize)> = Vec::new();
    let mut pending = String::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                flush_text(&mut open, &mut pending);
                if open.len() >= limit {
                    return Err(WspError::TooDeeplyNested { limit });
                }
                let mark = scopes.len();
                let element = open_element(&start, &mut scopes)?;
                open.push((element, mark));
            }
            Event::Empty(start) => {
                flush_text(&mut open, &mut pending);
                if open.len() >= limit {
                    return Err(WspError::TooDeeplyNested { limit });
                }
                let mark = scopes.len();
                let element = open_element(&start, &mut scopes)?;
                scopes.truncate(mark);
                close_element(element, &mut open, &mut root)?;
            }
            Event::End(_) => {
                flush_text(&mut open, &mut pending);
                let (element, mark) = open
                    .pop()
                    .ok_or_else(|| WspError::malformed("unexpected end tag"))?;
                scopes.truncate(mark);
                close_element(element, &mut open, &mut root)?;
            }
            Event::Text(text) => {
                pending.push_str(&unescape(utf8(&text)?)?);
            }
            Event::GeneralRef(reference) => {
                pending.push_str(&resolve_reference(utf8(&reference)?)?);
            }
            Event::CData(data) => {
                flush_text(&mut open, &mut pending);
                let text = utf8(&data)?.to_string();
                if let Some((parent, _)) = open.last_mut() {
                    parent.push(Node::CData(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some((element, _)) = open.last() {
        return Err(WspError::malformed(format!(
            "unclosed element {}",
            element.name.qualified()
        )));
    }
    root.ok_or_else(|| WspError::malformed("document has no root element"))
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|err| WspError::malformed(format!("invalid UTF-8: {err}")))
}

fn flush_text(open: &mut [(Element, usize)], pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let text = std::mem::take(pending);
    if text.trim().is_empty() {
        return;
    }
    if let Some((parent, _)) = open.last_mut() {
        parent.push(Node::Text(text));
    }
}

fn resolve_reference(name: &str) -> Result<String> {
    if let Some(code) = name.strip_prefix('#') {
        let number = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        return number
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| WspError::malformed(format!("invalid character reference &{name};")));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| WspError::malformed(format!("unknown entity &{name};")))
}

fn open_element(start: &BytesStart<'_>, scopes: &mut Vec<Scope>) -> Result<Element> {
    let mut raw = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = unescape(utf8(&attr.value)?)?.into_owned();
        raw.push((key, value));
    }

    for (key, value) in &raw {
        if key == "xmlns" {
            scopes.push(Scope {
                prefix: None,
                uri: value.clone(),
            });
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scopes.push(Scope {
                prefix: Some(prefix.to_string()),
                uri: value.clone(),
            });
        }
    }

    let mut element = Element::new(resolve_name(utf8(start.name().as_ref())?, scopes, true)?);
    for (key, value) in raw {
        let name = if key == "xmlns" {
            QName::new(Some(XMLNS_NAMESPACE), None, "xmlns")
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            QName::new(Some(XMLNS_NAMESPACE), Some("xmlns"), prefix)
        } else {
            resolve_name(&key, scopes, false)?
        };
        element.attributes.push(Attribute { name, value });
    }
    Ok(element)
}

fn resolve_name(raw: &str, scopes: &[Scope], is_element: bool) -> Result<QName> {
    let (prefix, local) = match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, raw),
    };
    let lookup = |prefix: Option<&str>| {
        scopes
            .iter()
            .rev()
            .find(|scope| scope.prefix.as_deref() == prefix)
            .map(|scope| scope.uri.clone())
    };
    let namespace = match prefix {
        Some("xml") => Some(XML_NAMESPACE.to_string()),
        Some(prefix) => Some(lookup(Some(prefix)).ok_or_else(|| {
            WspError::malformed(format!("undeclared namespace prefix {prefix} on {raw}"))
        })?),
        // Unprefixed attributes never take the default namespace.
        None if is_element => lookup(None).filter(|uri| !uri.is_empty()),
        None => None,
    };
    Ok(QName {
        namespace,
        prefix: prefix.map(str::to_string),
        local: local.to_string(),
    })
}

fn close_element(
    element: Element,
    open: &mut [(Element, usize)],
    root: &mut Option<Element>,
) -> Result<()> {
    match open.last_mut() {
        Some((parent, _)) => parent.push_element(element),
        None if root.is_some() => {
            return Err(WspError::malformed(
                "document has more than one root element",
            ));
        }
        None => *root = Some(element),
    }
    Ok(())
}

// =============================================================================
// SERIALIZATION
// =============================================================================

/// Serializes a whole document: XML declaration plus indented tree.
pub fn to_document(root: &Element) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    into_string(writer.into_inner())
}

/// Serializes a standalone fragment on a single line.
///
/// Any namespace prefix used inside the fragment but declared outside it
/// is declared on the fragment root, so the result parses on its own.
pub fn to_fragment(element: &Element) -> Result<String> {
    let mut element = element.clone();
    declare_missing_namespaces(&mut element);
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, &element)?;
    into_string(writer.into_inner())
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|err| WspError::malformed(err.to_string()))
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let name = element.name.qualified();
    let mut start = BytesStart::new(name.as_str());
    for attr in &element.attributes {
        start.push_attribute((attr.name.qualified().as_str(), attr.value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            // A CDATA section cannot contain its own terminator.
            Node::CData(text) if text.contains("]]>") => {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
            Node::CData(text) => writer.write_event(Event::CData(BytesCData::new(text)))?,
            Node::Raw(markup) => {
                writer.write_indent()?;
                writer.get_mut().write_all(markup.as_bytes())?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

fn declare_missing_namespaces(element: &mut Element) {
    let mut used: Vec<(Option<String>, String)> = Vec::new();
    let mut declared: Vec<Option<String>> = Vec::new();
    collect_namespaces(element, &mut used, &mut declared);
    for (prefix, uri) in used {
        if !declared.contains(&prefix) {
            element.declare_namespace(prefix.as_deref(), &uri);
            declared.push(prefix);
        }
    }
}

fn collect_namespaces(
    element: &Element,
    used: &mut Vec<(Option<String>, String)>,
    declared: &mut Vec<Option<String>>,
) {
    let mut note = |name: &QName| {
        if let Some(uri) = name.namespace()
            && uri != XML_NAMESPACE
            && !used.iter().any(|(prefix, _)| *prefix == name.prefix)
        {
            used.push((name.prefix.clone(), uri.to_string()));
        }
    };
    note(&element.name);
    for attr in &element.attributes {
        if attr.name.is_namespace_declaration() {
            let prefix = attr.name.prefix.as_ref().map(|_| attr.name.local.clone());
            declared.push(prefix);
        } else if attr.name.prefix.is_some() {
            note(&attr.name);
        }
    }
    for child in element.child_elements() {
        collect_namespaces(child, used, declared);
    }
}
