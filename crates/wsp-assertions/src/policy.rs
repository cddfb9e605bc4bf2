//! Read and write policies with the default registry.
//!
//! Readers built here always run with the legacy property shims installed,
//! so deprecated encodings are translated before the visitor sees them.

use wsp_core::{
    Assertion, Element, InterceptingVisitor, PermissiveVisitor, PolicyReader, PolicyWriter,
    ReadMode, ReadOptions, Result, StrictVisitor, WriteOptions,
};

use crate::compat;
use crate::registry::default_registry;

/// Reads `xml`, quarantining anything unrecognized.
pub fn read_permissive(xml: &str) -> Result<Option<Box<dyn Assertion>>> {
    read_with_options(xml, &ReadOptions::default())
}

/// Reads an already parsed document, quarantining anything unrecognized.
pub fn read_permissive_element(document: &Element) -> Result<Option<Box<dyn Assertion>>> {
    read_element_with_options(document, &ReadOptions::default())
}

/// Reads `xml`, failing on the first unrecognized element or property.
pub fn read_strict(xml: &str) -> Result<Option<Box<dyn Assertion>>> {
    let options = ReadOptions {
        mode: ReadMode::Strict,
        ..ReadOptions::default()
    };
    read_with_options(xml, &options)
}

/// Reads `xml` with the visitor selected by `options.mode`.
pub fn read_with_options(xml: &str, options: &ReadOptions) -> Result<Option<Box<dyn Assertion>>> {
    let document = wsp_core::xml::parse(xml)?;
    read_element_with_options(&document, options)
}

pub fn read_element_with_options(
    document: &Element,
    options: &ReadOptions,
) -> Result<Option<Box<dyn Assertion>>> {
    let reader = PolicyReader::new(default_registry()?, options.clone());
    match options.mode {
        ReadMode::Permissive => {
            let visitor =
                InterceptingVisitor::new(PermissiveVisitor::new(), compat::property_shims());
            reader.read_element(document, &visitor)
        }
        ReadMode::Strict => {
            let visitor = InterceptingVisitor::new(StrictVisitor, compat::property_shims());
            reader.read_element(document, &visitor)
        }
    }
}

/// Writes `policy` as an indented WS-Policy document.
pub fn write_policy(policy: &dyn Assertion) -> Result<String> {
    write_with_options(Some(policy), &WriteOptions::default())
}

/// Writes `policy` with explicit options. `None` writes an empty policy.
pub fn write_with_options(
    policy: Option<&dyn Assertion>,
    options: &WriteOptions,
) -> Result<String> {
    PolicyWriter::new(default_registry()?, options.clone()).write_optional(policy)
}

/// Freezes `policy` without serializing it.
pub fn write_policy_element(
    policy: Option<&dyn Assertion>,
    options: &WriteOptions,
) -> Result<Element> {
    PolicyWriter::new(default_registry()?, options.clone()).write_element(policy)
}
