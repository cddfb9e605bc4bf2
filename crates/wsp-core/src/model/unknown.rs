//! Quarantine placeholder for elements that could not be thawed.

use super::types::UNKNOWN_ASSERTION;

/// Stands in for an element that no mapping could thaw.
///
/// Created by the permissive visitor. When `original_xml` is present it is
/// re-emitted verbatim on freeze, so unknown vocabulary survives a
/// read/write cycle unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownAssertion {
    pub enabled: bool,
    pub element_name: Option<String>,
    pub original_xml: Option<String>,
    pub detail_message: Option<String>,
}

impl Default for UnknownAssertion {
    fn default() -> Self {
        Self {
            enabled: true,
            element_name: None,
            original_xml: None,
            detail_message: None,
        }
    }
}

impl UnknownAssertion {
    pub fn new(element_name: impl Into<String>, original_xml: Option<String>) -> Self {
        Self {
            element_name: Some(element_name.into()),
            original_xml,
            ..Self::default()
        }
    }
}

crate::impl_assertion!(UnknownAssertion, &UNKNOWN_ASSERTION);
