//! Wire-format constants.
//!
//! The `...Null` and `...Reference` suffixes, the `included` sentinel and
//! the `item` element name are part of the serialized contract and must not
//! change.

/// WS-Policy 2002/12 namespace: framing and composite containers.
pub const WSP_NAMESPACE: &str = "http://schemas.xmlsoap.org/ws/2002/12/policy";
pub const WSP_PREFIX: &str = "wsp";

/// Product namespace: assertions and property encoding.
pub const L7_NAMESPACE: &str = "http://www.layer7tech.com/ws/policy";
pub const L7_PREFIX: &str = "L7p";

/// Namespace of the policy export envelope.
pub const EXPORT_NAMESPACE: &str = "http://www.layer7tech.com/ws/policy/export";

/// Namespace bound to `xmlns` declarations.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

pub const POLICY: &str = "Policy";
pub const EXPORT: &str = "Export";
pub const USAGE: &str = "Usage";
pub const REQUIRED: &str = "Required";
pub const ENABLED: &str = "Enabled";

pub const NULL_SUFFIX: &str = "Null";
pub const NULL_MARKER: &str = "null";
pub const REFERENCE_SUFFIX: &str = "Reference";
pub const INLINE: &str = "inline";
pub const INCLUDED: &str = "included";
pub const ITEM: &str = "item";
