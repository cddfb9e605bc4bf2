//! Error types for the policy serialization engine.
//!
//! Every failure is classified into one of four [`ErrorKind`]s. Only
//! resolution failures are recoverable: they are handed to the active
//! [`WspVisitor`](crate::visitor::WspVisitor), which either escalates them
//! (strict reads) or degrades gracefully (permissive reads). Structural and
//! configuration errors always abort the current read or write.

use thiserror::Error;

use crate::model::property::PropertyError;

/// Broad classification of a [`WspError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed nesting, multiple roots, loops, excessive depth. Always fatal.
    Structural,
    /// Unknown vocabulary or values that cannot be applied. Routed through the visitor.
    Resolution,
    /// Invalid descriptor tables, detected when a registry is built.
    Configuration,
    /// The underlying XML could not be parsed or written.
    Xml,
}

/// Unified error type for freeze and thaw operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WspError {
    // =========================================================================
    // STRUCTURAL ERRORS
    // =========================================================================
    /// Document root is not a recognised policy element.
    #[error("document root {{{namespace}}}{name} is not a policy")]
    NotAPolicy {
        /// Namespace URI of the offending root (empty when unqualified).
        namespace: String,
        /// Local name of the offending root.
        name: String,
    },

    /// Policy element has more than one immediate child.
    #[error("policy has {count} root assertions; at most one is allowed")]
    MultiplePolicyRoots {
        /// Number of immediate child elements found.
        count: usize,
    },

    /// Thawed root value is not an assertion.
    #[error("policy root of type {type_name} is not an assertion")]
    NotAnAssertion {
        /// Runtime type of the thawed value.
        type_name: String,
    },

    /// A composite child thawed to an absent value.
    #[error("{container} may not hold an unresolved child (element {element})")]
    UnresolvedChild {
        /// Composite kind token.
        container: String,
        /// Local name of the child element.
        element: String,
    },

    /// A collection member does not match the declared element type.
    #[error("collection {collection} expects {expected} members but found {found}")]
    IncompatibleMember {
        /// External name of the collection mapping.
        collection: String,
        /// Declared element type.
        expected: String,
        /// Type of the offending member.
        found: String,
    },

    /// Polymorphic mapping delegated back into another polymorphic mapping.
    #[error("delegation loop: abstract mapping {from} resolved to abstract mapping {to}")]
    DelegationLoop {
        /// External name of the delegating mapping.
        from: String,
        /// External name of the mapping it resolved to.
        to: String,
    },

    /// Recursion cap exceeded.
    #[error("policy too deeply nested (limit {limit})")]
    TooDeeplyNested {
        /// Configured maximum depth.
        limit: usize,
    },

    /// Structural problem with an element that no recovery can fix.
    #[error("malformed policy: {message}")]
    Malformed {
        /// Description of the problem.
        message: String,
    },

    /// A recoverable problem escalated by the active visitor.
    #[error("invalid policy at element {element}")]
    InvalidPolicy {
        /// Local name of the element being processed.
        element: String,
        /// The recoverable problem that was escalated.
        #[source]
        source: Box<WspError>,
    },

    // =========================================================================
    // RESOLUTION ERRORS
    // =========================================================================
    /// No descriptor is known for an element.
    #[error("unknown element {name}")]
    UnknownElement {
        /// Local name of the element.
        name: String,
    },

    /// No property accepts a thawed value.
    #[error("unknown property {property} on {owner}")]
    UnknownProperty {
        /// Runtime type of the object being populated.
        owner: String,
        /// Property name taken from the element.
        property: String,
        /// Setter failure, when a matching setter rejected the value.
        #[source]
        source: Option<PropertyError>,
    },

    /// A value's type does not match the descriptor handling it.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type governed by the descriptor.
        expected: String,
        /// Type carried by the value.
        found: String,
    },

    /// A null was supplied where the type is not nullable.
    #[error("unexpected null for {type_name} {name}")]
    UnexpectedNull {
        /// Non-nullable type.
        type_name: String,
        /// Property name, or the external name for anonymous values.
        name: String,
    },

    /// Scalar text could not be converted.
    #[error("invalid {type_name} value {text:?}: {message}")]
    InvalidFormat {
        /// Target type.
        type_name: String,
        /// Offending text.
        text: String,
        /// Conversion failure.
        message: String,
    },

    /// Element lacks the attribute or body the descriptor needs.
    #[error("element {element} has no value for {external_name}")]
    MissingValue {
        /// Local name of the element.
        element: String,
        /// External name of the descriptor.
        external_name: String,
    },

    /// No descriptor is known for a runtime type.
    #[error("no type mapping for {type_name}")]
    NoMappingForType {
        /// Runtime type that could not be resolved.
        type_name: String,
    },

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// Descriptor tables are inconsistent.
    #[error("invalid type mapping configuration: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    // =========================================================================
    // XML ERRORS
    // =========================================================================
    /// The XML reader or writer failed.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute could not be parsed.
    #[error("xml attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// An entity or character reference could not be resolved.
    #[error("xml escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// Writing serialized output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WspError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WspError::NotAPolicy { .. }
            | WspError::MultiplePolicyRoots { .. }
            | WspError::NotAnAssertion { .. }
            | WspError::UnresolvedChild { .. }
            | WspError::IncompatibleMember { .. }
            | WspError::DelegationLoop { .. }
            | WspError::TooDeeplyNested { .. }
            | WspError::Malformed { .. }
            | WspError::InvalidPolicy { .. } => ErrorKind::Structural,
            WspError::UnknownElement { .. }
            | WspError::UnknownProperty { .. }
            | WspError::TypeMismatch { .. }
            | WspError::UnexpectedNull { .. }
            | WspError::InvalidFormat { .. }
            | WspError::MissingValue { .. }
            | WspError::NoMappingForType { .. } => ErrorKind::Resolution,
            WspError::Configuration { .. } => ErrorKind::Configuration,
            WspError::Xml(_) | WspError::Attribute(_) | WspError::Escape(_) | WspError::Io(_) => {
                ErrorKind::Xml
            }
        }
    }

    /// Returns true if the active visitor may recover from this error.
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::Resolution
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        WspError::Malformed {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        WspError::Configuration {
            message: message.into(),
        }
    }
}

/// Errors raised while loading [`WspConfig`](crate::config::WspConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

pub type Result<T> = std::result::Result<T, WspError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_errors_are_recoverable() {
        let err = WspError::UnknownElement {
            name: "Bogus".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(err.is_recoverable());
    }

    #[test]
    fn escalated_errors_keep_their_cause() {
        let err = WspError::InvalidPolicy {
            element: "Bogus".to_string(),
            source: Box::new(WspError::UnknownElement {
                name: "Bogus".to_string(),
            }),
        };
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert!(!err.is_recoverable());
        let cause = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(cause.as_deref(), Some("unknown element Bogus"));
    }

    #[test]
    fn depth_error_message() {
        let err = WspError::TooDeeplyNested { limit: 8 };
        assert_eq!(err.to_string(), "policy too deeply nested (limit 8)");
    }
}
