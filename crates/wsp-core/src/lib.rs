//! Policy serialization engine.
//!
//! Freezes trees of policy assertions into WS-Policy XML and thaws them
//! back. Each runtime type is handled by a [`TypeMapping`]; mappings are
//! looked up through a [`TypeMappingRegistry`]. Problems met while
//! thawing are routed through a [`WspVisitor`], which either aborts
//! ([`StrictVisitor`]) or quarantines the offending markup
//! ([`PermissiveVisitor`]).

pub mod config;
pub mod context;
pub mod dom;
pub mod error;
pub mod mapping;
pub mod model;
pub mod reader;
pub mod registry;
pub mod version;
pub mod visitor;
pub mod wire;
pub mod writer;
pub mod xml;

pub use config::{
    DEFAULT_MAX_DEPTH, ReadMode, ReadOptions, WriteOptions, WspConfig, legacy_write_mode,
    set_legacy_write_mode,
};
pub use context::{ReadContext, WriteContext};
pub use dom::{Element, Node, QName};
pub use error::{ConfigError, ErrorKind, Result, WspError};
pub use mapping::TypeMapping;
pub use model::{
    Assertion, CompositeAssertion, CompositeKind, PolicyObject, Property, PropertyError,
    TypeInfo, TypeRef, TypedValue, UnknownAssertion, Value, WireEnum,
};
pub use reader::{PolicyReader, locate_policy, prune_disabled};
pub use registry::{MappingTable, TypeMappingFinder, TypeMappingRegistry};
pub use version::Version;
pub use visitor::{
    InterceptingVisitor, PermissiveVisitor, PropertyShim, StrictVisitor, WspVisitor,
    quarantine_element,
};
pub use writer::{PolicyWriter, policy_skeleton};
