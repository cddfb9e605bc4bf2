//! Reference assertion catalogue for the policy serialization engine.
//!
//! Provides concrete assertion types, their mappings, the legacy
//! vocabulary older policies use, and a ready-made registry with read and
//! write entry points:
//!
//! ```no_run
//! use wsp_assertions::{HttpBasic, read_permissive, write_policy};
//!
//! let xml = write_policy(&HttpBasic::with_realm("intranet"))?;
//! let policy = read_permissive(&xml)?;
//! assert!(policy.is_some());
//! # Ok::<(), wsp_core::WspError>(())
//! ```

pub mod alert;
pub mod compat;
pub mod credentials;
pub mod custom;
pub mod logic;
pub mod policy;
pub mod registry;
pub mod routing;
pub mod threat;
pub mod types;

pub use alert::{EmailAlertAssertion, Protocol};
pub use credentials::{HttpBasic, RequireWssX509Cert, WssBasic, XmlSecurityRecipientContext};
pub use custom::{ClientIpCustomAssertion, CustomAssertionHolder, RateLimitCustomAssertion};
pub use logic::{FalseAssertion, TrueAssertion};
pub use policy::{
    read_element_with_options, read_permissive, read_permissive_element, read_strict,
    read_with_options, write_policy, write_policy_element, write_with_options,
};
pub use registry::{build_default_registry, default_registry};
pub use routing::{HttpPassthroughRule, HttpPassthroughRuleSet, HttpRoutingAssertion};
pub use threat::{SqlAttackAssertion, SqlProtection};
