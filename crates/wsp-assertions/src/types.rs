//! Runtime types of the catalogue.

use wsp_core::TypeInfo;
use wsp_core::model::types::{ASSERTION, OBJECT};

// =============================================================================
// ASSERTIONS
// =============================================================================

pub static TRUE_ASSERTION: TypeInfo = TypeInfo::new("TrueAssertion", Some(&ASSERTION));
pub static FALSE_ASSERTION: TypeInfo = TypeInfo::new("FalseAssertion", Some(&ASSERTION));
pub static HTTP_BASIC: TypeInfo = TypeInfo::new("HttpBasic", Some(&ASSERTION));
pub static WSS_BASIC: TypeInfo = TypeInfo::new("WssBasic", Some(&ASSERTION));
pub static REQUIRE_WSS_X509_CERT: TypeInfo =
    TypeInfo::new("RequireWssX509Cert", Some(&ASSERTION));
pub static HTTP_ROUTING: TypeInfo = TypeInfo::new("HttpRoutingAssertion", Some(&ASSERTION));
pub static EMAIL_ALERT: TypeInfo = TypeInfo::new("EmailAlertAssertion", Some(&ASSERTION));
pub static SQL_ATTACK: TypeInfo = TypeInfo::new("SqlAttackAssertion", Some(&ASSERTION));
pub static CUSTOM_ASSERTION_HOLDER: TypeInfo =
    TypeInfo::new("CustomAssertionHolder", Some(&ASSERTION));

// =============================================================================
// PROPERTY TYPES
// =============================================================================

pub static XML_SECURITY_RECIPIENT_CONTEXT: TypeInfo =
    TypeInfo::new("XmlSecurityRecipientContext", Some(&OBJECT));
pub static HTTP_PASSTHROUGH_RULE_SET: TypeInfo =
    TypeInfo::new("HttpPassthroughRuleSet", Some(&OBJECT));
pub static HTTP_PASSTHROUGH_RULE: TypeInfo = TypeInfo::new("HttpPassthroughRule", Some(&OBJECT));
pub static HTTP_PASSTHROUGH_RULE_ARRAY: TypeInfo =
    TypeInfo::new("HttpPassthroughRule[]", Some(&OBJECT));
pub static EMAIL_PROTOCOL: TypeInfo = TypeInfo::new("EmailAlertAssertion.Protocol", Some(&OBJECT));
pub static SQL_PROTECTION_SET: TypeInfo = TypeInfo::new("Set<SqlProtection>", Some(&OBJECT));

/// Abstract base of pluggable custom assertion payloads.
pub static CUSTOM_ASSERTION: TypeInfo = TypeInfo::new("CustomAssertion", Some(&OBJECT));
pub static RATE_LIMIT_CUSTOM: TypeInfo =
    TypeInfo::new("RateLimitCustomAssertion", Some(&CUSTOM_ASSERTION));
pub static CLIENT_IP_CUSTOM: TypeInfo =
    TypeInfo::new("ClientIpCustomAssertion", Some(&CUSTOM_ASSERTION));
