//! Legacy vocabulary.
//!
//! Everything here is read-only: these shapes are accepted on thaw and
//! never produced on freeze, except for the security token shape that
//! [`WssBasicMapping`](crate::credentials::WssBasicMapping) writes in
//! legacy-compatible mode.
//!
//! ```xml
//! <wsse:SecurityToken xmlns:wsse="http://schemas.xmlsoap.org/ws/2002/12/secext">
//!     <wsse:TokenType>wsse:UserName</wsse:TokenType>
//! </wsse:SecurityToken>
//! ```

use std::sync::Arc;

use tracing::debug;
use wsp_core::mapping::RenamedTypeMapping;
use wsp_core::model::types::ASSERTION;
use wsp_core::{
    Element, Node, PolicyObject, PropertyError, PropertyShim, QName, ReadContext, Result,
    TypeMapping, TypeRef, TypedValue, Value, WriteContext, WspError,
};

use crate::credentials::{RequireWssX509Cert, WssBasic};
use crate::routing::HttpRoutingAssertion;
use crate::types::HTTP_ROUTING;

pub const WSSE_NAMESPACE: &str = "http://schemas.xmlsoap.org/ws/2002/12/secext";
pub const WSSE_PREFIX: &str = "wsse";

pub const SECURITY_TOKEN: &str = "SecurityToken";
pub const TOKEN_TYPE: &str = "TokenType";

pub const USERNAME_TOKEN: &str = "wsse:UserName";
pub const X509_TOKEN: &str = "wsse:X509v3";

fn wsse(local: &str) -> QName {
    QName::new(Some(WSSE_NAMESPACE), Some(WSSE_PREFIX), local)
}

/// Builds the legacy `wsse:SecurityToken` element for `token_type`.
pub fn security_token_element(token_type: &str) -> Element {
    let mut token = Element::new(wsse(SECURITY_TOKEN));
    token.declare_namespace(Some(WSSE_PREFIX), WSSE_NAMESPACE);
    let mut kind = Element::new(wsse(TOKEN_TYPE));
    kind.push(Node::Text(token_type.to_string()));
    token.push_element(kind);
    token
}

// =============================================================================
// SECURITY TOKEN
// =============================================================================

/// Reads `wsse:SecurityToken` as the credential assertion its token type
/// names.
#[derive(Debug, Clone, Default)]
pub struct SecurityTokenMapping;

impl SecurityTokenMapping {
    fn token_type(source: &Element) -> Option<String> {
        source
            .child_elements()
            .find(|child| child.local_name() == TOKEN_TYPE)
            .map(|child| child.text().trim().to_string())
    }
}

impl TypeMapping for SecurityTokenMapping {
    fn mapped_type(&self) -> TypeRef {
        &ASSERTION
    }

    fn external_name(&self) -> &str {
        SECURITY_TOKEN
    }

    fn describe(&self) -> &'static str {
        "legacy"
    }

    fn freeze(
        &self,
        _cx: &mut WriteContext<'_>,
        _value: &TypedValue,
        _into: &mut Element,
    ) -> Result<()> {
        Err(WspError::Configuration {
            message: format!("{SECURITY_TOKEN} is a read-only legacy element"),
        })
    }

    fn thaw(&self, _cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        let token_type = Self::token_type(source).unwrap_or_default();
        // Token types were written both prefixed and as bare local names.
        let local = token_type.rsplit(':').next().unwrap_or_default();
        let assertion: Box<dyn PolicyObject> = match local {
            "UserName" | "UsernameToken" => Box::new(WssBasic::default()),
            "X509v3" => Box::new(RequireWssX509Cert::default()),
            _ => {
                return Err(WspError::UnknownElement {
                    name: format!("{SECURITY_TOKEN}[{token_type}]"),
                });
            }
        };
        debug!(token_type = %token_type, "upgraded legacy security token");
        Ok(TypedValue::object(assertion))
    }
}

// =============================================================================
// PROPERTY SHIMS
// =============================================================================

/// `HttpRoutingAssertion/MaxConnections` was once written as text.
fn max_connections_from_text(
    target: &mut dyn PolicyObject,
    value: &TypedValue,
) -> std::result::Result<(), PropertyError> {
    let Some(Value::Str(text)) = value.value() else {
        return Err(PropertyError::Invalid("expected text".to_string()));
    };
    let routing = target
        .as_any_mut()
        .downcast_mut::<HttpRoutingAssertion>()
        .ok_or_else(|| PropertyError::Invalid("not an HTTP routing assertion".to_string()))?;
    routing.max_connections = text
        .trim()
        .parse()
        .map_err(|_| PropertyError::Invalid(format!("invalid connection count {text:?}")))?;
    Ok(())
}

/// Visitor shims translating deprecated property encodings.
pub fn property_shims() -> Vec<PropertyShim> {
    vec![PropertyShim::new(
        &HTTP_ROUTING,
        "MaxConnections",
        max_connections_from_text,
    )]
}

// =============================================================================
// LEGACY TABLE
// =============================================================================

pub(crate) fn legacy_mappings(x509: Arc<dyn TypeMapping>) -> Vec<Arc<dyn TypeMapping>> {
    vec![
        Arc::new(SecurityTokenMapping),
        Arc::new(RenamedTypeMapping::new("RequestWssX509Cert", x509)),
    ]
}
