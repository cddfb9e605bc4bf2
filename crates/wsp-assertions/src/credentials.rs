//! Credential source assertions.
//!
//! `WssBasic` has two wire shapes. The current one is the bean element
//! `<L7p:WssBasic/>`; legacy-compatible writers emit the older
//! `<wsse:SecurityToken>` form instead, which the legacy table reads back.

use std::sync::Arc;

use tracing::trace;
use wsp_core::mapping::BeanTypeMapping;
use wsp_core::model::property::{bool_value, object_value, opt_string_value};
use wsp_core::model::types::{BOOLEAN, STRING};
use wsp_core::{
    Element, Property, ReadContext, Result, TypeMapping, TypeRef, TypedValue, Value, WriteContext,
};

use crate::compat::{USERNAME_TOKEN, security_token_element};
use crate::types::{HTTP_BASIC, REQUIRE_WSS_X509_CERT, WSS_BASIC, XML_SECURITY_RECIPIENT_CONTEXT};

// =============================================================================
// HTTP BASIC
// =============================================================================

/// Gathers HTTP Basic credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpBasic {
    pub enabled: bool,
    pub realm: Option<String>,
}

impl Default for HttpBasic {
    fn default() -> Self {
        Self {
            enabled: true,
            realm: None,
        }
    }
}

impl HttpBasic {
    pub fn with_realm(realm: impl Into<String>) -> Self {
        Self {
            realm: Some(realm.into()),
            ..Self::default()
        }
    }
}

wsp_core::impl_assertion!(HttpBasic, &HTTP_BASIC);

fn http_basic_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(&HTTP_BASIC, "HttpBasic", || Box::new(HttpBasic::default())).properties([
        Property::enabled(),
        Property::new::<HttpBasic>(
            "Realm",
            &STRING,
            |basic| basic.realm.clone().map(Value::Str),
            |basic, value| {
                basic.realm = opt_string_value(value)?;
                Ok(())
            },
        ),
    ])
}

// =============================================================================
// WSS BASIC
// =============================================================================

/// Gathers a WS-Security UsernameToken.
#[derive(Debug, Clone, PartialEq)]
pub struct WssBasic {
    pub enabled: bool,
}

impl Default for WssBasic {
    fn default() -> Self {
        Self { enabled: true }
    }
}

wsp_core::impl_assertion!(WssBasic, &WSS_BASIC);

/// Bean mapping for `WssBasic` that switches to the legacy security token
/// shape when the writer asks for legacy compatibility.
#[derive(Debug, Clone)]
pub struct WssBasicMapping {
    bean: BeanTypeMapping,
}

impl WssBasicMapping {
    pub fn new() -> Self {
        let bean = BeanTypeMapping::new(&WSS_BASIC, "WssBasic", || Box::new(WssBasic::default()))
            .property(Property::enabled());
        Self { bean }
    }
}

impl Default for WssBasicMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeMapping for WssBasicMapping {
    fn mapped_type(&self) -> TypeRef {
        &WSS_BASIC
    }

    fn external_name(&self) -> &str {
        self.bean.external_name()
    }

    fn describe(&self) -> &'static str {
        "dual-shape"
    }

    fn validate(&self) -> Result<()> {
        self.bean.validate()
    }

    fn freeze(
        &self,
        cx: &mut WriteContext<'_>,
        value: &TypedValue,
        into: &mut Element,
    ) -> Result<()> {
        let legacy_shape = cx.legacy_compatible()
            && value.ty() == &WSS_BASIC
            && value.name().is_none()
            && value
                .value()
                .and_then(Value::as_object)
                .and_then(|object| object.as_any().downcast_ref::<WssBasic>())
                .is_some_and(|basic| basic.enabled);
        if !legacy_shape {
            return self.bean.freeze(cx, value, into);
        }
        trace!("writing WssBasic as a legacy security token");
        into.push_element(security_token_element(USERNAME_TOKEN));
        Ok(())
    }

    fn thaw(&self, cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        self.bean.thaw(cx, source)
    }
}

// =============================================================================
// X.509 SIGNATURE
// =============================================================================

/// Identifies which security header of a message is meant for this node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlSecurityRecipientContext {
    pub actor: Option<String>,
    pub base64ed_x509_certificate: Option<String>,
}

wsp_core::impl_policy_object!(XmlSecurityRecipientContext, &XML_SECURITY_RECIPIENT_CONTEXT);

/// Requires a message signed with an X.509 certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct RequireWssX509Cert {
    pub enabled: bool,
    pub allow_multiple_signatures: bool,
    pub recipient_context: Option<XmlSecurityRecipientContext>,
}

impl Default for RequireWssX509Cert {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_multiple_signatures: false,
            recipient_context: None,
        }
    }
}

wsp_core::impl_assertion!(RequireWssX509Cert, &REQUIRE_WSS_X509_CERT);

fn recipient_context_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(
        &XML_SECURITY_RECIPIENT_CONTEXT,
        "xmlSecurityRecipientContext",
        || Box::new(XmlSecurityRecipientContext::default()),
    )
    .properties([
        Property::new::<XmlSecurityRecipientContext>(
            "Actor",
            &STRING,
            |context| context.actor.clone().map(Value::Str),
            |context, value| {
                context.actor = opt_string_value(value)?;
                Ok(())
            },
        ),
        Property::new::<XmlSecurityRecipientContext>(
            "Base64edX509Certificate",
            &STRING,
            |context| context.base64ed_x509_certificate.clone().map(Value::Str),
            |context, value| {
                context.base64ed_x509_certificate = opt_string_value(value)?;
                Ok(())
            },
        ),
    ])
}

pub(crate) fn require_x509_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(&REQUIRE_WSS_X509_CERT, "RequireWssX509Cert", || {
        Box::new(RequireWssX509Cert::default())
    })
    .properties([
        Property::enabled(),
        Property::new::<RequireWssX509Cert>(
            "AllowMultipleSignatures",
            &BOOLEAN,
            |cert| Some(Value::Bool(cert.allow_multiple_signatures)),
            |cert, value| {
                cert.allow_multiple_signatures = bool_value(value)?;
                Ok(())
            },
        ),
        Property::new::<RequireWssX509Cert>(
            "RecipientContext",
            &XML_SECURITY_RECIPIENT_CONTEXT,
            |cert| {
                cert.recipient_context
                    .clone()
                    .map(|context| Value::Object(Box::new(context)))
            },
            |cert, value| {
                cert.recipient_context = object_value::<XmlSecurityRecipientContext>(value)?;
                Ok(())
            },
        ),
    ])
}

pub(crate) fn mappings(x509: Arc<dyn TypeMapping>) -> Vec<Arc<dyn TypeMapping>> {
    vec![
        Arc::new(http_basic_mapping()),
        Arc::new(WssBasicMapping::new()),
        x509,
        Arc::new(recipient_context_mapping()),
    ]
}
