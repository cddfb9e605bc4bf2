//! E-mail alert.
//!
//! `SmtpPort` has a second, write-only entry taking text: older policies
//! stored the port as `<L7p:SmtpPort stringValue="2525"/>`.

use std::sync::Arc;

use wsp_core::mapping::{BeanTypeMapping, EnumTypeMapping};
use wsp_core::model::property::{enum_value, int_value, opt_string_value, string_value};
use wsp_core::model::types::{INT, STRING};
use wsp_core::{Property, PropertyError, TypeMapping, Value, WireEnum};

use crate::types::{EMAIL_ALERT, EMAIL_PROTOCOL};

pub const DEFAULT_SMTP_PORT: i32 = 25;

/// Transport security used to reach the mail server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Protocol {
    #[default]
    Plaintext,
    Ssl,
    StartTls,
}

impl WireEnum for Protocol {
    fn all() -> &'static [Self] {
        &[Protocol::Plaintext, Protocol::Ssl, Protocol::StartTls]
    }

    fn wire_name(self) -> &'static str {
        match self {
            Protocol::Plaintext => "PLAINTEXT",
            Protocol::Ssl => "SSL",
            Protocol::StartTls => "STARTTLS",
        }
    }
}

/// Sends an e-mail when the policy reaches this point.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailAlertAssertion {
    pub enabled: bool,
    /// Comma separated recipients.
    pub target_email_address: Option<String>,
    pub source_email_address: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: i32,
    pub protocol: Protocol,
}

impl Default for EmailAlertAssertion {
    fn default() -> Self {
        Self {
            enabled: true,
            target_email_address: None,
            source_email_address: None,
            subject: None,
            message: None,
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
            protocol: Protocol::default(),
        }
    }
}

wsp_core::impl_assertion!(EmailAlertAssertion, &EMAIL_ALERT);

fn parse_port(text: &str) -> Result<i32, PropertyError> {
    text.trim()
        .parse()
        .map_err(|_| PropertyError::Invalid(format!("invalid SMTP port {text:?}")))
}

fn alert_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(&EMAIL_ALERT, "EmailAlert", || {
        Box::new(EmailAlertAssertion::default())
    })
    .properties([
        Property::enabled(),
        Property::new::<EmailAlertAssertion>(
            "TargetEmailAddress",
            &STRING,
            |alert| alert.target_email_address.clone().map(Value::Str),
            |alert, value| {
                alert.target_email_address = opt_string_value(value)?;
                Ok(())
            },
        ),
        Property::new::<EmailAlertAssertion>(
            "SourceEmailAddress",
            &STRING,
            |alert| alert.source_email_address.clone().map(Value::Str),
            |alert, value| {
                alert.source_email_address = opt_string_value(value)?;
                Ok(())
            },
        ),
        Property::new::<EmailAlertAssertion>(
            "Subject",
            &STRING,
            |alert| alert.subject.clone().map(Value::Str),
            |alert, value| {
                alert.subject = opt_string_value(value)?;
                Ok(())
            },
        ),
        Property::new::<EmailAlertAssertion>(
            "Message",
            &STRING,
            |alert| alert.message.clone().map(Value::Str),
            |alert, value| {
                alert.message = opt_string_value(value)?;
                Ok(())
            },
        ),
        Property::new::<EmailAlertAssertion>(
            "SmtpHost",
            &STRING,
            |alert| alert.smtp_host.clone().map(Value::Str),
            |alert, value| {
                alert.smtp_host = opt_string_value(value)?;
                Ok(())
            },
        ),
        Property::new::<EmailAlertAssertion>(
            "SmtpPort",
            &INT,
            |alert| Some(Value::Int(alert.smtp_port)),
            |alert, value| {
                alert.smtp_port = int_value(value)?;
                Ok(())
            },
        ),
        Property::write_only::<EmailAlertAssertion>("SmtpPort", &STRING, |alert, value| {
            alert.smtp_port = parse_port(&string_value(value)?)?;
            Ok(())
        }),
        Property::new::<EmailAlertAssertion>(
            "Protocol",
            &EMAIL_PROTOCOL,
            |alert| Some(Value::Enum(alert.protocol.wire_name())),
            |alert, value| {
                alert.protocol = enum_value::<Protocol>(value)?.unwrap_or_default();
                Ok(())
            },
        ),
    ])
}

pub(crate) fn mappings() -> Vec<Arc<dyn TypeMapping>> {
    vec![
        Arc::new(alert_mapping()),
        Arc::new(EnumTypeMapping::new::<Protocol>(&EMAIL_PROTOCOL, "emailProtocol")),
    ]
}
