//! Custom assertions: a holder carrying a pluggable payload.
//!
//! The payload property is declared with the abstract `CustomAssertion`
//! type. Concrete payload kinds are not in the primary table; they are found
//! through the holder's subtype finder, through a mapping the payload type
//! supplies itself, or through a finder registered on the registry.

use std::sync::{Arc, OnceLock};

use wsp_core::mapping::{AbstractTypeMapping, BeanTypeMapping};
use wsp_core::model::property::{dyn_object_value, int_value, opt_string_value, string_list_value};
use wsp_core::model::types::{INT, STRING, STRING_ARRAY};
use wsp_core::{
    MappingTable, PolicyObject, Property, Result, TypeMapping, TypeMappingFinder, TypeRef, Value,
};

use crate::types::{
    CLIENT_IP_CUSTOM, CUSTOM_ASSERTION, CUSTOM_ASSERTION_HOLDER, RATE_LIMIT_CUSTOM,
};

// =============================================================================
// PAYLOADS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitCustomAssertion {
    pub max_requests: i32,
    pub window_seconds: i32,
}

wsp_core::impl_policy_object!(RateLimitCustomAssertion, &RATE_LIMIT_CUSTOM);

/// Payload that carries its own mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientIpCustomAssertion {
    pub allowed_ranges: Vec<String>,
}

impl PolicyObject for ClientIpCustomAssertion {
    fn type_ref(&self) -> TypeRef {
        &CLIENT_IP_CUSTOM
    }

    fn type_mapping(&self) -> Option<Arc<dyn TypeMapping>> {
        Some(client_ip_mapping())
    }
}

fn rate_limit_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(&RATE_LIMIT_CUSTOM, "RateLimitCustomAssertion", || {
        Box::new(RateLimitCustomAssertion::default())
    })
    .properties([
        Property::new::<RateLimitCustomAssertion>(
            "MaxRequests",
            &INT,
            |limit| Some(Value::Int(limit.max_requests)),
            |limit, value| {
                limit.max_requests = int_value(value)?;
                Ok(())
            },
        ),
        Property::new::<RateLimitCustomAssertion>(
            "WindowSeconds",
            &INT,
            |limit| Some(Value::Int(limit.window_seconds)),
            |limit, value| {
                limit.window_seconds = int_value(value)?;
                Ok(())
            },
        ),
    ])
}

static CLIENT_IP_MAPPING: OnceLock<Arc<dyn TypeMapping>> = OnceLock::new();

fn client_ip_mapping() -> Arc<dyn TypeMapping> {
    CLIENT_IP_MAPPING
        .get_or_init(|| {
            Arc::new(
                BeanTypeMapping::new(&CLIENT_IP_CUSTOM, "ClientIpCustomAssertion", || {
                    Box::new(ClientIpCustomAssertion::default())
                })
                .property(Property::new::<ClientIpCustomAssertion>(
                    "AllowedRanges",
                    &STRING_ARRAY,
                    |ip| {
                        Some(Value::List(
                            ip.allowed_ranges.iter().cloned().map(Value::Str).collect(),
                        ))
                    },
                    |ip, value| {
                        ip.allowed_ranges = string_list_value(value)?;
                        Ok(())
                    },
                )),
            )
        })
        .clone()
}

/// Finder for payload kinds that are registered on the registry rather
/// than on the holder.
pub fn extension_finder() -> Result<Arc<dyn TypeMappingFinder>> {
    Ok(Arc::new(MappingTable::from_mappings([client_ip_mapping()])?))
}

// =============================================================================
// HOLDER
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CustomAssertionHolder {
    pub enabled: bool,
    pub category: Option<String>,
    pub custom_assertion: Option<Box<dyn PolicyObject>>,
}

impl Default for CustomAssertionHolder {
    fn default() -> Self {
        Self {
            enabled: true,
            category: None,
            custom_assertion: None,
        }
    }
}

impl CustomAssertionHolder {
    pub fn holding(payload: impl PolicyObject) -> Self {
        Self {
            custom_assertion: Some(Box::new(payload)),
            ..Self::default()
        }
    }
}

wsp_core::impl_assertion!(CustomAssertionHolder, &CUSTOM_ASSERTION_HOLDER);

fn holder_mapping() -> Result<BeanTypeMapping> {
    let payloads = MappingTable::from_mappings([Arc::new(rate_limit_mapping()) as Arc<dyn TypeMapping>])?;
    Ok(
        BeanTypeMapping::new(&CUSTOM_ASSERTION_HOLDER, "CustomAssertion", || {
            Box::new(CustomAssertionHolder::default())
        })
        .properties([
            Property::enabled(),
            Property::new::<CustomAssertionHolder>(
                "Category",
                &STRING,
                |holder| holder.category.clone().map(Value::Str),
                |holder, value| {
                    holder.category = opt_string_value(value)?;
                    Ok(())
                },
            ),
            Property::new::<CustomAssertionHolder>(
                "CustomAssertion",
                &CUSTOM_ASSERTION,
                |holder| holder.custom_assertion.clone().map(Value::Object),
                |holder, value| {
                    holder.custom_assertion = dyn_object_value(value)?;
                    Ok(())
                },
            ),
        ])
        .subtype_finder(Arc::new(payloads)),
    )
}

pub(crate) fn mappings() -> Result<Vec<Arc<dyn TypeMapping>>> {
    Ok(vec![
        Arc::new(holder_mapping()?),
        Arc::new(AbstractTypeMapping::new(&CUSTOM_ASSERTION, "customAssertionData")),
    ])
}
