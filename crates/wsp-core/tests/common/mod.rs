//! Test vocabulary shared by the integration suites.

#![allow(dead_code)]

use std::sync::Arc;

use wsp_core::mapping::BeanTypeMapping;
use wsp_core::model::property::{int_value, opt_string_value};
use wsp_core::model::types::{ASSERTION, INT, STRING};
use wsp_core::{Assertion, Property, TypeInfo, TypeMappingRegistry, Value};

pub static GUARD: TypeInfo = TypeInfo::new("GuardAssertion", Some(&ASSERTION));

/// Leaf assertion with one nullable and one primitive property.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardAssertion {
    pub enabled: bool,
    pub realm: Option<String>,
    pub limit: i32,
}

impl Default for GuardAssertion {
    fn default() -> Self {
        Self {
            enabled: true,
            realm: None,
            limit: 0,
        }
    }
}

wsp_core::impl_assertion!(GuardAssertion, &GUARD);

impl GuardAssertion {
    pub fn realm(realm: &str) -> Box<dyn Assertion> {
        Box::new(Self {
            realm: Some(realm.to_string()),
            ..Self::default()
        })
    }

    pub fn limit(limit: i32) -> Box<dyn Assertion> {
        Box::new(Self {
            limit,
            ..Self::default()
        })
    }

    pub fn disabled() -> Box<dyn Assertion> {
        Box::new(Self {
            enabled: false,
            ..Self::default()
        })
    }
}

pub fn guard_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(&GUARD, "Guard", || Box::new(GuardAssertion::default())).properties([
        Property::enabled(),
        Property::new::<GuardAssertion>(
            "Realm",
            &STRING,
            |guard| guard.realm.clone().map(Value::Str),
            |guard, value| {
                guard.realm = opt_string_value(value)?;
                Ok(())
            },
        ),
        Property::new::<GuardAssertion>(
            "Limit",
            &INT,
            |guard| Some(Value::Int(guard.limit)),
            |guard, value| {
                guard.limit = int_value(value)?;
                Ok(())
            },
        ),
    ])
}

pub fn registry() -> TypeMappingRegistry {
    TypeMappingRegistry::builder()
        .mapping(Arc::new(guard_mapping()))
        .build()
        .expect("registry")
}

pub fn policy(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy" xmlns:wsp="http://schemas.xmlsoap.org/ws/2002/12/policy">
{body}
</wsp:Policy>"#
    )
}
