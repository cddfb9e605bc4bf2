//! HTTP routing.
//!
//! ```xml
//! <L7p:HttpRoutingAssertion>
//!     <L7p:ProtectedServiceUrl stringValue="http://backend/orders"/>
//!     <L7p:RequestHeaderRules httpPassthroughRuleSet="included">
//!         <L7p:Rules httpPassthroughRules="included">
//!             <L7p:item httpPassthroughRule="included">
//!                 <L7p:Name stringValue="X-Trace"/>
//!             </L7p:item>
//!         </L7p:Rules>
//!     </L7p:RequestHeaderRules>
//! </L7p:HttpRoutingAssertion>
//! ```

use std::sync::Arc;

use wsp_core::mapping::{ArrayTypeMapping, BeanTypeMapping};
use wsp_core::model::property::{bool_value, int_value, list_value, object_value, opt_string_value};
use wsp_core::model::types::{BOOLEAN, INT, STRING};
use wsp_core::{Property, PropertyError, TypeMapping, Value};

use crate::types::{
    HTTP_PASSTHROUGH_RULE, HTTP_PASSTHROUGH_RULE_ARRAY, HTTP_PASSTHROUGH_RULE_SET, HTTP_ROUTING,
};

pub const DEFAULT_MAX_CONNECTIONS: i32 = 100;

/// A header or parameter passed through to the back end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpPassthroughRule {
    pub name: Option<String>,
    /// Replacement value; `None` forwards the incoming value.
    pub value: Option<String>,
}

wsp_core::impl_policy_object!(HttpPassthroughRule, &HTTP_PASSTHROUGH_RULE);

impl HttpPassthroughRule {
    pub fn forward(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: None,
        }
    }

    pub fn replace(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpPassthroughRuleSet {
    pub forward_all: bool,
    pub rules: Vec<HttpPassthroughRule>,
}

wsp_core::impl_policy_object!(HttpPassthroughRuleSet, &HTTP_PASSTHROUGH_RULE_SET);

/// Routes the request to a protected service over HTTP.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRoutingAssertion {
    pub enabled: bool,
    pub protected_service_url: Option<String>,
    pub max_connections: i32,
    pub fail_on_error_status: bool,
    pub request_header_rules: HttpPassthroughRuleSet,
}

impl Default for HttpRoutingAssertion {
    fn default() -> Self {
        Self {
            enabled: true,
            protected_service_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            fail_on_error_status: true,
            request_header_rules: HttpPassthroughRuleSet::default(),
        }
    }
}

impl HttpRoutingAssertion {
    pub fn to_url(url: impl Into<String>) -> Self {
        Self {
            protected_service_url: Some(url.into()),
            ..Self::default()
        }
    }
}

wsp_core::impl_assertion!(HttpRoutingAssertion, &HTTP_ROUTING);

fn rules_to_value(rules: &[HttpPassthroughRule]) -> Value {
    Value::List(
        rules
            .iter()
            .map(|rule| Value::Object(Box::new(rule.clone())))
            .collect(),
    )
}

fn rules_from_value(value: Option<Value>) -> Result<Vec<HttpPassthroughRule>, PropertyError> {
    list_value(value)?
        .into_iter()
        .map(|item| object_value::<HttpPassthroughRule>(Some(item))?.ok_or(PropertyError::NullNotAllowed))
        .collect()
}

fn rule_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(&HTTP_PASSTHROUGH_RULE, "httpPassthroughRule", || {
        Box::new(HttpPassthroughRule::default())
    })
    .properties([
        Property::new::<HttpPassthroughRule>(
            "Name",
            &STRING,
            |rule| rule.name.clone().map(Value::Str),
            |rule, value| {
                rule.name = opt_string_value(value)?;
                Ok(())
            },
        ),
        Property::new::<HttpPassthroughRule>(
            "Value",
            &STRING,
            |rule| rule.value.clone().map(Value::Str),
            |rule, value| {
                rule.value = opt_string_value(value)?;
                Ok(())
            },
        ),
    ])
}

fn rule_set_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(&HTTP_PASSTHROUGH_RULE_SET, "httpPassthroughRuleSet", || {
        Box::new(HttpPassthroughRuleSet::default())
    })
    .properties([
        Property::new::<HttpPassthroughRuleSet>(
            "ForwardAll",
            &BOOLEAN,
            |set| Some(Value::Bool(set.forward_all)),
            |set, value| {
                set.forward_all = bool_value(value)?;
                Ok(())
            },
        ),
        Property::new::<HttpPassthroughRuleSet>(
            "Rules",
            &HTTP_PASSTHROUGH_RULE_ARRAY,
            |set| Some(rules_to_value(&set.rules)),
            |set, value| {
                set.rules = rules_from_value(value)?;
                Ok(())
            },
        ),
    ])
}

fn routing_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(&HTTP_ROUTING, "HttpRoutingAssertion", || {
        Box::new(HttpRoutingAssertion::default())
    })
    .properties([
        Property::enabled(),
        Property::new::<HttpRoutingAssertion>(
            "ProtectedServiceUrl",
            &STRING,
            |routing| routing.protected_service_url.clone().map(Value::Str),
            |routing, value| {
                routing.protected_service_url = opt_string_value(value)?;
                Ok(())
            },
        ),
        Property::new::<HttpRoutingAssertion>(
            "MaxConnections",
            &INT,
            |routing| Some(Value::Int(routing.max_connections)),
            |routing, value| {
                routing.max_connections = int_value(value)?;
                Ok(())
            },
        ),
        Property::new::<HttpRoutingAssertion>(
            "FailOnErrorStatus",
            &BOOLEAN,
            |routing| Some(Value::Bool(routing.fail_on_error_status)),
            |routing, value| {
                routing.fail_on_error_status = bool_value(value)?;
                Ok(())
            },
        ),
        Property::new::<HttpRoutingAssertion>(
            "RequestHeaderRules",
            &HTTP_PASSTHROUGH_RULE_SET,
            |routing| Some(Value::Object(Box::new(routing.request_header_rules.clone()))),
            |routing, value| {
                routing.request_header_rules =
                    object_value::<HttpPassthroughRuleSet>(value)?.unwrap_or_default();
                Ok(())
            },
        ),
    ])
}

pub(crate) fn mappings() -> Vec<Arc<dyn TypeMapping>> {
    vec![
        Arc::new(routing_mapping()),
        Arc::new(rule_set_mapping()),
        Arc::new(rule_mapping()),
        Arc::new(ArrayTypeMapping::new(
            &HTTP_PASSTHROUGH_RULE_ARRAY,
            &HTTP_PASSTHROUGH_RULE,
            "httpPassthroughRules",
        )),
    ]
}
