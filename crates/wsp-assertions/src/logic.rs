//! Constant assertions.

use std::sync::Arc;

use wsp_core::mapping::BeanTypeMapping;
use wsp_core::{Property, TypeMapping};

use crate::types::{FALSE_ASSERTION, TRUE_ASSERTION};

/// Always succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct TrueAssertion {
    pub enabled: bool,
}

impl Default for TrueAssertion {
    fn default() -> Self {
        Self { enabled: true }
    }
}

wsp_core::impl_assertion!(TrueAssertion, &TRUE_ASSERTION);

/// Always fails.
#[derive(Debug, Clone, PartialEq)]
pub struct FalseAssertion {
    pub enabled: bool,
}

impl Default for FalseAssertion {
    fn default() -> Self {
        Self { enabled: true }
    }
}

wsp_core::impl_assertion!(FalseAssertion, &FALSE_ASSERTION);

pub(crate) fn mappings() -> Vec<Arc<dyn TypeMapping>> {
    vec![
        Arc::new(
            BeanTypeMapping::new(&TRUE_ASSERTION, "TrueAssertion", || {
                Box::new(TrueAssertion::default())
            })
            .property(Property::enabled()),
        ),
        Arc::new(
            BeanTypeMapping::new(&FALSE_ASSERTION, "FalseAssertion", || {
                Box::new(FalseAssertion::default())
            })
            .property(Property::enabled()),
        ),
    ]
}
