//! Read-only mappings for retired wire names.

use std::sync::Arc;

use super::TypeMapping;
use crate::context::{ReadContext, WriteContext};
use crate::dom::Element;
use crate::error::{Result, WspError};
use crate::model::{TypeRef, TypedValue};

/// Thaws elements written under an old external name with the mapping
/// that replaced it. Belongs in the legacy table; never used for freeze.
#[derive(Debug, Clone)]
pub struct RenamedTypeMapping {
    old_name: String,
    current: Arc<dyn TypeMapping>,
}

impl RenamedTypeMapping {
    pub fn new(old_name: &str, current: Arc<dyn TypeMapping>) -> Self {
        Self {
            old_name: old_name.to_string(),
            current,
        }
    }
}

impl TypeMapping for RenamedTypeMapping {
    fn mapped_type(&self) -> TypeRef {
        self.current.mapped_type()
    }

    fn external_name(&self) -> &str {
        &self.old_name
    }

    fn describe(&self) -> &'static str {
        "renamed"
    }

    fn freeze(
        &self,
        _cx: &mut WriteContext<'_>,
        _value: &TypedValue,
        _into: &mut Element,
    ) -> Result<()> {
        Err(WspError::configuration(format!(
            "{} is a read-only legacy name",
            self.old_name
        )))
    }

    fn thaw(&self, cx: &mut ReadContext<'_>, source: &Element) -> Result<TypedValue> {
        self.current.thaw(cx, source)
    }
}
