//! Policy document writer.

use tracing::debug_span;

use crate::config::WriteOptions;
use crate::context::WriteContext;
use crate::dom::{Element, QName};
use crate::error::Result;
use crate::model::{Assertion, PolicyObject};
use crate::registry::TypeMappingRegistry;
use crate::wire::{L7_NAMESPACE, L7_PREFIX, POLICY, WSP_NAMESPACE, WSP_PREFIX};
use crate::xml;

/// Empty `wsp:Policy` element declaring both namespaces.
pub fn policy_skeleton() -> Element {
    let mut policy = Element::new(QName::wsp(POLICY));
    policy.declare_namespace(Some(L7_PREFIX), L7_NAMESPACE);
    policy.declare_namespace(Some(WSP_PREFIX), WSP_NAMESPACE);
    policy
}

/// Freezes assertion trees into policy documents.
pub struct PolicyWriter<'r> {
    registry: &'r TypeMappingRegistry,
    options: WriteOptions,
}

impl<'r> PolicyWriter<'r> {
    pub fn new(registry: &'r TypeMappingRegistry, options: WriteOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Freezes `policy` under a fresh `wsp:Policy` element. `None` yields an
    /// empty policy.
    ///
    /// # Errors
    ///
    /// Fails if any assertion in the tree has no mapping.
    pub fn write_element(&self, policy: Option<&dyn Assertion>) -> Result<Element> {
        let mut document = policy_skeleton();
        let Some(policy) = policy else {
            return Ok(document);
        };
        debug_span!("write_policy", root = policy.type_ref().name()).in_scope(|| {
            let mut cx = WriteContext::new(self.registry, &self.options);
            let root: &dyn PolicyObject = policy;
            cx.freeze_object(root, &mut document)
        })?;
        Ok(document)
    }

    /// Freezes `policy` and serializes the document.
    pub fn write(&self, policy: &dyn Assertion) -> Result<String> {
        self.write_optional(Some(policy))
    }

    pub fn write_optional(&self, policy: Option<&dyn Assertion>) -> Result<String> {
        xml::to_document(&self.write_element(policy)?)
    }
}
