//! Policy document reader.

use tracing::{debug, debug_span};

use crate::config::ReadOptions;
use crate::context::ReadContext;
use crate::dom::Element;
use crate::error::{Result, WspError};
use crate::model::{Assertion, Value};
use crate::registry::TypeMappingRegistry;
use crate::visitor::WspVisitor;
use crate::wire::{EXPORT, EXPORT_NAMESPACE, L7_NAMESPACE, POLICY, WSP_NAMESPACE};
use crate::xml;

fn is_policy(element: &Element) -> bool {
    element.is(WSP_NAMESPACE, POLICY) || element.is(L7_NAMESPACE, POLICY)
}

/// Finds the policy element: the document root itself or the policy inside
/// an export envelope.
pub fn locate_policy(root: &Element) -> Result<&Element> {
    if is_policy(root) {
        return Ok(root);
    }
    if root.is(EXPORT_NAMESPACE, EXPORT)
        && let Some(policy) = root.child_elements().find(|child| is_policy(child))
    {
        return Ok(policy);
    }
    Err(WspError::NotAPolicy {
        namespace: root.namespace().unwrap_or_default().to_string(),
        name: root.local_name().to_string(),
    })
}

/// Thaws policy documents into assertion trees.
pub struct PolicyReader<'r> {
    registry: &'r TypeMappingRegistry,
    options: ReadOptions,
}

impl<'r> PolicyReader<'r> {
    pub fn new(registry: &'r TypeMappingRegistry, options: ReadOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Parses `xml` and thaws the policy it contains.
    pub fn read_str(
        &self,
        xml: &str,
        visitor: &dyn WspVisitor,
    ) -> Result<Option<Box<dyn Assertion>>> {
        let document = xml::parse_with_limit(xml, self.options.max_depth.max(xml::MAX_NESTING))?;
        self.read_element(&document, visitor)
    }

    /// Thaws the policy rooted at `document`.
    ///
    /// An empty policy reads as `None`.
    ///
    /// # Errors
    ///
    /// Structural problems are always fatal. Resolution problems are handed
    /// to `visitor`, which decides whether the read continues.
    pub fn read_element(
        &self,
        document: &Element,
        visitor: &dyn WspVisitor,
    ) -> Result<Option<Box<dyn Assertion>>> {
        let policy = locate_policy(document)?;
        let _span = debug_span!("read_policy", root = policy.name.qualified()).entered();

        let mut children = policy.child_elements();
        let Some(first) = children.next() else {
            debug!("policy is empty");
            return Ok(None);
        };
        let extra = children.count();
        if extra > 0 {
            return Err(WspError::MultiplePolicyRoots { count: extra + 1 });
        }

        let mut cx = ReadContext::new(self.registry, visitor, self.options.max_depth);
        let thawed = cx.thaw_element(first)?;
        let root = match thawed.into_value() {
            Some(Value::Object(object)) => {
                let type_name = object.type_ref().name().to_string();
                object
                    .into_assertion()
                    .ok_or(WspError::NotAnAssertion { type_name })?
            }
            Some(other) => {
                return Err(WspError::NotAnAssertion {
                    type_name: other.describe(),
                });
            }
            None => {
                return Err(WspError::NotAnAssertion {
                    type_name: "null".to_string(),
                });
            }
        };

        if self.options.include_disabled {
            Ok(Some(root))
        } else {
            Ok(prune_disabled(root))
        }
    }
}

/// Removes disabled assertions from a tree.
///
/// Containers emptied by the removal are dropped as well; a container left
/// with a single child is replaced by that child. Containers that were
/// already empty, or lost nothing, are kept as they are.
pub fn prune_disabled(mut assertion: Box<dyn Assertion>) -> Option<Box<dyn Assertion>> {
    if !assertion.is_enabled() {
        return None;
    }
    let Some(children) = assertion.children_mut() else {
        return Some(assertion);
    };
    let before = children.len();
    let kept: Vec<_> = std::mem::take(children)
        .into_iter()
        .filter_map(prune_disabled)
        .collect();
    let removed = kept.len() < before;
    *children = kept;

    if !removed {
        return Some(assertion);
    }
    match children.len() {
        0 => None,
        1 => children.pop(),
        _ => Some(assertion),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompositeAssertion, UnknownAssertion};

    fn leaf(name: &str, enabled: bool) -> Box<dyn Assertion> {
        let mut unknown = UnknownAssertion::new(name, None);
        unknown.enabled = enabled;
        Box::new(unknown)
    }

    #[test]
    fn test_prune_collapses_single_survivor() {
        let tree = CompositeAssertion::all(vec![leaf("a", true), leaf("b", false)]);
        let pruned = prune_disabled(Box::new(tree)).expect("survivor");
        assert_eq!(&pruned, &leaf("a", true));
    }

    #[test]
    fn test_prune_drops_emptied_container() {
        let inner = CompositeAssertion::exactly_one(vec![leaf("x", false)]);
        let tree = CompositeAssertion::all(vec![Box::new(inner), leaf("a", true), leaf("b", true)]);
        let pruned = prune_disabled(Box::new(tree)).expect("tree");
        let expected: Box<dyn Assertion> =
            Box::new(CompositeAssertion::all(vec![leaf("a", true), leaf("b", true)]));
        assert_eq!(&pruned, &expected);
    }

    #[test]
    fn test_prune_keeps_untouched_containers() {
        let tree: Box<dyn Assertion> = Box::new(CompositeAssertion::one_or_more(vec![leaf(
            "only", true,
        )]));
        assert_eq!(prune_disabled(tree.clone()), Some(tree));

        let empty: Box<dyn Assertion> = Box::new(CompositeAssertion::all(Vec::new()));
        assert_eq!(prune_disabled(empty.clone()), Some(empty));
    }

    #[test]
    fn test_prune_disabled_root() {
        let tree = CompositeAssertion::all(vec![leaf("a", true)]).disabled();
        assert!(prune_disabled(Box::new(tree)).is_none());
    }

    #[test]
    fn test_locate_policy_in_export_envelope() {
        let document = xml::parse(&format!(
            r#"<exp:Export xmlns:exp="{EXPORT_NAMESPACE}"><exp:References/><wsp:Policy xmlns:wsp="{WSP_NAMESPACE}"/></exp:Export>"#
        ))
        .expect("parse");
        let policy = locate_policy(&document).expect("policy");
        assert_eq!(policy.local_name(), POLICY);
    }

    #[test]
    fn test_locate_policy_rejects_other_roots() {
        let document = xml::parse("<Policy/>").expect("parse");
        let err = locate_policy(&document).expect_err("no namespace");
        assert!(matches!(err, WspError::NotAPolicy { .. }));
    }
}
