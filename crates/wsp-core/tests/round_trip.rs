//! Property tests: freeze followed by thaw reproduces the tree.

mod common;

use common::{GuardAssertion, registry};
use proptest::prelude::*;
use wsp_core::{
    Assertion, CompositeAssertion, CompositeKind, PermissiveVisitor, PolicyReader, PolicyWriter,
    ReadOptions, StrictVisitor, WriteOptions,
};

fn arb_guard() -> impl Strategy<Value = Box<dyn Assertion>> {
    (
        any::<bool>(),
        proptest::option::of("[a-zA-Z0-9&<>\"'./:]{1,16}|[a-z]{1,8}\n[a-z]{1,8}"),
        any::<i32>(),
    )
        .prop_map(|(enabled, realm, limit)| {
            Box::new(GuardAssertion {
                enabled,
                realm,
                limit,
            }) as Box<dyn Assertion>
        })
}

fn arb_tree() -> impl Strategy<Value = Box<dyn Assertion>> {
    arb_guard().prop_recursive(4, 32, 4, |inner| {
        (
            0..CompositeKind::ALL_KINDS.len(),
            any::<bool>(),
            proptest::collection::vec(inner, 0..4),
        )
            .prop_map(|(kind, enabled, children)| {
                let mut composite =
                    CompositeAssertion::new(CompositeKind::ALL_KINDS[kind]).with_children(children);
                composite.set_enabled(enabled);
                Box::new(composite) as Box<dyn Assertion>
            })
    })
}

proptest! {
    #[test]
    fn test_write_then_read_is_identity(tree in arb_tree()) {
        let registry = registry();
        let xml = PolicyWriter::new(&registry, WriteOptions::default())
            .write(tree.as_ref())
            .expect("write");
        let read = PolicyReader::new(&registry, ReadOptions::default())
            .read_str(&xml, &StrictVisitor)
            .expect("read");
        prop_assert_eq!(read, Some(tree));
    }

    #[test]
    fn test_permissive_matches_strict_on_valid_input(tree in arb_tree()) {
        let registry = registry();
        let xml = PolicyWriter::new(&registry, WriteOptions::default())
            .write(tree.as_ref())
            .expect("write");
        let reader = PolicyReader::new(&registry, ReadOptions::default());
        let strict = reader.read_str(&xml, &StrictVisitor).expect("strict");
        let permissive = reader
            .read_str(&xml, &PermissiveVisitor::new())
            .expect("permissive");
        prop_assert_eq!(strict, permissive);
    }
}
