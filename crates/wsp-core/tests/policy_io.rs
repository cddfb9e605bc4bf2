//! Integration tests for reading and writing policy documents.

mod common;

use common::{GuardAssertion, policy, registry};
use wsp_core::{
    Assertion, CompositeAssertion, ErrorKind, PermissiveVisitor, PolicyReader, PolicyWriter,
    ReadOptions, StrictVisitor, UnknownAssertion, WriteOptions, WspError, xml,
};

fn read_strict(xml: &str) -> Result<Option<Box<dyn Assertion>>, WspError> {
    let registry = registry();
    PolicyReader::new(&registry, ReadOptions::default()).read_str(xml, &StrictVisitor)
}

fn read_permissive(xml: &str) -> Result<Option<Box<dyn Assertion>>, WspError> {
    let registry = registry();
    PolicyReader::new(&registry, ReadOptions::default()).read_str(xml, &PermissiveVisitor::new())
}

fn write(tree: &dyn Assertion) -> String {
    let registry = registry();
    PolicyWriter::new(&registry, WriteOptions::default())
        .write(tree)
        .expect("write")
}

#[test]
fn test_write_canonical_document() {
    let configured: Box<dyn Assertion> = Box::new(GuardAssertion {
        enabled: true,
        realm: Some("secure".to_string()),
        limit: 5,
    });
    let tree = CompositeAssertion::all(vec![
        configured,
        GuardAssertion::disabled(),
        Box::new(GuardAssertion::default()),
    ]);

    insta::assert_snapshot!(write(&tree), @r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy" xmlns:wsp="http://schemas.xmlsoap.org/ws/2002/12/policy">
        <wsp:All wsp:Usage="Required">
            <L7p:Guard>
                <L7p:Limit intValue="5"/>
                <L7p:Realm stringValue="secure"/>
            </L7p:Guard>
            <L7p:Guard>
                <L7p:Enabled booleanValue="false"/>
            </L7p:Guard>
            <L7p:Guard/>
        </wsp:All>
    </wsp:Policy>
    "#);
}

#[test]
fn test_empty_policy_reads_as_none() {
    assert!(read_strict(&policy("")).expect("read").is_none());

    let registry = registry();
    let written = PolicyWriter::new(&registry, WriteOptions::default())
        .write_optional(None)
        .expect("write");
    assert!(read_strict(&written).expect("read").is_none());
}

#[test]
fn test_nested_tree_round_trips() {
    let tree: Box<dyn Assertion> = Box::new(CompositeAssertion::all(vec![
        GuardAssertion::realm("a & <b>"),
        Box::new(CompositeAssertion::exactly_one(vec![
            GuardAssertion::limit(-3),
            GuardAssertion::disabled(),
        ])),
        Box::new(CompositeAssertion::one_or_more(Vec::new()).disabled()),
    ]));

    let read = read_strict(&write(tree.as_ref())).expect("read");
    assert_eq!(read, Some(tree));
}

#[test]
fn test_multi_line_text_uses_reference_form() {
    let tree = GuardAssertion::realm("first line\nsecond line");
    let written = write(tree.as_ref());
    assert!(written.contains(r#"stringValueReference="inline""#));
    assert_eq!(read_strict(&written).expect("read"), Some(tree));
}

#[test]
fn test_default_properties_are_elided() {
    let written = write(&GuardAssertion::default());
    assert!(written.contains("<L7p:Guard/>"));
    assert!(!written.contains("Limit"));
    assert!(!written.contains("Enabled"));
}

#[test]
fn test_null_string_property() {
    let xml = policy(
        r#"<L7p:Guard>
            <L7p:Realm stringValueNull="null"/>
            <L7p:Limit intValue="7"/>
        </L7p:Guard>"#,
    );
    let read = read_strict(&xml).expect("read");
    assert_eq!(read, Some(GuardAssertion::limit(7)));
}

#[test]
fn test_legacy_namespaces_are_accepted() {
    let xml = r#"<L7p:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy">
        <L7p:All>
            <L7p:Guard><L7p:Limit intValue="1"/></L7p:Guard>
        </L7p:All>
    </L7p:Policy>"#;
    let read = read_strict(xml).expect("read");
    let expected: Box<dyn Assertion> =
        Box::new(CompositeAssertion::all(vec![GuardAssertion::limit(1)]));
    assert_eq!(read, Some(expected));
}

#[test]
fn test_export_envelope_is_unwrapped() {
    let xml = r#"<exp:Export xmlns:exp="http://www.layer7tech.com/ws/policy/export" Version="3.0">
        <exp:References/>
        <wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy" xmlns:wsp="http://schemas.xmlsoap.org/ws/2002/12/policy">
            <L7p:Guard/>
        </wsp:Policy>
    </exp:Export>"#;
    let read = read_strict(xml).expect("read");
    let expected: Box<dyn Assertion> = Box::new(GuardAssertion::default());
    assert_eq!(read, Some(expected));
}

#[test]
fn test_non_policy_root_is_rejected() {
    let err = read_strict("<Other/>").expect_err("not a policy");
    assert!(matches!(err, WspError::NotAPolicy { .. }));
}

#[test]
fn test_multiple_roots_are_structural() {
    let err = read_permissive(&policy("<L7p:Guard/><L7p:Guard/>")).expect_err("two roots");
    assert!(matches!(err, WspError::MultiplePolicyRoots { count: 2 }));
    assert_eq!(err.kind(), ErrorKind::Structural);
}

#[test]
fn test_strict_read_rejects_unknown_element() {
    let xml = policy(r#"<wsp:All wsp:Usage="Required"><L7p:Mystery/></wsp:All>"#);
    let err = read_strict(&xml).expect_err("unknown element");
    match err {
        WspError::InvalidPolicy { element, source } => {
            assert_eq!(element, "Mystery");
            assert!(matches!(*source, WspError::UnknownElement { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_strict_read_rejects_unknown_property() {
    let xml = policy(r#"<L7p:Guard><L7p:Limit stringValue="many"/></L7p:Guard>"#);
    let err = read_strict(&xml).expect_err("wrong property type");
    assert!(matches!(err, WspError::InvalidPolicy { .. }));
}

#[test]
fn test_permissive_read_drops_unknown_property() {
    let xml = policy(
        r#"<L7p:Guard>
            <L7p:Colour stringValue="blue"/>
            <L7p:Realm stringValue="kept"/>
        </L7p:Guard>"#,
    );
    let read = read_permissive(&xml).expect("read");
    assert_eq!(read, Some(GuardAssertion::realm("kept")));
}

#[test]
fn test_permissive_read_recovers_from_malformed_scalar() {
    let xml = policy(
        r#"<wsp:All wsp:Usage="Required">
            <L7p:Guard><L7p:Limit intValue="lots"/></L7p:Guard>
        </wsp:All>"#,
    );
    let read = read_permissive(&xml).expect("read").expect("tree");
    let children = read.children().expect("composite");
    assert_eq!(children.len(), 1);
    let guard = children[0]
        .as_any()
        .downcast_ref::<GuardAssertion>()
        .expect("guard survives");
    assert_eq!(guard.limit, 0);
}

#[test]
fn test_unknown_element_survives_round_trip() {
    let mystery = r#"<L7p:Mystery level="3"><L7p:Detail>text &amp; more</L7p:Detail></L7p:Mystery>"#;
    let xml = policy(&format!(
        r#"<wsp:All wsp:Usage="Required">{mystery}<L7p:Guard/></wsp:All>"#
    ));

    let first = read_permissive(&xml).expect("read").expect("tree");
    let children = first.children().expect("composite");
    let unknown = children[0]
        .as_any()
        .downcast_ref::<UnknownAssertion>()
        .expect("placeholder");
    assert_eq!(unknown.element_name.as_deref(), Some("Mystery"));
    let captured = unknown.original_xml.clone().expect("snapshot");
    assert!(captured.starts_with(r#"<L7p:Mystery level="3""#));

    let written = write(first.as_ref());
    assert!(written.contains(&captured));

    let second = read_permissive(&written).expect("reread").expect("tree");
    assert_eq!(&first, &second);
}

#[test]
fn test_strict_success_implies_identical_permissive_result() {
    let xml = policy(
        r#"<wsp:ExactlyOne wsp:Usage="Required">
            <L7p:Guard><L7p:Realm stringValue="x"/></L7p:Guard>
            <L7p:Guard><L7p:Enabled booleanValue="FALSE"/></L7p:Guard>
        </wsp:ExactlyOne>"#,
    );
    let strict = read_strict(&xml).expect("strict");
    let permissive = read_permissive(&xml).expect("permissive");
    assert!(strict.is_some());
    assert_eq!(strict, permissive);
}

#[test]
fn test_too_deep_nesting_is_rejected() {
    let depth = 200;
    let body = format!(
        "{}<L7p:Guard/>{}",
        r#"<wsp:All wsp:Usage="Required">"#.repeat(depth),
        "</wsp:All>".repeat(depth)
    );
    let err = read_permissive(&policy(&body)).expect_err("too deep");
    assert!(matches!(err, WspError::TooDeeplyNested { limit: 128 }));

    let mut tree: Box<dyn Assertion> = Box::new(GuardAssertion::default());
    for _ in 0..depth {
        tree = Box::new(CompositeAssertion::all(vec![tree]));
    }
    let registry = registry();
    let err = PolicyWriter::new(&registry, WriteOptions::default())
        .write(tree.as_ref())
        .expect_err("too deep");
    assert!(matches!(err, WspError::TooDeeplyNested { .. }));
}

#[test]
fn test_deep_document_is_rejected_while_parsing() {
    let depth = 200_000;
    let body = format!(
        "{}{}",
        r#"<wsp:All wsp:Usage="Required">"#.repeat(depth),
        "</wsp:All>".repeat(depth)
    );
    let err = read_strict(&policy(&body)).expect_err("too deep");
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert!(matches!(
        err,
        WspError::TooDeeplyNested {
            limit: xml::MAX_NESTING
        }
    ));
}

#[test]
fn test_deep_unknown_subtree_is_not_quarantined() {
    let nested = |depth: usize| {
        policy(&format!(
            r#"<wsp:All wsp:Usage="Required">{}{}</wsp:All>"#,
            "<L7p:Mystery>".repeat(depth),
            "</L7p:Mystery>".repeat(depth)
        ))
    };
    let registry = registry();
    let reader = PolicyReader::new(
        &registry,
        ReadOptions {
            max_depth: 8,
            ..ReadOptions::default()
        },
    );

    let err = reader
        .read_str(&nested(20), &PermissiveVisitor::new())
        .expect_err("too deep");
    assert!(matches!(err, WspError::TooDeeplyNested { limit: 8 }));

    let tree = reader
        .read_str(&nested(3), &PermissiveVisitor::new())
        .expect("read")
        .expect("tree");
    let children = tree.children().expect("composite");
    assert!(children[0].as_any().is::<UnknownAssertion>());
}

#[test]
fn test_omitting_disabled_assertions() {
    let xml = policy(
        r#"<wsp:All wsp:Usage="Required">
            <L7p:Guard><L7p:Enabled booleanValue="false"/></L7p:Guard>
            <L7p:Guard><L7p:Limit intValue="2"/></L7p:Guard>
        </wsp:All>"#,
    );
    let registry = registry();
    let options = ReadOptions {
        include_disabled: false,
        ..ReadOptions::default()
    };
    let read = PolicyReader::new(&registry, options)
        .read_str(&xml, &StrictVisitor)
        .expect("read");
    assert_eq!(read, Some(GuardAssertion::limit(2)));
}

#[test]
fn test_scalar_root_is_not_an_assertion() {
    let err = read_permissive(&policy(r#"<L7p:Realm stringValue="x"/>"#)).expect_err("scalar");
    assert!(matches!(err, WspError::NotAnAssertion { .. }));
}

#[test]
fn test_parsed_document_reads_like_text() {
    let xml = policy("<L7p:Guard/>");
    let document = xml::parse(&xml).expect("parse");
    let registry = registry();
    let reader = PolicyReader::new(&registry, ReadOptions::default());
    assert_eq!(
        reader.read_element(&document, &StrictVisitor).expect("element"),
        reader.read_str(&xml, &StrictVisitor).expect("text")
    );
}
