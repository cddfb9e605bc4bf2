//! Integration tests for structural failures and name resolution fallbacks.

mod common;

use std::sync::Arc;

use common::{GuardAssertion, guard_mapping, policy};
use wsp_core::mapping::{AbstractTypeMapping, BeanTypeMapping};
use wsp_core::model::property::{dyn_object_value, string_list_value};
use wsp_core::model::types::{ASSERTION, OBJECT, STRING_ARRAY};
use wsp_core::{
    Assertion, ErrorKind, InterceptingVisitor, MappingTable, PermissiveVisitor, PolicyObject,
    PolicyReader, PolicyWriter, Property, ReadOptions, StrictVisitor, TypeInfo, TypeMapping,
    TypeMappingRegistry, UnknownAssertion, Value, WriteOptions, WspError, WspVisitor,
};

static PAYLOAD: TypeInfo = TypeInfo::new("Payload", Some(&OBJECT));
static OPAQUE_PAYLOAD: TypeInfo = TypeInfo::new("OpaquePayload", Some(&PAYLOAD));
static CARRIER: TypeInfo = TypeInfo::new("CarrierAssertion", Some(&ASSERTION));
static ROSTER: TypeInfo = TypeInfo::new("RosterAssertion", Some(&ASSERTION));
static BEACON: TypeInfo = TypeInfo::new("BeaconAssertion", Some(&ASSERTION));

/// Payload whose runtime type is itself mapped polymorphically.
#[derive(Debug, Clone, PartialEq)]
struct OpaquePayload;

wsp_core::impl_policy_object!(OpaquePayload, &OPAQUE_PAYLOAD);

#[derive(Debug, Clone, PartialEq)]
struct CarrierAssertion {
    enabled: bool,
    payload: Option<Box<dyn PolicyObject>>,
}

impl Default for CarrierAssertion {
    fn default() -> Self {
        Self {
            enabled: true,
            payload: None,
        }
    }
}

wsp_core::impl_assertion!(CarrierAssertion, &CARRIER);

#[derive(Debug, Clone, PartialEq)]
struct RosterAssertion {
    enabled: bool,
    names: Vec<String>,
}

impl Default for RosterAssertion {
    fn default() -> Self {
        Self {
            enabled: true,
            names: Vec::new(),
        }
    }
}

wsp_core::impl_assertion!(RosterAssertion, &ROSTER);

#[derive(Debug, Clone, PartialEq)]
struct BeaconAssertion {
    enabled: bool,
}

impl Default for BeaconAssertion {
    fn default() -> Self {
        Self { enabled: true }
    }
}

wsp_core::impl_assertion!(BeaconAssertion, &BEACON);

fn carrier_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(&CARRIER, "Carrier", || Box::new(CarrierAssertion::default()))
        .properties([
            Property::enabled(),
            Property::new::<CarrierAssertion>(
                "Payload",
                &PAYLOAD,
                |carrier| carrier.payload.clone().map(Value::Object),
                |carrier, value| {
                    carrier.payload = dyn_object_value(value)?;
                    Ok(())
                },
            ),
        ])
}

fn roster_mapping() -> BeanTypeMapping {
    BeanTypeMapping::new(&ROSTER, "Roster", || Box::new(RosterAssertion::default())).properties([
        Property::enabled(),
        Property::new::<RosterAssertion>(
            "Names",
            &STRING_ARRAY,
            |roster| {
                Some(Value::List(
                    roster.names.iter().cloned().map(Value::Str).collect(),
                ))
            },
            |roster, value| {
                roster.names = string_list_value(value)?;
                Ok(())
            },
        ),
    ])
}

fn beacon_finder() -> Arc<MappingTable> {
    let beacon =
        BeanTypeMapping::new(&BEACON, "Beacon", || Box::new(BeaconAssertion::default()))
            .property(Property::enabled());
    let table = MappingTable::from_mappings([Arc::new(beacon) as Arc<dyn TypeMapping>]);
    Arc::new(table.expect("table"))
}

fn registry() -> TypeMappingRegistry {
    TypeMappingRegistry::builder()
        .mapping(Arc::new(guard_mapping()))
        .mapping(Arc::new(carrier_mapping()))
        .mapping(Arc::new(roster_mapping()))
        .mapping(Arc::new(AbstractTypeMapping::new(&PAYLOAD, "payloadData")))
        .mapping(Arc::new(AbstractTypeMapping::new(
            &OPAQUE_PAYLOAD,
            "opaquePayloadData",
        )))
        .build()
        .expect("registry")
}

fn read(xml: &str, visitor: &dyn WspVisitor) -> Result<Option<Box<dyn Assertion>>, WspError> {
    let registry = registry();
    PolicyReader::new(&registry, ReadOptions::default()).read_str(xml, visitor)
}

// =============================================================================
// DELEGATION LOOPS
// =============================================================================

#[test]
fn test_abstract_payload_written_through_abstract_mapping_is_a_loop() {
    let carrier = CarrierAssertion {
        enabled: true,
        payload: Some(Box::new(OpaquePayload)),
    };
    let registry = registry();
    let err = PolicyWriter::new(&registry, WriteOptions::default())
        .write(&carrier)
        .expect_err("loop");
    assert_eq!(err.kind(), ErrorKind::Structural);
    match err {
        WspError::DelegationLoop { from, to } => {
            assert_eq!(from, "payloadData");
            assert_eq!(to, "opaquePayloadData");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_abstract_payload_read_through_abstract_mapping_is_a_loop() {
    let xml = policy(
        r#"<L7p:Carrier>
            <L7p:Payload payloadData="included">
                <L7p:Inner opaquePayloadData="included"/>
            </L7p:Payload>
        </L7p:Carrier>"#,
    );
    for visitor in [&StrictVisitor as &dyn WspVisitor, &PermissiveVisitor::new()] {
        let err = read(&xml, visitor).expect_err("loop");
        assert!(matches!(err, WspError::DelegationLoop { .. }), "{err}");
    }
}

#[test]
fn test_missing_payload_reads_as_null() {
    let xml = policy(r#"<L7p:Carrier><L7p:Payload payloadDataNull="null"/></L7p:Carrier>"#);
    let read = read(&xml, &StrictVisitor).expect("read");
    let expected: Box<dyn Assertion> = Box::new(CarrierAssertion::default());
    assert_eq!(read, Some(expected));
}

// =============================================================================
// COLLECTION MEMBERS
// =============================================================================

#[test]
fn test_collection_member_of_wrong_type_is_fatal() {
    let xml = policy(
        r#"<L7p:Roster>
            <L7p:Names stringArrayValue="included">
                <L7p:item stringValue="ada"/>
                <L7p:item intValue="3"/>
            </L7p:Names>
        </L7p:Roster>"#,
    );
    for visitor in [&StrictVisitor as &dyn WspVisitor, &PermissiveVisitor::new()] {
        let err = read(&xml, visitor).expect_err("incompatible");
        assert_eq!(err.kind(), ErrorKind::Structural);
        match err {
            WspError::IncompatibleMember {
                collection,
                expected,
                found,
            } => {
                assert_eq!(collection, "stringArrayValue");
                assert_eq!(expected, "String");
                assert_eq!(found, "int");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn test_collection_round_trip() {
    let roster = RosterAssertion {
        enabled: true,
        names: vec!["ada".to_string(), "grace".to_string()],
    };
    let registry = registry();
    let xml = PolicyWriter::new(&registry, WriteOptions::default())
        .write(&roster)
        .expect("write");
    assert!(xml.contains(r#"<L7p:item stringValue="grace"/>"#), "{xml}");
    let read = read(&xml, &StrictVisitor).expect("read");
    let expected: Box<dyn Assertion> = Box::new(roster);
    assert_eq!(read, Some(expected));
}

// =============================================================================
// VISITOR-SUPPLIED FINDER
// =============================================================================

#[test]
fn test_visitor_finder_resolves_unregistered_names() {
    let xml = policy(
        r#"<wsp:All wsp:Usage="Required">
            <L7p:Beacon><L7p:Enabled booleanValue="false"/></L7p:Beacon>
            <L7p:Guard/>
        </wsp:All>"#,
    );

    let visitor = PermissiveVisitor::with_finder(beacon_finder());
    let tree = read(&xml, &visitor).expect("read").expect("tree");
    let children = tree.children().expect("composite");
    assert_eq!(
        children[0].as_any().downcast_ref::<BeaconAssertion>(),
        Some(&BeaconAssertion { enabled: false })
    );
    assert!(children[1].as_any().is::<GuardAssertion>());

    let shimmed = InterceptingVisitor::new(visitor, Vec::new());
    assert_eq!(read(&xml, &shimmed).expect("read"), Some(tree));
}

#[test]
fn test_without_finder_unregistered_names_are_unknown() {
    let xml = policy("<L7p:Beacon/>");

    let err = read(&xml, &StrictVisitor).expect_err("unknown");
    assert!(matches!(err, WspError::InvalidPolicy { .. }));

    let read = read(&xml, &PermissiveVisitor::new()).expect("read").expect("tree");
    let unknown = read
        .as_any()
        .downcast_ref::<UnknownAssertion>()
        .expect("placeholder");
    assert_eq!(unknown.element_name.as_deref(), Some("Beacon"));
}
