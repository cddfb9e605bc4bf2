//! Integration tests for the reference assertion catalogue.

use wsp_assertions::{
    ClientIpCustomAssertion, CustomAssertionHolder, EmailAlertAssertion, FalseAssertion,
    HttpBasic, HttpPassthroughRule, HttpRoutingAssertion, Protocol, RateLimitCustomAssertion,
    RequireWssX509Cert, SqlAttackAssertion, SqlProtection, TrueAssertion,
    XmlSecurityRecipientContext, read_permissive, read_strict, read_with_options,
    write_policy, write_with_options,
};
use wsp_core::{
    Assertion, CompositeAssertion, ErrorKind, ReadOptions, UnknownAssertion, Version,
    WriteOptions, WspError,
};

fn policy(body: &str) -> String {
    format!(
        r#"<wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy" xmlns:wsp="http://schemas.xmlsoap.org/ws/2002/12/policy">{body}</wsp:Policy>"#
    )
}

fn round_trip(tree: Box<dyn Assertion>) {
    let written = write_policy(tree.as_ref()).expect("write");
    let read = read_strict(&written).expect("read");
    assert_eq!(read, Some(tree), "document was:\n{written}");
}

#[test]
fn test_write_container_with_disabled_child() {
    let tree = CompositeAssertion::all(vec![
        Box::new(HttpBasic::with_realm("intranet")),
        Box::new(SqlAttackAssertion::protecting([
            SqlProtection::Meta,
            SqlProtection::MsSql,
            SqlProtection::Oracle,
        ])),
        Box::new(FalseAssertion { enabled: false }),
    ]);

    insta::assert_snapshot!(write_policy(&tree).expect("write"), @r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy" xmlns:wsp="http://schemas.xmlsoap.org/ws/2002/12/policy">
        <wsp:All wsp:Usage="Required">
            <L7p:HttpBasic>
                <L7p:Realm stringValue="intranet"/>
            </L7p:HttpBasic>
            <L7p:SqlAttackProtection>
                <L7p:Protections sqlProtectionSet="SqlMsSql,SqlOracle,SqlMeta"/>
            </L7p:SqlAttackProtection>
            <L7p:FalseAssertion>
                <L7p:Enabled booleanValue="false"/>
            </L7p:FalseAssertion>
        </wsp:All>
    </wsp:Policy>
    "#);
}

#[test]
fn test_null_realm_reads_as_none() {
    let xml = policy(r#"<L7p:HttpBasic><L7p:Realm stringValueNull="null"/></L7p:HttpBasic>"#);
    let expected: Box<dyn Assertion> = Box::new(HttpBasic::default());
    assert_eq!(read_strict(&xml).expect("read"), Some(expected));
}

#[test]
fn test_mistyped_property_strict_fails_permissive_keeps_default() {
    let xml = policy(
        r#"<L7p:EmailAlert>
            <L7p:SmtpHost stringValue="mail.example.com"/>
            <L7p:SmtpPort stringValue="hello"/>
        </L7p:EmailAlert>"#,
    );

    let err = read_strict(&xml).expect_err("strict read should fail");
    let WspError::InvalidPolicy { source, .. } = &err else {
        panic!("expected an escalated error, got {err:?}");
    };
    assert!(matches!(**source, WspError::UnknownProperty { .. }), "{source:?}");
    assert_eq!(source.kind(), ErrorKind::Resolution);

    let read = read_permissive(&xml).expect("read").expect("policy");
    let alert = read
        .as_any()
        .downcast_ref::<EmailAlertAssertion>()
        .expect("email alert");
    assert_eq!(alert.smtp_port, 25);
    assert_eq!(alert.smtp_host.as_deref(), Some("mail.example.com"));
}

#[test]
fn test_enum_set_reads_in_any_order() {
    let xml = policy(
        r#"<L7p:SqlAttackProtection>
            <L7p:Protections sqlProtectionSet="SqlMeta,SqlOracle,SqlMsSql"/>
        </L7p:SqlAttackProtection>"#,
    );
    let expected: Box<dyn Assertion> = Box::new(SqlAttackAssertion::protecting([
        SqlProtection::MsSql,
        SqlProtection::Oracle,
        SqlProtection::Meta,
    ]));
    assert_eq!(read_strict(&xml).expect("read"), Some(expected));
}

#[test]
fn test_two_policy_children_is_structural_in_both_modes() {
    let xml = policy("<L7p:TrueAssertion/><L7p:FalseAssertion/>");
    for err in [
        read_strict(&xml).expect_err("strict"),
        read_permissive(&xml).expect_err("permissive"),
    ] {
        assert!(matches!(err, WspError::MultiplePolicyRoots { count: 2 }), "{err:?}");
        assert!(!err.is_recoverable());
    }
}

#[test]
fn test_email_alert_round_trip() {
    round_trip(Box::new(EmailAlertAssertion {
        target_email_address: Some("ops@example.com, oncall@example.com".to_string()),
        source_email_address: Some("gateway@example.com".to_string()),
        subject: Some("Policy ${policy.name} failed".to_string()),
        message: Some("Request rejected.\nSee the audit log for details.".to_string()),
        smtp_host: Some("mail.example.com".to_string()),
        smtp_port: 587,
        protocol: Protocol::StartTls,
        ..EmailAlertAssertion::default()
    }));
}

#[test]
fn test_smtp_port_written_as_integer() {
    let alert = EmailAlertAssertion {
        smtp_port: 2525,
        ..EmailAlertAssertion::default()
    };
    let written = write_policy(&alert).expect("write");
    assert!(written.contains(r#"<L7p:SmtpPort intValue="2525"/>"#), "{written}");
}

#[test]
fn test_smtp_port_accepts_text() {
    let xml = policy(r#"<L7p:EmailAlert><L7p:SmtpPort stringValue=" 2525 "/></L7p:EmailAlert>"#);
    let expected: Box<dyn Assertion> = Box::new(EmailAlertAssertion {
        smtp_port: 2525,
        ..EmailAlertAssertion::default()
    });
    assert_eq!(read_strict(&xml).expect("read"), Some(expected));
}

#[test]
fn test_unknown_protocol_reads_as_default() {
    let xml = policy(r#"<L7p:EmailAlert><L7p:Protocol emailProtocol="TLS13"/></L7p:EmailAlert>"#);
    let read = read_strict(&xml).expect("read").expect("policy");
    let alert = read
        .as_any()
        .downcast_ref::<EmailAlertAssertion>()
        .expect("email alert");
    assert_eq!(alert.protocol, Protocol::Plaintext);
}

#[test]
fn test_recipient_context_round_trip() {
    round_trip(Box::new(RequireWssX509Cert {
        allow_multiple_signatures: true,
        recipient_context: Some(XmlSecurityRecipientContext {
            actor: Some("urn:gateway:inbound".to_string()),
            base64ed_x509_certificate: Some("MIIBszCCAR2gAwIBAgIJAO".to_string()),
        }),
        ..RequireWssX509Cert::default()
    }));
}

#[test]
fn test_routing_rules_round_trip() {
    let mut routing = HttpRoutingAssertion::to_url("http://backend.internal/orders");
    routing.max_connections = 250;
    routing.fail_on_error_status = false;
    routing.request_header_rules.rules = vec![
        HttpPassthroughRule::forward("X-Trace"),
        HttpPassthroughRule::replace("Host", "orders.internal"),
    ];
    round_trip(Box::new(routing));
}

#[test]
fn test_empty_rules_are_elided() {
    let written =
        write_policy(&HttpRoutingAssertion::to_url("http://backend.internal/")).expect("write");
    assert!(!written.contains("RequestHeaderRules"), "{written}");
    assert!(!written.contains("MaxConnections"), "{written}");
}

#[test]
fn test_custom_payload_from_holder_finder() {
    round_trip(Box::new(CustomAssertionHolder::holding(
        RateLimitCustomAssertion {
            max_requests: 100,
            window_seconds: 60,
        },
    )));
}

#[test]
fn test_custom_payload_with_own_mapping() {
    let holder = CustomAssertionHolder {
        category: Some("AccessControl".to_string()),
        ..CustomAssertionHolder::holding(ClientIpCustomAssertion {
            allowed_ranges: vec!["10.0.0.0/8".to_string(), "192.168.0.0/16".to_string()],
        })
    };
    let written = write_policy(&holder).expect("write");
    assert!(
        written.contains(r#"<L7p:CustomAssertion customAssertionData="included">"#),
        "{written}"
    );
    assert!(written.contains("<L7p:ClientIpCustomAssertion>"), "{written}");
    round_trip(Box::new(holder));
}

#[test]
fn test_unrecognized_custom_payload_survives_rewrite() {
    let xml = policy(
        r#"<L7p:CustomAssertion>
            <L7p:CustomAssertion customAssertionData="included">
                <L7p:FuturePayload level="2"/>
            </L7p:CustomAssertion>
        </L7p:CustomAssertion>"#,
    );
    assert!(read_strict(&xml).is_err());

    let read = read_permissive(&xml).expect("read").expect("policy");
    let holder = read
        .as_any()
        .downcast_ref::<CustomAssertionHolder>()
        .expect("holder");
    let payload = holder
        .custom_assertion
        .as_ref()
        .and_then(|payload| payload.as_any().downcast_ref::<UnknownAssertion>())
        .expect("quarantined payload");
    assert_eq!(payload.element_name.as_deref(), Some("FuturePayload"));

    let rewritten = write_policy(read.as_ref()).expect("rewrite");
    assert!(
        rewritten.contains(r#"<L7p:CustomAssertion customAssertionData="included">"#),
        "{rewritten}"
    );
    assert!(rewritten.contains(r#"level="2""#), "{rewritten}");
    let again = read_permissive(&rewritten).expect("reread");
    assert_eq!(again, Some(read));
}

#[test]
fn test_collection_member_of_enum_type_is_fatal() {
    let xml = policy(
        r#"<L7p:CustomAssertion>
            <L7p:CustomAssertion customAssertionData="included">
                <L7p:ClientIpCustomAssertion>
                    <L7p:AllowedRanges stringArrayValue="included">
                        <L7p:item stringValue="10.0.0.0/8"/>
                        <L7p:item emailProtocol="SSL"/>
                    </L7p:AllowedRanges>
                </L7p:ClientIpCustomAssertion>
            </L7p:CustomAssertion>
        </L7p:CustomAssertion>"#,
    );
    for err in [
        read_strict(&xml).expect_err("strict"),
        read_permissive(&xml).expect_err("permissive"),
    ] {
        assert!(matches!(err, WspError::IncompatibleMember { .. }), "{err:?}");
        assert_eq!(err.kind(), ErrorKind::Structural);
    }
}

#[test]
fn test_nested_policy_round_trip() {
    round_trip(Box::new(CompositeAssertion::exactly_one(vec![
        Box::new(CompositeAssertion::all(vec![
            Box::new(HttpBasic::default()),
            Box::new(HttpRoutingAssertion::to_url("https://a.example/")),
        ])),
        Box::new(CompositeAssertion::all(vec![
            Box::new(RequireWssX509Cert::default()),
            Box::new(TrueAssertion::default()),
        ])),
    ])));
}

#[test]
fn test_unknown_assertion_is_quarantined_and_preserved() {
    let xml = policy(
        r#"<wsp:All wsp:Usage="Required">
            <L7p:HttpBasic/>
            <L7p:SamlAudience><L7p:Audience stringValue="urn:partner"/></L7p:SamlAudience>
        </wsp:All>"#,
    );
    assert!(read_strict(&xml).is_err());

    let read = read_permissive(&xml).expect("read").expect("policy");
    let all = read
        .as_any()
        .downcast_ref::<CompositeAssertion>()
        .expect("composite");
    let quarantined = all.children().expect("children")[1]
        .as_any()
        .downcast_ref::<UnknownAssertion>()
        .expect("unknown assertion");
    assert_eq!(quarantined.element_name.as_deref(), Some("SamlAudience"));
    assert!(
        quarantined
            .original_xml
            .as_deref()
            .is_some_and(|xml| xml.contains("urn:partner"))
    );

    let rewritten = write_policy(read.as_ref()).expect("write");
    let again = read_permissive(&rewritten).expect("read");
    assert_eq!(again, Some(read));
}

#[test]
fn test_omit_disabled_collapses_container() {
    let tree = CompositeAssertion::all(vec![
        Box::new(HttpBasic::default()),
        Box::new(FalseAssertion { enabled: false }),
    ]);
    let written = write_policy(&tree).expect("write");
    let options = ReadOptions {
        include_disabled: false,
        ..ReadOptions::default()
    };
    let expected: Box<dyn Assertion> = Box::new(HttpBasic::default());
    assert_eq!(
        read_with_options(&written, &options).expect("read"),
        Some(expected)
    );
}

#[test]
fn test_target_version_excludes_newer_mappings() {
    let sql = SqlAttackAssertion::protecting([SqlProtection::Oracle]);
    let old = WriteOptions {
        target_version: Some("4.6".parse::<Version>().expect("version")),
        ..WriteOptions::default()
    };
    let err = write_with_options(Some(&sql), &old).expect_err("too new");
    assert!(matches!(err, WspError::NoMappingForType { .. }), "{err:?}");

    let current = WriteOptions {
        target_version: Some(Version::new([5, 0])),
        ..WriteOptions::default()
    };
    assert!(write_with_options(Some(&sql), &current).is_ok());
    assert!(write_with_options(Some(&HttpBasic::default()), &old).is_ok());
}
