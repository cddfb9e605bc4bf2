//! Property tests over catalogue values.

use proptest::prelude::*;
use proptest::sample::subsequence;

use wsp_assertions::{
    EmailAlertAssertion, HttpPassthroughRule, HttpRoutingAssertion, Protocol, SqlAttackAssertion,
    SqlProtection, read_permissive, read_strict, write_policy,
};
use wsp_core::{Assertion, CompositeAssertion, WireEnum};

fn arb_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        "[ -~]{0,24}",
        "[a-z]{1,8}\n[a-z ]{0,12}",
    ])
}

fn arb_alert() -> impl Strategy<Value = Box<dyn Assertion>> {
    (
        arb_text(),
        arb_text(),
        1..65_535i32,
        prop::sample::select(Protocol::all().to_vec()),
        any::<bool>(),
    )
        .prop_map(|(subject, message, smtp_port, protocol, enabled)| {
            Box::new(EmailAlertAssertion {
                enabled,
                subject,
                message,
                smtp_port,
                protocol,
                ..EmailAlertAssertion::default()
            }) as Box<dyn Assertion>
        })
}

fn arb_sql() -> impl Strategy<Value = Box<dyn Assertion>> {
    let all = SqlProtection::all().to_vec();
    let len = all.len();
    subsequence(all, 0..=len).prop_map(|protections| {
        Box::new(SqlAttackAssertion::protecting(protections)) as Box<dyn Assertion>
    })
}

fn arb_routing() -> impl Strategy<Value = Box<dyn Assertion>> {
    (
        "https?://[a-z]{1,10}(\\.[a-z]{2,4})?/[a-z0-9/]{0,12}",
        0..1_000i32,
        prop::collection::vec(("[A-Za-z-]{1,12}", arb_text()), 0..4),
    )
        .prop_map(|(url, max_connections, rules)| {
            let mut routing = HttpRoutingAssertion::to_url(url);
            routing.max_connections = max_connections;
            routing.request_header_rules.rules = rules
                .into_iter()
                .map(|(name, value)| HttpPassthroughRule {
                    name: Some(name),
                    value,
                })
                .collect();
            Box::new(routing) as Box<dyn Assertion>
        })
}

fn arb_policy() -> impl Strategy<Value = Box<dyn Assertion>> {
    prop::collection::vec(prop_oneof![arb_alert(), arb_sql(), arb_routing()], 1..5)
        .prop_map(|children| Box::new(CompositeAssertion::all(children)) as Box<dyn Assertion>)
}

proptest! {
    #[test]
    fn test_catalogue_round_trip(policy in arb_policy()) {
        let xml = write_policy(policy.as_ref()).expect("write");
        let read = read_strict(&xml).expect("read");
        prop_assert_eq!(read, Some(policy));
    }

    #[test]
    fn test_permissive_matches_strict(policy in arb_policy()) {
        let xml = write_policy(policy.as_ref()).expect("write");
        let strict = read_strict(&xml).expect("strict");
        let permissive = read_permissive(&xml).expect("permissive");
        prop_assert_eq!(strict, permissive);
    }
}
