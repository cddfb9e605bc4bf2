//! Integration tests for the policy outline.

use wsp_assertions::read_permissive;
use wsp_cli::summary::PolicySummary;

const POLICY: &str = r#"<wsp:Policy xmlns:L7p="http://www.layer7tech.com/ws/policy" xmlns:wsp="http://schemas.xmlsoap.org/ws/2002/12/policy">
    <wsp:All wsp:Usage="Required">
        <L7p:HttpBasic/>
        <wsp:OneOrMore wsp:Usage="Required" L7p:Enabled="false">
            <L7p:TrueAssertion/>
        </wsp:OneOrMore>
        <L7p:SamlAudience/>
        <L7p:HttpRoutingAssertion>
            <L7p:ProtectedServiceUrl stringValue="http://backend.internal/"/>
        </L7p:HttpRoutingAssertion>
    </wsp:All>
</wsp:Policy>"#;

#[test]
fn test_summary_outline() {
    let policy = read_permissive(POLICY).expect("read");
    let summary = PolicySummary::from_policy("policy.xml", policy.as_deref());

    insta::assert_json_snapshot!(summary, @r#"
    {
      "source": "policy.xml",
      "assertions": 6,
      "disabled": 2,
      "quarantined": 1,
      "outline": [
        {
          "depth": 0,
          "assertion": "AllAssertion",
          "enabled": true,
          "detail": "4 children"
        },
        {
          "depth": 1,
          "assertion": "HttpBasic",
          "enabled": true
        },
        {
          "depth": 1,
          "assertion": "OneOrMoreAssertion",
          "enabled": false,
          "detail": "1 child"
        },
        {
          "depth": 2,
          "assertion": "TrueAssertion",
          "enabled": false
        },
        {
          "depth": 1,
          "assertion": "UnknownAssertion",
          "enabled": true,
          "detail": "unrecognized SamlAudience"
        },
        {
          "depth": 1,
          "assertion": "HttpRoutingAssertion",
          "enabled": true
        }
      ]
    }
    "#);
}

#[test]
fn test_empty_policy_summary() {
    let summary = PolicySummary::from_policy("empty.xml", None);
    assert_eq!(summary.assertions, 0);
    assert!(summary.outline.is_empty());
    assert!(summary.to_json().expect("json").contains("\"outline\": []"));
}
