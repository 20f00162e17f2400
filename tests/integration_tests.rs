//! Integration tests for AVOW verification.

use avow::{
    compute_content_hash, diagnose, label, style, verify_consent_chain, verify_link,
    AvowError, ConsentFinding, ConsentRecord, DeployConfig, ProjectDomains, Verdict,
    VerdictStyle, Verifier,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

// ============================================================================
// Test Fixtures
// ============================================================================

const ACCOUNT: &str = "0123456789abcdef0123456789abcdef";

fn t() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid instant")
}

fn fixed_verifier() -> Verifier {
    Verifier::with_clock(t)
}

fn record(offset_ms: i64, token: &str) -> ConsentRecord {
    ConsentRecord::new(
        t() - Duration::milliseconds(offset_ms),
        t(),
        token.to_string(),
    )
}

// ============================================================================
// Link Validator Tests
// ============================================================================

#[test]
fn test_link_not_a_url() {
    assert_eq!(verify_link("not a url"), Verdict::ErrorInvalidUrl);
}

#[test]
fn test_link_plain_http() {
    assert_eq!(verify_link("http://example.com/unsub"), Verdict::ErrorNotHttps);
}

#[test]
fn test_link_https_with_query() {
    assert_eq!(verify_link("https://example.com/unsub?id=42"), Verdict::Success);
}

#[test]
fn test_link_never_yields_consent_verdicts() {
    for input in ["", "https://a.b", "http://a.b", "::::", "https://"] {
        let verdict = verify_link(input);
        assert!(
            matches!(
                verdict,
                Verdict::Success | Verdict::ErrorInvalidUrl | Verdict::ErrorNotHttps
            ),
            "{} -> {}",
            input,
            verdict
        );
    }
}

#[test]
fn test_link_surrounding_whitespace_stripped_by_parser() {
    assert_eq!(verify_link("  https://example.com/unsub  "), Verdict::Success);
}

// ============================================================================
// Consent-Chain Validator Tests
// ============================================================================

#[test]
fn test_consent_ordered_with_long_token() {
    let rec = record(5000, "user_123_consent_token_abc");
    assert_eq!(verify_consent_chain(&rec), Verdict::Success);
}

#[test]
fn test_consent_equal_times_rejected() {
    let rec = record(0, "abcdefghij");
    assert_eq!(verify_consent_chain(&rec), Verdict::ErrorInvalidConsent);
    assert_eq!(diagnose(&rec), vec![ConsentFinding::NotAfterRequest]);
}

#[test]
fn test_consent_short_token_rejected() {
    let rec = record(5000, "short");
    assert_eq!(verify_consent_chain(&rec), Verdict::ErrorInvalidConsent);
    assert_eq!(
        diagnose(&rec),
        vec![ConsentFinding::TokenTooShort { length: 5, minimum: 10 }]
    );
}

#[test]
fn test_consent_token_boundary() {
    assert_eq!(verify_consent_chain(&record(1, "abcdefghi")), Verdict::ErrorInvalidConsent);
    assert_eq!(verify_consent_chain(&record(1, "abcdefghij")), Verdict::Success);
}

#[test]
fn test_consent_from_millis() {
    let now = 1_760_000_000_000;
    let rec = ConsentRecord::from_millis(now - 5000, now, "user_123_consent_token_abc".to_string())
        .expect("in range");
    assert_eq!(verify_consent_chain(&rec), Verdict::Success);
}

#[test]
fn test_consent_record_serde() {
    let json = serde_json::json!({
        "initial_request_time": "2026-03-01T11:59:55Z",
        "confirmation_time": "2026-03-01T12:00:00Z",
        "token": "user_123_consent_token_abc"
    });
    let rec: ConsentRecord = serde_json::from_value(json).expect("deserialize");
    assert_eq!(rec, record(5000, "user_123_consent_token_abc"));
}

// ============================================================================
// Formatter Tests
// ============================================================================

#[test]
fn test_labels_exact() {
    assert_eq!(label(Verdict::Success), "✓ Verified");
    assert_eq!(label(Verdict::ErrorInvalidUrl), "✗ Invalid URL");
    assert_eq!(label(Verdict::ErrorNotHttps), "✗ Not HTTPS");
    assert_eq!(label(Verdict::ErrorInvalidConsent), "✗ Invalid Consent");
    assert_eq!(label(Verdict::ErrorVerificationFailed), "✗ Verification Failed");
}

#[test]
fn test_unknown_tag_renders_catch_all() {
    let verdict = Verdict::from_tag("SomethingElse");
    assert_eq!(label(verdict), "✗ Verification Failed");
    assert_eq!(style(verdict).as_class(), "error");
}

#[test]
fn test_style_classes() {
    assert_eq!(style(Verdict::Success), VerdictStyle::Success);
    assert_eq!(style(Verdict::Success).as_class(), "success");
    assert_eq!(style(Verdict::ErrorNotHttps).as_class(), "error");
}

// ============================================================================
// Verifier Tests
// ============================================================================

#[test]
fn test_verifier_link_report() {
    let report = fixed_verifier().verify_link("http://example.com/unsub");
    assert_eq!(report.verdict, Verdict::ErrorNotHttps);
    assert_eq!(report.label, "✗ Not HTTPS");
    assert_eq!(report.style, VerdictStyle::Error);
    assert_eq!(report.checked_at, t());
    assert_eq!(report.check, "URL parses and is HTTPS");
    assert_eq!(report.report_id.len(), 64);
}

#[test]
fn test_verifier_report_id_ignores_clock() {
    let a = Verifier::with_clock(t).verify_link("https://example.com/unsub");
    let b = Verifier::with_clock(|| t() + Duration::hours(1)).verify_link("https://example.com/unsub");
    assert_eq!(a.report_id, b.report_id);
    assert_ne!(a.checked_at, b.checked_at);

    let c = Verifier::with_clock(t).verify_link("https://example.com/other");
    assert_ne!(a.report_id, c.report_id);
}

#[test]
fn test_verifier_consent_report() {
    let report = fixed_verifier().verify_consent(&record(0, "short"));
    assert_eq!(report.verdict, Verdict::ErrorInvalidConsent);
    assert_eq!(report.label, "✗ Invalid Consent");
    assert_eq!(report.findings.len(), 2);
    assert_eq!(report.check, "confirmation > initialRequest");
}

#[test]
fn test_verifier_batch() {
    let summary = fixed_verifier().verify_links(&[
        "https://example.com/a",
        "http://example.com/b",
        "nope",
    ]);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.reports[2].verdict, Verdict::ErrorInvalidUrl);
}

#[test]
fn test_verifier_json_output() {
    let json = fixed_verifier().verify_link_json("https://example.com/unsub?id=42");
    assert_eq!(json.get("verdict").and_then(|v| v.as_str()), Some("Success"));
    assert_eq!(json.get("style").and_then(|v| v.as_str()), Some("success"));

    let json = fixed_verifier().verify_consent_json(&record(5000, "short"));
    assert_eq!(
        json.pointer("/findings/0/kind").and_then(|v| v.as_str()),
        Some("token_too_short")
    );
}

// ============================================================================
// Deploy Config Tests
// ============================================================================

#[test]
fn test_deploy_plan_order() {
    let config = DeployConfig::new("token".to_string(), ACCOUNT.to_string()).with_projects(vec![
        ProjectDomains::new("avow-protocol", &["avow-protocol.org", "www.avow-protocol.org"]),
        ProjectDomains::new("a2ml", &["a2ml.org"]),
    ]);
    let plan = config.plan().expect("valid config");

    let base = format!("https://api.cloudflare.com/client/v4/accounts/{}/pages/projects", ACCOUNT);
    let project = |name: &str| format!("{}/{}", base, name);
    let domains = |name: &str| format!("{}/{}/domains", base, name);

    let summary: Vec<(&str, String, Option<serde_json::Value>, bool)> = plan
        .iter()
        .map(|r| (r.method.as_str(), r.url.clone(), r.body.clone(), r.only_if_absent))
        .collect();
    let create = |name: &str| {
        Some(json!({
            "name": name,
            "production_branch": "main",
            "build_config": {
                "build_command": "deno task build",
                "destination_dir": ".",
                "root_dir": "/",
            },
        }))
    };
    assert_eq!(
        summary,
        vec![
            ("GET", project("avow-protocol"), None, false),
            ("POST", base.clone(), create("avow-protocol"), true),
            ("POST", domains("avow-protocol"), Some(json!({"name": "avow-protocol.org"})), false),
            ("POST", domains("avow-protocol"), Some(json!({"name": "www.avow-protocol.org"})), false),
            ("GET", project("a2ml"), None, false),
            ("POST", base.clone(), create("a2ml"), true),
            ("POST", domains("a2ml"), Some(json!({"name": "a2ml.org"})), false),
        ]
    );
}

#[test]
fn test_deploy_default_plan_covers_all_sites() {
    let config = DeployConfig::new("token".to_string(), ACCOUNT.to_string());
    let plan = config.plan().expect("valid config");
    assert_eq!(plan.len(), 12);

    let attached: Vec<String> = plan
        .iter()
        .filter(|r| r.url.ends_with("/domains"))
        .filter_map(|r| r.body.as_ref()?.get("name")?.as_str().map(str::to_string))
        .collect();
    assert_eq!(
        attached,
        vec![
            "avow-protocol.org",
            "www.avow-protocol.org",
            "a2ml.org",
            "www.a2ml.org",
            "k9-svc.org",
            "www.k9-svc.org",
        ]
    );

    let lookups = plan.iter().filter(|r| r.method == "GET").count();
    let creates = plan.iter().filter(|r| r.only_if_absent).count();
    assert_eq!((lookups, creates), (3, 3));
}

#[test]
fn test_deploy_missing_account() {
    let config = DeployConfig::new("token".to_string(), String::new());
    assert!(matches!(
        config.plan(),
        Err(AvowError::MissingField { field }) if field == "CLOUDFLARE_ACCOUNT_ID"
    ));
}

#[test]
fn test_deploy_bad_values() {
    let bad_account = DeployConfig::new("token".to_string(), "not-hex".to_string());
    assert!(matches!(
        bad_account.validate(),
        Err(AvowError::Validation { field, .. }) if field == "account_id"
    ));

    let bad_domain = DeployConfig::new("token".to_string(), ACCOUNT.to_string())
        .with_projects(vec![ProjectDomains::new("avow-protocol", &["not a domain"])]);
    assert!(matches!(
        bad_domain.validate(),
        Err(AvowError::Validation { field, .. }) if field == "domain"
    ));

    let bad_project = DeployConfig::new("token".to_string(), ACCOUNT.to_string())
        .with_projects(vec![ProjectDomains::new("Avow_Protocol", &[])]);
    assert!(matches!(
        bad_project.validate(),
        Err(AvowError::Validation { field, .. }) if field == "project"
    ));
}

// ============================================================================
// Content Hash Tests
// ============================================================================

#[test]
fn test_hash_matches_compact_sorted_json() {
    let obj = json!({"b": {"d": true, "c": null}, "a": [1, "x"]});
    // sha256 of {"a":[1,"x"],"b":{"c":null,"d":true}}
    assert_eq!(
        compute_content_hash(&obj),
        "800353e95fd8ae2d13f2b04aa4978b34020d878b94063d923f8995a7558e410e"
    );
}

#[test]
fn test_hash_key_order_independence() {
    let obj1 = serde_json::json!({"b": 2, "a": {"y": 1, "x": 2}});
    let obj2 = serde_json::json!({"a": {"x": 2, "y": 1}, "b": 2});
    assert_eq!(compute_content_hash(&obj1), compute_content_hash(&obj2));
}

// ============================================================================
// End-to-End Test
// ============================================================================

#[test]
fn test_demo_consent_workflow() {
    let verifier = fixed_verifier();
    let report = verifier.verify_consent(&ConsentRecord::demo(t()));

    assert_eq!(report.verdict, Verdict::Success);
    assert_eq!(report.label, "✓ Verified");
    assert_eq!(report.style, VerdictStyle::Success);
    assert!(report.findings.is_empty());
    assert_eq!(report.token, "user_123_consent_token_abc");
    assert_eq!(report.confirmation_time - report.initial_request_time, Duration::seconds(5));
}
