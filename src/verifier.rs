//! Report-producing front end over the two validators.

use crate::consent::{diagnose, verify_consent_chain, ConsentFinding, ConsentRecord};
use crate::format::{label, style, VerdictStyle};
use crate::link::verify_link;
use crate::verdict::Verdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Description of what the link check covers.
pub const LINK_CHECK: &str = "URL parses and is HTTPS";
/// Description of what the consent check covers.
pub const CONSENT_CHECK: &str = "confirmation > initialRequest";

/// Result of verifying one unsubscribe link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkReport {
    pub report_id: String,
    pub url: String,
    pub verdict: Verdict,
    pub label: String,
    pub style: VerdictStyle,
    pub checked_at: DateTime<Utc>,
    pub check: String,
}

/// Result of verifying one consent record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsentReport {
    pub report_id: String,
    pub initial_request_time: DateTime<Utc>,
    pub confirmation_time: DateTime<Utc>,
    pub token: String,
    pub verdict: Verdict,
    pub label: String,
    pub style: VerdictStyle,
    pub findings: Vec<ConsentFinding>,
    pub checked_at: DateTime<Utc>,
    pub check: String,
}

/// Aggregate over a batch of link checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub reports: Vec<LinkReport>,
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs validators and wraps their verdicts in displayable reports.
#[derive(Clone)]
pub struct Verifier {
    clock: Clock,
}

impl Verifier {
    /// Create a verifier using the system clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verifier with an injected time source.
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            clock: Arc::new(clock),
        }
    }

    pub fn verify_link(&self, url: &str) -> LinkReport {
        let verdict = verify_link(url);
        let report_id = compute_content_hash(&serde_json::json!({
            "kind": "link",
            "url": url,
            "verdict": verdict.as_str(),
        }));
        tracing::info!(report_id = %report_id, verdict = verdict.as_str(), "link check complete");

        LinkReport {
            report_id,
            url: url.to_string(),
            verdict,
            label: label(verdict).to_string(),
            style: style(verdict),
            checked_at: (self.clock)(),
            check: LINK_CHECK.to_string(),
        }
    }

    pub fn verify_consent(&self, record: &ConsentRecord) -> ConsentReport {
        let verdict = verify_consent_chain(record);
        let findings = diagnose(record);
        let report_id = compute_content_hash(&serde_json::json!({
            "kind": "consent",
            "initial_request_time": record.initial_request_time.to_rfc3339(),
            "confirmation_time": record.confirmation_time.to_rfc3339(),
            "token": record.token,
            "verdict": verdict.as_str(),
        }));
        tracing::info!(
            report_id = %report_id,
            verdict = verdict.as_str(),
            findings = findings.len(),
            "consent check complete"
        );

        ConsentReport {
            report_id,
            initial_request_time: record.initial_request_time,
            confirmation_time: record.confirmation_time,
            token: record.token.clone(),
            verdict,
            label: label(verdict).to_string(),
            style: style(verdict),
            findings,
            checked_at: (self.clock)(),
            check: CONSENT_CHECK.to_string(),
        }
    }

    /// Verify several links in order.
    pub fn verify_links(&self, urls: &[&str]) -> BatchSummary {
        let reports: Vec<LinkReport> = urls.iter().map(|u| self.verify_link(u)).collect();
        let passed = reports.iter().filter(|r| r.verdict.is_success()).count();

        BatchSummary {
            total: reports.len(),
            passed,
            failed: reports.len() - passed,
            reports,
        }
    }

    pub fn verify_link_json(&self, url: &str) -> Value {
        let report = self.verify_link(url);
        serde_json::to_value(&report).unwrap_or_else(|_| {
            serde_json::json!({
                "url": url,
                "verdict": Verdict::ErrorVerificationFailed.as_str(),
                "error": "Failed to serialize verification report"
            })
        })
    }

    pub fn verify_consent_json(&self, record: &ConsentRecord) -> Value {
        let report = self.verify_consent(record);
        serde_json::to_value(&report).unwrap_or_else(|_| {
            serde_json::json!({
                "verdict": Verdict::ErrorVerificationFailed.as_str(),
                "error": "Failed to serialize verification report"
            })
        })
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::with_clock(Utc::now)
    }
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier").finish_non_exhaustive()
    }
}

/// SHA-256 over a canonical rendering of `value`: object keys sorted,
/// no insignificant whitespace. Key order in the input never changes the id.
pub fn compute_content_hash(value: &Value) -> String {
    let mut hasher = Sha256::new();
    feed_canonical(&mut hasher, value);
    format!("{:x}", hasher.finalize())
}

fn feed_canonical(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by_key(|(key, _)| *key);
            hasher.update(b"{");
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    hasher.update(b",");
                }
                hasher.update(Value::from(key.as_str()).to_string());
                hasher.update(b":");
                feed_canonical(hasher, item);
            }
            hasher.update(b"}");
        }
        Value::Array(items) => {
            hasher.update(b"[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    hasher.update(b",");
                }
                feed_canonical(hasher, item);
            }
            hasher.update(b"]");
        }
        scalar => hasher.update(scalar.to_string()),
    }
}
