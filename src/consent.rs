//! Consent-chain records and their validation.

use crate::error::{AvowError, AvowResult};
use crate::verdict::Verdict;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Minimum token length, in UTF-16 code units.
pub const MIN_TOKEN_LENGTH: usize = 10;

/// Token carried by the sample record used in demonstrations.
pub const DEMO_TOKEN: &str = "user_123_consent_token_abc";

/// A subscriber's request/confirmation pair plus its identifying token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsentRecord {
    pub initial_request_time: DateTime<Utc>,
    pub confirmation_time: DateTime<Utc>,
    pub token: String,
}

impl ConsentRecord {
    pub fn new(
        initial_request_time: DateTime<Utc>,
        confirmation_time: DateTime<Utc>,
        token: String,
    ) -> Self {
        Self {
            initial_request_time,
            confirmation_time,
            token,
        }
    }

    /// Build a record from epoch milliseconds.
    pub fn from_millis(
        initial_request_ms: i64,
        confirmation_ms: i64,
        token: String,
    ) -> AvowResult<Self> {
        Ok(Self {
            initial_request_time: instant_from_millis("initial_request_time", initial_request_ms)?,
            confirmation_time: instant_from_millis("confirmation_time", confirmation_ms)?,
            token,
        })
    }

    /// The sample record: requested five seconds before `now`, confirmed at `now`.
    pub fn demo(now: DateTime<Utc>) -> Self {
        Self {
            initial_request_time: now - Duration::milliseconds(5000),
            confirmation_time: now,
            token: DEMO_TOKEN.to_string(),
        }
    }

    /// Token length as the original host counted it.
    pub fn token_length(&self) -> usize {
        self.token.encode_utf16().count()
    }
}

fn instant_from_millis(field: &str, ms: i64) -> AvowResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| AvowError::Validation {
            field: field.to_string(),
            message: format!("{} ms is outside the representable range", ms),
        })
}

/// A specific reason a record fails the consent check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsentFinding {
    /// Confirmation is simultaneous with or earlier than the request.
    NotAfterRequest,
    TokenTooShort { length: usize, minimum: usize },
}

/// Every sub-check the record fails. Empty means the record is valid.
pub fn diagnose(record: &ConsentRecord) -> Vec<ConsentFinding> {
    let mut findings = Vec::new();
    if record.confirmation_time <= record.initial_request_time {
        findings.push(ConsentFinding::NotAfterRequest);
    }
    let length = record.token_length();
    if length < MIN_TOKEN_LENGTH {
        findings.push(ConsentFinding::TokenTooShort {
            length,
            minimum: MIN_TOKEN_LENGTH,
        });
    }
    findings
}

/// Classify a consent record. Either failed condition yields the same
/// `ErrorInvalidConsent`; use [`diagnose`] to tell them apart.
pub fn verify_consent_chain(record: &ConsentRecord) -> Verdict {
    let ordered = record.confirmation_time > record.initial_request_time;
    let token_ok = record.token_length() >= MIN_TOKEN_LENGTH;
    let verdict = if ordered && token_ok {
        Verdict::Success
    } else {
        Verdict::ErrorInvalidConsent
    };
    tracing::debug!(
        ordered,
        token_ok,
        verdict = verdict.as_str(),
        "consent chain verified"
    );
    verdict
}
