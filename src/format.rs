//! Human-readable rendering of verdicts.
//!
//! Labels are matched verbatim by user interfaces, so they must not drift.

use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};

/// Binary display classification. There is no warning tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStyle {
    Success,
    Error,
}

impl VerdictStyle {
    /// CSS class name used by the web front end.
    pub fn as_class(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for VerdictStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_class())
    }
}

/// Fixed label for a verdict.
pub fn label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Success => "✓ Verified",
        Verdict::ErrorInvalidUrl => "✗ Invalid URL",
        Verdict::ErrorNotHttps => "✗ Not HTTPS",
        Verdict::ErrorInvalidConsent => "✗ Invalid Consent",
        Verdict::ErrorVerificationFailed => "✗ Verification Failed",
    }
}

pub fn style(verdict: Verdict) -> VerdictStyle {
    if verdict.is_success() {
        VerdictStyle::Success
    } else {
        VerdictStyle::Error
    }
}
