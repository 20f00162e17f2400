//! The closed result vocabulary shared by both validators.

use crate::error::{AvowError, AvowResult};
use serde::{Deserialize, Serialize};

/// Outcome of a single verification call.
///
/// Verdicts carry no payload. Serialized form is the variant name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Verdict {
    Success,
    ErrorInvalidUrl,
    ErrorNotHttps,
    ErrorInvalidConsent,
    /// Catch-all for tags no validator produces.
    ErrorVerificationFailed,
}

impl Verdict {
    /// Every variant, in declaration order.
    pub const ALL: [Verdict; 5] = [
        Self::Success,
        Self::ErrorInvalidUrl,
        Self::ErrorNotHttps,
        Self::ErrorInvalidConsent,
        Self::ErrorVerificationFailed,
    ];

    /// Canonical tag string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::ErrorInvalidUrl => "ErrorInvalidUrl",
            Self::ErrorNotHttps => "ErrorNotHttps",
            Self::ErrorInvalidConsent => "ErrorInvalidConsent",
            Self::ErrorVerificationFailed => "ErrorVerificationFailed",
        }
    }

    /// Strict parse of a tag string.
    pub fn from_str(s: &str) -> AvowResult<Self> {
        match s {
            "Success" => Ok(Self::Success),
            "ErrorInvalidUrl" => Ok(Self::ErrorInvalidUrl),
            "ErrorNotHttps" => Ok(Self::ErrorNotHttps),
            "ErrorInvalidConsent" => Ok(Self::ErrorInvalidConsent),
            "ErrorVerificationFailed" => Ok(Self::ErrorVerificationFailed),
            _ => Err(AvowError::UnknownVerdict { value: s.to_string() }),
        }
    }

    /// Lenient decode: anything unrecognised collapses to the catch-all.
    pub fn from_tag(s: &str) -> Self {
        Self::from_str(s).unwrap_or(Self::ErrorVerificationFailed)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Verdict {
    type Err = AvowError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s)
    }
}
