//! Error types for AVOW.
//!
//! The validators themselves never fail; these errors belong to the fallible
//! edges around them (record construction, tag decoding, deploy config).

use std::fmt;

/// Unified error type for all fallible AVOW operations.
#[derive(Debug, Clone, PartialEq)]
pub enum AvowError {
    /// Validation error with field context
    Validation { field: String, message: String },
    /// A required configuration field was absent or empty
    MissingField { field: String },
    /// An endpoint failed the link check
    InsecureEndpoint { endpoint: String, verdict: String },
    /// Unknown verdict tag
    UnknownVerdict { value: String },
}

impl fmt::Display for AvowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { field, message } => {
                write!(f, "validation error on '{}': {}", field, message)
            }
            Self::MissingField { field } => {
                write!(f, "required field '{}' is missing", field)
            }
            Self::InsecureEndpoint { endpoint, verdict } => {
                write!(f, "endpoint '{}' rejected: {}", endpoint, verdict)
            }
            Self::UnknownVerdict { value } => {
                write!(f, "unknown verdict tag: '{}'", value)
            }
        }
    }
}

impl std::error::Error for AvowError {}

/// Result type alias for AVOW operations.
pub type AvowResult<T> = Result<T, AvowError>;

