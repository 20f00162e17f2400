//! AVOW - compliance verification for opt-out and consent artifacts.
//!
//! Two pure validators share one verdict vocabulary: [`verify_link`] for
//! unsubscribe URLs and [`verify_consent_chain`] for consent records.

pub mod consent;
pub mod deploy;
pub mod error;
pub mod format;
pub mod link;
pub mod logging;
pub mod verdict;
pub mod verifier;

pub use consent::{diagnose, verify_consent_chain, ConsentFinding, ConsentRecord, MIN_TOKEN_LENGTH};
pub use deploy::{DeployConfig, PlannedRequest, ProjectDomains};
pub use error::{AvowError, AvowResult};
pub use format::{label, style, VerdictStyle};
pub use link::{verify_link, REQUIRED_SCHEME};
pub use verdict::Verdict;
pub use verifier::{compute_content_hash, BatchSummary, ConsentReport, LinkReport, Verifier};
