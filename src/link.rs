//! Unsubscribe link validation.

use crate::verdict::Verdict;
use url::Url;

/// The only scheme an unsubscribe link may use.
pub const REQUIRED_SCHEME: &str = "https";

/// Classify a claimed unsubscribe URL.
///
/// Parse failure wins over the scheme check, so a malformed URL is always
/// `ErrorInvalidUrl`. Purely syntactic: nothing is resolved or fetched.
pub fn verify_link(raw: &str) -> Verdict {
    let verdict = match Url::parse(raw) {
        Err(_) => Verdict::ErrorInvalidUrl,
        Ok(parsed) if parsed.scheme() != REQUIRED_SCHEME => Verdict::ErrorNotHttps,
        Ok(_) => Verdict::Success,
    };
    tracing::debug!(url = raw, verdict = verdict.as_str(), "link verified");
    verdict
}
