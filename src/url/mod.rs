//! URL handling module for Kagami
//!
//! This module provides candidate resolution (turning raw href/src values into
//! absolute resource addresses), the discovery filter, and mirror path
//! derivation for downloaded images.

mod filter;
mod mirror_path;

pub use filter::UrlFilter;
pub use mirror_path::mirror_path;

use crate::UrlError;
use url::Url;

/// Resolves a raw href/src value extracted from markup into an absolute URL
///
/// Relative references are resolved against the page's own address; absolute
/// ones pass through unchanged. The fragment is stripped so that two addresses
/// differing only by anchor are the same resource.
///
/// Returns an error for values that should never enter the pipeline:
/// - `javascript:`, `mailto:`, `tel:` and `data:` schemes
/// - empty or fragment-only values
/// - values that fail to parse as a URL
/// - anything that resolves to a non-HTTP(S) scheme
///
/// # Examples
///
/// ```
/// use kagami::url::resolve_candidate;
/// use url::Url;
///
/// let base = Url::parse("https://x.test/a/b").unwrap();
/// let resolved = resolve_candidate("c", &base).unwrap();
/// assert_eq!(resolved.as_str(), "https://x.test/a/c");
/// ```
pub fn resolve_candidate(raw: &str, base: &Url) -> Result<Url, UrlError> {
    let raw = raw.trim();

    if raw.is_empty() || raw.starts_with('#') {
        return Err(UrlError::Parse("empty or fragment-only reference".into()));
    }

    if raw.starts_with("javascript:")
        || raw.starts_with("mailto:")
        || raw.starts_with("tel:")
        || raw.starts_with("data:")
    {
        return Err(UrlError::InvalidScheme(
            raw.split(':').next().unwrap_or("").to_string(),
        ));
    }

    let mut resolved = base
        .join(raw)
        .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return Err(UrlError::InvalidScheme(resolved.scheme().to_string()));
    }

    if resolved.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    resolved.set_fragment(None);

    Ok(resolved)
}
