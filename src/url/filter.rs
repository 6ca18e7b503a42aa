//! Discovery filter for candidate addresses
//!
//! The filter decides which discovered addresses are worth following at all.
//! It is supplied at startup as either a keyword list or a regular expression
//! pattern; with neither configured, everything matches.

use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Filter applied to every candidate address before admission
#[derive(Debug, Clone)]
pub enum UrlFilter {
    /// No filter configured; every address passes
    MatchAll,

    /// Every keyword must appear somewhere in the address string
    Keywords(Vec<String>),

    /// The address string must match the pattern
    Pattern(Regex),
}

impl UrlFilter {
    /// Builds a filter from the optional config inputs
    ///
    /// A pattern takes precedence over keywords when both are given. An
    /// invalid pattern is a configuration error, caught before the crawl
    /// starts.
    pub fn from_config(
        pattern: Option<&str>,
        keywords: &[String],
    ) -> Result<Self, ConfigError> {
        if let Some(pattern) = pattern {
            let re = Regex::new(pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", pattern, e)))?;
            return Ok(Self::Pattern(re));
        }

        if !keywords.is_empty() {
            return Ok(Self::Keywords(keywords.to_vec()));
        }

        Ok(Self::MatchAll)
    }

    /// Checks whether an address passes the filter
    pub fn matches(&self, url: &Url) -> bool {
        match self {
            Self::MatchAll => true,
            Self::Keywords(keywords) => {
                let s = url.as_str();
                keywords.iter().all(|k| s.contains(k.as_str()))
            }
            Self::Pattern(re) => re.is_match(url.as_str()),
        }
    }
}
