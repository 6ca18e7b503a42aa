/// Resource kind and state definitions for tracking crawl progress
///
/// Every address flowing through the pipeline is either a page (markup to be
/// parsed for further addresses) or an image (a binary payload to be stored
/// verbatim), and is always in exactly one of the states below.
use std::fmt;

/// The kind of a discovered resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Markup to fetch and parse for further links and images
    Page,

    /// Binary payload to download into the mirror directory
    Image,
}

impl ResourceKind {
    /// Converts the kind to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Image => "image",
        }
    }

    /// Parses a kind from its database string representation
    ///
    /// Returns None if the string doesn't match any known kind.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "page" => Some(Self::Page),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Represents the current state of a resource address
///
/// Transitions: `Unknown -> Queued` happens at most once per address
/// (admission, performed only by the queue manager). `Queued -> Done` and
/// `Queued -> Failed` are committed only by the completion notifier. There is
/// no transition out of a terminal state and no automatic retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Never seen by the crawler
    Unknown,

    /// Admitted into a waiting queue, not yet finished
    Queued,

    /// Fetch/store attempt completed successfully
    Done,

    /// Fetch/store attempt failed permanently (no retry)
    Failed,
}

impl ResourceState {
    /// Returns true if no further processing will happen for this address
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Queued => "queued",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Parses a state from its database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(Self::Unknown),
            "queued" => Some(Self::Queued),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
