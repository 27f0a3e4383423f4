use thiserror::Error;

/// Failures the widget core recovers from where they occur. None of these is
/// ever surfaced to the host page.
#[derive(Debug, Error)]
pub enum WidgetError {
    /// Network or parse failure while loading the spreadsheet feed.
    #[error("feed unavailable: {0}")]
    FeedUnavailable(String),

    /// A feed row is missing one of the required fields.
    #[error("invalid record: missing {field}")]
    InvalidRecord { field: &'static str },

    /// An avatar image failed to load or did not answer in time.
    #[error("avatar probe failed for {url}: {reason}")]
    AvatarProbeFailed { url: String, reason: &'static str },

    #[error("malformed timestamp: {0}")]
    MalformedTimestamp(String),
}

impl WidgetError {
    pub fn feed(message: impl Into<String>) -> Self {
        Self::FeedUnavailable(message.into())
    }
}
