use thiserror::Error;

/// Classified outcome of a failed vote submission.
///
/// Only vote failures are user-facing in this engine; pull and push outages
/// are absorbed and retried silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    /// Another vote from this guest is still awaiting its response; rejected
    /// locally without a network call.
    #[error("a vote is already in flight")]
    InFlight,
    /// The backend rejected the vote because this guest already voted for the
    /// track. Non-alarming: the earlier vote still stands.
    #[error("you have already voted for this track")]
    Duplicate,
    /// Anything else: network failure, timeout, or a server-side error. Safe
    /// to retry.
    #[error("vote failed: {0}")]
    Transient(String),
}

impl VoteError {
    /// Classify a backend rejection by inspecting its free-text message.
    ///
    /// The backend multiplexes every vote failure into a single error string,
    /// so a duplicate vote is only recognisable by its wording. Fragile by
    /// nature; kept in one place so a structured error code can replace the
    /// substring match without touching callers.
    pub fn classify(message: &str) -> Self {
        if message.to_ascii_lowercase().contains("already voted") {
            VoteError::Duplicate
        } else {
            VoteError::Transient(message.to_string())
        }
    }
}
