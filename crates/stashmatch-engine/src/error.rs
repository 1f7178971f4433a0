use thiserror::Error;

/// Failure reported by a search collaborator (registry or catalog).
///
/// The matcher records `to_string()` of this error verbatim on the affected
/// match record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("search timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}

/// Invalid user or auto-apply action on a match record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("cannot {action} a match in status {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    #[error("candidate index {index} out of range ({len} candidates)")]
    CandidateOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] stashmatch_core::CoreError),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
