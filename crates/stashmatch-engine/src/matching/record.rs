use serde::{Deserialize, Serialize};
use stashmatch_core::EntityKind;

use crate::error::ReviewError;
use crate::scoring::{ConfidenceLevel, MatchCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Search succeeded; waiting for a user or auto-apply decision.
    Pending,
    /// A candidate was selected.
    Matched,
    /// The user deferred this entity.
    Skipped,
    /// The search failed. Terminal until the entity is matched again.
    Error,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Matched => "matched",
            Self::Skipped => "skipped",
            Self::Error => "error",
        }
    }
}

/// Review bucket an [`EntityMatch`] currently falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bucket {
    Auto,
    Review,
    NoMatch,
    Skipped,
}

/// The matching result for one local entity.
///
/// Candidates are sorted by descending score when the record is created and
/// are never reordered afterwards. Only the review actions below change a
/// record. Serialize-only: records are built by the matcher, never parsed.
#[derive(Debug, Clone, Serialize)]
pub struct EntityMatch<L, R> {
    kind: EntityKind,
    local: L,
    candidates: Vec<MatchCandidate<R>>,
    status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected: Option<R>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<L, R> EntityMatch<L, R> {
    /// Record for a successful search. `candidates` must already be ranked.
    pub fn pending(kind: EntityKind, local: L, candidates: Vec<MatchCandidate<R>>) -> Self {
        debug_assert!(candidates.windows(2).all(|w| w[0].score >= w[1].score));
        Self {
            kind,
            local,
            candidates,
            status: MatchStatus::Pending,
            selected: None,
            error: None,
        }
    }

    /// Record for a failed search; the message is kept as given.
    pub fn failed(kind: EntityKind, local: L, message: impl Into<String>) -> Self {
        Self {
            kind,
            local,
            candidates: Vec::new(),
            status: MatchStatus::Error,
            selected: None,
            error: Some(message.into()),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn candidates(&self) -> &[MatchCandidate<R>] {
        &self.candidates
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn selected(&self) -> Option<&R> {
        self.selected.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn top_candidate(&self) -> Option<&MatchCandidate<R>> {
        self.candidates.first()
    }

    pub fn top_confidence(&self) -> Option<ConfidenceLevel> {
        self.top_candidate().map(|c| c.confidence)
    }

    pub(crate) fn bucket(&self) -> Option<Bucket> {
        match self.status {
            MatchStatus::Matched => None,
            MatchStatus::Skipped => Some(Bucket::Skipped),
            MatchStatus::Error => Some(Bucket::NoMatch),
            MatchStatus::Pending => match self.top_confidence() {
                None => Some(Bucket::NoMatch),
                Some(ConfidenceLevel::High) => Some(Bucket::Auto),
                Some(_) => Some(Bucket::Review),
            },
        }
    }

    // ─── Review actions ────────────────────────────────────

    /// Defer this entity. Only pending records can be skipped.
    pub fn skip(&mut self) -> Result<(), ReviewError> {
        self.require(&[MatchStatus::Pending], "skip")?;
        self.status = MatchStatus::Skipped;
        Ok(())
    }

    /// Put a skipped entity back into the pending queue.
    pub fn unskip(&mut self) -> Result<(), ReviewError> {
        self.require(&[MatchStatus::Skipped], "unskip")?;
        self.status = MatchStatus::Pending;
        Ok(())
    }

    /// Select a remote record the user found outside the ranked list.
    pub fn select_candidate(&mut self, remote: R) -> Result<(), ReviewError> {
        self.require(&[MatchStatus::Pending, MatchStatus::Skipped], "select")?;
        self.selected = Some(remote);
        self.status = MatchStatus::Matched;
        Ok(())
    }

    fn require(&self, allowed: &[MatchStatus], action: &'static str) -> Result<(), ReviewError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(ReviewError::InvalidTransition {
                action,
                status: self.status.as_str(),
            })
        }
    }
}

impl<L, R: Clone> EntityMatch<L, R> {
    /// Select the ranked candidate at `index`.
    pub fn select(&mut self, index: usize) -> Result<&R, ReviewError> {
        self.require(&[MatchStatus::Pending, MatchStatus::Skipped], "select")?;
        let len = self.candidates.len();
        let chosen = self
            .candidates
            .get(index)
            .map(|c| c.candidate.clone())
            .ok_or(ReviewError::CandidateOutOfRange { index, len })?;

        self.status = MatchStatus::Matched;
        let selected: &R = self.selected.insert(chosen);
        Ok(selected)
    }
}
