use serde::{Deserialize, Serialize};
use stashmatch_core::NameVariants;

use crate::scoring::confidence::{ConfidenceLevel, ConfidenceThresholds};
use crate::scoring::similarity::similarity;

/// The local/remote name pair that produced a candidate's best score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedOn {
    pub local: String,
    pub remote: String,
}

/// A remote record scored against one local entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate<R> {
    pub candidate: R,
    pub score: u8,
    pub confidence: ConfidenceLevel,
    pub matched_on: MatchedOn,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateRanker {
    thresholds: ConfidenceThresholds,
}

impl CandidateRanker {
    pub fn new(thresholds: ConfidenceThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> ConfidenceThresholds {
        self.thresholds
    }

    /// Score every candidate and sort by descending score.
    ///
    /// The sort is stable, so equal scores keep the search collaborator's
    /// order. The list is never truncated.
    pub fn rank<L, R>(&self, local: &L, candidates: Vec<R>) -> Vec<MatchCandidate<R>>
    where
        L: NameVariants,
        R: NameVariants,
    {
        let local_variants = local.name_variants();

        let mut ranked: Vec<MatchCandidate<R>> = candidates
            .into_iter()
            .map(|candidate| {
                let (score, matched_on) = best_score(&local_variants, &candidate);
                MatchCandidate {
                    confidence: self.thresholds.classify(score),
                    score,
                    matched_on,
                    candidate,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}

/// Maximum similarity over every (local variant, remote variant) pair.
/// The first pair reaching the maximum wins, primary names first.
fn best_score<R: NameVariants>(local_variants: &[&str], candidate: &R) -> (u8, MatchedOn) {
    let remote_variants = candidate.name_variants();

    let mut best = 0u8;
    let mut best_pair = (local_variants[0], remote_variants[0]);

    'outer: for local in local_variants {
        for remote in &remote_variants {
            let score = similarity(local, remote);
            if score > best {
                best = score;
                best_pair = (*local, *remote);
                if best == 100 {
                    break 'outer;
                }
            }
        }
    }

    (
        best,
        MatchedOn {
            local: best_pair.0.to_string(),
            remote: best_pair.1.to_string(),
        },
    )
}
