//! stashmatch engine: similarity scoring, candidate ranking, batch matching,
//! review categorization and scrape-time name reconciliation.

pub mod error;
pub mod search;
pub mod scoring;
pub mod matching;
pub mod reconcile;

pub use error::{EngineError, Result, ReviewError, SearchError};
pub use search::{NameSearch, SearchFn};
pub use scoring::{
    CandidateRanker, ConfidenceLevel, ConfidenceThresholds, MatchCandidate, MatchedOn, edit_distance,
    normalize, similarity,
};
pub use matching::{
    ApplyOptions, BatchResult, CategorizedMatches, EntityMatch, EntityMatcher, EntityUpdate,
    MatchKind, MatchStats, MatchStatus, PerformerKind, PerformerMatch, PerformerMatcher,
    StudioKind, StudioMatch, StudioMatcher, TagKind, TagMatch, TagMatcher, auto_apply,
    build_update, calculate_match_stats, categorize,
};
pub use reconcile::{
    MetadataReconciler, NameFailure, NameReconciliation, ReconciledName, ScrapedMetadata,
    ScrapedReconciliation, StudioReconciliation,
};
