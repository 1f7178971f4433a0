pub mod confidence;
pub mod normalize;
pub mod ranker;
pub mod similarity;

pub use confidence::{ConfidenceLevel, ConfidenceThresholds};
pub use normalize::normalize;
pub use ranker::{CandidateRanker, MatchCandidate, MatchedOn};
pub use similarity::{edit_distance, similarity};
