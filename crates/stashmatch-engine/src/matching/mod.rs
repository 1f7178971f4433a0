pub mod apply;
pub mod categorize;
pub mod matcher;
pub mod record;

pub use apply::{ApplyOptions, EntityUpdate, build_update};
pub use categorize::{CategorizedMatches, MatchStats, auto_apply, calculate_match_stats, categorize};
pub use matcher::{
    BatchResult, EntityMatcher, MatchKind, PerformerKind, PerformerMatch, PerformerMatcher,
    StudioKind, StudioMatch, StudioMatcher, TagKind, TagMatch, TagMatcher,
};
pub use record::{EntityMatch, MatchStatus};
