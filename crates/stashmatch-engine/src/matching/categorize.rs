use serde::Serialize;

use crate::matching::record::{Bucket, EntityMatch, MatchStatus};

/// Disjoint review buckets over a collection of match records.
///
/// Matched records appear in none of them. Recompute after every review
/// action; never patch a previous result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedMatches<'a, L, R> {
    /// Pending with a high-confidence top candidate.
    pub auto: Vec<&'a EntityMatch<L, R>>,
    /// Pending with a medium or low top candidate.
    pub review: Vec<&'a EntityMatch<L, R>>,
    /// Pending without candidates, plus every failed search.
    pub no_match: Vec<&'a EntityMatch<L, R>>,
    pub skipped: Vec<&'a EntityMatch<L, R>>,
}

impl<L, R> CategorizedMatches<'_, L, R> {
    pub fn len(&self) -> usize {
        self.auto.len() + self.review.len() + self.no_match.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStats {
    pub total: usize,
    pub matched: usize,
    /// `total - matched - skipped`
    pub unmatched: usize,
    pub skipped: usize,
    pub auto_match_eligible: usize,
}

pub fn categorize<L, R>(matches: &[EntityMatch<L, R>]) -> CategorizedMatches<'_, L, R> {
    let mut categorized = CategorizedMatches {
        auto: Vec::new(),
        review: Vec::new(),
        no_match: Vec::new(),
        skipped: Vec::new(),
    };

    for m in matches {
        match m.bucket() {
            Some(Bucket::Auto) => categorized.auto.push(m),
            Some(Bucket::Review) => categorized.review.push(m),
            Some(Bucket::NoMatch) => categorized.no_match.push(m),
            Some(Bucket::Skipped) => categorized.skipped.push(m),
            None => {}
        }
    }

    categorized
}

pub fn calculate_match_stats<L, R>(matches: &[EntityMatch<L, R>]) -> MatchStats {
    let mut stats = MatchStats {
        total: matches.len(),
        ..Default::default()
    };

    for m in matches {
        match m.status() {
            MatchStatus::Matched => stats.matched += 1,
            MatchStatus::Skipped => stats.skipped += 1,
            MatchStatus::Pending | MatchStatus::Error => {}
        }
        if m.bucket() == Some(Bucket::Auto) {
            stats.auto_match_eligible += 1;
        }
    }

    stats.unmatched = stats.total - stats.matched - stats.skipped;
    stats
}

/// Select the top candidate of every record in the `auto` bucket.
/// Returns how many records were matched.
pub fn auto_apply<L, R: Clone>(matches: &mut [EntityMatch<L, R>]) -> usize {
    let mut applied = 0;
    for m in matches.iter_mut() {
        if m.bucket() == Some(Bucket::Auto) && m.select(0).is_ok() {
            applied += 1;
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::scoring::CandidateRanker;
    use stashmatch_core::{EntityKind, LocalStudio, RemoteStudio};

    type StudioMatch = EntityMatch<LocalStudio, RemoteStudio>;

    fn pending(id: &str, name: &str, candidates: &[&str]) -> StudioMatch {
        let local = LocalStudio::new(id, name);
        let remotes = candidates
            .iter()
            .enumerate()
            .map(|(i, n)| RemoteStudio::new(format!("{id}-r{i}"), *n))
            .collect();
        let ranked = CandidateRanker::default().rank(&local, remotes);
        EntityMatch::pending(EntityKind::Studio, local, ranked)
    }

    fn failed(id: &str) -> StudioMatch {
        EntityMatch::failed(EntityKind::Studio, LocalStudio::new(id, id), "network down")
    }

    fn mixed_batch() -> Vec<StudioMatch> {
        let mut matched = pending("m", "Evil Angel", &["Evil Angel"]);
        matched.select(0).unwrap();
        let mut skipped = pending("s", "Tushy", &["Tushy Raw"]);
        skipped.skip().unwrap();

        vec![
            pending("a", "Brazzers", &["brazzers", "Brazzerz"]),
            pending("r", "Brazzers", &["Brazzerz", "Reality Kings"]),
            pending("l", "Vixen", &["Blacked"]),
            pending("n", "Obscure Studio", &[]),
            failed("e"),
            matched,
            skipped,
        ]
    }

    fn ids(bucket: &[&StudioMatch]) -> Vec<String> {
        bucket.iter().map(|m| m.local().id.clone()).collect()
    }

    #[test]
    fn buckets_follow_status_and_top_confidence() {
        let batch = mixed_batch();
        let c = categorize(&batch);

        assert_eq!(ids(&c.auto), vec!["a"]);
        assert_eq!(ids(&c.review), vec!["r", "l"]);
        assert_eq!(ids(&c.no_match), vec!["n", "e"]);
        assert_eq!(ids(&c.skipped), vec!["s"]);
    }

    #[test]
    fn buckets_are_disjoint_and_cover_all_unmatched() {
        let batch = mixed_batch();
        let c = categorize(&batch);

        let mut seen = HashSet::new();
        for bucket in [&c.auto, &c.review, &c.no_match, &c.skipped] {
            for m in bucket.iter() {
                assert!(seen.insert(m.local().id.clone()), "duplicate {}", m.local().id);
            }
        }
        for m in &batch {
            if m.status() == MatchStatus::Matched {
                seen.insert(m.local().id.clone());
            }
        }
        assert_eq!(seen.len(), batch.len());
        assert_eq!(c.len(), batch.len() - 1);
    }

    #[test]
    fn near_miss_spelling_goes_to_review_not_auto() {
        let batch = vec![pending("1", "Brazzers", &["Brazzerz", "Reality Kings"])];
        let c = categorize(&batch);
        assert!(c.auto.is_empty());
        assert_eq!(c.review.len(), 1);
    }

    #[test]
    fn stats_match_buckets() {
        let batch = mixed_batch();
        let stats = calculate_match_stats(&batch);

        assert_eq!(
            stats,
            MatchStats {
                total: 7,
                matched: 1,
                unmatched: 5,
                skipped: 1,
                auto_match_eligible: 1,
            }
        );
        assert_eq!(stats.unmatched, stats.total - stats.matched - stats.skipped);
    }

    #[test]
    fn stats_of_empty_collection() {
        let stats = calculate_match_stats::<LocalStudio, RemoteStudio>(&[]);
        assert_eq!(stats, MatchStats::default());
        assert!(categorize::<LocalStudio, RemoteStudio>(&[]).is_empty());
    }

    #[test]
    fn auto_apply_selects_only_high_confidence() {
        let mut batch = mixed_batch();
        let applied = auto_apply(&mut batch);
        assert_eq!(applied, 1);

        assert_eq!(batch[0].status(), MatchStatus::Matched);
        assert_eq!(
            batch[0].selected().map(|r| r.name.as_str()),
            Some("brazzers")
        );
        assert_eq!(batch[1].status(), MatchStatus::Pending);

        let stats = calculate_match_stats(&batch);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.auto_match_eligible, 0);
        assert!(categorize(&batch).auto.is_empty());
    }
}
