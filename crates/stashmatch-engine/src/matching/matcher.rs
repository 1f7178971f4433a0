use std::marker::PhantomData;
use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use stashmatch_core::{
    EntityKind, LocalPerformer, LocalStudio, LocalTag, MatchConfig, NameVariants, RemotePerformer,
    RemoteStudio, RemoteTag,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Result;
use crate::matching::record::EntityMatch;
use crate::scoring::{CandidateRanker, ConfidenceThresholds};
use crate::search::NameSearch;

// ─── Kinds ──────────────────────────────────────────────────

/// Binds an entity kind to its local and remote record types.
pub trait MatchKind: Send + Sync + 'static {
    const KIND: EntityKind;
    type Local: NameVariants + Clone + Send + Sync + 'static;
    type Remote: NameVariants + Send + Sync + 'static;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StudioKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct PerformerKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct TagKind;

impl MatchKind for StudioKind {
    const KIND: EntityKind = EntityKind::Studio;
    type Local = LocalStudio;
    type Remote = RemoteStudio;
}

impl MatchKind for PerformerKind {
    const KIND: EntityKind = EntityKind::Performer;
    type Local = LocalPerformer;
    type Remote = RemotePerformer;
}

impl MatchKind for TagKind {
    const KIND: EntityKind = EntityKind::Tag;
    type Local = LocalTag;
    type Remote = RemoteTag;
}

pub type StudioMatch = EntityMatch<LocalStudio, RemoteStudio>;
pub type PerformerMatch = EntityMatch<LocalPerformer, RemotePerformer>;
pub type TagMatch = EntityMatch<LocalTag, RemoteTag>;

pub type StudioMatcher = EntityMatcher<StudioKind>;
pub type PerformerMatcher = EntityMatcher<PerformerKind>;
pub type TagMatcher = EntityMatcher<TagKind>;

// ─── Batch result ───────────────────────────────────────────

/// Outcome of a batch run.
///
/// `matches` follows input order. When `cancelled` is set it holds only the
/// fully processed prefix; entities past it were never recorded.
#[derive(Debug, Clone)]
pub struct BatchResult<L, R> {
    pub matches: Vec<EntityMatch<L, R>>,
    pub cancelled: bool,
}

// ─── Matcher ────────────────────────────────────────────────

/// Search → rank → classify for one entity kind.
///
/// Holds no state between calls; construct one per registry connection and
/// share it freely.
pub struct EntityMatcher<K: MatchKind> {
    search: Arc<dyn NameSearch<K::Remote>>,
    ranker: CandidateRanker,
    batch_size: usize,
    _kind: PhantomData<K>,
}

impl<K: MatchKind> Clone for EntityMatcher<K> {
    fn clone(&self) -> Self {
        Self {
            search: Arc::clone(&self.search),
            ranker: self.ranker,
            batch_size: self.batch_size,
            _kind: PhantomData,
        }
    }
}

impl<K: MatchKind> EntityMatcher<K> {
    pub fn new(search: Arc<dyn NameSearch<K::Remote>>) -> Self {
        Self::from_config(search, &MatchConfig::default())
    }

    pub fn from_config(search: Arc<dyn NameSearch<K::Remote>>, config: &MatchConfig) -> Self {
        Self {
            search,
            ranker: CandidateRanker::new(ConfidenceThresholds::from(config)),
            batch_size: config.batch_size.max(1),
            _kind: PhantomData,
        }
    }

    /// Like [`from_config`](Self::from_config) but rejects inconsistent thresholds
    /// instead of silently clamping them.
    pub fn try_from_config(
        search: Arc<dyn NameSearch<K::Remote>>,
        config: &MatchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(search, config))
    }

    pub fn with_thresholds(mut self, thresholds: ConfidenceThresholds) -> Self {
        self.ranker = CandidateRanker::new(thresholds);
        self
    }

    /// Maximum concurrent searches per batch. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn kind(&self) -> EntityKind {
        K::KIND
    }

    /// Search and rank a single entity. Also the retry path for records that
    /// ended in error.
    pub async fn match_entity(&self, entity: &K::Local) -> EntityMatch<K::Local, K::Remote> {
        let name = entity.primary_name();
        match self.search.search(name).await {
            Ok(candidates) => {
                debug!(
                    kind = %K::KIND,
                    entity = name,
                    candidates = candidates.len(),
                    "registry search returned"
                );
                let ranked = self.ranker.rank(entity, candidates);
                EntityMatch::pending(K::KIND, entity.clone(), ranked)
            }
            Err(err) => {
                warn!(kind = %K::KIND, entity = name, error = %err, "registry search failed");
                EntityMatch::failed(K::KIND, entity.clone(), err.to_string())
            }
        }
    }

    /// Match every entity, returning records in input order.
    pub async fn match_batch(&self, entities: &[K::Local]) -> Vec<EntityMatch<K::Local, K::Remote>> {
        self.match_batch_until(entities, &CancellationToken::new())
            .await
            .matches
    }

    /// Like [`match_batch`](Self::match_batch) but stops when `cancel` fires.
    /// In-flight searches are dropped and leave no record behind.
    pub async fn match_batch_until(
        &self,
        entities: &[K::Local],
        cancel: &CancellationToken,
    ) -> BatchResult<K::Local, K::Remote> {
        debug!(
            kind = %K::KIND,
            entities = entities.len(),
            batch_size = self.batch_size,
            "matching batch"
        );

        let mut matches = Vec::with_capacity(entities.len());
        let mut cancelled = false;

        let mut stream = pin!(
            futures::stream::iter(entities)
                .map(|entity| self.match_entity(entity))
                .buffered(self.batch_size)
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                next = stream.next() => match next {
                    Some(m) => matches.push(m),
                    None => break,
                },
            }
        }

        if cancelled {
            debug!(
                kind = %K::KIND,
                processed = matches.len(),
                total = entities.len(),
                "batch cancelled"
            );
        }

        BatchResult { matches, cancelled }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::SearchError;
    use crate::matching::{MatchStatus, categorize};
    use crate::scoring::ConfidenceLevel;
    use crate::search::SearchFn;

    /// In-memory registry: exact query → canned result, optional delay per query.
    #[derive(Default)]
    struct FakeRegistry {
        results: HashMap<String, Result<Vec<RemoteStudio>, SearchError>>,
        delays: HashMap<String, Duration>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        queries: Mutex<Vec<String>>,
    }

    impl FakeRegistry {
        fn with(mut self, query: &str, names: &[&str]) -> Self {
            let candidates = names
                .iter()
                .enumerate()
                .map(|(i, n)| RemoteStudio::new(format!("{query}-{i}"), *n))
                .collect();
            self.results.insert(query.to_string(), Ok(candidates));
            self
        }

        fn failing(mut self, query: &str, err: SearchError) -> Self {
            self.results.insert(query.to_string(), Err(err));
            self
        }

        fn delayed(mut self, query: &str, delay: Duration) -> Self {
            self.delays.insert(query.to_string(), delay);
            self
        }
    }

    #[async_trait]
    impl NameSearch<RemoteStudio> for FakeRegistry {
        async fn search(&self, name: &str) -> Result<Vec<RemoteStudio>, SearchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.queries.lock().unwrap().push(name.to_string());

            if let Some(delay) = self.delays.get(name) {
                tokio::time::sleep(*delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.results.get(name).cloned().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn studios(names: &[&str]) -> Vec<LocalStudio> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| LocalStudio::new(i.to_string(), *n))
            .collect()
    }

    #[tokio::test]
    async fn ranks_candidates_for_each_entity() {
        let registry = FakeRegistry::default().with("Brazzers", &["Reality Kings", "Brazzerz"]);
        let matcher = StudioMatcher::new(Arc::new(registry));

        let matches = matcher.match_batch(&studios(&["Brazzers"])).await;
        assert_eq!(matches.len(), 1);

        let m = &matches[0];
        assert_eq!(m.kind(), EntityKind::Studio);
        assert_eq!(m.status(), MatchStatus::Pending);
        assert_eq!(m.candidates()[0].candidate.name, "Brazzerz");
        assert_eq!(m.candidates()[0].confidence, ConfidenceLevel::Medium);
        assert_eq!(m.candidates()[1].candidate.name, "Reality Kings");
        assert_eq!(m.candidates()[1].confidence, ConfidenceLevel::Low);

        let c = categorize(&matches);
        assert_eq!(c.review.len(), 1);
        assert!(c.auto.is_empty());
    }

    #[tokio::test]
    async fn search_failure_is_recorded_not_dropped() {
        let registry = FakeRegistry::default()
            .with("Vixen", &["Vixen"])
            .failing("Tushy", SearchError::Transport("connection reset".to_string()))
            .with("Blacked", &["Blacked"]);
        let matcher = StudioMatcher::new(Arc::new(registry));

        let matches = matcher
            .match_batch(&studios(&["Vixen", "Tushy", "Blacked"]))
            .await;

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[1].status(), MatchStatus::Error);
        assert_eq!(matches[1].error(), Some("transport error: connection reset"));
        assert!(matches[1].candidates().is_empty());
        assert_eq!(matches[0].status(), MatchStatus::Pending);
        assert_eq!(matches[2].status(), MatchStatus::Pending);
    }

    #[tokio::test]
    async fn empty_search_result_is_pending_without_candidates() {
        let matcher = StudioMatcher::new(Arc::new(FakeRegistry::default()));
        let matches = matcher.match_batch(&studios(&["Unknown Studio"])).await;

        assert_eq!(matches[0].status(), MatchStatus::Pending);
        assert!(matches[0].candidates().is_empty());
        assert!(matches[0].error().is_none());
    }

    #[tokio::test]
    async fn results_keep_input_order_when_searches_finish_out_of_order() {
        let registry = FakeRegistry::default()
            .with("Slow", &["Slow"])
            .with("Fast", &["Fast"])
            .delayed("Slow", Duration::from_millis(40));
        let matcher = StudioMatcher::new(Arc::new(registry)).with_batch_size(4);

        let matches = matcher.match_batch(&studios(&["Slow", "Fast"])).await;
        let names: Vec<&str> = matches.iter().map(|m| m.local().name.as_str()).collect();
        assert_eq!(names, vec!["Slow", "Fast"]);
    }

    #[tokio::test]
    async fn concurrency_is_capped_by_batch_size() {
        let names: Vec<String> = (0..12).map(|i| format!("Studio {i}")).collect();
        let mut registry = FakeRegistry::default();
        for name in &names {
            registry = registry.delayed(name, Duration::from_millis(10));
        }
        let registry = Arc::new(registry);
        let matcher = StudioMatcher::new(registry.clone()).with_batch_size(3);

        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let matches = matcher.match_batch(&studios(&refs)).await;

        assert_eq!(matches.len(), 12);
        let peak = registry.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency {peak}");
        assert!(peak >= 2, "searches never overlapped");
    }

    #[tokio::test]
    async fn cancelled_batch_returns_processed_prefix() {
        let registry = FakeRegistry::default()
            .with("A", &["A"])
            .delayed("B", Duration::from_secs(30));
        let matcher = StudioMatcher::new(Arc::new(registry)).with_batch_size(1);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = matcher
            .match_batch_until(&studios(&["A", "B", "C"]), &cancel)
            .await;

        assert!(result.cancelled);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].local().name, "A");
        assert_eq!(result.matches[0].status(), MatchStatus::Pending);
    }

    #[tokio::test]
    async fn already_cancelled_token_processes_nothing() {
        let registry = Arc::new(FakeRegistry::default());
        let matcher = StudioMatcher::new(registry.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = matcher.match_batch_until(&studios(&["A"]), &cancel).await;
        assert!(result.cancelled);
        assert!(result.matches.is_empty());
        assert!(registry.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rerun_recovers_from_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let search = SearchFn::new(move |name: String| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(SearchError::Timeout(10))
                } else {
                    Ok(vec![RemoteStudio::new("r", name)])
                }
            }
        });
        let matcher = StudioMatcher::new(Arc::new(search));
        let studio = LocalStudio::new("1", "Evil Angel");

        let first = matcher.match_entity(&studio).await;
        assert_eq!(first.status(), MatchStatus::Error);
        assert_eq!(first.error(), Some("search timed out after 10s"));

        let second = matcher.match_entity(&studio).await;
        assert_eq!(second.status(), MatchStatus::Pending);
        assert_eq!(second.candidates()[0].score, 100);
    }

    #[tokio::test]
    async fn config_thresholds_drive_classification() {
        let registry = FakeRegistry::default().with("Brazzers", &["Brazzerz"]);
        let config = MatchConfig {
            auto_match_threshold: 85,
            ..Default::default()
        };
        let matcher = StudioMatcher::from_config(Arc::new(registry), &config);

        let matches = matcher.match_batch(&studios(&["Brazzers"])).await;
        assert_eq!(matches[0].top_confidence(), Some(ConfidenceLevel::High));
        assert_eq!(categorize(&matches).auto.len(), 1);
    }

    #[test]
    fn try_from_config_rejects_inverted_thresholds() {
        let config = MatchConfig {
            auto_match_threshold: 60,
            review_threshold: 80,
            ..Default::default()
        };
        let result = StudioMatcher::try_from_config(Arc::new(FakeRegistry::default()), &config);
        assert!(matches!(result, Err(crate::error::EngineError::Core(_))));
    }
}
