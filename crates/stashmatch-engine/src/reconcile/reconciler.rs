use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use stashmatch_core::{
    EntityKind, LocalEntity, LocalPerformer, LocalStudio, LocalTag, NameVariants, TempIdAllocator,
};
use tracing::{debug, warn};

use crate::reconcile::scraped::{ScrapedMetadata, unique_names};
use crate::scoring::normalize;
use crate::search::NameSearch;

/// A scraped name attached to an existing catalog entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledName<L> {
    pub name: String,
    pub entity: L,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameFailure {
    pub name: String,
    pub message: String,
}

/// Outcome of reconciling a list of scraped names of one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameReconciliation<L> {
    pub matched: Vec<ReconciledName<L>>,
    /// Names without an exact catalog match, including failed lookups.
    pub unmatched: Vec<String>,
    /// Lookups that failed; each name here also appears in `unmatched`.
    pub errors: Vec<NameFailure>,
}

impl<L> Default for NameReconciliation<L> {
    fn default() -> Self {
        Self {
            matched: Vec::new(),
            unmatched: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<D: Default> NameReconciliation<LocalEntity<D>> {
    /// Temporary entities standing in for every unmatched name.
    pub fn placeholders(&self, ids: &TempIdAllocator) -> Vec<LocalEntity<D>> {
        self.unmatched
            .iter()
            .map(|name| ids.placeholder(name.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StudioReconciliation {
    Matched {
        name: String,
        entity: LocalStudio,
    },
    Unmatched {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// The scrape carried no studio name.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedReconciliation {
    pub performers: NameReconciliation<LocalPerformer>,
    pub tags: NameReconciliation<LocalTag>,
    pub studio: StudioReconciliation,
}

/// Attaches scraped free-text names to existing catalog entities.
///
/// Only exact matches count: the normalized name must equal the normalized
/// primary name or an alias of a returned record. There is no fuzzy
/// fallback, for studios in particular.
pub struct MetadataReconciler {
    performers: Arc<dyn NameSearch<LocalPerformer>>,
    tags: Arc<dyn NameSearch<LocalTag>>,
    studios: Arc<dyn NameSearch<LocalStudio>>,
}

impl MetadataReconciler {
    pub fn new(
        performers: Arc<dyn NameSearch<LocalPerformer>>,
        tags: Arc<dyn NameSearch<LocalTag>>,
        studios: Arc<dyn NameSearch<LocalStudio>>,
    ) -> Self {
        Self {
            performers,
            tags,
            studios,
        }
    }

    pub async fn reconcile_performers(
        &self,
        names: &[String],
    ) -> NameReconciliation<LocalPerformer> {
        reconcile_names(self.performers.as_ref(), EntityKind::Performer, names).await
    }

    pub async fn reconcile_tags(&self, names: &[String]) -> NameReconciliation<LocalTag> {
        reconcile_names(self.tags.as_ref(), EntityKind::Tag, names).await
    }

    /// Single exact lookup of the studio name.
    pub async fn reconcile_studio(&self, name: Option<&str>) -> StudioReconciliation {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return StudioReconciliation::Absent;
        };

        match lookup_exact(self.studios.as_ref(), name).await {
            Ok(Some(entity)) => StudioReconciliation::Matched {
                name: name.to_string(),
                entity,
            },
            Ok(None) => StudioReconciliation::Unmatched {
                name: name.to_string(),
                error: None,
            },
            Err(message) => {
                warn!(kind = %EntityKind::Studio, name, error = %message, "catalog lookup failed");
                StudioReconciliation::Unmatched {
                    name: name.to_string(),
                    error: Some(message),
                }
            }
        }
    }

    pub async fn reconcile_scraped(&self, scraped: &ScrapedMetadata) -> ScrapedReconciliation {
        let performer_names = scraped.performer_names();
        let tag_names = scraped.tag_names();
        let studio_name = scraped.studio_name();

        let (performers, tags, studio) = tokio::join!(
            self.reconcile_performers(&performer_names),
            self.reconcile_tags(&tag_names),
            self.reconcile_studio(studio_name.as_deref()),
        );

        ScrapedReconciliation {
            performers,
            tags,
            studio,
        }
    }
}

async fn reconcile_names<L>(
    search: &dyn NameSearch<L>,
    kind: EntityKind,
    names: &[String],
) -> NameReconciliation<L>
where
    L: NameVariants + Send,
{
    let names = unique_names(names);
    let lookups = join_all(names.iter().map(|name| lookup_exact(search, name))).await;

    let mut outcome = NameReconciliation::default();
    for (name, lookup) in names.into_iter().zip(lookups) {
        match lookup {
            Ok(Some(entity)) => outcome.matched.push(ReconciledName { name, entity }),
            Ok(None) => outcome.unmatched.push(name),
            Err(message) => {
                warn!(kind = %kind, name = %name, error = %message, "catalog lookup failed");
                outcome.errors.push(NameFailure {
                    name: name.clone(),
                    message,
                });
                outcome.unmatched.push(name);
            }
        }
    }

    debug!(
        kind = %kind,
        matched = outcome.matched.len(),
        unmatched = outcome.unmatched.len(),
        "reconciled scraped names"
    );
    outcome
}

/// First record, in search order, whose primary name or alias equals `name`
/// after normalization.
async fn lookup_exact<L: NameVariants>(
    search: &dyn NameSearch<L>,
    name: &str,
) -> Result<Option<L>, String> {
    let wanted = normalize(name);
    let results = search.search(name).await.map_err(|e| e.to_string())?;

    Ok(results.into_iter().find(|record| {
        record
            .name_variants()
            .iter()
            .any(|variant| normalize(variant) == wanted)
    }))
}
