use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use stashmatch_core::{LocalPerformer, LocalStudio, LocalTag, NameVariants};
use stashmatch_engine::{NameSearch, SearchError, normalize, similarity};

/// Lowest similarity a registry fixture still returns for a query.
const REGISTRY_FLOOR: u8 = 50;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

// ─── Registry ───────────────────────────────────────────────

/// Registry backed by a JSON file of remote records.
///
/// Answers like a fuzzy text-search endpoint: a record is returned when any of
/// its names contains the query or scores at least [`REGISTRY_FLOOR`] against
/// it. File order is kept, standing in for the registry's relevance order.
pub struct FixtureRegistry<T> {
    records: Vec<T>,
}

impl<T: DeserializeOwned> FixtureRegistry<T> {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(read_json(path)?))
    }
}

impl<T> FixtureRegistry<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl<T> NameSearch<T> for FixtureRegistry<T>
where
    T: NameVariants + Clone + Send + Sync,
{
    async fn search(&self, name: &str) -> Result<Vec<T>, SearchError> {
        let query = normalize(name);
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .records
            .iter()
            .filter(|record| {
                record.name_variants().into_iter().any(|variant| {
                    normalize(variant).contains(&query) || similarity(variant, name) >= REGISTRY_FLOOR
                })
            })
            .cloned()
            .collect())
    }
}

// ─── Catalog ────────────────────────────────────────────────

/// Local catalog snapshot used by `reconcile`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogFixture {
    pub performers: Vec<LocalPerformer>,
    pub tags: Vec<LocalTag>,
    pub studios: Vec<LocalStudio>,
}

/// Catalog lookup over one entity list: case-insensitive substring match on
/// any name, the way a catalog's name filter behaves.
pub struct FixtureCatalog<T> {
    records: Vec<T>,
}

impl<T> FixtureCatalog<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl<T> NameSearch<T> for FixtureCatalog<T>
where
    T: NameVariants + Clone + Send + Sync,
{
    async fn search(&self, name: &str) -> Result<Vec<T>, SearchError> {
        let query = normalize(name);
        Ok(self
            .records
            .iter()
            .filter(|record| {
                record
                    .name_variants()
                    .into_iter()
                    .any(|variant| normalize(variant).contains(&query))
            })
            .cloned()
            .collect())
    }
}
