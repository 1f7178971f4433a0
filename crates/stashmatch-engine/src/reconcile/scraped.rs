use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::scoring::normalize;

/// Metadata scraped from a download source, as produced by the extractor.
///
/// Every field is optional because sites expose different subsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedMetadata {
    pub title: Option<String>,
    pub uploader: Option<String>,
    /// Channel name; preferred over `uploader` as the studio.
    pub channel: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub cast: Vec<String>,
    pub creators: Vec<String>,
    pub artist: Option<String>,
    pub webpage_url: Option<String>,
}

impl ScrapedMetadata {
    /// Cast, creators and artist, deduplicated by normalized form.
    pub fn performer_names(&self) -> Vec<String> {
        unique_names(
            self.cast
                .iter()
                .chain(self.creators.iter())
                .chain(self.artist.iter()),
        )
    }

    /// Tags followed by categories, deduplicated by normalized form.
    pub fn tag_names(&self) -> Vec<String> {
        unique_names(self.tags.iter().chain(self.categories.iter()))
    }

    pub fn studio_name(&self) -> Option<String> {
        [&self.channel, &self.uploader]
            .into_iter()
            .flatten()
            .map(|name| name.trim())
            .find(|name| !name.is_empty())
            .map(ToOwned::to_owned)
    }
}

/// Trimmed, non-empty names with case-insensitive duplicates removed;
/// the first spelling wins.
pub(crate) fn unique_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(normalize(name)))
        .map(ToOwned::to_owned)
        .collect()
}
