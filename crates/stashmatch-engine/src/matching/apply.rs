use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use stashmatch_core::{
    ApplyConfig, EntityKind, EntityRef, LinkedDetails, LocalEntity, NameVariants, RegistryLink,
    RemoteCandidate,
};

use crate::matching::record::{EntityMatch, MatchStatus};
use crate::scoring::normalize;

/// Which attributes of the selected registry record to copy onto the local entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOptions {
    pub include_images: bool,
    pub include_parent_studios: bool,
    pub include_aliases: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            include_images: true,
            include_parent_studios: true,
            include_aliases: true,
        }
    }
}

impl From<&ApplyConfig> for ApplyOptions {
    fn from(config: &ApplyConfig) -> Self {
        Self {
            include_images: config.include_images,
            include_parent_studios: config.include_parent_studios,
            include_aliases: config.include_aliases,
        }
    }
}

/// Changes the caller should write to the catalog for one applied match.
/// `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityUpdate {
    pub id: String,
    pub kind: EntityKind,
    pub registry_link: RegistryLink,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Parent as known to the registry; the caller resolves it to a local id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
}

pub fn build_update<D: LinkedDetails>(
    kind: EntityKind,
    local: &LocalEntity<D>,
    remote: &RemoteCandidate<D>,
    options: ApplyOptions,
    endpoint: &str,
) -> EntityUpdate {
    let image_url = remote
        .image_url
        .clone()
        .filter(|url| options.include_images && !url.trim().is_empty());

    let parent = if options.include_parent_studios {
        remote.details.parent().cloned()
    } else {
        None
    };

    let aliases = if options.include_aliases {
        merge_aliases(local, remote)
    } else {
        None
    };

    EntityUpdate {
        id: local.id.clone(),
        kind,
        registry_link: RegistryLink {
            endpoint: endpoint.to_string(),
            remote_id: remote.remote_id.clone(),
        },
        image_url,
        parent,
        aliases,
    }
}

/// Local aliases verbatim, followed by remote name and aliases not already
/// known under any local name. `None` when the remote adds nothing.
fn merge_aliases<D>(local: &LocalEntity<D>, remote: &RemoteCandidate<D>) -> Option<Vec<String>> {
    let mut seen: HashSet<String> = local.name_variants().into_iter().map(normalize).collect();

    let mut merged = local.aliases.clone();
    let incoming = std::iter::once(&remote.name).chain(remote.aliases.iter());
    for alias in incoming {
        let key = normalize(alias);
        if !key.is_empty() && seen.insert(key) {
            merged.push(alias.trim().to_string());
        }
    }

    (merged.len() > local.aliases.len()).then_some(merged)
}

impl<D: LinkedDetails> EntityMatch<LocalEntity<D>, RemoteCandidate<D>> {
    /// Catalog update for a matched record; `None` until a candidate is selected.
    pub fn to_update(&self, options: ApplyOptions, endpoint: &str) -> Option<EntityUpdate> {
        if self.status() != MatchStatus::Matched {
            return None;
        }
        self.selected()
            .map(|remote| build_update(self.kind(), self.local(), remote, options, endpoint))
    }
}
