use serde::{Deserialize, Serialize};

use crate::models::details::{PerformerDetails, StudioDetails, TagDetails};
use crate::models::temporary::is_temporary_id;

// ─── Name variants ──────────────────────────────────────────

/// Anything carrying a primary name plus alias names.
///
/// Aliases are equally valid for matching: sources disagree on which
/// spelling is canonical.
pub trait NameVariants {
    fn primary_name(&self) -> &str;
    fn alias_names(&self) -> &[String];

    /// Primary name first, then aliases in stored order.
    fn name_variants(&self) -> Vec<&str> {
        std::iter::once(self.primary_name())
            .chain(self.alias_names().iter().map(String::as_str))
            .collect()
    }
}

// ─── Local entity ───────────────────────────────────────────

/// Link from a local entity to its record in a remote registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryLink {
    pub endpoint: String,
    pub remote_id: String,
}

/// A studio, performer or tag as stored in the catalog.
/// The engine only reads these; updates are handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEntity<D> {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default)]
    pub registry_links: Vec<RegistryLink>,

    #[serde(default)]
    pub details: D,
}

impl<D: Default> LocalEntity<D> {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
            image_url: None,
            registry_links: Vec::new(),
            details: D::default(),
        }
    }
}

impl<D> LocalEntity<D> {
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// True for session-scoped placeholders that were never written to the catalog.
    pub fn is_temporary(&self) -> bool {
        is_temporary_id(&self.id)
    }
}

impl<D> NameVariants for LocalEntity<D> {
    fn primary_name(&self) -> &str {
        &self.name
    }

    fn alias_names(&self) -> &[String] {
        &self.aliases
    }
}

// ─── Remote candidate ───────────────────────────────────────

/// The equivalent record held by the remote registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCandidate<D> {
    pub remote_id: String,
    pub name: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default)]
    pub details: D,
}

impl<D: Default> RemoteCandidate<D> {
    pub fn new(remote_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            remote_id: remote_id.into(),
            name: name.into(),
            aliases: Vec::new(),
            image_url: None,
            details: D::default(),
        }
    }
}

impl<D> RemoteCandidate<D> {
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }
}

impl<D> NameVariants for RemoteCandidate<D> {
    fn primary_name(&self) -> &str {
        &self.name
    }

    fn alias_names(&self) -> &[String] {
        &self.aliases
    }
}

// ─── Per-kind aliases ───────────────────────────────────────

pub type LocalStudio = LocalEntity<StudioDetails>;
pub type LocalPerformer = LocalEntity<PerformerDetails>;
pub type LocalTag = LocalEntity<TagDetails>;

pub type RemoteStudio = RemoteCandidate<StudioDetails>;
pub type RemotePerformer = RemoteCandidate<PerformerDetails>;
pub type RemoteTag = RemoteCandidate<TagDetails>;
