use serde::{Deserialize, Serialize};

/// Lightweight reference to another entity, e.g. a studio's parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<EntityRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformerDetails {
    /// Free-text qualifier separating performers who share a name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Kind-specific attributes that can be carried over when a match is applied.
pub trait LinkedDetails {
    /// Parent entity link, for kinds that have one.
    fn parent(&self) -> Option<&EntityRef> {
        None
    }
}

impl LinkedDetails for StudioDetails {
    fn parent(&self) -> Option<&EntityRef> {
        self.parent.as_ref()
    }
}

impl LinkedDetails for PerformerDetails {}

impl LinkedDetails for TagDetails {}
