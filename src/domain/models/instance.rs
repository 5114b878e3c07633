//! Live instance models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a representation an instance can be built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Representation(pub String);

impl Representation {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a representation was found for an objective name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    CaseInsensitive,
    /// The configured default was used; admission is degraded.
    Default,
}

impl MatchKind {
    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::Default)
    }
}

/// Result of resolving an objective name against the factory's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub representation: Representation,
    pub kind: MatchKind,
}

/// Where instances are attached when created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceParent {
    pub container: String,
}

impl Default for InstanceParent {
    fn default() -> Self {
        Self {
            container: "ObjectivesContainer".to_string(),
        }
    }
}

/// Opaque handle to a created instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceHandle {
    pub id: Uuid,
    pub objective: String,
    pub representation: Representation,
}

impl InstanceHandle {
    pub fn new(objective: impl Into<String>, representation: Representation) -> Self {
        Self {
            id: Uuid::new_v4(),
            objective: objective.into(),
            representation,
        }
    }
}
