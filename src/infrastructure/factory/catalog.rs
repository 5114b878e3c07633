//! Catalog-backed instance factory.

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::errors::{SyncError, SyncResult};
use crate::domain::models::{
    names_match, InstanceConfig, InstanceHandle, InstanceParent, MatchKind, Representation,
    Resolution,
};
use crate::domain::ports::InstanceFactory;

/// Resolves representations from an ordered list of known names.
///
/// Created instances are tracked so callers can see what is currently alive
/// (and tests can detect leaks).
#[derive(Debug, Default)]
pub struct CatalogInstanceFactory {
    catalog: Vec<Representation>,
    default: Option<Representation>,
    live: Mutex<HashMap<Uuid, InstanceHandle>>,
}

impl CatalogInstanceFactory {
    pub fn new<I, S>(representations: I, default: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog: Vec<Representation> = Vec::new();
        for name in representations {
            let representation = Representation::new(name);
            if !catalog.contains(&representation) {
                catalog.push(representation);
            }
        }

        Self {
            catalog,
            default: default.filter(|d| !d.is_empty()).map(Representation::new),
            live: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &InstanceConfig) -> Self {
        Self::new(
            config.representations.iter().cloned(),
            config.default_representation.clone(),
        )
    }

    /// Handles created and not yet destroyed.
    pub fn live_handles(&self) -> Vec<InstanceHandle> {
        self.live
            .lock()
            .map(|live| live.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }
}

impl InstanceFactory for CatalogInstanceFactory {
    fn resolve(&self, objective: &str) -> SyncResult<Resolution> {
        if let Some(exact) = self.catalog.iter().find(|r| r.name() == objective) {
            return Ok(Resolution {
                representation: exact.clone(),
                kind: MatchKind::Exact,
            });
        }

        if let Some(folded) = self.catalog.iter().find(|r| names_match(r.name(), objective)) {
            return Ok(Resolution {
                representation: folded.clone(),
                kind: MatchKind::CaseInsensitive,
            });
        }

        self.default
            .as_ref()
            .map(|d| Resolution {
                representation: d.clone(),
                kind: MatchKind::Default,
            })
            .ok_or_else(|| SyncError::NoRepresentation(objective.to_string()))
    }

    fn create(
        &self,
        objective: &str,
        resolution: &Resolution,
        parent: &InstanceParent,
    ) -> InstanceHandle {
        let handle = InstanceHandle::new(objective, resolution.representation.clone());
        if let Ok(mut live) = self.live.lock() {
            live.insert(handle.id, handle.clone());
        }
        info!(
            objective,
            representation = %resolution.representation,
            container = %parent.container,
            instance = %handle.id,
            "instance created"
        );
        handle
    }

    fn destroy(&self, handle: InstanceHandle) {
        let removed = self
            .live
            .lock()
            .map(|mut live| live.remove(&handle.id).is_some())
            .unwrap_or(false);
        debug!(objective = %handle.objective, instance = %handle.id, removed, "instance destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(default: Option<&str>) -> CatalogInstanceFactory {
        CatalogInstanceFactory::new(["Door", "Lamp", "lamp"], default.map(str::to_string))
    }

    #[test]
    fn test_exact_match_wins_over_case_insensitive() {
        let resolved = factory(None).resolve("lamp").unwrap();
        assert_eq!(resolved.representation.name(), "lamp");
        assert_eq!(resolved.kind, MatchKind::Exact);
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let resolved = factory(None).resolve("DOOR").unwrap();
        assert_eq!(resolved.representation.name(), "Door");
        assert_eq!(resolved.kind, MatchKind::CaseInsensitive);
    }

    #[test]
    fn test_default_fallback_and_absence() {
        let resolved = factory(Some("Placeholder")).resolve("Unknown").unwrap();
        assert_eq!(resolved.representation.name(), "Placeholder");
        assert!(resolved.kind.is_degraded());

        assert!(matches!(
            factory(None).resolve("Unknown"),
            Err(SyncError::NoRepresentation(ref name)) if name == "Unknown"
        ));
        assert!(factory(Some("")).resolve("Unknown").is_err());
    }

    #[test]
    fn test_create_and_destroy_track_live_handles() {
        let factory = factory(None);
        let resolution = factory.resolve("Door").unwrap();
        let handle = factory.create("Door", &resolution, &InstanceParent::default());
        assert_eq!(factory.live_count(), 1);
        assert_eq!(handle.objective, "Door");

        factory.destroy(handle);
        assert_eq!(factory.live_count(), 0);
    }
}
