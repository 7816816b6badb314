//! In-memory catalog
//!
//! Units are closures registered in code. Used by embedding callers and by
//! the engine's own tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Catalog, Runnable};
use crate::error::{DiscoveryError, ResolutionError};
use crate::models::{CaseOutcome, CaseStatus, UnitId};

type UnitFn = Arc<dyn Fn() -> Vec<CaseOutcome> + Send + Sync>;

/// Catalog of units registered as closures
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    units: BTreeMap<UnitId, UnitFn>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit whose closure reports all of its sub-cases
    pub fn unit<F>(mut self, id: impl Into<UnitId>, f: F) -> Self
    where
        F: Fn() -> Vec<CaseOutcome> + Send + Sync + 'static,
    {
        self.insert(id, f);
        self
    }

    /// Register a unit with a single sub-case labelled with the unit id
    pub fn case(self, id: impl Into<UnitId>, status: CaseStatus) -> Self {
        let id = id.into();
        let label = id.to_string();
        self.unit(id, move || {
            vec![CaseOutcome {
                label: label.clone(),
                status: status.clone(),
            }]
        })
    }

    pub fn insert<F>(&mut self, id: impl Into<UnitId>, f: F)
    where
        F: Fn() -> Vec<CaseOutcome> + Send + Sync + 'static,
    {
        self.units.insert(id.into(), Arc::new(f));
    }
}

impl Catalog for MemoryCatalog {
    fn discover(&mut self, target: &str) -> Result<Vec<UnitId>, DiscoveryError> {
        if target.is_empty() {
            return Ok(self.units.keys().cloned().collect());
        }

        let prefix = format!("{target}.");
        let found: Vec<UnitId> = self
            .units
            .keys()
            .filter(|id| id.as_str() == target || id.as_str().starts_with(&prefix))
            .cloned()
            .collect();

        if found.is_empty() {
            return Err(DiscoveryError::TargetNotFound(target.to_string()));
        }
        Ok(found)
    }

    fn resolve(&self, id: &UnitId) -> Result<Box<dyn Runnable>, ResolutionError> {
        self.units
            .get(id)
            .map(|f| Box::new(ClosureUnit(f.clone())) as Box<dyn Runnable>)
            .ok_or_else(|| ResolutionError::UnknownUnit(id.to_string()))
    }
}

struct ClosureUnit(UnitFn);

impl Runnable for ClosureUnit {
    fn run(&self) -> Vec<CaseOutcome> {
        (self.0)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .case("math.add", CaseStatus::Pass)
            .case("math.sub", CaseStatus::Fail("1 != 2".to_string()))
            .case("mathematics.div", CaseStatus::Pass)
            .case("io.read", CaseStatus::Skip("no disk".to_string()))
    }

    #[test]
    fn test_discover_everything() {
        let ids = catalog().discover("").unwrap();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_discover_prefix_respects_segments() {
        let ids = catalog().discover("math").unwrap();
        let names: Vec<_> = ids.iter().map(UnitId::as_str).collect();
        assert_eq!(names, vec!["math.add", "math.sub"]);

        let exact = catalog().discover("io.read").unwrap();
        assert_eq!(exact, vec![UnitId::from("io.read")]);
    }

    #[test]
    fn test_discover_unknown_target() {
        let err = catalog().discover("network").unwrap_err();
        assert!(matches!(err, DiscoveryError::TargetNotFound(t) if t == "network"));
    }

    #[test]
    fn test_resolve() {
        let catalog = catalog();
        let id = UnitId::from("math.sub");
        let outcomes = catalog.resolve(&id).unwrap().run();
        assert_eq!(outcomes, vec![CaseOutcome::fail("math.sub", "1 != 2")]);

        assert!(matches!(
            catalog.resolve(&UnitId::from("math.mul")),
            Err(ResolutionError::UnknownUnit(_))
        ));
    }
}
