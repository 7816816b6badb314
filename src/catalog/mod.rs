//! Test catalog collaborators
//!
//! A [`Catalog`] turns a target into unit identifiers and resolves a single
//! identifier into something runnable. The engine never looks inside a unit;
//! it only sees the [`CaseOutcome`]s a [`Runnable`] reports.
//!
//! Two catalogs ship with the crate:
//! - [`MemoryCatalog`] holds units registered in code
//! - [`SuiteCatalog`] reads suite files that describe commands to run

mod memory;
mod suite;

pub use memory::MemoryCatalog;
pub use suite::{CaseSpec, SuiteCatalog, SuiteFile, UnitSpec};

use crate::error::{DiscoveryError, ResolutionError};
use crate::models::{CaseOutcome, UnitId};

/// A loaded unit, ready to execute
pub trait Runnable: Send {
    /// Execute every sub-case of the unit
    ///
    /// Problems inside the unit are reported as outcomes, never as a panic or
    /// an `Err`.
    fn run(&self) -> Vec<CaseOutcome>;
}

/// Source of test units
pub trait Catalog: Send + Sync {
    /// List every unit reachable from `target`
    ///
    /// An empty target means everything the catalog knows about.
    fn discover(&mut self, target: &str) -> Result<Vec<UnitId>, DiscoveryError>;

    /// Load one unit by identifier
    fn resolve(&self, id: &UnitId) -> Result<Box<dyn Runnable>, ResolutionError>;
}
