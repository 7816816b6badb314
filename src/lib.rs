//! unitpool - parallel test unit runner
//!
//! Discovers test units through a [`catalog::Catalog`], runs them on a bounded
//! worker pool and folds every outcome into one [`models::AggregateResult`].
//!
//! ## Usage
//!
//! ```no_run
//! use unitpool::catalog::MemoryCatalog;
//! use unitpool::config::RunConfig;
//! use unitpool::models::CaseStatus;
//!
//! # async fn demo() -> Result<(), unitpool::error::RunError> {
//! let catalog = MemoryCatalog::new()
//!     .case("math.add", CaseStatus::Pass)
//!     .case("math.div", CaseStatus::Fail("division by zero\n".into()));
//!
//! let result = unitpool::run(catalog, "math", &RunConfig::default(), std::io::stdout()).await?;
//! assert!(!result.was_successful());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod output;
pub mod utils;

pub use executor::{run, TestRunner};
