//! Engine error types
//!
//! Discovery errors are fatal to a run. Resolution errors are scoped to a
//! single unit and end up as an error entry on that unit's outcome record.
//! [`RunError`] is what a run entry point hands back to its caller.

use std::path::PathBuf;
use thiserror::Error;

/// The catalog target could not be turned into a list of units
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Test target not found: {0}")]
    TargetNotFound(String),

    #[error("Invalid suite file {path}: {reason}")]
    InvalidSuite { path: PathBuf, reason: String },

    #[error("Duplicate test unit: {0}")]
    DuplicateUnit(String),

    #[error("IO error during discovery: {0}")]
    Io(#[from] std::io::Error),
}

/// A unit identifier could not be loaded into something runnable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Unknown test unit: {0}")]
    UnknownUnit(String),

    #[error("Failed to load test unit {unit}: {reason}")]
    Unloadable { unit: String, reason: String },
}

/// A run could not be carried out to the end
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
