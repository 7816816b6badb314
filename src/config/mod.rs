//! Configuration module
//!
//! Run settings are layered: defaults, then a config file, then environment
//! variables, then command-line flags.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Threads to run when parallelism can't be queried
const FALLBACK_PARALLELISM: usize = 4;

/// Stress multiplier used by the `--stress-test` shorthand
pub const STRESS_TEST_MULTIPLIER: usize = 10;

/// Available parallelism plus two, so blocking units don't starve the pool
pub fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_PARALLELISM)
        + 2
}

/// How much progress output to produce
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "0" => Some(Verbosity::Quiet),
            "normal" | "1" => Some(Verbosity::Normal),
            "verbose" | "2" => Some(Verbosity::Verbose),
            _ => None,
        }
    }

    /// Verbose wins over quiet when both flags are given
    pub fn from_flags(verbose: bool, quiet: bool) -> Option<Self> {
        if verbose {
            Some(Verbosity::Verbose)
        } else if quiet {
            Some(Verbosity::Quiet)
        } else {
            None
        }
    }
}

/// Per-run settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Shuffle the submission order
    pub randomize: bool,

    /// Submit every unit this many times
    pub stress_multiplier: usize,

    /// Number of concurrent worker slots
    pub thread_count: usize,

    pub verbosity: Verbosity,

    /// Seed for a reproducible shuffle
    pub seed: Option<u64>,

    /// Format of the final report
    pub format: OutputFormat,

    /// Also write the final report here
    pub output: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            randomize: false,
            stress_multiplier: 1,
            thread_count: default_thread_count(),
            verbosity: Verbosity::Normal,
            seed: None,
            format: OutputFormat::Text,
            output: None,
        }
    }
}

impl RunConfig {
    /// Build the config from file and environment layers
    ///
    /// The file is `explicit` if given, then the one named by the
    /// environment, then the first one found in the standard locations.
    pub fn layered(explicit: Option<&Path>, env: &EnvConfig) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env.config_file.as_ref().map(PathBuf::from))
            .or_else(ConfigFile::find);

        let mut config = match path {
            Some(path) => {
                ConfigFile::load(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?
                    .run
            }
            None => Self::default(),
        };

        env.apply_to(&mut config)?;
        Ok(config)
    }

    /// True when units are replicated
    pub fn is_stress_run(&self) -> bool {
        self.stress_multiplier > 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.thread_count == 0 {
            anyhow::bail!("thread_count must be at least 1");
        }
        if self.stress_multiplier == 0 {
            anyhow::bail!("stress_multiplier must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert!(!config.randomize);
        assert_eq!(config.stress_multiplier, 1);
        assert!(config.thread_count >= 3);
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert!(!config.is_stress_run());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = RunConfig {
            thread_count: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            stress_multiplier: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(Verbosity::from_str("VERBOSE"), Some(Verbosity::Verbose));
        assert_eq!(Verbosity::from_str("0"), Some(Verbosity::Quiet));
        assert_eq!(Verbosity::from_str("loud"), None);
        assert_eq!(Verbosity::from_flags(true, true), Some(Verbosity::Verbose));
        assert_eq!(Verbosity::from_flags(false, true), Some(Verbosity::Quiet));
        assert_eq!(Verbosity::from_flags(false, false), None);
    }

    #[test]
    fn test_layered_file_then_env() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unitpool.yaml");
        std::fs::write(
            &path,
            "version: \"1.0\"\nrun:\n  thread_count: 3\n  randomize: true\n  verbosity: quiet\n",
        )
        .unwrap();

        let env = EnvConfig {
            thread_count: Some(7),
            ..Default::default()
        };
        let config = RunConfig::layered(Some(&path), &env).unwrap();
        assert_eq!(config.thread_count, 7);
        assert!(config.randomize);
        assert_eq!(config.verbosity, Verbosity::Quiet);
        assert_eq!(config.stress_multiplier, 1);
    }

    #[test]
    fn test_layered_missing_file() {
        let result = RunConfig::layered(Some(Path::new("/no/such/unitpool.yaml")), &EnvConfig::default());
        assert!(result.is_err());
    }
}
