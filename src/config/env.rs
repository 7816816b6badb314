//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use anyhow::Result;
use std::env;
use std::path::PathBuf;

use super::{RunConfig, Verbosity};
use crate::output::OutputFormat;

/// Environment variable prefix
const ENV_PREFIX: &str = "UNITPOOL";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Worker slots from UNITPOOL_THREADS
    pub thread_count: Option<usize>,
    /// Shuffle from UNITPOOL_RANDOMIZE
    pub randomize: Option<bool>,
    /// Stress multiplier from UNITPOOL_STRESS
    pub stress_multiplier: Option<usize>,
    /// Shuffle seed from UNITPOOL_SEED
    pub seed: Option<u64>,
    /// Verbosity from UNITPOOL_VERBOSITY
    pub verbosity: Option<String>,
    /// Report format from UNITPOOL_FORMAT
    pub format: Option<String>,
    /// Report file from UNITPOOL_OUTPUT
    pub output: Option<String>,
    /// Config file from UNITPOOL_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            thread_count: get_env_parse("THREADS"),
            randomize: get_env_bool("RANDOMIZE"),
            stress_multiplier: get_env_parse("STRESS"),
            seed: get_env_parse("SEED"),
            verbosity: get_env("VERBOSITY"),
            format: get_env("FORMAT"),
            output: get_env("OUTPUT"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.thread_count.is_some()
            || self.randomize.is_some()
            || self.stress_multiplier.is_some()
            || self.seed.is_some()
            || self.verbosity.is_some()
            || self.format.is_some()
            || self.output.is_some()
            || self.config_file.is_some()
    }

    /// Override `config` with every variable that is set
    pub fn apply_to(&self, config: &mut RunConfig) -> Result<()> {
        if let Some(threads) = self.thread_count {
            config.thread_count = threads;
        }
        if let Some(randomize) = self.randomize {
            config.randomize = randomize;
        }
        if let Some(stress) = self.stress_multiplier {
            config.stress_multiplier = stress;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(verbosity) = &self.verbosity {
            config.verbosity = Verbosity::from_str(verbosity).ok_or_else(|| {
                anyhow::anyhow!("Invalid {ENV_PREFIX}_VERBOSITY: {verbosity}")
            })?;
        }
        if let Some(format) = &self.format {
            config.format = OutputFormat::from_str(format)
                .ok_or_else(|| anyhow::anyhow!("Invalid {ENV_PREFIX}_FORMAT: {format}"))?;
        }
        if let Some(output) = &self.output {
            config.output = Some(PathBuf::from(output));
        }
        Ok(())
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Describe every UNITPOOL environment variable
fn env_help() -> String {
    format!(
        "Environment Variables:

  {p}_THREADS     Number of worker slots
  {p}_RANDOMIZE   Shuffle submission order (true/false)
  {p}_STRESS      Run every unit this many times
  {p}_SEED        Seed for a reproducible shuffle
  {p}_VERBOSITY   quiet, normal or verbose
  {p}_FORMAT      Final report format (text, json)
  {p}_OUTPUT      Also write the final report to this file
  {p}_CONFIG      Path to configuration file

Example:
  export {p}_THREADS=16
  export {p}_STRESS=10
  unitpool tests/
",
        p = ENV_PREFIX
    )
}

/// Print all UNITPOOL environment variables
pub fn print_env_help() {
    print!("{}", env_help());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests in this module share process-wide environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Sets UNITPOOL_* variables for the duration of a test
    struct EnvBuilder {
        vars: Vec<(String, String)>,
    }

    impl EnvBuilder {
        /// Create a new environment builder
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn var(mut self, name: &str, value: impl ToString) -> Self {
            self.vars
                .push((format!("{ENV_PREFIX}_{name}"), value.to_string()));
            self
        }

        fn threads(self, threads: usize) -> Self {
            self.var("THREADS", threads)
        }

        fn randomize(self, randomize: bool) -> Self {
            self.var("RANDOMIZE", randomize)
        }

        fn stress(self, multiplier: usize) -> Self {
            self.var("STRESS", multiplier)
        }

        fn seed(self, seed: u64) -> Self {
            self.var("SEED", seed)
        }

        fn verbosity(self, verbosity: &str) -> Self {
            self.var("VERBOSITY", verbosity)
        }

        fn format(self, format: &str) -> Self {
            self.var("FORMAT", format)
        }

        /// Apply and return guard that restores on drop
        fn apply_scoped(self) -> EnvGuard {
            let previous: Vec<_> = self
                .vars
                .iter()
                .map(|(k, _)| (k.clone(), env::var(k).ok()))
                .collect();

            for (key, value) in self.vars {
                env::set_var(key, value);
            }

            EnvGuard { previous }
        }
    }

    /// Guard that restores environment variables on drop
    struct EnvGuard {
        previous: Vec<(String, Option<String>)>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.previous {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_env_help_example_runs_target() {
        let help = env_help();
        assert!(help.contains("UNITPOOL_THREADS"));
        assert!(help.contains("UNITPOOL_CONFIG"));
        assert!(help.trim_end().ends_with("  unitpool tests/"));
        assert!(!help.contains("unitpool run"));
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.thread_count.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_builder() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvBuilder::new()
            .threads(12)
            .stress(10)
            .seed(7)
            .verbosity("verbose")
            .format("json")
            .apply_scoped();

        let env = EnvConfig::load();
        assert_eq!(env.thread_count, Some(12));
        assert_eq!(env.stress_multiplier, Some(10));
        assert_eq!(env.seed, Some(7));
        assert!(env.has_any());

        let mut config = RunConfig::default();
        env.apply_to(&mut config).unwrap();
        assert_eq!(config.thread_count, 12);
        assert_eq!(config.stress_multiplier, 10);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_env_bool_parsing() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _guard = EnvBuilder::new().randomize(true).apply_scoped();
        assert_eq!(EnvConfig::load().randomize, Some(true));
    }

    #[test]
    fn test_guard_restores() {
        let _lock = ENV_LOCK.lock().unwrap();
        {
            let _guard = EnvBuilder::new().seed(99).apply_scoped();
            assert_eq!(EnvConfig::load().seed, Some(99));
        }
        assert_eq!(EnvConfig::load().seed, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let env = EnvConfig {
            verbosity: Some("chatty".to_string()),
            ..Default::default()
        };
        assert!(env.apply_to(&mut RunConfig::default()).is_err());

        let env = EnvConfig {
            format: Some("xml".to_string()),
            ..Default::default()
        };
        assert!(env.apply_to(&mut RunConfig::default()).is_err());
    }
}
