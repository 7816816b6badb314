//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::Parser;
use std::path::PathBuf;

use unitpool::config::{RunConfig, Verbosity, STRESS_TEST_MULTIPLIER};
use unitpool::output::OutputFormat;
use unitpool::utils::LogLevel;

/// Parallel test runner for suite files
#[derive(Parser, Debug)]
#[command(name = "unitpool")]
#[command(version = "0.1.0")]
#[command(about = "Run test units in parallel and summarize the results")]
#[command(long_about = None)]
pub struct Args {
    /// Suite file or directory to run (defaults to the current directory)
    #[arg(default_value = "")]
    pub target: String,

    /// Print one line per finished unit
    #[arg(short, long)]
    pub verbose: bool,

    /// Print only the final summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Run every unit 10 times
    #[arg(short = 's', long)]
    pub stress_test: bool,

    /// Run every unit N times
    #[arg(long, value_name = "N")]
    pub stress_multiplier: Option<usize>,

    /// Shuffle the order units are started in
    #[arg(short, long)]
    pub randomize: bool,

    /// Seed for a reproducible shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of units to run at once
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub threads: Option<u64>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,

    /// Final report format (text, json)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Also write the final report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// List the discovered units instead of running them
    #[arg(long)]
    pub list: bool,

    /// Describe the UNITPOOL_* environment variables and exit
    #[arg(long)]
    pub env_help: bool,

    /// Write the effective configuration to this file and exit
    #[arg(long, value_name = "FILE")]
    pub init_config: Option<PathBuf>,
}

impl Args {
    pub fn log_level(&self) -> LogLevel {
        if self.debug {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        }
    }

    /// Override `config` with the flags given on the command line
    pub fn apply_to(&self, config: &mut RunConfig) -> anyhow::Result<()> {
        if let Some(verbosity) = Verbosity::from_flags(self.verbose, self.quiet) {
            config.verbosity = verbosity;
        }
        if self.stress_test {
            config.stress_multiplier = STRESS_TEST_MULTIPLIER;
        }
        if let Some(multiplier) = self.stress_multiplier {
            config.stress_multiplier = multiplier;
        }
        if self.randomize {
            config.randomize = true;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(threads) = self.threads {
            config.thread_count = usize::try_from(threads)?;
        }
        if let Some(format) = &self.format {
            config.format = OutputFormat::from_str(format)
                .ok_or_else(|| anyhow::anyhow!("Unknown output format: {format}"))?;
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["unitpool"]);
        assert_eq!(args.target, "");
        assert!(!args.list);
        assert!(args.init_config.is_none());
        assert_eq!(args.log_level(), LogLevel::Warn);

        let mut config = RunConfig::default();
        args.apply_to(&mut config).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_run_args() {
        let args = Args::parse_from([
            "unitpool",
            "tests/",
            "-v",
            "-s",
            "-r",
            "--seed",
            "42",
            "-j",
            "3",
            "--format",
            "json",
            "--debug",
        ]);
        assert_eq!(args.target, "tests/");
        assert_eq!(args.log_level(), LogLevel::Debug);

        let mut config = RunConfig::default();
        args.apply_to(&mut config).unwrap();
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert_eq!(config.stress_multiplier, 10);
        assert!(config.randomize);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.thread_count, 3);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_explicit_multiplier_wins_over_stress_flag() {
        let args = Args::parse_from(["unitpool", "-s", "--stress-multiplier", "3"]);
        let mut config = RunConfig::default();
        args.apply_to(&mut config).unwrap();
        assert_eq!(config.stress_multiplier, 3);
    }

    #[test]
    fn test_cli_overrides_file_layer() {
        let mut config = RunConfig {
            verbosity: Verbosity::Verbose,
            thread_count: 9,
            ..RunConfig::default()
        };
        let args = Args::parse_from(["unitpool", "-q", "--threads", "2"]);
        args.apply_to(&mut config).unwrap();
        assert_eq!(config.verbosity, Verbosity::Quiet);
        assert_eq!(config.thread_count, 2);
    }

    #[test]
    fn test_init_config_flag() {
        let args = Args::parse_from(["unitpool", "-j", "5", "--init-config", "unitpool.yaml"]);
        assert_eq!(args.init_config, Some(PathBuf::from("unitpool.yaml")));
        assert_eq!(args.threads, Some(5));
    }

    #[test]
    fn test_rejects_zero_threads() {
        assert!(Args::try_parse_from(["unitpool", "-j", "0"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_format() {
        let args = Args::parse_from(["unitpool", "-f", "xml"]);
        assert!(args.apply_to(&mut RunConfig::default()).is_err());
    }
}
