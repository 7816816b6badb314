//! Suite-file catalog
//!
//! A suite file lists units, and each unit runs one or more commands. Unit ids
//! are `{suite}.{unit}`. A unit with a single `command` has one sub-case
//! labelled with the unit id. A unit with `cases` has one sub-case per entry,
//! labelled `{suite}.{unit}.{case}`.
//!
//! ```yaml
//! name: smoke
//! units:
//!   - name: boots
//!     command: ["sh", "-c", "exit 0"]
//!   - name: cli
//!     cases:
//!       - name: help
//!         command: ["mytool", "--help"]
//!       - name: flaky-flag
//!         command: ["mytool", "--flaky"]
//!         expect_failure: true
//!   - name: slow
//!     skip: "takes too long on CI"
//!     command: ["sleep", "600"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;
use tracing::debug;

use super::{Catalog, Runnable};
use crate::error::{DiscoveryError, ResolutionError};
use crate::models::{CaseOutcome, UnitId};

/// Suffixes that mark a file as a suite during directory discovery
const SUITE_SUFFIXES: &[&str] = &[".suite.yaml", ".suite.yml", ".suite.json"];

/// On-disk suite description
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuiteFile {
    /// Suite name, defaults to the file name without its suffix
    #[serde(default)]
    pub name: Option<String>,

    /// Environment shared by every unit in the suite
    #[serde(default)]
    pub env: HashMap<String, String>,

    pub units: Vec<UnitSpec>,
}

/// One unit inside a suite
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,

    #[serde(default)]
    pub command: Vec<String>,

    #[serde(default)]
    pub cases: Vec<CaseSpec>,

    /// Skip every case of the unit with this reason
    #[serde(default)]
    pub skip: Option<String>,

    #[serde(default)]
    pub expect_failure: bool,

    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Working directory, relative to the suite file
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

/// One sub-case of a unit
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseSpec {
    pub name: String,

    pub command: Vec<String>,

    #[serde(default)]
    pub skip: Option<String>,

    #[serde(default)]
    pub expect_failure: bool,

    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl SuiteFile {
    /// Load and validate a suite file
    pub fn load(path: &Path) -> Result<Self, DiscoveryError> {
        let content = fs::read_to_string(path)?;
        let invalid = |reason: String| DiscoveryError::InvalidSuite {
            path: path.to_path_buf(),
            reason,
        };

        let suite: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?
        } else {
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?
        };

        suite.validate().map_err(invalid)?;
        Ok(suite)
    }

    fn validate(&self) -> Result<(), String> {
        for unit in &self.units {
            if unit.name.is_empty() {
                return Err("unit with empty name".to_string());
            }
            match (unit.command.is_empty(), unit.cases.is_empty()) {
                (true, true) => {
                    return Err(format!("unit '{}' has neither command nor cases", unit.name))
                }
                (false, false) => {
                    return Err(format!("unit '{}' has both command and cases", unit.name))
                }
                _ => {}
            }
            for case in &unit.cases {
                if case.name.is_empty() || case.command.is_empty() {
                    return Err(format!(
                        "unit '{}' has a case without name or command",
                        unit.name
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Everything needed to run a unit after discovery
#[derive(Debug)]
struct LoadedUnit {
    base_dir: PathBuf,
    suite_env: HashMap<String, String>,
    spec: UnitSpec,
}

/// Catalog backed by suite files on disk
#[derive(Debug, Default)]
pub struct SuiteCatalog {
    units: BTreeMap<UnitId, Arc<LoadedUnit>>,
}

impl SuiteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn load_file(&mut self, path: &Path) -> Result<(), DiscoveryError> {
        let suite = SuiteFile::load(path)?;
        let suite_name = suite
            .name
            .clone()
            .unwrap_or_else(|| suite_name_from_path(path));
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        debug!(
            "loaded {} units from suite {} ({})",
            suite.units.len(),
            suite_name,
            path.display()
        );

        for spec in suite.units {
            let id = UnitId::new(format!("{suite_name}.{}", spec.name));
            if self.units.contains_key(&id) {
                return Err(DiscoveryError::DuplicateUnit(id.to_string()));
            }
            let loaded = LoadedUnit {
                base_dir: base_dir.clone(),
                suite_env: suite.env.clone(),
                spec,
            };
            self.units.insert(id, Arc::new(loaded));
        }
        Ok(())
    }

    fn walk(&mut self, dir: &Path) -> Result<(), DiscoveryError> {
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        entries.sort();

        for path in entries {
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false);
            if path.is_dir() {
                if !hidden {
                    self.walk(&path)?;
                }
            } else if is_suite_file(&path) {
                self.load_file(&path)?;
            }
        }
        Ok(())
    }
}

impl Catalog for SuiteCatalog {
    fn discover(&mut self, target: &str) -> Result<Vec<UnitId>, DiscoveryError> {
        self.units.clear();

        let root = if target.is_empty() { "." } else { target };
        let path = Path::new(root);

        if path.is_dir() {
            self.walk(path)?;
        } else if path.is_file() {
            self.load_file(path)?;
        } else {
            return Err(DiscoveryError::TargetNotFound(root.to_string()));
        }

        Ok(self.units.keys().cloned().collect())
    }

    fn resolve(&self, id: &UnitId) -> Result<Box<dyn Runnable>, ResolutionError> {
        let loaded = self
            .units
            .get(id)
            .ok_or_else(|| ResolutionError::UnknownUnit(id.to_string()))?;

        let cwd = match &loaded.spec.cwd {
            Some(dir) => loaded.base_dir.join(dir),
            None => loaded.base_dir.clone(),
        };
        if !cwd.is_dir() {
            return Err(ResolutionError::Unloadable {
                unit: id.to_string(),
                reason: format!("working directory {} does not exist", cwd.display()),
            });
        }

        Ok(Box::new(CommandUnit {
            id: id.clone(),
            cwd,
            unit: loaded.clone(),
        }))
    }
}

struct CommandUnit {
    id: UnitId,
    cwd: PathBuf,
    unit: Arc<LoadedUnit>,
}

impl CommandUnit {
    fn run_case(
        &self,
        label: String,
        command: &[String],
        skip: Option<&str>,
        expect_failure: bool,
        env: &HashMap<String, String>,
    ) -> CaseOutcome {
        if let Some(reason) = skip {
            return CaseOutcome::skip(label, reason);
        }

        let output = Command::new(&command[0])
            .args(&command[1..])
            .current_dir(&self.cwd)
            .envs(&self.unit.suite_env)
            .envs(&self.unit.spec.env)
            .envs(env)
            .output();

        let outcome = match output {
            Err(e) => CaseOutcome::error(
                label,
                format!("failed to spawn `{}`: {e}\n", command.join(" ")),
            ),
            Ok(output) => match (output.status.success(), expect_failure) {
                (true, false) => CaseOutcome::pass(label),
                (true, true) => CaseOutcome::unexpected_success(label),
                (false, false) => CaseOutcome::fail(label, failure_trace(command, &output)),
                (false, true) => {
                    CaseOutcome::expected_failure(label, failure_trace(command, &output))
                }
            },
        };
        debug!("{} {}", outcome.label, outcome.status);
        outcome
    }
}

impl Runnable for CommandUnit {
    fn run(&self) -> Vec<CaseOutcome> {
        let spec = &self.unit.spec;
        let unit_skip = spec.skip.as_deref();

        if spec.cases.is_empty() {
            return vec![self.run_case(
                self.id.to_string(),
                &spec.command,
                unit_skip,
                spec.expect_failure,
                &HashMap::new(),
            )];
        }

        spec.cases
            .iter()
            .map(|case| {
                self.run_case(
                    format!("{}.{}", self.id, case.name),
                    &case.command,
                    unit_skip.or(case.skip.as_deref()),
                    spec.expect_failure || case.expect_failure,
                    &case.env,
                )
            })
            .collect()
    }
}

fn failure_trace(command: &[String], output: &Output) -> String {
    let mut trace = format!("command `{}` failed: {}\n", command.join(" "), output.status);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stdout.trim().is_empty() {
        trace.push_str("--- stdout ---\n");
        trace.push_str(stdout.trim_end());
        trace.push('\n');
    }
    if !stderr.trim().is_empty() {
        trace.push_str("--- stderr ---\n");
        trace.push_str(stderr.trim_end());
        trace.push('\n');
    }
    trace
}

fn is_suite_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| SUITE_SUFFIXES.iter().any(|s| n.ends_with(s)))
        .unwrap_or(false)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

fn suite_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("suite");
    SUITE_SUFFIXES
        .iter()
        .find_map(|s| file_name.strip_suffix(s))
        .or_else(|| path.file_stem().and_then(|s| s.to_str()))
        .unwrap_or(file_name)
        .to_string()
}
