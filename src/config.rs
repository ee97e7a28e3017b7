//! # Run configuration.
//!
//! Provides [`RigConfig`], the immutable description of one run: the
//! dependency processes to start, the test files to execute against them,
//! and the debug/settle knobs.
//!
//! Configuration is read **once** from a TOML file at startup
//! ([`RigConfig::load`]), deserialized with serde and then validated
//! explicitly — a malformed entry fails fast with a descriptive
//! [`ConfigError`] instead of failing deep inside the sequencer. Paths that
//! parse fine but point nowhere still fail at spawn time.
//!
//! ## Field semantics
//! - `dependencies`: started in declaration order; `blocking` entries
//!   sequentially first, the rest concurrently afterwards
//! - `tests`: executed in declaration order; duplicates run twice
//! - `debug`: forwards child stdout/stderr to the rig's own streams
//! - `ready_settle_ms`: wait after a dependency's readiness signal (100)
//! - `suite_settle_ms`: wait after all dependencies are ready, before the
//!   suite runs (500)
//!
//! ## Example
//! ```toml
//! debug = false
//! tests = ["tests/checkout.test", "tests/refund.test"]
//!
//! [[dependencies]]
//! name = "dynamodb-local"
//! run = "bin/start-dynamodb"
//! args = ["--port", "8000"]
//! blocking = true
//!
//! [[dependencies]]
//! name = "sns-mock"
//! run = "bin/sns-mock"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// One external process the test run needs running before tests execute.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencySpec {
    /// Stable, human-readable name; must be unique within the run.
    pub name: String,

    /// Path to the executable to spawn.
    pub run: PathBuf,

    /// Arguments passed to the executable, in order.
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the child; inherits the rig's cwd when absent.
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Whether the next dependency may only start after this one is ready.
    #[serde(default)]
    pub blocking: bool,

    /// Forwards this child's output even when the global flag is off.
    #[serde(default)]
    pub debug: bool,
}

/// Immutable configuration for one run.
///
/// Read once at start; never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigConfig {
    /// Dependency processes, in startup order.
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,

    /// Test files, in execution order.
    #[serde(default)]
    pub tests: Vec<PathBuf>,

    /// Forward dependency stdout/stderr to the rig's own streams.
    #[serde(default)]
    pub debug: bool,

    /// Delay after a dependency's readiness signal before its gate settles,
    /// in milliseconds.
    #[serde(default = "default_ready_settle_ms")]
    pub ready_settle_ms: u64,

    /// Delay after all dependencies are ready before the suite runs, in
    /// milliseconds. Unconditional: it is not skipped or canceled.
    #[serde(default = "default_suite_settle_ms")]
    pub suite_settle_ms: u64,
}

fn default_ready_settle_ms() -> u64 {
    100
}

fn default_suite_settle_ms() -> u64 {
    500
}

impl Default for RigConfig {
    /// An empty run: no dependencies, no tests, default settle delays.
    fn default() -> Self {
        Self {
            dependencies: Vec::new(),
            tests: Vec::new(),
            debug: false,
            ready_settle_ms: default_ready_settle_ms(),
            suite_settle_ms: default_suite_settle_ms(),
        }
    }
}

impl RigConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: RigConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks the rules that serde cannot express.
    ///
    /// - dependency names must be non-empty and unique
    /// - `run` must be a non-empty path
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for dep in &self.dependencies {
            if dep.name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    reason: "dependency with empty name".into(),
                });
            }
            if !seen.insert(dep.name.as_str()) {
                return Err(ConfigError::Invalid {
                    reason: format!("duplicate dependency name '{}'", dep.name),
                });
            }
            if dep.run.as_os_str().is_empty() {
                return Err(ConfigError::Invalid {
                    reason: format!("dependency '{}' has an empty run path", dep.name),
                });
            }
        }
        Ok(())
    }

    /// Readiness settle delay as a [`Duration`].
    #[inline]
    pub fn ready_settle(&self) -> Duration {
        Duration::from_millis(self.ready_settle_ms)
    }

    /// Suite settle delay as a [`Duration`].
    #[inline]
    pub fn suite_settle(&self) -> Duration {
        Duration::from_millis(self.suite_settle_ms)
    }
}
