//! Error types used by the rig runtime and configuration loading.
//!
//! Two enums, split by phase:
//!
//! - [`ConfigError`] — failures while loading or validating the rig
//!   configuration, before anything has been spawned.
//! - [`RigError`] — failures raised while driving a run (spawning a
//!   dependency, losing its readiness channel, launching a test file).
//!
//! Both types provide `as_label()` for stable snake_case identifiers in
//! logs.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating the rig configuration.
///
/// Configuration is read once at startup and validated before any process
/// is spawned; every variant here aborts the run before the startup phase.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML (or is missing fields).
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// The configuration parsed but fails a validation rule.
    #[error("invalid config: {reason}")]
    Invalid {
        /// Human-readable description of the violated rule.
        reason: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "config_read",
            ConfigError::Parse { .. } => "config_parse",
            ConfigError::Invalid { .. } => "config_invalid",
        }
    }
}

/// Errors raised while driving a run.
///
/// Startup errors are not retried and not locally recovered: they bubble up
/// to the controller, which still performs shutdown before the process
/// exits. A failing *test* is not an error — it is an expected outcome
/// reported through the suite's failure count.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RigError {
    /// A dependency process could not be spawned (bad path, cwd,
    /// permissions).
    #[error("failed to spawn dependency '{dependency}': {source}")]
    Spawn {
        /// Name of the dependency from the configuration.
        dependency: String,
        /// Underlying I/O error from the spawn attempt.
        source: std::io::Error,
    },

    /// A dependency exited (or closed its stdout) before it signaled
    /// readiness.
    ///
    /// A dependency that stays alive without ever signaling does *not*
    /// produce this error — the run suspends on its gate indefinitely.
    #[error("dependency '{dependency}' closed its readiness channel before signaling")]
    ReadinessLost {
        /// Name of the dependency from the configuration.
        dependency: String,
    },

    /// A test file could not be executed at all.
    ///
    /// Distinct from a test *failing*, which is counted, not raised.
    #[error("failed to run test file {file:?}: {source}")]
    Suite {
        /// Path of the test file that could not be launched.
        file: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration error surfaced through the run entry point.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RigError::Spawn { .. } => "dependency_spawn",
            RigError::ReadinessLost { .. } => "readiness_lost",
            RigError::Suite { .. } => "suite_exec",
            RigError::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let err = RigError::ReadinessLost {
            dependency: "emulator".into(),
        };
        assert_eq!(err.as_label(), "readiness_lost");

        let err = RigError::Config(ConfigError::Invalid {
            reason: "x".into(),
        });
        assert_eq!(err.as_label(), "config");
    }

    #[test]
    fn test_display_includes_dependency_name() {
        let err = RigError::ReadinessLost {
            dependency: "dynamodb-local".into(),
        };
        assert!(
            err.to_string().contains("dynamodb-local"),
            "message should name the dependency: {err}"
        );
    }
}
