//! Simulation configuration, validation, and error types.
//!
//! [`SimConfig`] is the builder-input for a contention run.
//! [`validate()`](SimConfig::validate) checks structural invariants at
//! startup; [`Simulation`](crate::sim::Simulation) calls it before
//! wiring any threads.

use std::error::Error;
use std::fmt;
use std::time::Duration;

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration for a contention run.
///
/// The defaults reproduce the reference scenario: 5 processes contending
/// for 3 resources over a 60-second budget, with a 5-second wait-suspect
/// threshold, a 10-second voluntary-release threshold, and a 5-second
/// pass interval.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Number of process nodes. IDs are assigned 1..=process_count.
    pub process_count: u32,
    /// Number of resources in the shared pool. IDs are 1..=resource_count.
    pub resource_count: u32,
    /// RNG seed. Each node's selector is seeded from `seed XOR pid`.
    pub seed: u64,
    /// Wall-clock budget for each node's run loop.
    pub run_for: Duration,
    /// Age past which a pending request is suspected stuck.
    pub wait_suspect: Duration,
    /// Age past which a held request is voluntarily released.
    pub usage_complete: Duration,
    /// Sleep between run-loop passes.
    pub pass_interval: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            process_count: 5,
            resource_count: 3,
            seed: 0,
            run_for: Duration::from_secs(60),
            wait_suspect: Duration::from_secs(5),
            usage_complete: Duration::from_secs(10),
            pass_interval: Duration::from_secs(5),
        }
    }
}

impl SimConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.process_count == 0 {
            return Err(ConfigError::NoProcesses);
        }
        if self.resource_count == 0 {
            return Err(ConfigError::NoResources);
        }
        // Zero durations would degenerate the polling model: a zero pass
        // interval busy-spins, and zero thresholds mark every request
        // stale or expired on its first scan.
        for (field, value) in [
            ("run_for", self.run_for),
            ("wait_suspect", self.wait_suspect),
            ("usage_complete", self.usage_complete),
            ("pass_interval", self.pass_interval),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration { field });
            }
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `process_count` is zero.
    NoProcesses,
    /// `resource_count` is zero.
    NoResources,
    /// A duration field is zero.
    ZeroDuration {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A selector was supplied for a different node count.
    SelectorCountMismatch {
        /// Number of selectors supplied.
        supplied: usize,
        /// Configured `process_count`.
        expected: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProcesses => write!(f, "process_count must be at least 1"),
            Self::NoResources => write!(f, "resource_count must be at least 1"),
            Self::ZeroDuration { field } => {
                write!(f, "{field} must be a nonzero duration")
            }
            Self::SelectorCountMismatch { supplied, expected } => {
                write!(
                    f,
                    "got {supplied} selectors for {expected} processes"
                )
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_succeeds() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_zero_processes_fails() {
        let cfg = SimConfig {
            process_count: 0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoProcesses));
    }

    #[test]
    fn validate_zero_resources_fails() {
        let cfg = SimConfig {
            resource_count: 0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoResources));
    }

    #[test]
    fn validate_zero_duration_names_the_field() {
        let cfg = SimConfig {
            pass_interval: Duration::ZERO,
            ..SimConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::ZeroDuration { field }) => {
                assert_eq!(field, "pass_interval");
            }
            other => panic!("expected ZeroDuration, got {other:?}"),
        }
    }

    #[test]
    fn validate_zero_wait_suspect_fails() {
        let cfg = SimConfig {
            wait_suspect: Duration::ZERO,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroDuration { field: "wait_suspect" })
        ));
    }

    #[test]
    fn error_display_is_actionable() {
        let err = ConfigError::SelectorCountMismatch {
            supplied: 2,
            expected: 5,
        };
        let msg = format!("{err}");
        assert!(msg.contains('2'));
        assert!(msg.contains('5'));
    }
}
