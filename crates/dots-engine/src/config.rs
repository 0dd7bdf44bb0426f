//! Run configuration, validation, and error types.
//!
//! [`RunConfig`] is fixed when an [`Engine`](crate::Engine) is built and
//! never changes during a run. [`validate()`](RunConfig::validate) checks
//! its invariants up front so the tick loop never has to.

use thiserror::Error;

// ── ExecutionMode ───────────────────────────────────────────────

/// Order in which dots are resolved within a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Dots step one after another in id order; each dot sees the
    /// effects of every dot before it in the same tick.
    #[default]
    Sequential,
    /// Every dot steps against the state at tick start, then all
    /// results are committed together in id order.
    Lockstep,
}

// ── MergePolicy ─────────────────────────────────────────────────

/// What happens to travelling dots that end a tick on the same cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MergePolicy {
    /// Dots are independent tokens and simply share the cell.
    #[default]
    Coexist,
    /// The dot with the lowest id survives; the others are merged away.
    KeepEldest,
    /// Every dot on the cell is destroyed.
    DestroyAll,
}

// ── ConfigError ─────────────────────────────────────────────────

/// Errors detected during [`RunConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `max_live_dots` is zero.
    #[error("max_live_dots must be at least 1")]
    DotLimitZero,
    /// `output_limit` is `Some(0)`.
    #[error("output_limit must be at least 1 when set")]
    OutputLimitZero,
}

// ── RunConfig ───────────────────────────────────────────────────

/// Everything that shapes one run of a loaded program.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Tick resolution order. Default: [`ExecutionMode::Sequential`].
    pub mode: ExecutionMode,
    /// Never start a tick past this one. Default: unlimited.
    pub tick_limit: Option<u64>,
    /// Stop after this many program outputs. Default: unlimited.
    pub output_limit: Option<usize>,
    /// Suppress every `on_output` call. Outputs are still counted.
    pub silent: bool,
    /// Collision handling. Default: [`MergePolicy::Coexist`].
    pub merge_policy: MergePolicy,
    /// Upper bound on the dot table. Default: 1 000 000.
    pub max_live_dots: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            tick_limit: None,
            output_limit: None,
            silent: false,
            merge_policy: MergePolicy::default(),
            max_live_dots: 1_000_000,
        }
    }
}

impl RunConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_live_dots == 0 {
            return Err(ConfigError::DotLimitZero);
        }
        if self.output_limit == Some(0) {
            return Err(ConfigError::OutputLimitZero);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = RunConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.mode, ExecutionMode::Sequential);
        assert_eq!(cfg.merge_policy, MergePolicy::Coexist);
        assert_eq!(cfg.tick_limit, None);
    }

    #[test]
    fn zero_dot_limit_is_rejected() {
        let cfg = RunConfig {
            max_live_dots: 0,
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::DotLimitZero));
    }

    #[test]
    fn zero_output_limit_is_rejected() {
        let cfg = RunConfig {
            output_limit: Some(0),
            ..RunConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::OutputLimitZero));
    }

    #[test]
    fn zero_tick_limit_is_allowed() {
        let cfg = RunConfig {
            tick_limit: Some(0),
            ..RunConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
