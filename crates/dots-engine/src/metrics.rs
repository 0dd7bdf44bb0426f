//! Counters collected over a run and the final run report.
//!
//! [`RunMetrics`] is filled in while ticks resolve; [`RunReport`] is
//! assembled once the run stops, whatever the reason.

use std::fmt;

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    /// No live dots remain.
    Completed,
    /// A dot reached `&`.
    Halted,
    /// Every live dot is parked at a junction without a partner.
    Stalled,
    /// The configured tick limit was reached with dots still alive.
    TickLimit,
    /// The configured output limit was reached.
    OutputLimit,
    /// The host cancelled the run.
    Cancelled,
    /// A runtime fault stopped the run.
    Faulted,
}

impl RunOutcome {
    /// Whether the program itself ended the run, as opposed to a
    /// limit, the host or a fault.
    pub fn is_natural(self) -> bool {
        matches!(self, Self::Completed | Self::Halted | Self::Stalled)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Completed => "completed",
            Self::Halted => "halted",
            Self::Stalled => "stalled",
            Self::TickLimit => "tick limit",
            Self::OutputLimit => "output limit",
            Self::Cancelled => "cancelled",
            Self::Faulted => "faulted",
        };
        f.write_str(s)
    }
}

/// Event counters accumulated over a whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Number of `on_microtick` calls.
    pub microticks: u64,
    /// Warp and library relocations.
    pub warps: u64,
    /// Duplicator splits that spawned at least one clone.
    pub splits: u64,
    /// Operator and tilde firings.
    pub firings: u64,
    /// Input lines requested.
    pub inputs: u64,
    /// Dots removed by the merge policy.
    pub merges: u64,
    /// Wall-clock time for the whole run, in microseconds.
    pub total_us: u64,
}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Why the run stopped.
    pub outcome: RunOutcome,
    /// Ticks resolved.
    pub ticks: u64,
    /// Program outputs accepted within the output limit, delivered or not.
    pub outputs: usize,
    /// Program outputs dropped by the output limit.
    pub outputs_dropped: usize,
    /// Dots created, seeds included.
    pub dots_spawned: u64,
    /// Dots that died.
    pub dots_dead: u64,
    /// Dots still alive when the run stopped.
    pub dots_alive: usize,
    /// Event counters.
    pub metrics: RunMetrics,
}
