//! The boundary between a running engine and its host.
//!
//! The engine never prints, reads a terminal or sleeps. Everything the
//! outside world sees goes through an [`IoBoundary`]: program output,
//! input requests, per-step [`Microtick`] views, the fatal error (if
//! any) and the final `on_finish`.
//!
//! # Contract
//!
//! - `on_finish` is called exactly once per run, on every exit path.
//! - `on_error` is called at most once, immediately before `on_finish`.
//! - `on_output` is never called when the run is silent.
//! - The boundary only ever receives shared references to engine state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dots_core::TickId;
use dots_grid::World;

use crate::dot::{Dot, DotTable};

// ── Output ──────────────────────────────────────────────────────

/// Something the engine wants shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// One completed print statement, newline included if enabled.
    Text(String),
    /// A message from the engine itself, e.g. a limit being reached.
    Notice(String),
}

impl Output {
    /// The carried text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Notice(s) => s,
        }
    }

    /// Whether this is program output rather than an engine notice.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

// ── Microtick ───────────────────────────────────────────────────

/// Read-only view handed to [`IoBoundary::on_microtick`] after every
/// dot step, warp relocation, junction firing and spawn.
#[derive(Clone, Copy, Debug)]
pub struct Microtick<'a> {
    /// The tick being resolved.
    pub tick: TickId,
    /// The dot that just changed.
    pub dot: &'a Dot,
    /// Every dot, in id order.
    pub dots: &'a DotTable,
    /// The world.
    pub world: &'a World,
}

// ── IoBoundary ──────────────────────────────────────────────────

/// Host-side callbacks for a run.
pub trait IoBoundary {
    /// Block until a line of input is available. `None` means input is
    /// exhausted and reads as zero.
    fn get_input(&mut self) -> Option<String>;

    /// Deliver one output.
    fn on_output(&mut self, output: Output);

    /// Observe one step. Informational only.
    fn on_microtick(&mut self, _view: &Microtick<'_>) {}

    /// The run failed with a fatal error.
    fn on_error(&mut self, message: &str);

    /// The run is over.
    fn on_finish(&mut self);
}

impl<T: IoBoundary + ?Sized> IoBoundary for &mut T {
    fn get_input(&mut self) -> Option<String> {
        (**self).get_input()
    }

    fn on_output(&mut self, output: Output) {
        (**self).on_output(output)
    }

    fn on_microtick(&mut self, view: &Microtick<'_>) {
        (**self).on_microtick(view)
    }

    fn on_error(&mut self, message: &str) {
        (**self).on_error(message)
    }

    fn on_finish(&mut self) {
        (**self).on_finish()
    }
}

// ── CancelToken ─────────────────────────────────────────────────

/// Cooperative cancellation flag shared between an engine and its host.
///
/// Cloning shares the flag. The engine checks it before every tick,
/// before every dot step in sequential mode and around every input
/// request.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

// ── OutputLedger ────────────────────────────────────────────────

/// Applies the silent flag and the output limit to program output.
#[derive(Clone, Debug)]
pub(crate) struct OutputLedger {
    limit: Option<usize>,
    silent: bool,
    produced: usize,
}

impl OutputLedger {
    pub fn new(limit: Option<usize>, silent: bool) -> Self {
        Self {
            limit,
            silent,
            produced: 0,
        }
    }

    /// Record one print statement and deliver it if it fits the limit.
    pub fn emit(&mut self, io: &mut dyn IoBoundary, text: String) {
        self.produced += 1;
        if self.limit.is_some_and(|limit| self.produced > limit) {
            return;
        }
        if !self.silent {
            io.on_output(Output::Text(text));
        }
    }

    /// Deliver an engine notice. Not counted against the limit.
    pub fn notice(&self, io: &mut dyn IoBoundary, text: String) {
        if !self.silent {
            io.on_output(Output::Notice(text));
        }
    }

    /// Outputs accepted within the limit.
    pub fn accepted(&self) -> usize {
        self.limit.map_or(self.produced, |l| self.produced.min(l))
    }

    /// Outputs produced beyond the limit.
    pub fn dropped(&self) -> usize {
        self.produced - self.accepted()
    }

    /// Whether the limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|l| self.produced >= l)
    }
}
