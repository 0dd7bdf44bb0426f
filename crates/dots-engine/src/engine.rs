//! The engine: owns the world and the dots, drives ticks to completion.
//!
//! [`Engine`] is built from a [`LoadedProgram`] and a [`RunConfig`].
//! [`run()`](Engine::run) then resolves ticks with the configured
//! schedule until the program ends, a limit is reached, the host
//! cancels, or a runtime fault occurs.
//!
//! # Lifecycle
//!
//! ```text
//! Ready ──run()──► Running ──► Finished     (completed, halted, stalled)
//!                          └─► Terminated   (limits, cancel, fault)
//! ```
//!
//! `run()` may be called once. Every exit path ends with exactly one
//! `on_finish` call on the boundary; a fault is reported through
//! `on_error` immediately before it.

use std::time::Instant;

use dots_core::{DotId, Position, RuntimeFault, TickId};
use dots_grid::{CellKind, LoadedProgram, World};
use tracing::{debug, info, instrument, warn};

use crate::config::{ConfigError, RunConfig};
use crate::dot::{Dot, DotTable};
use crate::io::{CancelToken, IoBoundary, OutputLedger};
use crate::junction::Junctions;
use crate::metrics::{RunMetrics, RunOutcome, RunReport};
use crate::schedule::{self, RunState, TickContext, TickFlow, TickSchedule};

// Compile-time assertion: Engine is Send, so a host can run it on a
// worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Engine>();
    }
};

// ── RunPhase ────────────────────────────────────────────────────

/// Where an engine is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Built, not yet run.
    Ready,
    /// Inside `run()`.
    Running,
    /// The program ended on its own.
    Finished,
    /// A limit, the host or a fault stopped the program.
    Terminated,
}

// ── Engine ──────────────────────────────────────────────────────

/// Runs one loaded program once.
pub struct Engine {
    world: World,
    config: RunConfig,
    schedule: Box<dyn TickSchedule>,
    state: RunState,
    tick: TickId,
    phase: RunPhase,
    cancel: CancelToken,
    report: Option<RunReport>,
}

impl Engine {
    /// Seed one dot per start marker and prepare to run.
    ///
    /// Seeds receive ids `0..n` in the loader's row-major order.
    pub fn new(program: LoadedProgram, config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let LoadedProgram { world, seeds } = program;

        let mut dots = DotTable::new();
        let mut next_id = 0u32;
        for seed in &seeds {
            dots.insert(Dot::new(DotId(next_id), seed.position, seed.direction));
            next_id += 1;
        }

        Ok(Self {
            world,
            schedule: schedule::for_mode(config.mode),
            state: RunState {
                dots,
                junctions: Junctions::new(),
                ledger: OutputLedger::new(config.output_limit, config.silent),
                metrics: RunMetrics::default(),
                next_id,
                spawned: u64::from(next_id),
                dead: 0,
            },
            config,
            tick: TickId::default(),
            phase: RunPhase::Ready,
            cancel: CancelToken::new(),
            report: None,
        })
    }

    /// The world being run.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The current dot table.
    pub fn dots(&self) -> &DotTable {
        &self.state.dots
    }

    /// Dots parked at junctions.
    pub fn junctions(&self) -> &Junctions {
        &self.state.junctions
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// The last tick that was started; `TickId(0)` before the first.
    pub fn current_tick(&self) -> TickId {
        self.tick
    }

    /// A handle that cancels this engine's run when triggered.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The report of the finished run, faults included.
    pub fn report(&self) -> Option<&RunReport> {
        self.report.as_ref()
    }

    /// Replace the glyph at `pos` and reclassify it.
    pub fn rewrite_cell(&mut self, pos: Position, glyph: char) -> Result<CellKind, RuntimeFault> {
        self.world.rewrite(pos, glyph)
    }

    /// Run the program to the end.
    ///
    /// Returns the report for every outcome except a runtime fault,
    /// which is returned as the error after `on_error` and `on_finish`
    /// have been called. A second call returns
    /// [`RuntimeFault::AlreadyFinished`] without touching the boundary.
    #[instrument(skip(self, io), fields(mode = ?self.config.mode, dots = self.state.dots.len()))]
    pub fn run(&mut self, io: &mut dyn IoBoundary) -> Result<RunReport, RuntimeFault> {
        if self.phase != RunPhase::Ready {
            return Err(RuntimeFault::AlreadyFinished);
        }
        self.phase = RunPhase::Running;
        info!(schedule = self.schedule.name(), "run started");

        let started = Instant::now();
        let result = self.drive(io);
        self.state.metrics.total_us = started.elapsed().as_micros() as u64;

        let outcome = match &result {
            Ok(outcome) => *outcome,
            Err(_) => RunOutcome::Faulted,
        };
        self.phase = if outcome.is_natural() {
            RunPhase::Finished
        } else {
            RunPhase::Terminated
        };
        let report = self.build_report(outcome);
        self.report = Some(report.clone());

        match result {
            Ok(_) => {
                info!(
                    %outcome,
                    ticks = report.ticks,
                    outputs = report.outputs,
                    spawned = report.dots_spawned,
                    "run finished"
                );
                io.on_finish();
                Ok(report)
            }
            Err(fault) => {
                warn!(%fault, tick = %self.tick, "run faulted");
                io.on_error(&fault.to_string());
                io.on_finish();
                Err(fault)
            }
        }
    }

    fn drive(&mut self, io: &mut dyn IoBoundary) -> Result<RunOutcome, RuntimeFault> {
        let limit = self.config.max_live_dots;
        if self.state.dots.len() > limit {
            return Err(RuntimeFault::DotLimitExceeded { limit });
        }

        loop {
            let live = self.state.dots.live_count();
            if live == 0 {
                return Ok(RunOutcome::Completed);
            }
            if self.cancel.is_cancelled() {
                return Ok(RunOutcome::Cancelled);
            }
            if let Some(tick_limit) = self.config.tick_limit {
                if self.tick.0 >= tick_limit {
                    self.state.ledger.notice(
                        io,
                        format!("tick limit of {tick_limit} reached with {live} live dot(s)"),
                    );
                    return Ok(RunOutcome::TickLimit);
                }
            }

            self.tick = self.tick.next();
            let flow = {
                let mut ctx = TickContext {
                    world: &self.world,
                    state: &mut self.state,
                    io: &mut *io,
                    cancel: &self.cancel,
                    tick: self.tick,
                    max_live_dots: limit,
                };
                self.schedule.resolve_tick(&mut ctx)?
            };

            let merged = self.state.dots.merge(self.config.merge_policy);
            self.state.metrics.merges += merged as u64;
            self.state.dead += self.state.dots.compact() as u64;
            debug!(
                tick = %self.tick,
                live = self.state.dots.live_count(),
                waiting = self.state.junctions.waiting_count(),
                merged,
                "tick resolved"
            );

            match flow {
                TickFlow::Halted => return Ok(RunOutcome::Halted),
                TickFlow::Cancelled => return Ok(RunOutcome::Cancelled),
                TickFlow::Continue => {}
            }
            if self.state.ledger.limit_reached() {
                let limit = self.config.output_limit.unwrap_or_default();
                self.state
                    .ledger
                    .notice(io, format!("output limit of {limit} reached"));
                return Ok(RunOutcome::OutputLimit);
            }
            let live = self.state.dots.live_count();
            if live > 0 && self.state.dots.waiting_count() == live {
                return Ok(RunOutcome::Stalled);
            }
        }
    }

    fn build_report(&self, outcome: RunOutcome) -> RunReport {
        RunReport {
            outcome,
            ticks: self.tick.0,
            outputs: self.state.ledger.accepted(),
            outputs_dropped: self.state.ledger.dropped(),
            dots_spawned: self.state.spawned,
            dots_dead: self.state.dead,
            dots_alive: self.state.dots.live_count(),
            metrics: self.state.metrics.clone(),
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("schedule", &self.schedule.name())
            .field("phase", &self.phase)
            .field("tick", &self.tick)
            .field("dots", &self.state.dots.len())
            .finish_non_exhaustive()
    }
}
