//! Tick schedules: the order in which dots step and commit within a tick.
//!
//! Both schedules share the same per-dot machinery on [`TickContext`]:
//! [`stage`](TickContext::stage) advances a copy of one dot and resolves
//! any input it needs, [`commit`](TickContext::commit) writes the copy
//! back and applies its effects. They differ only in how the two are
//! interleaved.

use dots_core::{Direction, DotId, RuntimeFault, TickId, Value};
use dots_grid::{CellKind, World};
use tracing::{debug, trace};

use crate::config::ExecutionMode;
use crate::dot::{DeathCause, Dot, DotState, DotTable, Mode, Register};
use crate::io::{CancelToken, IoBoundary, Microtick, OutputLedger};
use crate::junction::{Junctions, Pairing};
use crate::metrics::RunMetrics;
use crate::step::{self, Effect, Effects};

// ── RunState ────────────────────────────────────────────────────

/// Mutable state of one run, owned by the engine and lent to the
/// schedule for the duration of a tick.
#[derive(Debug)]
pub(crate) struct RunState {
    pub dots: DotTable,
    pub junctions: Junctions,
    pub ledger: OutputLedger,
    pub metrics: RunMetrics,
    pub next_id: u32,
    pub spawned: u64,
    pub dead: u64,
}

// ── TickContext ─────────────────────────────────────────────────

/// How a tick ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TickFlow {
    /// Every scheduled dot was resolved.
    Continue,
    /// A dot reached `&`; every dot is dead.
    Halted,
    /// Cancellation was observed part-way.
    Cancelled,
}

/// One dot's uncommitted step.
#[derive(Debug)]
pub(crate) struct Staged {
    dot: Dot,
    effects: Effects,
}

pub(crate) enum Stage {
    Ready(Staged),
    Cancelled,
}

/// Everything a schedule may touch while resolving one tick.
pub(crate) struct TickContext<'a> {
    pub world: &'a World,
    pub state: &'a mut RunState,
    pub io: &'a mut dyn IoBoundary,
    pub cancel: &'a CancelToken,
    pub tick: TickId,
    pub max_live_dots: usize,
}

impl TickContext<'_> {
    /// Advance a copy of `id` by one step. Input is requested here, so a
    /// staged dot never needs the boundary again before it commits.
    pub fn stage(&mut self, id: DotId) -> Result<Stage, RuntimeFault> {
        let mut next = self
            .state
            .dots
            .get(id)
            .cloned()
            .ok_or(RuntimeFault::UnknownDot { id })?;
        let effects = step::advance(self.world, &mut next)?;
        trace!(tick = %self.tick, dot = %id, at = %next.position, dir = %next.direction, "step");

        let mut pending = Effects::new();
        for effect in effects {
            match effect {
                Effect::Input(register) => {
                    if !self.read_input(&mut next, register)? {
                        return Ok(Stage::Cancelled);
                    }
                }
                other => pending.push(other),
            }
        }
        Ok(Stage::Ready(Staged {
            dot: next,
            effects: pending,
        }))
    }

    fn read_input(&mut self, dot: &mut Dot, register: Register) -> Result<bool, RuntimeFault> {
        if self.cancel.is_cancelled() {
            return Ok(false);
        }
        let line = self.io.get_input();
        self.state.metrics.inputs += 1;
        if self.cancel.is_cancelled() {
            return Ok(false);
        }
        let text = line.unwrap_or_default();
        let Some(value) = Value::parse(&text) else {
            return Err(RuntimeFault::InvalidInput { text });
        };
        trace!(dot = %dot.id, %value, ?register, "input");
        dot.set_register(register, value);
        dot.state = DotState::Alive(Mode::Travel);
        Ok(true)
    }

    /// Write a staged dot back and apply its effects in order.
    pub fn commit(&mut self, staged: Staged) -> Result<TickFlow, RuntimeFault> {
        let Staged { dot, effects } = staged;
        let id = dot.id;

        for effect in &effects {
            if let Effect::Relocated { from } = effect {
                let mut entrance = dot.clone();
                entrance.position = *from;
                self.state.metrics.warps += 1;
                self.show(&entrance);
            }
        }
        if !self.state.dots.replace(dot) {
            return Err(RuntimeFault::UnknownDot { id });
        }
        self.microtick(id);

        for effect in effects {
            match effect {
                Effect::Output(text) => self.state.ledger.emit(&mut *self.io, text),
                Effect::Split(dirs) => self.spawn(id, &dirs)?,
                Effect::Arrive { at, axis } => {
                    if let Some(pairing) = self.state.junctions.arrive(at, axis, id) {
                        self.fire(pairing)?;
                    }
                }
                Effect::Halt => {
                    self.halt(id);
                    return Ok(TickFlow::Halted);
                }
                Effect::Relocated { .. } | Effect::Input(_) => {}
            }
        }
        Ok(TickFlow::Continue)
    }

    fn spawn(&mut self, parent: DotId, dirs: &[Direction]) -> Result<(), RuntimeFault> {
        let parent = self
            .state
            .dots
            .get(parent)
            .cloned()
            .ok_or(RuntimeFault::UnknownDot { id: parent })?;
        self.state.metrics.splits += 1;
        for &dir in dirs {
            let limit = self.max_live_dots;
            // Dots that died earlier this tick are still in the table
            // until compaction.
            if self.state.dots.live_count() >= limit {
                return Err(RuntimeFault::DotLimitExceeded { limit });
            }
            let id = DotId(self.state.next_id);
            self.state.next_id = self
                .state
                .next_id
                .checked_add(1)
                .ok_or(RuntimeFault::DotLimitExceeded { limit })?;
            self.state.spawned += 1;
            self.state.dots.insert(Dot::split_from(&parent, id, dir));
            trace!(tick = %self.tick, parent = %parent.id, dot = %id, %dir, "split");
            self.microtick(id);
        }
        Ok(())
    }

    /// Resolve a pairing at an operator or tilde.
    fn fire(&mut self, pairing: Pairing) -> Result<(), RuntimeFault> {
        let at = pairing.at;
        let kind = self.world.classify(at);
        let (survivor, consumed) = match kind {
            CellKind::Operator(_, style) => {
                let primary = style.primary_axis();
                (pairing.on(primary), pairing.on(primary.perpendicular()))
            }
            CellKind::Tilde { .. } => (pairing.horizontal, pairing.vertical),
            _ => return Err(RuntimeFault::UnexpectedJunction { at }),
        };

        let other = self.value_of(consumed)?;
        let own = self.value_of(survivor)?;
        let dot = self
            .state
            .dots
            .get_mut(survivor)
            .ok_or(RuntimeFault::UnknownDot { id: survivor })?;
        match kind {
            CellKind::Operator(op, _) => {
                dot.value = op
                    .apply(own, other)
                    .ok_or(RuntimeFault::DivisionByZero { at })?;
            }
            CellKind::Tilde { inverted } => {
                if other.is_truthy() != inverted {
                    dot.direction = Direction::Up;
                }
            }
            _ => {}
        }
        dot.state = DotState::Alive(Mode::Travel);
        if let Some(gone) = self.state.dots.get_mut(consumed) {
            gone.kill(DeathCause::Consumed);
        }
        self.state.metrics.firings += 1;
        trace!(tick = %self.tick, %at, %survivor, %consumed, "junction fired");
        self.microtick(survivor);
        Ok(())
    }

    fn value_of(&self, id: DotId) -> Result<Value, RuntimeFault> {
        self.state
            .dots
            .get(id)
            .map(|d| d.value)
            .ok_or(RuntimeFault::UnknownDot { id })
    }

    fn halt(&mut self, by: DotId) {
        let killed = self.state.dots.kill_all(DeathCause::Halted);
        self.state.junctions.clear();
        debug!(tick = %self.tick, dot = %by, killed, "halted");
    }

    /// Report the table's copy of `id` to the boundary.
    fn microtick(&mut self, id: DotId) {
        let Some(dot) = self.state.dots.get(id) else {
            return;
        };
        self.state.metrics.microticks += 1;
        self.io.on_microtick(&Microtick {
            tick: self.tick,
            dot,
            dots: &self.state.dots,
            world: self.world,
        });
    }

    /// Report a dot that is not (or not yet) in the table.
    fn show(&mut self, dot: &Dot) {
        self.state.metrics.microticks += 1;
        self.io.on_microtick(&Microtick {
            tick: self.tick,
            dot,
            dots: &self.state.dots,
            world: self.world,
        });
    }
}

// ── TickSchedule ────────────────────────────────────────────────

/// Resolves one tick over a [`TickContext`].
pub(crate) trait TickSchedule: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Step every dot due this tick.
    fn resolve_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<TickFlow, RuntimeFault>;
}

/// The schedule for `mode`.
pub(crate) fn for_mode(mode: ExecutionMode) -> Box<dyn TickSchedule> {
    match mode {
        ExecutionMode::Sequential => Box::new(SequentialSchedule),
        ExecutionMode::Lockstep => Box::new(LockstepSchedule),
    }
}

/// Step and commit each dot before the next one moves.
///
/// Iterates the dots alive at tick start in id order. A dot released
/// from a junction by an earlier dot in the same tick takes its step
/// when its turn comes; clones spawned this tick wait for the next one.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SequentialSchedule;

impl TickSchedule for SequentialSchedule {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn resolve_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<TickFlow, RuntimeFault> {
        for id in ctx.state.dots.live_ids() {
            if ctx.cancel.is_cancelled() {
                return Ok(TickFlow::Cancelled);
            }
            if !ctx.state.dots.get(id).is_some_and(Dot::is_active) {
                continue;
            }
            let staged = match ctx.stage(id)? {
                Stage::Ready(staged) => staged,
                Stage::Cancelled => return Ok(TickFlow::Cancelled),
            };
            match ctx.commit(staged)? {
                TickFlow::Continue => {}
                flow => return Ok(flow),
            }
        }
        Ok(TickFlow::Continue)
    }
}

/// Step every active dot against the tick-start state, then commit
/// them all in id order.
///
/// Dots released from a junction during the commit take their next
/// step on the following tick.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LockstepSchedule;

impl TickSchedule for LockstepSchedule {
    fn name(&self) -> &'static str {
        "lockstep"
    }

    fn resolve_tick(&mut self, ctx: &mut TickContext<'_>) -> Result<TickFlow, RuntimeFault> {
        let ids = ctx.state.dots.active_ids();
        let mut staged = Vec::with_capacity(ids.len());
        for id in ids {
            match ctx.stage(id)? {
                Stage::Ready(s) => staged.push(s),
                Stage::Cancelled => return Ok(TickFlow::Cancelled),
            }
        }
        for s in staged {
            match ctx.commit(s)? {
                TickFlow::Continue => {}
                flow => return Ok(flow),
            }
        }
        Ok(TickFlow::Continue)
    }
}
