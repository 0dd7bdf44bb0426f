//! Dots and the table that owns them.
//!
//! A [`Dot`] is a token moving over the world. Its [`DotState`] is either
//! alive in some [`Mode`] or dead with a [`DeathCause`]; dead dots stay in
//! the [`DotTable`] until the end of the tick they died in, so every
//! microtick of that tick can still show them.

use std::fmt;

use dots_core::{Direction, DotId, Position, Value};
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::config::MergePolicy;

// ── Register ────────────────────────────────────────────────────

/// One of the two numbers a dot carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    /// The value register, set by `#`.
    Value,
    /// The tag register, set by `@`.
    Tag,
}

// ── Mode ────────────────────────────────────────────────────────

/// What a living dot is currently doing.
#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
    /// Following track.
    Travel,
    /// Collecting the digits after `#` or `@`.
    ReadNumber {
        /// Register the number goes into.
        register: Register,
        /// Digits read so far, if any.
        digits: Option<Value>,
    },
    /// Standing on `?` until the boundary supplies a line.
    AwaitingInput {
        /// Register the input goes into.
        register: Register,
    },
    /// Inside a `$` print statement.
    Print {
        /// Append a newline when the statement completes.
        newline: bool,
        /// Print registers as characters instead of numbers.
        ascii: bool,
        /// Closing quote of the literal being read, if inside one.
        quote: Option<char>,
        /// Literal text collected so far.
        text: String,
    },
    /// Parked at an operator or tilde until a partner arrives.
    Waiting {
        /// The junction cell.
        at: Position,
    },
}

// ── DeathCause ──────────────────────────────────────────────────

/// Why a dot stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Moved outside its region.
    OffGrid,
    /// Moved onto a blank cell or a track it cannot follow.
    Derailed,
    /// Absorbed by an operator or tilde as the secondary operand.
    Consumed,
    /// The program reached `&`.
    Halted,
    /// Removed by the collision policy.
    Merged,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OffGrid => "off grid",
            Self::Derailed => "derailed",
            Self::Consumed => "consumed",
            Self::Halted => "halted",
            Self::Merged => "merged",
        };
        f.write_str(s)
    }
}

/// Alive in a mode, or dead for a reason.
#[derive(Clone, Debug, PartialEq)]
pub enum DotState {
    /// Still running.
    Alive(Mode),
    /// Finished; removed at the end of the tick.
    Dead(DeathCause),
}

// ── Dot ─────────────────────────────────────────────────────────

/// A token travelling over the world.
#[derive(Clone, Debug, PartialEq)]
pub struct Dot {
    /// Stable identity for the whole run.
    pub id: DotId,
    /// Current cell.
    pub position: Position,
    /// Heading for the next step.
    pub direction: Direction,
    /// Value register.
    pub value: Value,
    /// Tag register.
    pub tag: Value,
    /// Alive or dead.
    pub state: DotState,
    /// Set on both halves of a duplicator split until their next step.
    pub just_split: bool,
}

impl Dot {
    /// A fresh travelling dot with both registers zero.
    pub fn new(id: DotId, position: Position, direction: Direction) -> Self {
        Self {
            id,
            position,
            direction,
            value: Value::ZERO,
            tag: Value::ZERO,
            state: DotState::Alive(Mode::Travel),
            just_split: false,
        }
    }

    /// A copy of `parent` heading `direction`, under a new id.
    pub fn split_from(parent: &Dot, id: DotId, direction: Direction) -> Self {
        Self {
            id,
            position: parent.position,
            direction,
            value: parent.value,
            tag: parent.tag,
            state: DotState::Alive(Mode::Travel),
            just_split: true,
        }
    }

    /// The mode, if alive.
    pub fn mode(&self) -> Option<&Mode> {
        match &self.state {
            DotState::Alive(mode) => Some(mode),
            DotState::Dead(_) => None,
        }
    }

    /// The death cause, if dead.
    pub fn death(&self) -> Option<DeathCause> {
        match self.state {
            DotState::Alive(_) => None,
            DotState::Dead(cause) => Some(cause),
        }
    }

    /// Whether the dot is alive.
    pub fn is_alive(&self) -> bool {
        matches!(self.state, DotState::Alive(_))
    }

    /// Whether the dot is parked at a junction.
    pub fn is_waiting(&self) -> bool {
        matches!(self.state, DotState::Alive(Mode::Waiting { .. }))
    }

    /// Whether the dot takes a step this tick: alive and not waiting.
    pub fn is_active(&self) -> bool {
        self.is_alive() && !self.is_waiting()
    }

    /// Mark the dot dead.
    pub fn kill(&mut self, cause: DeathCause) {
        self.state = DotState::Dead(cause);
    }

    /// Read a register.
    pub fn register(&self, register: Register) -> Value {
        match register {
            Register::Value => self.value,
            Register::Tag => self.tag,
        }
    }

    /// Write a register.
    pub fn set_register(&mut self, register: Register, value: Value) {
        match register {
            Register::Value => self.value = value,
            Register::Tag => self.tag = value,
        }
    }
}

// ── DotTable ────────────────────────────────────────────────────

/// Every dot of a run, iterated in ascending [`DotId`] order.
///
/// Ids are assigned monotonically and only ever appended, so insertion
/// order is id order and stays that way through compaction.
#[derive(Clone, Debug, Default)]
pub struct DotTable {
    dots: IndexMap<DotId, Dot>,
}

impl DotTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dots in the table, dead ones included.
    pub fn len(&self) -> usize {
        self.dots.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    /// Number of living dots.
    pub fn live_count(&self) -> usize {
        self.dots.values().filter(|d| d.is_alive()).count()
    }

    /// Number of dots parked at junctions.
    pub fn waiting_count(&self) -> usize {
        self.dots.values().filter(|d| d.is_waiting()).count()
    }

    /// A dot by id.
    pub fn get(&self, id: DotId) -> Option<&Dot> {
        self.dots.get(&id)
    }

    /// A mutable dot by id.
    pub fn get_mut(&mut self, id: DotId) -> Option<&mut Dot> {
        self.dots.get_mut(&id)
    }

    /// All dots in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Dot> + '_ {
        self.dots.values()
    }

    /// Ids of every living dot, in id order.
    pub fn live_ids(&self) -> Vec<DotId> {
        self.dots
            .values()
            .filter(|d| d.is_alive())
            .map(|d| d.id)
            .collect()
    }

    /// Ids of the dots that take a step, in id order.
    pub fn active_ids(&self) -> Vec<DotId> {
        self.dots
            .values()
            .filter(|d| d.is_active())
            .map(|d| d.id)
            .collect()
    }

    /// Append a dot. Its id must be higher than every id already present.
    pub(crate) fn insert(&mut self, dot: Dot) {
        debug_assert!(self.dots.last().is_none_or(|(last, _)| *last < dot.id));
        self.dots.insert(dot.id, dot);
    }

    /// Replace a dot with its updated copy. Returns `false` if the id
    /// is unknown.
    pub(crate) fn replace(&mut self, dot: Dot) -> bool {
        match self.dots.get_mut(&dot.id) {
            Some(slot) => {
                *slot = dot;
                true
            }
            None => false,
        }
    }

    /// Kill every living dot. Returns how many died.
    pub(crate) fn kill_all(&mut self, cause: DeathCause) -> usize {
        let mut killed = 0;
        for dot in self.dots.values_mut().filter(|d| d.is_alive()) {
            dot.kill(cause);
            killed += 1;
        }
        killed
    }

    /// Apply the collision policy to travelling dots that share a cell.
    /// Dots parked at junctions and both halves of a fresh split are
    /// exempt. Returns how many dots were merged away.
    pub(crate) fn merge(&mut self, policy: MergePolicy) -> usize {
        if policy == MergePolicy::Coexist {
            return 0;
        }
        let mut cells: IndexMap<Position, SmallVec<[DotId; 2]>> = IndexMap::new();
        for dot in self.dots.values() {
            if dot.is_active() && !dot.just_split {
                cells.entry(dot.position).or_default().push(dot.id);
            }
        }

        let mut merged = 0;
        for ids in cells.values().filter(|ids| ids.len() > 1) {
            let skip = match policy {
                MergePolicy::KeepEldest => 1,
                MergePolicy::DestroyAll => 0,
                MergePolicy::Coexist => ids.len(),
            };
            for id in ids.iter().skip(skip) {
                if let Some(dot) = self.dots.get_mut(id) {
                    dot.kill(DeathCause::Merged);
                    merged += 1;
                }
            }
        }
        merged
    }

    /// Drop dead dots. Returns how many were removed.
    pub(crate) fn compact(&mut self) -> usize {
        let before = self.dots.len();
        self.dots.retain(|_, d| d.is_alive());
        before - self.dots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(id: u32, x: i32) -> Dot {
        Dot::new(DotId(id), Position::main(x, 0), Direction::Right)
    }

    fn table(dots: impl IntoIterator<Item = Dot>) -> DotTable {
        let mut t = DotTable::new();
        for d in dots {
            t.insert(d);
        }
        t
    }

    #[test]
    fn split_copies_registers_under_new_id() {
        let mut parent = dot(0, 3);
        parent.value = Value::Int(9);
        parent.tag = Value::Int(4);
        let child = Dot::split_from(&parent, DotId(5), Direction::Down);
        assert_eq!(child.id, DotId(5));
        assert_eq!(child.position, parent.position);
        assert_eq!(child.direction, Direction::Down);
        assert_eq!((child.value, child.tag), (Value::Int(9), Value::Int(4)));
        assert!(child.just_split);
        assert!(child.is_active());
    }

    #[test]
    fn waiting_dots_are_alive_but_inactive() {
        let mut d = dot(0, 0);
        d.state = DotState::Alive(Mode::Waiting {
            at: Position::main(0, 0),
        });
        assert!(d.is_alive());
        assert!(d.is_waiting());
        assert!(!d.is_active());
    }

    #[test]
    fn registers_read_and_write() {
        let mut d = dot(0, 0);
        d.set_register(Register::Tag, Value::Int(7));
        assert_eq!(d.register(Register::Tag), Value::Int(7));
        assert_eq!(d.register(Register::Value), Value::ZERO);
    }

    #[test]
    fn compaction_keeps_id_order() {
        let mut t = table([dot(0, 0), dot(1, 1), dot(2, 2)]);
        t.get_mut(DotId(1)).unwrap().kill(DeathCause::OffGrid);
        assert_eq!(t.live_count(), 2);
        assert_eq!(t.compact(), 1);
        let ids: Vec<DotId> = t.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![DotId(0), DotId(2)]);
    }

    #[test]
    fn keep_eldest_spares_lowest_id() {
        let mut t = table([dot(0, 4), dot(1, 4), dot(2, 4), dot(3, 9)]);
        assert_eq!(t.merge(MergePolicy::KeepEldest), 2);
        assert!(t.get(DotId(0)).unwrap().is_alive());
        assert_eq!(t.get(DotId(1)).unwrap().death(), Some(DeathCause::Merged));
        assert_eq!(t.get(DotId(2)).unwrap().death(), Some(DeathCause::Merged));
        assert!(t.get(DotId(3)).unwrap().is_alive());
    }

    #[test]
    fn destroy_all_kills_every_colliding_dot() {
        let mut t = table([dot(0, 4), dot(1, 4), dot(2, 5)]);
        assert_eq!(t.merge(MergePolicy::DestroyAll), 2);
        assert_eq!(t.live_count(), 1);
    }

    #[test]
    fn coexist_merges_nothing() {
        let mut t = table([dot(0, 4), dot(1, 4)]);
        assert_eq!(t.merge(MergePolicy::Coexist), 0);
        assert_eq!(t.live_count(), 2);
    }

    #[test]
    fn fresh_splits_are_exempt_from_merging() {
        let mut parent = dot(0, 4);
        parent.just_split = true;
        let child = Dot::split_from(&parent, DotId(1), Direction::Down);
        let mut t = table([parent, child]);
        assert_eq!(t.merge(MergePolicy::DestroyAll), 0);
    }

    #[test]
    fn kill_all_reports_count() {
        let mut t = table([dot(0, 0), dot(1, 1)]);
        t.get_mut(DotId(0)).unwrap().kill(DeathCause::Derailed);
        assert_eq!(t.kill_all(DeathCause::Halted), 1);
        assert_eq!(t.get(DotId(1)).unwrap().death(), Some(DeathCause::Halted));
        assert_eq!(t.get(DotId(0)).unwrap().death(), Some(DeathCause::Derailed));
    }
}
