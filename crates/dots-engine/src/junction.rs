//! Pairing of dots waiting at operator and tilde cells.
//!
//! Each junction keeps one FIFO queue per arrival axis. A dot joining a
//! queue while the other axis has someone waiting pairs with the front of
//! that queue immediately; otherwise it waits. Pairing never depends on
//! which schedule is running.

use std::collections::VecDeque;

use dots_core::{Axis, DotId, Position};
use indexmap::IndexMap;

/// Two dots that met at a junction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pairing {
    /// The junction cell.
    pub at: Position,
    /// The dot that arrived moving vertically.
    pub vertical: DotId,
    /// The dot that arrived moving horizontally.
    pub horizontal: DotId,
}

impl Pairing {
    /// The dot that arrived along `axis`.
    pub fn on(&self, axis: Axis) -> DotId {
        match axis {
            Axis::Vertical => self.vertical,
            Axis::Horizontal => self.horizontal,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Queues {
    vertical: VecDeque<DotId>,
    horizontal: VecDeque<DotId>,
}

impl Queues {
    fn on(&mut self, axis: Axis) -> &mut VecDeque<DotId> {
        match axis {
            Axis::Vertical => &mut self.vertical,
            Axis::Horizontal => &mut self.horizontal,
        }
    }

    fn is_empty(&self) -> bool {
        self.vertical.is_empty() && self.horizontal.is_empty()
    }
}

/// Waiting queues for every junction that currently has a dot parked.
#[derive(Clone, Debug, Default)]
pub struct Junctions {
    waiting: IndexMap<Position, Queues>,
}

impl Junctions {
    /// No junction has anyone waiting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` arriving at `at` along `axis`. Returns the pairing if
    /// a partner was already waiting on the other axis.
    pub fn arrive(&mut self, at: Position, axis: Axis, id: DotId) -> Option<Pairing> {
        let queues = self.waiting.entry(at).or_default();
        let partner = queues.on(axis.perpendicular()).pop_front();
        let pairing = match partner {
            Some(partner) => {
                let (vertical, horizontal) = match axis {
                    Axis::Vertical => (id, partner),
                    Axis::Horizontal => (partner, id),
                };
                Some(Pairing {
                    at,
                    vertical,
                    horizontal,
                })
            }
            None => {
                queues.on(axis).push_back(id);
                None
            }
        };
        if queues.is_empty() {
            self.waiting.shift_remove(&at);
        }
        pairing
    }

    /// Number of dots waiting anywhere.
    pub fn waiting_count(&self) -> usize {
        self.waiting
            .values()
            .map(|q| q.vertical.len() + q.horizontal.len())
            .sum()
    }

    /// Ids waiting at `at` along `axis`, front first.
    pub fn queue(&self, at: Position, axis: Axis) -> Vec<DotId> {
        self.waiting
            .get(&at)
            .map(|q| match axis {
                Axis::Vertical => q.vertical.iter().copied().collect(),
                Axis::Horizontal => q.horizontal.iter().copied().collect(),
            })
            .unwrap_or_default()
    }

    /// Forget every waiting dot.
    pub fn clear(&mut self) {
        self.waiting.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AT: Position = Position {
        region: dots_core::RegionId::MAIN,
        x: 3,
        y: 2,
    };

    #[test]
    fn same_axis_arrivals_queue_up() {
        let mut j = Junctions::new();
        assert_eq!(j.arrive(AT, Axis::Horizontal, DotId(0)), None);
        assert_eq!(j.arrive(AT, Axis::Horizontal, DotId(1)), None);
        assert_eq!(j.waiting_count(), 2);
        assert_eq!(j.queue(AT, Axis::Horizontal), vec![DotId(0), DotId(1)]);
    }

    #[test]
    fn perpendicular_arrival_pairs_with_front() {
        let mut j = Junctions::new();
        j.arrive(AT, Axis::Horizontal, DotId(4));
        j.arrive(AT, Axis::Horizontal, DotId(6));
        let p = j.arrive(AT, Axis::Vertical, DotId(9)).unwrap();
        assert_eq!(
            p,
            Pairing {
                at: AT,
                vertical: DotId(9),
                horizontal: DotId(4)
            }
        );
        assert_eq!(p.on(Axis::Horizontal), DotId(4));
        assert_eq!(j.queue(AT, Axis::Horizontal), vec![DotId(6)]);
    }

    #[test]
    fn empty_junctions_are_dropped() {
        let mut j = Junctions::new();
        j.arrive(AT, Axis::Vertical, DotId(1));
        j.arrive(AT, Axis::Horizontal, DotId(2));
        assert_eq!(j.waiting_count(), 0);
        assert!(j.waiting.is_empty());
    }

    #[test]
    fn junctions_are_independent() {
        let mut j = Junctions::new();
        let other = Position::main(0, 0);
        j.arrive(AT, Axis::Vertical, DotId(1));
        assert_eq!(j.arrive(other, Axis::Horizontal, DotId(2)), None);
        assert_eq!(j.waiting_count(), 2);
        j.clear();
        assert_eq!(j.waiting_count(), 0);
    }
}
