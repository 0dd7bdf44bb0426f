//! Grid geometry: directions, axes and region-qualified positions.
//!
//! Coordinates follow text layout: `x` is the column (character index
//! within a line) and `y` is the line number, so `Up` decreases `y`.

use std::fmt;

use crate::id::RegionId;

// ── Axis ────────────────────────────────────────────────────────

/// Orientation of a movement or a straight track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Left/right movement, `-` tracks.
    Horizontal,
    /// Up/down movement, `|` tracks.
    Vertical,
}

impl Axis {
    /// The other axis.
    pub fn perpendicular(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

// ── Direction ───────────────────────────────────────────────────

/// One of the four cardinal directions a dot can travel in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Towards smaller `y`.
    Up,
    /// Towards larger `x`.
    Right,
    /// Towards larger `y`.
    Down,
    /// Towards smaller `x`.
    Left,
}

impl Direction {
    /// All directions in clockwise order starting from `Up`.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Unit offset `(dx, dy)` for one step in this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Direction for a unit offset, if it is one.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::Up),
            (1, 0) => Some(Self::Right),
            (0, 1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            _ => None,
        }
    }

    /// The axis this direction moves along.
    pub fn axis(self) -> Axis {
        match self {
            Self::Up | Self::Down => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }

    /// The opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Quarter turn counter-clockwise.
    pub fn turn_left(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Right => Self::Up,
            Self::Down => Self::Right,
            Self::Left => Self::Down,
        }
    }

    /// Quarter turn clockwise.
    pub fn turn_right(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// Reflection off a `/` mirror: `(dx, dy) -> (-dy, -dx)`.
    pub fn reflect_slash(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Up,
            Self::Down => Self::Left,
            Self::Left => Self::Down,
        }
    }

    /// Reflection off a `\` mirror: `(dx, dy) -> (dy, dx)`.
    pub fn reflect_backslash(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Up,
            Self::Down => Self::Right,
            Self::Right => Self::Down,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
        };
        f.write_str(name)
    }
}

// ── Position ────────────────────────────────────────────────────

/// A cell address in the world's unified space.
///
/// `x`/`y` are signed so that a step off the top or left edge is still
/// representable; the world classifies such positions as outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Region the cell belongs to.
    pub region: RegionId,
    /// Column (character index within the line).
    pub x: i32,
    /// Line number.
    pub y: i32,
}

impl Position {
    /// Construct a position.
    pub fn new(region: RegionId, x: i32, y: i32) -> Self {
        Self { region, x, y }
    }

    /// Position in the main program region.
    pub fn main(x: i32, y: i32) -> Self {
        Self::new(RegionId::MAIN, x, y)
    }

    /// The adjacent position one step in `dir`, within the same region.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            region: self.region,
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}:({}, {})", self.region, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_dir() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Right),
            Just(Direction::Down),
            Just(Direction::Left),
        ]
    }

    #[test]
    fn slash_mirror_matches_delta_formula() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            assert_eq!(Direction::from_delta(-dy, -dx), Some(dir.reflect_slash()));
        }
    }

    #[test]
    fn backslash_mirror_matches_delta_formula() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            assert_eq!(Direction::from_delta(dy, dx), Some(dir.reflect_backslash()));
        }
    }

    #[test]
    fn step_moves_one_cell() {
        let p = Position::main(3, 3);
        assert_eq!(p.step(Direction::Up), Position::main(3, 2));
        assert_eq!(p.step(Direction::Right), Position::main(4, 3));
        assert_eq!(p.step(Direction::Down), Position::main(3, 4));
        assert_eq!(p.step(Direction::Left), Position::main(2, 3));
    }

    #[test]
    fn step_off_origin_goes_negative() {
        assert_eq!(Position::main(0, 0).step(Direction::Left).x, -1);
        assert_eq!(Position::main(0, 0).step(Direction::Up).y, -1);
    }

    proptest! {
        #[test]
        fn reverse_is_involution(dir in arb_dir()) {
            prop_assert_eq!(dir.reverse().reverse(), dir);
            prop_assert_eq!(dir.reverse().axis(), dir.axis());
        }

        #[test]
        fn turns_are_inverse(dir in arb_dir()) {
            prop_assert_eq!(dir.turn_left().turn_right(), dir);
            prop_assert_eq!(dir.turn_left().axis(), dir.axis().perpendicular());
        }

        #[test]
        fn mirrors_are_involutions(dir in arb_dir()) {
            prop_assert_eq!(dir.reflect_slash().reflect_slash(), dir);
            prop_assert_eq!(dir.reflect_backslash().reflect_backslash(), dir);
        }
    }
}
