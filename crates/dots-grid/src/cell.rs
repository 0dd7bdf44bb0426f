//! Glyph classification.
//!
//! Every character of a program is classified into a [`CellKind`] once,
//! at load time. The engine dispatches on the kind and never looks at
//! raw glyphs again, except to read digits and printed text.

use dots_core::{Axis, Direction, Operator};

/// Orientation of a mirror glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mirror {
    /// `/`
    Slash,
    /// `\`
    Backslash,
}

impl Mirror {
    /// Direction after bouncing off this mirror.
    pub fn reflect(self, dir: Direction) -> Direction {
        match self {
            Self::Slash => dir.reflect_slash(),
            Self::Backslash => dir.reflect_backslash(),
        }
    }
}

/// Which bracket pair surrounds an operator glyph.
///
/// The style decides which arriving dot carries the result onwards:
/// `{op}` keeps the vertical arrival, `[op]` keeps the horizontal one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorStyle {
    /// `[op]`
    Square,
    /// `{op}`
    Curly,
}

impl OperatorStyle {
    /// Axis of the arrival that survives and carries the result.
    pub fn primary_axis(self) -> Axis {
        match self {
            Self::Square => Axis::Horizontal,
            Self::Curly => Axis::Vertical,
        }
    }
}

/// Semantic class of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Any coordinate that is not inside a region.
    Outside,
    /// Whitespace.
    Blank,
    /// Directive lines and text after a ` `` ` comment marker.
    Comment,
    /// `.` or `•`: a dot is seeded here at load time.
    Start,
    /// `-` or `|`.
    Track(Axis),
    /// `+`: passes both axes.
    Crossing,
    /// `/` or `\`.
    Mirror(Mirror),
    /// `>`, `<`, `^`, `v`: perpendicular arrivals turn towards the arrow.
    Turn(Direction),
    /// `(` sends dots right, `)` sends dots left.
    Reflector(Direction),
    /// `*`: copies the dot onto every connected exit.
    Duplicator,
    /// `&`: ends the whole program.
    Halt,
    /// `#`: following digits (or `?`) set the value register.
    SetValue,
    /// `@`: following digits (or `?`) set the tag register.
    SetTag,
    /// `$`: following flags/quotes print.
    Print,
    /// `~`: conditional junction; `inverted` when a `!` sits below it.
    Tilde {
        /// Whether the condition is negated.
        inverted: bool,
    },
    /// `[`, `]`, `{`, `}` around operators; horizontal track otherwise.
    Bracket,
    /// Operator glyph enclosed by a bracket pair.
    Operator(Operator, OperatorStyle),
    /// Declared warp glyph (`%$`).
    Warp(char),
    /// Glyph bound to an included library (`%!`).
    LibraryLink(char),
    /// A library's exported glyph (`%^`).
    LibraryExport(char),
    /// `0`–`9`.
    Digit(u8),
    /// `?`: input request inside `#?` / `@?`.
    Query,
    /// Any other character, including quoted print text.
    Text,
}

impl CellKind {
    /// Fixed symbol-table classification of a lone glyph.
    ///
    /// Context-dependent classes (operators, literals, declared warps,
    /// inverted tildes) are resolved by the loader, not here.
    pub fn from_glyph(glyph: char) -> Self {
        match glyph {
            ' ' | '\t' => Self::Blank,
            '.' | '•' => Self::Start,
            '-' => Self::Track(Axis::Horizontal),
            '|' => Self::Track(Axis::Vertical),
            '+' => Self::Crossing,
            '/' => Self::Mirror(Mirror::Slash),
            '\\' => Self::Mirror(Mirror::Backslash),
            '>' => Self::Turn(Direction::Right),
            '<' => Self::Turn(Direction::Left),
            '^' => Self::Turn(Direction::Up),
            'v' => Self::Turn(Direction::Down),
            '(' => Self::Reflector(Direction::Right),
            ')' => Self::Reflector(Direction::Left),
            '*' => Self::Duplicator,
            '&' => Self::Halt,
            '#' => Self::SetValue,
            '@' => Self::SetTag,
            '$' => Self::Print,
            '~' => Self::Tilde { inverted: false },
            '[' | ']' | '{' | '}' => Self::Bracket,
            '?' => Self::Query,
            c if c.is_ascii_digit() => Self::Digit(c as u8 - b'0'),
            _ => Self::Text,
        }
    }

    /// Whether a dot moving in `dir` can enter a cell of this kind
    /// without immediately derailing.
    ///
    /// Used to pick a start marker's initial direction and a
    /// duplicator's exits.
    pub fn accepts(self, dir: Direction) -> bool {
        match self {
            Self::Outside | Self::Blank | Self::Comment | Self::Start => false,
            Self::Track(axis) => axis == dir.axis(),
            Self::Bracket => dir.axis() == Axis::Horizontal,
            _ => true,
        }
    }

    /// Whether dots wait at this cell for a partner.
    pub fn is_junction(self) -> bool {
        matches!(self, Self::Operator(..) | Self::Tilde { .. })
    }
}

/// A classified grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// The raw character as written in the source.
    pub glyph: char,
    /// Its semantic class.
    pub kind: CellKind,
}

impl Cell {
    /// A cell classified by the fixed symbol table alone.
    pub fn plain(glyph: char) -> Self {
        Self {
            glyph,
            kind: CellKind::from_glyph(glyph),
        }
    }
}
