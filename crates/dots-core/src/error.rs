//! Error types for loading and running dot programs.
//!
//! Two fatal families exist: [`LoadError`] stops a program before an
//! engine is ever built, [`RuntimeFault`] stops a running engine.
//! Neither is retried.

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::Position;
use crate::id::DotId;
use crate::value::Value;

/// Errors raised while reading, classifying and linking program grids.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A program or library file could not be read.
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A `%` directive line could not be parsed.
    #[error("{scope}:{line}: malformed directive '{text}'")]
    MalformedDirective {
        /// File (or `<main>`) the directive appeared in.
        scope: String,
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },
    /// A declared warp glyph does not occur exactly twice in its scope.
    #[error("{scope}: warp '{glyph}' occurs {found} time(s), expected exactly 2")]
    UnpairedWarp {
        /// File (or `<main>`) declaring the warp.
        scope: String,
        /// The warp glyph.
        glyph: char,
        /// How many cells carry the glyph.
        found: usize,
    },
    /// The same glyph was declared twice with different meanings.
    #[error("{scope}: glyph '{glyph}' is declared more than once")]
    ConflictingDeclaration {
        /// File (or `<main>`) with the conflicting declarations.
        scope: String,
        /// The glyph.
        glyph: char,
    },
    /// A library (transitively) includes itself.
    #[error("library include cycle: {}", format_chain(.chain))]
    LibraryCycle {
        /// Include stack, outermost first, ending with the repeated file.
        chain: Vec<PathBuf>,
    },
    /// A library declares no `%^` export glyph.
    #[error("library '{}' declares no export glyph", .library.display())]
    MissingExport {
        /// The library file.
        library: PathBuf,
    },
    /// A library's export glyph does not occur exactly once.
    #[error(
        "library '{}': export glyph '{glyph}' occurs {found} time(s), expected exactly 1",
        .library.display()
    )]
    ExportCount {
        /// The library file.
        library: PathBuf,
        /// The export glyph.
        glyph: char,
        /// How many cells carry the glyph.
        found: usize,
    },
    /// A start marker has no adjacent track to leave along.
    #[error("start marker at ({x}, {y}) has no connecting track")]
    DetachedStart {
        /// Column of the marker.
        x: i32,
        /// Line of the marker.
        y: i32,
    },
    /// Library instancing exceeded the configured bound.
    #[error("more than {limit} library instances")]
    TooManyInstances {
        /// The configured maximum.
        limit: usize,
    },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Fatal conditions raised while an engine is running.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RuntimeFault {
    /// An operator divided (or took a modulo) by zero.
    #[error("division by zero at {at}")]
    DivisionByZero {
        /// The operator cell.
        at: Position,
    },
    /// An input line could not be read as a number.
    #[error("input '{text}' is not a number")]
    InvalidInput {
        /// The rejected line.
        text: String,
    },
    /// A value printed in character mode is not a Unicode scalar.
    #[error("value {value} is not a valid character code")]
    InvalidCharCode {
        /// The offending value.
        value: Value,
    },
    /// A library link or warp has no recorded counterpart.
    #[error("no link target recorded for {at}")]
    DanglingLink {
        /// The cell that should have been linked.
        at: Position,
    },
    /// A junction fired at a cell that is not an operator or tilde.
    #[error("junction fired at non-junction cell {at}")]
    UnexpectedJunction {
        /// The cell.
        at: Position,
    },
    /// A grid mutation addressed a cell outside every region.
    #[error("{at} is outside the grid")]
    OutsideGrid {
        /// The position.
        at: Position,
    },
    /// The number of live dots exceeded the configured bound.
    #[error("more than {limit} live dots")]
    DotLimitExceeded {
        /// The configured maximum.
        limit: usize,
    },
    /// The dot table lost track of a dot it scheduled.
    #[error("dot {id} is not in the dot table")]
    UnknownDot {
        /// The missing dot.
        id: DotId,
    },
    /// `run()` was called on an engine that already ran.
    #[error("engine has already finished")]
    AlreadyFinished,
}
