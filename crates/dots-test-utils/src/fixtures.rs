//! Reusable program fixtures.
//!
//! Each constant is a complete program with a known, hand-traced
//! behaviour. Coordinates in the comments are `(x, y)` with `y` counted
//! from the first line of the text.

use dots_grid::MemorySource;

/// Walks four cells and halts: no output, one dead dot.
pub const HALT: &str = ".---&";

/// Runs off the right edge after two ticks.
pub const OFF_GRID: &str = ".-";

/// Prints `hello` once.
pub const HELLO: &str = ".-$\"hello\"";

/// An endless loop that prints its value (0) every 12 ticks, first on
/// tick 2.
pub const LOOP_PRINT: &str = "/.$#-\\\n\\----/";

/// A duplicator splits a dot carrying 5; both halves print on tick 7.
pub const SPLIT: &str = ".#5-*-$#\n    |\n    $\n    #";

/// Two dots cross through warps `A` and `B`. The dot carrying 1 takes
/// `A` and the short exit path; the dot carrying 2 takes `B` and the
/// long one, so correct routing prints `1` before `2`.
pub const WARP_PAIRS: &str = "%$AB\n.#1-A   B---$#\n.#2-B   A-$#";

/// A dot carrying 7 crosses into a library instance and back, then
/// prints.
pub const LIBRARY_CALLER: &str = "%!loop.dots f\n.#7-f-$#";

/// The library used by [`LIBRARY_CALLER`]: a loop that leaves through
/// its export cell.
pub const LOOP_LIBRARY: &str = "%^X\n/-X-\\\n\\---/";

/// One dot parks at an operator with no partner.
pub const LONE_OPERAND: &str = ".-[+]-";

/// A vertical dot reaches `[+]` one tick after a horizontal dot with a
/// higher id is parked there. Sequentially the released dot moves in the
/// same tick (8 ticks total); in lockstep it moves on the next (9).
pub const RELEASE: &str = "   .\n   |\n   |\n   |\n.-[+]-$#";

/// Two dots meet on a `>` turn on tick 3, heading the same way, then
/// print.
pub const COLLISION: &str = ".-\\\n  >-$#\n.-/";

/// Reads one number and prints it.
pub const ECHO: &str = ".-#?-$#";

/// Divides zero by zero.
pub const DIV_ZERO: &str = "   .\n   |\n.-[/]-";

/// A memory source holding the libraries the fixtures include.
pub fn libraries() -> MemorySource {
    MemorySource::new().with_file("loop.dots", LOOP_LIBRARY)
}
