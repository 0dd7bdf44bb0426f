//! Benchmark programs for the dots interpreter.
//!
//! Generates program text of a chosen size for benchmarks and smoke
//! tests:
//!
//! - [`ring`]: one dot circling a rectangular loop forever
//! - [`parallel_tracks`]: many independent dots running off straight lines
//! - [`operator_blocks`]: many operator pairings firing in the same tick
//! - [`bench_config`]: a silent, tick-bounded [`RunConfig`]

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use dots_core::LoadError;
use dots_engine::{ExecutionMode, RunConfig};
use dots_grid::{LoadedProgram, Loader, MemorySource};

/// A `width` x `height` loop of track with a single dot on the top edge.
///
/// The dot never leaves, so runs must be bounded with a tick limit.
/// One lap takes `2 * (width + height) - 4` ticks.
pub fn ring(width: usize, height: usize) -> String {
    let width = width.max(4);
    let height = height.max(2);
    let mut rows = Vec::with_capacity(height);
    rows.push(format!("/.{}\\", "-".repeat(width - 3)));
    for _ in 0..height - 2 {
        rows.push(format!("|{}|", " ".repeat(width - 2)));
    }
    rows.push(format!("\\{}/", "-".repeat(width - 2)));
    rows.join("\n")
}

/// `rows` dots, each on its own line of `len` track.
///
/// Every dot runs off the end after `len + 1` ticks.
pub fn parallel_tracks(rows: usize, len: usize) -> String {
    let line = format!(".{}", "-".repeat(len));
    vec![line; rows].join("\n")
}

/// `blocks` stacked `[+]` junctions. In each block the vertical dot parks
/// on tick 2 and the horizontal dot arrives and fires the pair on tick 3.
pub fn operator_blocks(blocks: usize) -> String {
    vec!["   .\n   |\n.-[+]-"; blocks].join("\n\n")
}

/// Load library-free program text.
pub fn program(text: &str) -> Result<LoadedProgram, LoadError> {
    Loader::new(MemorySource::new()).load_str(text, "")
}

/// Silent run bounded at `ticks`.
pub fn bench_config(mode: ExecutionMode, ticks: u64) -> RunConfig {
    RunConfig {
        mode,
        tick_limit: Some(ticks),
        silent: true,
        ..RunConfig::default()
    }
}
