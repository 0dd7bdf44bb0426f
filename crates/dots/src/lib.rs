//! Dots: an interpreter for a two-dimensional esoteric language in which
//! dots travel along ASCII-art tracks.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the `dots-*` sub-crates and adds one-call helpers that load, build and
//! run a program while keeping the boundary contract: whatever goes
//! wrong, `on_error` is called at most once and `on_finish` exactly once.
//!
//! # Quick start
//!
//! ```rust
//! use dots::prelude::*;
//!
//! #[derive(Default)]
//! struct Collect(Vec<String>);
//!
//! impl IoBoundary for Collect {
//!     fn get_input(&mut self) -> Option<String> { None }
//!     fn on_output(&mut self, output: Output) { self.0.push(output.as_str().to_string()) }
//!     fn on_error(&mut self, _message: &str) {}
//!     fn on_finish(&mut self) {}
//! }
//!
//! let mut io = Collect::default();
//! let report = dots::run_source(".#6-$#", ".", RunConfig::default(), &mut io).unwrap();
//! assert_eq!(report.outcome, RunOutcome::Completed);
//! assert_eq!(io.0, vec!["6\n"]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `dots-core` | Ids, positions, directions, values, error types |
//! | [`grid`] | `dots-grid` | Glyph classification, grids, the world, the loader |
//! | [`engine`] | `dots-engine` | Dots, schedules, the I/O boundary, run reports |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::path::Path;

use thiserror::Error;
use tracing::warn;

/// Core types and errors (`dots-core`).
pub use dots_core as types;

/// Program loading and the classified world (`dots-grid`).
///
/// [`grid::Loader`] turns program text into a [`grid::LoadedProgram`],
/// reading libraries through a [`grid::SourceProvider`].
pub use dots_grid as grid;

/// The tick engine (`dots-engine`).
///
/// [`engine::Engine`] runs a loaded program once against an
/// [`engine::IoBoundary`].
pub use dots_engine as engine;

use dots_core::{LoadError, RuntimeFault};
use dots_engine::{ConfigError, Engine, IoBoundary, RunConfig, RunReport};
use dots_grid::{FsSource, LoadedProgram, Loader, SourceProvider};

/// Anything that can stop a one-call run.
#[derive(Debug, Error)]
pub enum Error {
    /// The program or one of its libraries failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The run configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The engine stopped on a runtime fault.
    #[error(transparent)]
    Runtime(#[from] RuntimeFault),
}

/// Load `text` (libraries resolved against `base_dir` on the local
/// filesystem) and run it.
pub fn run_source(
    text: &str,
    base_dir: impl AsRef<Path>,
    config: RunConfig,
    io: &mut dyn IoBoundary,
) -> Result<RunReport, Error> {
    run_source_with(&Loader::new(FsSource), text, base_dir, config, io)
}

/// Load the program file at `path` and run it.
pub fn run_file(
    path: impl AsRef<Path>,
    config: RunConfig,
    io: &mut dyn IoBoundary,
) -> Result<RunReport, Error> {
    let loaded = Loader::new(FsSource).load_file(path);
    run_loaded(loaded, config, io)
}

/// Like [`run_source`], with a caller-supplied loader (for in-memory
/// libraries or custom limits).
pub fn run_source_with<P: SourceProvider>(
    loader: &Loader<P>,
    text: &str,
    base_dir: impl AsRef<Path>,
    config: RunConfig,
    io: &mut dyn IoBoundary,
) -> Result<RunReport, Error> {
    run_loaded(loader.load_str(text, base_dir), config, io)
}

fn run_loaded(
    loaded: Result<LoadedProgram, LoadError>,
    config: RunConfig,
    io: &mut dyn IoBoundary,
) -> Result<RunReport, Error> {
    let mut engine = loaded
        .map_err(Error::from)
        .and_then(|program| Engine::new(program, config).map_err(Error::from))
        .map_err(|err| abort(io, err))?;
    // The engine reports its own faults to the boundary.
    Ok(engine.run(io)?)
}

/// Report a failure that happened before any engine ran.
fn abort(io: &mut dyn IoBoundary, err: Error) -> Error {
    warn!(%err, "program not started");
    io.on_error(&err.to_string());
    io.on_finish();
    err
}

/// Common imports for typical usage.
///
/// ```rust
/// use dots::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use dots_core::{Direction, DotId, Position, TickId, Value};

    // Errors
    pub use dots_core::{LoadError, RuntimeFault};
    pub use dots_engine::ConfigError;

    // Loading
    pub use dots_grid::{FsSource, LoadedProgram, Loader, MemorySource, SourceProvider};

    // Engine
    pub use dots_engine::{
        channel_io, CancelToken, Engine, ExecutionMode, IoBoundary, MergePolicy, Microtick,
        Output, RunConfig, RunOutcome, RunReport,
    };

    pub use crate::{run_file, run_source, run_source_with, Error};
}
