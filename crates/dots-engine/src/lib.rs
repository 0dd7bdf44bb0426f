//! Tick engine for the dots interpreter.
//!
//! Takes a [`LoadedProgram`](dots_grid::LoadedProgram), seeds one
//! [`Dot`] per start marker and advances every dot in discrete ticks
//! until the program ends or an external limit stops it. All contact
//! with the outside world goes through an [`IoBoundary`].
//!
//! # Layout
//!
//! - [`config`]: run configuration and validation.
//! - [`dot`]: the dot state machine and the dot table.
//! - [`junction`]: operator and tilde pairing queues.
//! - [`engine`]: lifecycle and the tick loop.
//! - [`io`]: the boundary trait, outputs, microticks, cancellation.
//! - [`channel`]: a boundary that forwards over crossbeam channels.
//! - [`metrics`]: run counters and the final report.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod channel;
pub mod config;
pub mod dot;
pub mod engine;
pub mod io;
pub mod junction;
pub mod metrics;
pub(crate) mod schedule;
pub(crate) mod step;

pub use channel::{channel_io, ChannelHost, ChannelIo, IoEvent};
pub use config::{ConfigError, ExecutionMode, MergePolicy, RunConfig};
pub use dot::{DeathCause, Dot, DotState, DotTable, Mode, Register};
pub use engine::{Engine, RunPhase};
pub use io::{CancelToken, IoBoundary, Microtick, Output};
pub use junction::{Junctions, Pairing};
pub use metrics::{RunMetrics, RunOutcome, RunReport};
