//! Test utilities and recording boundaries for dots development.
//!
//! Provides [`RecordingIo`], an [`IoBoundary`] that records every call
//! and serves scripted input, [`CancelAfter`] for cancellation tests,
//! and shared program [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;
use std::sync::Once;

use dots_core::{DotId, Position, RuntimeFault};
use dots_engine::{CancelToken, Engine, IoBoundary, Microtick, Output, RunConfig, RunReport};
use dots_grid::{Loader, MemorySource};

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Filter with `RUST_LOG` (e.g. `RUST_LOG=dots_engine=trace`). Safe to
/// call from every test; only the first call installs anything.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// One recorded `on_microtick` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MicrotickRecord {
    pub tick: u64,
    pub dot: DotId,
    pub position: Position,
    pub live: usize,
}

/// Records every boundary call and serves input from a script.
#[derive(Debug, Default)]
pub struct RecordingIo {
    input: VecDeque<String>,
    pub outputs: Vec<Output>,
    pub microticks: Vec<MicrotickRecord>,
    pub errors: Vec<String>,
    pub finishes: usize,
    pub input_requests: usize,
}

impl RecordingIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that answers input requests with `lines`, then `None`.
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Program output only, notices excluded.
    pub fn texts(&self) -> Vec<&str> {
        self.outputs
            .iter()
            .filter(|o| o.is_text())
            .map(Output::as_str)
            .collect()
    }

    /// All program output concatenated.
    pub fn stdout(&self) -> String {
        self.texts().concat()
    }

    /// Engine notices only.
    pub fn notices(&self) -> Vec<&str> {
        self.outputs
            .iter()
            .filter(|o| !o.is_text())
            .map(Output::as_str)
            .collect()
    }

    /// Highest tick seen in a microtick, 0 if none.
    pub fn last_tick(&self) -> u64 {
        self.microticks.iter().map(|m| m.tick).max().unwrap_or(0)
    }
}

impl IoBoundary for RecordingIo {
    fn get_input(&mut self) -> Option<String> {
        self.input_requests += 1;
        self.input.pop_front()
    }

    fn on_output(&mut self, output: Output) {
        self.outputs.push(output);
    }

    fn on_microtick(&mut self, view: &Microtick<'_>) {
        self.microticks.push(MicrotickRecord {
            tick: view.tick.0,
            dot: view.dot.id,
            position: view.dot.position,
            live: view.dots.live_count(),
        });
    }

    fn on_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn on_finish(&mut self) {
        self.finishes += 1;
    }
}

/// Wraps another boundary and triggers a cancel token after a fixed
/// number of microticks.
#[derive(Debug)]
pub struct CancelAfter<B> {
    pub inner: B,
    token: CancelToken,
    remaining: usize,
}

impl<B: IoBoundary> CancelAfter<B> {
    pub fn new(inner: B, token: CancelToken, microticks: usize) -> Self {
        Self {
            inner,
            token,
            remaining: microticks,
        }
    }
}

impl<B: IoBoundary> IoBoundary for CancelAfter<B> {
    fn get_input(&mut self) -> Option<String> {
        self.inner.get_input()
    }

    fn on_output(&mut self, output: Output) {
        self.inner.on_output(output)
    }

    fn on_microtick(&mut self, view: &Microtick<'_>) {
        self.inner.on_microtick(view);
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.token.cancel();
        }
    }

    fn on_error(&mut self, message: &str) {
        self.inner.on_error(message)
    }

    fn on_finish(&mut self) {
        self.inner.on_finish()
    }
}

/// Load `text` from memory with `source` serving any libraries.
///
/// # Panics
///
/// Panics if the program fails to load or the config is invalid.
pub fn engine_from(source: MemorySource, text: &str, config: RunConfig) -> Engine {
    let program = Loader::new(source)
        .load_str(text, "")
        .unwrap_or_else(|e| panic!("fixture failed to load: {e}"));
    Engine::new(program, config).unwrap_or_else(|e| panic!("invalid config: {e}"))
}

/// Build an engine for a library-free program.
pub fn engine(text: &str, config: RunConfig) -> Engine {
    engine_from(MemorySource::new(), text, config)
}

/// Run a library-free program against a fresh [`RecordingIo`].
pub fn run(text: &str, config: RunConfig) -> (Result<RunReport, RuntimeFault>, RecordingIo) {
    run_with(text, config, RecordingIo::new())
}

/// Run a library-free program against the given recorder.
pub fn run_with(
    text: &str,
    config: RunConfig,
    mut io: RecordingIo,
) -> (Result<RunReport, RuntimeFault>, RecordingIo) {
    init_tracing();
    let result = engine(text, config).run(&mut io);
    (result, io)
}
