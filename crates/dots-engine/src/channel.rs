//! A boundary that forwards over crossbeam channels.
//!
//! [`channel_io()`] returns a connected pair: the [`ChannelIo`] half goes
//! to the engine (typically moved onto a worker thread), the
//! [`ChannelHost`] half stays with whoever renders output and supplies
//! input. Dropping the host's input side makes every further input
//! request read as exhausted.

use crossbeam_channel::{Receiver, RecvError, Sender};
use dots_core::{DotId, Position, TickId};

use crate::io::{IoBoundary, Microtick, Output};

/// One boundary call, as seen by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IoEvent {
    /// `on_output`.
    Output(Output),
    /// `on_microtick`, reduced to owned data. Only sent when enabled
    /// with [`ChannelIo::with_microticks`].
    Microtick {
        /// The tick being resolved.
        tick: TickId,
        /// The dot that changed.
        dot: DotId,
        /// Where it is now.
        position: Position,
    },
    /// `on_error`.
    Error(String),
    /// `on_finish`. Always the last event of a run.
    Finished,
}

/// Engine-side half of a channel boundary.
#[derive(Debug)]
pub struct ChannelIo {
    events: Sender<IoEvent>,
    input: Receiver<String>,
    microticks: bool,
}

/// Host-side half of a channel boundary.
#[derive(Debug)]
pub struct ChannelHost {
    events: Receiver<IoEvent>,
    input: Option<Sender<String>>,
}

/// Create a connected boundary pair over unbounded channels.
pub fn channel_io() -> (ChannelIo, ChannelHost) {
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (input_tx, input_rx) = crossbeam_channel::unbounded();
    (
        ChannelIo {
            events: event_tx,
            input: input_rx,
            microticks: false,
        },
        ChannelHost {
            events: event_rx,
            input: Some(input_tx),
        },
    )
}

impl ChannelIo {
    /// Also forward a summary of every microtick.
    pub fn with_microticks(mut self) -> Self {
        self.microticks = true;
        self
    }

    fn send(&self, event: IoEvent) {
        // A host that hung up no longer cares about events.
        let _ = self.events.send(event);
    }
}

impl IoBoundary for ChannelIo {
    fn get_input(&mut self) -> Option<String> {
        self.input.recv().ok()
    }

    fn on_output(&mut self, output: Output) {
        self.send(IoEvent::Output(output));
    }

    fn on_microtick(&mut self, view: &Microtick<'_>) {
        if self.microticks {
            self.send(IoEvent::Microtick {
                tick: view.tick,
                dot: view.dot.id,
                position: view.dot.position,
            });
        }
    }

    fn on_error(&mut self, message: &str) {
        self.send(IoEvent::Error(message.to_string()));
    }

    fn on_finish(&mut self) {
        self.send(IoEvent::Finished);
    }
}

impl ChannelHost {
    /// Queue a line of input. Returns `false` once input is closed or
    /// the engine side is gone.
    pub fn send_input(&self, line: impl Into<String>) -> bool {
        self.input
            .as_ref()
            .is_some_and(|tx| tx.send(line.into()).is_ok())
    }

    /// Close input: pending lines are still delivered, after which every
    /// request reads as exhausted.
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Block for the next event.
    pub fn recv(&self) -> Result<IoEvent, RecvError> {
        self.events.recv()
    }

    /// The raw event receiver, for `select!` loops.
    pub fn events(&self) -> &Receiver<IoEvent> {
        &self.events
    }

    /// Block until [`IoEvent::Finished`] (or the engine side hangs up),
    /// returning every event received, the final one included.
    pub fn collect_until_finished(&self) -> Vec<IoEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.recv() {
            let done = event == IoEvent::Finished;
            events.push(event);
            if done {
                break;
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_call_order() {
        let (mut io, host) = channel_io();
        io.on_output(Output::Text("a\n".into()));
        io.on_error("boom");
        io.on_finish();
        assert_eq!(
            host.collect_until_finished(),
            vec![
                IoEvent::Output(Output::Text("a\n".into())),
                IoEvent::Error("boom".into()),
                IoEvent::Finished,
            ]
        );
    }

    #[test]
    fn closed_input_reads_as_exhausted() {
        let (mut io, mut host) = channel_io();
        assert!(host.send_input("5"));
        host.close_input();
        assert!(!host.send_input("6"));
        assert_eq!(io.get_input().as_deref(), Some("5"));
        assert_eq!(io.get_input(), None);
    }

    #[test]
    fn dropped_host_does_not_break_the_engine_side() {
        let (mut io, host) = channel_io();
        drop(host);
        io.on_output(Output::Text("ignored".into()));
        io.on_finish();
        assert_eq!(io.get_input(), None);
    }
}
