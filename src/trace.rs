// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Trace sink — the only place that knows the wire trace format
//! OWNERS: @runtime
//! PUBLIC API: TraceEvent, TraceSink, WriteTraceSink, VecTraceSink
//! INVARIANTS: formatting here is the wire format and must not drift

use std::io::Write;

/// One state-transition record, as produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub node_id: u32,
    pub node_clock: u64,
    pub local_pid: u32,
    pub label: &'static str,
}

impl TraceEvent {
    /// Renders to the fixed-width wire format: `[NN] TTTTT: process P LABEL`.
    pub fn render(&self) -> String {
        format!(
            "[{:02}] {:05}: process {} {}",
            self.node_id, self.node_clock, self.local_pid, self.label
        )
    }
}

/// Narrow sink interface the engine drives; lets tests capture events
/// in-memory instead of going through stdout.
pub trait TraceSink {
    fn emit_event(&mut self, event: TraceEvent);
}

/// Captures events in order, for tests.
#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit_event(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

impl VecTraceSink {
    pub fn rendered(&self) -> Vec<String> {
        self.events.iter().map(TraceEvent::render).collect()
    }
}

/// Writes events one per line to any [`Write`] (stdout, a file, ...).
pub struct WriteTraceSink<W: Write> {
    writer: W,
}

impl<W: Write> WriteTraceSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> TraceSink for WriteTraceSink<W> {
    fn emit_event(&mut self, event: TraceEvent) {
        // Best-effort: a broken pipe on stdout shouldn't panic the simulator.
        let _ = writeln!(self.writer, "{}", event.render());
    }
}

/// A sink that discards every event; used under `--quiet`.
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit_event(&mut self, _event: TraceEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_width() {
        let ev = TraceEvent { node_id: 1, node_clock: 3, local_pid: 1, label: "finished" };
        assert_eq!(ev.render(), "[01] 00003: process 1 finished");
    }

    #[test]
    fn renders_send_label_with_parenthetical() {
        let ev = TraceEvent { node_id: 2, node_clock: 12, local_pid: 7, label: "blocked (send)" };
        assert_eq!(ev.render(), "[02] 00012: process 7 blocked (send)");
    }
}
