// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: The global discrete-event driver — owns the process arena, the
//!   nodes, and the cross-node rendezvous registry, and orchestrates one
//!   driver iteration at a time until quiescence.
//! OWNERS: @runtime
//! PUBLIC API: Simulation::new, Simulation::run
//! INVARIANTS: flush precedes expire precedes time-slices precedes sweep,
//!   each in ascending node-id order; at most one node's clock is
//!   fast-forwarded per iteration, and only when nothing else progressed.

use log::{debug, trace};

use crate::model::{Node, ProcId, ProcState, Process};
use crate::rendezvous::RendezvousRegistry;
use crate::summary::SummaryRow;
use crate::trace::TraceSink;

/// Owns every process and node in one run, plus the global rendezvous
/// registry shared across them. Encapsulated here rather than as a
/// module-level singleton so multiple independent simulations can coexist.
#[derive(Debug)]
pub struct Simulation {
    pub(crate) processes: Vec<Process>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) registry: RendezvousRegistry,
}

impl Simulation {
    pub(crate) fn new(processes: Vec<Process>, nodes: Vec<Node>) -> Self {
        Self { processes, nodes, registry: RendezvousRegistry::new() }
    }

    pub(crate) fn node_index(&self, node_id: u32) -> usize {
        self.nodes
            .iter()
            .position(|n| n.id == node_id)
            .expect("node_id always refers to a node built at parse time")
    }

    pub(crate) fn node_clock(&self, node_id: u32) -> u64 {
        self.nodes[self.node_index(node_id)].clock
    }

    fn emit(&self, trace: &mut dyn TraceSink, node_id: u32, clock: u64, pid: ProcId, label: &'static str) {
        trace.emit_event(crate::trace::TraceEvent {
            node_id,
            node_clock: clock,
            local_pid: self.processes[pid.0].local_pid,
            label,
        });
    }

    /// Emits the time-0 `new`/`ready` pair for every resident process, node
    /// by node, and moves each into its node's ready queue.
    fn emit_initial(&mut self, trace: &mut dyn TraceSink) {
        for node_idx in 0..self.nodes.len() {
            let node_id = self.nodes[node_idx].id;
            let resident = self.nodes[node_idx].resident.clone();
            for &pid in &resident {
                self.emit(trace, node_id, 0, pid, "new");
            }
            for &pid in &resident {
                self.processes[pid.0].state = ProcState::Ready;
                self.emit(trace, node_id, 0, pid, "ready");
                self.nodes[node_idx].ready.push_back(pid);
            }
        }
    }

    /// Applies every pending release on `node` whose `due_time` has arrived.
    fn flush_pending(&mut self, node_idx: usize, trace: &mut dyn TraceSink) -> bool {
        let node_id = self.nodes[node_idx].id;
        let clock = self.nodes[node_idx].clock;
        let (due, still_pending): (Vec<_>, Vec<_>) =
            self.nodes[node_idx].pending.drain(..).partition(|e| e.due_time == clock);
        self.nodes[node_idx].pending = still_pending;

        let progressed = !due.is_empty();
        for entry in due {
            if entry.is_finish {
                self.processes[entry.proc.0].state = ProcState::Finished;
                self.processes[entry.proc.0].finish_time = clock;
                self.emit(trace, node_id, clock, entry.proc, "finished");
            } else {
                self.processes[entry.proc.0].state = ProcState::Ready;
                self.emit(trace, node_id, clock, entry.proc, "ready");
                self.nodes[node_idx].ready.push_back(entry.proc);
            }
        }
        progressed
    }

    /// Releases every BLOCKED process on `node` whose timed BLOCK has
    /// expired (`unblock_time <= clock`).
    fn expire_block(&mut self, node_idx: usize, trace: &mut dyn TraceSink) -> bool {
        let node_id = self.nodes[node_idx].id;
        let clock = self.nodes[node_idx].clock;
        let (due, still_blocked): (Vec<_>, Vec<_>) =
            self.nodes[node_idx].blocked.drain(..).partition(|&pid| {
                self.processes[pid.0].unblock_time.is_some_and(|t| clock >= t)
            });
        self.nodes[node_idx].blocked = still_blocked;

        let progressed = !due.is_empty();
        for pid in due {
            self.processes[pid.0].unblock_time = None;
            if self.processes[pid.0].next_is_halt() {
                self.processes[pid.0].pc += 1;
                self.processes[pid.0].state = ProcState::Finished;
                self.processes[pid.0].finish_time = clock;
                self.emit(trace, node_id, clock, pid, "finished");
            } else {
                self.processes[pid.0].state = ProcState::Ready;
                self.emit(trace, node_id, clock, pid, "ready");
                self.nodes[node_idx].ready.push_back(pid);
            }
        }
        progressed
    }

    /// The smallest future event time on `node`, across its pending
    /// releases and timed-BLOCK expiries, strictly greater than its current
    /// clock. `None` if the node has nothing scheduled in its future.
    fn next_event_time(&self, node_idx: usize) -> Option<u64> {
        let node = &self.nodes[node_idx];
        let clock = node.clock;
        let pending_times = node.pending.iter().map(|e| e.due_time);
        let block_times = node
            .blocked
            .iter()
            .filter_map(|&pid| self.processes[pid.0].unblock_time);
        pending_times.chain(block_times).filter(|&t| t > clock).min()
    }

    fn is_quiescent(&self) -> bool {
        self.nodes.iter().all(Node::is_idle)
    }

    /// Advances the single node with the earliest future event to that
    /// time, without applying the event itself. Returns whether any node
    /// had a future event to skip to.
    fn try_time_skip(&mut self) -> bool {
        let mut best: Option<(usize, u64)> = None;
        for node_idx in 0..self.nodes.len() {
            if let Some(t) = self.next_event_time(node_idx) {
                if best.map_or(true, |(_, bt)| t < bt) {
                    best = Some((node_idx, t));
                }
            }
        }
        let Some((node_idx, t)) = best else { return false };
        trace!("time-skip: node {} clock {} -> {}", self.nodes[node_idx].id, self.nodes[node_idx].clock, t);
        self.nodes[node_idx].clock = t;
        true
    }

    /// Runs the driver loop to quiescence, feeding every state transition
    /// to `trace`, and returns the final per-process statistics table.
    pub fn run(mut self, trace: &mut dyn TraceSink) -> Vec<SummaryRow> {
        self.emit_initial(trace);

        let mut iteration = 0u64;
        while !self.is_quiescent() {
            iteration += 1;
            debug!("driver iteration {}", iteration);
            let mut progressed = false;

            for node_idx in 0..self.nodes.len() {
                progressed |= self.flush_pending(node_idx, trace);
            }
            for node_idx in 0..self.nodes.len() {
                progressed |= self.expire_block(node_idx, trace);
            }
            for node_idx in 0..self.nodes.len() {
                progressed |= self.run_timeslice(node_idx, trace);
            }
            if !progressed {
                progressed = self.sweep_global_matches();
            }
            if !progressed && !self.try_time_skip() {
                trace!("quiescent with unmatched processes remaining; stopping");
                break;
            }
        }

        self.build_summary()
    }

    fn build_summary(&self) -> Vec<SummaryRow> {
        let mut rows: Vec<SummaryRow> = self
            .processes
            .iter()
            .filter(|p| p.state == ProcState::Finished)
            .map(|p| SummaryRow {
                finish_time: p.finish_time,
                node_id: p.node_id,
                local_pid: p.local_pid,
                run_time: p.run_time,
                block_time: p.block_time,
                wait_time: p.wait_time,
                sends: p.sends,
                recvs: p.recvs,
            })
            .collect();
        crate::summary::sort_rows(&mut rows);
        rows
    }

    #[cfg(test)]
    pub(crate) fn process_count(&self) -> usize {
        self.processes.len()
    }

    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub(crate) fn debug_local_pids(&self) -> Vec<(&str, u32, u32)> {
        self.processes.iter().map(|p| (p.name.as_str(), p.node_id, p.local_pid)).collect()
    }
}
