// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Per-node round-robin dispatch for up to one quantum
//! OWNERS: @runtime
//! PUBLIC API: Simulation::run_timeslice
//! INVARIANTS: dispatches at most one process per call; never advances a
//!   node's clock by more than `node.quantum` ticks in one call
//! ADR: docs/adr/0008-round-robin-dispatch.md

use crate::driver::Simulation;
use crate::model::{Operation, ProcId, ProcState};
use crate::trace::TraceSink;

impl Simulation {
    /// Dispatches the head of `node`'s ready queue for up to one quantum.
    /// Returns whether anything happened (an empty ready queue is the only
    /// case that returns `false`).
    pub(crate) fn run_timeslice(&mut self, node_idx: usize, trace: &mut dyn TraceSink) -> bool {
        let Some(pid) = self.nodes[node_idx].ready.pop_front() else { return false };
        let node_id = self.nodes[node_idx].id;

        if self.processes[pid.0].state == ProcState::Finished
            || self.processes[pid.0].pc >= self.processes[pid.0].program.len()
        {
            return true;
        }

        self.processes[pid.0].state = ProcState::Running;
        let clock = self.nodes[node_idx].clock;
        self.emit(trace, node_id, clock, pid, "running");

        let quantum = self.nodes[node_idx].quantum;
        let mut used = 0u32;
        let mut yielded = false;

        while used < quantum && self.processes[pid.0].pc < self.processes[pid.0].program.len() {
            let op = self.processes[pid.0].program[self.processes[pid.0].pc];
            match op {
                Operation::Doop(k) => {
                    let consume = k.min(quantum - used);
                    self.nodes[node_idx].clock += consume as u64;
                    self.processes[pid.0].run_time += consume as u64;
                    self.credit_wait_other_ready(node_idx, consume as u64);
                    used += consume;
                    if consume == k {
                        self.processes[pid.0].pc += 1;
                    } else {
                        self.processes[pid.0].program[self.processes[pid.0].pc] =
                            Operation::Doop(k - consume);
                    }
                }
                Operation::Block(k) => {
                    let clock = self.nodes[node_idx].clock;
                    let p = &mut self.processes[pid.0];
                    p.unblock_time = Some(clock + k as u64);
                    p.block_time += k as u64;
                    p.want_dst_addr = None;
                    p.want_src_addr = None;
                    p.state = ProcState::Blocked;
                    p.pc += 1;
                    self.nodes[node_idx].blocked.push(pid);
                    self.emit(trace, node_id, clock, pid, "blocked");
                    yielded = true;
                    break;
                }
                Operation::Send(addr) => {
                    self.charge_attempt_tick(node_idx, pid);
                    used += 1;
                    let p = &mut self.processes[pid.0];
                    p.want_dst_addr = Some(addr);
                    p.want_src_addr = None;
                    p.unblock_time = None;
                    p.state = ProcState::Blocked;
                    self.nodes[node_idx].blocked.push(pid);
                    self.registry.insert(pid);
                    let clock = self.nodes[node_idx].clock;
                    self.emit(trace, node_id, clock, pid, "blocked (send)");
                    self.try_match_now(node_id, pid);
                    yielded = true;
                    break;
                }
                Operation::Recv(addr) => {
                    self.charge_attempt_tick(node_idx, pid);
                    used += 1;
                    let p = &mut self.processes[pid.0];
                    p.want_src_addr = Some(addr);
                    p.want_dst_addr = None;
                    p.unblock_time = None;
                    p.state = ProcState::Blocked;
                    self.nodes[node_idx].blocked.push(pid);
                    self.registry.insert(pid);
                    let clock = self.nodes[node_idx].clock;
                    self.emit(trace, node_id, clock, pid, "blocked (recv)");
                    self.try_match_now(node_id, pid);
                    yielded = true;
                    break;
                }
                Operation::Halt => {
                    self.processes[pid.0].pc += 1;
                    self.processes[pid.0].state = ProcState::Finished;
                    let clock = self.nodes[node_idx].clock;
                    self.processes[pid.0].finish_time = clock;
                    self.emit(trace, node_id, clock, pid, "finished");
                    yielded = true;
                    break;
                }
            }
        }

        if !yielded {
            if self.processes[pid.0].pc < self.processes[pid.0].program.len() {
                // Quantum exhausted but still runnable: preempt back to ready.
                self.processes[pid.0].wait_time += quantum as u64;
                self.processes[pid.0].state = ProcState::Ready;
                let clock = self.nodes[node_idx].clock;
                self.emit(trace, node_id, clock, pid, "ready");
                self.nodes[node_idx].ready.push_back(pid);
            } else {
                // Safety path: pc reached the end of the program without an
                // explicit HALT.
                self.processes[pid.0].state = ProcState::Finished;
                let clock = self.nodes[node_idx].clock;
                self.processes[pid.0].finish_time = clock;
                self.emit(trace, node_id, clock, pid, "finished");
            }
        }

        true
    }

    /// Charges the one CPU tick an attempted SEND/RECV costs before blocking.
    fn charge_attempt_tick(&mut self, node_idx: usize, pid: ProcId) {
        self.nodes[node_idx].clock += 1;
        self.processes[pid.0].run_time += 1;
        self.credit_wait_other_ready(node_idx, 1);
    }

    /// Adds `amount` to the wait_time of every process currently in
    /// `node`'s ready queue (the dispatched process has already been
    /// dequeued, so this never double-credits it).
    fn credit_wait_other_ready(&mut self, node_idx: usize, amount: u64) {
        if amount == 0 {
            return;
        }
        for &other in &self.nodes[node_idx].ready {
            self.processes[other.0].wait_time += amount;
        }
    }
}
