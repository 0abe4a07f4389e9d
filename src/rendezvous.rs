// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Cross-node rendezvous registry and matcher
//! OWNERS: @runtime
//! PUBLIC API: RendezvousRegistry; Simulation::try_match_now, sweep_global_matches
//! INVARIANTS: a process is in the registry iff BLOCKED with exactly one of
//!   want_dst_addr/want_src_addr set; registry order is insertion order,
//!   which determines match tie-breaking and is required for reproducible
//!   traces

use crate::driver::Simulation;
use crate::model::ProcId;

/// The set of processes blocked on SEND/RECV across all nodes, in the
/// order they entered the registry. Modeled after the host-backed IPC
/// router's per-service channel table, collapsed to a single process-wide
/// table since rendezvous here is synchronous and unbuffered rather than
/// queued.
#[derive(Debug, Default)]
pub struct RendezvousRegistry {
    entries: Vec<ProcId>,
}

impl RendezvousRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pid: ProcId) {
        self.entries.push(pid);
    }

    pub fn remove(&mut self, pid: ProcId) {
        self.entries.retain(|&p| p != pid);
    }

    pub fn iter(&self) -> impl Iterator<Item = ProcId> + '_ {
        self.entries.iter().copied()
    }
}

impl Simulation {
    /// Looks for a counterpart for `pid`, which must have just entered the
    /// rendezvous-blocked state. On a match, consumes the SEND/RECV opcode
    /// on both sides and schedules a pending release on each home node at
    /// `trigger_node_clock + 1`. Returns whether a match occurred.
    ///
    /// Matching itself emits no trace event — only the later release
    /// (via `flush_pending`) does — so this takes no sink.
    pub(crate) fn try_match_now(&mut self, trigger_node_id: u32, pid: ProcId) -> bool {
        let (is_sender, my_addr, target_addr) = {
            let p = &self.processes[pid.0];
            match (p.want_dst_addr, p.want_src_addr) {
                (Some(dst), _) => (true, p.address(), dst),
                (_, Some(src)) => (false, p.address(), src),
                (None, None) => return false,
            }
        };

        let mut found: Option<ProcId> = None;
        for cand in self.registry.iter() {
            if cand == pid {
                continue;
            }
            let q = &self.processes[cand.0];
            let matches = if is_sender {
                q.want_src_addr.is_some_and(|qsrc| target_addr == q.address() && qsrc == my_addr)
            } else {
                q.want_dst_addr.is_some_and(|qdst| target_addr == q.address() && qdst == my_addr)
            };
            if matches {
                found = Some(cand);
                break;
            }
        }

        let Some(qid) = found else { return false };
        let (sender, receiver) = if is_sender { (pid, qid) } else { (qid, pid) };

        self.processes[sender.0].pc += 1;
        self.processes[sender.0].sends += 1;
        self.processes[receiver.0].pc += 1;
        self.processes[receiver.0].recvs += 1;

        let due_time = self.node_clock(trigger_node_id) + 1;
        for id in [sender, receiver] {
            self.registry.remove(id);
            self.processes[id.0].want_dst_addr = None;
            self.processes[id.0].want_src_addr = None;

            let node_idx = self.node_index(self.processes[id.0].node_id);
            self.nodes[node_idx].blocked.retain(|&x| x != id);

            let is_finish = self.processes[id.0].next_is_halt();
            self.nodes[node_idx]
                .pending
                .push(crate::model::PendingEntry { proc: id, due_time, is_finish });
        }

        true
    }

    /// Scans the registry for any matchable pair, in insertion order,
    /// stopping at the first match found. Returns whether one occurred.
    pub(crate) fn sweep_global_matches(&mut self) -> bool {
        let candidates: Vec<ProcId> = self.registry.iter().collect();
        for pid in candidates {
            let still_present = self.registry.iter().any(|p| p == pid);
            if !still_present {
                continue;
            }
            let node_id = self.processes[pid.0].node_id;
            if self.try_match_now(node_id, pid) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_preserves_insertion_order() {
        let mut reg = RendezvousRegistry::new();
        reg.insert(ProcId(2));
        reg.insert(ProcId(0));
        reg.insert(ProcId(1));
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec![ProcId(2), ProcId(0), ProcId(1)]);
    }

    #[test]
    fn remove_drops_only_that_entry() {
        let mut reg = RendezvousRegistry::new();
        reg.insert(ProcId(0));
        reg.insert(ProcId(1));
        reg.remove(ProcId(0));
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec![ProcId(1)]);
    }
}
