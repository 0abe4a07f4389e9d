// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Core data model for the distributed scheduler simulation
//! OWNERS: @runtime
//! PUBLIC API: Operation, ProcState, Process, ProcId, Node, PendingEntry
//! DEPENDS_ON: nothing (leaf module)
//! INVARIANTS: pc in [0, program.len()]; a process is in exactly one of
//!   {ready, blocked, finished} at any driver-iteration boundary.

use std::collections::VecDeque;

/// Index into a [`crate::driver::Simulation`]'s process arena.
///
/// Processes are owned by a flat arena; every queue (ready, blocked,
/// pending, the rendezvous registry) holds indices rather than the
/// processes themselves, so nothing needs a lifetime tied to the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcId(pub usize);

/// One instruction in a process's flat, pre-expanded program.
///
/// `LOOP`/`END` never appear here: the parser expands them while
/// building this vector (see [`crate::parser`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Run on the CPU for `ticks` ticks.
    Doop(u32),
    /// Sleep for `ticks` ticks, then become READY (or FINISHED, if HALT follows).
    Block(u32),
    /// Block until a RECV with a matching address rendezvous-matches.
    Send(u32),
    /// Block until a SEND with a matching address rendezvous-matches.
    Recv(u32),
    /// Terminate the process.
    Halt,
}

/// Scheduling state of a [`Process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    New,
    Ready,
    Running,
    Blocked,
    Finished,
}

/// Process control block.
///
/// Mutated only by its home node's scheduler (`crate::scheduler`) or by a
/// rendezvous release (`crate::rendezvous`); never touched across node
/// boundaries except through the global registry and pending-release lists.
#[derive(Debug, Clone)]
pub struct Process {
    pub name: String,
    pub global_pid: usize,
    pub node_id: u32,
    pub local_pid: u32,
    #[allow(dead_code)] // accepted, never read by the round-robin core
    pub size: u32,
    #[allow(dead_code)] // accepted, never read by the round-robin core
    pub priority: u32,

    pub program: Vec<Operation>,
    pub pc: usize,

    pub state: ProcState,

    pub run_time: u64,
    pub block_time: u64,
    pub wait_time: u64,
    pub sends: u64,
    pub recvs: u64,
    pub finish_time: u64,

    /// Destination address while BLOCKED as a sender. `None` unless mid-SEND.
    pub want_dst_addr: Option<u32>,
    /// Expected source address while BLOCKED as a receiver. `None` unless mid-RECV.
    pub want_src_addr: Option<u32>,
    /// Absolute node clock at which a timed BLOCK expires. `None` unless mid-BLOCK.
    pub unblock_time: Option<u64>,
}

impl Process {
    pub fn new(
        name: String,
        global_pid: usize,
        node_id: u32,
        local_pid: u32,
        size: u32,
        priority: u32,
        program: Vec<Operation>,
    ) -> Self {
        Self {
            name,
            global_pid,
            node_id,
            local_pid,
            size,
            priority,
            program,
            pc: 0,
            state: ProcState::New,
            run_time: 0,
            block_time: 0,
            wait_time: 0,
            sends: 0,
            recvs: 0,
            finish_time: 0,
            want_dst_addr: None,
            want_src_addr: None,
            unblock_time: None,
        }
    }

    /// The `node_id * 100 + local_pid` addressing scheme used by SEND/RECV.
    pub fn address(&self) -> u32 {
        self.node_id * 100 + self.local_pid
    }

    /// Whether this process's next instruction (if any) is HALT.
    pub fn next_is_halt(&self) -> bool {
        matches!(self.program.get(self.pc), Some(Operation::Halt))
    }
}

/// A deferred release scheduled by the rendezvous matcher: the process
/// transitions on its home node once that node's clock reaches `due_time`.
#[derive(Debug, Clone, Copy)]
pub struct PendingEntry {
    pub proc: ProcId,
    pub due_time: u64,
    /// If true, the release goes straight to FINISHED (next op was HALT).
    pub is_finish: bool,
}

/// One simulated compute node: an independent clock, a round-robin ready
/// queue, an unordered blocked set, and a list of scheduled future releases.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: u32,
    pub quantum: u32,
    pub clock: u64,
    /// All processes assigned to this node, in input order (used only for
    /// the initial `new`/`ready` emission at time 0).
    pub resident: Vec<ProcId>,
    pub ready: VecDeque<ProcId>,
    pub blocked: Vec<ProcId>,
    pub pending: Vec<PendingEntry>,
}

impl Node {
    pub fn new(id: u32, quantum: u32) -> Self {
        Self {
            id,
            quantum,
            clock: 0,
            resident: Vec::new(),
            ready: VecDeque::new(),
            blocked: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// No ready process, no blocked process, and nothing pending release.
    pub fn is_idle(&self) -> bool {
        self.ready.is_empty() && self.blocked.is_empty() && self.pending.is_empty()
    }
}
