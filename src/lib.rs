// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! A discrete-event simulator for a small distributed operating system: a
//! fixed set of processes, partitioned across a fixed set of compute nodes,
//! each running its own round-robin scheduler over a shared quantum and
//! coordinating through synchronous cross-node message rendezvous.
//!
//! The engine (`driver`, `scheduler`, `rendezvous`, `model`) is the hard
//! part; `parser`, `trace`, and `summary` are its replaceable input/output
//! collaborators.

pub mod driver;
pub mod error;
pub mod model;
pub mod parser;
pub mod rendezvous;
pub mod scheduler;
pub mod summary;
pub mod trace;

pub use driver::Simulation;
pub use error::{ParseError, SimError};
pub use summary::SummaryRow;
pub use trace::{NullTraceSink, TraceEvent, TraceSink, VecTraceSink, WriteTraceSink};
