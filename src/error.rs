// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Error types for input parsing and the CLI entry point
//! OWNERS: @runtime
//! PUBLIC API: ParseError, SimError
//! INVARIANTS: only the two fatal parse conditions terminate the run; all
//!   other parse anomalies (unknown tokens, missing HALT) are absorbed by
//!   the parser itself and never surface as an error variant here.

use thiserror::Error;

/// The two fatal conditions the parser can hit. Everything else (unknown
/// tokens, a process with no HALT) is absorbed defensively, per design.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed header: expected `total_procs num_nodes quantum`")]
    MalformedHeader,

    #[error("malformed process line for process #{index}: expected `name size priority node_id`")]
    MalformedProcess { index: usize },
}

/// Top-level error returned from `main`.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
