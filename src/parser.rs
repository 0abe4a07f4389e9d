// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Tokenizer / program builder for the simulator's input format
//! OWNERS: @runtime
//! PUBLIC API: parse(text) -> Result<Simulation, ParseError>
//! INVARIANTS: LOOP/END never reach the engine; unknown tokens are skipped;
//!   a process with no HALT simply runs out of program (absorbed, not fatal)
//! ADR: docs/adr/0007-input-parser-strategy.md
//!
//! LOOP expansion works by rewinding the token cursor rather than copying
//! operation slices: entering `LOOP n` records the token position right
//! after `n` and pushes a frame onto a small stack; `END` pops that frame
//! and, while iterations remain, rewinds the cursor back to the recorded
//! position instead of advancing. Nested loops fall out for free because
//! each outer repeat simply re-parses the inner `LOOP ... END` from
//! scratch. A `LOOP 0` is special-cased: its body is skipped by tracking
//! nesting depth rather than ever being parsed.

use crate::error::ParseError;
use crate::model::{Node, Operation, Process};
use crate::driver::Simulation;

struct Cursor<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { tokens: text.split_whitespace().collect(), pos: 0 }
    }

    fn next(&mut self) -> Option<&'a str> {
        let tok = self.tokens.get(self.pos).copied();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn next_u32(&mut self) -> Option<u32> {
        self.next()?.parse().ok()
    }
}

struct LoopFrame {
    remaining: u32,
    body_start: usize,
}

/// Parses the whole input, returning a ready-to-run [`Simulation`].
pub fn parse(text: &str) -> Result<Simulation, ParseError> {
    let mut cur = Cursor::new(text);

    let total_procs = cur.next_u32().ok_or(ParseError::MalformedHeader)?;
    let num_nodes = cur.next_u32().ok_or(ParseError::MalformedHeader)?;
    let quantum = cur.next_u32().ok_or(ParseError::MalformedHeader)?;

    let mut nodes: Vec<Node> = (1..=num_nodes).map(|id| Node::new(id, quantum)).collect();
    let mut processes: Vec<Process> = Vec::with_capacity(total_procs as usize);
    let mut local_pid_counts = vec![0u32; num_nodes as usize];

    for index in 0..total_procs as usize {
        let name = cur.next().ok_or(ParseError::MalformedProcess { index })?;
        let size = cur.next_u32().ok_or(ParseError::MalformedProcess { index })?;
        let priority = cur.next_u32().ok_or(ParseError::MalformedProcess { index })?;
        let node_id = cur.next_u32().ok_or(ParseError::MalformedProcess { index })?;

        let program = parse_program(&mut cur);

        let global_pid = index + 1;
        let node_idx = (node_id.saturating_sub(1)) as usize;
        let local_pid = local_pid_counts.get(node_idx).copied().unwrap_or(0) + 1;
        if let Some(slot) = local_pid_counts.get_mut(node_idx) {
            *slot = local_pid;
        }

        let pid = crate::model::ProcId(processes.len());
        processes.push(Process::new(
            name.to_string(),
            global_pid,
            node_id,
            local_pid,
            size,
            priority,
            program,
        ));
        if let Some(node) = nodes.get_mut(node_idx) {
            node.resident.push(pid);
        }
    }

    Ok(Simulation::new(processes, nodes))
}

/// Reads one process's program body, expanding `LOOP`/`END` as it goes.
/// Stops at `HALT` or end-of-input; unknown tokens are skipped silently.
fn parse_program(cur: &mut Cursor<'_>) -> Vec<Operation> {
    let mut ops = Vec::new();
    let mut frames: Vec<LoopFrame> = Vec::new();

    loop {
        let Some(tok) = cur.next() else { break };
        match tok {
            "DOOP" => {
                if let Some(k) = cur.next_u32() {
                    ops.push(Operation::Doop(k));
                }
            }
            "BLOCK" => {
                if let Some(k) = cur.next_u32() {
                    ops.push(Operation::Block(k));
                }
            }
            "SEND" => {
                if let Some(addr) = cur.next_u32() {
                    ops.push(Operation::Send(addr));
                }
            }
            "RECV" => {
                if let Some(addr) = cur.next_u32() {
                    ops.push(Operation::Recv(addr));
                }
            }
            "HALT" => {
                ops.push(Operation::Halt);
                break;
            }
            "LOOP" => {
                let Some(n) = cur.next_u32() else { break };
                if n == 0 {
                    skip_loop_body(cur);
                } else {
                    frames.push(LoopFrame { remaining: n - 1, body_start: cur.pos });
                }
            }
            "END" => {
                if let Some(mut frame) = frames.pop() {
                    if frame.remaining > 0 {
                        frame.remaining -= 1;
                        cur.pos = frame.body_start;
                        frames.push(frame);
                    }
                }
                // a stray END with no open frame is an unknown token: skip it
            }
            _ => {
                // UnknownToken: skip silently and keep parsing
            }
        }
    }

    ops
}

/// Advances `cur` past a `LOOP 0 ... END` body without emitting any ops,
/// tracking nested `LOOP`/`END` depth so inner loops don't confuse the match.
fn skip_loop_body(cur: &mut Cursor<'_>) {
    let mut depth = 1u32;
    while depth > 0 {
        match cur.next() {
            Some("LOOP") => {
                let _ = cur.next(); // the nested loop's iteration count
                depth += 1;
            }
            Some("END") => depth -= 1,
            Some(_) => {}
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operation::*;

    fn program_of(text: &str) -> Vec<Operation> {
        let mut cur = Cursor::new(text);
        parse_program(&mut cur)
    }

    #[test]
    fn flat_program() {
        let ops = program_of("DOOP 3 HALT");
        assert_eq!(ops, vec![Doop(3), Halt]);
    }

    #[test]
    fn loop_expands_body() {
        let ops = program_of("LOOP 3 DOOP 1 END HALT");
        assert_eq!(ops, vec![Doop(1), Doop(1), Doop(1), Halt]);
    }

    #[test]
    fn nested_loop_expands() {
        let ops = program_of("LOOP 2 LOOP 2 DOOP 1 END END HALT");
        assert_eq!(ops, vec![Doop(1), Doop(1), Doop(1), Doop(1), Halt]);
    }

    #[test]
    fn zero_iteration_loop_skips_body() {
        let ops = program_of("LOOP 0 DOOP 99 END DOOP 1 HALT");
        assert_eq!(ops, vec![Doop(1), Halt]);
    }

    #[test]
    fn unknown_token_is_skipped() {
        let ops = program_of("NOP DOOP 2 WIBBLE HALT");
        assert_eq!(ops, vec![Doop(2), Halt]);
    }

    #[test]
    fn missing_halt_runs_out_of_tokens() {
        let ops = program_of("DOOP 2");
        assert_eq!(ops, vec![Doop(2)]);
    }

    #[test]
    fn header_and_process_counts() {
        let sim = parse("1 1 2\nP 1 1 1\nDOOP 3\nHALT\n").unwrap();
        assert_eq!(sim.process_count(), 1);
        assert_eq!(sim.node_count(), 1);
    }

    #[test]
    fn malformed_header_is_fatal() {
        let err = parse("1 1").unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader));
    }

    #[test]
    fn malformed_process_is_fatal() {
        let err = parse("1 1 2\nP 1 1\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedProcess { index: 0 }));
    }

    #[test]
    fn local_pid_assigned_per_node_in_input_order() {
        let sim = parse("3 2 2\nA 1 1 2\nHALT\nB 1 1 1\nHALT\nC 1 1 2\nHALT\n").unwrap();
        let names_and_local_pids = sim.debug_local_pids();
        assert_eq!(names_and_local_pids, vec![("A", 2, 1), ("B", 1, 1), ("C", 2, 2)]);
    }
}
