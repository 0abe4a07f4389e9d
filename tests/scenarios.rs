// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Black-box end-to-end scenario tests driving the public library API
//! through an in-memory trace sink.

use distsim::parser::parse;
use distsim::VecTraceSink;

#[test]
fn single_node_no_ipc() {
    let sim = parse("1 1 2\nP 1 1 1\nDOOP 3\nHALT\n").unwrap();
    let mut sink = VecTraceSink::default();
    let rows = sim.run(&mut sink);

    let lines = sink.rendered();
    assert_eq!(lines[0], "[01] 00000: process 1 new");
    assert_eq!(lines[1], "[01] 00000: process 1 ready");
    assert_eq!(lines[2], "[01] 00000: process 1 running");
    assert!(lines.contains(&"[01] 00003: process 1 finished".to_string()));

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].render(), "| 00003 | Proc 01.01 | Run 3, Block 0, Wait 0, Sends 0, Recvs 0");
}

#[test]
fn single_node_preemption() {
    let sim = parse("2 1 2\nA 1 1 1\nDOOP 5\nHALT\nB 1 1 1\nDOOP 1\nHALT\n").unwrap();
    let mut sink = VecTraceSink::default();
    let rows = sim.run(&mut sink);

    let a = rows.iter().find(|r| r.local_pid == 1).unwrap();
    let b = rows.iter().find(|r| r.local_pid == 2).unwrap();
    assert_eq!(a.run_time, 5);
    assert_eq!(a.wait_time, 1);
    assert_eq!(b.run_time, 1);
    assert_eq!(b.wait_time, 2);
    assert_eq!(b.finish_time, 3);
}

#[test]
fn cross_node_rendezvous() {
    let sim = parse("2 2 2\nA 1 1 1\nSEND 201\nHALT\nB 1 1 2\nRECV 101\nHALT\n").unwrap();
    let mut sink = VecTraceSink::default();
    let rows = sim.run(&mut sink);

    let lines = sink.rendered();
    assert!(lines.contains(&"[01] 00001: process 1 blocked (send)".to_string()));
    assert!(lines.contains(&"[02] 00001: process 1 blocked (recv)".to_string()));
    assert!(lines.contains(&"[01] 00002: process 1 finished".to_string()));
    assert!(lines.contains(&"[02] 00002: process 1 finished".to_string()));

    assert_eq!(rows.len(), 2);
    assert_eq!(rows.iter().map(|r| r.sends).sum::<u64>(), 1);
    assert_eq!(rows.iter().map(|r| r.recvs).sum::<u64>(), 1);
}

#[test]
fn timed_block() {
    let sim = parse("1 1 2\nP 1 1 1\nDOOP 1\nBLOCK 3\nHALT\n").unwrap();
    let mut sink = VecTraceSink::default();
    let rows = sim.run(&mut sink);

    let lines = sink.rendered();
    assert!(lines.contains(&"[01] 00000: process 1 running".to_string()));
    assert!(lines.contains(&"[01] 00001: process 1 blocked".to_string()));
    assert!(lines.contains(&"[01] 00004: process 1 finished".to_string()));

    assert_eq!(rows[0].run_time, 1);
    assert_eq!(rows[0].block_time, 3);
    assert_eq!(rows[0].finish_time, 4);
}

#[test]
fn unmatched_rendezvous_deadlocks_silently() {
    let sim = parse("1 1 2\nP 1 1 1\nSEND 199\nHALT\n").unwrap();
    let mut sink = VecTraceSink::default();
    let rows = sim.run(&mut sink);

    assert!(sink.rendered().contains(&"[01] 00001: process 1 blocked (send)".to_string()));
    assert!(rows.is_empty());
}

#[test]
fn loop_expansion() {
    let sim = parse("1 1 2\nP 1 1 1\nLOOP 3 DOOP 1 END HALT\n").unwrap();
    let mut sink = VecTraceSink::default();
    let rows = sim.run(&mut sink);

    assert_eq!(rows[0].run_time, 3);
    assert_eq!(rows[0].finish_time, 3);
}
