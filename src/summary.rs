// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: End-of-run per-process statistics table
//! OWNERS: @runtime
//! PUBLIC API: SummaryRow
//! INVARIANTS: rows are sorted by (finish_time, node_id, local_pid) ascending;
//!   only FINISHED processes appear (deadlocked processes are omitted)

/// One row of the final statistics table, for a single FINISHED process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub finish_time: u64,
    pub node_id: u32,
    pub local_pid: u32,
    pub run_time: u64,
    pub block_time: u64,
    pub wait_time: u64,
    pub sends: u64,
    pub recvs: u64,
}

impl SummaryRow {
    /// Renders to the fixed-width wire format:
    /// `| TTTTT | Proc NN.PP | Run r, Block b, Wait w, Sends s, Recvs v`.
    pub fn render(&self) -> String {
        format!(
            "| {:05} | Proc {:02}.{:02} | Run {}, Block {}, Wait {}, Sends {}, Recvs {}",
            self.finish_time,
            self.node_id,
            self.local_pid,
            self.run_time,
            self.block_time,
            self.wait_time,
            self.sends,
            self.recvs,
        )
    }

    fn sort_key(&self) -> (u64, u32, u32) {
        (self.finish_time, self.node_id, self.local_pid)
    }
}

/// Sorts rows by the composite key `(finish_time, node_id, local_pid)`.
pub fn sort_rows(rows: &mut [SummaryRow]) {
    rows.sort_by_key(SummaryRow::sort_key);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_width() {
        let row = SummaryRow {
            finish_time: 3,
            node_id: 1,
            local_pid: 1,
            run_time: 3,
            block_time: 0,
            wait_time: 0,
            sends: 0,
            recvs: 0,
        };
        assert_eq!(row.render(), "| 00003 | Proc 01.01 | Run 3, Block 0, Wait 0, Sends 0, Recvs 0");
    }

    #[test]
    fn sorts_by_composite_key() {
        let mut rows = vec![
            SummaryRow { finish_time: 5, node_id: 1, local_pid: 1, run_time: 0, block_time: 0, wait_time: 0, sends: 0, recvs: 0 },
            SummaryRow { finish_time: 5, node_id: 1, local_pid: 0, run_time: 0, block_time: 0, wait_time: 0, sends: 0, recvs: 0 },
            SummaryRow { finish_time: 2, node_id: 2, local_pid: 1, run_time: 0, block_time: 0, wait_time: 0, sends: 0, recvs: 0 },
        ];
        sort_rows(&mut rows);
        let keys: Vec<_> = rows.iter().map(|r| (r.finish_time, r.node_id, r.local_pid)).collect();
        assert_eq!(keys, vec![(2, 2, 1), (5, 1, 0), (5, 1, 1)]);
    }
}
