//! K-way merge across sorted runs (spec.md §4.5): a priority queue keyed by
//! `predicate(head(run_i))`, repeatedly popping the least run and emitting
//! its head to the output sink.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::bgzf::BgzfWriteHandle;
use crate::error::Result;

use super::run::RunReader;
use super::transport::write_framed;
use super::SortKey;

struct QueueEntry {
    key: SortKey,
    run_index: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Ties on `key` break toward the lower run index. Runs are spilled
        // in the order records were read from the input, so the run with
        // the smaller index holds the earlier record whenever two heads
        // compare equal; without this, `BinaryHeap`'s pop order for equal
        // keys is unspecified and the merge would not be stable across run
        // boundaries (spec.md §4.5, §8: "preserves the input order of
        // records for which the predicate reports equality").
        self.key.cmp(&other.key).then(self.run_index.cmp(&other.run_index))
    }
}

/// Merges `runs` into `output`, writing each record as a length-prefixed
/// frame. Returns the total number of records emitted.
pub fn merge_runs<W: BgzfWriteHandle>(
    mut runs: Vec<RunReader>,
    order: super::SortOrder,
    output: &mut W,
) -> Result<u64> {
    let mut heap = BinaryHeap::with_capacity(runs.len());

    for (index, run) in runs.iter().enumerate() {
        if let Some(record) = run.head() {
            heap.push(Reverse(QueueEntry {
                key: SortKey::for_order(order, record),
                run_index: index,
            }));
        }
    }

    let mut total = 0u64;

    while let Some(Reverse(entry)) = heap.pop() {
        let run = &mut runs[entry.run_index];
        let record = run.head().expect("queued run must have a head").clone();
        write_framed(output, &record)?;
        total += 1;

        run.advance()?;
        if let Some(next) = run.head() {
            heap.push(Reverse(QueueEntry {
                key: SortKey::for_order(order, next),
                run_index: entry.run_index,
            }));
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::builder::{make_alignment_record, Options};
    use crate::sort::SortOrder;
    use std::io::Cursor;

    fn run_from(order: SortOrder, positions: &[(i32, i32)]) -> RunReader {
        let mut bytes = Vec::new();
        for &(reference_id, position) in positions {
            let record = make_alignment_record(
                "r",
                "A",
                0,
                &Options {
                    reference_id,
                    position: Some(position),
                    ..Options::default()
                },
            )
            .unwrap();
            super::super::transport::write_framed(&mut bytes, &record).unwrap();
        }

        let mut input = crate::bgzf::BgzfBuffer::new(Cursor::new(bytes));
        super::super::run::make_run(&mut input, order, positions.len().max(1))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_merge_two_sorted_runs_preserves_global_order() {
        let run_a = run_from(SortOrder::Coordinate, &[(0, 10), (0, 50)]);
        let run_b = run_from(SortOrder::Coordinate, &[(0, 20), (1, 5)]);

        let mut output = Vec::new();
        let total = merge_runs(vec![run_a, run_b], SortOrder::Coordinate, &mut output).unwrap();
        assert_eq!(total, 4);

        let mut stream = crate::bgzf::BgzfBuffer::new(Cursor::new(output));
        let mut positions = Vec::new();
        while let Some(record) = super::super::transport::read_framed(&mut stream).unwrap() {
            positions.push((record.reference_id(), record.position()));
        }
        assert_eq!(positions, vec![(0, 10), (0, 20), (0, 50), (1, 5)]);
    }

    #[test]
    fn test_merge_empty_run_list_emits_nothing() {
        let mut output = Vec::new();
        let total = merge_runs(Vec::new(), SortOrder::Coordinate, &mut output).unwrap();
        assert_eq!(total, 0);
        assert!(output.is_empty());
    }
}
