//! Run construction (spec.md §4.5): pulling up to `buffer_size` records from
//! an input stream, stably sorting them in memory, and spilling the result
//! to a temp file that a `RunReader` streams back.

use std::io::Seek;

use log::info;
use tempfile::tempfile;

use crate::bgzf::{BgzfBuffer, BgzfReadHandle};
use crate::error::Result;
use crate::record::AlignmentRecord;

use super::transport::{read_framed, write_framed};
use super::SortKey;

/// A single sorted run, backed by a rewound temp file. Exposes the classic
/// `head`/`advance` merge-stream shape (spec.md §4.5): `head` never
/// re-reads, `advance` pulls the next record. The temp file is unlinked by
/// `tempfile` immediately on creation, so dropping this struct (even on an
/// aborted sort) releases the backing disk space.
pub struct RunReader {
    buffer: BgzfBuffer<std::fs::File>,
    head: Option<AlignmentRecord>,
}

impl RunReader {
    /// The next record in the run, or `None` once exhausted.
    pub fn head(&self) -> Option<&AlignmentRecord> {
        self.head.as_ref()
    }

    /// Discards `head` and pulls the next record from the run file.
    pub fn advance(&mut self) -> Result<()> {
        self.head = read_framed(&mut self.buffer)?;
        Ok(())
    }
}

/// Pulls up to `buffer_size` records from `input`, stably sorts them by
/// `order`, and spills the sorted run to a fresh temp file. Returns `None`
/// if the input was already exhausted (zero records read).
pub fn make_run<H: BgzfReadHandle>(
    input: &mut BgzfBuffer<H>,
    order: super::SortOrder,
    buffer_size: usize,
) -> Result<Option<RunReader>> {
    let mut records = Vec::with_capacity(buffer_size.min(1024));

    while records.len() < buffer_size {
        match read_framed(input)? {
            Some(record) => records.push(record),
            None => break,
        }
    }

    if records.is_empty() {
        return Ok(None);
    }

    let record_count = records.len();
    let mut keyed: Vec<(SortKey, AlignmentRecord)> = records
        .into_iter()
        .map(|record| (SortKey::for_order(order, &record), record))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));

    info!("spilling sort run with {record_count} records");
    let mut file = tempfile()?;
    {
        let mut buffer_out = std::io::BufWriter::new(&mut file);
        for (_, record) in &keyed {
            write_framed(&mut buffer_out, record)?;
        }
        std::io::Write::flush(&mut buffer_out)?;
    }
    file.seek(std::io::SeekFrom::Start(0))?;

    let mut run = RunReader {
        buffer: BgzfBuffer::new(file),
        head: None,
    };
    run.advance()?;
    Ok(Some(run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::builder::{make_alignment_record, Options};
    use crate::sort::SortOrder;
    use std::io::Cursor;

    fn record_at(reference_id: i32, position: i32) -> AlignmentRecord {
        make_alignment_record(
            "r",
            "A",
            0,
            &Options {
                reference_id,
                position: Some(position),
                ..Options::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_make_run_sorts_stably_and_spills() {
        let records = vec![
            record_at(1, 10),
            record_at(0, 50),
            record_at(0, 20),
        ];

        let mut bytes = Vec::new();
        for record in &records {
            super::super::transport::write_framed(&mut bytes, record).unwrap();
        }

        let mut input = crate::bgzf::BgzfBuffer::new(Cursor::new(bytes));
        let mut run = make_run(&mut input, SortOrder::Coordinate, 10)
            .unwrap()
            .unwrap();

        let mut positions = Vec::new();
        while let Some(record) = run.head() {
            positions.push((record.reference_id(), record.position()));
            run.advance().unwrap();
        }

        assert_eq!(positions, vec![(0, 20), (0, 50), (1, 10)]);
    }

    #[test]
    fn test_make_run_on_empty_input_returns_none() {
        let mut input = crate::bgzf::BgzfBuffer::new(Cursor::new(Vec::<u8>::new()));
        let run = make_run(&mut input, SortOrder::Coordinate, 10).unwrap();
        assert!(run.is_none());
    }

    #[test]
    fn test_make_run_stops_at_buffer_size() {
        let records = vec![record_at(0, 1), record_at(0, 2), record_at(0, 3)];
        let mut bytes = Vec::new();
        for record in &records {
            super::super::transport::write_framed(&mut bytes, record).unwrap();
        }

        let mut input = crate::bgzf::BgzfBuffer::new(Cursor::new(bytes));
        let mut run = make_run(&mut input, SortOrder::Coordinate, 2)
            .unwrap()
            .unwrap();

        let mut count = 0;
        while run.head().is_some() {
            count += 1;
            run.advance().unwrap();
        }
        assert_eq!(count, 2);
    }
}
