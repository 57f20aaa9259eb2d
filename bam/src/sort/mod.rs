//! External merge sort over BAM alignment records (spec.md §4.5, §6).
//!
//! `sort_bam_alignments` is the generic driver, over any `BgzfReadHandle`/
//! `BgzfWriteHandle` pair; `sort_bam_file` is the file-path convenience
//! wrapper that opens the concrete `bgzip`-backed handles the way
//! `lyso-cli`'s `view_bam` opens a `bgzip::read::BGZFReader<File>`.

pub mod merge;
pub mod run;
pub mod transport;

use std::cmp::Ordering;
use std::path::Path;

use log::{debug, info};

use crate::bgzf::{BamFileReader, BamFileWriter, BgzfBuffer, BgzfReadHandle, BgzfWriteHandle};
use crate::error::Result;
use crate::header;
use crate::record::AlignmentRecord;

/// The two total orders the sort supports (spec.md §4.5).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SortOrder {
    Coordinate,
    Queryname,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Coordinate => "coordinate",
            SortOrder::Queryname => "queryname",
        }
    }
}

/// The decorate-sort-undecorate key materialized once per record per run,
/// so a run's in-memory sort and the k-way merge's heap both compare cheap
/// tuples instead of re-decoding fields on every comparison (spec.md §9).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Coordinate(u32, i32, u8),
    Queryname(String, i32, u8),
}

impl SortKey {
    pub fn for_order(order: SortOrder, record: &AlignmentRecord) -> Self {
        let strand = if record.flags().query_reverse() { 1u8 } else { 0u8 };
        match order {
            SortOrder::Coordinate => {
                let ref_key = if record.reference_id() < 0 {
                    u32::MAX
                } else {
                    record.reference_id() as u32
                };
                SortKey::Coordinate(ref_key, record.position(), strand)
            }
            SortOrder::Queryname => {
                SortKey::Queryname(record.read_name().to_string(), record.position(), strand)
            }
        }
    }
}

/// Coordinate-order predicate (spec.md §4.5 `alignment_record_lt`). Unmapped
/// records (`reference_id < 0`) sort after every mapped record; between two
/// unmapped records this predicate falls through to position and strand,
/// which the data model leaves unspecified but stable sort then resolves
/// deterministically.
pub fn alignment_record_lt(a: &AlignmentRecord, b: &AlignmentRecord) -> bool {
    let a_mapped = a.reference_id() >= 0;
    let b_mapped = b.reference_id() >= 0;

    if a_mapped != b_mapped {
        return a_mapped;
    }

    if a_mapped && a.reference_id() != b.reference_id() {
        return a.reference_id() < b.reference_id();
    }

    if a.position() != b.position() {
        return a.position() < b.position();
    }

    alignment_strand_lt(a, b)
}

/// Query-name order predicate (spec.md §4.5 `alignment_name_lt`):
/// lexicographic byte comparison of read names, per spec.md §9's explicit
/// resolution of the "natural vs numeric" open question.
pub fn alignment_name_lt(a: &AlignmentRecord, b: &AlignmentRecord) -> bool {
    match a.read_name().cmp(b.read_name()) {
        Ordering::Less => return true,
        Ordering::Greater => return false,
        Ordering::Equal => {}
    }

    if a.position() != b.position() {
        return a.position() < b.position();
    }

    alignment_strand_lt(a, b)
}

/// The final tiebreak both orders share: forward-strand before
/// reverse-strand. Not a total order on strand alone (spec.md §9) — both
/// records forward or both reverse never satisfies this in either
/// direction, which is correct, since it only ever runs after every other
/// tiebreak has already failed to distinguish the pair.
pub fn alignment_strand_lt(a: &AlignmentRecord, b: &AlignmentRecord) -> bool {
    a.flags().query_forward() && b.flags().query_reverse()
}

/// Drives the external merge sort over an already-open BGZF input/output
/// pair: rewrites and forwards the header, spills sorted runs, then
/// k-way-merges them into `bgzf_out`. Returns `(n_sorted, n_runs)`.
pub fn sort_bam_alignments<H: BgzfReadHandle, W: BgzfWriteHandle>(
    bgzf_in: &mut BgzfBuffer<H>,
    bgzf_out: &mut W,
    order: SortOrder,
    buffer_size: usize,
) -> Result<(u64, u64)> {
    let (header_text, n_ref, references) = header::read_header_meta(bgzf_in)?;
    let rewritten = header::rewrite_sort_order(&header_text, order.as_str());
    header::write_header_meta(bgzf_out, &rewritten, n_ref, &references)?;

    let mut runs = Vec::new();
    while let Some(run) = run::make_run(bgzf_in, order, buffer_size)? {
        debug!("spilled sort run {} for order {:?}", runs.len(), order);
        runs.push(run);
    }

    let n_runs = runs.len() as u64;
    info!("starting k-way merge across {n_runs} runs ({})", order.as_str());
    let n_sorted = merge::merge_runs(runs, order, bgzf_out)?;
    info!("sorted {n_sorted} alignments across {n_runs} runs ({})", order.as_str());

    Ok((n_sorted, n_runs))
}

/// Opens `in_path`/`out_path` as BGZF files and runs `sort_bam_alignments`
/// with a default `buffer_size` of 1,000,000 records.
pub fn sort_bam_file(
    in_path: &Path,
    out_path: &Path,
    order: SortOrder,
    buffer_size: Option<usize>,
) -> Result<(u64, u64)> {
    let reader = BamFileReader::open(in_path)?;
    let mut bgzf_in = BgzfBuffer::new(reader);
    let mut bgzf_out = BamFileWriter::create(out_path)?;

    let result = sort_bam_alignments(
        &mut bgzf_in,
        &mut bgzf_out,
        order,
        buffer_size.unwrap_or(1_000_000),
    );

    // Release both handles regardless of outcome; a close failure never
    // masks the original sort error (spec.md §7: "closing a stream after a
    // failed close still releases the handle").
    let _ = bgzf_out.close();
    let _ = bgzf_in.close();
    result
}
