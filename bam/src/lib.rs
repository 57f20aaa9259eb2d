//! BAM alignment record codec and external merge sort.
//!
//! Reads, writes, and externally sorts alignment records in the BAM binary
//! format used in high-throughput sequencing. The actual BGZF deflate/
//! inflate codec, CLI wrappers, and the SAM text header parser are external
//! collaborators; this crate owns the binary record layout, the alignment
//! flag semantics, the tag registry, the buffered BGZF byte stream built on
//! top of a decompressing handle, and the external merge sort that ties
//! them together.

pub mod bgzf;
pub mod error;
pub mod header;
pub mod record;
pub mod sort;
pub mod tag;

pub use bgzf::{BamFileReader, BamFileWriter, BgzfBuffer, BgzfReadHandle, BgzfWriteHandle};
pub use error::{Error, Result};
pub use header::{read_header_meta, rewrite_sort_order, write_header_meta};
pub use record::builder::{make_alignment_record, Options};
pub use record::flags::{flag_bits, Flags};
pub use record::{AlignmentRecord, TagValue};
pub use sort::{
    alignment_name_lt, alignment_record_lt, alignment_strand_lt, sort_bam_alignments,
    sort_bam_file, SortKey, SortOrder,
};
pub use tag::{encode_tag, tag_documentation, ValueType};
