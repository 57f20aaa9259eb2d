//! The packed alignment record.
//!
//! Rather than eagerly parsing each field into a struct on read,
//! `AlignmentRecord` wraps the raw encoded bytes and every accessor is a
//! derived-offset read — the buffer is the source of truth, not a parsed
//! copy of it. Constructing one (`make_alignment_record`) is the only place
//! validation runs; reading one back off disk never re-validates unless
//! asked.

pub mod builder;
pub mod cigar;
pub mod data;
pub mod flags;
pub mod quality;
pub mod sequence;

use bam_common::{primitive, CigarOp};
use log::debug;

use crate::error::Result;
use flags::Flags;

const REFERENCE_ID: usize = 0;
const POSITION: usize = 4;
const READ_NAME_LEN: usize = 8;
const MAPPING_QUALITY: usize = 9;
const ALIGNMENT_BIN: usize = 10;
const CIGAR_LEN: usize = 12;
const FLAG: usize = 14;
const READ_LENGTH: usize = 16;
const MATE_REFERENCE_ID: usize = 20;
const MATE_POSITION: usize = 24;
const INSERT_LENGTH: usize = 28;
const READ_NAME: usize = 32;

/// A decoded auxiliary tag entry, as returned by `AlignmentRecord::tags`.
pub use data::Value as TagValue;

/// A single BAM alignment record, stored as its packed on-disk bytes: a
/// fixed-offset core followed by the variable-length read name, CIGAR,
/// sequence, quality, and tag regions.
#[derive(Clone, PartialEq)]
pub struct AlignmentRecord {
    bytes: Vec<u8>,
}

impl AlignmentRecord {
    /// Wraps an already-encoded record buffer without re-validating it.
    /// Used when reading a record back off a BGZF stream, where the bytes
    /// are trusted once written.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        debug!("decoding alignment record without flag-validity check");
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn reference_id(&self) -> i32 {
        primitive::read_i32(&self.bytes, REFERENCE_ID)
    }

    pub fn position(&self) -> i32 {
        primitive::read_i32(&self.bytes, POSITION)
    }

    pub fn read_name_len(&self) -> u8 {
        primitive::read_u8(&self.bytes, READ_NAME_LEN)
    }

    pub fn mapping_quality(&self) -> u8 {
        primitive::read_u8(&self.bytes, MAPPING_QUALITY)
    }

    pub fn alignment_bin(&self) -> u16 {
        primitive::read_u16(&self.bytes, ALIGNMENT_BIN)
    }

    pub fn cigar_len(&self) -> u16 {
        primitive::read_u16(&self.bytes, CIGAR_LEN)
    }

    pub fn flag_raw(&self) -> u16 {
        primitive::read_u16(&self.bytes, FLAG)
    }

    pub fn flags(&self) -> Flags {
        Flags::from_bits_retain(self.flag_raw())
    }

    pub fn read_length(&self) -> i32 {
        primitive::read_i32(&self.bytes, READ_LENGTH)
    }

    pub fn mate_reference_id(&self) -> i32 {
        primitive::read_i32(&self.bytes, MATE_REFERENCE_ID)
    }

    pub fn mate_position(&self) -> i32 {
        primitive::read_i32(&self.bytes, MATE_POSITION)
    }

    pub fn insert_length(&self) -> i32 {
        primitive::read_i32(&self.bytes, INSERT_LENGTH)
    }

    pub fn read_name(&self) -> &str {
        let len = self.read_name_len() as usize;
        std::str::from_utf8(&self.bytes[READ_NAME..READ_NAME + len - 1])
            .unwrap_or_default()
    }

    fn cigar_index(&self) -> usize {
        READ_NAME + self.read_name_len() as usize
    }

    fn cigar_bytes(&self) -> usize {
        4 * self.cigar_len() as usize
    }

    fn seq_index(&self) -> usize {
        self.cigar_index() + self.cigar_bytes()
    }

    fn seq_bytes(&self) -> usize {
        (self.read_length() as usize + 1) / 2
    }

    fn qual_index(&self) -> usize {
        self.seq_index() + self.seq_bytes()
    }

    fn tag_index(&self) -> usize {
        self.qual_index() + self.read_length() as usize
    }

    /// Decodes the CIGAR operation list.
    pub fn cigar(&self) -> Result<Vec<CigarOp>> {
        let start = self.cigar_index();
        let end = start + self.cigar_bytes();
        cigar::decode(&self.bytes[start..end])
    }

    /// The inclusive 0-based reference coordinate this alignment ends at,
    /// derived from `position` and the CIGAR's reference-length span.
    pub fn alignment_end(&self) -> Result<i64> {
        let ops = self.cigar()?;
        let reference_length = cigar::alignment_reference_length(&ops);
        Ok(cigar::alignment_end(self.position(), reference_length))
    }

    /// Decodes the 4-bit packed sequence into an ASCII string.
    pub fn sequence(&self) -> String {
        let start = self.seq_index();
        let end = start + self.seq_bytes();
        sequence::decode(&self.bytes[start..end], self.read_length() as usize)
    }

    /// Decodes the quality string, or `None` if absent.
    pub fn quality(&self) -> Option<String> {
        let start = self.qual_index();
        let end = start + self.read_length() as usize;
        quality::decode(&self.bytes[start..end])
    }

    /// Decodes every auxiliary tag entry following the quality region.
    pub fn tags(&self) -> Result<Vec<([u8; 2], TagValue)>> {
        data::decode_entries(&self.bytes[self.tag_index()..])
    }

    /// Looks up a single auxiliary tag without decoding the others.
    pub fn tag(&self, key: [u8; 2]) -> Result<Option<TagValue>> {
        Ok(self
            .tags()?
            .into_iter()
            .find(|(tag, _)| *tag == key)
            .map(|(_, value)| value))
    }

    /// Re-runs the flag validity rule against the decoded flags, read
    /// name, position, and reference id. `from_bytes` never
    /// calls this implicitly; callers opt in explicitly, e.g. after reading
    /// records from an untrusted source.
    pub fn validate(&self) -> Result<()> {
        flags::check(self.flags()).map_err(|explanation| {
            flags::malformed(
                self.flags(),
                Some(self.read_name()),
                self.position(),
                self.reference_id(),
                explanation,
            )
        })
    }
}

impl std::fmt::Debug for AlignmentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignmentRecord")
            .field("reference_id", &self.reference_id())
            .field("position", &self.position())
            .field("read_name", &self.read_name())
            .field("flag", &self.flag_raw())
            .field("mapping_quality", &self.mapping_quality())
            .field("cigar", &self.cigar())
            .field("sequence", &self.sequence())
            .field("quality", &self.quality())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::builder::{make_alignment_record, Options};
    use bam_common::{CigarKind, CigarOp};

    #[test]
    fn test_offsets_survive_round_trip() {
        let record = make_alignment_record(
            "read1",
            "ACGTACGTAC",
            flags_for_unpaired_mapped(),
            &Options {
                reference_id: 2,
                position: Some(99),
                cigar: vec![CigarOp::new(CigarKind::Match, 10)],
                quality: Some("IIIIIIIIII"),
                tags: vec![(*b"NM", super::data::Value::Int(0))],
                ..Options::default()
            },
        )
        .unwrap();

        assert_eq!(record.reference_id(), 2);
        assert_eq!(record.position(), 99);
        assert_eq!(record.read_name(), "read1");
        assert_eq!(record.read_length(), 10);
        assert_eq!(record.sequence(), "ACGTACGTAC");
        assert_eq!(record.quality().as_deref(), Some("IIIIIIIIII"));
        assert_eq!(record.cigar().unwrap().len(), 1);
        assert_eq!(
            record.tag(*b"NM").unwrap(),
            Some(super::data::Value::Int(0))
        );
        // position 99, 10M -> ends at 108
        assert_eq!(record.alignment_end().unwrap(), 108);
    }

    #[test]
    fn test_debug_does_not_panic_on_malformed_cigar() {
        let mut record = make_alignment_record(
            "read1",
            "AC",
            flags_for_unpaired_mapped(),
            &Options::default(),
        )
        .unwrap();

        let index = record.cigar_index();
        let mut bytes = record.into_bytes();
        bytes[index] = 9; // unassigned low nibble
        record = super::AlignmentRecord::from_bytes(bytes);

        let rendered = format!("{record:?}");
        assert!(rendered.contains("read1"));
    }

    fn flags_for_unpaired_mapped() -> u16 {
        0
    }
}
