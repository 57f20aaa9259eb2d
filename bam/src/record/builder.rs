//! Alignment record construction (spec.md §4.2, §6: `make_alignment_record`).
//!
//! This is the one place flag validity (spec.md §4.2's three-case rule) is
//! enforced; a record read back off a BGZF stream via `AlignmentRecord::
//! from_bytes` is trusted and only re-checked if the caller calls
//! `validate` explicitly.

use bam_common::CigarOp;

use super::{cigar, data::Value, flags, quality, sequence, AlignmentRecord};
use crate::error::{Error, Result};

/// Optional fields of a new alignment record. Every field defaults to the
/// BAM convention for "unset": `-1` for reference ids and positions, `0`
/// for quality/bin/insert length, empty for the CIGAR and tag lists.
pub struct Options<'a> {
    pub reference_id: i32,
    pub position: Option<i32>,
    pub mate_reference_id: i32,
    pub mate_position: Option<i32>,
    pub mapping_quality: u8,
    pub alignment_bin: u16,
    pub insert_length: i32,
    pub cigar: Vec<CigarOp>,
    pub quality: Option<&'a str>,
    pub tags: Vec<([u8; 2], Value)>,
}

impl Default for Options<'_> {
    fn default() -> Self {
        Self {
            reference_id: -1,
            position: None,
            mate_reference_id: -1,
            mate_position: None,
            mapping_quality: 0,
            alignment_bin: 0,
            insert_length: 0,
            cigar: Vec::new(),
            quality: None,
            tags: Vec::new(),
        }
    }
}

/// Assembles a packed `AlignmentRecord` from its logical fields, validating
/// the flag bits and the sequence/quality length agreement before encoding.
pub fn make_alignment_record(
    read_name: &str,
    seq: &str,
    flag: u16,
    options: &Options,
) -> Result<AlignmentRecord> {
    let flags = flags::Flags::from_bits_retain(flag);
    let position = options.position.unwrap_or(-1);

    flags::check(flags).map_err(|explanation| {
        flags::malformed(flags, Some(read_name), position, options.reference_id, explanation)
    })?;

    if let Some(quality) = options.quality {
        if quality.chars().count() != seq.chars().count() {
            return Err(Error::InvalidArgument(format!(
                "quality length {} does not match sequence length {}",
                quality.chars().count(),
                seq.chars().count()
            )));
        }
    }

    let read_name_bytes = read_name.as_bytes();
    if read_name_bytes.len() > u8::MAX as usize - 1 {
        return Err(Error::InvalidArgument(format!(
            "read name length {} out of range",
            read_name_bytes.len()
        )));
    }

    let mut tag_region = Vec::new();
    for (key, value) in &options.tags {
        crate::tag::encode_tag(*key, value, &mut tag_region)?;
    }

    let mut bytes = vec![0u8; 32];
    bam_common::primitive::write_i32(&mut bytes, 0, options.reference_id);
    bam_common::primitive::write_i32(&mut bytes, 4, position);
    bytes[8] = read_name_bytes.len() as u8 + 1;
    bytes[9] = options.mapping_quality;
    bam_common::primitive::write_u16(&mut bytes, 10, options.alignment_bin);
    bam_common::primitive::write_u16(&mut bytes, 12, options.cigar.len() as u16);
    bam_common::primitive::write_u16(&mut bytes, 14, flags.bits());
    bam_common::primitive::write_i32(&mut bytes, 16, seq.chars().count() as i32);
    bam_common::primitive::write_i32(&mut bytes, 20, options.mate_reference_id);
    bam_common::primitive::write_i32(&mut bytes, 24, options.mate_position.unwrap_or(-1));
    bam_common::primitive::write_i32(&mut bytes, 28, options.insert_length);

    bytes.extend_from_slice(read_name_bytes);
    bytes.push(0);

    cigar::encode(&options.cigar, &mut bytes);
    sequence::encode(seq, &mut bytes)?;
    quality::encode(options.quality, seq.chars().count(), &mut bytes);
    bytes.extend_from_slice(&tag_region);

    Ok(AlignmentRecord::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bam_common::CigarKind;

    #[test]
    fn test_minimal_record_round_trips() {
        let record = make_alignment_record("r1", "ACGT", 0, &Options::default()).unwrap();
        assert_eq!(record.reference_id(), -1);
        assert_eq!(record.position(), -1);
        assert_eq!(record.read_name(), "r1");
        assert_eq!(record.sequence(), "ACGT");
        assert_eq!(record.quality(), None);
        assert_eq!(record.cigar().unwrap(), Vec::new());
    }

    #[test]
    fn test_mismatched_quality_length_is_rejected() {
        let options = Options {
            quality: Some("II"),
            ..Options::default()
        };
        assert!(make_alignment_record("r1", "ACGT", 0, &options).is_err());
    }

    #[test]
    fn test_invalid_flag_combination_is_rejected() {
        // MATE_REVERSE (1<<5) set on an unpaired record is invalid.
        let options = Options::default();
        assert!(make_alignment_record("r1", "ACGT", 1 << 5, &options).is_err());
    }

    #[test]
    fn test_empty_read_name_round_trips_as_just_the_nul() {
        // spec.md §8: "read_name_len = 1 (just the NUL)" is a boundary case
        // the codec must encode/decode, not reject.
        let record = make_alignment_record("", "A", 0, &Options::default()).unwrap();
        assert_eq!(record.read_name_len(), 1);
        assert_eq!(record.read_name(), "");
    }

    #[test]
    fn test_with_cigar_and_tags() {
        let options = Options {
            cigar: vec![CigarOp::new(CigarKind::Match, 4)],
            tags: vec![(*b"NM", Value::Int(1))],
            ..Options::default()
        };
        let record = make_alignment_record("r1", "ACGT", 0, &options).unwrap();
        assert_eq!(record.cigar().unwrap(), vec![CigarOp::new(CigarKind::Match, 4)]);
        assert_eq!(record.tag(*b"NM").unwrap(), Some(Value::Int(1)));
    }
}
