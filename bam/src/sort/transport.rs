//! Length-prefixed alignment record framing (spec.md §4.5, §6): the same
//! `(u32 little-endian length)(length bytes)` shape the primary BAM stream
//! uses for each record and that a temporary run file uses for each entry.

use bam_common::primitive;

use crate::bgzf::{BgzfBuffer, BgzfReadHandle, BgzfWriteHandle};
use crate::error::{Error, Result};
use crate::record::AlignmentRecord;

/// Reads one framed record, or `None` at a clean end of stream (zero bytes
/// available where the length prefix was expected).
pub fn read_framed<H: BgzfReadHandle>(
    stream: &mut BgzfBuffer<H>,
) -> Result<Option<AlignmentRecord>> {
    let mut len_bytes = [0u8; 4];
    let n = stream.read_into(&mut len_bytes)?;
    if n == 0 {
        return Ok(None);
    }
    if n != 4 {
        return Err(Error::MalformedRecord(
            "truncated record length prefix".to_string(),
        ));
    }

    let len = primitive::read_i32(&len_bytes, 0);
    if len < 0 {
        return Err(Error::MalformedRecord(format!(
            "negative record length {len}"
        )));
    }

    let mut bytes = vec![0u8; len as usize];
    stream.read_exact(&mut bytes)?;
    Ok(Some(AlignmentRecord::from_bytes(bytes)))
}

/// Writes `record` with its 4-byte little-endian length prefix.
pub fn write_framed<W: BgzfWriteHandle>(stream: &mut W, record: &AlignmentRecord) -> Result<()> {
    let bytes = record.as_bytes();
    let mut len_bytes = [0u8; 4];
    primitive::write_i32(&mut len_bytes, 0, bytes.len() as i32);
    stream.write(&len_bytes)?;
    stream.write(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::builder::{make_alignment_record, Options};
    use std::io::Cursor;

    #[test]
    fn test_round_trip_single_record() {
        let record = make_alignment_record("r1", "ACGT", 0, &Options::default()).unwrap();

        let mut buf = Vec::new();
        write_framed(&mut buf, &record).unwrap();

        let mut stream = BgzfBuffer::new(Cursor::new(buf));
        let read_back = read_framed(&mut stream).unwrap().unwrap();
        assert_eq!(read_back.as_bytes(), record.as_bytes());
        assert!(read_framed(&mut stream).unwrap().is_none());
    }

    #[test]
    fn test_negative_length_is_malformed() {
        let mut stream = BgzfBuffer::new(Cursor::new(vec![0xFF, 0xFF, 0xFF, 0xFF]));
        assert!(read_framed(&mut stream).is_err());
    }

    #[test]
    fn test_truncated_payload_is_malformed() {
        let mut bytes = 10i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3]); // fewer than the declared 10 bytes
        let mut stream = BgzfBuffer::new(Cursor::new(bytes));
        assert!(read_framed(&mut stream).is_err());
    }
}
