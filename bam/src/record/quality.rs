//! Quality score codec.
//!
//! On disk the quality region is always exactly `read_len` bytes, matching
//! the fixed `tag_index = qual_index + read_len` derivation this crate's
//! offset arithmetic relies on. "Absent" is encoded by filling the region
//! with the `0xFF` sentinel, the real BAM/htslib convention; decode checks
//! only the first byte to decide presence.

const ABSENT_SENTINEL: u8 = 0xFF;
const PHRED_CAP: u8 = 93;

/// Decodes the quality region into a SAM-style ASCII string (`chr(min(93,
/// byte) + 33)` per base), or `None` if absent.
pub fn decode(region: &[u8]) -> Option<String> {
    if region.is_empty() || region[0] == ABSENT_SENTINEL {
        return None;
    }

    Some(
        region
            .iter()
            .map(|&byte| (byte.min(PHRED_CAP) + 33) as char)
            .collect(),
    )
}

/// Encodes `value` into exactly `read_len` bytes appended to `out`.
///
/// Encoding a present value does not clamp the way decode does; the caller
/// is trusted to pass canonical ASCII Phred+33 characters.
pub fn encode(value: Option<&str>, read_len: usize, out: &mut Vec<u8>) {
    match value {
        None => out.extend(std::iter::repeat(ABSENT_SENTINEL).take(read_len)),
        Some(s) => out.extend(s.bytes().map(|b| b.wrapping_sub(33))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_round_trip() {
        let mut buf = Vec::new();
        encode(None, 4, &mut buf);
        assert_eq!(buf, vec![0xFFu8; 4]);
        assert_eq!(decode(&buf), None);
    }

    #[test]
    fn test_present_round_trip() {
        let mut buf = Vec::new();
        encode(Some("NDLS"), 4, &mut buf);
        assert_eq!(decode(&buf).as_deref(), Some("NDLS"));
    }

    #[test]
    fn test_decode_clamps_to_93() {
        let buf = vec![200u8];
        assert_eq!(decode(&buf).as_deref(), Some("~"));
    }

    #[test]
    fn test_zero_length_is_absent() {
        assert_eq!(decode(&[]), None);
    }
}
