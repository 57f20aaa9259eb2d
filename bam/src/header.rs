//! BAM header and reference-dictionary passthrough.
//!
//! The SAM text header parser/serializer itself is an external
//! collaborator; `header_text` is carried as an opaque blob. Only the
//! binary envelope around it — magic, length-prefixed text, reference
//! dictionary — and the one textual operation the sort needs (substituting
//! the `@HD` line's `SO:` field) live here.

use bam_common::primitive;

use crate::bgzf::{BgzfBuffer, BgzfReadHandle, BgzfWriteHandle};
use crate::error::{Error, Result};

const BAM_MAGIC: [u8; 4] = *b"BAM\x01";

/// Reads the magic string, header text, and reference dictionary off an
/// input BGZF stream.
pub fn read_header_meta<H: BgzfReadHandle>(
    bgzf_in: &mut BgzfBuffer<H>,
) -> Result<(String, u32, Vec<(String, u32)>)> {
    let mut magic = [0u8; 4];
    bgzf_in.read_exact(&mut magic)?;
    if magic != BAM_MAGIC {
        return Err(Error::MalformedRecord("missing BAM magic string".to_string()));
    }

    let l_text = read_u32(bgzf_in)?;
    let mut text_bytes = vec![0u8; l_text as usize];
    bgzf_in.read_exact(&mut text_bytes)?;
    let header_text = String::from_utf8_lossy(&text_bytes).into_owned();

    let n_ref = read_u32(bgzf_in)?;
    let mut references = Vec::with_capacity(n_ref as usize);

    for _ in 0..n_ref {
        let l_name = read_u32(bgzf_in)?;
        let mut name_bytes = vec![0u8; l_name as usize];
        bgzf_in.read_exact(&mut name_bytes)?;
        let name = name_bytes
            .split(|&b| b == 0)
            .next()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default();
        let l_ref = read_u32(bgzf_in)?;
        references.push((name, l_ref));
    }

    Ok((header_text, n_ref, references))
}

/// Writes the magic string, header text, and reference dictionary to an
/// output BGZF stream.
pub fn write_header_meta<W: BgzfWriteHandle>(
    bgzf_out: &mut W,
    header_text: &str,
    num_references: u32,
    references: &[(String, u32)],
) -> Result<()> {
    bgzf_out.write(&BAM_MAGIC)?;
    write_u32(bgzf_out, header_text.len() as u32)?;
    bgzf_out.write(header_text.as_bytes())?;
    write_u32(bgzf_out, num_references)?;

    for (name, length) in references {
        let l_name = name.len() as u32 + 1;
        write_u32(bgzf_out, l_name)?;
        bgzf_out.write(name.as_bytes())?;
        bgzf_out.write(&[0u8])?;
        write_u32(bgzf_out, *length)?;
    }

    Ok(())
}

fn read_u32<H: BgzfReadHandle>(bgzf_in: &mut BgzfBuffer<H>) -> Result<u32> {
    let mut bytes = [0u8; 4];
    bgzf_in.read_exact(&mut bytes)?;
    Ok(primitive::read_u32(&bytes, 0))
}

fn write_u32<W: BgzfWriteHandle>(bgzf_out: &mut W, value: u32) -> Result<()> {
    let mut bytes = [0u8; 4];
    primitive::write_u32(&mut bytes, 0, value);
    bgzf_out.write(&bytes)?;
    Ok(())
}

/// Substitutes (or adds) the `@HD` line's `SO:` field with `sort_order`.
/// All other header text is left byte-identical, including line order and
/// any fields not touched.
pub fn rewrite_sort_order(header_text: &str, sort_order: &str) -> String {
    let mut found_hd = false;
    let mut lines: Vec<String> = header_text
        .split('\n')
        .map(|line| {
            if let Some(rest) = line.strip_prefix("@HD") {
                found_hd = true;
                rewrite_hd_line(rest, sort_order)
            } else {
                line.to_string()
            }
        })
        .collect();

    if !found_hd {
        lines.insert(0, format!("@HD\tVN:1.6\tSO:{sort_order}"));
    }

    lines.join("\n")
}

fn rewrite_hd_line(rest: &str, sort_order: &str) -> String {
    let mut found_so = false;
    let mut fields: Vec<String> = rest
        .split('\t')
        .filter(|field| !field.is_empty())
        .map(|field| {
            if field.starts_with("SO:") {
                found_so = true;
                format!("SO:{sort_order}")
            } else {
                field.to_string()
            }
        })
        .collect();

    if !found_so {
        fields.push(format!("SO:{sort_order}"));
    }

    format!("@HD\t{}", fields.join("\t"))
}
