//! The BGZF buffered stream.
//!
//! The actual deflate/inflate codec is an external collaborator: this
//! module only adds an 8192-byte read buffer and virtual-offset bookkeeping
//! on top of whatever handle does the decompression, the same layering a
//! buffered reader adds over a caller-supplied `BufRead` — here the
//! caller-supplied thing is a `BgzfReadHandle` rather than a `BufRead`
//! because we also need `tell`/`seek` on the underlying virtual offset.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};

const BUFFER_SIZE: usize = 8192;

/// A handle over a decompressed BGZF byte stream, open for reading.
/// `bgzip::read::BGZFReader<R>` satisfies this for any `R: Read + Seek`.
pub trait BgzfReadHandle {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
    fn seek(&mut self, virtual_offset: u64) -> std::io::Result<()>;
    fn tell(&mut self) -> std::io::Result<u64>;
    fn close(&mut self) -> std::io::Result<()>;
}

/// A handle over a BGZF byte stream open for writing.
pub trait BgzfWriteHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize>;
    fn close(&mut self) -> std::io::Result<()>;
}

impl<T: Read + Seek> BgzfReadHandle for T {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Read::read(self, buf)
    }

    fn seek(&mut self, virtual_offset: u64) -> std::io::Result<()> {
        Seek::seek(self, SeekFrom::Start(virtual_offset)).map(|_| ())
    }

    fn tell(&mut self) -> std::io::Result<u64> {
        Seek::stream_position(self)
    }

    fn close(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<T: Write> BgzfWriteHandle for T {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Write::write(self, buf)
    }

    fn close(&mut self) -> std::io::Result<()> {
        Write::flush(self)
    }
}

/// An 8192-byte internal buffer over a `BgzfReadHandle`, exposing
/// single-byte and bulk reads plus seek-by-virtual-offset.
pub struct BgzfBuffer<H: BgzfReadHandle> {
    handle: H,
    buffer: [u8; BUFFER_SIZE],
    offset: usize,
    num_bytes: usize,
    closed: bool,
}

impl<H: BgzfReadHandle> BgzfBuffer<H> {
    pub fn new(handle: H) -> Self {
        Self {
            handle,
            buffer: [0u8; BUFFER_SIZE],
            offset: 0,
            num_bytes: 0,
            closed: false,
        }
    }

    fn remaining(&self) -> usize {
        self.num_bytes - self.offset
    }

    fn refill(&mut self) -> Result<()> {
        let n_read = self.handle.read(&mut self.buffer)?;
        debug!("refilled bgzf buffer with {n_read} bytes");
        self.offset = 0;
        self.num_bytes = n_read;
        Ok(())
    }

    /// Returns the next byte, refilling the buffer if empty, or `None` on
    /// end of stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.remaining() == 0 {
            self.refill()?;
            if self.remaining() == 0 {
                return Ok(None);
            }
        }

        let byte = self.buffer[self.offset];
        self.offset += 1;
        Ok(Some(byte))
    }

    /// Fills `out` completely from the buffer, refilling as needed, or
    /// returns the number of bytes actually copied if the stream runs out
    /// first.
    pub fn read_into(&mut self, out: &mut [u8]) -> Result<usize> {
        let mut copied = 0;

        while copied < out.len() {
            if self.remaining() == 0 {
                self.refill()?;
                if self.remaining() == 0 {
                    break;
                }
            }

            let take = (out.len() - copied).min(self.remaining());
            out[copied..copied + take]
                .copy_from_slice(&self.buffer[self.offset..self.offset + take]);
            self.offset += take;
            copied += take;
        }

        Ok(copied)
    }

    /// Reads exactly `out.len()` bytes, failing if the stream runs out
    /// first.
    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        let n = self.read_into(out)?;
        if n != out.len() {
            return Err(Error::MalformedRecord(format!(
                "expected {} bytes, stream ended after {}",
                out.len(),
                n
            )));
        }
        Ok(())
    }

    /// The virtual offset of the next byte `read_byte`/`read_into` would
    /// deliver: `tell() - buffered_remaining`.
    pub fn file_position(&mut self) -> Result<u64> {
        Ok(self.handle.tell()? - self.remaining() as u64)
    }

    /// Seeks the underlying handle and discards the buffer.
    pub fn seek_to(&mut self, virtual_offset: u64) -> Result<()> {
        self.handle.seek(virtual_offset)?;
        self.offset = 0;
        self.num_bytes = 0;
        Ok(())
    }

    /// Closes the underlying handle exactly once.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.handle.close()?;
        Ok(())
    }
}

impl<H: BgzfReadHandle> Drop for BgzfBuffer<H> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// The file-backed `BgzfReadHandle` `sort_bam_file` opens, wrapping
/// `bgzip::read::BGZFReader<File>`. Seeking is not exposed: the sort
/// pipeline only ever streams forward through a file it opened itself.
pub struct BamFileReader {
    inner: bgzip::read::BGZFReader<std::fs::File>,
}

impl BamFileReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let inner = bgzip::read::BGZFReader::new(file)
            .map_err(|e| Error::BgzfIo(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())))?;
        Ok(Self { inner })
    }
}

impl BgzfReadHandle for BamFileReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Read::read(&mut self.inner, buf)
    }

    fn seek(&mut self, _virtual_offset: u64) -> std::io::Result<()> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "BamFileReader does not support seeking",
        ))
    }

    fn tell(&mut self) -> std::io::Result<u64> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "BamFileReader does not support tell",
        ))
    }

    fn close(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// The file-backed `BgzfWriteHandle` `sort_bam_file` opens, over
/// `bgzip::write::BGZFWriter<File>`.
pub struct BamFileWriter {
    inner: bgzip::write::BGZFWriter<std::fs::File>,
}

impl BamFileWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        let inner = bgzip::write::BGZFWriter::new(file, bgzip::Compression::default());
        Ok(Self { inner })
    }
}

impl BgzfWriteHandle for BamFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Write::write(&mut self.inner, buf)
    }

    fn close(&mut self) -> std::io::Result<()> {
        self.inner
            .close()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_byte_across_refill_boundary() {
        let data: Vec<u8> = (0..(BUFFER_SIZE + 10)).map(|i| (i % 256) as u8).collect();
        let mut stream = BgzfBuffer::new(Cursor::new(data.clone()));

        for &expected in &data {
            assert_eq!(stream.read_byte().unwrap(), Some(expected));
        }
        assert_eq!(stream.read_byte().unwrap(), None);
    }

    #[test]
    fn test_read_into_spans_multiple_refills() {
        let data: Vec<u8> = (0..(BUFFER_SIZE * 2 + 5)).map(|i| (i % 7) as u8).collect();
        let mut stream = BgzfBuffer::new(Cursor::new(data.clone()));

        let mut out = vec![0u8; data.len()];
        let n = stream.read_into(&mut out).unwrap();
        assert_eq!(n, data.len());
        assert_eq!(out, data);
    }

    #[test]
    fn test_read_into_short_on_exhausted_stream() {
        let mut stream = BgzfBuffer::new(Cursor::new(vec![1, 2, 3]));
        let mut out = [0u8; 10];
        let n = stream.read_into(&mut out).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&out[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_read_exact_errors_on_truncated_stream() {
        let mut stream = BgzfBuffer::new(Cursor::new(vec![1, 2, 3]));
        let mut out = [0u8; 10];
        assert!(stream.read_exact(&mut out).is_err());
    }

    #[test]
    fn test_file_position_accounts_for_buffered_bytes() {
        let data = vec![1, 2, 3, 4, 5];
        let mut stream = BgzfBuffer::new(Cursor::new(data));

        stream.read_byte().unwrap();
        stream.read_byte().unwrap();
        // two bytes delivered, three remain buffered after the initial refill
        assert_eq!(stream.file_position().unwrap(), 2);
    }

    #[test]
    fn test_seek_to_discards_buffer() {
        let data = vec![1, 2, 3, 4, 5];
        let mut stream = BgzfBuffer::new(Cursor::new(data));

        stream.read_byte().unwrap();
        stream.seek_to(0).unwrap();
        assert_eq!(stream.read_byte().unwrap(), Some(1));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut stream = BgzfBuffer::new(Cursor::new(vec![1, 2, 3]));
        stream.close().unwrap();
        stream.close().unwrap();
    }
}
