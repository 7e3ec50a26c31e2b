//! # Checksummed Record Framing
//!
//! The `TFRecord` container: a flat sequence of length-prefixed records,
//!
//! ```text
//! u64   length          (little-endian)
//! u32   masked_crc32c(length bytes)
//! [u8]  data
//! u32   masked_crc32c(data)
//! ```

use crate::data::error::RecordError;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

const MASK_DELTA: u32 = 0xa282_ead8;

/// Masked Castagnoli CRC, as stored in record frames.
pub fn masked_crc32c(data: &[u8]) -> u32 {
    crc32c::crc32c(data).rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Writes framed records.
pub struct RecordWriter<W: Write> {
    inner: W,
    count: usize,
}

impl RecordWriter<BufWriter<File>> {
    /// Create (or truncate) a record file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, RecordError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> RecordWriter<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    /// Number of records written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Write one record.
    pub fn write(
        &mut self,
        data: &[u8],
    ) -> Result<(), RecordError> {
        let length = (data.len() as u64).to_le_bytes();
        self.inner.write_all(&length)?;
        self.inner.write_all(&masked_crc32c(&length).to_le_bytes())?;
        self.inner.write_all(data)?;
        self.inner.write_all(&masked_crc32c(data).to_le_bytes())?;
        self.count += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), RecordError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W, RecordError> {
        self.flush()?;
        Ok(self.inner)
    }
}

/// Reads framed records; an `Iterator` over record payloads.
///
/// A clean end-of-stream at a record boundary ends iteration; anything
/// else (short reads, checksum mismatches) is yielded as an error, after
/// which the reader is exhausted.
pub struct RecordReader<R: Read> {
    inner: R,
    done: bool,
}

impl RecordReader<BufReader<File>> {
    /// Open a record file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RecordError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    /// Fill `buf`; returns the number of bytes read before end-of-stream.
    fn read_full(
        &mut self,
        buf: &mut [u8],
    ) -> Result<usize, RecordError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn read_exact_or_truncated(
        &mut self,
        buf: &mut [u8],
    ) -> Result<(), RecordError> {
        let found = self.read_full(buf)?;
        if found != buf.len() {
            return Err(RecordError::Truncated {
                expected: buf.len(),
                found,
            });
        }
        Ok(())
    }

    fn read_crc(
        &mut self,
        what: &'static str,
        covered: &[u8],
    ) -> Result<(), RecordError> {
        let mut crc = [0u8; 4];
        self.read_exact_or_truncated(&mut crc)?;
        let found = u32::from_le_bytes(crc);
        let expected = masked_crc32c(covered);
        if found != expected {
            return Err(RecordError::Checksum {
                what,
                expected,
                found,
            });
        }
        Ok(())
    }

    /// Read the next record, or `None` at a clean end-of-stream.
    pub fn read_record(&mut self) -> Result<Option<Vec<u8>>, RecordError> {
        let mut length = [0u8; 8];
        match self.read_full(&mut length)? {
            0 => return Ok(None),
            8 => (),
            found => return Err(RecordError::Truncated { expected: 8, found }),
        }
        self.read_crc("length", &length)?;

        // Buffer grows with the bytes actually present, not the declared length.
        let declared = u64::from_le_bytes(length);
        let expected = usize::try_from(declared).map_err(|_| RecordError::Oversized {
            length: declared,
        })?;
        let mut data = Vec::new();
        (&mut self.inner).take(declared).read_to_end(&mut data)?;
        if data.len() < expected {
            return Err(RecordError::Truncated {
                expected,
                found: data.len(),
            });
        }
        self.read_crc("data", &data)?;

        Ok(Some(data))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Vec<u8>, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(data)) => Some(Ok(data)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
