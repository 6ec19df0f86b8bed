//! Pair record codec.
//!
//! Wire layout of one record (28 bytes, no framing between records):
//!
//! | offset | width | field                                 |
//! |--------|-------|---------------------------------------|
//! | 0      | 12    | source id, NUL-padded                 |
//! | 12     | 12    | target id, NUL-padded                 |
//! | 24     | 4     | weight, IEEE-754 f32 little-endian    |
//!
//! The stream ends at end-of-file. A trailing partial record is not an edge.

use std::io::{self, ErrorKind, Read, Write};

use byteorder::{ByteOrder, LittleEndian};

use crate::error::Result;
use crate::graph::{NodeId, NODE_ID_WIDTH};

pub const RECORD_SIZE: usize = 2 * NODE_ID_WIDTH + 4;

const TARGET_OFFSET: usize = NODE_ID_WIDTH;
const WEIGHT_OFFSET: usize = 2 * NODE_ID_WIDTH;

/// One weighted directed edge as read from the record stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f32,
}

impl EdgeRecord {
    pub fn new(source: &str, target: &str, weight: f32) -> Result<Self> {
        Ok(Self {
            source: NodeId::new(source)?,
            target: NodeId::new(target)?,
            weight,
        })
    }
}

pub fn decode(buf: &[u8; RECORD_SIZE]) -> EdgeRecord {
    let mut source = [0u8; NODE_ID_WIDTH];
    let mut target = [0u8; NODE_ID_WIDTH];
    source.copy_from_slice(&buf[..TARGET_OFFSET]);
    target.copy_from_slice(&buf[TARGET_OFFSET..WEIGHT_OFFSET]);

    EdgeRecord {
        source: NodeId::from_padded(&source),
        target: NodeId::from_padded(&target),
        weight: LittleEndian::read_f32(&buf[WEIGHT_OFFSET..]),
    }
}

pub fn encode(record: &EdgeRecord) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    buf[..TARGET_OFFSET].copy_from_slice(&record.source.to_padded());
    buf[TARGET_OFFSET..WEIGHT_OFFSET].copy_from_slice(&record.target.to_padded());
    LittleEndian::write_f32(&mut buf[WEIGHT_OFFSET..], record.weight);
    buf
}

/// Write records back to back in wire layout.
pub fn write_records<'a, W, I>(writer: &mut W, records: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a EdgeRecord>,
{
    let mut count = 0;
    for record in records {
        writer.write_all(&encode(record))?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Sequential reader over a pair record stream.
///
/// Yields decoded records until end-of-stream. A trailing partial record is
/// swallowed and its length made available through [`dropped_bytes`].
///
/// [`dropped_bytes`]: RecordReader::dropped_bytes
pub struct RecordReader<R> {
    inner: R,
    dropped_bytes: usize,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            dropped_bytes: 0,
            done: false,
        }
    }

    pub fn dropped_bytes(&self) -> usize {
        self.dropped_bytes
    }

    /// Fill `buf` as far as the stream allows; returns bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = io::Result<EdgeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = [0u8; RECORD_SIZE];
        match self.fill(&mut buf) {
            Ok(RECORD_SIZE) => Some(Ok(decode(&buf))),
            Ok(partial) => {
                self.done = true;
                self.dropped_bytes = partial;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(from: &str, to: &str, weight: f32) -> EdgeRecord {
        EdgeRecord::new(from, to, weight).unwrap()
    }

    #[test]
    fn test_layout() {
        let buf = encode(&rec("N001", "N002", 1.5));
        assert_eq!(buf.len(), 28);
        assert_eq!(&buf[..4], b"N001");
        assert!(buf[4..12].iter().all(|&b| b == 0));
        assert_eq!(&buf[12..16], b"N002");
        assert_eq!(&buf[24..], &1.5f32.to_le_bytes());
    }

    #[test]
    fn test_decode_ignores_garbage_after_nul() {
        let mut buf = encode(&rec("AB", "CD", 2.0));
        buf[5] = b'x';
        buf[20] = b'y';
        let r = decode(&buf);
        assert_eq!(r.source.to_string(), "AB");
        assert_eq!(r.target.to_string(), "CD");
        assert_eq!(r.weight, 2.0);
    }

    #[test]
    fn test_reader_sequence() {
        let mut bytes = Vec::new();
        write_records(&mut bytes, &[rec("A", "B", 1.0), rec("B", "C", 2.0)]).unwrap();

        let records: Vec<EdgeRecord> = RecordReader::new(bytes.as_slice())
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(records, vec![rec("A", "B", 1.0), rec("B", "C", 2.0)]);
    }

    #[test]
    fn test_reader_truncated_tail() {
        let mut bytes = encode(&rec("A", "B", 1.0)).to_vec();
        bytes.extend_from_slice(&encode(&rec("C", "D", 1.0))[..27]);

        let mut reader = RecordReader::new(bytes.as_slice());
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
        assert_eq!(reader.dropped_bytes(), 27);
    }

    #[test]
    fn test_reader_empty_stream() {
        let mut reader = RecordReader::new(&[][..]);
        assert!(reader.next().is_none());
        assert_eq!(reader.dropped_bytes(), 0);
    }

    /// Delivers one byte per read call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn test_reader_short_reads() {
        let bytes = encode(&rec("A", "B", 4.0));
        let records: Vec<EdgeRecord> = RecordReader::new(Trickle(&bytes))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(records, vec![rec("A", "B", 4.0)]);
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::Other, "device error"))
        }
    }

    #[test]
    fn test_reader_propagates_error_once() {
        let mut reader = RecordReader::new(Failing);
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }
}
