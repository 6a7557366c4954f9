use std::io::{self, Read, Write};

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use tracing::debug;

use crate::code::{Code, CodeTable};
use crate::error::{HuffError, Result};
use crate::tree::{HuffmanTree, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackStats {
    /// Symbols packed.
    pub symbols: u64,
    /// Code bits written, before padding.
    pub bits: u64,
    /// Zero bits appended to reach a byte boundary (0..=7).
    pub padding: u8,
}

impl PackStats {
    pub fn bytes(&self) -> u64 {
        (self.bits + u64::from(self.padding)) / 8
    }
}

/// Packs code words MSB-first into a byte sink.
pub struct BitPacker<'a, W: Write> {
    writer: BitWriter<W, BigEndian>,
    lookup: Vec<Option<&'a Code>>,
    symbols: u64,
    bits: u64,
}

impl<'a, W: Write> BitPacker<'a, W> {
    pub fn new(sink: W, codes: &'a CodeTable) -> Self {
        let mut lookup = vec![None; 256];
        for (symbol, code) in codes.iter() {
            lookup[symbol as usize] = Some(code);
        }
        Self {
            writer: BitWriter::new(sink),
            lookup,
            symbols: 0,
            bits: 0,
        }
    }

    pub fn push(&mut self, byte: u8) -> Result<()> {
        let code = self.lookup[byte as usize].ok_or(HuffError::UnknownSymbol(byte))?;
        for &bit in code.bits() {
            self.writer.write_bit(bit)?;
        }
        self.symbols += 1;
        self.bits += code.len() as u64;
        Ok(())
    }

    /// Symbols pushed so far.
    pub fn symbols(&self) -> u64 {
        self.symbols
    }

    pub fn push_all(&mut self, data: &[u8]) -> Result<()> {
        for &byte in data {
            self.push(byte)?;
        }
        Ok(())
    }

    /// Zero-pads the last partial byte and hands back the sink.
    pub fn finish(mut self) -> Result<(W, PackStats)> {
        let padding = ((8 - self.bits % 8) % 8) as u8;
        self.writer.byte_align()?;
        let mut sink = self.writer.into_writer();
        sink.flush()?;
        Ok((
            sink,
            PackStats {
                symbols: self.symbols,
                bits: self.bits,
                padding,
            },
        ))
    }
}

/// Packs `data` into a fresh buffer.
pub fn pack(data: &[u8], codes: &CodeTable) -> Result<(Vec<u8>, PackStats)> {
    let mut packer = BitPacker::new(Vec::new(), codes);
    packer.push_all(data)?;
    packer.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnpackStats {
    pub symbols: u64,
    pub bits_read: u64,
}

/// Walks `tree` bit by bit over `reader`, writing each decoded symbol to
/// `sink`.
///
/// With `limit` set, decoding stops after that many symbols and running out
/// of bits first is a [`HuffError::TruncatedStream`]. Without it, decoding
/// runs until the reader is exhausted and a partly walked path at the end is
/// dropped.
pub fn unpack<R: Read, W: Write>(
    tree: &HuffmanTree,
    reader: R,
    sink: &mut W,
    limit: Option<u64>,
) -> Result<UnpackStats> {
    let root = &tree.root;
    let mut bits = BitReader::<_, BigEndian>::new(reader);
    let mut cursor = root;
    let mut stats = UnpackStats::default();

    loop {
        if limit.is_some_and(|limit| stats.symbols >= limit) {
            break;
        }
        let bit = match bits.read_bit() {
            Ok(bit) => bit,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };

        let next: &Node = match cursor {
            Node::Internal { left, right, .. } => {
                if bit {
                    &**right
                } else {
                    &**left
                }
            }
            // Only a lone-leaf tree reaches here: `0` is its one code.
            Node::Leaf { .. } if !bit => cursor,
            Node::Leaf { .. } => {
                return Err(HuffError::InvalidPath {
                    bit_offset: stats.bits_read,
                });
            }
        };
        stats.bits_read += 1;

        match next {
            Node::Leaf { symbol, .. } => {
                sink.write_all(&[*symbol])?;
                stats.symbols += 1;
                cursor = root;
            }
            Node::Internal { .. } => cursor = next,
        }
    }

    if let Some(expected) = limit {
        if stats.symbols < expected {
            return Err(HuffError::TruncatedStream {
                expected,
                decoded: stats.symbols,
            });
        }
    } else if !std::ptr::eq(cursor, root) {
        debug!(
            bits_read = stats.bits_read,
            "bitstream ended mid-path, dropping trailing bits"
        );
    }

    sink.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;
    use std::io::Cursor;

    fn tree_and_codes(data: &[u8]) -> (HuffmanTree, CodeTable) {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(data)).unwrap();
        let codes = CodeTable::from_tree(&tree);
        (tree, codes)
    }

    #[test]
    fn packs_msb_first() {
        // codes: c=0, a=10, b=11
        let (_, codes) = tree_and_codes(b"cab");
        let (bytes, stats) = pack(b"abcab", &codes).unwrap();
        // 10 11 0 10 11 -> 1011_0101 1(000_0000)
        assert_eq!(bytes, vec![0b1011_0101, 0b1000_0000]);
        assert_eq!(stats.symbols, 5);
        assert_eq!(stats.bits, 9);
        assert_eq!(stats.padding, 7);
        assert_eq!(stats.bytes(), 2);
    }

    #[test]
    fn exact_byte_boundary_adds_no_padding() {
        let (_, codes) = tree_and_codes(b"cab");
        // 10 11 10 11 = 8 bits
        let (bytes, stats) = pack(b"abab", &codes).unwrap();
        assert_eq!(bytes, vec![0b1011_1011]);
        assert_eq!(stats.padding, 0);
        assert_eq!(stats.bytes(), 1);
    }

    #[test]
    fn padding_is_zero_bits_only() {
        let (_, codes) = tree_and_codes(b"cab");
        // 11 11 11 -> 1111_11(00)
        let (bytes, stats) = pack(b"bbb", &codes).unwrap();
        assert_eq!(bytes, vec![0b1111_1100]);
        assert_eq!(stats.bits, 6);
        assert_eq!(stats.padding, 2);
    }

    #[test]
    fn unknown_byte_is_an_error() {
        let (_, codes) = tree_and_codes(b"cab");
        let err = pack(b"abz", &codes).unwrap_err();
        assert!(matches!(err, HuffError::UnknownSymbol(b'z')));
    }

    #[test]
    fn unpack_with_limit_stops_before_padding() {
        let data = b"abcab";
        let (tree, codes) = tree_and_codes(b"cab");
        let (bytes, _) = pack(data, &codes).unwrap();
        let mut out = Vec::new();
        let stats = unpack(&tree, Cursor::new(&bytes), &mut out, Some(5)).unwrap();
        assert_eq!(out, data.to_vec());
        assert_eq!(stats.symbols, 5);
        assert_eq!(stats.bits_read, 9);
    }

    #[test]
    fn unpack_without_limit_decodes_padding() {
        // The seven pad bits decode as seven extra `c`s (code `0`).
        let (tree, codes) = tree_and_codes(b"cab");
        let (bytes, _) = pack(b"abcab", &codes).unwrap();
        let mut out = Vec::new();
        unpack(&tree, Cursor::new(&bytes), &mut out, None).unwrap();
        assert_eq!(out, b"abcabccccccc".to_vec());
    }

    #[test]
    fn unpack_without_limit_drops_partial_path() {
        // a=10, b=11, c=0 plus a dangling `1`
        let (tree, _) = tree_and_codes(b"cab");
        let mut out = Vec::new();
        let stats = unpack(&tree, Cursor::new(&[0b1011_0101u8]), &mut out, None).unwrap();
        assert_eq!(out, b"abca".to_vec());
        assert_eq!(stats.bits_read, 8);
    }

    #[test]
    fn unpack_reports_truncation() {
        let (tree, codes) = tree_and_codes(b"cab");
        let (bytes, _) = pack(b"abcababab", &codes).unwrap();
        let mut out = Vec::new();
        let err = unpack(&tree, Cursor::new(&bytes[..1]), &mut out, Some(9)).unwrap_err();
        assert!(matches!(
            err,
            HuffError::TruncatedStream {
                expected: 9,
                decoded: 4
            }
        ));
    }

    #[test]
    fn lone_leaf_tree_round_trips() {
        let data = [0x41u8; 100];
        let (tree, codes) = tree_and_codes(&data);
        let (bytes, stats) = pack(&data, &codes).unwrap();
        assert_eq!(bytes, vec![0u8; 13]);
        assert_eq!(stats.padding, 4);

        let mut out = Vec::new();
        unpack(&tree, Cursor::new(&bytes), &mut out, Some(100)).unwrap();
        assert_eq!(out, data.to_vec());
    }

    #[test]
    fn lone_leaf_tree_rejects_one_bits() {
        let (tree, _) = tree_and_codes(&[7u8; 3]);
        let mut out = Vec::new();
        let err = unpack(&tree, Cursor::new(&[0b0010_0000u8]), &mut out, None).unwrap_err();
        assert!(matches!(err, HuffError::InvalidPath { bit_offset: 2 }));
        assert_eq!(out, vec![7, 7]);
    }
}
