use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use tracing::{debug, info};

use crate::bits::{self, BitPacker, PackStats};
use crate::code::CodeTable;
use crate::error::{HuffError, Result};
use crate::frequency::FrequencyTable;
use crate::header::{Header, Layout};
use crate::tree::HuffmanTree;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressStats {
    pub input_bytes: u64,
    pub header_bytes: u64,
    pub distinct_symbols: usize,
    pub packed: PackStats,
}

impl CompressStats {
    pub fn output_bytes(&self) -> u64 {
        self.header_bytes + self.packed.bytes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecompressStats {
    pub extension: String,
    pub output_bytes: u64,
    pub bits_read: u64,
}

/// Compressor and decompressor for one [`Layout`].
///
/// Holds no state besides the layout; every call builds its own tree and
/// tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Codec {
    layout: Layout,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Tree, codes and header for one input.
    fn plan(&self, freqs: &FrequencyTable, extension: &str) -> Result<(Header, CodeTable)> {
        let tree = HuffmanTree::build(freqs)?;
        let codes = CodeTable::from_tree(&tree);
        let symbol_count = match self.layout {
            Layout::Counted => Some(freqs.total()),
            Layout::Padded => None,
        };
        debug!(
            symbols = codes.len(),
            encoded_bits = freqs.encoded_bits(&codes),
            "generated code table"
        );
        let header = Header {
            extension: extension.to_string(),
            tree,
            symbol_count,
        };
        Ok((header, codes))
    }

    pub fn compress(&self, input: &[u8], extension: &str) -> Result<Vec<u8>> {
        let freqs = FrequencyTable::from_bytes(input);
        let (header, codes) = self.plan(&freqs, extension)?;

        let mut out = Vec::new();
        header.write_to(&mut out)?;
        let mut packer = BitPacker::new(out, &codes);
        packer.push_all(input)?;
        let (out, packed) = packer.finish()?;

        info!(
            input_bytes = input.len(),
            output_bytes = out.len(),
            padding = packed.padding,
            "compressed buffer"
        );
        Ok(out)
    }

    /// Compresses `input` into `output` in two passes: one to count, then a
    /// rewind to where the input started and one to pack.
    pub fn compress_stream<R, W>(
        &self,
        input: &mut R,
        extension: &str,
        output: &mut W,
    ) -> Result<CompressStats>
    where
        R: Read + Seek,
        W: Write,
    {
        let start = input.stream_position()?;
        let freqs = FrequencyTable::from_reader(&mut *input)?;
        let (header, codes) = self.plan(&freqs, extension)?;

        let header_bytes = header.write_to(output)? as u64;

        input.seek(SeekFrom::Start(start))?;
        let mut packer = BitPacker::new(&mut *output, &codes);
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = input.read(&mut buf)?;
            if n == 0 {
                break;
            }
            packer.push_all(&buf[..n])?;
        }
        if packer.symbols() != freqs.total() {
            return Err(HuffError::InputChanged {
                counted: freqs.total(),
                packed: packer.symbols(),
            });
        }
        let (_, packed) = packer.finish()?;

        let stats = CompressStats {
            input_bytes: freqs.total(),
            header_bytes,
            distinct_symbols: freqs.len(),
            packed,
        };
        info!(
            input_bytes = stats.input_bytes,
            output_bytes = stats.output_bytes(),
            distinct_symbols = stats.distinct_symbols,
            padding = packed.padding,
            "compressed stream"
        );
        Ok(stats)
    }

    /// Reads just the header, leaving `input` at the start of the bitstream.
    pub fn read_header<R: Read>(&self, input: &mut R) -> Result<Header> {
        Header::read_from(input, self.layout)
    }

    pub fn decompress(&self, compressed: &[u8]) -> Result<(Vec<u8>, String)> {
        let mut cursor = Cursor::new(compressed);
        let header = self.read_header(&mut cursor)?;

        // Every symbol takes at least one bit, which bounds a hostile count.
        let capacity = header
            .symbol_count
            .unwrap_or(0)
            .min(compressed.len() as u64 * 8) as usize;
        let mut out = Vec::with_capacity(capacity);
        let stats = bits::unpack(&header.tree, &mut cursor, &mut out, header.symbol_count)?;

        info!(
            input_bytes = compressed.len(),
            output_bytes = stats.symbols,
            extension = %header.extension,
            "decompressed buffer"
        );
        Ok((out, header.extension))
    }

    pub fn decompress_stream<R, W>(&self, input: &mut R, output: &mut W) -> Result<DecompressStats>
    where
        R: Read,
        W: Write,
    {
        let header = self.read_header(input)?;
        self.decompress_body(&header, input, output)
    }

    /// Decodes the bitstream that follows an already read `header`.
    pub fn decompress_body<R, W>(
        &self,
        header: &Header,
        input: &mut R,
        output: &mut W,
    ) -> Result<DecompressStats>
    where
        R: Read,
        W: Write,
    {
        let stats = bits::unpack(&header.tree, &mut *input, output, header.symbol_count)?;

        info!(
            output_bytes = stats.symbols,
            bits_read = stats.bits_read,
            extension = %header.extension,
            "decompressed stream"
        );
        Ok(DecompressStats {
            extension: header.extension.clone(),
            output_bytes: stats.symbols,
            bits_read: stats.bits_read,
        })
    }
}

/// Compresses `input` with the default (counted) layout.
pub fn compress(input: &[u8], extension: &str) -> Result<Vec<u8>> {
    Codec::new().compress(input, extension)
}

/// Reverses [`compress`], returning the original bytes and extension.
pub fn decompress(compressed: &[u8]) -> Result<(Vec<u8>, String)> {
    Codec::new().decompress(compressed)
}
