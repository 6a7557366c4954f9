//! Error type shared by every stage of the codec.

use std::io;

/// Everything that can abort a compress or decompress call.
#[derive(Debug, thiserror::Error)]
pub enum HuffError {
    /// The input had no bytes, so there is nothing to build a tree from.
    #[error("cannot build a Huffman tree from empty input")]
    EmptyInput,

    /// The header could not be parsed.
    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    /// The extension does not fit in the one-byte length field.
    #[error("extension is {0} bytes long, at most 255 fit in the header")]
    ExtensionTooLong(usize),

    /// The bitstream ended before the recorded number of symbols was decoded.
    #[error("bitstream truncated: expected {expected} symbols, decoded {decoded}")]
    TruncatedStream { expected: u64, decoded: u64 },

    /// A byte to be packed has no code word.
    #[error("byte {0:#04x} not in code table")]
    UnknownSymbol(u8),

    /// The second pass over a stream read a different number of bytes than
    /// the first pass counted.
    #[error("input changed between passes: counted {counted} bytes, packed {packed}")]
    InputChanged { counted: u64, packed: u64 },

    /// A bit selected a branch the tree does not have.
    #[error("no tree path for bit at offset {bit_offset}")]
    InvalidPath { bit_offset: u64 },

    /// The byte source or sink failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl HuffError {
    /// Returns true if the error came from the header rather than the data.
    #[inline]
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            HuffError::MalformedHeader(_) | HuffError::ExtensionTooLong(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HuffError>;
