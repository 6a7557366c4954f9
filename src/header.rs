//! Header of a compressed file: the original extension, the tree in preorder,
//! and under [`Layout::Counted`] the number of encoded symbols.
//!
//! ```text
//! [ext len: u8][ext bytes][tree][symbol count: u64 LE, counted only][bitstream]
//! tree := '0' tree tree | '1' symbol
//! ```

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{HuffError, Result};
use crate::tree::{HuffmanTree, Node};

pub const INTERNAL_MARKER: u8 = b'0';
pub const LEAF_MARKER: u8 = b'1';

// 256 leaves cannot need more levels than this.
const MAX_DEPTH: usize = 255;

/// How the end of the bitstream is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Symbol count recorded after the tree; decoding stops exactly there.
    #[default]
    Counted,
    /// No end marker. Decoding runs to the last bit, so zero padding may
    /// decode as extra trailing symbols.
    Padded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub extension: String,
    pub tree: HuffmanTree,
    /// Present under the counted layout only.
    pub symbol_count: Option<u64>,
}

impl Header {
    pub fn layout(&self) -> Layout {
        match self.symbol_count {
            Some(_) => Layout::Counted,
            None => Layout::Padded,
        }
    }

    /// Serializes the header into `writer`, returning the bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let ext = self.extension.as_bytes();
        let ext_len =
            u8::try_from(ext.len()).map_err(|_| HuffError::ExtensionTooLong(ext.len()))?;

        let mut bytes = Vec::with_capacity(1 + ext.len() + 2 * 256 + 8);
        bytes.push(ext_len);
        bytes.extend_from_slice(ext);
        write_tree(&self.tree.root, &mut bytes);
        if let Some(count) = self.symbol_count {
            bytes.extend_from_slice(&count.to_le_bytes());
        }

        writer.write_all(&bytes)?;
        Ok(bytes.len())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Reads a header laid out as `layout`, leaving `reader` positioned at
    /// the first byte of the bitstream.
    ///
    /// The wire format allows any extension bytes, but `extension` is a
    /// `String`, so bytes that are not UTF-8 are a `MalformedHeader`. The
    /// writer side can only produce UTF-8 extensions.
    pub fn read_from<R: Read>(reader: &mut R, layout: Layout) -> Result<Self> {
        let ext_len = read_byte(reader, "missing extension length")?;
        let mut ext = vec![0u8; ext_len as usize];
        read_exact(reader, &mut ext, "extension cut short")?;
        let extension = String::from_utf8(ext)
            .map_err(|_| HuffError::MalformedHeader("extension is not valid UTF-8"))?;

        let mut seen = [false; 256];
        let root = read_tree(reader, 0, &mut seen)?;

        let symbol_count = match layout {
            Layout::Counted => {
                let mut count = [0u8; 8];
                read_exact(reader, &mut count, "missing symbol count")?;
                Some(u64::from_le_bytes(count))
            }
            Layout::Padded => None,
        };

        Ok(Header {
            extension,
            tree: HuffmanTree::from_root(root),
            symbol_count,
        })
    }
}

fn write_tree(node: &Node, out: &mut Vec<u8>) {
    match node {
        Node::Leaf { symbol, .. } => {
            out.push(LEAF_MARKER);
            out.push(*symbol);
        }
        Node::Internal { left, right, .. } => {
            out.push(INTERNAL_MARKER);
            write_tree(left, out);
            write_tree(right, out);
        }
    }
}

fn read_tree<R: Read>(reader: &mut R, depth: usize, seen: &mut [bool; 256]) -> Result<Node> {
    if depth > MAX_DEPTH {
        return Err(HuffError::MalformedHeader("tree deeper than 255 levels"));
    }
    match read_byte(reader, "tree cut short")? {
        LEAF_MARKER => {
            let symbol = read_byte(reader, "leaf without a symbol")?;
            if std::mem::replace(&mut seen[symbol as usize], true) {
                return Err(HuffError::MalformedHeader("symbol appears in two leaves"));
            }
            Ok(Node::leaf(symbol, 0))
        }
        INTERNAL_MARKER => {
            let left = read_tree(reader, depth + 1, seen)?;
            let right = read_tree(reader, depth + 1, seen)?;
            Ok(Node::Internal {
                weight: 0,
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        _ => Err(HuffError::MalformedHeader("invalid tree marker")),
    }
}

fn read_byte<R: Read>(reader: &mut R, context: &'static str) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_exact(reader, &mut buf, context)?;
    Ok(buf[0])
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], context: &'static str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => HuffError::MalformedHeader(context),
        _ => HuffError::Io(e),
    })
}
