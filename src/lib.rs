//! # huffpack
//!
//! Byte-oriented Huffman compression. The whole input is counted, a prefix
//! code is built from the counts, and the output is a small header (original
//! extension plus the tree in preorder) followed by the packed code bits.
//!
//! ```rust
//! let packed = huffpack::compress(b"abracadabra", "txt")?;
//! let (data, extension) = huffpack::decompress(&packed)?;
//! assert_eq!(data, b"abracadabra");
//! assert_eq!(extension, "txt");
//! # Ok::<(), huffpack::HuffError>(())
//! ```

pub mod bits;
pub mod code;
pub mod codec;
pub mod error;
pub mod frequency;
pub mod header;
pub mod tree;

pub use code::{Code, CodeTable};
pub use codec::{Codec, CompressStats, DecompressStats, compress, decompress};
pub use error::{HuffError, Result};
pub use frequency::FrequencyTable;
pub use header::{Header, Layout};
pub use tree::{HuffmanTree, Node};
