//! Static Huffman coding for whole files.
//!
//! A compressed file is self-describing: it starts with the code table, then
//! the bit-packed payload, then one byte counting the zero bits used to pad
//! the payload to a byte boundary. See [`format`] for the exact layout.
//!
//! ```
//! let packed = static_huffman::compress(b"aaabbc").unwrap();
//! assert_eq!(static_huffman::decompress(&packed).unwrap(), b"aaabbc");
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod fs;
pub mod symbol_table;
pub mod tree;

pub use codec::{Codec, Decoder, Encoder};
pub use config::{CodecConfig, SymbolDomain};
pub use error::{Error, Result};

/// Compresses 7-bit input with the default [`CodecConfig`].
pub fn compress(input: &[u8]) -> Result<Vec<u8>> {
    Codec::default().compress(input)
}

/// Reverses [`compress`].
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    Codec::default().decompress(input)
}
