//! # grayhuff
//!
//! Lossless Huffman compression for 8-bit grayscale images.
//!
//! ## Quick Start
//!
//! ```rust
//! use grayhuff::{Dimensions, HuffmanCodec};
//!
//! let pixels: Vec<u8> = vec![0, 0, 0, 128, 128, 255];
//! let compressed = HuffmanCodec::compress(&pixels)?;
//! println!("ratio: {:.2}%", compressed.stats.compression_ratio);
//!
//! let raster = HuffmanCodec::decompress(
//!     &compressed.stream,
//!     &compressed.code_book,
//!     pixels.len(),
//!     Dimensions::new(3, 2),
//! )?;
//! assert_eq!(raster.samples(), &pixels[..]);
//! # Ok::<(), grayhuff::CodecError>(())
//! ```

pub mod artifact;
pub mod codebook;
pub mod config;
pub mod decoder;
pub mod error;
pub mod frequency;
pub mod huffman_codec;
pub mod hufftree;
pub mod raster;

// Internal modules - not part of public API
mod bit_vec;
mod compressed_data;
mod min_heap;

// Re-export main types for convenience
pub use bit_vec::BitVec;
pub use codebook::{Code, CodeBook, ReverseCodeBook};
pub use compressed_data::PackedStream;
pub use config::CodecConfig;
pub use error::{CodecError, Result};
pub use frequency::FrequencyTable;
pub use huffman_codec::{Compressed, CompressionStats, HuffmanCodec};
pub use hufftree::HuffmanTree;
pub use raster::{Dimensions, GrayRaster, ImageRasterCodec, RasterCodec};
