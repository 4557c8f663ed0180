use log::debug;
use serde::{Deserialize, Serialize};

use crate::bit_vec::BitVec;
use crate::codebook::CodeBook;
use crate::compressed_data::PackedStream;
use crate::decoder;
use crate::error::{CodecError, Result};
use crate::frequency::FrequencyTable;
use crate::hufftree::HuffmanTree;
use crate::raster::{Dimensions, GrayRaster};

/// Size accounting for one compression run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionStats {
    /// `sample_count * 8`
    pub original_bits: u64,
    /// Encoded bits, padding excluded
    pub compressed_bits: u64,
    /// `compressed_bits / original_bits * 100`
    pub compression_ratio: f64,
    /// Known when compressing a raster rather than a bare sample slice
    pub dimensions: Option<Dimensions>,
}

impl CompressionStats {
    pub fn new(sample_count: usize, compressed_bits: usize, dimensions: Option<Dimensions>) -> Self {
        let original_bits = sample_count as u64 * 8;
        let compressed_bits = compressed_bits as u64;
        let compression_ratio = if original_bits == 0 {
            0.0
        } else {
            compressed_bits as f64 / original_bits as f64 * 100.0
        };
        CompressionStats {
            original_bits,
            compressed_bits,
            compression_ratio,
            dimensions,
        }
    }

    pub fn sample_count(&self) -> usize {
        (self.original_bits / 8) as usize
    }
}

/// Output of [`HuffmanCodec::compress`]
#[derive(Debug, Clone)]
pub struct Compressed {
    pub stream: PackedStream,
    pub code_book: CodeBook,
    pub stats: CompressionStats,
}

/// A Huffman tree together with the code book derived from it.
pub struct HuffmanCodec {
    tree: HuffmanTree,
    code_book: CodeBook,
}

impl HuffmanCodec {
    pub fn new(tree: HuffmanTree) -> Self {
        let code_book = tree.generate_code_book();
        HuffmanCodec { tree, code_book }
    }

    pub fn from_samples(samples: &[u8]) -> Result<Self> {
        let frequencies = FrequencyTable::build(samples)?;
        debug!(
            "{} samples, {} distinct intensities",
            frequencies.total(),
            frequencies.distinct_symbols()
        );
        let tree = HuffmanTree::build(&frequencies)?;
        tree.log_structure();
        Ok(Self::new(tree))
    }

    pub fn tree(&self) -> &HuffmanTree {
        &self.tree
    }

    pub fn code_book(&self) -> &CodeBook {
        &self.code_book
    }

    /// Concatenate the code of every sample, in order.
    pub fn encode(&self, samples: &[u8]) -> Result<BitVec> {
        encode_with(&self.code_book, samples)
    }

    pub fn decode(&self, stream: &PackedStream, expected: Option<usize>) -> Result<Vec<u8>> {
        decoder::decode_with_tree(stream, &self.tree, expected)
    }

    /// Frequency count, tree, code book, packing.
    pub fn compress(samples: &[u8]) -> Result<Compressed> {
        Self::compress_with_dimensions(samples, None)
    }

    /// Same as [`HuffmanCodec::compress`], recording the raster size in the stats.
    pub fn compress_raster(raster: &GrayRaster) -> Result<Compressed> {
        Self::compress_with_dimensions(raster.samples(), Some(raster.dimensions()))
    }

    fn compress_with_dimensions(
        samples: &[u8],
        dimensions: Option<Dimensions>,
    ) -> Result<Compressed> {
        let codec = Self::from_samples(samples)?;
        let bits = codec.encode(samples)?;
        let stats = CompressionStats::new(samples.len(), bits.bit_count(), dimensions);
        debug!(
            "compressed {} bits to {} bits ({:.2}%), tree depth {}",
            stats.original_bits,
            stats.compressed_bits,
            stats.compression_ratio,
            codec.tree.depth()
        );

        Ok(Compressed {
            stream: bits.pack(),
            code_book: codec.code_book,
            stats,
        })
    }

    /// Decode `pixel_count` symbols and reshape them into a `dimensions` raster.
    pub fn decompress(
        stream: &PackedStream,
        code_book: &CodeBook,
        pixel_count: usize,
        dimensions: Dimensions,
    ) -> Result<GrayRaster> {
        let reverse = code_book.reverse()?;
        let samples = decoder::decode(stream, &reverse, Some(pixel_count))?;
        debug!("decoded {} samples into a {} raster", samples.len(), dimensions);
        GrayRaster::new(dimensions, samples)
    }
}

/// Encode `samples` with an existing code book.
pub fn encode_with(code_book: &CodeBook, samples: &[u8]) -> Result<BitVec> {
    let mut bit_vec = BitVec::with_capacity(samples.len() * 2);
    for &symbol in samples {
        let code = code_book
            .get(symbol)
            .ok_or(CodecError::CodeBookMismatch { symbol })?;
        bit_vec.push_code(code);
    }
    Ok(bit_vec)
}
