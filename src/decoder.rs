//! Turns a packed stream back into symbols, either through a reverse code
//! table or by walking the Huffman tree.

use log::trace;

use crate::bit_vec::BitReader;
use crate::codebook::{Code, ReverseCodeBook};
use crate::compressed_data::PackedStream;
use crate::error::{CodecError, Result};
use crate::hufftree::{HuffNode, HuffmanTree};

/// Decode by accumulating bits until they match a code in the table.
///
/// `expected`, when given, must equal the number of decoded symbols.
pub fn decode(
    stream: &PackedStream,
    reverse: &ReverseCodeBook,
    expected: Option<usize>,
) -> Result<Vec<u8>> {
    stream.validate()?;
    let reader = BitReader::new(stream.bytes(), stream.data_bit_len());

    let mut result = Vec::with_capacity(capacity_hint(stream, expected));
    let mut current = Code::new();
    let mut code_start = 0;

    for (offset, bit) in reader.enumerate() {
        if current.is_empty() {
            code_start = offset;
        }
        // longer than every code in the table: nothing can match any more
        if current.len() >= reverse.max_code_len() {
            return Err(CodecError::InvalidCode { offset: code_start });
        }
        current.push(bit);

        if let Some(symbol) = reverse.get(&current) {
            result.push(symbol);
            current.clear();
        }
    }

    finish(result, current.len(), expected)
}

/// Decode by walking the tree from the root for each symbol.
///
/// A tree that is a single leaf reads one `0` bit per symbol.
pub fn decode_with_tree(
    stream: &PackedStream,
    tree: &HuffmanTree,
    expected: Option<usize>,
) -> Result<Vec<u8>> {
    stream.validate()?;
    let mut reader = BitReader::new(stream.bytes(), stream.data_bit_len());
    let mut result = Vec::with_capacity(capacity_hint(stream, expected));

    if let HuffNode::Leaf { symbol, .. } = &tree.root {
        for (offset, bit) in reader.enumerate() {
            if bit {
                return Err(CodecError::InvalidCode { offset });
            }
            result.push(*symbol);
        }
        return finish(result, 0, expected);
    }

    let mut node = &tree.root;
    let mut pending = 0;
    while let Some(bit) = reader.next() {
        if let HuffNode::Internal { left, right, .. } = node {
            node = if bit { right } else { left };
            pending += 1;
        }
        if let HuffNode::Leaf { symbol, .. } = node {
            result.push(*symbol);
            node = &tree.root;
            pending = 0;
        }
    }

    finish(result, pending, expected)
}

// every symbol costs at least one bit, so the stream bounds the output size
fn capacity_hint(stream: &PackedStream, expected: Option<usize>) -> usize {
    expected.unwrap_or(0).min(stream.data_bit_len())
}

fn finish(result: Vec<u8>, pending_bits: usize, expected: Option<usize>) -> Result<Vec<u8>> {
    if pending_bits > 0 {
        return Err(CodecError::TruncatedStream {
            decoded: result.len(),
            pending_bits,
        });
    }
    if let Some(expected) = expected {
        if result.len() != expected {
            return Err(CodecError::SymbolCountMismatch {
                expected,
                actual: result.len(),
            });
        }
    }
    trace!("decoded {} symbols", result.len());
    Ok(result)
}
