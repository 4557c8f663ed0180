use crate::codebook::Code;
use crate::compressed_data::PackedStream;

/// Growable MSB-first bit buffer.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct BitVec {
    bits: Vec<u8>,
    bit_count: usize,
}

impl BitVec {
    pub fn new() -> Self {
        BitVec {
            bits: Vec::new(),
            bit_count: 0,
        }
    }

    pub fn with_capacity(bits: usize) -> Self {
        BitVec {
            bits: Vec::with_capacity(bits.div_ceil(8)),
            bit_count: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    pub fn is_empty(&self) -> bool {
        self.bit_count == 0
    }

    pub fn push_bit(&mut self, bit: bool) {
        let byte_index = self.bit_count / 8; // which byte is target?
        let bit_offset = self.bit_count % 8; // which bit position is target?

        // make a new byte if needed
        if byte_index >= self.bits.len() {
            self.bits.push(0);
        }

        if bit {
            self.bits[byte_index] |= 1 << (7 - bit_offset);
        }

        self.bit_count += 1;
    }

    pub fn push_code(&mut self, code: &Code) {
        for bit in code.bits() {
            self.push_bit(bit);
        }
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.bit_count {
            return None;
        }
        Some((self.bits[index / 8] >> (7 - index % 8)) & 1 == 1)
    }

    /// Pad with zero bits to a byte boundary and hand over the bytes.
    ///
    /// A non-empty buffer always receives `8 - len % 8` padding bits, so an
    /// already aligned buffer gains a whole zero byte and records padding 8.
    /// An empty buffer packs to no bytes with padding 0.
    pub fn pack(mut self) -> PackedStream {
        if self.bit_count == 0 {
            return PackedStream::new(Vec::new(), 0);
        }
        let padding = 8 - self.bit_count % 8;
        for _ in 0..padding {
            self.push_bit(false);
        }
        PackedStream::new(self.bits, padding as u8)
    }
}

/// Reads the data bits of a byte slice, MSB first, stopping at `bit_len`.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    bit_len: usize,
    position: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8], bit_len: usize) -> Self {
        debug_assert!(bit_len <= bytes.len() * 8);
        BitReader {
            bytes,
            bit_len,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.bit_len - self.position
    }
}

impl Iterator for BitReader<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.position >= self.bit_len {
            return None;
        }
        let byte = self.bytes[self.position / 8];
        let bit = (byte >> (7 - self.position % 8)) & 1 == 1;
        self.position += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitReader<'_> {}

#[cfg(test)]
mod test {
    use super::*;

    fn code(s: &str) -> Code {
        s.parse().unwrap()
    }

    #[test]
    fn test_push_bits_msb_first() {
        let mut bits = BitVec::new();
        bits.push_code(&code("101"));
        bits.push_code(&code("00001"));
        bits.push_code(&code("11"));
        assert_eq!(bits.bit_count(), 10);
        assert_eq!(bits.as_bytes(), &[0b1010_0001, 0b1100_0000]);
        assert_eq!(bits.get(0), Some(true));
        assert_eq!(bits.get(1), Some(false));
        assert_eq!(bits.get(10), None);
    }

    #[test]
    fn test_pack_pads_partial_byte() {
        let mut bits = BitVec::new();
        bits.push_code(&code("111"));
        let packed = bits.pack();
        assert_eq!(packed.bytes(), &[0b1110_0000]);
        assert_eq!(packed.padding(), 5);
        assert_eq!(packed.data_bit_len(), 3);
    }

    #[test]
    fn test_pack_aligned_adds_full_byte() {
        let mut bits = BitVec::new();
        bits.push_code(&code("1010101011110000"));
        let packed = bits.pack();
        assert_eq!(packed.bytes(), &[0b1010_1010, 0b1111_0000, 0]);
        assert_eq!(packed.padding(), 8);
        assert_eq!(packed.data_bit_len(), 16);
    }

    #[test]
    fn test_pack_empty() {
        let packed = BitVec::new().pack();
        assert!(packed.bytes().is_empty());
        assert_eq!(packed.padding(), 0);
    }

    #[test]
    fn test_reader_stops_at_bit_len() {
        let bytes = [0b1100_0000u8, 0b1000_0000];
        let bits: Vec<bool> = BitReader::new(&bytes, 9).collect();
        assert_eq!(bits.len(), 9);
        assert_eq!(&bits[..3], &[true, true, false]);
        assert!(bits[8]);
    }
}
