use std::io::{self, Read, Write};

use crate::error::{CodecError, Result};

/// Packed code bits plus the number of filler bits at the end of the last byte.
///
/// On disk: one padding byte, then the packed bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedStream {
    bytes: Vec<u8>,
    padding: u8,
}

impl PackedStream {
    pub fn new(bytes: Vec<u8>, padding: u8) -> Self {
        PackedStream { bytes, padding }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn padding(&self) -> u8 {
        self.padding
    }

    pub fn payload_bits(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Bits left once padding is dropped. Saturates for invalid padding; use
    /// [`PackedStream::validate`] first when the stream came from disk.
    pub fn data_bit_len(&self) -> usize {
        self.payload_bits().saturating_sub(self.padding as usize)
    }

    /// Padding must be at most 8 and must fit inside the payload.
    pub fn validate(&self) -> Result<()> {
        if self.padding > 8 || self.padding as usize > self.payload_bits() {
            return Err(CodecError::InvalidPadding {
                padding: self.padding,
                payload_bits: self.payload_bits(),
            });
        }
        Ok(())
    }

    /// Size of the serialized form in bytes
    pub fn serialized_len(&self) -> usize {
        1 + self.bytes.len()
    }

    pub fn serialize(&self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.serialized_len());
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        // padding length first, then data
        writer.write_all(&[self.padding])?;
        writer.write_all(&self.bytes)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<PackedStream> {
        let mut padding = [0u8; 1];
        reader.read_exact(&mut padding)?;

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let stream = PackedStream::new(bytes, padding[0]);
        stream.validate()?;
        Ok(stream)
    }

    pub fn deserialize(data: &[u8]) -> Result<PackedStream> {
        let mut reader = data;
        PackedStream::read_from(&mut reader)
    }
}
