//! Error types for grayhuff

use thiserror::Error;

/// Errors raised while building codes, packing, unpacking, or persisting artifacts.
#[derive(Error, Debug)]
pub enum CodecError {
    /// No samples to build a tree from
    #[error("cannot build a Huffman tree from an empty sample sequence")]
    EmptyInput,

    /// Encoding hit a symbol that the code book does not cover
    #[error("symbol {symbol} has no entry in the code book")]
    CodeBookMismatch {
        /// The symbol that could not be encoded
        symbol: u8,
    },

    /// The bit stream ended in the middle of a code
    #[error("bit stream ended inside a code after {decoded} symbols ({pending_bits} unmatched bits)")]
    TruncatedStream {
        /// Symbols decoded before the stream ran out
        decoded: usize,
        /// Bits left in the accumulator
        pending_bits: usize,
    },

    /// The accumulated bits can no longer match any code
    #[error("no code matches the bits starting at offset {offset}")]
    InvalidCode {
        /// Bit offset where the unmatched code started
        offset: usize,
    },

    /// Decoded symbol count differs from the expected count
    #[error("expected {expected} symbols, decoded {actual}")]
    SymbolCountMismatch {
        /// Expected number of symbols
        expected: usize,
        /// Number actually decoded
        actual: usize,
    },

    /// Sample count does not fit the raster dimensions
    #[error("{width}x{height} raster needs {expected} samples, got {actual}")]
    DimensionMismatch {
        /// Raster width
        width: u32,
        /// Raster height
        height: u32,
        /// width * height
        expected: usize,
        /// Samples supplied or decoded
        actual: usize,
    },

    /// Padding length is out of range for the payload
    #[error("padding length {padding} is invalid for a payload of {payload_bits} bits")]
    InvalidPadding {
        /// Padding length read from the payload
        padding: u8,
        /// Bits in the packed payload, padding included
        payload_bits: usize,
    },

    /// A code table loaded from disk is malformed
    #[error("invalid code table: {message}")]
    InvalidCodeTable {
        /// What is wrong with the table
        message: String,
    },

    /// Configuration or parameter errors
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Code table or stats (de)serialization failures
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raster file decoding or encoding failures
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl CodecError {
    /// Create an invalid code table error
    pub fn invalid_code_table<S: Into<String>>(message: S) -> Self {
        Self::InvalidCodeTable {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Short label used in log lines
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyInput => "input",
            Self::CodeBookMismatch { .. } => "codebook",
            Self::TruncatedStream { .. }
            | Self::InvalidCode { .. }
            | Self::InvalidPadding { .. } => "stream",
            Self::SymbolCountMismatch { .. } | Self::DimensionMismatch { .. } => "size",
            Self::InvalidCodeTable { .. } => "code_table",
            Self::Configuration { .. } => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Image(_) => "image",
        }
    }

    /// True when the error points at corrupted or mismatched compressed data
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::TruncatedStream { .. }
                | Self::InvalidCode { .. }
                | Self::InvalidPadding { .. }
                | Self::SymbolCountMismatch { .. }
                | Self::InvalidCodeTable { .. }
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CodecError>;
