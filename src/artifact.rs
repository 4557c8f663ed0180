//! On-disk layout of a compressed image: `<base>.bin` holds the packed
//! stream, `<base>_codes.json` the code table, and `<base>_stats.json` the
//! optional stats sidecar. A verified compression also leaves
//! `<base>_decompressed.png` next to them.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::codebook::CodeBook;
use crate::compressed_data::PackedStream;
use crate::error::Result;
use crate::huffman_codec::{Compressed, CompressionStats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub payload: PathBuf,
    pub code_table: PathBuf,
    pub stats: PathBuf,
    /// Where a verified run writes the restored image
    pub decompressed: PathBuf,
}

impl ArtifactPaths {
    /// Paths for `base`, e.g. `out/photo` gives `out/photo.bin` and `out/photo_codes.json`
    pub fn for_base<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        ArtifactPaths {
            payload: with_suffix(base, ".bin"),
            code_table: with_suffix(base, "_codes.json"),
            stats: with_suffix(base, "_stats.json"),
            decompressed: with_suffix(base, "_decompressed.png"),
        }
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Everything read back from an artifact set
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub stream: PackedStream,
    pub code_table: CodeBook,
    pub stats: Option<CompressionStats>,
}

pub fn write_payload(path: &Path, stream: &PackedStream) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    stream.write_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_payload(path: &Path) -> Result<PackedStream> {
    let mut reader = BufReader::new(File::open(path)?);
    PackedStream::read_from(&mut reader)
}

pub fn write_code_table(path: &Path, code_book: &CodeBook, pretty: bool) -> Result<()> {
    fs::write(path, code_book.to_json(pretty)?)?;
    Ok(())
}

pub fn read_code_table(path: &Path) -> Result<CodeBook> {
    let json = fs::read_to_string(path)?;
    let code_book = CodeBook::from_json(&json)?;
    // reject duplicate or overlapping codes before the decoder sees them
    code_book.reverse()?;
    Ok(code_book)
}

pub fn write_stats(path: &Path, stats: &CompressionStats) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(stats)?)?;
    Ok(())
}

pub fn read_stats(path: &Path) -> Result<CompressionStats> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Write the payload and code table, plus the stats sidecar when `with_stats` is set.
pub fn write_compressed(
    paths: &ArtifactPaths,
    compressed: &Compressed,
    pretty: bool,
    with_stats: bool,
) -> Result<()> {
    write_payload(&paths.payload, &compressed.stream)?;
    write_code_table(&paths.code_table, &compressed.code_book, pretty)?;
    if with_stats {
        write_stats(&paths.stats, &compressed.stats)?;
    }
    debug!(
        "wrote {} and {}",
        paths.payload.display(),
        paths.code_table.display()
    );
    Ok(())
}

/// Read the payload and code table; the stats sidecar is optional.
pub fn read_compressed(paths: &ArtifactPaths) -> Result<LoadedArtifacts> {
    let stream = read_payload(&paths.payload)?;
    let code_table = read_code_table(&paths.code_table)?;
    let stats = if paths.stats.exists() {
        Some(read_stats(&paths.stats)?)
    } else {
        None
    };
    debug!(
        "read {} ({} bytes, padding {}) and {} ({} codes)",
        paths.payload.display(),
        stream.bytes().len(),
        stream.padding(),
        paths.code_table.display(),
        code_table.len()
    );
    Ok(LoadedArtifacts {
        stream,
        code_table,
        stats,
    })
}
