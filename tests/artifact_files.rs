//! File-level round trips: image in, artifacts on disk, image out.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use grayhuff::artifact::{self, ArtifactPaths};
use grayhuff::{Dimensions, GrayRaster, HuffmanCodec, ImageRasterCodec, RasterCodec};

fn sample_raster() -> GrayRaster {
    let (width, height) = (40u32, 24u32);
    let samples = (0..height)
        .flat_map(|y| (0..width).map(move |x| if (x / 8 + y / 8) % 2 == 0 { 30 } else { 220 }))
        .enumerate()
        .map(|(i, v)| if i % 37 == 0 { 128 } else { v })
        .collect();
    GrayRaster::new(Dimensions::new(width, height), samples).unwrap()
}

fn write_png(dir: &Path, name: &str, raster: &GrayRaster) -> std::path::PathBuf {
    let path = dir.join(name);
    ImageRasterCodec.save(raster, &path).unwrap();
    path
}

#[test]
fn image_to_artifacts_and_back() {
    let dir = TempDir::new().unwrap();
    let raster = sample_raster();
    let input = write_png(dir.path(), "checker.png", &raster);

    let loaded = ImageRasterCodec.load(&input).unwrap();
    assert_eq!(loaded, raster);

    let compressed = HuffmanCodec::compress_raster(&loaded).unwrap();
    assert_eq!(compressed.stats.dimensions, Some(raster.dimensions()));
    assert!(compressed.stats.compression_ratio < 100.0);

    let paths = ArtifactPaths::for_base(dir.path().join("checker"));
    artifact::write_compressed(&paths, &compressed, false, true).unwrap();

    let artifacts = artifact::read_compressed(&paths).unwrap();
    let dimensions = artifacts.stats.and_then(|s| s.dimensions).unwrap();
    let restored = HuffmanCodec::decompress(
        &artifacts.stream,
        &artifacts.code_table,
        dimensions.pixel_count(),
        dimensions,
    )
    .unwrap();

    let output = dir.path().join("checker_decompressed.png");
    ImageRasterCodec.save(&restored, &output).unwrap();
    assert_eq!(ImageRasterCodec.load(&output).unwrap(), raster);
}

#[test]
fn code_table_json_is_flat_decimal_keys() {
    let dir = TempDir::new().unwrap();
    let compressed = HuffmanCodec::compress(&[5, 5, 5, 9]).unwrap();
    let paths = ArtifactPaths::for_base(dir.path().join("tiny"));
    artifact::write_compressed(&paths, &compressed, false, false).unwrap();

    let json = std::fs::read_to_string(&paths.code_table).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object["9"], "0");
    assert_eq!(object["5"], "1");
}

#[test]
fn cli_compress_then_decompress() {
    let dir = TempDir::new().unwrap();
    let raster = sample_raster();
    let input = write_png(dir.path(), "board.png", &raster);
    let out_dir = dir.path().join("out");

    let status = Command::new(env!("CARGO_BIN_EXE_grayhuff"))
        .arg("compress")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--verify")
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out_dir.join("board.bin").exists());
    assert!(out_dir.join("board_codes.json").exists());
    assert!(out_dir.join("board_stats.json").exists());
    let verified = out_dir.join("board_decompressed.png");
    assert_eq!(ImageRasterCodec.load(&verified).unwrap(), raster);

    let restored = dir.path().join("restored.png");
    let status = Command::new(env!("CARGO_BIN_EXE_grayhuff"))
        .arg("decompress")
        .arg(out_dir.join("board"))
        .arg(&restored)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(ImageRasterCodec.load(&restored).unwrap(), raster);
}

#[test]
fn cli_decompress_without_dimensions_fails() {
    let dir = TempDir::new().unwrap();
    let compressed = HuffmanCodec::compress(&[1, 2, 3, 4]).unwrap();
    let base = dir.path().join("nodims");
    artifact::write_compressed(&ArtifactPaths::for_base(&base), &compressed, false, false).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_grayhuff"))
        .arg("decompress")
        .arg(&base)
        .arg(dir.path().join("never.png"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--width"));
}

#[test]
fn cli_refuses_inputs_sharing_a_stem() {
    let dir = TempDir::new().unwrap();
    let raster = sample_raster();
    for sub in ["a", "b"] {
        std::fs::create_dir(dir.path().join(sub)).unwrap();
    }
    let first = write_png(&dir.path().join("a"), "scan.png", &raster);
    let second = write_png(&dir.path().join("b"), "scan.png", &raster);
    let out_dir = dir.path().join("out");

    let output = Command::new(env!("CARGO_BIN_EXE_grayhuff"))
        .arg("compress")
        .arg(&first)
        .arg(&second)
        .arg("--output-dir")
        .arg(&out_dir)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("would both write"));
    assert!(!out_dir.join("scan.bin").exists());
}

#[test]
fn cli_accepts_global_flags_after_the_subcommand() {
    let dir = TempDir::new().unwrap();
    let input = write_png(dir.path(), "flags.png", &sample_raster());
    let out_dir = dir.path().join("out");
    let config = dir.path().join("grayhuff.json");
    std::fs::write(&config, r#"{"write_stats": false}"#).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_grayhuff"))
        .arg("compress")
        .arg("-v")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(&out_dir)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(out_dir.join("flags.bin").exists());
    // the config file was honoured
    assert!(!out_dir.join("flags_stats.json").exists());
}
