use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{arg, ArgAction};
use log::{error, info, LevelFilter, Metadata, Record};
use rayon::prelude::*;

use grayhuff::artifact::{self, ArtifactPaths};
use grayhuff::config::{parse_env_var, CodecConfig};
use grayhuff::{Compressed, Dimensions, GrayRaster, HuffmanCodec, ImageRasterCodec, RasterCodec};

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => parse_env_var("GRAYHUFF_LOG", LevelFilter::Warn),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // a logger may already be installed when embedded; keep it
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn cli() -> clap::Command {
    clap::Command::new("grayhuff")
        .about("Lossless Huffman compression for grayscale images")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose "Increase log verbosity (repeatable)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            arg!(--config <FILE> "JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            clap::Command::new("compress")
                .about("Compress images into <stem>.bin and <stem>_codes.json")
                .arg(
                    arg!(<INPUT> ... "Images to compress")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-o --"output-dir" <DIR> "Directory for the compressed artifacts")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(arg!(--verify "Decompress after compressing, compare pixels and write <stem>_decompressed.png"))
                .arg(arg!(--pretty "Indent the code table JSON")),
        )
        .subcommand(
            clap::Command::new("decompress")
                .about("Rebuild an image from <BASE>.bin and <BASE>_codes.json")
                .arg(arg!(<BASE> "Artifact base path, without suffix").value_parser(clap::value_parser!(PathBuf)))
                .arg(arg!(<OUTPUT> "Image file to write").value_parser(clap::value_parser!(PathBuf)))
                .arg(arg!(--width <W> "Image width; read from the stats sidecar if omitted").value_parser(clap::value_parser!(u32)))
                .arg(arg!(--height <H> "Image height; read from the stats sidecar if omitted").value_parser(clap::value_parser!(u32))),
        )
}

fn main() -> ExitCode {
    let args = cli().get_matches();
    init_logging(args.get_count("verbose"));

    let result = load_config(args.get_one::<PathBuf>("config")).and_then(|config| {
        match args.subcommand() {
            Some(("compress", sub)) => run_compress(sub, config),
            Some(("decompress", sub)) => run_decompress(sub),
            _ => unreachable!("subcommand is required"),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<CodecConfig> {
    let base = match path {
        Some(path) => CodecConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CodecConfig::default(),
    };
    Ok(base.with_env_prefix(grayhuff::config::ENV_PREFIX)?)
}

fn run_compress(args: &clap::ArgMatches, mut config: CodecConfig) -> Result<()> {
    if let Some(dir) = args.get_one::<PathBuf>("output-dir") {
        config.output_dir = dir.clone();
    }
    config.verify_roundtrip |= args.get_flag("verify");
    config.pretty_code_table |= args.get_flag("pretty");
    config.validate()?;

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let inputs: Vec<&PathBuf> = args
        .get_many::<PathBuf>("INPUT")
        .ok_or_else(|| anyhow!("no input images given"))?
        .collect();
    let jobs = plan_outputs(&inputs, &config.output_dir)?;

    // each image is an independent run
    let results: Vec<(&Path, Result<Report>)> = jobs
        .par_iter()
        .map(|(input, paths)| (*input, compress_one(input, paths, &config)))
        .collect();

    let mut failures = 0;
    for ((input, result), (_, paths)) in results.into_iter().zip(&jobs) {
        match result {
            Ok(report) => print_summary(input, paths, &report),
            Err(e) => {
                failures += 1;
                error!("{}: {:#}", input.display(), e);
            }
        }
    }
    if failures > 0 {
        bail!("{} of {} images failed", failures, inputs.len());
    }
    Ok(())
}

fn artifact_base(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| anyhow!("{} has no file name", input.display()))?;
    Ok(output_dir.join(stem))
}

/// Pair every input with its artifact paths, refusing inputs whose stems
/// would land on the same files.
fn plan_outputs<'a>(
    inputs: &[&'a PathBuf],
    output_dir: &Path,
) -> Result<Vec<(&'a Path, ArtifactPaths)>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut jobs = Vec::with_capacity(inputs.len());
    for &input in inputs {
        let base = artifact_base(input, output_dir)?;
        if let Some(previous) = claimed.insert(base.clone(), input.as_path()) {
            bail!(
                "{} and {} would both write {}.*; compress them into separate output directories",
                previous.display(),
                input.display(),
                base.display()
            );
        }
        jobs.push((input.as_path(), ArtifactPaths::for_base(base)));
    }
    Ok(jobs)
}

struct Report {
    compressed: Compressed,
    /// Set when the run was verified and the restored image written
    restored: Option<GrayRaster>,
}

fn compress_one(input: &Path, paths: &ArtifactPaths, config: &CodecConfig) -> Result<Report> {
    let raster = ImageRasterCodec
        .load(input)
        .with_context(|| format!("loading {}", input.display()))?;
    let compressed = HuffmanCodec::compress_raster(&raster)
        .with_context(|| format!("compressing {}", input.display()))?;

    artifact::write_compressed(
        paths,
        &compressed,
        config.pretty_code_table,
        config.write_stats,
    )?;

    let mut restored = None;
    if config.verify_roundtrip {
        let loaded = artifact::read_compressed(paths)?;
        let decoded = HuffmanCodec::decompress(
            &loaded.stream,
            &loaded.code_table,
            raster.samples().len(),
            raster.dimensions(),
        )?;
        if decoded != raster {
            bail!("{}: decompressed pixels differ from the input", input.display());
        }
        ImageRasterCodec
            .save(&decoded, &paths.decompressed)
            .with_context(|| format!("writing {}", paths.decompressed.display()))?;
        info!("{}: round trip verified", input.display());
        restored = Some(decoded);
    }
    Ok(Report {
        compressed,
        restored,
    })
}

fn format_kb(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

fn file_size(path: &Path) -> String {
    fs::metadata(path)
        .map(|m| format_kb(m.len()))
        .unwrap_or_else(|_| "n/a".to_string())
}

fn print_summary(input: &Path, paths: &ArtifactPaths, report: &Report) {
    let stats = &report.compressed.stats;

    println!("Input file:        {} ({})", input.display(), file_size(input));
    if let Some(dimensions) = stats.dimensions {
        println!("Image size:        {} pixels", dimensions);
    }
    println!("Original size:     {} bits", stats.original_bits);
    println!("Binary data:       {} ({})", paths.payload.display(), file_size(&paths.payload));
    println!("Huffman codes:     {} ({})", paths.code_table.display(), file_size(&paths.code_table));
    println!("Compressed size:   {} bits", stats.compressed_bits);
    println!("Compression ratio: {:.2}%", stats.compression_ratio);
    if let Some(restored) = &report.restored {
        println!(
            "Decompressed file: {} ({})",
            paths.decompressed.display(),
            file_size(&paths.decompressed)
        );
        println!("Restored size:     {} pixels", restored.dimensions());
    }
    println!();
}

fn run_decompress(args: &clap::ArgMatches) -> Result<()> {
    let base = args
        .get_one::<PathBuf>("BASE")
        .ok_or_else(|| anyhow!("missing artifact base"))?;
    let output = args
        .get_one::<PathBuf>("OUTPUT")
        .ok_or_else(|| anyhow!("missing output path"))?;

    let paths = ArtifactPaths::for_base(base);
    let loaded = artifact::read_compressed(&paths)
        .with_context(|| format!("reading artifacts for {}", base.display()))?;

    let dimensions = match (
        args.get_one::<u32>("width"),
        args.get_one::<u32>("height"),
        loaded.stats.as_ref().and_then(|s| s.dimensions),
    ) {
        (Some(&width), Some(&height), _) => Dimensions::new(width, height),
        (None, None, Some(dimensions)) => dimensions,
        _ => bail!(
            "pass both --width and --height, or keep {} next to the payload",
            paths.stats.display()
        ),
    };

    let raster = HuffmanCodec::decompress(
        &loaded.stream,
        &loaded.code_table,
        dimensions.pixel_count(),
        dimensions,
    )?;
    ImageRasterCodec
        .save(&raster, output)
        .with_context(|| format!("writing {}", output.display()))?;

    println!("Decompressed file: {} ({})", output.display(), file_size(output));
    println!("Image size:        {} pixels", raster.dimensions());
    Ok(())
}
