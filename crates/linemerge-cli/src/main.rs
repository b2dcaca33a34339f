//! linemerge: merge disconnected line segments in DXF and SVG drawings.
//!
//! Reads a drawing, joins its LINE entities (DXF) or straight-line
//! geometry (SVG) into continuous polylines, and writes the result in
//! both formats next to a statistics report.
//!
//! # Usage
//!
//! ```text
//! linemerge simplify [OPTIONS] <INPUT>
//! linemerge convert <INPUT> [-o OUTPUT]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod bundle;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use linemerge_formats::{SourceFormat, convert_document, simplify_document};
use linemerge_pipeline::{SimplifyConfig, SimplifyStats};
use tracing::Level;

/// Merge disconnected line segments into continuous polylines.
#[derive(Parser)]
#[command(name = "linemerge", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simplify a DXF or SVG drawing and write both output formats.
    Simplify(SimplifyArgs),
    /// Convert a drawing between DXF and SVG without simplifying it.
    Convert(ConvertArgs),
}

#[derive(Args)]
struct SimplifyArgs {
    /// Input drawing (.dxf or .svg).
    input: PathBuf,

    /// Directory for the outputs (defaults to the input's directory).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Decimal digits kept when matching endpoints.
    #[arg(long, default_value_t = SimplifyConfig::DEFAULT_PRECISION, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(0..=u64::from(SimplifyConfig::MAX_PRECISION)))]
    precision: u32,

    /// Minimum degree at which a point is a junction.
    #[arg(long, default_value_t = SimplifyConfig::DEFAULT_JUNCTION_THRESHOLD, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(2..))]
    junction_threshold: usize,

    /// Full simplification config as a JSON string.
    ///
    /// When provided, `--precision` and `--junction-threshold` are
    /// ignored. Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Write a single `<stem>_simplified.zip` holding both outputs.
    #[arg(long)]
    zip: bool,

    /// Print statistics as JSON instead of the human-readable report.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input drawing (.dxf or .svg).
    input: PathBuf,

    /// Output path (defaults to the input with the other extension).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Build a [`SimplifyConfig`] from CLI arguments.
///
/// `--config-json` takes precedence over the individual flags.
fn config_from_args(args: &SimplifyArgs) -> Result<SimplifyConfig> {
    let config = match args.config_json {
        Some(ref json) => serde_json::from_str(json).context("parsing --config-json")?,
        None => SimplifyConfig {
            precision: args.precision,
            junction_threshold: args.junction_threshold,
        },
    };
    config.validate().context("invalid simplification config")?;
    Ok(config)
}

const fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_logging(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// File stem used to name outputs, falling back to `drawing`.
fn output_stem(input: &Path) -> &str {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("drawing")
}

/// Directory for outputs: the explicit one, else the input's parent.
fn output_dir(input: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(
        || match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
        Path::to_path_buf,
    )
}

/// Result of a `simplify` run.
struct SimplifyOutcome {
    stats: SimplifyStats,
    written: Vec<PathBuf>,
}

fn run_simplify(args: &SimplifyArgs) -> Result<SimplifyOutcome> {
    let config = config_from_args(args)?;
    let format = SourceFormat::from_path(&args.input)?;
    let bytes =
        std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    tracing::info!(
        input = %args.input.display(),
        bytes = bytes.len(),
        ?format,
        "loaded drawing",
    );

    let document = simplify_document(format, &bytes, &config)
        .with_context(|| format!("simplifying {}", args.input.display()))?;

    let dir = output_dir(&args.input, args.output_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let stem = output_stem(&args.input);
    let dxf_name = format!("{stem}_simplified.dxf");
    let svg_name = format!("{stem}_simplified.svg");

    let written = if args.zip {
        let archive = bundle::zip_entries(&[
            (dxf_name, document.dxf.as_slice()),
            (svg_name, document.svg.as_bytes()),
        ])?;
        let path = dir.join(format!("{stem}_simplified.zip"));
        write_output(&path, &archive)?;
        vec![path]
    } else {
        let dxf_path = dir.join(dxf_name);
        let svg_path = dir.join(svg_name);
        write_output(&dxf_path, &document.dxf)?;
        write_output(&svg_path, document.svg.as_bytes())?;
        vec![dxf_path, svg_path]
    };

    Ok(SimplifyOutcome {
        stats: document.stats,
        written,
    })
}

fn run_convert(args: &ConvertArgs) -> Result<PathBuf> {
    let format = SourceFormat::from_path(&args.input)?;
    let bytes =
        std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;

    let converted = convert_document(format, &bytes)
        .with_context(|| format!("converting {}", args.input.display()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension(format.counterpart().extension()));
    write_output(&output, &converted)?;
    Ok(output)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Simplify(args) => {
            let outcome = run_simplify(args)?;
            if args.json {
                let json = serde_json::to_string_pretty(&outcome.stats)
                    .context("serializing statistics")?;
                println!("{json}");
            } else {
                println!("{}", outcome.stats.report());
            }
            for path in &outcome.written {
                eprintln!("Written: {}", path.display());
            }
        }
        Command::Convert(args) => {
            let output = run_convert(args)?;
            eprintln!("Written: {}", output.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}
