use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use palette_converter::convert::{
    BatchReport, ConverterConfig, Outcome, convert_directory, convert_into, create_palette,
};
use palette_converter::io::{load_palette, load_palette_or_empty};
use palette_converter::Palette;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Build a color palette from one image and remap other images onto it.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Palette artifact to write (create) or read (convert, show)
    #[arg(short = 'p', long, default_value = "palette.png", global = true)]
    palette_file: PathBuf,

    /// Suffix for converted file stems and directory names
    #[arg(short = 's', long, default_value = "_converted", global = true)]
    suffix: String,

    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the distinct colors of a reference image into the palette file
    Create {
        reference: PathBuf,
    },
    /// Remap images, or every image under directories, onto the palette
    Convert {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Where converted single files go (directories are mirrored next to themselves)
        #[arg(short = 'd', long, default_value = ".")]
        out_dir: PathBuf,

        /// Comma-separated hex colors to use instead of the palette file
        #[arg(short = 'c', long)]
        colors: Option<String>,

        /// Print a JSON report instead of one line per file
        #[arg(long)]
        json: bool,
    },
    /// List the colors stored in the palette file
    Show {
        #[arg(long)]
        json: bool,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);

    let config = ConverterConfig {
        palette_path: args.palette_file,
        suffix: args.suffix,
        ..Default::default()
    };

    match args.command {
        Command::Create { reference } => {
            let palette = create_palette(&config, &reference)
                .with_context(|| format!("creating palette from {}", reference.display()))?;
            println!("{} is written", config.palette_path.display());
            println!("{} colors", palette.len());
        }
        Command::Convert {
            inputs,
            out_dir,
            colors,
            json,
        } => {
            let palette = match colors {
                Some(list) => {
                    let values: Vec<&str> = list.split(',').filter(|s| !s.trim().is_empty()).collect();
                    Palette::from_hex(values.as_slice()).context("parsing --colors")?
                }
                None => load_palette_or_empty(&config.palette_path),
            };
            if palette.is_empty() {
                bail!(
                    "no palette colors available; run `create` first or pass --colors (looked for {})",
                    config.palette_path.display()
                );
            }
            run_convert(&config, &palette, &inputs, &out_dir, json)?;
        }
        Command::Show { json } => {
            let palette = load_palette(&config.palette_path)?;
            if json {
                println!("{}", json!({ "colors": palette.to_hex() }));
            } else {
                for hex in palette.to_hex() {
                    println!("#{hex}");
                }
            }
        }
    }

    Ok(())
}

fn run_convert(
    config: &ConverterConfig,
    palette: &Palette,
    inputs: &[PathBuf],
    out_dir: &Path,
    json: bool,
) -> Result<()> {
    let mut reports: Vec<BatchReport> = Vec::new();
    let mut singles = Vec::new();
    let mut failures = 0usize;

    for input in inputs {
        if input.is_dir() {
            match convert_directory(config, palette, input) {
                Ok(report) => {
                    failures += report.failed();
                    reports.push(report);
                }
                Err(e) => {
                    tracing::error!(dir = %input.display(), error = %e, "directory skipped");
                    failures += 1;
                }
            }
            continue;
        }

        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("creating {}", out_dir.display()))?;
        match convert_into(config, palette, input, out_dir) {
            Ok(output) => singles.push(json!({
                "input": input.display().to_string(),
                "output": output.display().to_string(),
                "status": "converted",
            })),
            Err(e) => {
                tracing::error!(input = %input.display(), error = %e, "conversion failed");
                failures += 1;
                singles.push(json!({
                    "input": input.display().to_string(),
                    "status": "failed",
                    "error": e.to_string(),
                }));
            }
        }
    }

    if json {
        let batches: Vec<_> = reports.iter().map(report_json).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "files": singles, "directories": batches }))?
        );
    } else {
        for file in &singles {
            if file["status"] == "converted" {
                println!("Saved → {}", file["output"].as_str().unwrap_or_default());
            }
        }
        for report in &reports {
            println!(
                "{} → {}: {} converted, {} failed",
                report.source_dir.display(),
                report.output_dir.display(),
                report.converted(),
                report.failed()
            );
        }
    }

    if failures > 0 {
        bail!("{failures} conversion(s) failed");
    }
    Ok(())
}

fn report_json(report: &BatchReport) -> serde_json::Value {
    let files: Vec<_> = report
        .files
        .iter()
        .map(|f| match &f.outcome {
            Outcome::Converted => json!({
                "input": f.input.display().to_string(),
                "output": f.output.display().to_string(),
                "status": "converted",
            }),
            Outcome::Failed(error) => json!({
                "input": f.input.display().to_string(),
                "status": "failed",
                "error": error,
            }),
        })
        .collect();

    json!({
        "source": report.source_dir.display().to_string(),
        "output": report.output_dir.display().to_string(),
        "converted": report.converted(),
        "failed": report.failed(),
        "files": files,
    })
}
