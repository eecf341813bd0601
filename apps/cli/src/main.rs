// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polystack CLI: extrude every layer of a polygon layout into a closed
//! solid and write it as ASCII PLY.
//!
//! Usage:
//!   polystack <layout.json> [options]
//!
//! Settings come from `POLYSTACK_*` environment variables first; command
//! line options override them.

use anyhow::{anyhow, bail, Context, Result};
use polystack_processing::{
    JsonLayoutFile, LayoutSource, OutputMode, Pipeline, PipelineConfig, RunReport,
};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// Parsed command line.
#[derive(Debug)]
struct CliArgs {
    input: PathBuf,
    config: PipelineConfig,
    dump_layers: bool,
}

enum Command {
    Help,
    Run(CliArgs),
}

fn print_usage() {
    println!("Usage: polystack <layout.json> [options]");
    println!();
    println!("Options:");
    println!("  --output-dir <dir>       Directory for PLY files (default: .)");
    println!("  --z-min <z>              Lower extrusion plane (default: 0)");
    println!("  --z-max <z>              Upper extrusion plane (default: 100)");
    println!("  --combined [file]        Write all layers into one file (default: AllLayers.ply)");
    println!("  --triangulator <name>    cdt | earcut (default: cdt)");
    println!("  --jobs <n>               Worker threads, 0 = all cores (default: 1)");
    println!("  --weld <tolerance>       Merge coincident vertices within a layer");
    println!("  --dump-layers            Print the triangulated layer map");
    println!("  -h, --help               Show this help");
    println!();
    println!("Environment: POLYSTACK_Z_MIN, POLYSTACK_Z_MAX, POLYSTACK_OUTPUT_DIR,");
    println!("  POLYSTACK_OUTPUT_MODE, POLYSTACK_COMBINED_FILE, POLYSTACK_TRIANGULATOR,");
    println!("  POLYSTACK_WORKER_THREADS, POLYSTACK_WELD_TOLERANCE, RUST_LOG");
}

fn option_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing value for {}", flag))
}

fn parse_args(args: &[String], mut config: PipelineConfig) -> Result<Command> {
    let mut input: Option<PathBuf> = None;
    let mut dump_layers = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--output-dir" => {
                i += 1;
                config.output_dir = PathBuf::from(option_value(args, i, "--output-dir")?);
            }
            "--z-min" => {
                i += 1;
                config.z_min = option_value(args, i, "--z-min")?
                    .parse()
                    .context("Invalid --z-min value")?;
            }
            "--z-max" => {
                i += 1;
                config.z_max = option_value(args, i, "--z-max")?
                    .parse()
                    .context("Invalid --z-max value")?;
            }
            "--combined" => {
                config.output_mode = OutputMode::Combined;
                if let Some(file) = args.get(i + 1).filter(|a| !a.starts_with("--")) {
                    // Only a name ending in .ply is taken as the file name;
                    // anything else is the positional input.
                    if file.ends_with(".ply") {
                        config.combined_file = file.clone();
                        i += 1;
                    }
                }
            }
            "--triangulator" => {
                i += 1;
                config.triangulator = option_value(args, i, "--triangulator")?
                    .parse()
                    .map_err(|e: String| anyhow!(e))?;
            }
            "--jobs" => {
                i += 1;
                config.worker_threads = option_value(args, i, "--jobs")?
                    .parse()
                    .context("Invalid --jobs value")?;
            }
            "--weld" => {
                i += 1;
                let tolerance: f64 = option_value(args, i, "--weld")?
                    .parse()
                    .context("Invalid --weld value")?;
                if !(tolerance > 0.0) {
                    bail!("--weld tolerance must be positive, got {}", tolerance);
                }
                config.weld_tolerance = Some(tolerance);
            }
            "--dump-layers" => dump_layers = true,
            other if other.starts_with('-') && other.len() > 1 => {
                bail!("Unknown option: {}", other);
            }
            path => {
                if input.is_some() {
                    bail!("Unexpected extra argument: {}", path);
                }
                input = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    let input = input.ok_or_else(|| anyhow!("Missing input layout file"))?;
    Ok(Command::Run(CliArgs {
        input,
        config,
        dump_layers,
    }))
}

fn log_report(report: &RunReport) {
    for failure in &report.write_failures {
        tracing::error!(path = %failure.path.display(), error = %failure.error, "Write failed");
    }
    tracing::info!(
        layers = report.layers_processed,
        files = report.written.len(),
        dropped_polygons = report.dropped.len(),
        skipped_layers = ?report.skipped_layers,
        "Done"
    );
}

fn run(args: CliArgs) -> Result<()> {
    let source = JsonLayoutFile::new(&args.input);
    let pipeline = Pipeline::new(args.config)?;

    if args.dump_layers {
        let data = source
            .load()
            .with_context(|| format!("Cannot load layout {}", source.describe()))?;
        let (map, _) = pipeline.triangulated_layers(data);
        println!("{}", map);
    }

    let report = pipeline
        .run(&source)
        .with_context(|| format!("Cannot process layout {}", source.describe()))?;
    log_report(&report);
    Ok(())
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        return ExitCode::FAILURE;
    }

    let command = match parse_args(&args, PipelineConfig::from_env()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match command {
        Command::Help => {
            print_usage();
            ExitCode::SUCCESS
        }
        Command::Run(cli) => match run(cli) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}
