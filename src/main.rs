//! dicom-frame - Detect, inspect and decode uncompressed DICOM images.
//!
//! This binary wires the library's reader to a small set of subcommands.

use clap::Parser;
use std::fs;
use std::io::BufReader;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dicom_frame::{
    config::{CheckConfig, Cli, Command, ExtractConfig, InfoConfig, PreviewConfig},
    format::{is_likely_dicom, probe_dicom_magic},
    image::preview::{encode_png, render_frame},
    io::open_file,
    DicomImageReader,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Check(config) => run_check(config),
        Command::Info(config) => run_info(config),
        Command::Extract(config) => run_extract(config),
        Command::Preview(config) => run_preview(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "dicom_frame=debug"
    } else {
        "dicom_frame=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Open a file, logging the failure.
fn open_reader(path: &std::path::Path) -> Option<DicomImageReader> {
    match DicomImageReader::open(path) {
        Ok(reader) => Some(reader),
        Err(e) => {
            error!("Failed to open {}: {}", path.display(), e);
            None
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

fn run_check(config: CheckConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut all_readable = true;

    for path in &config.paths {
        let heuristic = open_file(path)
            .map(|file| is_likely_dicom(BufReader::new(file)))
            .unwrap_or(false);
        let magic = open_file(path).is_ok_and(probe_dicom_magic);
        let readable = DicomImageReader::can_read_file(path);

        let mark = if readable { "✓" } else { "✗" };
        println!(
            "{} {} (element heuristic: {}, magic: {}, readable: {})",
            mark,
            path.display(),
            yes_no(heuristic),
            yes_no(magic),
            yes_no(readable)
        );

        all_readable &= readable;
    }

    if all_readable {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

// =============================================================================
// Info Command
// =============================================================================

fn run_info(config: InfoConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(reader) = open_reader(&config.path) else {
        return ExitCode::FAILURE;
    };
    let geometry = reader.geometry();
    let encoding = reader.encoding();

    if config.json {
        let json = serde_json::json!({
            "path": config.path.display().to_string(),
            "transfer_syntax": reader.transfer_syntax().uid(),
            "has_preamble": reader.has_preamble(),
            "geometry": geometry,
            "encoding": encoding,
            "pixel_buffer_len": reader.pixel_buffer_len(),
        });
        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to serialize info: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("{}", config.path.display());
    println!("  Transfer syntax: {}", reader.transfer_syntax().name());
    println!("  Preamble:        {}", yes_no(reader.has_preamble()));
    println!("  Dimensions:      {}", geometry.dimension_count());
    println!("  Extents:         {:?}", geometry.extents());
    if geometry.dimension_count() == 4 {
        println!("  Phases:          {}", geometry.phase_count());
    }
    println!("  Spacing:         {:?}", geometry.spacing());
    println!("  Origin:          {:?}", geometry.origin());
    for (axis, direction) in geometry.directions().iter().enumerate() {
        println!("  Direction {}:     {:?}", axis, direction);
    }
    println!(
        "  Rescale:         slope {}, intercept {}",
        geometry.rescale_slope(),
        geometry.rescale_intercept()
    );
    println!("  Encoding:        {}", encoding);
    println!("  Buffer size:     {} bytes", reader.pixel_buffer_len());

    ExitCode::SUCCESS
}

// =============================================================================
// Extract Command
// =============================================================================

fn run_extract(config: ExtractConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(reader) = open_reader(&config.path) else {
        return ExitCode::FAILURE;
    };

    let buffer = match reader.read_to_vec() {
        Ok(buffer) => buffer,
        Err(e) => {
            error!("Failed to decode {}: {}", config.path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = fs::write(&config.output, &buffer) {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    info!(
        "Wrote {} bytes ({}, extents {:?}) to {}",
        buffer.len(),
        reader.encoding(),
        reader.geometry().extents(),
        config.output.display()
    );
    ExitCode::SUCCESS
}

// =============================================================================
// Preview Command
// =============================================================================

fn run_preview(config: PreviewConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(reader) = open_reader(&config.path) else {
        return ExitCode::FAILURE;
    };

    if reader.frame_count() > 1 && config.frame == 0 {
        warn!(
            "{} has {} frames, rendering the first one (use --frame to pick another)",
            config.path.display(),
            reader.frame_count()
        );
    }

    let png = match render_frame(&reader, config.frame).and_then(|image| encode_png(&image)) {
        Ok(png) => png,
        Err(e) => {
            error!("Failed to render {}: {}", config.path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = fs::write(&config.output, &png) {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    info!(
        "Wrote frame {} of {} to {}",
        config.frame,
        config.path.display(),
        config.output.display()
    );
    ExitCode::SUCCESS
}
