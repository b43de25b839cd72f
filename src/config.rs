//! Command-line configuration for dicom-frame.
//!
//! This module provides the CLI definition:
//! - Subcommands via clap derive
//! - Environment variables with the `DICOM_FRAME_` prefix
//! - Defaults as public constants
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use dicom_frame::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Command::Info(config) => println!("Inspecting {}", config.path.display()),
//!     _ => {}
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `DICOM_FRAME_VERBOSE` - Enable debug logging (default: false)
//! - `DICOM_FRAME_JSON` - Print `info` output as JSON (default: false)
//! - `DICOM_FRAME_PREVIEW_FRAME` - Frame rendered by `preview` (default: 0)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Default Values
// =============================================================================

/// Default frame rendered by `preview`.
pub const DEFAULT_PREVIEW_FRAME: usize = 0;

/// File extension required for preview output.
pub const PREVIEW_EXTENSION: &str = "png";

// =============================================================================
// CLI Arguments
// =============================================================================

/// dicom-frame - Detect, inspect and decode uncompressed DICOM images.
#[derive(Parser, Debug, Clone)]
#[command(name = "dicom-frame")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false, env = "DICOM_FRAME_VERBOSE")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Report whether files are recognized and readable as DICOM images.
    Check(CheckConfig),

    /// Print the geometry and pixel encoding of an image.
    Info(InfoConfig),

    /// Write the decoded pixel buffer as raw little-endian bytes.
    Extract(ExtractConfig),

    /// Render one frame as a PNG file.
    Preview(PreviewConfig),
}

// =============================================================================
// Check
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// Files to check.
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,
}

impl CheckConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.paths.is_empty() {
            return Err("At least one path is required".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Info
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct InfoConfig {
    /// File to inspect.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Print JSON instead of a human-readable summary.
    #[arg(long, default_value_t = false, env = "DICOM_FRAME_JSON")]
    pub json: bool,
}

impl InfoConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_input(&self.path)
    }
}

// =============================================================================
// Extract
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ExtractConfig {
    /// File to decode.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Destination of the raw pixel buffer.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_input(&self.path)?;
        validate_output(&self.path, &self.output)
    }
}

// =============================================================================
// Preview
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct PreviewConfig {
    /// File to render.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Destination PNG file.
    #[arg(short, long, value_name = "FILE.png")]
    pub output: PathBuf,

    /// Zero-based index of the frame to render.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_FRAME, env = "DICOM_FRAME_PREVIEW_FRAME")]
    pub frame: usize,
}

impl PreviewConfig {
    pub fn validate(&self) -> Result<(), String> {
        validate_input(&self.path)?;
        validate_output(&self.path, &self.output)?;

        let is_png = self
            .output
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(PREVIEW_EXTENSION));
        if !is_png {
            return Err(format!(
                "Preview output must have a .{} extension: {}",
                PREVIEW_EXTENSION,
                self.output.display()
            ));
        }
        Ok(())
    }
}

fn validate_input(path: &std::path::Path) -> Result<(), String> {
    if path.as_os_str().is_empty() {
        return Err("Input path must not be empty".to_string());
    }
    Ok(())
}

fn validate_output(input: &std::path::Path, output: &std::path::Path) -> Result<(), String> {
    if output.as_os_str().is_empty() {
        return Err("Output path must not be empty".to_string());
    }
    if input == output {
        return Err(format!(
            "Output would overwrite the input file: {}",
            output.display()
        ));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
