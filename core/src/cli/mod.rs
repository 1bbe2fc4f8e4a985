pub mod report;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::types::ValidationMode;

/// Command-line arguments for mfnorm
#[derive(Parser, Debug)]
#[command(name = "mfnorm")]
#[command(about = "Normalize a DICOM series into one multi-frame dataset")]
#[command(version)]
pub struct Cli {
    /// DICOM input files, or a single directory of .dcm files
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Handling of data-quality anomalies
    #[arg(short, long, default_value = "strict")]
    pub mode: ModeArg,

    /// Write the normalized multi-frame dataset to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Validation mode options
#[derive(Debug, Clone, ValueEnum)]
pub enum ModeArg {
    /// Data-quality anomalies fail the run
    Strict,
    /// Data-quality anomalies are logged and reported, the run continues
    Lenient,
}

impl From<ModeArg> for ValidationMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Strict => ValidationMode::Strict,
            ModeArg::Lenient => ValidationMode::Lenient,
        }
    }
}
