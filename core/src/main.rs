use clap::Parser;
use dicom::object::open_file;
use log::{error, info, warn};
use mfnorm_core::cli::{Cli, OutputFormat};
use mfnorm_core::{Dataset, NormalizedSeries, NormalizerOptions, SeriesNormalizer, TextReport};
use std::fs;
use std::path::PathBuf;
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let files = match collect_inputs(&cli.inputs) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: failed to collect inputs: {}", e);
            process::exit(1);
        }
    };
    if files.is_empty() {
        eprintln!("Error: no DICOM files (.dcm) found");
        process::exit(1);
    }
    info!("Found {} DICOM files", files.len());

    let mut datasets: Vec<Dataset> = Vec::new();
    for path in &files {
        match open_file(path) {
            Ok(obj) => {
                info!("Read: {}", path.display());
                datasets.push((*obj).clone());
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
            }
        }
    }
    if datasets.is_empty() {
        eprintln!("Error: no valid DICOM files could be read");
        process::exit(1);
    }

    let options = NormalizerOptions::default().with_mode(cli.mode.clone().into());
    let result = match SeriesNormalizer::normalize_with_options(&datasets, options) {
        Ok(result) => result,
        Err(e) => {
            error!("Normalization failed: {}", e);
            eprintln!("Error: series could not be reconstructed: {}", e);
            process::exit(1);
        }
    };

    match cli.format {
        OutputFormat::Text => print!("{}", TextReport::new(&result)),
        OutputFormat::Json => print_json(&result),
    }

    if let Some(path) = &cli.output {
        if let Err(e) = result.write_to_file(path) {
            error!("Failed to write {}: {}", path.display(), e);
            eprintln!("Error: failed to write output: {}", e);
            process::exit(1);
        }
        info!("Wrote normalized dataset to {}", path.display());
    }
}

fn setup_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
}

/// A single directory argument expands to its .dcm files, sorted by name;
/// anything else is taken as an explicit file list in the given order
fn collect_inputs(inputs: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    if inputs.len() == 1 && inputs[0].is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(&inputs[0])?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect();
        files.sort();
        Ok(files)
    } else {
        Ok(inputs.to_vec())
    }
}

#[cfg(feature = "json")]
fn print_json(result: &NormalizedSeries) {
    let summary = mfnorm_core::cli::report::Summary::from(result);
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: failed to serialize summary: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(not(feature = "json"))]
fn print_json(_result: &NormalizedSeries) {
    eprintln!("Error: JSON output requires the 'json' feature");
    process::exit(1);
}
