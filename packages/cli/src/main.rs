#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI orchestrator for the border map static data build.
//!
//! `build` turns the fetch layer's raw JSON snapshots into the static
//! artifact set the front-end serves; `validate` structurally re-checks
//! the GeoJSON artifacts of a previous build.

mod pipeline;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "border_map_cli", about = "Border map static data build tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build all static artifacts from raw snapshot files
    Build {
        /// Directory containing the raw snapshots from the fetch layer
        #[arg(long, default_value = "data/raw")]
        input_dir: PathBuf,

        /// Directory to write the static artifacts to
        #[arg(long, default_value = "public/data")]
        output_dir: PathBuf,

        /// Decimal digits kept in optimized coordinate output
        #[arg(long, default_value_t = border_map_generate::assemble::DEFAULT_PRECISION)]
        precision: u32,

        /// Feature count above which border chunks are emitted
        #[arg(long, default_value_t = border_map_generate::assemble::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Treat advisory data-quality issues as a build failure
        #[arg(long)]
        fail_on_issues: bool,
    },
    /// Structurally validate the GeoJSON artifacts of a previous build
    Validate {
        /// Directory containing the generated artifacts
        #[arg(long, default_value = "public/data")]
        dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input_dir,
            output_dir,
            precision,
            chunk_size,
            fail_on_issues,
        } => pipeline::run(&pipeline::BuildOptions {
            input_dir,
            output_dir,
            precision,
            chunk_size,
            fail_on_issues,
        }),
        Commands::Validate { dir } => validate_artifacts(&dir),
    }
}

/// Runs the structural verifier over every `.geojson` artifact in `dir`.
fn validate_artifacts(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "geojson"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(format!("no .geojson artifacts found in {}", dir.display()).into());
    }

    let mut failures = 0usize;
    for path in &paths {
        let outcome = border_map_generate::verify::verify_geojson_file(path)?;
        if outcome.is_valid() {
            log::info!(
                "{}: valid ({} features)",
                path.display(),
                outcome.features
            );
        } else {
            failures += 1;
            log::error!("{}: INVALID", path.display());
            for error in &outcome.errors {
                log::error!("  {error}");
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} artifacts failed validation", paths.len()).into());
    }

    log::info!("All {} GeoJSON artifacts are valid", paths.len());
    Ok(())
}
