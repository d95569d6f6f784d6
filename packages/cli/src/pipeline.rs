//! The end-to-end build: load raw snapshots, normalize, cross-reference,
//! generate artifacts, and emit a build report.
//!
//! Stages run strictly in sequence since each consumes the full output of
//! the previous one. Per-record failures were already isolated inside the
//! normalizer; the only fatal errors here are unreadable snapshots and
//! artifact writes.

use std::path::{Path, PathBuf};
use std::time::Instant;

use border_map_geodata::{create_iso3_lookup, validate_processed_data};
use border_map_geodata::{process_border_data, process_border_post_data, process_country_data};
use border_map_geodata_models::RawRecord;
use border_map_generate::{GenerateOptions, write_json};
use serde::Serialize;
use serde_json::Value;

/// Output name for the orchestration-layer build report.
pub const OUTPUT_BUILD_REPORT: &str = "build-report.json";

/// Configuration for a full build run.
pub struct BuildOptions {
    /// Directory holding the raw snapshot files from the fetch layer.
    pub input_dir: PathBuf,
    /// Directory the static artifacts are written to.
    pub output_dir: PathBuf,
    /// Decimal digits kept in optimized coordinate output.
    pub precision: u32,
    /// Feature-count threshold above which border chunks are emitted.
    pub chunk_size: usize,
    /// Treat advisory data-quality issues as a build failure.
    pub fail_on_issues: bool,
}

/// Raw vs processed record counts for one entity kind.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct KindCounts {
    fetched: usize,
    processed: usize,
    /// processed / fetched, 1.0 for an empty input.
    success_rate: f64,
}

impl KindCounts {
    #[allow(clippy::cast_precision_loss)]
    fn new(fetched: usize, processed: usize) -> Self {
        let success_rate = if fetched == 0 {
            1.0
        } else {
            processed as f64 / fetched as f64
        };
        Self {
            fetched,
            processed,
            success_rate,
        }
    }
}

/// Orchestration summary written alongside the artifacts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildReport {
    generated_at: String,
    duration_ms: u128,
    countries: KindCounts,
    borders: KindCounts,
    border_posts: KindCounts,
    zones: KindCounts,
    validation_passed: bool,
    validation_issues: Vec<String>,
}

/// Runs the full build.
///
/// # Errors
///
/// Returns an error if a required snapshot is missing or unreadable, if
/// any artifact write fails, or — with `fail_on_issues` — if validation
/// reported data-quality issues.
pub fn run(options: &BuildOptions) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();

    log::info!("Loading raw snapshots from {}", options.input_dir.display());
    let raw_countries = load_records(&options.input_dir.join("countries.json"))?;
    let raw_borders = load_records(&options.input_dir.join("borders.json"))?;
    let raw_border_posts = load_records(&options.input_dir.join("border-posts.json"))?;
    let zones = load_zones(&options.input_dir.join("zones.json"));

    log::info!(
        "Fetched {} countries, {} borders, {} border posts, {} zones",
        raw_countries.len(),
        raw_borders.len(),
        raw_border_posts.len(),
        zones.len()
    );

    let countries = process_country_data(&raw_countries);
    let borders = process_border_data(&raw_borders);
    let border_posts = process_border_post_data(&raw_border_posts);

    let report = validate_processed_data(&countries, &borders, Some(&border_posts));
    if !report.is_valid {
        log::warn!(
            "Validation found {} data-quality issues",
            report.issues.len()
        );
        if options.fail_on_issues {
            return Err(format!(
                "aborting: {} data-quality issues and --fail-on-issues is set",
                report.issues.len()
            )
            .into());
        }
    }

    let lookup = create_iso3_lookup(&countries);

    let generate_options = GenerateOptions {
        precision: options.precision,
        chunk_size: options.chunk_size,
    };
    let manifest = border_map_generate::run(
        &options.output_dir,
        &countries,
        &borders,
        &border_posts,
        &zones,
        &lookup,
        &generate_options,
    )?;
    log::info!(
        "Generated {} artifacts under {}",
        manifest.files.len() + 1,
        options.output_dir.display()
    );

    let build_report = BuildReport {
        generated_at: border_map_generate::now_rfc3339(),
        duration_ms: started.elapsed().as_millis(),
        countries: KindCounts::new(raw_countries.len(), countries.len()),
        borders: KindCounts::new(raw_borders.len(), borders.len()),
        border_posts: KindCounts::new(raw_border_posts.len(), border_posts.len()),
        zones: KindCounts::new(zones.len(), zones.len()),
        validation_passed: report.is_valid,
        validation_issues: report.issues,
    };
    write_json(&options.output_dir.join(OUTPUT_BUILD_REPORT), &build_report)?;

    log::info!(
        "Build complete in {} ms",
        started.elapsed().as_millis()
    );
    Ok(())
}

/// Loads a raw record array from a snapshot file. Missing or unreadable
/// files are fatal — an empty required collection means the fetch layer
/// failed. Non-object array elements are logged and dropped.
fn load_records(path: &Path) -> Result<Vec<RawRecord>, Box<dyn std::error::Error>> {
    let raw = std::fs::read(path)
        .map_err(|e| format!("required snapshot {} unreadable: {e}", path.display()))?;
    let values: Vec<Value> = serde_json::from_slice(&raw)
        .map_err(|e| format!("snapshot {} is not a JSON array: {e}", path.display()))?;

    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Value::Object(record) => records.push(record),
            other => log::warn!(
                "Skipping non-object entry in {}: {other}",
                path.display()
            ),
        }
    }
    Ok(records)
}

/// Loads the optional zone snapshot. Zones are a pass-through; a missing
/// file just means no zones this run.
fn load_zones(path: &Path) -> Vec<Value> {
    let Ok(raw) = std::fs::read(path) else {
        log::info!("No zone snapshot at {}, skipping", path.display());
        return Vec::new();
    };

    match serde_json::from_slice::<Vec<Value>>(&raw) {
        Ok(zones) => zones,
        Err(e) => {
            log::warn!("Zone snapshot {} is malformed, skipping: {e}", path.display());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "border-map-cli-{label}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_snapshots(dir: &Path) {
        std::fs::write(
            dir.join("countries.json"),
            json!([
                {"id": "FR", "name": "France", "iso_a3": "FRA", "borders": ["b1"]},
                {"id": "XX"}
            ])
            .to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.join("borders.json"),
            json!([
                {
                    "id": "b1",
                    "geometry": json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}).to_string()
                },
                {"id": "broken", "geometry": "{nope"}
            ])
            .to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.join("border-posts.json"),
            json!([
                {"id": "p1", "location": [2.35, 48.85], "is_open": 1}
            ])
            .to_string(),
        )
        .unwrap();
    }

    #[test]
    fn full_build_writes_artifacts_and_report() {
        let input = temp_dir("input");
        let output = temp_dir("output");
        write_snapshots(&input);

        let options = BuildOptions {
            input_dir: input.clone(),
            output_dir: output.clone(),
            precision: 6,
            chunk_size: 1000,
            fail_on_issues: false,
        };

        run(&options).unwrap();

        let report: Value = serde_json::from_slice(
            &std::fs::read(output.join(OUTPUT_BUILD_REPORT)).unwrap(),
        )
        .unwrap();

        assert_eq!(report["countries"]["fetched"], json!(2));
        assert_eq!(report["countries"]["processed"], json!(2));
        assert_eq!(report["borders"]["fetched"], json!(2));
        // The broken-geometry border was dropped.
        assert_eq!(report["borders"]["processed"], json!(1));
        // "XX" has no ISO code, "b1" is referenced, so validation flags
        // only the missing code.
        assert_eq!(report["validationPassed"], json!(false));

        assert!(output.join("borders.geojson").exists());
        assert!(output.join("manifest.json").exists());

        std::fs::remove_dir_all(&input).unwrap();
        std::fs::remove_dir_all(&output).unwrap();
    }

    #[test]
    fn fail_on_issues_aborts_before_writing() {
        let input = temp_dir("strict-input");
        let output = temp_dir("strict-output");
        write_snapshots(&input);

        let options = BuildOptions {
            input_dir: input.clone(),
            output_dir: output.clone(),
            precision: 6,
            chunk_size: 1000,
            fail_on_issues: true,
        };

        assert!(run(&options).is_err());
        assert!(!output.join("manifest.json").exists());

        std::fs::remove_dir_all(&input).unwrap();
        std::fs::remove_dir_all(&output).unwrap();
    }

    #[test]
    fn missing_required_snapshot_is_fatal() {
        let input = temp_dir("empty-input");
        let output = temp_dir("unused-output");

        let options = BuildOptions {
            input_dir: input.clone(),
            output_dir: output.clone(),
            precision: 6,
            chunk_size: 1000,
            fail_on_issues: false,
        };

        assert!(run(&options).is_err());

        std::fs::remove_dir_all(&input).unwrap();
        std::fs::remove_dir_all(&output).unwrap();
    }

    #[test]
    fn non_object_entries_are_dropped() {
        let dir = temp_dir("records");
        let path = dir.join("countries.json");
        std::fs::write(&path, json!([{"id": "FR"}, 42, "junk"]).to_string()).unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_zone_snapshot_yields_empty_set() {
        let dir = temp_dir("zones");
        assert!(load_zones(&dir.join("zones.json")).is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
