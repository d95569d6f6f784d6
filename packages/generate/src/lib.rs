#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Static JSON/GeoJSON artifact generation for the border map front-end.
//!
//! Takes the normalized entity sets and writes the full artifact family
//! under a configurable output root: country metadata, border metadata
//! and `FeatureCollection`s (full, precision-reduced, and chunked when
//! large), border-post `FeatureCollection`s, the ISO3 lookup, a zone
//! pass-through, and a manifest describing every generated file.
//!
//! Writes are fatal on failure: an incomplete artifact set is worse than
//! a visible failure, so the first I/O or serialization error aborts the
//! run with no partial-file cleanup.

pub mod assemble;
pub mod verify;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use border_map_geodata_models::{Border, BorderPost, Country};
use geojson::FeatureCollection;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::assemble::{
    border_feature_collection, border_post_feature_collection, chunk, optimize,
};

/// Current manifest schema version. Bump on backward-incompatible changes
/// to the manifest format.
pub const MANIFEST_VERSION: u32 = 1;

/// Output name for the country metadata artifact.
pub const OUTPUT_COUNTRIES: &str = "countries.json";

/// Output name for the geometry-free border metadata artifact.
pub const OUTPUT_BORDERS_METADATA: &str = "borders.json";

/// Output name for the full border `FeatureCollection`.
pub const OUTPUT_BORDERS_GEOJSON: &str = "borders.geojson";

/// Output name for the precision-reduced border `FeatureCollection`.
pub const OUTPUT_BORDERS_OPTIMIZED: &str = "borders-optimized.geojson";

/// Output name for the full border-post `FeatureCollection`.
pub const OUTPUT_BORDER_POSTS_GEOJSON: &str = "border-posts.geojson";

/// Output name for the precision-reduced border-post `FeatureCollection`.
pub const OUTPUT_BORDER_POSTS_OPTIMIZED: &str = "border-posts-optimized.geojson";

/// Output name for the geometry-free border-post metadata artifact.
pub const OUTPUT_BORDER_POSTS_METADATA: &str = "border-posts.json";

/// Output name for the zone pass-through artifact.
pub const OUTPUT_ZONES: &str = "zones.json";

/// Output name for the ISO3 → country lookup artifact.
pub const OUTPUT_ISO3_LOOKUP: &str = "iso3-lookup.json";

/// Output name for the manifest.
pub const OUTPUT_MANIFEST: &str = "manifest.json";

/// File name for the Nth border chunk (1-based).
#[must_use]
pub fn chunk_file_name(index: usize) -> String {
    format!("borders-chunk-{index}.geojson")
}

/// Errors raised while writing artifacts. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tuning knobs for assembly.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    /// Decimal digits kept in optimized coordinate output.
    pub precision: u32,
    /// Feature-count threshold above which border chunks are emitted.
    pub chunk_size: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            precision: assemble::DEFAULT_PRECISION,
            chunk_size: assemble::DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Per-file entry in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// What the file contains.
    pub description: String,
    /// Record or feature count.
    pub records: usize,
    /// Serialized size in bytes.
    pub size_bytes: u64,
}

/// Aggregate statistics over the already-produced entity sets. Purely a
/// derived summary, never an independent data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_countries: usize,
    pub countries_with_iso3: usize,
    pub countries_with_borders: usize,
    pub total_borders: usize,
    pub borders_with_geometry: usize,
    pub total_border_posts: usize,
    pub border_posts_with_geometry: usize,
    pub total_zones: usize,
}

/// Manifest describing every generated artifact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: u32,
    pub generated_at: String,
    pub files: BTreeMap<String, FileEntry>,
    pub statistics: Statistics,
}

// ============================================================
// Envelope shapes
// ============================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CountriesMetadata {
    generated_at: String,
    total_countries: usize,
    countries_with_iso3: usize,
    countries_with_borders: usize,
}

#[derive(Serialize)]
struct CountriesFile<'a> {
    metadata: CountriesMetadata,
    countries: &'a [Country],
}

/// Border metadata without the geometry payload, for listings and search.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BorderSummary<'a> {
    id: &'a str,
    properties: &'a geojson::JsonObject,
    geometry_type: &'static str,
    has_geometry: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryMetadata {
    generated_at: String,
    total_records: usize,
}

#[derive(Serialize)]
struct BordersFile<'a> {
    metadata: SummaryMetadata,
    borders: Vec<BorderSummary<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BorderPostSummary<'a> {
    id: &'a str,
    properties: &'a geojson::JsonObject,
    is_open: Option<i64>,
    geometry_type: &'static str,
    has_geometry: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BorderPostsFile<'a> {
    metadata: SummaryMetadata,
    border_posts: Vec<BorderPostSummary<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupMetadata {
    generated_at: String,
    total_mappings: usize,
    available_iso3_codes: Vec<String>,
}

#[derive(Serialize)]
struct LookupFile<'a> {
    metadata: LookupMetadata,
    lookup: &'a BTreeMap<String, Country>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ZonesMetadata {
    generated_at: String,
    total_zones: usize,
}

#[derive(Serialize)]
struct ZonesFile<'a> {
    metadata: ZonesMetadata,
    zones: &'a [Value],
}

// ============================================================
// Pipeline entry point
// ============================================================

/// Writes the full artifact set and returns the manifest (which is also
/// written as the final artifact).
///
/// # Errors
///
/// Returns [`GenerateError`] on the first serialization or filesystem
/// failure; nothing written so far is cleaned up.
pub fn run(
    dir: &Path,
    countries: &[Country],
    borders: &[Border],
    border_posts: &[BorderPost],
    zones: &[Value],
    lookup: &BTreeMap<String, Country>,
    options: &GenerateOptions,
) -> Result<Manifest, GenerateError> {
    fs::create_dir_all(dir)?;

    let mut files = BTreeMap::new();

    log::info!("Writing {OUTPUT_COUNTRIES}...");
    files.insert(
        OUTPUT_COUNTRIES.to_string(),
        write_countries(dir, countries)?,
    );

    log::info!("Writing {OUTPUT_BORDERS_METADATA}...");
    files.insert(
        OUTPUT_BORDERS_METADATA.to_string(),
        write_borders_metadata(dir, borders)?,
    );

    let border_collection = border_feature_collection(borders);
    log::info!(
        "Writing {OUTPUT_BORDERS_GEOJSON} ({} features)...",
        border_collection.features.len()
    );
    files.insert(
        OUTPUT_BORDERS_GEOJSON.to_string(),
        write_feature_collection(dir, OUTPUT_BORDERS_GEOJSON, &border_collection, "Full border geometries")?,
    );

    let optimized_borders = optimize(&border_collection, options.precision);
    log::info!(
        "Writing {OUTPUT_BORDERS_OPTIMIZED} (precision {})...",
        options.precision
    );
    files.insert(
        OUTPUT_BORDERS_OPTIMIZED.to_string(),
        write_feature_collection(
            dir,
            OUTPUT_BORDERS_OPTIMIZED,
            &optimized_borders,
            "Precision-reduced border geometries",
        )?,
    );

    let chunks = chunk(&optimized_borders, options.chunk_size);
    if chunks.is_empty() {
        log::info!(
            "Border collection fits in a single payload (threshold {}), no chunks emitted",
            options.chunk_size
        );
    } else {
        log::info!("Writing {} border chunks...", chunks.len());
        for (index, piece) in chunks.iter().enumerate() {
            let name = chunk_file_name(index + 1);
            let entry = write_feature_collection(
                dir,
                &name,
                piece,
                "Precision-reduced border geometries (chunk)",
            )?;
            files.insert(name, entry);
        }
    }

    let post_collection = border_post_feature_collection(border_posts);
    log::info!(
        "Writing {OUTPUT_BORDER_POSTS_GEOJSON} ({} features)...",
        post_collection.features.len()
    );
    files.insert(
        OUTPUT_BORDER_POSTS_GEOJSON.to_string(),
        write_feature_collection(
            dir,
            OUTPUT_BORDER_POSTS_GEOJSON,
            &post_collection,
            "Border post locations",
        )?,
    );

    let optimized_posts = optimize(&post_collection, options.precision);
    files.insert(
        OUTPUT_BORDER_POSTS_OPTIMIZED.to_string(),
        write_feature_collection(
            dir,
            OUTPUT_BORDER_POSTS_OPTIMIZED,
            &optimized_posts,
            "Precision-reduced border post locations",
        )?,
    );

    log::info!("Writing {OUTPUT_BORDER_POSTS_METADATA}...");
    files.insert(
        OUTPUT_BORDER_POSTS_METADATA.to_string(),
        write_border_posts_metadata(dir, border_posts)?,
    );

    log::info!("Writing {OUTPUT_ZONES} ({} zones)...", zones.len());
    files.insert(OUTPUT_ZONES.to_string(), write_zones(dir, zones)?);

    log::info!("Writing {OUTPUT_ISO3_LOOKUP} ({} mappings)...", lookup.len());
    files.insert(
        OUTPUT_ISO3_LOOKUP.to_string(),
        write_iso3_lookup(dir, lookup)?,
    );

    let manifest = Manifest {
        version: MANIFEST_VERSION,
        generated_at: now_rfc3339(),
        files,
        statistics: statistics(countries, borders, border_posts, zones),
    };

    log::info!("Writing {OUTPUT_MANIFEST}...");
    write_json(&dir.join(OUTPUT_MANIFEST), &manifest)?;

    Ok(manifest)
}

// ============================================================
// Per-artifact writers
// ============================================================

/// Writes `countries.json` with its metadata envelope.
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or the write fails.
pub fn write_countries(dir: &Path, countries: &[Country]) -> Result<FileEntry, GenerateError> {
    let stats = statistics(countries, &[], &[], &[]);
    let file = CountriesFile {
        metadata: CountriesMetadata {
            generated_at: now_rfc3339(),
            total_countries: stats.total_countries,
            countries_with_iso3: stats.countries_with_iso3,
            countries_with_borders: stats.countries_with_borders,
        },
        countries,
    };

    let size_bytes = write_json(&dir.join(OUTPUT_COUNTRIES), &file)?;
    Ok(FileEntry {
        description: "Normalized country records".to_string(),
        records: countries.len(),
        size_bytes,
    })
}

/// Writes `borders.json`: per-border metadata without the geometry
/// payload.
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or the write fails.
pub fn write_borders_metadata(dir: &Path, borders: &[Border]) -> Result<FileEntry, GenerateError> {
    let file = BordersFile {
        metadata: SummaryMetadata {
            generated_at: now_rfc3339(),
            total_records: borders.len(),
        },
        borders: borders
            .iter()
            .map(|border| BorderSummary {
                id: &border.id,
                properties: &border.properties,
                geometry_type: border.geometry.value.type_name(),
                has_geometry: true,
            })
            .collect(),
    };

    let size_bytes = write_json(&dir.join(OUTPUT_BORDERS_METADATA), &file)?;
    Ok(FileEntry {
        description: "Border metadata without geometry".to_string(),
        records: borders.len(),
        size_bytes,
    })
}

/// Writes `border-posts.json`, mirroring the `borders.json` shape.
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or the write fails.
pub fn write_border_posts_metadata(
    dir: &Path,
    border_posts: &[BorderPost],
) -> Result<FileEntry, GenerateError> {
    let file = BorderPostsFile {
        metadata: SummaryMetadata {
            generated_at: now_rfc3339(),
            total_records: border_posts.len(),
        },
        border_posts: border_posts
            .iter()
            .map(|post| BorderPostSummary {
                id: &post.id,
                properties: &post.properties,
                is_open: post.is_open,
                geometry_type: post.geometry.value.type_name(),
                has_geometry: true,
            })
            .collect(),
    };

    let size_bytes = write_json(&dir.join(OUTPUT_BORDER_POSTS_METADATA), &file)?;
    Ok(FileEntry {
        description: "Border post metadata without geometry".to_string(),
        records: border_posts.len(),
        size_bytes,
    })
}

/// Writes `zones.json`: a pass-through of raw zone records inside the
/// standard envelope.
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or the write fails.
pub fn write_zones(dir: &Path, zones: &[Value]) -> Result<FileEntry, GenerateError> {
    let file = ZonesFile {
        metadata: ZonesMetadata {
            generated_at: now_rfc3339(),
            total_zones: zones.len(),
        },
        zones,
    };

    let size_bytes = write_json(&dir.join(OUTPUT_ZONES), &file)?;
    Ok(FileEntry {
        description: "Zone records (pass-through)".to_string(),
        records: zones.len(),
        size_bytes,
    })
}

/// Writes `iso3-lookup.json` with the sorted code list in its metadata.
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or the write fails.
pub fn write_iso3_lookup(
    dir: &Path,
    lookup: &BTreeMap<String, Country>,
) -> Result<FileEntry, GenerateError> {
    let file = LookupFile {
        metadata: LookupMetadata {
            generated_at: now_rfc3339(),
            total_mappings: lookup.len(),
            // BTreeMap iteration is already code-sorted.
            available_iso3_codes: lookup.keys().cloned().collect(),
        },
        lookup,
    };

    let size_bytes = write_json(&dir.join(OUTPUT_ISO3_LOOKUP), &file)?;
    Ok(FileEntry {
        description: "ISO A3 code to country lookup".to_string(),
        records: lookup.len(),
        size_bytes,
    })
}

/// Writes a `FeatureCollection` artifact verbatim (GeoJSON files carry no
/// envelope so they stay standards-conforming).
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or the write fails.
pub fn write_feature_collection(
    dir: &Path,
    name: &str,
    collection: &FeatureCollection,
    description: &str,
) -> Result<FileEntry, GenerateError> {
    let size_bytes = write_json(&dir.join(name), collection)?;
    Ok(FileEntry {
        description: description.to_string(),
        records: collection.features.len(),
        size_bytes,
    })
}

/// Serializes a value as pretty-printed JSON and writes it whole.
/// Serialization happens fully in memory before the file is touched.
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or the write fails.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<u64, GenerateError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, &bytes)?;
    Ok(bytes.len() as u64)
}

/// Computes the aggregate statistics block from the entity sets.
#[must_use]
pub fn statistics(
    countries: &[Country],
    borders: &[Border],
    border_posts: &[BorderPost],
    zones: &[Value],
) -> Statistics {
    Statistics {
        total_countries: countries.len(),
        countries_with_iso3: countries.iter().filter(|c| c.iso_a3.is_some()).count(),
        countries_with_borders: countries.iter().filter(|c| c.has_borders()).count(),
        total_borders: borders.len(),
        // Geometry is mandatory by construction for both entity kinds.
        borders_with_geometry: borders.len(),
        total_border_posts: border_posts.len(),
        border_posts_with_geometry: border_posts.len(),
        total_zones: zones.len(),
    }
}

/// Current UTC timestamp for `generatedAt` stamps.
#[must_use]
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
