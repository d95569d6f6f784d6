//! FeatureCollection assembly, coordinate precision reduction, and
//! chunking.
//!
//! Precision reduction trades geometric fidelity for payload size: six
//! decimal digits is roughly 0.1 m at the equator, far below anything a
//! web map renders. Chunking bounds the size of any single static payload
//! so the front-end can load large border sets progressively.

use border_map_geodata_models::{Border, BorderPost};
use geojson::{Feature, FeatureCollection, Geometry, Value};

/// Default number of decimal digits kept by [`optimize`].
pub const DEFAULT_PRECISION: u32 = 6;

/// Default feature-count threshold above which [`chunk`] splits a
/// collection.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Builds a FeatureCollection from normalized borders.
#[must_use]
pub fn border_feature_collection(borders: &[Border]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: borders.iter().map(Border::feature).collect(),
        foreign_members: None,
    }
}

/// Builds a FeatureCollection from normalized border posts.
#[must_use]
pub fn border_post_feature_collection(border_posts: &[BorderPost]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: border_posts.iter().map(BorderPost::feature).collect(),
        foreign_members: None,
    }
}

/// Returns a copy of the collection with every coordinate rounded to
/// `precision` decimal digits, recursing through nested position lists
/// and through `GeometryCollection` members.
#[must_use]
pub fn optimize(collection: &FeatureCollection, precision: u32) -> FeatureCollection {
    FeatureCollection {
        bbox: collection.bbox.clone(),
        features: collection
            .features
            .iter()
            .map(|feature| Feature {
                geometry: feature
                    .geometry
                    .as_ref()
                    .map(|geometry| round_geometry(geometry, precision)),
                ..feature.clone()
            })
            .collect(),
        foreign_members: collection.foreign_members.clone(),
    }
}

/// Splits a collection into contiguous groups of at most `chunk_size`
/// features. Returns an empty vector when the collection fits inside a
/// single chunk (no chunk artifacts are produced at or below the
/// threshold) or when `chunk_size` is zero.
#[must_use]
pub fn chunk(collection: &FeatureCollection, chunk_size: usize) -> Vec<FeatureCollection> {
    if chunk_size == 0 || collection.features.len() <= chunk_size {
        return Vec::new();
    }

    collection
        .features
        .chunks(chunk_size)
        .map(|features| FeatureCollection {
            bbox: None,
            features: features.to_vec(),
            foreign_members: None,
        })
        .collect()
}

fn round_geometry(geometry: &Geometry, precision: u32) -> Geometry {
    let value = match &geometry.value {
        Value::Point(position) => Value::Point(round_position(position, precision)),
        Value::MultiPoint(positions) => Value::MultiPoint(round_positions(positions, precision)),
        Value::LineString(positions) => Value::LineString(round_positions(positions, precision)),
        Value::MultiLineString(lines) => Value::MultiLineString(round_lines(lines, precision)),
        Value::Polygon(rings) => Value::Polygon(round_lines(rings, precision)),
        Value::MultiPolygon(polygons) => Value::MultiPolygon(
            polygons
                .iter()
                .map(|rings| round_lines(rings, precision))
                .collect(),
        ),
        Value::GeometryCollection(geometries) => Value::GeometryCollection(
            geometries
                .iter()
                .map(|member| round_geometry(member, precision))
                .collect(),
        ),
    };

    Geometry {
        bbox: geometry.bbox.clone(),
        value,
        foreign_members: geometry.foreign_members.clone(),
    }
}

fn round_lines(lines: &[Vec<Vec<f64>>], precision: u32) -> Vec<Vec<Vec<f64>>> {
    lines
        .iter()
        .map(|positions| round_positions(positions, precision))
        .collect()
}

fn round_positions(positions: &[Vec<f64>], precision: u32) -> Vec<Vec<f64>> {
    positions
        .iter()
        .map(|position| round_position(position, precision))
        .collect()
}

fn round_position(position: &[f64], precision: u32) -> Vec<f64> {
    position
        .iter()
        .map(|&coordinate| round_coordinate(coordinate, precision))
        .collect()
}

#[allow(clippy::cast_possible_wrap)]
fn round_coordinate(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
