//! Structural re-validation of written GeoJSON artifacts.
//!
//! A belt-and-braces pass run after generation (or on demand via the CLI):
//! re-reads each artifact and checks the GeoJSON skeleton — recognized
//! `type`, `features` array, and per-feature `type`/`geometry`/`properties`
//! members. Findings are returned as strings; only an unreadable file is
//! an error.

use std::path::Path;

use serde_json::Value;

use crate::GenerateError;

/// GeoJSON types accepted at an artifact's top level.
const TOP_LEVEL_TYPES: &[&str] = &[
    "FeatureCollection",
    "Feature",
    "Point",
    "LineString",
    "Polygon",
    "MultiPoint",
    "MultiLineString",
    "MultiPolygon",
    "GeometryCollection",
];

/// Outcome of verifying a single artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// Number of features inspected (0 for non-collections).
    pub features: usize,
    /// Structural problems found; empty means the artifact is valid.
    pub errors: Vec<String>,
}

impl VerifyOutcome {
    /// `true` iff no structural problems were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Verifies a GeoJSON artifact on disk.
///
/// # Errors
///
/// Returns [`GenerateError`] only if the file cannot be read; every other
/// problem (including non-JSON content) lands in the outcome's error list.
pub fn verify_geojson_file(path: &Path) -> Result<VerifyOutcome, GenerateError> {
    let raw = std::fs::read(path)?;

    let value: Value = match serde_json::from_slice(&raw) {
        Ok(value) => value,
        Err(e) => {
            return Ok(VerifyOutcome {
                features: 0,
                errors: vec![format!("invalid JSON: {e}")],
            });
        }
    };

    Ok(verify_geojson_value(&value))
}

/// Verifies an in-memory GeoJSON document.
#[must_use]
pub fn verify_geojson_value(value: &Value) -> VerifyOutcome {
    let mut errors = Vec::new();
    let mut features = 0;

    let kind = match value.get("type").and_then(Value::as_str) {
        Some(kind) => {
            if !TOP_LEVEL_TYPES.contains(&kind) {
                errors.push(format!("invalid type: {kind}"));
            }
            kind
        }
        None => {
            errors.push("missing 'type' property".to_string());
            ""
        }
    };

    match kind {
        "FeatureCollection" => match value.get("features").and_then(Value::as_array) {
            Some(items) => {
                features = items.len();
                for (index, feature) in items.iter().enumerate() {
                    check_feature(feature, index, &mut errors);
                }
            }
            None => errors.push("FeatureCollection missing 'features' array".to_string()),
        },
        "Feature" => check_feature(value, 0, &mut errors),
        _ => {}
    }

    VerifyOutcome { features, errors }
}

fn check_feature(feature: &Value, index: usize, errors: &mut Vec<String>) {
    match feature.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        Some(other) => errors.push(format!("feature {index} has invalid type: {other}")),
        None => errors.push(format!("feature {index} missing 'type' property")),
    }

    match feature.get("geometry") {
        None => errors.push(format!("feature {index} missing 'geometry' property")),
        Some(Value::Null) => {
            // Legal GeoJSON, but worth surfacing — the pipeline never
            // produces features without geometry.
            log::warn!("feature {index} has null geometry");
        }
        Some(geometry) => {
            if geometry.get("type").and_then(Value::as_str).is_none() {
                errors.push(format!("feature {index} geometry missing 'type' property"));
            }
            if geometry.get("coordinates").is_none() && geometry.get("geometries").is_none() {
                errors.push(format!(
                    "feature {index} geometry missing 'coordinates' property"
                ));
            } else if let Some(coordinates) = geometry.get("coordinates") {
                if !coordinates.is_array() {
                    errors.push(format!("feature {index} geometry coordinates is not an array"));
                }
            }
        }
    }

    if feature.get("properties").is_none() {
        errors.push(format!("feature {index} missing 'properties' property"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_feature_collection_passes() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [2.35, 48.85]},
                "properties": {"name": "crossing"}
            }]
        });

        let outcome = verify_geojson_value(&value);
        assert!(outcome.is_valid());
        assert_eq!(outcome.features, 1);
    }

    #[test]
    fn missing_type_is_reported() {
        let outcome = verify_geojson_value(&json!({"features": []}));
        assert!(!outcome.is_valid());
        assert!(outcome.errors[0].contains("missing 'type'"));
    }

    #[test]
    fn unrecognized_top_level_type_is_reported() {
        let outcome = verify_geojson_value(&json!({"type": "Circle"}));
        assert!(outcome.errors.iter().any(|e| e.contains("invalid type")));
    }

    #[test]
    fn feature_problems_are_reported_with_index() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [0.0, 0.0]},
                    "properties": {}
                },
                {"type": "Feature", "properties": {}}
            ]
        });

        let outcome = verify_geojson_value(&value);
        assert_eq!(outcome.errors, vec!["feature 1 missing 'geometry' property"]);
    }

    #[test]
    fn geometry_collection_feature_is_accepted() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "GeometryCollection",
                    "geometries": [{"type": "Point", "coordinates": [1.0, 2.0]}]
                },
                "properties": {}
            }]
        });

        assert!(verify_geojson_value(&value).is_valid());
    }

    #[test]
    fn non_array_coordinates_are_reported() {
        let value = json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": "2.35,48.85"},
            "properties": {}
        });

        let outcome = verify_geojson_value(&value);
        assert!(
            outcome
                .errors
                .iter()
                .any(|e| e.contains("coordinates is not an array"))
        );
    }

    #[test]
    fn unreadable_json_file_yields_error_entry() {
        let path = std::env::temp_dir().join(format!(
            "border-map-verify-bad-{}.geojson",
            std::process::id()
        ));
        std::fs::write(&path, "{not valid json").unwrap();

        let outcome = verify_geojson_file(&path).unwrap();
        assert!(!outcome.is_valid());
        assert!(outcome.errors[0].contains("invalid JSON"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn freshly_written_artifact_verifies_clean() {
        use crate::assemble::border_post_feature_collection;
        use border_map_geodata_models::BorderPost;
        use geojson::{Geometry, JsonObject};

        let dir = std::env::temp_dir().join(format!(
            "border-map-verify-clean-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();

        let posts = vec![BorderPost {
            id: "p1".to_string(),
            geometry: Geometry::new(geojson::Value::Point(vec![2.35, 48.85])),
            is_open: None,
            properties: JsonObject::new(),
        }];
        let collection = border_post_feature_collection(&posts);
        let path = dir.join("border-posts.geojson");
        crate::write_json(&path, &collection).unwrap();

        let outcome = verify_geojson_file(&path).unwrap();
        assert!(outcome.is_valid(), "errors: {:?}", outcome.errors);
        assert_eq!(outcome.features, 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
