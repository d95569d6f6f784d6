#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalized geographic reference entity types.
//!
//! These are the canonical shapes produced by the normalization pipeline
//! from loosely-typed document-store records. Every entity is constructed
//! fresh per pipeline run and never mutated afterwards; the static file
//! generator consumes them as-is.

use std::collections::BTreeMap;

use geojson::{Feature, Geometry, JsonObject, feature::Id};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An open-ended raw document as fetched from the document store.
///
/// Field names and casing vary across historical schema versions, so raw
/// records stay untyped until the normalizer maps them onto an entity.
pub type RawRecord = JsonObject;

/// Display name used when a country record carries no name at all.
pub const UNKNOWN_COUNTRY_NAME: &str = "Unknown Country";

/// Lowest valid `is_open` status code for a border post.
pub const IS_OPEN_MIN: i64 = -1;

/// Highest valid `is_open` status code for a border post.
pub const IS_OPEN_MAX: i64 = 3;

/// Status code written into feature properties when a border post record
/// carries no `is_open` value. The exact status meanings live in the
/// front-end configuration; the pipeline treats them as opaque.
pub const IS_OPEN_UNKNOWN: i64 = -1;

/// A normalized country record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Stable identifier (ISO A3 or internal key). Unique in the dataset.
    pub id: String,
    /// Three-letter uppercase ISO code, if the record carried a valid one.
    pub iso_a3: Option<String>,
    /// Display name; [`UNKNOWN_COUNTRY_NAME`] when the record had none.
    pub name: String,
    /// Cleaned key/value metadata (sanitized keys, no null/empty values).
    pub parameters: BTreeMap<String, Value>,
    /// Ordered border entity ids this country references. May be empty.
    pub border_ids: Vec<String>,
}

impl Country {
    /// Returns `true` if this country references at least one border.
    #[must_use]
    pub fn has_borders(&self) -> bool {
        !self.border_ids.is_empty()
    }
}

/// A normalized border record with parsed geometry.
///
/// Records whose geometry string fails to parse never become a `Border` —
/// geometry is mandatory by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    /// Stable identifier.
    pub id: String,
    /// Parsed GeoJSON geometry (any of the seven kinds).
    pub geometry: Geometry,
    /// Cleaned key/value metadata carried into feature properties.
    pub properties: JsonObject,
}

impl Border {
    /// Builds the GeoJSON Feature for this border.
    #[must_use]
    pub fn feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(self.geometry.clone()),
            id: Some(Id::String(self.id.clone())),
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

/// A normalized border post (crossing point) with a parsed Point location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderPost {
    /// Stable identifier.
    pub id: String,
    /// Parsed GeoJSON Point (lng ∈ [-180, 180], lat ∈ [-90, 90]).
    pub geometry: Geometry,
    /// Opaque status code, valid range [`IS_OPEN_MIN`]..=[`IS_OPEN_MAX`].
    /// Out-of-range values are kept and reported as a data-quality issue.
    pub is_open: Option<i64>,
    /// Cleaned key/value metadata carried into feature properties.
    pub properties: JsonObject,
}

impl BorderPost {
    /// Returns `true` if `is_open` is absent or inside the valid range.
    #[must_use]
    pub fn is_open_in_range(&self) -> bool {
        self.is_open
            .is_none_or(|v| (IS_OPEN_MIN..=IS_OPEN_MAX).contains(&v))
    }

    /// Builds the GeoJSON Feature for this border post.
    ///
    /// The `is_open` property is always present in the output, defaulting
    /// to [`IS_OPEN_UNKNOWN`] when the record carried no status.
    #[must_use]
    pub fn feature(&self) -> Feature {
        let mut properties = self.properties.clone();
        properties.insert(
            "is_open".to_string(),
            Value::from(self.is_open.unwrap_or(IS_OPEN_UNKNOWN)),
        );

        Feature {
            bbox: None,
            geometry: Some(self.geometry.clone()),
            id: Some(Id::String(self.id.clone())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Advisory data-quality report produced by cross-reference validation.
///
/// Issues never halt a build on their own; the orchestrator decides
/// whether accumulated issues fail the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// `true` iff no issues were recorded.
    pub is_valid: bool,
    /// Human-readable issue descriptions.
    pub issues: Vec<String>,
}

impl ValidationReport {
    /// Builds a report from accumulated issue strings.
    #[must_use]
    pub fn from_issues(issues: Vec<String>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Value as GeomValue;

    fn point(lng: f64, lat: f64) -> Geometry {
        Geometry::new(GeomValue::Point(vec![lng, lat]))
    }

    #[test]
    fn border_post_feature_defaults_is_open() {
        let post = BorderPost {
            id: "bp1".to_string(),
            geometry: point(2.35, 48.85),
            is_open: None,
            properties: JsonObject::new(),
        };

        let feature = post.feature();
        let props = feature.properties.unwrap();
        assert_eq!(props.get("is_open"), Some(&Value::from(IS_OPEN_UNKNOWN)));
    }

    #[test]
    fn border_post_feature_keeps_explicit_is_open() {
        let post = BorderPost {
            id: "bp2".to_string(),
            geometry: point(2.35, 48.85),
            is_open: Some(2),
            properties: JsonObject::new(),
        };

        let props = post.feature().properties.unwrap();
        assert_eq!(props.get("is_open"), Some(&Value::from(2)));
    }

    #[test]
    fn is_open_range_check() {
        let mut post = BorderPost {
            id: "bp3".to_string(),
            geometry: point(0.0, 0.0),
            is_open: Some(5),
            properties: JsonObject::new(),
        };
        assert!(!post.is_open_in_range());

        post.is_open = Some(-1);
        assert!(post.is_open_in_range());

        post.is_open = None;
        assert!(post.is_open_in_range());
    }

    #[test]
    fn border_feature_carries_id_and_geometry() {
        let border = Border {
            id: "b1".to_string(),
            geometry: point(1.0, 2.0),
            properties: JsonObject::new(),
        };

        let feature = border.feature();
        assert_eq!(feature.id, Some(Id::String("b1".to_string())));
        assert_eq!(feature.geometry, Some(point(1.0, 2.0)));
    }

    #[test]
    fn validation_report_from_issues() {
        assert!(ValidationReport::from_issues(Vec::new()).is_valid);

        let report = ValidationReport::from_issues(vec!["bad".to_string()]);
        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 1);
    }
}
