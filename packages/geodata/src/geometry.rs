//! GeoJSON geometry parsing for border and border-post records.
//!
//! Both entry points are total: malformed input logs a warning and yields
//! `None` instead of propagating an error, so the normalizer can drop the
//! offending record and keep going.

use geojson::Geometry;
use serde_json::Value;

/// The seven geometry kinds recognized by the GeoJSON specification.
pub const GEOMETRY_TYPES: &[&str] = &[
    "Point",
    "LineString",
    "Polygon",
    "MultiPoint",
    "MultiLineString",
    "MultiPolygon",
    "GeometryCollection",
];

/// Accepted property names for a longitude value on keyed location objects.
const LNG_KEYS: &[&str] = &["lng", "longitude", "lon"];

/// Accepted property names for a latitude value on keyed location objects.
const LAT_KEYS: &[&str] = &["lat", "latitude"];

/// Parses a JSON-encoded GeoJSON geometry string as stored on border
/// records.
///
/// The value must decode to an object whose `type` is one of the seven
/// GeoJSON geometry kinds, with a `coordinates` member present for every
/// kind except `GeometryCollection`. Anything else yields `None` with a
/// logged warning.
#[must_use]
pub fn parse_geometry(raw: &str) -> Option<Geometry> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Geometry string is not valid JSON: {e}");
            return None;
        }
    };

    let Some(object) = value.as_object() else {
        log::warn!("Geometry JSON is not an object");
        return None;
    };

    let Some(kind) = object.get("type").and_then(Value::as_str) else {
        log::warn!("Geometry object has no 'type' string");
        return None;
    };

    if !GEOMETRY_TYPES.contains(&kind) {
        log::warn!("Unrecognized geometry type '{kind}'");
        return None;
    }

    if kind != "GeometryCollection" && !object.contains_key("coordinates") {
        log::warn!("Geometry of type '{kind}' has no 'coordinates' member");
        return None;
    }

    match serde_json::from_value::<Geometry>(value) {
        Ok(geometry) => Some(geometry),
        Err(e) => {
            log::warn!("Geometry failed to decode: {e}");
            None
        }
    }
}

/// Parses a border-post location into a canonical GeoJSON Point.
///
/// Location encodings vary across schema versions; the accepted shapes are:
///
/// - a canonical `{"type": "Point", "coordinates": [lng, lat]}` object
/// - a bare `[lng, lat]` array (extra elements ignored)
/// - a JSON string decoding to either of the above (one level deep only)
/// - an object with any of `lng`/`longitude`/`lon` and `lat`/`latitude`
///
/// Coordinate values may be JSON numbers or numeric strings (the upstream
/// store holds latitudes as strings). Both values must be finite, with
/// longitude in [-180, 180] and latitude in [-90, 90].
#[must_use]
pub fn parse_point_geometry(location: &Value) -> Option<Geometry> {
    let Some((lng, lat)) = extract_lng_lat(location, 0) else {
        log::warn!("Unrecognized location encoding: {location}");
        return None;
    };

    if !coordinates_in_range(lng, lat) {
        log::warn!("Location coordinates out of range: lng={lng}, lat={lat}");
        return None;
    }

    Some(Geometry::new(geojson::Value::Point(vec![lng, lat])))
}

/// Returns `true` iff both values are finite and within WGS84 bounds.
#[must_use]
pub fn coordinates_in_range(lng: f64, lat: f64) -> bool {
    lng.is_finite() && lat.is_finite() && (-180.0..=180.0).contains(&lng) && (-90.0..=90.0).contains(&lat)
}

/// Structural dispatch over the location encodings. The `depth` guard
/// bounds string recursion to a single decode so a string containing
/// another JSON string cannot loop.
fn extract_lng_lat(location: &Value, depth: u8) -> Option<(f64, f64)> {
    match location {
        Value::Array(items) => pair_from_slice(items),
        Value::Object(object) => {
            if object.get("type").and_then(Value::as_str) == Some("Point") {
                return pair_from_slice(object.get("coordinates")?.as_array()?);
            }

            let lng = LNG_KEYS.iter().find_map(|key| object.get(*key))?;
            let lat = LAT_KEYS.iter().find_map(|key| object.get(*key))?;
            Some((coordinate_value(lng)?, coordinate_value(lat)?))
        }
        Value::String(raw) if depth == 0 => {
            let decoded: Value = serde_json::from_str(raw).ok()?;
            extract_lng_lat(&decoded, depth + 1)
        }
        _ => None,
    }
}

/// Reads `[lng, lat, ...]` out of a coordinate slice, ignoring anything
/// past the first two elements (altitude etc.).
fn pair_from_slice(items: &[Value]) -> Option<(f64, f64)> {
    if items.len() < 2 {
        return None;
    }
    Some((coordinate_value(&items[0])?, coordinate_value(&items[1])?))
}

/// Coerces a JSON number or numeric string into an `f64`.
fn coordinate_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_valid_geometry_round_trip() {
        let original = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        });

        let geometry = parse_geometry(&original.to_string()).unwrap();
        assert_eq!(serde_json::to_value(&geometry).unwrap(), original);
    }

    #[test]
    fn parses_geometry_collection_without_coordinates() {
        let raw = json!({
            "type": "GeometryCollection",
            "geometries": [{"type": "Point", "coordinates": [2.0, 3.0]}]
        })
        .to_string();

        let geometry = parse_geometry(&raw).unwrap();
        assert!(matches!(geometry.value, geojson::Value::GeometryCollection(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(parse_geometry("not json at all").is_none());
    }

    #[test]
    fn rejects_unrecognized_type() {
        assert!(parse_geometry(r#"{"type": "Circle", "coordinates": [0, 0]}"#).is_none());
    }

    #[test]
    fn rejects_missing_coordinates() {
        assert!(parse_geometry(r#"{"type": "Point"}"#).is_none());
    }

    #[test]
    fn rejects_non_object_geometry() {
        assert!(parse_geometry("[1, 2, 3]").is_none());
    }

    #[test]
    fn accepts_bare_coordinate_pair() {
        let geometry = parse_point_geometry(&json!([2.35, 48.85])).unwrap();
        assert_eq!(geometry.value, geojson::Value::Point(vec![2.35, 48.85]));
    }

    #[test]
    fn accepts_canonical_point_object() {
        let geometry =
            parse_point_geometry(&json!({"type": "Point", "coordinates": [2.35, 48.85]})).unwrap();
        assert_eq!(geometry.value, geojson::Value::Point(vec![2.35, 48.85]));
    }

    #[test]
    fn accepts_lat_lng_object_aliases() {
        for lng_key in ["lng", "longitude", "lon"] {
            for lat_key in ["lat", "latitude"] {
                let location = json!({lng_key: 2.35, lat_key: 48.85});
                let geometry = parse_point_geometry(&location).unwrap();
                assert_eq!(geometry.value, geojson::Value::Point(vec![2.35, 48.85]));
            }
        }
    }

    #[test]
    fn accepts_json_encoded_string_location() {
        let geometry = parse_point_geometry(&json!("[2.35, 48.85]")).unwrap();
        assert_eq!(geometry.value, geojson::Value::Point(vec![2.35, 48.85]));
    }

    #[test]
    fn accepts_string_coordinate_values() {
        let location = json!({"latitude": "46.545927", "longitude": "48.637239"});
        let geometry = parse_point_geometry(&location).unwrap();
        assert_eq!(
            geometry.value,
            geojson::Value::Point(vec![48.637239, 46.545927])
        );
    }

    #[test]
    fn rejects_out_of_range_longitude() {
        assert!(parse_point_geometry(&json!([200.0, 48.85])).is_none());
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(parse_point_geometry(&json!([2.35, 95.0])).is_none());
    }

    #[test]
    fn rejects_non_numeric_string() {
        assert!(parse_point_geometry(&json!("not json")).is_none());
    }

    #[test]
    fn rejects_doubly_encoded_string() {
        // A string whose decoded value is yet another string must not recurse.
        let nested = serde_json::to_string("[2.35, 48.85]").unwrap();
        assert!(parse_point_geometry(&Value::String(nested)).is_none());
    }

    #[test]
    fn rejects_short_coordinate_array() {
        assert!(parse_point_geometry(&json!([2.35])).is_none());
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(!coordinates_in_range(f64::NAN, 0.0));
        assert!(!coordinates_in_range(0.0, f64::INFINITY));
        assert!(coordinates_in_range(-180.0, 90.0));
    }
}
