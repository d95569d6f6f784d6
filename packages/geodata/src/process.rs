//! Raw record normalization for countries, borders, and border posts.
//!
//! Field-name drift across schema versions is handled with ordered alias
//! tables: each canonical field lists the raw field paths to try, in
//! priority order, as plain data. Records missing their identity fields or
//! valid geometry are logged and skipped; everything else flows through.

use std::collections::HashSet;
use std::sync::LazyLock;

use border_map_geodata_models::{
    Border, BorderPost, Country, RawRecord, UNKNOWN_COUNTRY_NAME,
};
use geojson::JsonObject;
use regex::Regex;
use serde_json::Value;

use crate::geometry::{parse_geometry, parse_point_geometry};
use crate::params::{clean_parameters, trim_nested_keys};

/// Identity field aliases, document-store key first.
const ID_FIELDS: &[&str] = &["id", "_id"];

/// Display-name aliases for country records.
const NAME_FIELDS: &[&str] = &["name", "country_name", "title"];

/// ISO A3 aliases, tried directly on the record and then inside each
/// nested parameter container.
const ISO_A3_FIELDS: &[&str] = &["iso_a3", "iso3", "ISO_A3", "ISO3", "iso_a3_code"];

/// Nested containers that historically held the ISO code.
const PARAMETER_CONTAINERS: &[&str] = &["parameters", "params", "properties"];

/// Border-id list aliases for country records.
const BORDER_ID_FIELDS: &[&str] = &["border_ids", "borderIds", "borders"];

/// Serialized-geometry aliases for border records.
const GEOMETRY_FIELDS: &[&str] = &["geometry", "geom", "geojson"];

/// Location aliases for border-post records.
const LOCATION_FIELDS: &[&str] = &["location", "coordinates", "position"];

/// Status-code aliases for border-post records.
const IS_OPEN_FIELDS: &[&str] = &["is_open", "isOpen", "status"];

static ISO_A3_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Z]{3}$").expect("valid ISO A3 pattern"));

/// Normalizes and validates a candidate ISO A3 code.
///
/// The input is trimmed and upper-cased, then matched against `^[A-Z]{3}$`.
/// Returns the canonical code, or `None` for anything that does not match
/// (too short, too long, digits, etc.).
#[must_use]
pub fn validate_iso_a3(raw: &str) -> Option<String> {
    let candidate = raw.trim().to_uppercase();
    ISO_A3_PATTERN.is_match(&candidate).then_some(candidate)
}

/// Normalizes raw country documents.
///
/// Records without an id are skipped. Invalid ISO A3 values are cleared
/// (the record itself is kept). Duplicate ISO A3 codes are logged only;
/// deduplication happens later in the lookup builder, first claimant wins.
#[must_use]
pub fn process_country_data(raw_countries: &[RawRecord]) -> Vec<Country> {
    let mut countries = Vec::with_capacity(raw_countries.len());
    let mut seen_codes: HashSet<String> = HashSet::new();

    for record in raw_countries {
        let Some(id) = record_id(record) else {
            log::warn!("Skipping country record without an id");
            continue;
        };

        let iso_a3 = resolve_iso_a3(record, &id);
        if let Some(code) = &iso_a3 {
            if !seen_codes.insert(code.clone()) {
                log::warn!("Duplicate ISO A3 code {code} claimed by country {id}");
            }
        }

        let name = first_string(record, NAME_FIELDS)
            .unwrap_or_else(|| UNKNOWN_COUNTRY_NAME.to_string());

        countries.push(Country {
            border_ids: resolve_border_ids(record),
            parameters: clean_parameters(&country_metadata(record)),
            id,
            iso_a3,
            name,
        });
    }

    log::info!(
        "Processed {}/{} country records",
        countries.len(),
        raw_countries.len()
    );
    countries
}

/// Normalizes raw border documents.
///
/// Records without an id or a serialized geometry string are skipped, as
/// are records whose geometry fails to parse — geometry is mandatory for
/// borders, so the processed count may be lower than the raw count.
#[must_use]
pub fn process_border_data(raw_borders: &[RawRecord]) -> Vec<Border> {
    let mut borders = Vec::with_capacity(raw_borders.len());

    for record in raw_borders {
        let Some(id) = record_id(record) else {
            log::warn!("Skipping border record without an id");
            continue;
        };

        let Some(geometry_raw) = first_string(record, GEOMETRY_FIELDS) else {
            log::warn!("Skipping border {id}: no geometry field");
            continue;
        };

        let Some(geometry) = parse_geometry(&geometry_raw) else {
            log::warn!("Dropping border {id}: geometry failed to parse");
            continue;
        };

        let mut properties: JsonObject = clean_parameters(&extra_fields(record, BORDER_CONSUMED_FIELDS))
            .into_iter()
            .collect();
        trim_nested_keys(&mut properties, "border_posts");

        borders.push(Border {
            id,
            geometry,
            properties,
        });
    }

    log::info!(
        "Processed {}/{} border records",
        borders.len(),
        raw_borders.len()
    );
    borders
}

/// Normalizes raw border-post documents.
///
/// Records without an id or location are skipped, as are records whose
/// location fails to parse into an in-range Point. Out-of-range `is_open`
/// values are kept (validation reports them as advisory issues).
#[must_use]
pub fn process_border_post_data(raw_border_posts: &[RawRecord]) -> Vec<BorderPost> {
    let mut border_posts = Vec::with_capacity(raw_border_posts.len());

    for record in raw_border_posts {
        let Some(id) = record_id(record) else {
            log::warn!("Skipping border post record without an id");
            continue;
        };

        let Some(location) = LOCATION_FIELDS.iter().find_map(|field| record.get(*field)) else {
            log::warn!("Skipping border post {id}: no location field");
            continue;
        };

        let Some(geometry) = parse_point_geometry(location) else {
            log::warn!("Dropping border post {id}: location failed to parse");
            continue;
        };

        let is_open = IS_OPEN_FIELDS
            .iter()
            .find_map(|field| record.get(*field))
            .and_then(status_code);

        border_posts.push(BorderPost {
            properties: clean_parameters(&extra_fields(record, BORDER_POST_CONSUMED_FIELDS))
                .into_iter()
                .collect(),
            id,
            geometry,
            is_open,
        });
    }

    log::info!(
        "Processed {}/{} border post records",
        border_posts.len(),
        raw_border_posts.len()
    );
    border_posts
}

/// Fields consumed into canonical `Country` fields and therefore excluded
/// from the parameters map.
const COUNTRY_CONSUMED_FIELDS: &[&str] = &[
    "id",
    "_id",
    "name",
    "country_name",
    "title",
    "iso_a3",
    "iso3",
    "ISO_A3",
    "ISO3",
    "iso_a3_code",
    "border_ids",
    "borderIds",
    "borders",
    "parameters",
    "params",
    "properties",
];

/// Fields consumed into canonical `Border` fields.
const BORDER_CONSUMED_FIELDS: &[&str] = &["id", "_id", "geometry", "geom", "geojson"];

/// Fields consumed into canonical `BorderPost` fields.
const BORDER_POST_CONSUMED_FIELDS: &[&str] = &[
    "id",
    "_id",
    "location",
    "coordinates",
    "position",
    "is_open",
    "isOpen",
    "status",
];

/// Resolves a record's stable identifier. Accepts strings and integers
/// (the store's older collections used numeric ids).
fn record_id(record: &RawRecord) -> Option<String> {
    ID_FIELDS.iter().find_map(|field| match record.get(*field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Resolves the ISO A3 code: direct fields first, then the same aliases
/// inside each nested parameter container. Invalid formats clear the field
/// with a warning rather than keeping a malformed code.
fn resolve_iso_a3(record: &RawRecord, id: &str) -> Option<String> {
    let candidate = first_string(record, ISO_A3_FIELDS).or_else(|| {
        PARAMETER_CONTAINERS.iter().find_map(|container| {
            record
                .get(*container)
                .and_then(Value::as_object)
                .and_then(|nested| first_string(nested, ISO_A3_FIELDS))
        })
    })?;

    let validated = validate_iso_a3(&candidate);
    if validated.is_none() {
        log::warn!("Country {id}: discarding malformed ISO A3 value '{candidate}'");
    }
    validated
}

/// Resolves the ordered border-id list, accepting string or numeric
/// elements and skipping anything else.
fn resolve_border_ids(record: &RawRecord) -> Vec<String> {
    BORDER_ID_FIELDS
        .iter()
        .find_map(|field| record.get(*field).and_then(Value::as_array))
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) if !s.is_empty() => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// First non-empty string among the given field aliases.
fn first_string(record: &JsonObject, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        record
            .get(*field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Extracts an `is_open` status code from a number or numeric string.
fn status_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Gathers a country record's metadata: the contents of any nested
/// parameter container first, then top-level leftover fields (which win on
/// key collision, being written later).
fn country_metadata(record: &RawRecord) -> JsonObject {
    let mut metadata = JsonObject::new();

    for container in PARAMETER_CONTAINERS {
        if let Some(nested) = record.get(*container).and_then(Value::as_object) {
            for (key, value) in nested {
                if !ISO_A3_FIELDS.contains(&key.as_str()) {
                    metadata.insert(key.clone(), value.clone());
                }
            }
        }
    }

    for (key, value) in extra_fields(record, COUNTRY_CONSUMED_FIELDS) {
        metadata.insert(key, value);
    }

    metadata
}

/// Collects the record's leftover fields (everything not consumed into a
/// canonical field) for the parameters map.
fn extra_fields(record: &RawRecord, consumed: &[&str]) -> JsonObject {
    record
        .iter()
        .filter(|(key, _)| !consumed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
