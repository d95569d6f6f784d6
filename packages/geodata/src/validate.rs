//! Cross-reference validation and ISO3 lookup construction.
//!
//! Every check here is advisory: findings become human-readable strings in
//! a [`ValidationReport`] and never abort processing. The orchestrator
//! decides whether accumulated issues fail a build.

use std::collections::{BTreeMap, HashSet};

use border_map_geodata_models::{Border, BorderPost, Country, ValidationReport};
use geojson::Geometry;

/// Builds the ISO A3 → country lookup from countries carrying a valid
/// code. On duplicate codes the first claimant wins; later claimants are
/// simply not inserted (duplicates surface through
/// [`validate_processed_data`]).
#[must_use]
pub fn create_iso3_lookup(countries: &[Country]) -> BTreeMap<String, Country> {
    let mut lookup: BTreeMap<String, Country> = BTreeMap::new();

    for country in countries {
        if let Some(code) = &country.iso_a3 {
            lookup
                .entry(code.clone())
                .or_insert_with(|| country.clone());
        }
    }

    lookup
}

/// Runs the advisory data-quality checks over the processed entity sets.
///
/// Checks: countries without ISO A3, duplicate ISO A3 codes, borders with
/// degenerate (empty) geometry, border posts with degenerate geometry,
/// border posts with an out-of-range `is_open`, and orphan borders that no
/// country references. `is_valid` is `true` iff nothing was found.
#[must_use]
pub fn validate_processed_data(
    countries: &[Country],
    borders: &[Border],
    border_posts: Option<&[BorderPost]>,
) -> ValidationReport {
    let mut issues = Vec::new();

    let missing_iso3 = countries.iter().filter(|c| c.iso_a3.is_none()).count();
    if missing_iso3 > 0 {
        issues.push(format!(
            "{missing_iso3} countries are missing an ISO A3 code"
        ));
    }

    let codes: Vec<&str> = countries
        .iter()
        .filter_map(|c| c.iso_a3.as_deref())
        .collect();
    let unique_codes: HashSet<&str> = codes.iter().copied().collect();
    if codes.len() != unique_codes.len() {
        issues.push(format!(
            "{} duplicate ISO A3 codes across countries",
            codes.len() - unique_codes.len()
        ));
    }

    let empty_borders = borders
        .iter()
        .filter(|b| geometry_is_empty(&b.geometry))
        .count();
    if empty_borders > 0 {
        issues.push(format!("{empty_borders} borders have empty geometry"));
    }

    if let Some(posts) = border_posts {
        let empty_posts = posts
            .iter()
            .filter(|p| geometry_is_empty(&p.geometry))
            .count();
        if empty_posts > 0 {
            issues.push(format!("{empty_posts} border posts have empty geometry"));
        }

        let bad_status = posts.iter().filter(|p| !p.is_open_in_range()).count();
        if bad_status > 0 {
            issues.push(format!(
                "{bad_status} border posts have an out-of-range is_open status"
            ));
        }
    }

    let referenced: HashSet<&str> = countries
        .iter()
        .flat_map(|c| c.border_ids.iter().map(String::as_str))
        .collect();
    let orphan_borders = borders
        .iter()
        .filter(|b| !referenced.contains(b.id.as_str()))
        .count();
    if orphan_borders > 0 {
        issues.push(format!(
            "{orphan_borders} borders are not referenced by any country"
        ));
    }

    for issue in &issues {
        log::warn!("Data quality: {issue}");
    }

    ValidationReport::from_issues(issues)
}

/// A geometry is degenerate when it carries no coordinate content at all
/// (empty position lists, or a collection of nothing but empties).
fn geometry_is_empty(geometry: &Geometry) -> bool {
    use geojson::Value;

    match &geometry.value {
        Value::Point(position) => position.is_empty(),
        Value::MultiPoint(positions) | Value::LineString(positions) => positions.is_empty(),
        Value::MultiLineString(lines) | Value::Polygon(lines) => lines.is_empty(),
        Value::MultiPolygon(polygons) => polygons.is_empty(),
        Value::GeometryCollection(geometries) => {
            geometries.iter().all(geometry_is_empty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::JsonObject;
    use std::collections::BTreeMap as ParamMap;

    fn country(id: &str, iso_a3: Option<&str>, border_ids: &[&str]) -> Country {
        Country {
            id: id.to_string(),
            iso_a3: iso_a3.map(str::to_string),
            name: id.to_string(),
            parameters: ParamMap::new(),
            border_ids: border_ids.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn border(id: &str) -> Border {
        Border {
            id: id.to_string(),
            geometry: Geometry::new(geojson::Value::LineString(vec![
                vec![0.0, 0.0],
                vec![1.0, 1.0],
            ])),
            properties: JsonObject::new(),
        }
    }

    fn post(id: &str, is_open: Option<i64>) -> BorderPost {
        BorderPost {
            id: id.to_string(),
            geometry: Geometry::new(geojson::Value::Point(vec![2.0, 3.0])),
            is_open,
            properties: JsonObject::new(),
        }
    }

    #[test]
    fn lookup_skips_countries_without_codes() {
        let countries = vec![country("a", Some("FRA"), &[]), country("b", None, &[])];
        let lookup = create_iso3_lookup(&countries);

        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.get("FRA").unwrap().id, "a");
    }

    #[test]
    fn lookup_first_claimant_wins_on_duplicates() {
        let countries = vec![country("first", Some("FRA"), &[]), country("second", Some("FRA"), &[])];
        let lookup = create_iso3_lookup(&countries);

        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.get("FRA").unwrap().id, "first");
    }

    #[test]
    fn duplicate_codes_reported_as_issue() {
        let countries = vec![country("a", Some("FRA"), &[]), country("b", Some("FRA"), &[])];
        let report = validate_processed_data(&countries, &[], None);

        assert!(!report.is_valid);
        assert!(report.issues.iter().any(|i| i.contains("duplicate ISO A3")));
    }

    #[test]
    fn missing_codes_reported_as_issue() {
        let countries = vec![country("a", None, &[])];
        let report = validate_processed_data(&countries, &[], None);

        assert!(report.issues.iter().any(|i| i.contains("missing an ISO A3")));
    }

    #[test]
    fn orphan_borders_are_counted() {
        let countries = vec![country("A", Some("AAA"), &["b1"])];
        let borders = vec![border("b1"), border("b2")];

        let report = validate_processed_data(&countries, &borders, None);

        let orphan_issues: Vec<&String> = report
            .issues
            .iter()
            .filter(|i| i.contains("not referenced"))
            .collect();
        assert_eq!(orphan_issues.len(), 1);
        assert!(orphan_issues[0].starts_with("1 "));
    }

    #[test]
    fn out_of_range_is_open_is_advisory() {
        let countries = vec![country("A", Some("AAA"), &["b1"])];
        let borders = vec![border("b1")];
        let posts = vec![post("p1", Some(7)), post("p2", Some(-1)), post("p3", None)];

        let report = validate_processed_data(&countries, &borders, Some(&posts));

        assert!(!report.is_valid);
        assert!(
            report
                .issues
                .iter()
                .any(|i| i.starts_with("1 ") && i.contains("is_open"))
        );
    }

    #[test]
    fn clean_data_produces_valid_report() {
        let countries = vec![country("A", Some("AAA"), &["b1"])];
        let borders = vec![border("b1")];
        let posts = vec![post("p1", Some(1))];

        let report = validate_processed_data(&countries, &borders, Some(&posts));

        assert!(report.is_valid);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn empty_geometry_collection_counts_as_degenerate() {
        let mut degenerate = border("b1");
        degenerate.geometry = Geometry::new(geojson::Value::GeometryCollection(Vec::new()));

        let countries = vec![country("A", Some("AAA"), &["b1"])];
        let report = validate_processed_data(&countries, &[degenerate], None);

        assert!(report.issues.iter().any(|i| i.contains("empty geometry")));
    }
}
