#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalization and cross-reference validation for geographic reference
//! data.
//!
//! Takes loosely-typed document-store records (countries, borders, border
//! posts) with historically inconsistent field names and produces the
//! canonical entities from `border_map_geodata_models`. Per-record failures
//! (missing ids, unparseable geometry, out-of-range coordinates) are logged
//! and skipped so that one bad document never fails a batch; advisory
//! data-quality findings are collected into a [`ValidationReport`].
//!
//! [`ValidationReport`]: border_map_geodata_models::ValidationReport

pub mod geometry;
pub mod params;
pub mod process;
pub mod validate;

pub use process::{process_border_data, process_border_post_data, process_country_data};
pub use validate::{create_iso3_lookup, validate_processed_data};
