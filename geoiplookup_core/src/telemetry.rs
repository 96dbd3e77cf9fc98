//! Metric names and descriptions.
//!
//! The crate only emits through the `metrics` facade; exporting is left to
//! whichever recorder the host process installs.

use metrics::{describe_counter, Unit};

pub const LOOKUPS: &str = "geoiplookup_lookups_total";
pub const LOOKUP_HITS: &str = "geoiplookup_lookup_hits_total";
pub const LOOKUP_INVALID: &str = "geoiplookup_lookup_invalid_total";
pub const STORE_READ_ERRORS: &str = "geoiplookup_store_read_errors_total";
pub const UPSERTS: &str = "geoiplookup_upserts_total";
pub const RECORDS_SKIPPED: &str = "geoiplookup_records_skipped_total";
pub const DOWNLOADS: &str = "geoiplookup_downloads_total";

/// Register descriptions exactly **once** per process.
pub fn describe() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        describe_counter!(LOOKUPS, Unit::Count, "lookups served");
        describe_counter!(LOOKUP_HITS, Unit::Count, "lookups that resolved a country");
        describe_counter!(LOOKUP_INVALID, Unit::Count, "lookups rejected as malformed addresses");
        describe_counter!(STORE_READ_ERRORS, Unit::Count, "probe reads that failed");
        describe_counter!(UPSERTS, Unit::Count, "subnet keys written");
        describe_counter!(RECORDS_SKIPPED, Unit::Count, "delegation lines skipped");
        describe_counter!(DOWNLOADS, Unit::Count, "delegation files downloaded");
    });
}
