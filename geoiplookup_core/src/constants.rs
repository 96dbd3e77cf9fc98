//! Constants shared by the store, the pipeline and the lookup engine

/// Store partition holding IPv4 subnets.
pub const PARTITION_V4: &str = "ipv4";
/// Store partition holding IPv6 subnets.
pub const PARTITION_V6: &str = "ipv6";

/// Family tags as they appear in the third field of a delegation line.
pub const TAG_V4: &str = "ipv4";
pub const TAG_V6: &str = "ipv6";

pub const V4_BITS: u8 = 32;
pub const V6_BITS: u8 = 128;

/// Returned by `Handler::lookup` when no stored subnet contains the address.
pub const UNKNOWN_COUNTRY: &str = "NA";

/// Delegation lines carry at least this many `|`-separated fields.
pub const MIN_FIELDS: usize = 5;

pub const DEFAULT_DB_PATH: &str = "geoip.db";
pub const DEFAULT_DATA_DIR: &str = ".";

// One extended delegation file per RIR.
pub const ARIN: &str = "https://ftp.arin.net/pub/stats/arin/delegated-arin-extended-latest";
pub const RIPE_NCC: &str = "https://ftp.ripe.net/ripe/stats/delegated-ripencc-extended-latest";
pub const APNIC: &str = "https://ftp.apnic.net/stats/apnic/delegated-apnic-extended-latest";
pub const AFRINIC: &str = "https://ftp.apnic.net/stats/afrinic/delegated-afrinic-extended-latest";
pub const LACNIC: &str = "https://ftp.apnic.net/stats/lacnic/delegated-lacnic-extended-latest";

pub const RIR_URLS: [&str; 5] = [ARIN, RIPE_NCC, APNIC, AFRINIC, LACNIC];
