//! Data model: address families, delegation records, population report

use crate::constants::{MIN_FIELDS, PARTITION_V4, PARTITION_V6, TAG_V4, TAG_V6, V4_BITS, V6_BITS};
use crate::helpers::{derive_subnet_key, mask_to_prefix};
use std::fmt;
use std::net::IpAddr;

/// Address family; picks the bit width and the store partition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    pub const ALL: [IpFamily; 2] = [IpFamily::V4, IpFamily::V6];

    #[inline]
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }

    /// Resolve the version tag of a delegation line (`ipv4` / `ipv6`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            TAG_V4 => Some(IpFamily::V4),
            TAG_V6 => Some(IpFamily::V6),
            _ => None,
        }
    }

    #[inline]
    pub fn bits(self) -> u8 {
        match self {
            IpFamily::V4 => V4_BITS,
            IpFamily::V6 => V6_BITS,
        }
    }

    #[inline]
    pub fn partition(self) -> &'static str {
        match self {
            IpFamily::V4 => PARTITION_V4,
            IpFamily::V6 => PARTITION_V6,
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f:&mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.partition())
    }
}

/// One usable line of an RIR delegation file.
///
/// `value` is a host count for IPv4 rows and a prefix length for IPv6 rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationRecord {
    pub country: String,
    pub family: IpFamily,
    pub start: IpAddr,
    pub value: u64,
}

impl DelegationRecord {
    /// Parse `registry|cc|type|start|value|...`.
    ///
    /// Returns `None` for anything that is not an address delegation with a
    /// country: headers, summaries, `asn` rows, unassigned blocks, or
    /// fields that do not parse.
    pub fn parse(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() < MIN_FIELDS {
            return None;
        }
        let (country, tag, start, value) = (parts[1], parts[2], parts[3], parts[4]);

        let family = IpFamily::from_tag(tag)?;
        if country.is_empty() {
            return None;
        }
        let start: IpAddr = start.parse().ok()?;
        if IpFamily::of(&start) != family {
            return None;
        }
        let value: u64 = value.trim().parse().ok()?;

        Some(Self {
            country: country.to_owned(),
            family,
            start,
            value,
        })
    }

    /// Canonical `network/prefix` key this record is stored under.
    pub fn subnet_key(&self) -> Option<String> {
        match self.family {
            IpFamily::V4 => derive_subnet_key(self.start, self.value, V4_BITS),
            IpFamily::V6 => {
                let plen = u8::try_from(self.value).ok()?;
                mask_to_prefix(self.start, plen)
            }
        }
    }
}

/// Totals of a successful population run.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct PopulateReport {
    pub files: usize,
    pub loaded: u64,
    pub skipped: u64,
}

impl PopulateReport {
    pub(crate) fn absorb(&mut self, file: FileStats) {
        self.files += 1;
        self.loaded += file.loaded;
        self.skipped += file.skipped;
    }
}

/// Per-file counters produced by the loader.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub loaded: u64,
    pub skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ipv4_row() {
        let rec = DelegationRecord::parse(
            "apnic|AU|ipv4|1.0.0.0|256|20110811|assigned|A91872ED",
        )
        .unwrap();
        assert_eq!(rec.country, "AU");
        assert_eq!(rec.family, IpFamily::V4);
        assert_eq!(rec.value, 256);
        assert_eq!(rec.subnet_key().as_deref(), Some("1.0.0.0/24"));
    }

    #[test]
    fn parses_row_with_exactly_five_fields() {
        let rec = DelegationRecord::parse("x|US|ipv4|1.0.0.0|256").unwrap();
        assert_eq!(rec.country, "US");
        assert_eq!(rec.subnet_key().as_deref(), Some("1.0.0.0/24"));
        assert!(DelegationRecord::parse("x|US|ipv4|1.0.0.0").is_none());
    }

    #[test]
    fn ipv6_value_is_a_prefix_length() {
        let rec = DelegationRecord::parse("apnic|JP|ipv6|2001:200::|35|19990813|allocated").unwrap();
        assert_eq!(rec.family, IpFamily::V6);
        assert_eq!(rec.subnet_key().as_deref(), Some("2001:200::/35"));
    }

    #[test]
    fn skips_non_delegation_rows() {
        for line in [
            "2|apnic|20240101|70000|19830613|20231231|+1000",
            "apnic|*|ipv4|*|50000|summary",
            "apnic|JP|asn|173|1|20020801|allocated",
            "arin||ipv4|23.128.0.0|1024||available|",
            "ripencc|NL|ipv4|not-an-ip|256|20000101|allocated",
            "ripencc|NL|ipv4|2001:db8::|256|20000101|allocated",
            "ripencc|NL|ipv4|10.0.0.0|lots|20000101|allocated",
            "ripencc|NL|ipv4",
            "",
            "# comment",
        ] {
            assert!(DelegationRecord::parse(line).is_none(), "{line}");
        }
    }

    #[test]
    fn ipv6_prefix_out_of_range_has_no_key() {
        let rec = DelegationRecord::parse("lacnic|BR|ipv6|2800::|129|20000101|allocated").unwrap();
        assert!(rec.subnet_key().is_none());
    }

    #[test]
    fn family_tags() {
        assert_eq!(IpFamily::from_tag("ipv4"), Some(IpFamily::V4));
        assert_eq!(IpFamily::from_tag("ipv6"), Some(IpFamily::V6));
        assert_eq!(IpFamily::from_tag("IPV4"), None);
        assert_eq!(IpFamily::V6.bits(), 128);
        assert_eq!(IpFamily::V4.to_string(), "ipv4");
    }
}
