//! Subnet codec: RIR `start + count` records and probe addresses to
//! canonical `network/prefix` keys

use ipnet::IpNet;
use std::net::IpAddr;

/// Prefix length covering `count` hosts in a `bit_width`-bit space,
/// truncated through floor(log2). `None` for zero or for more hosts than
/// the space holds.
#[inline]
pub fn prefix_len_for_count(count: u64, bit_width: u8) -> Option<u8> {
    if count == 0 {
        return None;
    }
    let host_bits = count.ilog2();
    (bit_width as u32)
        .checked_sub(host_bits)
        .map(|plen| plen as u8)
}

/// Key for an RIR row that reports a host count (IPv4 delegations).
///
/// A count that is not a power of two yields the prefix of its largest
/// power-of-two part, so the key covers fewer hosts than delegated.
pub fn derive_subnet_key(start: IpAddr, count: u64, bit_width: u8) -> Option<String> {
    let plen = prefix_len_for_count(count, bit_width)?;
    mask_to_prefix(start, plen)
}

/// Zero every bit of `addr` past `prefix_len` and format as
/// `network/prefix_len`. Used for stored keys and for lookup probes alike.
#[inline]
pub fn mask_to_prefix(addr: IpAddr, prefix_len: u8) -> Option<String> {
    let net = IpNet::new(addr, prefix_len).ok()?.trunc();
    Some(net.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn host_count_to_prefix() {
        assert_eq!(derive_subnet_key(ip("192.0.0.0"), 256, 32).as_deref(), Some("192.0.0.0/24"));
        assert_eq!(derive_subnet_key(ip("10.0.0.0"), 1 << 24, 32).as_deref(), Some("10.0.0.0/8"));
        assert_eq!(derive_subnet_key(ip("8.8.8.8"), 1, 32).as_deref(), Some("8.8.8.8/32"));
    }

    #[test]
    fn non_power_of_two_truncates() {
        // 768 hosts -> floor(log2) = 9 -> /23
        assert_eq!(derive_subnet_key(ip("24.0.0.0"), 768, 32).as_deref(), Some("24.0.0.0/23"));
    }

    #[test]
    fn rejects_impossible_counts() {
        assert!(derive_subnet_key(ip("0.0.0.0"), 0, 32).is_none());
        assert_eq!(prefix_len_for_count(1 << 32, 32), Some(0));
        assert!(prefix_len_for_count(1 << 33, 32).is_none());
    }

    #[test]
    fn masks_probe_addresses() {
        assert_eq!(mask_to_prefix(ip("10.1.2.3"), 8).as_deref(), Some("10.0.0.0/8"));
        assert_eq!(mask_to_prefix(ip("10.1.2.3"), 16).as_deref(), Some("10.1.0.0/16"));
        assert_eq!(mask_to_prefix(ip("10.1.2.3"), 0).as_deref(), Some("0.0.0.0/0"));
        assert_eq!(mask_to_prefix(ip("10.1.2.3"), 32).as_deref(), Some("10.1.2.3/32"));
        assert_eq!(
            mask_to_prefix(ip("2001:db8:abcd::1"), 32).as_deref(),
            Some("2001:db8::/32")
        );
        assert!(mask_to_prefix(ip("10.1.2.3"), 33).is_none());
        assert!(mask_to_prefix(ip("::1"), 129).is_none());
    }

    #[test]
    fn misaligned_start_is_canonicalised() {
        assert_eq!(derive_subnet_key(ip("192.0.0.77"), 256, 32).as_deref(), Some("192.0.0.0/24"));
    }

    proptest! {
        #[test]
        fn masked_v4_key_is_canonical(raw in any::<u32>(), plen in 0u8..=32) {
            let key = mask_to_prefix(IpAddr::V4(Ipv4Addr::from(raw)), plen).unwrap();
            let net: IpNet = key.parse().unwrap();
            prop_assert_eq!(net.prefix_len(), plen);
            prop_assert_eq!(net, net.trunc());
            prop_assert!(net.contains(&IpAddr::V4(Ipv4Addr::from(raw))));
        }

        #[test]
        fn masked_v6_key_is_canonical(raw in any::<u128>(), plen in 0u8..=128) {
            let key = mask_to_prefix(IpAddr::V6(Ipv6Addr::from(raw)), plen).unwrap();
            let net: IpNet = key.parse().unwrap();
            prop_assert_eq!(net, net.trunc());
            prop_assert!(net.contains(&IpAddr::V6(Ipv6Addr::from(raw))));
        }

        #[test]
        fn power_of_two_counts_are_exact(shift in 0u32..=32) {
            let plen = prefix_len_for_count(1u64 << shift, 32).unwrap();
            prop_assert_eq!(plen as u32, 32 - shift);
        }
    }
}
