//! Coarse, best-effort visitor location derived from the source IP

use ipnet::IpNet;
use std::net::IpAddr;
use std::sync::OnceLock;

pub const LOCAL_NETWORK: &str = "Local Network";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Private, loopback and unique-local ranges
fn local_networks() -> &'static [IpNet] {
    static NETWORKS: OnceLock<Vec<IpNet>> = OnceLock::new();
    NETWORKS.get_or_init(|| {
        [
            "10.0.0.0/8",
            "172.16.0.0/12",
            "192.168.0.0/16",
            "127.0.0.0/8",
            "::1/128",
            "fc00::/7",
        ]
        .iter()
        .filter_map(|cidr| cidr.parse().ok())
        .collect()
    })
}

/// Whether `ip` belongs to a local network. IPv4-mapped IPv6 addresses
/// (`::ffff:a.b.c.d`) are judged by their IPv4 form.
pub fn is_local_address(ip: IpAddr) -> bool {
    let ip = match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        IpAddr::V4(_) => ip,
    };
    local_networks().iter().any(|net| net.contains(&ip))
}

/// Label for a click's source address. Unparsable input is unknown.
pub fn coarse_location(source_ip: &str) -> &'static str {
    match source_ip.trim().parse::<IpAddr>() {
        Ok(ip) if is_local_address(ip) => LOCAL_NETWORK,
        _ => UNKNOWN_LOCATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_addresses() {
        for ip in [
            "127.0.0.1",
            "10.1.2.3",
            "172.16.0.1",
            "172.31.255.255",
            "192.168.1.100",
            "::1",
            "fd12:3456:789a::1",
            "::ffff:127.0.0.1",
            "::ffff:192.168.0.7",
        ] {
            assert_eq!(coarse_location(ip), LOCAL_NETWORK, "{ip}");
        }
    }

    #[test]
    fn test_public_addresses() {
        for ip in [
            "8.8.8.8",
            "172.32.0.1",
            "203.0.113.5",
            "2001:db8::1",
            "::ffff:8.8.4.4",
        ] {
            assert_eq!(coarse_location(ip), UNKNOWN_LOCATION, "{ip}");
        }
    }

    #[test]
    fn test_unparsable_addresses() {
        assert_eq!(coarse_location(""), UNKNOWN_LOCATION);
        assert_eq!(coarse_location("localhost"), UNKNOWN_LOCATION);
        assert_eq!(coarse_location("999.1.1.1"), UNKNOWN_LOCATION);
    }
}
