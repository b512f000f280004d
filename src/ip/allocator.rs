//! IP address allocation logic.
//!
//! Two strategies are used by the expansion engine: routers get the n-th
//! usable address of the WAN (derived from their declaration order, so no
//! bookkeeping is needed) and the controller gets the first address of its
//! network that no other interface uses.

use super::is_host_address;
use super::registry::AddressRegistry;
use ipnet::{IpAddrRange, IpNet, Ipv4AddrRange, Ipv6AddrRange};
use std::net::IpAddr;

/// Number of low addresses skipped when searching a free controller address
pub const CONTROLLER_SKIPPED_ADDRESSES: usize = 5;

/// Every address of `network`, including the network and broadcast address
pub fn all_addresses(network: &IpNet) -> IpAddrRange {
    match network {
        IpNet::V4(net) => IpAddrRange::V4(Ipv4AddrRange::new(net.network(), net.broadcast())),
        IpNet::V6(net) => IpAddrRange::V6(Ipv6AddrRange::new(net.network(), net.broadcast())),
    }
}

/// Number of addresses in `network`, saturating for huge IPv6 networks
fn network_size(network: &IpNet) -> u128 {
    let host_bits = u32::from(network.max_prefix_len() - network.prefix_len());
    1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
}

/// Get the `n`-th (1-based) usable host address of `network`
///
/// For a /24 the first usable address is `.1`, so router number `n` on the
/// WAN `100.100.100.0/24` receives `100.100.100.n`.
///
/// # Returns
/// * `Some(ip)` - the address
/// * `None` - if `n` is zero or the network has fewer than `n` host addresses
pub fn nth_usable_address(network: &IpNet, n: usize) -> Option<IpAddr> {
    let index = n.checked_sub(1)?;
    network.hosts().nth(index)
}

/// Find the first host address of `network` that is not in `registry`
///
/// Addresses are scanned in ascending order. The first `skip` addresses of
/// the range (counting the network address) are never returned, unless the
/// network has no more than `skip` addresses at all. The network and
/// broadcast addresses are never returned.
pub fn find_available_address(network: &IpNet, registry: &AddressRegistry, skip: usize) -> Option<IpAddr> {
    let skip = if network_size(network) > skip as u128 { skip } else { 0 };

    let found = all_addresses(network)
        .skip(skip)
        .filter(|address| is_host_address(network, address))
        .find(|address| !registry.is_ip_assigned(address));

    if let Some(address) = found {
        log::debug!("Found free address {} in {}", address, network);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(cidr: &str) -> IpNet {
        cidr.parse().unwrap()
    }

    fn ip(address: &str) -> IpAddr {
        address.parse().unwrap()
    }

    #[test]
    fn test_nth_usable_address() {
        let wan = net("100.100.100.0/24");
        assert_eq!(nth_usable_address(&wan, 1), Some(ip("100.100.100.1")));
        assert_eq!(nth_usable_address(&wan, 3), Some(ip("100.100.100.3")));
        assert_eq!(nth_usable_address(&wan, 254), Some(ip("100.100.100.254")));
        assert_eq!(nth_usable_address(&wan, 255), None);
        assert_eq!(nth_usable_address(&wan, 0), None);
    }

    #[test]
    fn test_wan_addresses_are_distinct() {
        let wan = net("100.100.100.0/24");
        let addresses: Vec<IpAddr> = (1..=10).filter_map(|n| nth_usable_address(&wan, n)).collect();
        let unique: std::collections::HashSet<&IpAddr> = addresses.iter().collect();
        assert_eq!(addresses.len(), 10);
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn test_available_address_skips_low_addresses() {
        let network = net("10.0.0.0/24");
        let registry = AddressRegistry::new();
        assert_eq!(
            find_available_address(&network, &registry, CONTROLLER_SKIPPED_ADDRESSES),
            Some(ip("10.0.0.5"))
        );
    }

    #[test]
    fn test_available_address_avoids_assigned() {
        let network = net("10.0.0.0/24");
        let mut registry = AddressRegistry::new();
        registry.register(ip("10.0.0.5"), "server").unwrap();
        registry.register(ip("10.0.0.6"), "client").unwrap();

        let first = find_available_address(&network, &registry, CONTROLLER_SKIPPED_ADDRESSES);
        let second = find_available_address(&network, &registry, CONTROLLER_SKIPPED_ADDRESSES);
        assert_eq!(first, Some(ip("10.0.0.7")));
        assert_eq!(first, second);
    }

    #[test]
    fn test_small_network_is_not_skipped() {
        let network = net("10.0.0.0/30");
        let mut registry = AddressRegistry::new();
        registry.register(ip("10.0.0.0"), "a").unwrap();
        assert_eq!(
            find_available_address(&network, &registry, CONTROLLER_SKIPPED_ADDRESSES),
            Some(ip("10.0.0.1"))
        );
    }

    #[test]
    fn test_full_network_has_no_free_address() {
        let network = net("10.0.0.0/30");
        let mut registry = AddressRegistry::new();
        for (index, address) in all_addresses(&network).enumerate() {
            registry.register(address, &format!("device{}", index)).unwrap();
        }
        assert_eq!(find_available_address(&network, &registry, 0), None);
    }

    #[test]
    fn test_broadcast_is_never_returned() {
        let network = net("10.0.0.0/24");
        let mut registry = AddressRegistry::new();
        for last in 5..=254u8 {
            registry.register(ip(&format!("10.0.0.{}", last)), "host").unwrap();
        }
        assert_eq!(find_available_address(&network, &registry, CONTROLLER_SKIPPED_ADDRESSES), None);

        let point_to_point = net("10.0.1.0/31");
        let empty = AddressRegistry::new();
        assert_eq!(find_available_address(&point_to_point, &empty, 0), Some(ip("10.0.1.0")));
    }
}
