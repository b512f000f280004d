//! IP address allocation and management module.
//!
//! This module handles the address arithmetic of the sandbox: subnet
//! membership and overlap checks, deterministic WAN addressing of routers
//! and the free-address search used for the controller.

pub mod allocator;
pub mod registry;

use ipnet::IpNet;
use std::net::IpAddr;

// Re-export commonly used types
pub use allocator::{all_addresses, find_available_address, nth_usable_address, CONTROLLER_SKIPPED_ADDRESSES};
pub use registry::{AddressConflict, AddressRegistry};

/// Check whether two networks share at least one address
///
/// CIDR blocks either nest or are disjoint, so two networks overlap exactly
/// when one contains the other. Networks of different families never
/// overlap.
pub fn networks_overlap(a: &IpNet, b: &IpNet) -> bool {
    a.contains(b) || b.contains(a)
}

/// Check whether `ip` is a usable host address of `network`
///
/// The network and broadcast addresses are excluded, except for /31 and /32
/// (or /127 and /128) networks where every address is a host address.
pub fn is_host_address(network: &IpNet, ip: &IpAddr) -> bool {
    if !network.contains(ip) {
        return false;
    }
    if network.max_prefix_len() - network.prefix_len() <= 1 {
        return true;
    }
    *ip != network.network() && *ip != network.broadcast()
}
