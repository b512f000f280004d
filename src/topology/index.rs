//! Name index over a topology definition.

use super::types::{Host, Network, Router, TopologyDefinition};
use std::collections::HashMap;

/// Read-only lookup of hosts, routers and networks by name
///
/// Built once from a topology and never mutated afterwards. When names are
/// duplicated the first declaration wins, which only matters before the
/// uniqueness check has run.
#[derive(Debug)]
pub struct TopologyIndex<'a> {
    hosts: HashMap<&'a str, &'a Host>,
    routers: HashMap<&'a str, &'a Router>,
    networks: HashMap<&'a str, &'a Network>,
}

impl<'a> TopologyIndex<'a> {
    pub fn new(topology: &'a TopologyDefinition) -> Self {
        let mut hosts = HashMap::new();
        for host in &topology.hosts {
            hosts.entry(host.name.as_str()).or_insert(host);
        }
        let mut routers = HashMap::new();
        for router in &topology.routers {
            routers.entry(router.name.as_str()).or_insert(router);
        }
        let mut networks = HashMap::new();
        for network in &topology.networks {
            networks.entry(network.name.as_str()).or_insert(network);
        }

        Self { hosts, routers, networks }
    }

    pub fn find_host(&self, name: &str) -> Option<&'a Host> {
        self.hosts.get(name).copied()
    }

    pub fn find_router(&self, name: &str) -> Option<&'a Router> {
        self.routers.get(name).copied()
    }

    /// Find a declared network (the WAN is not part of the index)
    pub fn find_network(&self, name: &str) -> Option<&'a Network> {
        self.networks.get(name).copied()
    }

    /// Whether `name` is a host or a router
    pub fn contains_node(&self, name: &str) -> bool {
        self.hosts.contains_key(name) || self.routers.contains_key(name)
    }
}
