//! Cross-field validation of topology definitions.
//!
//! Checks, in order:
//! 1. uniqueness of the topology, host, router, network and WAN names
//! 2. host and network references of network mappings
//! 3. router and network references of router mappings
//! 4. CIDR overlap between all networks including the WAN
//! 5. mapped addresses are host addresses of their networks
//! 6. uniqueness of mapped addresses
//! 7. group names and members
//!
//! The first failing check aborts validation. Uniqueness checks report every
//! duplicate at once, the other checks report the first offender.

use super::index::TopologyIndex;
use super::schema::is_valid_name;
use super::types::TopologyDefinition;
use crate::ip::{is_host_address, networks_overlap};
use ipnet::IpNet;
use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;

/// Kind of a mapping, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    Network,
    Router,
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingKind::Network => f.write_str("network"),
            MappingKind::Router => f.write_str("router"),
        }
    }
}

/// Topology invariant violations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Uniqueness violation. The following name identifiers are not unique within the [{scope}] definition: {names:?}.")]
    NotUnique { scope: &'static str, names: Vec<String> },

    #[error("Invalid {kind} mapping with ip \"{ip}\". Cannot find {target} with name \"{name}\".")]
    DanglingMapping {
        kind: MappingKind,
        ip: IpAddr,
        target: &'static str,
        name: String,
    },

    #[error("Network \"{first}\" ({first_cidr}) overlaps with network \"{second}\" ({second_cidr}).")]
    OverlappingNetworks {
        first: String,
        first_cidr: IpNet,
        second: String,
        second_cidr: IpNet,
    },

    #[error("IP address \"{ip}\" is not valid host address of \"{cidr}\" defined in network \"{network}\".")]
    AddressOutOfRange { ip: IpAddr, cidr: IpNet, network: String },

    #[error("Uniqueness violation. The IP address of either of mappings must be unique. Incorrect IP addresses: {addresses:?}.")]
    DuplicateAddresses { addresses: Vec<String> },

    #[error("Invalid name \"{node}\" in Group.nodes of group \"{group}\". It does not match regex \"^[a-z]([a-z0-9A-Z-])*$\".")]
    InvalidGroupMember { group: String, node: String },

    #[error("Invalid group with name \"{group}\". Cannot find a node (host or router) with name \"{node}\".")]
    UnknownGroupMember { group: String, node: String },
}

/// Collect the elements that occur more than once, in order of first repetition
pub fn get_duplicates<'a, I>(elements: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();

    for element in elements {
        if !seen.insert(element) && !duplicates.iter().any(|d| d == element) {
            duplicates.push(element.to_string());
        }
    }

    duplicates
}

fn raise_if_not_unique<'a, I>(scope: &'static str, elements: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let names = get_duplicates(elements);
    if names.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::NotUnique { scope, names })
    }
}

/// Validate all cross-field invariants of a topology
pub fn validate(topology: &TopologyDefinition) -> Result<(), ValidationError> {
    let index = TopologyIndex::new(topology);

    validate_name_uniqueness(topology)?;
    validate_net_mappings(topology, &index)?;
    validate_router_mappings(topology, &index)?;
    validate_network_overlaps(topology)?;
    validate_mapping_addresses(topology, &index)?;
    validate_address_uniqueness(topology)?;
    validate_groups(topology, &index)?;

    log::debug!(
        "Topology '{}' is valid ({} hosts, {} routers, {} networks)",
        topology.name,
        topology.hosts.len(),
        topology.routers.len(),
        topology.networks.len()
    );
    Ok(())
}

/// Names of the topology, hosts, routers, networks and the WAN must not repeat
pub fn validate_name_uniqueness(topology: &TopologyDefinition) -> Result<(), ValidationError> {
    let names = std::iter::once(topology.name.as_str())
        .chain(topology.hosts.iter().map(|h| h.name.as_str()))
        .chain(topology.routers.iter().map(|r| r.name.as_str()))
        .chain(topology.networks.iter().map(|n| n.name.as_str()))
        .chain(std::iter::once(topology.wan.name.as_str()));

    raise_if_not_unique("name, hosts, routers, networks, wan", names)
}

/// Network mappings must reference a declared host and network
pub fn validate_net_mappings(topology: &TopologyDefinition, index: &TopologyIndex) -> Result<(), ValidationError> {
    for mapping in &topology.net_mappings {
        if index.find_host(&mapping.host).is_none() {
            return Err(ValidationError::DanglingMapping {
                kind: MappingKind::Network,
                ip: mapping.ip,
                target: "host",
                name: mapping.host.clone(),
            });
        }
        if index.find_network(&mapping.network).is_none() {
            return Err(ValidationError::DanglingMapping {
                kind: MappingKind::Network,
                ip: mapping.ip,
                target: "network",
                name: mapping.network.clone(),
            });
        }
    }
    Ok(())
}

/// Router mappings must reference a declared router and network
pub fn validate_router_mappings(topology: &TopologyDefinition, index: &TopologyIndex) -> Result<(), ValidationError> {
    for mapping in &topology.router_mappings {
        if index.find_router(&mapping.router).is_none() {
            return Err(ValidationError::DanglingMapping {
                kind: MappingKind::Router,
                ip: mapping.ip,
                target: "router",
                name: mapping.router.clone(),
            });
        }
        if index.find_network(&mapping.network).is_none() {
            return Err(ValidationError::DanglingMapping {
                kind: MappingKind::Router,
                ip: mapping.ip,
                target: "network",
                name: mapping.network.clone(),
            });
        }
    }
    Ok(())
}

/// No two networks (including the WAN) may share an address
pub fn validate_network_overlaps(topology: &TopologyDefinition) -> Result<(), ValidationError> {
    let networks: Vec<(&str, &IpNet)> = topology
        .networks
        .iter()
        .map(|n| (n.name.as_str(), &n.cidr))
        .chain(std::iter::once((topology.wan.name.as_str(), &topology.wan.cidr)))
        .collect();

    for (i, (first, first_cidr)) in networks.iter().enumerate() {
        for (second, second_cidr) in networks.iter().skip(i + 1) {
            if networks_overlap(first_cidr, second_cidr) {
                return Err(ValidationError::OverlappingNetworks {
                    first: first.to_string(),
                    first_cidr: **first_cidr,
                    second: second.to_string(),
                    second_cidr: **second_cidr,
                });
            }
        }
    }
    Ok(())
}

/// Every mapped address must be a host address of the mapped network
pub fn validate_mapping_addresses(topology: &TopologyDefinition, index: &TopologyIndex) -> Result<(), ValidationError> {
    let net_mappings = topology.net_mappings.iter().map(|m| (m.network.as_str(), &m.ip));
    let router_mappings = topology.router_mappings.iter().map(|m| (m.network.as_str(), &m.ip));

    for (network_name, ip) in net_mappings.chain(router_mappings) {
        let cidr = if network_name == topology.wan.name.as_str() {
            topology.wan.cidr
        } else {
            match index.find_network(network_name) {
                Some(network) => network.cidr,
                None => continue,
            }
        };

        if !is_host_address(&cidr, ip) {
            return Err(ValidationError::AddressOutOfRange {
                ip: *ip,
                cidr,
                network: network_name.to_string(),
            });
        }
    }
    Ok(())
}

/// No address may be mapped twice across network and router mappings
pub fn validate_address_uniqueness(topology: &TopologyDefinition) -> Result<(), ValidationError> {
    let addresses: Vec<String> = topology
        .net_mappings
        .iter()
        .map(|m| m.ip.to_string())
        .chain(topology.router_mappings.iter().map(|m| m.ip.to_string()))
        .collect();

    let duplicates = get_duplicates(addresses.iter().map(String::as_str));
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::DuplicateAddresses { addresses: duplicates })
    }
}

/// Group names must be unique and members must be unique, existing nodes
pub fn validate_groups(topology: &TopologyDefinition, index: &TopologyIndex) -> Result<(), ValidationError> {
    raise_if_not_unique("groups", topology.groups.iter().map(|g| g.name.as_str()))?;

    for group in &topology.groups {
        // Member names are pattern-checked while parsing; this only guards
        // topologies assembled in code.
        if let Some(node) = group.nodes.iter().find(|node| !is_valid_name(node.as_str())) {
            return Err(ValidationError::InvalidGroupMember {
                group: group.name.to_string(),
                node: node.to_string(),
            });
        }

        raise_if_not_unique("Group.nodes", group.nodes.iter().map(|n| n.as_str()))?;

        if let Some(node) = group.nodes.iter().find(|node| !index.contains_node(node.as_str())) {
            return Err(ValidationError::UnknownGroupMember {
                group: group.name.to_string(),
                node: node.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::schema::parse_document;

    const VALID: &str = r#"
name: test-sandbox
hosts:
  - name: server
    base_box:
      image: debian-10
    flavor: standard.small
  - name: client
    base_box:
      image: debian-10
    flavor: standard.small
routers:
  - name: router
    base_box:
      image: debian-10
    flavor: standard.small
networks:
  - name: server-net
    cidr: 10.10.10.0/24
  - name: client-net
    cidr: 10.10.20.0/24
net_mappings:
  - host: server
    network: server-net
    ip: 10.10.10.5
  - host: client
    network: client-net
    ip: 10.10.20.5
router_mappings:
  - router: router
    network: server-net
    ip: 10.10.10.1
  - router: router
    network: client-net
    ip: 10.10.20.1
groups:
  - name: clients
    nodes:
      - client
"#;

    fn parse(yaml: &str) -> TopologyDefinition {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        parse_document(document).unwrap()
    }

    #[test]
    fn test_valid_topology() {
        assert_eq!(validate(&parse(VALID)), Ok(()));
    }

    #[test]
    fn test_duplicate_names_are_all_reported() {
        let yaml = VALID
            .replace("name: client\n", "name: server\n")
            .replace("name: client-net", "name: router");
        let error = validate(&parse(&yaml)).unwrap_err();

        match error {
            ValidationError::NotUnique { scope, names } => {
                assert_eq!(scope, "name, hosts, routers, networks, wan");
                assert_eq!(names, vec!["server".to_string(), "router".to_string()]);
            }
            other => panic!("Expected NotUnique, got {:?}", other),
        }
    }

    #[test]
    fn test_network_named_like_wan() {
        let yaml = VALID.replace("name: client-net", "name: wan");
        assert!(matches!(
            validate(&parse(&yaml)),
            Err(ValidationError::NotUnique { .. })
        ));
    }

    #[test]
    fn test_dangling_net_mapping_host() {
        let yaml = VALID.replace("  - host: client\n", "  - host: ghost\n");
        match validate(&parse(&yaml)).unwrap_err() {
            ValidationError::DanglingMapping { kind, target, name, .. } => {
                assert_eq!(kind, MappingKind::Network);
                assert_eq!(target, "host");
                assert_eq!(name, "ghost");
            }
            other => panic!("Expected DanglingMapping, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_router_mapping_network() {
        let yaml = VALID.replace(
            "    network: client-net\n    ip: 10.10.20.1",
            "    network: missing-net\n    ip: 10.10.20.1",
        );
        match validate(&parse(&yaml)).unwrap_err() {
            ValidationError::DanglingMapping { kind, target, name, .. } => {
                assert_eq!(kind, MappingKind::Router);
                assert_eq!(target, "network");
                assert_eq!(name, "missing-net");
            }
            other => panic!("Expected DanglingMapping, got {:?}", other),
        }
    }

    #[test]
    fn test_overlapping_networks() {
        let yaml = VALID.replace("cidr: 10.10.20.0/24", "cidr: 10.10.0.0/16");
        match validate(&parse(&yaml)).unwrap_err() {
            ValidationError::OverlappingNetworks { first, second, .. } => {
                assert_eq!(first, "server-net");
                assert_eq!(second, "client-net");
            }
            other => panic!("Expected OverlappingNetworks, got {:?}", other),
        }
    }

    #[test]
    fn test_network_overlapping_wan() {
        let yaml = VALID.replace("cidr: 10.10.20.0/24", "cidr: 100.100.0.0/16");
        assert!(matches!(
            validate(&parse(&yaml)),
            Err(ValidationError::OverlappingNetworks { .. })
        ));
    }

    #[test]
    fn test_network_and_broadcast_addresses_are_rejected() {
        for address in ["10.10.10.0", "10.10.10.255", "10.10.11.5"] {
            let yaml = VALID.replace("ip: 10.10.10.5", &format!("ip: {}", address));
            match validate(&parse(&yaml)).unwrap_err() {
                ValidationError::AddressOutOfRange { ip, network, .. } => {
                    assert_eq!(ip.to_string(), address);
                    assert_eq!(network, "server-net");
                }
                other => panic!("Expected AddressOutOfRange for {}, got {:?}", address, other),
            }
        }
    }

    #[test]
    fn test_duplicate_addresses() {
        let yaml = VALID.replace("ip: 10.10.10.5", "ip: 10.10.10.1");
        match validate(&parse(&yaml)).unwrap_err() {
            ValidationError::DuplicateAddresses { addresses } => {
                assert_eq!(addresses, vec!["10.10.10.1".to_string()]);
            }
            other => panic!("Expected DuplicateAddresses, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_group_member() {
        let yaml = VALID.replace("      - client\n", "      - client\n      - nobody\n");
        match validate(&parse(&yaml)).unwrap_err() {
            ValidationError::UnknownGroupMember { group, node } => {
                assert_eq!(group, "clients");
                assert_eq!(node, "nobody");
            }
            other => panic!("Expected UnknownGroupMember, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_group_member() {
        let yaml = VALID.replace("      - client\n", "      - client\n      - client\n");
        match validate(&parse(&yaml)).unwrap_err() {
            ValidationError::NotUnique { scope, names } => {
                assert_eq!(scope, "Group.nodes");
                assert_eq!(names, vec!["client".to_string()]);
            }
            other => panic!("Expected NotUnique, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_group_names() {
        let yaml = format!("{}  - name: clients\n    nodes:\n      - server\n", VALID);
        match validate(&parse(&yaml)).unwrap_err() {
            ValidationError::NotUnique { scope, .. } => assert_eq!(scope, "groups"),
            other => panic!("Expected NotUnique, got {:?}", other),
        }
    }

    #[test]
    fn test_get_duplicates() {
        assert_eq!(get_duplicates(["a", "b", "a", "c", "a", "b"]), vec!["a", "b"]);
        assert!(get_duplicates(["a", "b", "c"]).is_empty());
    }
}
