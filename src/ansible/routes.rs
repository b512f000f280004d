//! Static route derivation.
//!
//! Every device first gets an entry that configures its default interface
//! from facts gathered at runtime. Hosts behind a router additionally pin
//! their primary interface to that router; routers get routes to every
//! network they are not attached to, via the WAN address of the router that
//! is.

use crate::sandbox::{Device, DevicePurpose, NetworkId, ResolutionError, Sandbox};
use serde::{Deserialize, Serialize};

/// Address of the default interface, resolved from Ansible facts
pub const AUTO_INTERFACE_IP: &str = "{{ ansible_default_ipv4.address  | default(ansible_all_ipv4_addresses[0]) }}";
/// Netmask of the default interface, resolved from Ansible facts
pub const AUTO_INTERFACE_NETMASK: &str = "{{ ansible_default_ipv4.netmask  | default('24') }}";
/// Default gateway, resolved from Ansible facts
pub const AUTO_DEFAULT_GATEWAY: &str = "{{ ansible_default_ipv4.gateway }}";

/// Route to a network through a gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub gateway: String,
    pub netmask: String,
    pub network: String,
}

/// Configuration of one interface and the routes through it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRoutes {
    pub interface_default_gateway: String,
    pub interface_ip: String,
    pub interface_netmask: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_routes: Option<Vec<Route>>,
}

impl InterfaceRoutes {
    /// Entry configuring the default interface from runtime facts
    pub fn auto_configured() -> Self {
        Self {
            interface_default_gateway: AUTO_DEFAULT_GATEWAY.to_string(),
            interface_ip: AUTO_INTERFACE_IP.to_string(),
            interface_netmask: AUTO_INTERFACE_NETMASK.to_string(),
            interface_routes: None,
        }
    }
}

/// Derive the routes of `device`
pub fn create_routes(device: &Device, sandbox: &Sandbox) -> Result<Vec<InterfaceRoutes>, ResolutionError> {
    let mut routes = vec![InterfaceRoutes::auto_configured()];

    match device.purpose {
        DevicePurpose::Host | DevicePurpose::Controller => {
            if sandbox.router_present {
                routes.push(create_host_route(device, sandbox)?);
            }
        }
        DevicePurpose::Router => routes.push(create_router_routes(device, sandbox)?),
    }

    Ok(routes)
}

/// Pin the primary interface of a host to the router of its network
fn create_host_route(device: &Device, sandbox: &Sandbox) -> Result<InterfaceRoutes, ResolutionError> {
    let primary = device
        .primary_interface()
        .ok_or_else(|| ResolutionError::HostWithoutNetwork {
            host: device.name.clone(),
        })?;
    let network = sandbox.network(primary.network);

    let gateway = sandbox
        .router_in_network(primary.network)
        .and_then(|router| router.interfaces.iter().find(|i| i.network == primary.network))
        .ok_or_else(|| ResolutionError::NoRouterInNetwork {
            network: network.name.clone(),
        })?;

    Ok(InterfaceRoutes {
        interface_default_gateway: gateway.ip.to_string(),
        interface_ip: primary.ip.to_string(),
        interface_netmask: network.cidr.netmask().to_string(),
        interface_routes: Some(Vec::new()),
    })
}

/// Route every network the router is not attached to through the WAN
fn create_router_routes(device: &Device, sandbox: &Sandbox) -> Result<InterfaceRoutes, ResolutionError> {
    let unreachable: Vec<NetworkId> = sandbox.network_ids().filter(|id| !device.is_attached_to(*id)).collect();

    let mut routes = Vec::with_capacity(unreachable.len());
    for id in unreachable {
        let network = sandbox.network(id);
        let gateway = sandbox
            .router_in_network(id)
            .and_then(|router| sandbox.wan_address(router))
            .ok_or_else(|| ResolutionError::NoRouterInNetwork {
                network: network.name.clone(),
            })?;

        routes.push(Route {
            gateway: gateway.to_string(),
            netmask: network.cidr.netmask().to_string(),
            network: network.cidr.network().to_string(),
        });
    }

    let wan_ip = sandbox.wan_address(device).ok_or_else(|| ResolutionError::RouterNotInWan {
        router: device.name.clone(),
        wan: sandbox.wan.name.clone(),
    })?;

    Ok(InterfaceRoutes {
        interface_default_gateway: String::new(),
        interface_ip: wan_ip.to_string(),
        interface_netmask: sandbox.wan.cidr.netmask().to_string(),
        interface_routes: Some(routes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;
    use crate::sandbox::FlavorCatalog;
    use crate::topology::TopologyDefinition;

    const TWO_ROUTERS: &str = r#"
name: routed
hosts:
  - name: alice
    base_box:
      image: debian-10
    flavor: standard.small
  - name: bob
    base_box:
      image: debian-10
    flavor: standard.small
routers:
  - name: router-a
    base_box:
      image: debian-10
  - name: router-b
    base_box:
      image: debian-10
networks:
  - name: net-a
    cidr: 10.1.0.0/24
  - name: net-shared
    cidr: 10.2.0.0/24
  - name: net-b
    cidr: 10.3.0.0/16
net_mappings:
  - host: alice
    network: net-a
    ip: 10.1.0.10
  - host: bob
    network: net-b
    ip: 10.3.0.10
router_mappings:
  - router: router-a
    network: net-a
    ip: 10.1.0.1
  - router: router-a
    network: net-shared
    ip: 10.2.0.1
  - router: router-b
    network: net-b
    ip: 10.3.0.1
groups: []
"#;

    fn sandbox(yaml: &str) -> Sandbox {
        let topology = TopologyDefinition::from_yaml_str(yaml).unwrap();
        let flavors = FlavorCatalog::builtin().unwrap();
        Sandbox::build(&topology, &flavors, &SandboxConfig::default(), false).unwrap()
    }

    #[test]
    fn test_host_routes() {
        let sandbox = sandbox(TWO_ROUTERS);
        let alice = sandbox.find_device("alice").unwrap();
        let routes = create_routes(alice, &sandbox).unwrap();

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0], InterfaceRoutes::auto_configured());
        assert_eq!(routes[1].interface_ip, "10.1.0.10");
        assert_eq!(routes[1].interface_netmask, "255.255.255.0");
        assert_eq!(routes[1].interface_default_gateway, "10.1.0.1");
        assert_eq!(routes[1].interface_routes, Some(vec![]));
    }

    #[test]
    fn test_router_routes() {
        let sandbox = sandbox(TWO_ROUTERS);
        let router_a = sandbox.find_device("router-a").unwrap();
        let routes = create_routes(router_a, &sandbox).unwrap();

        assert_eq!(routes.len(), 2);
        let wan_entry = &routes[1];
        assert_eq!(wan_entry.interface_ip, "100.100.100.1");
        assert_eq!(wan_entry.interface_netmask, "255.255.255.0");
        assert_eq!(wan_entry.interface_default_gateway, "");
        assert_eq!(
            wan_entry.interface_routes,
            Some(vec![Route {
                gateway: "100.100.100.2".to_string(),
                netmask: "255.255.0.0".to_string(),
                network: "10.3.0.0".to_string(),
            }])
        );

        let router_b = sandbox.find_device("router-b").unwrap();
        let nested = create_routes(router_b, &sandbox).unwrap()[1].interface_routes.clone().unwrap();
        let networks: Vec<&str> = nested.iter().map(|r| r.network.as_str()).collect();
        assert_eq!(networks, vec!["10.1.0.0", "10.2.0.0"]);
        assert!(nested.iter().all(|r| r.gateway == "100.100.100.1"));
    }

    #[test]
    fn test_no_router_in_network() {
        let yaml = TWO_ROUTERS.replace(
            "  - router: router-b\n    network: net-b\n    ip: 10.3.0.1\n",
            "",
        );
        let sandbox = sandbox(&yaml);
        let bob = sandbox.find_device("bob").unwrap();
        assert_eq!(
            create_routes(bob, &sandbox).unwrap_err(),
            ResolutionError::NoRouterInNetwork {
                network: "net-b".to_string()
            }
        );
    }

    #[test]
    fn test_hosts_without_routers_only_autoconfigure() {
        let yaml = r#"
name: flat
hosts:
  - name: alone
    base_box:
      image: debian-10
    flavor: standard.small
routers: []
networks:
  - name: lan
    cidr: 192.168.1.0/24
net_mappings:
  - host: alone
    network: lan
    ip: 192.168.1.2
router_mappings: []
groups: []
"#;
        let sandbox = sandbox(yaml);
        let routes = create_routes(&sandbox.devices[0], &sandbox).unwrap();
        assert_eq!(routes, vec![InterfaceRoutes::auto_configured()]);
    }
}
