//! Expansion of a validated topology into devices, networks and interfaces.

use super::error::{ExpansionError, IntegerParseError, ResolutionError};
use super::flavor::FlavorCatalog;
use super::types::{AnsibleGroup, Device, DevicePurpose, Interface, Network, NetworkId, NetworkType, Sandbox};
use crate::config::SandboxConfig;
use crate::ip::{find_available_address, nth_usable_address, AddressRegistry, CONTROLLER_SKIPPED_ADDRESSES};
use crate::topology::{ExtraValues, Host, Protocol, Router, TopologyDefinition};
use crate::utils::values::{coerce_flag, coerce_integer, display_value};
use log::{debug, info};

/// Memory and CPUs of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Resources {
    memory: u64,
    cpus: u64,
}

impl Sandbox {
    /// Expand a validated topology into a sandbox
    ///
    /// # Arguments
    /// * `topology` - Validated topology definition
    /// * `flavors` - Catalog used to resolve flavor names
    /// * `config` - Router defaults and controller settings
    /// * `ansible_installed` - Whether Ansible runs on the operator machine
    ///
    /// # Returns
    /// * `Ok(Sandbox)` - Devices sorted routers first, then hosts, then the controller
    /// * `Err(ExpansionError)` - If a flavor, integer, address or network cannot be resolved
    pub fn build(
        topology: &TopologyDefinition,
        flavors: &FlavorCatalog,
        config: &SandboxConfig,
        ansible_installed: bool,
    ) -> Result<Self, ExpansionError> {
        let networks = create_network_list(topology);
        let wan = Network::new(topology.wan.name.as_str(), NetworkType::Private, topology.wan.cidr);

        let mut devices = Vec::with_capacity(topology.hosts.len() + topology.routers.len() + 1);
        for host in &topology.hosts {
            devices.push(create_host_device(host, topology, flavors, &networks)?);
        }
        for (position, router) in topology.routers.iter().enumerate() {
            devices.push(create_router_device(router, position + 1, topology, flavors, config, &networks)?);
        }

        let controller_present = controller_needed(&devices, ansible_installed);
        if controller_present {
            let controller = create_controller_device(&devices, &networks, config)?;
            devices.push(controller);
        }

        devices.sort_by_key(|device| device.purpose);

        let groups = topology
            .groups
            .iter()
            .map(|group| AnsibleGroup {
                name: group.name.to_string(),
                nodes: group.nodes.iter().map(|node| node.to_string()).collect(),
            })
            .collect();

        let sandbox = Sandbox {
            name: topology.name.to_string(),
            networks,
            wan,
            devices,
            groups,
            router_present: topology.has_routers(),
            controller_present,
            ansible_installed,
        };

        info!(
            "Expanded topology '{}' into {} devices and {} networks",
            sandbox.name,
            sandbox.devices.len(),
            sandbox.networks.len()
        );
        Ok(sandbox)
    }
}

/// Declared networks, followed by the WAN when at least one router exists
fn create_network_list(topology: &TopologyDefinition) -> Vec<Network> {
    let mut networks: Vec<Network> = topology
        .networks
        .iter()
        .map(|network| Network::new(network.name.as_str(), NetworkType::Private, network.cidr))
        .collect();

    if topology.has_routers() {
        networks.push(Network::new(
            topology.wan.name.as_str(),
            NetworkType::Private,
            topology.wan.cidr,
        ));
    }
    networks
}

fn find_network(networks: &[Network], device: &str, name: &str) -> Result<NetworkId, ResolutionError> {
    networks
        .iter()
        .position(|network| network.name == name)
        .map(NetworkId)
        .ok_or_else(|| ResolutionError::UnknownNetwork {
            device: device.to_string(),
            network: name.to_string(),
        })
}

fn integer_extra(device: &str, field: &str, extra: &ExtraValues) -> Result<Option<u64>, IntegerParseError> {
    let Some(value) = extra.get(field) else {
        return Ok(None);
    };
    coerce_integer(value).map(Some).ok_or_else(|| IntegerParseError {
        owner: device.to_string(),
        field: field.to_string(),
        value: display_value(value),
    })
}

/// Resources from the flavor, overridden by `memory`/`cpus` extras
fn resolve_resources(
    device: &str,
    flavor: Option<&str>,
    extra: Option<&ExtraValues>,
    flavors: &FlavorCatalog,
) -> Result<Resources, ExpansionError> {
    let (mut memory, mut cpus) = match flavor {
        Some(name) => {
            let flavor = flavors.resolve(name).ok_or_else(|| ResolutionError::UnknownFlavor {
                device: device.to_string(),
                flavor: name.to_string(),
            })?;
            (Some(flavor.memory), Some(flavor.cpus))
        }
        None => (None, None),
    };

    if let Some(extra) = extra {
        if let Some(value) = integer_extra(device, "memory", extra)? {
            memory = Some(value);
        }
        if let Some(value) = integer_extra(device, "cpus", extra)? {
            cpus = Some(value);
        }
    }

    match (memory, cpus) {
        (Some(memory), Some(cpus)) => {
            debug!("Resolved {} to {} MB and {} CPUs", device, memory, cpus);
            Ok(Resources { memory, cpus })
        }
        _ => Err(ResolutionError::MissingResources {
            device: device.to_string(),
        }
        .into()),
    }
}

fn usb_passthrough(device: &str, extra: Option<&ExtraValues>) -> Result<bool, ResolutionError> {
    let Some(value) = extra.and_then(|extra| extra.get("usb_passthrough")) else {
        return Ok(false);
    };
    coerce_flag(value).ok_or_else(|| ResolutionError::InvalidFlag {
        device: device.to_string(),
        field: "usb_passthrough".to_string(),
        value: display_value(value),
    })
}

fn create_host_device(
    host: &Host,
    topology: &TopologyDefinition,
    flavors: &FlavorCatalog,
    networks: &[Network],
) -> Result<Device, ExpansionError> {
    let name = host.name.as_str();
    let flavor = Some(host.flavor.as_str()).filter(|flavor| !flavor.is_empty());
    let resources = resolve_resources(name, flavor, host.extra.as_ref(), flavors)?;

    let mut interfaces = Vec::new();
    for mapping in topology.net_mappings.iter().filter(|m| m.host == name) {
        interfaces.push(Interface {
            network: find_network(networks, name, &mapping.network)?,
            ip: mapping.ip,
        });
    }

    Ok(Device {
        name: name.to_string(),
        purpose: DevicePurpose::Host,
        image: host.base_box.image.clone(),
        protocol: host.base_box.mgmt_protocol,
        memory: resources.memory,
        cpus: resources.cpus,
        interfaces,
        usb_passthrough: usb_passthrough(name, host.extra.as_ref())?,
    })
}

/// Build router number `number` (1-based, declaration order)
fn create_router_device(
    router: &Router,
    number: usize,
    topology: &TopologyDefinition,
    flavors: &FlavorCatalog,
    config: &SandboxConfig,
    networks: &[Network],
) -> Result<Device, ExpansionError> {
    let name = router.name.as_str();
    let resources = match router.declared_flavor() {
        Some(flavor) => resolve_resources(name, Some(flavor), router.extra.as_ref(), flavors)?,
        None => Resources {
            memory: config.default_router_memory,
            cpus: config.default_router_cpus,
        },
    };

    let mut interfaces = Vec::new();
    for mapping in topology.router_mappings.iter().filter(|m| m.router == name) {
        interfaces.push(Interface {
            network: find_network(networks, name, &mapping.network)?,
            ip: mapping.ip,
        });
    }

    let wan_ip = nth_usable_address(&topology.wan.cidr, number).ok_or_else(|| ResolutionError::WanExhausted {
        router: name.to_string(),
        index: number,
        cidr: topology.wan.cidr,
    })?;
    debug!("Router {} gets WAN address {}", name, wan_ip);
    interfaces.push(Interface {
        network: find_network(networks, name, topology.wan.name.as_str())?,
        ip: wan_ip,
    });

    Ok(Device {
        name: name.to_string(),
        purpose: DevicePurpose::Router,
        image: router.base_box.image.clone(),
        protocol: router.base_box.mgmt_protocol,
        memory: resources.memory,
        cpus: resources.cpus,
        interfaces,
        usb_passthrough: false,
    })
}

/// A controller provisions WinRM machines when Ansible is not on the operator machine
fn controller_needed(devices: &[Device], ansible_installed: bool) -> bool {
    !ansible_installed && devices.iter().any(|device| device.protocol == Protocol::Winrm)
}

/// The network of the first WinRM host
fn find_network_for_controller(devices: &[Device]) -> Result<NetworkId, ResolutionError> {
    let host = devices
        .iter()
        .find(|device| device.purpose == DevicePurpose::Host && device.protocol == Protocol::Winrm)
        .ok_or(ResolutionError::NoControllerNetwork)?;

    host.primary_interface()
        .map(|interface| interface.network)
        .ok_or_else(|| ResolutionError::HostWithoutNetwork {
            host: host.name.clone(),
        })
}

fn create_controller_device(
    devices: &[Device],
    networks: &[Network],
    config: &SandboxConfig,
) -> Result<Device, ResolutionError> {
    let network_id = find_network_for_controller(devices)?;
    let network = &networks[network_id.index()];

    let mut registry = AddressRegistry::new();
    for device in devices {
        for interface in &device.interfaces {
            registry.register(interface.ip, &device.name)?;
        }
    }

    let ip = find_available_address(&network.cidr, &registry, CONTROLLER_SKIPPED_ADDRESSES).ok_or_else(|| {
        ResolutionError::NoFreeAddress {
            network: network.name.clone(),
        }
    })?;
    info!("Adding controller '{}' at {} in network '{}'", config.controller_name, ip, network.name);

    Ok(Device {
        name: config.controller_name.clone(),
        purpose: DevicePurpose::Controller,
        image: config.controller_box.clone(),
        protocol: Protocol::Ssh,
        memory: config.controller_memory,
        cpus: config.controller_cpus,
        interfaces: vec![Interface { network: network_id, ip }],
        usb_passthrough: false,
    })
}
