//! Expanded sandbox model.
//!
//! Everything in here is produced once by `Sandbox::build` and is not
//! modified afterwards. Interfaces refer to their network by index into
//! [`Sandbox::networks`].

use crate::topology::Protocol;
use ipnet::IpNet;
use std::fmt;
use std::net::IpAddr;

/// Function of a device, which also determines the build order
///
/// The derived ordering is the build order: routers first, then hosts,
/// then the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DevicePurpose {
    Router,
    Host,
    Controller,
}

impl DevicePurpose {
    /// Type of machine a device with this purpose is
    pub fn device_type(self) -> DeviceType {
        match self {
            DevicePurpose::Router => DeviceType::Router,
            DevicePurpose::Host | DevicePurpose::Controller => DeviceType::Host,
        }
    }
}

impl fmt::Display for DevicePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevicePurpose::Router => f.write_str("router"),
            DevicePurpose::Host => f.write_str("host"),
            DevicePurpose::Controller => f.write_str("controller"),
        }
    }
}

/// Type of machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Router,
    Host,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Router => f.write_str("router"),
            DeviceType::Host => f.write_str("host"),
        }
    }
}

/// Type of a virtual network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkType {
    Private,
    Public,
}

impl NetworkType {
    /// Name of the network kind in the Vagrantfile
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Private => "private_network",
            NetworkType::Public => "public_network",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Virtual network of the sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub name: String,
    pub network_type: NetworkType,
    pub cidr: IpNet,
}

impl Network {
    pub fn new(name: impl Into<String>, network_type: NetworkType, cidr: IpNet) -> Self {
        Self {
            name: name.into(),
            network_type,
            cidr,
        }
    }
}

/// Position of a network in [`Sandbox::networks`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(pub(crate) usize);

impl NetworkId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Network interface of a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub network: NetworkId,
    pub ip: IpAddr,
}

/// A machine of the sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    pub purpose: DevicePurpose,
    /// Box image the machine is created from
    pub image: String,
    pub protocol: Protocol,
    /// Memory in MB
    pub memory: u64,
    pub cpus: u64,
    pub interfaces: Vec<Interface>,
    pub usb_passthrough: bool,
}

impl Device {
    pub fn device_type(&self) -> DeviceType {
        self.purpose.device_type()
    }

    /// The first interface, which hosts use for their default route
    pub fn primary_interface(&self) -> Option<&Interface> {
        self.interfaces.first()
    }

    /// Whether any interface of the device is in `network`
    pub fn is_attached_to(&self, network: NetworkId) -> bool {
        self.interfaces.iter().any(|interface| interface.network == network)
    }
}

/// User-defined Ansible group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsibleGroup {
    pub name: String,
    pub nodes: Vec<String>,
}

/// Fully expanded sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    /// Name of the topology
    pub name: String,
    /// Declared networks followed by the WAN when routers exist
    pub networks: Vec<Network>,
    pub wan: Network,
    /// Devices in build order
    pub devices: Vec<Device>,
    pub groups: Vec<AnsibleGroup>,
    pub router_present: bool,
    pub controller_present: bool,
    /// Whether Ansible runs on the operator machine rather than in the guests
    pub ansible_installed: bool,
}

impl Sandbox {
    /// Resolve an interface's network
    pub fn network(&self, id: NetworkId) -> &Network {
        &self.networks[id.0]
    }

    pub fn find_network(&self, name: &str) -> Option<NetworkId> {
        self.networks.iter().position(|n| n.name == name).map(NetworkId)
    }

    /// Position of the WAN in the network list, if routers exist
    pub fn wan_id(&self) -> Option<NetworkId> {
        self.find_network(&self.wan.name)
    }

    pub fn is_wan(&self, id: NetworkId) -> bool {
        self.network(id).name == self.wan.name
    }

    pub fn find_device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn network_ids(&self) -> impl Iterator<Item = NetworkId> {
        (0..self.networks.len()).map(NetworkId)
    }

    /// The first router (in build order) with an interface in `network`
    pub fn router_in_network(&self, network: NetworkId) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.purpose == DevicePurpose::Router && d.is_attached_to(network))
    }

    /// The address of `device` in the WAN
    pub fn wan_address(&self, device: &Device) -> Option<IpAddr> {
        device
            .interfaces
            .iter()
            .find(|interface| self.is_wan(interface.network))
            .map(|interface| interface.ip)
    }
}
