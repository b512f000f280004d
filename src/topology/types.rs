//! Topology definition types.
//!
//! This file contains the typed, order-preserving representation of a
//! topology definition document: hosts, routers, networks, the WAN,
//! network and router mappings, and groups.

use super::schema::{deserialize_cidr, NodeName};
use ipnet::IpNet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Default management user of a base box
pub const DEFAULT_MGMT_USER: &str = "kypo-man";

/// Default name of the WAN network
pub const DEFAULT_WAN_NAME: &str = "wan";

/// Default CIDR of the WAN network
pub const DEFAULT_WAN_CIDR: &str = "100.100.100.0/24";

/// Free-form extra values of a host or router (e.g. `memory`, `cpus`)
pub type ExtraValues = BTreeMap<String, serde_yaml::Value>;

/// Management protocol of a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    #[default]
    Ssh,
    Winrm,
}

impl Protocol {
    /// Upper-case name as written in topology documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Ssh => "SSH",
            Protocol::Winrm => "WINRM",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = super::SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_uppercase().as_str() {
            "SSH" => Ok(Protocol::Ssh),
            "WINRM" => Ok(Protocol::Winrm),
            _ => Err(super::SchemaError::InvalidProtocol(value.to_string())),
        }
    }
}

impl Serialize for Protocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Protocol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Base box (image) of a host or router
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseBox {
    /// Name of the box image
    pub image: String,
    /// User used for management access
    #[serde(default = "default_mgmt_user")]
    pub mgmt_user: String,
    /// Protocol used for management access
    #[serde(default)]
    pub mgmt_protocol: Protocol,
}

fn default_mgmt_user() -> String {
    DEFAULT_MGMT_USER.to_string()
}

/// End host of the topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Host {
    pub name: NodeName,
    pub base_box: BaseBox,
    pub flavor: String,
    #[serde(default)]
    pub block_internet: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<ExtraValues>,
}

/// Router of the topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Router {
    pub name: NodeName,
    pub base_box: BaseBox,
    /// Flavor of the router; routers without one use the configured defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<ExtraValues>,
}

impl Router {
    /// The declared flavor, if any (an empty string counts as undeclared)
    pub fn declared_flavor(&self) -> Option<&str> {
        self.flavor.as_deref().filter(|flavor| !flavor.is_empty())
    }
}

/// User network of the topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Network {
    pub name: NodeName,
    #[serde(deserialize_with = "deserialize_cidr")]
    pub cidr: IpNet,
    #[serde(default = "default_accessible_by_user")]
    pub accessible_by_user: bool,
}

fn default_accessible_by_user() -> bool {
    true
}

/// Transit network connecting all routers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Wan {
    pub name: NodeName,
    #[serde(deserialize_with = "deserialize_cidr")]
    pub cidr: IpNet,
}

impl Default for Wan {
    fn default() -> Self {
        Self {
            name: NodeName::new_unchecked(DEFAULT_WAN_NAME),
            cidr: IpNet::from_str(DEFAULT_WAN_CIDR).expect("Invalid default WAN CIDR"),
        }
    }
}

/// Fixed address of a host in a network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkMapping {
    pub host: String,
    pub network: String,
    pub ip: IpAddr,
}

/// Fixed address of a router in a network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterMapping {
    pub router: String,
    pub network: String,
    pub ip: IpAddr,
}

/// Named group of hosts and routers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Group {
    pub name: NodeName,
    pub nodes: Vec<NodeName>,
}

/// Root of a topology definition document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologyDefinition {
    pub name: NodeName,
    pub hosts: Vec<Host>,
    pub routers: Vec<Router>,
    #[serde(default)]
    pub wan: Wan,
    pub networks: Vec<Network>,
    pub net_mappings: Vec<NetworkMapping>,
    pub router_mappings: Vec<RouterMapping>,
    pub groups: Vec<Group>,
}

impl TopologyDefinition {
    /// Parse and validate a topology definition from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self, super::TopologyError> {
        let document: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(super::SchemaError::from)?;
        Self::from_value(document)
    }

    /// Parse and validate a topology definition from an already parsed document
    ///
    /// Deprecated attributes are renamed first, then the document is
    /// deserialized (per-field checks) and finally the cross-field
    /// invariants are validated.
    pub fn from_value(document: serde_yaml::Value) -> Result<Self, super::TopologyError> {
        let topology = super::schema::parse_document(document)?;
        super::validation::validate(&topology)?;
        Ok(topology)
    }

    /// Whether at least one router is declared
    pub fn has_routers(&self) -> bool {
        !self.routers.is_empty()
    }
}
