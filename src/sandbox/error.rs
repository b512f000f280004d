//! Errors raised while expanding a topology into a sandbox.

use crate::ip::AddressConflict;
use ipnet::IpNet;

/// An attribute that should hold an integer does not
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} value \"{value}\" of \"{owner}\" is not an integer")]
pub struct IntegerParseError {
    /// Device or flavor the attribute belongs to
    pub owner: String,
    pub field: String,
    pub value: String,
}

/// Expansion-time failure to resolve part of the sandbox
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionError {
    #[error("Invalid flavor \"{flavor}\" of device \"{device}\"")]
    UnknownFlavor { device: String, flavor: String },

    #[error("Device \"{device}\" has neither a flavor nor both memory and cpus set")]
    MissingResources { device: String },

    #[error("{field} value \"{value}\" of \"{device}\" is not a boolean")]
    InvalidFlag { device: String, field: String, value: String },

    #[error("Unknown network \"{network}\" referenced by \"{device}\"")]
    UnknownNetwork { device: String, network: String },

    #[error("WAN {cidr} has no address for router number {index} (\"{router}\")")]
    WanExhausted { router: String, index: usize, cidr: IpNet },

    #[error("No appropriate network for controller")]
    NoControllerNetwork,

    #[error("Host \"{host}\" has no network")]
    HostWithoutNetwork { host: String },

    #[error(transparent)]
    AddressConflict(#[from] AddressConflict),

    #[error("There is no free address for the controller in the network \"{network}\"")]
    NoFreeAddress { network: String },

    #[error("There is no router in the network \"{network}\"")]
    NoRouterInNetwork { network: String },

    #[error("Router \"{router}\" is not part of the network \"{wan}\"")]
    RouterNotInWan { router: String, wan: String },
}

/// Failure to expand a topology
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpansionError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    IntegerParse(#[from] IntegerParseError),
}
