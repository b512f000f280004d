//! Sandbox expansion module.
//!
//! This module turns a validated topology into the concrete machines,
//! networks and interfaces of a sandbox.

pub mod error;
pub mod expansion;
pub mod flavor;
pub mod types;

// Re-export commonly used types
pub use error::{ExpansionError, IntegerParseError, ResolutionError};
pub use flavor::{CatalogError, Flavor, FlavorCatalog};
pub use types::{AnsibleGroup, Device, DevicePurpose, DeviceType, Interface, Network, NetworkId, NetworkType, Sandbox};
