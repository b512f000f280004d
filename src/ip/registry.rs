//! IP address registry.
//!
//! This file manages a registry of assigned IP addresses to ensure
//! uniqueness and track which addresses are assigned to which devices
//! in the sandbox.

use std::collections::HashMap;
use std::net::IpAddr;

/// An address is claimed by a second device
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("IP {ip} of device \"{device}\" is already assigned to device \"{existing}\"")]
pub struct AddressConflict {
    pub ip: IpAddr,
    /// Device that registered the address first
    pub existing: String,
    pub device: String,
}

/// Registry of assigned addresses across all networks of a sandbox
#[derive(Debug, Default)]
pub struct AddressRegistry {
    /// Tracks all assigned IP addresses to prevent collisions
    assigned_ips: HashMap<IpAddr, String>, // IP -> device name
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ip` as used by `device`
    ///
    /// Registering the same address twice for the same device is allowed.
    pub fn register(&mut self, ip: IpAddr, device: &str) -> Result<(), AddressConflict> {
        match self.assigned_ips.get(&ip) {
            Some(existing) if existing != device => Err(AddressConflict {
                ip,
                existing: existing.clone(),
                device: device.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.assigned_ips.insert(ip, device.to_string());
                Ok(())
            }
        }
    }

    /// Check if an IP is already assigned
    pub fn is_ip_assigned(&self, ip: &IpAddr) -> bool {
        self.assigned_ips.contains_key(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_conflict() {
        let mut registry = AddressRegistry::new();
        let ip: IpAddr = "10.0.0.10".parse().unwrap();

        assert!(registry.register(ip, "server").is_ok());
        assert!(registry.register(ip, "server").is_ok());
        assert_eq!(
            registry.register(ip, "client"),
            Err(AddressConflict {
                ip,
                existing: "server".to_string(),
                device: "client".to_string(),
            })
        );
        assert!(registry.is_ip_assigned(&ip));
    }
}
