//! Host and group variables of the pre-configuration.

use super::routes::{create_routes, InterfaceRoutes};
use crate::config::SandboxConfig;
use crate::sandbox::{Device, DeviceType, Interface, ResolutionError, Sandbox};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Variables of a single group, sorted by name
pub type GroupVars = BTreeMap<String, Value>;

/// Variables of a single device
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostVars {
    /// IP address to name of every other device, for `/etc/hosts`
    pub device_aliases: BTreeMap<String, String>,
    pub routes: Vec<InterfaceRoutes>,
}

/// The interface of `device` through which `viewer` reaches it
fn alias_interface<'a>(viewer: &Device, device: &'a Device, sandbox: &Sandbox) -> Option<&'a Interface> {
    if let [only] = device.interfaces.as_slice() {
        return Some(only);
    }

    let viewer_type = viewer.device_type();
    let viewer_network = viewer.primary_interface().map(|interface| interface.network);

    let preferred = device.interfaces.iter().find(|interface| match viewer_type {
        DeviceType::Host => viewer_network == Some(interface.network),
        DeviceType::Router => sandbox.is_wan(interface.network),
    });

    preferred.or_else(|| match viewer_type {
        DeviceType::Host => device.interfaces.iter().find(|interface| sandbox.is_wan(interface.network)),
        DeviceType::Router => None,
    })
}

/// Addresses and names of all other devices as seen from `viewer`
pub fn device_aliases(viewer: &Device, sandbox: &Sandbox) -> BTreeMap<String, String> {
    sandbox
        .devices
        .iter()
        .filter(|device| device.name != viewer.name)
        .filter_map(|device| {
            alias_interface(viewer, device, sandbox).map(|interface| (interface.ip.to_string(), device.name.clone()))
        })
        .collect()
}

/// Variables of every device, in build order
pub fn create_host_vars(sandbox: &Sandbox) -> Result<Vec<(String, HostVars)>, ResolutionError> {
    sandbox
        .devices
        .iter()
        .map(|device| -> Result<(String, HostVars), ResolutionError> {
            let vars = HostVars {
                device_aliases: device_aliases(device, sandbox),
                routes: create_routes(device, sandbox)?,
            };
            Ok((device.name.clone(), vars))
        })
        .collect()
}

fn group_vars<const N: usize>(entries: [(&str, Value); N]) -> GroupVars {
    entries.into_iter().map(|(key, value)| (key.to_string(), value)).collect()
}

/// Connection variables of WinRM machines
pub fn winrm_vars() -> GroupVars {
    group_vars([
        ("ansible_connection", Value::from("winrm")),
        ("ansible_user", Value::from("windows")),
        ("ansible_password", Value::from("vagrant")),
        ("ansible_port", Value::from(5986)),
        ("ansible_winrm_transport", Value::from("basic")),
        ("ansible_winrm_server_cert_validation", Value::from("ignore")),
    ])
}

/// Connection variables of SSH machines
pub fn ssh_vars(ansible_installed: bool) -> GroupVars {
    let mut vars = group_vars([("ansible_python_interpreter", Value::from("python3"))]);
    if ansible_installed {
        vars.insert("ansible_host".to_string(), Value::from("127.0.0.1"));
        vars.insert("ansible_user".to_string(), Value::from("vagrant"));
    } else {
        vars.insert("ansible_connection".to_string(), Value::from("local"));
    }
    vars
}

/// Variables of the built-in groups, in the order `all`, `hosts`, `routers`, `ssh`, `winrm`
///
/// Groups without variables are included with an empty mapping.
pub fn create_group_vars(sandbox: &Sandbox, config: &SandboxConfig) -> Vec<(&'static str, GroupVars)> {
    let mut all = GroupVars::new();
    if sandbox.controller_present {
        all.insert("controller_name".to_string(), Value::from(config.controller_name.as_str()));
    }

    vec![
        ("all", all),
        ("hosts", GroupVars::new()),
        ("routers", GroupVars::new()),
        ("ssh", ssh_vars(sandbox.ansible_installed)),
        ("winrm", winrm_vars()),
    ]
}

/// Group variables needed by user provisioning of WinRM machines
pub fn create_provisioning_group_vars() -> Vec<(&'static str, GroupVars)> {
    vec![("winrm", winrm_vars())]
}
