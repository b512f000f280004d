use crate::config::SandboxConfig;
use crate::sandbox::FlavorCatalog;
use crate::topology::TopologyDefinition;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs;
use std::path::Path;

/// Load, parse and validate a topology definition file
pub fn load_topology(topology_path: &Path) -> Result<TopologyDefinition> {
    info!("Loading topology definition from: {:?}", topology_path);

    let content = fs::read_to_string(topology_path)
        .wrap_err_with(|| format!("Failed to read topology file '{}'", topology_path.display()))?;

    let topology = TopologyDefinition::from_yaml_str(&content)
        .wrap_err_with(|| format!("Invalid topology definition '{}'", topology_path.display()))?;

    info!(
        "Loaded topology '{}' ({} hosts, {} routers, {} networks)",
        topology.name,
        topology.hosts.len(),
        topology.routers.len(),
        topology.networks.len()
    );
    Ok(topology)
}

/// Load the flavor catalog from a file, or the built-in one
pub fn load_flavors(flavors_path: Option<&Path>) -> Result<FlavorCatalog> {
    match flavors_path {
        Some(path) => {
            info!("Loading flavors from: {:?}", path);
            let content = fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read flavor file '{}'", path.display()))?;
            FlavorCatalog::from_yaml_str(&content)
                .wrap_err_with(|| format!("Invalid flavor file '{}'", path.display()))
        }
        None => FlavorCatalog::builtin().wrap_err("Invalid built-in flavor catalog"),
    }
}

/// Load the static configuration from a file, or the built-in one
pub fn load_sandbox_config(config_path: Option<&Path>) -> Result<SandboxConfig> {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            let content = fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read configuration file '{}'", path.display()))?;
            SandboxConfig::from_yaml_str(&content)
                .wrap_err_with(|| format!("Invalid configuration file '{}'", path.display()))
        }
        None => SandboxConfig::builtin().wrap_err("Invalid built-in configuration"),
    }
}
