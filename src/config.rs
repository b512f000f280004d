use serde::{Deserialize, Serialize};

/// Configuration shipped with the binary
pub const BUILTIN_CONFIGURATION: &str = include_str!("../resources/configuration.yml");

/// Static configuration of the sandbox generator
///
/// Paths are relative to the sandbox output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Memory (MB) of routers that declare no flavor
    pub default_router_memory: u64,
    /// CPUs of routers that declare no flavor
    pub default_router_cpus: u64,
    /// Name of the controller machine
    pub controller_name: String,
    /// Box image of the controller machine
    pub controller_box: String,
    pub controller_memory: u64,
    pub controller_cpus: u64,
    /// Directory with the generated pre-configuration
    pub preconfig_dir: String,
    pub preconfig_playbook: String,
    pub preconfig_host_vars: String,
    pub preconfig_group_vars: String,
    /// Directory with the user provisioning
    pub provisioning_dir: String,
    pub provisioning_playbook: String,
    pub provisioning_group_vars: String,
    /// Location of the copied Ansible extra vars file
    pub user_extra_vars: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            default_router_memory: 256,
            default_router_cpus: 1,
            controller_name: "controller".to_string(),
            controller_box: "munikypo/debian-11".to_string(),
            controller_memory: 1024,
            controller_cpus: 1,
            preconfig_dir: "preconfig".to_string(),
            preconfig_playbook: "preconfig/playbook.yml".to_string(),
            preconfig_host_vars: "preconfig/host_vars".to_string(),
            preconfig_group_vars: "preconfig/group_vars".to_string(),
            provisioning_dir: "provisioning".to_string(),
            provisioning_playbook: "provisioning/playbook.yml".to_string(),
            provisioning_group_vars: "provisioning/group_vars".to_string(),
            user_extra_vars: "provisioning/extra_vars.yml".to_string(),
        }
    }
}

impl SandboxConfig {
    /// Parse a configuration; missing keys keep their default value
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// The built-in configuration
    pub fn builtin() -> Result<Self, serde_yaml::Error> {
        Self::from_yaml_str(BUILTIN_CONFIGURATION)
    }

    /// Galaxy requirements file inside the provisioning directory
    pub fn provisioning_requirements(&self) -> String {
        format!("{}/requirements.yml", self.provisioning_dir)
    }

    /// Galaxy roles directory inside the provisioning directory
    pub fn provisioning_roles(&self) -> String {
        format!("{}/roles", self.provisioning_dir)
    }
}
