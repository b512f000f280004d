//! Ansible pre-configuration module.
//!
//! This module derives the static routes and the host and group variables
//! consumed by the pre-configuration playbook.

pub mod routes;
pub mod vars;

// Re-export key types and functions for easier access
pub use routes::{create_routes, InterfaceRoutes, Route};
pub use vars::{
    create_group_vars, create_host_vars, create_provisioning_group_vars, device_aliases, GroupVars, HostVars,
};
