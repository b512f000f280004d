//! # Sandbox Creator - Vagrant and Ansible sandboxes from topology definitions
//!
//! This library turns a declarative network topology (hosts, routers,
//! networks, IP mappings and groups) into a local sandbox: a Vagrantfile and
//! the Ansible files that pre-configure name resolution and routing.
//!
//! ## Overview
//!
//! A topology document is parsed into a typed model, validated against its
//! cross-field invariants and expanded into devices with concrete network
//! interfaces. Routers get deterministic WAN addresses, and a controller
//! machine is added when WinRM machines must be provisioned from inside the
//! sandbox.
//!
//! ## Architecture
//!
//! - `topology`: Topology model, schema parsing and validation
//! - `ip`: Subnet checks and address allocation
//! - `sandbox`: Flavor catalog and expansion into devices and networks
//! - `ansible`: Static routes, host vars and group vars
//! - `vagrant`: Vagrantfile syntax tree and rendering
//! - `config`: Static configuration of the generator
//! - `config_loader`: Loading of topology, flavor and configuration files
//! - `orchestrator`: High-level generation of the sandbox directory
//! - `utils`: Value coercion and file helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sandbox_creator::orchestrator::{generate, GenerateOptions};
//!
//! let options = GenerateOptions {
//!     topology: "topology.yml".into(),
//!     output_dir: Some("sandbox".into()),
//!     ..Default::default()
//! };
//! let sandbox = generate(&options)?;
//!
//! // The sandbox directory now contains:
//! // - Vagrantfile
//! // - preconfig/: playbook, host_vars and group_vars
//! // - provisioning/: user provisioning or a template playbook
//! println!("{} devices", sandbox.devices.len());
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Topology Format
//!
//! ```yaml
//! name: small-sandbox
//! hosts:
//!   - name: server
//!     base_box:
//!       image: debian-10
//!     flavor: standard.small
//! routers:
//!   - name: router
//!     base_box:
//!       image: debian-10
//! networks:
//!   - name: server-net
//!     cidr: 10.10.10.0/24
//! net_mappings:
//!   - host: server
//!     network: server-net
//!     ip: 10.10.10.5
//! router_mappings:
//!   - router: router
//!     network: server-net
//!     ip: 10.10.10.1
//! groups: []
//! ```
//!
//! ## Error Handling
//!
//! The core (`topology`, `sandbox`, `ansible`) returns typed errors built
//! with `thiserror`. File loading and orchestration use `color_eyre` and
//! attach context to every failure.

pub mod ansible;
pub mod config;
pub mod config_loader;
pub mod ip;
pub mod orchestrator;
pub mod sandbox;
pub mod topology;
pub mod utils;
pub mod vagrant;
