//! Construction of the Vagrantfile tree from an expanded sandbox.

use super::types::{Argument, Block, Element, Literal, RubyArray, RubyHash, Vagrantfile};
use crate::config::SandboxConfig;
use crate::sandbox::{Device, DevicePurpose, DeviceType, Sandbox};
use crate::topology::Protocol;
use log::warn;

/// Name of the Ruby variable holding the Ansible groups
pub const ANSIBLE_GROUPS_VARIABLE: &str = "ansible_groups";

/// Groups generated for every sandbox; user groups may not reuse these names
pub const BUILTIN_GROUPS: [&str; 5] = ["hosts", "routers", "ssh", "winrm", "ansible"];

/// Settings of the Ansible provisioners
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionerOptions {
    /// Run Ansible with `-vv`
    pub verbose_ansible: bool,
    /// An extra vars file is copied into the sandbox
    pub extra_vars: bool,
    /// The user provisioning has Galaxy requirements
    pub include_requirements: bool,
}

/// Which part of the sandbox configuration a provisioner applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Preconfig,
    Provisioning,
}

struct Builder<'a> {
    sandbox: &'a Sandbox,
    config: &'a SandboxConfig,
    options: &'a ProvisionerOptions,
}

impl Vagrantfile {
    /// Build the Vagrantfile of a sandbox
    pub fn new(sandbox: &Sandbox, config: &SandboxConfig, options: &ProvisionerOptions) -> Self {
        let builder = Builder {
            sandbox,
            config,
            options,
        };

        let devices = sandbox
            .devices
            .iter()
            .map(|device| Element::Block(builder.device_block(device)))
            .collect();

        Vagrantfile {
            variables: vec![builder.ansible_groups()],
            root: Block::new("configure(\"2\")", None, "config", devices),
        }
    }
}

impl Builder<'_> {
    fn ansible_groups(&self) -> RubyHash {
        let mut hosts = Vec::new();
        let mut routers = Vec::new();
        let mut ssh = Vec::new();
        let mut winrm = Vec::new();
        let mut ansible = Vec::new();

        for device in &self.sandbox.devices {
            ansible.push(device.name.clone());
            match device.device_type() {
                DeviceType::Host => hosts.push(device.name.clone()),
                DeviceType::Router => routers.push(device.name.clone()),
            }
            match device.protocol {
                Protocol::Ssh => ssh.push(device.name.clone()),
                Protocol::Winrm => winrm.push(device.name.clone()),
            }
        }

        let mut entries: Vec<RubyArray> = BUILTIN_GROUPS
            .iter()
            .zip([hosts, routers, ssh, winrm, ansible])
            .map(|(name, items)| RubyArray {
                name: name.to_string(),
                items,
            })
            .collect();

        for group in &self.sandbox.groups {
            if BUILTIN_GROUPS.contains(&group.name.as_str()) {
                warn!("Ignoring user group '{}', the name is reserved", group.name);
                continue;
            }
            entries.push(RubyArray {
                name: group.name.clone(),
                items: group.nodes.clone(),
            });
        }

        RubyHash {
            name: ANSIBLE_GROUPS_VARIABLE.to_string(),
            entries,
        }
    }

    fn device_block(&self, device: &Device) -> Block {
        let mut content = vec![
            Element::attribute("vm.hostname", Literal::str(&device.name)),
            Element::attribute("vm.box", Literal::str(&device.image)),
        ];

        if device.protocol == Protocol::Winrm {
            content.push(Element::attribute("vm.communicator", Literal::str("winrm")));
            content.push(Element::attribute("ssh.username", Literal::str("windows")));
            content.push(Element::attribute("winrm.username", Literal::str("windows")));
            content.push(Element::attribute("winrm.password", Literal::str("vagrant")));
        }

        content.push(Element::Block(Self::provider_block(device)));

        if !self.sandbox.ansible_installed && device.protocol == Protocol::Ssh {
            content.push(Element::call(
                "vm.synced_folder",
                vec![
                    Argument::positional(Literal::str(".")),
                    Argument::positional(Literal::str("/vagrant")),
                    Argument::keyword("type", Literal::str("rsync")),
                    Argument::keyword("rsync__exclude", Literal::str(".git/")),
                ],
            ));
        }

        for interface in &device.interfaces {
            let network = self.sandbox.network(interface.network);
            content.push(Element::call(
                "vm.network",
                vec![
                    Argument::positional(Literal::Symbol(network.network_type.to_string())),
                    Argument::keyword("virtualbox__intnet", Literal::str(&network.name)),
                    Argument::keyword("ip", Literal::str(interface.ip.to_string())),
                    Argument::keyword("netmask", Literal::str(network.cidr.netmask().to_string())),
                ],
            ));
        }

        content.extend(self.provisioners(device).into_iter().map(Element::Block));

        Block::new("vm.define", Some(device.name.clone()), "device", content)
            .with_note(format!("Device({}): {}", device.device_type(), device.name))
    }

    fn provider_block(device: &Device) -> Block {
        let mut content = vec![
            Element::attribute("memory", Literal::Int(device.memory)),
            Element::attribute("cpus", Literal::Int(device.cpus)),
        ];
        if device.usb_passthrough {
            content.push(Element::call(
                "customize",
                vec![Argument::positional(Literal::raw("[\"modifyvm\", :id, \"--usb\", \"on\"]"))],
            ));
        }
        Block::new("vm.provider", Some("virtualbox".to_string()), "vb", content)
    }

    /// Provisioner blocks of a device
    ///
    /// With a controller, the controller provisions itself and the WinRM
    /// machines, and WinRM machines get no provisioner of their own.
    fn provisioners(&self, device: &Device) -> Vec<Block> {
        let own = || {
            vec![
                self.provision(Stage::Preconfig, &device.name),
                self.provision(Stage::Provisioning, &device.name),
            ]
        };

        if self.sandbox.ansible_installed || !self.sandbox.controller_present {
            return own();
        }

        match (device.purpose, device.protocol) {
            (_, Protocol::Winrm) => Vec::new(),
            (DevicePurpose::Controller, Protocol::Ssh) => vec![
                self.provision(Stage::Preconfig, &device.name),
                self.provision(Stage::Preconfig, "winrm"),
                self.provision(Stage::Provisioning, &self.winrm_hosts()),
            ],
            (DevicePurpose::Router | DevicePurpose::Host, Protocol::Ssh) => own(),
        }
    }

    /// Comma-separated names of the WinRM hosts
    fn winrm_hosts(&self) -> String {
        self.sandbox
            .devices
            .iter()
            .filter(|d| d.purpose == DevicePurpose::Host && d.protocol == Protocol::Winrm)
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn provision(&self, stage: Stage, limit: &str) -> Block {
        let provisioner = if self.sandbox.ansible_installed {
            "ansible"
        } else {
            "ansible_local"
        };

        let playbook = match stage {
            Stage::Preconfig => &self.config.preconfig_playbook,
            Stage::Provisioning => &self.config.provisioning_playbook,
        };
        let mut content = vec![
            Element::attribute("playbook", Literal::str(playbook)),
            Element::attribute("groups", Literal::raw(ANSIBLE_GROUPS_VARIABLE)),
        ];

        let verbose = || Element::attribute("verbose", Literal::str("vv"));
        let limit_to = || Element::attribute("limit", Literal::str(limit));

        // Preconfig limits before the optional settings, provisioning after them
        if stage == Stage::Preconfig {
            content.push(limit_to());
            if self.options.verbose_ansible {
                content.push(verbose());
            }
        } else {
            if self.options.verbose_ansible {
                content.push(verbose());
            }
            if self.options.extra_vars {
                content.push(Element::attribute("extra_vars", Literal::str(&self.config.user_extra_vars)));
            }
            if self.options.include_requirements {
                content.push(Element::attribute(
                    "galaxy_role_file",
                    Literal::str(self.config.provisioning_requirements()),
                ));
                content.push(Element::attribute(
                    "galaxy_roles_path",
                    Literal::str(self.config.provisioning_roles()),
                ));
                content.push(Element::attribute(
                    "galaxy_command",
                    Literal::str(
                        "sudo ansible-galaxy install --role-file=%{role_file} --roles-path=%{roles_path} --force",
                    ),
                ));
            }
            content.push(limit_to());
        }

        Block::new("vm.provision", Some(provisioner.to_string()), "ansible", content)
    }
}
