//! Sandbox generation orchestrator.
//!
//! This module coordinates the overall generation process, managing the flow
//! from topology loading through expansion to the Vagrantfile and the Ansible
//! files of the sandbox directory.

use crate::ansible::{create_group_vars, create_host_vars, create_provisioning_group_vars, GroupVars, HostVars};
use crate::config::SandboxConfig;
use crate::config_loader::{load_flavors, load_sandbox_config, load_topology};
use crate::sandbox::Sandbox;
use crate::topology::image_name_strip;
use crate::utils::fs::{copy_dir, copy_file, remove_dir_if_exists, write_file, write_yaml};
use crate::vagrant::{ProvisionerOptions, Vagrantfile};
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Pre-configuration playbook shipped with the binary
pub const PRECONFIG_PLAYBOOK: &str = include_str!("../resources/preconfig_playbook.yml");

/// Template of the user provisioning playbook
pub const USER_PLAYBOOK: &str = include_str!("../resources/user_playbook.yml");

/// Name of the generated Vagrantfile
pub const VAGRANTFILE: &str = "Vagrantfile";

/// Inputs of a sandbox generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Topology definition file
    pub topology: PathBuf,
    /// Output directory; defaults to `sandbox` next to the topology file
    pub output_dir: Option<PathBuf>,
    /// Ansible runs on the operator machine instead of inside the guests
    pub ansible_installed: bool,
    /// User provisioning directory containing `playbook.yml`
    pub provisioning_dir: Option<PathBuf>,
    /// YAML file with Ansible extra vars
    pub extra_vars: Option<PathBuf>,
    /// Regenerate the provisioning template even if one exists
    pub generate_provisioning: bool,
    pub verbose_ansible: bool,
    /// Static configuration file replacing the built-in one
    pub config: Option<PathBuf>,
    /// Flavor catalog replacing the built-in one
    pub flavors: Option<PathBuf>,
    /// Prefix removed from every box image name
    pub strip_image_prefix: Option<String>,
}

/// Validated paths of a generation
#[derive(Debug)]
struct ResolvedPaths {
    topology: PathBuf,
    output_dir: PathBuf,
    provisioning_dir: Option<PathBuf>,
    extra_vars: Option<PathBuf>,
}

fn resolve_paths(options: &GenerateOptions) -> Result<ResolvedPaths> {
    let topology = &options.topology;
    if !topology.exists() {
        bail!("\"{}\" does not exist", topology.display());
    }
    if !topology.is_file() {
        bail!("\"{}\" is not a file", topology.display());
    }

    let output_dir = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => topology
            .parent()
            .map(|parent| parent.join("sandbox"))
            .unwrap_or_else(|| PathBuf::from("sandbox")),
    };
    if output_dir.is_file() {
        bail!("Output directory \"{}\" is an existing file", output_dir.display());
    }

    if let Some(dir) = &options.provisioning_dir {
        if !dir.is_dir() {
            bail!("Directory \"{}\" does not exist", dir.display());
        }
        if !dir.join("playbook.yml").is_file() {
            bail!("Provisioning directory should contain \"playbook.yml\" file");
        }
    }

    if let Some(file) = &options.extra_vars {
        if !file.exists() {
            bail!("File \"{}\" does not exist", file.display());
        }
        if !file.is_file() {
            bail!("\"{}\" is not a file", file.display());
        }
    }

    Ok(ResolvedPaths {
        topology: topology.clone(),
        output_dir,
        provisioning_dir: options.provisioning_dir.clone(),
        extra_vars: options.extra_vars.clone(),
    })
}

/// Everything derived from the topology, computed before any file is written
struct SandboxFiles {
    vagrantfile: Vagrantfile,
    host_vars: Vec<(String, HostVars)>,
    group_vars: Vec<(&'static str, GroupVars)>,
}

impl SandboxFiles {
    fn derive(sandbox: &Sandbox, config: &SandboxConfig, options: &ProvisionerOptions) -> Result<Self> {
        let host_vars = create_host_vars(sandbox).wrap_err("Could not derive routes")?;
        Ok(Self {
            vagrantfile: Vagrantfile::new(sandbox, config, options),
            host_vars,
            group_vars: create_group_vars(sandbox, config),
        })
    }
}

/// Generate a complete sandbox directory
///
/// Writes the Vagrantfile, the pre-configuration (playbook, host and group
/// vars) and the user provisioning into the output directory and returns the
/// expanded sandbox. Nothing is written when the topology cannot be expanded.
pub fn generate(options: &GenerateOptions) -> Result<Sandbox> {
    let paths = resolve_paths(options).wrap_err("Could not process input variables")?;

    let config = load_sandbox_config(options.config.as_deref())?;
    let flavors = load_flavors(options.flavors.as_deref())?;
    let mut topology = load_topology(&paths.topology).wrap_err("Definition parsing has failed")?;
    if let Some(prefix) = &options.strip_image_prefix {
        topology = image_name_strip(prefix, topology);
    }

    let sandbox = Sandbox::build(&topology, &flavors, &config, options.ansible_installed)
        .wrap_err("Definition parsing has failed")?;

    let provisioner_options = ProvisionerOptions {
        verbose_ansible: options.verbose_ansible,
        extra_vars: paths.extra_vars.is_some(),
        include_requirements: paths
            .provisioning_dir
            .as_ref()
            .is_some_and(|dir| dir.join("requirements.yml").is_file()),
    };
    let files = SandboxFiles::derive(&sandbox, &config, &provisioner_options)
        .wrap_err("Definition parsing has failed")?;

    generate_vagrantfile(&files.vagrantfile, &paths.output_dir).wrap_err("Could not generate Vagrantfile")?;

    generate_preconfig(&files, &config, &paths.output_dir)
        .wrap_err("Could not generate pre-configuration files")?;
    generate_provisioning(options, &paths, &config).wrap_err("Could not generate provisioning files")?;

    info!("Sandbox '{}' generated in {:?}", sandbox.name, paths.output_dir);
    Ok(sandbox)
}

fn generate_vagrantfile(vagrantfile: &Vagrantfile, output_dir: &Path) -> Result<()> {
    let path = output_dir.join(VAGRANTFILE);
    write_file(&path, &vagrantfile.to_string())?;
    info!("Generated {:?}", path);
    Ok(())
}

fn write_group_vars(group_dir: &Path, groups: &[(&str, GroupVars)]) -> Result<()> {
    for (group, vars) in groups {
        if vars.is_empty() {
            debug!("Skipping empty group vars of '{}'", group);
            continue;
        }
        write_yaml(&group_dir.join(format!("{}.yml", group)), vars)?;
    }
    Ok(())
}

/// Replace the pre-configuration directory
fn generate_preconfig(files: &SandboxFiles, config: &SandboxConfig, output_dir: &Path) -> Result<()> {
    remove_dir_if_exists(&output_dir.join(&config.preconfig_dir))?;

    let host_dir = output_dir.join(&config.preconfig_host_vars);
    for (device, vars) in &files.host_vars {
        write_yaml(&host_dir.join(format!("{}.yml", device)), vars)?;
    }

    write_group_vars(&output_dir.join(&config.preconfig_group_vars), &files.group_vars)?;

    write_file(&output_dir.join(&config.preconfig_playbook), PRECONFIG_PLAYBOOK)?;
    info!("Generated pre-configuration in {:?}", output_dir.join(&config.preconfig_dir));
    Ok(())
}

/// Copy the user provisioning, or write a template when there is none
fn generate_provisioning(options: &GenerateOptions, paths: &ResolvedPaths, config: &SandboxConfig) -> Result<()> {
    let output_dir = &paths.output_dir;
    let provisioning_path = output_dir.join(&config.provisioning_dir);
    let playbook_exists = output_dir.join(&config.provisioning_playbook).is_file();

    if let Some(user_dir) = &paths.provisioning_dir {
        remove_dir_if_exists(&provisioning_path)?;
        copy_dir(user_dir, &provisioning_path)?;
        info!("Copied user provisioning from {:?}", user_dir);
    } else if options.generate_provisioning || !playbook_exists {
        remove_dir_if_exists(&provisioning_path)?;
        write_file(&output_dir.join(&config.provisioning_playbook), USER_PLAYBOOK)?;
        write_group_vars(
            &output_dir.join(&config.provisioning_group_vars),
            &create_provisioning_group_vars(),
        )?;
        info!("Generated provisioning template in {:?}", provisioning_path);
    } else {
        debug!("Keeping existing provisioning in {:?}", provisioning_path);
    }

    if let Some(extra_vars) = &paths.extra_vars {
        copy_file(extra_vars, &output_dir.join(&config.user_extra_vars))?;
    }
    Ok(())
}
