use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use sandbox_creator::orchestrator::{generate, GenerateOptions};

/// Generate a Vagrant and Ansible sandbox from a topology definition
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the topology definition YAML file
    topology: PathBuf,

    /// Output directory for the sandbox (default: "sandbox" next to the topology file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run Ansible from the host machine instead of inside the guests
    #[arg(short, long)]
    ansible_installed: bool,

    /// Directory with user provisioning files (must contain playbook.yml)
    #[arg(short, long)]
    provisioning_dir: Option<PathBuf>,

    /// YAML file with extra variables for the user provisioning
    #[arg(short, long)]
    extra_vars: Option<PathBuf>,

    /// Regenerate the provisioning template even if it already exists
    #[arg(short, long)]
    generate_provisioning: bool,

    /// Run Ansible in verbose mode
    #[arg(long)]
    verbose_ansible: bool,

    /// Static configuration file replacing the built-in one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Flavor catalog replacing the built-in one
    #[arg(short, long)]
    flavors: Option<PathBuf>,

    /// Prefix removed from every box image name
    #[arg(long)]
    strip_image_prefix: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            topology: self.topology.clone(),
            output_dir: self.output.clone(),
            ansible_installed: self.ansible_installed,
            provisioning_dir: self.provisioning_dir.clone(),
            extra_vars: self.extra_vars.clone(),
            generate_provisioning: self.generate_provisioning,
            verbose_ansible: self.verbose_ansible,
            config: self.config.clone(),
            flavors: self.flavors.clone(),
            strip_image_prefix: self.strip_image_prefix.clone(),
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Topology definition: {:?}", args.topology);

    let sandbox = generate(&args.generate_options())?;

    info!(
        "Created sandbox '{}' with {} devices{}",
        sandbox.name,
        sandbox.devices.len(),
        if sandbox.controller_present { " (including controller)" } else { "" }
    );
    info!("Ready to run: vagrant up");
    Ok(())
}
