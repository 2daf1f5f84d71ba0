use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::wizard::WizardKind;

/// Nodesmith - the bare-metal node installer wizard
#[derive(Parser)]
#[command(name = "nodesmith")]
#[command(about = "Interactive configuration wizard for bare-metal node imaging")]
#[command(version)]
pub struct Cli {
    /// Wizard variant to run
    #[arg(long, default_value = "express")]
    pub wizard: WizardKind,

    /// Collect network parameters (adds the network page)
    #[arg(long)]
    pub network_setup: bool,

    /// Offer single-node cluster creation
    #[arg(long)]
    pub single_node: bool,

    /// Directory holding hypervisor/ and controller/ image trees
    #[arg(long, default_value = "images")]
    pub images_dir: PathBuf,

    /// License text shown by the custom wizard
    #[arg(long, default_value = "eula.txt")]
    pub eula: PathBuf,

    /// Where the collected parameters are written
    #[arg(long, default_value = "install_params.json")]
    pub out: PathBuf,

    /// Print the collected parameters to stdout instead of writing a file
    #[arg(long)]
    pub print_params: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a previously collected parameter file
    Validate {
        /// Path to the parameter file to validate
        params: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
