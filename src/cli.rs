use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::params::Profile;

#[derive(Parser, Debug)]
#[command(
    name = "m1ddctui",
    version,
    about = "Terminal control panel for external monitor brightness, contrast and color"
)]
pub struct Cli {
    /// Parameter set and preset source
    #[arg(long, value_enum)]
    pub profile: Option<Profile>,

    /// Settings file (default: ~/.config/m1ddctui/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Preset file, YAML or JSON (default for classic: ~/.config/m1ddctui/presets.yaml)
    #[arg(long)]
    pub presets: Option<PathBuf>,

    /// Display-control executable to drive
    #[arg(long)]
    pub gateway: Option<String>,

    /// Log file (default: ~/.config/m1ddctui/m1ddctui.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Apply preset N (1-based) without starting the interface
    Apply {
        number: usize,
    },
    /// List the available presets
    Presets,
    /// Print each parameter's current value
    Status,
    /// Write a settings file with the defaults if none exists
    Init,
}
