//! # m1ddctui: external monitor control panel
//!
//! A terminal UI for adjusting brightness, contrast, volume and RGB gain of an
//! external display through the `m1ddc` DDC/CI utility, with one-key presets.
//!
//! ## Usage
//!   m1ddctui                       # Launch TUI (classic profile)
//!   m1ddctui --profile extended    # Volume and RGB channels, built-in presets
//!   m1ddctui apply 2               # Apply preset 2 and exit
//!   m1ddctui status                # Print current values and exit
//!   m1ddctui init                  # Write a default settings file

mod app;
mod cli;
mod config;
mod focus;
mod gateway;
mod keymap;
mod logging;
mod params;
mod presets;
mod ui;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;

use app::App;
use cli::{Cli, Command};
use config::{AppConfig, PresetSource, Settings};
use gateway::{Gateway, M1ddc};
use params::Registry;
use presets::PresetStore;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg_path = cli.config.clone().unwrap_or_else(config::config_path);

    match &cli.command {
        Some(Command::Init) => init_config(&cfg_path),
        Some(Command::Status) => {
            let rt = Runtime::setup(&cli, &cfg_path)?;
            print_status(&rt.registry, rt.control);
            Ok(())
        }
        Some(Command::Presets) => {
            let rt = Runtime::setup(&cli, &cfg_path)?;
            print_presets(&rt.presets()?, &rt.registry);
            Ok(())
        }
        Some(Command::Apply { number }) => {
            let rt = Runtime::setup(&cli, &cfg_path)?;
            let presets = rt.presets()?;
            apply_headless(rt, presets, *number)
        }
        None => {
            let rt = Runtime::setup(&cli, &cfg_path)?;
            let presets = rt.presets()?;
            let Runtime {
                settings,
                registry,
                control,
            } = rt;
            let app = App::new(registry, presets, settings.keys, settings.step, control);
            let terminal = ratatui::try_init().context("failed to initialize terminal")?;
            let result = app.run(terminal);
            ratatui::restore();
            log::info!("exiting");
            result
        }
    }
}

/// Everything a run needs once the settings file has been read.
struct Runtime {
    settings: Settings,
    registry: Registry,
    control: M1ddc,
}

impl Runtime {
    fn setup(cli: &Cli, cfg_path: &Path) -> Result<Self> {
        let cfg = AppConfig::load(cfg_path)?;
        let log_file = cli.log_file.clone().unwrap_or_else(config::log_path);
        if let Err(e) = logging::init(&log_file, cfg.log_level.as_deref()) {
            eprintln!("m1ddctui: logging disabled: {e:#}");
        }

        let settings = Settings::resolve(cli, &cfg)?;
        log::debug!("settings: {settings:?}");
        let registry = Registry::for_profile(settings.profile, &settings.keys)
            .context("invalid parameter registry")?;
        let control = M1ddc::new(settings.gateway.clone());
        Ok(Self {
            settings,
            registry,
            control,
        })
    }

    fn presets(&self) -> Result<PresetStore> {
        match &self.settings.presets {
            PresetSource::File(path) => PresetStore::load(path, &self.registry),
            PresetSource::Builtin => Ok(PresetStore::builtin()),
        }
    }
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        eprintln!("m1ddctui: {} already exists, leaving it alone", path.display());
        return Ok(());
    }
    AppConfig::default()
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    eprintln!("m1ddctui: wrote {}", path.display());
    Ok(())
}

fn print_presets(presets: &PresetStore, registry: &Registry) {
    if presets.is_empty() {
        println!("(no presets)");
        return;
    }
    for row in presets.rows(registry) {
        println!("{row}");
    }
}

fn print_status(registry: &Registry, control: M1ddc) {
    let mut gateway = Gateway::new(control);
    for p in registry.iter() {
        let v = gateway.get(p);
        match gateway.take_failure() {
            Some(msg) => println!("{:<12} {v:>3}  ({msg})", p.label),
            None => println!("{:<12} {v:>3}", p.label),
        }
    }
}

/// Headless: apply one preset and exit (for login scripts and hotkeys).
fn apply_headless(rt: Runtime, presets: PresetStore, number: usize) -> Result<()> {
    if presets.by_number(number).is_none() {
        bail!("no preset {number}, choose 1..={}", presets.len());
    }
    let Runtime {
        settings,
        registry,
        control,
    } = rt;
    let mut app = App::new(registry, presets, settings.keys, settings.step, control);
    app.dispatch(keymap::Action::PresetNumber(number));
    let (msg, err) = app.status();
    if err {
        bail!("{}", msg.trim_start_matches([' ', '✗']).trim());
    }
    for (p, v) in app.registry().iter().zip(app.values()) {
        println!("{:<12} {v:>3}", p.label);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m1ddctui").join("config.json");
        init_config(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());

        std::fs::write(&path, r#"{"step": 9}"#).unwrap();
        init_config(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap().step, 9);
    }
}
