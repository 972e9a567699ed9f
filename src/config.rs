//! Per-user paths and the settings file (`~/.config/m1ddctui/config.json`).
//!
//! Precedence for every setting: command line, then settings file, then the
//! profile's default.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::params::{KeyOptions, Profile};

pub const DEFAULT_GATEWAY: &str = "m1ddc";
pub const DEFAULT_STEP: i32 = 5;

pub fn config_dir() -> PathBuf {
    config_dir_in(std::env::var_os("HOME").map(PathBuf::from))
}

fn config_dir_in(home: Option<PathBuf>) -> PathBuf {
    home.filter(|h| !h.as_os_str().is_empty())
        .unwrap_or_else(std::env::temp_dir)
        .join(".config")
        .join("m1ddctui")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

pub fn presets_path() -> PathBuf {
    config_dir().join("presets.yaml")
}

pub fn log_path() -> PathBuf {
    config_dir().join("m1ddctui.log")
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub gateway: String,
    pub profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presets_file: Option<PathBuf>,
    pub step: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vi_keys: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digit_presets: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_GATEWAY.into(),
            profile: Profile::Classic,
            presets_file: None,
            step: DEFAULT_STEP,
            vi_keys: None,
            digit_presets: None,
            log_level: None,
        }
    }
}

impl AppConfig {
    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parsing settings in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Where presets come from for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetSource {
    File(PathBuf),
    Builtin,
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub profile: Profile,
    pub gateway: String,
    pub presets: PresetSource,
    pub keys: KeyOptions,
    pub step: i32,
}

impl Settings {
    pub fn resolve(cli: &Cli, cfg: &AppConfig) -> Result<Self> {
        let profile = cli.profile.unwrap_or(cfg.profile);
        let step = cfg.step;
        if step <= 0 {
            bail!("step must be positive, got {step}");
        }

        let presets = match cli.presets.clone().or_else(|| cfg.presets_file.clone()) {
            Some(path) => PresetSource::File(path),
            None if profile.requires_preset_file() => PresetSource::File(presets_path()),
            None => PresetSource::Builtin,
        };

        Ok(Self {
            profile,
            gateway: cli.gateway.clone().unwrap_or_else(|| cfg.gateway.clone()),
            presets,
            keys: KeyOptions {
                vi_keys: cfg.vi_keys.unwrap_or(true),
                digit_presets: cfg.digit_presets.unwrap_or(profile.digit_presets()),
            },
            step,
        })
    }
}
