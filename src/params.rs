//! Parameter registry: the fixed set of display attributes the panel can drive.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
//  Parameters
// ═══════════════════════════════════════════════════════════════════════════════

/// How the gateway adjusts a parameter by a relative amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Native `chg` primitive with the raw delta.
    Standard,
    /// Red/green/blue gain; the tool's `chg` is biased, so deltas go through get + set.
    ColorChannel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub label: &'static str,
    pub shortcut: char,
    pub device_key: &'static str,
    pub kind: ParamKind,
}

impl Parameter {
    const fn new(label: &'static str, shortcut: char, device_key: &'static str) -> Self {
        Self {
            label,
            shortcut,
            device_key,
            kind: ParamKind::Standard,
        }
    }

    const fn channel(label: &'static str, shortcut: char, device_key: &'static str) -> Self {
        Self {
            label,
            shortcut,
            device_key,
            kind: ParamKind::ColorChannel,
        }
    }

    /// Gauge title with the shortcut marked, e.g. `(B)rightness`.
    pub fn title(&self) -> String {
        match self
            .label
            .char_indices()
            .find(|(_, c)| c.eq_ignore_ascii_case(&self.shortcut))
        {
            Some((i, c)) => {
                let end = i + c.len_utf8();
                format!("{}({}){}", &self.label[..i], &self.label[i..end], &self.label[end..])
            }
            None => format!("{} ({})", self.label, self.shortcut),
        }
    }

    /// Field name used for this parameter in preset files.
    pub fn preset_field(&self) -> String {
        self.label.to_ascii_lowercase()
    }

    pub fn matches(&self, key: char) -> bool {
        key.eq_ignore_ascii_case(&self.shortcut)
    }
}

const CLASSIC: &[Parameter] = &[
    Parameter::new("Brightness", 'B', "luminance"),
    Parameter::new("Contrast", 'C', "contrast"),
];

const EXTENDED: &[Parameter] = &[
    Parameter::new("Brightness", 'B', "luminance"),
    Parameter::new("Contrast", 'C', "contrast"),
    Parameter::new("Volume", 'V', "volume"),
    Parameter::channel("Red", 'R', "red"),
    Parameter::channel("Green", 'G', "green"),
    Parameter::channel("Blue", 'U', "blue"),
];

// ═══════════════════════════════════════════════════════════════════════════════
//  Profiles
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Brightness and contrast, presets from the per-user preset file.
    #[default]
    Classic,
    /// Adds volume and RGB gain, built-in preset table.
    Extended,
}

impl Profile {
    pub fn parameters(self) -> &'static [Parameter] {
        match self {
            Profile::Classic => CLASSIC,
            Profile::Extended => EXTENDED,
        }
    }

    pub fn digit_presets(self) -> bool {
        self == Profile::Classic
    }

    pub fn requires_preset_file(self) -> bool {
        self == Profile::Classic
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Registry
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("parameter registry is empty")]
    Empty,

    #[error("shortcut '{0}' is used by more than one parameter")]
    DuplicateShortcut(char),

    #[error("shortcut '{shortcut}' of {label} collides with a reserved key")]
    ReservedShortcut { label: &'static str, shortcut: char },
}

/// Keys that are claimed before shortcut matching and therefore can't select a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOptions {
    pub vi_keys: bool,
    pub digit_presets: bool,
}

impl KeyOptions {
    pub fn reserves(&self, key: char) -> bool {
        let k = key.to_ascii_lowercase();
        matches!(k, 'q' | 'p')
            || (self.vi_keys && matches!(k, 'h' | 'j' | 'k' | 'l'))
            || (self.digit_presets && k.is_ascii_digit())
    }
}

/// Immutable, ordered list of parameters. Index order is the preset value order.
#[derive(Debug, Clone)]
pub struct Registry {
    params: Vec<Parameter>,
}

impl Registry {
    pub fn new(params: Vec<Parameter>, keys: &KeyOptions) -> Result<Self, RegistryError> {
        if params.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (i, p) in params.iter().enumerate() {
            if keys.reserves(p.shortcut) {
                return Err(RegistryError::ReservedShortcut {
                    label: p.label,
                    shortcut: p.shortcut,
                });
            }
            if params[..i].iter().any(|q| q.matches(p.shortcut)) {
                return Err(RegistryError::DuplicateShortcut(p.shortcut));
            }
        }
        Ok(Self { params })
    }

    pub fn for_profile(profile: Profile, keys: &KeyOptions) -> Result<Self, RegistryError> {
        Self::new(profile.parameters().to_vec(), keys)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn get(&self, idx: usize) -> Option<&Parameter> {
        self.params.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// First parameter whose shortcut matches `key`, case-insensitively.
    pub fn find_shortcut(&self, key: char) -> Option<usize> {
        self.params.iter().position(|p| p.matches(key))
    }
}
