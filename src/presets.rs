//! Preset store and the scrollable preset list shown beside the gauges.
//!
//! Presets are loaded once at startup and never written back. Values are kept
//! in registry order, so `values[i]` always targets parameter `i`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::gateway::VALUE_RANGE;
use crate::params::Registry;

/// Row 0 of the preset list; selecting it and pressing Enter does nothing.
pub const CUSTOM_ROW: &str = "<Custom>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: Option<String>,
    pub values: Vec<i32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresetError {
    #[error("preset file contains no presets")]
    Empty,

    #[error("preset {number}: missing field '{field}'")]
    MissingField { number: usize, field: String },

    #[error("preset {number}: unknown field '{field}'")]
    UnknownField { number: usize, field: String },

    #[error("preset {number}: '{field}' is {value}, outside 0..=100")]
    OutOfRange {
        number: usize,
        field: String,
        value: i32,
    },
}

/// One record of the preset file: `{ name?: string, <field>: int, ... }`.
#[derive(Debug, Deserialize)]
struct PresetRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(flatten)]
    fields: BTreeMap<String, i32>,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Preset Store
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetStore {
    presets: Vec<Preset>,
}

impl PresetStore {
    /// Align raw records with the registry. Unknown or missing fields and
    /// values outside 0..=100 are rejected.
    fn from_records(records: Vec<PresetRecord>, registry: &Registry) -> Result<Self, PresetError> {
        if records.is_empty() {
            return Err(PresetError::Empty);
        }

        let fields: Vec<String> = registry.iter().map(|p| p.preset_field()).collect();
        let mut presets = Vec::with_capacity(records.len());
        for (i, mut rec) in records.into_iter().enumerate() {
            let number = i + 1;
            let mut values = Vec::with_capacity(fields.len());
            for field in &fields {
                let v = rec.fields.remove(field).ok_or_else(|| PresetError::MissingField {
                    number,
                    field: field.clone(),
                })?;
                if !VALUE_RANGE.contains(&v) {
                    return Err(PresetError::OutOfRange {
                        number,
                        field: field.clone(),
                        value: v,
                    });
                }
                values.push(v);
            }
            if let Some(field) = rec.fields.into_keys().next() {
                return Err(PresetError::UnknownField { number, field });
            }
            presets.push(Preset {
                name: rec.name,
                values,
            });
        }
        Ok(Self { presets })
    }

    /// Load a preset file. `.yaml`/`.yml` is parsed as YAML, anything else as JSON.
    pub fn load(path: &Path, registry: &Registry) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading presets from {}", path.display()))?;
        let yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let records: Vec<PresetRecord> = if yaml {
            serde_yaml::from_str(&text)
                .with_context(|| format!("parsing YAML presets in {}", path.display()))?
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("parsing JSON presets in {}", path.display()))?
        };
        let store = Self::from_records(records, registry)
            .with_context(|| format!("invalid presets in {}", path.display()))?;
        log::info!("loaded {} presets from {}", store.len(), path.display());
        Ok(store)
    }

    /// Built-in table used by the extended profile when no preset file is given.
    pub fn builtin() -> Self {
        let table: [(&str, [i32; 6]); 4] = [
            ("Day", [80, 70, 30, 50, 50, 50]),
            ("Evening", [45, 55, 20, 55, 48, 40]),
            ("Night", [10, 40, 10, 60, 45, 30]),
            ("Movie", [60, 75, 50, 50, 50, 50]),
        ];
        let presets = table
            .into_iter()
            .map(|(name, values)| Preset {
                name: Some(name.into()),
                values: values.to_vec(),
            })
            .collect();
        Self { presets }
    }

    #[cfg(test)]
    pub fn from_values(rows: &[&[i32]]) -> Self {
        let presets = rows
            .iter()
            .map(|v| Preset {
                name: None,
                values: v.to_vec(),
            })
            .collect();
        Self { presets }
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Preset by 1-based number; 0 and anything past the end yield `None`.
    pub fn by_number(&self, number: usize) -> Option<&Preset> {
        number.checked_sub(1).and_then(|i| self.presets.get(i))
    }

    /// Display rows: `"2: Evening"` or `"2: B 45, C 55"` for unnamed presets.
    pub fn rows(&self, registry: &Registry) -> Vec<String> {
        self.presets
            .iter()
            .enumerate()
            .map(|(i, p)| match &p.name {
                Some(name) => format!("{}: {name}", i + 1),
                None => {
                    let parts: Vec<String> = registry
                        .iter()
                        .zip(&p.values)
                        .map(|(param, v)| format!("{} {v}", param.shortcut))
                        .collect();
                    format!("{}: {}", i + 1, parts.join(", "))
                }
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Preset List
// ═══════════════════════════════════════════════════════════════════════════════

/// Rows of the preset list with the `<Custom>` sentinel at index 0, so row `r`
/// names preset number `r`.
#[derive(Debug, Clone)]
pub struct PresetList {
    rows: Vec<String>,
    selected: usize,
}

impl PresetList {
    pub fn new(store: &PresetStore, registry: &Registry) -> Self {
        let mut rows = vec![CUSTOM_ROW.to_string()];
        rows.extend(store.rows(registry));
        Self { rows, selected: 0 }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn scroll_down(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}
