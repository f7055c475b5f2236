//! Key-value settings persistence.
//!
//! Display options are read through the [`SettingsStore`] trait so the
//! decoder views never touch the platform directly. A host picks the backing:
//! [`MemorySettings`] for tests and one-shot runs, [`JsonFileSettings`] for
//! options that survive between runs.

use crate::error::{Result, ResultExt, SettingsError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A string key-value store.
pub trait SettingsStore {
    /// Returns the stored value for `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Volatile store backed by a map.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: BTreeMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store persisted as a flat JSON object; every write flushes the file.
#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileSettings {
    /// Opens the store at `path`. A missing file starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| SettingsError::LoadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            serde_json::from_str(&contents).map_err(|e| SettingsError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            BTreeMap::new()
        };

        debug!("Opened settings store {:?} with {} key(s)", path, values.len());
        Ok(Self { path, values })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.values).internal_context("serializing settings")?;
        std::fs::write(&self.path, json).map_err(|e| {
            SettingsError::SaveFailed {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl SettingsStore for JsonFileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Which text view a host shows by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredView {
    /// One line per node with offsets and lengths
    Pretty,
    /// Brace notation
    Der,
}

impl PreferredView {
    fn as_str(&self) -> &'static str {
        match self {
            PreferredView::Pretty => "pretty",
            PreferredView::Der => "der",
        }
    }
}

impl std::str::FromStr for PreferredView {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(PreferredView::Pretty),
            "der" => Ok(PreferredView::Der),
            other => Err(format!("unknown view '{}'", other)),
        }
    }
}

/// Persisted decoder display options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub show_hex_dump: bool,
    pub show_guesses: bool,
    pub trim_large: bool,
    pub view: PreferredView,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_hex_dump: true,
            show_guesses: true,
            trim_large: true,
            view: PreferredView::Pretty,
        }
    }
}

const KEY_HEX_DUMP: &str = "display.hex_dump";
const KEY_GUESSES: &str = "display.guesses";
const KEY_TRIM: &str = "display.trim_large";
const KEY_VIEW: &str = "display.view";

impl DisplayOptions {
    /// Reads options from `store`, using defaults for absent keys.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidValue`] when a stored value does not parse.
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            show_hex_dump: read_flag(store, KEY_HEX_DUMP, defaults.show_hex_dump)?,
            show_guesses: read_flag(store, KEY_GUESSES, defaults.show_guesses)?,
            trim_large: read_flag(store, KEY_TRIM, defaults.trim_large)?,
            view: match store.get(KEY_VIEW) {
                Some(raw) => raw.parse().map_err(|reason| SettingsError::InvalidValue {
                    key: KEY_VIEW.to_string(),
                    reason,
                })?,
                None => defaults.view,
            },
        })
    }

    /// Writes every option to `store`.
    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<()> {
        store.set(KEY_HEX_DUMP, &self.show_hex_dump.to_string())?;
        store.set(KEY_GUESSES, &self.show_guesses.to_string())?;
        store.set(KEY_TRIM, &self.trim_large.to_string())?;
        store.set(KEY_VIEW, self.view.as_str())
    }
}

fn read_flag(store: &dyn SettingsStore, key: &str, default: bool) -> Result<bool> {
    match store.get(key) {
        Some(raw) => raw.parse().map_err(|_| {
            SettingsError::InvalidValue {
                key: key.to_string(),
                reason: format!("expected true or false, got '{}'", raw),
            }
            .into()
        }),
        None => Ok(default),
    }
}
