use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::categories::{Categorizer, Category};
use crate::error::{GiftError, Result};
use crate::models::Amount;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// Volunteer roster. Names outside it are accepted with a warning.
    #[serde(default = "default_volunteers")]
    pub volunteers: Vec<String>,
    #[serde(default = "default_low_balance_threshold")]
    pub low_balance_threshold: Amount,
    /// Extra store → category assignments layered over the built-in table.
    #[serde(default)]
    pub store_categories: BTreeMap<String, Category>,
}

fn default_volunteers() -> Vec<String> {
    ["Amy Brown", "James Lee", "Lisa Chen", "Mike Davis", "Sarah Johnson"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_low_balance_threshold() -> Amount {
    Amount::from_cents(2000)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            volunteers: default_volunteers(),
            low_balance_threshold: default_low_balance_threshold(),
            store_categories: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn categorizer(&self) -> Categorizer {
        Categorizer::new(self.store_categories.clone())
    }

    /// Log a warning when `name` is not on the roster. An empty roster
    /// accepts anyone.
    pub fn check_volunteer(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() || self.volunteers.is_empty() {
            return;
        }
        if !self.volunteers.iter().any(|v| v.eq_ignore_ascii_case(name)) {
            log::warn!("volunteer {name:?} is not on the roster");
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("giftcards")
}

fn settings_path() -> PathBuf {
    match std::env::var_os("GIFTCARDS_CONFIG") {
        Some(path) => PathBuf::from(path),
        None => config_dir().join("settings.json"),
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("giftcards")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring unreadable settings at {}: {e}", path.display());
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = settings_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| GiftError::Settings(e.to_string()))?;
    std::fs::write(&path, format!("{json}\n"))?;
    Ok(())
}

/// The data directory: `--data-dir` when given, else the one in settings.
pub fn resolve_data_dir(flag: Option<&str>) -> PathBuf {
    match flag {
        Some(dir) => PathBuf::from(shellexpand_path(dir)),
        None => PathBuf::from(shellexpand_path(&load_settings().data_dir)),
    }
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
