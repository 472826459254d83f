use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::models::Donation;
use crate::store::{Ledger, Store};

pub const LEDGER_FILE: &str = "ledger.json";
pub const DONATIONS_FILE: &str = "donations.json";

pub fn ledger_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LEDGER_FILE)
}

pub fn donations_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DONATIONS_FILE)
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        log::debug!("{} not found, starting empty", path.display());
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&content)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, format!("{json}\n"))?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load every fixture in `data_dir` into a fresh store. Missing files are
/// treated as empty collections.
pub fn load(data_dir: &Path) -> Result<Store> {
    let ledger: Ledger = read_json(&ledger_path(data_dir))?;
    let donations: Vec<Donation> = read_json(&donations_path(data_dir))?;
    log::info!(
        "loaded {} cards, {} transactions, {} donations from {}",
        ledger.cards.len(),
        ledger.transactions.len(),
        donations.len(),
        data_dir.display()
    );
    Ok(Store::new(ledger, donations))
}

/// Write the card registry and ledger back. Seeded donation records are
/// read-only and left untouched.
pub fn save(data_dir: &Path, store: &Store) -> Result<()> {
    write_json(&ledger_path(data_dir), store.ledger())?;
    log::debug!("saved {}", ledger_path(data_dir).display());
    Ok(())
}

/// Write both fixture files, replacing whatever is there.
pub fn seed(data_dir: &Path, ledger: &Ledger, donations: &[Donation]) -> Result<()> {
    write_json(&ledger_path(data_dir), ledger)?;
    write_json(&donations_path(data_dir), &donations)?;
    Ok(())
}
