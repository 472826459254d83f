use std::path::Path;

use crate::error::Result;
use crate::fixtures;
use crate::settings::{load_settings, save_settings};
use crate::store::Store;

pub fn run(data_dir: &Path) -> Result<()> {
    let mut settings = load_settings();
    settings.data_dir = data_dir.to_string_lossy().to_string();
    save_settings(&settings)?;

    std::fs::create_dir_all(data_dir)?;
    std::fs::create_dir_all(data_dir.join("exports"))?;

    if fixtures::ledger_path(data_dir).exists() {
        let store = fixtures::load(data_dir)?;
        println!(
            "Using existing ledger at {} ({} cards)",
            data_dir.display(),
            store.cards().len()
        );
    } else {
        fixtures::save(data_dir, &Store::default())?;
        println!("Initialized giftcards at {}", data_dir.display());
    }
    Ok(())
}
