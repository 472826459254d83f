use thiserror::Error;

use crate::intake::ValidationErrors;
use crate::ledger::LedgerError;

#[derive(Error, Debug)]
pub enum GiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown card: {0}")]
    UnknownCard(u64),

    #[error("Invalid card: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Possible duplicate: a {store} card ending in {last4} already exists (id {id}); pass --force to add anyway")]
    DuplicateCard { id: u64, store: String, last4: String },

    #[error("This file has already been imported on {0} (duplicate checksum); pass --force to import again")]
    DuplicateImport(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GiftError>;
