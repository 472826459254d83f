use std::collections::HashMap;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::duplicate::find_duplicate;
use crate::error::{GiftError, Result};
use crate::intake::{check_fields, today, Field};
use crate::models::{Amount, CardStatus, GiftCard, ImportRecord};
use crate::store::Store;

pub const TEMPLATE: &str = "store,last4,amount,added_by,notes\n\
Walmart,1234,100.00,Sarah Johnson,Example card\n\
Target,5678,50.00,Mike Davis,\n";

pub const TEMPLATE_FILENAME: &str = "gift_card_import_template.csv";

// ---------------------------------------------------------------------------
// Row classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Valid,
    Duplicate,
    Error,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Duplicate => "duplicate",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    /// 1-based, counting only non-blank data lines.
    pub row_num: usize,
    pub store: String,
    pub last4: String,
    pub amount: String,
    pub added_by: String,
    pub notes: String,
    pub status: RowStatus,
    pub errors: Vec<Field>,
    parsed_amount: Option<Amount>,
}

impl CsvRow {
    pub fn messages(&self) -> Vec<&'static str> {
        self.errors.iter().map(Field::row_message).collect()
    }
}

/// Split raw CSV text into classified rows.
///
/// Fields are split on every comma: there is no quoting, so a comma inside
/// `notes` spills into further fields that are re-joined into `notes`, and a
/// comma in an earlier column shifts the rest. Duplicates are checked against
/// `existing` only, never against earlier rows of the same batch.
pub fn parse_csv(text: &str, existing: &[GiftCard]) -> Vec<CsvRow> {
    let lines: Vec<&str> = text.trim().lines().collect();
    let has_header = lines
        .first()
        .map_or(false, |l| l.to_lowercase().contains("store"));
    let data = if has_header { &lines[1..] } else { &lines[..] };

    data.iter()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            let field = |idx: usize| parts.get(idx).copied().unwrap_or("").to_string();
            let (store, last4, amount, added_by) = (field(0), field(1), field(2), field(3));
            let notes = parts.get(4..).map(|rest| rest.join(",")).unwrap_or_default();

            let (errors, parsed_amount) = check_fields(&store, &last4, &amount, &added_by);
            let status = if !errors.is_empty() {
                RowStatus::Error
            } else if find_duplicate(&store, &last4, existing).is_some() {
                RowStatus::Duplicate
            } else {
                RowStatus::Valid
            };
            CsvRow {
                row_num: i + 1,
                store,
                last4,
                amount,
                added_by,
                notes: notes.trim().to_string(),
                status,
                errors,
                parsed_amount,
            }
        })
        .collect()
}

/// Pairs of `(row, earlier_row)` for importable rows that repeat an earlier
/// row's store and last four within the same batch.
pub fn batch_repeats(rows: &[CsvRow]) -> Vec<(usize, usize)> {
    let mut first_seen: HashMap<(String, &str), usize> = HashMap::new();
    let mut repeats = Vec::new();
    for row in rows.iter().filter(|r| r.status != RowStatus::Error) {
        let key = (row.store.to_lowercase(), row.last4.as_str());
        match first_seen.get(&key) {
            Some(&earlier) => repeats.push((row.row_num, earlier)),
            None => {
                first_seen.insert(key, row.row_num);
            }
        }
    }
    repeats
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RowCounts {
    pub valid: usize,
    pub duplicate: usize,
    pub error: usize,
}

pub fn count_rows(rows: &[CsvRow]) -> RowCounts {
    let mut counts = RowCounts::default();
    for row in rows {
        match row.status {
            RowStatus::Valid => counts.valid += 1,
            RowStatus::Duplicate => counts.duplicate += 1,
            RowStatus::Error => counts.error += 1,
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Committing rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    ValidOnly,
    ValidAndDuplicates,
}

impl ImportMode {
    fn accepts(&self, status: RowStatus) -> bool {
        match self {
            Self::ValidOnly => status == RowStatus::Valid,
            Self::ValidAndDuplicates => status != RowStatus::Error,
        }
    }
}

/// Append the accepted rows as new active cards dated today. Error rows are
/// never imported.
pub fn import_rows(store: &mut Store, rows: &[CsvRow], mode: ImportMode) -> Vec<GiftCard> {
    let base = store.next_card_id();
    let date = today();
    let mut added = Vec::new();
    for (i, row) in rows.iter().filter(|r| mode.accepts(r.status)).enumerate() {
        let Some(amount) = row.parsed_amount else {
            continue;
        };
        let card = GiftCard {
            id: base + i as u64,
            store: row.store.clone(),
            last4: row.last4.clone(),
            initial_balance: amount,
            remaining_balance: amount,
            status: CardStatus::Active,
            added_date: date.clone(),
            added_by: row.added_by.clone(),
            notes: Some(row.notes.clone()).filter(|n| !n.is_empty()),
        };
        store.push_card(card.clone());
        added.push(card);
    }
    added
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub struct Preview {
    pub filename: String,
    pub checksum: String,
    pub rows: Vec<CsvRow>,
    /// Set when a file with the same contents was imported before.
    pub previous: Option<ImportRecord>,
}

pub fn preview_file(store: &Store, file_path: &Path) -> Result<Preview> {
    let is_csv = file_path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(GiftError::Other(format!(
            "Only .csv files can be imported: {}",
            file_path.display()
        )));
    }
    let data = std::fs::read(file_path)?;
    let checksum = compute_checksum(&data);
    let text = String::from_utf8_lossy(&data);
    let rows = parse_csv(&text, store.cards());
    let previous = store
        .imports()
        .iter()
        .find(|r| r.checksum == checksum)
        .cloned();
    Ok(Preview {
        filename: file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string(),
        checksum,
        rows,
        previous,
    })
}

#[derive(Debug)]
pub struct ImportResult {
    pub rows: Vec<CsvRow>,
    pub imported: Vec<GiftCard>,
}

/// Classify and import one CSV file, recording it in the import history.
/// A file whose contents were already imported is refused unless `force`.
pub fn import_file(
    store: &mut Store,
    file_path: &Path,
    mode: ImportMode,
    force: bool,
) -> Result<ImportResult> {
    let preview = preview_file(store, file_path)?;
    if let Some(previous) = &preview.previous {
        if !force {
            return Err(GiftError::DuplicateImport(previous.imported_at.clone()));
        }
        log::warn!("re-importing {} (first imported {})", preview.filename, previous.imported_at);
    }
    for (row, earlier) in batch_repeats(&preview.rows) {
        log::warn!("row {row} repeats the store and last 4 of row {earlier} in the same file");
    }

    let imported = import_rows(store, &preview.rows, mode);
    let record = ImportRecord {
        id: store.next_import_id(),
        filename: preview.filename.clone(),
        imported_at: chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
        row_count: preview.rows.len(),
        imported: imported.len(),
        checksum: preview.checksum,
    };
    log::info!(
        "imported {} of {} rows from {}",
        record.imported,
        record.row_count,
        record.filename
    );
    store.push_import(record);

    Ok(ImportResult {
        rows: preview.rows,
        imported,
    })
}
