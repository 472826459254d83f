use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::reports::DonationEntry;

const HEADERS: [&str; 6] = ["Date", "Store", "Amount", "Volunteer", "Recipient", "Notes"];

/// `donations-YYYY-MM-DD.csv` for today's date.
pub fn default_filename() -> String {
    format!("donations-{}.csv", chrono::Local::now().format("%Y-%m-%d"))
}

/// `$` followed by the shortest decimal form of the amount: `$25`, `$12.5`.
fn amount_field(entry: &DonationEntry) -> String {
    format!("${}", entry.amount.dollars())
}

/// Write the donation log as CSV with every field quoted.
pub fn write_donations<W: Write>(writer: W, entries: &[DonationEntry]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    wtr.write_record(HEADERS)?;
    for entry in entries {
        wtr.write_record([
            entry.date.as_str(),
            entry.store.as_str(),
            amount_field(entry).as_str(),
            entry.volunteer.as_str(),
            entry.recipient.as_str(),
            entry.notes.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the export into `dir` (or to `output` when given) and return the
/// path written.
pub fn export_donations(
    entries: &[DonationEntry],
    dir: &Path,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let path = match output {
        Some(p) => p.to_path_buf(),
        None => dir.join(default_filename()),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(&path)?;
    write_donations(std::io::BufWriter::new(file), entries)?;
    log::info!("exported {} donations to {}", entries.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Amount;
    use crate::reports::DonationSource;

    fn donations_csv(entries: &[DonationEntry]) -> Result<String> {
        let mut buf = Vec::new();
        write_donations(&mut buf, entries)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn entry(store: &str, cents: i64, notes: &str) -> DonationEntry {
        DonationEntry {
            date: "2024-06-05".to_string(),
            store: store.to_string(),
            amount: Amount::from_cents(cents),
            volunteer: "Amy Brown".to_string(),
            recipient: "Rivera family".to_string(),
            notes: notes.to_string(),
            source: DonationSource::Seeded,
        }
    }

    #[test]
    fn test_every_field_quoted() {
        let csv = donations_csv(&[entry("Target", 2500, "")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], r#""Date","Store","Amount","Volunteer","Recipient","Notes""#);
        assert_eq!(lines[1], r#""2024-06-05","Target","$25","Amy Brown","Rivera family","""#);
    }

    #[test]
    fn test_amount_shortest_form() {
        let csv = donations_csv(&[entry("Target", 1250, ""), entry("Gap", 1999, "")]).unwrap();
        assert!(csv.contains(r#""$12.5""#));
        assert!(csv.contains(r#""$19.99""#));
    }

    #[test]
    fn test_commas_and_quotes_in_notes_survive() {
        let csv = donations_csv(&[entry("Target", 100, r#"coat, "large""#)]).unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let record = rdr.records().next().unwrap().unwrap();
        assert_eq!(&record[5], r#"coat, "large""#);
    }

    #[test]
    fn test_export_writes_default_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_donations(&[entry("Target", 100, "")], dir.path(), None).unwrap();
        assert_eq!(path.file_name().unwrap().to_str().unwrap(), default_filename());
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
