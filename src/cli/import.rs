use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::Context;
use crate::error::Result;
use crate::fmt::{masked, when};
use crate::importer::{
    batch_repeats, count_rows, import_file, preview_file, CsvRow, ImportMode, RowStatus, TEMPLATE,
    TEMPLATE_FILENAME,
};

fn status_cell(status: RowStatus) -> Cell {
    match status {
        RowStatus::Valid => Cell::new(status.as_str().green()),
        RowStatus::Duplicate => Cell::new(status.as_str().yellow()),
        RowStatus::Error => Cell::new(status.as_str().red()),
    }
}

fn print_rows(rows: &[CsvRow]) {
    let mut table = Table::new();
    table.set_header(vec!["Row", "Store", "Card", "Amount", "Added By", "Status", "Problems"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.row_num),
            Cell::new(&row.store),
            Cell::new(masked(&row.last4)),
            Cell::new(&row.amount),
            Cell::new(&row.added_by),
            status_cell(row.status),
            Cell::new(row.messages().join(", ")),
        ]);
    }
    println!("{table}");

    let counts = count_rows(rows);
    println!(
        "{} valid, {} duplicate, {} error",
        counts.valid.to_string().green(),
        counts.duplicate.to_string().yellow(),
        counts.error.to_string().red()
    );
    for (row, earlier) in batch_repeats(rows) {
        println!("{} row {row} repeats row {earlier} in this file", "Note:".bold());
    }
}

pub fn run(
    ctx: &Context,
    file: &str,
    include_duplicates: bool,
    dry_run: bool,
    force: bool,
) -> Result<()> {
    let file_path = PathBuf::from(file);
    let mut store = ctx.open()?;

    if dry_run {
        let preview = preview_file(&store, &file_path)?;
        print_rows(&preview.rows);
        if let Some(previous) = &preview.previous {
            println!(
                "{} {} was already imported on {}",
                "Warning:".yellow().bold(),
                preview.filename,
                when(&previous.imported_at)
            );
        }
        println!("Dry run: nothing imported.");
        return Ok(());
    }

    let mode = if include_duplicates {
        ImportMode::ValidAndDuplicates
    } else {
        ImportMode::ValidOnly
    };
    let result = import_file(&mut store, &file_path, mode, force)?;
    print_rows(&result.rows);
    ctx.save(&store)?;
    println!("{} {} cards", "Imported".green().bold(), result.imported.len());
    Ok(())
}

pub fn template(output: Option<String>) -> Result<()> {
    let path = PathBuf::from(output.unwrap_or_else(|| TEMPLATE_FILENAME.to_string()));
    std::fs::write(&path, TEMPLATE)?;
    println!("Template written to {}", path.display());
    Ok(())
}
