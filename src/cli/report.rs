use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::categories::Category;
use crate::cli::{Context, DonationArgs};
use crate::error::{GiftError, Result};
use crate::fmt::{bar, masked, when};
use crate::models::TransactionKind;
use crate::reports::{
    self, category_rollup, donation_log, donation_total, filter_category, filter_donations,
    paginate, store_breakdown, StoreProgress,
};

const PAGE_SIZES: [usize; 3] = [10, 20, 50];
const BAR_WIDTH: usize = 30;

pub(crate) fn parse_category_opt(raw: &Option<String>) -> Result<Option<Category>> {
    match raw {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => Category::parse(s).map(Some).ok_or_else(|| {
            GiftError::Other(format!(
                "Unknown category {s:?} (expected Grocery, Fast Food, Clothing or Other)"
            ))
        }),
    }
}

fn progress_cell(progress: StoreProgress) -> Cell {
    match progress {
        StoreProgress::Done => Cell::new(progress.as_str().green()),
        StoreProgress::InProcess => Cell::new(progress.as_str().yellow()),
    }
}

pub fn dashboard(ctx: &Context) -> Result<()> {
    let store = ctx.open()?;
    let dash = reports::dashboard(
        &store,
        &ctx.settings.categorizer(),
        ctx.settings.low_balance_threshold,
    );

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total cards"), Cell::new(dash.summary.total_cards)]);
    table.add_row(vec![Cell::new("Active cards"), Cell::new(dash.summary.active_cards)]);
    table.add_row(vec![
        Cell::new("Remaining value".bold()),
        Cell::new(dash.summary.total_remaining),
    ]);
    table.add_row(vec![Cell::new("Redeemed value"), Cell::new(dash.summary.total_redeemed)]);
    table.add_row(vec![
        Cell::new("Total donated".green().bold()),
        Cell::new(dash.total_donated),
    ]);
    table.add_row(vec![Cell::new("Donations"), Cell::new(dash.donation_count)]);
    table.add_row(vec![Cell::new("Unique recipients"), Cell::new(dash.unique_recipients)]);
    println!("Dashboard\n{table}");

    if !dash.low_balance.is_empty() {
        let mut low = Table::new();
        low.set_header(vec!["ID", "Store", "Card", "Remaining"]);
        for c in &dash.low_balance {
            low.add_row(vec![
                Cell::new(c.id),
                Cell::new(&c.store),
                Cell::new(masked(&c.last4)),
                Cell::new(c.remaining_balance.to_string().red()),
            ]);
        }
        println!(
            "\n{}\n{low}",
            format!("Low Balance (under {})", ctx.settings.low_balance_threshold).yellow().bold()
        );
    }

    if !dash.recent_transactions.is_empty() {
        let mut recent = Table::new();
        recent.set_header(vec!["Date", "Store", "Type", "Amount", "Volunteer"]);
        for r in &dash.recent_transactions {
            let kind = match r.transaction.kind {
                TransactionKind::Spend => "Spend",
                TransactionKind::Donation => "Donation",
            };
            recent.add_row(vec![
                Cell::new(when(&r.transaction.date)),
                Cell::new(&r.store),
                Cell::new(kind),
                Cell::new(r.transaction.amount),
                Cell::new(&r.transaction.volunteer),
            ]);
        }
        println!("\nRecent Transactions\n{recent}");
    }

    if !dash.recent_donations.is_empty() {
        let mut recent = Table::new();
        recent.set_header(vec!["Date", "Store", "Amount", "Recipient"]);
        for d in &dash.recent_donations {
            recent.add_row(vec![
                Cell::new(when(&d.date)),
                Cell::new(&d.store),
                Cell::new(d.amount),
                Cell::new(&d.recipient),
            ]);
        }
        println!("\nRecent Donations\n{recent}");
    }

    if !dash.treemap.is_empty() {
        println!("\nValue by Store");
        for tile in dash.treemap.iter().take(8) {
            println!(
                "{:<16} {} {:>10} {:>5.1}%",
                tile.store,
                bar(tile.share, BAR_WIDTH),
                tile.remaining.to_string(),
                tile.share * 100.0
            );
        }
    }
    Ok(())
}

pub fn inventory(
    ctx: &Context,
    category: Option<String>,
    page: usize,
    per_page: usize,
) -> Result<()> {
    if !PAGE_SIZES.contains(&per_page) {
        return Err(GiftError::Other(format!(
            "--per-page must be one of 10, 20 or 50, got {per_page}"
        )));
    }
    let category = parse_category_opt(&category)?;
    let store = ctx.open()?;
    let summary = reports::inventory_summary(&store);
    let rows = filter_category(&store_breakdown(&store, &ctx.settings.categorizer()), category);
    let page = paginate(&rows, page, per_page);

    let mut table = Table::new();
    table.set_header(vec![
        "Store", "Category", "Cards", "Remaining", "Redeemed", "Donated", "Status",
    ]);
    for row in &page.items {
        table.add_row(vec![
            Cell::new(&row.store),
            Cell::new(row.category),
            Cell::new(row.count),
            Cell::new(row.remaining),
            Cell::new(row.redeemed),
            Cell::new(row.donated),
            progress_cell(row.progress),
        ]);
    }
    let title = match category {
        Some(c) => format!("Inventory: {c}"),
        None => "Inventory".to_string(),
    };
    println!("{title}\n{table}");
    println!(
        "Page {} of {} ({} stores)",
        page.page, page.total_pages, page.total_items
    );

    let counts: Vec<String> = summary
        .by_status
        .iter()
        .map(|(status, n)| format!("{status} {n}"))
        .collect();
    println!(
        "{} cards, {} remaining of {} [{}]",
        summary.total_cards,
        summary.total_remaining,
        summary.total_initial,
        counts.join(", ")
    );
    Ok(())
}

pub fn categories(ctx: &Context) -> Result<()> {
    let store = ctx.open()?;
    let rows = category_rollup(&store_breakdown(&store, &ctx.settings.categorizer()));

    let mut table = Table::new();
    table.set_header(vec!["Category", "Stores", "Cards", "Remaining", "Redeemed", "Donated"]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(row.category),
            Cell::new(row.stores),
            Cell::new(row.cards),
            Cell::new(row.remaining),
            Cell::new(row.redeemed),
            Cell::new(row.donated),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn treemap(ctx: &Context, category: Option<String>) -> Result<()> {
    let category = parse_category_opt(&category)?;
    let store = ctx.open()?;
    let rows = filter_category(&store_breakdown(&store, &ctx.settings.categorizer()), category);
    let tiles = reports::treemap(&rows);
    if tiles.is_empty() {
        println!("No remaining value.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Store", "Category", "Share", "Remaining", "Redeemed", ""]);
    for tile in &tiles {
        table.add_row(vec![
            Cell::new(&tile.store),
            Cell::new(tile.category),
            Cell::new(bar(tile.share, BAR_WIDTH)),
            Cell::new(tile.remaining),
            Cell::new(tile.redeemed),
            Cell::new(format!("{:.1}%", tile.share * 100.0)),
        ]);
    }
    println!("Value by Store\n{table}");
    Ok(())
}

pub fn donations(ctx: &Context, args: &DonationArgs) -> Result<()> {
    let filter = args.to_filter()?;
    let store = ctx.open()?;
    let now = chrono::Local::now().naive_local();
    let entries = filter_donations(&donation_log(&store), &filter, now);

    if entries.is_empty() {
        println!("No donations found.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Store", "Amount", "Volunteer", "Recipient", "Notes", "Source"]);
    for e in &entries {
        table.add_row(vec![
            Cell::new(when(&e.date)),
            Cell::new(&e.store),
            Cell::new(e.amount),
            Cell::new(&e.volunteer),
            Cell::new(&e.recipient),
            Cell::new(&e.notes),
            Cell::new(e.source.as_str()),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(donation_total(&entries)),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
    ]);
    let title = match filter.window {
        Some(w) => format!("Donations ({})", w.label()),
        None => "Donations".to_string(),
    };
    println!("{title}\n{table}");
    println!("{} donations", entries.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_opt() {
        assert_eq!(parse_category_opt(&None).unwrap(), None);
        assert_eq!(parse_category_opt(&Some("All".into())).unwrap(), None);
        assert_eq!(
            parse_category_opt(&Some("fast food".into())).unwrap(),
            Some(Category::FastFood)
        );
        assert!(parse_category_opt(&Some("Toys".into())).is_err());
    }
}
