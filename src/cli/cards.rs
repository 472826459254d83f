use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::categories::suggest_stores;
use crate::cli::Context;
use crate::duplicate::find_duplicate;
use crate::error::{GiftError, Result};
use crate::fmt::{masked, when};
use crate::intake::{self, CardForm, IntakeOutcome};
use crate::models::{CardStatus, GiftCard, TransactionKind};
use crate::reports::{search_cards, CardFilter};

fn status_cell(status: CardStatus) -> Cell {
    match status {
        CardStatus::Active => Cell::new(status.as_str().green()),
        CardStatus::Used => Cell::new(status.as_str().dimmed()),
        CardStatus::Donated => Cell::new(status.as_str().cyan()),
        CardStatus::Expired => Cell::new(status.as_str().red()),
    }
}

fn parse_status(raw: &str) -> Result<CardStatus> {
    CardStatus::ALL
        .into_iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| {
            GiftError::Other(format!(
                "Unknown status {raw:?} (expected Active, Used, Donated or Expired)"
            ))
        })
}

fn card_table(cards: &[&GiftCard]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Store", "Card", "Initial", "Remaining", "Status", "Added", "Added By",
    ]);
    for c in cards {
        table.add_row(vec![
            Cell::new(c.id),
            Cell::new(&c.store),
            Cell::new(masked(&c.last4)),
            Cell::new(c.initial_balance),
            Cell::new(c.remaining_balance),
            status_cell(c.status),
            Cell::new(when(&c.added_date)),
            Cell::new(&c.added_by),
        ]);
    }
    table
}

pub struct AddArgs {
    pub store: String,
    pub last4: String,
    pub amount: String,
    pub added_by: String,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub force: bool,
}

pub fn add(ctx: &Context, args: AddArgs) -> Result<()> {
    let mut store = ctx.open()?;
    ctx.settings.check_volunteer(&args.added_by);

    let form = CardForm {
        store: args.store,
        last4: args.last4,
        amount: args.amount,
        date_added: args.date,
        added_by: args.added_by,
        notes: args.notes,
    };
    match intake::submit(&mut store, &form, args.force)? {
        IntakeOutcome::Added(card) => {
            ctx.save(&store)?;
            println!(
                "{} {} card {} for {} (id {})",
                "Added".green().bold(),
                card.store,
                masked(&card.last4),
                card.initial_balance,
                card.id
            );
            Ok(())
        }
        IntakeOutcome::PossibleDuplicate(existing) => Err(GiftError::DuplicateCard {
            id: existing.id,
            store: existing.store,
            last4: existing.last4,
        }),
    }
}

pub fn list(
    ctx: &Context,
    store_name: Option<String>,
    last4: Option<String>,
    status: Option<String>,
) -> Result<()> {
    let store = ctx.open()?;
    let filter = CardFilter {
        store: store_name,
        last4_prefix: last4,
        status: status.as_deref().map(parse_status).transpose()?,
    };
    let cards = search_cards(&store, &filter);
    if cards.is_empty() {
        println!("No cards found.");
        return Ok(());
    }
    println!("{}", card_table(&cards));
    println!("{} of {} cards", cards.len(), store.cards().len());
    Ok(())
}

pub fn show(ctx: &Context, id: u64) -> Result<()> {
    let store = ctx.open()?;
    let card = store.card(id)?;

    println!("{} {}", card.store.bold(), masked(&card.last4));
    println!("Status:     {}", card.status);
    println!("Initial:    {}", card.initial_balance);
    println!("Remaining:  {} ({:.0}%)", card.remaining_balance, card.remaining_pct());
    println!("Added:      {} by {}", when(&card.added_date), card.added_by);
    if let Some(notes) = &card.notes {
        println!("Notes:      {notes}");
    }

    let txns = store.card_transactions(id);
    if txns.is_empty() {
        println!("\nNo transactions.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Type", "Amount", "Volunteer", "Recipient", "Notes"]);
    for t in txns {
        let kind = match t.kind {
            TransactionKind::Spend => Cell::new("Spend".yellow()),
            TransactionKind::Donation => Cell::new("Donation".cyan()),
        };
        table.add_row(vec![
            Cell::new(when(&t.date)),
            kind,
            Cell::new(t.amount),
            Cell::new(&t.volunteer),
            Cell::new(t.recipient.as_deref().unwrap_or("")),
            Cell::new(&t.notes),
        ]);
    }
    println!("\nTransactions\n{table}");
    Ok(())
}

pub fn check(ctx: &Context, store_name: &str, last4: &str) -> Result<()> {
    let store = ctx.open()?;
    match find_duplicate(store_name, last4, store.cards()) {
        Some(existing) => {
            println!(
                "{} {} card {} already registered (id {}, {} remaining, {})",
                "Duplicate:".yellow().bold(),
                existing.store,
                masked(&existing.last4),
                existing.id,
                existing.remaining_balance,
                existing.status
            );
        }
        None => println!(
            "{} no {} card ending in {}",
            "OK:".green().bold(),
            store_name.trim(),
            last4
        ),
    }
    Ok(())
}

pub fn stores(ctx: &Context, query: Option<String>) -> Result<()> {
    let store = ctx.open()?;
    let query = query.unwrap_or_default();
    let mut names: Vec<String> = suggest_stores(&query).into_iter().map(str::to_string).collect();
    let needle = query.trim().to_lowercase();
    for name in store.store_names() {
        if name.to_lowercase().contains(&needle) && !names.contains(&name) {
            names.push(name);
        }
    }
    names.sort();
    for name in names {
        println!("{name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("donated").unwrap(), CardStatus::Donated);
        assert_eq!(parse_status(" Active ").unwrap(), CardStatus::Active);
        assert!(parse_status("gone").is_err());
    }
}
