use colored::Colorize;

use crate::cli::Context;
use crate::error::Result;
use crate::fmt::masked;
use crate::ledger::{self, DonationAmount, DonationRequest, SpendRequest};
use crate::models::Transaction;
use crate::store::Store;

fn print_balance(store: &Store, txn: &Transaction) -> Result<()> {
    let card = store.card(txn.card_id)?;
    println!(
        "{} {} remaining ({})",
        format!("{} {}", card.store, masked(&card.last4)).bold(),
        card.remaining_balance,
        card.status
    );
    Ok(())
}

pub fn spend(
    ctx: &Context,
    card_id: u64,
    amount: String,
    volunteer: String,
    notes: String,
) -> Result<()> {
    let mut store = ctx.open()?;
    ctx.settings.check_volunteer(&volunteer);
    let txn = ledger::record_spend(
        &mut store,
        card_id,
        SpendRequest {
            amount,
            volunteer,
            notes,
        },
    )?;
    ctx.save(&store)?;
    println!("{} {} spent by {}", "Recorded".green().bold(), txn.amount, txn.volunteer);
    print_balance(&store, &txn)
}

pub fn donate(
    ctx: &Context,
    card_id: u64,
    amount: Option<String>,
    recipient: String,
    volunteer: String,
    notes: String,
) -> Result<()> {
    let mut store = ctx.open()?;
    ctx.settings.check_volunteer(&volunteer);
    let req = DonationRequest {
        amount: match amount {
            Some(raw) => DonationAmount::Partial(raw),
            None => DonationAmount::Full,
        },
        recipient,
        volunteer,
        notes,
    };
    let txn = ledger::record_donation(&mut store, card_id, req)?;
    ctx.save(&store)?;
    println!(
        "{} {} donated to {}",
        "Recorded".green().bold(),
        txn.amount,
        txn.recipient.as_deref().unwrap_or("")
    );
    print_balance(&store, &txn)
}
