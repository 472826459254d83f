use std::path::Path;

use chrono::{Duration, Local, NaiveTime};

use crate::error::{GiftError, Result};
use crate::fixtures;
use crate::models::{Amount, CardStatus, Donation, GiftCard, Transaction, TransactionKind};
use crate::store::Ledger;

struct DemoCard {
    store: &'static str,
    last4: &'static str,
    dollars: f64,
    days_ago: i64,
    added_by: &'static str,
    notes: &'static str,
}

#[rustfmt::skip]
const CARDS: &[DemoCard] = &[
    DemoCard { store: "Walmart", last4: "4821", dollars: 100.00, days_ago: 80, added_by: "Sarah Johnson", notes: "Church drive" },
    DemoCard { store: "Walmart", last4: "1934", dollars: 50.00, days_ago: 62, added_by: "Mike Davis", notes: "" },
    DemoCard { store: "Target", last4: "5678", dollars: 50.00, days_ago: 75, added_by: "Lisa Chen", notes: "" },
    DemoCard { store: "Target", last4: "2210", dollars: 25.00, days_ago: 40, added_by: "Amy Brown", notes: "" },
    DemoCard { store: "Kroger", last4: "7730", dollars: 75.00, days_ago: 55, added_by: "James Lee", notes: "Holiday collection" },
    DemoCard { store: "Costco", last4: "3056", dollars: 150.00, days_ago: 30, added_by: "Sarah Johnson", notes: "" },
    DemoCard { store: "McDonald's", last4: "6402", dollars: 15.00, days_ago: 45, added_by: "Mike Davis", notes: "" },
    DemoCard { store: "Chick-fil-A", last4: "8815", dollars: 20.00, days_ago: 20, added_by: "Amy Brown", notes: "" },
    DemoCard { store: "Subway", last4: "0147", dollars: 10.00, days_ago: 12, added_by: "Lisa Chen", notes: "" },
    DemoCard { store: "Old Navy", last4: "9923", dollars: 40.00, days_ago: 35, added_by: "James Lee", notes: "Winter coats" },
    DemoCard { store: "Kohl's", last4: "4460", dollars: 30.00, days_ago: 9, added_by: "Sarah Johnson", notes: "" },
    DemoCard { store: "Amazon", last4: "5512", dollars: 60.00, days_ago: 5, added_by: "Mike Davis", notes: "" },
];

/// Activity against the cards above, by position in `CARDS`.
struct DemoActivity {
    card: usize,
    kind: TransactionKind,
    dollars: f64,
    days_ago: i64,
    volunteer: &'static str,
    recipient: &'static str,
    notes: &'static str,
}

#[rustfmt::skip]
const ACTIVITY: &[DemoActivity] = &[
    DemoActivity { card: 0, kind: TransactionKind::Spend, dollars: 42.17, days_ago: 50, volunteer: "Sarah Johnson", recipient: "", notes: "Pantry restock" },
    DemoActivity { card: 0, kind: TransactionKind::Donation, dollars: 25.00, days_ago: 18, volunteer: "Amy Brown", recipient: "Rivera family", notes: "" },
    DemoActivity { card: 2, kind: TransactionKind::Donation, dollars: 50.00, days_ago: 26, volunteer: "Lisa Chen", recipient: "Family shelter", notes: "School supplies" },
    DemoActivity { card: 4, kind: TransactionKind::Spend, dollars: 60.00, days_ago: 15, volunteer: "James Lee", recipient: "", notes: "" },
    DemoActivity { card: 6, kind: TransactionKind::Spend, dollars: 15.00, days_ago: 10, volunteer: "Mike Davis", recipient: "", notes: "Volunteer lunch" },
    DemoActivity { card: 9, kind: TransactionKind::Donation, dollars: 20.00, days_ago: 4, volunteer: "James Lee", recipient: "Nguyen family", notes: "" },
    DemoActivity { card: 5, kind: TransactionKind::Spend, dollars: 38.50, days_ago: 2, volunteer: "Sarah Johnson", recipient: "", notes: "" },
];

/// Donations recorded before cards were tracked individually.
struct DemoDonation {
    days_ago: i64,
    store: &'static str,
    dollars: f64,
    volunteer: &'static str,
    recipient: &'static str,
    notes: &'static str,
}

#[rustfmt::skip]
const DONATIONS: &[DemoDonation] = &[
    DemoDonation { days_ago: 85, store: "Walmart", dollars: 50.00, volunteer: "Sarah Johnson", recipient: "Community kitchen", notes: "" },
    DemoDonation { days_ago: 64, store: "Target", dollars: 25.00, volunteer: "Amy Brown", recipient: "Johnson family", notes: "Back to school" },
    DemoDonation { days_ago: 33, store: "Kroger", dollars: 40.00, volunteer: "James Lee", recipient: "Family shelter", notes: "" },
    DemoDonation { days_ago: 6, store: "Target", dollars: 30.00, volunteer: "Lisa Chen", recipient: "Rivera family", notes: "" },
    DemoDonation { days_ago: 1, store: "Old Navy", dollars: 20.00, volunteer: "Mike Davis", recipient: "Youth center", notes: "Coats" },
];

fn days_ago_date(days: i64) -> String {
    (Local::now().date_naive() - Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

fn days_ago_timestamp(days: i64) -> String {
    let date = Local::now().date_naive() - Duration::days(days);
    let at = NaiveTime::from_hms_opt(14, 30, 0).unwrap_or_default();
    date.and_time(at).format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Build the demo ledger and seeded donations. Card ids are 1-based
/// positions so commands like `giftcards spend 1` work right away.
pub fn build() -> (Ledger, Vec<Donation>) {
    let mut cards: Vec<GiftCard> = CARDS
        .iter()
        .enumerate()
        .map(|(i, c)| GiftCard {
            id: i as u64 + 1,
            store: c.store.to_string(),
            last4: c.last4.to_string(),
            initial_balance: Amount::from_dollars(c.dollars),
            remaining_balance: Amount::from_dollars(c.dollars),
            status: CardStatus::Active,
            added_date: days_ago_date(c.days_ago),
            added_by: c.added_by.to_string(),
            notes: Some(c.notes.to_string()).filter(|n| !n.is_empty()),
        })
        .collect();

    let mut transactions = Vec::new();
    for (i, a) in ACTIVITY.iter().enumerate() {
        let amount = Amount::from_dollars(a.dollars);
        let card = &mut cards[a.card];
        card.remaining_balance -= amount;
        if card.remaining_balance == Amount::ZERO {
            card.status = match a.kind {
                TransactionKind::Spend => CardStatus::Used,
                TransactionKind::Donation => CardStatus::Donated,
            };
        }
        transactions.push(Transaction {
            id: i as u64 + 1,
            card_id: card.id,
            date: days_ago_timestamp(a.days_ago),
            kind: a.kind,
            amount,
            volunteer: a.volunteer.to_string(),
            recipient: Some(a.recipient.to_string()).filter(|r| !r.is_empty()),
            notes: a.notes.to_string(),
        });
    }

    let donations = DONATIONS
        .iter()
        .enumerate()
        .map(|(i, d)| Donation {
            id: i as u64 + 1,
            date: days_ago_date(d.days_ago),
            store: d.store.to_string(),
            amount: Amount::from_dollars(d.dollars),
            volunteer: d.volunteer.to_string(),
            recipient: d.recipient.to_string(),
            notes: d.notes.to_string(),
        })
        .collect();

    let ledger = Ledger {
        cards,
        transactions,
        imports: Vec::new(),
    };
    (ledger, donations)
}

pub fn run(data_dir: &Path, force: bool) -> Result<()> {
    if fixtures::ledger_path(data_dir).exists() && !force {
        return Err(GiftError::Other(format!(
            "{} already has a ledger; pass --force to replace it with demo data",
            data_dir.display()
        )));
    }
    let (ledger, donations) = build();
    fixtures::seed(data_dir, &ledger, &donations)?;
    println!(
        "Demo data written to {}: {} cards, {} transactions, {} donations",
        data_dir.display(),
        ledger.cards.len(),
        ledger.transactions.len(),
        donations.len()
    );
    println!("Try `giftcards report dashboard`.");
    Ok(())
}
