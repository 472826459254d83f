use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, Months, NaiveDate, NaiveDateTime};

use crate::categories::{Categorizer, Category};
use crate::models::{parse_date, Amount, CardStatus, GiftCard, Transaction, TransactionKind};
use crate::store::{sort_newest_first, Store};

// ---------------------------------------------------------------------------
// Inventory summary
// ---------------------------------------------------------------------------

pub struct InventorySummary {
    pub total_cards: usize,
    pub active_cards: usize,
    pub total_remaining: Amount,
    pub total_initial: Amount,
    pub total_redeemed: Amount,
    /// Every status with its card count, in declaration order.
    pub by_status: Vec<(CardStatus, usize)>,
}

pub fn inventory_summary(store: &Store) -> InventorySummary {
    let cards = store.cards();
    let by_status = CardStatus::ALL
        .iter()
        .map(|s| (*s, cards.iter().filter(|c| c.status == *s).count()))
        .collect();
    InventorySummary {
        total_cards: cards.len(),
        active_cards: cards.iter().filter(|c| c.status == CardStatus::Active).count(),
        total_remaining: cards.iter().map(|c| c.remaining_balance).sum(),
        total_initial: cards.iter().map(|c| c.initial_balance).sum(),
        total_redeemed: cards.iter().map(GiftCard::redeemed).sum(),
        by_status,
    }
}

// ---------------------------------------------------------------------------
// Per-store breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreProgress {
    /// Every card for the store is still active.
    Done,
    InProcess,
}

impl StoreProgress {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::InProcess => "in-process",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreRow {
    pub store: String,
    pub category: Category,
    pub count: usize,
    pub remaining: Amount,
    pub redeemed: Amount,
    pub donated: Amount,
    pub progress: StoreProgress,
}

/// One row per store, largest remaining balance first. Ties keep the order
/// in which stores first appear in the registry.
pub fn store_breakdown(store: &Store, categorizer: &Categorizer) -> Vec<StoreRow> {
    let mut rows: Vec<StoreRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for card in store.cards() {
        let idx = *index.entry(card.store.as_str()).or_insert_with(|| {
            rows.push(StoreRow {
                store: card.store.clone(),
                category: categorizer.category(&card.store),
                count: 0,
                remaining: Amount::ZERO,
                redeemed: Amount::ZERO,
                donated: Amount::ZERO,
                progress: StoreProgress::Done,
            });
            rows.len() - 1
        });
        let row = &mut rows[idx];
        row.count += 1;
        row.remaining += card.remaining_balance;
        row.redeemed += card.redeemed();
        if card.status != CardStatus::Active {
            row.progress = StoreProgress::InProcess;
        }
    }

    for txn in store.transactions() {
        if txn.kind != TransactionKind::Donation {
            continue;
        }
        let Ok(card) = store.card(txn.card_id) else {
            continue;
        };
        if let Some(&idx) = index.get(card.store.as_str()) {
            rows[idx].donated += txn.amount;
        }
    }

    rows.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    rows
}

pub fn filter_category(rows: &[StoreRow], category: Option<Category>) -> Vec<StoreRow> {
    rows.iter()
        .filter(|r| category.map_or(true, |c| r.category == c))
        .cloned()
        .collect()
}

pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually shown, after clamping.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice out one page. Out-of-range pages clamp to the last (or first) page.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());
    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        total_pages,
        total_items: items.len(),
    }
}

// ---------------------------------------------------------------------------
// Category rollup and treemap
// ---------------------------------------------------------------------------

pub struct CategoryRow {
    pub category: Category,
    pub stores: usize,
    pub cards: usize,
    pub remaining: Amount,
    pub redeemed: Amount,
    pub donated: Amount,
}

/// Totals for every category, including empty ones, in a fixed order.
pub fn category_rollup(rows: &[StoreRow]) -> Vec<CategoryRow> {
    Category::ALL
        .iter()
        .map(|cat| {
            let members: Vec<&StoreRow> = rows.iter().filter(|r| r.category == *cat).collect();
            CategoryRow {
                category: *cat,
                stores: members.len(),
                cards: members.iter().map(|r| r.count).sum(),
                remaining: members.iter().map(|r| r.remaining).sum(),
                redeemed: members.iter().map(|r| r.redeemed).sum(),
                donated: members.iter().map(|r| r.donated).sum(),
            }
        })
        .collect()
}

pub struct TreemapTile {
    pub store: String,
    pub category: Category,
    pub remaining: Amount,
    pub redeemed: Amount,
    /// Fraction of the total remaining value across all tiles.
    pub share: f64,
}

/// Stores that still hold value, sized by remaining balance.
pub fn treemap(rows: &[StoreRow]) -> Vec<TreemapTile> {
    let holding: Vec<&StoreRow> = rows.iter().filter(|r| r.remaining.is_positive()).collect();
    let total: Amount = holding.iter().map(|r| r.remaining).sum();
    holding
        .into_iter()
        .map(|r| TreemapTile {
            store: r.store.clone(),
            category: r.category,
            remaining: r.remaining,
            redeemed: r.redeemed,
            share: if total.is_positive() {
                r.remaining.cents() as f64 / total.cents() as f64
            } else {
                0.0
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Time windows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Last7Days,
    Last30Days,
    Last3Months,
}

impl TimeWindow {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
            Self::Last3Months => "Last 3 months",
        }
    }

    /// Accepts `7d`, `30d`, `90d`/`3m`, or the label.
    pub fn parse(raw: &str) -> Option<TimeWindow> {
        match raw.trim().to_lowercase().as_str() {
            "7d" | "7" | "last 7 days" => Some(Self::Last7Days),
            "30d" | "30" | "last 30 days" => Some(Self::Last30Days),
            "90d" | "90" | "3m" | "last 3 months" => Some(Self::Last3Months),
            _ => None,
        }
    }

    /// Earliest instant inside the window, counted back from `now` in
    /// calendar days or months.
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::Last7Days => now - Duration::days(7),
            Self::Last30Days => now - Duration::days(30),
            Self::Last3Months => now
                .checked_sub_months(Months::new(3))
                .unwrap_or(NaiveDateTime::MIN),
        }
    }
}

// ---------------------------------------------------------------------------
// Donation log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationSource {
    /// A seeded donation record.
    Seeded,
    /// Projected from a donation transaction in the ledger.
    Ledger,
}

impl DonationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeded => "record",
            Self::Ledger => "card",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonationEntry {
    pub date: String,
    pub store: String,
    pub amount: Amount,
    pub volunteer: String,
    pub recipient: String,
    pub notes: String,
    pub source: DonationSource,
}

/// Every donation, seeded records and ledger donations alike, newest first.
pub fn donation_log(store: &Store) -> Vec<DonationEntry> {
    let seeded = store.donations().iter().map(|d| DonationEntry {
        date: d.date.clone(),
        store: d.store.clone(),
        amount: d.amount,
        volunteer: d.volunteer.clone(),
        recipient: d.recipient.clone(),
        notes: d.notes.clone(),
        source: DonationSource::Seeded,
    });
    let ledger = store
        .transactions()
        .iter()
        .filter(|t| t.kind == TransactionKind::Donation)
        .map(|t| DonationEntry {
            date: t.date.clone(),
            store: store
                .card(t.card_id)
                .map(|c| c.store.clone())
                .unwrap_or_else(|_| "Unknown".to_string()),
            amount: t.amount,
            volunteer: t.volunteer.clone(),
            recipient: t.recipient.clone().unwrap_or_default(),
            notes: t.notes.clone(),
            source: DonationSource::Ledger,
        });
    let mut entries: Vec<DonationEntry> = seeded.chain(ledger).collect();
    sort_newest_first(&mut entries, |e| e.date.as_str());
    entries
}

#[derive(Debug, Clone, Default)]
pub struct DonationFilter {
    pub window: Option<TimeWindow>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Exact store name.
    pub store: Option<String>,
    /// Case-insensitive substring of the recipient.
    pub recipient: Option<String>,
}

impl DonationFilter {
    pub fn matches(&self, entry: &DonationEntry, now: NaiveDateTime) -> bool {
        let date = parse_date(&entry.date);
        if let Some(window) = self.window {
            if !date.is_some_and(|d| d >= window.cutoff(now)) {
                return false;
            }
        }
        if let Some(start) = self.start {
            if !date.is_some_and(|d| d.date() >= start) {
                return false;
            }
        }
        if let Some(end) = self.end {
            if !date.is_some_and(|d| d.date() <= end) {
                return false;
            }
        }
        if let Some(store) = self.store.as_deref().filter(|s| !s.is_empty()) {
            if entry.store != store {
                return false;
            }
        }
        if let Some(recipient) = self.recipient.as_deref().filter(|s| !s.is_empty()) {
            if !entry.recipient.to_lowercase().contains(&recipient.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

pub fn filter_donations(
    entries: &[DonationEntry],
    filter: &DonationFilter,
    now: NaiveDateTime,
) -> Vec<DonationEntry> {
    entries
        .iter()
        .filter(|e| filter.matches(e, now))
        .cloned()
        .collect()
}

pub fn donation_total(entries: &[DonationEntry]) -> Amount {
    entries.iter().map(|e| e.amount).sum()
}

// ---------------------------------------------------------------------------
// Card search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CardFilter {
    /// Exact store name.
    pub store: Option<String>,
    pub last4_prefix: Option<String>,
    pub status: Option<CardStatus>,
}

pub fn search_cards<'a>(store: &'a Store, filter: &CardFilter) -> Vec<&'a GiftCard> {
    store
        .cards()
        .iter()
        .filter(|c| filter.store.as_deref().map_or(true, |s| s.is_empty() || c.store == s))
        .filter(|c| filter.last4_prefix.as_deref().map_or(true, |p| c.last4.starts_with(p)))
        .filter(|c| filter.status.map_or(true, |s| c.status == s))
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub struct RecentTransaction {
    pub transaction: Transaction,
    pub store: String,
}

pub struct Dashboard {
    pub summary: InventorySummary,
    pub total_donated: Amount,
    pub donation_count: usize,
    pub unique_recipients: usize,
    pub low_balance: Vec<GiftCard>,
    pub recent_transactions: Vec<RecentTransaction>,
    pub recent_donations: Vec<DonationEntry>,
    pub treemap: Vec<TreemapTile>,
}

const RECENT_LIMIT: usize = 5;

pub fn dashboard(
    store: &Store,
    categorizer: &Categorizer,
    low_balance_threshold: Amount,
) -> Dashboard {
    let donations = donation_log(store);
    let unique_recipients = donations
        .iter()
        .map(|d| d.recipient.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let low_balance = store
        .cards()
        .iter()
        .filter(|c| {
            c.status == CardStatus::Active
                && c.remaining_balance.is_positive()
                && c.remaining_balance < low_balance_threshold
        })
        .cloned()
        .collect();

    let mut txns: Vec<&Transaction> = store.transactions().iter().collect();
    sort_newest_first(&mut txns, |t| t.date.as_str());
    let recent_transactions = txns
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|t| RecentTransaction {
            store: store
                .card(t.card_id)
                .map(|c| c.store.clone())
                .unwrap_or_else(|_| "Unknown".to_string()),
            transaction: t.clone(),
        })
        .collect();

    Dashboard {
        summary: inventory_summary(store),
        total_donated: donation_total(&donations),
        donation_count: donations.len(),
        unique_recipients,
        low_balance,
        recent_transactions,
        recent_donations: donations.into_iter().take(RECENT_LIMIT).collect(),
        treemap: treemap(&store_breakdown(store, categorizer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Donation;
    use crate::store::tests::{card, txn};
    use crate::store::Ledger;

    fn donation(id: u64, date: &str, store: &str, cents: i64, recipient: &str) -> Donation {
        Donation {
            id,
            date: date.to_string(),
            store: store.to_string(),
            amount: Amount::from_cents(cents),
            volunteer: "Amy Brown".to_string(),
            recipient: recipient.to_string(),
            notes: String::new(),
        }
    }

    fn sample_store() -> Store {
        let mut used = card(3, "Target", "0003", 2500, 0);
        used.status = CardStatus::Donated;
        let cards = vec![
            card(1, "Walmart", "0001", 10000, 6000),
            card(2, "Target", "0002", 5000, 5000),
            used,
            card(4, "Starbucks", "0004", 1500, 1500),
            card(5, "Corner Bakery", "0005", 2000, 1200),
        ];
        let transactions = vec![
            txn(1, 1, "2024-06-01T10:00:00Z", TransactionKind::Spend, 4000),
            txn(2, 3, "2024-06-02T10:00:00Z", TransactionKind::Donation, 2500),
            txn(3, 5, "2024-06-03T10:00:00Z", TransactionKind::Spend, 800),
        ];
        let donations = vec![
            donation(1, "2024-06-05", "Target", 2500, "Rivera family"),
            donation(2, "2024-05-20", "Walmart", 5000, "Family shelter"),
            donation(3, "2024-02-01", "Target", 1000, "Youth center"),
        ];
        Store::new(
            Ledger {
                cards,
                transactions,
                ..Ledger::default()
            },
            donations,
        )
    }

    fn at(raw: &str) -> NaiveDateTime {
        parse_date(raw).unwrap()
    }

    #[test]
    fn test_inventory_summary() {
        let s = inventory_summary(&sample_store());
        assert_eq!(s.total_cards, 5);
        assert_eq!(s.active_cards, 4);
        assert_eq!(s.total_initial, Amount::from_cents(21000));
        assert_eq!(s.total_remaining, Amount::from_cents(13700));
        assert_eq!(s.total_redeemed, Amount::from_cents(7300));
        assert!(s.by_status.contains(&(CardStatus::Donated, 1)));
        assert!(s.by_status.contains(&(CardStatus::Expired, 0)));
    }

    #[test]
    fn test_store_breakdown() {
        let rows = store_breakdown(&sample_store(), &Categorizer::default());
        let names: Vec<&str> = rows.iter().map(|r| r.store.as_str()).collect();
        assert_eq!(names, vec!["Walmart", "Target", "Starbucks", "Corner Bakery"]);

        let target = &rows[1];
        assert_eq!(target.count, 2);
        assert_eq!(target.remaining, Amount::from_cents(5000));
        assert_eq!(target.redeemed, Amount::from_cents(2500));
        assert_eq!(target.donated, Amount::from_cents(2500));
        assert_eq!(target.progress, StoreProgress::InProcess);
        assert_eq!(target.category, Category::Grocery);

        assert_eq!(rows[0].progress, StoreProgress::Done);
        assert_eq!(rows[3].category, Category::Other);
    }

    #[test]
    fn test_breakdown_ties_keep_first_seen_order() {
        let store = Store::new(
            Ledger {
                cards: vec![
                    card(1, "Gap", "0001", 1000, 1000),
                    card(2, "Amazon", "0002", 1000, 1000),
                ],
                ..Ledger::default()
            },
            Vec::new(),
        );
        let rows = store_breakdown(&store, &Categorizer::default());
        assert_eq!(rows[0].store, "Gap");
        assert_eq!(rows[1].store, "Amazon");
    }

    #[test]
    fn test_category_filter_and_rollup() {
        let rows = store_breakdown(&sample_store(), &Categorizer::default());
        let grocery = filter_category(&rows, Some(Category::Grocery));
        assert_eq!(grocery.len(), 2);
        assert_eq!(filter_category(&rows, None).len(), 4);

        let rollup = category_rollup(&rows);
        assert_eq!(rollup.len(), 4);
        assert_eq!(rollup[0].category, Category::Grocery);
        assert_eq!(rollup[0].cards, 3);
        assert_eq!(rollup[0].remaining, Amount::from_cents(11000));
        assert_eq!(rollup[1].remaining, Amount::from_cents(1500));
        assert_eq!(rollup[2].stores, 0);
        assert_eq!(rollup[3].redeemed, Amount::from_cents(800));
    }

    #[test]
    fn test_paginate_clamps() {
        let items: Vec<u32> = (1..=25).collect();
        let p = paginate(&items, 2, 10);
        assert_eq!(p.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(p.total_pages, 3);
        let p = paginate(&items, 9, 10);
        assert_eq!(p.page, 3);
        assert_eq!(p.items, vec![21, 22, 23, 24, 25]);
        let empty: Vec<u32> = Vec::new();
        let p = paginate(&empty, 0, 10);
        assert_eq!((p.page, p.total_pages, p.items.len()), (1, 1, 0));
    }

    #[test]
    fn test_treemap_skips_empty_stores() {
        let mut store = sample_store();
        let rows = store_breakdown(&store, &Categorizer::default());
        let tiles = treemap(&rows);
        assert_eq!(tiles.len(), 4);
        let total: f64 = tiles.iter().map(|t| t.share).sum();
        assert!((total - 1.0).abs() < 1e-9);

        store = Store::new(
            Ledger {
                cards: vec![card(1, "Gap", "0001", 1000, 0)],
                ..Ledger::default()
            },
            Vec::new(),
        );
        assert!(treemap(&store_breakdown(&store, &Categorizer::default())).is_empty());
    }

    #[test]
    fn test_window_cutoffs() {
        let now = at("2024-06-10T12:00:00");
        assert_eq!(TimeWindow::Last7Days.cutoff(now), at("2024-06-03T12:00:00"));
        assert_eq!(TimeWindow::Last30Days.cutoff(now), at("2024-05-11T12:00:00"));
        assert_eq!(TimeWindow::Last3Months.cutoff(now), at("2024-03-10T12:00:00"));
        assert_eq!(TimeWindow::parse("90d"), Some(TimeWindow::Last3Months));
        assert_eq!(TimeWindow::parse("Last 7 days"), Some(TimeWindow::Last7Days));
        assert_eq!(TimeWindow::parse("year"), None);
    }

    #[test]
    fn test_donation_log_merges_both_sources() {
        let log = donation_log(&sample_store());
        assert_eq!(log.len(), 4);
        assert_eq!(log[0].date, "2024-06-05");
        let projected = log.iter().find(|e| e.source == DonationSource::Ledger).unwrap();
        assert_eq!(projected.store, "Target");
        assert_eq!(projected.recipient, "Family shelter");
        assert_eq!(donation_total(&log), Amount::from_cents(11000));
    }

    #[test]
    fn test_donation_filters() {
        let log = donation_log(&sample_store());
        let now = at("2024-06-10T12:00:00");

        let f = DonationFilter {
            window: Some(TimeWindow::Last7Days),
            ..DonationFilter::default()
        };
        assert_eq!(filter_donations(&log, &f, now).len(), 1);

        let f = DonationFilter {
            window: Some(TimeWindow::Last3Months),
            ..DonationFilter::default()
        };
        assert_eq!(filter_donations(&log, &f, now).len(), 3);

        let f = DonationFilter {
            store: Some("Target".to_string()),
            ..DonationFilter::default()
        };
        let target = filter_donations(&log, &f, now);
        assert_eq!(target.len(), 3);
        assert!(target.iter().all(|e| e.store == "Target"));

        let f = DonationFilter {
            recipient: Some("FAMILY".to_string()),
            ..DonationFilter::default()
        };
        assert_eq!(filter_donations(&log, &f, now).len(), 3);

        let f = DonationFilter {
            start: NaiveDate::from_ymd_opt(2024, 6, 2),
            end: NaiveDate::from_ymd_opt(2024, 6, 2),
            ..DonationFilter::default()
        };
        let one = filter_donations(&log, &f, now);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].source, DonationSource::Ledger);
    }

    #[test]
    fn test_search_cards() {
        let store = sample_store();
        let f = CardFilter {
            store: Some("Target".to_string()),
            ..CardFilter::default()
        };
        assert_eq!(search_cards(&store, &f).len(), 2);
        let f = CardFilter {
            last4_prefix: Some("000".to_string()),
            status: Some(CardStatus::Active),
            ..CardFilter::default()
        };
        assert_eq!(search_cards(&store, &f).len(), 4);
        let f = CardFilter {
            last4_prefix: Some("0005".to_string()),
            ..CardFilter::default()
        };
        assert_eq!(search_cards(&store, &f)[0].store, "Corner Bakery");
    }

    #[test]
    fn test_dashboard() {
        let d = dashboard(&sample_store(), &Categorizer::default(), Amount::from_cents(2000));
        assert_eq!(d.summary.active_cards, 4);
        assert_eq!(d.total_donated, Amount::from_cents(11000));
        assert_eq!(d.donation_count, 4);
        assert_eq!(d.unique_recipients, 3);
        let low: Vec<u64> = d.low_balance.iter().map(|c| c.id).collect();
        assert_eq!(low, vec![4, 5]);
        assert_eq!(d.recent_transactions[0].transaction.id, 3);
        assert_eq!(d.recent_transactions[0].store, "Corner Bakery");
        assert_eq!(d.recent_donations.len(), 4);
        assert_eq!(d.treemap.len(), 4);
    }
}
