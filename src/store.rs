use serde::{Deserialize, Serialize};

use crate::error::{GiftError, Result};
use crate::models::{Donation, GiftCard, ImportRecord, Transaction};

/// The card registry and transaction ledger as loaded from `ledger.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub cards: Vec<GiftCard>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub imports: Vec<ImportRecord>,
}

/// All in-memory state for one session.
///
/// Views take `&Store`; the only writers are intake, the CSV importer and the
/// spend/donation ledger, which take `&mut Store`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    ledger: Ledger,
    donations: Vec<Donation>,
}

impl Store {
    pub fn new(ledger: Ledger, donations: Vec<Donation>) -> Self {
        Self { ledger, donations }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn cards(&self) -> &[GiftCard] {
        &self.ledger.cards
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.ledger.transactions
    }

    pub fn donations(&self) -> &[Donation] {
        &self.donations
    }

    pub fn imports(&self) -> &[ImportRecord] {
        &self.ledger.imports
    }

    pub fn card(&self, id: u64) -> Result<&GiftCard> {
        self.ledger
            .cards
            .iter()
            .find(|c| c.id == id)
            .ok_or(GiftError::UnknownCard(id))
    }

    pub(crate) fn card_mut(&mut self, id: u64) -> Result<&mut GiftCard> {
        self.ledger
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(GiftError::UnknownCard(id))
    }

    /// Transactions for one card, newest first.
    pub fn card_transactions(&self, card_id: u64) -> Vec<&Transaction> {
        let mut txns: Vec<&Transaction> = self
            .ledger
            .transactions
            .iter()
            .filter(|t| t.card_id == card_id)
            .collect();
        sort_newest_first(&mut txns, |t| t.date.as_str());
        txns
    }

    /// Sorted, de-duplicated store names present in the registry.
    pub fn store_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.ledger.cards.iter().map(|c| c.store.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// A fresh card id: milliseconds since the epoch, bumped past every id in
    /// use so rapid successive calls stay unique.
    pub fn next_card_id(&self) -> u64 {
        let now = chrono::Local::now().timestamp_millis().max(0) as u64;
        let max = self.ledger.cards.iter().map(|c| c.id).max().unwrap_or(0);
        now.max(max + 1)
    }

    pub fn next_transaction_id(&self) -> u64 {
        self.ledger.transactions.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn next_import_id(&self) -> u64 {
        self.ledger.imports.iter().map(|i| i.id).max().unwrap_or(0) + 1
    }

    pub(crate) fn push_card(&mut self, card: GiftCard) {
        log::debug!("registering card {} ({} {})", card.id, card.store, card.last4);
        self.ledger.cards.push(card);
    }

    pub(crate) fn push_transaction(&mut self, txn: Transaction) {
        log::debug!("recording {} #{} on card {}", txn.kind, txn.id, txn.card_id);
        self.ledger.transactions.push(txn);
    }

    pub(crate) fn push_import(&mut self, record: ImportRecord) {
        self.ledger.imports.push(record);
    }
}

/// Sort by a stored date string, newest first. Unparseable dates sink to the
/// end.
pub fn sort_newest_first<T>(items: &mut [T], date: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| {
        let da = crate::models::parse_date(date(a));
        let db = crate::models::parse_date(date(b));
        db.cmp(&da)
    });
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Amount, CardStatus, TransactionKind};

    pub(crate) fn card(
        id: u64,
        store: &str,
        last4: &str,
        initial: i64,
        remaining: i64,
    ) -> GiftCard {
        GiftCard {
            id,
            store: store.to_string(),
            last4: last4.to_string(),
            initial_balance: Amount::from_cents(initial),
            remaining_balance: Amount::from_cents(remaining),
            status: if remaining == 0 { CardStatus::Used } else { CardStatus::Active },
            added_date: "2024-05-01".to_string(),
            added_by: "Sarah Johnson".to_string(),
            notes: None,
        }
    }

    pub(crate) fn txn(
        id: u64,
        card_id: u64,
        date: &str,
        kind: TransactionKind,
        cents: i64,
    ) -> Transaction {
        Transaction {
            id,
            card_id,
            date: date.to_string(),
            kind,
            amount: Amount::from_cents(cents),
            volunteer: "Mike Davis".to_string(),
            recipient: match kind {
                TransactionKind::Spend => None,
                TransactionKind::Donation => Some("Family shelter".to_string()),
            },
            notes: String::new(),
        }
    }

    pub(crate) fn test_store(cards: Vec<GiftCard>) -> Store {
        Store::new(
            Ledger {
                cards,
                ..Ledger::default()
            },
            Vec::new(),
        )
    }

    #[test]
    fn test_card_lookup() {
        let store = test_store(vec![card(7, "Target", "5678", 5000, 5000)]);
        assert_eq!(store.card(7).unwrap().store, "Target");
        assert!(matches!(store.card(8), Err(GiftError::UnknownCard(8))));
    }

    #[test]
    fn test_next_ids_are_unique() {
        let far_future = 9_000_000_000_000;
        let store = test_store(vec![card(far_future, "Target", "5678", 5000, 5000)]);
        assert_eq!(store.next_card_id(), far_future + 1);
        assert_eq!(store.next_transaction_id(), 1);
    }

    #[test]
    fn test_card_transactions_newest_first() {
        let mut store = test_store(vec![card(1, "Target", "5678", 5000, 3000)]);
        store.push_transaction(txn(1, 1, "2024-05-01T09:00:00Z", TransactionKind::Spend, 1000));
        store.push_transaction(txn(2, 2, "2024-05-03T09:00:00Z", TransactionKind::Spend, 1000));
        store.push_transaction(txn(3, 1, "2024-05-02T09:00:00Z", TransactionKind::Spend, 1000));
        let ids: Vec<u64> = store.card_transactions(1).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_store_names_sorted_unique() {
        let store = test_store(vec![
            card(1, "Walmart", "1111", 100, 100),
            card(2, "Amazon", "2222", 100, 100),
            card(3, "Walmart", "3333", 100, 100),
        ]);
        assert_eq!(store.store_names(), vec!["Amazon", "Walmart"]);
    }
}
