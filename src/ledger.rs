use crate::error::Result;
use crate::models::{Amount, CardStatus, Transaction, TransactionKind};
use crate::store::Store;

/// Reasons a spend or donation is rejected. Nothing is changed when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("Enter a valid amount.")]
    InvalidAmount,
    #[error("Please select a volunteer.")]
    VolunteerRequired,
    #[error("Please enter a recipient name.")]
    RecipientRequired,
    #[error("Exceeds remaining balance of {0}.")]
    ExceedsBalance(Amount),
}

pub struct SpendRequest {
    pub amount: String,
    pub volunteer: String,
    pub notes: String,
}

pub enum DonationAmount {
    /// Give away whatever is left on the card.
    Full,
    Partial(String),
}

pub struct DonationRequest {
    pub amount: DonationAmount,
    pub recipient: String,
    pub volunteer: String,
    pub notes: String,
}

fn parse_positive(raw: &str) -> std::result::Result<Amount, LedgerError> {
    Amount::parse(raw)
        .filter(|a| a.is_positive())
        .ok_or(LedgerError::InvalidAmount)
}

fn within(amount: Amount, remaining: Amount) -> std::result::Result<Amount, LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount);
    }
    if amount > remaining {
        return Err(LedgerError::ExceedsBalance(remaining));
    }
    Ok(amount)
}

fn now() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}

/// Decrement the card and append the transaction. Callers have already
/// checked `0 < amount <= remaining`.
fn apply(
    store: &mut Store,
    card_id: u64,
    kind: TransactionKind,
    amount: Amount,
    volunteer: String,
    recipient: Option<String>,
    notes: String,
) -> Result<Transaction> {
    let card = store.card_mut(card_id)?;
    card.remaining_balance -= amount;
    if card.remaining_balance == Amount::ZERO {
        card.status = match kind {
            TransactionKind::Spend => CardStatus::Used,
            TransactionKind::Donation => CardStatus::Donated,
        };
        log::info!("card {} is now {}", card.id, card.status);
    }
    let txn = Transaction {
        id: store.next_transaction_id(),
        card_id,
        date: now(),
        kind,
        amount,
        volunteer,
        recipient,
        notes,
    };
    store.push_transaction(txn.clone());
    Ok(txn)
}

/// Record a purchase made with a card.
pub fn record_spend(store: &mut Store, card_id: u64, req: SpendRequest) -> Result<Transaction> {
    let remaining = store.card(card_id)?.remaining_balance;
    let amount = parse_positive(&req.amount)?;
    let volunteer = req.volunteer.trim();
    if volunteer.is_empty() {
        return Err(LedgerError::VolunteerRequired.into());
    }
    let amount = within(amount, remaining)?;
    apply(
        store,
        card_id,
        TransactionKind::Spend,
        amount,
        volunteer.to_string(),
        None,
        req.notes.trim().to_string(),
    )
}

/// Give all or part of a card's balance to a recipient.
pub fn record_donation(
    store: &mut Store,
    card_id: u64,
    req: DonationRequest,
) -> Result<Transaction> {
    let remaining = store.card(card_id)?.remaining_balance;
    let volunteer = req.volunteer.trim();
    if volunteer.is_empty() {
        return Err(LedgerError::VolunteerRequired.into());
    }
    let recipient = req.recipient.trim();
    if recipient.is_empty() {
        return Err(LedgerError::RecipientRequired.into());
    }
    let amount = match &req.amount {
        DonationAmount::Full => remaining,
        DonationAmount::Partial(raw) => parse_positive(raw)?,
    };
    let amount = within(amount, remaining)?;
    apply(
        store,
        card_id,
        TransactionKind::Donation,
        amount,
        volunteer.to_string(),
        Some(recipient.to_string()),
        req.notes.trim().to_string(),
    )
}
