use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::duplicate::find_duplicate;
use crate::error::{GiftError, Result};
use crate::models::{Amount, CardStatus, GiftCard};
use crate::store::Store;

fn last4_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{4}$").expect("valid last4 pattern"))
}

pub fn is_valid_last4(last4: &str) -> bool {
    last4_re().is_match(last4)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Store,
    Last4,
    Amount,
    AddedBy,
    DateAdded,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Last4 => "last4",
            Self::Amount => "amount",
            Self::AddedBy => "added_by",
            Self::DateAdded => "date_added",
        }
    }

    /// Message shown next to the form field.
    pub fn form_message(&self) -> &'static str {
        match self {
            Self::Store => "Store is required",
            Self::Last4 => "Must be exactly 4 digits",
            Self::Amount => "Enter a valid dollar amount",
            Self::AddedBy => "Added by is required",
            Self::DateAdded => "Enter a valid date (YYYY-MM-DD)",
        }
    }

    /// Message shown in the CSV preview's row status column.
    pub fn row_message(&self) -> &'static str {
        match self {
            Self::Store => "Store missing",
            Self::Last4 => "Last 4 must be 4 digits",
            Self::Amount => "Invalid amount",
            Self::AddedBy => "Added by missing",
            Self::DateAdded => "Invalid date",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<Field>);

impl ValidationErrors {
    #[cfg(test)]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains(&field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|field| format!("{}: {}", field.name(), field.form_message()))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct CardForm {
    pub store: String,
    pub last4: String,
    pub amount: String,
    pub date_added: Option<String>,
    pub added_by: String,
    pub notes: Option<String>,
}

/// Form input that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub store: String,
    pub last4: String,
    pub amount: Amount,
    pub date_added: String,
    pub added_by: String,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub enum IntakeOutcome {
    Added(GiftCard),
    /// Nothing was committed; an existing card already has this store and
    /// last four. Resubmit with confirmation to add anyway.
    PossibleDuplicate(GiftCard),
}

/// Field checks shared by single entry and the CSV importer.
pub(crate) fn check_fields(
    store: &str,
    last4: &str,
    amount: &str,
    added_by: &str,
) -> (Vec<Field>, Option<Amount>) {
    let mut errors = Vec::new();
    if store.trim().is_empty() {
        errors.push(Field::Store);
    }
    if !is_valid_last4(last4) {
        errors.push(Field::Last4);
    }
    let parsed = Amount::parse(amount).filter(|a| a.is_positive());
    if parsed.is_none() {
        errors.push(Field::Amount);
    }
    if added_by.trim().is_empty() {
        errors.push(Field::AddedBy);
    }
    (errors, parsed)
}

pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub fn validate(form: &CardForm) -> std::result::Result<NewCard, ValidationErrors> {
    let (mut errors, amount) = check_fields(&form.store, &form.last4, &form.amount, &form.added_by);
    let date_added = match form.date_added.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => {
            if chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err() {
                errors.push(Field::DateAdded);
            }
            d.to_string()
        }
        _ => today(),
    };
    match amount {
        Some(amount) if errors.is_empty() => Ok(NewCard {
            store: form.store.trim().to_string(),
            last4: form.last4.clone(),
            amount,
            date_added,
            added_by: form.added_by.trim().to_string(),
            notes: form
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

/// Append a validated card to the registry and return it.
pub fn commit(store: &mut Store, new_card: NewCard) -> GiftCard {
    let card = GiftCard {
        id: store.next_card_id(),
        store: new_card.store,
        last4: new_card.last4,
        initial_balance: new_card.amount,
        remaining_balance: new_card.amount,
        status: CardStatus::Active,
        added_date: new_card.date_added,
        added_by: new_card.added_by,
        notes: new_card.notes,
    };
    store.push_card(card.clone());
    log::info!("added {} card ending {} for {}", card.store, card.last4, card.initial_balance);
    card
}

/// Validate, check for a duplicate, and commit.
///
/// With `add_anyway` unset, a duplicate stops at the confirmation state and
/// nothing is written.
pub fn submit(store: &mut Store, form: &CardForm, add_anyway: bool) -> Result<IntakeOutcome> {
    let new_card = validate(form).map_err(GiftError::Validation)?;
    if let Some(existing) = find_duplicate(&new_card.store, &new_card.last4, store.cards()) {
        if !add_anyway {
            log::warn!(
                "possible duplicate of card {} ({} {})",
                existing.id,
                existing.store,
                existing.last4
            );
            return Ok(IntakeOutcome::PossibleDuplicate(existing.clone()));
        }
        log::info!("adding duplicate of card {} after confirmation", existing.id);
    }
    Ok(IntakeOutcome::Added(commit(store, new_card)))
}
