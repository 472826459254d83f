use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A dollar amount held as whole cents.
///
/// Fixtures carry plain decimal dollars (`50.0`); they are rounded to the
/// nearest cent on the way in so balance arithmetic stays exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    /// Largest amount accepted from user input: $1,000,000,000.
    pub const MAX: Amount = Amount(100_000_000_000);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_dollars(dollars: f64) -> Self {
        Self((dollars * 100.0).round() as i64)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Parse user input such as `25`, `12.50` or `$100.00`.
    /// Returns `None` for anything that is not a finite number or is above
    /// [`Amount::MAX`].
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        let s = s.strip_prefix('$').unwrap_or(s).trim();
        if s.is_empty() {
            return None;
        }
        let value: f64 = s.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        let amount = Self::from_dollars(value);
        if amount > Self::MAX {
            return None;
        }
        Some(amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::fmt::money(self.dollars()))
    }
}

impl Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Amount {
    type Output = Amount;
    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.dollars())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dollars = f64::deserialize(deserializer)?;
        Ok(Amount::from_dollars(dollars))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardStatus {
    Active,
    Used,
    Donated,
    Expired,
}

impl CardStatus {
    pub const ALL: [CardStatus; 4] = [
        CardStatus::Active,
        CardStatus::Used,
        CardStatus::Donated,
        CardStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Used => "Used",
            Self::Donated => "Donated",
            Self::Expired => "Expired",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftCard {
    pub id: u64,
    pub store: String,
    pub last4: String,
    pub initial_balance: Amount,
    pub remaining_balance: Amount,
    pub status: CardStatus,
    pub added_date: String,
    pub added_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl GiftCard {
    pub fn redeemed(&self) -> Amount {
        self.initial_balance - self.remaining_balance
    }

    /// Share of the initial value still on the card, 0–100.
    pub fn remaining_pct(&self) -> f64 {
        if self.initial_balance.is_positive() {
            self.remaining_balance.cents() as f64 / self.initial_balance.cents() as f64 * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Spend,
    Donation,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spend => f.write_str("spend"),
            Self::Donation => f.write_str("donation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: u64,
    pub card_id: u64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Amount,
    pub volunteer: String,
    pub recipient: Option<String>,
    #[serde(default)]
    pub notes: String,
}

/// A seeded, report-only donation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: u64,
    pub date: String,
    pub store: String,
    pub amount: Amount,
    pub volunteer: String,
    pub recipient: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub id: u64,
    pub filename: String,
    pub imported_at: String,
    pub row_count: usize,
    pub imported: usize,
    pub checksum: String,
}

/// Parse a fixture date: either `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<chrono::NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parse() {
        assert_eq!(Amount::parse("100.00"), Some(Amount::from_cents(10000)));
        assert_eq!(Amount::parse(" $12.5 "), Some(Amount::from_cents(1250)));
        assert_eq!(Amount::parse("0.1"), Some(Amount::from_cents(10)));
        assert_eq!(Amount::parse("-5"), Some(Amount::from_cents(-500)));
        assert_eq!(Amount::parse(""), None);
        assert_eq!(Amount::parse("abc"), None);
        assert_eq!(Amount::parse("NaN"), None);
        assert_eq!(Amount::parse("inf"), None);
        assert_eq!(Amount::parse("1000000000"), Some(Amount::MAX));
        assert_eq!(Amount::parse("1000000000.01"), None);
        assert_eq!(Amount::parse("1e300"), None);
    }

    #[test]
    fn test_amount_sums_saturate() {
        let huge: Amount = serde_json::from_str("1e300").unwrap();
        let total: Amount = [huge, huge, Amount::from_cents(1)].iter().sum();
        assert_eq!(total, Amount::from_cents(i64::MAX));
        assert!(total.is_positive());
    }

    #[test]
    fn test_amount_arithmetic_is_exact() {
        let r = Amount::parse("0.30").unwrap();
        let a = Amount::parse("0.10").unwrap();
        assert_eq!(r - a - a - a, Amount::ZERO);
        let total: Amount = [a, a, a].iter().sum();
        assert_eq!(total, r);
    }

    #[test]
    fn test_amount_serde_uses_dollars() {
        let json = serde_json::to_string(&Amount::from_cents(2550)).unwrap();
        assert_eq!(json, "25.5");
        let back: Amount = serde_json::from_str("19.999").unwrap();
        assert_eq!(back, Amount::from_cents(2000));
    }

    #[test]
    fn test_card_json_field_names() {
        let json = r#"{
            "id": 1, "store": "Walmart", "last4": "1234",
            "initialBalance": 100, "remainingBalance": 40.25,
            "status": "Active", "addedDate": "2024-05-01", "addedBy": "Sarah Johnson"
        }"#;
        let card: GiftCard = serde_json::from_str(json).unwrap();
        assert_eq!(card.redeemed(), Amount::from_cents(5975));
        assert_eq!(card.notes, None);
        assert_eq!(card.status, CardStatus::Active);
    }

    #[test]
    fn test_transaction_type_field() {
        let json = r#"{"id": 3, "cardId": 1, "date": "2024-05-02T10:00:00Z", "type": "donation",
            "amount": 20, "volunteer": "Amy Brown", "recipient": "Family shelter", "notes": ""}"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.kind, TransactionKind::Donation);
        assert_eq!(txn.recipient.as_deref(), Some("Family shelter"));
    }

    #[test]
    fn test_parse_date_accepts_both_forms() {
        let d = parse_date("2024-06-10").unwrap();
        assert_eq!(d.format("%Y-%m-%d %H:%M").to_string(), "2024-06-10 00:00");
        let t = parse_date("2024-06-10T14:30:00Z").unwrap();
        assert_eq!(t.format("%H:%M").to_string(), "14:30");
        assert!(parse_date("06/10/2024").is_none());
    }
}
