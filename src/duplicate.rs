use crate::models::GiftCard;

/// First card with the same store (ignoring case) and the same last four
/// digits. Plain linear scan; no ranking or fuzzy matching.
pub fn find_duplicate<'a>(store: &str, last4: &str, cards: &'a [GiftCard]) -> Option<&'a GiftCard> {
    let store = store.trim().to_lowercase();
    let last4 = last4.trim();
    cards
        .iter()
        .find(|c| c.store.to_lowercase() == store && c.last4 == last4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::card;

    #[test]
    fn test_match_ignores_store_case() {
        let cards = vec![card(1, "Walmart", "1234", 10000, 10000)];
        assert_eq!(find_duplicate("walmart", "1234", &cards).map(|c| c.id), Some(1));
        assert_eq!(find_duplicate("WALMART", "1234", &cards).map(|c| c.id), Some(1));
    }

    #[test]
    fn test_last4_must_match_exactly() {
        let cards = vec![card(1, "Walmart", "1234", 10000, 10000)];
        assert!(find_duplicate("Walmart", "1235", &cards).is_none());
        assert!(find_duplicate("Walmart", "123", &cards).is_none());
    }

    #[test]
    fn test_store_must_match_whole_name() {
        let cards = vec![card(1, "Walmart", "1234", 10000, 10000)];
        assert!(find_duplicate("Walm", "1234", &cards).is_none());
        assert!(find_duplicate("Target", "1234", &cards).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let cards = vec![
            card(1, "Target", "5678", 5000, 5000),
            card(2, "target", "5678", 2500, 2500),
        ];
        assert_eq!(find_duplicate("TARGET", "5678", &cards).map(|c| c.id), Some(1));
    }

    #[test]
    fn test_empty_registry() {
        assert!(find_duplicate("Target", "5678", &[]).is_none());
    }
}
