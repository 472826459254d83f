use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Grocery,
    #[serde(rename = "Fast Food")]
    FastFood,
    Clothing,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Grocery,
        Category::FastFood,
        Category::Clothing,
        Category::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Grocery => "Grocery",
            Self::FastFood => "Fast Food",
            Self::Clothing => "Clothing",
            Self::Other => "Other",
        }
    }

    /// Accepts the display name or a loose spelling (`fast-food`, `fastfood`).
    pub fn parse(raw: &str) -> Option<Category> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "grocery" => Some(Self::Grocery),
            "fastfood" => Some(Self::FastFood),
            "clothing" => Some(Self::Clothing),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const STORE_CATEGORIES: &[(&str, Category)] = &[
    ("Walmart", Category::Grocery),
    ("Target", Category::Grocery),
    ("Kroger", Category::Grocery),
    ("Costco", Category::Grocery),
    ("Whole Foods", Category::Grocery),
    ("Safeway", Category::Grocery),
    ("Trader Joe's", Category::Grocery),
    ("McDonald's", Category::FastFood),
    ("Starbucks", Category::FastFood),
    ("Subway", Category::FastFood),
    ("Chipotle", Category::FastFood),
    ("Panera Bread", Category::FastFood),
    ("Dunkin'", Category::FastFood),
    ("Taco Bell", Category::FastFood),
    ("Chick-fil-A", Category::FastFood),
    ("Olive Garden", Category::FastFood),
    ("Old Navy", Category::Clothing),
    ("Gap", Category::Clothing),
    ("TJ Maxx", Category::Clothing),
    ("Kohl's", Category::Clothing),
    ("Macy's", Category::Clothing),
    ("Amazon", Category::Other),
    ("CVS Pharmacy", Category::Other),
    ("Best Buy", Category::Other),
    ("Home Depot", Category::Other),
];

/// Store names offered when registering a card.
pub const KNOWN_STORES: &[&str] = &[
    "Amazon", "Applebee's", "Best Buy", "Burger King", "CVS Pharmacy", "Chick-fil-A",
    "Chipotle", "Costco", "Dollar General", "Domino's", "Dunkin'", "Gap", "Home Depot",
    "IHOP", "KFC", "Kohl's", "Kroger", "Macy's", "McDonald's", "Old Navy", "Olive Garden",
    "Panera Bread", "Pizza Hut", "Safeway", "Starbucks", "Subway", "TJ Maxx", "Taco Bell",
    "Target", "Trader Joe's", "Walgreens", "Walmart", "Wendy's", "Whole Foods",
];

/// Store → category lookup: settings overrides first, then the built-in
/// table, then `Other`.
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    overrides: BTreeMap<String, Category>,
}

impl Categorizer {
    pub fn new(overrides: BTreeMap<String, Category>) -> Self {
        Self { overrides }
    }

    pub fn category(&self, store: &str) -> Category {
        if let Some(cat) = self.overrides.get(store) {
            return *cat;
        }
        STORE_CATEGORIES
            .iter()
            .find(|(name, _)| *name == store)
            .map(|(_, cat)| *cat)
            .unwrap_or(Category::Other)
    }
}

/// Case-insensitive substring search over the known store names, used to
/// suggest a canonical spelling.
pub fn suggest_stores(query: &str) -> Vec<&'static str> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return KNOWN_STORES.to_vec();
    }
    KNOWN_STORES
        .iter()
        .copied()
        .filter(|s| s.to_lowercase().contains(&q))
        .collect()
}
