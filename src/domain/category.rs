use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Categories every new ledger starts with.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Food",
    "Transport",
    "Entertainment",
    "Bills",
    "Shopping",
    "Others",
];

/// Whether a record's category has to be known to the ledger beforehand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryPolicy {
    /// Any non-blank label is accepted. The label is not added to the set.
    #[default]
    Open,
    /// Only labels already present in the category set are accepted.
    Strict,
}

impl CategoryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryPolicy::Open => "open",
            CategoryPolicy::Strict => "strict",
        }
    }
}

impl std::fmt::Display for CategoryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of [`CategorySet::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryAdded {
    Added,
    /// Blank or already present; nothing changed.
    NoOp,
}

/// The category vocabulary of a ledger. It grows but never shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    labels: BTreeSet<String>,
}

impl CategorySet {
    /// A set holding only [`DEFAULT_CATEGORIES`].
    pub fn with_defaults() -> Self {
        Self {
            labels: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn add(&mut self, label: &str) -> CategoryAdded {
        let label = label.trim();
        if label.is_empty() || self.labels.contains(label) {
            return CategoryAdded::NoOp;
        }
        self.labels.insert(label.to_string());
        CategoryAdded::Added
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label.trim())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::with_defaults()
    }
}
