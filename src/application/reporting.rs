use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, ExpenseRecord, Metrics};

/// Everything the landing view shows at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub metrics: Metrics,
    /// Newest first
    pub recent: Vec<ExpenseRecord>,
    pub by_category: BTreeMap<String, Cents>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    /// Sorted by total, largest first
    pub categories: Vec<CategorySummary>,
    pub total: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: usize,
    pub average: Cents,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub amount_cents: Cents,
}
