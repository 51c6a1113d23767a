use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    CategoryAdded, CategoryPolicy, CategorySet, Cents, ExpenseRecord, ValidationError,
};


/// Headline numbers of a ledger. All zero when the ledger is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub total: Cents,
    pub average: Cents,
    pub maximum: Cents,
    pub count: usize,
}

/// Spread of the amounts recorded under one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountDistribution {
    pub count: usize,
    pub min: Cents,
    pub median: Cents,
    pub max: Cents,
}

/// In-memory expense ledger: records in insertion order plus the category
/// vocabulary. Records can only be appended or cleared all at once.
///
/// The sum of all amounts always fits in [`Cents`], so every per-category
/// and per-day total fits as well.
#[derive(Debug, Clone, Default)]
pub struct ExpenseLedger {
    records: Vec<ExpenseRecord>,
    total: Cents,
    categories: CategorySet,
    policy: CategoryPolicy,
    last_created_at: Option<DateTime<Utc>>,
}

impl ExpenseLedger {
    /// Empty ledger with the default categories and the open policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: CategoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CategoryPolicy {
        self.policy
    }

    /// Validate and append an expense. On error nothing is recorded.
    ///
    /// The category is not registered in the category set; under
    /// [`CategoryPolicy::Strict`] it must already be there.
    pub fn add_record(
        &mut self,
        amount_cents: Cents,
        category: &str,
        description: &str,
        date: NaiveDate,
    ) -> Result<&ExpenseRecord, ValidationError> {
        let created_at = self.next_timestamp();
        let record = ExpenseRecord::new(amount_cents, category, description, date, created_at)?;

        if self.policy == CategoryPolicy::Strict && !self.categories.contains(&record.category) {
            return Err(ValidationError::UnknownCategory(record.category));
        }

        let total = self
            .total
            .checked_add(record.amount_cents)
            .ok_or(ValidationError::AmountTooLarge(record.amount_cents))?;

        self.total = total;
        self.last_created_at = Some(created_at);
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Wall-clock now, held back to the previous insertion time if the
    /// clock moved backwards.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        }
    }

    /// Total, average and maximum. An empty ledger yields zeros.
    pub fn metrics(&self) -> Metrics {
        let count = self.records.len();
        if count == 0 {
            return Metrics::default();
        }

        let maximum = self
            .records
            .iter()
            .map(|r| r.amount_cents)
            .max()
            .unwrap_or(0);

        Metrics {
            total: self.total,
            average: div_round(self.total, count as i64),
            maximum,
            count,
        }
    }

    /// The last `n` records, newest first.
    pub fn recent(&self, n: usize) -> Vec<&ExpenseRecord> {
        self.records.iter().rev().take(n).collect()
    }

    /// Total per category, for categories that have at least one record.
    pub fn group_by_category(&self) -> BTreeMap<String, Cents> {
        let mut totals: BTreeMap<String, Cents> = BTreeMap::new();
        for record in &self.records {
            *totals.entry(record.category.clone()).or_insert(0) += record.amount_cents;
        }
        totals
    }

    /// One `(date, amount)` point per record in insertion order. Dates are
    /// not re-sorted; see [`ExpenseLedger::daily_totals`] for a
    /// chronological view.
    pub fn time_series(&self) -> Vec<(NaiveDate, Cents)> {
        self.records
            .iter()
            .map(|r| (r.date, r.amount_cents))
            .collect()
    }

    /// Totals per calendar day, ordered by date.
    pub fn daily_totals(&self) -> BTreeMap<NaiveDate, Cents> {
        let mut totals: BTreeMap<NaiveDate, Cents> = BTreeMap::new();
        for record in &self.records {
            *totals.entry(record.date).or_insert(0) += record.amount_cents;
        }
        totals
    }

    pub fn category_distribution(&self) -> BTreeMap<String, AmountDistribution> {
        let mut amounts: BTreeMap<String, Vec<Cents>> = BTreeMap::new();
        for record in &self.records {
            amounts
                .entry(record.category.clone())
                .or_default()
                .push(record.amount_cents);
        }

        amounts
            .into_iter()
            .filter_map(|(category, mut values)| {
                distribution(&mut values).map(|d| (category, d))
            })
            .collect()
    }

    /// Drop every record. Categories are kept.
    pub fn reset(&mut self) {
        self.records.clear();
        self.total = 0;
    }

    pub fn add_category(&mut self, label: &str) -> CategoryAdded {
        self.categories.add(label)
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Integer division rounding half away from zero. `divisor` must be positive.
/// Works on the remainder, so values near the ends of the range do not
/// overflow.
pub(crate) fn div_round(value: Cents, divisor: i64) -> Cents {
    let quotient = value / divisor;
    let remainder = (value % divisor).abs();
    if remainder >= divisor - remainder {
        quotient + value.signum()
    } else {
        quotient
    }
}

fn distribution(values: &mut [Cents]) -> Option<AmountDistribution> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();

    let count = values.len();
    let mid = count / 2;
    let median = if count % 2 == 1 {
        values[mid]
    } else {
        // Both halves are below the ledger total, so the sum fits.
        div_round(values[mid - 1] + values[mid], 2)
    };

    Some(AmountDistribution {
        count,
        min: values[0],
        median,
        max: values[count - 1],
    })
}
