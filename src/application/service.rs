use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::domain::{
    AmountDistribution, CategoryAdded, CategorySet, Cents, ExpenseLedger, ExpenseRecord, Metrics,
    div_round, format_cents, parse_cents,
};

use super::{AppError, CategoryReport, CategorySummary, Dashboard, TrendPoint};

/// Application service providing high-level operations over one ledger.
/// This is the interface presentation code (CLI, TUI, web handlers) uses.
#[derive(Debug, Clone)]
pub struct ExpenseService {
    ledger: ExpenseLedger,
    recent_limit: usize,
}

impl ExpenseService {
    /// Create a service with an empty ledger seeded from the config.
    pub fn new(config: &SessionConfig) -> Self {
        let mut ledger = ExpenseLedger::new().with_policy(config.category_policy);
        for label in &config.extra_categories {
            ledger.add_category(label);
        }

        Self {
            ledger,
            recent_limit: config.recent_limit,
        }
    }

    pub fn ledger(&self) -> &ExpenseLedger {
        &self.ledger
    }

    pub fn recent_limit(&self) -> usize {
        self.recent_limit
    }

    // ========================
    // Mutations
    // ========================

    /// Record an expense from raw user input. `date` defaults to today.
    pub fn record_expense(
        &mut self,
        amount: &str,
        category: &str,
        description: &str,
        date: Option<NaiveDate>,
    ) -> Result<ExpenseRecord, AppError> {
        let amount_cents = parse_cents(amount).inspect_err(|e| {
            warn!(amount, error = %e, "rejected expense amount");
        })?;
        let date = date.unwrap_or_else(today);

        match self
            .ledger
            .add_record(amount_cents, category, description, date)
        {
            Ok(record) => {
                info!(
                    id = %record.id,
                    amount = %format_cents(record.amount_cents),
                    category = %record.category,
                    date = %record.date,
                    "recorded expense"
                );
                Ok(record.clone())
            }
            Err(e) => {
                warn!(error = %e, "rejected expense");
                Err(e.into())
            }
        }
    }

    /// Register a category label. Blank or known labels are ignored.
    pub fn add_category(&mut self, label: &str) -> CategoryAdded {
        let outcome = self.ledger.add_category(label);
        match outcome {
            CategoryAdded::Added => info!(category = label.trim(), "added category"),
            CategoryAdded::NoOp => debug!(category = label, "category not added"),
        }
        outcome
    }

    /// Clear all records and return how many were removed.
    pub fn reset(&mut self) -> usize {
        let removed = self.ledger.len();
        self.ledger.reset();
        info!(removed, "ledger reset");
        removed
    }

    // ========================
    // Queries
    // ========================

    pub fn metrics(&self) -> Metrics {
        self.ledger.metrics()
    }

    /// The newest `n` records, newest first.
    pub fn recent(&self, n: usize) -> Vec<ExpenseRecord> {
        self.ledger.recent(n).into_iter().cloned().collect()
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        self.ledger.records()
    }

    pub fn categories(&self) -> &CategorySet {
        self.ledger.categories()
    }

    pub fn group_by_category(&self) -> BTreeMap<String, Cents> {
        self.ledger.group_by_category()
    }

    /// Points in the order the expenses were entered.
    pub fn time_series(&self) -> Vec<TrendPoint> {
        self.ledger
            .time_series()
            .into_iter()
            .map(|(date, amount_cents)| TrendPoint { date, amount_cents })
            .collect()
    }

    /// One point per day, in date order.
    pub fn daily_totals(&self) -> Vec<TrendPoint> {
        self.ledger
            .daily_totals()
            .into_iter()
            .map(|(date, amount_cents)| TrendPoint { date, amount_cents })
            .collect()
    }

    pub fn distribution(&self) -> BTreeMap<String, AmountDistribution> {
        self.ledger.category_distribution()
    }

    pub fn dashboard(&self) -> Dashboard {
        debug!(records = self.ledger.len(), "building dashboard");
        Dashboard {
            metrics: self.metrics(),
            recent: self.recent(self.recent_limit),
            by_category: self.group_by_category(),
        }
    }

    /// Per-category totals with counts, averages and share of the total.
    pub fn category_report(&self) -> CategoryReport {
        let total = self.ledger.metrics().total;

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in self.ledger.records() {
            *counts.entry(record.category.as_str()).or_insert(0) += 1;
        }

        let mut categories: Vec<CategorySummary> = self
            .ledger
            .group_by_category()
            .into_iter()
            .map(|(category, category_total)| {
                let count = counts.get(category.as_str()).copied().unwrap_or(0);
                CategorySummary {
                    average: if count == 0 {
                        0
                    } else {
                        div_round(category_total, count as i64)
                    },
                    percentage: if total == 0 {
                        0.0
                    } else {
                        category_total as f64 / total as f64 * 100.0
                    },
                    category,
                    total: category_total,
                    count,
                }
            })
            .collect();

        categories.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));

        CategoryReport { categories, total }
    }
}

impl Default for ExpenseService {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryPolicy, ParseCentsError, ValidationError};

    fn date(s: &str) -> Option<NaiveDate> {
        Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    #[test]
    fn test_record_expense_parses_amount() {
        let mut service = ExpenseService::default();
        let record = service
            .record_expense("12.50", "Food", "lunch", date("2024-01-01"))
            .unwrap();

        assert_eq!(record.amount_cents, 1250);
        assert_eq!(service.records().len(), 1);
    }

    #[test]
    fn test_record_expense_defaults_date_to_today() {
        let mut service = ExpenseService::default();
        let before = today();
        let record = service.record_expense("3", "Food", "coffee", None).unwrap();
        let after = today();
        assert!(record.date == before || record.date == after);
    }

    #[test]
    fn test_record_expense_rejects_bad_input() {
        let mut service = ExpenseService::default();

        assert!(matches!(
            service.record_expense("abc", "Food", "lunch", None),
            Err(AppError::InvalidAmount(ParseCentsError::InvalidFormat(_)))
        ));
        assert_eq!(
            service.record_expense("0", "Food", "lunch", None),
            Err(AppError::Validation(ValidationError::NonPositiveAmount(0)))
        );
        assert_eq!(
            service.record_expense("5", "Food", "  ", None),
            Err(AppError::Validation(ValidationError::EmptyDescription))
        );
        assert!(service.records().is_empty());
    }

    #[test]
    fn test_config_seeds_categories_and_policy() {
        let config = SessionConfig {
            category_policy: CategoryPolicy::Strict,
            extra_categories: vec!["Health".into(), "Food".into()],
            ..Default::default()
        };
        let mut service = ExpenseService::new(&config);

        assert_eq!(service.categories().len(), 7);
        assert!(service.record_expense("10", "Health", "dentist", None).is_ok());
        assert_eq!(
            service.record_expense("10", "Pets", "vet", None),
            Err(AppError::Validation(ValidationError::UnknownCategory(
                "Pets".into()
            )))
        );
    }

    #[test]
    fn test_dashboard_uses_recent_limit() {
        let config = SessionConfig {
            recent_limit: 2,
            ..Default::default()
        };
        let mut service = ExpenseService::new(&config);
        for (i, desc) in ["a", "b", "c"].iter().enumerate() {
            service
                .record_expense(&format!("{}", i + 1), "Food", desc, None)
                .unwrap();
        }

        let dashboard = service.dashboard();
        assert_eq!(dashboard.metrics.total, 600);
        assert_eq!(dashboard.recent.len(), 2);
        assert_eq!(dashboard.recent[0].description, "c");
        assert_eq!(dashboard.by_category.get("Food"), Some(&600));
    }

    #[test]
    fn test_category_report() {
        let mut service = ExpenseService::default();
        service
            .record_expense("10", "Food", "lunch", date("2024-01-01"))
            .unwrap();
        service
            .record_expense("20", "Transport", "bus", date("2024-01-02"))
            .unwrap();
        service
            .record_expense("30", "Food", "dinner", date("2024-01-03"))
            .unwrap();

        let report = service.category_report();
        assert_eq!(report.total, 6000);
        assert_eq!(report.categories.len(), 2);

        let food = &report.categories[0];
        assert_eq!(food.category, "Food");
        assert_eq!(food.total, 4000);
        assert_eq!(food.count, 2);
        assert_eq!(food.average, 2000);
        assert!((food.percentage - 66.67).abs() < 0.01);

        assert_eq!(report.categories[1].category, "Transport");
    }

    #[test]
    fn test_category_report_empty() {
        let report = ExpenseService::default().category_report();
        assert_eq!(report.total, 0);
        assert!(report.categories.is_empty());
    }

    #[test]
    fn test_reset_returns_removed_count() {
        let mut service = ExpenseService::default();
        service.record_expense("1", "Food", "a", None).unwrap();
        service.record_expense("2", "Food", "b", None).unwrap();

        assert_eq!(service.reset(), 2);
        assert_eq!(service.reset(), 0);
        assert_eq!(service.metrics(), Metrics::default());
    }
}
