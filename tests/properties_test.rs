//! Invariants of the expense ledger over arbitrary sequences of insertions.

use chrono::NaiveDate;
use impensa::domain::{Cents, ExpenseLedger, MAX_AMOUNT_CENTS, Metrics, ValidationError};
use proptest::prelude::*;

const CATEGORIES: [&str; 4] = ["Food", "Transport", "Bills", "Pets"];

fn expense() -> impl Strategy<Value = (Cents, usize, u32)> {
    (1..1_000_000i64, 0..CATEGORIES.len(), 0..365u32)
}

fn build_ledger(expenses: &[(Cents, usize, u32)]) -> ExpenseLedger {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut ledger = ExpenseLedger::new();
    for (i, (amount, category, offset)) in expenses.iter().enumerate() {
        let date = start + chrono::Duration::days(i64::from(*offset));
        ledger
            .add_record(*amount, CATEGORIES[*category], &format!("expense {i}"), date)
            .unwrap();
    }
    ledger
}

proptest! {
    #[test]
    fn total_is_sum_of_amounts(expenses in prop::collection::vec(expense(), 0..50)) {
        let ledger = build_ledger(&expenses);
        let expected: Cents = expenses.iter().map(|(amount, _, _)| amount).sum();
        prop_assert_eq!(ledger.metrics().total, expected);
        prop_assert_eq!(ledger.metrics().count, expenses.len());
    }

    #[test]
    fn category_totals_sum_to_grand_total(expenses in prop::collection::vec(expense(), 0..50)) {
        let ledger = build_ledger(&expenses);
        let grouped: Cents = ledger.group_by_category().values().sum();
        let daily: Cents = ledger.daily_totals().values().sum();
        prop_assert_eq!(grouped, ledger.metrics().total);
        prop_assert_eq!(daily, ledger.metrics().total);
    }

    #[test]
    fn maximum_bounds_every_amount(expenses in prop::collection::vec(expense(), 1..50)) {
        let ledger = build_ledger(&expenses);
        let metrics = ledger.metrics();
        prop_assert!(ledger.records().iter().all(|r| r.amount_cents <= metrics.maximum));
        prop_assert!(metrics.average <= metrics.maximum);
        prop_assert!(metrics.average > 0);
    }

    #[test]
    fn recent_is_reverse_insertion_order(
        expenses in prop::collection::vec(expense(), 0..30),
        n in 0usize..40,
    ) {
        let ledger = build_ledger(&expenses);
        let recent = ledger.recent(n);
        prop_assert_eq!(recent.len(), n.min(expenses.len()));

        let expected: Vec<_> = ledger.records().iter().rev().take(n).collect();
        prop_assert_eq!(recent, expected);
    }

    #[test]
    fn rejected_amounts_leave_ledger_unchanged(
        expenses in prop::collection::vec(expense(), 0..20),
        bad_amount in -1_000_000i64..=0,
    ) {
        let mut ledger = build_ledger(&expenses);
        let before = ledger.metrics();
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        prop_assert!(ledger.add_record(bad_amount, "Food", "bad", day).is_err());
        prop_assert_eq!(ledger.metrics(), before);
        prop_assert_eq!(ledger.len(), expenses.len());
    }

    #[test]
    fn huge_amounts_never_break_aggregates(
        amounts in prop::collection::vec(MAX_AMOUNT_CENTS / 2..=Cents::MAX, 1..20),
    ) {
        let mut ledger = ExpenseLedger::new();
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut expected: Cents = 0;

        for amount in &amounts {
            let result = ledger.add_record(*amount, "Bills", "big", day);
            if *amount <= MAX_AMOUNT_CENTS {
                prop_assert!(result.is_ok());
                expected += amount;
            } else {
                prop_assert_eq!(result, Err(ValidationError::AmountTooLarge(*amount)));
            }
        }

        let metrics = ledger.metrics();
        prop_assert_eq!(metrics.total, expected);
        prop_assert!(metrics.average <= metrics.maximum);
        let grouped: Cents = ledger.group_by_category().values().sum();
        prop_assert_eq!(grouped, expected);
        let daily: Cents = ledger.daily_totals().values().sum();
        prop_assert_eq!(daily, expected);
        if let Some(bills) = ledger.category_distribution().get("Bills") {
            prop_assert!(bills.min <= bills.median && bills.median <= bills.max);
        }
    }

    #[test]
    fn reset_always_yields_zero_metrics(expenses in prop::collection::vec(expense(), 0..30)) {
        let mut ledger = build_ledger(&expenses);
        let categories_before = ledger.categories().clone();

        ledger.reset();
        prop_assert_eq!(ledger.metrics(), Metrics::default());
        prop_assert_eq!(ledger.categories(), &categories_before);
    }

    #[test]
    fn created_at_is_non_decreasing(expenses in prop::collection::vec(expense(), 0..30)) {
        let ledger = build_ledger(&expenses);
        let records = ledger.records();
        prop_assert!(records.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }
}
