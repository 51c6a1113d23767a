use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Cents, format_cents};

pub type ExpenseId = Uuid;

/// Largest amount a single record may carry: one trillion currency units.
pub const MAX_AMOUNT_CENTS: Cents = 100_000_000_000_000;

/// Reasons an expense is refused by the ledger. The ledger is left untouched
/// whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount must be positive, got {}", amount_text(.0))]
    NonPositiveAmount(Cents),

    #[error("amount {} is too large for the ledger", amount_text(.0))]
    AmountTooLarge(Cents),

    #[error("description must not be empty")]
    EmptyDescription,

    #[error("category must not be empty")]
    EmptyCategory,

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

fn amount_text(cents: &Cents) -> String {
    format_cents(*cents)
}

/// A single logged expense. Records are immutable once they are in a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    pub category: String,
    pub description: String,
    /// Calendar day the expense happened, as entered by the user
    pub date: NaiveDate,
    /// When the ledger accepted the record
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    /// Validate the raw fields and build a record stamped with `created_at`.
    /// Category and description are stored trimmed.
    pub fn new(
        amount_cents: Cents,
        category: &str,
        description: &str,
        date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if amount_cents <= 0 {
            return Err(ValidationError::NonPositiveAmount(amount_cents));
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(ValidationError::AmountTooLarge(amount_cents));
        }

        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            amount_cents,
            category: category.to_string(),
            description: description.to_string(),
            date,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_create_record_trims_text() {
        let record = ExpenseRecord::new(1250, " Food ", "  lunch ", day(), Utc::now()).unwrap();

        assert_eq!(record.amount_cents, 1250);
        assert_eq!(record.category, "Food");
        assert_eq!(record.description, "lunch");
        assert_eq!(record.date, day());
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        assert_eq!(
            ExpenseRecord::new(0, "Food", "free", day(), Utc::now()),
            Err(ValidationError::NonPositiveAmount(0))
        );
        assert_eq!(
            ExpenseRecord::new(-500, "Food", "refund", day(), Utc::now()),
            Err(ValidationError::NonPositiveAmount(-500))
        );
    }

    #[test]
    fn test_rejects_blank_description_and_category() {
        assert_eq!(
            ExpenseRecord::new(100, "Food", " \t", day(), Utc::now()),
            Err(ValidationError::EmptyDescription)
        );
        assert_eq!(
            ExpenseRecord::new(100, "", "lunch", day(), Utc::now()),
            Err(ValidationError::EmptyCategory)
        );
    }

    #[test]
    fn test_amount_upper_bound() {
        let record =
            ExpenseRecord::new(MAX_AMOUNT_CENTS, "Bills", "house", day(), Utc::now()).unwrap();
        assert_eq!(record.amount_cents, MAX_AMOUNT_CENTS);

        assert_eq!(
            ExpenseRecord::new(MAX_AMOUNT_CENTS + 1, "Bills", "house", day(), Utc::now()),
            Err(ValidationError::AmountTooLarge(MAX_AMOUNT_CENTS + 1))
        );
        assert_eq!(
            ExpenseRecord::new(i64::MAX, "Bills", "house", day(), Utc::now()),
            Err(ValidationError::AmountTooLarge(i64::MAX))
        );
    }

    #[test]
    fn test_amount_is_checked_before_description() {
        assert_eq!(
            ExpenseRecord::new(-1, "Food", "", day(), Utc::now()),
            Err(ValidationError::NonPositiveAmount(-1))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::NonPositiveAmount(-500).to_string(),
            "amount must be positive, got -5.00"
        );
        assert_eq!(
            ValidationError::AmountTooLarge(500_000_000_000_000).to_string(),
            "amount 5,000,000,000,000.00 is too large for the ledger"
        );
        assert_eq!(
            ValidationError::UnknownCategory("Pets".into()).to_string(),
            "unknown category: Pets"
        );
    }
}
