// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use impensa::application::ExpenseService;
use impensa::cli::Session;
use impensa::config::SessionConfig;

/// Helper to parse a date string into a NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Service with the default configuration
pub fn test_service() -> ExpenseService {
    ExpenseService::new(&SessionConfig::default())
}

/// Test fixture: the lunch / bus / dinner ledger used across tests
pub struct StandardExpenses;

impl StandardExpenses {
    /// 10.00 Food, 20.00 Transport, 30.00 Food, entered in that order
    pub fn record_basic(service: &mut ExpenseService) -> Result<()> {
        service.record_expense("10.00", "Food", "lunch", Some(parse_date("2024-01-01")))?;
        service.record_expense("20.00", "Transport", "bus", Some(parse_date("2024-01-02")))?;
        service.record_expense("30.00", "Food", "dinner", Some(parse_date("2024-01-03")))?;
        Ok(())
    }
}

/// Run a script through a fresh session and return what it printed
pub fn run_script(config: &SessionConfig, script: &str) -> Result<(String, ExpenseService)> {
    run_input(config, script.as_bytes())
}

/// Like [`run_script`], for raw input that may not be valid UTF-8
pub fn run_input(config: &SessionConfig, input: &[u8]) -> Result<(String, ExpenseService)> {
    let mut session = Session::new(ExpenseService::new(config), &config.currency_symbol, Vec::new());
    session.run(input)?;
    let service = session.service().clone();
    let output = String::from_utf8(session.into_output())?;
    Ok((output, service))
}
