use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::domain::CategoryPolicy;

pub const DEFAULT_RECENT_LIMIT: usize = 5;
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Settings for one expense-tracking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How many records the dashboard and `recent` show by default
    pub recent_limit: usize,
    pub category_policy: CategoryPolicy,
    /// Labels added to the default categories when a ledger is created
    pub extra_categories: Vec<String>,
    /// Prefix used when amounts are printed
    pub currency_symbol: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
            category_policy: CategoryPolicy::Open,
            extra_categories: Vec::new(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

/// Values given on the command line. They win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub recent_limit: Option<usize>,
    pub strict_categories: bool,
    pub extra_categories: Vec<String>,
    pub currency_symbol: Option<String>,
}

/// Shape of the optional TOML config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    recent_limit: Option<usize>,
    strict_categories: Option<bool>,
    extra_categories: Option<Vec<String>>,
    currency_symbol: Option<String>,
}

impl SessionConfig {
    /// Merge defaults, the config file (if any) and command-line overrides.
    pub fn resolve(config_file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let file_config = match config_file {
            Some(path) => load_config_file(path)?,
            None => PartialConfig::default(),
        };

        let PartialConfig {
            recent_limit: file_recent_limit,
            strict_categories: file_strict,
            extra_categories: file_categories,
            currency_symbol: file_currency_symbol,
        } = file_config;

        let recent_limit = overrides
            .recent_limit
            .or(file_recent_limit)
            .unwrap_or(DEFAULT_RECENT_LIMIT);
        if recent_limit == 0 {
            bail!("recent limit must be at least 1");
        }

        let category_policy = if overrides.strict_categories || file_strict.unwrap_or(false) {
            CategoryPolicy::Strict
        } else {
            CategoryPolicy::Open
        };

        let mut extra_categories = file_categories.unwrap_or_default();
        extra_categories.extend(overrides.extra_categories);

        let currency_symbol = overrides
            .currency_symbol
            .or(file_currency_symbol)
            .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

        Ok(Self {
            recent_limit,
            category_policy,
            extra_categories,
            currency_symbol,
        })
    }
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}
