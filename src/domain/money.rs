use thiserror::Error;

/// Money is represented as integer cents to avoid floating-point drift in totals.
/// 1 unit = 100 cents, so 12.50 = 1250 cents.
pub type Cents = i64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a valid amount, use a format like 12.50")]
    InvalidFormat(String),

    #[error("amount is too large")]
    Overflow,
}

/// Format cents with two decimals and thousands separators.
/// Example: 123456 -> "1,234.56", -5 -> "-0.05"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    let units = (abs_cents / 100).to_string();
    let remainder = abs_cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}{grouped}.{remainder:02}")
}

/// Parse a decimal amount into cents.
///
/// Accepts an optional leading sign, thousands separators in the integer part
/// and up to two meaningful decimals; further decimals are truncated.
/// Example: "12.5" -> 1250, "1,000" -> 100000, ".05" -> 5
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseCentsError::Empty);
    }
    let invalid = || ParseCentsError::InvalidFormat(trimmed.to_string());

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (units_part, decimal_part) = match unsigned.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (unsigned, ""),
    };
    if units_part.is_empty() && decimal_part.is_empty() {
        return Err(invalid());
    }

    let units_digits: String = units_part.chars().filter(|c| *c != ',').collect();
    if !units_digits.chars().all(|c| c.is_ascii_digit())
        || !decimal_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let units: i64 = if units_digits.is_empty() {
        0
    } else {
        units_digits
            .parse()
            .map_err(|_| ParseCentsError::Overflow)?
    };

    // "5" is fifty cents, "05" is five; anything past two digits is dropped
    let decimal_cents: i64 = match decimal_part.len() {
        0 => 0,
        1 => i64::from(decimal_part.as_bytes()[0] - b'0') * 10,
        _ => decimal_part[..2].parse().map_err(|_| invalid())?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::Overflow)?;

    Ok(if negative { -cents } else { cents })
}
