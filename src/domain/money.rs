use thiserror::Error;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// ₱50.00 = 5000 cents.
pub type Cents = i64;

/// Currency symbol used when none is configured.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₱";

/// Format cents as a bare number with up to two fraction digits and no grouping.
/// Example: 10000 -> "100", 1250 -> "12.5", 5 -> "0.05"
pub fn format_amount(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!(
        "{}{}{}",
        sign,
        abs_cents / 100,
        fraction_suffix(abs_cents % 100)
    )
}

/// Format cents for display: currency symbol, thousands separators and
/// between zero and two fraction digits.
/// Example: 123456750 with "₱" -> "₱1,234,567.5"
pub fn format_currency(cents: Cents, symbol: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!(
        "{}{}{}{}",
        symbol,
        sign,
        group_thousands(abs_cents / 100),
        fraction_suffix(abs_cents % 100)
    )
}

fn fraction_suffix(remainder: Cents) -> String {
    match remainder {
        0 => String::new(),
        r if r % 10 == 0 => format!(".{}", r / 10),
        r => format!(".{:02}", r),
    }
}

fn group_thousands(units: Cents) -> String {
    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    let parts: Vec<&str> = input.split('.').collect();
    match parts.len() {
        1 => {
            let units: i64 = parts[0]
                .parse()
                .map_err(|_| ParseCentsError::InvalidFormat)?;
            let cents = units
                .checked_mul(100)
                .ok_or(ParseCentsError::OutOfRange)?;
            Ok(if negative { -cents } else { cents })
        }
        2 => {
            if parts[0].is_empty() && parts[1].is_empty() {
                return Err(ParseCentsError::InvalidFormat);
            }
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?
            };

            let decimal_str = parts[1];
            if !decimal_str.chars().all(|c| c.is_ascii_digit()) {
                return Err(ParseCentsError::InvalidFormat);
            }
            let decimal_cents: i64 = match decimal_str.len() {
                0 => 0,
                // "5" means 50 cents
                1 => decimal_str
                    .parse::<i64>()
                    .map_err(|_| ParseCentsError::InvalidFormat)?
                    * 10,
                2 => decimal_str
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?,
                // More than two decimal places are truncated
                _ => decimal_str[..2]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?,
            };

            let cents = units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseCentsError::OutOfRange)?;
            Ok(if negative { -cents } else { cents })
        }
        _ => Err(ParseCentsError::InvalidFormat),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("invalid money format")]
    InvalidFormat,

    #[error("amount is too large")]
    OutOfRange,
}
