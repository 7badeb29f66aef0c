use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Non-negative, finite grant size in whole currency units (dollars).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct MonetaryAmount(f64);

impl MonetaryAmount {
    pub fn new(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite);
        }
        if value < 0.0 {
            return Err(AmountError::Negative(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for MonetaryAmount {
    type Error = AmountError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MonetaryAmount> for f64 {
    fn from(amount: MonetaryAmount) -> Self {
        amount.0
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::fees::format_currency(self.0))
    }
}

/// Raised when a raw number cannot stand in for a grant amount.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be a finite number")]
    NotFinite,
    #[error("amount must not be negative (found {0})")]
    Negative(f64),
}

/// Amount as it arrives from a form field or a stored grant document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    /// Coerce the input into a usable amount. Unparseable text and negative numbers resolve
    /// to `None`, which fee quoting maps to the minimum fee.
    pub fn resolve(&self) -> Option<MonetaryAmount> {
        match self {
            AmountInput::Number(value) => MonetaryAmount::new(*value).ok(),
            AmountInput::Text(text) => parse_amount(text),
        }
    }

    /// Human readable form used by grant listings.
    pub fn display(&self) -> String {
        match self {
            AmountInput::Number(value) => super::fees::format_currency(*value),
            AmountInput::Text(text) => text.trim().to_string(),
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

// Grouped thousands first so "50,000" is one match rather than "50" and "000".
static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?")
        .expect("amount pattern is a valid regex")
});

/// Extract the representative amount from free text such as `"$50,000 - $100,000"`.
///
/// Every number in the text is parsed (thousands separators and decimals allowed) and the
/// largest one wins. Text without digits yields `None`, never zero.
///
/// A minus sign (ASCII or U+2212) in front of a number only counts as a range separator
/// when it directly follows an earlier number, optionally with a unit suffix such as
/// `5k-10k` or `$5,000 USD - $10,000 USD`. Any other signed number makes the whole text a
/// negative amount, which is `None`.
pub fn parse_amount(text: &str) -> Option<MonetaryAmount> {
    let trimmed = text.trim();
    let mut largest: Option<f64> = None;
    let mut previous_end: Option<usize> = None;

    for found in NUMBER_PATTERN.find_iter(trimmed) {
        if let Some(sign_at) = minus_sign_before(trimmed, found.start()) {
            let separates_range =
                previous_end.is_some_and(|end| is_range_gap(&trimmed[end..sign_at]));
            if !separates_range {
                return None;
            }
        }
        previous_end = Some(found.end());

        let Ok(value) = found.as_str().replace(',', "").parse::<f64>() else {
            continue;
        };
        if value.is_finite() {
            largest = Some(largest.map_or(value, |current| current.max(value)));
        }
    }

    largest.and_then(|value| MonetaryAmount::new(value).ok())
}

/// Byte offset of a minus sign written before the number starting at `start`, skipping
/// whitespace and a currency symbol.
fn minus_sign_before(text: &str, start: usize) -> Option<usize> {
    let prefix = text[..start].trim_end();
    let prefix = prefix
        .strip_suffix(|c: char| matches!(c, '$' | '€' | '£'))
        .unwrap_or(prefix)
        .trim_end();
    prefix
        .strip_suffix(|c: char| c == '-' || c == '\u{2212}')
        .map(str::len)
}

fn is_range_gap(gap: &str) -> bool {
    let gap = gap.trim();
    gap.chars().all(char::is_alphabetic)
}
