mod format;

pub use format::{format_currency, format_whole_currency};

use serde::{Deserialize, Serialize};

use super::amount::{parse_amount, AmountInput, MonetaryAmount};

/// Share of the requested amount charged as the application fee.
pub const FEE_RATE: f64 = 0.005;
/// Fee charged when the amount is small, missing, or unusable.
pub const MINIMUM_FEE: u32 = 25;
/// Fee never exceeds this many currency units.
pub const MAXIMUM_FEE: u32 = 1000;

/// Rate and bounds for application fees. Every fee in the crate flows through one schedule.
///
/// Schedules are built from constants or [`FeeSchedule::new`], never deserialized, so the
/// bounds are always validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub rate: f64,
    pub minimum: u32,
    pub maximum: u32,
}

impl FeeSchedule {
    pub const STANDARD: Self = Self {
        rate: FEE_RATE,
        minimum: MINIMUM_FEE,
        maximum: MAXIMUM_FEE,
    };

    pub fn new(rate: f64, minimum: u32, maximum: u32) -> Result<Self, FeeScheduleError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(FeeScheduleError::InvalidRate(rate));
        }
        if minimum > maximum {
            return Err(FeeScheduleError::InvertedBounds { minimum, maximum });
        }

        Ok(Self {
            rate,
            minimum,
            maximum,
        })
    }

    /// Fee in whole currency units for a raw amount.
    ///
    /// `amount × rate` is rounded half away from zero and then clamped to
    /// `[minimum, maximum]`. Zero, negative, and non-finite amounts fall back to the minimum
    /// fee; this is the normal path for grants without a usable amount, not an error.
    pub fn fee(&self, amount: f64) -> u32 {
        if !amount.is_finite() || amount <= 0.0 {
            return self.minimum;
        }

        let raw = (amount * self.rate).round();
        if raw <= f64::from(self.minimum) {
            self.minimum
        } else if raw >= f64::from(self.maximum) {
            self.maximum
        } else {
            raw as u32
        }
    }

    /// Cents variant derived from [`FeeSchedule::fee`]; it never rounds on its own.
    pub fn fee_cents(&self, amount: f64) -> u64 {
        u64::from(self.fee(amount)) * 100
    }

    pub fn fee_for(&self, amount: Option<MonetaryAmount>) -> u32 {
        amount.map_or(self.minimum, |amount| self.fee(amount.value()))
    }

    /// Build a quote for an already resolved amount.
    pub fn quote(&self, basis: Option<MonetaryAmount>) -> FeeQuote {
        let fee = self.fee_for(basis);
        FeeQuote {
            basis,
            fee,
            fee_cents: u64::from(fee) * 100,
            fallback: basis.map_or(true, |amount| amount.value() <= 0.0),
            display: format_whole_currency(fee),
        }
    }

    pub fn quote_input(&self, input: Option<&AmountInput>) -> FeeQuote {
        self.quote(input.and_then(AmountInput::resolve))
    }

    pub fn quote_text(&self, text: &str) -> FeeQuote {
        self.quote(parse_amount(text))
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeeScheduleError {
    #[error("fee rate must be a positive finite number (found {0})")]
    InvalidRate(f64),
    #[error("minimum fee {minimum} exceeds maximum fee {maximum}")]
    InvertedBounds { minimum: u32, maximum: u32 },
}

/// Priced fee for a single amount, ready to show an applicant or charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// Amount the fee was computed from; `None` when nothing usable was supplied.
    pub basis: Option<MonetaryAmount>,
    pub fee: u32,
    pub fee_cents: u64,
    /// True when the minimum fee applied because no positive amount was available.
    pub fallback: bool,
    pub display: String,
}

/// Application fee in whole units under the standard schedule.
pub fn compute_fee(amount: f64) -> u32 {
    FeeSchedule::STANDARD.fee(amount)
}

/// Application fee in cents under the standard schedule; always `compute_fee(amount) * 100`.
pub fn compute_fee_cents(amount: f64) -> u64 {
    FeeSchedule::STANDARD.fee_cents(amount)
}

/// Parse free text and price it under the standard schedule.
pub fn fee_for_text(text: &str) -> u32 {
    FeeSchedule::STANDARD.fee_for(parse_amount(text))
}
