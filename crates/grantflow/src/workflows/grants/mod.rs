pub mod amount;
pub mod applications;
pub mod catalog;
pub mod eligibility;
pub mod fees;

pub use amount::{parse_amount, AmountError, AmountInput, MonetaryAmount};
pub use catalog::{CatalogError, Grant, GrantCatalog, GrantFilter, GrantId, GrantSummaryView};
pub use eligibility::{
    evaluate_eligibility, EligibilityAnswers, EligibilityCriteria, EligibilityGate,
    EligibilityResult, GateState, GateViolation,
};
pub use fees::{
    compute_fee, compute_fee_cents, fee_for_text, format_currency, FeeQuote, FeeSchedule,
    FeeScheduleError,
};
