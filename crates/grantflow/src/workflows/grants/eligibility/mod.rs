//! Sequential yes/no eligibility questionnaire attached to each grant.
//!
//! [`evaluate_eligibility`] judges a complete or partial answer set in one call, while
//! [`EligibilityGate`] walks an applicant through the same criteria one answer at a time.
//! Both stop at the first "no": later criteria are never consulted once one fails.

mod gate;

pub use gate::{EligibilityGate, GateState};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordered statements an applicant must affirm. Order drives presentation only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EligibilityCriteria(Vec<String>);

impl EligibilityCriteria {
    /// Trims each statement and drops blank ones.
    pub fn new<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            statements
                .into_iter()
                .map(Into::into)
                .map(|statement| statement.trim().to_string())
                .filter(|statement| !statement.is_empty())
                .collect(),
        )
    }

    /// One statement per non-blank line.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<&str> {
        self.0.get(step).map(String::as_str)
    }

    pub fn into_statements(self) -> Vec<String> {
        self.0
    }
}

/// Answers keyed by criterion index. Serialized as a list where `null` marks an unanswered
/// criterion, e.g. `[true, false, null]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Option<bool>>", into = "Vec<Option<bool>>")]
pub struct EligibilityAnswers(BTreeMap<usize, bool>);

impl EligibilityAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: usize, answer: bool) {
        self.0.insert(step, answer);
    }

    pub fn get(&self, step: usize) -> Option<bool> {
        self.0.get(&step).copied()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Highest index that carries an answer.
    pub fn last_step(&self) -> Option<usize> {
        self.0.keys().next_back().copied()
    }
}

impl From<Vec<Option<bool>>> for EligibilityAnswers {
    fn from(sequence: Vec<Option<bool>>) -> Self {
        Self(
            sequence
                .into_iter()
                .enumerate()
                .filter_map(|(step, answer)| answer.map(|answer| (step, answer)))
                .collect(),
        )
    }
}

impl From<EligibilityAnswers> for Vec<Option<bool>> {
    fn from(answers: EligibilityAnswers) -> Self {
        let len = answers.last_step().map_or(0, |step| step + 1);
        (0..len).map(|step| answers.get(step)).collect()
    }
}

impl FromIterator<(usize, bool)> for EligibilityAnswers {
    fn from_iter<T: IntoIterator<Item = (usize, bool)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of judging an answer set against a criteria list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EligibilityResult {
    /// No "no" yet, but `next_step` still needs an answer.
    Undetermined { next_step: usize },
    Eligible,
    /// `failed_step` is the first criterion answered "no".
    Ineligible { failed_step: usize },
}

impl EligibilityResult {
    pub fn is_eligible(self) -> bool {
        matches!(self, EligibilityResult::Eligible)
    }
}

/// Caller errors: the questionnaire was driven outside its defined states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateViolation {
    #[error("step {step} is outside the {len} eligibility criteria")]
    StepOutOfRange { step: usize, len: usize },
    #[error("eligibility questionnaire already reached a final result")]
    Terminated,
    #[error("cannot move back from the first eligibility question")]
    AtFirstStep,
}

/// Judge `answers` against `criteria`, walking the criteria in order.
///
/// The first "no" yields `Ineligible` and nothing after it is inspected. The first
/// unanswered criterion before any "no" yields `Undetermined`. An empty criteria list is
/// vacuously `Eligible`. Answers indexed past the end of the list are a caller error.
pub fn evaluate_eligibility(
    criteria: &EligibilityCriteria,
    answers: &EligibilityAnswers,
) -> Result<EligibilityResult, GateViolation> {
    if let Some(step) = answers.last_step().filter(|step| *step >= criteria.len()) {
        return Err(GateViolation::StepOutOfRange {
            step,
            len: criteria.len(),
        });
    }

    for step in 0..criteria.len() {
        match answers.get(step) {
            Some(true) => continue,
            Some(false) => return Ok(EligibilityResult::Ineligible { failed_step: step }),
            None => return Ok(EligibilityResult::Undetermined { next_step: step }),
        }
    }

    Ok(EligibilityResult::Eligible)
}
