use super::{EligibilityAnswers, EligibilityCriteria, EligibilityResult, GateViolation};

/// Position of a questionnaire session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    AwaitingAnswer { step: usize },
    Eligible,
    Ineligible { failed_step: usize },
}

impl GateState {
    fn initial(criteria: &EligibilityCriteria) -> Self {
        if criteria.is_empty() {
            GateState::Eligible
        } else {
            GateState::AwaitingAnswer { step: 0 }
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, GateState::AwaitingAnswer { .. })
    }
}

impl From<GateState> for EligibilityResult {
    fn from(state: GateState) -> Self {
        match state {
            GateState::AwaitingAnswer { step } => EligibilityResult::Undetermined { next_step: step },
            GateState::Eligible => EligibilityResult::Eligible,
            GateState::Ineligible { failed_step } => EligibilityResult::Ineligible { failed_step },
        }
    }
}

/// Single-applicant questionnaire session over one grant's criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityGate {
    criteria: EligibilityCriteria,
    answers: EligibilityAnswers,
    state: GateState,
}

impl EligibilityGate {
    pub fn new(criteria: EligibilityCriteria) -> Self {
        let state = GateState::initial(&criteria);
        Self {
            criteria,
            answers: EligibilityAnswers::new(),
            state,
        }
    }

    /// Reopen the questionnaire, possibly for another grant. Prior answers are discarded.
    pub fn reset(&mut self, criteria: EligibilityCriteria) {
        self.state = GateState::initial(&criteria);
        self.criteria = criteria;
        self.answers.clear();
    }

    /// Reopen the questionnaire for the same criteria.
    pub fn restart(&mut self) {
        self.state = GateState::initial(&self.criteria);
        self.answers.clear();
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn result(&self) -> EligibilityResult {
        self.state.into()
    }

    pub fn criteria(&self) -> &EligibilityCriteria {
        &self.criteria
    }

    pub fn answers(&self) -> &EligibilityAnswers {
        &self.answers
    }

    /// Statement awaiting an answer, if the session is still open.
    pub fn current_criterion(&self) -> Option<&str> {
        match self.state {
            GateState::AwaitingAnswer { step } => self.criteria.get(step),
            _ => None,
        }
    }

    /// Record an answer for the current step and advance.
    pub fn answer(&mut self, answer: bool) -> Result<GateState, GateViolation> {
        let GateState::AwaitingAnswer { step } = self.state else {
            return Err(GateViolation::Terminated);
        };
        self.ensure_in_range(step)?;

        self.answers.record(step, answer);
        self.state = if !answer {
            GateState::Ineligible { failed_step: step }
        } else if step + 1 < self.criteria.len() {
            GateState::AwaitingAnswer { step: step + 1 }
        } else {
            GateState::Eligible
        };

        Ok(self.state)
    }

    /// Step back to the previous question. Recorded answers stay in place so the applicant
    /// sees them again; terminal results cannot be reopened this way.
    pub fn back(&mut self) -> Result<GateState, GateViolation> {
        let GateState::AwaitingAnswer { step } = self.state else {
            return Err(GateViolation::Terminated);
        };
        if step == 0 {
            return Err(GateViolation::AtFirstStep);
        }

        self.state = GateState::AwaitingAnswer { step: step - 1 };
        Ok(self.state)
    }

    fn ensure_in_range(&self, step: usize) -> Result<(), GateViolation> {
        if step < self.criteria.len() {
            Ok(())
        } else {
            Err(GateViolation::StepOutOfRange {
                step,
                len: self.criteria.len(),
            })
        }
    }
}
