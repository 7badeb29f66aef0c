use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::amount::AmountInput;
use super::super::catalog::GrantId;
use super::super::eligibility::EligibilityAnswers;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Contact details for the person or organization applying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantContact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub organization: Option<String>,
}

/// Payload posted by the application form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub grant_id: GrantId,
    pub applicant: ApplicantContact,
    /// Requested funding; the grant's advertised amount is used when absent or unusable.
    #[serde(default)]
    pub requested_amount: Option<AmountInput>,
    pub project_summary: String,
    pub answers: EligibilityAnswers,
}

/// Review lifecycle of an application record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Rejected)
    }

    /// Pending moves to under review, which resolves to approved or rejected.
    pub const fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Pending, ApplicationStatus::UnderReview)
                | (ApplicationStatus::UnderReview, ApplicationStatus::Approved)
                | (ApplicationStatus::UnderReview, ApplicationStatus::Rejected)
        )
    }
}

/// Whether the application fee has been collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid {
        amount_cents: u64,
        paid_at: DateTime<Utc>,
    },
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid { .. } => "paid",
        }
    }
}

/// Admin review request for a single application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;

    #[test]
    fn transitions_follow_the_review_path() {
        assert!(Pending.can_transition_to(UnderReview));
        assert!(UnderReview.can_transition_to(Approved));
        assert!(UnderReview.can_transition_to(Rejected));

        assert!(!Pending.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(UnderReview));
        assert!(!UnderReview.can_transition_to(Pending));
    }

    #[test]
    fn only_decisions_are_terminal() {
        assert!(Approved.is_terminal());
        assert!(Rejected.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!UnderReview.is_terminal());
    }
}
