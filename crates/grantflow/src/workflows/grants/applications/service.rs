use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::super::amount::AmountInput;
use super::super::catalog::{GrantCatalog, GrantId};
use super::super::eligibility::{evaluate_eligibility, EligibilityResult, GateViolation};
use super::super::fees::FeeSchedule;
use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, PaymentStatus, ReviewRequest,
};
use super::repository::{
    ApplicationRecord, ApplicationRepository, RepositoryError, ReviewNotice, ReviewNotifier,
};

/// Service composing the grant catalog, fee schedule, repository, and review notifications.
pub struct GrantApplicationService<R, N> {
    catalog: Arc<GrantCatalog>,
    repository: Arc<R>,
    notifier: Arc<N>,
    fees: FeeSchedule,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<R, N> GrantApplicationService<R, N>
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    pub fn new(
        catalog: Arc<GrantCatalog>,
        repository: Arc<R>,
        notifier: Arc<N>,
        fees: FeeSchedule,
    ) -> Self {
        Self {
            catalog,
            repository,
            notifier,
            fees,
        }
    }

    pub fn catalog(&self) -> &GrantCatalog {
        &self.catalog
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Submit an application for a grant the applicant has fully qualified for.
    ///
    /// The fee is priced from the requested amount, falling back to the grant's advertised
    /// amount and then to the minimum fee.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let ApplicationSubmission {
            grant_id,
            applicant,
            requested_amount,
            project_summary,
            answers,
        } = submission;

        if applicant.name.trim().is_empty() {
            return Err(ApplicationServiceError::IncompleteSubmission("applicant.name"));
        }
        if !applicant.email.contains('@') {
            return Err(ApplicationServiceError::IncompleteSubmission("applicant.email"));
        }
        if project_summary.trim().is_empty() {
            return Err(ApplicationServiceError::IncompleteSubmission("project_summary"));
        }

        let grant = self
            .catalog
            .get(&grant_id)
            .ok_or_else(|| ApplicationServiceError::UnknownGrant(grant_id.clone()))?;

        match evaluate_eligibility(&grant.eligibility, &answers)? {
            EligibilityResult::Eligible => {}
            EligibilityResult::Ineligible { failed_step } => {
                let criterion = grant
                    .eligibility
                    .get(failed_step)
                    .unwrap_or_default()
                    .to_string();
                return Err(ApplicationServiceError::NotEligible {
                    failed_step,
                    criterion,
                });
            }
            EligibilityResult::Undetermined { next_step } => {
                return Err(ApplicationServiceError::EligibilityIncomplete { next_step });
            }
        }

        let requested = requested_amount.as_ref().and_then(AmountInput::resolve);
        let fee = self.fees.quote(requested.or_else(|| grant.advertised_amount()));

        let record = ApplicationRecord {
            id: next_application_id(),
            grant_id: grant.id.clone(),
            grant_title: grant.title.clone(),
            applicant,
            requested_amount: requested,
            project_summary: project_summary.trim().to_string(),
            fee,
            status: ApplicationStatus::Pending,
            payment: PaymentStatus::Unpaid,
            review_note: None,
            submitted_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            application_id = %stored.id.0,
            grant_id = %stored.grant_id.0,
            fee = stored.fee.fee,
            fallback_fee = stored.fee.fallback,
            "grant application submitted"
        );
        Ok(stored)
    }

    /// Record the applicant's fee payment. The amount must match the quote to the cent.
    pub fn record_payment(
        &self,
        application_id: &ApplicationId,
        amount_cents: u64,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.get(application_id)?;

        if record.payment.is_paid() {
            return Err(ApplicationServiceError::AlreadyPaid);
        }
        if amount_cents != record.fee.fee_cents {
            warn!(
                application_id = %record.id.0,
                expected = record.fee.fee_cents,
                received = amount_cents,
                "application fee payment rejected"
            );
            return Err(ApplicationServiceError::PaymentMismatch {
                expected_cents: record.fee.fee_cents,
                received_cents: amount_cents,
            });
        }

        record.payment = PaymentStatus::Paid {
            amount_cents,
            paid_at: Utc::now(),
        };
        self.repository.update(record.clone())?;

        info!(application_id = %record.id.0, amount_cents, "application fee paid");
        Ok(record)
    }

    /// Move an application along the review path and notify on final decisions.
    pub fn review(
        &self,
        application_id: &ApplicationId,
        request: ReviewRequest,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.get(application_id)?;
        let ReviewRequest { status, note } = request;

        if !record.payment.is_paid() {
            return Err(ApplicationServiceError::PaymentRequired);
        }
        if !record.status.can_transition_to(status) {
            return Err(ApplicationServiceError::InvalidTransition {
                from: record.status.label(),
                to: status.label(),
            });
        }

        let previous = record.status;
        record.status = status;
        if let Some(note) = note.map(|note| note.trim().to_string()) {
            if !note.is_empty() {
                record.review_note = Some(note);
            }
        }
        self.repository.update(record.clone())?;

        info!(
            application_id = %record.id.0,
            from = previous.label(),
            to = status.label(),
            "application review status changed"
        );

        if status.is_terminal() {
            let mut details = BTreeMap::new();
            details.insert("grant_title".to_string(), record.grant_title.clone());
            details.insert("decision".to_string(), status.label().to_string());
            if let Some(note) = &record.review_note {
                details.insert("note".to_string(), note.clone());
            }
            let notice = ReviewNotice {
                template: format!("application_{}", status.label()),
                application_id: record.id.clone(),
                details,
            };
            // Delivery failures are logged; the stored decision stands.
            if let Err(error) = self.notifier.publish(notice) {
                warn!(
                    application_id = %record.id.0,
                    decision = status.label(),
                    error = %error,
                    "review notice not delivered"
                );
            }
        }

        Ok(record)
    }

    /// Fetch an application and current status for API responses.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Applications currently in `status`, for the admin dashboard.
    pub fn applications_by_status(
        &self,
        status: ApplicationStatus,
        limit: usize,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        Ok(self.repository.by_status(status, limit)?)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("submission is missing `{0}`")]
    IncompleteSubmission(&'static str),
    #[error("grant `{0}` does not exist")]
    UnknownGrant(GrantId),
    #[error("applicant is not eligible: criterion {failed_step} ({criterion}) was answered no")]
    NotEligible {
        failed_step: usize,
        criterion: String,
    },
    #[error("eligibility questionnaire incomplete: criterion {next_step} is unanswered")]
    EligibilityIncomplete { next_step: usize },
    #[error(transparent)]
    Gate(#[from] GateViolation),
    #[error("application fee already paid")]
    AlreadyPaid,
    #[error("payment of {received_cents} cents does not match the {expected_cents} cent fee")]
    PaymentMismatch {
        expected_cents: u64,
        received_cents: u64,
    },
    #[error("application fee must be paid before review")]
    PaymentRequired,
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
