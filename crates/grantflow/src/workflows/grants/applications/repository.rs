use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::amount::MonetaryAmount;
use super::super::catalog::GrantId;
use super::super::fees::FeeQuote;
use super::domain::{ApplicantContact, ApplicationId, ApplicationStatus, PaymentStatus};

/// Stored application with its fee quote, payment, and review state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub grant_id: GrantId,
    pub grant_title: String,
    pub applicant: ApplicantContact,
    pub requested_amount: Option<MonetaryAmount>,
    pub project_summary: String,
    pub fee: FeeQuote,
    pub status: ApplicationStatus,
    pub payment: PaymentStatus,
    pub review_note: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            grant_id: self.grant_id.clone(),
            grant_title: self.grant_title.clone(),
            status: self.status.label(),
            payment: self.payment.label(),
            fee: self.fee.fee,
            fee_cents: self.fee.fee_cents,
            fee_display: self.fee.display.clone(),
            review_note: self.review_note.clone(),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn by_status(
        &self,
        status: ApplicationStatus,
        limit: usize,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for review decisions (e-mail, dashboard feed).
pub trait ReviewNotifier: Send + Sync {
    fn publish(&self, notice: ReviewNotice) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewNotice {
    pub template: String,
    pub application_id: ApplicationId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Applicant-facing view of an application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub grant_id: GrantId,
    pub grant_title: String,
    pub status: &'static str,
    pub payment: &'static str,
    pub fee: u32,
    pub fee_cents: u64,
    pub fee_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_note: Option<String>,
}
