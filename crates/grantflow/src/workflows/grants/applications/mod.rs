//! Grant application intake, fee payment, and admin review.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantContact, ApplicationId, ApplicationStatus, ApplicationSubmission, PaymentStatus,
    ReviewRequest,
};
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatusView, NotificationError,
    RepositoryError, ReviewNotice, ReviewNotifier,
};
pub use router::application_router;
pub use service::{ApplicationServiceError, GrantApplicationService};
