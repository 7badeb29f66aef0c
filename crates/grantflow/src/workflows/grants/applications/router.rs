use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::super::amount::AmountInput;
use super::super::catalog::{GrantFilter, GrantId, GrantSummaryView};
use super::super::eligibility::{
    evaluate_eligibility, EligibilityAnswers, EligibilityCriteria, EligibilityResult,
};
use super::super::fees::FeeQuote;
use super::domain::{ApplicationId, ApplicationStatus, ApplicationSubmission, ReviewRequest};
use super::repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatusView, RepositoryError,
    ReviewNotifier,
};
use super::service::{ApplicationServiceError, GrantApplicationService};

/// Router builder for grant browsing, fee quotes, eligibility checks, and application intake
/// and review.
pub fn application_router<R, N>(service: Arc<GrantApplicationService<R, N>>) -> Router
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    Router::new()
        .route("/api/v1/grants", get(list_grants_handler::<R, N>))
        .route("/api/v1/grants/:grant_id", get(grant_handler::<R, N>))
        .route("/api/v1/fees/quote", post(fee_quote_handler::<R, N>))
        .route(
            "/api/v1/eligibility/evaluate",
            post(eligibility_handler::<R, N>),
        )
        .route(
            "/api/v1/applications",
            get(list_applications_handler::<R, N>).post(submit_handler::<R, N>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/payment",
            post(payment_handler::<R, N>),
        )
        .route(
            "/api/v1/applications/:application_id/review",
            post(review_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeeQuoteRequest {
    #[serde(default)]
    pub(crate) amount: Option<AmountInput>,
}

/// Either inline criteria or a catalog grant supplies the questionnaire.
#[derive(Debug, Deserialize)]
pub(crate) struct EligibilityRequest {
    #[serde(default)]
    pub(crate) grant_id: Option<GrantId>,
    #[serde(default)]
    pub(crate) criteria: Option<EligibilityCriteria>,
    #[serde(default)]
    pub(crate) answers: EligibilityAnswers,
}

#[derive(Debug, Serialize)]
pub(crate) struct EligibilityResponse {
    pub(crate) result: EligibilityResult,
    pub(crate) total_criteria: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) criterion: Option<String>,
}

/// Admin dashboard listing; defaults to applications awaiting a decision.
#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationListQuery {
    #[serde(default = "default_list_status")]
    pub(crate) status: ApplicationStatus,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 200;

fn default_list_status() -> ApplicationStatus {
    ApplicationStatus::UnderReview
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentRequest {
    pub(crate) amount_cents: u64,
}

pub(crate) async fn list_grants_handler<R, N>(
    State(service): State<Arc<GrantApplicationService<R, N>>>,
    Query(filter): Query<GrantFilter>,
) -> axum::Json<Vec<GrantSummaryView>>
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    let summaries = service
        .catalog()
        .filter(&filter)
        .into_iter()
        .map(|grant| grant.summary(service.fees()))
        .collect();
    axum::Json(summaries)
}

pub(crate) async fn grant_handler<R, N>(
    State(service): State<Arc<GrantApplicationService<R, N>>>,
    Path(grant_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    let id = GrantId(grant_id);
    match service.catalog().get(&id) {
        Some(grant) => {
            let payload = json!({
                "grant": grant,
                "summary": grant.summary(service.fees()),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        None => error_response(ApplicationServiceError::UnknownGrant(id)),
    }
}

pub(crate) async fn fee_quote_handler<R, N>(
    State(service): State<Arc<GrantApplicationService<R, N>>>,
    axum::Json(request): axum::Json<FeeQuoteRequest>,
) -> axum::Json<FeeQuote>
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    axum::Json(service.fees().quote_input(request.amount.as_ref()))
}

pub(crate) async fn eligibility_handler<R, N>(
    State(service): State<Arc<GrantApplicationService<R, N>>>,
    axum::Json(request): axum::Json<EligibilityRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    let EligibilityRequest {
        grant_id,
        criteria,
        answers,
    } = request;

    let criteria = match (grant_id, criteria) {
        (Some(id), _) => match service.catalog().get(&id) {
            Some(grant) => grant.eligibility.clone(),
            None => return error_response(ApplicationServiceError::UnknownGrant(id)),
        },
        (None, Some(criteria)) => criteria,
        (None, None) => {
            let payload = json!({ "error": "provide either grant_id or criteria" });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match evaluate_eligibility(&criteria, &answers) {
        Ok(result) => {
            let step = match result {
                EligibilityResult::Undetermined { next_step } => Some(next_step),
                EligibilityResult::Ineligible { failed_step } => Some(failed_step),
                EligibilityResult::Eligible => None,
            };
            let response = EligibilityResponse {
                result,
                total_criteria: criteria.len(),
                criterion: step.and_then(|step| criteria.get(step)).map(str::to_string),
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(violation) => error_response(violation.into()),
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<GrantApplicationService<R, N>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_applications_handler<R, N>(
    State(service): State<Arc<GrantApplicationService<R, N>>>,
    Query(query): Query<ApplicationListQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    match service.applications_by_status(query.status, limit) {
        Ok(records) => {
            let views: Vec<ApplicationStatusView> =
                records.iter().map(ApplicationRecord::status_view).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<GrantApplicationService<R, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn payment_handler<R, N>(
    State(service): State<Arc<GrantApplicationService<R, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<PaymentRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    match service.record_payment(&ApplicationId(application_id), request.amount_cents) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R, N>(
    State(service): State<Arc<GrantApplicationService<R, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: ReviewNotifier + 'static,
{
    match service.review(&ApplicationId(application_id), request) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ApplicationServiceError) -> Response {
    let status = match &error {
        ApplicationServiceError::UnknownGrant(_)
        | ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::IncompleteSubmission(_)
        | ApplicationServiceError::NotEligible { .. }
        | ApplicationServiceError::EligibilityIncomplete { .. }
        | ApplicationServiceError::Gate(_)
        | ApplicationServiceError::PaymentMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationServiceError::AlreadyPaid
        | ApplicationServiceError::PaymentRequired
        | ApplicationServiceError::InvalidTransition { .. }
        | ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
