use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::{json, Value};

use crate::workflows::grants::amount::AmountInput;
use crate::workflows::grants::applications::domain::{
    ApplicantContact, ApplicationId, ApplicationStatus, ApplicationSubmission,
};
use crate::workflows::grants::applications::repository::{
    ApplicationRecord, ApplicationRepository, NotificationError, RepositoryError, ReviewNotice,
    ReviewNotifier,
};
use crate::workflows::grants::applications::{application_router, GrantApplicationService};
use crate::workflows::grants::catalog::{GrantCatalog, GrantId};
use crate::workflows::grants::eligibility::EligibilityAnswers;
use crate::workflows::grants::fees::FeeSchedule;

pub(super) fn catalog() -> GrantCatalog {
    let seed = json!([
        {
            "$id": "arts-2025",
            "title": "Community Arts Fund",
            "organization": "Metro Arts Council",
            "amount": "$50,000 - $100,000",
            "deadline": "2025-11-30",
            "category": "Arts",
            "eligibility": [
                "Registered 501(c)(3) nonprofit",
                "Serves the Twin Cities metro",
                "Annual budget under $2M"
            ]
        },
        {
            "$id": "open-call",
            "title": "Open Call Microgrants",
            "organization": "Neighborhood Fund",
            "amount": "Varies"
        }
    ]);
    GrantCatalog::from_reader(seed.to_string().as_bytes()).expect("seed loads")
}

pub(super) fn arts_grant_id() -> GrantId {
    GrantId("arts-2025".to_string())
}

pub(super) fn all_yes() -> EligibilityAnswers {
    EligibilityAnswers::from(vec![Some(true), Some(true), Some(true)])
}

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        grant_id: arts_grant_id(),
        applicant: ApplicantContact {
            name: "Dana Ortiz".to_string(),
            email: "dana@riverside-arts.org".to_string(),
            organization: Some("Riverside Arts Collective".to_string()),
        },
        requested_amount: Some(AmountInput::Number(60_000.0)),
        project_summary: "Mural program for three neighborhood parks".to_string(),
        answers: all_yes(),
    }
}

pub(super) fn ineligible_submission() -> ApplicationSubmission {
    let mut submission = submission();
    submission.answers = EligibilityAnswers::from(vec![Some(true), Some(false), None]);
    submission
}

pub(super) fn build_service() -> (
    GrantApplicationService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = GrantApplicationService::new(
        Arc::new(catalog()),
        repository.clone(),
        notifier.clone(),
        FeeSchedule::STANDARD,
    );
    (service, repository, notifier)
}

pub(super) fn service_with_repository<R>(repository: R) -> GrantApplicationService<R, MemoryNotifier>
where
    R: ApplicationRepository + 'static,
{
    GrantApplicationService::new(
        Arc::new(catalog()),
        Arc::new(repository),
        Arc::new(MemoryNotifier::default()),
        FeeSchedule::STANDARD,
    )
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn by_status(
        &self,
        status: ApplicationStatus,
        limit: usize,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == status)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<ReviewNotice>>>,
}

impl MemoryNotifier {
    pub(super) fn notices(&self) -> Vec<ReviewNotice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl ReviewNotifier for MemoryNotifier {
    fn publish(&self, notice: ReviewNotice) -> Result<(), NotificationError> {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl ReviewNotifier for OfflineNotifier {
    fn publish(&self, _notice: ReviewNotice) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("mail relay offline".to_string()))
    }
}

pub(super) fn service_with_offline_notifier(
) -> (GrantApplicationService<MemoryRepository, OfflineNotifier>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = GrantApplicationService::new(
        Arc::new(catalog()),
        repository.clone(),
        Arc::new(OfflineNotifier),
        FeeSchedule::STANDARD,
    );
    (service, repository)
}

pub(super) struct ConflictRepository;

impl ApplicationRepository for ConflictRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }

    fn by_status(
        &self,
        _status: ApplicationStatus,
        _limit: usize,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: ApplicationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_status(
        &self,
        _status: ApplicationStatus,
        _limit: usize,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn application_router_with_service(
    service: GrantApplicationService<MemoryRepository, MemoryNotifier>,
) -> axum::Router {
    application_router(Arc::new(service))
}
