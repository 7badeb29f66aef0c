use grantflow::workflows::grants::applications::{
    ApplicationId, ApplicationRecord, ApplicationRepository, ApplicationStatus,
    NotificationError, RepositoryError, ReviewNotice, ReviewNotifier,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
        let mut records: Vec<ApplicationRecord> = guard
            .values()
            .filter(|record| record.status == status)
            .cloned()
            .collect();
        records.sort_by(|left, right| left.submitted_at.cmp(&right.submitted_at));
        records.truncate(limit);
        Ok(records)
    }
}

/// Writes review decisions to the log until an e-mail transport is wired in.
#[derive(Default, Clone, Copy)]
pub(crate) struct TracingReviewNotifier;

impl ReviewNotifier for TracingReviewNotifier {
    fn publish(&self, notice: ReviewNotice) -> Result<(), NotificationError> {
        info!(
            application_id = %notice.application_id.0,
            template = %notice.template,
            details = ?notice.details,
            "review notice published"
        );
        Ok(())
    }
}
