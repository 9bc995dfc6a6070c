use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::access::{AccessControl, AccessSettingsError};
use super::analysis::{AnalysisConfig, AnalysisReport, RiskEngine};
use super::domain::{CaseComment, CaseId, CaseRecord, CustomerProfile};
use super::intake::{profile_from_submission, IntakeError, ProfileSubmission};
use super::report::{export_csv, CaseDashboard, ReportError};
use super::repository::{
    CaseRepository, CommentNotice, CommentNotifier, PurgeScope, RepositoryError,
};

/// Service composing intake, the risk engine, the case store, and access control.
pub struct AdvisoryService<R, N> {
    engine: Arc<RiskEngine>,
    repository: Arc<R>,
    notifier: Arc<N>,
    access: RwLock<AccessControl>,
    access_file: Option<PathBuf>,
}

impl<R, N> AdvisoryService<R, N>
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifier: Arc<N>,
        config: AnalysisConfig,
        access: AccessControl,
    ) -> Self {
        Self {
            engine: Arc::new(RiskEngine::new(config)),
            repository,
            notifier,
            access: RwLock::new(access),
            access_file: None,
        }
    }

    /// Persist access settings to `path` whenever the reviewer code changes.
    pub fn with_access_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.access_file = Some(path.into());
        self
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    fn access(&self) -> RwLockReadGuard<'_, AccessControl> {
        self.access.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn require_admin(&self, passcode: &str) -> Result<(), AdvisoryServiceError> {
        if self.access().is_admin(passcode) {
            Ok(())
        } else {
            warn!("admin operation rejected: wrong passcode");
            Err(AdvisoryServiceError::AdminRequired)
        }
    }

    /// Evaluate a profile without storing it.
    pub fn analyze(&self, profile: &CustomerProfile) -> AnalysisReport {
        self.engine.analyze(profile)
    }

    pub fn analyze_submission(
        &self,
        submission: ProfileSubmission,
    ) -> Result<AnalysisReport, AdvisoryServiceError> {
        let profile = profile_from_submission(submission)?;
        Ok(self.analyze(&profile))
    }

    /// Validate, evaluate, and store a new case.
    pub fn submit(
        &self,
        submission: ProfileSubmission,
    ) -> Result<CaseRecord, AdvisoryServiceError> {
        let profile = profile_from_submission(submission)?;
        let findings = self.engine.evaluate(&profile);
        let record = self.repository.append(profile, findings)?;

        info!(
            case_id = %record.id,
            employee_id = %record.owner_id(),
            findings = record.findings.len(),
            "case stored"
        );
        Ok(record)
    }

    /// Fetch a case without an access check.
    pub fn get(&self, id: &CaseId) -> Result<CaseRecord, AdvisoryServiceError> {
        let record = self
            .repository
            .find_by_id(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Fetch a case on behalf of `requester_id`, enforcing visibility.
    pub fn view(
        &self,
        id: &CaseId,
        requester_id: &str,
    ) -> Result<CaseRecord, AdvisoryServiceError> {
        let record = self.get(id)?;
        if !self.access().can_view(&record, requester_id.trim()) {
            return Err(AdvisoryServiceError::Forbidden { case_id: id.clone() });
        }
        Ok(record)
    }

    /// Cases whose customer name or employee id contains `query`
    /// (case-insensitive) and that `requester_id` may view. An empty query
    /// matches every visible case.
    pub fn search(
        &self,
        query: &str,
        requester_id: &str,
    ) -> Result<Vec<CaseRecord>, AdvisoryServiceError> {
        let query = query.trim().to_lowercase();
        let requester_id = requester_id.trim();
        let access = self.access();

        let matches = self
            .repository
            .list()?
            .into_iter()
            .filter(|record| {
                query.is_empty()
                    || record.profile.customer.name.to_lowercase().contains(&query)
                    || record.profile.employee.id.to_lowercase().contains(&query)
            })
            .filter(|record| access.can_view(record, requester_id))
            .collect();
        Ok(matches)
    }

    /// Append reviewer guidance. Returns `Ok(false)` when the case is unknown.
    pub fn add_comment(
        &self,
        id: &CaseId,
        author: &str,
        text: &str,
    ) -> Result<bool, AdvisoryServiceError> {
        let author = author.trim();
        let text = text.trim();
        if author.is_empty() {
            return Err(AdvisoryServiceError::InvalidComment("author is required"));
        }
        if text.is_empty() {
            return Err(AdvisoryServiceError::InvalidComment("comment text is required"));
        }

        let comment = CaseComment {
            author: author.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        };
        if !self.repository.append_comment(id, comment)? {
            return Ok(false);
        }

        if let Some(record) = self.repository.find_by_id(id)? {
            let notice = CommentNotice {
                case_id: record.id.clone(),
                employee_id: record.profile.employee.id.clone(),
                employee_name: record.profile.employee.name.clone(),
                customer_name: record.profile.customer.name.clone(),
                author: author.to_string(),
            };
            if let Err(err) = self.notifier.notify(notice) {
                warn!(case_id = %id, error = %err, "comment stored but owner notification failed");
            }
        }

        Ok(true)
    }

    pub fn dashboard(&self, passcode: &str) -> Result<CaseDashboard, AdvisoryServiceError> {
        self.require_admin(passcode)?;
        let cases = self.repository.list()?;
        Ok(CaseDashboard::from_cases(&cases))
    }

    pub fn export_csv(&self, passcode: &str) -> Result<String, AdvisoryServiceError> {
        self.require_admin(passcode)?;
        let cases = self.repository.list()?;
        Ok(export_csv(&cases)?)
    }

    pub fn purge(
        &self,
        passcode: &str,
        scope: PurgeScope,
        now: DateTime<Utc>,
    ) -> Result<usize, AdvisoryServiceError> {
        self.require_admin(passcode)?;
        let removed = self.repository.purge(scope, now)?;
        info!(scope = scope.label(), removed, "cases purged");
        Ok(removed)
    }

    /// Replace the reviewer code. Returns `Ok(false)` and keeps the previous
    /// code when `code` is not exactly 4 digits.
    pub fn update_reviewer_code(
        &self,
        passcode: &str,
        code: &str,
    ) -> Result<bool, AdvisoryServiceError> {
        self.require_admin(passcode)?;

        let mut access = self.access.write().unwrap_or_else(PoisonError::into_inner);
        if !access.update_reviewer_code(code.trim()) {
            return Ok(false);
        }

        if let Some(path) = &self.access_file {
            access.settings().save(path)?;
        }
        info!("reviewer code updated");
        Ok(true)
    }
}

/// Error raised by the advisory service.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    AccessSettings(#[from] AccessSettingsError),
    #[error("requester may not view case {case_id}")]
    Forbidden { case_id: CaseId },
    #[error("admin passcode required")]
    AdminRequired,
    #[error("invalid comment: {0}")]
    InvalidComment(&'static str),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
