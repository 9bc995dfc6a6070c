use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::RiskFinding;
use super::domain::{CaseComment, CaseId, CaseRecord, CustomerProfile};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations keep cases newest first and own id and timestamp generation.
pub trait CaseRepository: Send + Sync {
    fn append(
        &self,
        profile: CustomerProfile,
        findings: Vec<RiskFinding>,
    ) -> Result<CaseRecord, RepositoryError>;
    fn find_by_id(&self, id: &CaseId) -> Result<Option<CaseRecord>, RepositoryError>;
    /// Returns `false` when no case carries `id`.
    fn append_comment(&self, id: &CaseId, comment: CaseComment) -> Result<bool, RepositoryError>;
    fn list(&self) -> Result<Vec<CaseRecord>, RepositoryError>;
    /// Removes the cases selected by `scope`, returning how many were dropped.
    fn purge(&self, scope: PurgeScope, now: DateTime<Utc>) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Which cases an admin purge removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgeScope {
    All,
    /// Keep only cases created in the current calendar month.
    BeforeCurrentMonth,
}

impl PurgeScope {
    pub fn removes(self, record: &CaseRecord, now: DateTime<Utc>) -> bool {
        match self {
            PurgeScope::All => true,
            PurgeScope::BeforeCurrentMonth => {
                record.created_at.year() != now.year() || record.created_at.month() != now.month()
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PurgeScope::All => "all cases",
            PurgeScope::BeforeCurrentMonth => "cases older than the current month",
        }
    }
}

/// Outbound hook telling a case owner that a reviewer left guidance.
pub trait CommentNotifier: Send + Sync {
    fn notify(&self, notice: CommentNotice) -> Result<(), NotifyError>;
}

/// Notification payload so adapters and tests can assert the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNotice {
    pub case_id: CaseId,
    pub employee_id: String,
    pub employee_name: String,
    pub customer_name: String,
    pub author: String,
}

impl CommentNotice {
    pub fn message(&self) -> String {
        format!(
            "reviewer {} left guidance on the case for customer {} (employee: {})",
            self.author, self.customer_name, self.employee_name
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
