//! Customer case workflow: intake, rule-based risk analysis, case storage,
//! access control, and admin reporting.

pub mod access;
pub mod analysis;
pub mod domain;
pub mod intake;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use access::{AccessControl, AccessSettings, AccessSettingsError};
pub use analysis::{
    AnalysisConfig, AnalysisReport, FinancialAggregates, OwnershipKeywords, RiskCategory,
    RiskEngine, RiskFinding, Severity,
};
pub use domain::{
    BusinessInfo, CaseComment, CaseId, CaseRecord, CaseSummaryView, CustomerInfo,
    CustomerProfile, EmployeeInfo, FamilyInfo, Finances, PolicyPremium,
};
pub use intake::{profile_from_submission, IntakeError, ProfileSubmission};
pub use report::{CaseDashboard, ReportError};
pub use repository::{
    CaseRepository, CommentNotice, CommentNotifier, NotifyError, PurgeScope, RepositoryError,
};
pub use router::{case_router, ADMIN_PASSCODE_HEADER};
pub use service::{AdvisoryService, AdvisoryServiceError};
pub use store::CaseStore;
