use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::workflows::cases::access::{AccessControl, AccessSettings};
use crate::workflows::cases::analysis::{AnalysisConfig, RiskCategory, RiskEngine, RiskFinding};
use crate::workflows::cases::domain::{
    BusinessInfo, CaseComment, CaseId, CaseRecord, CustomerInfo, CustomerProfile, EmployeeInfo,
    FamilyInfo, Finances, PolicyPremium,
};
use crate::workflows::cases::intake::ProfileSubmission;
use crate::workflows::cases::repository::{
    CaseRepository, CommentNotice, CommentNotifier, NotifyError, PurgeScope, RepositoryError,
};
use crate::workflows::cases::{case_router, AdvisoryService, CaseStore};

pub(super) const ADMIN_PASSCODE: &str = "0229";
pub(super) const REVIEWER_CODE: &str = "1111";
pub(super) const OWNER_ID: &str = "E1001";

/// Salaried engineer who trips none of the rules.
///
/// Annual income 600,000; debt 1,000,000; liquid 300,000 of a 600,000
/// portfolio; premium 60,000.
pub(super) fn baseline_profile() -> CustomerProfile {
    CustomerProfile {
        employee: EmployeeInfo {
            id: OWNER_ID.to_string(),
            name: "Anong Srisuk".to_string(),
            region: "RH-North".to_string(),
            zone: "Z3".to_string(),
        },
        customer: CustomerInfo {
            name: "Kittipong Wong".to_string(),
            age: 35,
            occupation: "Software engineer".to_string(),
            monthly_income: 50_000.0,
        },
        family: FamilyInfo::default(),
        business: BusinessInfo::default(),
        finances: Finances {
            savings: 200_000.0,
            time_deposits: 100_000.0,
            funds: 300_000.0,
            home_loan: 1_000_000.0,
            car_loan: 0.0,
            personal_loan: 0.0,
        },
        policies: vec![PolicyPremium {
            name: "Total Premium".to_string(),
            premium: 60_000.0,
        }],
    }
}

pub(super) fn with_premium(mut profile: CustomerProfile, premium: f64) -> CustomerProfile {
    profile.policies = vec![PolicyPremium {
        name: "Total Premium".to_string(),
        premium,
    }];
    profile
}

/// Intake form equivalent of [`baseline_profile`], with form-style strings.
pub(super) fn baseline_submission() -> ProfileSubmission {
    submission_from_json(json!({
        "employee": { "id": OWNER_ID, "name": "Anong Srisuk", "region": "RH-North", "zone": "Z3" },
        "customer": {
            "name": "Kittipong Wong",
            "age": "35",
            "occupation": "Software engineer",
            "monthlyIncome": "50000"
        },
        "family": { "hasChildren": false, "childAges": "" },
        "business": { "ownershipSharePercent": "" },
        "finances": {
            "savings": 200000,
            "timeDeposits": "100000",
            "funds": 300000,
            "homeLoan": "1000000",
            "carLoan": "",
            "personalLoan": null
        },
        "totalAnnualPremium": "60000"
    }))
}

pub(super) fn submission_for(employee_id: &str, customer_name: &str) -> ProfileSubmission {
    let mut submission = baseline_submission();
    submission.employee.id = employee_id.to_string();
    submission.customer.name = customer_name.to_string();
    submission
}

/// Baseline submission that trips the excessive debt and child education rules.
pub(super) fn risky_submission() -> ProfileSubmission {
    let mut submission = baseline_submission();
    submission.finances.home_loan = Some(1_500_000.0);
    submission.finances.car_loan = Some(300_000.0);
    submission.finances.personal_loan = Some(100_000.0);
    submission.family.has_children = true;
    submission.family.child_ages = vec![5, 20];
    submission
}

pub(super) fn submission_from_json(value: Value) -> ProfileSubmission {
    serde_json::from_value(value).expect("submission json")
}

pub(super) fn categories(findings: &[RiskFinding]) -> Vec<RiskCategory> {
    findings.iter().map(|finding| finding.category).collect()
}

pub(super) fn engine() -> RiskEngine {
    RiskEngine::new(AnalysisConfig::default())
}

/// Stored case built directly, for store and report tests that pin `created_at`.
pub(super) fn record_at(
    id: &str,
    created_at: DateTime<Utc>,
    employee_name: &str,
    mut profile: CustomerProfile,
) -> CaseRecord {
    profile.employee.name = employee_name.to_string();
    let findings = engine().evaluate(&profile);
    CaseRecord {
        id: CaseId(id.to_string()),
        created_at,
        profile,
        findings,
        comments: Vec::new(),
    }
}

pub(super) fn utc(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub(super) fn comment(author: &str, text: &str) -> CaseComment {
    CaseComment {
        author: author.to_string(),
        text: text.to_string(),
        timestamp: Utc::now(),
    }
}

pub(super) fn build_service() -> (
    AdvisoryService<CaseStore, MemoryNotifier>,
    Arc<CaseStore>,
    Arc<MemoryNotifier>,
) {
    let store = Arc::new(CaseStore::new());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = AdvisoryService::new(
        store.clone(),
        notifier.clone(),
        AnalysisConfig::default(),
        AccessControl::new(AccessSettings::default()),
    );
    (service, store, notifier)
}

pub(super) fn case_router_with_service(
    service: AdvisoryService<CaseStore, MemoryNotifier>,
) -> axum::Router {
    case_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<CommentNotice>>>,
}

impl MemoryNotifier {
    pub(super) fn notices(&self) -> Vec<CommentNotice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl CommentNotifier for MemoryNotifier {
    fn notify(&self, notice: CommentNotice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl CommentNotifier for FailingNotifier {
    fn notify(&self, _notice: CommentNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("line gateway offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl CaseRepository for UnavailableRepository {
    fn append(
        &self,
        _profile: CustomerProfile,
        _findings: Vec<RiskFinding>,
    ) -> Result<CaseRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn find_by_id(&self, _id: &CaseId) -> Result<Option<CaseRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn append_comment(
        &self,
        _id: &CaseId,
        _comment: CaseComment,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn list(&self) -> Result<Vec<CaseRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }

    fn purge(&self, _scope: PurgeScope, _now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("storage offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

/// Scratch file under the system temp dir, removed before use.
pub(super) fn scratch_path(name: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
        "risk-advisor-{}-{name}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}
