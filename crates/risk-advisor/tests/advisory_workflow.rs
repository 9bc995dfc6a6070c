//! End-to-end scenarios for the case workflow, driven through the public
//! service facade and HTTP router with a snapshot-backed store.

mod common {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use risk_advisor::workflows::cases::{
        AccessControl, AccessSettings, AdvisoryService, AnalysisConfig, CaseStore, CommentNotice,
        CommentNotifier, NotifyError, ProfileSubmission,
    };

    pub(super) const ADMIN_PASSCODE: &str = "0229";
    pub(super) const REVIEWER_CODE: &str = "1111";

    #[derive(Default, Clone)]
    pub(super) struct RecordingNotifier {
        notices: Arc<Mutex<Vec<CommentNotice>>>,
    }

    impl RecordingNotifier {
        pub(super) fn notices(&self) -> Vec<CommentNotice> {
            self.notices.lock().expect("notifier mutex poisoned").clone()
        }
    }

    impl CommentNotifier for RecordingNotifier {
        fn notify(&self, notice: CommentNotice) -> Result<(), NotifyError> {
            self.notices
                .lock()
                .expect("notifier mutex poisoned")
                .push(notice);
            Ok(())
        }
    }

    pub(super) fn scratch_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "risk-advisor-it-{}-{name}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    pub(super) fn service_with_store(
        store: CaseStore,
    ) -> (
        AdvisoryService<CaseStore, RecordingNotifier>,
        Arc<RecordingNotifier>,
    ) {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = AdvisoryService::new(
            Arc::new(store),
            notifier.clone(),
            AnalysisConfig::default(),
            AccessControl::new(AccessSettings::default()),
        );
        (service, notifier)
    }

    /// Restaurant owner in their late forties with heavy debt and a school-age child.
    pub(super) fn owner_submission() -> ProfileSubmission {
        serde_json::from_value(json!({
            "employee": { "id": "E3003", "name": "Suda Rattana", "region": "RH-South", "zone": "Z1" },
            "customer": {
                "name": "Prasert Chaiyo",
                "age": "48",
                "occupation": "เจ้าของกิจการ ร้านอาหาร",
                "monthlyIncome": "80,000"
            },
            "family": { "hasChildren": true, "childAges": "12, 24" },
            "business": { "ownershipSharePercent": "70" },
            "finances": {
                "savings": "150000",
                "timeDeposits": "0",
                "funds": "",
                "homeLoan": "2500000",
                "carLoan": "600000",
                "personalLoan": "0"
            },
            "policies": [
                { "name": "Whole life", "premium": "36000" },
                { "name": "Health", "premium": "18000" }
            ]
        }))
        .expect("submission json")
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use tower::ServiceExt;

use risk_advisor::workflows::cases::{
    case_router, CaseStore, PurgeScope, RiskCategory, Severity, ADMIN_PASSCODE_HEADER,
};

use common::*;

#[test]
fn owner_case_flows_from_intake_to_review() {
    let (service, notifier) = service_with_store(CaseStore::new());

    let record = service.submit(owner_submission()).expect("case stored");

    // "80,000" is not a plain number, so income is zero and the income rules stay quiet.
    let categories: Vec<RiskCategory> = record
        .findings
        .iter()
        .map(|finding| finding.category)
        .collect();
    assert_eq!(
        categories,
        vec![
            RiskCategory::KeyPerson,
            RiskCategory::ExcessCash,
            RiskCategory::DelayedRetirement,
            RiskCategory::ChildEducation,
        ]
    );
    assert_eq!(record.findings[0].severity, Severity::Critical);
    assert_eq!(record.profile.total_annual_premium(), 54_000.0);

    assert!(service.view(&record.id, "E9999").is_err());
    assert!(service
        .add_comment(&record.id, REVIEWER_CODE, "Prioritise key-person cover")
        .expect("comment"));

    let viewed = service.view(&record.id, "E3003").expect("owner view");
    assert_eq!(viewed.comments.len(), 1);
    assert_eq!(notifier.notices()[0].employee_name, "Suda Rattana");
}

#[test]
fn snapshot_store_keeps_cases_across_restarts() {
    let path = scratch_path("restart");

    let case_id = {
        let (service, _) = service_with_store(CaseStore::open(&path));
        let record = service.submit(owner_submission()).expect("case stored");
        service
            .add_comment(&record.id, REVIEWER_CODE, "Check the business valuation")
            .expect("comment");
        record.id
    };

    let (service, _) = service_with_store(CaseStore::open(&path));
    let restored = service.view(&case_id, REVIEWER_CODE).expect("case restored");
    assert_eq!(restored.comments.len(), 1);
    assert_eq!(restored.profile.customer.name, "Prasert Chaiyo");

    let removed = service
        .purge(ADMIN_PASSCODE, PurgeScope::All, Utc::now())
        .expect("purge");
    assert_eq!(removed, 1);
    let (service, _) = service_with_store(CaseStore::open(&path));
    assert!(service
        .search("", REVIEWER_CODE)
        .expect("search")
        .is_empty());

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn router_serves_case_and_admin_export() {
    let (service, _) = service_with_store(CaseStore::new());
    let router = case_router(Arc::new(service));

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/cases")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&owner_submission()).expect("encode"),
                ))
                .expect("request"),
        )
        .await
        .expect("submit response");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(
            Request::get("/api/v1/admin/export")
                .header(ADMIN_PASSCODE_HEADER, ADMIN_PASSCODE)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("export response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    let csv = String::from_utf8(body.to_vec()).expect("utf-8 csv");
    assert!(csv.contains("Prasert Chaiyo"));
    assert!(csv.contains("Key-Person Business Risk"));
}
