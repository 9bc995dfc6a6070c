use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::analysis::{FinancialAggregates, RiskFinding};
use super::domain::{CaseId, CaseSummaryView};
use super::intake::ProfileSubmission;
use super::repository::{CaseRepository, CommentNotifier, PurgeScope, RepositoryError};
use super::service::{AdvisoryService, AdvisoryServiceError};

/// Header carrying the admin passcode on admin routes.
pub const ADMIN_PASSCODE_HEADER: &str = "x-admin-passcode";

/// Router builder exposing analysis, case, and admin endpoints.
pub fn case_router<R, N>(service: Arc<AdvisoryService<R, N>>) -> Router
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    Router::new()
        .route("/api/v1/analysis", post(analyze_handler::<R, N>))
        .route(
            "/api/v1/cases",
            get(search_handler::<R, N>).post(submit_handler::<R, N>),
        )
        .route("/api/v1/cases/:case_id", get(view_handler::<R, N>))
        .route(
            "/api/v1/cases/:case_id/comments",
            post(comment_handler::<R, N>),
        )
        .route("/api/v1/admin/dashboard", get(dashboard_handler::<R, N>))
        .route("/api/v1/admin/export", get(export_handler::<R, N>))
        .route("/api/v1/admin/cases", delete(purge_handler::<R, N>))
        .route(
            "/api/v1/admin/reviewer-code",
            put(reviewer_code_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub(crate) struct AnalysisResponse {
    pub(crate) stable_client: bool,
    pub(crate) summary: String,
    pub(crate) aggregates: FinancialAggregates,
    pub(crate) findings: Vec<RiskFinding>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    pub(crate) query: String,
    #[serde(default)]
    pub(crate) requester: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ViewParams {
    #[serde(default)]
    pub(crate) requester: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentRequest {
    #[serde(default)]
    pub(crate) author: String,
    #[serde(default)]
    pub(crate) text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PurgeParams {
    pub(crate) scope: PurgeScope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewerCodeRequest {
    pub(crate) code: String,
}

fn admin_passcode(headers: &HeaderMap) -> &str {
    headers
        .get(ADMIN_PASSCODE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or_default()
}

pub(crate) fn error_response(error: AdvisoryServiceError) -> Response {
    let status = match &error {
        AdvisoryServiceError::Intake(_)
        | AdvisoryServiceError::InvalidComment(_)
        | AdvisoryServiceError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdvisoryServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AdvisoryServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AdvisoryServiceError::AdminRequired => StatusCode::UNAUTHORIZED,
        AdvisoryServiceError::Repository(_)
        | AdvisoryServiceError::Report(_)
        | AdvisoryServiceError::AccessSettings(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn analyze_handler<R, N>(
    State(service): State<Arc<AdvisoryService<R, N>>>,
    Json(submission): Json<ProfileSubmission>,
) -> Response
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    match service.analyze_submission(submission) {
        Ok(report) => {
            let body = AnalysisResponse {
                stable_client: report.stable_client(),
                summary: report.summary(),
                aggregates: report.aggregates,
                findings: report.findings,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<AdvisoryService<R, N>>>,
    Json(submission): Json<ProfileSubmission>,
) -> Response
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn search_handler<R, N>(
    State(service): State<Arc<AdvisoryService<R, N>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    match service.search(&params.query, &params.requester) {
        Ok(records) => {
            let views: Vec<CaseSummaryView> =
                records.iter().map(|record| record.summary_view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_handler<R, N>(
    State(service): State<Arc<AdvisoryService<R, N>>>,
    Path(case_id): Path<String>,
    Query(params): Query<ViewParams>,
) -> Response
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    match service.view(&CaseId(case_id), &params.requester) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn comment_handler<R, N>(
    State(service): State<Arc<AdvisoryService<R, N>>>,
    Path(case_id): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Response
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    let id = CaseId(case_id);
    match service.add_comment(&id, &request.author, &request.text) {
        Ok(true) => {
            let payload = json!({ "case_id": id, "status": "commented" });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Ok(false) => error_response(AdvisoryServiceError::Repository(RepositoryError::NotFound)),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn dashboard_handler<R, N>(
    State(service): State<Arc<AdvisoryService<R, N>>>,
    headers: HeaderMap,
) -> Response
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    match service.dashboard(admin_passcode(&headers)) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R, N>(
    State(service): State<Arc<AdvisoryService<R, N>>>,
    headers: HeaderMap,
) -> Response
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    match service.export_csv(admin_passcode(&headers)) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn purge_handler<R, N>(
    State(service): State<Arc<AdvisoryService<R, N>>>,
    headers: HeaderMap,
    params: Result<Query<PurgeParams>, QueryRejection>,
) -> Response
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            return error_response(AdvisoryServiceError::InvalidRequest(rejection.body_text()));
        }
    };

    match service.purge(admin_passcode(&headers), params.scope, Utc::now()) {
        Ok(removed) => {
            let payload = json!({ "scope": params.scope, "removed": removed });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reviewer_code_handler<R, N>(
    State(service): State<Arc<AdvisoryService<R, N>>>,
    headers: HeaderMap,
    Json(request): Json<ReviewerCodeRequest>,
) -> Response
where
    R: CaseRepository + 'static,
    N: CommentNotifier + 'static,
{
    match service.update_reviewer_code(admin_passcode(&headers), &request.code) {
        Ok(true) => (StatusCode::OK, Json(json!({ "updated": true }))).into_response(),
        Ok(false) => {
            let payload = json!({
                "updated": false,
                "error": "reviewer code must be exactly 4 digits",
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}
