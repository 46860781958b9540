//! HTTP handlers for `/api/issues/{project}` and the health probes.

use crate::context::StoreHandle;
use crate::error::ApiError;
use crate::extract::RequestFields;
use crate::models::{ActionResult, HealthStatus};
use axum::Json;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use tracing::{debug, info, warn};
use trackr::domain::{Issue, NewIssue};
use trackr::input::{DeleteRequest, UpdateRequest};
use trackr::query::IssueFilter;
use trackr::sanitize;

/// `GET /api/issues/{project}`: issues matching the query parameters, most
/// recently updated first.
pub async fn list_issues(
    State(store): State<StoreHandle>,
    Path(project): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let project = sanitize::project_name(&project);

    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query.as_deref().unwrap_or(""))
        .map_err(|e| ApiError::InvalidQuery(e.to_string()))?;
    let filter = IssueFilter::from_query(pairs).map_err(ApiError::Store)?;

    let issues = store.get().await?.find(&project, &filter).await?;

    debug!(project = %project, count = issues.len(), "Listed issues");
    Ok(Json(issues))
}

/// `POST /api/issues/{project}`: create an issue.
pub async fn create_issue(
    State(store): State<StoreHandle>,
    Path(project): Path<String>,
    RequestFields(fields): RequestFields,
) -> Result<Json<Issue>, ApiError> {
    let project = sanitize::project_name(&project);
    let new_issue = NewIssue::from_fields(&fields)?;

    let issue = store.get().await?.insert(&project, new_issue).await?;

    info!(project = %project, id = %issue.id, "Created issue");
    Ok(Json(issue))
}

/// `PUT /api/issues/{project}`: change some fields of an issue.
pub async fn update_issue(
    State(store): State<StoreHandle>,
    Path(project): Path<String>,
    RequestFields(fields): RequestFields,
) -> Result<Json<ActionResult>, ApiError> {
    let project = sanitize::project_name(&project);
    let request = UpdateRequest::from_fields(&fields)?;

    let Ok(id) = request.issue_id() else {
        debug!(project = %project, id = %request.id, "Update with malformed id");
        return Err(ApiError::UpdateFailed { id: request.id });
    };

    let matched = store
        .get()
        .await?
        .update(&project, &id, &request.changes)
        .await?;
    if !matched {
        return Err(ApiError::UpdateFailed { id: request.id });
    }

    info!(project = %project, %id, "Updated issue");
    Ok(Json(ActionResult::updated(request.id)))
}

/// `DELETE /api/issues/{project}`: remove an issue.
pub async fn delete_issue(
    State(store): State<StoreHandle>,
    Path(project): Path<String>,
    RequestFields(fields): RequestFields,
) -> Result<Json<ActionResult>, ApiError> {
    let project = sanitize::project_name(&project);
    let request = DeleteRequest::from_fields(&fields)?;

    let Ok(id) = request.issue_id() else {
        debug!(project = %project, id = %request.id, "Delete with malformed id");
        return Err(ApiError::DeleteFailed { id: request.id });
    };

    if !store.get().await?.delete(&project, &id).await? {
        return Err(ApiError::DeleteFailed { id: request.id });
    }

    info!(project = %project, %id, "Deleted issue");
    Ok(Json(ActionResult::deleted(request.id)))
}

/// `GET /health`: liveness, never touches the store.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::new("ok"))
}

/// `GET /ready`: connects to the store if needed and pings it.
pub async fn ready(State(store): State<StoreHandle>) -> (StatusCode, Json<HealthStatus>) {
    let result = match store.get().await {
        Ok(store) => store.ping().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => (StatusCode::OK, Json(HealthStatus::new("ready"))),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus::new("unavailable")),
            )
        }
    }
}
