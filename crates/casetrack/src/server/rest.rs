//! `/rest/v1`: cases, users, audit log, dashboard and reports.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{records, Admin, ApiError, ApiJson, ApiQuery, ApiResult, AppState, CurrentUser, Writer};
use crate::dashboard::{CaseFilter, DashboardStats, StatCard};
use crate::model::{AuditEvent, AuditLog, Case, CaseUpdate, NewCase, NewReport, Report, User, UserRole};
use crate::reports::{render_case_report, report_filename};

/// Audit entries returned when no limit is given.
const DEFAULT_AUDIT_LIMIT: usize = 100;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/cases", get(list_cases).post(create_case))
        .route(
            "/cases/{id}",
            get(get_case).patch(update_case).delete(delete_case),
        )
        .route("/cases/{id}/report", get(download_report))
        .merge(records::routes())
        .route("/users", get(list_users))
        .route("/users/{id}", patch(update_user))
        .route("/audit_logs", get(list_audit_logs))
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/reports", get(list_reports).post(save_report))
        .route("/reports/{id}", delete(delete_report))
}

async fn list_cases(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(filter): ApiQuery<CaseFilter>,
) -> ApiResult<Json<Vec<Case>>> {
    let cases = state.storage.lock().await.list_cases(None)?;
    Ok(Json(filter.apply(cases)))
}

async fn create_case(
    State(state): State<AppState>,
    user: Writer,
    ApiJson(new_case): ApiJson<NewCase>,
) -> ApiResult<(StatusCode, Json<Case>)> {
    let storage = state.storage.lock().await;
    let case = storage.insert_case(&new_case, Some(&user.0.id))?;
    storage.record_audit(
        &AuditEvent::new("case", "created")
            .by(&user.0.id)
            .on(&case.id)
            .details(&case.case_number),
    )?;
    Ok((StatusCode::CREATED, Json(case)))
}

async fn get_case(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Case>> {
    state
        .storage
        .lock()
        .await
        .get_case(&id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("case", &id))
}

async fn update_case(
    State(state): State<AppState>,
    user: Writer,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<CaseUpdate>,
) -> ApiResult<Json<Case>> {
    if update.is_empty() {
        return Err(ApiError::bad_request("no fields to update"));
    }
    let storage = state.storage.lock().await;
    let case = storage
        .update_case(&id, &update)?
        .ok_or_else(|| ApiError::not_found("case", &id))?;
    storage.record_audit(&AuditEvent::new("case", "updated").by(&user.0.id).on(&id))?;
    Ok(Json(case))
}

async fn delete_case(
    State(state): State<AppState>,
    user: Writer,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let storage = state.storage.lock().await;
    if !storage.delete_case(&id)? {
        return Err(ApiError::not_found("case", &id));
    }
    let removed = state.reports.lock().await.delete_for_case(&id)?;
    storage.record_audit(
        &AuditEvent::new("case", "deleted")
            .by(&user.0.id)
            .on(&id)
            .details(format!("saved_reports={removed}")),
    )?;
    Ok(StatusCode::NO_CONTENT)
}

async fn download_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let storage = state.storage.lock().await;
    let case = storage
        .get_case(&id)?
        .ok_or_else(|| ApiError::not_found("case", &id))?;
    let victims = storage.list_victims(Some(&id))?;
    let evidence = storage.list_evidence(Some(&id))?;
    let suspects = storage.list_suspects(Some(&id))?;
    drop(storage);

    let body = render_case_report(
        &case,
        &victims,
        &evidence,
        &suspects,
        &user.0.display_name(),
        Utc::now(),
    );
    debug!("Rendered report for case {}", case.case_number);

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report_filename(&case)),
            ),
        ],
        body,
    ))
}

async fn list_users(State(state): State<AppState>, _user: CurrentUser) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.storage.lock().await.list_users()?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserUpdate {
    role: Option<UserRole>,
    is_active: Option<bool>,
}

async fn update_user(
    State(state): State<AppState>,
    caller: Admin,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Json<User>> {
    if update.role.is_none() && update.is_active.is_none() {
        return Err(ApiError::bad_request("no fields to update"));
    }
    if id == caller.0.id && update.is_active == Some(false) {
        return Err(ApiError::bad_request("cannot deactivate your own account"));
    }

    let storage = state.storage.lock().await;
    let mut user = storage
        .get_user(&id)?
        .ok_or_else(|| ApiError::not_found("user", &id))?;
    let mut changes = Vec::new();
    if let Some(role) = update.role {
        user = storage
            .set_user_role(&id, role)?
            .ok_or_else(|| ApiError::not_found("user", &id))?;
        changes.push(format!("role={role}"));
    }
    if let Some(active) = update.is_active {
        user = storage
            .set_user_active(&id, active)?
            .ok_or_else(|| ApiError::not_found("user", &id))?;
        changes.push(format!("is_active={active}"));
    }
    storage.record_audit(
        &AuditEvent::new("user", "updated")
            .by(&caller.0.id)
            .on(&id)
            .details(changes.join(", ")),
    )?;
    Ok(Json(user))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn list_audit_logs(
    State(state): State<AppState>,
    _admin: Admin,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> ApiResult<Json<Vec<AuditLog>>> {
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT);
    Ok(Json(state.storage.lock().await.list_audit_logs(Some(limit))?))
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    #[serde(flatten)]
    stats: DashboardStats,
    cards: Vec<StatCard>,
}

async fn dashboard_stats(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<StatsResponse>> {
    let stats = DashboardStats::collect(&*state.storage.lock().await)?;
    let cards = stats.cards();
    Ok(Json(StatsResponse { stats, cards }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CaseIdQuery {
    pub(super) case_id: Option<String>,
}

async fn list_reports(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<CaseIdQuery>,
) -> ApiResult<Json<Vec<Report>>> {
    let reports = state.reports.lock().await.list(query.case_id.as_deref())?;
    Ok(Json(reports))
}

async fn save_report(
    State(state): State<AppState>,
    user: Writer,
    ApiJson(new_report): ApiJson<NewReport>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    if state
        .storage
        .lock()
        .await
        .get_case(new_report.case_id.trim())?
        .is_none()
    {
        return Err(ApiError::not_found("case", &new_report.case_id));
    }

    let report = state
        .reports
        .lock()
        .await
        .save(&new_report, Some(&user.0.id))?;
    state.storage.lock().await.record_audit(
        &AuditEvent::new("report", "created")
            .by(&user.0.id)
            .on(&report.id),
    )?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn delete_report(
    State(state): State<AppState>,
    user: Writer,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.reports.lock().await.delete(&id)? {
        return Err(ApiError::not_found("report", &id));
    }
    state
        .storage
        .lock()
        .await
        .record_audit(&AuditEvent::new("report", "deleted").by(&user.0.id).on(&id))?;
    Ok(StatusCode::NO_CONTENT)
}
