//! `/rest/v1` routes for records attached to a case: victims, evidence and
//! suspects. All three share the same shape, so the handlers are generated.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use super::rest::CaseIdQuery;
use super::{ApiError, ApiJson, ApiQuery, ApiResult, AppState, CurrentUser, Writer};
use crate::model::{AuditEvent, Evidence, NewEvidence, NewSuspect, NewVictim, Suspect, Victim};

/// Generate list/create/get/delete handlers for one record table.
macro_rules! record_handlers {
    (
        $module:ident, $entity:literal, $record:ty, $new:ty,
        $insert:ident, $get:ident, $list:ident, $delete:ident
    ) => {
        mod $module {
            use super::*;

            pub(super) async fn list(
                State(state): State<AppState>,
                _user: CurrentUser,
                ApiQuery(query): ApiQuery<CaseIdQuery>,
            ) -> ApiResult<Json<Vec<$record>>> {
                let records = state
                    .storage
                    .lock()
                    .await
                    .$list(query.case_id.as_deref())?;
                Ok(Json(records))
            }

            pub(super) async fn create(
                State(state): State<AppState>,
                user: Writer,
                ApiJson(payload): ApiJson<$new>,
            ) -> ApiResult<(StatusCode, Json<$record>)> {
                let storage = state.storage.lock().await;
                let record = storage.$insert(&payload)?;
                storage.record_audit(
                    &AuditEvent::new($entity, "created")
                        .by(&user.0.id)
                        .on(&record.id)
                        .details(format!("case={}", record.case_id)),
                )?;
                Ok((StatusCode::CREATED, Json(record)))
            }

            pub(super) async fn get(
                State(state): State<AppState>,
                _user: CurrentUser,
                Path(id): Path<String>,
            ) -> ApiResult<Json<$record>> {
                state
                    .storage
                    .lock()
                    .await
                    .$get(&id)?
                    .map(Json)
                    .ok_or_else(|| ApiError::not_found($entity, &id))
            }

            pub(super) async fn delete(
                State(state): State<AppState>,
                user: Writer,
                Path(id): Path<String>,
            ) -> ApiResult<StatusCode> {
                let storage = state.storage.lock().await;
                if !storage.$delete(&id)? {
                    return Err(ApiError::not_found($entity, &id));
                }
                storage.record_audit(&AuditEvent::new($entity, "deleted").by(&user.0.id).on(&id))?;
                Ok(StatusCode::NO_CONTENT)
            }
        }
    };
}

record_handlers!(
    victims, "victim", Victim, NewVictim,
    insert_victim, get_victim, list_victims, delete_victim
);
record_handlers!(
    evidence, "evidence", Evidence, NewEvidence,
    insert_evidence, get_evidence, list_evidence, delete_evidence
);
record_handlers!(
    suspects, "suspect", Suspect, NewSuspect,
    insert_suspect, get_suspect, list_suspects, delete_suspect
);

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/victims", get(victims::list).post(victims::create))
        .route("/victims/{id}", get(victims::get).delete(victims::delete))
        .route("/evidence", get(evidence::list).post(evidence::create))
        .route("/evidence/{id}", get(evidence::get).delete(evidence::delete))
        .route("/suspects", get(suspects::list).post(suspects::create))
        .route("/suspects/{id}", get(suspects::get).delete(suspects::delete))
}
