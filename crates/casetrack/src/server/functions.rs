//! `/functions/v1` routes.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;

use super::AppState;
use crate::functions::{self, CreateUserResponse, FunctionError, UserAdmin};

/// The body is taken raw so that token and role checks answer before any
/// body error.
pub(super) async fn admin_create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CreateUserResponse>, FunctionError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let backend = state
        .admin
        .as_deref()
        .map(|admin| admin as &dyn UserAdmin);

    functions::admin_create_user(backend, &state.auth, authorization, &body)
        .await
        .map(Json)
}
