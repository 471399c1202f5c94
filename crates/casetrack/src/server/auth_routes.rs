//! `/auth/v1`: sign-in, sign-out, the current user and service-key user
//! administration.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;

use super::{bearer_token, ApiError, ApiJson, ApiResult, AppState, CurrentUser};
use crate::auth::Session;
use crate::functions::UserAdmin;
use crate::model::{NewUser, User, UserRole};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(sign_in))
        .route("/logout", post(sign_out))
        .route("/user", get(current_user))
        .route("/admin/users", post(create_user))
}

#[derive(Debug, Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn sign_in(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> ApiResult<Json<Session>> {
    let session = state
        .auth
        .sign_in(&credentials.email, &credentials.password)
        .await?;
    Ok(Json(session))
}

async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let token =
        bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
    if state.auth.sign_out(token).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::unauthorized("invalid or expired token"))
    }
}

async fn current_user(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[derive(Debug, Deserialize)]
struct AdminCreateUser {
    email: String,
    password: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    role: UserRole,
}

/// Create a user with any role. Authorized by the `apikey` header rather
/// than a session.
async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Some(admin) = state.admin.as_deref() else {
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "user administration is not configured",
        ));
    };

    let key = headers
        .get("apikey")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !admin.verify_key(key) {
        warn!("Admin user creation with a bad service key");
        return Err(ApiError::unauthorized("invalid service key"));
    }

    let request: AdminCreateUser = serde_json::from_slice(&body)
        .map_err(|err| ApiError::bad_request(format!("invalid request body: {err}")))?;

    let new_user = NewUser {
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        role: request.role,
    };
    let user = admin.create_user(&new_user, &request.password, None).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
