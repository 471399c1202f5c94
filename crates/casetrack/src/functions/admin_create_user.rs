//! The `admin-create-user` function.
//!
//! Lets a signed-in admin create an investigator account. Checks run in a
//! fixed order: backend configured, bearer token present, token valid,
//! caller is admin, body well formed. Only then is the request forwarded,
//! once, to the [`UserAdmin`] backend.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{FunctionError, UserAdmin};
use crate::auth::{parse_bearer, AuthService};
use crate::model::{NewUser, UserRole};

/// Request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    /// Sign-in email of the new account.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Given name; empty when absent.
    pub first_name: String,
    /// Family name; empty when absent.
    pub last_name: String,
}

/// Success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    /// Id of the created account.
    pub user_id: String,
}

/// Run the function.
///
/// `backend` is `None` when user administration is not configured.
/// `authorization` is the raw `Authorization` header value, if any.
///
/// # Errors
///
/// Returns the [`FunctionError`] for the first check that fails, or
/// [`FunctionError::Backend`] carrying the backend's message.
pub async fn admin_create_user(
    backend: Option<&dyn UserAdmin>,
    auth: &AuthService,
    authorization: Option<&str>,
    body: &[u8],
) -> Result<CreateUserResponse, FunctionError> {
    let backend = backend.ok_or(FunctionError::NotConfigured)?;

    let token = authorization
        .and_then(parse_bearer)
        .ok_or(FunctionError::MissingToken)?;

    let caller = auth
        .authenticate(token)
        .await
        .map_err(|err| FunctionError::Internal(err.to_string()))?
        .ok_or(FunctionError::InvalidToken)?;

    if !caller.is_admin() {
        warn!("User {} attempted to create a user without admin role", caller.id);
        return Err(FunctionError::Forbidden);
    }

    let request: CreateUserRequest = serde_json::from_slice(body)
        .map_err(|err| FunctionError::BadRequest(format!("invalid request body: {err}")))?;
    if request.email.trim().is_empty() || request.password.trim().is_empty() {
        return Err(FunctionError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let new_user = NewUser {
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        role: UserRole::Investigator,
    };
    debug!("Admin {} creating user {}", caller.id, new_user.email);

    let user = backend
        .create_user(&new_user, &request.password, Some(&caller.id))
        .await
        .map_err(|err| FunctionError::Backend(err.to_string()))?;

    info!("Admin {} created user {}", caller.id, user.id);
    Ok(CreateUserResponse { user_id: user.id })
}
