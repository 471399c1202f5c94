//! HTTP API.
//!
//! Routes mirror a hosted backend's layout: `/auth/v1` for sessions,
//! `/rest/v1` for table access and `/functions/v1` for server-side
//! functions. Every route except health, sign-in, the service-key admin
//! route and CORS preflight requires a bearer token.

mod auth_routes;
mod functions;
mod records;
mod response;
mod rest;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    AUTHORIZATION,
};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::auth::{parse_bearer, AuthService};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::functions::AdminClient;
use crate::model::User;
use crate::reports::ReportStore;
use crate::storage::Storage;

pub use response::{ApiError, ApiJson, ApiQuery, ApiResult};

const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
const CORS_ALLOW_METHODS: &str = "GET, POST, PATCH, DELETE, OPTIONS";

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    storage: Arc<Mutex<Storage>>,
    reports: Arc<Mutex<ReportStore>>,
    auth: AuthService,
    admin: Option<Arc<AdminClient>>,
    cors_allow_origin: HeaderValue,
}

impl AppState {
    /// Build state around already-open stores.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the CORS origin is not a valid
    /// header value.
    pub fn new(config: &Config, storage: Storage, reports: ReportStore) -> Result<Self> {
        let cors_allow_origin =
            HeaderValue::from_str(&config.server.cors_allow_origin).map_err(|_| {
                Error::ConfigValidation {
                    message: format!(
                        "invalid cors_allow_origin: {}",
                        config.server.cors_allow_origin
                    ),
                }
            })?;

        let storage = Arc::new(Mutex::new(storage));
        let auth = AuthService::new(Arc::clone(&storage), &config.auth);
        let admin = AdminClient::from_config(&config.auth, auth.clone()).map(Arc::new);
        if admin.is_none() {
            info!("No service key configured; user administration is disabled");
        }

        Ok(Self {
            storage,
            reports: Arc::new(Mutex::new(reports)),
            auth,
            admin,
            cors_allow_origin,
        })
    }

    /// Open the database and report store named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either store cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        let reports = ReportStore::open(config.reports_path())?;
        Self::new(config, storage, reports)
    }

    /// Drop expired sessions and, when a retention window is set, old audit
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn prune(&self, audit_retention: Option<chrono::Duration>) -> Result<()> {
        let storage = self.storage.lock().await;
        let now = Utc::now();
        storage.prune_expired_sessions(now)?;
        if let Some(retention) = audit_retention {
            let cutoff = now
                .checked_sub_signed(retention)
                .ok_or_else(|| Error::internal("audit retention window is out of range"))?;
            storage.prune_audit_older_than(cutoff)?;
        }
        Ok(())
    }

    /// The sign-in service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/auth/v1", auth_routes::routes())
        .nest("/rest/v1", rest::routes())
        .route(
            "/functions/v1/admin-create-user",
            post(functions::admin_create_user),
        )
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .with_state(state)
}

/// Serve the API until Ctrl-C.
///
/// `bind` overrides the configured address.
///
/// # Errors
///
/// Returns an error if the stores cannot be opened or the address cannot
/// be bound.
pub async fn serve(config: &Config, bind: Option<SocketAddr>) -> Result<()> {
    let state = AppState::open(config)?;
    state.prune(config.audit_retention()).await?;

    let addr = match bind {
        Some(addr) => addr,
        None => config.bind_address()?,
    };
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}

async fn healthz() -> &'static str {
    "ok"
}

/// Answer preflight requests directly and stamp CORS headers on the rest.
async fn cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        debug!("Preflight for {}", request.uri().path());
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, state.cors_allow_origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    response
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer)
}

/// The signed-in caller, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
        let user = state
            .auth
            .authenticate(token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("invalid or expired token"))?;
        Ok(Self(user))
    }
}

/// A signed-in caller allowed to modify records.
///
/// Resolved from request parts, so the role check runs before any body
/// extractor gets to reject the payload.
#[derive(Debug, Clone)]
pub struct Writer(pub User);

impl FromRequestParts<AppState> for Writer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let caller = CurrentUser::from_request_parts(parts, state).await?;
        caller.require_writer()?;
        Ok(Self(caller.0))
    }
}

/// A signed-in admin.
#[derive(Debug, Clone)]
pub struct Admin(pub User);

impl FromRequestParts<AppState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let caller = CurrentUser::from_request_parts(parts, state).await?;
        caller.require_admin()?;
        Ok(Self(caller.0))
    }
}

impl CurrentUser {
    /// Fail with 403 unless the caller may modify records.
    ///
    /// # Errors
    ///
    /// Returns a 403 [`ApiError`] for viewers.
    pub fn require_writer(&self) -> ApiResult<()> {
        if self.0.can_write() {
            Ok(())
        } else {
            Err(ApiError::forbidden("viewers cannot modify records"))
        }
    }

    /// Fail with 403 unless the caller is an admin.
    ///
    /// # Errors
    ///
    /// Returns a 403 [`ApiError`] for non-admins.
    pub fn require_admin(&self) -> ApiResult<()> {
        if self.0.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("admin role required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserRole;

    fn user(role: UserRole) -> User {
        User {
            id: "u1".to_string(),
            email: "u@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_role_guards() {
        let viewer = CurrentUser(user(UserRole::Viewer));
        assert_eq!(
            viewer.require_writer().unwrap_err().status(),
            StatusCode::FORBIDDEN
        );
        assert!(viewer.require_admin().is_err());

        let investigator = CurrentUser(user(UserRole::Investigator));
        assert!(investigator.require_writer().is_ok());
        assert!(investigator.require_admin().is_err());

        let admin = CurrentUser(user(UserRole::Admin));
        assert!(admin.require_writer().is_ok());
        assert!(admin.require_admin().is_ok());
    }

    #[tokio::test]
    async fn test_prune_rejects_out_of_range_retention() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(
            &Config::default(),
            Storage::open_in_memory().unwrap(),
            ReportStore::open(dir.path().join("kv.json")).unwrap(),
        )
        .unwrap();

        let err = state
            .prune(Some(chrono::Duration::days(i64::from(u32::MAX))))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(state.prune(Some(chrono::Duration::days(30))).await.is_ok());
        assert!(state.prune(None).await.is_ok());
    }

    #[test]
    fn test_invalid_cors_origin_rejected() {
        let mut config = Config::default();
        config.server.cors_allow_origin = "bad\norigin".to_string();
        let err = AppState::new(
            &config,
            Storage::open_in_memory().unwrap(),
            ReportStore::open(tempfile::tempdir().unwrap().path().join("kv.json")).unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("cors_allow_origin"));
    }
}
