//! Server-side functions invoked over `/functions/v1/<name>`.
//!
//! Each function is a single request handler that checks the caller and
//! forwards to a backend, passing any backend failure straight through.

pub mod admin_create_user;
mod error;

use async_trait::async_trait;
use tracing::info;

use crate::auth::AuthService;
use crate::config::AuthConfig;
use crate::error::Result;
use crate::model::{NewUser, User};

pub use admin_create_user::{admin_create_user, CreateUserRequest, CreateUserResponse};
pub use error::FunctionError;

/// The user-administration backend that privileged functions forward to.
#[async_trait]
pub trait UserAdmin: Send + Sync {
    /// Create an account on behalf of `invited_by`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    async fn create_user(
        &self,
        new_user: &NewUser,
        password: &str,
        invited_by: Option<&str>,
    ) -> Result<User>;
}

/// User administration backed by local storage and gated by the service key.
#[derive(Debug, Clone)]
pub struct AdminClient {
    service_key_hash: blake3::Hash,
    auth: AuthService,
}

impl AdminClient {
    /// Build a client when a service key is configured; `None` otherwise.
    #[must_use]
    pub fn from_config(config: &AuthConfig, auth: AuthService) -> Option<Self> {
        let key = config.service_key.as_deref()?;
        Some(Self {
            service_key_hash: blake3::hash(key.as_bytes()),
            auth,
        })
    }

    /// Check a presented key against the configured service key.
    #[must_use]
    pub fn verify_key(&self, key: &str) -> bool {
        blake3::hash(key.as_bytes()) == self.service_key_hash
    }
}

#[async_trait]
impl UserAdmin for AdminClient {
    async fn create_user(
        &self,
        new_user: &NewUser,
        password: &str,
        invited_by: Option<&str>,
    ) -> Result<User> {
        let user = self.auth.register(new_user, password, invited_by).await?;
        info!("Created user {} via admin API", user.id);
        Ok(user)
    }
}
