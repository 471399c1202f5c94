//! Password hashing, session tokens and the sign-in service.
//!
//! Passwords are stored as `salt_hex$hash_hex`, where the hash is a BLAKE3
//! key derivation over a random 16-byte salt followed by the password,
//! chained for `PASSWORD_ROUNDS` rounds.
//! Session tokens are random opaque strings handed to the client once; only
//! their BLAKE3 hash is kept in storage.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::Serialize;
use tokio::sync::Mutex;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::model::{AuditEvent, NewUser, User};
use crate::storage::Storage;

/// Key-derivation context for password hashes.
const PASSWORD_CONTEXT: &str = "casetrack 2024-01-01 password hash v2";

/// Chained BLAKE3 rounds per password hash.
const PASSWORD_ROUNDS: u32 = 50_000;

const SALT_LEN: usize = 16;

const TOKEN_LEN: usize = 32;

/// Message for every failed sign-in, so callers cannot probe for accounts.
const BAD_CREDENTIALS: &str = "invalid email or password";

/// Hash a password with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    format!(
        "{}${}",
        hex::encode(salt),
        derive_password_hash(&salt, password).to_hex()
    )
}

/// Check a password against a stored `salt_hex$hash_hex` value.
///
/// Malformed stored values never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once('$') else {
        return false;
    };
    let mut salt = [0u8; SALT_LEN];
    if hex::decode_to_slice(salt_hex, &mut salt).is_err() {
        return false;
    }
    let Ok(expected) = blake3::Hash::from_hex(hash_hex) else {
        return false;
    };
    // blake3::Hash equality is constant-time.
    derive_password_hash(&salt, password) == expected
}

fn derive_password_hash(salt: &[u8], password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new_derive_key(PASSWORD_CONTEXT);
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let mut hash = hasher.finalize();
    for _ in 1..PASSWORD_ROUNDS {
        hash = blake3::Hasher::new_derive_key(PASSWORD_CONTEXT)
            .update(hash.as_bytes())
            .update(salt)
            .finalize();
    }
    hash
}

/// Create a new 256-bit session token, hex encoded.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a session token for storage and lookup.
#[must_use]
pub fn hash_token(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively. Returns `None` for other
/// schemes and for an empty token.
#[must_use]
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email pattern"))
}

/// Check an email address and password before creating an account.
///
/// # Errors
///
/// Returns a validation error for a malformed email or a password shorter
/// than `min_password_length` characters.
pub fn validate_new_user(email: &str, password: &str, min_password_length: usize) -> Result<()> {
    let email = email.trim();
    if !email_regex().is_match(email) {
        return Err(Error::validation(format!("invalid email address: {email}")));
    }
    if password.chars().count() < min_password_length {
        return Err(Error::validation(format!(
            "password must be at least {min_password_length} characters"
        )));
    }
    Ok(())
}

/// A signed-in session as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: &'static str,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// The signed-in user.
    pub user: User,
}

/// Sign-in, sign-out and token resolution over shared storage.
#[derive(Debug, Clone)]
pub struct AuthService {
    storage: Arc<Mutex<Storage>>,
    session_ttl: Duration,
    min_password_length: usize,
}

impl AuthService {
    /// Create a service using the given storage and auth settings.
    #[must_use]
    pub fn new(storage: Arc<Mutex<Storage>>, config: &AuthConfig) -> Self {
        Self {
            storage,
            session_ttl: config.session_ttl(),
            min_password_length: config.min_password_length,
        }
    }

    /// Minimum accepted password length.
    #[must_use]
    pub fn min_password_length(&self) -> usize {
        self.min_password_length
    }

    /// Verify credentials and open a session.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` for an unknown email, a wrong password
    /// or a deactivated account, or a database error.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let storage = self.storage.lock().await;

        let Some((user, stored)) = storage.password_hash_for(email)? else {
            debug!("Sign-in for unknown email");
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        };
        if !verify_password(password, &stored) {
            warn!("Failed sign-in for user {}", user.id);
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }
        if !user.is_active {
            warn!("Sign-in refused for deactivated user {}", user.id);
            return Err(Error::unauthorized("account is deactivated"));
        }

        let access_token = generate_token();
        let expires_at = Utc::now()
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| Error::internal("session lifetime is out of range"))?;
        storage.insert_session(&hash_token(&access_token), &user.id, expires_at)?;
        storage.record_audit(&AuditEvent::new("session", "created").by(&user.id))?;

        info!("User {} signed in", user.id);
        Ok(Session {
            access_token,
            token_type: "bearer",
            expires_at,
            user,
        })
    }

    /// End the session behind a token. Returns `false` if it was unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn sign_out(&self, token: &str) -> Result<bool> {
        let storage = self.storage.lock().await;
        let ended = storage.delete_session(&hash_token(token))?;
        if ended {
            debug!("Session ended");
        }
        Ok(ended)
    }

    /// Resolve a token to its active user.
    ///
    /// Returns `None` for unknown or expired tokens and for deactivated users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn authenticate(&self, token: &str) -> Result<Option<User>> {
        let storage = self.storage.lock().await;
        let user = storage
            .session_user(&hash_token(token), Utc::now())?
            .filter(|user| user.is_active);
        Ok(user)
    }

    /// Validate, hash and store a new account along with its
    /// `user.created` audit entry.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, a conflict for a taken
    /// email, or a database error. Nothing is stored on error.
    pub async fn register(
        &self,
        new_user: &NewUser,
        password: &str,
        invited_by: Option<&str>,
    ) -> Result<User> {
        validate_new_user(&new_user.email, password, self.min_password_length)?;
        let password_hash = hash_password(password);
        let mut storage = self.storage.lock().await;
        storage.create_user_audited(new_user, &password_hash, |user| {
            let event = AuditEvent::new("user", "created")
                .on(&user.id)
                .details(format!("role={}", user.role));
            match invited_by {
                Some(admin_id) => event.by(admin_id),
                None => event,
            }
        })
    }
}
