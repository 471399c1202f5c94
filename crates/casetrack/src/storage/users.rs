//! User account and session queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::audit::insert_audit;
use super::{from_db_time, is_unique_violation, parse_enum, to_db_time, Storage};
use crate::error::{Error, Result};
use crate::model::{new_id, AuditEvent, NewUser, User, UserRole};

const USER_COLUMNS: &str = "id, email, first_name, last_name, role, is_active, created_at";

impl Storage {
    /// Create a user account with an already-hashed password.
    ///
    /// The email is trimmed and lowercased before storage.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the email is already registered, or a database error.
    pub fn create_user(&self, new_user: &NewUser, password_hash: &str) -> Result<User> {
        insert_user(&self.conn, new_user, password_hash)
    }

    /// Create a user account and its audit entry in one transaction.
    ///
    /// `audit` builds the entry from the freshly created user. Neither row
    /// is kept if either insert fails.
    ///
    /// # Errors
    ///
    /// Returns a conflict if the email is already registered, or a database error.
    pub fn create_user_audited(
        &mut self,
        new_user: &NewUser,
        password_hash: &str,
        audit: impl FnOnce(&User) -> AuditEvent,
    ) -> Result<User> {
        let tx = self.conn.transaction()?;
        let user = insert_user(&tx, new_user, password_hash)?;
        insert_audit(&tx, &audit(&user))?;
        tx.commit()?;
        Ok(user)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                Self::row_to_user,
            )
            .optional()?)
    }

    /// Get a user by email, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                [email.trim().to_lowercase()],
                Self::row_to_user,
            )
            .optional()?)
    }

    /// Get a user together with the stored password hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn password_hash_for(&self, email: &str) -> Result<Option<(User, String)>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?1"),
                [email.trim().to_lowercase()],
                |row| Ok((Self::row_to_user(row)?, row.get(7)?)),
            )
            .optional()?)
    }

    /// List all users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, rowid ASC"
        ))?;
        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Change a user's role. Returns the updated user, or `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_user_role(&self, id: &str, role: UserRole) -> Result<Option<User>> {
        self.conn.execute(
            "UPDATE users SET role = ?2 WHERE id = ?1",
            params![id, role.as_str()],
        )?;
        self.get_user(id)
    }

    /// Activate or deactivate a user. Deactivation also ends the user's
    /// sessions. Returns the updated user, or `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_user_active(&self, id: &str, active: bool) -> Result<Option<User>> {
        self.conn.execute(
            "UPDATE users SET is_active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        if !active {
            let ended = self
                .conn
                .execute("DELETE FROM sessions WHERE user_id = ?1", [id])?;
            debug!("Ended {} sessions for deactivated user {}", ended, id);
        }
        self.get_user(id)
    }

    /// Store a session for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_session(
        &self,
        token_hash: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![
                token_hash,
                user_id,
                to_db_time(&Utc::now()),
                to_db_time(&expires_at)
            ],
        )?;
        Ok(())
    }

    /// Resolve a session to its user if it has not expired at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn session_user(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<User>> {
        let columns = USER_COLUMNS
            .split(", ")
            .map(|c| format!("u.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {columns} FROM sessions s JOIN users u ON u.id = s.user_id \
                     WHERE s.token_hash = ?1 AND s.expires_at > ?2"
                ),
                params![token_hash, to_db_time(&now)],
                Self::row_to_user,
            )
            .optional()?)
    }

    /// Delete a session. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_session(&self, token_hash: &str) -> Result<bool> {
        Ok(self
            .conn
            .execute("DELETE FROM sessions WHERE token_hash = ?1", [token_hash])?
            > 0)
    }

    /// Delete sessions that expired before `now`.
    ///
    /// Returns the number of sessions deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            [to_db_time(&now)],
        )?;
        if affected > 0 {
            info!("Pruned {} expired sessions", affected);
        }
        Ok(affected)
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        let role: String = row.get(4)?;
        let created_at: String = row.get(6)?;
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            role: parse_enum(&role, "user role"),
            is_active: row.get(5)?,
            created_at: from_db_time(&created_at),
        })
    }
}

fn insert_user(conn: &Connection, new_user: &NewUser, password_hash: &str) -> Result<User> {
    let user = User {
        id: new_id(),
        email: new_user.email.trim().to_lowercase(),
        first_name: new_user.first_name.trim().to_string(),
        last_name: new_user.last_name.trim().to_string(),
        role: new_user.role,
        is_active: true,
        created_at: Utc::now(),
    };

    conn
        .execute(
            r"
            INSERT INTO users (id, email, first_name, last_name, role, is_active,
                               password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7)
            ",
            params![
                user.id,
                user.email,
                user.first_name,
                user.last_name,
                user.role.as_str(),
                password_hash,
                to_db_time(&user.created_at),
            ],
        )
        .map_err(|err| {
            if is_unique_violation(&err) {
                Error::conflict("a user with this email address has already been registered")
            } else {
                err.into()
            }
        })?;

    info!("Created user {} with role {}", user.id, user.role);
    Ok(user)
}
