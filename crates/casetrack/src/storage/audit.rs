//! Audit log queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use super::{from_db_time, limit_param, to_db_time, Storage};
use crate::error::Result;
use crate::model::{AuditEvent, AuditLog};

impl Storage {
    /// Append an event to the audit log.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_audit(&self, event: &AuditEvent) -> Result<AuditLog> {
        insert_audit(&self.conn, event)
    }

    /// List audit entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_audit_logs(&self, limit: Option<usize>) -> Result<Vec<AuditLog>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, user_id, action, entity_type, entity_id, details, created_at
            FROM audit_logs
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            ",
        )?;
        let entries = stmt
            .query_map([limit_param(limit)], Self::row_to_audit_log)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Delete audit entries recorded before `cutoff`.
    ///
    /// Returns the number of entries deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_audit_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM audit_logs WHERE created_at < ?1",
            [to_db_time(&cutoff)],
        )?;
        if affected > 0 {
            info!("Pruned {} audit entries", affected);
        }
        Ok(affected)
    }

    fn row_to_audit_log(row: &Row) -> rusqlite::Result<AuditLog> {
        let created_at: String = row.get(6)?;
        Ok(AuditLog {
            id: row.get(0)?,
            user_id: row.get(1)?,
            action: row.get(2)?,
            entity_type: row.get(3)?,
            entity_id: row.get(4)?,
            details: row.get(5)?,
            created_at: from_db_time(&created_at),
        })
    }
}

pub(super) fn insert_audit(conn: &Connection, event: &AuditEvent) -> Result<AuditLog> {
    let created_at = Utc::now();
    conn.execute(
        r"
        INSERT INTO audit_logs (user_id, action, entity_type, entity_id, details, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ",
        params![
            event.user_id,
            event.action,
            event.entity_type,
            event.entity_id,
            event.details,
            to_db_time(&created_at),
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!("Audit {}: {}", id, event.action);

    Ok(AuditLog {
        id,
        user_id: event.user_id.clone(),
        action: event.action.clone(),
        entity_type: event.entity_type.clone(),
        entity_id: event.entity_id.clone(),
        details: event.details.clone(),
        created_at,
    })
}
