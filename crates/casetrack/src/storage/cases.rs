//! Case queries.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::{from_db_time, is_unique_violation, limit_param, parse_enum, to_db_time, Storage};
use crate::error::{Error, Result};
use crate::model::{new_id, Case, CaseUpdate, NewCase};

const CASE_COLUMNS: &str = "id, case_number, title, description, status, priority, location, \
     assigned_to, created_by, created_at, updated_at";

impl Storage {
    /// Open a new case.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank required fields, a conflict if
    /// the case number is taken, or a database error.
    pub fn insert_case(&self, new_case: &NewCase, created_by: Option<&str>) -> Result<Case> {
        new_case.validate()?;

        let now = Utc::now();
        let case = Case {
            id: new_id(),
            case_number: new_case.case_number.trim().to_string(),
            title: new_case.title.trim().to_string(),
            description: new_case.description.clone(),
            status: new_case.status,
            priority: new_case.priority,
            location: new_case.location.clone(),
            assigned_to: new_case.assigned_to.clone(),
            created_by: created_by.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        self.conn
            .execute(
                r"
                INSERT INTO cases (id, case_number, title, description, status, priority,
                                   location, assigned_to, created_by, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ",
                params![
                    case.id,
                    case.case_number,
                    case.title,
                    case.description,
                    case.status.as_str(),
                    case.priority.as_str(),
                    case.location,
                    case.assigned_to,
                    case.created_by,
                    to_db_time(&case.created_at),
                    to_db_time(&case.updated_at),
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    Error::conflict(format!("case number {} already exists", case.case_number))
                } else {
                    err.into()
                }
            })?;

        info!("Opened case {} ({})", case.case_number, case.id);
        Ok(case)
    }

    /// Get a case by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_case(&self, id: &str) -> Result<Option<Case>> {
        let case = self
            .conn
            .query_row(
                &format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1"),
                [id],
                Self::row_to_case,
            )
            .optional()?;
        Ok(case)
    }

    /// List cases, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_cases(&self, limit: Option<usize>) -> Result<Vec<Case>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CASE_COLUMNS} FROM cases ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))?;
        let cases = stmt
            .query_map([limit_param(limit)], Self::row_to_case)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(cases)
    }

    /// Apply a partial update to a case.
    ///
    /// Returns the updated case, or `None` if no case has this id.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the update is invalid, or a database error.
    pub fn update_case(&self, id: &str, update: &CaseUpdate) -> Result<Option<Case>> {
        let Some(mut case) = self.get_case(id)? else {
            return Ok(None);
        };

        update.apply(&mut case)?;
        case.updated_at = Utc::now();

        self.conn.execute(
            r"
            UPDATE cases
            SET title = ?2, description = ?3, status = ?4, priority = ?5,
                location = ?6, assigned_to = ?7, updated_at = ?8
            WHERE id = ?1
            ",
            params![
                case.id,
                case.title,
                case.description,
                case.status.as_str(),
                case.priority.as_str(),
                case.location,
                case.assigned_to,
                to_db_time(&case.updated_at),
            ],
        )?;

        debug!("Updated case {}", case.id);
        Ok(Some(case))
    }

    /// Delete a case together with its victims, evidence and suspects.
    ///
    /// Returns `true` if a case was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_case(&self, id: &str) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM cases WHERE id = ?1", [id])?;
        if affected > 0 {
            info!("Deleted case {}", id);
        }
        Ok(affected > 0)
    }

    fn row_to_case(row: &Row) -> rusqlite::Result<Case> {
        let status: String = row.get(4)?;
        let priority: String = row.get(5)?;
        let created_at: String = row.get(9)?;
        let updated_at: String = row.get(10)?;

        Ok(Case {
            id: row.get(0)?,
            case_number: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            status: parse_enum(&status, "case status"),
            priority: parse_enum(&priority, "case priority"),
            location: row.get(6)?,
            assigned_to: row.get(7)?,
            created_by: row.get(8)?,
            created_at: from_db_time(&created_at),
            updated_at: from_db_time(&updated_at),
        })
    }
}
