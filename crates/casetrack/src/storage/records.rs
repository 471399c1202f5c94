//! Queries for the records attached to a case: victims, evidence and suspects.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row, ToSql};
use tracing::debug;

use super::{from_db_time, is_foreign_key_violation, parse_enum, to_db_time, Storage};
use crate::error::{Error, Result};
use crate::model::{new_id, Evidence, NewEvidence, NewSuspect, NewVictim, Suspect, Victim};

const VICTIM_COLUMNS: &str =
    "id, case_id, first_name, last_name, age, gender, contact_info, address, statement, created_at";

const EVIDENCE_COLUMNS: &str = "id, case_id, name, description, evidence_type, location_found, \
     collected_by, collected_at, created_at";

const SUSPECT_COLUMNS: &str = "id, case_id, first_name, last_name, alias, status, description, \
     last_known_address, created_at";

/// Map an insert failure, turning a dangling `case_id` into not-found.
fn insert_error(err: rusqlite::Error, case_id: &str) -> Error {
    if is_foreign_key_violation(&err) {
        Error::not_found("case", case_id)
    } else {
        err.into()
    }
}

impl Storage {
    /// Record a victim on a case.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing fields, not-found if the case
    /// does not exist, or a database error.
    pub fn insert_victim(&self, new_victim: &NewVictim) -> Result<Victim> {
        new_victim.validate()?;

        let victim = Victim {
            id: new_id(),
            case_id: new_victim.case_id.clone(),
            first_name: new_victim.first_name.trim().to_string(),
            last_name: new_victim.last_name.trim().to_string(),
            age: new_victim.age,
            gender: new_victim.gender.clone(),
            contact_info: new_victim.contact_info.clone(),
            address: new_victim.address.clone(),
            statement: new_victim.statement.clone(),
            created_at: Utc::now(),
        };

        self.conn
            .execute(
                &format!(
                    "INSERT INTO victims ({VICTIM_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                params![
                    victim.id,
                    victim.case_id,
                    victim.first_name,
                    victim.last_name,
                    victim.age,
                    victim.gender,
                    victim.contact_info,
                    victim.address,
                    victim.statement,
                    to_db_time(&victim.created_at),
                ],
            )
            .map_err(|err| insert_error(err, &victim.case_id))?;

        debug!("Recorded victim {} on case {}", victim.id, victim.case_id);
        Ok(victim)
    }

    /// Get a victim by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_victim(&self, id: &str) -> Result<Option<Victim>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {VICTIM_COLUMNS} FROM victims WHERE id = ?1"),
                [id],
                Self::row_to_victim,
            )
            .optional()?)
    }

    /// List victims, newest first, optionally restricted to one case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_victims(&self, case_id: Option<&str>) -> Result<Vec<Victim>> {
        self.list_for_case("victims", VICTIM_COLUMNS, case_id, Self::row_to_victim)
    }

    /// Delete a victim. Returns `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_victim(&self, id: &str) -> Result<bool> {
        Ok(self.conn.execute("DELETE FROM victims WHERE id = ?1", [id])? > 0)
    }

    /// Record a piece of evidence on a case.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing fields, not-found if the case
    /// does not exist, or a database error.
    pub fn insert_evidence(&self, new_evidence: &NewEvidence) -> Result<Evidence> {
        new_evidence.validate()?;

        let evidence = Evidence {
            id: new_id(),
            case_id: new_evidence.case_id.clone(),
            name: new_evidence.name.trim().to_string(),
            description: new_evidence.description.clone(),
            evidence_type: new_evidence.evidence_type,
            location_found: new_evidence.location_found.clone(),
            collected_by: new_evidence.collected_by.clone(),
            collected_at: new_evidence.collected_at,
            created_at: Utc::now(),
        };

        self.conn
            .execute(
                &format!(
                    "INSERT INTO evidence ({EVIDENCE_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    evidence.id,
                    evidence.case_id,
                    evidence.name,
                    evidence.description,
                    evidence.evidence_type.as_str(),
                    evidence.location_found,
                    evidence.collected_by,
                    evidence.collected_at.as_ref().map(to_db_time),
                    to_db_time(&evidence.created_at),
                ],
            )
            .map_err(|err| insert_error(err, &evidence.case_id))?;

        debug!("Recorded evidence {} on case {}", evidence.id, evidence.case_id);
        Ok(evidence)
    }

    /// Get an evidence item by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_evidence(&self, id: &str) -> Result<Option<Evidence>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {EVIDENCE_COLUMNS} FROM evidence WHERE id = ?1"),
                [id],
                Self::row_to_evidence,
            )
            .optional()?)
    }

    /// List evidence, newest first, optionally restricted to one case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_evidence(&self, case_id: Option<&str>) -> Result<Vec<Evidence>> {
        self.list_for_case("evidence", EVIDENCE_COLUMNS, case_id, Self::row_to_evidence)
    }

    /// Delete an evidence item. Returns `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_evidence(&self, id: &str) -> Result<bool> {
        Ok(self.conn.execute("DELETE FROM evidence WHERE id = ?1", [id])? > 0)
    }

    /// Record a suspect on a case.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing fields, not-found if the case
    /// does not exist, or a database error.
    pub fn insert_suspect(&self, new_suspect: &NewSuspect) -> Result<Suspect> {
        new_suspect.validate()?;

        let suspect = Suspect {
            id: new_id(),
            case_id: new_suspect.case_id.clone(),
            first_name: new_suspect.first_name.trim().to_string(),
            last_name: new_suspect.last_name.trim().to_string(),
            alias: new_suspect.alias.clone(),
            status: new_suspect.status,
            description: new_suspect.description.clone(),
            last_known_address: new_suspect.last_known_address.clone(),
            created_at: Utc::now(),
        };

        self.conn
            .execute(
                &format!(
                    "INSERT INTO suspects ({SUSPECT_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    suspect.id,
                    suspect.case_id,
                    suspect.first_name,
                    suspect.last_name,
                    suspect.alias,
                    suspect.status.as_str(),
                    suspect.description,
                    suspect.last_known_address,
                    to_db_time(&suspect.created_at),
                ],
            )
            .map_err(|err| insert_error(err, &suspect.case_id))?;

        debug!("Recorded suspect {} on case {}", suspect.id, suspect.case_id);
        Ok(suspect)
    }

    /// Get a suspect by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_suspect(&self, id: &str) -> Result<Option<Suspect>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {SUSPECT_COLUMNS} FROM suspects WHERE id = ?1"),
                [id],
                Self::row_to_suspect,
            )
            .optional()?)
    }

    /// List suspects, newest first, optionally restricted to one case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_suspects(&self, case_id: Option<&str>) -> Result<Vec<Suspect>> {
        self.list_for_case("suspects", SUSPECT_COLUMNS, case_id, Self::row_to_suspect)
    }

    /// Delete a suspect. Returns `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_suspect(&self, id: &str) -> Result<bool> {
        Ok(self.conn.execute("DELETE FROM suspects WHERE id = ?1", [id])? > 0)
    }

    fn list_for_case<T>(
        &self,
        table: &str,
        columns: &str,
        case_id: Option<&str>,
        map_row: fn(&Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let (sql, args): (String, Vec<&dyn ToSql>) = match &case_id {
            Some(case_id) => (
                format!(
                    "SELECT {columns} FROM {table} WHERE case_id = ?1 ORDER BY created_at DESC, rowid DESC"
                ),
                vec![case_id as &dyn ToSql],
            ),
            None => (
                format!("SELECT {columns} FROM {table} ORDER BY created_at DESC, rowid DESC"),
                Vec::new(),
            ),
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(args.as_slice(), map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn row_to_victim(row: &Row) -> rusqlite::Result<Victim> {
        let created_at: String = row.get(9)?;
        Ok(Victim {
            id: row.get(0)?,
            case_id: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            age: row.get(4)?,
            gender: row.get(5)?,
            contact_info: row.get(6)?,
            address: row.get(7)?,
            statement: row.get(8)?,
            created_at: from_db_time(&created_at),
        })
    }

    fn row_to_evidence(row: &Row) -> rusqlite::Result<Evidence> {
        let evidence_type: String = row.get(4)?;
        let collected_at: Option<String> = row.get(7)?;
        let created_at: String = row.get(8)?;
        Ok(Evidence {
            id: row.get(0)?,
            case_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            evidence_type: parse_enum(&evidence_type, "evidence type"),
            location_found: row.get(5)?,
            collected_by: row.get(6)?,
            collected_at: collected_at.as_deref().map(from_db_time),
            created_at: from_db_time(&created_at),
        })
    }

    fn row_to_suspect(row: &Row) -> rusqlite::Result<Suspect> {
        let status: String = row.get(5)?;
        let created_at: String = row.get(8)?;
        Ok(Suspect {
            id: row.get(0)?,
            case_id: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            alias: row.get(4)?,
            status: parse_enum(&status, "suspect status"),
            description: row.get(6)?,
            last_known_address: row.get(7)?,
            created_at: from_db_time(&created_at),
        })
    }
}
