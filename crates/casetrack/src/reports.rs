//! Case reports: the downloadable text summary and saved reports.
//!
//! Saved reports live in a small JSON key-value file rather than the
//! database. The file holds a flat string map; reports are one JSON array
//! under [`REPORTS_KEY`].

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{new_id, Case, Evidence, NewReport, Report, Suspect, Victim};

/// Key under which saved reports are kept.
pub const REPORTS_KEY: &str = "casetrack.reports";

/// Render the plain-text report for a case and everything attached to it.
#[must_use]
pub fn render_case_report(
    case: &Case,
    victims: &[Victim],
    evidence: &[Evidence],
    suspects: &[Suspect],
    generated_by: &str,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    heading(&mut out, "CASE REPORT", '=');
    field(&mut out, "Case Number", &case.case_number);
    field(&mut out, "Title", &case.title);
    field(&mut out, "Status", case.status.label());
    field(&mut out, "Priority", case.priority.label());
    field(&mut out, "Location", case.location.as_deref().unwrap_or("N/A"));
    field(&mut out, "Opened", &format_time(case.created_at));
    field(&mut out, "Last Updated", &format_time(case.updated_at));
    out.push('\n');
    out.push_str("Description:\n");
    out.push_str(if case.description.trim().is_empty() {
        "No description provided."
    } else {
        case.description.trim()
    });
    out.push_str("\n\n");

    heading(&mut out, &format!("VICTIMS ({})", victims.len()), '-');
    if victims.is_empty() {
        out.push_str("None recorded.\n");
    }
    for (i, victim) in victims.iter().enumerate() {
        let _ = write!(out, "{}. {}", i + 1, victim.full_name());
        if let Some(age) = victim.age {
            let _ = write!(out, ", age {age}");
        }
        out.push('\n');
        detail(&mut out, "Gender", victim.gender.as_deref());
        detail(&mut out, "Contact", victim.contact_info.as_deref());
        detail(&mut out, "Address", victim.address.as_deref());
        detail(&mut out, "Statement", victim.statement.as_deref());
    }
    out.push('\n');

    heading(&mut out, &format!("EVIDENCE ({})", evidence.len()), '-');
    if evidence.is_empty() {
        out.push_str("None recorded.\n");
    }
    for (i, item) in evidence.iter().enumerate() {
        let _ = writeln!(out, "{}. {} [{}]", i + 1, item.name, item.evidence_type.label());
        detail(&mut out, "Description", Some(item.description.as_str()));
        detail(&mut out, "Found at", item.location_found.as_deref());
        detail(&mut out, "Collected by", item.collected_by.as_deref());
        detail(
            &mut out,
            "Collected at",
            item.collected_at.map(format_time).as_deref(),
        );
    }
    out.push('\n');

    heading(&mut out, &format!("SUSPECTS ({})", suspects.len()), '-');
    if suspects.is_empty() {
        out.push_str("None recorded.\n");
    }
    for (i, suspect) in suspects.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} [{}]",
            i + 1,
            suspect.full_name(),
            suspect.status.label()
        );
        detail(&mut out, "Description", suspect.description.as_deref());
        detail(
            &mut out,
            "Last known address",
            suspect.last_known_address.as_deref(),
        );
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "Generated by {} on {}",
        generated_by,
        format_time(now)
    );
    out
}

/// File name offered for a case report download.
///
/// Characters that are unsafe in file names are replaced with `-`.
#[must_use]
pub fn report_filename(case: &Case) -> String {
    let number: String = case
        .case_number
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("case-report-{number}.txt")
}

fn heading(out: &mut String, title: &str, underline: char) {
    out.push_str(title);
    out.push('\n');
    out.extend(std::iter::repeat(underline).take(title.chars().count()));
    out.push_str("\n\n");
}

fn field(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "{name}: {value}");
}

fn detail(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "   {name}: {value}");
    }
}

fn format_time(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// A string key-value map persisted as a JSON object in one file.
///
/// Every mutation rewrites the whole file through a temporary file and a
/// rename, so readers never see a half-written map.
#[derive(Debug)]
pub struct KeyValueStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl KeyValueStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };
        debug!("Opened key-value store at {}", path.display());
        Ok(Self { path, entries })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a value and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let mut entries = self.entries.clone();
        entries.insert(key.into(), value.into());
        self.replace_entries(entries)
    }

    /// Remove a value and persist. Returns `false` if the key was absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        if !self.entries.contains_key(key) {
            return Ok(false);
        }
        let mut entries = self.entries.clone();
        entries.remove(key);
        self.replace_entries(entries)?;
        Ok(true)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Write `entries` to disk, then adopt them. The in-memory map is left
    /// untouched when the write fails.
    fn replace_entries(&mut self, entries: BTreeMap<String, String>) -> Result<()> {
        self.persist(&entries)?;
        self.entries = entries;
        Ok(())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|source| Error::DirectoryCreate {
                path: dir.clone(),
                source,
            })?;
        }

        let mut temp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(temp.as_file_mut(), entries)?;
        temp.as_file_mut().write_all(b"\n")?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| Error::Io(err.error))?;
        Ok(())
    }
}

/// Saved reports on top of a [`KeyValueStore`].
#[derive(Debug)]
pub struct ReportStore {
    store: KeyValueStore,
}

impl ReportStore {
    /// Open the report store backed by the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = KeyValueStore::open(path)?;
        for key in store.keys().filter(|key| *key != REPORTS_KEY) {
            debug!("Leaving unrelated local storage key {} in place", key);
        }
        Ok(Self { store })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// List saved reports, newest first, optionally for one case.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored reports cannot be parsed.
    pub fn list(&self, case_id: Option<&str>) -> Result<Vec<Report>> {
        let mut reports = self.load()?;
        if let Some(case_id) = case_id {
            reports.retain(|report| report.case_id == case_id);
        }
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    /// Save a new report.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank required fields, or an error if
    /// the store cannot be read or written.
    pub fn save(&mut self, new_report: &NewReport, author_id: Option<&str>) -> Result<Report> {
        new_report.validate()?;

        let report = Report {
            id: new_id(),
            case_id: new_report.case_id.trim().to_string(),
            title: new_report.title.trim().to_string(),
            report_type: new_report.report_type,
            content: new_report.content.clone(),
            author_id: author_id.map(str::to_string),
            created_at: Utc::now(),
        };

        let mut reports = self.load()?;
        reports.push(report.clone());
        self.replace_all(&reports)?;

        info!("Saved report {} for case {}", report.id, report.case_id);
        Ok(report)
    }

    /// Delete a report. Returns `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let mut reports = self.load()?;
        let before = reports.len();
        reports.retain(|report| report.id != id);
        if reports.len() == before {
            return Ok(false);
        }
        self.replace_all(&reports)?;
        debug!("Deleted report {}", id);
        Ok(true)
    }

    /// Delete every report saved for a case. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn delete_for_case(&mut self, case_id: &str) -> Result<usize> {
        let mut reports = self.load()?;
        let before = reports.len();
        reports.retain(|report| report.case_id != case_id);
        let removed = before - reports.len();
        if removed > 0 {
            self.replace_all(&reports)?;
            debug!("Deleted {} saved reports for case {}", removed, case_id);
        }
        Ok(removed)
    }

    fn load(&self) -> Result<Vec<Report>> {
        match self.store.get(REPORTS_KEY) {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn replace_all(&mut self, reports: &[Report]) -> Result<()> {
        let raw = serde_json::to_string(reports)?;
        self.store.set(REPORTS_KEY, raw)
    }
}
