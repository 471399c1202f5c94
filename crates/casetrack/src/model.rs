//! Core record types for casetrack.
//!
//! Cases, the people and evidence attached to them, users, audit entries and
//! reports. All records are flat; relationships are plain id references.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Defines a closed set of string-valued states with a wire form and a
/// display label.
macro_rules! record_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, default = $default:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($wire:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored and serialized form.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            /// The human-readable form.
            #[must_use]
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim() {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(Error::validation(format!(
                        "unknown {}: {other}",
                        $kind
                    ))),
                }
            }
        }
    };
}

record_enum! {
    /// Lifecycle state of a case.
    CaseStatus, "case status", default = Open {
        /// Reported, not yet worked.
        Open => ("open", "Open"),
        /// Actively under investigation.
        InProgress => ("in_progress", "In Progress"),
        /// Investigation finished.
        Closed => ("closed", "Closed"),
        /// Kept for reference only.
        Archived => ("archived", "Archived"),
    }
}

record_enum! {
    /// How urgently a case needs attention.
    CasePriority, "case priority", default = Medium {
        /// Low priority.
        Low => ("low", "Low"),
        /// Medium priority.
        Medium => ("medium", "Medium"),
        /// High priority.
        High => ("high", "High"),
        /// Critical priority.
        Critical => ("critical", "Critical"),
    }
}

record_enum! {
    /// Category of a piece of evidence.
    EvidenceType, "evidence type", default = Physical {
        /// A physical object.
        Physical => ("physical", "Physical"),
        /// Files, devices, or other digital artifacts.
        Digital => ("digital", "Digital"),
        /// Paper records.
        Documentary => ("documentary", "Documentary"),
        /// Witness statements.
        Testimonial => ("testimonial", "Testimonial"),
        /// Lab results.
        Forensic => ("forensic", "Forensic"),
    }
}

record_enum! {
    /// Standing of a suspect within a case.
    SuspectStatus, "suspect status", default = PersonOfInterest {
        /// Named but not suspected.
        PersonOfInterest => ("person_of_interest", "Person of Interest"),
        /// Actively suspected.
        Suspect => ("suspect", "Suspect"),
        /// In custody.
        Arrested => ("arrested", "Arrested"),
        /// Formally charged.
        Charged => ("charged", "Charged"),
        /// Ruled out.
        Cleared => ("cleared", "Cleared"),
    }
}

record_enum! {
    /// Access level of a user.
    UserRole, "user role", default = Investigator {
        /// Full access, including user administration.
        Admin => ("admin", "Admin"),
        /// Reads and writes case records.
        Investigator => ("investigator", "Investigator"),
        /// Read-only access.
        Viewer => ("viewer", "Viewer"),
    }
}

record_enum! {
    /// Kind of a saved report.
    ReportType, "report type", default = Progress {
        /// First report on a case.
        Initial => ("initial", "Initial"),
        /// Interim update.
        Progress => ("progress", "Progress"),
        /// Closing report.
        Final => ("final", "Final"),
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

/// An investigation case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Unique identifier.
    pub id: String,
    /// Human-facing case number, unique across cases.
    pub case_number: String,
    /// Short title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Lifecycle state.
    pub status: CaseStatus,
    /// Urgency.
    pub priority: CasePriority,
    /// Where the incident happened.
    pub location: Option<String>,
    /// Id of the investigating user.
    pub assigned_to: Option<String>,
    /// Id of the user who opened the case.
    pub created_by: Option<String>,
    /// When the case was opened.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Case {
    /// Whether the case still needs work.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.status, CaseStatus::Open | CaseStatus::InProgress)
    }

    /// `"<case number>: <title>"`, as shown in pickers and lists.
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{}: {}", self.case_number, self.title)
    }
}

/// Payload for opening a case.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewCase {
    /// Human-facing case number.
    pub case_number: String,
    /// Short title.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Initial state.
    #[serde(default)]
    pub status: CaseStatus,
    /// Urgency.
    #[serde(default)]
    pub priority: CasePriority,
    /// Where the incident happened.
    #[serde(default)]
    pub location: Option<String>,
    /// Id of the investigating user.
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl NewCase {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first blank required field.
    pub fn validate(&self) -> Result<()> {
        require("case_number", &self.case_number)?;
        require("title", &self.title)
    }
}

/// Partial update of a case. Absent fields are left unchanged; a blank
/// `location` or `assigned_to` clears the value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New state.
    pub status: Option<CaseStatus>,
    /// New urgency.
    pub priority: Option<CasePriority>,
    /// New location.
    pub location: Option<String>,
    /// New assignee.
    pub assigned_to: Option<String>,
}

impl CaseUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the update to a case in place.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the update blanks the title.
    pub fn apply(&self, case: &mut Case) -> Result<()> {
        if let Some(title) = &self.title {
            require("title", title)?;
            case.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            case.description.clone_from(description);
        }
        if let Some(status) = self.status {
            case.status = status;
        }
        if let Some(priority) = self.priority {
            case.priority = priority;
        }
        if let Some(location) = &self.location {
            case.location = non_blank(location);
        }
        if let Some(assigned_to) = &self.assigned_to {
            case.assigned_to = non_blank(assigned_to);
        }
        Ok(())
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A victim attached to a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victim {
    /// Unique identifier.
    pub id: String,
    /// Owning case.
    pub case_id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Age in years, if known.
    pub age: Option<u32>,
    /// Gender, if recorded.
    pub gender: Option<String>,
    /// Phone or email.
    pub contact_info: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Recorded statement.
    pub statement: Option<String>,
    /// When the victim was recorded.
    pub created_at: DateTime<Utc>,
}

impl Victim {
    /// Given and family name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }
}

/// Payload for recording a victim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewVictim {
    /// Owning case.
    pub case_id: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Age in years.
    #[serde(default)]
    pub age: Option<u32>,
    /// Gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Phone or email.
    #[serde(default)]
    pub contact_info: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Recorded statement.
    #[serde(default)]
    pub statement: Option<String>,
}

impl NewVictim {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the case id or both names are blank.
    pub fn validate(&self) -> Result<()> {
        require("case_id", &self.case_id)?;
        if self.first_name.trim().is_empty() && self.last_name.trim().is_empty() {
            return Err(Error::validation("first_name or last_name is required"));
        }
        Ok(())
    }
}

/// A piece of evidence attached to a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Unique identifier.
    pub id: String,
    /// Owning case.
    pub case_id: String,
    /// Short name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Category.
    pub evidence_type: EvidenceType,
    /// Where it was found.
    pub location_found: Option<String>,
    /// Who collected it.
    pub collected_by: Option<String>,
    /// When it was collected.
    pub collected_at: Option<DateTime<Utc>>,
    /// When it was recorded.
    pub created_at: DateTime<Utc>,
}

/// Payload for recording evidence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewEvidence {
    /// Owning case.
    pub case_id: String,
    /// Short name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Category.
    #[serde(default)]
    pub evidence_type: EvidenceType,
    /// Where it was found.
    #[serde(default)]
    pub location_found: Option<String>,
    /// Who collected it.
    #[serde(default)]
    pub collected_by: Option<String>,
    /// When it was collected.
    #[serde(default)]
    pub collected_at: Option<DateTime<Utc>>,
}

impl NewEvidence {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first blank required field.
    pub fn validate(&self) -> Result<()> {
        require("case_id", &self.case_id)?;
        require("name", &self.name)
    }
}

/// A suspect attached to a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspect {
    /// Unique identifier.
    pub id: String,
    /// Owning case.
    pub case_id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Known alias.
    pub alias: Option<String>,
    /// Standing within the case.
    pub status: SuspectStatus,
    /// Physical description or notes.
    pub description: Option<String>,
    /// Last known address.
    pub last_known_address: Option<String>,
    /// When the suspect was recorded.
    pub created_at: DateTime<Utc>,
}

impl Suspect {
    /// Given and family name, followed by the alias in quotes when known.
    #[must_use]
    pub fn full_name(&self) -> String {
        let name = join_name(&self.first_name, &self.last_name);
        match &self.alias {
            Some(alias) => format!("{name} \"{alias}\""),
            None => name,
        }
    }
}

/// Payload for recording a suspect.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewSuspect {
    /// Owning case.
    pub case_id: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Known alias.
    #[serde(default)]
    pub alias: Option<String>,
    /// Standing within the case.
    #[serde(default)]
    pub status: SuspectStatus,
    /// Physical description or notes.
    #[serde(default)]
    pub description: Option<String>,
    /// Last known address.
    #[serde(default)]
    pub last_known_address: Option<String>,
}

impl NewSuspect {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the case id is blank or no name or
    /// alias is given.
    pub fn validate(&self) -> Result<()> {
        require("case_id", &self.case_id)?;
        let unnamed = self.first_name.trim().is_empty()
            && self.last_name.trim().is_empty()
            && self.alias.as_deref().map_or(true, |a| a.trim().is_empty());
        if unnamed {
            return Err(Error::validation("a name or alias is required"));
        }
        Ok(())
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Sign-in email, stored lowercase.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Access level.
    pub role: UserRole,
    /// Deactivated users cannot sign in.
    pub is_active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Given and family name, or the email when no name is set.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = join_name(&self.first_name, &self.last_name);
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }

    /// Whether this user may administer other users.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_active && self.role == UserRole::Admin
    }

    /// Whether this user may create or modify case records.
    #[must_use]
    pub fn can_write(&self) -> bool {
        self.is_active && self.role != UserRole::Viewer
    }
}

/// Payload for creating a user. The password travels separately.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewUser {
    /// Sign-in email.
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Access level.
    #[serde(default)]
    pub role: UserRole,
}

/// A recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLog {
    /// Sequence number.
    pub id: i64,
    /// Acting user, if known.
    pub user_id: Option<String>,
    /// Dotted action name, e.g. `case.created`.
    pub action: String,
    /// Kind of record acted on.
    pub entity_type: String,
    /// Id of the record acted on.
    pub entity_id: Option<String>,
    /// Free-form detail.
    pub details: Option<String>,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

/// An audit entry before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Acting user, if known.
    pub user_id: Option<String>,
    /// Dotted action name.
    pub action: String,
    /// Kind of record acted on.
    pub entity_type: String,
    /// Id of the record acted on.
    pub entity_id: Option<String>,
    /// Free-form detail.
    pub details: Option<String>,
}

impl AuditEvent {
    /// Start an event for `<entity_type>.<verb>`.
    #[must_use]
    pub fn new(entity_type: &str, verb: &str) -> Self {
        Self {
            user_id: None,
            action: format!("{entity_type}.{verb}"),
            entity_type: entity_type.to_string(),
            entity_id: None,
            details: None,
        }
    }

    /// Set the acting user.
    #[must_use]
    pub fn by(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the record acted on.
    #[must_use]
    pub fn on(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Attach detail text.
    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// A saved report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Unique identifier.
    pub id: String,
    /// Case the report is about.
    pub case_id: String,
    /// Title.
    pub title: String,
    /// Kind of report.
    pub report_type: ReportType,
    /// Body text.
    pub content: String,
    /// Author, if known.
    pub author_id: Option<String>,
    /// When it was saved.
    pub created_at: DateTime<Utc>,
}

/// Payload for saving a report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewReport {
    /// Case the report is about.
    pub case_id: String,
    /// Title.
    pub title: String,
    /// Kind of report.
    #[serde(default)]
    pub report_type: ReportType,
    /// Body text.
    #[serde(default)]
    pub content: String,
}

impl NewReport {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first blank required field.
    pub fn validate(&self) -> Result<()> {
        require("case_id", &self.case_id)?;
        require("title", &self.title)
    }
}

fn join_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

/// Create a fresh record id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_case() -> Case {
        let now = Utc::now();
        Case {
            id: new_id(),
            case_number: "CASE-001".to_string(),
            title: "Warehouse break-in".to_string(),
            description: String::new(),
            status: CaseStatus::Open,
            priority: CasePriority::High,
            location: None,
            assigned_to: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_enum_wire_and_label() {
        assert_eq!(CaseStatus::InProgress.as_str(), "in_progress");
        assert_eq!(CaseStatus::InProgress.label(), "In Progress");
        assert_eq!(SuspectStatus::PersonOfInterest.label(), "Person of Interest");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!(
            "in_progress".parse::<CaseStatus>().unwrap(),
            CaseStatus::InProgress
        );
        assert_eq!(" critical ".parse::<CasePriority>().unwrap(), CasePriority::Critical);
        let err = "urgent".parse::<CasePriority>().unwrap_err();
        assert_eq!(err.to_string(), "unknown case priority: urgent");
    }

    #[test]
    fn test_enum_serde_uses_wire_form() {
        let json = serde_json::to_string(&SuspectStatus::PersonOfInterest).unwrap();
        assert_eq!(json, "\"person_of_interest\"");
        let parsed: EvidenceType = serde_json::from_str("\"forensic\"").unwrap();
        assert_eq!(parsed, EvidenceType::Forensic);
    }

    #[test]
    fn test_enum_defaults() {
        assert_eq!(CaseStatus::default(), CaseStatus::Open);
        assert_eq!(CasePriority::default(), CasePriority::Medium);
        assert_eq!(UserRole::default(), UserRole::Investigator);
        assert_eq!(ReportType::default(), ReportType::Progress);
    }

    #[test]
    fn test_all_lists_every_variant() {
        assert_eq!(CaseStatus::ALL.len(), 4);
        assert_eq!(EvidenceType::ALL.len(), 5);
        for status in SuspectStatus::ALL {
            assert_eq!(status.as_str().parse::<SuspectStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_new_case_validate() {
        let mut new_case = NewCase {
            case_number: "CASE-1".to_string(),
            title: "Title".to_string(),
            ..NewCase::default()
        };
        assert!(new_case.validate().is_ok());

        new_case.title = "  ".to_string();
        assert_eq!(new_case.validate().unwrap_err().to_string(), "title is required");
    }

    #[test]
    fn test_new_case_deserialize_defaults() {
        let new_case: NewCase =
            serde_json::from_str(r#"{"case_number": "C-9", "title": "Fraud"}"#).unwrap();
        assert_eq!(new_case.status, CaseStatus::Open);
        assert_eq!(new_case.priority, CasePriority::Medium);
        assert!(new_case.description.is_empty());
    }

    #[test]
    fn test_case_update_apply() {
        let mut case = sample_case();
        case.location = Some("Dock 4".to_string());

        let update = CaseUpdate {
            status: Some(CaseStatus::Closed),
            location: Some(String::new()),
            assigned_to: Some("user-1".to_string()),
            ..CaseUpdate::default()
        };
        update.apply(&mut case).unwrap();

        assert_eq!(case.status, CaseStatus::Closed);
        assert!(case.location.is_none());
        assert_eq!(case.assigned_to.as_deref(), Some("user-1"));
        assert!(!case.is_active());
    }

    #[test]
    fn test_case_update_rejects_blank_title() {
        let mut case = sample_case();
        let update = CaseUpdate {
            title: Some(" ".to_string()),
            ..CaseUpdate::default()
        };
        assert!(update.apply(&mut case).is_err());
        assert_eq!(case.title, "Warehouse break-in");
    }

    #[test]
    fn test_case_update_is_empty() {
        assert!(CaseUpdate::default().is_empty());
        let update: CaseUpdate = serde_json::from_str(r#"{"priority": "low"}"#).unwrap();
        assert!(!update.is_empty());
    }

    #[test]
    fn test_case_display_label() {
        assert_eq!(sample_case().display_label(), "CASE-001: Warehouse break-in");
    }

    #[test]
    fn test_new_victim_requires_a_name() {
        let victim = NewVictim {
            case_id: "c".to_string(),
            ..NewVictim::default()
        };
        assert!(victim.validate().is_err());

        let victim = NewVictim {
            case_id: "c".to_string(),
            last_name: "Doe".to_string(),
            ..NewVictim::default()
        };
        assert!(victim.validate().is_ok());
    }

    #[test]
    fn test_new_suspect_accepts_alias_only() {
        let suspect = NewSuspect {
            case_id: "c".to_string(),
            alias: Some("Ghost".to_string()),
            ..NewSuspect::default()
        };
        assert!(suspect.validate().is_ok());
    }

    #[test]
    fn test_suspect_full_name_with_alias() {
        let suspect = Suspect {
            id: new_id(),
            case_id: "c".to_string(),
            first_name: "John".to_string(),
            last_name: "Roe".to_string(),
            alias: Some("Ghost".to_string()),
            status: SuspectStatus::Suspect,
            description: None,
            last_known_address: None,
            created_at: Utc::now(),
        };
        assert_eq!(suspect.full_name(), "John Roe \"Ghost\"");
    }

    #[test]
    fn test_user_permissions() {
        let mut user = User {
            id: new_id(),
            email: "a@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::Admin,
            is_active: true,
            created_at: Utc::now(),
        };
        assert!(user.is_admin());
        assert!(user.can_write());
        assert_eq!(user.display_name(), "a@example.com");

        user.is_active = false;
        assert!(!user.is_admin());

        user.is_active = true;
        user.role = UserRole::Viewer;
        assert!(!user.is_admin());
        assert!(!user.can_write());
    }

    #[test]
    fn test_audit_event_builder() {
        let event = AuditEvent::new("case", "created")
            .by("user-1")
            .on("case-1")
            .details("CASE-001");
        assert_eq!(event.action, "case.created");
        assert_eq!(event.entity_type, "case");
        assert_eq!(event.user_id.as_deref(), Some("user-1"));
        assert_eq!(event.entity_id.as_deref(), Some("case-1"));
    }

    #[test]
    fn test_new_id_is_unique() {
        assert_ne!(new_id(), new_id());
    }
}
