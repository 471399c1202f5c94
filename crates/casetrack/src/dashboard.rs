//! Dashboard statistics, badges and in-memory list filtering.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    Case, CasePriority, CaseStatus, Evidence, EvidenceType, Suspect, SuspectStatus, User,
    UserRole, Victim,
};
use crate::storage::{RecordCounts, Storage};

/// Number of cases shown under "recent cases".
pub const RECENT_CASES: usize = 5;

/// Label used when a record points at a case that is not in the list.
pub const UNKNOWN_CASE: &str = "Unknown case";

/// Everything the dashboard overview shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Record totals.
    #[serde(flatten)]
    pub counts: RecordCounts,
    /// The most recently opened cases, newest first.
    pub recent_cases: Vec<Case>,
}

impl DashboardStats {
    /// Collect statistics from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn collect(storage: &Storage) -> Result<Self> {
        Ok(Self {
            counts: storage.counts()?,
            recent_cases: storage.list_cases(Some(RECENT_CASES))?,
        })
    }

    /// The stat cards across the top of the overview.
    #[must_use]
    pub fn cards(&self) -> Vec<StatCard> {
        let c = &self.counts;
        vec![
            StatCard::new("Total Cases", c.cases, format!("{} open", c.open_cases)),
            StatCard::new(
                "High Priority",
                c.high_priority_cases,
                "High and critical cases",
            ),
            StatCard::new("Closed Cases", c.closed_cases, "Closed or archived"),
            StatCard::new("Victims", c.victims, "Recorded victims"),
            StatCard::new("Evidence", c.evidence, "Items logged"),
            StatCard::new("Suspects", c.suspects, "Persons tracked"),
        ]
    }
}

/// A headline number with a caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    /// Card heading.
    pub title: String,
    /// The number.
    pub value: u64,
    /// Caption under the number.
    pub description: String,
}

impl StatCard {
    fn new(title: &str, value: u64, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            value,
            description: description.into(),
        }
    }
}

/// Visual style of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    /// Primary color.
    Default,
    /// Muted.
    Secondary,
    /// Red.
    Destructive,
    /// Border only.
    Outline,
    /// Green.
    Success,
    /// Amber.
    Warning,
}

/// A short colored label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    /// Text on the badge.
    pub label: &'static str,
    /// Style.
    pub variant: BadgeVariant,
}

impl Badge {
    /// Whether the badge calls for attention.
    #[must_use]
    pub fn is_alert(&self) -> bool {
        matches!(self.variant, BadgeVariant::Destructive | BadgeVariant::Warning)
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label)
    }
}

/// Anything that can be shown as a badge.
pub trait ToBadge {
    /// Build the badge.
    fn badge(&self) -> Badge;
}

impl ToBadge for CaseStatus {
    fn badge(&self) -> Badge {
        let variant = match self {
            Self::Open => BadgeVariant::Default,
            Self::InProgress => BadgeVariant::Warning,
            Self::Closed => BadgeVariant::Success,
            Self::Archived => BadgeVariant::Secondary,
        };
        Badge {
            label: self.label(),
            variant,
        }
    }
}

impl ToBadge for CasePriority {
    fn badge(&self) -> Badge {
        let variant = match self {
            Self::Low => BadgeVariant::Outline,
            Self::Medium => BadgeVariant::Secondary,
            Self::High => BadgeVariant::Warning,
            Self::Critical => BadgeVariant::Destructive,
        };
        Badge {
            label: self.label(),
            variant,
        }
    }
}

impl ToBadge for SuspectStatus {
    fn badge(&self) -> Badge {
        let variant = match self {
            Self::PersonOfInterest => BadgeVariant::Outline,
            Self::Suspect => BadgeVariant::Warning,
            Self::Arrested | Self::Charged => BadgeVariant::Destructive,
            Self::Cleared => BadgeVariant::Success,
        };
        Badge {
            label: self.label(),
            variant,
        }
    }
}

impl ToBadge for EvidenceType {
    fn badge(&self) -> Badge {
        Badge {
            label: self.label(),
            variant: BadgeVariant::Outline,
        }
    }
}

impl ToBadge for UserRole {
    fn badge(&self) -> Badge {
        let variant = match self {
            Self::Admin => BadgeVariant::Destructive,
            Self::Investigator => BadgeVariant::Default,
            Self::Viewer => BadgeVariant::Secondary,
        };
        Badge {
            label: self.label(),
            variant,
        }
    }
}

/// Records that can be matched against a free-text search.
pub trait Searchable {
    /// The text fields a search looks at.
    fn search_fields(&self) -> Vec<&str>;

    /// Whether any field contains `needle`, which must already be lowercase.
    fn matches_query(&self, needle: &str) -> bool {
        needle.is_empty()
            || self
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle))
    }
}

impl<T: Searchable + ?Sized> Searchable for &T {
    fn search_fields(&self) -> Vec<&str> {
        (**self).search_fields()
    }
}

impl Searchable for Case {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.case_number.as_str(),
            self.title.as_str(),
            self.description.as_str(),
        ];
        fields.extend(self.location.as_deref());
        fields
    }
}

impl Searchable for Victim {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.first_name.as_str(), self.last_name.as_str()];
        fields.extend(self.contact_info.as_deref());
        fields
    }
}

impl Searchable for Evidence {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.location_found.as_deref());
        fields
    }
}

impl Searchable for Suspect {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.first_name.as_str(), self.last_name.as_str()];
        fields.extend(self.alias.as_deref());
        fields
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.email.as_str(),
            self.first_name.as_str(),
            self.last_name.as_str(),
        ]
    }
}

/// Keep the records matching `query`, case-insensitively. An empty or
/// blank query keeps everything.
///
/// Works over owned records or references, preserving order.
#[must_use]
pub fn filter_by_query<I>(records: I, query: &str) -> Vec<I::Item>
where
    I: IntoIterator,
    I::Item: Searchable,
{
    let needle = query.trim().to_lowercase();
    records
        .into_iter()
        .filter(|record| record.matches_query(&needle))
        .collect()
}

/// Filter for the case list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CaseFilter {
    /// Free-text search.
    #[serde(rename = "q")]
    pub query: String,
    /// Only this status.
    pub status: Option<CaseStatus>,
    /// Only this priority.
    pub priority: Option<CasePriority>,
}

impl CaseFilter {
    fn matches_facets(&self, case: &Case) -> bool {
        self.status.map_or(true, |s| case.status == s)
            && self.priority.map_or(true, |p| case.priority == p)
    }

    /// Keep the matching cases, preserving order.
    #[must_use]
    pub fn apply(&self, cases: Vec<Case>) -> Vec<Case> {
        filter_by_query(
            cases.into_iter().filter(|case| self.matches_facets(case)),
            &self.query,
        )
    }
}

/// Resolve a case id to its display label.
#[must_use]
pub fn case_label_for(case_id: &str, cases: &[Case]) -> String {
    cases
        .iter()
        .find(|case| case.id == case_id)
        .map_or_else(|| UNKNOWN_CASE.to_string(), Case::display_label)
}

/// Kind of record attached to a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A victim.
    Victim,
    /// An item of evidence.
    Evidence,
    /// A suspect.
    Suspect,
}

impl RecordKind {
    /// Human-readable name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Victim => "Victim",
            Self::Evidence => "Evidence",
            Self::Suspect => "Suspect",
        }
    }
}

/// One line of a cross-case record listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRow {
    /// Record id.
    pub id: String,
    /// What the record is.
    pub kind: RecordKind,
    /// Person or item name.
    pub name: String,
    /// Evidence type or suspect status; victims have none.
    pub badge: Option<Badge>,
    /// Label of the owning case.
    pub case_label: String,
}

/// Flatten victims, evidence and suspects into labelled rows, keeping only
/// the records matching `query`.
#[must_use]
pub fn record_rows(
    cases: &[Case],
    victims: &[Victim],
    evidence: &[Evidence],
    suspects: &[Suspect],
    query: &str,
) -> Vec<RecordRow> {
    let mut rows = Vec::new();
    for victim in filter_by_query(victims, query) {
        rows.push(RecordRow {
            id: victim.id.clone(),
            kind: RecordKind::Victim,
            name: victim.full_name(),
            badge: None,
            case_label: case_label_for(&victim.case_id, cases),
        });
    }
    for item in filter_by_query(evidence, query) {
        rows.push(RecordRow {
            id: item.id.clone(),
            kind: RecordKind::Evidence,
            name: item.name.clone(),
            badge: Some(item.evidence_type.badge()),
            case_label: case_label_for(&item.case_id, cases),
        });
    }
    for suspect in filter_by_query(suspects, query) {
        rows.push(RecordRow {
            id: suspect.id.clone(),
            kind: RecordKind::Suspect,
            name: suspect.full_name(),
            badge: Some(suspect.status.badge()),
            case_label: case_label_for(&suspect.case_id, cases),
        });
    }
    rows
}
