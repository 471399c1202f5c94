//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::{CasePriority, CaseStatus, UserRole};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Listen on this address instead of the configured one
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,
}

/// User management commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user directly in the database
    Create {
        /// Email address (used to sign in)
        #[arg(long)]
        email: String,

        /// Initial password
        #[arg(long)]
        password: String,

        /// Given name
        #[arg(long, default_value = "")]
        first_name: String,

        /// Family name
        #[arg(long, default_value = "")]
        last_name: String,

        /// Role of the new user
        #[arg(long, value_enum, default_value = "investigator")]
        role: RoleArg,
    },

    /// List all users
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Case commands.
#[derive(Debug, Subcommand)]
pub enum CaseCommand {
    /// List cases, newest first
    List(CaseListCommand),

    /// List victims, evidence and suspects with their case
    Records(CaseRecordsCommand),
}

/// Case list arguments.
#[derive(Debug, Args)]
pub struct CaseListCommand {
    /// Only cases with this status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Only cases with this priority
    #[arg(short, long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// Free-text search over number, title, description and location
    #[arg(long)]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Case records arguments.
#[derive(Debug, Args)]
pub struct CaseRecordsCommand {
    /// Only records attached to this case id
    #[arg(long = "case", value_name = "CASE_ID")]
    pub case_id: Option<String>,

    /// Free-text search over names, descriptions and contact details
    #[arg(long)]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Report command arguments.
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Id of the case to report on
    pub case_id: String,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Case status argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Reported, not yet worked
    Open,
    /// Under investigation
    InProgress,
    /// Finished
    Closed,
    /// Kept for reference
    Archived,
}

impl From<StatusArg> for CaseStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Open => Self::Open,
            StatusArg::InProgress => Self::InProgress,
            StatusArg::Closed => Self::Closed,
            StatusArg::Archived => Self::Archived,
        }
    }
}

/// Case priority argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    /// Low
    Low,
    /// Medium
    Medium,
    /// High
    High,
    /// Critical
    Critical,
}

impl From<PriorityArg> for CasePriority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Self::Low,
            PriorityArg::Medium => Self::Medium,
            PriorityArg::High => Self::High,
            PriorityArg::Critical => Self::Critical,
        }
    }
}

/// User role argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Full access, including user administration
    Admin,
    /// Reads and writes case records
    Investigator,
    /// Read-only access
    Viewer,
}

impl From<RoleArg> for UserRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Self::Admin,
            RoleArg::Investigator => Self::Investigator,
            RoleArg::Viewer => Self::Viewer,
        }
    }
}
