//! Command-line interface for casetrack.
//!
//! This module provides the CLI structure and command handlers for the
//! `casetrack` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CaseCommand, CaseListCommand, CaseRecordsCommand, ConfigCommand, PriorityArg, ReportCommand,
    RoleArg, ServeCommand, StatsCommand, StatusArg, UserCommand,
};

/// casetrack - Case investigation management backend
///
/// Serves the case-tracking API and offers operator commands for users,
/// cases, reports and statistics.
#[derive(Debug, Parser)]
#[command(name = "casetrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeCommand),

    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Inspect cases
    #[command(subcommand)]
    Case(CaseCommand),

    /// Render the text report for a case
    Report(ReportCommand),

    /// Show dashboard statistics
    Stats(StatsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
