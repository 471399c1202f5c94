//! `casetrack` - A case investigation management backend
//!
//! This library provides storage for cases, victims, evidence, suspects,
//! users and audit entries, session authentication, the HTTP API that
//! serves them, and the dashboard and report helpers built on top.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod functions;
pub mod logging;
pub mod model;
pub mod reports;
pub mod server;
pub mod storage;

pub use auth::AuthService;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use reports::ReportStore;
pub use server::{router, serve, AppState};
pub use storage::{RecordCounts, Storage};
