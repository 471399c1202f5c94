//! `casetrack` - CLI for the case-tracking backend
//!
//! This binary serves the HTTP API and provides operator commands that work
//! directly against the configured database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;

use casetrack::auth::{hash_password, validate_new_user};
use casetrack::cli::{
    CaseCommand, CaseListCommand, CaseRecordsCommand, Cli, Command, ConfigCommand, UserCommand,
};
use casetrack::dashboard::{record_rows, Badge, CaseFilter, DashboardStats, ToBadge};
use casetrack::model::{AuditEvent, NewUser};
use casetrack::reports::{render_case_report, report_filename};
use casetrack::{init_logging, Config, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Execute the command
    match cli.command {
        Command::Serve(serve_cmd) => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime
                .block_on(casetrack::serve(&config, serve_cmd.bind))
                .context("server failed")
        }
        Command::User(user_cmd) => handle_user(&config, user_cmd),
        Command::Case(CaseCommand::List(list_cmd)) => handle_case_list(&config, &list_cmd),
        Command::Case(CaseCommand::Records(records_cmd)) => {
            handle_case_records(&config, &records_cmd)
        }
        Command::Report(report_cmd) => {
            handle_report(&config, &report_cmd.case_id, report_cmd.output)
        }
        Command::Stats(stats_cmd) => handle_stats(&config, stats_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("failed to open {}", path.display()))
}

/// Leading marker for badges that call for attention.
fn alert_marker(badge: &Badge) -> &'static str {
    if badge.is_alert() {
        "!"
    } else {
        " "
    }
}

fn handle_user(config: &Config, cmd: UserCommand) -> anyhow::Result<()> {
    let mut storage = open_storage(config)?;
    match cmd {
        UserCommand::Create {
            email,
            password,
            first_name,
            last_name,
            role,
        } => {
            validate_new_user(&email, &password, config.auth.min_password_length)?;
            let new_user = NewUser {
                email,
                first_name,
                last_name,
                role: role.into(),
            };
            let user = storage.create_user_audited(&new_user, &hash_password(&password), |user| {
                AuditEvent::new("user", "created")
                    .on(&user.id)
                    .details(format!("role={}, via cli", user.role))
            })?;
            println!("Created {} {} ({})", user.role.label(), user.email, user.id);
        }
        UserCommand::List { json } => {
            let users = storage.list_users()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else if users.is_empty() {
                println!("No users.");
            } else {
                for user in users {
                    println!(
                        "{:<36}  {:<32}  {:<12}  {}",
                        user.id,
                        user.email,
                        user.role.badge(),
                        if user.is_active { "active" } else { "inactive" }
                    );
                }
            }
        }
    }
    Ok(())
}

fn handle_case_list(config: &Config, cmd: &CaseListCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let filter = CaseFilter {
        query: cmd.search.clone().unwrap_or_default(),
        status: cmd.status.map(Into::into),
        priority: cmd.priority.map(Into::into),
    };
    let cases = filter.apply(storage.list_cases(None)?);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&cases)?);
        return Ok(());
    }
    if cases.is_empty() {
        println!("No matching cases.");
        return Ok(());
    }
    for case in &cases {
        let priority = case.priority.badge();
        println!(
            "{}{:<14}  {:<12}  {:<9}  {}",
            alert_marker(&priority),
            case.case_number,
            case.status.badge(),
            priority,
            case.title
        );
    }
    println!();
    println!("{} case(s)", cases.len());
    Ok(())
}

fn handle_case_records(config: &Config, cmd: &CaseRecordsCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let case_id = cmd.case_id.as_deref();
    let rows = record_rows(
        &storage.list_cases(None)?,
        &storage.list_victims(case_id)?,
        &storage.list_evidence(case_id)?,
        &storage.list_suspects(case_id)?,
        cmd.search.as_deref().unwrap_or_default(),
    );

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No matching records.");
        return Ok(());
    }
    for row in &rows {
        let (marker, badge) = match &row.badge {
            Some(badge) => (alert_marker(badge), badge.label),
            None => (" ", ""),
        };
        println!(
            "{marker}{:<9}  {:<28}  {:<18}  {}",
            row.kind.label(),
            row.name,
            badge,
            row.case_label
        );
    }
    println!();
    println!("{} record(s)", rows.len());
    Ok(())
}

fn handle_report(
    config: &Config,
    case_id: &str,
    output: Option<std::path::PathBuf>,
) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let Some(case) = storage.get_case(case_id)? else {
        bail!("case not found: {case_id}");
    };
    let report = render_case_report(
        &case,
        &storage.list_victims(Some(case_id))?,
        &storage.list_evidence(Some(case_id))?,
        &storage.list_suspects(Some(case_id))?,
        "casetrack CLI",
        Utc::now(),
    );

    match output {
        Some(path) => {
            fs::write(&path, report)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => {
            eprintln!("# {}", report_filename(&case));
            print!("{report}");
        }
    }
    Ok(())
}

fn handle_stats(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = DashboardStats::collect(&storage)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("casetrack statistics");
    println!("--------------------");
    for card in stats.cards() {
        println!("{:<15} {:>6}  {}", card.title, card.value, card.description);
    }
    println!("{:<15} {:>6}", "Users", stats.counts.users);
    if !stats.recent_cases.is_empty() {
        println!();
        println!("Recent cases:");
        for case in &stats.recent_cases {
            println!("  {}", case.display_label());
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                let mut shown = config.clone();
                if shown.auth.service_key.is_some() {
                    shown.auth.service_key = Some("********".to_string());
                }
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind_address);
                println!("  CORS origin:        {}", config.server.cors_allow_origin);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Reports path:       {}", config.reports_path().display());
                println!(
                    "  Audit retention:    {}",
                    match config.storage.audit_retention_days {
                        0 => "keep forever".to_string(),
                        days => format!("{days} days"),
                    }
                );
                println!();
                println!("[Auth]");
                println!(
                    "  Service key:        {}",
                    if config.auth.service_key.is_some() {
                        "set"
                    } else {
                        "not set"
                    }
                );
                println!("  Session TTL (h):    {}", config.auth.session_ttl_hours);
                println!("  Min password len:   {}", config.auth.min_password_length);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
