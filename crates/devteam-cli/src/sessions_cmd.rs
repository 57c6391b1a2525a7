//! `devteam sessions` — inspect and maintain the session snapshot.
//!
//! - `devteam sessions list` — list live sessions
//! - `devteam sessions cleanup` — rewrite the snapshot without expired sessions
//! - `devteam sessions show <ID> [--limit N]` — print a session's history and context
//! - `devteam sessions clear` — remove every session

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use tracing::warn;

use devteam_core::config::load_config;
use devteam_core::session::conversation::ttl_to_hours;
use devteam_core::session::{SessionManager, SessionOptions};
use devteam_core::utils::truncate_string;

use crate::helpers::format_age;

// ─────────────────────────────────────────────
// Subcommand enum
// ─────────────────────────────────────────────

/// Sessions subcommands.
#[derive(Subcommand)]
pub enum SessionsCommands {
    /// List live sessions, most recently active first
    List,

    /// Drop expired sessions from the snapshot
    Cleanup,

    /// Show one session's history and context
    Show {
        /// Session ID
        session_id: String,

        /// Only show the last N messages
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Remove every session from the snapshot
    Clear,
}

// ─────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────

/// Dispatch a sessions subcommand against the configured snapshot.
pub fn dispatch(cmd: SessionsCommands) -> Result<()> {
    let config = load_config(None);
    let path = config.sessions.resolved_snapshot_path();
    let options = config.sessions.options();

    match cmd {
        SessionsCommands::List => list_sessions(&path, options),
        SessionsCommands::Cleanup => {
            let kept = cleanup(&path, options)?;
            println!("  {} snapshot rewritten, {} live session(s) kept", "✓".green(), kept);
            Ok(())
        }
        SessionsCommands::Show { session_id, limit } => {
            show_session(&path, options, &session_id, limit)
        }
        SessionsCommands::Clear => {
            let removed = clear(&path, options)?;
            println!("  {} removed {} session(s)", "✓".green(), removed);
            Ok(())
        }
    }
}

// ─────────────────────────────────────────────
// Command implementations
// ─────────────────────────────────────────────

/// `devteam sessions list`
fn list_sessions(path: &Path, options: SessionOptions) -> Result<()> {
    let manager = SessionManager::load_with_defaults(path, options);
    let summaries = manager.summaries();

    if summaries.is_empty() {
        println!("  No live sessions in {}.", path.display());
        return Ok(());
    }

    println!();
    println!("{}", "  Sessions".cyan().bold());
    println!();
    println!(
        "  {:<36} {:<10} {:<10} {}",
        "ID".bold(),
        "Messages".bold(),
        "Created".bold(),
        "Last active".bold(),
    );
    println!("  {}", "─".repeat(72));

    let now = Utc::now();
    for summary in &summaries {
        println!(
            "  {:<36} {:<10} {:<10} {} ago",
            truncate_string(&summary.id, 36),
            summary.messages,
            format_age(summary.created_at, now),
            format_age(summary.last_accessed, now),
        );
    }

    println!();
    Ok(())
}

/// Open the snapshot for a command that will write it back.
///
/// An unreadable snapshot is moved to `<path>.bak` and an empty manager is
/// returned, so the following save cannot destroy its contents.
pub fn open_snapshot(path: &Path, options: SessionOptions) -> Result<SessionManager> {
    match SessionManager::try_load_with_defaults(path, options) {
        Ok(manager) => Ok(manager),
        Err(e) => {
            let backup = backup_path(path);
            std::fs::rename(path, &backup).with_context(|| {
                format!(
                    "session snapshot {} is unreadable ({e}) and could not be moved aside",
                    path.display()
                )
            })?;
            warn!(
                path = %path.display(),
                backup = %backup.display(),
                error = %e,
                "unreadable session snapshot moved aside"
            );
            eprintln!(
                "  {} unreadable snapshot moved to {}",
                "!".yellow(),
                backup.display()
            );
            Ok(SessionManager::with_defaults(options))
        }
    }
}

/// `sessions.json` → `sessions.json.bak`.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Load, sweep, and save. Returns the number of sessions kept.
///
/// Fails without touching the file when the snapshot cannot be read.
fn cleanup(path: &Path, options: SessionOptions) -> Result<usize> {
    let mut manager = SessionManager::try_load_with_defaults(path, options).with_context(|| {
        format!("refusing to rewrite unreadable snapshot {}", path.display())
    })?;
    manager.cleanup_expired();
    manager
        .save(path)
        .with_context(|| format!("failed to save sessions to {}", path.display()))?;
    Ok(manager.len())
}

/// `devteam sessions show <ID>`
fn show_session(
    path: &Path,
    options: SessionOptions,
    session_id: &str,
    limit: Option<usize>,
) -> Result<()> {
    let mut manager = SessionManager::load_with_defaults(path, options);
    let Some(session) = manager.get(session_id) else {
        bail!("session '{session_id}' not found or expired");
    };

    let now = Utc::now();
    println!();
    println!("{}", format!("  Session {}", session.id()).cyan().bold());
    println!(
        "  created {} ago | last active {} ago | max_history: {} | ttl: {}h",
        format_age(session.created_at(), now),
        format_age(session.last_accessed(), now),
        session.max_history(),
        ttl_to_hours(session.ttl()),
    );

    println!();
    println!("  {}", "History".bold());
    let history = session.recent_history(limit);
    if history.is_empty() {
        println!("    {}", "(empty)".dimmed());
    }
    for msg in history {
        println!(
            "    {} {:<9} {}",
            msg.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            msg.role.bold(),
            truncate_string(&msg.content, 120)
        );
    }

    println!();
    println!("  {}", "Context".bold());
    if session.context().is_empty() {
        println!("    {}", "(empty)".dimmed());
    }
    for (key, value) in session.context() {
        println!("    {:<16} {}", key, value);
    }

    println!();
    Ok(())
}

/// Replace the snapshot with an empty one. Returns the number of sessions removed.
///
/// An unreadable snapshot is kept as `<path>.bak`.
fn clear(path: &Path, options: SessionOptions) -> Result<usize> {
    let removed = open_snapshot(path, options)?.len();
    SessionManager::with_defaults(options)
        .save(path)
        .with_context(|| format!("failed to save sessions to {}", path.display()))?;
    Ok(removed)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
