//! DevTeam CLI — entry point.
//!
//! # Commands
//!
//! - `devteam chat [-a AGENT] [-m MESSAGE] [-s SESSION] [-t TOPIC]` — talk to a team member
//! - `devteam sessions list|cleanup|show <ID>|clear` — inspect the session snapshot
//! - `devteam agents` — list the team
//! - `devteam status` — show configuration and snapshot status

mod helpers;
mod repl;
mod sessions_cmd;
mod status;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::sync::Mutex;
use tracing::info;

use devteam_agent::{find_persona, SharedSessions, TeamAgent, PERSONAS};
use devteam_core::config::{load_config, Config};
use devteam_core::session::SessionManager;
use devteam_core::types::ChatMessage;
use devteam_providers::{LlmProvider, OllamaProvider};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// DevTeam — a small team of AI colleagues with session memory
#[derive(Parser)]
#[command(name = "devteam", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with a team member (single-shot or interactive REPL)
    Chat {
        /// Team member key or name (frontend, backend, scrum)
        #[arg(short, long, default_value = "scrum")]
        agent: String,

        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Session identifier
        #[arg(short, long, default_value = "cli:default")]
        session: String,

        /// Conversation topic passed to the agent
        #[arg(short, long)]
        topic: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Inspect and maintain the session snapshot
    Sessions {
        #[command(subcommand)]
        action: sessions_cmd::SessionsCommands,
    },

    /// List the team members
    Agents,

    /// Show configuration and snapshot status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            agent,
            message,
            session,
            topic,
            logs,
        } => {
            init_logging(logs);
            run_chat(&agent, message, session, topic).await
        }
        Commands::Sessions { action } => {
            init_logging(false);
            sessions_cmd::dispatch(action)
        }
        Commands::Agents => {
            list_agents();
            Ok(())
        }
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(
    agent_key: &str,
    message: Option<String>,
    session_id: String,
    topic: Option<String>,
) -> Result<()> {
    let config = load_config(None);
    let snapshot_path = config.sessions.resolved_snapshot_path();
    let manager = if config.sessions.autosave {
        sessions_cmd::open_snapshot(&snapshot_path, config.sessions.options())?
    } else {
        SessionManager::load_with_defaults(&snapshot_path, config.sessions.options())
    };
    let sessions: SharedSessions = Arc::new(Mutex::new(manager));

    let provider: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::new(
        &config.provider,
        &config.agents.defaults.model,
    ));
    let agent = build_agent(&config, agent_key, provider.clone(), sessions.clone())?;

    match message {
        Some(msg) => {
            info!(session = %session_id, agent = agent.persona().name, "processing single message");
            helpers::print_thinking();
            let reply = agent
                .respond(&[ChatMessage::user(msg)], topic.as_deref(), Some(&session_id))
                .await;
            helpers::clear_thinking();
            helpers::print_response(agent.persona(), &reply);
        }
        None => {
            repl::run(agent, &config, provider, &session_id, topic).await?;
        }
    }

    if config.sessions.autosave {
        let sessions = sessions.lock().await;
        sessions
            .save(&snapshot_path)
            .with_context(|| format!("failed to save sessions to {}", snapshot_path.display()))?;
        info!(sessions = sessions.len(), "session snapshot saved");
    }

    Ok(())
}

/// Build a `TeamAgent` for `agent_key` from the loaded configuration.
pub fn build_agent(
    config: &Config,
    agent_key: &str,
    provider: Arc<dyn LlmProvider>,
    sessions: SharedSessions,
) -> Result<TeamAgent> {
    let persona = find_persona(agent_key).ok_or_else(|| {
        let known: Vec<&str> = PERSONAS.iter().map(|p| p.key).collect();
        anyhow!("unknown agent '{agent_key}' (known: {})", known.join(", "))
    })?;
    Ok(TeamAgent::from_config(
        persona,
        provider,
        sessions,
        &config.agents.defaults,
    ))
}

/// `devteam agents`
fn list_agents() {
    println!();
    println!("{}", "  The Team".cyan().bold());
    println!();
    println!(
        "  {:<10} {:<8} {:<20} {}",
        "Key".bold(),
        "Name".bold(),
        "Role".bold(),
        "Goal".bold(),
    );
    println!("  {}", "─".repeat(76));
    for persona in &PERSONAS {
        println!(
            "  {:<10} {:<8} {:<20} {}",
            persona.key,
            persona.name,
            persona.role,
            persona.goal.dimmed()
        );
    }
    println!();
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("devteam=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
