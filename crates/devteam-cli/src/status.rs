//! `devteam status` — show configuration, provider, and snapshot status.

use anyhow::Result;
use colored::Colorize;

use devteam_core::config::{get_config_path, load_config};
use devteam_core::session::SessionManager;

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "DevTeam Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found_marker(config_path.exists())
    );

    // Provider
    println!("  {:<18} {}", "Provider:".bold(), config.provider.api_base);
    let key_status = if config.provider.has_api_key() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· none".dimmed())
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);

    // Model
    let defaults = &config.agents.defaults;
    println!("  {:<18} {}", "Model:".bold(), defaults.model);
    println!(
        "  {:<18} {} | max_tokens: {} | history: {}",
        "Parameters:".bold(),
        format!("temp: {}", defaults.temperature).dimmed(),
        format!("{}", defaults.max_tokens).dimmed(),
        format!("{}", defaults.history_window).dimmed(),
    );
    println!("  {:<18} {}", "Language:".bold(), defaults.language);

    // Sessions
    println!();
    let snapshot_path = config.sessions.resolved_snapshot_path();
    println!(
        "  {:<18} {} {}",
        "Snapshot:".bold(),
        snapshot_path.display(),
        found_marker(snapshot_path.exists())
    );
    let manager = SessionManager::load_with_defaults(&snapshot_path, config.sessions.options());
    println!(
        "  {:<18} {} live | max_history: {} | ttl: {}h | autosave: {}",
        "Sessions:".bold(),
        manager.len(),
        config.sessions.max_history,
        config.sessions.ttl_hours,
        config.sessions.autosave,
    );

    println!();

    Ok(())
}

fn found_marker(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}
