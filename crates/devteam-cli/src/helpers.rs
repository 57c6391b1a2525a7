//! Shared CLI helpers — response printing, banner, relative times.

use chrono::{DateTime, Utc};
use colored::Colorize;

use devteam_agent::Persona;

/// Print an agent response to stdout.
pub fn print_response(persona: &Persona, response: &str) {
    println!();
    println!("{}", persona.name.cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(persona: &Persona, session_id: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "DevTeam".cyan().bold(), version.dimmed());
    println!(
        "Talking to {} ({}) in session {}",
        persona.name.bold(),
        persona.role,
        session_id.dimmed()
    );
    println!(
        "{}",
        "Type a message, \"/agent <key>\" to switch, \"/topic <text>\" to set a topic, or \"exit\" to quit."
            .dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder while waiting for the model.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Format the time elapsed since `then` as a short age ("42s", "5m", "3h", "2d").
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_age_units() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::seconds(42), now), "42s");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5m");
        assert_eq!(format_age(now - Duration::hours(3), now), "3h");
        assert_eq!(format_age(now - Duration::days(2), now), "2d");
    }

    #[test]
    fn test_format_age_future_clamps() {
        let now = Utc::now();
        assert_eq!(format_age(now + Duration::minutes(1), now), "0s");
    }
}
