//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.

use std::sync::Arc;

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use devteam_agent::TeamAgent;
use devteam_core::config::Config;
use devteam_core::types::ChatMessage;
use devteam_providers::LlmProvider;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// A line of REPL input.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Exit,
    /// `/agent <key>` — switch team member.
    SwitchAgent(&'a str),
    /// `/topic <text>` — set the topic; `/topic` alone clears it.
    Topic(Option<&'a str>),
    Message(&'a str),
}

/// Run the interactive REPL loop.
pub async fn run(
    mut agent: TeamAgent,
    config: &Config,
    provider: Arc<dyn LlmProvider>,
    session_id: &str,
    mut topic: Option<String>,
) -> Result<()> {
    helpers::print_banner(agent.persona(), session_id);

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&input);

        match parse_input(trimmed) {
            Input::Exit => {
                println!("\nGoodbye!");
                break;
            }
            Input::SwitchAgent(key) => {
                match crate::build_agent(config, key, provider.clone(), agent.sessions().clone()) {
                    Ok(next) => {
                        agent = next;
                        println!(
                            "\nNow talking to {} ({}).\n",
                            agent.persona().name,
                            agent.persona().role
                        );
                    }
                    Err(e) => eprintln!("\n{e}\n"),
                }
            }
            Input::Topic(new_topic) => {
                topic = new_topic.map(String::from);
                println!("\nTopic: {}\n", topic.as_deref().unwrap_or("not specified"));
            }
            Input::Message(text) => {
                debug!(session = session_id, input = text, "processing input");
                helpers::print_thinking();
                let reply = agent
                    .respond(&[ChatMessage::user(text)], topic.as_deref(), Some(session_id))
                    .await;
                helpers::clear_thinking();
                helpers::print_response(agent.persona(), &reply);
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

fn parse_input(line: &str) -> Input<'_> {
    if is_exit_command(line) {
        return Input::Exit;
    }
    if let Some(rest) = strip_command(line, "/agent") {
        if !rest.is_empty() {
            return Input::SwitchAgent(rest);
        }
    }
    if let Some(rest) = strip_command(line, "/topic") {
        return Input::Topic((!rest.is_empty()).then_some(rest));
    }
    Input::Message(line)
}

/// Strip a `/command` prefix followed by whitespace or end of line.
fn strip_command<'a>(line: &'a str, command: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(command)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    devteam_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("/quit"));
        assert!(is_exit_command(":q"));
        assert!(!is_exit_command("hello"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn test_parse_agent_switch() {
        assert_eq!(parse_input("/agent backend"), Input::SwitchAgent("backend"));
        assert_eq!(parse_input("/agent   Sarah "), Input::SwitchAgent("Sarah"));
        // No key: sent as a normal message
        assert_eq!(parse_input("/agent"), Input::Message("/agent"));
        assert_eq!(parse_input("/agents"), Input::Message("/agents"));
    }

    #[test]
    fn test_parse_topic() {
        assert_eq!(parse_input("/topic sprint planning"), Input::Topic(Some("sprint planning")));
        assert_eq!(parse_input("/topic"), Input::Topic(None));
    }

    #[test]
    fn test_parse_message() {
        assert_eq!(parse_input("How is the API?"), Input::Message("How is the API?"));
        assert_eq!(parse_input("quit"), Input::Exit);
    }

    #[test]
    fn test_history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".devteam"));
        assert!(path.to_string_lossy().contains("cli_history"));
    }
}
