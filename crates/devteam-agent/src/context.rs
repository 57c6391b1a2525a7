//! Context builder — system prompts and the message list for an LLM call.

use devteam_core::session::HistoryMessage;
use devteam_core::types::ChatMessage;

use crate::persona::Persona;

/// Builds persona-specific system prompts and LLM message lists.
#[derive(Clone, Debug)]
pub struct ContextBuilder {
    persona: &'static Persona,
    /// Language the persona answers in.
    language: String,
}

impl ContextBuilder {
    pub fn new(persona: &'static Persona, language: impl Into<String>) -> Self {
        Self {
            persona,
            language: language.into(),
        }
    }

    pub fn persona(&self) -> &'static Persona {
        self.persona
    }

    // ────────────── System prompt ──────────────

    /// Generic prompt: identity plus the persona's goal.
    pub fn build_system_prompt(&self) -> String {
        format!("{}\nYour goal is: {}", self.build_identity(), self.persona.goal)
    }

    /// Prompt for a team conversation: identity, specialty lines, and the
    /// current topic.
    pub fn build_topic_prompt(&self, topic: Option<&str>) -> String {
        let mut prompt = self.build_identity();
        for line in self.persona.focus {
            prompt.push('\n');
            prompt.push_str(line);
        }
        prompt.push_str(&format!(
            "\nCurrent topic: {}",
            topic.unwrap_or("not specified")
        ));
        prompt
    }

    /// Core identity block.
    fn build_identity(&self) -> String {
        format!(
            "You are {name}, a {role}. {backstory}\n\
             You always answer in {language}, unless asked otherwise.",
            name = self.persona.name,
            role = self.persona.role,
            backstory = self.persona.backstory,
            language = self.language,
        )
    }

    // ────────────── Message building ──────────────

    /// Build the full message list for an LLM call: system prompt, then history.
    pub fn build_messages(system_prompt: &str, history: &[HistoryMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history.iter().map(ChatMessage::from));
        messages
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
