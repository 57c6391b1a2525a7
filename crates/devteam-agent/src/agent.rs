//! Team agent — one persona talking to the LLM through a shared session store.
//!
//! Every agent on the team can share one [`SessionManager`]; the manager is
//! wrapped in a single async mutex and the lock is never held across the LLM
//! call.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use devteam_core::config::AgentDefaults;
use devteam_core::session::{HistoryMessage, SessionManager};
use devteam_core::types::{ChatMessage, ROLE_ASSISTANT, ROLE_USER};
use devteam_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::context::ContextBuilder;
use crate::persona::Persona;
use crate::session_key::derive_session_id;

/// Default number of history messages sent with each LLM call.
const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Reply recorded when the model returns no content.
const NO_RESPONSE: &str = "[no response]";

/// A session manager shared between agents and tasks.
pub type SharedSessions = Arc<Mutex<SessionManager>>;

// ─────────────────────────────────────────────
// TeamAgent
// ─────────────────────────────────────────────

/// A persona-backed agent with session memory.
pub struct TeamAgent {
    /// Prompt construction for this agent's persona.
    context: ContextBuilder,
    /// LLM provider.
    provider: Arc<dyn LlmProvider>,
    /// Session store (possibly shared with other agents).
    sessions: SharedSessions,
    /// Model to use (overrides provider default if set).
    model: String,
    /// LLM request config (temperature, max_tokens).
    request_config: LlmRequestConfig,
    /// History messages sent with each call unless overridden.
    history_window: usize,
}

impl TeamAgent {
    /// Create a new agent.
    ///
    /// `sessions` defaults to a fresh, unshared manager; `model` to the
    /// provider's default; `language` to Dutch.
    pub fn new(
        persona: &'static Persona,
        provider: Arc<dyn LlmProvider>,
        sessions: Option<SharedSessions>,
        model: Option<String>,
        request_config: Option<LlmRequestConfig>,
        language: Option<String>,
    ) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        let language = language.unwrap_or_else(|| AgentDefaults::default().language);
        Self {
            context: ContextBuilder::new(persona, language),
            provider,
            sessions: sessions.unwrap_or_default(),
            model,
            request_config: request_config.unwrap_or_default(),
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Create an agent from the `agents.defaults` config section.
    pub fn from_config(
        persona: &'static Persona,
        provider: Arc<dyn LlmProvider>,
        sessions: SharedSessions,
        defaults: &AgentDefaults,
    ) -> Self {
        let mut agent = Self::new(
            persona,
            provider,
            Some(sessions),
            Some(defaults.model.clone()),
            Some(LlmRequestConfig::from(defaults)),
            Some(defaults.language.clone()),
        );
        agent.history_window = defaults.history_window;
        agent
    }

    pub fn persona(&self) -> &'static Persona {
        self.context.persona()
    }

    /// The shared session store.
    pub fn sessions(&self) -> &SharedSessions {
        &self.sessions
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    // ────────────── Session access ──────────────

    /// Append a message to a session (creating it if needed) and merge any
    /// context entries.
    pub async fn add_to_session(
        &self,
        session_id: &str,
        role: &str,
        content: &str,
        context: Option<Map<String, Value>>,
    ) {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_or_create(session_id);
        session.add_message(role, content);
        for (key, value) in context.into_iter().flatten() {
            session.update_context(key, value);
        }
    }

    /// Recent history of a session (creating it if needed).
    pub async fn session_history(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Vec<HistoryMessage> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .get_or_create(session_id)
            .recent_history(limit)
            .to_vec()
    }

    /// Read a context value from a session.
    pub async fn session_context(&self, session_id: &str, key: &str) -> Option<Value> {
        let mut sessions = self.sessions.lock().await;
        sessions.get_or_create(session_id).get_context(key).cloned()
    }

    /// Read a context value, falling back to `default`.
    pub async fn session_context_or(&self, session_id: &str, key: &str, default: Value) -> Value {
        self.session_context(session_id, key).await.unwrap_or(default)
    }

    /// Write a context value to a session.
    pub async fn update_session_context(
        &self,
        session_id: &str,
        key: &str,
        value: impl Into<Value>,
    ) {
        let mut sessions = self.sessions.lock().await;
        sessions
            .get_or_create(session_id)
            .update_context(key, value);
    }

    // ────────────── Generation ──────────────

    /// Record `user_input`, ask the LLM with the recent history, record and
    /// return the reply.
    ///
    /// Uses the persona's generic prompt unless `system_prompt` is given, and
    /// the configured history window unless `max_history` is given. A
    /// provider error is returned as `Err` and nothing is recorded for it.
    pub async fn generate_response(
        &self,
        session_id: &str,
        user_input: &str,
        system_prompt: Option<&str>,
        max_history: Option<usize>,
    ) -> Result<String> {
        let window = max_history.unwrap_or(self.history_window);
        let system_prompt = system_prompt
            .map(String::from)
            .unwrap_or_else(|| self.context.build_system_prompt());

        let messages = {
            let mut sessions = self.sessions.lock().await;
            let session = sessions.get_or_create(session_id);
            session.add_message(ROLE_USER, user_input);
            ContextBuilder::build_messages(&system_prompt, session.recent_history(Some(window)))
        };

        debug!(
            agent = self.persona().name,
            session = session_id,
            messages = messages.len(),
            "calling LLM"
        );

        let response = self
            .provider
            .chat(&messages, &self.model, &self.request_config)
            .await;

        if response.is_error {
            let reason = response.content.unwrap_or_default();
            warn!(agent = self.persona().name, session = session_id, error = %reason, "LLM call failed");
            return Err(anyhow!(reason));
        }

        let reply = response.content.unwrap_or_else(|| NO_RESPONSE.to_string());
        self.add_to_session(session_id, ROLE_ASSISTANT, &reply, None)
            .await;
        Ok(reply)
    }

    /// Answer the latest user message of a team conversation.
    ///
    /// Without a `session_id` one is derived from the conversation. The reply
    /// is signed with the persona's name and role; failures are returned as
    /// an error message rather than propagated.
    pub async fn respond(
        &self,
        conversation: &[ChatMessage],
        topic: Option<&str>,
        session_id: Option<&str>,
    ) -> String {
        let session_id = session_id
            .map(String::from)
            .unwrap_or_else(|| derive_session_id(conversation));

        match self.respond_in_session(conversation, topic, &session_id).await {
            Ok(reply) => {
                let persona = self.persona();
                format!("{reply}\n\n-- {} ({})", persona.name, persona.role)
            }
            Err(e) => format!("An error occurred while processing the request: {e}"),
        }
    }

    async fn respond_in_session(
        &self,
        conversation: &[ChatMessage],
        topic: Option<&str>,
        session_id: &str,
    ) -> Result<String> {
        let user_message = conversation
            .iter()
            .rev()
            .find(|m| m.is_user())
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        info!(
            agent = self.persona().name,
            session = session_id,
            topic = topic.unwrap_or("-"),
            "responding"
        );

        self.update_session_context(session_id, "last_activity", Utc::now().to_rfc3339())
            .await;
        if let Some(topic) = topic {
            self.update_session_context(session_id, "last_topic", topic)
                .await;
        }

        let system_prompt = self.context.build_topic_prompt(topic);
        let reply = self
            .generate_response(session_id, user_message, Some(&system_prompt), None)
            .await?;

        self.update_session_context(
            session_id,
            "last_reply",
            json!({
                "at": Utc::now().to_rfc3339(),
                "topic": topic.unwrap_or("general"),
            }),
        )
        .await;

        Ok(reply)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::find_persona;
    use async_trait::async_trait;
    use devteam_core::types::LlmResponse;

    /// A mock LLM provider that returns one canned response and records calls.
    struct MockProvider {
        response: LlmResponse,
        calls: std::sync::Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl MockProvider {
        fn simple(text: &str) -> Arc<Self> {
            Self::with_response(LlmResponse::text(text))
        }

        fn with_response(response: LlmResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Vec<ChatMessage>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _model: &str,
            _config: &LlmRequestConfig,
        ) -> LlmResponse {
            self.calls.lock().unwrap().push(messages.to_vec());
            self.response.clone()
        }

        fn default_model(&self) -> &str {
            "mock-model"
        }

        fn display_name(&self) -> &str {
            "MockProvider"
        }
    }

    fn create_agent(key: &str, provider: Arc<MockProvider>) -> TeamAgent {
        TeamAgent::new(find_persona(key).unwrap(), provider, None, None, None, None)
    }

    #[tokio::test]
    async fn test_defaults() {
        let agent = create_agent("backend", MockProvider::simple("ok"));
        assert_eq!(agent.persona().name, "Mark");
        assert_eq!(agent.model(), "mock-model");
        assert!(agent.sessions().lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_to_session() {
        let agent = create_agent("frontend", MockProvider::simple("ok"));
        let mut context = Map::new();
        context.insert("user_name".into(), json!("Jan"));

        agent
            .add_to_session("test_session", "user", "Hello, how are you?", Some(context))
            .await;

        let history = agent.session_history("test_session", None).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[0].content, "Hello, how are you?");
        assert_eq!(
            agent.session_context("test_session", "user_name").await,
            Some(json!("Jan"))
        );
    }

    #[tokio::test]
    async fn test_session_history_order_and_limit() {
        let agent = create_agent("frontend", MockProvider::simple("ok"));
        agent.add_to_session("s", "user", "First message", None).await;
        agent
            .add_to_session("s", "assistant", "Second message", None)
            .await;

        let history = agent.session_history("s", None).await;
        assert_eq!(history[0].content, "First message");
        assert_eq!(history[1].content, "Second message");

        let last = agent.session_history("s", Some(1)).await;
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].content, "Second message");
    }

    #[tokio::test]
    async fn test_session_context_default() {
        let agent = create_agent("scrum", MockProvider::simple("ok"));
        agent.update_session_context("s", "user_name", "Jan").await;

        assert_eq!(agent.session_context("s", "user_name").await, Some(json!("Jan")));
        assert_eq!(
            agent
                .session_context_or("s", "missing", json!("default"))
                .await,
            json!("default")
        );
    }

    #[tokio::test]
    async fn test_generate_response_records_exchange() {
        let provider = MockProvider::simple("This is a test answer.");
        let agent = create_agent("backend", provider.clone());

        let reply = agent
            .generate_response("s", "Hello, who are you?", Some("You are a test assistant."), Some(5))
            .await
            .unwrap();
        assert_eq!(reply, "This is a test answer.");

        let history = agent.session_history("s", None).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "Hello, who are you?");
        assert_eq!(history[1].content, "This is a test answer.");
        assert_eq!(history[1].role, "assistant");

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0], ChatMessage::system("You are a test assistant."));
        assert_eq!(calls[0].last().unwrap(), &ChatMessage::user("Hello, who are you?"));
    }

    #[tokio::test]
    async fn test_generate_response_default_prompt() {
        let provider = MockProvider::simple("ok");
        let agent = create_agent("frontend", provider.clone());
        agent.generate_response("s", "hi", None, None).await.unwrap();

        let system = &provider.calls()[0][0];
        assert_eq!(system.role, "system");
        assert!(system.content.starts_with("You are Sarah, a Frontend Developer."));
        assert!(system.content.contains("Your goal is:"));
    }

    #[tokio::test]
    async fn test_generate_response_history_window() {
        let provider = MockProvider::simple("ok");
        let agent = create_agent("backend", provider.clone());
        for i in 0..6 {
            agent.add_to_session("s", "user", &format!("old {i}"), None).await;
        }

        agent.generate_response("s", "new", None, Some(3)).await.unwrap();

        let call = &provider.calls()[0];
        // system + 3 most recent
        assert_eq!(call.len(), 4);
        assert_eq!(call[1].content, "old 4");
        assert_eq!(call[3].content, "new");
    }

    #[tokio::test]
    async fn test_generate_response_empty_reply() {
        let agent = create_agent("backend", MockProvider::with_response(LlmResponse::default()));
        let reply = agent.generate_response("s", "hi", None, None).await.unwrap();
        assert_eq!(reply, "[no response]");
    }

    #[tokio::test]
    async fn test_generate_response_error_not_recorded() {
        let provider = MockProvider::with_response(LlmResponse::error("Error calling LLM: 500"));
        let agent = create_agent("backend", provider);

        let err = agent.generate_response("s", "hi", None, None).await.unwrap_err();
        assert!(err.to_string().contains("500"));

        let history = agent.session_history("s", None).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, "user");
    }

    #[tokio::test]
    async fn test_respond_signs_and_records_context() {
        let provider = MockProvider::simple("That is a question for Mark, our backend developer.");
        let agent = create_agent("frontend", provider.clone());
        let conversation = vec![ChatMessage::user("How do I update the database?")];

        let answer = agent.respond(&conversation, Some("database"), None).await;

        assert!(answer.contains("Mark"));
        assert!(answer.ends_with("-- Sarah (Frontend Developer)"));
        assert_eq!(provider.calls().len(), 1);
        assert!(provider.calls()[0][0].content.ends_with("Current topic: database"));

        let session_id = derive_session_id(&conversation);
        let history = agent.session_history(&session_id, None).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "How do I update the database?");

        let last_reply = agent.session_context(&session_id, "last_reply").await.unwrap();
        assert_eq!(last_reply["topic"], "database");
        assert!(agent.session_context(&session_id, "last_activity").await.is_some());
        assert_eq!(
            agent.session_context(&session_id, "last_topic").await,
            Some(json!("database"))
        );
    }

    #[tokio::test]
    async fn test_respond_uses_latest_user_message() {
        let provider = MockProvider::simple("Let's bring in the right person for this question.");
        let agent = create_agent("scrum", provider.clone());
        let conversation = vec![
            ChatMessage::user("Sarah, can you change the database?"),
            ChatMessage::assistant("Maybe."),
            ChatMessage::user("Who should do it?"),
        ];

        let answer = agent.respond(&conversation, None, Some("team")).await;

        assert!(answer.contains("Let's bring in the right person for this question."));
        assert_eq!(provider.calls()[0].last().unwrap().content, "Who should do it?");
        let last_reply = agent.session_context("team", "last_reply").await.unwrap();
        assert_eq!(last_reply["topic"], "general");
    }

    #[tokio::test]
    async fn test_respond_reports_errors() {
        let agent = create_agent(
            "backend",
            MockProvider::with_response(LlmResponse::error("connection refused")),
        );
        let answer = agent
            .respond(&[ChatMessage::user("hi")], None, Some("s"))
            .await;
        assert!(answer.starts_with("An error occurred while processing the request"));
        assert!(answer.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_agents_share_session_context() {
        let sessions: SharedSessions = Arc::default();
        let frontend = TeamAgent::new(
            find_persona("frontend").unwrap(),
            MockProvider::simple("ok"),
            Some(sessions.clone()),
            None,
            None,
            None,
        );
        let backend = TeamAgent::new(
            find_persona("backend").unwrap(),
            MockProvider::simple("ok"),
            Some(sessions.clone()),
            None,
            None,
            None,
        );

        frontend.update_session_context("sprint", "story", "login page").await;
        backend.respond(&[ChatMessage::user("API?")], None, Some("sprint")).await;

        assert_eq!(
            backend.session_context("sprint", "story").await,
            Some(json!("login page"))
        );
        assert_eq!(frontend.session_history("sprint", None).await.len(), 2);
        assert_eq!(sessions.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_from_config() {
        let defaults = AgentDefaults {
            model: "openchat:latest".into(),
            history_window: 2,
            language: "English".into(),
            ..Default::default()
        };
        let provider = MockProvider::simple("ok");
        let agent = TeamAgent::from_config(
            find_persona("scrum").unwrap(),
            provider.clone(),
            Arc::default(),
            &defaults,
        );
        assert_eq!(agent.model(), "openchat:latest");

        for i in 0..4 {
            agent.add_to_session("s", "user", &format!("m{i}"), None).await;
        }
        agent.generate_response("s", "latest", None, None).await.unwrap();
        let call = &provider.calls()[0];
        assert_eq!(call.len(), 3);
        assert!(call[0].content.contains("answer in English"));
    }
}
