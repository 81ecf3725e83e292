//! The conversation orchestrator.

use std::sync::Arc;

use gemini::{Backend, Content, GenerateContentRequest, GenerationConfig, ThinkingConfig};
use serde::Serialize;
use tracing::{debug, info};
use transcript::{Message, ToolCall, Transcript, Turn};

use crate::extract::extract_function_calls;
use crate::prompt::system_instruction;
use crate::tools::{ToolService, ToolSession};
use crate::Result;

const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Answer to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub response_text: String,
    pub function_calls: Vec<ToolCall>,
}

/// One shared conversation between users, the model, and remote tools.
pub struct Conversation<B, T> {
    transcript: Arc<Transcript>,
    backend: B,
    tools: T,
    temperature: f32,
}

impl<B: Backend, T: ToolService> Conversation<B, T> {
    /// Create a conversation with an empty transcript.
    pub fn new(backend: B, tools: T) -> Self {
        Self {
            transcript: Arc::new(Transcript::new()),
            backend,
            tools,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn transcript(&self) -> &Arc<Transcript> {
        &self.transcript
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    /// Run one query through the model with the remote tools attached.
    ///
    /// The user turn is recorded before the model is called and stays in the
    /// transcript if generation fails.
    pub async fn process_query(&self, query: &str) -> Result<QueryResponse> {
        let session = self.open_session().await?;
        let outcome = self.answer(query, &session).await;
        session.close().await;
        outcome
    }

    async fn answer(&self, query: &str, session: &T::Session) -> Result<QueryResponse> {
        self.transcript.append(Turn::user(query)).await;

        let history = self.transcript.all().await;
        let request = GenerateContentRequest {
            contents: vec![Content::user(query)],
            system_instruction: Some(Content::system(system_instruction(&history)?)),
            generation_config: Some(GenerationConfig {
                temperature: Some(self.temperature),
                max_output_tokens: None,
                thinking_config: Some(ThinkingConfig::DYNAMIC),
            }),
            ..Default::default()
        };

        let response = self.backend.generate_content(request, session).await?;

        let function_calls = extract_function_calls(&response);
        let response_text = response.text().unwrap_or_default();
        info!(
            tool_calls = function_calls.len(),
            chars = response_text.len(),
            "query answered"
        );

        self.transcript
            .append(Turn::assistant(
                response_text.clone(),
                function_calls.clone(),
            ))
            .await;

        Ok(QueryResponse {
            response_text,
            function_calls,
        })
    }

    /// Check the remote tool server is reachable, signing in if needed.
    pub async fn ping(&self) -> Result<()> {
        let session = self.open_session().await?;
        session.close().await;
        Ok(())
    }

    /// The whole transcript, oldest first.
    pub async fn messages(&self) -> Vec<Message> {
        self.transcript.all().await
    }

    /// Forget every turn.
    pub async fn reset(&self) {
        self.transcript.clear().await;
        debug!("transcript cleared");
    }

    pub async fn complete_sign_on(&self, code: &str, state: &str) -> Result<()> {
        self.tools.complete_sign_on(code, state).await
    }

    async fn open_session(&self) -> Result<T::Session> {
        let session = self.tools.open().await?;
        if let Err(e) = session.ping().await {
            session.close().await;
            return Err(e);
        }
        Ok(session)
    }
}

impl<B: std::fmt::Display, T> std::fmt::Debug for Conversation<B, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("backend", &self.backend.to_string())
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use gemini::{
        Candidate, FunctionCall, FunctionDeclaration, GenerateContentResponse, Part, Role,
        ToolError, ToolProvider,
    };
    use serde_json::{Value, json};
    use transcript::Role as TurnRole;

    use crate::Error;

    #[derive(Default)]
    struct ScriptedBackend {
        replies: Mutex<VecDeque<gemini::Result<GenerateContentResponse>>>,
        requests: Mutex<Vec<GenerateContentRequest>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<gemini::Result<GenerateContentResponse>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Self::default()
            }
        }
    }

    impl std::fmt::Display for ScriptedBackend {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "scripted")
        }
    }

    impl Backend for ScriptedBackend {
        async fn generate_content<P: ToolProvider>(
            &self,
            request: GenerateContentRequest,
            _tools: &P,
        ) -> gemini::Result<GenerateContentResponse> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(gemini::Error::Network("no reply scripted".into())))
        }
    }

    #[derive(Default)]
    struct FakeTools {
        unreachable: bool,
        opened: AtomicUsize,
        closed: Arc<AtomicUsize>,
    }

    struct FakeSession {
        unreachable: bool,
        closed: Arc<AtomicUsize>,
    }

    impl ToolProvider for FakeSession {
        fn declarations(&self) -> &[FunctionDeclaration] {
            &[]
        }

        async fn call(&self, call: &FunctionCall) -> std::result::Result<Value, ToolError> {
            Err(ToolError::NotFound(call.name.clone()))
        }
    }

    impl ToolSession for FakeSession {
        async fn ping(&self) -> Result<()> {
            if self.unreachable {
                Err(Error::RemoteToolUnavailable("connection refused".into()))
            } else {
                Ok(())
            }
        }

        async fn close(self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl ToolService for FakeTools {
        type Session = FakeSession;

        async fn open(&self) -> Result<FakeSession> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(FakeSession {
                unreachable: self.unreachable,
                closed: self.closed.clone(),
            })
        }
    }

    fn answer(text: &str, history: Option<Vec<gemini::Content>>) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(gemini::Content {
                    role: Some(Role::Model),
                    parts: vec![Part::text(text)],
                }),
                finish_reason: Some("STOP".into()),
            }],
            automatic_function_calling_history: history,
            ..Default::default()
        }
    }

    fn model_call(name: &str, args: Value) -> gemini::Content {
        gemini::Content {
            role: Some(Role::Model),
            parts: vec![Part::function_call(FunctionCall {
                id: None,
                name: name.into(),
                args: args.as_object().cloned(),
            })],
        }
    }

    #[tokio::test]
    async fn two_turn_conversation() {
        let backend = ScriptedBackend::new(vec![
            Ok(answer("Hello! How can I help?", None)),
            Ok(answer(
                "Alice is alice@example.com",
                Some(vec![
                    gemini::Content::user("Who is Alice?"),
                    model_call("search_contacts", json!({"query": "Alice"})),
                ]),
            )),
        ]);
        let conversation = Conversation::new(backend, FakeTools::default());

        let first = conversation.process_query("Hi").await.unwrap();
        assert_eq!(first.response_text, "Hello! How can I help?");
        assert!(first.function_calls.is_empty());

        let second = conversation.process_query("Who is Alice?").await.unwrap();
        assert_eq!(second.response_text, "Alice is alice@example.com");
        assert_eq!(second.function_calls.len(), 1);
        assert_eq!(second.function_calls[0].function_name, "search_contacts");
        assert_eq!(second.function_calls[0].parameters["query"], "Alice");

        let messages = conversation.messages().await;
        let roles: Vec<TurnRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [
                TurnRole::User,
                TurnRole::Assistant,
                TurnRole::User,
                TurnRole::Assistant
            ]
        );
        assert_eq!(messages[3].function_calls, second.function_calls);
    }

    #[tokio::test]
    async fn request_carries_prompt_and_settings() {
        let conversation =
            Conversation::new(ScriptedBackend::new(vec![Ok(answer("ok", None))]), FakeTools::default());
        conversation.transcript().append(Turn::user("earlier question")).await;

        conversation.process_query("Schedule a meeting").await.unwrap();

        let requests = conversation.backend.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.contents, vec![gemini::Content::user("Schedule a meeting")]);

        let config = request.generation_config.unwrap();
        assert_eq!(config.temperature, Some(0.1));
        assert_eq!(config.thinking_config, Some(ThinkingConfig::DYNAMIC));

        let instruction = request.system_instruction.as_ref().unwrap().parts[0]
            .text
            .clone()
            .unwrap();
        assert!(instruction.contains("earlier question"));
        assert!(instruction.contains("Schedule a meeting"));
    }

    #[tokio::test]
    async fn failed_generation_leaves_user_turn() {
        let backend = ScriptedBackend::new(vec![Err(gemini::Error::RateLimited)]);
        let tools = FakeTools::default();
        let closed = tools.closed.clone();
        let conversation = Conversation::new(backend, tools);

        let err = conversation.process_query("Hi").await.unwrap_err();
        assert!(matches!(err, Error::Generation(gemini::Error::RateLimited)));

        let messages = conversation.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, TurnRole::User);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_tools_add_no_turns() {
        let tools = FakeTools {
            unreachable: true,
            ..FakeTools::default()
        };
        let closed = tools.closed.clone();
        let conversation = Conversation::new(ScriptedBackend::default(), tools);

        let err = conversation.process_query("Hi").await.unwrap_err();
        assert!(matches!(err, Error::RemoteToolUnavailable(_)));
        assert!(conversation.transcript().is_empty().await);
        assert!(conversation.backend.requests.lock().unwrap().is_empty());
        assert_eq!(closed.load(Ordering::SeqCst), 1);

        assert!(conversation.ping().await.is_err());
    }

    #[tokio::test]
    async fn missing_text_is_recorded_as_empty() {
        let response = GenerateContentResponse {
            candidates: vec![Candidate::default()],
            ..Default::default()
        };
        let conversation =
            Conversation::new(ScriptedBackend::new(vec![Ok(response)]), FakeTools::default());

        let reply = conversation.process_query("Hi").await.unwrap();
        assert_eq!(reply.response_text, "");
        assert_eq!(conversation.messages().await[1].content, "");
    }

    #[tokio::test]
    async fn ping_and_reset() {
        let tools = FakeTools::default();
        let closed = tools.closed.clone();
        let conversation = Conversation::new(ScriptedBackend::default(), tools);

        conversation.ping().await.unwrap();
        assert_eq!(conversation.tools.opened.load(Ordering::SeqCst), 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);

        conversation.transcript().append(Turn::user("a")).await;
        conversation.reset().await;
        conversation.reset().await;
        assert!(conversation.messages().await.is_empty());
    }

    #[tokio::test]
    async fn sign_on_is_delegated() {
        let conversation = Conversation::new(ScriptedBackend::default(), FakeTools::default());
        let err = conversation.complete_sign_on("c", "s").await.unwrap_err();
        assert!(matches!(err, Error::SignOn(_)));
    }
}
