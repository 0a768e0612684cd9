//! Conversation session and turn-taking controller
//!
//! Owns the ordered message history for one interactive session and
//! drives the turn protocol: submit a prompt, accumulate the streamed
//! fragments into a growing buffer, then commit the assistant message.
//! Failures during a turn become visible assistant messages; the
//! session stays usable for the next prompt.

use crate::client::{FragmentStream, ModelClient};
use crate::error::{MurmurError, Result};
use crate::render::RenderSink;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual indicator appended to in-progress assistant text
pub const CURSOR_MARKER: &str = "▌";

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing prompts
    User,
    /// The model's replies (including per-turn error descriptions)
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in the conversation, immutable once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use murmur::session::{Message, Role};
    ///
    /// let msg = Message::user("Hello, who are you?");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered, append-only record of one conversation
///
/// Created empty at session start and dropped when the session ends;
/// nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct Session {
    messages: Vec<Message>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message; appended messages are never modified
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The conversation so far, in chronological order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the session
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the session has no messages yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Turn-taking state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Ready to accept a new prompt
    Idle,
    /// A stream is being consumed
    AwaitingResponse,
}

/// Drives the turn-taking protocol over an owned [`Session`]
///
/// State machine: `Idle -> AwaitingResponse -> Idle`. Exactly one
/// prompt is in flight at a time; the surrounding surface must not
/// submit while a response is streaming.
pub struct SessionController {
    client: Box<dyn ModelClient>,
    session: Session,
    state: ControllerState,
}

impl SessionController {
    /// Create a controller with an empty session
    pub fn new(client: Box<dyn ModelClient>) -> Self {
        Self {
            client,
            session: Session::new(),
            state: ControllerState::Idle,
        }
    }

    /// The conversation history
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current turn-taking state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Submit a user prompt and stream the response
    ///
    /// Appends the user message, consumes the fragment stream while
    /// pushing intermediate renders (`buffer + cursor marker`) to the
    /// sink, then commits the assistant message and returns to `Idle`.
    ///
    /// A failure while requesting or consuming the stream is not
    /// propagated: it is committed as a human-readable assistant
    /// message and the controller returns to `Idle`, ready for the
    /// next prompt. No retry is attempted.
    ///
    /// # Errors
    ///
    /// Returns `MurmurError::Session` only when called while a prompt
    /// is already awaiting a response; the history is untouched then.
    pub async fn submit_prompt(&mut self, prompt: &str, sink: &mut dyn RenderSink) -> Result<()> {
        if self.state != ControllerState::Idle {
            return Err(MurmurError::Session(
                "a prompt is already awaiting a response".to_string(),
            )
            .into());
        }

        self.session.append(Message::user(prompt));
        self.state = ControllerState::AwaitingResponse;

        let mut stream = match self.client.stream_completion(prompt).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("completion request failed: {}", e);
                self.commit_assistant(describe_request_failure(&e), sink);
                return Ok(());
            }
        };

        self.consume_stream(&mut stream, sink).await;
        Ok(())
    }

    /// Accumulate fragments until close-or-error, then commit
    async fn consume_stream(&mut self, stream: &mut FragmentStream, sink: &mut dyn RenderSink) {
        let mut buffer = String::new();

        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => {
                    buffer.push_str(&fragment);
                    sink.update(&format!("{}{}", buffer, CURSOR_MARKER));
                }
                Err(kind) => {
                    tracing::warn!(
                        "stream failed after {} buffered chars: {}",
                        buffer.len(),
                        kind
                    );
                    // The partial accumulation is discarded; the turn's
                    // outcome is the error description.
                    self.commit_assistant(describe_turn_failure(&kind), sink);
                    return;
                }
            }
        }

        self.commit_assistant(buffer, sink);
    }

    /// Commit an assistant message and return to `Idle`
    fn commit_assistant(&mut self, content: String, sink: &mut dyn RenderSink) {
        let message = Message::assistant(content);
        sink.commit(&message);
        self.session.append(message);
        self.state = ControllerState::Idle;
    }
}

/// Human-readable description of a failed completion request
fn describe_request_failure(err: &anyhow::Error) -> String {
    match err.downcast_ref::<MurmurError>() {
        Some(kind @ MurmurError::Connection(_)) => format!(
            "{}. Check that the Ollama server is reachable and the model is initialized.",
            kind
        ),
        _ => format!("Error communicating with the model: {}", err),
    }
}

/// Human-readable description of a mid-stream failure
fn describe_turn_failure(kind: &MurmurError) -> String {
    match kind {
        MurmurError::Connection(_) => format!(
            "{}. Check that the Ollama server is reachable and the model is initialized.",
            kind
        ),
        other => format!("Error communicating with the model: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted backend: each submitted prompt pops the next turn
    struct ScriptedClient {
        turns: Mutex<VecDeque<Turn>>,
    }

    /// Either a stream of items, or a request that fails up front
    type Turn = std::result::Result<Vec<std::result::Result<String, MurmurError>>, MurmurError>;

    impl ScriptedClient {
        fn new(turns: Vec<Turn>) -> Self {
            Self {
                turns: Mutex::new(turns.into()),
            }
        }

        fn fragments(parts: &[&str]) -> Turn {
            Ok(parts.iter().map(|p| Ok(p.to_string())).collect())
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn stream_completion(&self, _prompt: &str) -> Result<FragmentStream> {
            let turn = {
                let mut turns = self.turns.lock().unwrap();
                turns.pop_front().expect("no scripted turn left")
            };
            let items = turn.map_err(anyhow::Error::new)?;

            let (tx, stream) = FragmentStream::channel(16);
            tokio::spawn(async move {
                for item in items {
                    if tx.send(item).await.is_err() {
                        return;
                    }
                }
            });
            Ok(stream)
        }
    }

    /// Records every render event for assertions
    #[derive(Default)]
    struct RecordingSink {
        updates: Vec<String>,
        commits: Vec<(Role, String)>,
    }

    impl RenderSink for RecordingSink {
        fn update(&mut self, partial: &str) {
            self.updates.push(partial.to_string());
        }

        fn commit(&mut self, message: &Message) {
            self.commits.push((message.role, message.content.clone()));
        }
    }

    fn controller_with(turns: Vec<Turn>) -> SessionController {
        SessionController::new(Box::new(ScriptedClient::new(turns)))
    }

    #[test]
    fn test_message_constructors() {
        let user = Message::user("hi");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, "hi");

        let assistant = Message::assistant("hello");
        assert_eq!(assistant.role, Role::Assistant);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_message_serialization_roundtrip() {
        let msg = Message::user("Hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_session_append_only_ordering() {
        let mut session = Session::new();
        assert!(session.is_empty());

        session.append(Message::user("one"));
        session.append(Message::assistant("two"));

        assert_eq!(session.len(), 2);
        assert_eq!(session.messages()[0].content, "one");
        assert_eq!(session.messages()[1].content, "two");
    }

    #[tokio::test]
    async fn test_example_scenario_streaming_accumulation() {
        // Scenario from the chat surface: three fragments, each
        // intermediate render carries the accumulation plus marker,
        // the committed message carries neither marker nor partials.
        let mut controller =
            controller_with(vec![ScriptedClient::fragments(&[
                "I am ",
                "a local ",
                "assistant.",
            ])]);
        let mut sink = RecordingSink::default();

        controller
            .submit_prompt("Hello, who are you?", &mut sink)
            .await
            .unwrap();

        assert_eq!(
            sink.updates,
            vec![
                "I am \u{258c}",
                "I am a local \u{258c}",
                "I am a local assistant.\u{258c}",
            ]
        );
        assert_eq!(
            sink.commits,
            vec![(Role::Assistant, "I am a local assistant.".to_string())]
        );

        let history = controller.session().messages();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Message::user("Hello, who are you?"));
        assert_eq!(history[1], Message::assistant("I am a local assistant."));
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_history_interleaves_in_submission_order() {
        let mut controller = controller_with(vec![
            ScriptedClient::fragments(&["first ", "answer"]),
            ScriptedClient::fragments(&["second answer"]),
            ScriptedClient::fragments(&["third answer"]),
        ]);
        let mut sink = RecordingSink::default();

        for prompt in ["q1", "q2", "q3"] {
            controller.submit_prompt(prompt, &mut sink).await.unwrap();
        }

        let roles: Vec<Role> = controller
            .session()
            .messages()
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
            ]
        );

        let history = controller.session().messages();
        assert_eq!(history[0].content, "q1");
        assert_eq!(history[1].content, "first answer");
        assert_eq!(history[2].content, "q2");
        assert_eq!(history[3].content, "second answer");
        assert_eq!(history[4].content, "q3");
    }

    #[tokio::test]
    async fn test_mid_stream_failure_commits_error_description() {
        let mut controller = controller_with(vec![
            Ok(vec![
                Ok("f1".to_string()),
                Ok("f2".to_string()),
                Err(MurmurError::Inference("connection reset".to_string())),
            ]),
            ScriptedClient::fragments(&["recovered"]),
        ]);
        let mut sink = RecordingSink::default();

        controller.submit_prompt("boom", &mut sink).await.unwrap();

        // The partial accumulation must not leak into history.
        let history = controller.session().messages();
        assert_eq!(history.len(), 2);
        assert_ne!(history[1].content, "f1f2");
        assert!(history[1].content.contains("connection reset"));
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(controller.state(), ControllerState::Idle);

        // The next prompt succeeds on the same session.
        controller.submit_prompt("again", &mut sink).await.unwrap();
        let history = controller.session().messages();
        assert_eq!(history.len(), 4);
        assert_eq!(history[3].content, "recovered");
    }

    #[tokio::test]
    async fn test_request_failure_becomes_assistant_message() {
        let mut controller = controller_with(vec![
            Err(MurmurError::Connection("not initialized".to_string())),
            ScriptedClient::fragments(&["still works"]),
        ]);
        let mut sink = RecordingSink::default();

        controller.submit_prompt("hi", &mut sink).await.unwrap();

        let history = controller.session().messages();
        assert_eq!(history.len(), 2);
        assert!(history[1].content.contains("Connection error"));
        assert!(sink.updates.is_empty());
        assert_eq!(sink.commits.len(), 1);
        assert_eq!(controller.state(), ControllerState::Idle);

        controller.submit_prompt("next", &mut sink).await.unwrap();
        assert_eq!(controller.session().messages()[3].content, "still works");
    }

    #[tokio::test]
    async fn test_empty_stream_commits_empty_message() {
        let mut controller = controller_with(vec![ScriptedClient::fragments(&[])]);
        let mut sink = RecordingSink::default();

        controller.submit_prompt("hi", &mut sink).await.unwrap();

        assert!(sink.updates.is_empty());
        assert_eq!(sink.commits, vec![(Role::Assistant, String::new())]);
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn test_submit_while_awaiting_is_rejected() {
        let mut controller = controller_with(vec![]);
        controller.state = ControllerState::AwaitingResponse;
        let mut sink = RecordingSink::default();

        let err = controller.submit_prompt("hi", &mut sink).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MurmurError>(),
            Some(MurmurError::Session(_))
        ));
        // The contract violation must not touch history.
        assert!(controller.session().is_empty());
    }
}
