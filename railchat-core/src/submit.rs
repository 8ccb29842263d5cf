//! Submission Flow
//!
//! Sends one prompt for the active project and reconciles the answer into
//! the project store:
//!
//! ```text
//! Idle -> Validating -> OptimisticUpdate -> Encoding -> Requesting -> {Succeeded, Failed} -> Idle
//! ```
//!
//! The flow is split in three steps so that a UI can release the store
//! while the request is in flight:
//!
//! 1. [`Submission::begin`] validates and appends the user message (needs the store),
//! 2. [`Submission::exchange`] encodes files and awaits the relay (no store access),
//! 3. [`Submission::finish`] appends the assistant message (needs the store).
//!
//! The target project is captured in step 1. The answer is written to that
//! project even if the user has switched to another one in the meantime.
//! A failed exchange keeps the user message in the history.

use async_trait::async_trait;

use crate::attachment::{encode_attachments, Attachment};
use crate::error::{ChatError, ChatResult, ValidationError};
use crate::kv::KeyValueStore;
use crate::model::ChatMessage;
use crate::settings::Settings;
use crate::store::ProjectStore;
use crate::wire::ChatRequest;

/// Content used when a successful answer carries no `response` text
pub const ASSISTANT_PLACEHOLDER: &str = "Assistant did not provide content.";

/// Detail used when an error body cannot be parsed
pub const UNKNOWN_ERROR_DETAIL: &str = "Unknown error fetching response.";

/// Raw HTTP answer from the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers a [`ChatRequest`] to the relay. Network failures map to [`ChatError::Transport`].
#[async_trait(?Send)]
pub trait ChatTransport {
    async fn post_chat(&self, request: &ChatRequest) -> ChatResult<TransportResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    OptimisticUpdate,
    Encoding,
    Requesting,
    Succeeded,
    Failed,
}

impl std::fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Validating => "validating",
            SubmissionPhase::OptimisticUpdate => "optimistic_update",
            SubmissionPhase::Encoding => "encoding",
            SubmissionPhase::Requesting => "requesting",
            SubmissionPhase::Succeeded => "succeeded",
            SubmissionPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One prompt on its way to the relay
#[derive(Debug)]
pub struct Submission {
    project_id: String,
    user_message: ChatMessage,
    system_prompt: String,
    settings: Settings,
    phase: SubmissionPhase,
}

impl Submission {
    /// Validate the draft and append the user message to the active project.
    ///
    /// Rejections leave the store untouched.
    pub fn begin<K: KeyValueStore>(
        store: &mut ProjectStore<K>,
        settings: &Settings,
        prompt: &str,
        attachment_count: usize,
    ) -> ChatResult<Self> {
        tracing::debug!(phase = %SubmissionPhase::Validating, "Submission phase");

        let project = store
            .active_project()
            .ok_or(ValidationError::NoActiveProject)?;
        if !settings.has_credentials() {
            return Err(ValidationError::MissingCredentials.into());
        }
        if prompt.trim().is_empty() && attachment_count == 0 {
            return Err(ValidationError::EmptyPrompt.into());
        }

        let project_id = project.id.clone();
        let system_prompt = project.resolved_system_prompt().to_string();
        let user_message = ChatMessage::user(prompt);

        let mut submission = Self {
            project_id,
            user_message,
            system_prompt,
            settings: settings.clone(),
            phase: SubmissionPhase::Validating,
        };

        submission.enter(SubmissionPhase::OptimisticUpdate);
        store.append_message(&submission.project_id, submission.user_message.clone());

        Ok(submission)
    }

    /// Project the answer will be written to
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Encode the attachments, send the request and interpret the answer
    pub async fn exchange<A, T>(&mut self, files: &[A], transport: &T) -> ChatResult<ChatMessage>
    where
        A: Attachment,
        T: ChatTransport + ?Sized,
    {
        self.enter(SubmissionPhase::Encoding);
        let files = encode_attachments(files).await?;

        let request = ChatRequest {
            azure_endpoint: self.settings.endpoint.clone(),
            azure_api_key: self.settings.api_key.clone(),
            model: self.settings.effective_model().to_string(),
            system_prompt: self.system_prompt.clone(),
            user_prompt: self.user_message.content.clone(),
            files,
        };

        self.enter(SubmissionPhase::Requesting);
        tracing::info!(
            project_id = %self.project_id,
            model = %request.model,
            files = request.files.as_ref().map_or(0, Vec::len),
            "Sending chat request"
        );

        let response = transport.post_chat(&request).await?;
        interpret_response(&response)
    }

    /// Reconcile the outcome into the store. On failure the user message stays.
    pub fn finish<K: KeyValueStore>(
        mut self,
        store: &mut ProjectStore<K>,
        outcome: ChatResult<ChatMessage>,
    ) -> ChatResult<ChatMessage> {
        let result = match outcome {
            Ok(assistant) => {
                store.append_message(&self.project_id, assistant.clone());
                self.enter(SubmissionPhase::Succeeded);
                Ok(assistant)
            }
            Err(e) => {
                tracing::warn!(project_id = %self.project_id, error = %e, "Chat request failed");
                self.enter(SubmissionPhase::Failed);
                Err(e)
            }
        };
        self.enter(SubmissionPhase::Idle);
        result
    }

    fn enter(&mut self, phase: SubmissionPhase) {
        tracing::debug!(project_id = %self.project_id, from = %self.phase, to = %phase, "Submission phase");
        self.phase = phase;
    }
}

/// Run the whole flow while holding the store
pub async fn submit<K, A, T>(
    store: &mut ProjectStore<K>,
    settings: &Settings,
    prompt: &str,
    files: &[A],
    transport: &T,
) -> ChatResult<ChatMessage>
where
    K: KeyValueStore,
    A: Attachment,
    T: ChatTransport + ?Sized,
{
    let mut submission = Submission::begin(store, settings, prompt, files.len())?;
    let outcome = submission.exchange(files, transport).await;
    submission.finish(store, outcome)
}

/// Turn a relay answer into the assistant message, or the failure to report
pub fn interpret_response(response: &TransportResponse) -> ChatResult<ChatMessage> {
    if !response.is_success() {
        return Err(ChatError::Api {
            status: response.status,
            detail: error_detail(response),
        });
    }

    let body: serde_json::Value = serde_json::from_str(&response.body)
        .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;
    let body = body
        .as_object()
        .ok_or_else(|| ChatError::MalformedResponse(format!("expected a JSON object, got {}", body)))?;

    let content = body
        .get("response")
        .and_then(serde_json::Value::as_str)
        .filter(|text| !text.is_empty())
        .unwrap_or(ASSISTANT_PLACEHOLDER);

    Ok(ChatMessage::assistant(content))
}

fn error_detail(response: &TransportResponse) -> String {
    let body: serde_json::Value = match serde_json::from_str(&response.body) {
        Ok(body) => body,
        Err(_) => return UNKNOWN_ERROR_DETAIL.to_string(),
    };

    match body.get("detail") {
        Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(serde_json::Value::Null) | Some(serde_json::Value::String(_)) | None => {
            response.status_text.clone()
        }
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::InMemoryAttachment;
    use crate::kv::{JsonStore, MemoryStore};
    use crate::model::Role;
    use std::cell::RefCell;

    struct MockTransport {
        reply: Result<TransportResponse, String>,
        requests: RefCell<Vec<ChatRequest>>,
    }

    impl MockTransport {
        fn replying(status: u16, status_text: &str, body: &str) -> Self {
            Self {
                reply: Ok(TransportResponse::new(status, status_text, body)),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                requests: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.borrow().len()
        }
    }

    #[async_trait(?Send)]
    impl ChatTransport for MockTransport {
        async fn post_chat(&self, request: &ChatRequest) -> ChatResult<TransportResponse> {
            self.requests.borrow_mut().push(request.clone());
            self.reply.clone().map_err(ChatError::Transport)
        }
    }

    fn settings() -> Settings {
        Settings {
            endpoint: "https://res.openai.azure.com/".into(),
            api_key: "key".into(),
            model: "gpt-4o".into(),
        }
    }

    fn store_with_project() -> (ProjectStore<MemoryStore>, String) {
        let mut store = ProjectStore::load(JsonStore::new(MemoryStore::new()));
        let id = store.create_project().id;
        (store, id)
    }

    fn no_files() -> Vec<InMemoryAttachment> {
        Vec::new()
    }

    fn history(store: &ProjectStore<MemoryStore>, id: &str) -> Vec<(Role, String)> {
        store
            .get(id)
            .unwrap()
            .history
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let (mut store, id) = store_with_project();
        let transport = MockTransport::replying(200, "OK", r#"{"response":"hi there"}"#);

        let reply = submit(&mut store, &settings(), "hello", &no_files(), &transport)
            .await
            .unwrap();

        assert_eq!(reply.content, "hi there");
        assert_eq!(
            history(&store, &id),
            vec![
                (Role::User, "hello".to_string()),
                (Role::Assistant, "hi there".to_string())
            ]
        );

        let requests = transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].user_prompt, "hello");
        assert_eq!(requests[0].model, "gpt-4o");
        assert_eq!(requests[0].system_prompt, "You are a helpful AI assistant.");
        assert!(requests[0].files.is_none());
    }

    #[tokio::test]
    async fn test_server_error_keeps_user_message() {
        let (mut store, id) = store_with_project();
        let transport = MockTransport::replying(500, "Internal Server Error", r#"{"detail":"boom"}"#);

        let err = submit(&mut store, &settings(), "hello", &no_files(), &transport)
            .await
            .unwrap_err();

        assert!(err.notice().message.contains("boom"));
        assert_eq!(history(&store, &id), vec![(Role::User, "hello".to_string())]);
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_before_network() {
        let (mut store, id) = store_with_project();
        let transport = MockTransport::replying(200, "OK", r#"{"response":"x"}"#);

        let err = submit(&mut store, &settings(), "   ", &no_files(), &transport)
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Validation(ValidationError::EmptyPrompt)));
        assert_eq!(transport.calls(), 0);
        assert!(history(&store, &id).is_empty());
    }

    #[tokio::test]
    async fn test_files_only_submission_allowed() {
        let (mut store, _) = store_with_project();
        let transport = MockTransport::replying(200, "OK", r#"{"response":"read it"}"#);
        let files = vec![InMemoryAttachment::new("data.csv", b"a,b".to_vec())];

        submit(&mut store, &settings(), "", &files, &transport)
            .await
            .unwrap();

        let requests = transport.requests.borrow();
        let sent = requests[0].files.as_ref().unwrap();
        assert_eq!(sent[0].filename, "data.csv");
        assert_eq!(sent[0].content, "YSxi");
    }

    #[tokio::test]
    async fn test_missing_credentials_rejected() {
        let (mut store, id) = store_with_project();
        let transport = MockTransport::replying(200, "OK", "{}");
        let incomplete = Settings {
            api_key: String::new(),
            ..settings()
        };

        let err = submit(&mut store, &incomplete, "hello", &no_files(), &transport)
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Validation(ValidationError::MissingCredentials)));
        assert_eq!(transport.calls(), 0);
        assert!(history(&store, &id).is_empty());
    }

    #[tokio::test]
    async fn test_no_active_project_rejected() {
        let mut store = ProjectStore::load(JsonStore::new(MemoryStore::new()));
        let transport = MockTransport::replying(200, "OK", "{}");

        let err = submit(&mut store, &settings(), "hello", &no_files(), &transport)
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Validation(ValidationError::NoActiveProject)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_network_failure() {
        let (mut store, id) = store_with_project();
        let transport = MockTransport::failing("connection refused");

        let err = submit(&mut store, &settings(), "hello", &no_files(), &transport)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "An unexpected error occurred: connection refused"
        );
        assert_eq!(history(&store, &id).len(), 1);
    }

    #[tokio::test]
    async fn test_answer_goes_to_project_captured_at_send_time() {
        let (mut store, original) = store_with_project();
        let transport = MockTransport::replying(200, "OK", r#"{"response":"late answer"}"#);

        let mut submission = Submission::begin(&mut store, &settings(), "hello", 0).unwrap();
        assert_eq!(submission.phase(), SubmissionPhase::OptimisticUpdate);

        // The user opens another chat while the request is in flight.
        let other = store.create_project().id;

        let outcome = submission.exchange(&no_files(), &transport).await;
        submission.finish(&mut store, outcome).unwrap();

        assert_eq!(store.active_id(), Some(other.as_str()));
        assert_eq!(history(&store, &original).len(), 2);
        assert!(history(&store, &other).is_empty());
    }

    #[tokio::test]
    async fn test_custom_system_prompt_is_sent() {
        let (mut store, _) = store_with_project();
        store.update_system_prompt("Answer like a pirate.");
        let transport = MockTransport::replying(200, "OK", r#"{"response":"arr"}"#);

        submit(&mut store, &settings(), "hello", &no_files(), &transport)
            .await
            .unwrap();

        assert_eq!(
            transport.requests.borrow()[0].system_prompt,
            "Answer like a pirate."
        );
    }

    #[test]
    fn test_interpret_missing_response_field() {
        let reply = interpret_response(&TransportResponse::new(200, "OK", r#"{"other":1}"#)).unwrap();
        assert_eq!(reply.content, ASSISTANT_PLACEHOLDER);
        assert_eq!(reply.role, Role::Assistant);
    }

    #[test]
    fn test_interpret_malformed_success_body() {
        let err = interpret_response(&TransportResponse::new(200, "OK", "<html>")).unwrap_err();
        assert!(matches!(err, ChatError::MalformedResponse(_)));
    }

    #[test]
    fn test_interpret_non_object_success_body() {
        for body in ["null", "42", r#""hello""#, "[]"] {
            let err = interpret_response(&TransportResponse::new(200, "OK", body)).unwrap_err();
            assert!(matches!(err, ChatError::MalformedResponse(_)), "body {}", body);
        }
    }

    #[test]
    fn test_interpret_error_details() {
        let unparsable = interpret_response(&TransportResponse::new(502, "Bad Gateway", "oops"));
        assert_eq!(
            unparsable.unwrap_err().to_string(),
            "API Error (502): Unknown error fetching response."
        );

        let no_detail = interpret_response(&TransportResponse::new(404, "Not Found", "{}"));
        assert_eq!(no_detail.unwrap_err().to_string(), "API Error (404): Not Found");

        let structured = interpret_response(&TransportResponse::new(
            422,
            "Unprocessable Entity",
            r#"{"detail":[{"msg":"field required"}]}"#,
        ));
        assert!(structured.unwrap_err().to_string().contains("field required"));
    }
}
