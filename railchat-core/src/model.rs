//! Chat data model
//!
//! Projects are independent chat threads, each with its own system prompt
//! and an append-only message history.

use serde::{Deserialize, Serialize};

/// System prompt used when a project has none (or an empty one)
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Display name given to freshly created projects
pub const NEW_PROJECT_NAME: &str = "New Chat";

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a project's history. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A named chat thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

impl Project {
    /// Fresh project: "New Chat", empty system prompt, empty history
    pub fn new() -> Self {
        Self {
            id: new_id(),
            name: NEW_PROJECT_NAME.to_string(),
            system_prompt: Some(String::new()),
            history: Vec::new(),
        }
    }

    /// The prompt sent with requests: stored value, or the default when absent or empty
    pub fn resolved_system_prompt(&self) -> &str {
        match self.system_prompt.as_deref() {
            Some(prompt) if !prompt.is_empty() => prompt,
            _ => DEFAULT_SYSTEM_PROMPT,
        }
    }

    /// Copy of this project with `message` appended
    pub fn with_message(&self, message: ChatMessage) -> Self {
        let mut history = Vec::with_capacity(self.history.len() + 1);
        history.extend(self.history.iter().cloned());
        history.push(message);
        Self {
            history,
            ..self.clone()
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_defaults() {
        let project = Project::new();
        assert_eq!(project.name, "New Chat");
        assert_eq!(project.system_prompt.as_deref(), Some(""));
        assert!(project.history.is_empty());
        assert_eq!(project.resolved_system_prompt(), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_resolved_system_prompt() {
        let mut project = Project::new();
        project.system_prompt = None;
        assert_eq!(project.resolved_system_prompt(), DEFAULT_SYSTEM_PROMPT);

        project.system_prompt = Some("Answer in French.".into());
        assert_eq!(project.resolved_system_prompt(), "Answer in French.");
    }

    #[test]
    fn test_project_json_layout() {
        let project = Project {
            id: "p1".into(),
            name: "Trip".into(),
            system_prompt: Some(String::new()),
            history: vec![ChatMessage {
                id: "m1".into(),
                role: Role::Assistant,
                content: "hi".into(),
            }],
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["systemPrompt"], "");
        assert_eq!(json["history"][0]["role"], "assistant");
    }

    #[test]
    fn test_missing_history_defaults_to_empty() {
        let project: Project = serde_json::from_str(r#"{"id":"p","name":"n"}"#).unwrap();
        assert!(project.history.is_empty());
        assert!(project.system_prompt.is_none());
    }

    #[test]
    fn test_with_message_leaves_original_untouched() {
        let original = Project::new();
        let updated = original.with_message(ChatMessage::user("hello"));

        assert!(original.history.is_empty());
        assert_eq!(updated.history.len(), 1);
        assert_eq!(updated.id, original.id);
    }

    #[test]
    fn test_message_ids_unique() {
        let a = ChatMessage::user("x");
        let b = ChatMessage::user("x");
        assert_ne!(a.id, b.id);
    }
}
