//! Relay wire format
//!
//! JSON bodies exchanged between the clients and the completion relay.

use serde::{Deserialize, Serialize};

/// Fixed local address of the completion relay
pub const DEFAULT_CHAT_URL: &str = "http://localhost:8000/api/chat";

/// An attached file, base64-encoded without any data-URI prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileData {
    pub filename: String,
    pub content: String,
}

/// Body of `POST /api/chat`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub azure_endpoint: String,
    pub azure_api_key: String,
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    #[serde(default)]
    pub files: Option<Vec<FileData>>,
}

impl std::fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRequest")
            .field("azure_endpoint", &self.azure_endpoint)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("user_prompt", &self.user_prompt)
            .field(
                "files",
                &self
                    .files
                    .as_ref()
                    .map(|files| files.iter().map(|f| f.filename.as_str()).collect::<Vec<_>>()),
            )
            .finish_non_exhaustive()
    }
}

/// Successful relay answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Error body returned by the relay for non-2xx answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_field_names() {
        let request = ChatRequest {
            azure_endpoint: "https://res.openai.azure.com/".into(),
            azure_api_key: "key".into(),
            model: "gpt-4o".into(),
            system_prompt: "sys".into(),
            user_prompt: "hello".into(),
            files: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["azureEndpoint"], "https://res.openai.azure.com/");
        assert_eq!(json["azureApiKey"], "key");
        assert_eq!(json["systemPrompt"], "sys");
        assert_eq!(json["userPrompt"], "hello");
        assert!(json["files"].is_null());
    }

    #[test]
    fn test_request_without_files_field() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"azureEndpoint":"e","azureApiKey":"k","model":"m","systemPrompt":"s","userPrompt":"u"}"#,
        )
        .unwrap();
        assert!(request.files.is_none());
    }

    #[test]
    fn test_debug_omits_key_and_payloads() {
        let request = ChatRequest {
            azure_endpoint: "e".into(),
            azure_api_key: "sk-secret".into(),
            model: "m".into(),
            system_prompt: "s".into(),
            user_prompt: "u".into(),
            files: Some(vec![FileData {
                filename: "a.csv".into(),
                content: "QUJD".into(),
            }]),
        };
        let debug = format!("{:?}", request);
        assert!(!debug.contains("sk-secret"));
        assert!(!debug.contains("QUJD"));
        assert!(debug.contains("a.csv"));
    }
}
