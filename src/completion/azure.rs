//! Azure OpenAI chat completions client
//!
//! Calls `{endpoint}/openai/deployments/{deployment}/chat/completions`
//! with the caller's key in the `api-key` header. Endpoint and key come
//! with each request, so one client serves every user of the relay.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{CompletionBackend, CompletionError, CompletionRequest, EMPTY_CONTENT};
use crate::config::CompletionConfig;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub struct AzureOpenAiClient {
    http: Client,
    config: CompletionConfig,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    messages: [ChatCompletionMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl AzureOpenAiClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CompletionError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Deployment to call: the pinned one if configured, else the requested model
    pub fn deployment<'a>(&'a self, model: &'a str) -> &'a str {
        self.config.deployment.as_deref().unwrap_or(model)
    }

    /// Build the chat completions URL for `endpoint` and `deployment`
    pub fn chat_url(&self, endpoint: &str, deployment: &str) -> Result<Url, CompletionError> {
        let invalid = |reason: String| {
            CompletionError::Internal(format!("invalid Azure endpoint {:?}: {}", endpoint, reason))
        };

        let mut url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["openai", "deployments", deployment, "chat", "completions"]);
        url.query_pairs_mut()
            .clear()
            .append_pair("api-version", &self.config.api_version);

        Ok(url)
    }
}

#[async_trait]
impl CompletionBackend for AzureOpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let deployment = self.deployment(&request.model);
        let url = self.chat_url(&request.endpoint, deployment)?;

        let body = ChatCompletionBody {
            messages: [
                ChatCompletionMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatCompletionMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(deployment = %deployment, host = ?url.host_str(), "Calling Azure OpenAI");

        let response = self
            .http
            .post(url)
            .header("api-key", &request.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Api("Request timed out.".to_string())
                } else if e.is_connect() {
                    CompletionError::Api("Connection error.".to_string())
                } else {
                    CompletionError::Internal(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Api(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), deployment = %deployment, "Azure OpenAI request failed");
            return Err(CompletionError::from_status(status.as_u16(), &text));
        }

        parse_completion(&text)
    }
}

/// First choice's content; empty content maps to [`EMPTY_CONTENT`]
fn parse_completion(text: &str) -> Result<String, CompletionError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(text)
        .map_err(|e| CompletionError::Api(format!("invalid response body: {}", e)))?;

    let message = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or(CompletionError::MissingChoices)?;

    Ok(message
        .content
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| EMPTY_CONTENT.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> AzureOpenAiClient {
        AzureOpenAiClient::new(CompletionConfig::default()).unwrap()
    }

    fn request(endpoint: &str) -> CompletionRequest {
        CompletionRequest {
            endpoint: endpoint.to_string(),
            api_key: "secret".into(),
            model: "gpt-4o".into(),
            system_prompt: "Be brief.".into(),
            user_prompt: "hello".into(),
        }
    }

    fn completion(content: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })
    }

    #[test]
    fn test_chat_url() {
        let client = client();
        let url = client
            .chat_url("https://res.openai.azure.com/", "gpt-4o")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://res.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2025-03-01-preview"
        );

        assert!(matches!(
            client.chat_url("not a url", "gpt-4o"),
            Err(CompletionError::Internal(_))
        ));
    }

    #[test]
    fn test_pinned_deployment() {
        let pinned = AzureOpenAiClient::new(CompletionConfig {
            deployment: Some("gpt-4-32k".into()),
            ..CompletionConfig::default()
        })
        .unwrap();
        assert_eq!(pinned.deployment("gpt-4o"), "gpt-4-32k");
        assert_eq!(client().deployment("gpt-4o"), "gpt-4o");
    }

    #[test]
    fn test_parse_completion() {
        assert_eq!(
            parse_completion(&completion(json!("hi")).to_string()).unwrap(),
            "hi"
        );
        assert_eq!(
            parse_completion(&completion(json!(null)).to_string()).unwrap(),
            EMPTY_CONTENT
        );
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(CompletionError::MissingChoices)
        ));
    }

    #[tokio::test]
    async fn test_complete_sends_messages_and_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/openai/deployments/gpt-4o/chat/completions"))
            .and(query_param("api-version", "2025-03-01-preview"))
            .and(header("api-key", "secret"))
            .and(body_partial_json(json!({
                "max_tokens": 1000,
                "messages": [
                    { "role": "system", "content": "Be brief." },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("hi there"))))
            .expect(1)
            .mount(&server)
            .await;

        let content = client().complete(&request(&server.uri())).await.unwrap();
        assert_eq!(content, "hi there");
    }

    #[tokio::test]
    async fn test_upstream_errors_are_mapped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":{"message":"invalid key"}}"#),
            )
            .mount(&server)
            .await;

        let err = client().complete(&request(&server.uri())).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert!(err.to_string().starts_with("Azure OpenAI Authentication Error: Error code: 401"));
        assert!(err.to_string().contains("invalid key"));
    }

    #[tokio::test]
    async fn test_rate_limit_and_server_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/openai/deployments/busy/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/broken/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let busy = CompletionRequest {
            model: "busy".into(),
            ..request(&server.uri())
        };
        let err = client().complete(&busy).await.unwrap_err();
        assert!(matches!(err, CompletionError::RateLimited(_)));

        let broken = CompletionRequest {
            model: "broken".into(),
            ..request(&server.uri())
        };
        let err = client().complete(&broken).await.unwrap_err();
        assert!(matches!(err, CompletionError::Api(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = client().complete(&request(&server.uri())).await.unwrap_err();
        assert!(matches!(err, CompletionError::MissingChoices));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let err = client()
            .complete(&request("http://127.0.0.1:1"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
