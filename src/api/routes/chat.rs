//! Chat Route
//!
//! - POST /api/chat - Forward one prompt (plus attachments) to Azure OpenAI

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use railchat_core::wire::{ChatRequest, ChatResponse};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::completion::CompletionRequest;
use crate::extract::compose_user_prompt;

/// POST /api/chat
///
/// Extracts text from attached CSV and PDF files, appends it to the user
/// prompt and returns the model's answer as `{"response": ...}`.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(mut req) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    let files = req.files.take();
    tracing::info!(
        model = %req.model,
        files = files.as_ref().map_or(0, Vec::len),
        prompt_chars = req.user_prompt.len(),
        "Received chat request"
    );

    // Decoding and PDF parsing are CPU-bound.
    let prompt = std::mem::take(&mut req.user_prompt);
    let user_prompt = tokio::task::spawn_blocking(move || compose_user_prompt(&prompt, files.as_deref()))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let completion = CompletionRequest {
        endpoint: req.azure_endpoint,
        api_key: req.azure_api_key,
        model: req.model,
        system_prompt: req.system_prompt,
        user_prompt,
    };

    let response = state.backend.complete(&completion).await?;
    tracing::info!(model = %completion.model, response_chars = response.len(), "Chat request completed");

    Ok(Json(ChatResponse { response }))
}
