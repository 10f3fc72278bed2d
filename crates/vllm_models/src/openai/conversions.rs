//! Type conversions between vllm-mcp and OpenAI formats.

use crate::media::{prepare_image, prepare_text_file};
use crate::openai::dto::{
    ApiErrorBody, ChatChunk, ChatContent, ChatMessage, ChatRequest, ChatResponse, ContentPart,
};
use tracing::debug;
use vllm_core::{MultimodalRequest, MultimodalResponse, TokenUsage};
use vllm_error::{ContentError, ProviderError, ProviderErrorKind, VllmResult};

/// Builds the message list: optional system message, then one user message
/// with texts, images and text files in that order.
///
/// Files that are not `text/*` are dropped.
pub async fn to_messages(req: &MultimodalRequest) -> VllmResult<Vec<ChatMessage>> {
    let mut messages = Vec::with_capacity(2);

    if let Some(system) = req.system_prompt() {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: ChatContent::Text(system.clone()),
        });
    }

    let mut parts = Vec::new();
    for text in req.text_contents() {
        parts.push(ContentPart::text(text.text().clone()));
    }
    for image in req.image_contents() {
        parts.push(ContentPart::image_url(prepare_image(image).await?));
    }
    for file in req.file_contents().iter().filter(|f| f.is_text()) {
        parts.push(ContentPart::text(prepare_text_file(file).await?));
    }

    debug!(parts = parts.len(), "Built OpenAI user message");
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: ChatContent::Parts(parts),
    });

    Ok(messages)
}

/// Converts a request into the chat completions payload for `model`.
pub async fn to_chat_request(
    req: &MultimodalRequest,
    model: &str,
    stream: bool,
) -> VllmResult<ChatRequest> {
    let messages = to_messages(req).await?;

    let mut builder = ChatRequest::builder();
    builder
        .model(model.to_string())
        .messages(messages)
        .max_tokens(Some(*req.max_tokens()))
        .temperature(Some(*req.temperature()))
        .top_p(*req.top_p())
        .stream(Some(stream))
        .extra(
            req.extra_params()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<serde_json::Map<_, _>>(),
        );

    Ok(builder.build().map_err(|e| {
        ContentError::invalid_input(format!("Failed to build request: {}", e))
    })?)
}

/// Converts a chat completions response.
///
/// An empty choice list becomes a response with `error` set.
pub fn from_chat_response(
    response: ChatResponse,
    requested_model: &str,
) -> VllmResult<MultimodalResponse> {
    let model = response
        .model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| requested_model.to_string());

    let Some(choice) = response.choices.into_iter().next() else {
        return Ok(MultimodalResponse::failure(model, "No response content"));
    };

    let usage = response
        .usage
        .map(|u| TokenUsage::from_parts(u.prompt_tokens, u.completion_tokens, u.total_tokens))
        .unwrap_or_default();

    let mut builder = MultimodalResponse::builder();
    builder.model(model).usage(usage);
    if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
        builder.text_content(text);
    }
    if let Some(reason) = choice.finish_reason {
        builder.finish_reason(reason);
    }

    Ok(builder.build().map_err(|e| {
        ProviderError::new(
            "openai",
            ProviderErrorKind::ResponseParsing(format!("Failed to build response: {}", e)),
        )
    })?)
}

/// Pulls the error message out of an error body, or returns the raw body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Extracts the text delta of one streamed chunk.
pub fn extract_chunk_text(data: &str) -> Result<Option<String>, String> {
    if let Ok(body) = serde_json::from_str::<ApiErrorBody>(data) {
        return Err(body.error.message);
    }
    let chunk: ChatChunk =
        serde_json::from_str(data).map_err(|e| format!("Failed to parse chunk: {}", e))?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vllm_core::{FileContent, ImageContent};

    #[tokio::test]
    async fn test_text_precedes_images_and_files() {
        let binary =
            FileContent::inline("b.bin", "ignored").with_mime_type("application/octet-stream");
        let req = MultimodalRequest::builder()
            .model("gpt-4o")
            .system_prompt("be brief")
            .text_content("describe")
            .image_content(ImageContent::from_url("https://x/cat.png", "image/png"))
            .file_content(FileContent::inline("a.txt", "alpha"))
            .file_content(binary)
            .build()
            .unwrap();

        let payload = serde_json::to_value(to_chat_request(&req, "gpt-4o", false).await.unwrap())
            .unwrap();

        assert_eq!(payload["messages"][0], json!({"role": "system", "content": "be brief"}));
        assert_eq!(
            payload["messages"][1]["content"],
            json!([
                {"type": "text", "text": "describe"},
                {"type": "image_url", "image_url": {"url": "https://x/cat.png"}},
                {"type": "text", "text": "File: a.txt\nalpha"},
            ])
        );
        assert_eq!(payload["stream"], json!(false));
        assert!(payload.get("top_p").is_none());
    }

    #[test]
    fn test_missing_usage_is_zeroed() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "hi"}, "finish_reason": "stop"}]
        }))
        .unwrap();
        let converted = from_chat_response(response, "gpt-4o").unwrap();
        assert_eq!(converted.model(), "gpt-4o");
        assert_eq!(*converted.usage(), Some(TokenUsage::default()));
        assert_eq!(converted.text(), "hi");
    }

    #[test]
    fn test_empty_choices_sets_error() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        let converted = from_chat_response(response, "gpt-4o").unwrap();
        assert_eq!(converted.error().as_deref(), Some("No response content"));
    }

    #[test]
    fn test_chunk_extraction() {
        let data = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(extract_chunk_text(data).unwrap().as_deref(), Some("Hel"));
        assert_eq!(extract_chunk_text(r#"{"choices":[]}"#).unwrap(), None);
        assert!(extract_chunk_text(r#"{"error":{"message":"boom"}}"#).is_err());
    }
}
