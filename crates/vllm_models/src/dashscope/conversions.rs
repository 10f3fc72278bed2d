//! Type conversions between vllm-mcp and Dashscope formats.

use crate::dashscope::dto::{
    DashscopeContent, DashscopeInput, DashscopeMessage, DashscopeParameters, DashscopeRequest,
    DashscopeResponse,
};
use crate::media::{prepare_image, prepare_text_file};
use tracing::debug;
use vllm_core::{MultimodalRequest, MultimodalResponse, TokenUsage};
use vllm_error::{ContentError, ProviderError, ProviderErrorKind, VllmResult};

/// Builds the message list: optional system message, then one user message
/// with texts, images and text files in that order.
pub async fn to_messages(req: &MultimodalRequest) -> VllmResult<Vec<DashscopeMessage>> {
    let mut messages = Vec::with_capacity(2);

    if let Some(system) = req.system_prompt() {
        messages.push(DashscopeMessage {
            role: "system".to_string(),
            content: vec![DashscopeContent::Text {
                text: system.clone(),
            }],
        });
    }

    let mut content = Vec::new();
    for text in req.text_contents() {
        content.push(DashscopeContent::Text {
            text: text.text().clone(),
        });
    }
    for image in req.image_contents() {
        content.push(DashscopeContent::Image {
            image: prepare_image(image).await?,
        });
    }
    for file in req.file_contents().iter().filter(|f| f.is_text()) {
        content.push(DashscopeContent::Text {
            text: prepare_text_file(file).await?,
        });
    }

    debug!(items = content.len(), "Built Dashscope user message");
    messages.push(DashscopeMessage {
        role: "user".to_string(),
        content,
    });

    Ok(messages)
}

/// Converts a request into the generation payload for `model`.
pub async fn to_dashscope_request(
    req: &MultimodalRequest,
    model: &str,
    stream: bool,
) -> VllmResult<DashscopeRequest> {
    let messages = to_messages(req).await?;
    let parameters = DashscopeParameters {
        max_tokens: *req.max_tokens(),
        temperature: *req.temperature(),
        top_p: *req.top_p(),
        top_k: *req.top_k(),
        result_format: "message".to_string(),
        incremental_output: stream.then_some(true),
        extra: req
            .extra_params()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    };

    Ok(DashscopeRequest::builder()
        .model(model.to_string())
        .input(DashscopeInput { messages })
        .parameters(parameters)
        .build()
        .map_err(|e| ContentError::invalid_input(format!("Failed to build request: {}", e)))?)
}

/// Converts a generation response.
///
/// Error bodies and empty outputs become a response with `error` set.
pub fn from_dashscope_response(
    response: DashscopeResponse,
    requested_model: &str,
) -> VllmResult<MultimodalResponse> {
    if let Some(error) = response.error() {
        return Ok(MultimodalResponse::failure(
            requested_model,
            format!("Dashscope API error: {}", error),
        ));
    }

    let Some(choice) = response
        .output
        .and_then(|o| o.choices.into_iter().next())
    else {
        return Ok(MultimodalResponse::failure(
            requested_model,
            "No response content",
        ));
    };

    let usage = response
        .usage
        .map(|u| TokenUsage::from_parts(u.input_tokens, u.output_tokens, u.total_tokens))
        .unwrap_or_default();

    let mut builder = MultimodalResponse::builder();
    builder.model(requested_model.to_string()).usage(usage);
    for text in choice
        .message
        .content
        .map(|c| c.texts())
        .unwrap_or_default()
    {
        builder.text_content(text);
    }
    if let Some(reason) = choice.finish_reason.filter(|r| r != "null") {
        builder.finish_reason(reason);
    }

    Ok(builder.build().map_err(|e| {
        ProviderError::new(
            "dashscope",
            ProviderErrorKind::ResponseParsing(format!("Failed to build response: {}", e)),
        )
    })?)
}

/// Pulls the error out of an error body, or returns the raw body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<DashscopeResponse>(body)
        .ok()
        .and_then(|r| r.error())
        .unwrap_or_else(|| body.to_string())
}

/// Extracts the text of one incremental event.
pub fn extract_event_text(data: &str) -> Result<Option<String>, String> {
    let event: DashscopeResponse =
        serde_json::from_str(data).map_err(|e| format!("Failed to parse event: {}", e))?;
    if let Some(error) = event.error() {
        return Err(error);
    }
    let text = event
        .output
        .and_then(|o| o.choices.into_iter().next())
        .and_then(|c| c.message.content)
        .map(|c| c.texts().concat());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vllm_core::{FileContent, ImageContent};

    #[tokio::test]
    async fn test_payload_layout() {
        let req = MultimodalRequest::builder()
            .model("qwen-vl-plus")
            .system_prompt("be brief")
            .text_content("describe")
            .image_content(ImageContent::from_url("https://x/cat.png", "image/png"))
            .file_content(FileContent::inline("a.md", "# alpha"))
            .top_k(5u32)
            .build()
            .unwrap();

        let payload =
            serde_json::to_value(to_dashscope_request(&req, "qwen-vl-max", false).await.unwrap())
                .unwrap();

        assert_eq!(payload["model"], json!("qwen-vl-max"));
        assert_eq!(
            payload["input"]["messages"],
            json!([
                {"role": "system", "content": [{"text": "be brief"}]},
                {"role": "user", "content": [
                    {"text": "describe"},
                    {"image": "https://x/cat.png"},
                    {"text": "File: a.md\n# alpha"},
                ]},
            ])
        );
        assert_eq!(payload["parameters"]["result_format"], json!("message"));
        assert_eq!(payload["parameters"]["max_tokens"], json!(1000));
        assert_eq!(payload["parameters"]["top_k"], json!(5));
        assert!(payload["parameters"].get("top_p").is_none());
        assert!(payload["parameters"].get("incremental_output").is_none());
    }

    #[test]
    fn test_response_texts_and_usage() {
        let response: DashscopeResponse = serde_json::from_value(json!({
            "output": {"choices": [{
                "finish_reason": "stop",
                "message": {"role": "assistant", "content": [{"text": "a"}, {"text": "b"}]}
            }]},
            "usage": {"input_tokens": 10, "output_tokens": 4},
            "request_id": "r1"
        }))
        .unwrap();

        let converted = from_dashscope_response(response, "qwen-vl-plus").unwrap();
        assert_eq!(converted.text(), "a\nb");
        assert_eq!(*converted.usage(), Some(TokenUsage::new(10, 4, 14)));
        assert_eq!(converted.finish_reason().as_deref(), Some("stop"));
    }

    #[test]
    fn test_error_body_sets_error() {
        let response: DashscopeResponse = serde_json::from_value(json!({
            "code": "InvalidApiKey",
            "message": "Invalid API-key provided.",
            "request_id": "r2"
        }))
        .unwrap();
        let converted = from_dashscope_response(response, "qwen-vl-plus").unwrap();
        assert_eq!(
            converted.error().as_deref(),
            Some("Dashscope API error: InvalidApiKey: Invalid API-key provided.")
        );
    }

    #[test]
    fn test_event_extraction() {
        let data = r#"{"output":{"choices":[{"message":{"content":[{"text":"Hi"}]},"finish_reason":"null"}]}}"#;
        assert_eq!(extract_event_text(data).unwrap().as_deref(), Some("Hi"));
        assert!(extract_event_text(r#"{"code":"Throttling","message":"slow down"}"#).is_err());
    }
}
