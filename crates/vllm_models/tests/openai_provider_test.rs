//! OpenAI adapter tests against a mock chat completions server.

use futures_util::StreamExt;
use serde_json::json;
use std::io::Write;
use vllm_core::{ImageContent, MultimodalRequest, ProviderConfig, ProviderType};
use vllm_interface::MultimodalProvider;
use vllm_models::OpenAIProvider;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> OpenAIProvider {
    let mut config = ProviderConfig::new(ProviderType::OpenAI, "test-key");
    config.base_url = Some(format!("{}/", server.uri()));
    config
        .model_mapping
        .insert("vision".to_string(), "gpt-4o".to_string());
    OpenAIProvider::new(&config).unwrap()
}

#[tokio::test]
async fn test_generate_maps_choices_and_usage() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "stream": false,
            "messages": [{"role": "user", "content": [
                {"type": "text", "text": "What is this?"},
                {"type": "image_url", "image_url": {"url": "https://example.com/cat.jpg"}}
            ]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-2024-08-06",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "A cat."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = MultimodalRequest::builder()
        .model("vision")
        .text_content("What is this?")
        .image_content(ImageContent::from_url("https://example.com/cat.jpg", "image/jpeg"))
        .build()?;

    let response = provider_for(&server).generate_response(&request).await?;

    assert_eq!(response.text(), "A cat.");
    assert_eq!(response.model(), "gpt-4o-2024-08-06");
    assert_eq!(response.finish_reason().as_deref(), Some("stop"));
    let usage = response.usage().expect("usage is always populated");
    assert_eq!(*usage.total_tokens(), 12);
    assert!(response.response_time_seconds().is_some());
    assert!(response.error().is_none());
    Ok(())
}

#[tokio::test]
async fn test_error_status_becomes_error_response() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let request = MultimodalRequest::builder()
        .model("gpt-4o")
        .text_content("hi")
        .build()?;
    let response = provider_for(&server).generate_response(&request).await?;

    let error = response.error().clone().unwrap_or_default();
    assert!(error.contains("openai"));
    assert!(error.contains("401"));
    assert!(error.contains("Incorrect API key provided"));
    assert!(response.text_contents().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let request = MultimodalRequest::builder().model("gpt-4o").build()?;
    let err = provider_for(&server)
        .generate_response(&request)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Response parsing failed"));
    Ok(())
}

#[tokio::test]
async fn test_local_image_is_sent_as_data_uri() -> Result<(), Box<dyn std::error::Error>> {
    let mut image = tempfile::Builder::new().suffix(".png").tempfile()?;
    image.write_all(&[0x89, b'P', b'N', b'G'])?;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": [
                {"type": "image_url", "image_url": {"url": "data:image/png;base64,iVBORw=="}}
            ]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "png"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = MultimodalRequest::builder()
        .model("gpt-4o")
        .image_content(ImageContent::from_path(image.path()))
        .build()?;
    let response = provider_for(&server).generate_response(&request).await?;
    assert_eq!(response.text(), "png");
    Ok(())
}

#[tokio::test]
async fn test_missing_local_image_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("missing.jpg");

    let request = MultimodalRequest::builder()
        .model("gpt-4o")
        .image_content(ImageContent::from_path(&missing))
        .build()?;
    let err = provider_for(&server)
        .generate_response(&request)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains(&missing.display().to_string()));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_stream_yields_deltas() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let request = MultimodalRequest::builder()
        .model("gpt-4o")
        .text_content("hi")
        .stream(true)
        .build()?;
    let chunks: Vec<String> = provider_for(&server)
        .stream_response(&request)
        .await
        .collect()
        .await;

    assert_eq!(chunks, vec!["Hel".to_string(), "lo".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_stream_failure_yields_error_chunk() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let request = MultimodalRequest::builder().model("gpt-4o").build()?;
    let chunks: Vec<String> = provider_for(&server)
        .stream_response(&request)
        .await
        .collect()
        .await;

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].starts_with("Error: "));
    assert!(chunks[0].contains("upstream down"));
    Ok(())
}
