//! Dispatch tests with both providers pointed at mock servers.

use serde_json::json;
use std::io::Write;
use vllm_core::{ProviderConfig, ProviderType};
use vllm_mcp::{Dispatcher, GenerateParams, McpError, ServerConfig, ValidateParams};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DASHSCOPE_PATH: &str = "/services/aigc/multimodal-generation/generation";

struct Upstreams {
    openai: MockServer,
    dashscope: MockServer,
}

impl Upstreams {
    async fn start() -> Self {
        let openai = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o",
                "choices": [{"message": {"content": "from openai"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
            })))
            .mount(&openai)
            .await;

        let dashscope = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DASHSCOPE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": {"choices": [{
                    "finish_reason": "stop",
                    "message": {"content": [{"text": "from dashscope"}]}
                }]},
                "usage": {"input_tokens": 3, "output_tokens": 1, "total_tokens": 4}
            })))
            .mount(&dashscope)
            .await;

        Self { openai, dashscope }
    }

    fn config(&self) -> ServerConfig {
        let mut openai = ProviderConfig::new(ProviderType::OpenAI, "sk-openai");
        openai.base_url = Some(self.openai.uri());
        let mut dashscope = ProviderConfig::new(ProviderType::Dashscope, "sk-dashscope");
        dashscope.base_url = Some(self.dashscope.uri());
        ServerConfig {
            providers: vec![dashscope, openai],
            ..ServerConfig::default()
        }
    }
}

fn validate(dispatcher: &Dispatcher, model: &str, images: usize) -> String {
    dispatcher.validate(&ValidateParams::new(model, images))
}

#[tokio::test]
async fn test_model_prefix_selects_provider() -> Result<(), Box<dyn std::error::Error>> {
    let upstreams = Upstreams::start().await;
    let dispatcher = Dispatcher::new(&upstreams.config())?;

    let openai = dispatcher.resolve_provider("gpt-4o", None)?;
    assert_eq!(openai.adapter().provider_type(), ProviderType::OpenAI);
    let dashscope = dispatcher.resolve_provider("qwen-vl-plus", None)?;
    assert_eq!(dashscope.adapter().provider_type(), ProviderType::Dashscope);

    let reply = dispatcher
        .generate(&GenerateParams::new("gpt-4o", "hello"))
        .await;
    assert_eq!(
        reply,
        "from openai\n\n[Token usage: prompt=5, completion=2, total=7]"
    );

    let reply = dispatcher
        .generate(&GenerateParams::new("qwen-vl-plus", "hello"))
        .await;
    assert!(reply.starts_with("from dashscope"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_model_falls_back_to_first() -> Result<(), Box<dyn std::error::Error>> {
    let upstreams = Upstreams::start().await;
    let dispatcher = Dispatcher::new(&upstreams.config())?;

    assert_eq!(dispatcher.provider_names(), vec!["openai", "dashscope"]);
    let fallback = dispatcher.resolve_provider("llava-1.6", None)?;
    assert_eq!(fallback.adapter().provider_type(), ProviderType::OpenAI);

    let explicit = dispatcher.resolve_provider("llava-1.6", Some("dashscope"))?;
    assert_eq!(explicit.adapter().provider_type(), ProviderType::Dashscope);

    let wrong_case = dispatcher.resolve_provider("llava-1.6", Some("Dashscope"));
    assert!(matches!(
        wrong_case,
        Err(McpError::ProviderUnavailable(name)) if name == "Dashscope"
    ));
    Ok(())
}

#[tokio::test]
async fn test_providers_without_keys_are_excluded() -> Result<(), Box<dyn std::error::Error>> {
    let upstreams = Upstreams::start().await;
    let mut config = upstreams.config();
    config.providers[1].api_key.clear();
    let dispatcher = Dispatcher::new(&config)?;

    assert_eq!(dispatcher.provider_names(), vec!["dashscope"]);
    let reply = dispatcher
        .generate(&GenerateParams::new("gpt-4o", "hello"))
        .await;
    assert_eq!(reply, "Error: Provider 'openai' not available");
    Ok(())
}

#[tokio::test]
async fn test_validation_limits() -> Result<(), Box<dyn std::error::Error>> {
    let upstreams = Upstreams::start().await;
    let dispatcher = Dispatcher::new(&upstreams.config())?;

    assert_eq!(
        validate(&dispatcher, "qwen-vl-plus", 0),
        "Request is valid for provider 'dashscope'"
    );
    assert_eq!(
        validate(&dispatcher, "qwen-vl-plus", 11),
        "Request is invalid for provider 'dashscope'"
    );
    assert_eq!(
        validate(&dispatcher, "unknown-model", 0),
        "Request is invalid for provider 'openai'"
    );
    assert_eq!(
        validate(&dispatcher, "gpt-4o", 5),
        "Request is valid for provider 'openai'"
    );
    assert_eq!(
        validate(&dispatcher, "gpt-4o", 6),
        "Request is invalid for provider 'openai'"
    );
    Ok(())
}

#[tokio::test]
async fn test_huge_counts_stay_bounded() -> Result<(), Box<dyn std::error::Error>> {
    let upstreams = Upstreams::start().await;
    let dispatcher = Dispatcher::new(&upstreams.config())?;

    assert_eq!(
        validate(&dispatcher, "gpt-4o", usize::MAX),
        "Request is invalid for provider 'openai'"
    );
    let params = ValidateParams {
        model: "qwen-vl-plus".to_string(),
        image_count: 0,
        file_count: usize::MAX,
        provider: None,
    };
    assert_eq!(
        dispatcher.validate(&params),
        "Request is valid for provider 'dashscope'"
    );
    Ok(())
}

#[tokio::test]
async fn test_configured_image_ceiling_overrides_default() -> Result<(), Box<dyn std::error::Error>>
{
    let upstreams = Upstreams::start().await;
    let mut config = upstreams.config();
    config.providers[1].max_images = Some(8);
    let dispatcher = Dispatcher::new(&config)?;

    assert!(validate(&dispatcher, "gpt-4o", 8).starts_with("Request is valid"));
    assert!(validate(&dispatcher, "gpt-4o", 9).starts_with("Request is invalid"));
    Ok(())
}

#[tokio::test]
async fn test_list_providers_keys_match_registry() -> Result<(), Box<dyn std::error::Error>> {
    let upstreams = Upstreams::start().await;
    let dispatcher = Dispatcher::new(&upstreams.config())?;

    let listing = dispatcher.list_providers();
    let object = listing.as_object().ok_or("listing is not an object")?;
    let mut keys: Vec<_> = object.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["dashscope".to_string(), "openai".to_string()]);

    let openai = &object["openai"];
    assert_eq!(openai["type"], json!("openai"));
    assert_eq!(openai["default_model"], json!("gpt-4o"));
    assert_eq!(openai["max_tokens"], json!(4000));
    assert_eq!(openai["temperature"], json!(0.7));
    assert_eq!(openai["supported_models"].as_array().map(Vec::len), Some(4));
    Ok(())
}

#[tokio::test]
async fn test_missing_file_path_reports_path() -> Result<(), Box<dyn std::error::Error>> {
    let upstreams = Upstreams::start().await;
    let dispatcher = Dispatcher::new(&upstreams.config())?;

    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("nowhere.png");
    let mut params = GenerateParams::new("gpt-4o", "describe");
    params.file_paths = Some(vec![missing.display().to_string()]);

    let reply = dispatcher.generate(&params).await;
    assert!(reply.starts_with("Error: "));
    assert!(reply.contains("File not found"));
    assert!(reply.contains(&missing.display().to_string()));
    assert!(
        upstreams
            .openai
            .received_requests()
            .await
            .unwrap_or_default()
            .is_empty()
    );
    Ok(())
}

#[tokio::test]
async fn test_file_paths_are_routed_by_type() -> Result<(), Box<dyn std::error::Error>> {
    let upstreams = Upstreams::start().await;
    let dir = tempfile::tempdir()?;

    let notes = dir.path().join("notes.txt");
    std::fs::File::create(&notes)?.write_all(b"remember")?;
    let photo = dir.path().join("photo.png");
    std::fs::File::create(&photo)?.write_all(&[0x89, b'P', b'N', b'G'])?;
    let blob = dir.path().join("data.bin");
    std::fs::File::create(&blob)?.write_all(&[0, 1, 2])?;

    let strict = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DASHSCOPE_PATH))
        .and(body_partial_json(json!({
            "input": {"messages": [{"role": "user", "content": [
                {"text": "compare"},
                {"image": "https://example.com/chart.gif"},
                {"image": "data:image/png;base64,iVBORw=="},
                {"text": "File: notes.txt\nremember"}
            ]}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"choices": [{"message": {"content": [{"text": "done"}]}}]}
        })))
        .expect(1)
        .mount(&strict)
        .await;

    let mut config = upstreams.config();
    config.providers[0].base_url = Some(strict.uri());
    let dispatcher = Dispatcher::new(&config)?;

    let mut params = GenerateParams::new("qwen-vl-max", "compare");
    params.image_urls = Some(vec!["https://example.com/chart.gif".to_string()]);
    params.file_paths = Some(vec![
        photo.display().to_string(),
        notes.display().to_string(),
        blob.display().to_string(),
    ]);

    let reply = dispatcher.generate(&params).await;
    assert!(reply.starts_with("done"), "unexpected reply: {}", reply);
    Ok(())
}

#[tokio::test]
async fn test_upstream_error_becomes_error_text() -> Result<(), Box<dyn std::error::Error>> {
    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "Rate limit reached"}
        })))
        .mount(&failing)
        .await;

    let mut openai = ProviderConfig::new(ProviderType::OpenAI, "sk");
    openai.base_url = Some(failing.uri());
    let config = ServerConfig {
        providers: vec![openai],
        ..ServerConfig::default()
    };
    let dispatcher = Dispatcher::new(&config)?;

    let reply = dispatcher
        .generate(&GenerateParams::new("gpt-4o", "hi"))
        .await;
    assert!(reply.starts_with("Error: "));
    assert!(reply.contains("429"));
    assert!(reply.contains("Rate limit reached"));
    Ok(())
}

#[tokio::test]
async fn test_strict_mode_rejects_before_upstream() -> Result<(), Box<dyn std::error::Error>> {
    let upstreams = Upstreams::start().await;
    let mut config = upstreams.config();
    config.validate_requests = true;
    let dispatcher = Dispatcher::new(&config)?;

    let reply = dispatcher
        .generate(&GenerateParams::new("gpt-3.5-turbo", "hi"))
        .await;
    assert!(reply.starts_with("Error: Validation Error"));
    assert!(
        upstreams
            .openai
            .received_requests()
            .await
            .unwrap_or_default()
            .is_empty()
    );
    Ok(())
}
