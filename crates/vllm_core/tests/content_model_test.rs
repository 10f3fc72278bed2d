//! Tests for content model construction and derived properties.

use vllm_core::{
    FileContent, ImageContent, MultimodalRequest, MultimodalResponse, ProviderConfig, TextContent,
    TokenUsage, guess_mime_from_path,
};

#[test]
fn test_local_path_mime_matches_extension_guess() {
    for path in ["/a/b.png", "/a/b.jpeg", "/a/b.webp", "c.gif", "/x/y.bmp", "/x/y.nope", "plain"] {
        let image = ImageContent::from_path(path);
        assert_eq!(
            image.mime_type().clone(),
            guess_mime_from_path(path),
            "mismatch for {path}"
        );
    }
}

#[test]
fn test_has_multimodal_content_matches_lengths() {
    let cases = [(0usize, 0usize), (1, 0), (0, 1), (3, 2)];
    for (images, files) in cases {
        let mut builder = MultimodalRequest::builder();
        builder.model("gpt-4o").text_content("describe");
        for i in 0..images {
            let url = format!("https://x/{i}.jpg");
            builder.image_content(ImageContent::from_url(url, "image/jpeg"));
        }
        for i in 0..files {
            builder.file_content(FileContent::inline(format!("f{i}.txt"), "body"));
        }
        let request = builder.build().expect("Valid request");
        assert_eq!(
            request.has_multimodal_content(),
            !request.image_contents().is_empty() || !request.file_contents().is_empty()
        );
        assert_eq!(request.image_contents().len(), images);
        assert_eq!(request.file_contents().len(), files);
    }
}

#[test]
fn test_request_preserves_part_order() {
    let request = MultimodalRequest::builder()
        .model("qwen-vl-max")
        .text_content("one")
        .text_content(TextContent::new("two"))
        .build()
        .expect("Valid request");
    let texts: Vec<_> = request.text_contents().iter().map(|t| t.text().as_str()).collect();
    assert_eq!(texts, ["one", "two"]);
}

#[test]
fn test_response_serializes_usage() {
    let response = MultimodalResponse::builder()
        .model("gpt-4o")
        .text_content("ok")
        .usage(TokenUsage::new(1, 2, 3))
        .finish_reason("stop")
        .build()
        .expect("Valid response");

    let json = serde_json::to_value(&response).expect("Serializable");
    assert_eq!(json["usage"]["total_tokens"], 3);
    assert_eq!(json["finish_reason"], "stop");
}

#[test]
fn test_provider_config_from_toml() {
    let config: ProviderConfig = toml::from_str(
        r#"
provider_type = "openai"
api_key = "sk-test"
base_url = "http://localhost:9000/v1/"
supported_models = ["gpt-4o", "gpt-4.1"]
max_images = 8

[model_mapping]
vision = "gpt-4o"
"#,
    )
    .expect("Valid TOML");

    assert!(config.has_credentials());
    assert_eq!(config.resolved_base_url(), "http://localhost:9000/v1");
    assert_eq!(config.resolved_supported_models(), ["gpt-4o", "gpt-4.1"]);
    assert_eq!(*config.image_policy().max_images(), 8);
    assert_eq!(config.model_mapping.get("vision").map(String::as_str), Some("gpt-4o"));
}
