//! Normalized multimodal request.

use crate::{FileContent, ImageContent, TextContent};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default completion budget for a request.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default sampling temperature for a request.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Provider-agnostic generation request.
///
/// # Examples
///
/// ```
/// use vllm_core::{ImageContent, MultimodalRequest};
///
/// let request = MultimodalRequest::builder()
///     .model("gpt-4o")
///     .text_content("What is in this picture?")
///     .image_content(ImageContent::from_url("https://example.com/cat.jpg", "image/jpeg"))
///     .build()
///     .unwrap();
///
/// assert!(request.has_multimodal_content());
/// assert_eq!(*request.max_tokens(), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct MultimodalRequest {
    /// Model name
    model: String,
    /// Text parts, in order
    #[builder(default, setter(each(name = "text_content", into)))]
    text_contents: Vec<TextContent>,
    /// Image parts, in order
    #[builder(default, setter(each(name = "image_content")))]
    image_contents: Vec<ImageContent>,
    /// File parts, in order
    #[builder(default, setter(each(name = "file_content")))]
    file_contents: Vec<FileContent>,
    /// Optional system prompt
    #[builder(default, setter(into, strip_option))]
    system_prompt: Option<String>,
    /// Maximum tokens to generate
    #[builder(default = "DEFAULT_MAX_TOKENS")]
    max_tokens: u32,
    /// Sampling temperature
    #[builder(default = "DEFAULT_TEMPERATURE")]
    temperature: f32,
    /// Nucleus sampling cutoff
    #[builder(default, setter(into, strip_option))]
    top_p: Option<f32>,
    /// Top-k sampling cutoff
    #[builder(default, setter(into, strip_option))]
    top_k: Option<u32>,
    /// Whether the caller wants a streamed response
    #[builder(default)]
    stream: bool,
    /// Extra model parameters, passed through untouched
    #[builder(default)]
    extra_params: HashMap<String, serde_json::Value>,
}

impl MultimodalRequest {
    /// Returns a builder for constructing a MultimodalRequest.
    pub fn builder() -> MultimodalRequestBuilder {
        MultimodalRequestBuilder::default()
    }

    /// True when the request carries any image or file.
    pub fn has_multimodal_content(&self) -> bool {
        !self.image_contents.is_empty() || !self.file_contents.is_empty()
    }
}
