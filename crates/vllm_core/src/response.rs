//! Normalized multimodal response.

use crate::{FileContent, ImageContent, TextContent, TokenUsage};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Provider-agnostic generation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct MultimodalResponse {
    /// Returned text parts
    #[builder(default, setter(each(name = "text_content", into)))]
    text_contents: Vec<TextContent>,
    /// Returned images
    #[builder(default)]
    image_contents: Vec<ImageContent>,
    /// Returned files
    #[builder(default)]
    file_contents: Vec<FileContent>,
    /// Model that produced the response
    model: String,
    /// Token usage
    #[builder(default, setter(strip_option))]
    usage: Option<TokenUsage>,
    /// Why generation stopped
    #[builder(default, setter(into, strip_option))]
    finish_reason: Option<String>,
    /// Wall-clock time of the upstream call
    #[builder(default, setter(strip_option))]
    response_time_seconds: Option<f64>,
    /// Error reported by the provider
    #[builder(default, setter(into, strip_option))]
    error: Option<String>,
}

impl MultimodalResponse {
    /// Returns a builder for constructing a MultimodalResponse.
    pub fn builder() -> MultimodalResponseBuilder {
        MultimodalResponseBuilder::default()
    }

    /// A response that carries only an error.
    pub fn failure(model: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            text_contents: Vec::new(),
            image_contents: Vec::new(),
            file_contents: Vec::new(),
            model: model.into(),
            usage: None,
            finish_reason: None,
            response_time_seconds: None,
            error: Some(error.into()),
        }
    }

    /// All text parts joined by newlines.
    pub fn text(&self) -> String {
        self.text_contents
            .iter()
            .map(|t| t.text().as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Records the wall-clock time of the call that produced this response.
    pub fn with_response_time(mut self, seconds: f64) -> Self {
        self.response_time_seconds = Some(seconds);
        self
    }
}
