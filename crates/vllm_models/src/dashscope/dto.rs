//! Data transfer objects for the Dashscope multimodal generation API.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One content item of a Dashscope message: `{"text": ..}` or `{"image": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DashscopeContent {
    /// Text item
    Text {
        /// The text
        text: String,
    },
    /// Image item (URL or data URI)
    Image {
        /// Image location
        image: String,
    },
}

/// A message in the Dashscope format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashscopeMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,
    /// Content items
    pub content: Vec<DashscopeContent>,
}

/// The `input` section of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashscopeInput {
    /// Conversation messages
    pub messages: Vec<DashscopeMessage>,
}

/// The `parameters` section of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashscopeParameters {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top-k sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Always `"message"` so replies use the message layout
    pub result_format: String,
    /// Send only new text in each streamed event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incremental_output: Option<bool>,
    /// Additional model parameters
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Dashscope multimodal generation request.
#[derive(Debug, Clone, Serialize, Builder, Getters)]
#[builder(setter(into))]
pub struct DashscopeRequest {
    /// Model identifier
    model: String,
    /// Messages
    input: DashscopeInput,
    /// Generation parameters
    parameters: DashscopeParameters,
}

impl DashscopeRequest {
    /// Creates a new builder for DashscopeRequest.
    pub fn builder() -> DashscopeRequestBuilder {
        DashscopeRequestBuilder::default()
    }
}

/// Response content: a list of items, or a bare string from text-only models.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseContent {
    /// Content items
    Items(Vec<ResponseItem>),
    /// Plain text
    Text(String),
}

impl ResponseContent {
    /// Text items in order.
    pub fn texts(self) -> Vec<String> {
        match self {
            ResponseContent::Items(items) => items.into_iter().filter_map(|i| i.text).collect(),
            ResponseContent::Text(text) => vec![text],
        }
    }
}

/// One returned content item; non-text items are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseItem {
    /// Text, if this item carries any
    #[serde(default)]
    pub text: Option<String>,
}

/// Assistant message in a response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Generated content
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

/// A choice in the response output.
#[derive(Debug, Clone, Deserialize)]
pub struct DashscopeChoice {
    /// The message
    pub message: ResponseMessage,
    /// Reason for finishing; `"null"` while streaming
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The `output` section of a response.
#[derive(Debug, Clone, Deserialize)]
pub struct DashscopeOutput {
    /// Response choices
    #[serde(default)]
    pub choices: Vec<DashscopeChoice>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct DashscopeUsage {
    /// Tokens in the prompt
    #[serde(default)]
    pub input_tokens: Option<u64>,
    /// Tokens in the completion
    #[serde(default)]
    pub output_tokens: Option<u64>,
    /// Total tokens
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// Dashscope multimodal generation response.
///
/// Error bodies share this shape with `code` and `message` set.
#[derive(Debug, Clone, Deserialize)]
pub struct DashscopeResponse {
    /// Generated output
    #[serde(default)]
    pub output: Option<DashscopeOutput>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<DashscopeUsage>,
    /// Request identifier
    #[serde(default)]
    pub request_id: Option<String>,
    /// Error code
    #[serde(default)]
    pub code: Option<String>,
    /// Error message
    #[serde(default)]
    pub message: Option<String>,
}

impl DashscopeResponse {
    /// The error carried by this body, if any.
    pub fn error(&self) -> Option<String> {
        let code = self.code.as_deref().filter(|c| !c.is_empty())?;
        Some(match self.message.as_deref() {
            Some(message) if !message.is_empty() => format!("{}: {}", code, message),
            _ => code.to_string(),
        })
    }
}
