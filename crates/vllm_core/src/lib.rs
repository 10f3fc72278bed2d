//! Core data types for vllm-mcp.
//!
//! This crate holds the provider-agnostic request/response shapes that sit
//! between the MCP tool surface and the individual provider adapters.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod content;
mod mime;
mod provider;
mod request;
mod response;
mod token_usage;

pub use content::{
    FileContent, FileContentBuilder, FileContentBuilderError, ImageContent, ImageContentBuilder,
    ImageContentBuilderError, ImageSource, TextContent,
};
pub use mime::{guess_mime_from_path, is_image_mime, is_text_mime};
pub use provider::{ImagePolicy, ProviderConfig, ProviderType, parse_model_list};
pub use request::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, MultimodalRequest, MultimodalRequestBuilder,
    MultimodalRequestBuilderError,
};
pub use response::{MultimodalResponse, MultimodalResponseBuilder, MultimodalResponseBuilderError};
pub use token_usage::TokenUsage;
