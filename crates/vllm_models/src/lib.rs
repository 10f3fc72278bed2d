//! Provider adapters for vllm-mcp.
//!
//! Each adapter implements [`MultimodalProvider`](vllm_interface::MultimodalProvider)
//! over plain HTTP with `reqwest`:
//!
//! - [`OpenAIProvider`] speaks the OpenAI chat completions format
//! - [`DashscopeProvider`] speaks the Dashscope multimodal generation format
//!
//! Local images and text files are read and encoded only when a request is
//! translated, never when content values are built.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dashscope;
mod media;
mod openai;
mod sse;

pub use dashscope::{
    DashscopeContent, DashscopeInput, DashscopeMessage, DashscopeParameters, DashscopeProvider,
    DashscopeRequest, DashscopeRequestBuilder, DashscopeResponse,
};
pub use media::{prepare_image, prepare_text_file};
pub use openai::{
    ChatContent, ChatMessage, ChatRequest, ChatRequestBuilder, ChatResponse, ContentPart,
    OpenAIProvider,
};

use std::sync::Arc;
use vllm_core::{ProviderConfig, ProviderType};
use vllm_error::VllmResult;
use vllm_interface::MultimodalProvider;

/// Builds the adapter matching a provider configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn create_provider(config: &ProviderConfig) -> VllmResult<Arc<dyn MultimodalProvider>> {
    let provider: Arc<dyn MultimodalProvider> = match config.provider_type {
        ProviderType::OpenAI => Arc::new(OpenAIProvider::new(config)?),
        ProviderType::Dashscope => Arc::new(DashscopeProvider::new(config)?),
    };
    Ok(provider)
}
