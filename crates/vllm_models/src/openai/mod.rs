//! OpenAI chat completions adapter.
//!
//! Text, images and text files become `text` / `image_url` content parts of a
//! single user message, after an optional system message.

mod client;
mod conversions;
mod dto;

pub use client::OpenAIProvider;
pub use dto::{ChatContent, ChatMessage, ChatRequest, ChatRequestBuilder, ChatResponse, ContentPart};
