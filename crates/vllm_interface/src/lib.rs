//! Trait definitions for vllm-mcp provider adapters.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod provider;

pub use provider::{MultimodalProvider, TextStream};
