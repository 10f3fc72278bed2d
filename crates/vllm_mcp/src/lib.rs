//! Model Context Protocol (MCP) server for multimodal model dispatch.
//!
//! The server exposes three tools over MCP:
//!
//! - `generate_multimodal_response`: send text, images and files to a model
//! - `list_available_providers`: describe the configured providers
//! - `validate_multimodal_request`: check a request shape against provider limits
//!
//! Providers are OpenAI and Dashscope; a provider takes part only when its
//! API key is configured. Tools are served over stdio, streamable HTTP
//! (`/mcp`) or SSE (`/sse` and `/message`).
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use vllm_mcp::{Dispatcher, ServerConfig, ToolRegistry, TransportKind, VllmRouter, serve};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load(None)?;
//!     let dispatcher = Arc::new(Dispatcher::new(&config)?);
//!
//!     let router = VllmRouter::builder()
//!         .name("vllm-mcp")
//!         .tools(ToolRegistry::with_dispatcher(dispatcher))
//!         .build();
//!
//!     serve(router, TransportKind::Stdio, &config.host, config.port).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dispatch;
mod error;
pub mod network;
mod server;
pub mod tools;
mod transport;

pub use config::{ConfigSource, ServerConfig};
pub use dispatch::{Dispatcher, GenerateParams, RegisteredProvider, ValidateParams};
pub use error::{McpError, McpResult};
pub use network::NetworkHandler;
pub use server::{VllmRouter, VllmRouterBuilder};
pub use tools::{
    GenerateMultimodalResponseTool, ListAvailableProvidersTool, McpTool, ToolRegistry,
    ValidateMultimodalRequestTool,
};
pub use transport::{TransportKind, serve};

// Re-export key mcp-server types for convenience
pub use mcp_server::router::RouterService;
pub use mcp_server::{ByteTransport, Router, Server};
