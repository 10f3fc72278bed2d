//! Error types for the MCP layer.

use vllm_error::VllmError;

/// Errors raised while serving an MCP request.
#[derive(Debug, derive_more::Display, derive_more::From)]
pub enum McpError {
    /// Tool arguments could not be decoded
    #[display("Invalid input: {}", _0)]
    #[from(ignore)]
    InvalidInput(String),

    /// No tool with this name is registered
    #[display("Tool not found: {}", _0)]
    #[from(ignore)]
    ToolNotFound(String),

    /// The requested provider is not registered
    #[display("Provider '{}' not available", _0)]
    #[from(ignore)]
    ProviderUnavailable(String),

    /// An error from the dispatch or adapter layer
    #[display("{}", _0)]
    Backend(VllmError),
}

impl std::error::Error for McpError {}

/// Result type for MCP operations.
pub type McpResult<T> = Result<T, McpError>;
