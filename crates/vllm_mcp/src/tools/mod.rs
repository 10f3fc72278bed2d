//! MCP tools exposed by the server.

mod generate;
mod list_providers;
mod validate;

pub use generate::GenerateMultimodalResponseTool;
pub use list_providers::ListAvailableProvidersTool;
pub use validate::ValidateMultimodalRequestTool;

use crate::{Dispatcher, McpError, McpResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A callable MCP tool.
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name as advertised to clients.
    fn name(&self) -> &str;

    /// Human readable description.
    fn description(&self) -> &str;

    /// JSON schema of the tool arguments.
    fn input_schema(&self) -> Value;

    /// Runs the tool.
    ///
    /// A `Value::String` result is sent to the client verbatim; anything
    /// else is sent as pretty-printed JSON.
    async fn execute(&self, input: Value) -> McpResult<Value>;
}

/// Registry of available tools, keyed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn McpTool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the three dispatch tools bound to `dispatcher`.
    pub fn with_dispatcher(dispatcher: Arc<Dispatcher>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GenerateMultimodalResponseTool::new(dispatcher.clone())));
        registry.register(Arc::new(ListAvailableProvidersTool::new(dispatcher.clone())));
        registry.register(Arc::new(ValidateMultimodalRequestTool::new(dispatcher)));
        registry
    }

    /// Adds a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn McpTool>) {
        debug!(tool = tool.name(), "Registering tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Looks up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn McpTool>> {
        self.tools.get(name).cloned()
    }

    /// All tools, ordered by name.
    pub fn list(&self) -> Vec<Arc<dyn McpTool>> {
        self.tools.values().cloned().collect()
    }

    /// Runs the named tool.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::ToolNotFound`] for an unknown name, or whatever
    /// the tool returns.
    #[instrument(skip(self, input))]
    pub async fn execute(&self, name: &str, input: Value) -> McpResult<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;
        tool.execute(input).await
    }

    /// Runs the named tool and renders the reply text sent to the client.
    ///
    /// Tool failures become an `"Error: ..."` reply rather than a protocol
    /// error, so every transport answers them the same way.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::ToolNotFound`] for an unknown name.
    pub async fn reply(&self, name: &str, input: Value) -> McpResult<String> {
        let tool = self.get(name).ok_or_else(|| {
            warn!(tool = %name, "Unknown tool");
            McpError::ToolNotFound(name.to_string())
        })?;

        match tool.execute(input).await {
            Ok(result) => {
                info!(tool = %name, "Tool executed successfully");
                Ok(result_text(result))
            }
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool execution failed");
                Ok(format!("Error: {}", e))
            }
        }
    }
}

/// Renders a tool result as the text sent to the client.
fn result_text(result: Value) -> String {
    match result {
        Value::String(text) => text,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Decodes tool arguments; a missing argument object counts as empty.
pub(crate) fn parse_args<T: DeserializeOwned>(input: Value) -> McpResult<T> {
    let input = match input {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(input).map_err(|e| McpError::InvalidInput(e.to_string()))
}

/// Renders an error as the text reply of a tool.
pub(crate) fn error_text(error: impl std::fmt::Display) -> Value {
    Value::String(format!("Error: {}", error))
}
