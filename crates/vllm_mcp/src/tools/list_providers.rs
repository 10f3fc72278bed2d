//! Provider listing tool.

use crate::tools::McpTool;
use crate::{Dispatcher, McpResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

/// Lists registered providers with their models and defaults.
pub struct ListAvailableProvidersTool {
    dispatcher: Arc<Dispatcher>,
}

impl ListAvailableProvidersTool {
    /// Creates the tool over a dispatcher.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl McpTool for ListAvailableProvidersTool {
    fn name(&self) -> &str {
        "list_available_providers"
    }

    fn description(&self) -> &str {
        "List the available model providers. Returns a JSON object keyed by provider \
         name with the default model, supported models, max tokens and temperature."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value) -> McpResult<Value> {
        Ok(self.dispatcher.list_providers())
    }
}
