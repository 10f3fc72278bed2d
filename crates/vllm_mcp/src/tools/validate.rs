//! Request validation tool.

use crate::tools::{McpTool, error_text, parse_args};
use crate::{Dispatcher, McpResult, ValidateParams};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

/// Checks whether a provider would accept a request of a given shape.
pub struct ValidateMultimodalRequestTool {
    dispatcher: Arc<Dispatcher>,
}

impl ValidateMultimodalRequestTool {
    /// Creates the tool over a dispatcher.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl McpTool for ValidateMultimodalRequestTool {
    fn name(&self) -> &str {
        "validate_multimodal_request"
    }

    fn description(&self) -> &str {
        "Check whether a model and provider accept a request with the given number of \
         images and files. No request is sent upstream."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "model": {
                    "type": "string",
                    "description": "Model name to validate"
                },
                "image_count": {
                    "type": "integer",
                    "description": "Number of images in the request",
                    "default": 0,
                    "minimum": 0
                },
                "file_count": {
                    "type": "integer",
                    "description": "Number of files in the request",
                    "default": 0,
                    "minimum": 0
                },
                "provider": {
                    "type": "string",
                    "description": "Provider to check (openai, dashscope); inferred from the model when omitted"
                }
            },
            "required": ["model"]
        })
    }

    async fn execute(&self, input: Value) -> McpResult<Value> {
        let params: ValidateParams = match parse_args(input) {
            Ok(p) => p,
            Err(e) => return Ok(error_text(e)),
        };
        Ok(Value::String(self.dispatcher.validate(&params)))
    }
}
