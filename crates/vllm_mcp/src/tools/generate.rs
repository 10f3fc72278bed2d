//! Multimodal generation tool.

use crate::tools::{McpTool, error_text, parse_args};
use crate::{Dispatcher, GenerateParams, McpResult};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::instrument;

/// Generates a reply from a multimodal model.
pub struct GenerateMultimodalResponseTool {
    dispatcher: Arc<Dispatcher>,
}

impl GenerateMultimodalResponseTool {
    /// Creates the tool over a dispatcher.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl McpTool for GenerateMultimodalResponseTool {
    fn name(&self) -> &str {
        "generate_multimodal_response"
    }

    fn description(&self) -> &str {
        "Generate a response from a multimodal model. Send a text prompt with optional \
         image URLs and local image or text files. Returns the generated text, followed \
         by token usage when the provider reports it."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "model": {
                    "type": "string",
                    "description": "Model to use (e.g., 'gpt-4o', 'qwen-vl-plus')"
                },
                "prompt": {
                    "type": "string",
                    "description": "Text prompt"
                },
                "image_urls": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Image URLs to include"
                },
                "file_paths": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Local image or text files to include"
                },
                "system_prompt": {
                    "type": "string",
                    "description": "Optional system prompt"
                },
                "max_tokens": {
                    "type": "integer",
                    "description": "Maximum tokens to generate",
                    "default": 1000
                },
                "temperature": {
                    "type": "number",
                    "description": "Sampling temperature",
                    "default": 0.7
                },
                "provider": {
                    "type": "string",
                    "description": "Provider to use (openai, dashscope); inferred from the model when omitted"
                }
            },
            "required": ["model", "prompt"]
        })
    }

    #[instrument(skip(self, input), fields(tool = "generate_multimodal_response"))]
    async fn execute(&self, input: Value) -> McpResult<Value> {
        let params: GenerateParams = match parse_args(input) {
            Ok(p) => p,
            Err(e) => return Ok(error_text(e)),
        };
        Ok(Value::String(self.dispatcher.generate(&params).await))
    }
}
