//! MCP router.

use crate::McpError;
use crate::tools::ToolRegistry;
use mcp_server::Router;
use mcp_server::router::CapabilitiesBuilder;
use mcp_spec::{
    content::Content,
    handler::{PromptError, ResourceError, ToolError},
    protocol::ServerCapabilities,
    prompt::Prompt,
    resource::Resource,
    tool::Tool,
};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, instrument};

/// MCP router that forwards tool calls to the [`ToolRegistry`].
#[derive(Clone)]
pub struct VllmRouter {
    name: String,
    version: String,
    tools: ToolRegistry,
}

impl VllmRouter {
    /// Creates a new router builder.
    pub fn builder() -> VllmRouterBuilder {
        VllmRouterBuilder::default()
    }

    /// The tools this router serves.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Server version reported to clients.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Router for VllmRouter {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn instructions(&self) -> String {
        format!(
            "vLLM MCP Server v{}\n\n\
            This server sends text, image and file inputs to multimodal models hosted by \
            OpenAI or Dashscope and returns their replies.\n\n\
            Available tools: {}",
            self.version,
            self.tools
                .list()
                .iter()
                .map(|t| t.name().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }

    fn capabilities(&self) -> ServerCapabilities {
        CapabilitiesBuilder::new().with_tools(false).build()
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .list()
            .iter()
            .map(|tool| {
                Tool::new(
                    tool.name().to_string(),
                    tool.description().to_string(),
                    tool.input_schema(),
                )
            })
            .collect()
    }

    #[instrument(skip(self, arguments), fields(tool = %tool_name))]
    fn call_tool(
        &self,
        tool_name: &str,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Content>, ToolError>> + Send + 'static>> {
        debug!(tool = %tool_name, "Tool called");

        let tools = self.tools.clone();
        let tool_name = tool_name.to_string();

        Box::pin(async move {
            match tools.reply(&tool_name, arguments).await {
                Ok(text) => Ok(vec![Content::text(text)]),
                Err(McpError::ToolNotFound(name)) => {
                    Err(ToolError::NotFound(format!("Tool {} not found", name)))
                }
                Err(e) => Err(ToolError::ExecutionError(e.to_string())),
            }
        })
    }

    fn list_resources(&self) -> Vec<Resource> {
        vec![]
    }

    fn read_resource(
        &self,
        uri: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ResourceError>> + Send + 'static>> {
        let uri = uri.to_string();
        Box::pin(async move { Err(ResourceError::NotFound(format!("Resource {} not found", uri))) })
    }

    fn list_prompts(&self) -> Vec<Prompt> {
        vec![]
    }

    fn get_prompt(
        &self,
        prompt_name: &str,
    ) -> Pin<Box<dyn Future<Output = Result<String, PromptError>> + Send + 'static>> {
        let prompt_name = prompt_name.to_string();
        Box::pin(async move {
            Err(PromptError::NotFound(format!(
                "Prompt {} not found",
                prompt_name
            )))
        })
    }
}

/// Builder for the vLLM MCP router.
#[derive(Default)]
pub struct VllmRouterBuilder {
    name: Option<String>,
    version: Option<String>,
    tools: Option<ToolRegistry>,
}

impl VllmRouterBuilder {
    /// Sets the server name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the server version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the tool registry.
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Builds the router.
    pub fn build(self) -> VllmRouter {
        VllmRouter {
            name: self.name.unwrap_or_else(|| "vllm-mcp".to_string()),
            version: self
                .version
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            tools: self.tools.unwrap_or_default(),
        }
    }
}
