//! Streamable HTTP and SSE transports.
//!
//! Both serve the same [`ToolRegistry`] as stdio through an `rmcp`
//! [`ServerHandler`], so tool replies are identical on every transport.

use crate::tools::ToolRegistry;
use crate::{McpError, VllmRouter};
use mcp_server::Router;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData, Implementation, JsonObject,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{RoleServer, ServerHandler};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use vllm_error::{TransportError, VllmResult};

/// Path the streamable HTTP endpoint is mounted on.
pub const HTTP_PATH: &str = "/mcp";
/// Path clients open the event stream on.
pub const SSE_PATH: &str = "/sse";
/// Path clients post messages to.
pub const SSE_POST_PATH: &str = "/message";

/// `rmcp` handler over the router's tools.
#[derive(Clone)]
pub struct NetworkHandler {
    name: String,
    version: String,
    instructions: String,
    tools: ToolRegistry,
}

impl NetworkHandler {
    /// Handler serving the same tools and instructions as `router`.
    pub fn new(router: &VllmRouter) -> Self {
        Self {
            name: router.name(),
            version: router.version().to_string(),
            instructions: router.instructions(),
            tools: router.tools().clone(),
        }
    }

    /// Tool descriptors advertised to clients.
    pub fn tool_list(&self) -> Vec<Tool> {
        self.tools
            .list()
            .iter()
            .map(|tool| {
                let schema = match tool.input_schema() {
                    Value::Object(map) => map,
                    _ => JsonObject::new(),
                };
                Tool::new(
                    tool.name().to_string(),
                    tool.description().to_string(),
                    Arc::new(schema),
                )
            })
            .collect()
    }

    /// Runs a tool call.
    ///
    /// # Errors
    ///
    /// Returns `invalid_params` for an unknown tool name.
    #[instrument(skip(self, request), fields(tool = %request.name))]
    pub async fn call(&self, request: CallToolRequestParam) -> Result<CallToolResult, ErrorData> {
        debug!("Tool called");
        let arguments = request.arguments.map(Value::Object).unwrap_or(Value::Null);
        match self.tools.reply(&request.name, arguments).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(McpError::ToolNotFound(name)) => Err(ErrorData::invalid_params(
                format!("Tool {} not found", name),
                None,
            )),
            Err(e) => Err(ErrorData::internal_error(e.to_string(), None)),
        }
    }
}

impl ServerHandler for NetworkHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name.clone(),
                version: self.version.clone(),
                ..Default::default()
            },
            instructions: Some(self.instructions.clone()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tool_list()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(request).await
    }
}

/// Binds a listener for `transport` on `host:port`.
///
/// # Errors
///
/// Returns a transport error if the address cannot be bound.
pub async fn bind(transport: &str, host: &str, port: u16) -> VllmResult<TcpListener> {
    TcpListener::bind((host, port)).await.map_err(|e| {
        TransportError::new(transport, format!("cannot bind {}:{}: {}", host, port, e)).into()
    })
}

fn local_addr(transport: &str, listener: &TcpListener) -> VllmResult<SocketAddr> {
    listener
        .local_addr()
        .map_err(|e| TransportError::new(transport, e.to_string()).into())
}

/// Serves streamable HTTP on `listener` until `ct` is cancelled.
///
/// # Errors
///
/// Returns a transport error if the HTTP server fails.
pub async fn serve_http(
    handler: NetworkHandler,
    listener: TcpListener,
    ct: CancellationToken,
) -> VllmResult<()> {
    let addr = local_addr("http", &listener)?;
    let service = StreamableHttpService::new(
        move || Ok(handler.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let app = axum::Router::new().nest_service(HTTP_PATH, service);

    info!(%addr, path = HTTP_PATH, "Server ready, listening on streamable HTTP");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|e| TransportError::new("http", e.to_string()))?;

    info!("HTTP server stopped");
    Ok(())
}

/// Serves SSE on `listener` until `ct` is cancelled.
///
/// # Errors
///
/// Returns a transport error if the HTTP server fails.
pub async fn serve_sse(
    handler: NetworkHandler,
    listener: TcpListener,
    ct: CancellationToken,
) -> VllmResult<()> {
    let addr = local_addr("sse", &listener)?;
    let config = SseServerConfig {
        bind: addr,
        sse_path: SSE_PATH.to_string(),
        post_path: SSE_POST_PATH.to_string(),
        ct: ct.clone(),
        sse_keep_alive: None,
    };
    let (sse_server, app) = SseServer::new(config);
    let sessions = sse_server.with_service(move || handler.clone());

    info!(%addr, sse = SSE_PATH, post = SSE_POST_PATH, "Server ready, listening on SSE");
    let shutdown = ct.child_token();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| TransportError::new("sse", e.to_string()))?;

    sessions.cancel();
    info!("SSE server stopped");
    Ok(())
}
