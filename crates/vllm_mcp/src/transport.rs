//! Transport selection.

use crate::VllmRouter;
use crate::network::{self, NetworkHandler};
use mcp_server::router::RouterService;
use mcp_server::{ByteTransport, Server};
use serde::{Deserialize, Serialize};
use tokio::io::{stdin, stdout};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use vllm_error::{TransportError, VllmResult};

/// Ways the MCP server can be exposed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TransportKind {
    /// JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// Streamable HTTP
    Http,
    /// Server-sent events
    Sse,
}

impl TransportKind {
    /// Parses a transport name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns a transport error for a name that is not stdio, http or sse.
    pub fn from_name(name: &str) -> VllmResult<Self> {
        name.trim()
            .parse()
            .map_err(|_| TransportError::unsupported(name.trim()).into())
    }
}

/// Serves `router` on the selected transport.
///
/// Stdio runs until the peer disconnects. HTTP and SSE bind `host:port`
/// and run until the process receives Ctrl-C.
///
/// # Errors
///
/// Returns a transport error if the listener cannot be bound or the
/// session fails.
#[instrument(skip(router))]
pub async fn serve(
    router: VllmRouter,
    transport: TransportKind,
    host: &str,
    port: u16,
) -> VllmResult<()> {
    if transport == TransportKind::Stdio {
        return serve_stdio(router).await;
    }

    let handler = NetworkHandler::new(&router);
    let listener = network::bind(&transport.to_string(), host, port).await?;
    let ct = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(ct.clone()));

    if transport == TransportKind::Http {
        network::serve_http(handler, listener, ct).await
    } else {
        network::serve_sse(handler, listener, ct).await
    }
}

async fn serve_stdio(router: VllmRouter) -> VllmResult<()> {
    let server = Server::new(RouterService(router));
    let byte_transport = ByteTransport::new(stdin(), stdout());

    info!("Server ready, listening on stdio");
    server
        .run(byte_transport)
        .await
        .map_err(|e| TransportError::new(TransportKind::Stdio.to_string(), e.to_string()))?;

    info!("Client disconnected");
    Ok(())
}

async fn cancel_on_ctrl_c(ct: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C, shutting down"),
    }
    ct.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_names_round_trip_case_insensitively() {
        assert_eq!(TransportKind::from_str("HTTP").unwrap(), TransportKind::Http);
        assert_eq!(TransportKind::Sse.to_string(), "sse");
        assert!(TransportKind::from_str("websocket").is_err());
    }

    #[test]
    fn test_unknown_name_is_transport_error() {
        assert_eq!(TransportKind::from_name(" Http ").unwrap(), TransportKind::Http);
        let err = TransportKind::from_name("websocket").unwrap_err();
        assert!(matches!(err.kind(), vllm_error::VllmErrorKind::Transport(_)));
        assert!(err.to_string().contains("websocket"));
    }
}
