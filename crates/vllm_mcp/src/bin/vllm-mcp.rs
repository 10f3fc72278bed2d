//! vLLM MCP server binary.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vllm_mcp::{Dispatcher, Router, ServerConfig, ToolRegistry, TransportKind, VllmRouter, serve};

/// Command-line arguments for the MCP server.
#[derive(Parser, Debug)]
#[command(name = "vllm-mcp")]
#[command(about = "MCP server for multimodal models served by OpenAI and Dashscope")]
#[command(version)]
struct Args {
    /// Configuration file (.json or .toml); the environment is used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transport type
    #[arg(long, value_parser = ["stdio", "http", "sse"])]
    transport: Option<String>,

    /// Host for HTTP/SSE transport
    #[arg(long)]
    host: Option<String>,

    /// Port for HTTP/SSE transport
    #[arg(long)]
    port: Option<u16>,

    /// Log level
    #[arg(long, value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    log_format: String,
}

fn init_tracing(config: &ServerConfig, format: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    // stdout carries the MCP session, so logs go to stderr.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    if format == "json" {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let (mut config, source) = ServerConfig::load_with_source(args.config.as_deref())?;
    if let Some(transport) = &args.transport {
        config.transport = TransportKind::from_name(transport)?;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    init_tracing(&config, &args.log_format);
    source.log();
    tracing::info!(transport = %config.transport, "Starting vLLM MCP server");

    let dispatcher = Dispatcher::new(&config)?;
    if dispatcher.is_empty() {
        tracing::warn!("No providers configured; set OPENAI_API_KEY or DASHSCOPE_API_KEY");
    }

    let router = VllmRouter::builder()
        .name("vllm-mcp")
        .version(env!("CARGO_PKG_VERSION"))
        .tools(ToolRegistry::with_dispatcher(Arc::new(dispatcher)))
        .build();

    tracing::info!(tools = router.list_tools().len(), "Router initialized");

    serve(router, config.transport, &config.host, config.port).await?;
    Ok(())
}
