//! Provider registry and the three dispatch operations.
//!
//! Every operation returns text and never fails: errors are rendered as
//! `"Error: ..."` so a long-lived session survives bad requests.

use crate::{McpError, McpResult, ServerConfig};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use vllm_core::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, FileContent, ImageContent, MultimodalRequest,
    ProviderConfig, ProviderType, guess_mime_from_path, is_image_mime, is_text_mime,
};
use vllm_error::{ConfigError, ContentError, VllmError, VllmResult};
use vllm_interface::MultimodalProvider;

/// MIME type assigned to URL images whose extension says nothing useful.
const FALLBACK_URL_MIME: &str = "image/jpeg";

/// Arguments of the generate operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateParams {
    /// Model name
    pub model: String,
    /// User prompt
    pub prompt: String,
    /// Remote images
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    /// Local images and text files
    #[serde(default)]
    pub file_paths: Option<Vec<String>>,
    /// Optional system prompt
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Explicit provider name
    #[serde(default)]
    pub provider: Option<String>,
}

impl GenerateParams {
    /// Params with only a model and prompt.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            image_urls: None,
            file_paths: None,
            system_prompt: None,
            max_tokens: None,
            temperature: None,
            provider: None,
        }
    }
}

/// Arguments of the validate operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValidateParams {
    /// Model name
    pub model: String,
    /// Number of images to simulate
    #[serde(default)]
    pub image_count: usize,
    /// Number of files to simulate
    #[serde(default)]
    pub file_count: usize,
    /// Explicit provider name
    #[serde(default)]
    pub provider: Option<String>,
}

impl ValidateParams {
    /// Params for `model` with the given image count.
    pub fn new(model: impl Into<String>, image_count: usize) -> Self {
        Self {
            model: model.into(),
            image_count,
            file_count: 0,
            provider: None,
        }
    }
}

/// A registered adapter with the configuration it was built from.
#[derive(Clone)]
pub struct RegisteredProvider {
    config: ProviderConfig,
    adapter: Arc<dyn MultimodalProvider>,
}

impl RegisteredProvider {
    /// Configuration the adapter was built from.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// The adapter.
    pub fn adapter(&self) -> &Arc<dyn MultimodalProvider> {
        &self.adapter
    }

    fn name(&self) -> &'static str {
        self.adapter.provider_type().as_str()
    }
}

/// Owns the provider registry and routes requests to adapters.
///
/// The registry is fixed after construction and iterates in
/// [`ProviderType`] order.
#[derive(Clone, Default)]
pub struct Dispatcher {
    providers: BTreeMap<ProviderType, RegisteredProvider>,
    validate_requests: bool,
}

impl Dispatcher {
    /// Builds adapters for every provider entry that has an API key.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter cannot be constructed.
    #[instrument(skip(config), fields(entries = config.providers.len()))]
    pub fn new(config: &ServerConfig) -> VllmResult<Self> {
        let mut dispatcher = Self {
            providers: BTreeMap::new(),
            validate_requests: config.validate_requests,
        };

        for entry in &config.providers {
            if !entry.has_credentials() {
                debug!(provider = %entry.provider_type, "No API key, skipping provider");
                continue;
            }
            if dispatcher.providers.contains_key(&entry.provider_type) {
                warn!(provider = %entry.provider_type, "Duplicate provider entry ignored");
                continue;
            }
            let adapter = vllm_models::create_provider(entry)?;
            info!(
                provider = %entry.provider_type,
                default_model = %entry.resolved_default_model(),
                "Initialized provider"
            );
            dispatcher.register(entry.clone(), adapter);
        }

        info!(providers = dispatcher.providers.len(), "Provider registry ready");
        Ok(dispatcher)
    }

    /// Adds or replaces the adapter for its provider type.
    pub fn register(&mut self, config: ProviderConfig, adapter: Arc<dyn MultimodalProvider>) {
        self.providers
            .insert(adapter.provider_type(), RegisteredProvider { config, adapter });
    }

    /// Registered provider names in registry order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.values().map(RegisteredProvider::name).collect()
    }

    /// Whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Picks the adapter for a request.
    ///
    /// An explicit name wins and must match a registered provider name
    /// exactly (`openai`, `dashscope`). Otherwise `gpt*` models go to openai, `qwen*`
    /// models go to dashscope, and anything else goes to the first
    /// registered provider.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::ProviderUnavailable`] if the chosen provider is
    /// not registered, or a configuration error if none is.
    pub fn resolve_provider(
        &self,
        model: &str,
        explicit: Option<&str>,
    ) -> McpResult<&RegisteredProvider> {
        if let Some(name) = explicit.map(str::trim).filter(|n| !n.is_empty()) {
            return self
                .providers
                .values()
                .find(|p| p.name() == name)
                .ok_or_else(|| McpError::ProviderUnavailable(name.to_string()));
        }

        match ProviderType::infer_from_model(model) {
            Some(inferred) => self
                .providers
                .get(&inferred)
                .ok_or_else(|| McpError::ProviderUnavailable(inferred.to_string())),
            None => self
                .providers
                .values()
                .next()
                .ok_or_else(|| VllmError::from(ConfigError::new("No providers available")).into()),
        }
    }

    /// Runs a generation and renders the reply as text.
    ///
    /// Token usage, when reported, is appended as
    /// `"\n\n[Token usage: prompt=P, completion=C, total=T]"`.
    #[instrument(skip(self, params), fields(model = %params.model))]
    pub async fn generate(&self, params: &GenerateParams) -> String {
        match self.try_generate(params).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Error generating response");
                format!("Error: {}", e)
            }
        }
    }

    async fn try_generate(&self, params: &GenerateParams) -> McpResult<String> {
        let provider = self.resolve_provider(&params.model, params.provider.as_deref())?;
        let request = build_request(params).await?;

        if self.validate_requests {
            provider.adapter.check_request(&request).map_err(VllmError::from)?;
        }

        debug!(
            provider = provider.name(),
            images = request.image_contents().len(),
            files = request.file_contents().len(),
            "Dispatching request"
        );
        let response = provider.adapter.generate_response(&request).await?;

        if let Some(error) = response.error() {
            warn!(provider = provider.name(), error = %error, "Provider reported an error");
            return Ok(format!("Error: {}", error));
        }

        let mut text = response.text();
        if let Some(usage) = response.usage() {
            text.push_str(&format!("\n\n[Token usage: {}]", usage));
        }
        Ok(text)
    }

    /// Describes every registered provider, keyed by provider name.
    pub fn list_providers(&self) -> Value {
        let listing: Map<String, Value> = self
            .providers
            .values()
            .map(|p| {
                let entry = json!({
                    "type": p.name(),
                    "default_model": p.config.resolved_default_model(),
                    "supported_models": p.adapter.supported_models(),
                    "max_tokens": p.config.max_tokens,
                    "temperature": p.config.temperature,
                });
                (p.name().to_string(), entry)
            })
            .collect();
        Value::Object(listing)
    }

    /// Checks a synthetic request with the given image and file counts.
    #[instrument(skip(self, params), fields(model = %params.model))]
    pub fn validate(&self, params: &ValidateParams) -> String {
        let provider = match self.resolve_provider(&params.model, params.provider.as_deref()) {
            Ok(p) => p,
            Err(e) => return format!("Error: {}", e),
        };

        let ceiling = provider.adapter.image_policy().max_images().saturating_add(1);
        let request = match synthetic_request(params, ceiling) {
            Ok(r) => r,
            Err(e) => return format!("Error: {}", e),
        };

        if provider.adapter.validate_request(&request) {
            format!("Request is valid for provider '{}'", provider.name())
        } else {
            format!("Request is invalid for provider '{}'", provider.name())
        }
    }
}

/// Builds the normalized request for a generate call.
///
/// URL images get a MIME type guessed from the URL path, or `image/jpeg`.
/// Local paths become images (`image/*`) or inline text files (`text/*`);
/// other types are dropped.
async fn build_request(params: &GenerateParams) -> McpResult<MultimodalRequest> {
    let mut builder = MultimodalRequest::builder();
    builder
        .model(params.model.clone())
        .text_content(params.prompt.clone())
        .max_tokens(params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS))
        .temperature(
            params
                .temperature
                .map(|t| t as f32)
                .unwrap_or(DEFAULT_TEMPERATURE),
        );

    if let Some(system) = params.system_prompt.as_ref().filter(|s| !s.is_empty()) {
        builder.system_prompt(system.clone());
    }

    for url in params.image_urls.iter().flatten() {
        builder.image_content(ImageContent::from_url(url.clone(), url_mime_type(url)));
    }

    for raw in params.file_paths.iter().flatten() {
        let path = Path::new(raw);
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(VllmError::from(ContentError::not_found(raw.clone())).into());
        }

        match guess_mime_from_path(path) {
            Some(mime) if is_image_mime(&mime) => {
                builder.image_content(ImageContent::from_path(path));
            }
            Some(mime) if is_text_mime(&mime) => {
                let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                    VllmError::from(ContentError::invalid_input(format!(
                        "Failed to read {}: {}",
                        raw, e
                    )))
                })?;
                let file = FileContent::inline(file_name(path), text).with_mime_type(mime);
                builder.file_content(file);
            }
            other => {
                debug!(path = %raw, mime = ?other, "Dropping unsupported file type");
            }
        }
    }

    builder
        .build()
        .map_err(|e| McpError::InvalidInput(format!("Failed to build request: {}", e)))
}

/// Builds the request `validate` checks.
///
/// Counts are clamped to `ceiling`: past the policy limit one more part
/// changes nothing about the verdict, and huge counts must not allocate.
fn synthetic_request(params: &ValidateParams, ceiling: usize) -> McpResult<MultimodalRequest> {
    let mut builder = MultimodalRequest::builder();
    builder.model(params.model.clone()).text_content("test");
    for _ in 0..params.image_count.min(ceiling) {
        builder.image_content(ImageContent::from_url("test.jpg", "image/jpeg"));
    }
    for _ in 0..params.file_count.min(ceiling) {
        builder.file_content(FileContent::inline("test.txt", "test").with_mime_type("text/plain"));
    }
    builder
        .build()
        .map_err(|e| McpError::InvalidInput(format!("Failed to build request: {}", e)))
}

fn url_mime_type(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    guess_mime_from_path(without_query)
        .filter(|m| is_image_mime(m))
        .unwrap_or_else(|| FALLBACK_URL_MIME.to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
