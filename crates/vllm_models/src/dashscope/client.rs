//! HTTP client for the Dashscope multimodal generation API.

use crate::dashscope::conversions;
use crate::dashscope::dto::DashscopeResponse;
use crate::sse;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};
use vllm_core::{ImagePolicy, MultimodalRequest, MultimodalResponse, ProviderConfig, ProviderType};
use vllm_error::{ProviderError, ProviderErrorKind, VllmResult};
use vllm_interface::{MultimodalProvider, TextStream};

const PROVIDER: &str = "dashscope";
const GENERATION_PATH: &str = "/services/aigc/multimodal-generation/generation";

/// Adapter for Alibaba Dashscope multimodal models.
#[derive(Debug, Clone)]
pub struct DashscopeProvider {
    client: Client,
    api_key: String,
    base_url: String,
    supported_models: Vec<String>,
    model_mapping: HashMap<String, String>,
    image_policy: ImagePolicy,
}

impl DashscopeProvider {
    /// Creates an adapter from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    #[instrument(skip(config), fields(base_url = tracing::field::Empty))]
    pub fn new(config: &ProviderConfig) -> VllmResult<Self> {
        let base_url = config.resolved_base_url();
        tracing::Span::current().record("base_url", base_url.as_str());

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                ProviderError::new(
                    PROVIDER,
                    ProviderErrorKind::Http(format!("Failed to build client: {}", e)),
                )
            })?;

        debug!(
            timeout_seconds = config.timeout_seconds,
            "Created Dashscope client"
        );

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
            supported_models: config.resolved_supported_models(),
            model_mapping: config.model_mapping.clone(),
            image_policy: config.image_policy(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn upstream_model<'a>(&'a self, model: &'a str) -> &'a str {
        self.model_mapping
            .get(model)
            .map(String::as_str)
            .unwrap_or(model)
    }

    async fn send(
        &self,
        body: &impl serde::Serialize,
        stream: bool,
    ) -> VllmResult<reqwest::Response> {
        let mut builder = self
            .client
            .post(format!("{}{}", self.base_url, GENERATION_PATH))
            .bearer_auth(&self.api_key)
            .json(body);
        if stream {
            builder = builder
                .header("X-DashScope-SSE", "enable")
                .header(reqwest::header::ACCEPT, "text/event-stream");
        }

        builder.send().await.map_err(|e| {
            error!(provider = PROVIDER, error = ?e, "HTTP request failed");
            ProviderError::new(PROVIDER, ProviderErrorKind::Http(e.to_string())).into()
        })
    }
}

#[async_trait]
impl MultimodalProvider for DashscopeProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Dashscope
    }

    fn supported_models(&self) -> &[String] {
        &self.supported_models
    }

    fn image_policy(&self) -> &ImagePolicy {
        &self.image_policy
    }

    #[instrument(skip(self, request), fields(provider = PROVIDER, model = %request.model()))]
    async fn generate_response(
        &self,
        request: &MultimodalRequest,
    ) -> VllmResult<MultimodalResponse> {
        let model = self.upstream_model(request.model());
        let payload = conversions::to_dashscope_request(request, model, false).await?;

        debug!(
            upstream_model = %model,
            message_count = payload.input().messages.len(),
            "Sending request"
        );

        let started = Instant::now();
        let response = self.send(&payload, false).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = conversions::error_message(&body);
            warn!(provider = PROVIDER, status = %status, error = %message, "API error");
            let error = ProviderError::new(
                PROVIDER,
                ProviderErrorKind::Api {
                    status_code: status.as_u16(),
                    message,
                },
            );
            return Ok(MultimodalResponse::failure(request.model(), error.to_string())
                .with_response_time(started.elapsed().as_secs_f64()));
        }

        let body: DashscopeResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = ?e, "Failed to parse response");
            ProviderError::new(
                PROVIDER,
                ProviderErrorKind::ResponseParsing(format!("Failed to parse JSON: {}", e)),
            )
        })?;
        let elapsed = started.elapsed().as_secs_f64();

        debug!(
            request_id = body.request_id.as_deref().unwrap_or_default(),
            elapsed_seconds = elapsed,
            "Received response"
        );

        Ok(conversions::from_dashscope_response(body, request.model())?
            .with_response_time(elapsed))
    }

    #[instrument(skip(self, request), fields(provider = PROVIDER, model = %request.model()))]
    async fn stream_response(&self, request: &MultimodalRequest) -> TextStream {
        let model = self.upstream_model(request.model());
        let payload = match conversions::to_dashscope_request(request, model, true).await {
            Ok(p) => p,
            Err(e) => return sse::failed_stream(e),
        };

        let response = match self.send(&payload, true).await {
            Ok(r) => r,
            Err(e) => return sse::failed_stream(e),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return sse::failed_stream(ProviderError::new(
                PROVIDER,
                ProviderErrorKind::Api {
                    status_code: status.as_u16(),
                    message: conversions::error_message(&body),
                },
            ));
        }

        debug!("Streaming response");
        sse::text_stream(PROVIDER, response, conversions::extract_event_text)
    }
}
