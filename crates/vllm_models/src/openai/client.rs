//! HTTP client for the OpenAI chat completions API.

use crate::openai::conversions;
use crate::openai::dto::ChatResponse;
use crate::sse;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};
use vllm_core::{ImagePolicy, MultimodalRequest, MultimodalResponse, ProviderConfig, ProviderType};
use vllm_error::{ProviderError, ProviderErrorKind, VllmResult};
use vllm_interface::{MultimodalProvider, TextStream};

const PROVIDER: &str = "openai";

/// Adapter for OpenAI and OpenAI-compatible chat completions endpoints.
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    supported_models: Vec<String>,
    model_mapping: HashMap<String, String>,
    image_policy: ImagePolicy,
}

impl OpenAIProvider {
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
            "Created OpenAI client"
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

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn upstream_model<'a>(&'a self, model: &'a str) -> &'a str {
        self.model_mapping
            .get(model)
            .map(String::as_str)
            .unwrap_or(model)
    }

    async fn send(&self, body: &impl serde::Serialize) -> VllmResult<reqwest::Response> {
        self.client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = ?e, "HTTP request failed");
                ProviderError::new(PROVIDER, ProviderErrorKind::Http(e.to_string())).into()
            })
    }
}

#[async_trait]
impl MultimodalProvider for OpenAIProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::OpenAI
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
        let chat_request = conversions::to_chat_request(request, model, false).await?;

        debug!(
            upstream_model = %model,
            message_count = chat_request.messages().len(),
            "Sending request"
        );

        let started = Instant::now();
        let response = self.send(&chat_request).await?;
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

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = ?e, "Failed to parse response");
            ProviderError::new(
                PROVIDER,
                ProviderErrorKind::ResponseParsing(format!("Failed to parse JSON: {}", e)),
            )
        })?;
        let elapsed = started.elapsed().as_secs_f64();

        debug!(
            choices = chat_response.choices.len(),
            elapsed_seconds = elapsed,
            "Received response"
        );

        Ok(conversions::from_chat_response(chat_response, request.model())?
            .with_response_time(elapsed))
    }

    #[instrument(skip(self, request), fields(provider = PROVIDER, model = %request.model()))]
    async fn stream_response(&self, request: &MultimodalRequest) -> TextStream {
        let model = self.upstream_model(request.model());
        let chat_request = match conversions::to_chat_request(request, model, true).await {
            Ok(r) => r,
            Err(e) => return sse::failed_stream(e),
        };

        let response = match self.send(&chat_request).await {
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
        sse::text_stream(PROVIDER, response, conversions::extract_chunk_text)
    }
}
