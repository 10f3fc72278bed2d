//! The provider adapter capability set.

use async_trait::async_trait;
use futures_util::stream::Stream;
use std::pin::Pin;
use tracing::debug;
use vllm_core::{ImagePolicy, MultimodalRequest, MultimodalResponse, ProviderType};
use vllm_error::{ValidationError, VllmResult};

/// Text increments produced by a streaming generation.
///
/// Streams never fail: an upstream error ends the stream with one
/// `"Error: ..."` chunk.
pub type TextStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// An upstream multimodal model provider.
///
/// Implementations translate a [`MultimodalRequest`] into the provider's native
/// call, perform it, and map the answer back into a [`MultimodalResponse`].
/// Configuration is fixed at construction; every call is independent.
#[async_trait]
pub trait MultimodalProvider: Send + Sync {
    /// Which provider family this adapter talks to.
    fn provider_type(&self) -> ProviderType;

    /// Models this adapter accepts.
    fn supported_models(&self) -> &[String];

    /// Image limits enforced by [`validate_request`](Self::validate_request).
    fn image_policy(&self) -> &ImagePolicy;

    /// Exact, case-sensitive membership in the supported model list.
    fn is_model_supported(&self, model: &str) -> bool {
        self.supported_models().iter().any(|m| m == model)
    }

    /// Checks a request against the model list and image policy.
    ///
    /// Makes no network call.
    fn check_request(&self, request: &MultimodalRequest) -> Result<(), ValidationError> {
        if !self.is_model_supported(request.model()) {
            return Err(ValidationError::new(format!(
                "model '{}' is not supported by {}",
                request.model(),
                self.provider_type()
            )));
        }
        self.image_policy().check(request.image_contents())
    }

    /// Fails closed: any policy violation yields `false`.
    fn validate_request(&self, request: &MultimodalRequest) -> bool {
        match self.check_request(request) {
            Ok(()) => true,
            Err(e) => {
                debug!(provider = %self.provider_type(), reason = %e.message, "Request rejected");
                false
            }
        }
    }

    /// Performs one non-streaming generation.
    ///
    /// # Errors
    ///
    /// Returns an error when local content cannot be materialized or the
    /// upstream call fails in transport. Provider-reported failures come back
    /// as a response with `error` set.
    async fn generate_response(&self, request: &MultimodalRequest)
    -> VllmResult<MultimodalResponse>;

    /// Streams generated text as it arrives.
    async fn stream_response(&self, request: &MultimodalRequest) -> TextStream;
}
