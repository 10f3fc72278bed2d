//! Server-sent event decoding shared by the streaming adapters.

use eventsource_stream::Eventsource;
use futures_util::{StreamExt, stream};
use std::fmt::Display;
use tracing::{debug, warn};
use vllm_error::{ProviderError, ProviderErrorKind};
use vllm_interface::TextStream;

/// OpenAI-style end-of-stream sentinel.
const DONE_SENTINEL: &str = "[DONE]";

/// Extracts the text increment carried by one event payload.
///
/// `Ok(None)` skips the event; `Err` ends the stream with an error chunk.
pub(crate) type ExtractFn = fn(&str) -> Result<Option<String>, String>;

/// Turns an SSE response body into text increments.
pub(crate) fn text_stream(
    provider: &'static str,
    response: reqwest::Response,
    extract: ExtractFn,
) -> TextStream {
    Box::pin(async_stream::stream! {
        let mut events = response.bytes_stream().eventsource();
        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    warn!(provider, error = %e, "SSE channel failed");
                    yield error_chunk(ProviderError::new(
                        provider,
                        ProviderErrorKind::Stream(e.to_string()),
                    ));
                    break;
                }
            };

            if event.data.trim() == DONE_SENTINEL {
                debug!(provider, "Stream finished");
                break;
            }

            match extract(&event.data) {
                Ok(Some(text)) if !text.is_empty() => {
                    yield text;
                }
                Ok(_) => {}
                Err(message) => {
                    warn!(provider, error = %message, "Stream event rejected");
                    yield error_chunk(ProviderError::new(
                        provider,
                        ProviderErrorKind::Stream(message),
                    ));
                    break;
                }
            }
        }
    })
}

/// A stream holding one error marker chunk.
pub(crate) fn failed_stream(error: impl Display) -> TextStream {
    Box::pin(stream::iter([error_chunk(error)]))
}

fn error_chunk(error: impl Display) -> String {
    format!("Error: {}", error)
}
