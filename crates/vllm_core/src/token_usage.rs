//! Token usage tracking for provider calls.

use serde::{Deserialize, Serialize};

/// Token usage information for a completed generation.
///
/// Providers that omit usage data produce an all-zero value rather than none.
///
/// # Examples
///
/// ```
/// use vllm_core::TokenUsage;
///
/// let usage = TokenUsage::new(150, 50, 200);
/// assert_eq!(*usage.prompt_tokens(), 150);
/// assert_eq!(usage.to_string(), "prompt=150, completion=50, total=200");
/// ```
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
    derive_getters::Getters,
    derive_more::Display,
)]
#[display("prompt={}, completion={}, total={}", prompt_tokens, completion_tokens, total_tokens)]
pub struct TokenUsage {
    /// Number of tokens in the prompt.
    prompt_tokens: u64,
    /// Number of tokens in the generated output.
    completion_tokens: u64,
    /// Total tokens consumed (may differ from prompt + completion due to provider accounting).
    total_tokens: u64,
}

impl TokenUsage {
    /// Creates new token usage data.
    pub fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }

    /// Builds usage from optional counts, zero-filling what is missing.
    ///
    /// A missing total is derived from the other two counts.
    pub fn from_parts(prompt: Option<u64>, completion: Option<u64>, total: Option<u64>) -> Self {
        let prompt = prompt.unwrap_or(0);
        let completion = completion.unwrap_or(0);
        Self::new(prompt, completion, total.unwrap_or(prompt + completion))
    }
}
