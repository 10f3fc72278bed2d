//! Upstream provider error types.

/// Upstream failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// The HTTP request could not be sent or completed
    Http(String),
    /// The provider answered with an error status
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the provider
        message: String,
    },
    /// The provider body could not be decoded
    ResponseParsing(String),
    /// The streaming channel failed
    Stream(String),
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderErrorKind::Http(msg) => write!(f, "HTTP request failed: {}", msg),
            ProviderErrorKind::Api {
                status_code,
                message,
            } => write!(f, "API error (status {}): {}", status_code, message),
            ProviderErrorKind::ResponseParsing(msg) => {
                write!(f, "Response parsing failed: {}", msg)
            }
            ProviderErrorKind::Stream(msg) => write!(f, "Stream interrupted: {}", msg),
        }
    }
}

/// Error raised by a provider adapter, tagged with the provider name.
///
/// # Examples
///
/// ```
/// use vllm_error::{ProviderError, ProviderErrorKind};
///
/// let err = ProviderError::new("openai", ProviderErrorKind::Http("timed out".into()));
/// assert!(format!("{}", err).starts_with("openai API error"));
/// ```
#[derive(Debug, Clone)]
pub struct ProviderError {
    /// Provider that produced the error
    pub provider: String,
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(provider: impl Into<String>, kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            provider: provider.into(),
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} API error: {} at line {} in {}",
            self.provider, self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for ProviderError {}
