//! Error types for the vllm-mcp workspace.
//!
//! Every error records the source location where it was created. Crate-level
//! code works with [`VllmError`], which wraps one of the specific kinds below.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod content;
mod provider;
mod transport;
mod validation;

pub use config::ConfigError;
pub use content::{ContentError, ContentErrorKind};
pub use provider::{ProviderError, ProviderErrorKind};
pub use transport::TransportError;
pub use validation::ValidationError;

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum VllmErrorKind {
    /// Provider registry or configuration file problem
    Config(ConfigError),
    /// Request rejected by provider policy
    Validation(ValidationError),
    /// Local image or file could not be materialized
    Content(ContentError),
    /// Upstream provider call failed
    Provider(ProviderError),
    /// Unknown transport name or a listener that cannot be served
    Transport(TransportError),
}

impl std::fmt::Display for VllmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VllmErrorKind::Config(e) => write!(f, "{}", e),
            VllmErrorKind::Validation(e) => write!(f, "{}", e),
            VllmErrorKind::Content(e) => write!(f, "{}", e),
            VllmErrorKind::Provider(e) => write!(f, "{}", e),
            VllmErrorKind::Transport(e) => write!(f, "{}", e),
        }
    }
}

/// vllm-mcp error with kind discrimination.
#[derive(Debug)]
pub struct VllmError(Box<VllmErrorKind>);

impl VllmError {
    /// Create a new error from a kind.
    pub fn new(kind: VllmErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VllmErrorKind {
        &self.0
    }

    /// Whether this error is a missing local resource.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            VllmErrorKind::Content(ContentError {
                kind: ContentErrorKind::NotFound { .. },
                ..
            })
        )
    }
}

impl std::fmt::Display for VllmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for VllmError {}

impl<T> From<T> for VllmError
where
    T: Into<VllmErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for vllm-mcp operations.
pub type VllmResult<T> = std::result::Result<T, VllmError>;
