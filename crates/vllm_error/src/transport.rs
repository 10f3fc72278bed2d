//! Transport error types.

/// A transport could not be served.
#[derive(Debug, Clone)]
pub struct TransportError {
    /// Name of the transport
    pub transport: String,
    /// What went wrong
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl TransportError {
    /// Create a new TransportError for the named transport.
    #[track_caller]
    pub fn new(transport: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            transport: transport.into(),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// The name does not match a known transport.
    #[track_caller]
    pub fn unsupported(transport: impl Into<String>) -> Self {
        Self::new(transport, "unsupported transport")
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transport Error: {} '{}' at line {} in {}",
            self.message, self.transport, self.line, self.file
        )
    }
}

impl std::error::Error for TransportError {}
