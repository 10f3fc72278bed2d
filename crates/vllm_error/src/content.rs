//! Content materialization error types.

/// Content error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentErrorKind {
    /// A referenced local file does not exist
    NotFound {
        /// The path that failed to resolve
        path: String,
    },
    /// The content cannot be used as given
    InvalidInput(String),
    /// Reading a file failed for a reason other than absence
    Io(String),
}

impl std::fmt::Display for ContentErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentErrorKind::NotFound { path } => write!(f, "File not found: {}", path),
            ContentErrorKind::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ContentErrorKind::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

/// Content error with source location tracking.
///
/// # Examples
///
/// ```
/// use vllm_error::{ContentError, ContentErrorKind};
///
/// let err = ContentError::new(ContentErrorKind::NotFound {
///     path: "/tmp/missing.png".to_string(),
/// });
/// assert!(format!("{}", err).contains("/tmp/missing.png"));
/// ```
#[derive(Debug, Clone)]
pub struct ContentError {
    /// The kind of error that occurred
    pub kind: ContentErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ContentError {
    /// Create a new ContentError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ContentErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a missing-file error.
    #[track_caller]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(ContentErrorKind::NotFound { path: path.into() })
    }

    /// Shorthand for an invalid-input error.
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ContentErrorKind::InvalidInput(message.into()))
    }
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Content Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for ContentError {}
