//! Text, image and file payloads.

use crate::mime::{guess_mime_from_path, is_text_mime};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Plain text content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
pub struct TextContent {
    /// The text itself
    text: String,
}

impl TextContent {
    /// Creates a new text content value.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl From<&str> for TextContent {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextContent {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// The authoritative source of an image, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// Remote URL, passed through verbatim
    Url(&'a str),
    /// Local file, read and encoded at translation time
    Path(&'a Path),
    /// Inline base64 payload
    Base64(&'a str),
}

/// Image content.
///
/// Of `url`, `local_path` and `base64_data`, the first one present (in that
/// order) is authoritative. When no MIME type is given and a local path is,
/// the type is guessed from the path extension at build time.
///
/// # Examples
///
/// ```
/// use vllm_core::ImageContent;
///
/// let image = ImageContent::builder()
///     .local_path("/tmp/diagram.png")
///     .build()
///     .unwrap();
/// assert_eq!(image.mime_type().as_deref(), Some("image/png"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(default, setter(into, strip_option), build_fn(private, name = "build_raw"))]
pub struct ImageContent {
    /// Remote image URL
    url: Option<String>,
    /// Local image file
    local_path: Option<PathBuf>,
    /// Base64 encoded image bytes
    base64_data: Option<String>,
    /// Image MIME type
    mime_type: Option<String>,
    /// Free-form description
    description: Option<String>,
}

impl ImageContentBuilder {
    /// Builds the image, filling the MIME type from the path when absent.
    pub fn build(&self) -> Result<ImageContent, ImageContentBuilderError> {
        let mut image = self.build_raw()?;
        image.fill_mime_type();
        Ok(image)
    }
}

impl ImageContent {
    /// Returns a builder for constructing an ImageContent.
    pub fn builder() -> ImageContentBuilder {
        ImageContentBuilder::default()
    }

    /// Image referenced by URL with a declared MIME type.
    pub fn from_url(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            mime_type: Some(mime_type.into()),
            ..Self::default()
        }
    }

    /// Image stored at a local path; the MIME type is sniffed from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let mut image = Self {
            local_path: Some(path.into()),
            ..Self::default()
        };
        image.fill_mime_type();
        image
    }

    /// Image given inline as base64 with a declared MIME type.
    pub fn from_base64(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64_data: Some(data.into()),
            mime_type: Some(mime_type.into()),
            ..Self::default()
        }
    }

    /// The authoritative source, or `None` if no source field is set.
    pub fn source(&self) -> Option<ImageSource<'_>> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            Some(ImageSource::Url(url))
        } else if let Some(path) = self.local_path.as_deref() {
            Some(ImageSource::Path(path))
        } else {
            self.base64_data
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(ImageSource::Base64)
        }
    }

    fn fill_mime_type(&mut self) {
        if self.mime_type.as_deref().is_some_and(|m| !m.is_empty()) {
            return;
        }
        self.mime_type = self.local_path.as_deref().and_then(guess_mime_from_path);
    }
}

/// File content.
///
/// A missing MIME type is guessed from `file_path`, falling back to `filename`.
///
/// # Examples
///
/// ```
/// use vllm_core::FileContent;
///
/// let file = FileContent::inline("notes.md", "# Title");
/// assert_eq!(file.mime_type().as_deref(), Some("text/markdown"));
/// assert!(file.is_text());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), build_fn(private, name = "build_raw"))]
pub struct FileContent {
    /// Display name of the file
    filename: String,
    /// Inline text contents
    #[builder(default, setter(into, strip_option))]
    text: Option<String>,
    /// Local file path
    #[builder(default, setter(into, strip_option))]
    file_path: Option<PathBuf>,
    /// File MIME type
    #[builder(default, setter(into, strip_option))]
    mime_type: Option<String>,
    /// File size in bytes
    #[builder(default, setter(into, strip_option))]
    size: Option<u64>,
}

impl FileContentBuilder {
    /// Builds the file, filling the MIME type when absent.
    pub fn build(&self) -> Result<FileContent, FileContentBuilderError> {
        let mut file = self.build_raw()?;
        file.fill_mime_type();
        Ok(file)
    }
}

impl FileContent {
    /// Returns a builder for constructing a FileContent.
    pub fn builder() -> FileContentBuilder {
        FileContentBuilder::default()
    }

    /// File whose contents are already in memory.
    pub fn inline(filename: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut file = Self {
            filename: filename.into(),
            size: Some(text.len() as u64),
            text: Some(text),
            file_path: None,
            mime_type: None,
        };
        file.fill_mime_type();
        file
    }

    /// File on disk; the filename is taken from the last path component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let mut file = Self {
            filename,
            text: None,
            file_path: Some(path),
            mime_type: None,
            size: None,
        };
        file.fill_mime_type();
        file
    }

    /// Overrides the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Whether the file is a `text/*` document.
    pub fn is_text(&self) -> bool {
        self.mime_type.as_deref().is_some_and(is_text_mime)
    }

    fn fill_mime_type(&mut self) {
        if self.mime_type.as_deref().is_some_and(|m| !m.is_empty()) {
            return;
        }
        self.mime_type = self
            .file_path
            .as_deref()
            .and_then(guess_mime_from_path)
            .or_else(|| guess_mime_from_path(&self.filename));
    }
}
