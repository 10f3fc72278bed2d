//! Materialization of image and text-file parts for upstream payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;
use tracing::{debug, instrument};
use vllm_core::{FileContent, ImageContent, ImageSource, guess_mime_from_path, is_image_mime};
use vllm_error::{ContentError, ContentErrorKind, VllmResult};

/// Resolves an image to a string an upstream API accepts.
///
/// URLs pass through verbatim; local files and inline base64 become
/// `data:<mime>;base64,<payload>` URIs.
///
/// # Errors
///
/// - `NotFound` when a local path does not exist
/// - `InvalidInput` when a local path is not an image type, when inline
///   base64 has no MIME type, or when no source is set
#[instrument(skip(image), fields(source = tracing::field::Empty))]
pub async fn prepare_image(image: &ImageContent) -> VllmResult<String> {
    match image.source() {
        Some(ImageSource::Url(url)) => {
            tracing::Span::current().record("source", "url");
            Ok(url.to_string())
        }
        Some(ImageSource::Path(path)) => {
            tracing::Span::current().record("source", "path");
            encode_image_file(path).await
        }
        Some(ImageSource::Base64(data)) => {
            tracing::Span::current().record("source", "base64");
            let mime = image
                .mime_type()
                .as_deref()
                .filter(|m| !m.is_empty())
                .ok_or_else(|| ContentError::invalid_input("base64 image has no MIME type"))?;
            Ok(data_uri(mime, data))
        }
        None => Err(ContentError::invalid_input("No valid image source provided").into()),
    }
}

async fn encode_image_file(path: &Path) -> VllmResult<String> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ContentError::not_found(path.display().to_string()).into());
    }
    let mime = guess_mime_from_path(path)
        .filter(|m| is_image_mime(m))
        .ok_or_else(|| {
            ContentError::invalid_input(format!("Invalid image file: {}", path.display()))
        })?;
    let bytes = read_file(path).await?;
    debug!(path = %path.display(), mime = %mime, bytes = bytes.len(), "Encoded local image");
    Ok(data_uri(&mime, &STANDARD.encode(bytes)))
}

/// Renders a text file as `"File: <filename>\n<contents>"`.
///
/// Inline text wins over the file path.
///
/// # Errors
///
/// - `NotFound` when neither inline text nor an existing file is available
/// - `InvalidInput` when the file is not valid UTF-8
#[instrument(skip(file), fields(filename = %file.filename()))]
pub async fn prepare_text_file(file: &FileContent) -> VllmResult<String> {
    if let Some(text) = file.text() {
        return Ok(format!("File: {}\n{}", file.filename(), text));
    }

    let path = file
        .file_path()
        .as_deref()
        .ok_or_else(|| ContentError::not_found(file.filename().clone()))?;
    let bytes = read_file(path).await?;
    let text = String::from_utf8(bytes).map_err(|e| {
        ContentError::invalid_input(format!("{} is not UTF-8 text: {}", path.display(), e))
    })?;
    Ok(format!("File: {}\n{}", file.filename(), text))
}

async fn read_file(path: &Path) -> VllmResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            ContentErrorKind::NotFound {
                path: path.display().to_string(),
            }
        } else {
            ContentErrorKind::Io(format!("{}: {}", path.display(), e))
        };
        ContentError::new(kind).into()
    })
}

fn data_uri(mime: &str, payload: &str) -> String {
    format!("data:{};base64,{}", mime, payload)
}
