//! Extension-based MIME sniffing.
//!
//! Nothing here touches the filesystem; the guess comes from the path text alone.

use std::path::Path;

/// Guess a MIME type from a file path or URL by its extension.
///
/// # Examples
///
/// ```
/// use vllm_core::guess_mime_from_path;
///
/// assert_eq!(guess_mime_from_path("photo.PNG").as_deref(), Some("image/png"));
/// assert_eq!(guess_mime_from_path("notes.txt").as_deref(), Some("text/plain"));
/// assert_eq!(guess_mime_from_path("no_extension"), None);
/// ```
pub fn guess_mime_from_path(path: impl AsRef<Path>) -> Option<String> {
    mime_guess::from_path(path.as_ref())
        .first_raw()
        .map(|s| s.to_string())
}

/// Whether the MIME type names an image.
pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Whether the MIME type names a text document.
pub fn is_text_mime(mime: &str) -> bool {
    mime.starts_with("text/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_common_image_types() {
        assert_eq!(guess_mime_from_path("a.jpg").as_deref(), Some("image/jpeg"));
        assert_eq!(guess_mime_from_path("a.jpeg").as_deref(), Some("image/jpeg"));
        assert_eq!(guess_mime_from_path("a.gif").as_deref(), Some("image/gif"));
        assert_eq!(guess_mime_from_path("a.webp").as_deref(), Some("image/webp"));
        assert_eq!(guess_mime_from_path("a.bmp").as_deref(), Some("image/bmp"));
    }

    #[test]
    fn test_guess_from_url_path() {
        assert_eq!(
            guess_mime_from_path("https://example.com/cat.png").as_deref(),
            Some("image/png")
        );
    }

    #[test]
    fn test_predicates() {
        assert!(is_image_mime("image/png"));
        assert!(!is_image_mime("text/plain"));
        assert!(is_text_mime("text/markdown"));
        assert!(!is_text_mime("application/pdf"));
    }
}
