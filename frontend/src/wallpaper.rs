use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::future::{self, Future};
use std::io;

use crate::error::PreferenceError;

/// An uploaded file whose contents are read asynchronously.
///
/// Reading completes exactly once; an `Err` means the stream was unreadable.
pub trait ByteSource {
    fn read_all(self) -> impl Future<Output = io::Result<Vec<u8>>>;
}

impl ByteSource for Vec<u8> {
    fn read_all(self) -> impl Future<Output = io::Result<Vec<u8>>> {
        future::ready(Ok(self))
    }
}

impl ByteSource for &[u8] {
    fn read_all(self) -> impl Future<Output = io::Result<Vec<u8>>> {
        future::ready(Ok(self.to_vec()))
    }
}

/// Handle returned by a successful upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallpaperPreview {
    pub message: String,
    pub preview: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallpaperSettings {
    pub has_wallpaper: bool,
    pub opacity: f64,
    pub preview: Option<String>,
}

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Checks the declared type and size of an upload before anything is read.
pub fn validate_upload(mime_type: &str, size_bytes: u64, limit: u64) -> Result<(), PreferenceError> {
    if !is_image_mime(mime_type) {
        return Err(PreferenceError::UnsupportedMedia(mime_type.to_string()));
    }
    if size_bytes > limit {
        return Err(PreferenceError::PayloadTooLarge {
            size: size_bytes,
            limit,
        });
    }
    Ok(())
}

pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Reads `source` and turns it into a data URI, re-checking the real length
/// against `limit` since the declared size may lie.
pub async fn decode_to_data_uri<S: ByteSource>(
    source: S,
    mime_type: &str,
    limit: u64,
) -> Result<String, PreferenceError> {
    let bytes = source
        .read_all()
        .await
        .map_err(|err| PreferenceError::Decode(err.to_string()))?;
    let size = bytes.len() as u64;
    if size > limit {
        return Err(PreferenceError::PayloadTooLarge { size, limit });
    }
    Ok(encode_data_uri(mime_type, &bytes))
}

/// Validates an already encoded wallpaper, as found in an imported snapshot.
pub fn validate_data_uri(uri: &str, limit: u64) -> Result<(), PreferenceError> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Err(PreferenceError::UnsupportedMedia(uri.chars().take(32).collect()));
    };
    let Some((header, payload)) = rest.split_once(',') else {
        return Err(PreferenceError::Decode("data URI has no payload".to_string()));
    };
    let mime_type = header.split(';').next().unwrap_or_default();
    if !is_image_mime(mime_type) {
        return Err(PreferenceError::UnsupportedMedia(mime_type.to_string()));
    }
    let size = if header.ends_with(";base64") {
        STANDARD
            .decode(payload)
            .map_err(|err| PreferenceError::Decode(err.to_string()))?
            .len() as u64
    } else {
        payload.len() as u64
    };
    if size > limit {
        return Err(PreferenceError::PayloadTooLarge { size, limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_WALLPAPER_BYTES;

    struct Corrupt;

    impl ByteSource for Corrupt {
        fn read_all(self) -> impl Future<Output = io::Result<Vec<u8>>> {
            future::ready(Err(io::Error::new(io::ErrorKind::InvalidData, "truncated")))
        }
    }

    #[test]
    fn rejects_non_images() {
        assert_eq!(
            validate_upload("text/plain", 10, MAX_WALLPAPER_BYTES),
            Err(PreferenceError::UnsupportedMedia("text/plain".to_string()))
        );
    }

    #[test]
    fn enforces_size_ceiling_inclusively() {
        assert!(validate_upload("image/png", MAX_WALLPAPER_BYTES, MAX_WALLPAPER_BYTES).is_ok());
        assert_eq!(
            validate_upload("image/png", 6 * 1024 * 1024, MAX_WALLPAPER_BYTES),
            Err(PreferenceError::PayloadTooLarge {
                size: 6 * 1024 * 1024,
                limit: MAX_WALLPAPER_BYTES
            })
        );
    }

    #[test]
    fn encodes_as_base64_data_uri() {
        assert_eq!(encode_data_uri("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn decode_reports_io_failures() {
        let result = pollster::block_on(decode_to_data_uri(Corrupt, "image/png", 1024));
        assert_eq!(result, Err(PreferenceError::Decode("truncated".to_string())));
    }

    #[test]
    fn decode_checks_actual_length() {
        let result = pollster::block_on(decode_to_data_uri(vec![0u8; 8], "image/gif", 4));
        assert_eq!(result, Err(PreferenceError::PayloadTooLarge { size: 8, limit: 4 }));
    }

    #[test]
    fn validates_imported_uris() {
        assert!(validate_data_uri("data:image/png;base64,aGk=", 1024).is_ok());
        assert!(matches!(
            validate_data_uri("data:text/html;base64,aGk=", 1024),
            Err(PreferenceError::UnsupportedMedia(m)) if m == "text/html"
        ));
        assert!(matches!(
            validate_data_uri("https://example.com/a.png", 1024),
            Err(PreferenceError::UnsupportedMedia(_))
        ));
        assert!(matches!(
            validate_data_uri("data:image/png;base64,AAAAAAAA", 3),
            Err(PreferenceError::PayloadTooLarge { size: 6, limit: 3 })
        ));
    }

    #[test]
    fn padded_payload_counts_decoded_bytes() {
        // "aGk=" is two bytes, not three
        assert!(validate_data_uri("data:image/png;base64,aGk=", 2).is_ok());
        let uri = encode_data_uri("image/png", &[0u8; 1024]);
        assert!(validate_data_uri(&uri, 1024).is_ok());
        assert!(matches!(
            validate_data_uri(&uri, 1023),
            Err(PreferenceError::PayloadTooLarge { size: 1024, limit: 1023 })
        ));
    }

    #[test]
    fn corrupt_base64_is_a_decode_error() {
        assert!(matches!(
            validate_data_uri("data:image/png;base64,@@@@", 1024),
            Err(PreferenceError::Decode(_))
        ));
    }
}
