//! Cheap file checks run before reading and decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::RecognitionError;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Rejects missing, oversized, or non-image files before they are read in
/// full.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check existence, size limit and image signature of `path`.
    ///
    /// Returns the container format named by the file signature.
    pub fn validate(&self, path: &Path) -> Result<&'static str, RecognitionError> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecognitionError::FileNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(decode_error(path, format!("Cannot read metadata: {e}"))),
        };

        let max_bytes = self.limits.max_file_size_mb * BYTES_PER_MB;
        if metadata.len() > max_bytes {
            return Err(RecognitionError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / BYTES_PER_MB,
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let mut header = [0u8; 12];
        let read = std::fs::File::open(path)
            .and_then(|mut file| file.read(&mut header))
            .map_err(|e| decode_error(path, format!("Cannot open file: {e}")))?;

        sniff_format(&header[..read]).ok_or_else(|| {
            decode_error(path, "Unrecognized image format (invalid magic bytes)".to_string())
        })
    }
}

fn decode_error(path: &Path, message: String) -> RecognitionError {
    RecognitionError::Decode {
        source_name: path.display().to_string(),
        message,
    }
}

/// Identify an image container from its leading bytes.
///
/// A RIFF header shorter than 12 bytes is let through as WebP; the decoder
/// makes the final call.
pub fn sniff_format(header: &[u8]) -> Option<&'static str> {
    if header.len() < 4 {
        return None;
    }

    match header {
        [0xFF, 0xD8, 0xFF, ..] => Some("jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("png"),
        [b'G', b'I', b'F', b'8', ..] => Some("gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("webp"),
        [b'R', b'I', b'F', b'F', ..] if header.len() < 12 => Some("webp"),
        [b'B', b'M', ..] => Some("bmp"),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some("tiff"),
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => Some("heif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_signatures() {
        assert_eq!(sniff_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("jpeg"));
        assert_eq!(
            sniff_format(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            Some("png")
        );
        assert_eq!(
            sniff_format(b"RIFF\0\0\0\0WEBP"),
            Some("webp")
        );
        assert_eq!(sniff_format(b"GIF89a"), Some("gif"));
        assert_eq!(sniff_format(&[b'I', b'I', 0x2A, 0x00]), Some("tiff"));
        assert_eq!(sniff_format(&[b'M', b'M', 0x00, 0x2A]), Some("tiff"));
    }

    #[test]
    fn test_sniff_rejects_lookalikes() {
        assert_eq!(sniff_format(b"RIFF\0\0\0\0WAVE"), None);
        assert_eq!(sniff_format(&[b'I', b'I', 0x00, 0x00]), None);
        assert_eq!(sniff_format(&[0, 0, 0, 0, 0, 0, 0, 0]), None);
        assert_eq!(sniff_format(&[0xFF, 0xD8]), None);
    }

    #[test]
    fn test_missing_file() {
        let validator = Validator::new(LimitsConfig::default());
        let err = validator.validate(Path::new("/nonexistent/cat.jpg")).unwrap_err();
        assert!(matches!(err, RecognitionError::FileNotFound(_)));
    }

    #[test]
    fn test_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        let mut content = vec![0x89, b'P', b'N', b'G'];
        content.resize(2 * BYTES_PER_MB as usize, 0);
        std::fs::write(&path, content).unwrap();

        let validator = Validator::new(LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        });
        let err = validator.validate(&path).unwrap_err();
        assert!(matches!(err, RecognitionError::FileTooLarge { size_mb: 2, .. }));
    }

    #[test]
    fn test_text_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.jpg");
        std::fs::write(&path, "just some notes").unwrap();

        let validator = Validator::new(LimitsConfig::default());
        let err = validator.validate(&path).unwrap_err();
        assert!(matches!(err, RecognitionError::Decode { .. }));
    }

    #[test]
    fn test_valid_png_reports_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.png");
        std::fs::write(&path, crate::pipeline::decode::png_bytes(2, 2)).unwrap();

        let validator = Validator::new(LimitsConfig::default());
        assert_eq!(validator.validate(&path).unwrap(), "png");
    }
}
