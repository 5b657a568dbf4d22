//! Image decoding with format detection, validation, and timeout support.

use image::{DynamicImage, GenericImageView, ImageError, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::RecognitionError;

/// Image decoder with configurable limits and timeout.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory buffer with validation and timeout.
    ///
    /// `source_name` is used for error messages and, when the content does
    /// not identify its own format, as an extension hint.
    pub async fn decode_bytes(
        &self,
        bytes: Vec<u8>,
        source_name: &str,
    ) -> Result<DecodedImage, RecognitionError> {
        let name = source_name.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &name)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                if decoded.width > self.limits.max_image_dimension
                    || decoded.height > self.limits.max_image_dimension
                {
                    return Err(RecognitionError::ImageTooLarge {
                        source_name: source_name.to_string(),
                        width: decoded.width,
                        height: decoded.height,
                        max_dim: self.limits.max_image_dimension,
                    });
                }
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(RecognitionError::Decode {
                source_name: source_name.to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(RecognitionError::Timeout {
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode (runs in spawn_blocking).
    fn decode_bytes_sync(bytes: Vec<u8>, source_name: &str) -> Result<DecodedImage, RecognitionError> {
        let mut reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| RecognitionError::Decode {
                source_name: source_name.to_string(),
                message: format!("Cannot detect image format: {}", e),
            })?;

        let format = match reader.format() {
            Some(f) => f,
            None => {
                ImageFormat::from_path(Path::new(source_name)).map_err(|_| {
                    RecognitionError::Decode {
                        source_name: source_name.to_string(),
                        message: "Unrecognized image data".to_string(),
                    }
                })?
            }
        };

        reader.set_format(format);
        let image = reader.decode().map_err(|e| match e {
            ImageError::Unsupported(_) => RecognitionError::UnsupportedFormat {
                source_name: source_name.to_string(),
                format: format_to_string(format),
            },
            other => RecognitionError::Decode {
                source_name: source_name.to_string(),
                message: other.to_string(),
            },
        })?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Pnm => "pnm".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        _ => "unknown".to_string(),
    }
}

/// Encode a solid-colour PNG, for tests that need real image bytes.
#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([40, 120, 200]),
    ));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}
