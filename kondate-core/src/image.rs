//! Recipe photo generation and image validation.
//!
//! Photo generation is best-effort: callers use [`generate_best_effort`],
//! which logs every failure and yields `None` instead of an error.

use std::fmt;
use std::io::Cursor;

use async_trait::async_trait;
use image::{ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::ImageConfig;

/// Allowed image formats for recipe photos.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum file size for images (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image request failed: {0}")]
    RequestFailed(String),

    #[error("Image API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Image API response had no image URL")]
    MissingImageUrl,

    #[error("Invalid image: {0}")]
    Invalid(String),
}

/// A generated and validated image, ready to store.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    /// Detected content type (e.g., "image/jpeg").
    pub content_type: String,
    pub source_url: String,
}

impl fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("bytes", &self.data.len())
            .field("content_type", &self.content_type)
            .field("source_url", &self.source_url)
            .finish()
    }
}

fn too_large(size: u64) -> ImageError {
    ImageError::Invalid(format!(
        "image too large: {} bytes (max {})",
        size, MAX_FILE_SIZE
    ))
}

/// Append a downloaded chunk, refusing to grow past [`MAX_FILE_SIZE`].
fn append_capped(data: &mut Vec<u8>, chunk: &[u8]) -> Result<(), ImageError> {
    let size = data.len() + chunk.len();
    if size > MAX_FILE_SIZE {
        return Err(too_large(size as u64));
    }
    data.extend_from_slice(chunk);
    Ok(())
}

/// Validate image data: check format is allowed and detect content type.
///
/// Returns the content type on success (e.g., "image/jpeg").
pub fn validate_image(data: &[u8]) -> Result<String, ImageError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(too_large(data.len() as u64));
    }

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::Invalid(format!("failed to read image: {e}")))?;

    let format = reader
        .format()
        .ok_or_else(|| ImageError::Invalid("could not detect image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::Invalid(format!(
            "unsupported image format: {format:?}. Allowed: JPEG, PNG, GIF, WebP"
        )));
    }

    Ok(format.to_mime_type().to_string())
}

/// Generates a photo for a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync + fmt::Debug {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageError>;
}

/// Run a generator and swallow its failure.
pub async fn generate_best_effort(
    generator: &dyn ImageGenerator,
    prompt: &str,
) -> Option<GeneratedImage> {
    match generator.generate(prompt).await {
        Ok(image) => {
            tracing::debug!(
                bytes = image.data.len(),
                content_type = %image.content_type,
                "recipe photo generated"
            );
            Some(image)
        }
        Err(e) => {
            tracing::warn!(error = %e, "recipe photo generation failed");
            None
        }
    }
}

/// fal.ai-style text-to-image client.
#[derive(Debug)]
pub struct FalImageGenerator {
    config: ImageConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    image_size: &'a str,
    num_inference_steps: u32,
    guidance_scale: f32,
    num_images: u32,
    enable_safety_checker: bool,
    safety_tolerance: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    images: Vec<ImageEntry>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    url: Option<String>,
}

fn first_image_url(body: &str) -> Result<String, ImageError> {
    let response: ImageResponse = serde_json::from_str(body)
        .map_err(|e| ImageError::RequestFailed(format!("unreadable response: {e}")))?;

    response
        .images
        .into_iter()
        .next()
        .and_then(|image| image.url)
        .filter(|url| !url.is_empty())
        .ok_or(ImageError::MissingImageUrl)
}

impl FalImageGenerator {
    pub fn new(config: ImageConfig) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ImageError::RequestFailed(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ImageRequest<'a> {
        ImageRequest {
            prompt,
            image_size: &self.config.image_size,
            num_inference_steps: self.config.num_inference_steps,
            guidance_scale: self.config.guidance_scale,
            num_images: 1,
            enable_safety_checker: self.config.enable_safety_checker,
            safety_tolerance: &self.config.safety_tolerance,
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::ApiError {
                status: status.as_u16(),
                message: format!("download of {url} failed"),
            });
        }

        if let Some(declared) = response.content_length() {
            if declared > MAX_FILE_SIZE as u64 {
                return Err(too_large(declared));
            }
        }

        let mut data = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ImageError::RequestFailed(e.to_string()))?
        {
            append_capped(&mut data, &chunk)?;
        }
        Ok(data)
    }
}

#[async_trait]
impl ImageGenerator for FalImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Key {}", self.config.api_key))
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| ImageError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ImageError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ImageError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let url = first_image_url(&body)?;
        let data = self.download(&url).await?;
        let content_type = validate_image(&data)?;

        Ok(GeneratedImage {
            data,
            content_type,
            source_url: url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[derive(Debug)]
    struct FailingGenerator;

    #[async_trait]
    impl ImageGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<GeneratedImage, ImageError> {
            Err(ImageError::MissingImageUrl)
        }
    }

    #[test]
    fn test_validate_png() {
        assert_eq!(validate_image(TINY_PNG).unwrap(), "image/png");
    }

    #[test]
    fn test_validate_invalid_format() {
        assert!(validate_image(b"not an image").is_err());
    }

    #[test]
    fn test_validate_too_large() {
        let mut data = TINY_PNG.to_vec();
        data.resize(MAX_FILE_SIZE + 1, 0);
        assert!(matches!(validate_image(&data), Err(ImageError::Invalid(_))));
    }

    #[test]
    fn test_download_buffer_is_capped() {
        let mut data = Vec::new();
        append_capped(&mut data, &vec![0; MAX_FILE_SIZE - 1]).unwrap();
        append_capped(&mut data, &[0]).unwrap();
        assert_eq!(data.len(), MAX_FILE_SIZE);

        assert!(matches!(
            append_capped(&mut data, &[0]),
            Err(ImageError::Invalid(_))
        ));
        assert_eq!(data.len(), MAX_FILE_SIZE);
    }

    #[test]
    fn test_request_body_shape() {
        let generator = FalImageGenerator::new(ImageConfig::new("k".to_string())).unwrap();
        let body = serde_json::to_value(generator.build_request("a bowl of ramen")).unwrap();
        assert_eq!(body["prompt"], "a bowl of ramen");
        assert_eq!(body["image_size"], "landscape_4_3");
        assert_eq!(body["num_images"], 1);
        assert_eq!(body["enable_safety_checker"], true);
        assert_eq!(body["safety_tolerance"], "2");
        assert!(body.get("guidance_scale").is_some());
        assert!(body.get("num_inference_steps").is_some());
    }

    #[test]
    fn test_first_image_url() {
        assert_eq!(
            first_image_url(r#"{"images":[{"url":"https://cdn.example/a.png","width":1024}]}"#)
                .unwrap(),
            "https://cdn.example/a.png"
        );
        assert!(matches!(
            first_image_url(r#"{"images":[]}"#),
            Err(ImageError::MissingImageUrl)
        ));
    }

    #[tokio::test]
    async fn test_best_effort_swallows_errors() {
        assert!(generate_best_effort(&FailingGenerator, "p").await.is_none());
    }
}
