//! Cloudflare Workers AI image generation.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use url::Url;

use super::RemoteError;
use crate::constants::IMAGE_PNG;

/// Parameters for one image generation.
#[derive(Clone, Copy, Debug)]
pub struct ImageRequest<'a> {
    /// Cleaned prompt.
    pub prompt: &'a str,
    /// Inference steps.
    pub steps: u32,
    /// Guidance scale.
    pub guidance: f32,
}

/// A generated image, base64 encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageResult {
    /// Base64 of the image bytes.
    pub base64: String,
    /// Image mime type.
    pub mime: String,
}

impl ImageResult {
    /// `data:` URL usable directly as an `<img src>`.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

/// Something that can render a prompt into an image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates one image; there is no fallback if this fails.
    async fn generate(&self, request: &ImageRequest<'_>) -> Result<ImageResult, RemoteError>;
}

#[derive(Serialize, Debug)]
struct RunRequest<'a> {
    prompt: &'a str,
    num_steps: u32,
    guidance: f32,
}

#[derive(Deserialize, Debug)]
struct RunResponse {
    result: Option<RunResult>,
}

#[derive(Deserialize, Debug)]
struct RunResult {
    image: Option<String>,
}

/// Reads a Workers AI response: JSON with `result.image` in base64, or raw
/// image bytes for models that stream the file back.
fn image_from_response(content_type: Option<&str>, bytes: &[u8]) -> Result<ImageResult, RemoteError> {
    if let Some(mime) = content_type.filter(|value| value.starts_with("image/")) {
        if bytes.is_empty() {
            return Err(RemoteError::Malformed("Empty image body".to_string()));
        }
        let mime = mime.split(';').next().unwrap_or(mime).trim().to_string();
        return Ok(ImageResult {
            base64: general_purpose::STANDARD.encode(bytes),
            mime,
        });
    }

    let parsed: RunResponse = serde_json::from_slice(bytes)
        .map_err(|err| RemoteError::Malformed(format!("Invalid image response JSON: {err}")))?;
    match parsed.result.and_then(|result| result.image) {
        Some(image) if !image.is_empty() => Ok(ImageResult {
            base64: image,
            mime: IMAGE_PNG.to_string(),
        }),
        _ => {
            error!("Full response: {}", String::from_utf8_lossy(bytes));
            Err(RemoteError::Malformed(
                "No image data in Cloudflare response".to_string(),
            ))
        }
    }
}

/// Workers AI client for a single model.
#[derive(Clone, Debug)]
pub struct CloudflareImageClient {
    client: reqwest::Client,
    run_url: Url,
    token: String,
}

impl CloudflareImageClient {
    /// `run_url` is the full `.../accounts/{id}/ai/run/{model}` URL.
    pub fn new(client: reqwest::Client, run_url: Url, token: String) -> Self {
        Self {
            client,
            run_url,
            token,
        }
    }
}

#[async_trait]
impl ImageGenerator for CloudflareImageClient {
    #[instrument(level = "debug", skip_all, fields(prompt_len = request.prompt.len()))]
    async fn generate(&self, request: &ImageRequest<'_>) -> Result<ImageResult, RemoteError> {
        let body = RunRequest {
            prompt: request.prompt,
            num_steps: request.steps,
            guidance: request.guidance,
        };
        let resp = self
            .client
            .post(self.run_url.clone())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = resp.bytes().await?;
        debug!(
            "Image response {status}, content-type {:?}, {} bytes",
            content_type,
            bytes.len()
        );
        if !status.is_success() {
            return Err(RemoteError::from_status(
                status,
                String::from_utf8_lossy(&bytes).to_string(),
            ));
        }
        image_from_response(content_type.as_deref(), &bytes)
    }
}
