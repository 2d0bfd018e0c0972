//! JSON API handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::error::StoryforgeError;
use crate::prompt::{self, SourceTag, normalize::normalize};
use crate::remote::image::ImageRequest;
use crate::remote::notify::notify_in_background;

#[derive(Deserialize, Debug)]
pub(crate) struct GenerateScriptRequest {
    #[serde(default)]
    prompt: String,
}

#[derive(Serialize, Debug)]
pub(crate) struct GenerateScriptResponse {
    script: String,
    source: SourceTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GenerateImageRequest {
    #[serde(default)]
    script: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateImageResponse {
    image_url: String,
    image: String,
    mime: String,
    message: &'static str,
}

fn bad_json(err: &JsonRejection) -> StoryforgeError {
    StoryforgeError::BadRequest(err.body_text())
}

/// handles POST /api/generate-script
pub(crate) async fn generate_script_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateScriptRequest>, JsonRejection>,
) -> Result<Json<GenerateScriptResponse>, StoryforgeError> {
    let Json(request) = payload.map_err(|err| bad_json(&err))?;
    let story = request.prompt.trim();
    if story.is_empty() {
        return Err(StoryforgeError::BadRequest("Prompt is required".to_string()));
    }

    info!("Generating image prompt for: {story}");
    let script = prompt::generate_script(
        state.completion.as_deref(),
        &state.config.cascade,
        &state.config.enhancements,
        story,
    )
    .await;
    info!(
        "Generated prompt (source {:?}, model {}): {}",
        script.source,
        script.model_id.as_deref().unwrap_or("-"),
        script.text
    );

    Ok(Json(GenerateScriptResponse {
        script: script.text,
        source: script.source,
        model: script.model_id,
    }))
}

/// handles POST /api/generate-image
pub(crate) async fn generate_image_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>, StoryforgeError> {
    let Json(request) = payload.map_err(|err| bad_json(&err))?;
    if request.script.trim().is_empty() {
        return Err(StoryforgeError::BadRequest("Prompt is required".to_string()));
    }
    let generator = state.image.as_deref().ok_or_else(|| {
        StoryforgeError::ServiceUnavailable(
            "Image generation is not configured (CF_TOKEN and ACCOUNT_ID)".to_string(),
        )
    })?;

    let image_config = &state.config.image;
    let prompt = normalize(&request.script, image_config.max_prompt_chars);
    info!("Cleaned prompt length: {}", prompt.chars().count());

    let image = generator
        .generate(&ImageRequest {
            prompt: &prompt,
            steps: image_config.steps,
            guidance: image_config.guidance,
        })
        .await?;
    info!(
        "[SUCCESS] Image generated successfully, base64 length {} chars",
        image.base64.len()
    );

    if let Some(notifier) = state.notifier.clone() {
        let message = format!(
            "New image generated at {}: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            prompt
        );
        notify_in_background(notifier, message);
    }

    Ok(Json(GenerateImageResponse {
        image_url: image.data_url(),
        image: image.base64,
        mime: image.mime,
        message: "Image generated successfully",
    }))
}
