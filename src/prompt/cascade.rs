//! Ordered fallback across remote text-completion models.

use tracing::{info, warn};

use crate::config::{CascadeConfig, ModelAttempt};
use crate::remote::RemoteError;
use crate::remote::completion::{CompletionRequest, TextCompletion};

/// Result of running the cascade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// A model produced a usable script.
    Success {
        /// Cleaned completion text.
        script: String,
        /// The model that produced it.
        model_id: String,
    },
    /// Every model failed, or there were none.
    Exhausted,
}

/// Strips one layer of matching `"` or `'` around `text`.
fn strip_matching_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2
            && let Some(inner) = text
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// Turns raw completion text into a script, `None` when nothing is left.
pub fn clean_completion(raw: &str) -> Option<String> {
    let script = strip_matching_quotes(raw.trim()).trim();
    (!script.is_empty()).then(|| script.to_string())
}

/// Tries each configured model in order and returns the first usable answer.
///
/// A failure of any kind moves on to the next model; nothing is retried and
/// no error escapes.
pub async fn attempt(
    completion: &dyn TextCompletion,
    config: &CascadeConfig,
    user_story: &str,
) -> CascadeOutcome {
    let user_message = config.user_prompt_template.render(user_story);

    for ModelAttempt { model_id, ordinal } in config.attempts() {
        let request = CompletionRequest {
            system_message: &config.system_prompt,
            user_message: &user_message,
            model_id,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };
        match completion.complete(&request).await {
            Ok(raw) => match clean_completion(&raw) {
                Some(script) => {
                    info!("[SUCCESS] {model_id} generated prompt: {script}");
                    return CascadeOutcome::Success {
                        script,
                        model_id: model_id.to_string(),
                    };
                }
                None => warn!("Model #{ordinal} {model_id} returned an empty completion"),
            },
            Err(RemoteError::RateLimited { .. }) => {
                warn!("Model #{ordinal} {model_id} is rate limited, trying the next one");
            }
            Err(err) => warn!("Model #{ordinal} {model_id} failed: {err}"),
        }
    }

    CascadeOutcome::Exhausted
}
