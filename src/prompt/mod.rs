//! Story to image-prompt rewriting.

use serde::Serialize;
use tracing::info;

use crate::config::{CascadeConfig, Enhancements};
use crate::remote::completion::TextCompletion;

pub mod cascade;
pub mod enhancer;
pub mod normalize;

use cascade::CascadeOutcome;

/// Where a script came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    /// A remote model wrote it.
    Model,
    /// The local enhancer wrote it.
    Fallback,
}

/// An image prompt ready for review.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnhancedPrompt {
    /// Prompt text.
    pub text: String,
    /// Provenance, for logs and the UI.
    pub source: SourceTag,
    /// Model that produced the text, when `source` is [`SourceTag::Model`].
    pub model_id: Option<String>,
}

impl EnhancedPrompt {
    fn fallback(enhancements: &Enhancements, user_story: &str) -> Self {
        Self {
            text: enhancer::enhance(enhancements, user_story),
            source: SourceTag::Fallback,
            model_id: None,
        }
    }
}

/// Rewrites a story into an image prompt; always produces something.
///
/// Without a completion backend the cascade is skipped entirely.
pub async fn generate_script(
    completion: Option<&dyn TextCompletion>,
    cascade: &CascadeConfig,
    enhancements: &Enhancements,
    user_story: &str,
) -> EnhancedPrompt {
    let outcome = match completion {
        Some(completion) => cascade::attempt(completion, cascade, user_story).await,
        None => CascadeOutcome::Exhausted,
    };

    match outcome {
        CascadeOutcome::Success { script, model_id } => EnhancedPrompt {
            text: script,
            source: SourceTag::Model,
            model_id: Some(model_id),
        },
        CascadeOutcome::Exhausted => {
            info!("[INFO] Falling back to enhanced prompt generator");
            EnhancedPrompt::fallback(enhancements, user_story)
        }
    }
}
