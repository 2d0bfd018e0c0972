//! Shared constants and defaults
//!

/// Default chat completions endpoint (GitHub Models, OpenAI compatible).
pub const DEFAULT_COMPLETION_ENDPOINT: &str =
    "https://models.inference.ai.azure.com/chat/completions";

/// Models tried in order when rewriting a story, cheapest first.
pub const DEFAULT_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4o", "gpt-4.1"];

/// Sampling temperature for prompt rewriting.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Token cap for prompt rewriting, kept low so answers stay concise.
pub const DEFAULT_MAX_TOKENS: u32 = 200;

/// Cloudflare API base, the account and model path are appended to it.
pub const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default Workers AI image model.
pub const DEFAULT_IMAGE_MODEL: &str = "@cf/black-forest-labs/flux-1-schnell";

/// Inference steps for the image model.
pub const DEFAULT_IMAGE_STEPS: u32 = 4;

/// How closely the image model follows the prompt.
pub const DEFAULT_IMAGE_GUIDANCE: f32 = 7.5;

/// Prompts longer than this (in characters) are truncated before image generation.
pub const DEFAULT_PROMPT_MAX_CHARS: usize = 500;

/// Outbound request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Mime type of images returned as base64 JSON.
pub const IMAGE_PNG: &str = "image/png";

/// Placeholder replaced with the user's story in [`DEFAULT_USER_PROMPT_TEMPLATE`].
pub const STORY_PLACEHOLDER: &str = "{story}";

/// System prompt for the prompt-writing model.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a concise image prompt writer. Transform user stories into vivid visual descriptions.

Rules:
1. MAXIMUM 450 characters (strict limit - count as you write)
2. Use powerful, specific adjectives and nouns
3. Skip articles (a, an, the) and filler words
4. Focus ONLY on key visual elements: character, setting, lighting, style
5. Use commas to separate concepts, not full sentences

Format: "Character description, setting details, lighting/mood, art style"

CRITICAL: Every word must earn its place. If over 450 characters, cut ruthlessly. Quality over quantity. Make every character count for maximum visual impact."#;

/// User message template, `{story}` is replaced with the story.
pub const DEFAULT_USER_PROMPT_TEMPLATE: &str = "Story: \"{story}\"\n\nCreate a concise image prompt under 450 characters. Use powerful words, skip filler. Format: character, setting, lighting, style.";

/// Keyword appended when the story names no lighting.
pub const DEFAULT_LIGHTING_KEYWORD: &str = "cinematic lighting";

/// Keyword appended when the story names no quality terms.
pub const DEFAULT_QUALITY_KEYWORD: &str = "high quality, detailed";

/// Keyword appended when the story names no composition.
pub const DEFAULT_STYLE_KEYWORD: &str = "professional composition";

/// Keyword appended when the story names no art style.
pub const DEFAULT_ADDITIONAL_KEYWORD: &str = "photorealistic";
