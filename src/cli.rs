//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;
use url::Url;

use crate::constants::{
    DEFAULT_CLOUDFLARE_API_BASE, DEFAULT_COMPLETION_ENDPOINT, DEFAULT_IMAGE_GUIDANCE,
    DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_STEPS, DEFAULT_MAX_TOKENS, DEFAULT_PROMPT_MAX_CHARS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE,
};

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "STORYFORGE_DEBUG")]
    /// Enable debug logging. Env: STORYFORGE_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "3000", env = "PORT")]
    /// http listener, defaults to `3000`.
    /// Env: PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "STORYFORGE_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: STORYFORGE_LISTEN_ADDRESS
    pub listen_address: String,
    #[clap(long, default_value = "./public", env = "STORYFORGE_STATIC_DIR")]
    /// Directory served for the browser UI.
    /// Env: STORYFORGE_STATIC_DIR
    pub static_dir: PathBuf,

    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    /// Token for the chat completions endpoint. Without it every story goes
    /// straight to the local enhancer.
    /// Env: GITHUB_TOKEN
    pub github_token: Option<String>,
    #[clap(long, default_value = DEFAULT_COMPLETION_ENDPOINT, env = "STORYFORGE_COMPLETION_ENDPOINT")]
    /// Chat completions endpoint.
    /// Env: STORYFORGE_COMPLETION_ENDPOINT
    pub completion_endpoint: Url,
    #[clap(
        long,
        value_delimiter = ',',
        default_value = "gpt-4o-mini,gpt-4o,gpt-4.1",
        env = "STORYFORGE_MODELS"
    )]
    /// Comma separated models, tried in order.
    /// Env: STORYFORGE_MODELS
    pub models: Vec<String>,
    #[clap(long, default_value_t = DEFAULT_TEMPERATURE, env = "STORYFORGE_TEMPERATURE")]
    /// Sampling temperature for prompt rewriting.
    /// Env: STORYFORGE_TEMPERATURE
    pub temperature: f32,
    #[clap(long, default_value_t = DEFAULT_MAX_TOKENS, env = "STORYFORGE_MAX_TOKENS")]
    /// Completion token cap.
    /// Env: STORYFORGE_MAX_TOKENS
    pub max_tokens: u32,

    #[clap(long, env = "CF_TOKEN", hide_env_values = true)]
    /// Cloudflare API token.
    /// Env: CF_TOKEN
    pub cf_token: Option<String>,
    #[clap(long, env = "ACCOUNT_ID")]
    /// Cloudflare account id.
    /// Env: ACCOUNT_ID
    pub account_id: Option<String>,
    #[clap(long, default_value = DEFAULT_CLOUDFLARE_API_BASE, env = "STORYFORGE_CLOUDFLARE_API_BASE")]
    /// Cloudflare API base URL.
    /// Env: STORYFORGE_CLOUDFLARE_API_BASE
    pub cloudflare_api_base: Url,
    #[clap(long, default_value = DEFAULT_IMAGE_MODEL, env = "STORYFORGE_IMAGE_MODEL")]
    /// Workers AI image model.
    /// Env: STORYFORGE_IMAGE_MODEL
    pub image_model: String,
    #[clap(long, default_value_t = DEFAULT_IMAGE_STEPS, env = "STORYFORGE_IMAGE_STEPS")]
    /// Inference steps, lower is faster.
    /// Env: STORYFORGE_IMAGE_STEPS
    pub image_steps: u32,
    #[clap(long, default_value_t = DEFAULT_IMAGE_GUIDANCE, env = "STORYFORGE_IMAGE_GUIDANCE")]
    /// Guidance scale.
    /// Env: STORYFORGE_IMAGE_GUIDANCE
    pub image_guidance: f32,
    #[clap(long, default_value_t = DEFAULT_PROMPT_MAX_CHARS, env = "STORYFORGE_PROMPT_MAX_CHARS")]
    /// Truncate image prompts to this many characters, `0` disables it.
    /// Env: STORYFORGE_PROMPT_MAX_CHARS
    pub prompt_max_chars: usize,

    #[clap(long, env = "NOTIFY_WEBHOOK_URL", hide_env_values = true)]
    /// Webhook notified after each generated image.
    /// Env: NOTIFY_WEBHOOK_URL
    pub notify_webhook_url: Option<Url>,
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, env = "STORYFORGE_REQUEST_TIMEOUT_SECS")]
    /// Outbound request timeout in seconds.
    /// Env: STORYFORGE_REQUEST_TIMEOUT_SECS
    pub request_timeout_secs: u64,
}
