//! Config handling

use std::time::Duration;

use tracing::log::LevelFilter;
use url::Url;

use crate::cli::CliOptions;
use crate::constants::{
    DEFAULT_ADDITIONAL_KEYWORD, DEFAULT_IMAGE_GUIDANCE, DEFAULT_IMAGE_MODEL, DEFAULT_IMAGE_STEPS,
    DEFAULT_LIGHTING_KEYWORD, DEFAULT_MAX_TOKENS, DEFAULT_MODELS, DEFAULT_PROMPT_MAX_CHARS,
    DEFAULT_QUALITY_KEYWORD, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STYLE_KEYWORD,
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE, DEFAULT_USER_PROMPT_TEMPLATE, STORY_PLACEHOLDER,
};

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// A user message template with a `{story}` placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate(String);

impl PromptTemplate {
    /// Wraps a template string.
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Substitutes the story into the template.
    pub fn render(&self, story: &str) -> String {
        self.0.replace(STORY_PLACEHOLDER, story)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_USER_PROMPT_TEMPLATE)
    }
}

/// Keywords the heuristic enhancer appends when a story lacks them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enhancements {
    /// Lighting clause.
    pub lighting: String,
    /// Quality clause.
    pub quality: String,
    /// Composition clause.
    pub style: String,
    /// Art style clause, used when no style is named.
    pub additional: String,
}

impl Default for Enhancements {
    fn default() -> Self {
        Self {
            lighting: DEFAULT_LIGHTING_KEYWORD.to_string(),
            quality: DEFAULT_QUALITY_KEYWORD.to_string(),
            style: DEFAULT_STYLE_KEYWORD.to_string(),
            additional: DEFAULT_ADDITIONAL_KEYWORD.to_string(),
        }
    }
}

/// One configured model and its position in the fallback order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelAttempt<'a> {
    /// Model identifier sent to the completion endpoint.
    pub model_id: &'a str,
    /// Zero-based position in the fallback order.
    pub ordinal: usize,
}

/// Everything the model cascade needs to build its requests.
#[derive(Clone, Debug, PartialEq)]
pub struct CascadeConfig {
    /// Models in preference order.
    pub models: Vec<String>,
    /// System message for every attempt.
    pub system_prompt: String,
    /// Template for the user message.
    pub user_prompt_template: PromptTemplate,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token cap.
    pub max_tokens: u32,
}

impl CascadeConfig {
    /// The configured models in the order they are tried.
    pub fn attempts(&self) -> impl Iterator<Item = ModelAttempt<'_>> {
        self.models
            .iter()
            .enumerate()
            .map(|(ordinal, model_id)| ModelAttempt {
                model_id: model_id.as_str(),
                ordinal,
            })
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            models: DEFAULT_MODELS.iter().map(|model| model.to_string()).collect(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_prompt_template: PromptTemplate::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Image generation parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageConfig {
    /// Workers AI model path, eg `@cf/black-forest-labs/flux-1-schnell`.
    pub model: String,
    /// Inference steps.
    pub steps: u32,
    /// Prompt guidance scale.
    pub guidance: f32,
    /// Prompt length cap in characters, `None` disables it.
    pub max_prompt_chars: Option<usize>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_IMAGE_MODEL.to_string(),
            steps: DEFAULT_IMAGE_STEPS,
            guidance: DEFAULT_IMAGE_GUIDANCE,
            max_prompt_chars: Some(DEFAULT_PROMPT_MAX_CHARS),
        }
    }
}

/// Immutable application configuration, built once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Remote prompt rewriting.
    pub cascade: CascadeConfig,
    /// Local prompt rewriting.
    pub enhancements: Enhancements,
    /// Image generation.
    pub image: ImageConfig,
    /// Timeout applied to every outbound request.
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cascade: CascadeConfig::default(),
            enhancements: Enhancements::default(),
            image: ImageConfig::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl From<&CliOptions> for AppConfig {
    fn from(cli: &CliOptions) -> Self {
        let models = cli
            .models
            .iter()
            .map(|model| model.trim())
            .filter(|model| !model.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            cascade: CascadeConfig {
                models,
                temperature: cli.temperature,
                max_tokens: cli.max_tokens,
                ..CascadeConfig::default()
            },
            enhancements: Enhancements::default(),
            image: ImageConfig {
                model: cli.image_model.clone(),
                steps: cli.image_steps,
                guidance: cli.image_guidance,
                max_prompt_chars: (cli.prompt_max_chars > 0).then_some(cli.prompt_max_chars),
            },
            request_timeout: Duration::from_secs(cli.request_timeout_secs),
        }
    }
}

/// Builds the Workers AI run URL for an account and model.
pub fn cloudflare_run_url(api_base: &Url, account_id: &str, model: &str) -> Result<Url, url::ParseError> {
    let base = api_base.as_str().trim_end_matches('/');
    Url::parse(&format!("{base}/accounts/{account_id}/ai/run/{model}"))
}
