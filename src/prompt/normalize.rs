//! Cleans a prompt before it goes to the image model.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern")
}

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| compile(r"[\r\n]+"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));

/// Flattens line breaks, collapses whitespace runs and trims.
///
/// With `max_chars` set, the result is cut to that many characters (not
/// bytes) and trimmed again.
pub fn normalize(prompt: &str, max_chars: Option<usize>) -> String {
    let flattened = LINE_BREAKS.replace_all(prompt, " ");
    let collapsed = WHITESPACE.replace_all(&flattened, " ");
    let cleaned = collapsed.trim();

    match max_chars {
        Some(limit) if cleaned.chars().count() > limit => {
            warn!("Prompt truncated to {limit} characters");
            cleaned.chars().take(limit).collect::<String>().trim().to_string()
        }
        _ => cleaned.to_string(),
    }
}
