//! Rule-based prompt enhancement, used when no model produced a script.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::Enhancements;

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern")
}

static ANIME_STYLE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)anime|manga|cartoon|comic"));
static REALISTIC_STYLE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)realistic|photorealistic|photo"));

const LIGHTING_TERMS: &[&str] = &["light", "glow", "illuminat"];
const QUALITY_TERMS: &[&str] = &["quality", "detailed", "sharp"];
const COMPOSITION_TERMS: &[&str] = &["composition", "framing", "camera"];

/// Subject words, the term that suppresses the clause, and the clause.
const ATMOSPHERES: &[(&[&str], &str, &str)] = &[
    (&["cat", "pet", "animal"], "cute", "adorable"),
    (&["space", "galaxy", "cosmic"], "nebula", "cosmic nebula, stars"),
    (&["city", "urban"], "neon", "urban atmosphere"),
];

fn mentions_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}

/// Appends whatever visual descriptors the story does not already carry.
///
/// Deterministic and total: the trimmed story always comes first, and
/// clauses are only ever appended, in a fixed order.
pub fn enhance(enhancements: &Enhancements, user_story: &str) -> String {
    let story = user_story.trim();
    let lower = story.to_lowercase();
    let mut clauses: Vec<&str> = Vec::new();

    if !ANIME_STYLE.is_match(story) && !REALISTIC_STYLE.is_match(story) {
        clauses.push(&enhancements.additional);
    }
    if !mentions_any(&lower, LIGHTING_TERMS) {
        clauses.push(&enhancements.lighting);
    }
    if !mentions_any(&lower, QUALITY_TERMS) {
        clauses.push(&enhancements.quality);
    }
    if !mentions_any(&lower, COMPOSITION_TERMS) {
        clauses.push(&enhancements.style);
    }
    for &(subjects, suppressor, clause) in ATMOSPHERES {
        if mentions_any(&lower, subjects) && !lower.contains(suppressor) {
            clauses.push(clause);
        }
    }

    let mut enhanced = String::from(story);
    for clause in clauses {
        enhanced.push_str(", ");
        enhanced.push_str(clause);
    }
    enhanced
}
