// src/classify.rs
//! Keyword matching primitives shared by the job filter.

use regex::{Regex, RegexBuilder};

/// Case-insensitive regex matching any keyword as a whole word.
/// Returns `None` for an empty keyword list (nothing can match).
pub fn whole_word_regex(keywords: &[String]) -> anyhow::Result<Option<Regex>> {
    let alts: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();
    if alts.is_empty() {
        return Ok(None);
    }
    let pattern = format!(r"\b(?:{})\b", alts.join("|"));
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| anyhow::anyhow!("keyword regex error: {e}"))?;
    Ok(Some(re))
}

/// True if `text` contains any of the (already lowercased) `needles`.
/// Absent text never matches.
pub fn contains_any(text: Option<&str>, needles: &[String]) -> bool {
    let Some(text) = text else {
        return false;
    };
    if text.is_empty() || needles.is_empty() {
        return false;
    }
    let hay = text.to_lowercase();
    needles.iter().any(|n| !n.is_empty() && hay.contains(n.as_str()))
}
