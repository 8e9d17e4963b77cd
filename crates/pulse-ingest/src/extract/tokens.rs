//! Topic / token candidate extraction.
//!
//! Candidates are emitted in a fixed order so extraction is reproducible:
//! bare uppercase runs, cashtags, alias-resolved words, then bigrams. The
//! output may contain duplicates; callers decide how to count them.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::text::normalize_text;
use crate::aliases::AliasRegistry;

static UPPERCASE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2,12}\b").unwrap());
static CASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z][A-Za-z0-9]{0,11})\b").unwrap());

/// Minimum word length (in chars) for a word to take part in a bigram.
const MIN_BIGRAM_WORD_LEN: usize = 3;

/// Extract topic candidates from raw message text.
pub fn extract_candidates(
    text: &str,
    stopwords: &HashSet<String>,
    aliases: &dyn AliasRegistry,
) -> Vec<String> {
    let mut candidates = Vec::new();

    // 1. Bare uppercase runs
    for m in UPPERCASE_RE.find_iter(text) {
        candidates.push(m.as_str().to_string());
    }

    // 2. Cashtags
    for caps in CASHTAG_RE.captures_iter(text) {
        candidates.push(caps[1].to_uppercase());
    }

    let normalized = normalize_text(text);
    let words: Vec<&str> = normalized.split(' ').filter(|w| !w.is_empty()).collect();

    // 3. Alias-resolved words. The first failing lookup disables the rest
    // of the pass for this text.
    for word in &words {
        match aliases.lookup(word) {
            Ok(Some(alias)) => candidates.push(alias.label),
            Ok(None) => {}
            Err(e) => {
                warn!("Alias lookup failed, continuing without aliases: {}", e);
                break;
            }
        }
    }

    // 4. Bigrams of adjacent content words
    for pair in words.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if bigram_word(a, stopwords) && bigram_word(b, stopwords) {
            candidates.push(format!("{} {}", a, b));
        }
    }

    candidates
}

fn bigram_word(word: &str, stopwords: &HashSet<String>) -> bool {
    word.chars().count() >= MIN_BIGRAM_WORD_LEN && !stopwords.contains(word)
}
