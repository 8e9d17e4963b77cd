//! Most frequent relevant words in a set of messages.

use std::collections::{HashMap, HashSet};

use pulse_ingest::{normalize_text, vocabulary::is_relevant_term};
use pulse_store::MessageEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

/// Count occurrences of relevant words across `events`.
///
/// A word is relevant if it is in the fixed crypto/trading vocabulary or in
/// `extra_terms` (lowercase). Sorted by count descending, then word.
pub fn top_words<'a, I>(events: I, extra_terms: &HashSet<String>, limit: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = &'a MessageEvent>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    for event in events {
        let normalized = normalize_text(&event.text);
        for word in normalized.split_whitespace() {
            if is_relevant_term(word) || extra_terms.contains(word) {
                *counts.entry(word.to_string()).or_default() += 1;
            }
        }
    }

    let mut words: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(limit);
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(text: &str) -> MessageEvent {
        MessageEvent {
            timestamp: 0,
            group_id: "g1".into(),
            group_name: String::new(),
            user_id: "u1".into(),
            display_name: String::new(),
            text: text.into(),
        }
    }

    #[test]
    fn test_counts_only_relevant_words() {
        let events = vec![
            event("Comprei mais NIX, a liquidez está boa"),
            event("nix nix na dex"),
            event("bom dia pessoal"),
        ];
        let extra: HashSet<String> = ["nix".to_string()].into_iter().collect();
        let words = top_words(&events, &extra, 10);

        assert_eq!(words[0], WordCount { word: "nix".into(), count: 3 });
        assert!(words.iter().any(|w| w.word == "liquidez"));
        assert!(words.iter().any(|w| w.word == "dex"));
        assert!(!words.iter().any(|w| w.word == "pessoal"));
    }

    #[test]
    fn test_limit() {
        let events = vec![event("dex dex liquidez")];
        let words = top_words(&events, &HashSet::new(), 1);
        assert_eq!(words, vec![WordCount { word: "dex".into(), count: 2 }]);
    }
}
