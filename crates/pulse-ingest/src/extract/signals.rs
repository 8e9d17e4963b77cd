//! Per-message lead signals: monitored token mentions, hype emoji, buy
//! intent, interest and speculation keywords.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::text::normalize_text;
use crate::vocabulary::{BUY_INTENT_PHRASES, INTEREST_KEYWORDS, SPECULATION_KEYWORDS};

/// Signals detected in one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSignals {
    /// Occurrences of any monitored token (word boundary, case-insensitive).
    pub token_mentions: u32,
    /// Raw occurrences of hype emoji; repeats count.
    pub hype_emojis: u32,
    /// One of the buy-intent phrases is present.
    pub buy_intent: bool,
    /// Buy intent or an interest keyword is present.
    pub interest: bool,
    /// A speculation keyword is present.
    pub speculation: bool,
}

/// Compiled detector for a fixed monitored-token and emoji configuration.
#[derive(Debug, Clone)]
pub struct SignalDetector {
    token_re: Option<Regex>,
    emojis: Vec<String>,
}

impl SignalDetector {
    /// Build a detector. Empty token labels and emoji are ignored.
    pub fn new<T: AsRef<str>, E: AsRef<str>>(monitored_tokens: &[T], hype_emojis: &[E]) -> Self {
        let alternation: Vec<String> = monitored_tokens
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();

        let token_re = if alternation.is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?i)\b(?:{})\b", alternation.join("|"))).ok()
        };

        let emojis = hype_emojis
            .iter()
            .map(|e| e.as_ref().to_string())
            .filter(|e| !e.is_empty())
            .collect();

        Self { token_re, emojis }
    }

    /// Detect signals in raw message text.
    pub fn detect(&self, text: &str) -> LeadSignals {
        let token_mentions = self
            .token_re
            .as_ref()
            .map(|re| re.find_iter(text).count())
            .unwrap_or(0) as u32;

        let hype_emojis = self
            .emojis
            .iter()
            .map(|e| text.matches(e.as_str()).count())
            .sum::<usize>() as u32;

        let normalized = normalize_text(text);
        let buy_intent = contains_any(&normalized, BUY_INTENT_PHRASES);
        let interest = buy_intent || contains_any(&normalized, INTEREST_KEYWORDS);
        let speculation = contains_any(&normalized, SPECULATION_KEYWORDS);

        LeadSignals {
            token_mentions,
            hype_emojis,
            buy_intent,
            interest,
            speculation,
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> SignalDetector {
        SignalDetector::new(&["NIX", "BTC"], &["🚀", "🔥"])
    }

    #[test]
    fn test_buy_intent_message() {
        let signals = detector().detect("NIX vai voar 🚀🚀 quero comprar");
        assert_eq!(signals.token_mentions, 1);
        assert_eq!(signals.hype_emojis, 2);
        assert!(signals.buy_intent);
        assert!(signals.interest);
        assert!(!signals.speculation);
    }

    #[test]
    fn test_token_word_boundary_case_insensitive() {
        let signals = detector().detect("nix, Nix e NIX! mas nao phoenix nem nixcoin");
        assert_eq!(signals.token_mentions, 3);
    }

    #[test]
    fn test_interest_and_speculation_keywords() {
        let signals = detector().detect("Como faz pra pagar no PIX? qual o endereço do contrato?");
        assert!(!signals.buy_intent);
        assert!(signals.interest);
        assert!(signals.speculation);
    }

    #[test]
    fn test_plain_message() {
        let signals = detector().detect("bom dia grupo");
        assert_eq!(signals, LeadSignals::default());
    }

    #[test]
    fn test_no_monitored_tokens() {
        let detector = SignalDetector::new::<&str, &str>(&[], &["🔥"]);
        let signals = detector.detect("NIX 🔥🔥🔥");
        assert_eq!(signals.token_mentions, 0);
        assert_eq!(signals.hype_emojis, 3);
    }
}
