//! Flesch Reading Ease approximation.
//!
//! Syllable counting is deliberately coarse: vowel-group runs with a dropped
//! trailing 'e', not a phonetic dictionary. That keeps the score cheap and
//! deterministic, which matters more here than per-word precision.

use once_cell::sync::Lazy;
use regex::Regex;

static VOWEL_GROUPS: Lazy<Regex> = Lazy::new(|| Regex::new("[aeiouy]+").unwrap());
static SENTENCE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Estimate syllables in a single word.
///
/// Lowercases, strips non-letters, drops one trailing 'e', then counts
/// maximal vowel runs. Any non-empty alphabetic token counts at least one
/// syllable; a token with no letters counts zero.
pub fn syllable_count(word: &str) -> usize {
    let letters: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect();
    if letters.is_empty() {
        return 0;
    }

    let stem = letters.strip_suffix('e').unwrap_or(&letters);
    VOWEL_GROUPS.find_iter(stem).count().max(1)
}

/// Flesch Reading Ease, clamped to [0, 120].
///
/// Sentences are `.!?` runs (minimum one) and words are whitespace-separated
/// tokens (minimum one), so empty input never divides by zero.
pub fn reading_ease(text: &str) -> f64 {
    let sentences = SENTENCE_BREAKS.find_iter(text).count().max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len().max(1);
    let syllables: usize = words.iter().map(|w| syllable_count(w)).sum();

    let words_per_sentence = word_count as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / word_count as f64;

    (206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word).clamp(0.0, 120.0)
}
