// Tests for the Flesch reading-ease approximation

use agelens_core::readability::{reading_ease, syllable_count};

// ============================================================================
// Syllable Counting Tests
// ============================================================================

#[test]
fn test_single_syllable_words() {
    assert_eq!(syllable_count("cat"), 1);
    assert_eq!(syllable_count("the"), 1);
    assert_eq!(syllable_count("now"), 1);
    assert_eq!(syllable_count("rhythm"), 1);
}

#[test]
fn test_multi_syllable_words() {
    assert_eq!(syllable_count("window"), 2);
    assert_eq!(syllable_count("reading"), 2);
    assert_eq!(syllable_count("beautiful"), 3);
}

#[test]
fn test_trailing_e_is_dropped() {
    assert_eq!(syllable_count("name"), 1);
    assert_eq!(syllable_count("make"), 1);
}

#[test]
fn test_bare_e_still_counts_one() {
    assert_eq!(syllable_count("e"), 1);
}

#[test]
fn test_non_letters_are_stripped() {
    assert_eq!(syllable_count("cat!"), 1);
    assert_eq!(syllable_count("don't"), syllable_count("dont"));
}

#[test]
fn test_token_without_letters_counts_zero() {
    assert_eq!(syllable_count(""), 0);
    assert_eq!(syllable_count("123"), 0);
    assert_eq!(syllable_count("!?#"), 0);
}

#[test]
fn test_case_insensitive() {
    assert_eq!(syllable_count("WINDOW"), syllable_count("window"));
}

// ============================================================================
// Reading Ease Tests
// ============================================================================

#[test]
fn test_empty_text_never_divides_by_zero() {
    // One default sentence, one default word, zero syllables: clamps to 120.
    assert_eq!(reading_ease(""), 120.0);
}

#[test]
fn test_simple_text_scores_high() {
    let score = reading_ease("The cat sat. The dog ran.");
    assert!(score > 100.0);
    assert!(score <= 120.0);
}

#[test]
fn test_complex_text_scores_lower_than_simple() {
    let simple = reading_ease("We can help. Call us now.");
    let complex = reading_ease(
        "Notwithstanding administrative considerations, organizational accountability \
         necessitates comprehensive documentation methodologies.",
    );
    assert!(complex < simple);
}

#[test]
fn test_score_is_always_in_bounds() {
    for text in [
        "",
        "word",
        "!!!???",
        "a.",
        "Incomprehensibility characterizes institutionalization.",
        "Go. Do. Be. See. Run. Sit.",
        "no sentence terminators at all just words going on and on",
    ] {
        let score = reading_ease(text);
        assert!((0.0..=120.0).contains(&score), "out of bounds for {text:?}: {score}");
    }
}

#[test]
fn test_deterministic() {
    let text = "The quick brown fox jumps over the lazy dog. It was easy.";
    assert_eq!(reading_ease(text), reading_ease(text));
}
