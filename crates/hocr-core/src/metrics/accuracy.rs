//! Transcript accuracy: character similarity and word error rate.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::alignment::{align, EditCounts, EditOp};

/// Accuracy of a transcript measured against an original text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyResult {
    /// `1 - levenshtein / max_len` over the normalized texts.
    pub character_similarity: f64,
    /// Character similarity of the whitespace-joined word sequences.
    pub word_similarity: f64,
    /// `1 - word_error_rate`; negative when insertions outnumber the original words.
    pub word_accuracy: f64,
    /// `(S + D + I) / N`, 0 when the original has no words.
    pub word_error_rate: f64,
    pub total_words_original: usize,
    pub total_words_transcribed: usize,
    pub correct_words: usize,
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
}

/// Collapse whitespace runs to one space, trim and lowercase.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// `1 - d / max(len_a, len_b)` with lengths in characters; 1.0 for two empty strings.
pub fn character_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = strsim::levenshtein(a, b);
    1.0 - distance as f64 / max_len as f64
}

/// Word-level edit script between two texts after normalization.
pub fn edit_script(original: &str, transcribed: &str) -> Vec<EditOp> {
    let original = normalize(original);
    let transcribed = normalize(transcribed);

    let original: Vec<&str> = original.split_whitespace().collect();
    let transcribed: Vec<&str> = transcribed.split_whitespace().collect();

    align(&original, &transcribed)
}

/// Compare a transcript against the original text.
pub fn calculate_accuracy(original: &str, transcribed: &str) -> AccuracyResult {
    let original_norm = normalize(original);
    let transcribed_norm = normalize(transcribed);

    let original_words: Vec<&str> = original_norm.split_whitespace().collect();
    let transcribed_words: Vec<&str> = transcribed_norm.split_whitespace().collect();

    let character_similarity = character_similarity(&original_norm, &transcribed_norm);
    let word_similarity =
        character_similarity_of_words(&original_words, &transcribed_words);

    let counts = EditCounts::from_ops(&align(&original_words, &transcribed_words));

    let word_error_rate = if original_words.is_empty() {
        0.0
    } else {
        counts.edits() as f64 / original_words.len() as f64
    };

    debug!(
        "Scored {} original vs {} transcribed words: {} edits",
        original_words.len(),
        transcribed_words.len(),
        counts.edits()
    );

    AccuracyResult {
        character_similarity,
        word_similarity,
        word_accuracy: 1.0 - word_error_rate,
        word_error_rate,
        total_words_original: original_words.len(),
        total_words_transcribed: transcribed_words.len(),
        correct_words: counts.matches,
        substitutions: counts.substitutions,
        deletions: counts.deletions,
        insertions: counts.insertions,
    }
}

fn character_similarity_of_words(a: &[&str], b: &[&str]) -> f64 {
    character_similarity(&a.join(" "), &b.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_both_empty() {
        let result = calculate_accuracy("", "");
        assert_eq!(result.character_similarity, 1.0);
        assert_eq!(result.word_similarity, 1.0);
        assert_eq!(result.word_accuracy, 1.0);
        assert_eq!(result.word_error_rate, 0.0);
        assert_eq!(result.total_words_original, 0);
    }

    #[test]
    fn test_identical() {
        let result = calculate_accuracy("the cat sat", "the cat sat");
        assert_eq!(result.word_accuracy, 1.0);
        assert_eq!(result.correct_words, 3);
        assert_eq!(
            (result.substitutions, result.deletions, result.insertions),
            (0, 0, 0)
        );
    }

    #[test]
    fn test_one_substitution() {
        let result = calculate_accuracy("the cat sat", "the dog sat");
        assert_eq!(result.substitutions, 1);
        assert_eq!((result.deletions, result.insertions), (0, 0));
        assert!(approx(result.word_accuracy, 2.0 / 3.0));
    }

    #[test]
    fn test_one_deletion() {
        let result = calculate_accuracy("the cat sat", "the cat");
        assert_eq!(result.deletions, 1);
        assert!(approx(result.word_error_rate, 1.0 / 3.0));
    }

    #[test]
    fn test_one_insertion() {
        let result = calculate_accuracy("the cat", "the cat sat");
        assert_eq!(result.insertions, 1);
        assert!(approx(result.word_error_rate, 0.5));
        assert_eq!(result.total_words_transcribed, 3);
    }

    #[test]
    fn test_empty_original_has_zero_error_rate() {
        let result = calculate_accuracy("", "extra words");
        assert_eq!(result.insertions, 2);
        assert_eq!(result.word_error_rate, 0.0);
        assert_eq!(result.word_accuracy, 1.0);
        assert_eq!(result.character_similarity, 0.0);
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize("  The\tCAT\n\n sat  "), "the cat sat");
        let result = calculate_accuracy("The  Cat\nSat", "the cat sat");
        assert_eq!(result.character_similarity, 1.0);
        assert_eq!(result.correct_words, 3);
    }

    #[test]
    fn test_character_similarity_counts_chars() {
        // One substituted character out of four, regardless of byte width.
        assert!(approx(character_similarity("café", "cafe"), 0.75));
        assert!(approx(character_similarity("abc", ""), 0.0));
    }

    #[test]
    fn test_insertions_can_push_accuracy_below_zero() {
        let result = calculate_accuracy("a", "x y z");
        assert_eq!(result.word_error_rate, 3.0);
        assert_eq!(result.word_accuracy, -2.0);
    }

    #[test]
    fn test_edit_script_normalizes() {
        let ops = edit_script("The Cat", "the hat");
        assert_eq!(
            ops,
            vec![
                EditOp::Match { word: "the".to_string() },
                EditOp::Substitute {
                    original: "cat".to_string(),
                    transcribed: "hat".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(calculate_accuracy("a", "a")).unwrap();
        for key in [
            "character_similarity",
            "word_similarity",
            "word_accuracy",
            "word_error_rate",
            "total_words_original",
            "total_words_transcribed",
            "correct_words",
            "substitutions",
            "deletions",
            "insertions",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
