//! Readability formulas
//!
//! Closed-form scores over a [`TextAnalysis`]. All three require
//! `word_count > 0`; the orchestrator guarantees that by never evaluating a
//! formula against a failed analysis.

use crate::analyzer::TextAnalysis;

/// Flesch Reading Ease: higher scores read more easily.
///
/// Precondition: `analysis.word_count > 0`.
pub fn flesch_reading_ease(analysis: &TextAnalysis) -> f64 {
    debug_assert!(analysis.word_count > 0);
    206.835
        - 1.015 * analysis.average_words_per_sentence
        - 84.6 * (analysis.syllable_count as f64 / analysis.word_count as f64)
}

/// Flesch-Kincaid Grade Level: US school grade required to understand.
///
/// Precondition: `analysis.word_count > 0`.
pub fn flesch_kincaid_grade(analysis: &TextAnalysis) -> f64 {
    debug_assert!(analysis.word_count > 0);
    0.39 * analysis.average_words_per_sentence
        + 11.8 * (analysis.syllable_count as f64 / analysis.word_count as f64)
        - 15.59
}

/// Gunning Fog Index: years of formal education required on first reading.
///
/// Precondition: `analysis.word_count > 0`.
pub fn gunning_fog_index(analysis: &TextAnalysis) -> f64 {
    debug_assert!(analysis.word_count > 0);
    0.4 * (analysis.average_words_per_sentence
        + 100.0 * (analysis.complex_word_count as f64 / analysis.word_count as f64))
}
