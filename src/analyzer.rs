//! Text analysis module
//!
//! Tokenizes raw text into sentences, words and syllables and produces the
//! aggregate counts that the readability formulas consume. The sentence
//! boundary rules are pluggable through [`SentenceSegmenter`] so that a host
//! application can supply its own trained model; the default implementation
//! uses the precompiled UAX #29 rules shipped with `unicode-segmentation`.

use unicode_segmentation::UnicodeSegmentation;

/// Minimum heuristic syllable count for a word to be considered complex.
///
/// The Gunning Fog formula counts "complex" words. The literal rule used
/// here is three or more heuristic syllables with no suffix exclusions.
const COMPLEX_SYLLABLE_THRESHOLD: u32 = 3;

/// Sentence boundary detection seam.
///
/// Implementations return the sentences of `text` in order. An implementation
/// is loaded once and shared across every analysis in a batch.
pub trait SentenceSegmenter: Send + Sync {
    /// Split `text` into sentences in reading order.
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Default segmenter backed by the UAX #29 sentence boundary rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSegmenter;

impl SentenceSegmenter for UnicodeSegmenter {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.unicode_sentences().collect()
    }
}

/// Aggregate counts derived from one pass over a text blob.
///
/// `word_count == 0` marks a failed analysis; callers must not evaluate any
/// readability formula against it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextAnalysis {
    pub word_count: u64,
    pub sentence_count: u64,
    pub syllable_count: u64,
    pub complex_word_count: u64,
    pub average_words_per_sentence: f64,
}

impl TextAnalysis {
    /// Whether the analysis produced anything the formulas can use.
    pub fn has_words(&self) -> bool {
        self.word_count > 0
    }
}

/// Analyzer over a sentence segmenter.
pub struct TextAnalyzer<'a> {
    segmenter: &'a dyn SentenceSegmenter,
}

impl<'a> TextAnalyzer<'a> {
    /// Create an analyzer using the given sentence boundary model.
    pub fn new(segmenter: &'a dyn SentenceSegmenter) -> Self {
        Self { segmenter }
    }

    /// Analyze a block of plain text into aggregate linguistic counts.
    ///
    /// A body with words but no detected sentence boundary counts as one
    /// sentence, so `sentence_count >= 1` whenever `word_count > 0`.
    pub fn analyze(&self, text: &str) -> TextAnalysis {
        let text = text.trim();
        if text.is_empty() {
            return TextAnalysis::default();
        }

        let mut sentences = self.segmenter.sentences(text);
        if sentences.is_empty() {
            sentences.push(text);
        }

        let mut word_count = 0u64;
        let mut sentence_count = 0u64;
        let mut syllable_count = 0u64;
        let mut complex_word_count = 0u64;

        for sentence in &sentences {
            let mut words_in_sentence = 0u64;
            for word in sentence.unicode_words() {
                words_in_sentence += 1;
                let syllables = count_syllables(word);
                syllable_count += u64::from(syllables);
                if syllables >= COMPLEX_SYLLABLE_THRESHOLD {
                    complex_word_count += 1;
                }
            }
            if words_in_sentence > 0 {
                sentence_count += 1;
                word_count += words_in_sentence;
            }
        }

        if word_count == 0 {
            return TextAnalysis::default();
        }

        // Sentences containing no words were not counted above, so the
        // divisor is at least one here.
        let average_words_per_sentence = word_count as f64 / sentence_count as f64;

        TextAnalysis {
            word_count,
            sentence_count,
            syllable_count,
            complex_word_count,
            average_words_per_sentence,
        }
    }
}

/// Count syllables in a single word using a rule-based heuristic.
///
/// Vowel groups (`aeiouy`) count as one syllable each, a silent trailing `e`
/// is discounted when the word has more than one group, and every word has
/// at least one syllable.
pub fn count_syllables(word: &str) -> u32 {
    let word = word.to_lowercase();
    let mut groups = 0u32;
    let mut in_group = false;

    for c in word.chars() {
        if is_vowel(c) {
            if !in_group {
                groups += 1;
                in_group = true;
            }
        } else {
            in_group = false;
        }
    }

    if groups > 1 && word.ends_with('e') && !word.ends_with("le") {
        groups -= 1;
    }

    groups.max(1)
}

#[inline]
fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> TextAnalysis {
        TextAnalyzer::new(&UnicodeSegmenter).analyze(text)
    }

    #[test]
    fn test_two_sentence_sample() {
        let analysis = analyze("Cats run. Dogs run fast.");

        assert_eq!(analysis.sentence_count, 2);
        assert_eq!(analysis.word_count, 5);
        assert!((analysis.average_words_per_sentence - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_text_has_no_words() {
        let analysis = analyze("");
        assert_eq!(analysis.word_count, 0);
        assert!(!analysis.has_words());
    }

    #[test]
    fn test_whitespace_only_has_no_words() {
        let analysis = analyze("   \n\t  ");
        assert_eq!(analysis.word_count, 0);
    }

    #[test]
    fn test_punctuation_only_has_no_words() {
        let analysis = analyze("... !!! ???");
        assert_eq!(analysis.word_count, 0);
    }

    #[test]
    fn test_no_boundary_is_one_sentence() {
        let analysis = analyze("one two three");
        assert_eq!(analysis.sentence_count, 1);
        assert_eq!(analysis.word_count, 3);
        assert!((analysis.average_words_per_sentence - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_syllable_heuristic_single_group() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("run"), 1);
        assert_eq!(count_syllables("strength"), 1);
    }

    #[test]
    fn test_syllable_heuristic_consecutive_vowels() {
        // "ea" and "ou" collapse to one group each
        assert_eq!(count_syllables("read"), 1);
        assert_eq!(count_syllables("sound"), 1);
        assert_eq!(count_syllables("beautiful"), 3);
    }

    #[test]
    fn test_syllable_heuristic_silent_e() {
        assert_eq!(count_syllables("code"), 1);
        assert_eq!(count_syllables("home"), 1);
        // A bare "e" group still counts as one
        assert_eq!(count_syllables("the"), 1);
        // "-le" endings keep their final group
        assert_eq!(count_syllables("table"), 2);
    }

    #[test]
    fn test_syllable_heuristic_minimum_one() {
        assert_eq!(count_syllables("hmm"), 1);
        assert_eq!(count_syllables("123"), 1);
    }

    #[test]
    fn test_complex_word_counting() {
        // "beautiful" (3) and "delivering" (4) are complex, the rest are not
        let analysis = analyze("A beautiful bird was delivering a letter.");
        assert_eq!(analysis.complex_word_count, 2);
    }

    #[test]
    fn test_scenario_syllable_total() {
        let analysis = analyze("Cats run. Dogs run fast.");
        assert_eq!(analysis.syllable_count, 5);
    }

    #[test]
    fn test_analysis_determinism() {
        let text = "The quick brown fox jumps over the lazy dog. It was quick.";
        assert_eq!(analyze(text), analyze(text));
    }

    #[test]
    fn test_custom_segmenter() {
        struct NewlineSegmenter;
        impl SentenceSegmenter for NewlineSegmenter {
            fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
                text.lines().collect()
            }
        }

        let analyzer = TextAnalyzer::new(&NewlineSegmenter);
        let analysis = analyzer.analyze("one two\nthree four\nfive");
        assert_eq!(analysis.sentence_count, 3);
        assert_eq!(analysis.word_count, 5);
    }
}
