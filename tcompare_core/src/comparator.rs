use crate::normalize::{normalize_text, WHITESPACE_RUN};
use crate::stats::calculate_stats;
use std::collections::HashSet;
use tcompare_common::{CompareMode, ComparisonOptions, ComparisonResult};
use tracing::debug;

/// Compare two texts according to `options`.
///
/// Both sides are normalized identically, then handed to the routine for the
/// selected mode. Highlight offsets and stats refer to the normalized texts.
pub fn compare_texts(
    left_text: &str,
    right_text: &str,
    options: &ComparisonOptions,
) -> ComparisonResult {
    let left = normalize_text(left_text, options);
    let right = normalize_text(right_text, options);

    debug!(
        mode = %options.compare_mode,
        ignore_case = options.ignore_case,
        ignore_whitespace = options.ignore_whitespace,
        left_len = left.len(),
        right_len = right.len(),
        "comparing texts"
    );

    match options.compare_mode {
        CompareMode::Character => compare_characters(&left, &right),
        CompareMode::Word => compare_words(&left, &right),
        CompareMode::Line => compare_lines(&left, &right),
    }
}

/// Index-aligned comparison. Offsets past the shorter text are highlighted on
/// the longer side; nothing is realigned after an insertion.
pub fn compare_characters(left: &str, right: &str) -> ComparisonResult {
    let left_chars: Vec<char> = left.chars().collect();
    let right_chars: Vec<char> = right.chars().collect();

    let min_len = left_chars.len().min(right_chars.len());
    let max_len = left_chars.len().max(right_chars.len());

    let mut left_highlights = Vec::new();
    let mut right_highlights = Vec::new();

    for (i, (l, r)) in left_chars.iter().zip(&right_chars).enumerate() {
        if l != r {
            left_highlights.push(i);
            right_highlights.push(i);
        }
    }

    left_highlights.extend(min_len..left_chars.len());
    right_highlights.extend(min_len..right_chars.len());

    let differing = left_highlights.len().max(right_highlights.len());
    let diff_percentage = percentage(differing, max_len);

    ComparisonResult {
        left_highlights,
        right_highlights,
        left_stats: calculate_stats(left),
        right_stats: calculate_stats(right),
        diff_percentage,
    }
}

/// Set-based word comparison. A token counts as shared when it occurs
/// anywhere on the other side; whitespace runs are tokens too.
pub fn compare_words(left: &str, right: &str) -> ComparisonResult {
    let left_tokens = split_keep_whitespace(left);
    let right_tokens = split_keep_whitespace(right);
    let diff = TokenSetDiff::new(&left_tokens, &right_tokens, 0);

    let left_stats = calculate_stats(left);
    let right_stats = calculate_stats(right);
    let total = left_stats.words.max(right_stats.words);

    ComparisonResult {
        diff_percentage: percentage(diff.distinct_differences, total),
        left_highlights: diff.left_highlights,
        right_highlights: diff.right_highlights,
        left_stats,
        right_stats,
    }
}

/// Set-based line comparison. Every line advances the offset by its length
/// plus one for the newline, the last line included.
pub fn compare_lines(left: &str, right: &str) -> ComparisonResult {
    let left_lines: Vec<&str> = left.split('\n').collect();
    let right_lines: Vec<&str> = right.split('\n').collect();
    let diff = TokenSetDiff::new(&left_lines, &right_lines, 1);

    let left_stats = calculate_stats(left);
    let right_stats = calculate_stats(right);
    let total = left_stats.lines.max(right_stats.lines);

    ComparisonResult {
        diff_percentage: percentage(diff.distinct_differences, total),
        left_highlights: diff.left_highlights,
        right_highlights: diff.right_highlights,
        left_stats,
        right_stats,
    }
}

/// Split on whitespace runs while keeping each run as its own token.
///
/// The result always starts and ends with a (possibly empty) non-whitespace
/// token, so concatenating the tokens yields `text` again.
fn split_keep_whitespace(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for run in WHITESPACE_RUN.find_iter(text) {
        tokens.push(&text[last..run.start()]);
        tokens.push(run.as_str());
        last = run.end();
    }
    tokens.push(&text[last..]);

    tokens
}

struct TokenSetDiff {
    left_highlights: Vec<usize>,
    right_highlights: Vec<usize>,
    /// Distinct left-only tokens plus distinct right-only tokens
    distinct_differences: usize,
}

impl TokenSetDiff {
    fn new(left: &[&str], right: &[&str], separator_width: usize) -> Self {
        let left_set: HashSet<&str> = left.iter().copied().collect();
        let right_set: HashSet<&str> = right.iter().copied().collect();

        let left_only: HashSet<&str> = left_set.difference(&right_set).copied().collect();
        let right_only: HashSet<&str> = right_set.difference(&left_set).copied().collect();

        Self {
            left_highlights: mark_tokens(left, &left_only, separator_width),
            right_highlights: mark_tokens(right, &right_only, separator_width),
            distinct_differences: left_only.len() + right_only.len(),
        }
    }
}

fn mark_tokens(tokens: &[&str], exclusive: &HashSet<&str>, separator_width: usize) -> Vec<usize> {
    let mut highlights = Vec::new();
    let mut offset = 0;

    for token in tokens {
        let len = token.chars().count();
        if exclusive.contains(token) {
            highlights.extend(offset..offset + len);
        }
        offset += len + separator_width;
    }

    highlights
}

/// Share of `differing` over `total` as a percentage. The set-based modes
/// count distinct tokens from both sides, so the value can exceed 100.
fn percentage(differing: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    differing as f64 / total as f64 * 100.0
}

/// Comparison engine holding the options for repeated comparisons
#[derive(Debug, Clone, Default)]
pub struct TextComparator {
    options: ComparisonOptions,
}

impl TextComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ComparisonOptions) -> Self {
        Self { options }
    }

    pub fn set_options(&mut self, options: ComparisonOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &ComparisonOptions {
        &self.options
    }

    pub fn compare(&self, left: &str, right: &str) -> ComparisonResult {
        compare_texts(left, right, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcompare_common::TextStats;

    const MODES: [CompareMode; 3] = [CompareMode::Character, CompareMode::Word, CompareMode::Line];

    fn all_options() -> Vec<ComparisonOptions> {
        let mut options = Vec::new();
        for mode in MODES {
            for ignore_case in [false, true] {
                for ignore_whitespace in [false, true] {
                    options.push(
                        ComparisonOptions::new(mode)
                            .with_ignore_case(ignore_case)
                            .with_ignore_whitespace(ignore_whitespace),
                    );
                }
            }
        }
        options
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_identical_texts_have_no_differences() {
        let samples = ["", "abc", "The quick brown fox\njumps over\n\nthe dog ", "  x  "];
        for options in all_options() {
            for sample in samples {
                let result = compare_texts(sample, sample, &options);
                assert!(result.is_identical(), "{sample:?} with {options:?}");
                assert_eq!(result.diff_percentage, 0.0);
            }
        }
    }

    #[test]
    fn test_empty_inputs() {
        for options in all_options() {
            let result = compare_texts("", "", &options);
            assert_eq!(result.diff_percentage, 0.0);
            assert_eq!(
                result.left_stats,
                TextStats {
                    characters: 0,
                    words: 0,
                    lines: 1
                }
            );
        }
    }

    #[test]
    fn test_one_side_empty_is_total() {
        for options in all_options() {
            let result = compare_texts("", "some text", &options);
            assert!(result.left_highlights.is_empty());
            assert!(!result.right_highlights.is_empty());
            assert!(result.diff_percentage > 0.0);
        }
    }

    #[test]
    fn test_character_substitution() {
        let result = compare_texts("cat", "bat", &ComparisonOptions::new(CompareMode::Character));
        assert_eq!(result.left_highlights, vec![0]);
        assert_eq!(result.right_highlights, vec![0]);
        assert_close(result.diff_percentage, 100.0 / 3.0);
    }

    #[test]
    fn test_character_length_mismatch() {
        let result = compare_texts("abc", "ab", &ComparisonOptions::new(CompareMode::Character));
        assert_eq!(result.left_highlights, vec![2]);
        assert!(result.right_highlights.is_empty());
        assert_close(result.diff_percentage, 100.0 / 3.0);
    }

    #[test]
    fn test_character_insertion_cascades() {
        let result = compare_characters("xabc", "abc");
        assert_eq!(result.left_highlights, vec![0, 1, 2, 3]);
        assert_eq!(result.right_highlights, vec![0, 1, 2]);
        assert_close(result.diff_percentage, 100.0);
    }

    #[test]
    fn test_character_symmetry() {
        let pairs = [("kitten", "sitting"), ("", "abc"), ("hello world", "help")];
        for (a, b) in pairs {
            let forward = compare_characters(a, b);
            let backward = compare_characters(b, a);
            assert_eq!(forward.left_highlights.len(), backward.right_highlights.len());
            assert_eq!(forward.right_highlights.len(), backward.left_highlights.len());
            assert_eq!(forward.diff_percentage, backward.diff_percentage);
        }
    }

    #[test]
    fn test_character_offsets_count_scalars() {
        let result = compare_characters("héllo", "hállo");
        assert_eq!(result.left_highlights, vec![1]);
        assert_eq!(result.left_stats.characters, 5);
    }

    #[test]
    fn test_word_mode() {
        let result = compare_texts(
            "the cat sat",
            "the dog sat",
            &ComparisonOptions::new(CompareMode::Word),
        );
        assert_eq!(result.left_highlights, vec![4, 5, 6]);
        assert_eq!(result.right_highlights, vec![4, 5, 6]);
        assert_close(result.diff_percentage, 200.0 / 3.0);
    }

    #[test]
    fn test_word_mode_ignores_position() {
        let result = compare_words("a b c", "c b a");
        assert!(result.is_identical());
        assert_eq!(result.diff_percentage, 0.0);
    }

    #[test]
    fn test_word_mode_repeated_token_counted_once() {
        let result = compare_words("x x x y", "y z z z");
        assert_eq!(result.left_highlights, vec![0, 2, 4]);
        assert_eq!(result.right_highlights, vec![2, 4, 6]);
        // one distinct token per side over four words
        assert_close(result.diff_percentage, 50.0);
    }

    #[test]
    fn test_word_mode_whitespace_runs_are_tokens() {
        let result = compare_words("a  b", "a b");
        assert_eq!(result.left_highlights, vec![1, 2]);
        assert_eq!(result.right_highlights, vec![1]);
    }

    #[test]
    fn test_set_modes_count_both_sides() {
        assert_close(compare_words("a", "b").diff_percentage, 200.0);
        assert_close(compare_words("a b", "c d").diff_percentage, 200.0);
        assert_close(compare_lines("x", "y").diff_percentage, 200.0);
        // empty edge token and the leading space are both left-only
        assert_close(compare_words(" a", "a").diff_percentage, 200.0);
    }

    #[test]
    fn test_ignore_whitespace_collapses_lines() {
        let options = ComparisonOptions::new(CompareMode::Line).with_ignore_whitespace(true);
        let result = compare_texts("one
two
three", "one  two

three
", &options);
        assert!(result.is_identical());
        assert_eq!(result.left_stats.lines, 1);
        assert_eq!(result.right_stats.lines, 1);
        assert_eq!(result.diff_percentage, 0.0);

        let result = compare_texts("one
two", "one
four", &options);
        assert_eq!(result.left_highlights, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(result.right_highlights, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(result.left_stats.lines, 1);
        assert_close(result.diff_percentage, 200.0);

        let word = ComparisonOptions::new(CompareMode::Word).with_ignore_whitespace(true);
        let result = compare_texts("a

b	c", "a b  c", &word);
        assert!(result.is_identical());
        assert_eq!(result.left_stats.lines, 1);
        assert_eq!(result.left_stats.words, 3);
    }

    #[test]
    fn test_split_keep_whitespace() {
        assert_eq!(split_keep_whitespace(""), vec![""]);
        assert_eq!(split_keep_whitespace("a b"), vec!["a", " ", "b"]);
        assert_eq!(split_keep_whitespace(" a\t\tb "), vec!["", " ", "a", "\t\t", "b", " ", ""]);
        let text = "one  two\nthree ";
        assert_eq!(split_keep_whitespace(text).concat(), text);
    }

    #[test]
    fn test_line_mode() {
        let result = compare_texts(
            "alpha\nbeta\ngamma",
            "alpha\nBETA\ngamma",
            &ComparisonOptions::new(CompareMode::Line),
        );
        assert_eq!(result.left_highlights, vec![6, 7, 8, 9]);
        assert_eq!(result.right_highlights, vec![6, 7, 8, 9]);
        assert_close(result.diff_percentage, 200.0 / 3.0);
    }

    #[test]
    fn test_line_mode_ignore_case() {
        let options = ComparisonOptions::new(CompareMode::Line).with_ignore_case(true);
        let result = compare_texts("alpha\nbeta", "ALPHA\nBeta", &options);
        assert!(result.is_identical());
    }

    #[test]
    fn test_line_mode_last_line_offsets() {
        let result = compare_lines("same\nleft", "same\nright");
        assert_eq!(result.left_highlights, vec![5, 6, 7, 8]);
        assert_eq!(result.right_highlights, vec![5, 6, 7, 8, 9]);
        assert_eq!(result.left_stats.lines, 2);
    }

    #[test]
    fn test_highlights_stay_in_bounds() {
        let pairs = [
            ("a\nb\nc", "c\nd"),
            (" lead trail ", "lead"),
            ("ÄÖÜ x", "äöü y"),
            ("", "\n\n"),
        ];
        for options in all_options() {
            for (left, right) in pairs {
                let result = compare_texts(left, right, &options);
                let left_len = left.chars().count();
                let right_len = right.chars().count();
                assert!(result.left_highlights.iter().all(|&i| i < left_len));
                assert!(result.right_highlights.iter().all(|&i| i < right_len));
                assert!(result.left_highlights.windows(2).all(|w| w[0] < w[1]));
                assert!(result.right_highlights.windows(2).all(|w| w[0] < w[1]));
                assert!(result.diff_percentage >= 0.0);
            }
        }
    }

    #[test]
    fn test_ignore_case_character() {
        let options = ComparisonOptions::new(CompareMode::Character).with_ignore_case(true);
        let result = compare_texts("ABC", "abc", &options);
        assert!(result.is_identical());
        assert_eq!(result.diff_percentage, 0.0);
    }

    #[test]
    fn test_ignore_whitespace_character() {
        let options = ComparisonOptions::new(CompareMode::Character).with_ignore_whitespace(true);
        let result = compare_texts("a  b", "a b", &options);
        assert!(result.is_identical());
        assert_eq!(result.diff_percentage, 0.0);
    }

    #[test]
    fn test_stats_reflect_normalized_text() {
        let options = ComparisonOptions::new(CompareMode::Character).with_ignore_whitespace(true);
        let result = compare_texts("a   b\n", "a b", &options);
        assert_eq!(result.left_stats.characters, 3);
        assert_eq!(result.left_stats.lines, 1);
    }

    #[test]
    fn test_comparator_engine() {
        let mut comparator = TextComparator::new();
        assert_eq!(comparator.options().compare_mode, CompareMode::Character);
        assert!(!comparator.compare("Hello", "hello").is_identical());

        comparator.set_options(ComparisonOptions::default().with_ignore_case(true));
        assert!(comparator.compare("Hello", "hello").is_identical());

        let word = TextComparator::with_options(ComparisonOptions::new(CompareMode::Word));
        assert!(word.compare("b a", "a b").is_identical());
    }
}
