use tcompare_common::TextStats;

/// Count characters, words and lines of `text`.
///
/// Characters are Unicode scalar values. Lines are the segments produced by
/// splitting on `\n`, so the empty string still has one line. Words are the
/// maximal runs of non-whitespace.
pub fn calculate_stats(text: &str) -> TextStats {
    TextStats {
        characters: text.chars().count(),
        words: text.split_whitespace().count(),
        lines: text.split('\n').count(),
    }
}
