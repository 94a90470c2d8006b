use regex::Regex;
use std::sync::LazyLock;
use tcompare_common::ComparisonOptions;

// Unicode whitespace runs, newlines included
pub(crate) static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Apply the case and whitespace transforms selected in `options`.
///
/// Case folding runs first and maps each character to a single lower-case
/// character, so the result is never longer than the input. Whitespace
/// collapsing then replaces every run (newlines included) with one space and
/// trims both ends.
pub fn normalize_text(text: &str, options: &ComparisonOptions) -> String {
    let mut normalized = if options.ignore_case {
        fold_case(text)
    } else {
        text.to_string()
    };

    if options.ignore_whitespace {
        normalized = WHITESPACE_RUN
            .replace_all(&normalized, " ")
            .trim()
            .to_string();
    }

    normalized
}

fn fold_case(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}
