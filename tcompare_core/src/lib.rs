pub mod comparator;
pub mod loader;
pub mod normalize;
pub mod report;
pub mod stats;

pub use comparator::{
    compare_characters, compare_lines, compare_texts, compare_words, TextComparator,
};
pub use loader::TextLoader;
pub use normalize::normalize_text;
pub use report::{
    format_percentage, highlight_segments, highlight_spans, render_markdown_report, HighlightSpan,
};
pub use stats::calculate_stats;
