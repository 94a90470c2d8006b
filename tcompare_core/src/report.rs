use serde::Serialize;
use std::fmt::Write;
use tcompare_common::{ComparisonResult, TextStats};

/// A contiguous run of highlighted character offsets, `end` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Collapse ascending highlight offsets into contiguous spans.
pub fn highlight_spans(highlights: &[usize]) -> Vec<HighlightSpan> {
    let mut spans: Vec<HighlightSpan> = Vec::new();

    for &index in highlights {
        match spans.last_mut() {
            Some(span) if span.end == index => span.end += 1,
            _ => spans.push(HighlightSpan {
                start: index,
                end: index + 1,
            }),
        }
    }

    spans
}

/// Split `text` into `(segment, highlighted)` pieces following the highlight
/// offsets. Offsets past the end of `text` are ignored.
pub fn highlight_segments(text: &str, highlights: &[usize]) -> Vec<(String, bool)> {
    let mut segments: Vec<(String, bool)> = Vec::new();
    let mut pending = highlights.iter().peekable();

    for (index, ch) in text.chars().enumerate() {
        while pending.next_if(|&&h| h < index).is_some() {}
        let highlighted = pending.next_if_eq(&&index).is_some();

        match segments.last_mut() {
            Some((segment, flag)) if *flag == highlighted => segment.push(ch),
            _ => segments.push((ch.to_string(), highlighted)),
        }
    }

    segments
}

/// Difference percentage with one decimal place, e.g. `33.3%`
pub fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}

/// Render the downloadable markdown summary of a comparison.
pub fn render_markdown_report(
    left_text: &str,
    right_text: &str,
    result: &ComparisonResult,
) -> String {
    let mut out = String::new();

    out.push_str("# Text Comparison Result\n\n");
    let _ = writeln!(
        out,
        "## Difference: {}\n",
        format_percentage(result.diff_percentage)
    );

    write_stats(&mut out, "Left Text", &result.left_stats);
    write_stats(&mut out, "Right Text", &result.right_stats);

    write_content(&mut out, "Left Content", left_text);
    out.push('\n');
    write_content(&mut out, "Right Content", right_text);

    out
}

fn write_stats(out: &mut String, title: &str, stats: &TextStats) {
    let _ = writeln!(out, "## {title}");
    let _ = writeln!(out, "- Characters: {}", stats.characters);
    let _ = writeln!(out, "- Words: {}", stats.words);
    let _ = writeln!(out, "- Lines: {}", stats.lines);
    out.push('\n');
}

fn write_content(out: &mut String, title: &str, text: &str) {
    let _ = writeln!(out, "## {title}");
    out.push_str("```\n");
    out.push_str(text);
    out.push_str("\n```\n");
}
