//! # Line Wrapper
//!
//! Greedy line-breaking over measured tokens under a container width.
//!
//! Words accumulate into the current line; a word that would fill or
//! exceed the width flushes the line first, provided the line already
//! has visible content — a word wider than the container occupies its
//! own line, with no intra-word splitting. Whitespace never forces a
//! break: it stays on the line it follows and is trimmed from the
//! recorded width, which is what lets a line's own token list re-wrap
//! to itself at exactly its recorded width. Hard-break tokens flush
//! unconditionally and stay in the token stream, so no token is ever
//! lost across line breaks.

use super::{StyledWord, WrappedLine};

/// Wrap measured tokens into lines at most `max_width` wide.
pub fn wrap_words(words: &[StyledWord], max_width: f64) -> Vec<WrappedLine> {
    let mut lines: Vec<WrappedLine> = Vec::new();
    let mut current: Vec<StyledWord> = Vec::new();
    // Width of the current line including interior whitespace but not
    // leading whitespace (trimmed on a freshly opened line).
    let mut current_width = 0.0;

    let mut flush = |current: &mut Vec<StyledWord>, current_width: &mut f64| {
        lines.push(make_line(std::mem::take(current)));
        *current_width = 0.0;
    };

    for word in words {
        if word.is_hard_break {
            current.push(word.clone());
            flush(&mut current, &mut current_width);
            continue;
        }

        if word.is_whitespace {
            // Whitespace rides along on the current line. Before the
            // first visible token it is leading and counts nothing;
            // after it, it counts toward the greedy fit but is trimmed
            // from the recorded width when the line closes.
            if has_visible(&current) {
                current_width += word.width;
            }
            current.push(word.clone());
            continue;
        }

        // A line with no visible content yet always accepts the next
        // word, so an oversized word occupies its own line instead of
        // leaving a blank one behind.
        if has_visible(&current) && current_width + word.width >= max_width {
            flush(&mut current, &mut current_width);
        }
        current.push(word.clone());
        current_width += word.width;
    }

    if !current.is_empty() {
        flush(&mut current, &mut current_width);
    }

    lines
}

fn has_visible(words: &[StyledWord]) -> bool {
    words.iter().any(|w| !w.is_whitespace && !w.is_hard_break)
}

/// Close a line: width excludes leading and trailing whitespace, height
/// is the maximum token height.
fn make_line(words: Vec<StyledWord>) -> WrappedLine {
    let first_visible = words
        .iter()
        .position(|w| !w.is_whitespace && !w.is_hard_break);
    let last_visible = words
        .iter()
        .rposition(|w| !w.is_whitespace && !w.is_hard_break);

    let width = match (first_visible, last_visible) {
        (Some(a), Some(b)) => words[a..=b].iter().map(|w| w.width).sum(),
        _ => 0.0,
    };
    let height = words.iter().map(|w| w.height).fold(0.0, f64::max);

    WrappedLine {
        words,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::markdown::tokenize;

    /// Tokenize and stamp fixed-advance widths: 6pt per char, height 10.
    fn measured(text: &str) -> Vec<StyledWord> {
        let mut words = tokenize(text);
        for w in &mut words {
            w.height = 10.0;
            w.width = if w.is_hard_break {
                0.0
            } else {
                w.text.chars().count() as f64 * 6.0
            };
        }
        words
    }

    fn line_texts(line: &WrappedLine) -> String {
        line.words.iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn test_single_line_fits() {
        let lines = wrap_words(&measured("ab cd"), 100.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, 30.0);
        assert_eq!(lines[0].height, 10.0);
    }

    #[test]
    fn test_wrap_at_exact_fill() {
        // "ab cd" is exactly 30pt; filling the width flushes the line.
        let lines = wrap_words(&measured("ab cd ef"), 30.0);
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.width, 12.0);
        }
    }

    #[test]
    fn test_no_token_lost_across_breaks() {
        let words = measured("ab cd ef");
        let lines = wrap_words(&words, 30.0);
        let rejoined: Vec<StyledWord> = lines.into_iter().flat_map(|l| l.words).collect();
        assert_eq!(rejoined, words);
    }

    #[test]
    fn test_hard_break_flushes() {
        let lines = wrap_words(&measured("ab\ncd"), 1000.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_texts(&lines[0]), "ab\n");
        assert_eq!(line_texts(&lines[1]), "cd");
        assert_eq!(lines[0].width, 12.0);
    }

    #[test]
    fn test_consecutive_hard_breaks_keep_blank_line() {
        let lines = wrap_words(&measured("a\n\nb"), 1000.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].width, 0.0);
        assert_eq!(lines[1].height, 10.0);
    }

    #[test]
    fn test_oversized_token_gets_own_line() {
        let lines = wrap_words(&measured("abcdefghij xy"), 30.0);
        assert_eq!(lines.len(), 2);
        // The trailing space stays on the oversized line and is trimmed
        // from its width.
        assert_eq!(line_texts(&lines[0]), "abcdefghij ");
        assert_eq!(lines[0].width, 60.0);
        assert_eq!(line_texts(&lines[1]), "xy");
        assert_eq!(lines[1].width, 12.0);
    }

    #[test]
    fn test_trailing_whitespace_excluded_from_width() {
        let lines = wrap_words(&measured("ab cd ef"), 30.0);
        // First line carries "ab" plus the trailing space token.
        assert_eq!(line_texts(&lines[0]), "ab ");
        assert_eq!(lines[0].width, 12.0);
    }

    #[test]
    fn test_wrap_idempotence_at_exact_line_width() {
        // A wrapped line carrying trailing whitespace must survive a
        // re-wrap at precisely its own recorded width, not just above it.
        let lines = wrap_words(&measured("ab cd ef"), 30.0);
        assert_eq!(lines.len(), 3);
        let second = &lines[1];
        assert_eq!(line_texts(second), "cd ");
        let again = wrap_words(&second.words, second.width);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0], *second);
    }

    #[test]
    fn test_wrap_idempotence_above_line_width() {
        let words = measured("ab cd");
        let lines = wrap_words(&words, 100.0);
        assert_eq!(lines.len(), 1);
        let again = wrap_words(&lines[0].words, lines[0].width + 1.0);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0], lines[0]);
    }

    #[test]
    fn test_empty_input_yields_no_lines() {
        assert!(wrap_words(&[], 100.0).is_empty());
    }
}
