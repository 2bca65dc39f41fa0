//! # Markdown Tokenizer
//!
//! Converts a UTF-8 string with `**bold**` and `*italic*` markers into an
//! ordered sequence of styled word tokens. Whitespace runs and explicit
//! line breaks survive as tokens of their own, so the wrapper downstream
//! can break at exactly those points and the measurer can price
//! whitespace in the current font.
//!
//! Marker rules: two consecutive `*` toggle bold, a single `*` toggles
//! italic. Markers are always stripped from the emitted text; a toggle
//! that is never closed simply styles the remainder of the string.
//! Hosts converting raw bytes replace invalid UTF-8 with U+FFFD before
//! calling in (`&str` input guarantees validity here).

use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

use super::emoji::is_emoji_cluster;
use super::StyledWord;

/// Tokenize markdown-lite text into styled words.
pub fn tokenize(text: &str) -> Vec<StyledWord> {
    let mut words = Vec::new();
    let mut bold = false;
    let mut italic = false;

    // Mandatory break opportunities split the text into hard-break
    // segments; each interior segment ends with its break character(s).
    let mut start = 0;
    let mut segments: Vec<&str> = Vec::new();
    for (offset, opportunity) in linebreaks(text) {
        if opportunity == BreakOpportunity::Mandatory && offset < text.len() {
            segments.push(&text[start..offset]);
            start = offset;
        }
    }
    segments.push(&text[start..]);

    for segment in segments {
        let (content, has_break) = split_trailing_newline(segment);
        tokenize_segment(content, &mut bold, &mut italic, &mut words);
        if has_break {
            let mut hard_break = StyledWord::new("\n".to_string(), bold, italic);
            hard_break.is_hard_break = true;
            words.push(hard_break);
        }
    }

    words
}

/// Strip one trailing line terminator (treating `\r\n` as a unit) and
/// report whether one was present.
fn split_trailing_newline(segment: &str) -> (&str, bool) {
    if let Some(stripped) = segment.strip_suffix("\r\n") {
        return (stripped, true);
    }
    let mut chars = segment.char_indices().rev();
    if let Some((idx, c)) = chars.next() {
        if matches!(c, '\n' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}') {
            return (&segment[..idx], true);
        }
    }
    (segment, false)
}

fn tokenize_segment(content: &str, bold: &mut bool, italic: &mut bool, out: &mut Vec<StyledWord>) {
    let clusters: Vec<&str> = content.graphemes(true).collect();
    let mut word = String::new();
    let mut i = 0;

    let flush_word = |word: &mut String, bold: bool, italic: bool, out: &mut Vec<StyledWord>| {
        if !word.is_empty() {
            out.push(StyledWord::new(std::mem::take(word), bold, italic));
        }
    };

    while i < clusters.len() {
        let cluster = clusters[i];

        if cluster == "*" {
            // A marker run terminates the current token; pairs toggle
            // bold, a leftover single star toggles italic.
            flush_word(&mut word, *bold, *italic, out);
            let mut run = 0;
            while i < clusters.len() && clusters[i] == "*" {
                run += 1;
                i += 1;
            }
            while run >= 2 {
                *bold = !*bold;
                run -= 2;
            }
            if run == 1 {
                *italic = !*italic;
            }
            continue;
        }

        if cluster.chars().all(char::is_whitespace) {
            flush_word(&mut word, *bold, *italic, out);
            let mut run = String::new();
            while i < clusters.len() && clusters[i].chars().all(char::is_whitespace) {
                run.push_str(clusters[i]);
                i += 1;
            }
            let mut ws = StyledWord::new(run, *bold, *italic);
            ws.is_whitespace = true;
            out.push(ws);
            continue;
        }

        if is_emoji_cluster(cluster) {
            flush_word(&mut word, *bold, *italic, out);
            let mut token = StyledWord::new(cluster.to_string(), *bold, *italic);
            token.is_emoji = true;
            out.push(token);
            i += 1;
            continue;
        }

        word.push_str(cluster);
        i += 1;
    }

    flush_word(&mut word, *bold, *italic, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(words: &[StyledWord]) -> Vec<&str> {
        words.iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn test_plain_words_and_whitespace() {
        let words = tokenize("ab cd");
        assert_eq!(texts(&words), vec!["ab", " ", "cd"]);
        assert!(words[1].is_whitespace);
        assert!(!words[0].is_whitespace);
    }

    #[test]
    fn test_whitespace_run_is_one_token() {
        let words = tokenize("a \t b");
        assert_eq!(texts(&words), vec!["a", " \t ", "b"]);
        assert!(words[1].is_whitespace);
    }

    #[test]
    fn test_bold_markers() {
        let words = tokenize("**A** b");
        assert_eq!(texts(&words), vec!["A", " ", "b"]);
        assert!(words[0].bold);
        assert!(!words[2].bold);
    }

    #[test]
    fn test_italic_markers() {
        let words = tokenize("x *y* z");
        assert_eq!(texts(&words), vec!["x", " ", "y", " ", "z"]);
        assert!(!words[0].italic);
        assert!(words[2].italic);
        assert!(!words[4].italic);
    }

    #[test]
    fn test_bold_italic_combined() {
        let words = tokenize("***w***");
        assert_eq!(texts(&words), vec!["w"]);
        assert!(words[0].bold);
        assert!(words[0].italic);
    }

    #[test]
    fn test_unclosed_toggle_styles_remainder() {
        let words = tokenize("a **b c");
        assert_eq!(texts(&words), vec!["a", " ", "b", " ", "c"]);
        assert!(!words[0].bold);
        assert!(words[2].bold);
        assert!(words[4].bold);
    }

    #[test]
    fn test_marker_inside_word_splits_token() {
        let words = tokenize("ab**cd**ef");
        assert_eq!(texts(&words), vec!["ab", "cd", "ef"]);
        assert!(!words[0].bold);
        assert!(words[1].bold);
        assert!(!words[2].bold);
    }

    #[test]
    fn test_hard_break_inside_word() {
        let words = tokenize("ab\ncd");
        assert_eq!(texts(&words), vec!["ab", "\n", "cd"]);
        assert!(words[1].is_hard_break);
        assert!(!words[1].is_whitespace);
    }

    #[test]
    fn test_consecutive_hard_breaks() {
        let words = tokenize("a\n\nb");
        assert_eq!(texts(&words), vec!["a", "\n", "\n", "b"]);
        assert!(words[1].is_hard_break);
        assert!(words[2].is_hard_break);
    }

    #[test]
    fn test_crlf_is_one_break() {
        let words = tokenize("a\r\nb");
        assert_eq!(texts(&words), vec!["a", "\n", "b"]);
        assert!(words[1].is_hard_break);
    }

    #[test]
    fn test_trailing_newline() {
        let words = tokenize("a\n");
        assert_eq!(texts(&words), vec!["a", "\n"]);
        assert!(words[1].is_hard_break);
    }

    #[test]
    fn test_style_survives_hard_break() {
        let words = tokenize("**a\nb**");
        assert_eq!(texts(&words), vec!["a", "\n", "b"]);
        assert!(words[0].bold);
        assert!(words[2].bold);
    }

    #[test]
    fn test_emoji_becomes_own_token() {
        let words = tokenize("hi\u{1F600}there");
        assert_eq!(texts(&words), vec!["hi", "\u{1F600}", "there"]);
        assert!(words[1].is_emoji);
        assert!(!words[0].is_emoji);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_marker_stripping_round_trip() {
        // stripMarkers(tokenize(s)) == stripMarkers(s)
        let s = "a **b** *c* d";
        let words = tokenize(s);
        let joined: String = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(joined, "a b c d");
    }
}
