//! # Inline Rich-Text Model
//!
//! Tokenization, measurement, and wrapping for the text subsystem.
//!
//! A text payload travels through three stages before the solver can use
//! it: the markdown tokenizer turns the raw string into styled word
//! tokens (`markdown`), the word measurer assigns each token a width from
//! the font metrics port (`measure`), and the greedy wrapper folds the
//! measured tokens into lines under a container width (`wrap`). The
//! solver re-runs only the wrapping stage when a width changes; tokens
//! and their widths are computed once per render.

pub mod emoji;
pub mod markdown;
pub mod measure;
pub mod wrap;

use serde::{Deserialize, Serialize};

/// A styled word token.
///
/// Whitespace runs and hard breaks are tokens of their own so the wrapper
/// can break at exactly those points and the measurer can price
/// whitespace in the current font. `width` is populated by measurement;
/// `height` always equals the element's font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledWord {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub is_emoji: bool,
    pub is_whitespace: bool,
    pub is_hard_break: bool,
    /// Set when the engine is configured to draw this emoji token from an
    /// image fallback instead of the emoji font face.
    pub image_backed: bool,
    pub width: f64,
    pub height: f64,
}

impl StyledWord {
    pub(crate) fn new(text: String, bold: bool, italic: bool) -> Self {
        Self {
            text,
            bold,
            italic,
            is_emoji: false,
            is_whitespace: false,
            is_hard_break: false,
            image_backed: false,
            width: 0.0,
            height: 0.0,
        }
    }
}

/// A line of wrapped tokens.
///
/// `width` excludes leading and trailing whitespace; `height` is the
/// maximum token height on the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedLine {
    pub words: Vec<StyledWord>,
    pub width: f64,
    pub height: f64,
}
