//! # Font Metrics Port
//!
//! The engine never parses font files. Glyph advance widths arrive through
//! the [`FontMetrics`] trait, implemented by the hosting application (a
//! shaper, an AFM table, a test fixture). What lives here is the logical
//! role model — regular/bold/italic/bold-italic/emoji — the fallback chain
//! between roles, and the per-engine width cache that amortizes repeated
//! measurement of the same token.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Provider of glyph metrics, supplied by the host.
///
/// `width_of` must be pure over its inputs: the same `(face, size, text)`
/// triple always yields the same width. A NaN or negative return is
/// treated as a measurement failure and replaced by a heuristic width
/// (see the word measurer).
pub trait FontMetrics {
    /// Advance width of `text` in points when set in `face` at `size_pt`.
    fn width_of(&self, face: &str, size_pt: f64, text: &str) -> f64;

    /// Nominal line box height. The engine overrides this through explicit
    /// text configuration; the default matches common renderer behavior.
    fn line_height(&self, _face: &str, size_pt: f64) -> f64 {
        size_pt * 1.2
    }
}

/// The logical font role a styled token selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Emoji,
}

impl FontRole {
    /// Role selection: emoji wins over everything, then the bold/italic
    /// combination.
    pub fn select(bold: bool, italic: bool, emoji: bool) -> FontRole {
        if emoji {
            FontRole::Emoji
        } else {
            match (bold, italic) {
                (false, false) => FontRole::Regular,
                (true, false) => FontRole::Bold,
                (false, true) => FontRole::Italic,
                (true, true) => FontRole::BoldItalic,
            }
        }
    }
}

/// Maps logical roles to the face ids the metrics port understands.
///
/// Missing faces fall back along the chain `BoldItalic → Bold → Regular`
/// and `Italic → Regular`. When no emoji face is registered, emoji tokens
/// measure and render in the regular face.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontConfig {
    pub regular: String,
    #[serde(default)]
    pub bold: Option<String>,
    #[serde(default)]
    pub italic: Option<String>,
    #[serde(default)]
    pub bold_italic: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            regular: "Helvetica".to_string(),
            bold: Some("Helvetica-Bold".to_string()),
            italic: Some("Helvetica-Oblique".to_string()),
            bold_italic: Some("Helvetica-BoldOblique".to_string()),
            emoji: None,
        }
    }
}

impl FontConfig {
    /// Resolve a role to a concrete face id, walking the fallback chain.
    pub fn face(&self, role: FontRole) -> &str {
        match role {
            FontRole::Regular => &self.regular,
            FontRole::Bold => self.bold.as_deref().unwrap_or(&self.regular),
            FontRole::Italic => self.italic.as_deref().unwrap_or(&self.regular),
            FontRole::BoldItalic => self
                .bold_italic
                .as_deref()
                .or(self.bold.as_deref())
                .unwrap_or(&self.regular),
            FontRole::Emoji => self.emoji.as_deref().unwrap_or(&self.regular),
        }
    }

    /// Whether a dedicated emoji face is registered.
    pub fn has_emoji_face(&self) -> bool {
        self.emoji.is_some()
    }
}

/// Fallback metrics used when the host supplies no shaper: every
/// character advances half the font size. Good enough for smoke tests
/// and headless use; real documents want a real metrics port.
#[derive(Debug, Default)]
pub struct HeuristicFontMetrics;

impl FontMetrics for HeuristicFontMetrics {
    fn width_of(&self, _face: &str, size_pt: f64, text: &str) -> f64 {
        text.chars().count() as f64 * size_pt / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    face: String,
    // f64 size keyed by bit pattern so the map stays Eq/Hash.
    size_bits: u64,
    text: String,
}

/// Per-engine cache of token widths keyed by `(face, size, text)`.
///
/// The resolved face id already encodes the bold/italic combination, so
/// the triple uniquely identifies a measurement. Invalidated by dropping
/// the engine.
#[derive(Default)]
pub struct MeasureCache {
    widths: RefCell<HashMap<MeasureKey, f64>>,
}

impl MeasureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached width, or compute and remember it.
    pub fn width_or_insert_with<F>(&self, face: &str, size_pt: f64, text: &str, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        let key = MeasureKey {
            face: face.to_string(),
            size_bits: size_pt.to_bits(),
            text: text.to_string(),
        };
        if let Some(w) = self.widths.borrow().get(&key) {
            return *w;
        }
        let w = compute();
        self.widths.borrow_mut().insert(key, w);
        w
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.widths.borrow().len()
    }
}
