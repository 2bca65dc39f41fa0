//! # Word Measurer
//!
//! Assigns each styled token a width from the font metrics port, using
//! the face its style selects. Whitespace tokens are measured exactly
//! like words; hard breaks occupy no width. A port returning NaN or a
//! negative width is a measurement failure: the token falls back to the
//! heuristic `len(text) * font_size / 2` and a warning is recorded.

use crate::error::Warning;
use crate::font::{FontConfig, FontMetrics, FontRole, MeasureCache};

use super::StyledWord;

/// Measures tokens against the metrics port, caching by resolved face,
/// size, and token text.
pub struct WordMeasurer<'a> {
    metrics: &'a dyn FontMetrics,
    fonts: &'a FontConfig,
    cache: &'a MeasureCache,
    use_image_for_emojis: bool,
}

impl<'a> WordMeasurer<'a> {
    pub fn new(
        metrics: &'a dyn FontMetrics,
        fonts: &'a FontConfig,
        cache: &'a MeasureCache,
        use_image_for_emojis: bool,
    ) -> Self {
        Self {
            metrics,
            fonts,
            cache,
            use_image_for_emojis,
        }
    }

    /// Measure every token in place at `font_size`.
    ///
    /// `element_id` only labels warnings; measurement itself is pure over
    /// the token text, style, and size.
    pub fn measure(
        &self,
        words: &mut [StyledWord],
        font_size: f64,
        element_id: &str,
        warnings: &mut Vec<Warning>,
    ) {
        for word in words.iter_mut() {
            word.height = font_size;
            word.image_backed = word.is_emoji && self.use_image_for_emojis;

            if word.is_hard_break {
                word.width = 0.0;
                continue;
            }

            let role = FontRole::select(word.bold, word.italic, word.is_emoji);
            let face = self.fonts.face(role);

            let mut failed = false;
            let width = self
                .cache
                .width_or_insert_with(face, font_size, &word.text, || {
                    let raw = self.metrics.width_of(face, font_size, &word.text);
                    if raw.is_finite() && raw >= 0.0 {
                        raw
                    } else {
                        failed = true;
                        heuristic_width(&word.text, font_size)
                    }
                });

            if failed {
                log::warn!(
                    "font metrics failed for {:?} at {}pt on element {}; using heuristic width",
                    word.text,
                    font_size,
                    element_id
                );
                warnings.push(Warning::Measurement {
                    element_id: element_id.to_string(),
                    text: word.text.clone(),
                    font_size,
                });
            }

            word.width = width;
        }
    }
}

/// Fallback width when the metrics port misbehaves.
fn heuristic_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::markdown::tokenize;

    /// Fixed-advance metrics: 6pt per char at size 10.
    struct FixedAdvance;

    impl FontMetrics for FixedAdvance {
        fn width_of(&self, _face: &str, size_pt: f64, text: &str) -> f64 {
            text.chars().count() as f64 * size_pt * 0.6
        }
    }

    /// A port that always fails.
    struct BrokenMetrics;

    impl FontMetrics for BrokenMetrics {
        fn width_of(&self, _face: &str, _size_pt: f64, _text: &str) -> f64 {
            f64::NAN
        }
    }

    fn measure_all(metrics: &dyn FontMetrics, text: &str, font_size: f64) -> (Vec<StyledWord>, Vec<Warning>) {
        let fonts = FontConfig::default();
        let cache = MeasureCache::new();
        let measurer = WordMeasurer::new(metrics, &fonts, &cache, false);
        let mut words = tokenize(text);
        let mut warnings = Vec::new();
        measurer.measure(&mut words, font_size, "t", &mut warnings);
        (words, warnings)
    }

    #[test]
    fn test_word_and_whitespace_widths() {
        let (words, warnings) = measure_all(&FixedAdvance, "ab cd", 10.0);
        assert!(warnings.is_empty());
        assert_eq!(words[0].width, 12.0);
        assert_eq!(words[1].width, 6.0);
        assert_eq!(words[2].width, 12.0);
        assert!(words.iter().all(|w| w.height == 10.0));
    }

    #[test]
    fn test_hard_break_has_no_width() {
        let (words, _) = measure_all(&FixedAdvance, "a\nb", 10.0);
        assert_eq!(words[1].width, 0.0);
        assert_eq!(words[1].height, 10.0);
    }

    #[test]
    fn test_nan_falls_back_to_heuristic() {
        let (words, warnings) = measure_all(&BrokenMetrics, "abcd", 10.0);
        assert_eq!(words[0].width, 4.0 * 10.0 / 2.0);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], Warning::Measurement { .. }));
    }

    #[test]
    fn test_bold_selects_bold_face() {
        struct FaceRecorder;
        impl FontMetrics for FaceRecorder {
            fn width_of(&self, face: &str, _size_pt: f64, _text: &str) -> f64 {
                if face.contains("Bold") {
                    100.0
                } else {
                    10.0
                }
            }
        }
        let (words, _) = measure_all(&FaceRecorder, "**x** y", 10.0);
        assert_eq!(words[0].width, 100.0);
        assert_eq!(words[2].width, 10.0);
    }

    #[test]
    fn test_emoji_image_backed_flag() {
        let fonts = FontConfig::default();
        let cache = MeasureCache::new();
        let measurer = WordMeasurer::new(&FixedAdvance, &fonts, &cache, true);
        let mut words = tokenize("a \u{1F600}");
        let mut warnings = Vec::new();
        measurer.measure(&mut words, 10.0, "t", &mut warnings);
        assert!(words[2].is_emoji);
        assert!(words[2].image_backed);
        assert!(!words[0].image_backed);
    }
}
