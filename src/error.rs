//! Structured error types for the Galley layout engine.
//!
//! Two severity tiers: `GalleyError` aborts the render and leaves no
//! partial output; `Warning` is a non-fatal condition collected in a side
//! channel and returned alongside the command vector.

use std::fmt;

/// The fatal error type returned by all public Galley API functions.
///
/// Every variant is a usage error: the caller drove the builder or the
/// engine outside its contract. Layout itself never fails — degraded
/// conditions surface as [`Warning`]s instead.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleyError {
    /// `close_container` was called with no open container.
    UnbalancedClose,
    /// `render` was called before any page was opened.
    NoPageOpen,
    /// A container was still open when `render` was called.
    UnclosedContainer { depth: usize },
    /// A leaf call (`text`, `image`) or container open happened with no
    /// page open.
    ContentOutsidePage,
    /// A sizing axis, padding, gap, or font size carried a negative value.
    NegativeSize { what: &'static str, value: f64 },
    /// Image opacity outside the 0.0–1.0 range.
    OpacityOutOfRange { value: f64 },
    /// JSON input failed to parse as a valid Galley document.
    ParseError { message: String },
}

impl fmt::Display for GalleyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalleyError::UnbalancedClose => {
                write!(f, "close_container called with no open container")
            }
            GalleyError::NoPageOpen => {
                write!(f, "render called before any page was opened")
            }
            GalleyError::UnclosedContainer { depth } => {
                write!(f, "render called with {depth} container(s) still open")
            }
            GalleyError::ContentOutsidePage => {
                write!(f, "content added before any page was opened")
            }
            GalleyError::NegativeSize { what, value } => {
                write!(f, "negative {what}: {value}")
            }
            GalleyError::OpacityOutOfRange { value } => {
                write!(f, "opacity {value} is outside the 0.0-1.0 range")
            }
            GalleyError::ParseError { message } => {
                write!(f, "failed to parse document: {message}")
            }
        }
    }
}

impl std::error::Error for GalleyError {}

impl From<serde_json::Error> for GalleyError {
    fn from(e: serde_json::Error) -> Self {
        GalleyError::ParseError {
            message: e.to_string(),
        }
    }
}

/// A non-fatal condition recorded during layout or emission.
///
/// Warnings never abort the render; the result is a best-effort layout.
/// Each warning is also mirrored through `log::warn!` at the point it is
/// recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// The font metrics port returned NaN or a negative width. The engine
    /// substituted the heuristic `len(text) * font_size / 2`.
    Measurement {
        element_id: String,
        text: String,
        font_size: f64,
    },
    /// A child's minimum size exceeds the dimension its parent could
    /// assign. The child keeps its minimum and is clipped at emission.
    Overconstraint {
        element_id: String,
        axis_name: &'static str,
        min: f64,
        assigned: f64,
    },
    /// An image source could not be described. The command is still
    /// emitted; the consumer decides how to handle the missing asset.
    ImageUnavailable { element_id: String, source: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Measurement {
                element_id,
                text,
                font_size,
            } => write!(
                f,
                "font metrics failed for {element_id:?} ({font_size}pt, {text:?}); \
                 substituted heuristic width"
            ),
            Warning::Overconstraint {
                element_id,
                axis_name,
                min,
                assigned,
            } => write!(
                f,
                "element {element_id:?} {axis_name} minimum {min} exceeds assigned {assigned}; \
                 child will be clipped"
            ),
            Warning::ImageUnavailable { element_id, source } => {
                write!(f, "image source {source:?} on {element_id:?} is unavailable")
            }
        }
    }
}
