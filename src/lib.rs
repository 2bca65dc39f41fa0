//! # Galley
//!
//! A declarative document layout and text-shaping engine.
//!
//! Galley transforms a tree of nested container/text/image/shape nodes
//! into absolutely positioned render commands suitable for emission into
//! a PDF page stream. Instead of imperative drawing calls, you declare
//! sizing constraints — fit, grow, percent, fixed — and a flex-like
//! solver distributes space, wraps rich text, and places glyph runs with
//! sub-point precision across pages.
//!
//! ## Architecture
//!
//! ```text
//! Builder (or JSON)
//!       ↓
//!   [tree]      — element arena: configs, payloads, child order
//!       ↓
//!   [layout]    — multi-pass constraint solver + text reflow
//!       ↓
//!   [emit]      — flat, z-ordered, page-tagged command list
//!       ↓
//! Consumer (PDF encoder, raster backend, test harness)
//! ```
//!
//! The engine is deliberately port-shaped at its edges: glyph metrics
//! come in through [`font::FontMetrics`], intrinsic image sizes through
//! [`image::ImageMetrics`], and drawing goes out as
//! [`commands::RenderCommand`] values. No font parsing, no pixel
//! decoding, no PDF bytes in here.
//!
//! One `render` call runs to completion on the calling thread; separate
//! engine instances are fully independent.

pub mod builder;
pub mod commands;
pub mod document;
pub mod error;
pub mod font;
pub mod geometry;
pub mod image;
pub mod layout;
pub mod text;
pub mod tree;

pub use builder::{Engine, EngineOptions, NodeConfig, RenderOutput};
pub use commands::{CommandPayload, RenderCommand};
pub use document::{render_json, Document};
pub use error::{GalleyError, Warning};
pub use geometry::{BoundingBox, Color, CornerRadius, Dimensions, Padding, SizingAxis};
pub use tree::{ChildAlignment, Direction, ElementKind, ImageFit, TextAlign};
