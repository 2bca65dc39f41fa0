//! # Render Commands
//!
//! The flat, z-ordered output of a render. Each command is tagged with
//! its page, carries an absolute bounding box in points (origin top-left,
//! y downward), and a payload the consumer draws without any further
//! layout decisions. The command list is ordered by page ascending and
//! stable-sorted by z-index within a page, so drawing in list order is
//! back-to-front.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Color, CornerRadius};
use crate::text::StyledWord;
use crate::tree::ImageFit;

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCommand {
    pub page_id: usize,
    pub bounding_box: BoundingBox,
    /// Tree depth of the owning element; a stable sort by this key yields
    /// back-to-front order.
    pub z_index: u32,
    pub payload: CommandPayload,
}

/// What to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommandPayload {
    Rectangle {
        color: Color,
        corner_radius: Option<CornerRadius>,
    },
    Circle {
        color: Color,
    },
    /// One wrapped line of text. Runs are contiguous words sharing a
    /// font face, in visual order.
    Text {
        runs: Vec<StyledWord>,
        color: Color,
        font_size: f64,
        line_height: f64,
    },
    /// The source stays opaque; the consumer resolves and decodes it.
    Image {
        source: String,
        fit: ImageFit,
        opacity: f64,
        corner_radius: Option<CornerRadius>,
        rounded: bool,
    },
}

/// Group a command list into per-page slices, preserving order.
///
/// The input is already page-ordered; this is a convenience for
/// consumers that emit one page stream at a time.
pub fn page_slices(commands: &[RenderCommand]) -> Vec<(usize, &[RenderCommand])> {
    let mut pages = Vec::new();
    let mut start = 0;
    for i in 1..=commands.len() {
        if i == commands.len() || commands[i].page_id != commands[start].page_id {
            pages.push((commands[start].page_id, &commands[start..i]));
            start = i;
        }
    }
    pages
}
