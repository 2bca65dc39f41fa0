//! # Command Emission & Rich-Text Placement
//!
//! Walks the positioned tree and produces the flat render-command list.
//! Every element contributes commands at a z-index equal to its tree
//! depth; a stable sort per page then yields back-to-front order while
//! preserving sibling input order.
//!
//! Text elements emit one command per wrapped line. Lines are placed
//! vertically by the element's own alignment inside its content box and
//! advance by the resolved line height; each line is shifted horizontally
//! by its text alignment. Contiguous words sharing a font face merge into
//! runs so the consumer can switch fonts once per run.

use crate::commands::{CommandPayload, RenderCommand};
use crate::font::FontRole;
use crate::geometry::BoundingBox;
use crate::text::StyledWord;
use crate::tree::{AlignY, ElementArena, ElementKind, TextAlign};

use super::text_block_height;

/// Emit all pages of a solved arena.
pub fn emit(arena: &ElementArena, line_spacing_factor: f64) -> Vec<RenderCommand> {
    let mut commands = Vec::new();
    for &root in arena.roots() {
        let mut page_commands = Vec::new();
        let clip = arena.get(root).bounding_box();
        walk(arena, root, 0, clip, line_spacing_factor, &mut page_commands);
        // Stable: equal depths keep emission (input) order.
        page_commands.sort_by_key(|c| c.z_index);
        commands.extend(page_commands);
    }
    commands
}

fn walk(
    arena: &ElementArena,
    idx: usize,
    depth: u32,
    clip: BoundingBox,
    line_spacing_factor: f64,
    out: &mut Vec<RenderCommand>,
) {
    let el = arena.get(idx);
    let bbox = el.bounding_box().intersect(&clip);

    match el.kind {
        ElementKind::Rectangle => {
            if let Some(color) = el.fill {
                out.push(RenderCommand {
                    page_id: el.page,
                    bounding_box: bbox,
                    z_index: depth,
                    payload: CommandPayload::Rectangle {
                        color,
                        corner_radius: el.corner_radius,
                    },
                });
            }
        }
        ElementKind::Circle => {
            if let Some(color) = el.fill {
                out.push(RenderCommand {
                    page_id: el.page,
                    bounding_box: bbox,
                    z_index: depth,
                    payload: CommandPayload::Circle { color },
                });
            }
        }
        ElementKind::Image => {
            if let Some(image) = &el.image {
                out.push(RenderCommand {
                    page_id: el.page,
                    bounding_box: bbox,
                    z_index: depth,
                    payload: CommandPayload::Image {
                        source: image.source.clone(),
                        fit: image.fit,
                        opacity: image.opacity,
                        corner_radius: image.corner_radius,
                        rounded: image.rounded,
                    },
                });
            }
        }
        ElementKind::Text => {
            emit_text_lines(arena, idx, depth, clip, line_spacing_factor, out);
        }
    }

    let child_clip = el.content_box().intersect(&clip);
    for &child in &el.children {
        walk(arena, child, depth + 1, child_clip, line_spacing_factor, out);
    }
}

fn emit_text_lines(
    arena: &ElementArena,
    idx: usize,
    depth: u32,
    clip: BoundingBox,
    line_spacing_factor: f64,
    out: &mut Vec<RenderCommand>,
) {
    let el = arena.get(idx);
    let text = match &el.text {
        Some(t) => t,
        None => return,
    };
    let content = el.content_box();
    let line_height = text.resolved_line_height(line_spacing_factor);
    let block_height = text_block_height(&el.wrapped_lines, line_height, text.font_size);

    let vertical_offset = match el.config.child_alignment.y {
        AlignY::Top => 0.0,
        AlignY::Center => ((content.height - block_height) / 2.0).max(0.0),
        AlignY::Bottom => (content.height - block_height).max(0.0),
    };

    let mut y = content.y + vertical_offset;
    for line in &el.wrapped_lines {
        let runs = merge_runs(&line.words);
        if runs.is_empty() || runs.iter().all(|r| r.is_whitespace) {
            y += line_height;
            continue;
        }

        let x_offset = match text.text_align {
            TextAlign::Left => 0.0,
            TextAlign::Center => ((content.width - line.width) / 2.0).max(0.0),
            TextAlign::Right => (content.width - line.width).max(0.0),
        };
        let line_box =
            BoundingBox::new(content.x + x_offset, y, line.width, line.height).intersect(&clip);

        out.push(RenderCommand {
            page_id: el.page,
            bounding_box: line_box,
            z_index: depth,
            payload: CommandPayload::Text {
                runs,
                color: text.color,
                font_size: text.font_size,
                line_height,
            },
        });
        y += line_height;
    }
}

/// Merge contiguous words sharing a font face into runs. Hard-break
/// tokens are bookkeeping, not glyphs, and are dropped here.
fn merge_runs(words: &[StyledWord]) -> Vec<StyledWord> {
    let mut runs: Vec<StyledWord> = Vec::new();
    for word in words {
        if word.is_hard_break {
            continue;
        }
        match runs.last_mut() {
            Some(last) if same_face(last, word) => {
                last.text.push_str(&word.text);
                last.width += word.width;
                last.height = last.height.max(word.height);
                last.is_whitespace = last.is_whitespace && word.is_whitespace;
            }
            _ => runs.push(word.clone()),
        }
    }
    runs
}

fn same_face(a: &StyledWord, b: &StyledWord) -> bool {
    FontRole::select(a.bold, a.italic, a.is_emoji) == FontRole::select(b.bold, b.italic, b.is_emoji)
        && a.image_backed == b.image_backed
}
