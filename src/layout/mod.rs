//! # Constraint Solver
//!
//! The multi-pass core of the engine. One `solve` call takes a fully
//! built element arena and produces final dimensions and positions for
//! every element, reconciling intrinsic content sizes against externally
//! imposed widths.
//!
//! The passes run in this exact order, each a full tree traversal:
//!
//! 1. Root initialization — page roots take their configured or page
//!    dimensions.
//! 2. Intrinsic minima, bottom-up — every element learns the smallest
//!    box its content can live in.
//! 3. Distribution along X, top-down — fixed, percent, and fit children
//!    take their sizes; grow children split the remainder.
//! 4. Text reflow — text wraps against the widths the X pass just
//!    decided, and new minimum heights bubble up every Fit ancestor.
//! 5. Minima recomputation — rerun of pass 2 with wrapped text heights.
//! 6. Distribution along Y — same algorithm as pass 3, axes swapped.
//! 7. Positioning, top-down — children are placed inside their parent's
//!    content box, honoring child gap and alignment.
//!
//! Widths feed text heights feed container heights; the ordering above is
//! what lets the solver converge in a single forward pass per axis.

pub mod emit;
pub mod flex;

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Warning;
use crate::font::{FontConfig, FontMetrics, MeasureCache};
use crate::geometry::{Axis, Dimensions, Point, SizingAxis};
use crate::image::{ImageDimensions, ImageMetrics};
use crate::text::markdown::tokenize;
use crate::text::measure::WordMeasurer;
use crate::text::wrap::wrap_words;
use crate::text::WrappedLine;
use crate::tree::{AlignX, AlignY, Direction, ElementArena, ElementKind};

use flex::{distribute_grow, GrowSlot};

/// Geometric tolerance for containment and overconstraint checks.
pub const EPSILON: f64 = 1e-6;

/// Height of a wrapped text block: line boxes plus inter-line gaps.
///
/// The advance from one line to the next is `line_height`; the last line
/// contributes only its own box.
pub(crate) fn text_block_height(lines: &[WrappedLine], line_height: f64, font_size: f64) -> f64 {
    if lines.is_empty() {
        return 0.0;
    }
    let boxes: f64 = lines.iter().map(|l| l.height).sum();
    boxes + (lines.len() - 1) as f64 * (line_height - font_size)
}

fn align_factor_x(align: AlignX) -> f64 {
    match align {
        AlignX::Left => 0.0,
        AlignX::Center => 0.5,
        AlignX::Right => 1.0,
    }
}

fn align_factor_y(align: AlignY) -> f64 {
    match align {
        AlignY::Top => 0.0,
        AlignY::Center => 0.5,
        AlignY::Bottom => 1.0,
    }
}

/// One solve over one arena. Owns the warning list for the run; borrows
/// the ports and caches from the engine.
pub struct Solver<'a> {
    arena: &'a mut ElementArena,
    page_sizes: &'a [Dimensions],
    line_spacing_factor: f64,
    metrics: &'a dyn FontMetrics,
    fonts: &'a FontConfig,
    measure_cache: &'a MeasureCache,
    use_image_for_emojis: bool,
    image_metrics: &'a dyn ImageMetrics,
    image_dims: &'a RefCell<HashMap<String, ImageDimensions>>,
    warnings: Vec<Warning>,
}

impl<'a> Solver<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        arena: &'a mut ElementArena,
        page_sizes: &'a [Dimensions],
        line_spacing_factor: f64,
        metrics: &'a dyn FontMetrics,
        fonts: &'a FontConfig,
        measure_cache: &'a MeasureCache,
        use_image_for_emojis: bool,
        image_metrics: &'a dyn ImageMetrics,
        image_dims: &'a RefCell<HashMap<String, ImageDimensions>>,
    ) -> Self {
        Self {
            arena,
            page_sizes,
            line_spacing_factor,
            metrics,
            fonts,
            measure_cache,
            use_image_for_emojis,
            image_metrics,
            image_dims,
            warnings: Vec::new(),
        }
    }

    /// Run all passes. Consumes the solver and returns the warnings it
    /// collected.
    pub fn solve(mut self) -> Vec<Warning> {
        let roots: Vec<usize> = self.arena.roots().to_vec();

        self.reset_geometry();
        self.measure_text();
        self.initialize_roots(&roots);

        for &root in &roots {
            self.compute_minima(root, false);
        }
        self.inflate_fit_roots(&roots, Axis::X);
        for &root in &roots {
            self.distribute(root, Axis::X);
        }

        for &root in &roots {
            self.reflow_text(root);
        }
        for &root in &roots {
            self.compute_minima(root, true);
        }
        self.inflate_fit_roots(&roots, Axis::Y);
        for &root in &roots {
            self.distribute(root, Axis::Y);
        }

        self.clamp_to_minimums();

        for &root in &roots {
            log::trace!("positioning page subtree at root {root}");
            self.position_children(root);
        }

        self.warnings
    }

    /// Solver-written fields start from a clean slate, so a second
    /// `render` on the same tree reproduces the first byte for byte.
    fn reset_geometry(&mut self) {
        for idx in 0..self.arena.len() {
            let el = self.arena.get_mut(idx);
            el.min_dimensions = Dimensions::default();
            el.dimensions = Dimensions::default();
            el.position = Point::default();
            el.words.clear();
            el.wrapped_lines.clear();
        }
    }

    /// Tokenize and measure every text payload once per render.
    fn measure_text(&mut self) {
        let measurer = WordMeasurer::new(
            self.metrics,
            self.fonts,
            self.measure_cache,
            self.use_image_for_emojis,
        );
        for idx in 0..self.arena.len() {
            let el = self.arena.get_mut(idx);
            let (content, font_size) = match &el.text {
                Some(t) => (t.content.clone(), t.font_size),
                None => continue,
            };
            el.words = tokenize(&content);
            let id = el.id.clone();
            measurer.measure(&mut el.words, font_size, &id, &mut self.warnings);
        }
    }

    /// Pass 1: page roots take their configured dimensions, the page
    /// dimensions when growing, or zero when fitting (inflated later).
    fn initialize_roots(&mut self, roots: &[usize]) {
        for &root in roots {
            let page = self.arena.get(root).page;
            let page_size = self.page_sizes[page];
            let el = self.arena.get_mut(root);
            for axis in [Axis::X, Axis::Y] {
                let sizing = el.config.sizing.along(axis);
                let value = match sizing {
                    SizingAxis::Fixed { value } => value,
                    SizingAxis::Percent { percent, .. } => {
                        sizing.clamp(page_size.along(axis) * percent)
                    }
                    SizingAxis::Grow { .. } => sizing.clamp(page_size.along(axis)),
                    SizingAxis::Fit { .. } => 0.0,
                };
                *el.dimensions.along_mut(axis) = value;
            }
        }
    }

    /// Fit-sized roots take their computed minimum along `axis`.
    fn inflate_fit_roots(&mut self, roots: &[usize], axis: Axis) {
        for &root in roots {
            let el = self.arena.get_mut(root);
            if matches!(el.config.sizing.along(axis), SizingAxis::Fit { .. }) {
                *el.dimensions.along_mut(axis) = el.min_dimensions.along(axis);
            }
        }
    }

    /// Passes 2 and 5: post-order minima. `after_reflow` switches text
    /// leaves from natural-size minima to their wrapped minima.
    fn compute_minima(&mut self, idx: usize, after_reflow: bool) {
        // Fixed axes pin dimensions up front so text wrapping can see
        // externally imposed widths.
        let el = self.arena.get_mut(idx);
        if let SizingAxis::Fixed { value } = el.config.sizing.width {
            el.dimensions.width = value;
        }
        if let SizingAxis::Fixed { value } = el.config.sizing.height {
            el.dimensions.height = value;
        }
        let children = el.children.clone();
        let is_text = el.is_text();

        if children.is_empty() {
            if is_text {
                self.text_minima(idx, after_reflow);
            } else {
                self.leaf_minima(idx);
            }
            return;
        }

        for &child in &children {
            self.compute_minima(child, after_reflow);
        }
        self.container_minima(idx);
    }

    fn leaf_minima(&mut self, idx: usize) {
        let el = self.arena.get(idx);
        let both_fit = matches!(el.config.sizing.width, SizingAxis::Fit { .. })
            && matches!(el.config.sizing.height, SizingAxis::Fit { .. });
        let intrinsic = if el.kind == ElementKind::Image && both_fit {
            self.describe_image(idx)
        } else {
            None
        };

        let el = self.arena.get_mut(idx);
        for axis in [Axis::X, Axis::Y] {
            let sizing = el.config.sizing.along(axis);
            let content = intrinsic.map(|d| d.along(axis)).unwrap_or(0.0);
            let min = match sizing {
                SizingAxis::Fit { .. } => sizing.clamp(content),
                SizingAxis::Fixed { value } => value,
                _ => content,
            };
            *el.min_dimensions.along_mut(axis) = min;
        }
    }

    /// Intrinsic image dimensions through the port, cached per source.
    fn describe_image(&mut self, idx: usize) -> Option<Dimensions> {
        let el = self.arena.get(idx);
        let source = el.image.as_ref()?.source.clone();
        let id = el.id.clone();

        if let Some(d) = self.image_dims.borrow().get(&source) {
            return Some(Dimensions::new(d.width as f64, d.height as f64));
        }
        match self.image_metrics.describe(&source) {
            Ok(d) => {
                self.image_dims.borrow_mut().insert(source, d);
                Some(Dimensions::new(d.width as f64, d.height as f64))
            }
            Err(err) => {
                log::warn!("image source {source:?} on {id:?} unavailable: {err}");
                self.warnings.push(Warning::ImageUnavailable {
                    element_id: id,
                    source,
                });
                None
            }
        }
    }

    fn text_minima(&mut self, idx: usize, after_reflow: bool) {
        let el = self.arena.get_mut(idx);
        let text = el.text.clone().expect("text element carries a payload");
        let padding = el.config.padding;
        let line_height = text.resolved_line_height(self.line_spacing_factor);

        if after_reflow {
            // Reflow already wrapped at the assigned width and stored the
            // resulting block height; the minima just mirror it.
            el.min_dimensions.width = el.dimensions.width;
            el.min_dimensions.height = el.dimensions.height;
            return;
        }

        if el.dimensions.width > 0.0 {
            // Externally imposed width (Fixed): wrap against it now.
            let wrap_width = (el.dimensions.width - padding.horizontal()).max(0.0);
            let lines = wrap_to_width(&el.words, wrap_width);
            let height =
                text_block_height(&lines, line_height, text.font_size) + padding.vertical();
            el.wrapped_lines = lines;
            el.min_dimensions = Dimensions::new(el.dimensions.width, height);
            el.dimensions.height = height;
        } else {
            // Natural size: a single line per hard-break segment.
            let lines = wrap_words(&el.words, f64::INFINITY);
            let natural_width =
                lines.iter().map(|l| l.width).fold(0.0, f64::max) + padding.horizontal();
            let natural_height =
                text_block_height(&lines, line_height, text.font_size) + padding.vertical();
            el.wrapped_lines = lines;
            let width_sizing = el.config.sizing.width;
            let height_sizing = el.config.sizing.height;
            el.min_dimensions.width = match width_sizing {
                SizingAxis::Fit { .. } => width_sizing.clamp(natural_width),
                _ => natural_width,
            };
            el.min_dimensions.height = match height_sizing {
                SizingAxis::Fit { .. } => height_sizing.clamp(natural_height),
                _ => natural_height,
            };
        }
    }

    fn container_minima(&mut self, idx: usize) {
        let el = self.arena.get(idx);
        let children = el.children.clone();
        let direction = el.config.direction;
        let padding = el.config.padding;
        let gap = el.config.child_gap;
        let main = match direction {
            Direction::Row => Axis::X,
            Direction::Column => Axis::Y,
        };
        let cross = main.cross();

        let mut main_sum = 0.0;
        let mut cross_max: f64 = 0.0;
        for &child in &children {
            let child_min = self.arena.get(child).min_dimensions;
            main_sum += child_min.along(main);
            cross_max = cross_max.max(child_min.along(cross));
        }
        main_sum += (children.len() - 1) as f64 * gap + padding.along(main);
        cross_max += padding.along(cross);

        let el = self.arena.get_mut(idx);
        for axis in [Axis::X, Axis::Y] {
            let content_min = if axis == main { main_sum } else { cross_max };
            let sizing = el.config.sizing.along(axis);
            let min = match sizing {
                SizingAxis::Fit { .. } => sizing.clamp(content_min),
                SizingAxis::Fixed { value } => value,
                _ => content_min,
            };
            *el.min_dimensions.along_mut(axis) = min;
        }
    }

    /// Passes 3 and 6: pre-order distribution along one axis.
    fn distribute(&mut self, parent: usize, axis: Axis) {
        let el = self.arena.get(parent);
        let children = el.children.clone();
        if children.is_empty() {
            return;
        }
        let direction = el.config.direction;
        let along = (axis == Axis::X && direction == Direction::Row)
            || (axis == Axis::Y && direction == Direction::Column);
        let padding = el.config.padding.along(axis);
        let gap = el.config.child_gap;
        let parent_size = el.dimensions.along(axis);
        let gaps = if along {
            (children.len() - 1) as f64 * gap
        } else {
            0.0
        };
        let available = parent_size - padding - gaps;

        let infos: Vec<(usize, SizingAxis, f64)> = children
            .iter()
            .map(|&c| {
                let child = self.arena.get(c);
                (
                    c,
                    child.config.sizing.along(axis),
                    child.min_dimensions.along(axis),
                )
            })
            .collect();

        let mut assigned: Vec<f64> = Vec::with_capacity(infos.len());
        let mut grow_positions: Vec<usize> = Vec::new();
        let mut used = 0.0;
        for (i, &(_, sizing, min)) in infos.iter().enumerate() {
            let size = match sizing {
                SizingAxis::Fixed { value } => value,
                SizingAxis::Percent { .. } => {
                    sizing.clamp(available * percent_of(sizing))
                }
                SizingAxis::Fit { .. } => min,
                SizingAxis::Grow { .. } => {
                    grow_positions.push(i);
                    0.0
                }
            };
            used += size;
            assigned.push(size);
        }

        if !grow_positions.is_empty() {
            if along {
                let mut slots: Vec<GrowSlot> = grow_positions
                    .iter()
                    .map(|&i| GrowSlot::new(infos[i].1.min(), infos[i].1.max()))
                    .collect();
                distribute_grow(&mut slots, available - used);
                for (slot, &i) in slots.iter().zip(&grow_positions) {
                    assigned[i] = slot.size;
                }
            } else {
                // Perpendicular axis: grow children span the content box.
                for &i in &grow_positions {
                    let sizing = infos[i].1;
                    assigned[i] = sizing.min().max(available.min(sizing.max()));
                }
            }
        }

        for (i, &(child, _, _)) in infos.iter().enumerate() {
            *self.arena.get_mut(child).dimensions.along_mut(axis) = assigned[i];
        }
        for &child in &children {
            self.distribute(child, axis);
        }
    }

    /// Pass 4: wrap text against assigned widths (post-order) and bubble
    /// the new minimum heights through every Fit-height ancestor.
    fn reflow_text(&mut self, idx: usize) {
        let children = self.arena.get(idx).children.clone();
        for &child in &children {
            self.reflow_text(child);
        }

        if self.arena.get(idx).is_text() {
            let el = self.arena.get_mut(idx);
            let text = el.text.clone().expect("text element carries a payload");
            let line_height = text.resolved_line_height(self.line_spacing_factor);
            let wrap_width = (el.dimensions.width - el.config.padding.horizontal()).max(0.0);
            let lines = wrap_to_width(&el.words, wrap_width);
            let height = text_block_height(&lines, line_height, text.font_size)
                + el.config.padding.vertical();
            el.wrapped_lines = lines;
            el.dimensions.height = height;
            el.min_dimensions.height = height;
            return;
        }

        if children.is_empty() {
            return;
        }

        // Bubble: a Fit-height container grows its minimum to hold the
        // heights its children just learned.
        let el = self.arena.get(idx);
        let sizing = el.config.sizing.height;
        if !matches!(sizing, SizingAxis::Fit { .. }) {
            return;
        }
        let direction = el.config.direction;
        let padding = el.config.padding.vertical();
        let gap = el.config.child_gap;
        let mut content: f64 = 0.0;
        for (i, &child) in children.iter().enumerate() {
            let c = self.arena.get(child);
            let h = c.dimensions.height.max(c.min_dimensions.height);
            match direction {
                Direction::Column => {
                    content += h;
                    if i > 0 {
                        content += gap;
                    }
                }
                Direction::Row => content = content.max(h),
            }
        }
        content += padding;
        let el = self.arena.get_mut(idx);
        let bubbled = sizing.clamp(content);
        el.min_dimensions.height = el.min_dimensions.height.max(bubbled);
    }

    /// Overconstraint floor: after both distributions, any element whose
    /// assigned dimension fell below its minimum keeps the minimum and a
    /// warning is recorded; the emitter clips it to the parent later.
    fn clamp_to_minimums(&mut self) {
        for idx in 0..self.arena.len() {
            for (axis, axis_name) in [(Axis::X, "width"), (Axis::Y, "height")] {
                let el = self.arena.get(idx);
                let min = el.min_dimensions.along(axis);
                let dim = el.dimensions.along(axis);
                if dim < min - EPSILON {
                    let id = el.id.clone();
                    log::warn!(
                        "element {id:?} {axis_name} {dim} under its minimum {min}; keeping minimum"
                    );
                    self.warnings.push(Warning::Overconstraint {
                        element_id: id,
                        axis_name,
                        min,
                        assigned: dim,
                    });
                    *self.arena.get_mut(idx).dimensions.along_mut(axis) = min;
                }
            }
        }
    }

    /// Pass 7: place children inside the parent's content box.
    fn position_children(&mut self, parent: usize) {
        let el = self.arena.get(parent);
        let children = el.children.clone();
        if children.is_empty() {
            return;
        }
        let direction = el.config.direction;
        let padding = el.config.padding;
        let gap = el.config.child_gap;
        let alignment = el.config.child_alignment;
        let position = el.position;
        let dimensions = el.dimensions;

        let main = match direction {
            Direction::Row => Axis::X,
            Direction::Column => Axis::Y,
        };
        let cross = main.cross();
        let content_main = dimensions.along(main) - padding.along(main);
        let content_cross = dimensions.along(cross) - padding.along(cross);

        let total: f64 = children
            .iter()
            .map(|&c| self.arena.get(c).dimensions.along(main))
            .sum::<f64>()
            + (children.len() - 1) as f64 * gap;
        let free = content_main - total;

        let main_factor = match main {
            Axis::X => align_factor_x(alignment.x),
            Axis::Y => align_factor_y(alignment.y),
        };
        let cross_factor = match cross {
            Axis::X => align_factor_x(alignment.x),
            Axis::Y => align_factor_y(alignment.y),
        };

        let mut cursor = position.along(main) + padding.leading(main) + free.max(0.0) * main_factor;
        let cross_origin = position.along(cross) + padding.leading(cross);

        for &child in &children {
            let child_size = {
                let c = self.arena.get(child);
                c.dimensions
            };
            let cross_free = content_cross - child_size.along(cross);
            let c = self.arena.get_mut(child);
            *c.position.along_mut(main) = cursor;
            *c.position.along_mut(cross) = cross_origin + cross_free.max(0.0) * cross_factor;
            cursor += child_size.along(main) + gap;
        }

        for &child in &children {
            self.position_children(child);
        }
    }
}

/// Wrap tokens at `width`, except that a width accommodating the whole
/// text keeps the natural (hard-break-only) lines. Re-wrapping at a
/// width at or above a line's own width must reproduce that line.
fn wrap_to_width(words: &[crate::text::StyledWord], width: f64) -> Vec<WrappedLine> {
    let natural = wrap_words(words, f64::INFINITY);
    let natural_width = natural.iter().map(|l| l.width).fold(0.0, f64::max);
    if width + EPSILON >= natural_width {
        natural
    } else {
        wrap_words(words, width)
    }
}

fn percent_of(sizing: SizingAxis) -> f64 {
    match sizing {
        SizingAxis::Percent { percent, .. } => percent,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_block_height_single_line() {
        let line = WrappedLine {
            words: vec![],
            width: 12.0,
            height: 10.0,
        };
        assert_eq!(text_block_height(&[line], 12.0, 10.0), 10.0);
    }

    #[test]
    fn test_text_block_height_three_lines() {
        let line = WrappedLine {
            words: vec![],
            width: 12.0,
            height: 10.0,
        };
        let lines = vec![line.clone(), line.clone(), line];
        // 3 boxes of 10 plus two inter-line gaps of (12 - 10).
        assert_eq!(text_block_height(&lines, 12.0, 10.0), 34.0);
    }

    #[test]
    fn test_text_block_height_empty() {
        assert_eq!(text_block_height(&[], 12.0, 10.0), 0.0);
    }
}
