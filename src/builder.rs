//! # Public API & Builder
//!
//! Tree construction through a push/pop stack of open parents, page
//! boundaries, and the `render` entry point that drives the solver and
//! returns the command vector with its warning side channel.
//!
//! Every `open_container` must pair with a `close_container` on every
//! exit path; unmatched closes, content outside a page, and out-of-range
//! configuration are usage errors surfaced immediately, before any
//! layout runs.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::commands::RenderCommand;
use crate::error::{GalleyError, Warning};
use crate::font::{FontConfig, FontMetrics, HeuristicFontMetrics, MeasureCache};
use crate::geometry::{Color, CornerRadius, Dimensions, Padding, SizingAxis};
use crate::image::{ImageDimensions, ImageMetrics, SourceImageMetrics};
use crate::layout::{emit::emit, Solver};
use crate::tree::{
    ChildAlignment, Direction, Element, ElementArena, ElementKind, ImageConfig, ImageFit,
    LayoutConfig, TextAlign, TextConfig,
};

/// Engine-wide options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    pub page_width_pt: f64,
    pub page_height_pt: f64,
    pub fonts: FontConfig,
    pub line_spacing_factor: f64,
    pub use_image_for_emojis: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            // A4.
            page_width_pt: 595.28,
            page_height_pt: 841.89,
            fonts: FontConfig::default(),
            line_spacing_factor: 1.2,
            use_image_for_emojis: true,
        }
    }
}

/// Padding as either a uniform number or a four-sided record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaddingSpec {
    Uniform(f64),
    Sides(Padding),
}

impl PaddingSpec {
    pub fn resolve(self) -> Padding {
        match self {
            PaddingSpec::Uniform(v) => Padding::uniform(v),
            PaddingSpec::Sides(p) => p,
        }
    }
}

/// Corner radius as either a uniform number or a four-corner record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CornerSpec {
    Uniform(f64),
    Corners(CornerRadius),
}

impl CornerSpec {
    pub fn resolve(self) -> CornerRadius {
        match self {
            CornerSpec::Uniform(v) => CornerRadius::uniform(v),
            CornerSpec::Corners(c) => c,
        }
    }
}

/// Color as either a hex string or an RGBA record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Hex(String),
    Rgba(Color),
}

impl ColorSpec {
    pub fn resolve(&self) -> Color {
        match self {
            ColorSpec::Hex(s) => Color::hex(s),
            ColorSpec::Rgba(c) => *c,
        }
    }
}

/// Per-node configuration accepted by every builder call. Unset keys
/// fall back to defaults; keys that don't apply to the node kind are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConfig {
    pub width: Option<SizingAxis>,
    pub height: Option<SizingAxis>,
    pub padding: Option<PaddingSpec>,
    pub child_gap: Option<f64>,
    pub direction: Option<Direction>,
    pub child_alignment: Option<ChildAlignment>,
    pub fill_color: Option<ColorSpec>,
    pub corner_radius: Option<CornerSpec>,
    pub font_size: Option<f64>,
    pub color: Option<ColorSpec>,
    pub text_align: Option<TextAlign>,
    pub line_height: Option<f64>,
    pub line_spacing_factor: Option<f64>,
    pub fit: Option<ImageFit>,
    pub opacity: Option<f64>,
    pub rounded: Option<bool>,
    pub id: Option<String>,
}

impl NodeConfig {
    fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            sizing: crate::geometry::Sizing {
                width: self.width.unwrap_or_default(),
                height: self.height.unwrap_or_default(),
            },
            padding: self.padding.map(PaddingSpec::resolve).unwrap_or_default(),
            child_gap: self.child_gap.unwrap_or(0.0),
            child_alignment: self.child_alignment.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
        }
    }

    /// Reject negative lengths and out-of-range values before any node
    /// is created.
    fn validate(&self) -> Result<(), GalleyError> {
        for sizing in [self.width, self.height].into_iter().flatten() {
            validate_sizing(sizing)?;
        }
        if let Some(padding) = self.padding.map(PaddingSpec::resolve) {
            for (side, value) in [
                ("padding", padding.left),
                ("padding", padding.right),
                ("padding", padding.top),
                ("padding", padding.bottom),
            ] {
                if value < 0.0 {
                    return Err(GalleyError::NegativeSize { what: side, value });
                }
            }
        }
        if let Some(gap) = self.child_gap {
            if gap < 0.0 {
                return Err(GalleyError::NegativeSize {
                    what: "child gap",
                    value: gap,
                });
            }
        }
        if let Some(size) = self.font_size {
            if size < 0.0 {
                return Err(GalleyError::NegativeSize {
                    what: "font size",
                    value: size,
                });
            }
        }
        if let Some(height) = self.line_height {
            if height < 0.0 {
                return Err(GalleyError::NegativeSize {
                    what: "line height",
                    value: height,
                });
            }
        }
        if let Some(opacity) = self.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(GalleyError::OpacityOutOfRange { value: opacity });
            }
        }
        Ok(())
    }
}

fn validate_sizing(sizing: SizingAxis) -> Result<(), GalleyError> {
    let (min, max) = (sizing.min(), sizing.max());
    if min < 0.0 {
        return Err(GalleyError::NegativeSize {
            what: "sizing minimum",
            value: min,
        });
    }
    if max < 0.0 {
        return Err(GalleyError::NegativeSize {
            what: "sizing maximum",
            value: max,
        });
    }
    if let SizingAxis::Percent { percent, .. } = sizing {
        if percent < 0.0 {
            return Err(GalleyError::NegativeSize {
                what: "percent",
                value: percent,
            });
        }
    }
    Ok(())
}

/// The result of a render: the flat command list plus every non-fatal
/// condition encountered along the way.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub commands: Vec<RenderCommand>,
    pub warnings: Vec<Warning>,
}

/// The layout engine. Owns the element arena, the open-parent stack, and
/// the per-instance measurement caches; borrows nothing from the caller.
pub struct Engine {
    options: EngineOptions,
    font_metrics: Box<dyn FontMetrics>,
    image_metrics: Box<dyn ImageMetrics>,
    arena: ElementArena,
    open_stack: Vec<usize>,
    page_sizes: Vec<Dimensions>,
    next_id: usize,
    measure_cache: MeasureCache,
    image_dims: RefCell<HashMap<String, ImageDimensions>>,
}

impl Engine {
    /// Engine with the default ports: heuristic font metrics and
    /// source-probing image metrics.
    pub fn new(options: EngineOptions) -> Result<Self, GalleyError> {
        Self::with_ports(
            options,
            Box::new(HeuristicFontMetrics),
            Box::new(SourceImageMetrics),
        )
    }

    /// Engine with caller-supplied ports.
    pub fn with_ports(
        options: EngineOptions,
        font_metrics: Box<dyn FontMetrics>,
        image_metrics: Box<dyn ImageMetrics>,
    ) -> Result<Self, GalleyError> {
        for (what, value) in [
            ("page width", options.page_width_pt),
            ("page height", options.page_height_pt),
            ("line spacing factor", options.line_spacing_factor),
        ] {
            if value < 0.0 {
                return Err(GalleyError::NegativeSize { what, value });
            }
        }
        Ok(Self {
            options,
            font_metrics,
            image_metrics,
            arena: ElementArena::new(),
            open_stack: Vec::new(),
            page_sizes: Vec::new(),
            next_id: 0,
            measure_cache: MeasureCache::new(),
            image_dims: RefCell::new(HashMap::new()),
        })
    }

    /// Open a new page with the engine's default size.
    pub fn open_page(&mut self) -> Result<(), GalleyError> {
        self.open_page_sized(self.options.page_width_pt, self.options.page_height_pt)
    }

    /// Open a new page with an explicit size. All containers of the
    /// previous page must be closed.
    pub fn open_page_sized(&mut self, width_pt: f64, height_pt: f64) -> Result<(), GalleyError> {
        if width_pt < 0.0 {
            return Err(GalleyError::NegativeSize {
                what: "page width",
                value: width_pt,
            });
        }
        if height_pt < 0.0 {
            return Err(GalleyError::NegativeSize {
                what: "page height",
                value: height_pt,
            });
        }
        if self.open_stack.len() > 1 {
            return Err(GalleyError::UnclosedContainer {
                depth: self.open_stack.len() - 1,
            });
        }

        let page = self.page_sizes.len();
        self.page_sizes.push(Dimensions::new(width_pt, height_pt));

        let mut config = LayoutConfig {
            direction: Direction::Column,
            ..LayoutConfig::default()
        };
        config.sizing.width = SizingAxis::fixed(width_pt);
        config.sizing.height = SizingAxis::fixed(height_pt);

        let root = Element::new(format!("page-{page}"), page, ElementKind::Rectangle, config);
        let root_idx = self.arena.push_root(root);
        self.open_stack = vec![root_idx];
        Ok(())
    }

    /// Open a container element; children attach to it until the
    /// matching `close_container`.
    pub fn open_container(
        &mut self,
        kind: ElementKind,
        config: NodeConfig,
    ) -> Result<(), GalleyError> {
        let idx = self.push_element(kind, &config)?;
        self.open_stack.push(idx);
        Ok(())
    }

    /// Close the innermost open container.
    pub fn close_container(&mut self) -> Result<(), GalleyError> {
        // The page root is implicit; it is never closed by hand.
        if self.open_stack.len() <= 1 {
            return Err(GalleyError::UnbalancedClose);
        }
        self.open_stack.pop();
        Ok(())
    }

    /// Add a text leaf under the current container.
    pub fn text(&mut self, content: &str, config: NodeConfig) -> Result<(), GalleyError> {
        let idx = self.push_element(ElementKind::Text, &config)?;
        let el = self.arena.get_mut(idx);
        el.text = Some(TextConfig {
            content: content.to_string(),
            font_size: config.font_size.unwrap_or(12.0),
            line_spacing_factor: config.line_spacing_factor,
            line_height: config.line_height,
            text_align: config.text_align.unwrap_or_default(),
            color: config
                .color
                .as_ref()
                .map(ColorSpec::resolve)
                .unwrap_or(Color::BLACK),
        });
        Ok(())
    }

    /// Add an image leaf under the current container. The source stays
    /// opaque; it is forwarded to the emitted command untouched.
    pub fn image(&mut self, source: &str, config: NodeConfig) -> Result<(), GalleyError> {
        let idx = self.push_element(ElementKind::Image, &config)?;
        let el = self.arena.get_mut(idx);
        el.image = Some(ImageConfig {
            source: source.to_string(),
            fit: config.fit.unwrap_or_default(),
            opacity: config.opacity.unwrap_or(1.0),
            corner_radius: config.corner_radius.map(CornerSpec::resolve),
            rounded: config.rounded.unwrap_or(false),
        });
        Ok(())
    }

    fn push_element(&mut self, kind: ElementKind, config: &NodeConfig) -> Result<usize, GalleyError> {
        config.validate()?;
        let parent = *self
            .open_stack
            .last()
            .ok_or(GalleyError::ContentOutsidePage)?;
        let page = self.arena.get(parent).page;

        let id = config.id.clone().unwrap_or_else(|| {
            let id = format!("el-{}", self.next_id);
            self.next_id += 1;
            id
        });

        let mut element = Element::new(id, page, kind, config.layout());
        element.fill = config.fill_color.as_ref().map(ColorSpec::resolve);
        element.corner_radius = config.corner_radius.map(CornerSpec::resolve);

        let idx = self.arena.push(element);
        self.arena.add_child(parent, idx);
        Ok(idx)
    }

    /// Solve the tree and emit the command list.
    ///
    /// Non-fatal conditions (measurement failures, overconstraint,
    /// unavailable images) come back as warnings next to the commands;
    /// usage errors abort with no output. Rendering twice without
    /// touching the tree reproduces the same commands.
    pub fn render(&mut self) -> Result<RenderOutput, GalleyError> {
        if self.page_sizes.is_empty() {
            return Err(GalleyError::NoPageOpen);
        }
        if self.open_stack.len() > 1 {
            return Err(GalleyError::UnclosedContainer {
                depth: self.open_stack.len() - 1,
            });
        }

        let warnings = Solver::new(
            &mut self.arena,
            &self.page_sizes,
            self.options.line_spacing_factor,
            self.font_metrics.as_ref(),
            &self.options.fonts,
            &self.measure_cache,
            self.options.use_image_for_emojis,
            self.image_metrics.as_ref(),
            &self.image_dims,
        )
        .solve();

        let commands = emit(&self.arena, self.options.line_spacing_factor);
        Ok(RenderOutput { commands, warnings })
    }

    /// Read access to the solved arena, mainly for inspection and tests.
    pub fn arena(&self) -> &ElementArena {
        &self.arena
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}
