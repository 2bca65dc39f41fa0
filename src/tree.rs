//! # Element Tree
//!
//! The arena the solver operates on. Every node lives in one flat vector
//! owned by the arena; parents hold child indices in input order, and
//! page roots are tracked separately so a render can walk pages in the
//! order they were opened. There are no parent backpointers and no
//! cycles — the arena is the single owner.
//!
//! Elements carry their declarative configuration plus three geometry
//! fields (`min_dimensions`, `dimensions`, `position`) that only the
//! solver writes, during a single `render` invocation.

use serde::{Deserialize, Serialize};

use crate::geometry::{Color, CornerRadius, Dimensions, Padding, Point, Sizing};
use crate::text::{StyledWord, WrappedLine};

/// Flex direction of a container's main axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    Row,
    Column,
}

/// Horizontal child alignment inside a container's content box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignX {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical child alignment inside a container's content box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignY {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Per-line horizontal alignment of wrapped text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Two-axis child alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildAlignment {
    pub x: AlignX,
    pub y: AlignY,
}

/// The declarative layout configuration of one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub sizing: Sizing,
    pub padding: Padding,
    pub child_gap: f64,
    pub child_alignment: ChildAlignment,
    pub direction: Direction,
}

/// Text payload of a TEXT element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    pub content: String,
    pub font_size: f64,
    /// Multiplier applied to the font size when no explicit line height
    /// is given. `None` inherits the engine-level factor.
    pub line_spacing_factor: Option<f64>,
    pub line_height: Option<f64>,
    pub text_align: TextAlign,
    pub color: Color,
}

impl TextConfig {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            font_size: 12.0,
            line_spacing_factor: None,
            line_height: None,
            text_align: TextAlign::Left,
            color: Color::BLACK,
        }
    }

    /// The advance from one baseline box to the next.
    pub fn resolved_line_height(&self, engine_spacing_factor: f64) -> f64 {
        self.line_height.unwrap_or_else(|| {
            self.font_size * self.line_spacing_factor.unwrap_or(engine_spacing_factor)
        })
    }
}

/// How an image maps into its element box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageFit {
    #[default]
    Fill,
    Contain,
    Cover,
}

/// Image payload of an IMAGE element. The source stays opaque; the
/// consumer resolves it to bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub source: String,
    pub fit: ImageFit,
    pub opacity: f64,
    pub corner_radius: Option<CornerRadius>,
    pub rounded: bool,
}

impl ImageConfig {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            fit: ImageFit::Fill,
            opacity: 1.0,
            corner_radius: None,
            rounded: false,
        }
    }
}

/// The drawable kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    Rectangle,
    Circle,
    Text,
    Image,
}

/// A node in the layout tree.
#[derive(Debug, Clone)]
pub struct Element {
    /// Stable id, auto-generated by the builder when not supplied.
    pub id: String,
    /// The page this element renders on.
    pub page: usize,
    pub kind: ElementKind,
    pub config: LayoutConfig,
    pub text: Option<TextConfig>,
    pub image: Option<ImageConfig>,
    pub fill: Option<Color>,
    pub corner_radius: Option<CornerRadius>,
    /// Child indices into the arena, in input order.
    pub children: Vec<usize>,

    // Geometry, written by the solver.
    pub min_dimensions: Dimensions,
    pub dimensions: Dimensions,
    pub position: Point,

    /// Measured tokens of a TEXT element.
    pub words: Vec<StyledWord>,
    /// Wrapped lines of a TEXT element, populated during text reflow.
    pub wrapped_lines: Vec<WrappedLine>,
}

impl Element {
    pub fn new(id: String, page: usize, kind: ElementKind, config: LayoutConfig) -> Self {
        Self {
            id,
            page,
            kind,
            config,
            text: None,
            image: None,
            fill: None,
            corner_radius: None,
            children: Vec::new(),
            min_dimensions: Dimensions::default(),
            dimensions: Dimensions::default(),
            position: Point::default(),
            words: Vec::new(),
            wrapped_lines: Vec::new(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == ElementKind::Text
    }

    /// Content box: dimensions minus padding, anchored at the padded
    /// origin.
    pub fn content_box(&self) -> crate::geometry::BoundingBox {
        crate::geometry::BoundingBox::new(
            self.position.x + self.config.padding.left,
            self.position.y + self.config.padding.top,
            (self.dimensions.width - self.config.padding.horizontal()).max(0.0),
            (self.dimensions.height - self.config.padding.vertical()).max(0.0),
        )
    }

    pub fn bounding_box(&self) -> crate::geometry::BoundingBox {
        crate::geometry::BoundingBox::new(
            self.position.x,
            self.position.y,
            self.dimensions.width,
            self.dimensions.height,
        )
    }
}

/// The arena of all elements for one engine instance.
#[derive(Debug, Default)]
pub struct ElementArena {
    elements: Vec<Element>,
    roots: Vec<usize>,
}

impl ElementArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element and return its index.
    pub fn push(&mut self, element: Element) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// Insert a page-root element.
    pub fn push_root(&mut self, element: Element) -> usize {
        let idx = self.push(element);
        self.roots.push(idx);
        idx
    }

    pub fn add_child(&mut self, parent: usize, child: usize) {
        self.elements[parent].children.push(child);
    }

    pub fn get(&self, idx: usize) -> &Element {
        &self.elements[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Element {
        &mut self.elements[idx]
    }

    /// Page-root indices in the order pages were opened.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.roots.clear();
    }
}
