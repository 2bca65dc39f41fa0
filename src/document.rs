//! # JSON Document Façade
//!
//! A serde-describable document tree that compiles onto the builder.
//! This is the convenience entry for hosts that produce layout trees as
//! data (a template engine, a reconciler, a pipe from another process)
//! rather than through builder calls.

use serde::{Deserialize, Serialize};

use crate::builder::{Engine, EngineOptions, NodeConfig, RenderOutput};
use crate::error::GalleyError;
use crate::tree::ElementKind;

/// A complete document ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub options: EngineOptions,
    pub pages: Vec<Page>,
}

/// One page and its content subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Page size override; the engine default applies when absent.
    #[serde(default)]
    pub size: Option<PageSize>,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// A node in the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Rectangle {
        #[serde(default)]
        config: NodeConfig,
        #[serde(default)]
        children: Vec<Node>,
    },
    Circle {
        #[serde(default)]
        config: NodeConfig,
        #[serde(default)]
        children: Vec<Node>,
    },
    Text {
        content: String,
        #[serde(default)]
        config: NodeConfig,
    },
    Image {
        source: String,
        #[serde(default)]
        config: NodeConfig,
    },
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self, GalleyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compile the document onto a fresh engine with default ports.
    pub fn into_engine(self) -> Result<Engine, GalleyError> {
        let mut engine = Engine::new(self.options)?;
        for page in &self.pages {
            match page.size {
                Some(size) => engine.open_page_sized(size.width, size.height)?,
                None => engine.open_page()?,
            }
            for node in &page.children {
                build_node(&mut engine, node)?;
            }
        }
        Ok(engine)
    }
}

fn build_node(engine: &mut Engine, node: &Node) -> Result<(), GalleyError> {
    match node {
        Node::Rectangle { config, children } => {
            engine.open_container(ElementKind::Rectangle, config.clone())?;
            for child in children {
                build_node(engine, child)?;
            }
            engine.close_container()
        }
        Node::Circle { config, children } => {
            engine.open_container(ElementKind::Circle, config.clone())?;
            for child in children {
                build_node(engine, child)?;
            }
            engine.close_container()
        }
        Node::Text { content, config } => engine.text(content, config.clone()),
        Node::Image { source, config } => engine.image(source, config.clone()),
    }
}

/// Render a document described as JSON with the default ports.
pub fn render_json(json: &str) -> Result<RenderOutput, GalleyError> {
    let mut engine = Document::from_json(json)?.into_engine()?;
    engine.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandPayload;

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            Document::from_json("{not json"),
            Err(GalleyError::ParseError { .. })
        ));
    }

    #[test]
    fn test_minimal_document_renders() {
        let json = r##"{
            "options": { "pageWidthPt": 100, "pageHeightPt": 100 },
            "pages": [
                {
                    "children": [
                        {
                            "type": "rectangle",
                            "config": {
                                "width": { "type": "grow", "min": 0, "max": 100000 },
                                "height": { "type": "fixed", "value": 40 },
                                "fillColor": "#336699"
                            },
                            "children": [
                                { "type": "text", "content": "hello", "config": { "fontSize": 10 } }
                            ]
                        }
                    ]
                }
            ]
        }"##;
        let output = render_json(json).unwrap();
        assert!(output
            .commands
            .iter()
            .any(|c| matches!(c.payload, CommandPayload::Rectangle { .. })));
        assert!(output
            .commands
            .iter()
            .any(|c| matches!(c.payload, CommandPayload::Text { .. })));
    }

    #[test]
    fn test_page_size_override() {
        let json = r#"{
            "pages": [
                { "size": { "width": 50, "height": 60 }, "children": [] }
            ]
        }"#;
        let engine = Document::from_json(json).unwrap().into_engine().unwrap();
        let root = engine.arena().roots()[0];
        // Page root carries the per-page fixed sizing.
        assert_eq!(
            engine.arena().get(root).config.sizing.width,
            crate::geometry::SizingAxis::fixed(50.0)
        );
    }
}
