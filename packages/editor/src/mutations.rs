//! # Page Mutations
//!
//! Semantic edits applied to the surface document.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation is one user-level operation
//! 2. **Validated**: targets, class names and style values are checked
//!    before anything is touched
//! 3. **Snapshot-agnostic**: mutations never record history; the session
//!    commits a snapshot afterwards
//!
//! Style values are written into a `style="..."` attribute, so anything
//! that could break out of a declaration (`;`, braces, angle brackets,
//! quotes) is rejected instead of escaped.

use crate::surface::Point;
use pagecraft_dom::{Document, NodeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const FORBIDDEN_STYLE_CHARS: &[char] = &[';', '{', '}', '<', '>', '"'];

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Absolutely positioned editable text block appended to the body
    InsertTextBlock {
        at: Point,
        text: String,
        font_size: String,
        color: String,
    },

    /// Replace an element's content with plain text
    SetText { node: NodeId, text: String },

    AddClass { node: NodeId, class: String },

    RemoveClass { node: NodeId, class: String },

    /// Set one inline style declaration
    SetStyle {
        node: NodeId,
        property: String,
        value: String,
    },

    /// Set inline width and height in px
    Resize { node: NodeId, width: f64, height: f64 },

    /// Remove a node and its subtree
    RemoveNode { node: NodeId },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Node is not an element: {0:?}")]
    NotAnElement(NodeId),

    #[error("Structural node cannot be removed: {0:?}")]
    ProtectedNode(NodeId),

    #[error("Invalid class name: {0:?}")]
    InvalidClassName(String),

    #[error("Invalid style property: {0:?}")]
    InvalidStyleProperty(String),

    #[error("Invalid value {value:?} for style property {property}")]
    InvalidStyleValue { property: String, value: String },

    #[error("Invalid size {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
}

/// What an applied mutation produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationResult {
    /// Node created by the mutation, if any
    pub created: Option<NodeId>,
    /// False when the document already matched (e.g. class already present)
    pub changed: bool,
}

impl MutationResult {
    fn changed(changed: bool) -> Self {
        Self {
            created: None,
            changed,
        }
    }
}

impl Mutation {
    /// Apply mutation to the document with validation
    pub fn apply(&self, doc: &mut Document) -> Result<MutationResult, MutationError> {
        self.validate(doc)?;

        match self {
            Mutation::InsertTextBlock {
                at,
                text,
                font_size,
                color,
            } => {
                let block = doc.create_element("div");
                doc.set_attribute(block, "contenteditable", "true");
                doc.set_style_property(block, "position", "absolute");
                doc.set_style_property(block, "left", &px(at.x));
                doc.set_style_property(block, "top", &px(at.y));
                doc.set_style_property(block, "font-size", font_size);
                doc.set_style_property(block, "color", color);
                doc.set_text_content(block, text);
                let body = doc.body();
                doc.append_child(body, block);
                Ok(MutationResult {
                    created: Some(block),
                    changed: true,
                })
            }

            Mutation::SetText { node, text } => {
                let changed = doc.text_content(*node) != *text;
                if changed {
                    doc.set_text_content(*node, text);
                }
                Ok(MutationResult::changed(changed))
            }

            Mutation::AddClass { node, class } => {
                Ok(MutationResult::changed(doc.add_class(*node, class)))
            }

            Mutation::RemoveClass { node, class } => {
                Ok(MutationResult::changed(doc.remove_class(*node, class)))
            }

            Mutation::SetStyle {
                node,
                property,
                value,
            } => {
                let property = property.trim().to_ascii_lowercase();
                let value = value.trim();
                let changed = doc.style_property(*node, &property).as_deref() != Some(value);
                if changed {
                    doc.set_style_property(*node, &property, value);
                }
                Ok(MutationResult::changed(changed))
            }

            Mutation::Resize {
                node,
                width,
                height,
            } => {
                doc.set_style_property(*node, "width", &px(*width));
                doc.set_style_property(*node, "height", &px(*height));
                Ok(MutationResult::changed(true))
            }

            Mutation::RemoveNode { node } => {
                doc.detach(*node);
                Ok(MutationResult::changed(true))
            }
        }
    }

    /// Validate mutation without applying
    pub fn validate(&self, doc: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::InsertTextBlock {
                at,
                font_size,
                color,
                ..
            } => {
                if !at.x.is_finite() || !at.y.is_finite() {
                    return Err(MutationError::InvalidStyleValue {
                        property: "left".to_string(),
                        value: format!("{}, {}", at.x, at.y),
                    });
                }
                validate_style_value("font-size", font_size)?;
                validate_style_value("color", color)
            }

            Mutation::SetText { node, .. } => require_element(doc, *node),

            Mutation::AddClass { node, class } | Mutation::RemoveClass { node, class } => {
                require_element(doc, *node)?;
                validate_class_name(class)
            }

            Mutation::SetStyle {
                node,
                property,
                value,
            } => {
                require_element(doc, *node)?;
                validate_style_property(property)?;
                validate_style_value(property, value)
            }

            Mutation::Resize {
                node,
                width,
                height,
            } => {
                require_element(doc, *node)?;
                if !width.is_finite() || !height.is_finite() || *width < 0.0 || *height < 0.0 {
                    return Err(MutationError::InvalidSize {
                        width: *width,
                        height: *height,
                    });
                }
                Ok(())
            }

            Mutation::RemoveNode { node } => {
                if !doc.contains(*node) {
                    return Err(MutationError::NodeNotFound(*node));
                }
                if [doc.root(), doc.html(), doc.head(), doc.body()].contains(node) {
                    return Err(MutationError::ProtectedNode(*node));
                }
                Ok(())
            }
        }
    }

    /// Target node (if any)
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Mutation::InsertTextBlock { .. } => None,
            Mutation::SetText { node, .. }
            | Mutation::AddClass { node, .. }
            | Mutation::RemoveClass { node, .. }
            | Mutation::SetStyle { node, .. }
            | Mutation::Resize { node, .. }
            | Mutation::RemoveNode { node } => Some(*node),
        }
    }
}

fn px(value: f64) -> String {
    format!("{}px", value)
}

fn require_element(doc: &Document, node: NodeId) -> Result<(), MutationError> {
    if !doc.contains(node) {
        return Err(MutationError::NodeNotFound(node));
    }
    if !doc.is_element(node) {
        return Err(MutationError::NotAnElement(node));
    }
    Ok(())
}

pub fn validate_class_name(class: &str) -> Result<(), MutationError> {
    let valid = !class.is_empty()
        && !class
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '<' || c == '>');
    if valid {
        Ok(())
    } else {
        Err(MutationError::InvalidClassName(class.to_string()))
    }
}

pub fn validate_style_property(property: &str) -> Result<(), MutationError> {
    let property = property.trim();
    let valid = !property.is_empty()
        && property
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(MutationError::InvalidStyleProperty(property.to_string()))
    }
}

pub fn validate_style_value(property: &str, value: &str) -> Result<(), MutationError> {
    if value.trim().is_empty() || value.contains(FORBIDDEN_STYLE_CHARS) {
        return Err(MutationError::InvalidStyleValue {
            property: property.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}
