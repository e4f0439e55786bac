//! Selected-element bookkeeping and the temporary markers (outline,
//! in-place editing, resize handle) drawn on it.
//!
//! Chrome lives in the surface document while selected, but
//! [`SelectionChrome::revert`] can strip it from any copy of that document,
//! which is how snapshots and saves stay free of it.

use crate::classify::ElementClass;
use crate::surface::{Generation, ListenerId};
use pagecraft_dom::{Document, NodeId};

pub const SELECTION_OUTLINE: &str = "2px dashed #1e88e5";
pub const RESIZE_HANDLE_CLASS: &str = "pagecraft-resize-handle";

const RESIZE_HANDLE_STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("right", "-5px"),
    ("bottom", "-5px"),
    ("width", "10px"),
    ("height", "10px"),
    ("background", "#1e88e5"),
    ("cursor", "se-resize"),
];

/// A node handle that is only valid for the generation it was taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub generation: Generation,
    pub node: NodeId,
}

impl ElementRef {
    pub fn new(generation: Generation, node: NodeId) -> Self {
        Self { generation, node }
    }

    /// The node, if `current` is still the generation it came from
    pub fn resolve(&self, current: Generation) -> Option<NodeId> {
        (self.generation == current).then_some(self.node)
    }
}

/// Everything the editor added to the selected element
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChrome {
    pub element: ElementRef,
    pub class: ElementClass,
    /// Inline outline present before selection
    prior_outline: Option<String>,
    added_editable: bool,
    added_position: bool,
    handle: Option<NodeId>,
    /// Pending commit-on-focus-loss listener
    pub blur_listener: Option<ListenerId>,
}

impl SelectionChrome {
    /// Outline the element and, for text, make it editable in place
    pub fn apply(doc: &mut Document, element: ElementRef, class: ElementClass) -> Self {
        let node = element.node;
        let prior_outline = doc.style_property(node, "outline");
        doc.set_style_property(node, "outline", SELECTION_OUTLINE);

        let added_editable = class.is_text() && !doc.has_attribute(node, "contenteditable");
        if added_editable {
            doc.set_attribute(node, "contenteditable", "true");
        }

        Self {
            element,
            class,
            prior_outline,
            added_editable,
            added_position: false,
            handle: None,
            blur_listener: None,
        }
    }

    /// Add a resize handle to the element, removing any other handle in
    /// the document first
    pub fn attach_handle(&mut self, doc: &mut Document) -> NodeId {
        remove_stray_handles(doc);
        let node = self.element.node;

        let positioned = doc
            .style_property(node, "position")
            .map(|p| p != "static")
            .unwrap_or(false);
        if !positioned {
            doc.set_style_property(node, "position", "relative");
            self.added_position = true;
        }

        let handle = doc.create_element("div");
        doc.set_attribute(handle, "class", RESIZE_HANDLE_CLASS);
        for (property, value) in RESIZE_HANDLE_STYLE {
            doc.set_style_property(handle, property, value);
        }
        let void = doc
            .tag(node)
            .map(pagecraft_dom::is_void_element)
            .unwrap_or(false);
        if void {
            doc.insert_after(node, handle);
        } else {
            doc.append_child(node, handle);
        }

        self.handle = Some(handle);
        handle
    }

    pub fn handle(&self) -> Option<NodeId> {
        self.handle
    }

    /// Keep a user-applied `outline` or `position` when the chrome is
    /// reverted, while the live element keeps showing the selection
    pub fn adopt_style(&mut self, doc: &mut Document, property: &str, value: &str) {
        match property.trim().to_ascii_lowercase().as_str() {
            "outline" => {
                self.prior_outline = Some(value.trim().to_string());
                doc.set_style_property(self.element.node, "outline", SELECTION_OUTLINE);
            }
            "position" => self.added_position = false,
            _ => {}
        }
    }

    /// Undo every chrome change on `doc`. Safe to call on a clone of the
    /// document the chrome was applied to.
    pub fn revert(&self, doc: &mut Document) {
        let node = self.element.node;
        if !doc.contains(node) {
            return;
        }

        match &self.prior_outline {
            Some(outline) => {
                doc.set_style_property(node, "outline", outline);
            }
            None => {
                doc.remove_style_property(node, "outline");
            }
        }
        if self.added_editable {
            doc.remove_attribute(node, "contenteditable");
        }
        if self.added_position {
            doc.remove_style_property(node, "position");
        }
        if let Some(handle) = self.handle {
            doc.detach(handle);
        }
    }
}

/// Detach every resize handle in the document
pub fn remove_stray_handles(doc: &mut Document) -> usize {
    let handles: Vec<NodeId> = doc
        .descendants(doc.root())
        .into_iter()
        .filter(|n| doc.has_class(*n, RESIZE_HANDLE_CLASS))
        .collect();
    for handle in &handles {
        doc.detach(*handle);
    }
    handles.len()
}
