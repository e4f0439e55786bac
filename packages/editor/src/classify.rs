//! Decides what a click in Select mode may grab, and how it behaves once
//! grabbed.

use pagecraft_dom::{Document, NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// Text-bearing tags that become editable in place when selected
pub const TEXT_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "a", "label", "strong", "em", "b", "i",
    "u", "small", "blockquote", "figcaption", "li", "td", "th",
];

/// Layout tags selectable as a whole
pub const CONTAINER_TAGS: &[&str] = &[
    "div", "section", "article", "header", "footer", "main", "aside", "nav", "figure", "form",
    "ul", "ol", "table",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementClass {
    PlainContainer,
    TextEditable,
    Image,
    Button,
}

impl ElementClass {
    /// Text-bearing elements get `color`, everything else `background-color`
    pub fn color_property(self) -> &'static str {
        match self {
            ElementClass::TextEditable => "color",
            _ => "background-color",
        }
    }

    pub fn is_text(self) -> bool {
        self == ElementClass::TextEditable
    }
}

/// Closest element at or above `node`. Text and comment nodes resolve to
/// their parent.
pub fn element_target(doc: &Document, node: NodeId) -> Option<NodeId> {
    match doc.kind(node)? {
        NodeKind::Element(_) => Some(node),
        NodeKind::Text(_) | NodeKind::Comment(_) => doc.parent(node).filter(|p| doc.is_element(*p)),
        NodeKind::Root => None,
    }
}

/// `None` means the node cannot be selected. Structural elements
/// (`html`, `head`, `body`) never qualify.
pub fn classify(doc: &Document, node: NodeId) -> Option<ElementClass> {
    if node == doc.html() || node == doc.head() || node == doc.body() {
        return None;
    }
    let tag = doc.tag(node)?;

    if tag == "img" || tag == "svg" || tag == "picture" {
        return Some(ElementClass::Image);
    }
    if is_button(doc, node, tag) {
        return Some(ElementClass::Button);
    }
    if is_editable(doc, node) || TEXT_TAGS.contains(&tag) {
        return Some(ElementClass::TextEditable);
    }
    if CONTAINER_TAGS.contains(&tag) {
        return Some(ElementClass::PlainContainer);
    }
    None
}

/// Carries a `contenteditable` marker other than `"false"`
pub fn is_editable(doc: &Document, node: NodeId) -> bool {
    doc.attribute(node, "contenteditable")
        .map(|v| !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}

fn is_button(doc: &Document, node: NodeId, tag: &str) -> bool {
    if tag == "button" || doc.attribute(node, "role").as_deref() == Some("button") {
        return true;
    }
    tag == "input"
        && matches!(
            doc.attribute(node, "type")
                .map(|t| t.to_ascii_lowercase())
                .as_deref(),
            Some("button" | "submit" | "reset")
        )
}
