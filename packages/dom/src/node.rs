//! # Document Tree
//!
//! Arena-backed HTML document. Nodes are addressed by [`NodeId`]; removing a
//! node detaches it from its parent but leaves it in the arena, so ids are
//! never reused within one `Document`.
//!
//! Text and attribute values are stored as raw markup (see [`crate::escape`]).

use crate::escape::{decode_entities, escape_attr, escape_text};
use crate::style::InlineStyle;
use serde::{Deserialize, Serialize};

/// Elements that never have children or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Index of a node inside its owning [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Rebuild an id from [`NodeId::index`]. Lookups with an id that does not
    /// belong to the document return `None`.
    pub fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Raw value as it appears between double quotes
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic document root; parent of `<html>`
    Root,
    Element(ElementData),
    /// Raw text markup
    Text(String),
    /// Comment body without the `<!--` / `-->` delimiters
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// A complete HTML document: optional doctype plus `html`/`head`/`body`
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    pub(crate) doctype: Option<String>,
    pub(crate) html: NodeId,
    pub(crate) head: NodeId,
    pub(crate) body: NodeId,
}

impl Document {
    /// Empty `<html><head></head><body></body></html>` document
    pub fn new() -> Self {
        let mut doc = Self::bare();
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(doc.root, html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc.html = html;
        doc.head = head;
        doc.body = body;
        doc
    }

    /// Root-only arena used by the parser before the tree is normalized
    pub(crate) fn bare() -> Self {
        let root = NodeId(0);
        Self {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            }],
            root,
            doctype: None,
            html: root,
            head: root,
            body: root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn html(&self) -> NodeId {
        self.html
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Number of nodes in the arena (attached or not)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index())
    }

    fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.index())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.data(id).map(|d| &d.kind)
    }

    // ---------------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }))
    }

    /// Create a text node from plain text (escaped on the way in)
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(escape_text(text)))
    }

    pub(crate) fn create_raw_text(&mut self, raw: &str) -> NodeId {
        self.push(NodeKind::Text(raw.to_string()))
    }

    /// Append raw markup to an existing text node; false if `id` is not text
    pub(crate) fn push_raw_text(&mut self, id: NodeId, raw: &str) -> bool {
        match self.data_mut(id).map(|d| &mut d.kind) {
            Some(NodeKind::Text(existing)) => {
                existing.push_str(raw);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn create_comment(&mut self, body: &str) -> NodeId {
        self.push(NodeKind::Comment(body.to_string()))
    }

    pub(crate) fn push_raw_attribute(&mut self, id: NodeId, name: String, value: String) {
        if let Some(NodeKind::Element(el)) = self.data_mut(id).map(|d| &mut d.kind) {
            if !el.attributes.iter().any(|a| a.name == name) {
                el.attributes.push(Attribute { name, value });
            }
        }
    }

    // ---------------------------------------------------------------------
    // Tree structure
    // ---------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).and_then(|d| d.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.data(id).map(|d| d.children.as_slice()).unwrap_or(&[])
    }

    /// Detach `child` from wherever it is and append it to `parent`.
    /// Refuses to create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.contains(parent) || !self.contains(child) || self.is_inclusive_ancestor(child, parent) {
            return false;
        }
        self.detach(child);
        if let Some(p) = self.data_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.data_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Insert `child` directly after `reference` under the same parent
    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> bool {
        let Some(parent) = self.parent(reference) else {
            return false;
        };
        if !self.contains(child) || self.is_inclusive_ancestor(child, parent) {
            return false;
        }
        self.detach(child);
        let Some(p) = self.data_mut(parent) else {
            return false;
        };
        let pos = p
            .children
            .iter()
            .position(|&c| c == reference)
            .map(|i| i + 1)
            .unwrap_or(p.children.len());
        p.children.insert(pos, child);
        if let Some(c) = self.data_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    pub(crate) fn insert_child_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        if let Some(p) = self.data_mut(parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, child);
        }
        if let Some(c) = self.data_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Remove a node from its parent. The node (and its subtree) stays in
    /// the arena but is no longer attached.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.data_mut(parent) {
            p.children.retain(|&c| c != id);
        }
        if let Some(d) = self.data_mut(id) {
            d.parent = None;
        }
    }

    /// True if `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// True if the node is reachable from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(id) && self.is_inclusive_ancestor(self.root, id)
    }

    /// Pre-order traversal of `id`'s subtree, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Attached elements with the given tag, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&n| self.tag(n) == Some(tag))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Elements
    // ---------------------------------------------------------------------

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id)? {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.data_mut(id).map(|d| &mut d.kind)? {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Raw attribute value as stored in markup
    pub fn attribute_raw(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Decoded attribute value
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.attribute_raw(id, name).map(decode_entities)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute_raw(id, name).is_some()
    }

    /// Set an attribute from a plain value. Existing attributes keep their
    /// position; new ones are appended.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let name = name.to_ascii_lowercase();
        let raw = escape_attr(value);
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        match el.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = raw,
            None => el.attributes.push(Attribute { name, value: raw }),
        }
        true
    }

    /// Remove an attribute, returning its decoded value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let el = self.element_mut(id)?;
        let pos = el
            .attributes
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(decode_entities(&el.attributes.remove(pos).value))
    }

    // ---------------------------------------------------------------------
    // Inline style
    // ---------------------------------------------------------------------

    pub fn style(&self, id: NodeId) -> InlineStyle {
        self.attribute(id, "style")
            .map(|s| InlineStyle::parse(&s))
            .unwrap_or_default()
    }

    pub fn set_style(&mut self, id: NodeId, style: &InlineStyle) -> bool {
        if style.is_empty() {
            self.remove_attribute(id, "style");
            self.is_element(id)
        } else {
            self.set_attribute(id, "style", &style.to_css())
        }
    }

    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        self.style(id).get(property).map(str::to_string)
    }

    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) -> bool {
        if !self.is_element(id) {
            return false;
        }
        let mut style = self.style(id);
        style.set(property, value);
        self.set_style(id, &style)
    }

    /// Remove one declaration, returning its previous value
    pub fn remove_style_property(&mut self, id: NodeId, property: &str) -> Option<String> {
        let mut style = self.style(id);
        let previous = style.remove(property)?;
        self.set_style(id, &style);
        Some(previous)
    }

    // ---------------------------------------------------------------------
    // Classes
    // ---------------------------------------------------------------------

    pub fn classes(&self, id: NodeId) -> Vec<String> {
        self.attribute(id, "class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    /// Add a class; returns false if it was already present
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        let mut classes = self.classes(id);
        if classes.iter().any(|c| c == class) || !self.is_element(id) {
            return false;
        }
        classes.push(class.to_string());
        self.set_attribute(id, "class", &classes.join(" "))
    }

    /// Remove a class; returns false if it was not present
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        let mut classes = self.classes(id);
        let before = classes.len();
        classes.retain(|c| c != class);
        if classes.len() == before {
            return false;
        }
        if classes.is_empty() {
            self.remove_attribute(id, "class");
        } else {
            self.set_attribute(id, "class", &classes.join(" "));
        }
        true
    }

    // ---------------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------------

    /// Decoded concatenation of all descendant text
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text(raw)) = self.kind(id) {
            return decode_entities(raw);
        }
        for n in self.descendants(id) {
            if let Some(NodeKind::Text(raw)) = self.kind(n) {
                out.push_str(&decode_entities(raw));
            }
        }
        out
    }

    /// Replace all children of `id` with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> bool {
        if !self.is_element(id) {
            return false;
        }
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        if !text.is_empty() {
            let t = self.create_text(text);
            self.append_child(id, t);
        }
        true
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
