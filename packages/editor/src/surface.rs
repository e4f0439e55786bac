//! # Document Surface
//!
//! The isolated document the user edits. The editor never holds DOM node
//! handles across a content replacement: every replacement bumps the
//! surface [`Generation`] and drops every listener registered on the old
//! content.
//!
//! [`HeadlessSurface`] keeps the document in memory. A browser host
//! implements [`DocumentSurface`] over its iframe instead.

use crate::errors::SurfaceError;
use pagecraft_dom::{parse_document, Document, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content identity. Incremented on every document/body replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Placement of the surface inside the host viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    /// Host-space position of the surface's top-left corner
    pub origin: Point,
    /// Surface scroll offset
    pub scroll: Point,
    pub zoom: f64,
}

impl SurfaceGeometry {
    /// Convert a host-space point to surface-local document coordinates
    pub fn to_local(&self, client: Point) -> Point {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        Point {
            x: (client.x - self.origin.x) / zoom + self.scroll.x,
            y: (client.y - self.origin.y) / zoom + self.scroll.y,
        }
    }
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self {
            origin: Point::default(),
            scroll: Point::default(),
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Click,
    FocusOut,
    PointerDown,
    PointerMove,
    PointerUp,
}

/// Editor behavior a listener routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// Tool-dependent click handling on the whole document
    EditorClick,
    /// Commit an in-place text edit when the element loses focus
    CommitOnBlur,
    ResizeStart,
    ResizeMove,
    ResizeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listener {
    pub id: ListenerId,
    pub kind: EventKind,
    /// `None` listens on the whole document
    pub target: Option<NodeId>,
    pub handler: Handler,
    /// Removed before its first dispatch
    pub once: bool,
}

pub trait DocumentSurface {
    /// Whether a document is loaded and reachable
    fn is_ready(&self) -> bool;

    fn generation(&self) -> Generation;

    /// Replace the whole document. Bumps the generation on success and
    /// leaves the surface untouched on failure.
    fn replace_document(&mut self, markup: &str) -> Result<Generation, SurfaceError>;

    /// Replace only the body content, keeping head and doctype
    fn replace_body(&mut self, body: &str) -> Result<Generation, SurfaceError>;

    fn dom(&self) -> Result<&Document, SurfaceError>;

    fn dom_mut(&mut self) -> Result<&mut Document, SurfaceError>;

    fn geometry(&self) -> SurfaceGeometry;

    /// Rendered size of an element
    fn box_size(&self, node: NodeId) -> Result<Size, SurfaceError>;

    fn add_listener(
        &mut self,
        kind: EventKind,
        target: Option<NodeId>,
        handler: Handler,
        once: bool,
    ) -> Result<ListenerId, SurfaceError>;

    fn remove_listener(&mut self, id: ListenerId) -> bool;

    /// Listeners attached to the current content
    fn listeners(&self) -> &[Listener];

    fn read_document(&self) -> Result<String, SurfaceError> {
        Ok(self.dom()?.to_html())
    }

    fn read_body(&self) -> Result<String, SurfaceError> {
        Ok(self.dom()?.body_html())
    }

    /// Listeners that an event of `kind` on `target` reaches, in
    /// registration order. Element listeners also see events from their
    /// descendants.
    fn listeners_for(&self, kind: EventKind, target: Option<NodeId>) -> Vec<Listener> {
        let dom = self.dom().ok();
        self.listeners()
            .iter()
            .filter(|l| l.kind == kind)
            .filter(|l| match (l.target, target, dom) {
                (None, _, _) => true,
                (Some(on), Some(hit), Some(dom)) => dom.is_inclusive_ancestor(on, hit),
                _ => false,
            })
            .copied()
            .collect()
    }
}

/// In-memory surface
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    document: Option<Document>,
    generation: Generation,
    geometry: SurfaceGeometry,
    listeners: Vec<Listener>,
    next_listener: u64,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface already holding `markup`
    pub fn with_document(markup: &str) -> Result<Self, SurfaceError> {
        let mut surface = Self::new();
        surface.replace_document(markup)?;
        Ok(surface)
    }

    pub fn set_geometry(&mut self, geometry: SurfaceGeometry) {
        self.geometry = geometry;
    }

    fn install(&mut self, document: Document) -> Generation {
        self.document = Some(document);
        self.listeners.clear();
        self.generation = self.generation.next();
        self.generation
    }
}

fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .trim()
        .parse::<f64>()
        .ok()
}

impl DocumentSurface for HeadlessSurface {
    fn is_ready(&self) -> bool {
        self.document.is_some()
    }

    fn generation(&self) -> Generation {
        self.generation
    }

    fn replace_document(&mut self, markup: &str) -> Result<Generation, SurfaceError> {
        let document = parse_document(markup)?;
        Ok(self.install(document))
    }

    fn replace_body(&mut self, body: &str) -> Result<Generation, SurfaceError> {
        let current = self.document.as_ref().ok_or(SurfaceError::Unavailable)?;
        let document = parse_document(&current.markup_with_body(body))?;
        Ok(self.install(document))
    }

    fn dom(&self) -> Result<&Document, SurfaceError> {
        self.document.as_ref().ok_or(SurfaceError::Unavailable)
    }

    fn dom_mut(&mut self) -> Result<&mut Document, SurfaceError> {
        self.document.as_mut().ok_or(SurfaceError::Unavailable)
    }

    fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    /// No layout engine here: the declared inline size wins, then
    /// `width`/`height` attributes, then zero.
    fn box_size(&self, node: NodeId) -> Result<Size, SurfaceError> {
        let dom = self.dom()?;
        let style = dom.style(node);
        let measure = |property: &str| {
            style
                .get(property)
                .and_then(parse_px)
                .or_else(|| dom.attribute(node, property).as_deref().and_then(parse_px))
                .unwrap_or(0.0)
        };
        Ok(Size {
            width: measure("width"),
            height: measure("height"),
        })
    }

    fn add_listener(
        &mut self,
        kind: EventKind,
        target: Option<NodeId>,
        handler: Handler,
        once: bool,
    ) -> Result<ListenerId, SurfaceError> {
        let dom = self.dom()?;
        if let Some(node) = target {
            if !dom.contains(node) {
                return Err(SurfaceError::Unavailable);
            }
        }

        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Listener {
            id,
            kind,
            target,
            handler,
            once,
        });
        Ok(id)
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    fn listeners(&self) -> &[Listener] {
        &self.listeners
    }
}
