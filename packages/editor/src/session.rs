//! # Edit Session
//!
//! One user's editing of one page. The session owns the surface, the
//! history and every piece of transient UI state (active tool, selection,
//! resize drag, open panel). Host input arrives through the methods below;
//! surface events are only acted on when a listener for them is registered
//! on the current generation.
//!
//! A [`Handler::CommitOnBlur`] listener records in-place text edits when the
//! edited element loses focus. Every other edit commits as soon as it is
//! applied.

use crate::binding::{Binding, RebindCause, RebindOutcome};
use crate::classify::{classify, element_target, is_editable, ElementClass};
use crate::config::EditorConfig;
use crate::errors::{EditorError, SurfaceError};
use crate::history::History;
use crate::mutations::{Mutation, MutationResult};
use crate::resize::{Drag, DragState};
use crate::selection::{ElementRef, SelectionChrome, RESIZE_HANDLE_CLASS};
use crate::surface::{
    DocumentSurface, EventKind, Handler, HeadlessSurface, Listener, Point,
};
use crate::tools::{ToolMode, ToolState, ToolTransition};
use pagecraft_dom::{Document, NodeId};
use pagecraft_store::{PageKey, PageStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Installed when a page cannot be loaded
pub const DEFAULT_DOCUMENT: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Untitled page</title></head><body></body></html>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Panel {
    Style,
    Button,
}

/// User-facing status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved { page: String },
    SaveFailed { reason: String },
    LoadFailed { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Saved { page } => write!(f, "Saved {}", page),
            Notice::SaveFailed { reason } => write!(f, "Save failed: {}", reason),
            Notice::LoadFailed { reason } => {
                write!(f, "Could not load page, starting blank: {}", reason)
            }
        }
    }
}

/// What an input did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// No handler ran, or the handler had nothing to do
    Ignored,
    Inserted(NodeId),
    Selected(NodeId),
    SelectionCleared,
    /// A pending text edit was recorded
    Committed,
    ResizeStarted,
    Resized,
    ResizeEnded { committed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    Applied,
    AtOldest,
    AtNewest,
    /// Surface not ready; nothing moved
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The requested content is on the surface
    Requested,
    /// [`DEFAULT_DOCUMENT`] was installed instead
    Fallback,
}

/// Handler invocation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub editor_clicks: u64,
    pub blur_checks: u64,
    pub resize_events: u64,
    /// Events that reached no listener
    pub unhandled: u64,
}

pub struct EditorSession<S: DocumentSurface = HeadlessSurface> {
    surface: S,
    config: EditorConfig,
    history: History,
    tools: ToolState,
    binding: Binding,
    selection: Option<SelectionChrome>,
    focused: Option<ElementRef>,
    drag: DragState,
    panel: Option<Panel>,
    notice: Option<Notice>,
    /// Body snapshot last loaded or persisted
    saved_body: Option<String>,
    stats: DispatchStats,
}

impl EditorSession<HeadlessSurface> {
    pub fn headless(config: EditorConfig) -> Self {
        Self::new(HeadlessSurface::new(), config)
    }
}

impl<S: DocumentSurface> EditorSession<S> {
    pub fn new(surface: S, config: EditorConfig) -> Self {
        Self {
            surface,
            history: History::with_max_levels(config.history_limit),
            config,
            tools: ToolState::new(),
            binding: Binding::new(),
            selection: None,
            focused: None,
            drag: DragState::Idle,
            panel: None,
            notice: None,
            saved_body: None,
            stats: DispatchStats::default(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tool(&self) -> ToolMode {
        self.tools.active()
    }

    pub fn dispatch_stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn panel(&self) -> Option<Panel> {
        self.panel
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Selected element, if it belongs to the current content
    pub fn selected(&self) -> Option<NodeId> {
        self.live_selection().map(|chrome| chrome.element.node)
    }

    pub fn selected_class(&self) -> Option<ElementClass> {
        self.live_selection().map(|chrome| chrome.class)
    }

    /// Element that should hold keyboard focus
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
            .and_then(|element| element.resolve(self.surface.generation()))
    }

    pub fn has_unsaved_changes(&self) -> bool {
        match self.history.current() {
            Some(current) => self.saved_body.as_deref() != Some(current),
            None => false,
        }
    }

    /// The host should persist now
    pub fn should_autosave(&self) -> bool {
        self.config.save_on_commit && self.has_unsaved_changes()
    }

    fn live_selection(&self) -> Option<&SelectionChrome> {
        let generation = self.surface.generation();
        self.selection
            .as_ref()
            .filter(|chrome| chrome.element.resolve(generation).is_some())
    }

    // ---------------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------------

    fn clean_document(&self) -> Result<Document, SurfaceError> {
        let mut doc = self.surface.dom()?.clone();
        if let Some(chrome) = self.live_selection() {
            chrome.revert(&mut doc);
        }
        Ok(doc)
    }

    /// Body markup without editor chrome
    pub fn snapshot(&self) -> Result<String, EditorError> {
        Ok(self.clean_document()?.body_html())
    }

    /// Full document markup without editor chrome, as persisted
    pub fn document_markup(&self) -> Result<String, EditorError> {
        Ok(self.clean_document()?.to_html())
    }

    fn commit(&mut self) -> Result<(), EditorError> {
        let snapshot = self.snapshot()?;
        self.history.push(snapshot);
        debug!(
            entries = self.history.len(),
            cursor = ?self.history.cursor(),
            "Committed snapshot"
        );
        Ok(())
    }

    /// Commit only if the content differs from the current entry
    fn commit_if_changed(&mut self) -> Result<bool, EditorError> {
        let snapshot = self.snapshot()?;
        if self.history.current() == Some(snapshot.as_str()) {
            return Ok(false);
        }
        self.history.push(snapshot);
        debug!(entries = self.history.len(), "Committed changed snapshot");
        Ok(true)
    }

    fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let result = mutation.apply(self.surface.dom_mut()?)?;
        Ok(result)
    }

    fn apply_and_commit(&mut self, mutation: Mutation) -> Result<bool, EditorError> {
        let result = self.apply(mutation)?;
        if result.changed {
            self.commit()?;
        }
        Ok(result.changed)
    }

    // ---------------------------------------------------------------------
    // Loading and binding
    // ---------------------------------------------------------------------

    /// Show `markup` on the surface and restart history from it. Markup that
    /// cannot be parsed installs [`DEFAULT_DOCUMENT`] instead.
    pub fn load_document(&mut self, markup: &str) -> Result<LoadSource, EditorError> {
        self.discard_transient_state();
        match self.surface.replace_document(markup) {
            Ok(generation) => {
                info!(%generation, bytes = markup.len(), "Document loaded");
                self.rebind(RebindCause::Load)?;
                Ok(LoadSource::Requested)
            }
            Err(SurfaceError::Parse(err)) => {
                warn!(error = %err, "Unparseable document, using default");
                self.notice = Some(Notice::LoadFailed {
                    reason: err.to_string(),
                });
                self.install_fallback()
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a page from `store` and load it. A failed fetch installs
    /// [`DEFAULT_DOCUMENT`]. No input is processed while this is pending,
    /// since it holds the session mutably.
    pub async fn load_page<P>(&mut self, store: &P, key: &PageKey) -> Result<LoadSource, EditorError>
    where
        P: PageStore + ?Sized,
    {
        match store.load(key).await {
            Ok(markup) => self.load_document(&markup),
            Err(err) => {
                warn!(page = %key, error = %err, "Page load failed, using default");
                self.notice = Some(Notice::LoadFailed {
                    reason: err.to_string(),
                });
                self.discard_transient_state();
                self.install_fallback()
            }
        }
    }

    fn install_fallback(&mut self) -> Result<LoadSource, EditorError> {
        self.surface.replace_document(DEFAULT_DOCUMENT)?;
        self.rebind(RebindCause::Load)?;
        Ok(LoadSource::Fallback)
    }

    /// Attach the editor to the surface's current content. Repeated calls
    /// on the same generation do nothing.
    pub fn rebind(&mut self, cause: RebindCause) -> Result<RebindOutcome, EditorError> {
        let outcome = self.binding.bind(&mut self.surface)?;
        if outcome.is_fresh() {
            self.discard_transient_state();
            if cause == RebindCause::Load {
                let baseline = self.snapshot()?;
                self.saved_body = Some(baseline.clone());
                self.history.reset(baseline);
            }
        }
        Ok(outcome)
    }

    /// Forget state tied to the old content without touching the DOM
    fn discard_transient_state(&mut self) {
        self.selection = None;
        self.focused = None;
        self.drag = DragState::Idle;
    }

    // ---------------------------------------------------------------------
    // Tools and panels
    // ---------------------------------------------------------------------

    pub fn toggle_tool(&mut self, tool: ToolMode) -> Result<ToolTransition, EditorError> {
        let transition = self.tools.toggle(tool);
        if transition.deactivated().is_some() {
            self.release_tool()?;
        }
        info!(from = %transition.previous, to = %transition.current, "Tool changed");
        Ok(transition)
    }

    /// Drop selection, drag and panel
    fn release_tool(&mut self) -> Result<(), EditorError> {
        self.end_drag()?;
        self.clear_selection()?;
        self.panel = None;
        Ok(())
    }

    pub fn open_panel(&mut self, panel: Panel) {
        self.panel = Some(panel);
    }

    pub fn close_panel(&mut self) -> Option<Panel> {
        self.panel.take()
    }

    // ---------------------------------------------------------------------
    // Surface events
    // ---------------------------------------------------------------------

    /// Click at host-space `client` on `target`
    pub fn click(&mut self, target: NodeId, client: Point) -> Result<EventOutcome, EditorError> {
        self.dispatch(EventKind::Click, Some(target), client)
    }

    /// `target` lost keyboard focus
    pub fn focus_out(&mut self, target: NodeId) -> Result<EventOutcome, EditorError> {
        self.dispatch(EventKind::FocusOut, Some(target), Point::default())
    }

    pub fn pointer_down(&mut self, target: NodeId, client: Point) -> Result<EventOutcome, EditorError> {
        self.dispatch(EventKind::PointerDown, Some(target), client)
    }

    pub fn pointer_move(&mut self, client: Point) -> Result<EventOutcome, EditorError> {
        self.dispatch(EventKind::PointerMove, None, client)
    }

    pub fn pointer_up(&mut self, client: Point) -> Result<EventOutcome, EditorError> {
        self.dispatch(EventKind::PointerUp, None, client)
    }

    fn dispatch(
        &mut self,
        kind: EventKind,
        target: Option<NodeId>,
        client: Point,
    ) -> Result<EventOutcome, EditorError> {
        if !self.surface.is_ready() {
            warn!(?kind, "Event ignored, surface not ready");
            return Ok(EventOutcome::Ignored);
        }

        let generation = self.surface.generation();
        let listeners = self.surface.listeners_for(kind, target);
        if listeners.is_empty() {
            self.stats.unhandled += 1;
            debug!(?kind, "No listener for event");
            return Ok(EventOutcome::Ignored);
        }

        let mut outcome = EventOutcome::Ignored;
        for listener in listeners {
            let still_registered = self.surface.generation() == generation
                && self.surface.listeners().iter().any(|l| l.id == listener.id);
            if !still_registered {
                continue;
            }
            if listener.once {
                self.surface.remove_listener(listener.id);
            }
            let result = self.run_handler(listener, target, client)?;
            if result != EventOutcome::Ignored {
                outcome = result;
            }
        }
        Ok(outcome)
    }

    fn run_handler(
        &mut self,
        listener: Listener,
        target: Option<NodeId>,
        client: Point,
    ) -> Result<EventOutcome, EditorError> {
        match listener.handler {
            Handler::EditorClick => {
                self.stats.editor_clicks += 1;
                let target = target.unwrap_or(self.surface.dom()?.body());
                self.on_click(target, client)
            }
            Handler::CommitOnBlur => {
                self.stats.blur_checks += 1;
                self.on_blur(listener)
            }
            Handler::ResizeStart => {
                self.stats.resize_events += 1;
                self.on_resize_start(client)
            }
            Handler::ResizeMove => {
                self.stats.resize_events += 1;
                self.on_resize_move(client)
            }
            Handler::ResizeEnd => {
                self.stats.resize_events += 1;
                self.on_resize_end()
            }
        }
    }

    fn on_click(&mut self, target: NodeId, client: Point) -> Result<EventOutcome, EditorError> {
        match self.tools.active() {
            ToolMode::None => Ok(EventOutcome::Ignored),
            ToolMode::TextInsert => self.insert_text_block(client),
            ToolMode::Select => self.select(target),
        }
    }

    fn insert_text_block(&mut self, client: Point) -> Result<EventOutcome, EditorError> {
        let at = self.surface.geometry().to_local(client);
        let result = self.apply(Mutation::InsertTextBlock {
            at,
            text: self.config.placeholder_text.clone(),
            font_size: self.config.default_font_size.clone(),
            color: self.config.default_text_color.clone(),
        })?;
        let Some(block) = result.created else {
            return Ok(EventOutcome::Ignored);
        };

        self.surface
            .add_listener(EventKind::FocusOut, Some(block), Handler::CommitOnBlur, true)?;
        self.focused = Some(ElementRef::new(self.surface.generation(), block));
        self.commit()?;
        info!(x = at.x, y = at.y, "Inserted text block");

        if self.config.single_shot_insert {
            self.tools.deactivate();
            self.release_tool()?;
        }
        Ok(EventOutcome::Inserted(block))
    }

    fn select(&mut self, target: NodeId) -> Result<EventOutcome, EditorError> {
        let dom = self.surface.dom()?;
        let node = element_target(dom, target);
        if node.is_some_and(|n| dom.has_class(n, RESIZE_HANDLE_CLASS)) {
            return Ok(EventOutcome::Ignored);
        }
        let class = node.and_then(|n| classify(dom, n));

        self.clear_selection()?;
        let (Some(node), Some(class)) = (node, class) else {
            debug!(?target, "Click on unselectable node");
            return Ok(EventOutcome::SelectionCleared);
        };

        let element = ElementRef::new(self.surface.generation(), node);
        let dom = self.surface.dom_mut()?;
        let mut chrome = SelectionChrome::apply(dom, element, class);
        let handle = chrome.attach_handle(dom);
        self.surface
            .add_listener(EventKind::PointerDown, Some(handle), Handler::ResizeStart, false)?;

        if class.is_text() {
            let existing = self
                .surface
                .listeners()
                .iter()
                .find(|l| l.handler == Handler::CommitOnBlur && l.target == Some(node))
                .map(|l| l.id);
            let listener = match existing {
                Some(id) => id,
                None => self.surface.add_listener(
                    EventKind::FocusOut,
                    Some(node),
                    Handler::CommitOnBlur,
                    true,
                )?,
            };
            chrome.blur_listener = Some(listener);
            self.focused = Some(element);
        }

        debug!(?node, ?class, "Selected element");
        self.selection = Some(chrome);
        Ok(EventOutcome::Selected(node))
    }

    /// Remove chrome from the selected element and record any text typed
    /// into it
    fn clear_selection(&mut self) -> Result<bool, EditorError> {
        let Some(chrome) = self.selection.take() else {
            return Ok(false);
        };
        if chrome.element.resolve(self.surface.generation()).is_none() {
            return Ok(false);
        }

        if let Some(listener) = chrome.blur_listener {
            self.surface.remove_listener(listener);
        }
        if let Some(handle) = chrome.handle() {
            let stale: Vec<_> = self
                .surface
                .listeners()
                .iter()
                .filter(|l| l.target == Some(handle))
                .map(|l| l.id)
                .collect();
            for id in stale {
                self.surface.remove_listener(id);
            }
        }
        chrome.revert(self.surface.dom_mut()?);

        if self.focused == Some(chrome.element) {
            self.focused = None;
        }
        if chrome.class.is_text() {
            self.commit_if_changed()?;
        }
        Ok(true)
    }

    fn on_blur(&mut self, listener: Listener) -> Result<EventOutcome, EditorError> {
        if let Some(chrome) = self.selection.as_mut() {
            if chrome.blur_listener == Some(listener.id) {
                chrome.blur_listener = None;
            }
        }
        let generation = self.surface.generation();
        if let Some(target) = listener.target {
            if self.focused == Some(ElementRef::new(generation, target)) {
                self.focused = None;
            }
        }

        if self.commit_if_changed()? {
            Ok(EventOutcome::Committed)
        } else {
            Ok(EventOutcome::Ignored)
        }
    }

    /// Text typed into an element being edited in place. Not committed
    /// until the element loses focus.
    pub fn input_text(&mut self, target: NodeId, text: &str) -> Result<bool, EditorError> {
        if !self.surface.is_ready() {
            warn!("Text input ignored, surface not ready");
            return Ok(false);
        }
        let dom = self.surface.dom()?;
        let Some(node) = element_target(dom, target).filter(|n| is_editable(dom, *n)) else {
            debug!(?target, "Text input on non-editable node");
            return Ok(false);
        };

        let handle = self
            .live_selection()
            .and_then(|chrome| chrome.handle())
            .filter(|handle| dom.parent(*handle) == Some(node));

        let dom = self.surface.dom_mut()?;
        if let Some(handle) = handle {
            dom.detach(handle);
        }
        let result = Mutation::SetText {
            node,
            text: text.to_string(),
        }
        .apply(dom);
        if let Some(handle) = handle {
            dom.append_child(node, handle);
        }
        Ok(result?.changed)
    }

    // ---------------------------------------------------------------------
    // Resize
    // ---------------------------------------------------------------------

    fn on_resize_start(&mut self, client: Point) -> Result<EventOutcome, EditorError> {
        if self.drag.is_dragging() {
            return Ok(EventOutcome::Ignored);
        }
        let Some(element) = self.live_selection().map(|chrome| chrome.element) else {
            return Ok(EventOutcome::Ignored);
        };

        let start_size = self.surface.box_size(element.node)?;
        let start = self.surface.geometry().to_local(client);
        let move_listener =
            self.surface
                .add_listener(EventKind::PointerMove, None, Handler::ResizeMove, false)?;
        let up_listener =
            self.surface
                .add_listener(EventKind::PointerUp, None, Handler::ResizeEnd, true)?;

        self.drag = DragState::Dragging(Drag {
            element,
            start,
            start_size,
            moved: false,
            move_listener,
            up_listener,
        });
        debug!(node = ?element.node, ?start_size, "Resize started");
        Ok(EventOutcome::ResizeStarted)
    }

    fn on_resize_move(&mut self, client: Point) -> Result<EventOutcome, EditorError> {
        let Some(drag) = self.drag.drag().copied() else {
            return Ok(EventOutcome::Ignored);
        };
        let Some(node) = drag.element.resolve(self.surface.generation()) else {
            self.drag = DragState::Idle;
            return Ok(EventOutcome::Ignored);
        };

        let pointer = self.surface.geometry().to_local(client);
        let size = drag.size_at(pointer, self.config.min_resize_px);
        self.apply(Mutation::Resize {
            node,
            width: size.width,
            height: size.height,
        })?;
        if let Some(drag) = self.drag.drag_mut() {
            drag.moved = true;
        }
        Ok(EventOutcome::Resized)
    }

    fn on_resize_end(&mut self) -> Result<EventOutcome, EditorError> {
        if !self.drag.is_dragging() {
            return Ok(EventOutcome::Ignored);
        }
        let committed = self.end_drag()?;
        Ok(EventOutcome::ResizeEnded { committed })
    }

    /// Stop any drag, committing it if the element was resized
    fn end_drag(&mut self) -> Result<bool, EditorError> {
        let Some(drag) = self.drag.finish() else {
            return Ok(false);
        };
        if drag.element.resolve(self.surface.generation()).is_none() {
            return Ok(false);
        }
        self.surface.remove_listener(drag.move_listener);
        self.surface.remove_listener(drag.up_listener);
        if drag.moved {
            self.commit()?;
            debug!(node = ?drag.element.node, "Resize committed");
        }
        Ok(drag.moved)
    }

    // ---------------------------------------------------------------------
    // Styling
    // ---------------------------------------------------------------------

    pub fn apply_class(&mut self, class: &str) -> Result<bool, EditorError> {
        let Some(node) = self.selected() else {
            debug!("Class ignored, nothing selected");
            return Ok(false);
        };
        self.apply_and_commit(Mutation::AddClass {
            node,
            class: class.to_string(),
        })
    }

    pub fn remove_class(&mut self, class: &str) -> Result<bool, EditorError> {
        let Some(node) = self.selected() else {
            debug!("Class removal ignored, nothing selected");
            return Ok(false);
        };
        self.apply_and_commit(Mutation::RemoveClass {
            node,
            class: class.to_string(),
        })
    }

    /// Text color for text-bearing elements, background otherwise
    pub fn apply_color(&mut self, color: &str) -> Result<bool, EditorError> {
        let Some(class) = self.selected_class() else {
            debug!("Color ignored, nothing selected");
            return Ok(false);
        };
        self.apply_style(class.color_property(), color)
    }

    pub fn apply_style(&mut self, property: &str, value: &str) -> Result<bool, EditorError> {
        let Some(node) = self.selected() else {
            debug!("Style ignored, nothing selected");
            return Ok(false);
        };
        self.apply(Mutation::SetStyle {
            node,
            property: property.to_string(),
            value: value.to_string(),
        })?;

        // The live element carries selection chrome, so compare clean snapshots
        let dom = self.surface.dom_mut()?;
        if let Some(chrome) = self.selection.as_mut() {
            chrome.adopt_style(dom, property, value);
        }
        self.commit_if_changed()
    }

    pub fn delete_selected(&mut self) -> Result<bool, EditorError> {
        let Some(node) = self.selected() else {
            debug!("Delete ignored, nothing selected");
            return Ok(false);
        };
        self.end_drag()?;
        self.clear_selection()?;

        let dom = self.surface.dom()?;
        let doomed: Vec<_> = self
            .surface
            .listeners()
            .iter()
            .filter(|l| l.target.is_some_and(|t| dom.is_inclusive_ancestor(node, t)))
            .map(|l| l.id)
            .collect();
        for id in doomed {
            self.surface.remove_listener(id);
        }

        self.apply(Mutation::RemoveNode { node })?;
        self.focused = None;
        self.commit()?;
        info!(?node, "Deleted element");
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    pub fn undo(&mut self) -> Result<HistoryOutcome, EditorError> {
        if !self.surface.is_ready() {
            warn!("Undo ignored, surface not ready");
            return Ok(HistoryOutcome::Unavailable);
        }
        let Some(entry) = self.history.peek_undo().map(str::to_string) else {
            return Ok(HistoryOutcome::AtOldest);
        };
        self.restore(&entry)?;
        self.history.undo();
        debug!(cursor = ?self.history.cursor(), "Undo");
        Ok(HistoryOutcome::Applied)
    }

    pub fn redo(&mut self) -> Result<HistoryOutcome, EditorError> {
        if !self.surface.is_ready() {
            warn!("Redo ignored, surface not ready");
            return Ok(HistoryOutcome::Unavailable);
        }
        let Some(entry) = self.history.peek_redo().map(str::to_string) else {
            return Ok(HistoryOutcome::AtNewest);
        };
        self.restore(&entry)?;
        self.history.redo();
        debug!(cursor = ?self.history.cursor(), "Redo");
        Ok(HistoryOutcome::Applied)
    }

    fn restore(&mut self, body: &str) -> Result<(), EditorError> {
        self.discard_transient_state();
        self.surface.replace_body(body)?;
        self.rebind(RebindCause::History)?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    /// Persist the current document (chrome stripped). History is left
    /// untouched either way; failures also surface as a [`Notice`].
    pub async fn save_page<P>(&mut self, store: &P, key: &PageKey) -> Result<(), EditorError>
    where
        P: PageStore + ?Sized,
    {
        let markup = self.document_markup()?;
        match store.save(key, &markup).await {
            Ok(()) => {
                info!(page = %key, bytes = markup.len(), "Page saved");
                self.mark_saved(key.to_string());
                Ok(())
            }
            Err(err) => {
                warn!(page = %key, error = %err, "Page save failed");
                self.mark_save_failed(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Record a save the host performed itself (e.g. a browser fetch)
    pub fn mark_saved(&mut self, page: impl Into<String>) {
        self.saved_body = self.snapshot().ok();
        self.notice = Some(Notice::Saved { page: page.into() });
    }

    pub fn mark_save_failed(&mut self, reason: impl Into<String>) {
        self.notice = Some(Notice::SaveFailed {
            reason: reason.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_store::MemoryPageStore;

    const PAGE: &str = r#"<!DOCTYPE html><html><head><title>Home</title></head><body><h1>Welcome</h1><p>Intro</p><div class="card">Card</div></body></html>"#;

    fn session() -> EditorSession {
        let mut session = EditorSession::headless(EditorConfig::default());
        session.load_document(PAGE).unwrap();
        session
    }

    fn first(session: &EditorSession, tag: &str) -> NodeId {
        session.surface().dom().unwrap().elements_by_tag(tag)[0]
    }

    #[test]
    fn test_load_pushes_baseline() {
        let session = session();
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().cursor(), Some(0));
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn test_unparseable_document_falls_back() {
        let mut session = EditorSession::headless(EditorConfig::default());
        let source = session.load_document("<body><div class=\"x\"").unwrap();

        assert_eq!(source, LoadSource::Fallback);
        assert_eq!(session.surface().read_body().unwrap(), "");
        assert!(matches!(session.notice(), Some(Notice::LoadFailed { .. })));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_clicks_without_tool_do_nothing() {
        let mut session = session();
        let p = first(&session, "p");
        let outcome = session.click(p, Point::new(5.0, 5.0)).unwrap();

        assert_eq!(outcome, EventOutcome::Ignored);
        assert_eq!(session.dispatch_stats().editor_clicks, 1);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_events_before_load_are_ignored() {
        let mut session = EditorSession::headless(EditorConfig::default());
        assert_eq!(
            session.click(NodeId::from_index(0), Point::default()).unwrap(),
            EventOutcome::Ignored
        );
        assert_eq!(session.undo().unwrap(), HistoryOutcome::Unavailable);
        assert!(!session.input_text(NodeId::from_index(0), "x").unwrap());
    }

    #[test]
    fn test_select_marks_text_editable() {
        let mut session = session();
        session.toggle_tool(ToolMode::Select).unwrap();
        let p = first(&session, "p");

        assert_eq!(
            session.click(p, Point::default()).unwrap(),
            EventOutcome::Selected(p)
        );
        let dom = session.surface().dom().unwrap();
        assert!(is_editable(dom, p));
        assert_eq!(session.focused(), Some(p));
        assert_eq!(session.snapshot().unwrap(), session.history().current().unwrap());
    }

    #[test]
    fn test_click_on_body_clears_selection() {
        let mut session = session();
        session.toggle_tool(ToolMode::Select).unwrap();
        let p = first(&session, "p");
        session.click(p, Point::default()).unwrap();

        let body = session.surface().dom().unwrap().body();
        assert_eq!(
            session.click(body, Point::default()).unwrap(),
            EventOutcome::SelectionCleared
        );
        assert_eq!(session.selected(), None);
        assert!(!is_editable(session.surface().dom().unwrap(), p));
    }

    #[test]
    fn test_switching_tool_releases_selection_and_panel() {
        let mut session = session();
        session.toggle_tool(ToolMode::Select).unwrap();
        let card = first(&session, "div");
        session.click(card, Point::default()).unwrap();
        session.open_panel(Panel::Style);

        session.toggle_tool(ToolMode::TextInsert).unwrap();

        assert_eq!(session.selected(), None);
        assert_eq!(session.panel(), None);
        assert_eq!(
            session.surface().read_body().unwrap(),
            session.history().current().unwrap()
        );
    }

    #[test]
    fn test_color_goes_to_background_for_containers() {
        let mut session = session();
        session.toggle_tool(ToolMode::Select).unwrap();
        let card = first(&session, "div");
        session.click(card, Point::default()).unwrap();

        assert!(session.apply_color("#ff0000").unwrap());
        let dom = session.surface().dom().unwrap();
        assert_eq!(
            dom.style_property(card, "background-color").as_deref(),
            Some("#ff0000")
        );
        assert!(session
            .history()
            .current()
            .unwrap()
            .contains(r#"<div class="card" style="background-color: #ff0000">Card</div>"#));
    }

    #[test]
    fn test_invalid_style_rejected_without_commit() {
        let mut session = session();
        session.toggle_tool(ToolMode::Select).unwrap();
        let p = first(&session, "p");
        session.click(p, Point::default()).unwrap();

        let err = session.apply_style("color", "red; position: fixed").unwrap_err();
        assert!(matches!(
            err,
            EditorError::Mutation(crate::mutations::MutationError::InvalidStyleValue { .. })
        ));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_user_outline_survives_selection_chrome() {
        let mut session = session();
        session.toggle_tool(ToolMode::Select).unwrap();
        let card = first(&session, "div");
        session.click(card, Point::default()).unwrap();

        session.apply_style("outline", "1px solid red").unwrap();
        assert_eq!(
            session.surface().dom().unwrap().style_property(card, "outline").as_deref(),
            Some(crate::selection::SELECTION_OUTLINE)
        );
        assert!(session
            .snapshot()
            .unwrap()
            .contains(r#"style="outline: 1px solid red""#));
    }

    #[test]
    fn test_position_matching_chrome_still_commits() {
        let mut session = session();
        session.toggle_tool(ToolMode::Select).unwrap();
        let card = first(&session, "div");
        session.click(card, Point::default()).unwrap();

        assert!(session.apply_style("position", "relative").unwrap());
        assert_eq!(session.history().len(), 2);
        assert_eq!(
            session.history().current(),
            Some(session.snapshot().unwrap().as_str())
        );
        assert!(session
            .snapshot()
            .unwrap()
            .contains(r#"<div class="card" style="position: relative">Card</div>"#));

        session.undo().unwrap();
        assert!(!session.snapshot().unwrap().contains("position"));
    }

    #[test]
    fn test_reapplying_existing_outline_is_not_committed() {
        let mut session = EditorSession::headless(EditorConfig::default());
        session
            .load_document(r#"<body><div style="outline: 1px solid black">box</div></body>"#)
            .unwrap();
        session.toggle_tool(ToolMode::Select).unwrap();
        let div = first(&session, "div");
        session.click(div, Point::default()).unwrap();

        assert!(!session.apply_style("outline", "1px solid black").unwrap());
        assert_eq!(session.history().len(), 1);
        assert_eq!(
            session.snapshot().unwrap(),
            r#"<div style="outline: 1px solid black">box</div>"#
        );
    }

    #[test]
    fn test_delete_selected() {
        let mut session = session();
        session.toggle_tool(ToolMode::Select).unwrap();
        let h1 = first(&session, "h1");
        session.click(h1, Point::default()).unwrap();

        assert!(session.delete_selected().unwrap());
        assert_eq!(session.selected(), None);
        assert!(!session.history().current().unwrap().contains("Welcome"));
        assert_eq!(session.history().len(), 2);
        assert!(session
            .surface()
            .listeners()
            .iter()
            .all(|l| l.handler == Handler::EditorClick));
    }

    #[test]
    fn test_style_ops_without_selection_are_noops() {
        let mut session = session();
        assert!(!session.apply_class("btn").unwrap());
        assert!(!session.apply_color("red").unwrap());
        assert!(!session.delete_selected().unwrap());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_resize_drag_commits_once() {
        let mut session = session();
        session.toggle_tool(ToolMode::Select).unwrap();
        let card = first(&session, "div");
        session.click(card, Point::default()).unwrap();
        session.apply_style("width", "100px").unwrap();
        session.apply_style("height", "50px").unwrap();
        let before = session.history().len();

        let handle = {
            let dom = session.surface().dom().unwrap();
            dom.children(card)
                .iter()
                .copied()
                .find(|n| dom.has_class(*n, RESIZE_HANDLE_CLASS))
                .unwrap()
        };
        assert_eq!(
            session.pointer_down(handle, Point::new(200.0, 200.0)).unwrap(),
            EventOutcome::ResizeStarted
        );
        session.pointer_move(Point::new(220.0, 210.0)).unwrap();
        session.pointer_move(Point::new(250.0, 100.0)).unwrap();
        assert_eq!(
            session.pointer_up(Point::new(250.0, 100.0)).unwrap(),
            EventOutcome::ResizeEnded { committed: true }
        );

        let dom = session.surface().dom().unwrap();
        assert_eq!(dom.style_property(card, "width").as_deref(), Some("150px"));
        assert_eq!(dom.style_property(card, "height").as_deref(), Some("10px"));
        assert_eq!(session.history().len(), before + 1);
        assert!(!session.is_dragging());

        // Move listeners are gone after the drag
        assert_eq!(
            session.pointer_move(Point::new(0.0, 0.0)).unwrap(),
            EventOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn test_save_persists_clean_document() {
        let mut session = session();
        session.toggle_tool(ToolMode::Select).unwrap();
        let p = first(&session, "p");
        session.click(p, Point::default()).unwrap();
        session.apply_class("lead").unwrap();

        let store = MemoryPageStore::new();
        let key = PageKey::new("home.html").unwrap();
        session.save_page(&store, &key).await.unwrap();
        assert!(!session.has_unsaved_changes());
        assert!(matches!(session.notice(), Some(Notice::Saved { .. })));

        let saved = store.load(&key).await.unwrap();
        assert!(saved.starts_with("<!DOCTYPE html>"));
        assert!(saved.contains(r#"<p class="lead">Intro</p>"#));
        assert!(!saved.contains("outline"));
    }
}
