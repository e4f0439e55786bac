//! # Pagecraft Editor
//!
//! Editing core for the pagecraft visual page editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: pointer/keyboard input, toolbar       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditorSession                       │
//! │  - tool modes (text insert, select)         │
//! │  - selection, styling, resize               │
//! │  - snapshot history (undo/redo)             │
//! │  - rebind after every content replacement   │
//! └─────────────────────────────────────────────┘
//!          ↓                          ↓
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ surface: DOM + events│  │ store: load / save   │
//! └──────────────────────┘  └──────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshots are the unit of history**: every committed edit stores the
//!    serialized body; undo/redo swap it back in wholesale
//! 2. **Generations, not handles**: node ids and listeners are only valid
//!    for the surface generation they were taken in
//! 3. **Chrome never persists**: selection outlines, in-place editing
//!    markers and the resize handle are stripped from snapshots and saves
//!
//! ## Usage
//!
//! ```rust
//! use pagecraft_editor::{DocumentSurface, EditorConfig, EditorSession, Point, ToolMode};
//!
//! let mut session = EditorSession::headless(EditorConfig::default());
//! session.load_document("<html><body></body></html>")?;
//!
//! session.toggle_tool(ToolMode::TextInsert)?;
//! let body = session.surface().dom()?.body();
//! session.click(body, Point::new(50.0, 50.0))?;
//!
//! assert_eq!(session.history().len(), 2);
//! session.undo()?;
//! assert_eq!(session.surface().read_body()?, "");
//! # Ok::<(), pagecraft_editor::EditorError>(())
//! ```

mod binding;
mod classify;
mod config;
mod errors;
mod history;
mod mutations;
mod resize;
mod selection;
mod session;
mod surface;
mod tools;

pub use binding::{Binding, RebindCause, RebindOutcome};
pub use classify::{classify, element_target, is_editable, ElementClass};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use errors::{ConfigError, EditorError, SurfaceError};
pub use history::History;
pub use mutations::{Mutation, MutationError, MutationResult};
pub use resize::{Drag, DragState};
pub use selection::{ElementRef, SelectionChrome, RESIZE_HANDLE_CLASS, SELECTION_OUTLINE};
pub use session::{
    DispatchStats, EditorSession, EventOutcome, HistoryOutcome, LoadSource, Notice, Panel,
    DEFAULT_DOCUMENT,
};
pub use surface::{
    DocumentSurface, EventKind, Generation, Handler, HeadlessSurface, Listener, ListenerId,
    Point, Size, SurfaceGeometry,
};
pub use tools::{ToolMode, ToolState, ToolTransition};

// Re-export the document model for hosts
pub use pagecraft_dom::{Document, NodeId};
pub use pagecraft_store::{PageKey, PageStore};
