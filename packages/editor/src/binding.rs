//! # Rebind Protocol
//!
//! Every content replacement discards the listeners attached to the old
//! content. The binding record remembers which generation the editor's
//! document-level click handler was attached to, so binding again on the
//! same generation is a no-op and binding after a replacement attaches
//! exactly one fresh handler.

use crate::errors::SurfaceError;
use crate::surface::{DocumentSurface, EventKind, Generation, Handler, ListenerId};
use tracing::debug;

/// Why the surface content was replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebindCause {
    /// A page was loaded; history restarts from it
    Load,
    /// Undo/redo restored a snapshot; history is left alone
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebindOutcome {
    /// A handler was attached to a new generation
    Bound(Generation),
    AlreadyBound(Generation),
}

impl RebindOutcome {
    pub fn is_fresh(&self) -> bool {
        matches!(self, RebindOutcome::Bound(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Binding {
    bound: Option<(Generation, ListenerId)>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bound_to(&self, generation: Generation) -> bool {
        matches!(self.bound, Some((g, _)) if g == generation)
    }

    pub fn generation(&self) -> Option<Generation> {
        self.bound.map(|(g, _)| g)
    }

    /// Attach the click handler to the surface's current generation unless
    /// it is already there
    pub fn bind<S: DocumentSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<RebindOutcome, SurfaceError> {
        if !surface.is_ready() {
            return Err(SurfaceError::Unavailable);
        }
        let generation = surface.generation();
        if self.is_bound_to(generation) {
            return Ok(RebindOutcome::AlreadyBound(generation));
        }

        let listener = surface.add_listener(EventKind::Click, None, Handler::EditorClick, false)?;
        self.bound = Some((generation, listener));
        debug!(%generation, "Editor bound to surface");
        Ok(RebindOutcome::Bound(generation))
    }
}
