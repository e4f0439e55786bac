use serde::{Deserialize, Serialize};
use std::fmt;

/// Interaction modes. At most one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolMode {
    #[default]
    None,
    TextInsert,
    Select,
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolMode::None => write!(f, "none"),
            ToolMode::TextInsert => write!(f, "text"),
            ToolMode::Select => write!(f, "select"),
        }
    }
}

/// Result of a tool change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolTransition {
    pub previous: ToolMode,
    pub current: ToolMode,
}

impl ToolTransition {
    /// Tool that stopped being active, if any
    pub fn deactivated(&self) -> Option<ToolMode> {
        if self.previous != ToolMode::None && self.previous != self.current {
            Some(self.previous)
        } else {
            None
        }
    }

    pub fn is_noop(&self) -> bool {
        self.previous == self.current
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolState {
    active: ToolMode,
}

impl ToolState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> ToolMode {
        self.active
    }

    pub fn is_active(&self, tool: ToolMode) -> bool {
        self.active == tool
    }

    /// Toggle semantics: selecting the active tool turns it off,
    /// selecting another tool replaces it.
    pub fn toggle(&mut self, tool: ToolMode) -> ToolTransition {
        let previous = self.active;
        self.active = if tool == previous { ToolMode::None } else { tool };
        ToolTransition {
            previous,
            current: self.active,
        }
    }

    pub fn deactivate(&mut self) -> ToolTransition {
        let previous = self.active;
        self.active = ToolMode::None;
        ToolTransition {
            previous,
            current: ToolMode::None,
        }
    }
}
