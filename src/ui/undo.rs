//! Undo/redo functionality for tracking and reversing user actions.
//!
//! Tracks panel moves, resizes, accessory removals and whole-set
//! regenerations. Selection changes are not recorded.

use crate::constants::MAX_UNDO_HISTORY;
use crate::types::*;

/// Represents different types of actions that can be undone.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    /// A panel was dragged from one position to another
    PanelMoved {
        /// The dragged panel
        panel: PanelId,
        /// Top-left corner before the drag
        old_position: (f32, f32),
        /// Top-left corner after the drag
        new_position: (f32, f32),
    },
    /// A panel was resized
    PanelResized {
        /// The resized panel
        panel: PanelId,
        /// Size before the resize
        old_size: (f32, f32),
        /// Size after the resize
        new_size: (f32, f32),
    },
    /// An accessory was detached
    AccessoryRemoved {
        /// Panel the accessory was on
        panel: PanelId,
        /// Which accessory
        kind: AccessoryKind,
    },
    /// An accessory was re-attached (the inverse of a removal)
    AccessoryAttached {
        /// Panel the accessory is on
        panel: PanelId,
        /// Which accessory
        kind: AccessoryKind,
    },
    /// The panel set was regenerated from the form
    Regenerated {
        /// Diagram before the regeneration
        previous: FloorDiagram,
        /// Diagram after the regeneration
        next: FloorDiagram,
    },
}

/// Manages undo/redo history for the application.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    /// Stack of actions that can be undone
    undo_stack: Vec<UndoAction>,
    /// Stack of actions that can be redone
    redo_stack: Vec<UndoAction>,
}

impl UndoHistory {
    /// Creates a new empty undo history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new action. Any redo history is discarded.
    pub fn push_action(&mut self, action: UndoAction) {
        self.push_undo(action);
        self.redo_stack.clear();
    }

    /// Pushes onto the undo stack without touching the redo stack.
    pub fn push_undo(&mut self, action: UndoAction) {
        self.undo_stack.push(action);
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Returns true if there are actions that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are actions that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pops the most recent action from the undo stack.
    pub fn pop_undo(&mut self) -> Option<UndoAction> {
        self.undo_stack.pop()
    }

    /// Pops the most recent action from the redo stack.
    pub fn pop_redo(&mut self) -> Option<UndoAction> {
        self.redo_stack.pop()
    }

    /// Pushes an action onto the redo stack.
    pub fn push_redo(&mut self, action: UndoAction) {
        self.redo_stack.push(action);
    }
}

/// Extension methods for reverting recorded actions on a diagram.
pub trait UndoableDiagram {
    /// Reverts `action` and returns the action that would re-apply it.
    fn apply_undo(&mut self, action: &UndoAction) -> Option<UndoAction>;
}

impl UndoableDiagram for FloorDiagram {
    fn apply_undo(&mut self, action: &UndoAction) -> Option<UndoAction> {
        match action {
            UndoAction::PanelMoved { panel, old_position, new_position } => {
                self.move_panel(*panel, *old_position).then(|| UndoAction::PanelMoved {
                    panel: *panel,
                    old_position: *new_position,
                    new_position: *old_position,
                })
            }
            UndoAction::PanelResized { panel, old_size, new_size } => {
                let target = self.panel_mut(*panel)?;
                target.size = *old_size;
                target.scale = (1.0, 1.0);
                Some(UndoAction::PanelResized {
                    panel: *panel,
                    old_size: *new_size,
                    new_size: *old_size,
                })
            }
            UndoAction::AccessoryRemoved { panel, kind } => self
                .attach_accessory(*panel, *kind)
                .then_some(UndoAction::AccessoryAttached { panel: *panel, kind: *kind }),
            UndoAction::AccessoryAttached { panel, kind } => self
                .remove_accessory(*panel, *kind)
                .then_some(UndoAction::AccessoryRemoved { panel: *panel, kind: *kind }),
            UndoAction::Regenerated { previous, next } => {
                *self = previous.clone();
                Some(UndoAction::Regenerated {
                    previous: next.clone(),
                    next: previous.clone(),
                })
            }
        }
    }
}
