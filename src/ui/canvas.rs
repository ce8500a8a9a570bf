//! Canvas interaction and navigation functionality.
//!
//! This module handles canvas panning, zooming, panel dragging and resizing,
//! accessory selection clicks, and coordinate transformations between screen
//! and world space.

use super::state::DiagramApp;
use super::undo::UndoAction;
use crate::constants;
use crate::types::*;
use eframe::egui;

impl DiagramApp {
    /// Converts screen coordinates to world coordinates accounting for zoom and pan.
    ///
    /// # Arguments
    ///
    /// * `screen_pos` - Position in screen space (pixels)
    ///
    /// # Returns
    ///
    /// The corresponding position in world space
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.canvas.offset) / self.canvas.zoom_factor
    }

    /// Converts world coordinates to screen coordinates accounting for zoom and pan.
    ///
    /// # Arguments
    ///
    /// * `world_pos` - Position in world space
    ///
    /// # Returns
    ///
    /// The corresponding position in screen space (pixels)
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.canvas.zoom_factor + self.canvas.offset
    }

    /// Screen-space rectangle of a panel, including any live resize scale.
    pub fn panel_screen_rect(&self, panel: &FloorPanel) -> egui::Rect {
        let (w, h) = panel.displayed_size();
        let min = self.world_to_screen(egui::pos2(panel.position.0, panel.position.1));
        egui::Rect::from_min_size(min, egui::vec2(w, h) * self.canvas.zoom_factor)
    }

    /// Screen-space rectangle of the resize handle at a panel's bottom-right corner.
    pub fn resize_handle_rect(&self, panel: &FloorPanel) -> egui::Rect {
        let corner = self.panel_screen_rect(panel).max;
        egui::Rect::from_center_size(corner, egui::Vec2::splat(constants::RESIZE_HANDLE_SIZE))
    }

    /// Handles middle-click or Cmd/Ctrl+left-click canvas panning functionality.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    /// * `response` - The response from the canvas widget
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        // modifiers.command is Cmd on macOS and Ctrl elsewhere
        let should_pan = ui.input(|i| {
            i.pointer.middle_down() || (i.pointer.primary_down() && i.modifiers.command)
        });

        if should_pan {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if !self.interaction.is_panning {
                    self.interaction.is_panning = true;
                    self.interaction.last_pan_pos = Some(current_pos);
                } else if let Some(last_pos) = self.interaction.last_pan_pos {
                    self.canvas.offset += current_pos - last_pos;
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Handles scroll wheel zooming functionality.
    ///
    /// Zooms in/out while keeping the mouse cursor position fixed in world space.
    /// Zoom range is clamped between 0.25x and 5.0x.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    /// * `response` - The response from the canvas widget
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta == 0.0 {
            return;
        }

        let mouse_pos = ui
            .input(|i| i.pointer.hover_pos())
            .or_else(|| response.interact_pointer_pos());
        let Some(mouse_pos) = mouse_pos else {
            return;
        };
        if !response.rect.contains(mouse_pos) {
            return;
        }

        let world_before = self.screen_to_world(mouse_pos);
        let zoom_delta = if scroll_delta > 0.0 { 0.025 } else { -0.025 };
        let old_zoom = self.canvas.zoom_factor;
        self.canvas.zoom_factor = (self.canvas.zoom_factor + zoom_delta).clamp(0.25, 5.0);

        if (self.canvas.zoom_factor - old_zoom).abs() > f32::EPSILON {
            // Keep the world point under the cursor fixed
            let world_after = self.world_to_screen(world_before);
            self.canvas.offset += mouse_pos - world_after;
        }
    }

    /// Pointer position for canvas interactions.
    ///
    /// Falls back to the raw pointer position when it lies on the canvas, so a
    /// press is seen in the same frame it happens.
    fn canvas_pointer_pos(ui: &egui::Ui, response: &egui::Response) -> Option<egui::Pos2> {
        response.interact_pointer_pos().or_else(|| {
            ui.input(|i| i.pointer.interact_pos())
                .filter(|pos| response.rect.contains(*pos))
        })
    }

    /// Handles panel dragging and corner resizing with the left mouse button.
    ///
    /// A press on the selected panel's corner handle starts a resize, a press
    /// anywhere else on a panel starts a drag. Releasing commits the gesture and
    /// records it for undo.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    /// * `response` - The response from the canvas widget
    pub fn handle_panel_dragging(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let primary_down = ui.input(|i| i.pointer.primary_down());

        if primary_down && !self.interaction.is_panning {
            let Some(current_pos) = Self::canvas_pointer_pos(ui, response) else {
                return;
            };
            let world_pos = self.screen_to_world(current_pos);

            if let Some(id) = self.interaction.resizing_panel {
                self.update_live_scale(id, world_pos);
            } else if let Some(id) = self.interaction.dragging_panel {
                let new_pos = world_pos + self.interaction.panel_drag_offset;
                self.diagram.move_panel(id, (new_pos.x, new_pos.y));
            } else if ui.input(|i| i.pointer.primary_pressed()) {
                self.start_panel_gesture(current_pos, world_pos);
            }
        } else if !primary_down {
            if let Some(id) = self.interaction.resizing_panel.take() {
                self.finish_resize(id);
            }
            if let Some(id) = self.interaction.dragging_panel.take() {
                if let Some(old_position) = self.interaction.drag_original_position.take() {
                    self.record_panel_movement(id, old_position);
                }
            }
            self.interaction.drag_original_position = None;
            self.interaction.resize_original_size = None;
        }
    }

    /// Starts a resize or a drag depending on what lies under the pointer.
    fn start_panel_gesture(&mut self, screen_pos: egui::Pos2, world_pos: egui::Pos2) {
        let on_handle = self
            .interaction
            .selected_panel
            .and_then(|id| self.diagram.panel(id))
            .filter(|panel| self.resize_handle_rect(panel).contains(screen_pos))
            .map(|panel| (panel.id, panel.size));

        if let Some((id, size)) = on_handle {
            self.interaction.resizing_panel = Some(id);
            self.interaction.resize_original_size = Some(size);
            return;
        }

        let Some(id) = self.diagram.panel_at((world_pos.x, world_pos.y)) else {
            return;
        };
        if let Some(panel) = self.diagram.panel(id) {
            let top_left = egui::pos2(panel.position.0, panel.position.1);
            self.interaction.panel_drag_offset = top_left - world_pos;
            self.interaction.drag_original_position = Some(panel.position);
            self.interaction.dragging_panel = Some(id);
            self.interaction.selected_panel = Some(id);
        }
    }

    /// Sets the live scale so the panel's corner follows the pointer.
    fn update_live_scale(&mut self, id: PanelId, world_pos: egui::Pos2) {
        let Some(panel) = self.diagram.panel(id) else {
            return;
        };
        let (w, h) = panel.size;
        let scale_x = ((world_pos.x - panel.position.0) / w).max(0.01);
        let scale_y = ((world_pos.y - panel.position.1) / h).max(0.01);
        self.diagram.set_live_scale(id, (scale_x, scale_y));
    }

    /// Commits the live scale into the panel size.
    fn finish_resize(&mut self, id: PanelId) {
        let Some(scale) = self.diagram.panel(id).map(|p| p.scale) else {
            return;
        };
        self.diagram.resize_panel(id, scale.0, scale.1);

        let new_size = self.diagram.panel(id).map(|p| p.size);
        if let (Some(old_size), Some(new_size)) = (self.interaction.resize_original_size, new_size)
        {
            if old_size != new_size {
                self.undo_history.push_action(UndoAction::PanelResized {
                    panel: id,
                    old_size,
                    new_size,
                });
            }
        }
    }

    /// Records undo action for panel movement when a drag ends.
    ///
    /// # Arguments
    ///
    /// * `id` - Panel that was dragged
    /// * `old_position` - Position before the drag started
    fn record_panel_movement(&mut self, id: PanelId, old_position: (f32, f32)) {
        if let Some(panel) = self.diagram.panel(id) {
            let new_position = panel.position;
            if old_position != new_position {
                self.undo_history.push_action(UndoAction::PanelMoved {
                    panel: id,
                    old_position,
                    new_position,
                });
            }
        }
    }

    /// Handles single clicks: accessory markers toggle their selection, panels
    /// become the inspected panel, empty space clears the inspected panel.
    ///
    /// # Arguments
    ///
    /// * `response` - The canvas response
    pub fn handle_canvas_clicks(&mut self, response: &egui::Response) {
        if !response.clicked() || self.interaction.is_panning {
            return;
        }
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        let world = self.screen_to_world(pos);
        let point = (world.x, world.y);

        if let Some(hit) = self
            .diagram
            .accessory_at(point, constants::ACCESSORY_HIT_RADIUS)
        {
            self.diagram.toggle_accessory_selection(hit.panel, hit.kind);
            self.interaction.selected_panel = Some(hit.panel);
        } else {
            self.interaction.selected_panel = self.diagram.panel_at(point);
        }
    }
}
