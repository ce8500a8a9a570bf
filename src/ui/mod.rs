//! User interface components and rendering logic for the floor diagram tool.
//!
//! This module contains all the UI-related code including the main application struct,
//! canvas rendering, the properties panel, and user interaction handling.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main DiagramApp
//! - `canvas` - Canvas navigation, zooming, panning, dragging and resizing
//! - `rendering` - Drawing panels, accessories, connectors and grid
//! - `export` - SVG and PNG export
//! - `undo` - Undo/redo history
//! - `map_panel` / `vision_panel` - The auxiliary tabs

mod canvas;
mod export;
mod map_panel;
mod rendering;
mod state;
mod undo;
mod vision_panel;

pub use export::build_svg;
pub use state::{ActiveTab, DiagramApp, DialogResult, ExportOptions};
pub use undo::{UndoAction, UndoHistory, UndoableDiagram};

use crate::constants;
use crate::types::*;
use eframe::egui;

impl eframe::App for DiagramApp {
    /// Main update function called by egui for each frame.
    ///
    /// Lays out the tab bar, then the active tab. The diagram tab has a toolbar,
    /// a properties panel on the right and the canvas in the center.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    /// * `_frame` - The eframe frame
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_dialog_results();

        if self.active_tab == ActiveTab::Diagram {
            self.handle_undo_redo_keys(ctx);
            self.handle_delete_key(ctx);
        }

        egui::TopBottomPanel::top("tab_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.active_tab, ActiveTab::Diagram, "Floor diagram");
                ui.selectable_value(&mut self.active_tab, ActiveTab::Vision, "Vision overlay");
                ui.selectable_value(&mut self.active_tab, ActiveTab::Map, "Static map");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.checkbox(&mut self.dark_mode, "Dark Mode");
                });
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.summary_text());
                if let Some(message) = &self.status_message {
                    ui.separator();
                    ui.label(message.as_str());
                }
            });
        });

        match self.active_tab {
            ActiveTab::Diagram => {
                egui::TopBottomPanel::top("diagram_toolbar").show(ctx, |ui| {
                    self.draw_toolbar(ui);
                });
                egui::SidePanel::right("properties_panel")
                    .resizable(true)
                    .default_width(220.0)
                    .show(ctx, |ui| {
                        self.draw_properties_panel(ui);
                    });
                egui::CentralPanel::default().show(ctx, |ui| {
                    self.draw_canvas(ui);
                });
            }
            ActiveTab::Vision => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    self.draw_vision_tab(ui);
                });
            }
            ActiveTab::Map => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    self.draw_map_tab(ui);
                });
            }
        }
    }
}

impl DiagramApp {
    /// Applies results delivered by async dialogs since the last frame.
    pub fn handle_dialog_results(&mut self) {
        while let Ok(result) = self.dialog_receiver.try_recv() {
            match result {
                DialogResult::ExportCompleted(path) => {
                    log::info!("exported diagram to {path}");
                    self.status_message = Some(format!("Exported to {path}"));
                }
                DialogResult::ResponseLoaded(text) => {
                    self.vision.response_text = text;
                    self.parse_vision_response();
                }
                DialogResult::ImageLoaded { name, bytes } => {
                    self.load_vision_image(name, &bytes);
                }
                DialogResult::OperationFailed(e) => {
                    log::error!("{e}");
                    self.status_message = Some(e);
                }
            }
        }
    }

    /// Handles undo/redo keyboard shortcuts.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for checking input
    fn handle_undo_redo_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        // Ctrl+Z for undo
        if ctx.input(|i| i.key_pressed(egui::Key::Z) && i.modifiers.command && !i.modifiers.shift) {
            self.perform_undo();
        }
        // Ctrl+Shift+Z or Ctrl+Y for redo
        else if ctx.input(|i| {
            (i.key_pressed(egui::Key::Z) && i.modifiers.command && i.modifiers.shift)
                || (i.key_pressed(egui::Key::Y) && i.modifiers.command)
        }) {
            self.perform_redo();
        }
    }

    /// Delete or Backspace detaches the selected accessory.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for checking input
    fn handle_delete_key(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let pressed =
            ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace));
        if !pressed {
            return;
        }
        if let Some(selection) = self.diagram.selected_accessory {
            self.remove_accessory_with_undo(selection.panel, selection.kind);
        }
    }

    /// Generates a fresh panel set from the form and records it for undo.
    pub fn submit_floor_form(&mut self) {
        let floor_count = self
            .form
            .floor_count
            .clamp(constants::MIN_FLOOR_COUNT, constants::MAX_FLOOR_COUNT);
        self.form.floor_count = floor_count;

        let previous = self.diagram.clone();
        self.diagram.generate(floor_count, self.form.defaults());
        self.undo_history.push_action(UndoAction::Regenerated {
            previous,
            next: self.diagram.clone(),
        });

        self.interaction.selected_panel = None;
        self.status_message = Some(self.generation_info());
        log::info!("{}", self.generation_info());
    }

    /// Detaches an accessory and records the removal for undo.
    pub fn remove_accessory_with_undo(&mut self, panel: PanelId, kind: AccessoryKind) {
        let attached = self
            .diagram
            .panel(panel)
            .is_some_and(|p| p.has_accessory(kind));
        if attached && self.diagram.remove_accessory(panel, kind) {
            self.undo_history
                .push_action(UndoAction::AccessoryRemoved { panel, kind });
        }
    }

    /// Describes the last generation, e.g. how many columns were used.
    pub fn generation_info(&self) -> String {
        let summary = self.diagram.summary();
        match summary.top_floor {
            Some(top) => format!(
                "Showing {} panels from floor {} down to floor 2 ({} secondary columns)",
                summary.panel_count, top, summary.secondary_columns
            ),
            None => "No panels generated".to_string(),
        }
    }

    /// One-line summary for the status bar.
    pub fn summary_text(&self) -> String {
        let summary = self.diagram.summary();
        let selection = match self.diagram.selected_accessory {
            Some(sel) => format!("{} on floor {}", sel.kind.label(), sel.panel.floor()),
            None => "none".to_string(),
        };
        format!(
            "Panels: {} | Connectors: {} | Selected accessory: {} | Zoom: {:.0}%",
            summary.panel_count,
            summary.panel_count.saturating_sub(1),
            selection,
            self.canvas.zoom_factor * 100.0
        )
    }

    /// Renders the diagram toolbar: generation form, history, export and view options.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Floors:");
            ui.add(
                egui::DragValue::new(&mut self.form.floor_count)
                    .range(constants::MIN_FLOOR_COUNT..=constants::MAX_FLOOR_COUNT),
            );
            ui.checkbox(&mut self.form.splitter, "Splitter");
            ui.checkbox(&mut self.form.booster, "Booster");
            if ui.button("Generate").clicked() {
                self.submit_floor_form();
            }

            ui.separator();

            ui.add_enabled_ui(self.undo_history.can_undo(), |ui| {
                if ui.button("⟲ Undo").clicked() {
                    self.perform_undo();
                }
            });
            ui.add_enabled_ui(self.undo_history.can_redo(), |ui| {
                if ui.button("⟳ Redo").clicked() {
                    self.perform_redo();
                }
            });

            ui.separator();

            if ui.button("Export SVG").clicked() {
                self.export_svg(ui.ctx());
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                if ui.button("Export PNG").clicked() {
                    self.export_png(ui.ctx());
                }
            }
            if ui.button("Copy JSON").clicked() {
                match self.diagram.to_json() {
                    Ok(json) => {
                        ui.ctx().copy_text(json);
                        self.status_message = Some("Diagram JSON copied".to_string());
                    }
                    Err(e) => {
                        log::error!("Failed to serialize diagram: {e}");
                        self.status_message = Some(format!("Failed to serialize diagram: {e}"));
                    }
                }
            }

            ui.separator();
            ui.checkbox(&mut self.canvas.show_grid, "Show Grid");
            if ui.button("Reset View").clicked() {
                self.canvas.zoom_factor = 1.0;
                self.canvas.initialized = false;
            }
        });
    }

    /// Renders the properties panel for the inspected panel.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Properties");
        ui.separator();

        let Some(panel) = self
            .interaction
            .selected_panel
            .and_then(|id| self.diagram.panel(id))
            .cloned()
        else {
            ui.label("Click a panel to inspect it.");
            ui.label("Click a marker to select it; Delete removes the selected marker.");
            return;
        };

        ui.label(egui::RichText::new(panel.room_label()).strong());
        egui::Grid::new("panel_properties").num_columns(2).show(ui, |ui| {
            ui.label("Id");
            ui.label(panel.id.to_string());
            ui.end_row();
            ui.label("Floor");
            ui.label(panel.floor.to_string());
            ui.end_row();
            ui.label("Position");
            ui.label(format!("{:.0}, {:.0}", panel.position.0, panel.position.1));
            ui.end_row();
            ui.label("Size");
            ui.label(format!("{:.0} × {:.0}", panel.size.0, panel.size.1));
            ui.end_row();
        });

        ui.separator();
        ui.label("Accessories");
        for kind in AccessoryKind::ALL {
            ui.horizontal(|ui| {
                if panel.has_accessory(kind) {
                    let selected = self.diagram.is_selected(panel.id, kind);
                    if ui.selectable_label(selected, kind.label()).clicked() {
                        self.diagram.toggle_accessory_selection(panel.id, kind);
                    }
                    if ui.small_button("Remove").clicked() {
                        self.remove_accessory_with_undo(panel.id, kind);
                    }
                } else {
                    ui.weak(format!("{} (none)", kind.label()));
                }
            });
        }
    }

    /// Renders the main canvas area and handles user interactions.
    ///
    /// # Arguments
    ///
    /// * `ui` - The egui UI context
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        // Align the stage origin with the canvas corner on first frame
        if !self.canvas.initialized {
            self.canvas.offset = response.rect.min.to_vec2() + egui::vec2(20.0, 20.0);
            self.canvas.initialized = true;
        }

        self.handle_canvas_panning(ui, &response);
        self.handle_canvas_zoom(ui, &response);
        self.handle_panel_dragging(ui, &response);
        self.handle_canvas_clicks(&response);

        self.render_diagram_elements(&painter, response.rect);
    }

    /// Performs an undo operation.
    pub fn perform_undo(&mut self) {
        if let Some(action) = self.undo_history.pop_undo() {
            if let Some(redo_action) = self.diagram.apply_undo(&action) {
                self.undo_history.push_redo(redo_action);
                self.clear_stale_selection();
            }
        }
    }

    /// Performs a redo operation.
    pub fn perform_redo(&mut self) {
        if let Some(action) = self.undo_history.pop_redo() {
            if let Some(undo_action) = self.diagram.apply_undo(&action) {
                // push_action would clear the redo stack
                self.undo_history.push_undo(undo_action);
                self.clear_stale_selection();
            }
        }
    }

    fn clear_stale_selection(&mut self) {
        if let Some(id) = self.interaction.selected_panel {
            if self.diagram.panel(id).is_none() {
                self.interaction.selected_panel = None;
            }
        }
    }
}

#[cfg(test)]
mod tests;
