//! Canvas rendering functionality for panels, accessories, connectors and grid.
//!
//! Layers are drawn back to front: grid, stage outline, connectors, panels,
//! accessory markers, and finally the resize handle of the inspected panel.

use super::state::DiagramApp;
use crate::constants;
use crate::types::*;
use eframe::egui;
use eframe::epaint::StrokeKind;

/// Converts an RGB triple from the shared palette.
pub(crate) fn rgb(c: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(c[0], c[1], c[2])
}

impl DiagramApp {
    /// Renders all diagram elements on the canvas.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `canvas_rect` - The screen-space rectangle of the canvas area
    pub fn render_diagram_elements(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        if self.canvas.show_grid {
            self.draw_grid(painter, canvas_rect);
        }
        self.draw_stage_outline(painter);

        for connector in self.diagram.connectors() {
            self.draw_connector(painter, &connector);
        }

        for panel in &self.diagram.panels {
            self.draw_panel(painter, panel);
        }

        if let Some(panel) = self
            .interaction
            .selected_panel
            .and_then(|id| self.diagram.panel(id))
        {
            let handle = self.resize_handle_rect(panel);
            painter.rect_filled(handle, 1.0, egui::Color32::WHITE);
            painter.rect_stroke(
                handle,
                1.0,
                egui::Stroke::new(1.0, rgb(constants::SELECTION_RGB)),
                StrokeKind::Inside,
            );
        }
    }

    /// Draws a zoom-aware grid on the canvas for visual reference.
    ///
    /// Skipped when grid cells would be smaller than two pixels.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `canvas_rect` - The screen-space rectangle defining visible area
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let grid_size = constants::GRID_SIZE;
        if grid_size * self.canvas.zoom_factor < 2.0 {
            return;
        }
        let stroke = egui::Stroke::new(
            1.0,
            egui::Color32::from_rgba_unmultiplied(128, 128, 128, 32),
        );

        let top_left = self.screen_to_world(canvas_rect.min);
        let bottom_right = self.screen_to_world(canvas_rect.max);

        let mut x = (top_left.x / grid_size).floor() * grid_size;
        while x <= bottom_right.x {
            let screen_x = self.world_to_screen(egui::pos2(x, 0.0)).x;
            painter.line_segment(
                [
                    egui::pos2(screen_x, canvas_rect.min.y),
                    egui::pos2(screen_x, canvas_rect.max.y),
                ],
                stroke,
            );
            x += grid_size;
        }

        let mut y = (top_left.y / grid_size).floor() * grid_size;
        while y <= bottom_right.y {
            let screen_y = self.world_to_screen(egui::pos2(0.0, y)).y;
            painter.line_segment(
                [
                    egui::pos2(canvas_rect.min.x, screen_y),
                    egui::pos2(canvas_rect.max.x, screen_y),
                ],
                stroke,
            );
            y += grid_size;
        }
    }

    /// Outlines the fixed drawing stage the layout is computed for.
    fn draw_stage_outline(&self, painter: &egui::Painter) {
        let min = self.world_to_screen(egui::Pos2::ZERO);
        let max = self.world_to_screen(egui::pos2(constants::STAGE_WIDTH, constants::STAGE_HEIGHT));
        painter.rect_stroke(
            egui::Rect::from_min_max(min, max),
            0.0,
            egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(128, 128, 128, 96)),
            StrokeKind::Outside,
        );
    }

    /// Draws a connector as a dashed orthogonal polyline.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `connector` - The routed connector
    pub fn draw_connector(&self, painter: &egui::Painter, connector: &Connector) {
        let points: Vec<egui::Pos2> = connector
            .waypoints
            .iter()
            .map(|&(x, y)| self.world_to_screen(egui::pos2(x, y)))
            .collect();
        let zoom = self.canvas.zoom_factor;
        let (dash, gap) = constants::CONNECTOR_DASH;
        painter.extend(egui::Shape::dashed_line(
            &points,
            egui::Stroke::new(2.0 * zoom, rgb(constants::CONNECTOR_RGB)),
            dash * zoom,
            gap * zoom,
        ));
    }

    /// Renders a panel with its room label and attached accessories.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `panel` - The panel to render
    pub fn draw_panel(&self, painter: &egui::Painter, panel: &FloorPanel) {
        let rect = self.panel_screen_rect(panel);
        let zoom = self.canvas.zoom_factor;
        let inspected = self.interaction.selected_panel == Some(panel.id);

        painter.rect_filled(rect, 4.0 * zoom, rgb(constants::PANEL_FILL_RGB));
        let stroke = if inspected {
            egui::Stroke::new(2.0, rgb(constants::SELECTION_RGB))
        } else {
            egui::Stroke::new(1.0, rgb(constants::PANEL_STROKE_RGB))
        };
        painter.rect_stroke(rect, 4.0 * zoom, stroke, StrokeKind::Inside);

        let text_color = if self.dark_mode {
            egui::Color32::from_gray(220)
        } else {
            egui::Color32::from_gray(40)
        };
        let font_size = (12.0 * zoom).clamp(6.0, 28.0);
        painter.text(
            rect.center_top() - egui::vec2(0.0, 3.0),
            egui::Align2::CENTER_BOTTOM,
            panel.room_label(),
            egui::FontId::proportional(font_size),
            text_color,
        );
        painter.text(
            rect.left_top() + egui::vec2(4.0, 4.0) * zoom,
            egui::Align2::LEFT_TOP,
            format!("{}F", panel.floor),
            egui::FontId::proportional(font_size * 0.9),
            egui::Color32::from_gray(90),
        );

        for kind in AccessoryKind::ALL {
            if panel.has_accessory(kind) {
                let selected = self.diagram.is_selected(panel.id, kind);
                self.draw_accessory(painter, panel, kind, selected);
            }
        }
    }

    /// Draws an accessory marker: a downward triangle for splitters, a disc for
    /// boosters. The selected marker gets a highlight ring.
    fn draw_accessory(
        &self,
        painter: &egui::Painter,
        panel: &FloorPanel,
        kind: AccessoryKind,
        selected: bool,
    ) {
        let (ax, ay) = panel.accessory_anchor(kind);
        let center = self.world_to_screen(egui::pos2(ax, ay));
        let r = constants::ACCESSORY_MARKER_RADIUS * self.canvas.zoom_factor;

        match kind {
            AccessoryKind::Splitter => {
                painter.add(egui::Shape::convex_polygon(
                    vec![
                        center + egui::vec2(-r, -r * 0.8),
                        center + egui::vec2(r, -r * 0.8),
                        center + egui::vec2(0.0, r),
                    ],
                    rgb(constants::SPLITTER_RGB),
                    egui::Stroke::NONE,
                ));
            }
            AccessoryKind::Booster => {
                painter.circle_filled(center, r, rgb(constants::BOOSTER_RGB));
            }
        }

        if selected {
            painter.circle_stroke(
                center,
                r + 3.0 * self.canvas.zoom_factor,
                egui::Stroke::new(2.0, rgb(constants::SELECTION_RGB)),
            );
        }
    }
}
