//! Map tab: pick a location and build a static map image URL for it.

use super::state::DiagramApp;
use crate::static_map::{
    location_to_pixel, pixel_to_location, predefined_locations, static_map_url, MapLocation,
};
use eframe::egui;
use eframe::epaint::StrokeKind;

/// Zoom levels accepted by the static map provider.
const MAP_ZOOM_RANGE: std::ops::RangeInclusive<u8> = 1..=21;

impl DiagramApp {
    /// Moves the pin to the coordinate under a viewport pixel.
    ///
    /// # Arguments
    ///
    /// * `pixel` - Position relative to the viewport's top-left corner
    /// * `viewport` - Viewport size in pixels
    pub fn handle_map_click(&mut self, pixel: (f64, f64), viewport: (f64, f64)) {
        self.map.location = pixel_to_location(&self.map.center, self.map.zoom, viewport, pixel);
        self.map.generated_url = None;
        log::debug!(
            "map pin moved to {:.6},{:.6}",
            self.map.location.lat,
            self.map.location.lng
        );
    }

    /// Centers the viewport and the pin on a named location.
    pub fn select_map_location(&mut self, location: MapLocation) {
        self.map.center = location.clone();
        self.map.location = location;
        self.map.generated_url = None;
    }

    /// Builds the static map URL for the current pin.
    pub fn generate_static_map(&mut self) {
        match static_map_url(&self.map.config, &self.map.location, self.map.zoom) {
            Ok(url) => {
                self.map.generated_url = Some(url);
                self.map.status = None;
            }
            Err(e) => {
                log::warn!("{e}");
                self.map.generated_url = None;
                self.map.status = Some(e);
            }
        }
    }

    /// Renders the map tab.
    pub fn draw_map_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            for location in predefined_locations() {
                if ui.button(location.name.as_str()).clicked() {
                    self.select_map_location(location);
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Zoom:");
            let zoom = ui.add(egui::DragValue::new(&mut self.map.zoom).range(MAP_ZOOM_RANGE));
            if zoom.changed() {
                self.map.generated_url = None;
            }
            if ui.button("Center on pin").clicked() {
                self.map.center = self.map.location.clone();
            }
            ui.separator();
            ui.label(format!(
                "{}: {:.6}, {:.6}",
                self.map.location.name, self.map.location.lat, self.map.location.lng
            ));
        });

        let size = egui::vec2(ui.available_width().max(100.0), 360.0);
        let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
        self.draw_map_viewport(&painter, response.rect);

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = pos - response.rect.min;
                let viewport = response.rect.size();
                self.handle_map_click(
                    (local.x as f64, local.y as f64),
                    (viewport.x as f64, viewport.y as f64),
                );
            }
        }

        ui.horizontal(|ui| {
            if ui.button("Generate static map").clicked() {
                self.generate_static_map();
            }
            if self.map.config.api_key.is_none() {
                ui.weak("GOOGLE_API_KEY is not set");
            }
        });

        if let Some(status) = &self.map.status {
            ui.colored_label(egui::Color32::from_rgb(0xef, 0x44, 0x44), status);
        }
        if let Some(url) = self.map.generated_url.clone() {
            ui.horizontal(|ui| {
                if ui.button("Copy URL").clicked() {
                    ui.ctx().copy_text(url.clone());
                    self.status_message = Some("Static map URL copied".to_string());
                }
                ui.hyperlink_to("Open static map", &url);
            });
            ui.add(egui::Label::new(egui::RichText::new(&url).monospace().small()).wrap());
        }
    }

    /// Draws the viewport frame with a crosshair at the center and the pin.
    fn draw_map_viewport(&self, painter: &egui::Painter, rect: egui::Rect) {
        painter.rect_filled(rect, 2.0, egui::Color32::from_rgb(0xe8, 0xee, 0xe4));
        painter.rect_stroke(
            rect,
            2.0,
            egui::Stroke::new(1.0, egui::Color32::from_gray(150)),
            StrokeKind::Inside,
        );

        let c = rect.center();
        let cross = egui::Stroke::new(1.0, egui::Color32::from_gray(120));
        painter.line_segment([c - egui::vec2(8.0, 0.0), c + egui::vec2(8.0, 0.0)], cross);
        painter.line_segment([c - egui::vec2(0.0, 8.0), c + egui::vec2(0.0, 8.0)], cross);

        let viewport = (rect.width() as f64, rect.height() as f64);
        let (px, py) = location_to_pixel(&self.map.center, self.map.zoom, viewport, &self.map.location);
        let pin = rect.min + egui::vec2(px as f32, py as f32);
        if rect.contains(pin) {
            painter.circle_filled(pin, 6.0, egui::Color32::from_rgb(0xdc, 0x26, 0x26));
            painter.circle_stroke(pin, 6.0, egui::Stroke::new(1.5, egui::Color32::WHITE));
            painter.text(
                pin - egui::vec2(0.0, 9.0),
                egui::Align2::CENTER_BOTTOM,
                &self.map.location.name,
                egui::FontId::proportional(12.0),
                egui::Color32::from_gray(30),
            );
        }
    }
}
