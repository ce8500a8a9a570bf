//! Vision tab: load an annotate response and overlay what was recognized.

use super::state::{DiagramApp, DialogResult, VisionImage};
use crate::overlay::{normalize_vertices, overlay_box, score_percent, OverlayBox, VisionResult};
use eframe::egui;
use eframe::epaint::StrokeKind;
use image::GenericImageView;

const OBJECT_COLOR: egui::Color32 = egui::Color32::from_rgb(0x22, 0xc5, 0x5e);
const TEXT_COLOR: egui::Color32 = egui::Color32::from_rgb(0xf5, 0x9e, 0x0b);
const HIGHLIGHT_COLOR: egui::Color32 = egui::Color32::from_rgb(0xef, 0x44, 0x44);

/// Width the zoomed word crop is scaled to.
const ZOOM_WIDTH: f32 = 240.0;
/// Largest magnification of the word crop.
const MAX_ZOOM: f32 = 6.0;

/// Decodes PNG, JPEG or GIF bytes into an egui image.
pub fn decode_image(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| format!("Failed to decode image: {e}"))?;
    let (width, height) = decoded.dimensions();
    let rgba = decoded.to_rgba8();
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        rgba.as_raw(),
    ))
}

impl DiagramApp {
    /// Parses the response text into `vision.result`.
    ///
    /// A parse failure keeps the previous result and records the error.
    pub fn parse_vision_response(&mut self) {
        match VisionResult::from_annotate_response(&self.vision.response_text) {
            Ok(result) => {
                log::info!(
                    "vision response: {} labels, {} objects, {} words",
                    result.labels.len(),
                    result.objects.len(),
                    result.texts.len()
                );
                self.vision.result = Some(result);
                self.vision.parse_error = None;
                self.vision.selected_text = None;
            }
            Err(e) => {
                log::warn!("failed to parse vision response: {e}");
                self.vision.parse_error = Some(format!("Invalid response JSON: {e}"));
            }
        }
    }

    /// Opens a file picker for a saved response; the content arrives as
    /// [`DialogResult::ResponseLoaded`].
    pub fn open_vision_response(&mut self, ctx: &egui::Context) {
        let ctx = ctx.clone();
        let sender = self.dialog_sender.clone();
        let task = async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("JSON", &["json"])
                .pick_file()
                .await
            {
                let bytes = handle.read().await;
                let result = match String::from_utf8(bytes) {
                    Ok(text) => DialogResult::ResponseLoaded(text),
                    Err(e) => DialogResult::OperationFailed(format!("Failed to read file: {e}")),
                };
                let _ = sender.send(result);
            }
            ctx.request_repaint();
        };

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(task);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            tokio::spawn(task);
        }
    }

    /// Decodes an opened image and makes it the analyzed image.
    ///
    /// Text boxes in pixels are normalized against its size from now on. A
    /// decode failure keeps the current image.
    pub fn load_vision_image(&mut self, name: String, bytes: &[u8]) {
        match decode_image(bytes) {
            Ok(pixels) => {
                let size = pixels.size;
                log::info!("loaded image {name} ({}x{})", size[0], size[1]);
                self.vision.image_size = (size[0] as f32, size[1] as f32);
                self.vision.image = Some(VisionImage {
                    name,
                    size,
                    pending: Some(pixels),
                    texture: None,
                });
            }
            Err(e) => {
                log::warn!("{e}");
                self.status_message = Some(e);
            }
        }
    }

    /// Opens a file picker for the analyzed image; the bytes arrive as
    /// [`DialogResult::ImageLoaded`].
    pub fn open_vision_image(&mut self, ctx: &egui::Context) {
        let ctx = ctx.clone();
        let sender = self.dialog_sender.clone();
        let task = async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("Image", &["png", "jpg", "jpeg", "gif"])
                .pick_file()
                .await
            {
                let name = handle.file_name();
                let bytes = handle.read().await;
                let _ = sender.send(DialogResult::ImageLoaded { name, bytes });
            }
            ctx.request_repaint();
        };

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(task);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            tokio::spawn(task);
        }
    }

    /// Uploads decoded pixels the first time the image is drawn.
    fn ensure_vision_texture(&mut self, ctx: &egui::Context) {
        if let Some(image) = &mut self.vision.image {
            if let Some(pixels) = image.pending.take() {
                image.texture =
                    Some(ctx.load_texture("vision_image", pixels, egui::TextureOptions::LINEAR));
            }
        }
    }

    /// Texture coordinates of a recognized word inside the analyzed image.
    pub fn text_zoom_uv(&self, index: usize) -> Option<egui::Rect> {
        let text = self.vision.result.as_ref()?.texts.get(index)?;
        let vertices = normalize_vertices(&text.vertices, Some(self.vision.image_size));
        let b = overlay_box(&vertices)?;
        let uv = egui::Rect::from_min_size(
            egui::pos2(b.left / 100.0, b.top / 100.0),
            egui::vec2(b.width / 100.0, b.height / 100.0),
        )
        .intersect(egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0)));
        (uv.width() > 0.0 && uv.height() > 0.0).then_some(uv)
    }

    /// Renders the vision tab.
    pub fn draw_vision_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open response…").clicked() {
                self.open_vision_response(ui.ctx());
            }
            if ui.button("Parse").clicked() {
                self.parse_vision_response();
            }
            ui.separator();
            if ui.button("Open image…").clicked() {
                self.open_vision_image(ui.ctx());
            }
            if let Some(image) = &self.vision.image {
                ui.label(format!("{} ({}×{} px)", image.name, image.size[0], image.size[1]));
            } else {
                ui.label("Image size:");
                ui.add(
                    egui::DragValue::new(&mut self.vision.image_size.0)
                        .range(1.0..=20000.0)
                        .suffix(" px"),
                );
                ui.label("×");
                ui.add(
                    egui::DragValue::new(&mut self.vision.image_size.1)
                        .range(1.0..=20000.0)
                        .suffix(" px"),
                );
            }
        });

        if let Some(err) = &self.vision.parse_error {
            ui.colored_label(HIGHLIGHT_COLOR, err);
        }
        ui.separator();

        ui.columns(2, |columns| {
            egui::ScrollArea::vertical()
                .id_salt("vision_response_editor")
                .show(&mut columns[0], |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.vision.response_text)
                            .code_editor()
                            .desired_rows(24)
                            .desired_width(f32::INFINITY)
                            .hint_text("Paste an images:annotate response"),
                    );
                });

            egui::ScrollArea::vertical()
                .id_salt("vision_results")
                .show(&mut columns[1], |ui| self.draw_vision_results(ui));
        });
    }

    fn draw_vision_results(&mut self, ui: &mut egui::Ui) {
        self.ensure_vision_texture(ui.ctx());
        let Some(result) = self.vision.result.clone() else {
            ui.label("No response parsed yet.");
            return;
        };

        if let Some(err) = &result.error {
            ui.colored_label(HIGHLIGHT_COLOR, format!("Provider error: {err}"));
        }
        if result.is_empty() {
            ui.label("Nothing was recognized.");
        }

        self.draw_overlay_preview(ui, &result);

        if let Some((index, text)) = self
            .vision
            .selected_text
            .and_then(|i| result.texts.get(i).map(|t| (i, t)))
        {
            let texture = self
                .vision
                .image
                .as_ref()
                .and_then(|image| image.texture.as_ref())
                .map(|texture| texture.id());
            let zoom = texture.zip(self.text_zoom_uv(index));
            let (img_w, img_h) = self.vision.image_size;
            ui.group(|ui| {
                if let Some((texture, uv)) = zoom {
                    let crop = egui::vec2(uv.width() * img_w, uv.height() * img_h);
                    let scale = (ZOOM_WIDTH / crop.x.max(1.0)).min(MAX_ZOOM);
                    ui.add(egui::Image::new((texture, crop * scale)).uv(uv));
                }
                ui.label(egui::RichText::new(&text.text).size(28.0).strong());
                ui.label(format!("Confidence {}", score_percent(text.confidence)));
            });
        }

        egui::CollapsingHeader::new(format!("Labels ({})", result.labels.len()))
            .default_open(true)
            .show(ui, |ui| {
                for label in &result.labels {
                    ui.label(format!("{} ({})", label.description, score_percent(label.score)));
                }
            });

        egui::CollapsingHeader::new(format!("Objects ({})", result.objects.len()))
            .default_open(true)
            .show(ui, |ui| {
                for object in &result.objects {
                    ui.colored_label(
                        OBJECT_COLOR,
                        format!("{} ({})", object.name, score_percent(object.score)),
                    );
                }
            });

        egui::CollapsingHeader::new(format!("Text ({})", result.texts.len()))
            .default_open(true)
            .show(ui, |ui| {
                for (i, text) in result.texts.iter().enumerate() {
                    let selected = self.vision.selected_text == Some(i);
                    if ui
                        .selectable_label(selected, format!("{} ({})", text.text, score_percent(text.confidence)))
                        .clicked()
                    {
                        self.vision.selected_text = if selected { None } else { Some(i) };
                    }
                }
            });
    }

    /// Draws the image frame with object and text boxes placed by percentage.
    fn draw_overlay_preview(&self, ui: &mut egui::Ui, result: &VisionResult) {
        let (img_w, img_h) = self.vision.image_size;
        let width = ui.available_width().max(50.0);
        let height = (width * img_h / img_w.max(1.0)).clamp(50.0, 480.0);
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
        let painter = ui.painter_at(rect);

        match self.vision.image.as_ref().and_then(|image| image.texture.as_ref()) {
            Some(texture) => painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            ),
            None => painter.rect_filled(rect, 2.0, egui::Color32::from_gray(235)),
        };
        painter.rect_stroke(
            rect,
            2.0,
            egui::Stroke::new(1.0, egui::Color32::from_gray(160)),
            StrokeKind::Inside,
        );

        let to_rect = |b: OverlayBox| {
            egui::Rect::from_min_size(
                rect.min + egui::vec2(rect.width() * b.left / 100.0, rect.height() * b.top / 100.0),
                egui::vec2(rect.width() * b.width / 100.0, rect.height() * b.height / 100.0),
            )
        };

        for object in &result.objects {
            if let Some(b) = overlay_box(&object.vertices) {
                let r = to_rect(b);
                painter.rect_stroke(r, 0.0, egui::Stroke::new(2.0, OBJECT_COLOR), StrokeKind::Outside);
                painter.text(
                    r.left_top(),
                    egui::Align2::LEFT_BOTTOM,
                    &object.name,
                    egui::FontId::proportional(11.0),
                    OBJECT_COLOR,
                );
            }
        }

        for (i, text) in result.texts.iter().enumerate() {
            let vertices = normalize_vertices(&text.vertices, Some(self.vision.image_size));
            if let Some(b) = overlay_box(&vertices) {
                let color = if self.vision.selected_text == Some(i) {
                    HIGHLIGHT_COLOR
                } else {
                    TEXT_COLOR
                };
                painter.rect_stroke(to_rect(b), 0.0, egui::Stroke::new(1.5, color), StrokeKind::Outside);
            }
        }
    }
}
