//! Export utilities: render the current diagram to SVG and PNG.
//!
//! Notes:
//! - SVG export is supported on all targets (native + wasm).
//! - PNG export is supported on native targets only (wasm skipped).

use crate::constants;
use crate::types::*;
use std::fmt::Write as _;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;

use super::state::{DiagramApp, DialogResult, ExportOptions};

/// Vertical room reserved above each panel for its label.
const LABEL_HEIGHT: f32 = 16.0;

impl DiagramApp {
    /// Export to SVG: open a save dialog (native) or trigger a download (wasm).
    pub fn export_svg(&mut self, ctx: &eframe::egui::Context) {
        let (svg, _w, _h) = build_svg(&self.diagram, &self.export);

        #[cfg(target_arch = "wasm32")]
        {
            let result = match trigger_download("floor-diagram.svg", &svg) {
                Ok(()) => DialogResult::ExportCompleted("floor-diagram.svg".to_string()),
                Err(e) => DialogResult::OperationFailed(format!("Failed to start SVG download: {e}")),
            };
            let _ = self.dialog_sender.send(result);
            ctx.request_repaint();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = ctx.clone();
            let sender = self.dialog_sender.clone();
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("SVG", &["svg"])
                    .set_file_name("floor-diagram.svg")
                    .save_file()
                    .await
                {
                    let path = handle.path();
                    let result = match std::fs::write(path, svg.as_bytes()) {
                        Ok(()) => DialogResult::ExportCompleted(path.display().to_string()),
                        Err(e) => DialogResult::OperationFailed(format!("Failed to save SVG: {e}")),
                    };
                    let _ = sender.send(result);
                }
                ctx.request_repaint();
            });
        }
    }

    /// Export to PNG (native builds only).
    pub fn export_png(&mut self, ctx: &eframe::egui::Context) {
        #[cfg(target_arch = "wasm32")]
        {
            let _ = self.dialog_sender.send(DialogResult::OperationFailed(
                "PNG export is not available in the browser".to_string(),
            ));
            ctx.request_repaint();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let pixmap = match render_png(&self.diagram, &self.export) {
                Ok(p) => p,
                Err(e) => {
                    log::error!("{e}");
                    let _ = self.dialog_sender.send(DialogResult::OperationFailed(e));
                    return;
                }
            };

            let ctx = ctx.clone();
            let sender = self.dialog_sender.clone();
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("PNG", &["png"])
                    .set_file_name("floor-diagram.png")
                    .save_file()
                    .await
                {
                    let path = handle.path();
                    let result = match pixmap.save_png(path) {
                        Ok(()) => DialogResult::ExportCompleted(path.display().to_string()),
                        Err(e) => DialogResult::OperationFailed(format!("Failed to save PNG: {e}")),
                    };
                    let _ = sender.send(result);
                }
                ctx.request_repaint();
            });
        }
    }
}

/// Rasterizes the SVG rendition of `diagram`.
#[cfg(not(target_arch = "wasm32"))]
pub fn render_png(
    diagram: &FloorDiagram,
    options: &ExportOptions,
) -> Result<tiny_skia::Pixmap, String> {
    let (svg, width, height) = build_svg(diagram, options);

    let mut opt = usvg::Options::default();
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    opt.fontdb = Arc::new(db);

    let tree = usvg::Tree::from_data(svg.as_bytes(), &opt)
        .map_err(|e| format!("Failed to parse SVG for PNG export: {e}"))?;

    let scale = options.png_scale.clamp(0.25, 8.0);
    let out_w = ((width as f32) * scale).round().max(1.0) as u32;
    let out_h = ((height as f32) * scale).round().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(out_w, out_h)
        .ok_or_else(|| format!("Failed to create pixmap {out_w}x{out_h}"))?;

    if options.include_background {
        let c = options.background_color;
        pixmap.fill(tiny_skia::Color::from_rgba8(c.r(), c.g(), c.b(), c.a()));
    }

    let transform = tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

fn hex(c: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", c[0], c[1], c[2])
}

/// Build an SVG string for the diagram. Returns (svg, width, height).
///
/// The document covers the panels and their labels plus `margin_px` on every
/// side. An empty diagram yields a stage-sized document.
pub fn build_svg(diagram: &FloorDiagram, options: &ExportOptions) -> (String, u32, u32) {
    let margin = options.margin_px.max(0.0);

    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for panel in &diagram.panels {
        let (w, h) = panel.displayed_size();
        min_x = min_x.min(panel.position.0);
        max_x = max_x.max(panel.position.0 + w);
        min_y = min_y.min(panel.position.1 - LABEL_HEIGHT);
        max_y = max_y.max(panel.position.1 + h);
    }
    if !min_x.is_finite() || !min_y.is_finite() {
        min_x = 0.0;
        min_y = 0.0;
        max_x = constants::STAGE_WIDTH;
        max_y = constants::STAGE_HEIGHT;
    }

    let width = ((max_x - min_x) + 2.0 * margin).ceil().max(1.0) as u32;
    let height = ((max_y - min_y) + 2.0 * margin).ceil().max(1.0) as u32;

    let map_x = |x: f32| x - min_x + margin;
    let map_y = |y: f32| y - min_y + margin;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );

    if options.include_background {
        let c = options.background_color;
        let _ = writeln!(
            out,
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#{:02x}{:02x}{:02x}\" fill-opacity=\"{}\" />",
            width,
            height,
            c.r(),
            c.g(),
            c.b(),
            (c.a() as f32) / 255.0
        );
    }

    if options.include_grid {
        let grid = constants::GRID_SIZE.max(4.0);
        let _ = writeln!(out, "<g stroke=\"#cccccc\" stroke-opacity=\"0.15\" stroke-width=\"1\">");
        let mut x = (min_x / grid).floor() * grid;
        while x <= max_x {
            let sx = map_x(x);
            let _ = writeln!(out, "  <line x1=\"{sx}\" y1=\"0\" x2=\"{sx}\" y2=\"{height}\" />");
            x += grid;
        }
        let mut y = (min_y / grid).floor() * grid;
        while y <= max_y {
            let sy = map_y(y);
            let _ = writeln!(out, "  <line x1=\"0\" y1=\"{sy}\" x2=\"{width}\" y2=\"{sy}\" />");
            y += grid;
        }
        let _ = writeln!(out, "</g>");
    }

    // Connectors
    let (dash, gap) = constants::CONNECTOR_DASH;
    let _ = writeln!(
        out,
        "<g stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"{} {}\" fill=\"none\">",
        hex(constants::CONNECTOR_RGB),
        dash,
        gap
    );
    for connector in diagram.connectors() {
        let points: Vec<String> = connector
            .waypoints
            .iter()
            .map(|&(x, y)| format!("{:.1},{:.1}", map_x(x), map_y(y)))
            .collect();
        let _ = writeln!(
            out,
            "  <polyline data-from=\"{}\" data-to=\"{}\" points=\"{}\" />",
            connector.from,
            connector.to,
            points.join(" ")
        );
    }
    let _ = writeln!(out, "</g>");

    // Panels
    for panel in &diagram.panels {
        let (w, h) = panel.displayed_size();
        let x = map_x(panel.position.0);
        let y = map_y(panel.position.1);
        let _ = writeln!(
            out,
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"4\" ry=\"4\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\" />",
            x,
            y,
            w,
            h,
            hex(constants::PANEL_FILL_RGB),
            hex(constants::PANEL_STROKE_RGB)
        );
        let _ = writeln!(
            out,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"#282828\" text-anchor=\"middle\">{}</text>",
            x + w / 2.0,
            y - 3.0,
            escape_xml(&panel.room_label())
        );

        for kind in AccessoryKind::ALL {
            if !panel.has_accessory(kind) {
                continue;
            }
            let (ax, ay) = panel.accessory_anchor(kind);
            let (cx, cy) = (map_x(ax), map_y(ay));
            let r = constants::ACCESSORY_MARKER_RADIUS;
            match kind {
                AccessoryKind::Splitter => {
                    let _ = writeln!(
                        out,
                        "<polygon points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"{}\" />",
                        cx - r,
                        cy - r * 0.8,
                        cx + r,
                        cy - r * 0.8,
                        cx,
                        cy + r,
                        hex(constants::SPLITTER_RGB)
                    );
                }
                AccessoryKind::Booster => {
                    let _ = writeln!(
                        out,
                        "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"{}\" />",
                        cx,
                        cy,
                        r,
                        hex(constants::BOOSTER_RGB)
                    );
                }
            }
        }
    }

    let _ = writeln!(out, "</svg>");
    (out, width, height)
}

/// Triggers a file download in the browser (WASM only).
///
/// # Arguments
///
/// * `filename` - The name to give the downloaded file
/// * `content` - The SVG document
#[cfg(target_arch = "wasm32")]
fn trigger_download(filename: &str, content: &str) -> Result<(), String> {
    use eframe::wasm_bindgen::{JsCast, JsValue};

    let window = web_sys::window().ok_or("No window found")?;
    let document = window.document().ok_or("No document found")?;

    let blob_parts = js_sys::Array::new();
    blob_parts.push(&JsValue::from_str(content));

    let blob_options = web_sys::BlobPropertyBag::new();
    blob_options.set_type("image/svg+xml");

    let blob = web_sys::Blob::new_with_str_sequence_and_options(&blob_parts, &blob_options)
        .map_err(|_| "Failed to create blob")?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|_| "Failed to create object URL")?;

    let anchor = document
        .create_element("a")
        .map_err(|_| "Failed to create anchor element")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "Failed to cast to anchor element")?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.style().set_property("display", "none").ok();

    let body = document.body().ok_or("No body found")?;
    body.append_child(&anchor)
        .map_err(|_| "Failed to append anchor")?;
    anchor.click();
    body.remove_child(&anchor)
        .map_err(|_| "Failed to remove anchor")?;

    web_sys::Url::revoke_object_url(&url).map_err(|_| "Failed to revoke object URL")?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}
