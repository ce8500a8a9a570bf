//! # Pedigree Diagram
//!
//! An interactive floor diagram editor. A building is drawn as a stack of floor
//! panels, one per floor, joined top to bottom by orthogonal connectors.
//! Panels carry optional accessories:
//! - **Splitters**: drawn as a downward triangle
//! - **Boosters**: drawn as a filled circle
//!
//! ## Features
//! - Panel generation from a floor count, wrapping into sub-columns
//! - Dragging, corner resizing and accessory selection on the canvas
//! - Connector routing that follows every edit
//! - Undo/redo, SVG and PNG export
//! - A vision overlay viewer and a static map URL builder

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
mod layout;
pub mod overlay;
mod routing;
pub mod static_map;
mod types;
mod ui;

// Re-export public types and functions
pub use layout::{generate_panels, max_panels_per_column, slot_geometry, LayoutSummary};
pub use routing::{route_connectors, route_path};
pub use types::*;
pub use ui::{
    build_svg, ActiveTab, DiagramApp, DialogResult, ExportOptions, UndoAction, UndoHistory,
    UndoableDiagram,
};

/// Runs the diagram application with default settings.
///
/// This function initializes the egui application window and starts the main event loop.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// use pedigree_diagram::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Pedigree Diagram")
            .with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Pedigree Diagram",
        options,
        Box::new(|_cc| Ok(Box::new(DiagramApp::default()))),
    )
}

/// Starts the application inside a browser canvas.
#[cfg(target_arch = "wasm32")]
pub async fn start_web(
    canvas: web_sys::HtmlCanvasElement,
) -> Result<(), eframe::wasm_bindgen::JsValue> {
    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(|_cc| Ok(Box::new(DiagramApp::default()))),
        )
        .await
}
