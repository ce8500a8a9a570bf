//! Application state management structures.
//!
//! This module contains the state structures that track the application's
//! current UI state: canvas navigation, panel interactions, the floor form,
//! the map and vision tabs, and async export/import results.

use super::undo::UndoHistory;
use crate::constants;
use crate::overlay::VisionResult;
use crate::static_map::{MapLocation, StaticMapConfig};
use crate::types::*;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Tabs shown in the top bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTab {
    /// Floor/pedigree diagram editor
    Diagram,
    /// Vision recognition overlay
    Vision,
    /// Static map builder
    Map,
}

/// State related to canvas navigation and display.
///
/// Tracks the current pan offset, zoom level, and display options for the canvas.
pub struct CanvasState {
    /// Current canvas pan offset for navigation (in screen space)
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = normal, 2.0 = 2x zoom, 0.5 = 50% zoom)
    pub zoom_factor: f32,
    /// Whether the grid should be displayed on the canvas
    pub show_grid: bool,
    /// Whether the offset has been aligned to the canvas rect yet
    pub initialized: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            show_grid: true,
            initialized: false,
        }
    }
}

/// State related to user interactions with panels and canvas.
#[derive(Default)]
pub struct InteractionState {
    /// Panel shown in the properties panel
    pub selected_panel: Option<PanelId>,
    /// Panel currently being dragged by the user
    pub dragging_panel: Option<PanelId>,
    /// Offset from the mouse to the panel's top-left corner during dragging
    pub panel_drag_offset: egui::Vec2,
    /// Position before the drag started (for undo)
    pub drag_original_position: Option<(f32, f32)>,
    /// Panel currently being resized via its corner handle
    pub resizing_panel: Option<PanelId>,
    /// Size before the resize started (for undo)
    pub resize_original_size: Option<(f32, f32)>,
    /// Whether the user is currently panning the canvas
    pub is_panning: bool,
    /// Last mouse position during panning operation
    pub last_pan_pos: Option<egui::Pos2>,
}

/// Values bound to the floor generation form.
pub struct FloorFormState {
    /// Highest floor to generate
    pub floor_count: u32,
    /// Attach splitters to generated panels
    pub splitter: bool,
    /// Attach boosters to generated panels
    pub booster: bool,
}

impl Default for FloorFormState {
    fn default() -> Self {
        Self {
            floor_count: constants::DEFAULT_FLOOR_COUNT,
            splitter: true,
            booster: false,
        }
    }
}

impl FloorFormState {
    /// Accessory flags from the form checkboxes.
    pub fn defaults(&self) -> AccessoryDefaults {
        AccessoryDefaults {
            splitter: self.splitter,
            booster: self.booster,
        }
    }
}

/// State of the static map tab.
pub struct MapState {
    /// Center of the interactive viewport
    pub center: MapLocation,
    /// Current pin
    pub location: MapLocation,
    /// Zoom used for the viewport and the static image
    pub zoom: u8,
    /// Provider settings read at startup
    pub config: StaticMapConfig,
    /// Last generated static map URL
    pub generated_url: Option<String>,
    /// Last error message shown to the user
    pub status: Option<String>,
}

impl Default for MapState {
    fn default() -> Self {
        Self {
            center: MapLocation::default(),
            location: MapLocation::default(),
            zoom: constants::DEFAULT_MAP_ZOOM,
            config: StaticMapConfig::from_env(),
            generated_url: None,
            status: None,
        }
    }
}

/// Image opened in the vision tab.
pub struct VisionImage {
    /// File name shown above the preview
    pub name: String,
    /// Decoded pixel size
    pub size: [usize; 2],
    /// Decoded pixels waiting to be uploaded
    pub pending: Option<egui::ColorImage>,
    /// GPU texture once uploaded
    pub texture: Option<egui::TextureHandle>,
}

/// State of the vision overlay tab.
#[derive(Default)]
pub struct VisionState {
    /// Raw response JSON being edited
    pub response_text: String,
    /// Parsed result of the last successful parse
    pub result: Option<VisionResult>,
    /// Parse error of the last attempt
    pub parse_error: Option<String>,
    /// Analyzed image, if one was opened
    pub image: Option<VisionImage>,
    /// Pixel size of the analyzed image, used to normalize text boxes
    pub image_size: (f32, f32),
    /// Index of the text region shown in the zoom preview
    pub selected_text: Option<usize>,
}

/// Messages sent from async dialogs back to the main app.
#[derive(Debug)]
pub enum DialogResult {
    /// A file was written to the given path
    ExportCompleted(String),
    /// A vision response file was read
    ResponseLoaded(String),
    /// An image file was read; `bytes` are still encoded
    ImageLoaded {
        /// File name
        name: String,
        /// Encoded file content
        bytes: Vec<u8>,
    },
    /// Operation failed with an error message
    OperationFailed(String),
}

/// Export settings for SVG/PNG output.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Margin around the diagram bounds in pixels
    pub margin_px: f32,
    /// Fill the background with `background_color`
    pub include_background: bool,
    /// Background fill color
    pub background_color: egui::Color32,
    /// Draw the background grid
    pub include_grid: bool,
    /// PNG pixel scale
    pub png_scale: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            margin_px: 40.0,
            include_background: true,
            background_color: egui::Color32::WHITE,
            include_grid: false,
            png_scale: 2.0,
        }
    }
}

/// The main application structure containing UI state and the floor diagram.
///
/// This struct implements the `eframe::App` trait and handles all user interface
/// rendering and interaction logic.
pub struct DiagramApp {
    /// The diagram being edited
    pub diagram: FloorDiagram,
    /// Selected tab
    pub active_tab: ActiveTab,
    /// Canvas navigation and display state
    pub canvas: CanvasState,
    /// User interaction state
    pub interaction: InteractionState,
    /// Floor generation form
    pub form: FloorFormState,
    /// Static map tab
    pub map: MapState,
    /// Vision overlay tab
    pub vision: VisionState,
    /// Export settings
    pub export: ExportOptions,
    /// Undo/redo history for tracking and reversing actions
    pub undo_history: UndoHistory,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Message shown in the status bar
    pub status_message: Option<String>,
    /// Channel for receiving dialog results from async contexts
    pub dialog_sender: Sender<DialogResult>,
    /// Receiving end drained each frame
    pub dialog_receiver: Receiver<DialogResult>,
}

impl Default for DiagramApp {
    fn default() -> Self {
        let (dialog_sender, dialog_receiver) = channel();
        Self {
            diagram: FloorDiagram::default(),
            active_tab: ActiveTab::Diagram,
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            form: FloorFormState::default(),
            map: MapState::default(),
            vision: VisionState {
                image_size: (1000.0, 1000.0),
                ..VisionState::default()
            },
            export: ExportOptions::default(),
            undo_history: UndoHistory::new(),
            dark_mode: false,
            status_message: None,
            dialog_sender,
            dialog_receiver,
        }
    }
}
