//! Shared application-wide constants.
//! Centralizes tweakable values used by the layout engine, rendering and interactions.

// Panel layout
/// Height of the drawing stage; the secondary column wraps once it is full.
pub const STAGE_HEIGHT: f32 = 600.0;
/// Width of the drawing stage.
pub const STAGE_WIDTH: f32 = 800.0;
/// Vertical pitch of a secondary panel (panel height plus margin).
pub const PANEL_PITCH: f32 = 80.0;
/// Default width of a secondary panel.
pub const PANEL_WIDTH: f32 = 120.0;
/// Default height of a secondary panel.
pub const PANEL_HEIGHT: f32 = 60.0;
/// Top-left corner of the anchor (highest floor) panel.
pub const ANCHOR_POSITION: (f32, f32) = (40.0, 50.0);
/// Footprint of the anchor panel.
pub const ANCHOR_SIZE: (f32, f32) = (160.0, 100.0);
/// X coordinate of the first sub-column of the secondary column.
pub const SECONDARY_COLUMN_X: f32 = 280.0;
/// Horizontal distance between sub-columns.
pub const COLUMN_SPACING: f32 = 200.0;
/// Y coordinate of the first row.
pub const ROW_TOP: f32 = 50.0;

// Resize limits
/// Smallest width a panel can be resized to.
pub const MIN_PANEL_WIDTH: f32 = 50.0;
/// Smallest height a panel can be resized to.
pub const MIN_PANEL_HEIGHT: f32 = 30.0;

// Connector routing
/// Offsets at or below this distance are treated as aligned.
pub const ROUTING_TOLERANCE: f32 = 5.0;

// Accessory markers
/// Relative vertical placement of the splitter marker inside a panel.
pub const SPLITTER_ANCHOR_RATIO: f32 = 0.35;
/// Relative vertical placement of the booster marker inside a panel.
pub const BOOSTER_ANCHOR_RATIO: f32 = 0.7;
/// Hit radius around an accessory marker, in world units.
pub const ACCESSORY_HIT_RADIUS: f32 = 10.0;

// Floor form
/// Smallest floor count accepted by the form.
pub const MIN_FLOOR_COUNT: u32 = 2;
/// Largest floor count accepted by the form.
pub const MAX_FLOOR_COUNT: u32 = 50;
/// Floor count pre-filled in the form.
pub const DEFAULT_FLOOR_COUNT: u32 = 10;

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 100.0;
/// Side length of the square resize handle, in screen pixels.
pub const RESIZE_HANDLE_SIZE: f32 = 10.0;

// Undo/redo
/// Maximum number of undo history entries to retain.
pub const MAX_UNDO_HISTORY: usize = 100;

// Maps
/// Zoom level used by the interactive map view.
pub const DEFAULT_MAP_ZOOM: u8 = 18;
/// Edge length of a Web Mercator tile in pixels.
pub const MAP_TILE_SIZE: f64 = 256.0;

// Colors shared by the canvas and the SVG export
/// Connector stroke.
pub const CONNECTOR_RGB: [u8; 3] = [0x00, 0x66, 0xcc];
/// Panel fill.
pub const PANEL_FILL_RGB: [u8; 3] = [0xf5, 0xf7, 0xfa];
/// Panel outline.
pub const PANEL_STROKE_RGB: [u8; 3] = [0x33, 0x33, 0x33];
/// Splitter marker.
pub const SPLITTER_RGB: [u8; 3] = [0x2e, 0x8b, 0x57];
/// Booster marker.
pub const BOOSTER_RGB: [u8; 3] = [0xe6, 0x7e, 0x22];
/// Highlight for the selected accessory and the inspected panel.
pub const SELECTION_RGB: [u8; 3] = [0xff, 0x3b, 0x30];
/// Radius of an accessory marker, in world units.
pub const ACCESSORY_MARKER_RADIUS: f32 = 7.0;
/// Dash and gap length of connector lines, in world units.
pub const CONNECTOR_DASH: (f32, f32) = (6.0, 4.0);
