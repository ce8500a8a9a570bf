//! Core data types for the floor diagram.
//!
//! This module defines the panel records, the derived connectors and the
//! `FloorDiagram` container that the layout engine and the UI operate on.

use crate::constants;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a floor panel. Derived from the floor number, so it stays
/// stable across re-renders of the same generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PanelId(pub u32);

impl PanelId {
    /// Returns the identifier for the given floor.
    pub fn for_floor(floor: u32) -> Self {
        Self(floor)
    }

    /// The floor number this identifier was derived from.
    pub fn floor(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "floor-{}", self.0)
    }
}

/// Markers that can be attached to a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessoryKind {
    /// Signal splitter, drawn as a downward triangle
    Splitter,
    /// Signal booster, drawn as a filled circle
    Booster,
}

impl AccessoryKind {
    /// Both kinds, in drawing order.
    pub const ALL: [AccessoryKind; 2] = [AccessoryKind::Splitter, AccessoryKind::Booster];

    /// Human readable name.
    pub fn label(self) -> &'static str {
        match self {
            AccessoryKind::Splitter => "Splitter",
            AccessoryKind::Booster => "Booster",
        }
    }
}

/// Accessory flags applied uniformly to every generated panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryDefaults {
    /// Attach a splitter to every panel
    pub splitter: bool,
    /// Attach a booster to every panel
    pub booster: bool,
}

/// The one accessory currently selected across the whole diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorySelection {
    /// Panel carrying the selected accessory
    pub panel: PanelId,
    /// Which accessory on that panel
    pub kind: AccessoryKind,
}

/// One rendered floor unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPanel {
    /// Identifier derived from `floor`
    pub id: PanelId,
    /// Floor number, always 2 or above for generated panels
    pub floor: u32,
    /// Top-left corner in canvas units
    pub position: (f32, f32),
    /// Width and height in canvas units
    pub size: (f32, f32),
    /// Live scale of an in-progress resize gesture; identity otherwise
    #[serde(skip, default = "identity_scale")]
    pub scale: (f32, f32),
    /// Whether a splitter is attached
    pub has_splitter: bool,
    /// Whether a booster is attached
    pub has_booster: bool,
}

fn identity_scale() -> (f32, f32) {
    (1.0, 1.0)
}

impl FloorPanel {
    /// Creates a panel for `floor` at the given position and size with no accessories.
    pub fn new(floor: u32, position: (f32, f32), size: (f32, f32)) -> Self {
        Self {
            id: PanelId::for_floor(floor),
            floor,
            position,
            size,
            scale: identity_scale(),
            has_splitter: false,
            has_booster: false,
        }
    }

    /// Size including any in-progress resize scale.
    pub fn displayed_size(&self) -> (f32, f32) {
        (self.size.0 * self.scale.0, self.size.1 * self.scale.1)
    }

    /// Center point `(x + w/2, y + h/2)`.
    pub fn center(&self) -> (f32, f32) {
        let (w, h) = self.displayed_size();
        (self.position.0 + w / 2.0, self.position.1 + h / 2.0)
    }

    /// Returns true if `point` lies inside the panel rectangle (edges included).
    pub fn contains(&self, point: (f32, f32)) -> bool {
        let (w, h) = self.displayed_size();
        point.0 >= self.position.0
            && point.0 <= self.position.0 + w
            && point.1 >= self.position.1
            && point.1 <= self.position.1 + h
    }

    /// Whether the given accessory is attached.
    pub fn has_accessory(&self, kind: AccessoryKind) -> bool {
        match kind {
            AccessoryKind::Splitter => self.has_splitter,
            AccessoryKind::Booster => self.has_booster,
        }
    }

    /// Sets the attachment flag of the given accessory.
    pub fn set_accessory(&mut self, kind: AccessoryKind, attached: bool) {
        match kind {
            AccessoryKind::Splitter => self.has_splitter = attached,
            AccessoryKind::Booster => self.has_booster = attached,
        }
    }

    /// Point where the accessory marker is drawn and hit-tested.
    pub fn accessory_anchor(&self, kind: AccessoryKind) -> (f32, f32) {
        let (w, h) = self.displayed_size();
        let ratio = match kind {
            AccessoryKind::Splitter => constants::SPLITTER_ANCHOR_RATIO,
            AccessoryKind::Booster => constants::BOOSTER_ANCHOR_RATIO,
        };
        (self.position.0 + w / 2.0, self.position.1 + h * ratio)
    }

    /// Room label shown above the panel, e.g. `Room 401`.
    pub fn room_label(&self) -> String {
        format!("Room {}01", self.floor)
    }
}

/// Derived orthogonal path between two consecutive panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    /// Panel the path starts from (higher floor)
    pub from: PanelId,
    /// Panel the path ends at (next lower floor)
    pub to: PanelId,
    /// Ordered waypoints from the source center to the target center
    pub waypoints: Vec<(f32, f32)>,
}

/// The panel set being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloorDiagram {
    /// Panels in generation order (highest floor first)
    pub panels: Vec<FloorPanel>,
    /// The single selected accessory, if any
    #[serde(default)]
    pub selected_accessory: Option<AccessorySelection>,
    /// Accessory flags used by the most recent generation
    #[serde(default)]
    pub defaults: AccessoryDefaults,
}

impl FloorDiagram {
    /// Creates an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the diagram to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a diagram from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Looks up a panel by identifier.
    pub fn panel(&self, id: PanelId) -> Option<&FloorPanel> {
        self.panels.iter().find(|p| p.id == id)
    }

    /// Mutable lookup by identifier.
    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut FloorPanel> {
        self.panels.iter_mut().find(|p| p.id == id)
    }

    /// Whether `kind` on `panel` is the current selection.
    pub fn is_selected(&self, panel: PanelId, kind: AccessoryKind) -> bool {
        self.selected_accessory == Some(AccessorySelection { panel, kind })
    }

    /// Returns true when no panels exist.
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
