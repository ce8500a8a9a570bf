//! Layout engine for the floor diagram.
//!
//! Generates the panel stack from a floor count and applies the discrete edits
//! triggered by the canvas: move, resize, accessory selection and removal.
//! Every operation runs to completion synchronously and is total over a
//! well-formed diagram.

use crate::constants;
use crate::types::*;

/// Number of secondary panels that fit in one sub-column.
pub fn max_panels_per_column() -> usize {
    (constants::STAGE_HEIGHT / constants::PANEL_PITCH).floor() as usize
}

/// Top-left corner and size of the panel at `index` in generation order.
///
/// Index 0 is the anchor panel; the rest fill the secondary column top to
/// bottom and wrap into a new sub-column when it is full.
pub fn slot_geometry(index: usize) -> ((f32, f32), (f32, f32)) {
    if index == 0 {
        return (constants::ANCHOR_POSITION, constants::ANCHOR_SIZE);
    }
    let per_column = max_panels_per_column().max(1);
    let slot = index - 1;
    let column = slot / per_column;
    let row = slot % per_column;
    let x = constants::SECONDARY_COLUMN_X + column as f32 * constants::COLUMN_SPACING;
    let y = constants::ROW_TOP + row as f32 * constants::PANEL_PITCH;
    ((x, y), (constants::PANEL_WIDTH, constants::PANEL_HEIGHT))
}

/// Builds panels for floors `floor_count` down to 2.
///
/// A floor count below 2 yields no panels; range checks belong to the input form.
pub fn generate_panels(floor_count: u32, defaults: AccessoryDefaults) -> Vec<FloorPanel> {
    (2..=floor_count)
        .rev()
        .enumerate()
        .map(|(index, floor)| {
            let (position, size) = slot_geometry(index);
            let mut panel = FloorPanel::new(floor, position, size);
            panel.has_splitter = defaults.splitter;
            panel.has_booster = defaults.booster;
            panel
        })
        .collect()
}

/// Overview of the current layout, shown under the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSummary {
    /// Number of panels
    pub panel_count: usize,
    /// Highest floor number present
    pub top_floor: Option<u32>,
    /// Sub-columns used by the secondary column
    pub secondary_columns: usize,
}

impl FloorDiagram {
    /// Replaces the whole panel set with a freshly generated one.
    ///
    /// The previous panels and the accessory selection are discarded.
    pub fn generate(&mut self, floor_count: u32, defaults: AccessoryDefaults) {
        self.panels = generate_panels(floor_count, defaults);
        self.selected_accessory = None;
        self.defaults = defaults;
        log::debug!(
            "generated {} panels for floor count {}",
            self.panels.len(),
            floor_count
        );
    }

    /// Moves a panel's top-left corner. No clamping or collision checks.
    ///
    /// Returns `false` if the panel doesn't exist.
    pub fn move_panel(&mut self, id: PanelId, position: (f32, f32)) -> bool {
        match self.panel_mut(id) {
            Some(panel) => {
                panel.position = position;
                true
            }
            None => false,
        }
    }

    /// Applies scale factors to a panel's size and resets its live scale.
    ///
    /// Width never drops below 50 and height never below 30, whatever the
    /// factors (zero, negative and non-finite included).
    pub fn resize_panel(&mut self, id: PanelId, scale_x: f32, scale_y: f32) -> bool {
        match self.panel_mut(id) {
            Some(panel) => {
                panel.size = (
                    clamp_dimension(panel.size.0 * scale_x, constants::MIN_PANEL_WIDTH),
                    clamp_dimension(panel.size.1 * scale_y, constants::MIN_PANEL_HEIGHT),
                );
                panel.scale = (1.0, 1.0);
                true
            }
            None => false,
        }
    }

    /// Sets the live scale of an in-progress resize gesture.
    pub fn set_live_scale(&mut self, id: PanelId, scale: (f32, f32)) {
        if let Some(panel) = self.panel_mut(id) {
            panel.scale = scale;
        }
    }

    /// Toggles the selection of one accessory on one panel.
    ///
    /// Selecting clears any other selection in the diagram, including the other
    /// kind on the same panel. Toggling the current selection deselects it.
    pub fn toggle_accessory_selection(&mut self, id: PanelId, kind: AccessoryKind) -> bool {
        if self.panel(id).is_none() {
            return false;
        }
        let target = AccessorySelection { panel: id, kind };
        self.selected_accessory = if self.selected_accessory == Some(target) {
            None
        } else {
            Some(target)
        };
        true
    }

    /// Detaches an accessory from a panel, dropping its selection if it had one.
    pub fn remove_accessory(&mut self, id: PanelId, kind: AccessoryKind) -> bool {
        let Some(panel) = self.panel_mut(id) else {
            return false;
        };
        panel.set_accessory(kind, false);
        if self.is_selected(id, kind) {
            self.selected_accessory = None;
        }
        true
    }

    /// Re-attaches an accessory to a panel.
    pub fn attach_accessory(&mut self, id: PanelId, kind: AccessoryKind) -> bool {
        match self.panel_mut(id) {
            Some(panel) => {
                panel.set_accessory(kind, true);
                true
            }
            None => false,
        }
    }

    /// Counts panels and secondary sub-columns.
    pub fn summary(&self) -> LayoutSummary {
        let secondary = self.panels.len().saturating_sub(1);
        LayoutSummary {
            panel_count: self.panels.len(),
            top_floor: self.panels.iter().map(|p| p.floor).max(),
            secondary_columns: secondary.div_ceil(max_panels_per_column().max(1)),
        }
    }

    /// Finds the topmost panel under a world position.
    ///
    /// Later panels are drawn on top, so they win.
    pub fn panel_at(&self, point: (f32, f32)) -> Option<PanelId> {
        self.panels
            .iter()
            .rev()
            .find(|p| p.contains(point))
            .map(|p| p.id)
    }

    /// Finds an attached accessory marker within `radius` of a world position.
    pub fn accessory_at(&self, point: (f32, f32), radius: f32) -> Option<AccessorySelection> {
        self.panels.iter().rev().find_map(|panel| {
            AccessoryKind::ALL.into_iter().find_map(|kind| {
                if !panel.has_accessory(kind) {
                    return None;
                }
                let (ax, ay) = panel.accessory_anchor(kind);
                let (dx, dy) = (point.0 - ax, point.1 - ay);
                (dx * dx + dy * dy <= radius * radius).then_some(AccessorySelection {
                    panel: panel.id,
                    kind,
                })
            })
        })
    }
}

fn clamp_dimension(value: f32, min: f32) -> f32 {
    if value.is_finite() {
        value.max(min)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn splitter_only() -> AccessoryDefaults {
        AccessoryDefaults {
            splitter: true,
            booster: false,
        }
    }

    #[test]
    fn test_generate_four_floors() {
        let panels = generate_panels(4, splitter_only());
        let floors: Vec<u32> = panels.iter().map(|p| p.floor).collect();
        assert_eq!(floors, vec![4, 3, 2]);
        assert!(panels.iter().all(|p| p.has_splitter && !p.has_booster));
    }

    #[test]
    fn test_generate_anchor_panel_is_larger() {
        let panels = generate_panels(5, AccessoryDefaults::default());
        assert_eq!(panels[0].position, constants::ANCHOR_POSITION);
        assert_eq!(panels[0].size, constants::ANCHOR_SIZE);
        for panel in &panels[1..] {
            assert_eq!(panel.size, (constants::PANEL_WIDTH, constants::PANEL_HEIGHT));
            assert!(panel.size.0 < panels[0].size.0);
            assert!(panel.size.1 < panels[0].size.1);
        }
    }

    #[test]
    fn test_generate_wraps_secondary_column() {
        assert_eq!(max_panels_per_column(), 7);

        // 1 anchor + 7 in the first sub-column + 2 in the second
        let panels = generate_panels(11, AccessoryDefaults::default());
        assert_eq!(panels.len(), 10);

        let first_column_x = constants::SECONDARY_COLUMN_X;
        let second_column_x = first_column_x + constants::COLUMN_SPACING;
        assert!(panels[1..8].iter().all(|p| p.position.0 == first_column_x));
        assert_eq!(panels[8].position, (second_column_x, constants::ROW_TOP));
        assert_eq!(
            panels[9].position,
            (second_column_x, constants::ROW_TOP + constants::PANEL_PITCH)
        );
    }

    #[test]
    fn test_generate_below_two_floors_is_empty() {
        assert!(generate_panels(1, AccessoryDefaults::default()).is_empty());
        assert!(generate_panels(0, AccessoryDefaults::default()).is_empty());
    }

    #[test]
    fn test_generate_two_floors_yields_anchor_only() {
        let panels = generate_panels(2, AccessoryDefaults::default());
        assert_eq!(panels.len(), 1);
        assert_eq!(panels[0].floor, 2);
    }

    #[test]
    fn test_regenerate_replaces_panels_and_clears_selection() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(6, splitter_only());
        diagram.move_panel(PanelId(5), (999.0, 999.0));
        diagram.toggle_accessory_selection(PanelId(4), AccessoryKind::Splitter);

        diagram.generate(3, AccessoryDefaults::default());

        let floors: Vec<u32> = diagram.panels.iter().map(|p| p.floor).collect();
        assert_eq!(floors, vec![3, 2]);
        assert!(diagram.selected_accessory.is_none());
        assert!(diagram.panels.iter().all(|p| !p.has_splitter));
        assert_eq!(diagram.defaults, AccessoryDefaults::default());
    }

    #[test]
    fn test_ids_are_stable_across_generations() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(5, AccessoryDefaults::default());
        let first: Vec<PanelId> = diagram.panels.iter().map(|p| p.id).collect();
        diagram.generate(5, AccessoryDefaults::default());
        let second: Vec<PanelId> = diagram.panels.iter().map(|p| p.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_move_only_touches_target() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(4, AccessoryDefaults::default());
        let before = diagram.panels.clone();

        assert!(diagram.move_panel(PanelId(3), (-40.0, 5000.0)));

        assert_eq!(diagram.panel(PanelId(3)).unwrap().position, (-40.0, 5000.0));
        assert_eq!(diagram.panel(PanelId(4)), before.iter().find(|p| p.floor == 4));
        assert_eq!(diagram.panel(PanelId(2)), before.iter().find(|p| p.floor == 2));
    }

    #[test]
    fn test_move_unknown_panel_is_noop() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(3, AccessoryDefaults::default());
        let before = diagram.clone();
        assert!(!diagram.move_panel(PanelId(42), (1.0, 1.0)));
        assert_eq!(diagram, before);
    }

    #[test]
    fn test_resize_applies_scale_and_resets() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(3, AccessoryDefaults::default());
        diagram.set_live_scale(PanelId(2), (2.0, 1.5));

        assert!(diagram.resize_panel(PanelId(2), 2.0, 1.5));

        let panel = diagram.panel(PanelId(2)).unwrap();
        assert_eq!(panel.size, (240.0, 90.0));
        assert_eq!(panel.scale, (1.0, 1.0));
    }

    #[test]
    fn test_repeated_resize_is_measured_from_new_size() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(3, AccessoryDefaults::default());
        diagram.resize_panel(PanelId(2), 2.0, 2.0);
        diagram.resize_panel(PanelId(2), 0.5, 0.5);
        assert_eq!(diagram.panel(PanelId(2)).unwrap().size, (120.0, 60.0));
    }

    #[test]
    fn test_resize_floors_at_minimum() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(3, AccessoryDefaults::default());

        diagram.resize_panel(PanelId(2), 0.0, -3.0);
        assert_eq!(diagram.panel(PanelId(2)).unwrap().size, (50.0, 30.0));

        diagram.resize_panel(PanelId(3), f32::NAN, f32::INFINITY);
        assert_eq!(diagram.panel(PanelId(3)).unwrap().size, (50.0, 30.0));
    }

    #[test]
    fn test_toggle_selection_is_exclusive() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(4, AccessoryDefaults { splitter: true, booster: true });

        diagram.toggle_accessory_selection(PanelId(4), AccessoryKind::Splitter);
        assert!(diagram.is_selected(PanelId(4), AccessoryKind::Splitter));

        diagram.toggle_accessory_selection(PanelId(4), AccessoryKind::Booster);
        assert!(!diagram.is_selected(PanelId(4), AccessoryKind::Splitter));
        assert!(diagram.is_selected(PanelId(4), AccessoryKind::Booster));

        diagram.toggle_accessory_selection(PanelId(2), AccessoryKind::Splitter);
        assert!(!diagram.is_selected(PanelId(4), AccessoryKind::Booster));
        assert!(diagram.is_selected(PanelId(2), AccessoryKind::Splitter));
    }

    #[test]
    fn test_toggle_twice_restores_selection_and_flags() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(4, splitter_only());
        let before = diagram.clone();

        diagram.toggle_accessory_selection(PanelId(3), AccessoryKind::Splitter);
        diagram.toggle_accessory_selection(PanelId(3), AccessoryKind::Splitter);

        assert_eq!(diagram, before);
    }

    #[test]
    fn test_toggle_unknown_panel_keeps_selection() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(4, splitter_only());
        diagram.toggle_accessory_selection(PanelId(3), AccessoryKind::Splitter);
        assert!(!diagram.toggle_accessory_selection(PanelId(77), AccessoryKind::Splitter));
        assert!(diagram.is_selected(PanelId(3), AccessoryKind::Splitter));
    }

    #[test]
    fn test_remove_accessory_clears_flag_and_selection() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(4, AccessoryDefaults { splitter: true, booster: true });
        diagram.toggle_accessory_selection(PanelId(3), AccessoryKind::Booster);

        assert!(diagram.remove_accessory(PanelId(3), AccessoryKind::Booster));

        let panel = diagram.panel(PanelId(3)).unwrap();
        assert!(!panel.has_booster);
        assert!(panel.has_splitter);
        assert!(diagram.selected_accessory.is_none());
        assert!(diagram.panel(PanelId(4)).unwrap().has_booster);
    }

    #[test]
    fn test_remove_accessory_keeps_unrelated_selection() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(4, AccessoryDefaults { splitter: true, booster: true });
        diagram.toggle_accessory_selection(PanelId(4), AccessoryKind::Splitter);

        diagram.remove_accessory(PanelId(3), AccessoryKind::Splitter);

        assert!(diagram.is_selected(PanelId(4), AccessoryKind::Splitter));
    }

    #[test]
    fn test_summary_counts_columns() {
        let mut diagram = FloorDiagram::new();
        assert_eq!(diagram.summary().secondary_columns, 0);
        diagram.generate(9, AccessoryDefaults::default());
        let summary = diagram.summary();
        assert_eq!(summary.panel_count, 8);
        assert_eq!(summary.top_floor, Some(9));
        assert_eq!(summary.secondary_columns, 1);

        diagram.generate(10, AccessoryDefaults::default());
        assert_eq!(diagram.summary().secondary_columns, 2);
    }

    #[test]
    fn test_hit_testing() {
        let mut diagram = FloorDiagram::new();
        diagram.generate(3, AccessoryDefaults { splitter: true, booster: false });

        let anchor = diagram.panel(PanelId(3)).unwrap().clone();
        assert_eq!(diagram.panel_at(anchor.center()), Some(PanelId(3)));
        assert_eq!(diagram.panel_at((-100.0, -100.0)), None);

        let splitter = anchor.accessory_anchor(AccessoryKind::Splitter);
        assert_eq!(
            diagram.accessory_at(splitter, constants::ACCESSORY_HIT_RADIUS),
            Some(AccessorySelection {
                panel: PanelId(3),
                kind: AccessoryKind::Splitter
            })
        );
        let booster = anchor.accessory_anchor(AccessoryKind::Booster);
        assert_eq!(diagram.accessory_at(booster, constants::ACCESSORY_HIT_RADIUS), None);
    }

    proptest! {
        #[test]
        fn generate_yields_each_floor_once(n in 2u32..=50) {
            let panels = generate_panels(n, AccessoryDefaults::default());
            prop_assert_eq!(panels.len() as u32, n - 1);
            let mut floors: Vec<u32> = panels.iter().map(|p| p.floor).collect();
            floors.sort_unstable();
            prop_assert_eq!(floors, (2..=n).collect::<Vec<_>>());
        }

        #[test]
        fn resize_never_goes_below_minimum(sx in -10.0f32..10.0, sy in -10.0f32..10.0) {
            let mut diagram = FloorDiagram::new();
            diagram.generate(3, AccessoryDefaults::default());
            diagram.resize_panel(PanelId(2), sx, sy);
            let panel = diagram.panel(PanelId(2)).unwrap();
            prop_assert!(panel.size.0 >= constants::MIN_PANEL_WIDTH);
            prop_assert!(panel.size.1 >= constants::MIN_PANEL_HEIGHT);
        }
    }
}
