//! Orthogonal connector routing between consecutive floor panels.
//!
//! Connectors are derived on demand from the panel set and never stored.
//! Each path runs from the source panel's center down (or up) the riser to the
//! target's row, then across to the target's center.

use crate::constants::ROUTING_TOLERANCE;
use crate::types::*;

/// Routes one connector per adjacent pair after sorting by descending floor.
///
/// Zero or one panel yields no connectors.
pub fn route_connectors(panels: &[FloorPanel]) -> Vec<Connector> {
    let mut sorted: Vec<&FloorPanel> = panels.iter().collect();
    sorted.sort_by(|a, b| b.floor.cmp(&a.floor));

    sorted
        .windows(2)
        .map(|pair| Connector {
            from: pair[0].id,
            to: pair[1].id,
            waypoints: route_path(pair[0].center(), pair[1].center()),
        })
        .collect()
}

/// Builds the waypoint list between two centers.
///
/// The vertical leg is emitted when the rows differ by more than the
/// tolerance, the horizontal leg when the columns do. The elbow is never
/// dropped, so a small column offset becomes a short horizontal jog. The
/// path always ends exactly on `to`.
pub fn route_path(from: (f32, f32), to: (f32, f32)) -> Vec<(f32, f32)> {
    let mut path = vec![from];

    if (from.1 - to.1).abs() > ROUTING_TOLERANCE {
        path.push((from.0, to.1));
    }
    if (from.0 - to.0).abs() > ROUTING_TOLERANCE {
        path.push(to);
    }

    // End waypoint, unless the previous leg already landed on it
    if path.len() == 1 || path.last() != Some(&to) {
        path.push(to);
    }
    path
}

impl FloorDiagram {
    /// Connectors for the current panel set.
    pub fn connectors(&self) -> Vec<Connector> {
        route_connectors(&self.panels)
    }
}
