use std::collections::HashMap;

use crate::geo::LatLngBounds;
use crate::types::{Coordinates, WorkoutKind};

/// Marker handle. Issued by the app state, not the port, so the
/// transition function stays free of side effects.
pub type MarkerId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPopup {
    pub kind: WorkoutKind,
    pub text: String,
}

/// Capability boundary over an interactive map widget. Anything that can
/// pan, fit a rectangle, and manage pinned markers can stand in for the
/// real thing; map creation and the tile layer belong to the concrete
/// implementation, and click events reach the app as intents from the
/// frontend, not through this trait.
pub trait MapPort {
    fn set_view(&mut self, center: Coordinates, zoom: u8);
    fn fit_bounds(&mut self, bounds: LatLngBounds);
    fn place_marker(&mut self, id: MarkerId, at: Coordinates, popup: Option<MarkerPopup>);
    fn set_popup(&mut self, id: MarkerId, popup: MarkerPopup);
    fn remove_marker(&mut self, id: MarkerId);
}

/// Terminal stand-in for the map widget: viewport changes are printed,
/// the live marker set is kept inspectable.
#[derive(Debug, Default)]
pub struct ConsoleMap {
    markers: HashMap<MarkerId, (Coordinates, Option<MarkerPopup>)>,
}

impl ConsoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &HashMap<MarkerId, (Coordinates, Option<MarkerPopup>)> {
        &self.markers
    }
}

impl MapPort for ConsoleMap {
    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        println!("[map] view {center} (zoom {zoom})");
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds) {
        println!(
            "[map] fit lat [{:.5}, {:.5}] lng [{:.5}, {:.5}]",
            bounds.south, bounds.north, bounds.west, bounds.east
        );
    }

    fn place_marker(&mut self, id: MarkerId, at: Coordinates, popup: Option<MarkerPopup>) {
        match &popup {
            Some(p) => println!("[map] marker at {at}: {}", p.text.replace('\n', " — ")),
            None => println!("[map] pin dropped at {at}"),
        }
        self.markers.insert(id, (at, popup));
    }

    fn set_popup(&mut self, id: MarkerId, popup: MarkerPopup) {
        let Some(entry) = self.markers.get_mut(&id) else {
            tracing::warn!(marker = id, "set_popup on unknown marker");
            return;
        };
        println!("[map] marker updated: {}", popup.text.replace('\n', " — "));
        entry.1 = Some(popup);
    }

    fn remove_marker(&mut self, id: MarkerId) {
        if self.markers.remove(&id).is_none() {
            tracing::warn!(marker = id, "remove_marker on unknown marker");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_map_tracks_its_marker_set() {
        let mut map = ConsoleMap::new();
        let at = Coordinates { lat: 1.0, lng: 2.0 };
        map.place_marker(7, at, None);
        assert_eq!(map.markers().len(), 1);

        map.set_popup(
            7,
            MarkerPopup {
                kind: WorkoutKind::Running,
                text: "Running on August 6".to_owned(),
            },
        );
        assert!(map.markers()[&7].1.is_some());

        map.remove_marker(7);
        assert!(map.markers().is_empty());
    }
}
