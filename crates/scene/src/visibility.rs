//! View filters.
//!
//! Visibility is a pure function of the canonical topology and one
//! `ViewFilterState` value. Every filter change recomputes from scratch.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::network::{CableRoute, ElementType, LinkType, NetworkClass, NetworkElement, NetworkLink};

pub const ZOOM_MIN: f64 = 0.0;
pub const ZOOM_MAX: f64 = 100.0;
pub const DEFAULT_ZOOM: f64 = 50.0;

/// User-controlled view toggles.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewFilterState {
    pub show_existing: bool,
    pub show_proposed: bool,
    pub show_satellites: bool,
    pub show_stations: bool,
    pub show_routers: bool,
    pub show_cables: bool,
    /// `0..=100`; larger is closer.
    pub zoom_level: f64,
    pub is_rotating: bool,
}

impl Default for ViewFilterState {
    fn default() -> Self {
        Self {
            show_existing: true,
            show_proposed: true,
            show_satellites: true,
            show_stations: true,
            show_routers: true,
            show_cables: true,
            zoom_level: DEFAULT_ZOOM,
            is_rotating: true,
        }
    }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterPatch {
    pub show_existing: Option<bool>,
    pub show_proposed: Option<bool>,
    pub show_satellites: Option<bool>,
    pub show_stations: Option<bool>,
    pub show_routers: Option<bool>,
    pub show_cables: Option<bool>,
    pub zoom_level: Option<f64>,
    pub is_rotating: Option<bool>,
}

impl FilterPatch {
    /// Only the network-class toggle: existing, proposed or both.
    pub fn network(show_existing: bool, show_proposed: bool) -> Self {
        Self {
            show_existing: Some(show_existing),
            show_proposed: Some(show_proposed),
            ..Self::default()
        }
    }

    /// Whether applying this patch can change which objects are visible.
    pub fn touches_visibility(&self) -> bool {
        self.show_existing.is_some()
            || self.show_proposed.is_some()
            || self.show_satellites.is_some()
            || self.show_stations.is_some()
            || self.show_routers.is_some()
            || self.show_cables.is_some()
    }
}

impl ViewFilterState {
    /// Apply `patch`, clamping zoom into range. Non-finite zoom is ignored.
    pub fn apply(&mut self, patch: &FilterPatch) {
        if let Some(v) = patch.show_existing {
            self.show_existing = v;
        }
        if let Some(v) = patch.show_proposed {
            self.show_proposed = v;
        }
        if let Some(v) = patch.show_satellites {
            self.show_satellites = v;
        }
        if let Some(v) = patch.show_stations {
            self.show_stations = v;
        }
        if let Some(v) = patch.show_routers {
            self.show_routers = v;
        }
        if let Some(v) = patch.show_cables {
            self.show_cables = v;
        }
        if let Some(z) = patch.zoom_level
            && z.is_finite()
        {
            self.zoom_level = z.clamp(ZOOM_MIN, ZOOM_MAX);
        }
        if let Some(v) = patch.is_rotating {
            self.is_rotating = v;
        }
    }

    pub fn class_enabled(&self, class: NetworkClass) -> bool {
        match class {
            NetworkClass::Existing => self.show_existing,
            NetworkClass::Proposed => self.show_proposed,
        }
    }

    pub fn element_type_enabled(&self, element_type: ElementType) -> bool {
        match element_type {
            ElementType::Satellite => self.show_satellites,
            ElementType::GroundStation => self.show_stations,
            ElementType::Router | ElementType::Switch | ElementType::Server => self.show_routers,
            ElementType::Generic => true,
        }
    }

    pub fn link_type_enabled(&self, link_type: LinkType) -> bool {
        match link_type {
            LinkType::SatelliteLink => self.show_satellites,
            LinkType::Fiber | LinkType::Submarine | LinkType::Terrestrial => self.show_cables,
        }
    }

    pub fn element_visible(&self, element: &NetworkElement) -> bool {
        self.class_enabled(element.network_class) && self.element_type_enabled(element.element_type)
    }
}

/// Indices (ascending) into the slices given to [`compute_visible_set`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    pub elements: Vec<usize>,
    pub links: Vec<usize>,
}

/// Elements pass the class and category toggles; links additionally need
/// both endpoints in the visible element set.
pub fn compute_visible_set(
    elements: &[NetworkElement],
    links: &[NetworkLink],
    filter: &ViewFilterState,
) -> VisibleSet {
    let visible_elements: Vec<usize> = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| filter.element_visible(e))
        .map(|(i, _)| i)
        .collect();

    let visible_ids: HashSet<&str> = visible_elements
        .iter()
        .map(|&i| elements[i].id.as_str())
        .collect();

    let visible_links = links
        .iter()
        .enumerate()
        .filter(|(_, l)| {
            filter.class_enabled(l.network_class)
                && filter.link_type_enabled(l.link_type)
                && visible_ids.contains(l.from.as_str())
                && visible_ids.contains(l.to.as_str())
        })
        .map(|(i, _)| i)
        .collect();

    VisibleSet {
        elements: visible_elements,
        links: visible_links,
    }
}

/// Cable routes have no network class; they follow the cables toggle only.
pub fn visible_cables(cables: &[CableRoute], filter: &ViewFilterState) -> Vec<usize> {
    if !filter.show_cables {
        return Vec::new();
    }
    (0..cables.len()).collect()
}

#[cfg(test)]
mod tests {
    use super::{FilterPatch, ViewFilterState, compute_visible_set, visible_cables};
    use crate::network::{
        CableRoute, CableType, Color, ElementType, GeoPoint, LinkType, NetworkClass,
        NetworkElement, NetworkLink,
    };
    use pretty_assertions::assert_eq;

    fn element(id: &str, kind: ElementType, class: NetworkClass) -> NetworkElement {
        NetworkElement::new(id, id, kind, class, GeoPoint::surface(0.0, 0.0).unwrap())
    }

    fn sample() -> (Vec<NetworkElement>, Vec<NetworkLink>) {
        let elements = vec![
            element("A", ElementType::Router, NetworkClass::Existing),
            element("B", ElementType::Satellite, NetworkClass::Proposed),
            element("C", ElementType::GroundStation, NetworkClass::Existing),
            element("D", ElementType::Generic, NetworkClass::Existing),
        ];
        let links = vec![
            NetworkLink::new("A", "B", LinkType::Fiber, NetworkClass::Existing),
            NetworkLink::new("A", "C", LinkType::Terrestrial, NetworkClass::Existing),
            NetworkLink::new("C", "B", LinkType::SatelliteLink, NetworkClass::Existing),
            NetworkLink::new("A", "missing", LinkType::Fiber, NetworkClass::Existing),
        ];
        (elements, links)
    }

    #[test]
    fn everything_visible_by_default_except_dangling_links() {
        let (elements, links) = sample();
        let set = compute_visible_set(&elements, &links, &ViewFilterState::default());
        assert_eq!(set.elements, vec![0, 1, 2, 3]);
        assert_eq!(set.links, vec![0, 1, 2]);
    }

    #[test]
    fn hiding_proposed_drops_links_to_proposed_endpoints() {
        let (elements, links) = sample();
        let mut filter = ViewFilterState::default();
        filter.apply(&FilterPatch::network(true, false));

        let set = compute_visible_set(&elements, &links, &filter);
        // A (existing router) stays visible...
        assert!(set.elements.contains(&0));
        assert!(!set.elements.contains(&1));
        // ...but the existing A-B link goes with its proposed endpoint.
        assert_eq!(set.links, vec![1]);
    }

    #[test]
    fn category_toggles() {
        let (elements, links) = sample();
        let filter = ViewFilterState {
            show_routers: false,
            ..ViewFilterState::default()
        };
        let set = compute_visible_set(&elements, &links, &filter);
        assert_eq!(set.elements, vec![1, 2, 3]);
        assert_eq!(set.links, vec![2]);

        let filter = ViewFilterState {
            show_cables: false,
            ..ViewFilterState::default()
        };
        let set = compute_visible_set(&elements, &links, &filter);
        assert_eq!(set.elements, vec![0, 1, 2, 3]);
        // Only the satellite link survives without the cables toggle.
        assert_eq!(set.links, vec![2]);
    }

    #[test]
    fn generic_elements_follow_class_only() {
        let (elements, links) = sample();
        let filter = ViewFilterState {
            show_satellites: false,
            show_stations: false,
            show_routers: false,
            ..ViewFilterState::default()
        };
        let set = compute_visible_set(&elements, &links, &filter);
        assert_eq!(set.elements, vec![3]);
        assert!(set.links.is_empty());
    }

    #[test]
    fn recomputation_is_idempotent() {
        let (elements, links) = sample();
        let filter = ViewFilterState {
            show_existing: false,
            ..ViewFilterState::default()
        };
        let first = compute_visible_set(&elements, &links, &filter);
        let second = compute_visible_set(&elements, &links, &filter);
        assert_eq!(first, second);
    }

    #[test]
    fn patch_clamps_zoom_and_ignores_nan() {
        let mut filter = ViewFilterState::default();
        filter.apply(&FilterPatch {
            zoom_level: Some(250.0),
            ..FilterPatch::default()
        });
        assert_eq!(filter.zoom_level, 100.0);
        filter.apply(&FilterPatch {
            zoom_level: Some(f64::NAN),
            ..FilterPatch::default()
        });
        assert_eq!(filter.zoom_level, 100.0);
        assert!(!FilterPatch::default().touches_visibility());
        assert!(FilterPatch::network(true, true).touches_visibility());
    }

    #[test]
    fn filter_state_round_trips_through_json() {
        let filter = ViewFilterState {
            show_proposed: false,
            zoom_level: 12.5,
            ..ViewFilterState::default()
        };
        let json = serde_json::to_string(&filter).unwrap();
        assert!(json.contains("\"showProposed\":false"));
        let back: ViewFilterState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, filter);

        let partial: ViewFilterState = serde_json::from_str(r#"{"showCables":false}"#).unwrap();
        assert!(!partial.show_cables);
        assert!(partial.show_existing);
    }

    #[test]
    fn cables_follow_cable_toggle() {
        let p = GeoPoint::surface(0.0, 0.0).unwrap();
        let q = GeoPoint::surface(1.0, 1.0).unwrap();
        let cables = vec![
            CableRoute::new("c", "c", CableType::Submarine, Color::rgb(0, 0, 0), vec![p, q])
                .unwrap(),
        ];
        assert_eq!(visible_cables(&cables, &ViewFilterState::default()), vec![0]);
        let hidden = ViewFilterState {
            show_cables: false,
            ..ViewFilterState::default()
        };
        assert!(visible_cables(&cables, &hidden).is_empty());
    }
}
