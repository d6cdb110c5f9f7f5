//! Built-in demo dataset, substituted whenever the real source fails.

use scene::{CableRoute, Topology};

use crate::document::{parse_cables, parse_topology};

pub const SAMPLE_TOPOLOGY_JSON: &str = include_str!("../assets/sample_topology.json");
pub const SAMPLE_CABLES_JSON: &str = include_str!("../assets/sample_cables.json");

pub fn sample_topology() -> Topology {
    parse_topology(SAMPLE_TOPOLOGY_JSON)
        .map(|parsed| parsed.data)
        .unwrap_or_default()
}

pub fn sample_cables() -> Vec<CableRoute> {
    parse_cables(SAMPLE_CABLES_JSON)
        .map(|parsed| parsed.data)
        .unwrap_or_default()
}
