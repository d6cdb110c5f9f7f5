//! Network topology data model.
//!
//! Records are immutable once constructed: positions that change while the
//! globe rotates live on scene transforms, never on these values.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Validated geographic position.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
    altitude_km: f64,
}

impl GeoPoint {
    /// Returns `None` when any coordinate is non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64, altitude_km: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && altitude_km.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
            && altitude_km >= 0.0;
        valid.then_some(Self {
            latitude,
            longitude,
            altitude_km,
        })
    }

    pub fn surface(latitude: f64, longitude: f64) -> Option<Self> {
        Self::new(latitude, longitude, 0.0)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn altitude_km(&self) -> f64 {
        self.altitude_km
    }

    pub fn is_on_surface(&self) -> bool {
        self.altitude_km <= 1e-6
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    Satellite,
    GroundStation,
    Router,
    Switch,
    Server,
    Generic,
}

impl ElementType {
    pub const ALL: [ElementType; 6] = [
        ElementType::Satellite,
        ElementType::GroundStation,
        ElementType::Router,
        ElementType::Switch,
        ElementType::Server,
        ElementType::Generic,
    ];

    /// Lenient parse: anything unrecognized (hub, ix, pop, ...) is `Generic`.
    pub fn parse(raw: &str) -> Self {
        match normalize_tag(raw).as_str() {
            "satellite" | "sat" => ElementType::Satellite,
            "groundstation" | "station" => ElementType::GroundStation,
            "router" => ElementType::Router,
            "switch" => ElementType::Switch,
            "server" | "datacenter" => ElementType::Server,
            _ => ElementType::Generic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Satellite => "satellite",
            ElementType::GroundStation => "groundStation",
            ElementType::Router => "router",
            ElementType::Switch => "switch",
            ElementType::Server => "server",
            ElementType::Generic => "generic",
        }
    }

    pub fn is_satellite(self) -> bool {
        matches!(self, ElementType::Satellite)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NetworkClass {
    Existing,
    Proposed,
}

impl NetworkClass {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_tag(raw).as_str() {
            "existing" | "current" | "active" => Some(NetworkClass::Existing),
            "proposed" | "planned" => Some(NetworkClass::Proposed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NetworkClass::Existing => "existing",
            NetworkClass::Proposed => "proposed",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkType {
    Fiber,
    SatelliteLink,
    Submarine,
    Terrestrial,
}

impl LinkType {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_tag(raw).as_str() {
            "fiber" | "fibre" | "optical" => Some(LinkType::Fiber),
            "satellite" | "satellitelink" => Some(LinkType::SatelliteLink),
            "submarine" => Some(LinkType::Submarine),
            "terrestrial" => Some(LinkType::Terrestrial),
            _ => None,
        }
    }

    pub fn is_satellite(self) -> bool {
        matches!(self, LinkType::SatelliteLink)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CableType {
    Submarine,
    Terrestrial,
}

impl CableType {
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_tag(raw).as_str() {
            "submarine" => Some(CableType::Submarine),
            "terrestrial" => Some(CableType::Terrestrial),
            _ => None,
        }
    }
}

/// Who submitted a proposed element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proposer {
    pub wallet: String,
    pub submitted_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkElement {
    pub id: String,
    pub name: String,
    pub element_type: ElementType,
    pub network_class: NetworkClass,
    pub position: GeoPoint,
    pub description: String,
    pub specifications: BTreeMap<String, String>,
    pub proposer: Option<Proposer>,
    pub capacity_gbps: Option<f64>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl NetworkElement {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        element_type: ElementType,
        network_class: NetworkClass,
        position: GeoPoint,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            element_type,
            network_class,
            position,
            description: String::new(),
            specifications: BTreeMap::new(),
            proposer: None,
            capacity_gbps: None,
            country: None,
            city: None,
        }
    }

    pub fn is_satellite(&self) -> bool {
        self.element_type.is_satellite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkLink {
    pub from: String,
    pub to: String,
    pub link_type: LinkType,
    pub network_class: NetworkClass,
    pub capacity_gbps: Option<f64>,
    pub length_km: Option<f64>,
}

impl NetworkLink {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        link_type: LinkType,
        network_class: NetworkClass,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            link_type,
            network_class,
            capacity_gbps: None,
            length_km: None,
        }
    }
}

/// 8-bit RGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn from_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |s: &str| channel(s).map(|v| v * 17);
                Some(Self::rgb(
                    expand(&hex[0..1])?,
                    expand(&hex[1..2])?,
                    expand(&hex[2..3])?,
                ))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableRoute {
    pub id: String,
    pub name: String,
    pub cable_type: CableType,
    pub color: Color,
    route: Vec<GeoPoint>,
}

impl CableRoute {
    /// Minimum number of waypoints for a drawable route.
    pub const MIN_WAYPOINTS: usize = 2;

    /// Returns `None` when the route has fewer than [`Self::MIN_WAYPOINTS`] points.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cable_type: CableType,
        color: Color,
        route: Vec<GeoPoint>,
    ) -> Option<Self> {
        if route.len() < Self::MIN_WAYPOINTS {
            return None;
        }
        Some(Self {
            id: id.into(),
            name: name.into(),
            cable_type,
            color,
            route,
        })
    }

    pub fn route(&self) -> &[GeoPoint] {
        &self.route
    }
}

/// Canonical element and link collections.
///
/// Element ids are unique: when built from records with duplicate ids the
/// first record wins.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    elements: Vec<NetworkElement>,
    links: Vec<NetworkLink>,
    index: HashMap<String, usize>,
}

impl Topology {
    pub fn new(elements: Vec<NetworkElement>, links: Vec<NetworkLink>) -> Self {
        let mut index = HashMap::with_capacity(elements.len());
        let mut unique = Vec::with_capacity(elements.len());
        for element in elements {
            if index.contains_key(&element.id) {
                continue;
            }
            index.insert(element.id.clone(), unique.len());
            unique.push(element);
        }
        Self {
            elements: unique,
            links,
            index,
        }
    }

    pub fn elements(&self) -> &[NetworkElement] {
        &self.elements
    }

    pub fn links(&self) -> &[NetworkLink] {
        &self.links
    }

    pub fn element_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn element(&self, id: &str) -> Option<&NetworkElement> {
        self.element_index(id).map(|i| &self.elements[i])
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Both endpoints of `link` exist in this topology.
    pub fn resolves(&self, link: &NetworkLink) -> bool {
        self.index.contains_key(&link.from) && self.index.contains_key(&link.to)
    }

    pub fn stats(&self) -> TopologyStats {
        let mut stats = TopologyStats {
            total_elements: self.elements.len(),
            total_links: self.links.len(),
            ..TopologyStats::default()
        };
        for element in &self.elements {
            *stats.by_type.entry(element.element_type).or_insert(0) += 1;
            *stats.by_class.entry(element.network_class).or_insert(0) += 1;
        }
        stats.dangling_links = self.links.iter().filter(|l| !self.resolves(l)).count();
        stats.total_link_capacity_gbps = self.links.iter().filter_map(|l| l.capacity_gbps).sum();
        stats
    }
}

/// Aggregate counts for a status panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopologyStats {
    pub total_elements: usize,
    pub total_links: usize,
    pub dangling_links: usize,
    pub total_link_capacity_gbps: f64,
    pub by_type: BTreeMap<ElementType, usize>,
    pub by_class: BTreeMap<NetworkClass, usize>,
}

fn normalize_tag(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-' && *c != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}
