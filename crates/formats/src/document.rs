//! Topology and cable wire documents.
//!
//! Records are decoded one at a time so a single malformed entry is dropped
//! without taking the rest of the batch with it.

use std::collections::{BTreeMap, HashSet};

use scene::factory::default_cable_color;
use scene::{
    CableRoute, CableType, Color, ElementType, GeoPoint, LinkType, NetworkClass, NetworkElement,
    NetworkLink, Proposer, Topology,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TopologyDocument {
    #[serde(alias = "nodes")]
    pub elements: Vec<Value>,
    #[serde(alias = "links")]
    pub connections: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CableDocument {
    pub cables: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawElement {
    id: Option<Value>,
    name: Option<String>,
    #[serde(alias = "element_type", alias = "node_type")]
    r#type: Option<String>,
    #[serde(alias = "network_class")]
    network: Option<String>,
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "lon", alias = "longitude")]
    lng: Option<f64>,
    #[serde(alias = "altitude")]
    alt: Option<f64>,
    description: Option<String>,
    specifications: Option<Value>,
    capacity_gbps: Option<f64>,
    country: Option<String>,
    city: Option<String>,
    proposer: Option<RawProposer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProposer {
    wallet: Option<String>,
    submitted_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConnection {
    #[serde(alias = "from_node")]
    from: Option<Value>,
    #[serde(alias = "to_node")]
    to: Option<Value>,
    #[serde(alias = "connection_type", alias = "link_type")]
    r#type: Option<String>,
    #[serde(alias = "network_class")]
    network: Option<String>,
    capacity_gbps: Option<f64>,
    length_km: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCable {
    id: Option<Value>,
    name: Option<String>,
    r#type: Option<String>,
    color: Option<String>,
    route: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawWaypoint {
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "lon", alias = "longitude")]
    lng: Option<f64>,
}

/// Why one record was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFault {
    Malformed(String),
    Missing(&'static str),
    OutOfRange(&'static str),
    Unknown { field: &'static str, value: String },
    TooFewWaypoints(usize),
    /// An earlier record already used this id.
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordError {
    pub collection: &'static str,
    pub index: usize,
    pub fault: RecordFault,
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: ", self.collection, self.index)?;
        match &self.fault {
            RecordFault::Malformed(reason) => write!(f, "malformed record: {reason}"),
            RecordFault::Missing(field) => write!(f, "missing field `{field}`"),
            RecordFault::OutOfRange(field) => write!(f, "`{field}` out of range"),
            RecordFault::Unknown { field, value } => {
                write!(f, "unknown `{field}` value {value:?}")
            }
            RecordFault::TooFewWaypoints(n) => {
                write!(f, "route has {n} valid waypoints, need at least 2")
            }
            RecordFault::Duplicate(id) => write!(f, "duplicate id {id:?}"),
        }
    }
}

impl std::error::Error for RecordError {}

/// The payload as a whole is not a document.
#[derive(Debug)]
pub enum DocumentError {
    Json(serde_json::Error),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Json(e) => write!(f, "invalid JSON document: {e}"),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Json(e) => Some(e),
        }
    }
}

/// Valid records plus the ones that were dropped.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub data: T,
    pub rejected: Vec<RecordError>,
}

pub fn parse_topology(payload: &str) -> Result<Parsed<Topology>, DocumentError> {
    let doc: TopologyDocument = serde_json::from_str(payload).map_err(DocumentError::Json)?;
    let mut rejected = Vec::new();

    let mut elements = Vec::with_capacity(doc.elements.len());
    let mut seen = HashSet::with_capacity(doc.elements.len());
    for (index, value) in doc.elements.into_iter().enumerate() {
        let element = element_from_value(value).and_then(|element| {
            if seen.insert(element.id.clone()) {
                Ok(element)
            } else {
                Err(RecordFault::Duplicate(element.id))
            }
        });
        match element {
            Ok(element) => elements.push(element),
            Err(fault) => rejected.push(RecordError {
                collection: "elements",
                index,
                fault,
            }),
        }
    }

    let mut links = Vec::with_capacity(doc.connections.len());
    for (index, value) in doc.connections.into_iter().enumerate() {
        match link_from_value(value) {
            Ok(link) => links.push(link),
            Err(fault) => rejected.push(RecordError {
                collection: "connections",
                index,
                fault,
            }),
        }
    }

    Ok(Parsed {
        data: Topology::new(elements, links),
        rejected,
    })
}

pub fn parse_cables(payload: &str) -> Result<Parsed<Vec<CableRoute>>, DocumentError> {
    let doc: CableDocument = serde_json::from_str(payload).map_err(DocumentError::Json)?;
    let mut rejected = Vec::new();
    let mut cables = Vec::with_capacity(doc.cables.len());
    for (index, value) in doc.cables.into_iter().enumerate() {
        match cable_from_value(value) {
            Ok(cable) => cables.push(cable),
            Err(fault) => rejected.push(RecordError {
                collection: "cables",
                index,
                fault,
            }),
        }
    }
    Ok(Parsed {
        data: cables,
        rejected,
    })
}

fn element_from_value(value: Value) -> Result<NetworkElement, RecordFault> {
    let raw: RawElement =
        serde_json::from_value(value).map_err(|e| RecordFault::Malformed(e.to_string()))?;

    let id = raw.id.as_ref().and_then(id_string).ok_or(RecordFault::Missing("id"))?;
    let lat = raw.lat.ok_or(RecordFault::Missing("lat"))?;
    let lng = raw.lng.ok_or(RecordFault::Missing("lng"))?;
    let position =
        GeoPoint::new(lat, lng, raw.alt.unwrap_or(0.0)).ok_or(RecordFault::OutOfRange("position"))?;
    let network_class = class_or_default(raw.network.as_deref())?;
    let element_type = raw
        .r#type
        .as_deref()
        .map(ElementType::parse)
        .unwrap_or(ElementType::Generic);

    let mut element = NetworkElement::new(
        id.clone(),
        raw.name.unwrap_or(id),
        element_type,
        network_class,
        position,
    );
    element.description = raw.description.unwrap_or_default();
    element.specifications = raw.specifications.map(specifications).unwrap_or_default();
    element.capacity_gbps = raw.capacity_gbps.filter(|c| c.is_finite() && *c >= 0.0);
    element.country = raw.country;
    element.city = raw.city;
    element.proposer = raw.proposer.and_then(|p| {
        p.wallet.map(|wallet| Proposer {
            wallet,
            submitted_at: p.submitted_at,
        })
    });
    Ok(element)
}

fn link_from_value(value: Value) -> Result<NetworkLink, RecordFault> {
    let raw: RawConnection =
        serde_json::from_value(value).map_err(|e| RecordFault::Malformed(e.to_string()))?;

    let from = raw.from.as_ref().and_then(id_string).ok_or(RecordFault::Missing("from"))?;
    let to = raw.to.as_ref().and_then(id_string).ok_or(RecordFault::Missing("to"))?;
    let raw_type = raw.r#type.ok_or(RecordFault::Missing("type"))?;
    let link_type = LinkType::parse(&raw_type).ok_or(RecordFault::Unknown {
        field: "type",
        value: raw_type,
    })?;
    let network_class = class_or_default(raw.network.as_deref())?;

    let mut link = NetworkLink::new(from, to, link_type, network_class);
    link.capacity_gbps = raw.capacity_gbps.filter(|c| c.is_finite() && *c >= 0.0);
    link.length_km = raw.length_km.filter(|l| l.is_finite() && *l >= 0.0);
    Ok(link)
}

fn cable_from_value(value: Value) -> Result<CableRoute, RecordFault> {
    let raw: RawCable =
        serde_json::from_value(value).map_err(|e| RecordFault::Malformed(e.to_string()))?;

    let id = raw.id.as_ref().and_then(id_string).ok_or(RecordFault::Missing("id"))?;
    let cable_type = raw
        .r#type
        .as_deref()
        .and_then(CableType::parse)
        .unwrap_or(CableType::Submarine);
    let color = raw
        .color
        .as_deref()
        .and_then(Color::from_hex)
        .unwrap_or_else(|| default_cable_color(cable_type));

    let route: Vec<GeoPoint> = raw.route.into_iter().filter_map(waypoint).collect();
    let valid = route.len();
    CableRoute::new(id.clone(), raw.name.unwrap_or(id), cable_type, color, route)
        .ok_or(RecordFault::TooFewWaypoints(valid))
}

fn waypoint(value: Value) -> Option<GeoPoint> {
    // `[lng, lat]` pairs as in GeoJSON, or `{lat, lng}` objects.
    if let Value::Array(pair) = &value {
        let lng = pair.first()?.as_f64()?;
        let lat = pair.get(1)?.as_f64()?;
        return GeoPoint::surface(lat, lng);
    }
    let raw: RawWaypoint = serde_json::from_value(value).ok()?;
    GeoPoint::surface(raw.lat?, raw.lng?)
}

fn class_or_default(raw: Option<&str>) -> Result<NetworkClass, RecordFault> {
    match raw {
        None => Ok(NetworkClass::Existing),
        Some(s) => NetworkClass::parse(s).ok_or(RecordFault::Unknown {
            field: "network",
            value: s.to_string(),
        }),
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn specifications(value: Value) -> BTreeMap<String, String> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect(),
        Value::String(s) if !s.is_empty() => BTreeMap::from([("details".to_string(), s)]),
        _ => BTreeMap::new(),
    }
}
