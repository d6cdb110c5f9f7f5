//! Topology records to visual primitives.
//!
//! Appearance is a pure lookup over closed enums; geometry is sampled from
//! smooth curves so links arc above the surface and cables hug it.

use foundation::math::{Vec3, sample_catmull_rom, sample_quadratic_bezier};

use crate::components::{MarkerShape, VectorGeometryKind};
use crate::network::{
    CableRoute, CableType, Color, ElementType, LinkType, NetworkClass, NetworkElement, NetworkLink,
};
use crate::projection::ProjectionConfig;

/// Arc apex height above the surface, as a fraction of the chord length.
pub const ARC_HEIGHT_TERRESTRIAL: f64 = 0.25;
pub const ARC_HEIGHT_SATELLITE: f64 = 0.5;

pub const MIN_ARC_SAMPLES: usize = 2;
pub const MAX_ARC_SAMPLES: usize = 50;
/// Arc samples per base radius of chord length.
const ARC_SAMPLES_PER_RADIUS: f64 = 32.0;

pub const CABLE_SAMPLES_PER_SEGMENT: usize = 8;
/// Cables float this far above the sphere so they do not z-fight with it.
pub const CABLE_LIFT: f64 = 0.3;

pub const PROPOSED_COLOR: Color = Color::rgb(0xff, 0x8f, 0x00);

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Marker {
    pub shape: MarkerShape,
    pub size: f64,
    pub color: Color,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub kind: VectorGeometryKind,
    pub color: Color,
    pub width: f64,
    pub vertices: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VisualObject {
    Marker(Marker),
    Curve(Curve),
}

impl VisualObject {
    pub fn as_marker(&self) -> Option<&Marker> {
        match self {
            VisualObject::Marker(m) => Some(m),
            VisualObject::Curve(_) => None,
        }
    }

    pub fn as_curve(&self) -> Option<&Curve> {
        match self {
            VisualObject::Curve(c) => Some(c),
            VisualObject::Marker(_) => None,
        }
    }
}

pub fn element_appearance(element_type: ElementType) -> (MarkerShape, f64, Color) {
    match element_type {
        ElementType::Satellite => (MarkerShape::Octahedron, 1.6, Color::rgb(0x00, 0xe5, 0xff)),
        ElementType::GroundStation => (MarkerShape::Cone, 1.4, Color::rgb(0xff, 0xd5, 0x4f)),
        ElementType::Router => (MarkerShape::Cube, 1.0, Color::rgb(0x66, 0xbb, 0x6a)),
        ElementType::Switch => (MarkerShape::Cube, 0.8, Color::rgb(0x26, 0xa6, 0x9a)),
        ElementType::Server => (MarkerShape::Cylinder, 1.0, Color::rgb(0xab, 0x47, 0xbc)),
        ElementType::Generic => (MarkerShape::Dot, 0.9, Color::rgb(0xb0, 0xbe, 0xc5)),
    }
}

pub fn link_appearance(link_type: LinkType) -> (Color, f64) {
    match link_type {
        LinkType::Fiber => (Color::rgb(0x4f, 0xc3, 0xf7), 0.6),
        LinkType::SatelliteLink => (Color::rgb(0xe1, 0xf5, 0xfe), 0.4),
        LinkType::Submarine => (Color::rgb(0x1e, 0x88, 0xe5), 0.8),
        LinkType::Terrestrial => (Color::rgb(0x8b, 0xc3, 0x4a), 0.6),
    }
}

pub fn default_cable_color(cable_type: CableType) -> Color {
    match cable_type {
        CableType::Submarine => Color::rgb(0x00, 0xbc, 0xd4),
        CableType::Terrestrial => Color::rgb(0xcd, 0xdc, 0x39),
    }
}

fn class_color(class: NetworkClass, base: Color) -> Color {
    match class {
        NetworkClass::Existing => base,
        NetworkClass::Proposed => PROPOSED_COLOR,
    }
}

/// Marker at the element's canonical (unrotated) position.
pub fn build_element(element: &NetworkElement, config: &ProjectionConfig) -> VisualObject {
    let (shape, size, color) = element_appearance(element.element_type);
    VisualObject::Marker(Marker {
        shape,
        size,
        color: class_color(element.network_class, color),
        position: config.place(element, 0.0, element.position.altitude_km()),
    })
}

/// Arc between two resolved endpoint positions.
pub fn build_link(
    link: &NetworkLink,
    endpoints: (Vec3, Vec3),
    config: &ProjectionConfig,
) -> VisualObject {
    let (color, width) = link_appearance(link.link_type);
    VisualObject::Curve(Curve {
        kind: VectorGeometryKind::LinkArc(link.link_type),
        color: class_color(link.network_class, color),
        width,
        vertices: arc_vertices(link.link_type, endpoints.0, endpoints.1, config.base_radius),
    })
}

pub fn build_cable(cable: &CableRoute, config: &ProjectionConfig) -> VisualObject {
    VisualObject::Curve(Curve {
        kind: VectorGeometryKind::CablePath(cable.cable_type),
        color: cable.color,
        width: 1.0,
        vertices: cable_vertices(cable, config),
    })
}

/// Quadratic Bézier from `a` to `b` whose apex rises `chord * height` above
/// the endpoints' mean radius.
pub fn arc_vertices(link_type: LinkType, a: Vec3, b: Vec3, base_radius: f64) -> Vec<Vec3> {
    let chord = a.distance(b);
    let height = if link_type.is_satellite() {
        ARC_HEIGHT_SATELLITE
    } else {
        ARC_HEIGHT_TERRESTRIAL
    };
    let apex_radius = 0.5 * (a.length() + b.length()) + chord * height;

    let mid = (a + b).scale(0.5);
    let dir = mid
        .normalize()
        .or_else(|| perpendicular(a))
        .unwrap_or(Vec3::new(0.0, 1.0, 0.0));
    // The curve's t=0.5 point is (a + 2c + b) / 4, so c = 2 * apex - mid.
    let control = dir.scale(2.0 * apex_radius - mid.length());

    sample_quadratic_bezier(a, control, b, arc_samples(chord, base_radius))
}

pub fn arc_samples(chord: f64, base_radius: f64) -> usize {
    if base_radius <= 0.0 || !chord.is_finite() {
        return MIN_ARC_SAMPLES;
    }
    let n = (chord / base_radius * ARC_SAMPLES_PER_RADIUS).ceil();
    (n as usize).clamp(MIN_ARC_SAMPLES, MAX_ARC_SAMPLES)
}

/// Catmull-Rom through the waypoints, every sample pushed back onto the
/// sphere so long spans follow the surface instead of tunnelling through it.
pub fn cable_vertices(cable: &CableRoute, config: &ProjectionConfig) -> Vec<Vec3> {
    let control: Vec<Vec3> = cable
        .route()
        .iter()
        .map(|p| config.project_raw(p.latitude(), p.longitude(), 0.0))
        .collect();
    let radius = config.base_radius + CABLE_LIFT;
    sample_catmull_rom(&control, CABLE_SAMPLES_PER_SEGMENT)
        .into_iter()
        .map(|v| v.normalize().map(|n| n.scale(radius)).unwrap_or(v))
        .collect()
}

fn perpendicular(v: Vec3) -> Option<Vec3> {
    v.cross(Vec3::new(0.0, 1.0, 0.0))
        .normalize()
        .or_else(|| v.cross(Vec3::new(1.0, 0.0, 0.0)).normalize())
}
