use foundation::math::Vec3;

use crate::network::{CableType, Color, LinkType};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VectorGeometryId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VectorGeometryKind {
    LinkArc(LinkType),
    CablePath(CableType),
}

#[derive(Debug, Clone, PartialEq)]
pub enum VectorGeometry {
    Polyline { vertices: Vec<Vec3> },
}

impl VectorGeometry {
    pub fn vertices(&self) -> &[Vec3] {
        match self {
            VectorGeometry::Polyline { vertices } => vertices,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ComponentVectorGeometry {
    pub id: VectorGeometryId,
    pub kind: VectorGeometryKind,
    pub color: Color,
    pub width: f64,
}

impl ComponentVectorGeometry {
    pub fn new(id: VectorGeometryId, kind: VectorGeometryKind, color: Color, width: f64) -> Self {
        Self {
            id,
            kind,
            color,
            width,
        }
    }
}
