use crate::network::Color;

/// Closed set of marker silhouettes, one per element type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MarkerShape {
    Octahedron,
    Cone,
    Cube,
    Cylinder,
    Dot,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape3D {
    /// The globe itself.
    Sphere { radius: f64 },
    Marker { shape: MarkerShape, size: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Drawable3D {
    pub shape: Shape3D,
    pub color: Color,
}

impl Drawable3D {
    pub fn sphere(radius: f64, color: Color) -> Self {
        Self {
            shape: Shape3D::Sphere { radius },
            color,
        }
    }

    pub fn marker(shape: MarkerShape, size: f64, color: Color) -> Self {
        Self {
            shape: Shape3D::Marker { shape, size },
            color,
        }
    }

    /// Bounding radius used for hover/click hit tests.
    pub fn pick_radius(&self) -> f64 {
        match self.shape {
            Shape3D::Sphere { radius } => radius,
            Shape3D::Marker { size, .. } => size * 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Drawable3D, MarkerShape, Shape3D};
    use crate::network::Color;

    #[test]
    fn create_marker_drawable() {
        let drawable = Drawable3D::marker(MarkerShape::Cone, 2.0, Color::rgb(1, 2, 3));
        assert!(matches!(drawable.shape, Shape3D::Marker { .. }));
        assert_eq!(drawable.pick_radius(), 1.0);
    }
}
