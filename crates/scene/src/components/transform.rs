use foundation::math::Vec3;

/// World placement of an entity.
///
/// Markers carry their final position; curves keep canonical vertices and
/// carry the globe's spin as `rotation_y` instead.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation about the polar axis (radians).
    pub rotation_y: f64,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_y: 0.0,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position,
            rotation_y: 0.0,
        }
    }

    pub fn spin(rotation_y: f64) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_y,
        }
    }

    /// Map a local point into world space.
    pub fn apply(&self, local: Vec3) -> Vec3 {
        local.rotate_y(self.rotation_y) + self.position
    }
}
