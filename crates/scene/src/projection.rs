use foundation::math::{ALTITUDE_SCALE, Vec3, project_scaled, snap_to_surface};
use serde::{Deserialize, Serialize};

use crate::network::{GeoPoint, NetworkElement};

pub const DEFAULT_BASE_RADIUS: f64 = 100.0;

/// Sphere size and altitude exaggeration shared by every scene object.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionConfig {
    pub base_radius: f64,
    pub altitude_scale: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            base_radius: DEFAULT_BASE_RADIUS,
            altitude_scale: ALTITUDE_SCALE,
        }
    }
}

impl ProjectionConfig {
    pub fn project(&self, point: &GeoPoint) -> Vec3 {
        self.project_raw(point.latitude(), point.longitude(), point.altitude_km())
    }

    pub fn project_raw(&self, lat_deg: f64, lon_deg: f64, altitude_km: f64) -> Vec3 {
        project_scaled(
            lat_deg,
            lon_deg,
            altitude_km,
            self.base_radius,
            self.altitude_scale,
        )
    }

    /// Element position with an extra longitude offset and explicit altitude.
    ///
    /// Ground equipment at altitude 0 is snapped onto the surface.
    pub fn place(&self, element: &NetworkElement, lon_offset_deg: f64, altitude_km: f64) -> Vec3 {
        let p = &element.position;
        let raw = self.project_raw(p.latitude(), p.longitude() + lon_offset_deg, altitude_km);
        if !element.is_satellite() && p.is_on_surface() {
            snap_to_surface(raw, self.base_radius)
        } else {
            raw
        }
    }
}
