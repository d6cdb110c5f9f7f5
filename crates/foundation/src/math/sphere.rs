//! Spherical globe coordinates.
//!
//! Geographic convention used by the whole scene: `y` is the polar axis,
//! latitude 90° maps to `+y`, and longitude increases counter-clockwise seen
//! from the north pole. The globe is a perfect sphere of caller-chosen radius
//! in scene units (not an ellipsoid, not to scale).

use super::Vec3;

/// Scene units added to the radius per kilometre of altitude.
///
/// This is a visual exaggeration so low orbits are distinguishable from the
/// surface.
pub const ALTITUDE_SCALE: f64 = 0.02;

/// Gap kept between snapped ground equipment and the sphere mesh.
pub const SURFACE_EPSILON: f64 = 0.05;

/// Project geographic coordinates onto (or above) a sphere.
///
/// - `lat_deg` in `[-90, 90]`, `lon_deg` in `[-180, 180]` (values outside wrap
///   through `sin`/`cos`).
/// - `altitude_km` is scaled by [`ALTITUDE_SCALE`].
pub fn project(lat_deg: f64, lon_deg: f64, altitude_km: f64, base_radius: f64) -> Vec3 {
    project_scaled(lat_deg, lon_deg, altitude_km, base_radius, ALTITUDE_SCALE)
}

pub fn project_scaled(
    lat_deg: f64,
    lon_deg: f64,
    altitude_km: f64,
    base_radius: f64,
    altitude_scale: f64,
) -> Vec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = (lon_deg + 180.0).to_radians();
    let radius = base_radius + altitude_km * altitude_scale;

    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();

    Vec3::new(
        -radius * sin_phi * cos_theta,
        radius * cos_phi,
        radius * sin_phi * sin_theta,
    )
}

/// Geographic coordinates recovered from a scene-space point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLonAlt {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub altitude_km: f64,
}

/// Inverse of [`project`].
///
/// Longitude is normalized into `[-180, 180)`. At the poles longitude is
/// undefined and reported as `-180`.
pub fn unproject(point: Vec3, base_radius: f64) -> LatLonAlt {
    unproject_scaled(point, base_radius, ALTITUDE_SCALE)
}

pub fn unproject_scaled(point: Vec3, base_radius: f64, altitude_scale: f64) -> LatLonAlt {
    let radius = point.length();
    if radius <= 0.0 {
        return LatLonAlt {
            lat_deg: 0.0,
            lon_deg: -180.0,
            altitude_km: -base_radius / altitude_scale,
        };
    }

    let phi = (point.y / radius).clamp(-1.0, 1.0).acos();
    let theta = point.z.atan2(-point.x);

    LatLonAlt {
        lat_deg: 90.0 - phi.to_degrees(),
        lon_deg: wrap_longitude(theta.to_degrees() - 180.0),
        altitude_km: (radius - base_radius) / altitude_scale,
    }
}

/// Wrap a longitude in degrees into `[-180, 180)`.
pub fn wrap_longitude(lon_deg: f64) -> f64 {
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Push a point onto the sphere surface, just above the mesh.
///
/// Applied to altitude-0 ground equipment after projection. The origin has no
/// direction and is returned unchanged.
pub fn snap_to_surface(point: Vec3, base_radius: f64) -> Vec3 {
    match point.normalize() {
        Some(dir) => dir.scale(base_radius + SURFACE_EPSILON),
        None => point,
    }
}
