//! Orbit camera around the globe with smooth zoom.
//!
//! The zoom slider (`0..=100`) maps inversely and linearly onto camera
//! distance: 0 is the farthest view, 100 the closest. Distance eases toward
//! its target exponentially, so slider jumps never teleport the camera.

use foundation::math::Vec3;
use scene::picking::Ray;
use scene::rotation::clamp_frame_dt;
use scene::visibility::{ZOOM_MAX, ZOOM_MIN};

/// Closest camera distance, in base radii.
const MIN_DISTANCE_FACTOR: f64 = 1.3;
/// Farthest camera distance, in base radii.
const MAX_DISTANCE_FACTOR: f64 = 5.0;

/// Zoom smoothing factor (higher = faster response).
const ZOOM_SMOOTHING: f64 = 8.0;

const DEFAULT_YAW: f64 = 0.0;
const DEFAULT_PITCH_DEG: f64 = 20.0;
const MAX_PITCH_DEG: f64 = 85.0;
const DEFAULT_FOV_Y_DEG: f64 = 45.0;

/// Camera distance for a zoom level within `[min, max]`.
pub fn zoom_to_distance(zoom_level: f64, min_distance: f64, max_distance: f64) -> f64 {
    let zoom = if zoom_level.is_finite() {
        zoom_level.clamp(ZOOM_MIN, ZOOM_MAX)
    } else {
        ZOOM_MIN
    };
    let t = (zoom - ZOOM_MIN) / (ZOOM_MAX - ZOOM_MIN);
    max_distance - t * (max_distance - min_distance)
}

#[derive(Debug, Clone)]
pub struct CameraRig {
    min_distance: f64,
    max_distance: f64,
    distance: f64,
    target_distance: f64,
    /// Rotation about the polar axis (radians).
    yaw: f64,
    /// Elevation above the equatorial plane (radians).
    pitch: f64,
    fov_y: f64,
    canvas_width: f64,
    canvas_height: f64,
}

impl CameraRig {
    pub fn new(base_radius: f64, zoom_level: f64) -> Self {
        let min_distance = base_radius * MIN_DISTANCE_FACTOR;
        let max_distance = base_radius * MAX_DISTANCE_FACTOR;
        let distance = zoom_to_distance(zoom_level, min_distance, max_distance);
        Self {
            min_distance,
            max_distance,
            distance,
            target_distance: distance,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH_DEG.to_radians(),
            fov_y: DEFAULT_FOV_Y_DEG.to_radians(),
            canvas_width: 1280.0,
            canvas_height: 720.0,
        }
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width.max(1.0);
        self.canvas_height = height.max(1.0);
    }

    /// Retarget the distance; the camera eases there in `update`.
    pub fn set_zoom(&mut self, zoom_level: f64) {
        if !zoom_level.is_finite() {
            return;
        }
        self.target_distance = zoom_to_distance(zoom_level, self.min_distance, self.max_distance);
    }

    /// Drag the camera around the globe.
    pub fn orbit(&mut self, delta_yaw: f64, delta_pitch: f64) {
        let max_pitch = MAX_PITCH_DEG.to_radians();
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f64::consts::TAU);
        self.pitch = (self.pitch + delta_pitch).clamp(-max_pitch, max_pitch);
    }

    pub fn update(&mut self, dt: f64) {
        let dt = clamp_frame_dt(dt);
        let alpha = 1.0 - (-ZOOM_SMOOTHING * dt).exp();
        self.distance += (self.target_distance - self.distance) * alpha;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Default orientation at `zoom_level`, without easing.
    pub fn reset(&mut self, zoom_level: f64) {
        self.yaw = DEFAULT_YAW;
        self.pitch = DEFAULT_PITCH_DEG.to_radians();
        self.distance = zoom_to_distance(zoom_level, self.min_distance, self.max_distance);
        self.target_distance = self.distance;
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn target_distance(&self) -> f64 {
        self.target_distance
    }

    pub fn distance_range(&self) -> (f64, f64) {
        (self.min_distance, self.max_distance)
    }

    pub fn eye_position(&self) -> Vec3 {
        let (sin_p, cos_p) = self.pitch.sin_cos();
        let (sin_y, cos_y) = self.yaw.sin_cos();
        Vec3::new(cos_p * sin_y, sin_p, cos_p * cos_y).scale(self.distance)
    }

    /// Ray from the eye through a canvas pixel.
    pub fn screen_ray(&self, x_px: f64, y_px: f64) -> Option<Ray> {
        let eye = self.eye_position();
        let forward = (-eye).normalize()?;
        let side = forward.cross(Vec3::new(0.0, 1.0, 0.0)).normalize()?;
        let up = side.cross(forward);

        let nx = 2.0 * x_px / self.canvas_width - 1.0;
        let ny = 1.0 - 2.0 * y_px / self.canvas_height;
        let half = (0.5 * self.fov_y).tan();
        let aspect = self.canvas_width / self.canvas_height;

        let dir = forward + side.scale(nx * half * aspect) + up.scale(ny * half);
        Some(Ray::new(eye, dir))
    }
}
