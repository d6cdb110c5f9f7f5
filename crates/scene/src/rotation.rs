//! Global rotation and satellite orbits.
//!
//! The rotator is the single writer of the rotation angle. Ground equipment
//! is re-projected at `longitude + angle` so it stays glued to the spinning
//! sphere; satellites follow their own orbital clock instead.

use std::f64::consts::TAU;

use foundation::math::{Vec3, wrap_longitude};
use foundation::time::Time;

use crate::network::NetworkElement;
use crate::projection::ProjectionConfig;

/// Radians per second.
pub const DEFAULT_ROTATION_SPEED: f64 = 0.1;
/// Longer frames (tab switches, debugger pauses) are clamped to this.
pub const MAX_FRAME_DT: f64 = 0.1;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Orbital angular speed of a body skimming the surface, radians per second.
pub const SURFACE_ORBIT_SPEED: f64 = 0.2;
/// Peak altitude swing as a fraction of the satellite's altitude.
pub const ORBIT_RADIUS_OSCILLATION: f64 = 0.05;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RotationMode {
    Rotating,
    Paused,
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RotationState {
    angle_radians: f64,
}

impl RotationState {
    pub fn angle_radians(&self) -> f64 {
        self.angle_radians
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle_radians.to_degrees()
    }

    /// Advance and wrap into `[0, 2π)`.
    pub fn advance(&mut self, delta_radians: f64) {
        self.angle_radians = (self.angle_radians + delta_radians).rem_euclid(TAU);
    }
}

#[derive(Debug, Clone)]
pub struct Rotator {
    mode: RotationMode,
    speed: f64,
    state: RotationState,
    orbit_clock: Time,
}

impl Default for Rotator {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATION_SPEED)
    }
}

impl Rotator {
    pub fn new(speed: f64) -> Self {
        Self {
            mode: RotationMode::Rotating,
            speed: if speed.is_finite() { speed } else { DEFAULT_ROTATION_SPEED },
            state: RotationState::default(),
            orbit_clock: Time::ZERO,
        }
    }

    pub fn mode(&self) -> RotationMode {
        self.mode
    }

    pub fn is_rotating(&self) -> bool {
        self.mode == RotationMode::Rotating
    }

    /// Returns whether the mode changed.
    pub fn set_rotating(&mut self, rotating: bool) -> bool {
        let next = if rotating {
            RotationMode::Rotating
        } else {
            RotationMode::Paused
        };
        let changed = next != self.mode;
        self.mode = next;
        changed
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn angle(&self) -> f64 {
        self.state.angle_radians()
    }

    pub fn orbit_time(&self) -> f64 {
        self.orbit_clock.seconds()
    }

    /// Advance by `dt` seconds. Returns `false` (and does nothing) while paused.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.mode == RotationMode::Paused {
            return false;
        }
        let dt = clamp_frame_dt(dt);
        self.state.advance(self.speed * dt);
        self.orbit_clock = self.orbit_clock.advance(dt);
        true
    }

    /// Back to angle zero; the mode is left alone.
    pub fn reset(&mut self) {
        self.state = RotationState::default();
        self.orbit_clock = Time::ZERO;
    }
}

/// Host frame delta clamped into `[0, MAX_FRAME_DT]`; non-finite becomes 0.
pub fn clamp_frame_dt(dt: f64) -> f64 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Independent circular orbit for one satellite.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitParams {
    /// Radians per second, falling off with altitude like Kepler's third law.
    pub angular_speed: f64,
    pub altitude_km: f64,
    pub oscillation_amplitude: f64,
    pub oscillation_rate: f64,
}

impl OrbitParams {
    pub fn for_altitude(altitude_km: f64) -> Self {
        let altitude_km = altitude_km.max(0.0);
        let ratio = EARTH_RADIUS_KM / (EARTH_RADIUS_KM + altitude_km);
        let angular_speed = SURFACE_ORBIT_SPEED * ratio.powf(1.5);
        Self {
            angular_speed,
            altitude_km,
            oscillation_amplitude: ORBIT_RADIUS_OSCILLATION,
            oscillation_rate: 2.0 * angular_speed,
        }
    }

    pub fn for_element(element: &NetworkElement) -> Self {
        Self::for_altitude(element.position.altitude_km())
    }

    /// Longitude offset in degrees (wrapped) at orbit time `t`.
    pub fn longitude_offset(&self, t: f64) -> f64 {
        wrap_longitude((self.angular_speed * t).to_degrees())
    }

    pub fn altitude_at(&self, t: f64) -> f64 {
        let swing = 1.0 + self.oscillation_amplitude * (self.oscillation_rate * t).sin();
        self.altitude_km * swing
    }
}

/// Where `element` sits right now.
pub fn element_position(
    element: &NetworkElement,
    rotator: &Rotator,
    config: &ProjectionConfig,
) -> Vec3 {
    if element.is_satellite() {
        let orbit = OrbitParams::for_element(element);
        let t = rotator.orbit_time();
        config.place(element, orbit.longitude_offset(t), orbit.altitude_at(t))
    } else {
        config.place(
            element,
            rotator.state().angle_degrees(),
            element.position.altitude_km(),
        )
    }
}
