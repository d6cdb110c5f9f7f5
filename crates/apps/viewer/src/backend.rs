//! Rendering seam.
//!
//! The visualization drives a `RenderBackend` once per tick with the current
//! scene. The headless backend renders nothing; it tallies what a GPU
//! backend would have drawn so the CLI and tests can inspect frames.

use foundation::math::Vec3;
use runtime::Frame;
use scene::World;
use scene::components::{SceneTag, Shape3D};
use serde::Serialize;

#[derive(Debug)]
pub struct BackendError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

/// Everything a backend needs for one frame.
pub struct RenderFrame<'a> {
    pub frame: Frame,
    pub world: &'a World,
    pub eye: Vec3,
}

pub trait RenderBackend {
    /// Acquire the rendering context. Failure is fatal to the visualization.
    fn init(&mut self) -> Result<(), BackendError>;

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), BackendError>;

    /// Release the rendering context. Called at most once.
    fn release(&mut self);
}

/// Draw-call tally for one frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub frame_index: u64,
    pub spheres: usize,
    pub markers: usize,
    pub link_arcs: usize,
    pub cable_paths: usize,
    pub vertices: usize,
}

pub fn frame_stats(frame: &RenderFrame<'_>) -> FrameStats {
    let mut stats = FrameStats {
        frame_index: frame.frame.index,
        ..FrameStats::default()
    };
    for (_, _, drawable) in frame.world.drawables_3d() {
        match drawable.shape {
            Shape3D::Sphere { .. } => stats.spheres += 1,
            Shape3D::Marker { .. } => stats.markers += 1,
        }
    }
    for (entity, _, component) in frame.world.vector_geometries_by_entity() {
        match frame.world.tag(entity) {
            Some(SceneTag::Link(_)) => stats.link_arcs += 1,
            Some(SceneTag::Cable(_)) => stats.cable_paths += 1,
            _ => {}
        }
        stats.vertices += frame
            .world
            .vector_geometry(component.id)
            .map(|g| g.vertices().len())
            .unwrap_or(0);
    }
    stats
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    fail_init: bool,
    initialized: bool,
    released: bool,
    frames_rendered: u64,
    last_frame: Option<FrameStats>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose context can never be acquired.
    pub fn unavailable() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn last_frame(&self) -> Option<FrameStats> {
        self.last_frame
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl RenderBackend for HeadlessBackend {
    fn init(&mut self) -> Result<(), BackendError> {
        if self.fail_init {
            return Err(BackendError::new("no rendering context available"));
        }
        self.initialized = true;
        Ok(())
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), BackendError> {
        if !self.initialized || self.released {
            return Err(BackendError::new("render called without a live context"));
        }
        self.frames_rendered += 1;
        self.last_frame = Some(frame_stats(frame));
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}
