//! The embeddable globe component.
//!
//! One owned state object with a handful of mutation entry points. The host
//! drives it: `tick(dt)` once per display refresh and the filter and rotation
//! setters from UI handlers. Fresh data comes from `start_load`, whose future
//! borrows nothing from the component: the host keeps ticking the bare globe
//! while it is pending, then hands the outcome to `apply_loaded`.

use std::collections::BTreeMap;
use std::sync::Arc;

use formats::{
    BoxFuture, Loaded, StaticSource, TopologySource, load_cables, load_topology,
    SAMPLE_CABLES_JSON, SAMPLE_TOPOLOGY_JSON, source_for,
};
use runtime::{Event, EventBus, EventKind, Frame};
use scene::picking::Ray;
use scene::rotation::{RotationMode, Rotator, clamp_frame_dt};
use scene::visibility::{DEFAULT_ZOOM, FilterPatch, ViewFilterState};
use scene::{CableRoute, ElementInfo, NetworkScene, RebuildSummary, Topology, TopologyStats};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, RenderBackend, RenderFrame};
use crate::camera::CameraRig;
use crate::config::ViewerConfig;

#[derive(Debug)]
pub enum VisualizationError {
    /// The backend could not acquire a rendering context.
    RenderingContextUnavailable(BackendError),
    /// A frame failed to render.
    Backend(BackendError),
    /// The component was torn down.
    Disposed,
}

impl std::fmt::Display for VisualizationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisualizationError::RenderingContextUnavailable(e) => {
                write!(f, "rendering context unavailable: {e}")
            }
            VisualizationError::Backend(e) => write!(f, "render failed: {e}"),
            VisualizationError::Disposed => write!(f, "visualization has been disposed"),
        }
    }
}

impl std::error::Error for VisualizationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VisualizationError::RenderingContextUnavailable(e) => Some(e),
            VisualizationError::Backend(e) => Some(e),
            VisualizationError::Disposed => None,
        }
    }
}

/// Where loads fetch from. Shared with in-flight fetches.
#[derive(Clone)]
pub struct Sources {
    pub topology: Arc<dyn TopologySource>,
    pub cables: Arc<dyn TopologySource>,
}

impl Sources {
    /// Configured locations, the embedded sample documents otherwise.
    pub fn from_config(config: &ViewerConfig) -> Self {
        let topology: Arc<dyn TopologySource> = match config.topology.as_deref() {
            Some(location) => Arc::from(source_for(location)),
            None => Arc::new(StaticSource::new("sample-topology", SAMPLE_TOPOLOGY_JSON)),
        };
        let cables: Arc<dyn TopologySource> = match config.cables.as_deref() {
            Some(location) => Arc::from(source_for(location)),
            None => Arc::new(StaticSource::new("sample-cables", SAMPLE_CABLES_JSON)),
        };
        Self { topology, cables }
    }
}

/// Identifies one load request; only the latest one may be applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// What a detached load resolves to.
pub type LoadOutcome = (Loaded<Topology>, Loaded<Vec<CableRoute>>);

/// Snapshot for status panels and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerSummary {
    pub frames: u64,
    pub elapsed_s: f64,
    pub used_fallback: bool,
    pub rotating: bool,
    pub rotation_deg: f64,
    pub camera_distance: f64,
    pub filter: ViewFilterState,
    pub scene: RebuildSummary,
    pub stats: TopologyStats,
    pub events: BTreeMap<&'static str, usize>,
}

pub struct Visualization<B: RenderBackend> {
    backend: Option<B>,
    sources: Sources,
    scene: NetworkScene,
    filter: ViewFilterState,
    rotator: Rotator,
    camera: CameraRig,
    events: EventBus,
    frame: Frame,
    load_generation: u64,
    using_fallback: bool,
    last_rebuild: RebuildSummary,
}

impl<B: RenderBackend> Visualization<B> {
    /// Acquire the backend's rendering context and set up an empty globe.
    ///
    /// On `RenderingContextUnavailable` the host should show a static
    /// fallback instead.
    pub fn new(mut backend: B, config: &ViewerConfig) -> Result<Self, VisualizationError> {
        backend
            .init()
            .map_err(VisualizationError::RenderingContextUnavailable)?;

        let mut rotator = Rotator::new(config.rotation_speed);
        rotator.set_rotating(config.filter.is_rotating);
        let mut camera = CameraRig::new(config.projection.base_radius, config.filter.zoom_level);
        camera.set_canvas_size(config.canvas_width, config.canvas_height);

        Ok(Self {
            backend: Some(backend),
            sources: Sources::from_config(config),
            scene: NetworkScene::new(config.projection),
            filter: config.filter,
            rotator,
            camera,
            events: EventBus::new(),
            frame: Frame::first(),
            load_generation: 0,
            using_fallback: false,
            last_rebuild: RebuildSummary::default(),
        })
    }

    pub fn with_sources(mut self, sources: Sources) -> Self {
        self.set_sources(sources);
        self
    }

    /// Takes effect from the next load; fetches already started keep theirs.
    pub fn set_sources(&mut self, sources: Sources) {
        self.sources = sources;
    }

    pub fn is_disposed(&self) -> bool {
        self.backend.is_none()
    }

    fn ensure_live(&self) -> Result<(), VisualizationError> {
        if self.is_disposed() {
            debug!("call on disposed visualization ignored");
            return Err(VisualizationError::Disposed);
        }
        Ok(())
    }

    /// Start a load; any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket(self.load_generation)
    }

    /// Install loaded data and rebuild. Returns `Ok(false)` for a stale ticket.
    pub fn apply_loaded(
        &mut self,
        ticket: LoadTicket,
        topology: Loaded<Topology>,
        cables: Loaded<Vec<CableRoute>>,
    ) -> Result<bool, VisualizationError> {
        self.ensure_live()?;
        if ticket.0 != self.load_generation {
            debug!(ticket = ticket.0, latest = self.load_generation, "stale load ignored");
            self.events.emit(
                self.frame,
                EventKind::StaleLoadIgnored,
                format!("load {} superseded by {}", ticket.0, self.load_generation),
            );
            return Ok(false);
        }

        self.using_fallback = topology.used_fallback || cables.used_fallback;
        if self.using_fallback {
            warn!("showing sample network data");
        }
        for reason in [&topology.fallback_reason, &cables.fallback_reason]
            .into_iter()
            .flatten()
        {
            self.events
                .emit(self.frame, EventKind::FallbackUsed, reason.clone());
        }
        self.events.emit(
            self.frame,
            EventKind::TopologyLoaded,
            format!(
                "{} elements, {} links, {} cables",
                topology.data.elements().len(),
                topology.data.links().len(),
                cables.data.len()
            ),
        );

        self.scene.set_data(topology.data, cables.data);
        self.rebuild();
        Ok(true)
    }

    /// Issue a ticket and a fetch of both documents that owns its sources.
    ///
    /// Any load started later makes this ticket stale.
    pub fn start_load(&mut self) -> (LoadTicket, BoxFuture<'static, LoadOutcome>) {
        let ticket = self.begin_load();
        let topology = Arc::clone(&self.sources.topology);
        let cables = Arc::clone(&self.sources.cables);
        let fetch: BoxFuture<'static, LoadOutcome> = Box::pin(async move {
            let topology = load_topology(topology.as_ref()).await;
            let cables = load_cables(cables.as_ref()).await;
            (topology, cables)
        });
        (ticket, fetch)
    }

    /// Fetch both documents and install them, without rendering in between.
    /// Never fails on data problems: those fall back to the sample dataset.
    pub async fn load_topology(&mut self) -> Result<bool, VisualizationError> {
        self.ensure_live()?;
        let (ticket, fetch) = self.start_load();
        let (topology, cables) = fetch.await;
        self.apply_loaded(ticket, topology, cables)
    }

    pub fn set_filter(&mut self, patch: FilterPatch) -> Result<(), VisualizationError> {
        self.ensure_live()?;
        let before = self.filter;
        self.filter.apply(&patch);

        if self.filter.zoom_level != before.zoom_level {
            self.camera.set_zoom(self.filter.zoom_level);
        }
        if let Some(rotating) = patch.is_rotating {
            self.set_rotating(rotating)?;
        }
        if self.filter != before {
            self.events
                .emit(self.frame, EventKind::FilterChanged, format!("{:?}", self.filter));
        }
        if patch.touches_visibility() && visibility_changed(&before, &self.filter) {
            self.rebuild();
        }
        Ok(())
    }

    pub fn set_rotating(&mut self, rotating: bool) -> Result<(), VisualizationError> {
        self.ensure_live()?;
        self.filter.is_rotating = rotating;
        if self.rotator.set_rotating(rotating) {
            info!(rotating, "rotation toggled");
            self.events.emit(
                self.frame,
                EventKind::RotationToggled,
                if rotating { "rotating" } else { "paused" },
            );
        }
        Ok(())
    }

    /// Default camera, default zoom and rotation angle zero. Filters and
    /// the rotating/paused mode are kept.
    pub fn reset_view(&mut self) -> Result<(), VisualizationError> {
        self.ensure_live()?;
        self.filter.zoom_level = DEFAULT_ZOOM;
        self.camera.reset(DEFAULT_ZOOM);
        self.rotator.reset();
        self.scene.sync(&self.rotator);
        self.events.emit(self.frame, EventKind::ViewReset, "view reset");
        Ok(())
    }

    /// Release the rendering context. Later calls are no-ops.
    pub fn dispose(&mut self) {
        match self.backend.take() {
            Some(mut backend) => {
                backend.release();
                self.events.emit(self.frame, EventKind::Disposed, "disposed");
                info!(frames = self.frame.index, "visualization disposed");
            }
            None => debug!("dispose called on disposed visualization"),
        }
    }

    /// One display refresh: rotate, sync positions, ease the camera, render.
    pub fn tick(&mut self, dt: f64) -> Result<(), VisualizationError> {
        self.ensure_live()?;
        let dt = clamp_frame_dt(dt);
        self.frame = self.frame.advance(dt);
        if self.rotator.tick(dt) {
            self.scene.sync(&self.rotator);
        }
        self.camera.update(dt);

        let Some(backend) = self.backend.as_mut() else {
            return Err(VisualizationError::Disposed);
        };
        let frame = RenderFrame {
            frame: self.frame,
            world: self.scene.world(),
            eye: self.camera.eye_position(),
        };
        backend.render(&frame).map_err(VisualizationError::Backend)
    }

    pub fn using_fallback_data(&self) -> bool {
        self.using_fallback
    }

    pub fn pick(&self, ray: Ray) -> Option<ElementInfo> {
        self.scene.pick(ray)
    }

    /// Hover info under a canvas pixel.
    pub fn pick_screen(&self, x_px: f64, y_px: f64) -> Option<ElementInfo> {
        self.scene.pick(self.camera.screen_ray(x_px, y_px)?)
    }

    pub fn filter(&self) -> &ViewFilterState {
        &self.filter
    }

    pub fn rotator(&self) -> &Rotator {
        &self.rotator
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraRig {
        &mut self.camera
    }

    pub fn scene(&self) -> &NetworkScene {
        &self.scene
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    pub fn summary(&self) -> ViewerSummary {
        let mut events = BTreeMap::new();
        for event in self.events.events() {
            *events.entry(event.kind.as_str()).or_insert(0) += 1;
        }
        ViewerSummary {
            frames: self.frame.index,
            elapsed_s: self.frame.time.seconds(),
            used_fallback: self.using_fallback,
            rotating: self.rotator.mode() == RotationMode::Rotating,
            rotation_deg: self.rotator.state().angle_degrees(),
            camera_distance: self.camera.distance(),
            filter: self.filter,
            scene: self.last_rebuild,
            stats: self.scene.topology().stats(),
            events,
        }
    }

    fn rebuild(&mut self) {
        self.last_rebuild = self.scene.rebuild(&self.filter, &self.rotator);
        self.events.emit(
            self.frame,
            EventKind::SceneRebuilt,
            format!(
                "{} elements, {} links, {} cables",
                self.last_rebuild.elements, self.last_rebuild.links, self.last_rebuild.cables
            ),
        );
    }
}

fn visibility_changed(a: &ViewFilterState, b: &ViewFilterState) -> bool {
    a.show_existing != b.show_existing
        || a.show_proposed != b.show_proposed
        || a.show_satellites != b.show_satellites
        || a.show_stations != b.show_stations
        || a.show_routers != b.show_routers
        || a.show_cables != b.show_cables
}

#[cfg(test)]
mod tests {
    use super::{Sources, Visualization, VisualizationError};
    use crate::backend::HeadlessBackend;
    use crate::config::ViewerConfig;
    use formats::{BoxFuture, Loaded, SourceError, StaticSource, TopologySource};
    use runtime::EventKind;
    use scene::rotation::MAX_FRAME_DT;
    use scene::visibility::{DEFAULT_ZOOM, FilterPatch};
    use std::sync::Arc;
    use scene::{CableRoute, Topology};

    const TOPOLOGY: &str = r#"{
        "elements": [
            {"id": "a", "name": "Alpha", "type": "router", "network": "existing", "lat": 0, "lng": 0},
            {"id": "b", "name": "Beta", "type": "satellite", "network": "proposed", "lat": 10, "lng": 10, "alt": 550}
        ],
        "connections": [
            {"from": "a", "to": "b", "type": "satellite_link", "network": "existing"}
        ]
    }"#;

    const SOLO: &str = r#"{"elements": [
        {"id": "solo", "name": "Solo", "type": "server", "lat": 1, "lng": 1}
    ]}"#;

    const CABLES: &str = r#"{"cables": [
        {"id": "c", "name": "C", "route": [{"lat": 0, "lng": 0}, {"lat": 5, "lng": 5}]}
    ]}"#;

    struct Down;

    impl TopologySource for Down {
        fn describe(&self) -> String {
            "down".to_string()
        }

        fn fetch(&self) -> BoxFuture<'_, Result<String, SourceError>> {
            Box::pin(async {
                Err(SourceError::Status {
                    location: "down".to_string(),
                    status: 500,
                })
            })
        }
    }

    fn inline_sources() -> Sources {
        Sources {
            topology: Arc::new(StaticSource::new("topology", TOPOLOGY)),
            cables: Arc::new(StaticSource::new("cables", CABLES)),
        }
    }

    fn viewer() -> Visualization<HeadlessBackend> {
        Visualization::new(HeadlessBackend::new(), &ViewerConfig::default())
            .unwrap()
            .with_sources(inline_sources())
    }

    fn loaded<T>(data: T) -> Loaded<T> {
        Loaded {
            data,
            used_fallback: false,
            fallback_reason: None,
            rejected: 0,
        }
    }

    #[test]
    fn backend_failure_is_rendering_context_unavailable() {
        let result = Visualization::new(HeadlessBackend::unavailable(), &ViewerConfig::default());
        assert!(matches!(
            result,
            Err(VisualizationError::RenderingContextUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn load_builds_scene() {
        let mut viz = viewer();
        assert!(viz.load_topology().await.unwrap());
        assert!(!viz.using_fallback_data());
        assert_eq!(viz.scene().element_count(), 2);
        assert_eq!(viz.scene().link_count(), 1);
        assert_eq!(viz.scene().cable_count(), 1);
        assert_eq!(viz.summary().events.get("topology_loaded"), Some(&1));
    }

    #[tokio::test]
    async fn failing_sources_show_sample_data() {
        let mut viz = viewer().with_sources(Sources {
            topology: Arc::new(Down),
            cables: Arc::new(Down),
        });
        viz.load_topology().await.unwrap();
        assert!(viz.using_fallback_data());
        assert!(viz.scene().element_count() > 2);
        assert_eq!(
            viz.events()
                .iter()
                .filter(|e| e.kind == EventKind::FallbackUsed)
                .count(),
            2
        );
    }

    #[test]
    fn stale_loads_are_ignored() {
        let mut viz = viewer();
        let first = viz.begin_load();
        let second = viz.begin_load();

        let applied = viz
            .apply_loaded(second, loaded(Topology::default()), loaded(Vec::<CableRoute>::new()))
            .unwrap();
        assert!(applied);
        let applied = viz
            .apply_loaded(first, loaded(Topology::default()), loaded(Vec::new()))
            .unwrap();
        assert!(!applied);
        assert_eq!(viz.summary().events.get("stale_load_ignored"), Some(&1));
    }

    #[tokio::test]
    async fn frames_render_while_load_is_pending() {
        let mut viz = viewer();
        let (ticket, fetch) = viz.start_load();
        let pending = tokio::spawn(fetch);

        for _ in 0..3 {
            viz.tick(0.016).unwrap();
        }
        let bare = viz.backend().and_then(HeadlessBackend::last_frame).unwrap();
        assert_eq!(bare.spheres, 1);
        assert_eq!(bare.markers, 0);
        assert_eq!(viz.scene().element_count(), 0);

        let (topology, cables) = pending.await.unwrap();
        assert!(viz.apply_loaded(ticket, topology, cables).unwrap());
        viz.tick(0.016).unwrap();

        let full = viz.backend().and_then(HeadlessBackend::last_frame).unwrap();
        assert_eq!(full.markers, 2);
        assert_eq!(full.link_arcs, 1);
        assert_eq!(full.cable_paths, 1);
        assert_eq!(viz.backend().map(HeadlessBackend::frames_rendered), Some(4));
    }

    #[tokio::test]
    async fn only_the_newest_of_interleaved_loads_applies() {
        let mut viz = viewer();
        let (older, older_fetch) = viz.start_load();
        viz.set_sources(Sources {
            topology: Arc::new(StaticSource::new("solo", SOLO)),
            cables: Arc::new(StaticSource::new("cables", CABLES)),
        });
        let (newer, newer_fetch) = viz.start_load();

        let (topology, cables) = newer_fetch.await;
        assert!(viz.apply_loaded(newer, topology, cables).unwrap());
        let (topology, cables) = older_fetch.await;
        assert!(!viz.apply_loaded(older, topology, cables).unwrap());

        assert_eq!(viz.scene().element_count(), 1);
        assert!(viz.scene().element_position("solo").is_some());
        assert!(viz.scene().element_position("a").is_none());
        let summary = viz.summary();
        assert_eq!(summary.events.get("topology_loaded"), Some(&1));
        assert_eq!(summary.events.get("stale_load_ignored"), Some(&1));
    }

    #[test]
    fn bad_frame_deltas_leave_the_clock_alone() {
        let mut viz = viewer();
        viz.tick(f64::NAN).unwrap();
        viz.tick(-1.0).unwrap();
        assert_eq!(viz.summary().elapsed_s, 0.0);

        viz.tick(5.0).unwrap();
        let summary = viz.summary();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.elapsed_s, MAX_FRAME_DT);
        assert_eq!(viz.rotator().angle(), 0.1 * MAX_FRAME_DT);
    }

    #[tokio::test]
    async fn hiding_proposed_hides_dependent_link() {
        let mut viz = viewer();
        viz.load_topology().await.unwrap();
        viz.set_filter(FilterPatch::network(true, false)).unwrap();
        assert_eq!(viz.scene().element_count(), 1);
        assert_eq!(viz.scene().link_count(), 0);

        // Zoom alone does not rebuild.
        let rebuilds = viz.summary().events["scene_rebuilt"];
        viz.set_filter(FilterPatch {
            zoom_level: Some(90.0),
            ..FilterPatch::default()
        })
        .unwrap();
        assert_eq!(viz.summary().events["scene_rebuilt"], rebuilds);
        assert!(viz.camera().target_distance() < viz.camera().distance());
    }

    #[tokio::test]
    async fn tick_rotates_until_paused() {
        let mut viz = viewer();
        viz.load_topology().await.unwrap();
        let start = viz.scene().element_position("a").unwrap();

        viz.tick(0.05).unwrap();
        let moved = viz.scene().element_position("a").unwrap();
        assert!(moved.distance(start) > 1e-9);

        viz.set_rotating(false).unwrap();
        viz.tick(0.05).unwrap();
        assert_eq!(viz.scene().element_position("a"), Some(moved));
        assert!(!viz.filter().is_rotating);
        assert_eq!(viz.backend().map(|b| b.frames_rendered()), Some(2));
    }

    #[tokio::test]
    async fn reset_view_restores_defaults() {
        let mut viz = viewer();
        viz.load_topology().await.unwrap();
        let start = viz.scene().element_position("a").unwrap();
        viz.set_filter(FilterPatch {
            zoom_level: Some(5.0),
            ..FilterPatch::default()
        })
        .unwrap();
        viz.tick(0.1).unwrap();

        viz.reset_view().unwrap();
        assert_eq!(viz.filter().zoom_level, DEFAULT_ZOOM);
        assert_eq!(viz.rotator().angle(), 0.0);
        let back = viz.scene().element_position("a").unwrap();
        assert!(back.distance(start) < 1e-9);
    }

    #[tokio::test]
    async fn pick_reports_element_info() {
        let mut viz = viewer();
        viz.load_topology().await.unwrap();
        let target = viz.scene().element_position("a").unwrap();
        let origin = target.scale(2.5);
        let info = viz
            .pick(scene::picking::Ray::new(origin, target - origin))
            .unwrap();
        assert_eq!(info.name, "Alpha");
    }

    #[test]
    fn dispose_stops_everything() {
        let mut viz = viewer();
        viz.dispose();
        assert!(viz.is_disposed());
        assert!(matches!(viz.tick(0.016), Err(VisualizationError::Disposed)));
        assert!(matches!(
            viz.set_filter(FilterPatch::default()),
            Err(VisualizationError::Disposed)
        ));
        viz.dispose();
        assert_eq!(viz.summary().events.get("disposed"), Some(&1));
    }
}
