use crate::frame::Frame;

/// What happened to the scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    TopologyLoaded,
    FallbackUsed,
    StaleLoadIgnored,
    SceneRebuilt,
    FilterChanged,
    RotationToggled,
    ViewReset,
    Disposed,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::TopologyLoaded => "topology_loaded",
            EventKind::FallbackUsed => "fallback_used",
            EventKind::StaleLoadIgnored => "stale_load_ignored",
            EventKind::SceneRebuilt => "scene_rebuilt",
            EventKind::FilterChanged => "filter_changed",
            EventKind::RotationToggled => "rotation_toggled",
            EventKind::ViewReset => "view_reset",
            EventKind::Disposed => "disposed",
        }
    }
}

/// Trace entry for a scene mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: EventKind,
    pub message: String,
}

/// Append-only trace of scene mutations, drained by the host.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, frame: Frame, kind: EventKind, message: impl Into<String>) {
        self.events.push(Event {
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, EventKind};
    use crate::frame::Frame;

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        let f = Frame::new(2, 0.1);
        bus.emit(f, EventKind::SceneRebuilt, "12 objects");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
        assert_eq!(bus.count(EventKind::SceneRebuilt), 1);
        assert_eq!(bus.count(EventKind::Disposed), 0);
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(Frame::first(), EventKind::ViewReset, "reset");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].kind.as_str(), "view_reset");
        assert!(bus.events().is_empty());
    }
}
