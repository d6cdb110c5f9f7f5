use foundation::time::Time;

/// Frame metadata handed to every per-frame step.
///
/// The host frame driver owns the clock; the engine only ever sees the delta
/// it was given, which keeps ticks replayable in tests.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Engine time after applying `dt_s` (seconds).
    pub time: Time,
}

impl Frame {
    /// Fixed-step frame: `time = index * dt_s`.
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn first() -> Self {
        Self::new(0, 0.0)
    }

    /// Next frame with a host-measured delta.
    pub fn advance(self, dt_s: f64) -> Self {
        Self {
            index: self.index + 1,
            dt_s,
            time: self.time.advance(dt_s),
        }
    }

    pub fn next(self) -> Self {
        self.advance(self.dt_s)
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn frame_time_is_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time, Time(10.0 / 60.0));
    }

    #[test]
    fn next_advances_index_and_time() {
        let f0 = Frame::new(0, 0.5);
        let f1 = f0.next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
    }

    #[test]
    fn advance_accumulates_variable_deltas() {
        let f = Frame::first().advance(0.25).advance(0.5);
        assert_eq!(f.index, 2);
        assert_eq!(f.dt_s, 0.5);
        assert_eq!(f.time, Time(0.75));
    }
}
