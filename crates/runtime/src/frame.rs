/// Per-frame metadata handed to scheduled tasks.
///
/// Frames are numbered from 0. `dt_s` is the time since the previous frame as
/// reported by the host (or a fixed step in headless runs).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
    /// Seconds since the first frame.
    pub elapsed_s: f64,
}

impl Frame {
    /// Fixed-step frame, for replays and tests.
    pub fn fixed(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            elapsed_s: index as f64 * dt_s,
        }
    }

    pub fn next_fixed(self) -> Self {
        Self::fixed(self.index + 1, self.dt_s)
    }
}

/// Turns host frame timestamps (milliseconds, as passed to an animation frame
/// callback) into [`Frame`]s.
#[derive(Debug, Clone)]
pub struct FrameClock {
    fallback_dt_s: f64,
    next_index: u64,
    first_host_ms: Option<f64>,
    last_host_ms: Option<f64>,
}

impl FrameClock {
    pub const DEFAULT_DT_S: f64 = 1.0 / 60.0;

    pub fn new(fallback_dt_s: f64) -> Self {
        Self {
            fallback_dt_s,
            next_index: 0,
            first_host_ms: None,
            last_host_ms: None,
        }
    }

    pub fn frames_issued(&self) -> u64 {
        self.next_index
    }

    /// Produces the next frame for a host timestamp.
    ///
    /// The first frame, and any frame whose host timestamp does not advance,
    /// uses the fallback step.
    pub fn advance(&mut self, host_ms: f64) -> Frame {
        let dt_s = match self.last_host_ms {
            Some(last) if host_ms > last => (host_ms - last) / 1000.0,
            _ => self.fallback_dt_s,
        };
        let first = *self.first_host_ms.get_or_insert(host_ms);
        let index = self.next_index;
        self.next_index += 1;
        self.last_host_ms = Some(host_ms.max(self.last_host_ms.unwrap_or(host_ms)));

        Frame {
            index,
            dt_s,
            elapsed_s: ((host_ms - first) / 1000.0).max(0.0),
        }
    }

    /// Forgets the host timeline, e.g. after the animation loop was paused.
    ///
    /// Frame indices keep counting up.
    pub fn rebase(&mut self) {
        self.first_host_ms = None;
        self.last_host_ms = None;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DT_S)
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FrameClock};

    #[test]
    fn fixed_frames_are_deterministic() {
        let a = Frame::fixed(10, 0.5);
        assert_eq!(a, Frame::fixed(10, 0.5));
        assert_eq!(a.elapsed_s, 5.0);
        assert_eq!(a.next_fixed().index, 11);
    }

    #[test]
    fn clock_derives_dt_from_host_time() {
        let mut clock = FrameClock::new(0.25);
        let f0 = clock.advance(1000.0);
        assert_eq!(f0.index, 0);
        assert_eq!(f0.dt_s, 0.25);
        assert_eq!(f0.elapsed_s, 0.0);

        let f1 = clock.advance(1020.0);
        assert_eq!(f1.index, 1);
        assert!((f1.dt_s - 0.02).abs() < 1e-12);
        assert!((f1.elapsed_s - 0.02).abs() < 1e-12);
    }

    #[test]
    fn clock_ignores_time_going_backwards() {
        let mut clock = FrameClock::new(0.1);
        clock.advance(500.0);
        let f = clock.advance(400.0);
        assert_eq!(f.dt_s, 0.1);
    }

    #[test]
    fn rebase_keeps_counting_frames() {
        let mut clock = FrameClock::default();
        clock.advance(10.0);
        clock.advance(26.0);
        clock.rebase();
        let f = clock.advance(9000.0);
        assert_eq!(f.index, 2);
        assert_eq!(f.elapsed_s, 0.0);
        assert_eq!(clock.frames_issued(), 3);
    }
}
