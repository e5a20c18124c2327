use foundation::{TimeRange, Timestamp};
use serde::Serialize;

/// Integer coordinate along the scrub range.
///
/// Values are produced clamped into `[0, scale_range]`; there is no way to
/// build a negative position.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PlaybackPosition(u32);

impl PlaybackPosition {
    pub const ZERO: PlaybackPosition = PlaybackPosition(0);

    /// Clamps `value` into `[0, max]`.
    pub fn clamped(value: i64, max: u32) -> Self {
        PlaybackPosition(value.clamp(0, i64::from(max)) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Linear mapping between a time range and `[0, scale_range]`.
///
/// The domain is fixed at construction: build a new scale when the active
/// range changes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimeScale {
    domain: TimeRange,
    scale_range: u32,
}

impl TimeScale {
    pub fn new(domain: TimeRange, scale_range: u32) -> Self {
        Self {
            domain,
            scale_range,
        }
    }

    pub fn domain(&self) -> TimeRange {
        self.domain
    }

    pub fn scale_range(&self) -> u32 {
        self.scale_range
    }

    /// Unrounded, unclamped position of `t`. Always 0 on a degenerate domain.
    pub fn forward_exact(&self, t: Timestamp) -> f64 {
        if self.domain.is_degenerate() {
            return 0.0;
        }
        (t.0 - self.domain.min().0) / self.domain.span_s() * f64::from(self.scale_range)
    }

    /// Nearest position of `t`, clamped into the range.
    pub fn forward(&self, t: Timestamp) -> PlaybackPosition {
        let exact = self.forward_exact(t);
        if !exact.is_finite() {
            return PlaybackPosition::ZERO;
        }
        PlaybackPosition::clamped(exact.round() as i64, self.scale_range)
    }

    /// Timestamp at `position`. A degenerate domain maps everything to its
    /// single instant.
    pub fn inverse(&self, position: PlaybackPosition) -> Timestamp {
        if self.domain.is_degenerate() || self.scale_range == 0 {
            return self.domain.min();
        }
        let fraction = f64::from(position.value()) / f64::from(self.scale_range);
        Timestamp(self.domain.min().0 + fraction * self.domain.span_s())
    }

    /// Width of one position step, in seconds.
    pub fn seconds_per_step(&self) -> f64 {
        if self.scale_range == 0 {
            return 0.0;
        }
        self.domain.span_s() / f64::from(self.scale_range)
    }
}
