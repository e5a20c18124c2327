use serde::Serialize;

/// Unix time in seconds. Pre-1970 dates are negative.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub f64);

impl Timestamp {
    pub fn seconds(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

/// Closed interval `[min, max]` of timestamps.
///
/// The constructor orders its arguments, so `min <= max` always holds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TimeRange {
    min: Timestamp,
    max: Timestamp,
}

impl TimeRange {
    pub fn new(a: Timestamp, b: Timestamp) -> Self {
        if b.0 < a.0 {
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    pub fn instant(t: Timestamp) -> Self {
        Self { min: t, max: t }
    }

    pub fn min(&self) -> Timestamp {
        self.min
    }

    pub fn max(&self) -> Timestamp {
        self.max
    }

    pub fn span_s(&self) -> f64 {
        self.max.0 - self.min.0
    }

    /// `min == max`: no linear mapping can be built over this range.
    pub fn is_degenerate(&self) -> bool {
        self.span_s() <= 0.0
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        t.0 >= self.min.0 && t.0 <= self.max.0
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(&self, other: &TimeRange) -> TimeRange {
        TimeRange {
            min: Timestamp(self.min.0.min(other.min.0)),
            max: Timestamp(self.max.0.max(other.max.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TimeRange, Timestamp};

    #[test]
    fn new_orders_bounds() {
        let r = TimeRange::new(Timestamp(30.0), Timestamp(10.0));
        assert_eq!(r.min(), Timestamp(10.0));
        assert_eq!(r.max(), Timestamp(30.0));
        assert_eq!(r.span_s(), 20.0);
    }

    #[test]
    fn instant_is_degenerate() {
        let r = TimeRange::instant(Timestamp(-5.0));
        assert!(r.is_degenerate());
        assert!(r.contains(Timestamp(-5.0)));
        assert!(!r.contains(Timestamp(-4.0)));
    }

    #[test]
    fn union_covers_both() {
        let a = TimeRange::new(Timestamp(0.0), Timestamp(10.0));
        let b = TimeRange::new(Timestamp(-3.0), Timestamp(4.0));
        let u = a.union(&b);
        assert_eq!(u, TimeRange::new(Timestamp(-3.0), Timestamp(10.0)));
    }
}
