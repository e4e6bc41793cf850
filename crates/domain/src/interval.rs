//! Half-open time intervals.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::Timestamp;

/// A `[start, end)` pair of timestamps with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    start: Timestamp,
    end: Timestamp,
}

#[derive(Deserialize)]
struct RawInterval {
    start: Timestamp,
    end: Timestamp,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = ValidationError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeInterval {
    /// Build an interval, rejecting one whose start lies after its end.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvertedInterval`] when `start > end`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> Timestamp {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Timestamp {
        self.end
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// `true` when `ts` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts < self.end
    }

    /// `true` when both intervals share at least one instant.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn ts(hour: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn should_reject_inverted_interval() {
        let result = TimeInterval::new(ts(5), ts(4));
        assert!(matches!(
            result,
            Err(ValidationError::InvertedInterval { .. })
        ));
    }

    #[test]
    fn should_accept_empty_interval() {
        let interval = TimeInterval::new(ts(3), ts(3)).unwrap();
        assert_eq!(interval.duration(), Duration::zero());
        assert!(!interval.contains(ts(3)));
    }

    #[test]
    fn should_exclude_end_when_checking_containment() {
        let interval = TimeInterval::new(ts(1), ts(3)).unwrap();
        assert!(interval.contains(ts(1)));
        assert!(interval.contains(ts(2)));
        assert!(!interval.contains(ts(3)));
    }

    #[test]
    fn should_not_overlap_when_intervals_only_touch() {
        let a = TimeInterval::new(ts(1), ts(3)).unwrap();
        let b = TimeInterval::new(ts(3), ts(5)).unwrap();
        let c = TimeInterval::new(ts(2), ts(4)).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn should_reject_inverted_interval_when_deserializing() {
        let json = r#"{"start":"2024-01-01T05:00:00Z","end":"2024-01-01T04:00:00Z"}"#;
        let result: Result<TimeInterval, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
