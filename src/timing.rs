//! Timestamp reconciliation.
//!
//! Decoders are inconsistent about which timing fields they fill in. The
//! resolver walks a fixed fallback chain so every event ends up with a
//! definite `[start, end)` interval in milliseconds.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::cue::RawCue;

/// On-screen duration used when an event carries none, in milliseconds.
pub const DEFAULT_DURATION_MS: i64 = 2000;

/// Base assumed for `pts` when the event has no usable time base
/// (FFmpeg's `AV_TIME_BASE`, microseconds).
pub const FALLBACK_TIME_BASE: TimeBase = TimeBase::new(1, 1_000_000);

/// A rational time base: one tick lasts `numerator / denominator` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeBase {
    /// Numerator.
    pub numerator: i32,
    /// Denominator.
    pub denominator: i32,
}

impl TimeBase {
    /// Create a time base.
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// A time base is usable only when both terms are non-zero.
    pub fn is_valid(self) -> bool {
        self.numerator != 0 && self.denominator != 0
    }
}

impl Display for TimeBase {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Rescale `value` ticks of `time_base` to milliseconds.
///
/// Rounds to the nearest millisecond, halves away from zero, and saturates
/// at the `i64` range. An invalid time base yields 0.
pub fn rescale_to_millis(value: i64, time_base: TimeBase) -> i64 {
    if !time_base.is_valid() {
        return 0;
    }

    let mut scaled = i128::from(value) * i128::from(time_base.numerator) * 1000;
    let mut divisor = i128::from(time_base.denominator);
    if divisor < 0 {
        scaled = -scaled;
        divisor = -divisor;
    }

    let half = divisor / 2;
    let rounded = if scaled >= 0 {
        (scaled + half) / divisor
    } else {
        -((-scaled + half) / divisor)
    };

    rounded.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Resolve the display interval of an event with the default duration.
///
/// See [`resolve_timing_with_default`].
///
/// # Example
///
/// ```
/// use subextract::{RawCue, resolve_timing};
///
/// let event = RawCue::new(0).with_plain("Hi");
/// assert_eq!(resolve_timing(&event), (0, 2000));
///
/// let event = RawCue::new(0).with_pts(1_500).with_time_base(1, 1000).with_end_display_time(800);
/// assert_eq!(resolve_timing(&event), (1_500, 2_300));
/// ```
pub fn resolve_timing(raw: &RawCue) -> (i64, i64) {
    resolve_timing_with_default(raw, DEFAULT_DURATION_MS)
}

/// Resolve the `(start_ms, end_ms)` display interval of an event.
///
/// Start, first match wins:
///
/// 1. the event `pts`;
/// 2. the packet `pts`;
/// 3. zero.
///
/// Timestamps are converted with the event time base when it is valid and
/// with [`FALLBACK_TIME_BASE`] otherwise. The start is clamped to zero.
///
/// End, first match wins:
///
/// 1. `start + end_display_time` when that is positive;
/// 2. `start + packet_duration` when the duration is positive and the time
///    base is valid;
/// 3. `start + default_duration_ms`.
///
/// An end that still lands before the start is repaired to
/// `start + default_duration_ms`. A negative default counts as zero.
pub fn resolve_timing_with_default(raw: &RawCue, default_duration_ms: i64) -> (i64, i64) {
    let default_duration_ms = default_duration_ms.max(0);
    let conversion_base = raw
        .time_base
        .filter(|time_base| time_base.is_valid())
        .unwrap_or(FALLBACK_TIME_BASE);

    let start_ms = raw
        .pts
        .or(raw.packet_pts)
        .map(|pts| rescale_to_millis(pts, conversion_base))
        .unwrap_or(0)
        .max(0);

    let packet_duration_ms = raw
        .packet_duration
        .filter(|duration| *duration > 0)
        .zip(raw.time_base.filter(|time_base| time_base.is_valid()))
        .map(|(duration, time_base)| rescale_to_millis(duration, time_base));

    let end_ms = match (raw.end_display_time.filter(|ms| *ms > 0), packet_duration_ms) {
        (Some(display_ms), _) => start_ms.saturating_add(display_ms),
        (None, Some(duration_ms)) => start_ms.saturating_add(duration_ms),
        (None, None) => start_ms.saturating_add(default_duration_ms),
    };

    if end_ms < start_ms {
        log::debug!(
            "Repairing end {}ms before start {}ms (stream {})",
            end_ms,
            start_ms,
            raw.stream_id
        );
        return (start_ms, start_ms.saturating_add(default_duration_ms));
    }

    (start_ms, end_ms)
}

#[cfg(test)]
mod tests {
    use super::{TimeBase, rescale_to_millis, resolve_timing, resolve_timing_with_default};
    use crate::cue::RawCue;

    #[test]
    fn rescale_rounds_to_nearest() {
        let ninety_khz = TimeBase::new(1, 90_000);
        assert_eq!(rescale_to_millis(90_000, ninety_khz), 1000);
        assert_eq!(rescale_to_millis(45, ninety_khz), 1);
        assert_eq!(rescale_to_millis(44, ninety_khz), 0);
        assert_eq!(rescale_to_millis(-45, ninety_khz), -1);
        assert_eq!(rescale_to_millis(3, TimeBase::new(1, 1000)), 3);
    }

    #[test]
    fn rescale_handles_invalid_and_negative_bases() {
        assert_eq!(rescale_to_millis(1000, TimeBase::new(0, 1000)), 0);
        assert_eq!(rescale_to_millis(1000, TimeBase::new(1, 0)), 0);
        assert_eq!(rescale_to_millis(1000, TimeBase::new(-1, -1000)), 1000);
    }

    #[test]
    fn no_timing_fields_default_to_two_seconds() {
        let event = RawCue::new(0).with_plain("x");
        assert_eq!(resolve_timing(&event), (0, 2000));
    }

    #[test]
    fn pts_uses_valid_time_base() {
        let event = RawCue::new(0).with_pts(90_000).with_time_base(1, 90_000);
        assert_eq!(resolve_timing(&event), (1000, 3000));
    }

    #[test]
    fn pts_without_time_base_is_microseconds() {
        let event = RawCue::new(0).with_pts(1_000_000);
        assert_eq!(resolve_timing(&event), (1000, 3000));

        let event = RawCue::new(0).with_pts(1_000_000).with_time_base(0, 1);
        assert_eq!(resolve_timing(&event), (1000, 3000));
    }

    #[test]
    fn packet_pts_is_second_choice() {
        let event = RawCue::new(0).with_packet_pts(5_000).with_time_base(1, 1000);
        assert_eq!(resolve_timing(&event), (5000, 7000));

        let event = RawCue::new(0)
            .with_pts(1_000)
            .with_packet_pts(5_000)
            .with_time_base(1, 1000);
        assert_eq!(resolve_timing(&event).0, 1000);
    }

    #[test]
    fn end_display_time_wins_over_packet_duration() {
        let event = RawCue::new(0)
            .with_pts(1000)
            .with_time_base(1, 1000)
            .with_packet_duration(500)
            .with_end_display_time(2000);
        assert_eq!(resolve_timing(&event), (1000, 3000));
    }

    #[test]
    fn packet_duration_needs_valid_time_base() {
        let event = RawCue::new(0)
            .with_pts(1000)
            .with_time_base(1, 1000)
            .with_packet_duration(1500);
        assert_eq!(resolve_timing(&event), (1000, 2500));

        let event = RawCue::new(0)
            .with_pts(1_000_000)
            .with_packet_duration(1500);
        assert_eq!(resolve_timing(&event), (1000, 3000));
    }

    #[test]
    fn non_positive_durations_are_ignored() {
        let event = RawCue::new(0)
            .with_pts(1000)
            .with_time_base(1, 1000)
            .with_packet_duration(0)
            .with_end_display_time(0);
        assert_eq!(resolve_timing(&event), (1000, 3000));
    }

    #[test]
    fn negative_start_is_clamped() {
        let event = RawCue::new(0).with_pts(-500).with_time_base(1, 1000);
        assert_eq!(resolve_timing(&event), (0, 2000));
    }

    #[test]
    fn end_before_start_is_repaired() {
        // A negative time base turns a positive duration into a negative one.
        let event = RawCue::new(0)
            .with_pts(-1000)
            .with_time_base(-1, 1000)
            .with_packet_duration(500);
        let (start, end) = resolve_timing(&event);
        assert_eq!(start, 1000);
        assert_eq!(end, start + 2000);
    }

    #[test]
    fn default_duration_is_configurable() {
        let event = RawCue::new(0).with_pts(1000).with_time_base(1, 1000);
        assert_eq!(resolve_timing_with_default(&event, 4000), (1000, 5000));
    }

    #[test]
    fn negative_default_duration_never_inverts() {
        let event = RawCue::new(0).with_pts(1000).with_time_base(1, 1000);
        assert_eq!(resolve_timing_with_default(&event, -5), (1000, 1000));

        let event = RawCue::new(0)
            .with_pts(-1000)
            .with_time_base(-1, 1000)
            .with_packet_duration(500);
        assert_eq!(resolve_timing_with_default(&event, -5), (1000, 1000));
    }

    #[test]
    fn huge_values_saturate() {
        let event = RawCue::new(0)
            .with_pts(i64::MAX)
            .with_time_base(1, 1)
            .with_end_display_time(5);
        let (start, end) = resolve_timing(&event);
        assert_eq!(start, i64::MAX);
        assert_eq!(end, i64::MAX);
    }
}
