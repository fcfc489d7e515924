//! Simulated DSP feedback.
//!
//! None of these touch audio. Each is a small state machine driven by
//! explicit `advance(elapsed)` calls so the host decides the clock; tests
//! drive them with synthetic durations.

mod console_meter;
mod mastering;
mod progress;
mod tuner;
mod waveform;

pub use console_meter::{ConsoleMeter, METER_SEGMENTS, SegmentColor};
pub use mastering::{MASTERING_BARS, MasteringJob, MasteringPhase, mastering_bars};
pub use progress::PlaybackProgress;
pub use tuner::{NOTES, Tuner};
pub use waveform::track_waveform;

use std::time::Duration;

/// Fixed-interval clock. Accumulates elapsed time and reports how many whole
/// intervals have passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    interval: Duration,
    pending: Duration,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }
        self.pending += elapsed;
        let mut ticks = 0;
        while self.pending >= self.interval {
            self.pending -= self.interval;
            ticks += 1;
        }
        ticks
    }

    pub fn reset(&mut self) {
        self.pending = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_counts_whole_intervals() {
        let mut ticker = Ticker::new(Duration::from_millis(100));
        assert_eq!(ticker.advance(Duration::from_millis(50)), 0);
        assert_eq!(ticker.advance(Duration::from_millis(60)), 1);
        assert_eq!(ticker.advance(Duration::from_millis(290)), 3);
    }

    #[test]
    fn test_zero_interval_never_ticks() {
        let mut ticker = Ticker::new(Duration::ZERO);
        assert_eq!(ticker.advance(Duration::from_secs(1)), 0);
    }
}
