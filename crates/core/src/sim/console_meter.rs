use super::Ticker;
use serde::Serialize;
use std::time::Duration;

pub const METER_SEGMENTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentColor {
    Off,
    Green,
    Yellow,
    Red,
}

/// Per-channel level meter on the mixer console. Random while active.
#[derive(Debug, Clone)]
pub struct ConsoleMeter {
    active: bool,
    ticker: Ticker,
    rng: fastrand::Rng,
    level: f64,
}

impl ConsoleMeter {
    pub fn new(interval: Duration, rng: fastrand::Rng) -> Self {
        Self {
            active: false,
            ticker: Ticker::new(interval),
            rng,
            level: 0.0,
        }
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.ticker.reset();
            self.level = 0.0;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn advance(&mut self, elapsed: Duration) {
        if !self.active {
            return;
        }
        for _ in 0..self.ticker.advance(elapsed) {
            self.level = self.rng.f64() * 100.0;
        }
    }

    /// Level in [0, 100).
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Segment colours from the bottom up. Segment `i` lights when the level
    /// exceeds `i * 5`.
    pub fn segments(&self) -> [SegmentColor; METER_SEGMENTS] {
        std::array::from_fn(|i| {
            if self.level <= (i * 5) as f64 {
                SegmentColor::Off
            } else if i > 17 {
                SegmentColor::Red
            } else if i > 14 {
                SegmentColor::Yellow
            } else {
                SegmentColor::Green
            }
        })
    }
}

impl Default for ConsoleMeter {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), fastrand::Rng::new())
    }
}
