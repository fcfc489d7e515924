use super::Ticker;
use std::time::Duration;

pub const NOTES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// Pitch readout for the vocal lane. Publishes random deviations while
/// active; idles at 0 cents and no note.
#[derive(Debug, Clone)]
pub struct Tuner {
    active: bool,
    ticker: Ticker,
    rng: fastrand::Rng,
    cents: f64,
    note: &'static str,
}

impl Tuner {
    pub fn new(interval: Duration, rng: fastrand::Rng) -> Self {
        Self {
            active: false,
            ticker: Ticker::new(interval),
            rng,
            cents: 0.0,
            note: "-",
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.ticker.reset();
            self.cents = 0.0;
            self.note = "-";
        }
    }

    pub fn advance(&mut self, elapsed: Duration) {
        if !self.active {
            return;
        }
        for _ in 0..self.ticker.advance(elapsed) {
            self.cents = self.rng.f64() * 60.0 - 30.0;
            self.note = NOTES[self.rng.usize(..NOTES.len())];
        }
    }

    /// Deviation in cents, in [-30, 30).
    pub fn cents(&self) -> f64 {
        self.cents
    }

    pub fn note(&self) -> &'static str {
        self.note
    }
}

impl Default for Tuner {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), fastrand::Rng::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_tuner_reads_zero() {
        let mut tuner = Tuner::new(Duration::from_millis(300), fastrand::Rng::with_seed(7));
        tuner.advance(Duration::from_secs(1));
        assert_eq!(tuner.cents(), 0.0);
        assert_eq!(tuner.note(), "-");
    }

    #[test]
    fn test_active_tuner_publishes_in_range() {
        let mut tuner = Tuner::new(Duration::from_millis(300), fastrand::Rng::with_seed(7));
        tuner.set_active(true);

        for _ in 0..50 {
            tuner.advance(Duration::from_millis(300));
            assert!((-30.0..30.0).contains(&tuner.cents()));
            assert!(NOTES.contains(&tuner.note()));
        }

        tuner.set_active(false);
        assert_eq!(tuner.cents(), 0.0);
        assert_eq!(tuner.note(), "-");
    }

    #[test]
    fn test_no_update_before_first_interval() {
        let mut tuner = Tuner::new(Duration::from_millis(300), fastrand::Rng::with_seed(1));
        tuner.set_active(true);
        tuner.advance(Duration::from_millis(299));
        assert_eq!(tuner.note(), "-");
    }
}
