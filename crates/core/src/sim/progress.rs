use super::Ticker;
use std::time::Duration;

const STEP: f64 = 0.2;

/// Fake playback position for the bottom bar, in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackProgress {
    ticker: Ticker,
    percent: f64,
}

impl PlaybackProgress {
    pub fn new(interval: Duration) -> Self {
        Self {
            ticker: Ticker::new(interval),
            percent: 0.0,
        }
    }

    /// Moves only while `playing`; wraps to 0 once 100 is reached.
    pub fn advance(&mut self, elapsed: Duration, playing: bool) {
        if !playing {
            return;
        }
        for _ in 0..self.ticker.advance(elapsed) {
            self.percent = if self.percent >= 100.0 {
                0.0
            } else {
                self.percent + STEP
            };
        }
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Elapsed-time label for a thirty second preview, e.g. `0:07`.
    pub fn elapsed_label(&self) -> String {
        format!("0:{:02.0}", self.percent * 0.3)
    }
}

impl Default for PlaybackProgress {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_only_moves_while_playing() {
        let mut progress = PlaybackProgress::default();
        progress.advance(Duration::from_secs(1), false);
        assert_eq!(progress.percent(), 0.0);

        progress.advance(Duration::from_secs(1), true);
        assert!((progress.percent() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_wraps() {
        let mut progress = PlaybackProgress::default();
        progress.percent = 100.0;
        progress.advance(Duration::from_millis(100), true);
        assert_eq!(progress.percent(), 0.0);
    }

    #[test]
    fn test_elapsed_label() {
        let mut progress = PlaybackProgress::default();
        progress.percent = 50.0;
        assert_eq!(progress.elapsed_label(), "0:15");
    }
}
