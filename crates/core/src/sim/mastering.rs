use serde::Serialize;
use std::time::Duration;

pub const MASTERING_BARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteringPhase {
    Idle,
    Processing,
    Completed,
}

/// The "magic master" job: idle until started, processing for a fixed
/// duration, then completed with the A/B switch on the mastered side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteringJob {
    phase: MasteringPhase,
    duration: Duration,
    elapsed: Duration,
    mastered: bool,
    previewing: bool,
}

impl MasteringJob {
    pub fn new(duration: Duration) -> Self {
        Self {
            phase: MasteringPhase::Idle,
            duration,
            elapsed: Duration::ZERO,
            mastered: false,
            previewing: false,
        }
    }

    pub fn phase(&self) -> MasteringPhase {
        self.phase
    }

    /// Whether the A/B switch is on the mastered side.
    pub fn is_mastered(&self) -> bool {
        self.mastered
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    /// Back to idle. Called whenever the mastering dialog opens.
    pub fn reset(&mut self) {
        *self = Self::new(self.duration);
    }

    pub fn start(&mut self) {
        if self.phase == MasteringPhase::Processing {
            return;
        }
        self.phase = MasteringPhase::Processing;
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, elapsed: Duration) {
        if self.phase != MasteringPhase::Processing {
            return;
        }
        self.elapsed += elapsed;
        if self.elapsed >= self.duration {
            tracing::debug!("mastering finished");
            self.phase = MasteringPhase::Completed;
            self.mastered = true;
        }
    }

    /// Flip the A/B switch. Only available once the job has completed.
    pub fn toggle_ab(&mut self) -> bool {
        if self.phase != MasteringPhase::Completed {
            return false;
        }
        self.mastered = !self.mastered;
        true
    }

    pub fn toggle_preview(&mut self) -> bool {
        if self.phase != MasteringPhase::Completed {
            return false;
        }
        self.previewing = !self.previewing;
        true
    }

    /// Bar heights for the before/after visualisation in the current A/B
    /// position.
    pub fn bars(&self) -> Vec<f64> {
        mastering_bars(self.mastered)
    }
}

impl Default for MasteringJob {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

/// Heights (0..=100) of the mastering waveform bars. The mastered curve is
/// louder and flatter than the original.
pub fn mastering_bars(mastered: bool) -> Vec<f64> {
    (0..MASTERING_BARS)
        .map(|i| {
            let base = (i as f64 * 0.5).sin() * 40.0 + 50.0;
            if mastered {
                (base * 1.5 + 20.0).min(100.0)
            } else {
                base
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_lifecycle() {
        let mut job = MasteringJob::default();
        assert_eq!(job.phase(), MasteringPhase::Idle);
        assert!(!job.toggle_ab());

        job.start();
        job.advance(Duration::from_millis(2999));
        assert_eq!(job.phase(), MasteringPhase::Processing);
        assert!(!job.toggle_ab());

        job.advance(Duration::from_millis(1));
        assert_eq!(job.phase(), MasteringPhase::Completed);
        assert!(job.is_mastered());

        assert!(job.toggle_ab());
        assert!(!job.is_mastered());
    }

    #[test]
    fn test_reset_keeps_configured_duration() {
        let mut job = MasteringJob::new(Duration::from_millis(10));
        job.start();
        job.advance(Duration::from_millis(10));
        job.toggle_preview();

        job.reset();
        assert_eq!(job, MasteringJob::new(Duration::from_millis(10)));
    }

    #[test]
    fn test_bars() {
        let original = mastering_bars(false);
        let mastered = mastering_bars(true);
        assert_eq!(original.len(), 40);
        assert_eq!(original[0], 50.0);
        assert_eq!(mastered[0], 95.0);
        assert!(mastered.iter().all(|h| *h <= 100.0));
        assert!(mastered.iter().zip(&original).all(|(m, o)| m >= o));
    }
}
