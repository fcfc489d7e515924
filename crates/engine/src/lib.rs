//! Microphone level metering for the audio setup dialog.

mod analyser;
mod capture;

pub use analyser::{
    Analyser, BIN_COUNT, FFT_SIZE, MAX_DECIBELS, MIN_DECIBELS, SMOOTHING, level_from_bytes,
};
pub use capture::{CaptureBackend, CaptureSession, CpalBackend};

use std::collections::VecDeque;

/// Error token shown in place of the meter when capture can't start.
pub const PERMISSION_DENIED: &str = "Permission Denied";

const RING_CAPACITY: usize = 8 * FFT_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum MeterError {
    #[error("no input device available")]
    NoDevice,

    #[error("input device error: {0}")]
    Device(String),

    #[error("input stream error: {0}")]
    Stream(String),

    #[error("analysis failed: {0}")]
    Analysis(String),
}

/// What the setup dialog shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeterReading {
    /// 0..=100.
    pub level: f32,
    pub error: Option<String>,
}

struct ActiveCapture {
    _session: CaptureSession,
    sample_rate: u32,
    samples: rtrb::Consumer<f32>,
    window: VecDeque<f32>,
}

/// Live input level. At most one capture session is open at a time.
pub struct LevelMeter {
    backend: Box<dyn CaptureBackend>,
    capture: Option<ActiveCapture>,
    analyser: Analyser,
    reading: MeterReading,
}

impl LevelMeter {
    pub fn new(backend: Box<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            capture: None,
            analyser: Analyser::new(),
            reading: MeterReading::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.capture.is_some()
    }

    pub fn reading(&self) -> &MeterReading {
        &self.reading
    }

    /// Start or stop capture. Starting while already active, or stopping
    /// while idle, does nothing.
    pub fn set_active(&mut self, active: bool) {
        if active {
            self.start();
        } else {
            self.stop();
        }
    }

    fn start(&mut self) {
        if self.capture.is_some() {
            return;
        }
        let (producer, consumer) = rtrb::RingBuffer::new(RING_CAPACITY);
        match self.backend.open(producer) {
            Ok(session) => {
                self.reading = MeterReading::default();
                self.capture = Some(ActiveCapture {
                    sample_rate: session.sample_rate(),
                    _session: session,
                    samples: consumer,
                    window: VecDeque::from(vec![0.0; FFT_SIZE]),
                });
            }
            Err(e) => {
                tracing::warn!("microphone unavailable: {e}");
                self.reading = MeterReading {
                    level: 0.0,
                    error: Some(PERMISSION_DENIED.to_string()),
                };
            }
        }
    }

    fn stop(&mut self) {
        if self.capture.take().is_some() {
            tracing::debug!("microphone released");
        }
        self.analyser.reset();
        self.reading.level = 0.0;
    }

    /// Pull whatever audio arrived since the last call and recompute the
    /// level from the most recent frame. Call once per display refresh.
    pub fn tick(&mut self) {
        let Some(capture) = self.capture.as_mut() else {
            return;
        };

        while let Ok(sample) = capture.samples.pop() {
            capture.window.push_back(sample);
            if capture.window.len() > FFT_SIZE {
                capture.window.pop_front();
            }
        }

        let frame: Vec<f32> = capture.window.iter().copied().collect();
        match self.analyser.process(&frame, capture.sample_rate) {
            Ok(bytes) => self.reading.level = level_from_bytes(&bytes),
            Err(e) => tracing::warn!("skipping meter frame: {e}"),
        }
    }
}

impl Drop for LevelMeter {
    fn drop(&mut self) {
        self.stop();
    }
}
