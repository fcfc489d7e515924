//! Byte-scaled frequency analysis of short mono frames.
//!
//! Mirrors the behaviour of a browser `AnalyserNode`: Hann window, FFT,
//! magnitudes normalised by the frame length, exponential smoothing across
//! frames, then a linear map of the decibel range onto 0..=255.

use crate::MeterError;
use spectrum_analyzer::scaling::divide_by_N;
use spectrum_analyzer::{FrequencyLimit, samples_fft_to_spectrum};

pub const FFT_SIZE: usize = 256;
pub const BIN_COUNT: usize = FFT_SIZE / 2;
pub const SMOOTHING: f32 = 0.8;
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

#[derive(Debug, Clone)]
pub struct Analyser {
    smoothed: Vec<f32>,
}

impl Analyser {
    pub fn new() -> Self {
        Self {
            smoothed: vec![0.0; BIN_COUNT],
        }
    }

    /// Forget smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Analyse one frame of exactly [`FFT_SIZE`] samples.
    pub fn process(&mut self, frame: &[f32], sample_rate: u32) -> Result<Vec<u8>, MeterError> {
        if frame.len() != FFT_SIZE {
            return Err(MeterError::Analysis(format!(
                "expected {FFT_SIZE} samples, got {}",
                frame.len()
            )));
        }

        let windowed = spectrum_analyzer::windows::hann_window(frame);
        let spectrum = samples_fft_to_spectrum(
            &windowed,
            sample_rate,
            FrequencyLimit::All,
            Some(&divide_by_N),
        )
        .map_err(|e| MeterError::Analysis(format!("{e:?}")))?;

        let magnitudes = spectrum.data().iter().map(|(_, value)| value.val());
        for (smoothed, magnitude) in self.smoothed.iter_mut().zip(magnitudes) {
            *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude.abs();
        }

        Ok(self.smoothed.iter().map(|m| to_byte(*m)).collect())
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

fn to_byte(magnitude: f32) -> u8 {
    let db = 20.0 * magnitude.log10();
    let scaled = (db - MIN_DECIBELS) * 255.0 / (MAX_DECIBELS - MIN_DECIBELS);
    if scaled.is_nan() {
        0
    } else {
        scaled.clamp(0.0, 255.0) as u8
    }
}

/// Meter level (0..=100) from byte frequency data: the mean, boosted by
/// half again and capped.
pub fn level_from_bytes(bytes: &[u8]) -> f32 {
    if bytes.is_empty() {
        return 0.0;
    }
    let mean = bytes.iter().map(|b| *b as f32).sum::<f32>() / bytes.len() as f32;
    (mean * 1.5).min(100.0)
}
