/// Bar magnitudes (0.05..=1.0) for a session lane's waveform.
///
/// The idle shape is a fixed interference pattern with a faint static
/// texture. When `active`, the pattern drifts with `phase` and picks up a
/// little jitter from `rng`.
pub fn track_waveform(bars: usize, phase: u32, active: bool, rng: &mut fastrand::Rng) -> Vec<f64> {
    let t = phase as f64 * 0.08;
    (0..bars)
        .map(|i| {
            let x = i as f64 * 0.15;
            let magnitude = if active {
                ((x + t).sin() * (x * 1.2 - t).cos()).abs() + rng.f64() * 0.1
            } else {
                (x.sin() * (x * 0.7).cos()).abs() + (i as f64 * 132.1).sin() * 0.02
            };
            magnitude.clamp(0.05, 1.0)
        })
        .collect()
}
