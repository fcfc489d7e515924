//! Reading basic facts about user-supplied audio files.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: u64,
}

impl AudioInfo {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames as f64 / self.sample_rate as f64)
    }
}

/// Identify the container and codec of `path` and measure its length. The
/// frame count comes from container metadata when present; otherwise the
/// file is decoded to count frames.
pub fn probe_file(path: &Path) -> anyhow::Result<AudioInfo> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| anyhow::anyhow!("no default track"))?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(2) as u16;
    let track_id = track.id;

    let frames = match track.codec_params.n_frames {
        Some(frames) => frames,
        None => {
            tracing::debug!("no frame count in {}, decoding", path.display());
            let codec_params = track.codec_params.clone();
            count_frames(format.as_mut(), &codec_params, track_id)?
        }
    };

    Ok(AudioInfo {
        sample_rate,
        channels,
        frames,
    })
}

fn count_frames(
    format: &mut dyn FormatReader,
    codec_params: &symphonia::core::codecs::CodecParameters,
    track_id: u32,
) -> anyhow::Result<u64> {
    let mut decoder =
        symphonia::default::get_codecs().make(codec_params, &DecoderOptions::default())?;

    let mut frames = 0u64;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet)?;
        frames += decoded.frames() as u64;
    }

    Ok(frames)
}

/// `m:ss`, rounding down to whole seconds.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Duration label for the library, e.g. `"3:07"`.
pub fn duration_label(path: &Path) -> anyhow::Result<String> {
    Ok(format_duration(probe_file(path)?.duration()))
}
