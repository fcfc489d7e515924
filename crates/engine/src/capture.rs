use crate::MeterError;
use cpal::{
    FromSample, SizedSample,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use std::sync::mpsc;
use std::thread;

/// Source of microphone samples.
pub trait CaptureBackend: Send {
    /// Start pushing mono samples into `sink`. Capture continues until the
    /// returned session is dropped.
    fn open(&mut self, sink: rtrb::Producer<f32>) -> Result<CaptureSession, MeterError>;
}

/// A running capture. Dropping it stops capture and releases the device
/// before returning.
pub struct CaptureSession {
    sample_rate: u32,
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl CaptureSession {
    pub fn new(sample_rate: u32, stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            sample_rate,
            stop: Some(Box::new(stop)),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

/// The system's default input device.
///
/// cpal streams can't move between threads on every platform, so each
/// session owns a small thread that builds the stream, parks until told to
/// stop, and drops the stream on its way out.
#[derive(Debug, Default)]
pub struct CpalBackend;

impl CaptureBackend for CpalBackend {
    fn open(&mut self, sink: rtrb::Producer<f32>) -> Result<CaptureSession, MeterError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let worker = thread::Builder::new()
            .name("onbeat-capture".to_string())
            .spawn(move || match start_input(sink) {
                Ok((stream, sample_rate)) => {
                    let _ = ready_tx.send(Ok(sample_rate));
                    let _ = stop_rx.recv();
                    drop(stream);
                    tracing::debug!("capture stream closed");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| MeterError::Stream(e.to_string()))?;

        let sample_rate = ready_rx
            .recv()
            .map_err(|_| MeterError::Stream("capture thread exited".to_string()))??;
        tracing::info!(sample_rate, "capture started");

        Ok(CaptureSession::new(sample_rate, move || {
            let _ = stop_tx.send(());
            let _ = worker.join();
        }))
    }
}

fn start_input(sink: rtrb::Producer<f32>) -> Result<(cpal::Stream, u32), MeterError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(MeterError::NoDevice)?;
    let config = device
        .default_input_config()
        .map_err(|e| MeterError::Device(e.to_string()))?;
    let sample_rate = config.sample_rate().0;

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), sink)?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), sink)?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), sink)?,
        sample_format => {
            return Err(MeterError::Device(format!(
                "unsupported sample format '{sample_format}'"
            )));
        }
    };
    stream
        .play()
        .map_err(|e| MeterError::Stream(e.to_string()))?;

    Ok((stream, sample_rate))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut sink: rtrb::Producer<f32>,
) -> Result<cpal::Stream, MeterError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels.max(1) as usize;

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                for frame in data.chunks(channels) {
                    let sum: f32 = frame.iter().map(|s| s.to_sample::<f32>()).sum();
                    // A full ring means the reader is behind; drop the sample.
                    let _ = sink.push(sum / frame.len() as f32);
                }
            },
            |err| tracing::error!("input stream error: {err}"),
            None,
        )
        .map_err(|e| MeterError::Stream(e.to_string()))
}
