// Sortie audio - CPAL backend behind a fire-and-forget sink
//
// The sink queues finalized buffers and returns immediately; the real-time
// callback drains the queue and writes silence on underrun. Pacing between
// tones is the caller's job (the score player waits out each entry), so a
// submitted tone has finished draining before the next one arrives.
//
// No resampling is performed: a device whose native rate differs from the
// render rate plays tones slightly off-speed.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapProd, HeapRb};

/// Fixed low output level applied to everything the sink plays.
pub const DEFAULT_OUTPUT_VOLUME: f32 = 0.05;

/// Queue capacity in samples (stereo interleaved), about 4 seconds at 44.1kHz.
const QUEUE_CAPACITY: usize = 44100 * 2 * 4;

/// "Play this buffer now" collaborator.
///
/// `submit` must return without waiting for audible completion; whether and
/// when the audio becomes audible is entirely the sink's concern.
pub trait AudioSink {
    /// Queue an interleaved stereo 16-bit buffer for immediate playback.
    fn submit(&mut self, frames: &[i16]);
}

/// Sink that discards everything. Used by tests and offline rendering.
#[derive(Debug, Default)]
pub struct NullSink {
    submitted: usize,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffers submitted so far.
    pub fn submissions(&self) -> usize {
        self.submitted
    }
}

impl AudioSink for NullSink {
    fn submit(&mut self, _frames: &[i16]) {
        self.submitted += 1;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("no audio output device found")]
    NoOutputDevice,
    #[error("output configuration error: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(SampleFormat),
}

/// Real sink on the default CPAL output device.
///
/// The stream runs for the lifetime of the sink; submissions are pushed into
/// a lock-free queue shared with the real-time callback. Samples that do not
/// fit in the queue are dropped rather than blocking the caller.
pub struct CpalSink {
    _stream: Stream,
    queue: HeapProd<f32>,
    volume: f32,
}

impl CpalSink {
    pub fn new() -> Result<Self, SinkError> {
        Self::with_volume(DEFAULT_OUTPUT_VOLUME)
    }

    pub fn with_volume(volume: f32) -> Result<Self, SinkError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(SinkError::NoOutputDevice)?;

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let (producer, consumer) = HeapRb::<f32>::new(QUEUE_CAPACITY).split();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, consumer),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, consumer),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, consumer),
            other => return Err(SinkError::UnsupportedFormat(other)),
        }?;
        stream.play()?;

        Ok(Self {
            _stream: stream,
            queue: producer,
            volume: volume.clamp(0.0, 1.0),
        })
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl AudioSink for CpalSink {
    fn submit(&mut self, frames: &[i16]) {
        for &frame in frames {
            let sample = frame as f32 / 32768.0 * self.volume;
            if self.queue.try_push(sample).is_err() {
                // Queue full: drop the tail instead of blocking the caller.
                break;
            }
        }
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    channels: usize,
    mut queue: ringbuf::HeapCons<f32>,
) -> Result<Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            // Real-time zone: no allocation, no blocking.
            for frame in data.chunks_mut(channels) {
                let left = queue.try_pop().unwrap_or(0.0);
                let right = queue.try_pop().unwrap_or(left);
                write_stereo_frame((left, right), frame);
            }
        },
        move |err| eprintln!("audio stream error: {err}"),
        None,
    )
}

/// Write one stereo sample pair into an interleaved device frame, zeroing
/// any extra channels; mono devices get the two channels mixed.
#[inline]
fn write_stereo_frame<T>((left, right): (f32, f32), frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    if frame.len() >= 2 {
        frame[0] = Sample::from_sample::<f32>(left);
        frame[1] = Sample::from_sample::<f32>(right);
        for extra in frame.iter_mut().skip(2) {
            *extra = Sample::from_sample::<f32>(0.0);
        }
    } else if let Some(only) = frame.first_mut() {
        *only = Sample::from_sample::<f32>((left + right) * 0.5);
    }
}
