// Audio engine - CPAL output stream rendering scheduled notes
//
// The engine owns the audio clock: the callback advances `AudioTiming` by the
// number of frames it rendered, and the scheduler reads that same counter.
// Notes arrive through a lock-free ring buffer and start at their exact
// sample position inside the buffer being rendered.
//
// Supported device formats: F32, I16, U16. Rendering is f32 internally and
// converted while writing the output frame.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::traits::Consumer;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{AudioError, AudioResult};
use crate::audio::dsp_utils::soft_clip;
use crate::audio::format_conversion::write_stereo_to_interleaved_frame;
use crate::audio::timing::AudioTiming;
use crate::audio::voice::VoicePool;
use crate::messaging::channels::NoteConsumer;

pub struct AudioEngine {
    _device: Device,
    _stream: Stream,
    timing: AudioTiming,
    dropped_notes: Arc<AtomicU64>,
}

impl AudioEngine {
    /// Open the default output device and start rendering
    ///
    /// Failing here is fatal for the session: there is no clock without it.
    pub fn new(note_rx: NoteConsumer) -> AudioResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        log::info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        log::debug!("Audio config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let timing = AudioTiming::new(sample_rate);
        let dropped_notes = Arc::new(AtomicU64::new(0));
        let pool = VoicePool::new(sample_rate);

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                note_rx,
                pool,
                timing.clone(),
                Arc::clone(&dropped_notes),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                note_rx,
                pool,
                timing.clone(),
                Arc::clone(&dropped_notes),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                note_rx,
                pool,
                timing.clone(),
                Arc::clone(&dropped_notes),
            ),
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        }?;

        stream.play()?;

        log::info!(
            "Audio engine started: {} Hz, {} channels",
            sample_rate,
            channels
        );

        Ok(Self {
            _device: device,
            _stream: stream,
            timing,
            dropped_notes,
        })
    }

    /// Audio clock advanced by this engine's callback
    pub fn timing(&self) -> AudioTiming {
        self.timing.clone()
    }

    /// Notes that arrived while the voice pool was full
    pub fn dropped_notes(&self) -> u64 {
        self.dropped_notes.load(Ordering::Relaxed)
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut note_rx: NoteConsumer,
        mut pool: VoicePool,
        timing: AudioTiming,
        dropped_notes: Arc<AtomicU64>,
    ) -> AudioResult<Stream>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // No allocations, no I/O, no blocking locks in here
                while let Some(event) = note_rx.try_pop() {
                    if !pool.trigger(&event) {
                        dropped_notes.fetch_add(1, Ordering::Relaxed);
                    }
                }

                let buffer_start = timing.current_sample();
                let mut frames = 0usize;
                for frame in data.chunks_mut(channels) {
                    let (left, right) = pool.render_frame(buffer_start + frames as u64);
                    write_stereo_to_interleaved_frame((soft_clip(left), soft_clip(right)), frame);
                    frames += 1;
                }

                timing.advance(frames);
            },
            move |err| {
                // Runs outside the audio callback, I/O is fine here
                log::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        Ok(stream)
    }
}
