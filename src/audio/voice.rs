// Percussive voices - Renders fired notes at their exact sample position
// Each note is a decaying sine burst, pre-allocated pool, no allocation in the callback

use crate::audio::dsp_utils::{equal_power_pan, flush_denormals_to_zero};
use crate::sequencer::{TrackId, TrackSound};
use std::f32::consts::TAU;

/// Maximum simultaneous (pending + sounding) voices
pub const MAX_VOICES: usize = 64;

/// Envelope decay rate over the note duration
const DECAY_RATE: f32 = 8.0;

/// A note scheduled by the sequencer, in absolute samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub track: TrackId,
    pub start_sample: u64,
    pub duration_samples: u32,
    pub sound: TrackSound,
}

/// One sounding (or waiting) note
#[derive(Debug, Clone)]
struct DrumVoice {
    start_sample: u64,
    duration_samples: u32,
    elapsed: u32,
    phase_increment: f32,
    left_gain: f32,
    right_gain: f32,
}

impl DrumVoice {
    fn new(event: &NoteEvent, sample_rate: f32) -> Self {
        let (left, right) = equal_power_pan(event.sound.pan);
        Self {
            start_sample: event.start_sample,
            duration_samples: event.duration_samples.max(1),
            elapsed: 0,
            phase_increment: TAU * event.sound.frequency / sample_rate,
            left_gain: left * event.sound.gain,
            right_gain: right * event.sound.gain,
        }
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration_samples
    }

    /// Render one frame at absolute `sample_position`
    /// Silent until the start sample is reached
    fn next_frame(&mut self, sample_position: u64) -> (f32, f32) {
        if sample_position < self.start_sample || self.is_finished() {
            return (0.0, 0.0);
        }

        // Exponential decay envelope
        let t = self.elapsed as f32 / self.duration_samples as f32;
        let envelope = (-t * DECAY_RATE).exp();

        let phase = (self.elapsed as f32 * self.phase_increment) % TAU;
        let sample = flush_denormals_to_zero(phase.sin() * envelope);
        self.elapsed += 1;

        (sample * self.left_gain, sample * self.right_gain)
    }
}

/// Fixed-capacity voice pool
pub struct VoicePool {
    voices: Vec<DrumVoice>,
    sample_rate: f32,
}

impl VoicePool {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: Vec::with_capacity(MAX_VOICES),
            sample_rate,
        }
    }

    /// Queue a note; returns false if the pool is full and the note is dropped
    pub fn trigger(&mut self, event: &NoteEvent) -> bool {
        if self.voices.len() >= MAX_VOICES {
            return false;
        }
        self.voices.push(DrumVoice::new(event, self.sample_rate));
        true
    }

    /// Number of pending or sounding voices
    pub fn active_count(&self) -> usize {
        self.voices.len()
    }

    /// Mix every voice for one frame and release finished ones
    pub fn render_frame(&mut self, sample_position: u64) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;

        for voice in self.voices.iter_mut() {
            let (l, r) = voice.next_frame(sample_position);
            left += l;
            right += r;
        }

        self.voices.retain(|voice| !voice.is_finished());
        (left, right)
    }
}
