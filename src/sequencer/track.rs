// Track - One rhythm voice on the shared master timeline
// Owns a pattern spec, its generated pattern and the emitter that plays its notes

use super::pattern::{Pattern, PatternSpec};
use super::timeline::{MASTER_STEPS, NOTE_DURATION_SECONDS};
use super::{SequencerError, SequencerResult};

/// Track identifier, also the handle returned to the configuration layer
pub type TrackId = u32;

/// Sink for fired notes, implemented by the audio backend
///
/// `emit_note` must not block: it only schedules output starting at
/// `timestamp` (audio-clock seconds) and lasting `duration` seconds.
pub trait NoteEmitter: Send {
    fn emit_note(&mut self, timestamp: f64, duration: f64);

    /// Called when the track's sound parameters change
    fn set_sound(&mut self, _sound: &TrackSound) {}
}

impl<F> NoteEmitter for F
where
    F: FnMut(f64, f64) + Send,
{
    fn emit_note(&mut self, timestamp: f64, duration: f64) {
        self(timestamp, duration)
    }
}

/// Per-track voice parameters handed to the synthesis backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSound {
    /// Oscillator frequency in Hz
    pub frequency: f32,
    /// Output gain (0.0 to 1.0)
    pub gain: f32,
    /// Stereo position (-1.0 left to 1.0 right)
    pub pan: f32,
}

impl TrackSound {
    /// Create sound parameters, clamping gain and pan
    pub fn new(frequency: f32, gain: f32, pan: f32) -> SequencerResult<Self> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(SequencerError::InvalidFrequency(frequency));
        }
        Ok(Self {
            frequency,
            gain: gain.clamp(0.0, 1.0),
            pan: pan.clamp(-1.0, 1.0),
        })
    }
}

impl Default for TrackSound {
    fn default() -> Self {
        Self {
            frequency: 220.0,
            gain: 0.8,
            pan: 0.0,
        }
    }
}

/// A sequencer track
pub struct Track {
    id: TrackId,
    spec: PatternSpec,
    pattern: Pattern,
    sound: TrackSound,
    last_fired_master_slot: Option<usize>,
    emitter: Box<dyn NoteEmitter>,
}

impl Track {
    /// Create a track with the given spec
    pub fn new(id: TrackId, spec: PatternSpec, emitter: Box<dyn NoteEmitter>) -> Self {
        Self {
            id,
            spec,
            pattern: spec.generate(),
            sound: TrackSound::default(),
            last_fired_master_slot: None,
            emitter,
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn spec(&self) -> PatternSpec {
        self.spec
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn sound(&self) -> TrackSound {
        self.sound
    }

    pub fn last_fired_master_slot(&self) -> Option<usize> {
        self.last_fired_master_slot
    }

    /// Replace the spec and regenerate the pattern
    /// Takes effect on the next scheduling evaluation
    pub fn update_spec(&mut self, spec: PatternSpec) {
        self.spec = spec;
        self.pattern = spec.generate();
    }

    /// Replace the sound and forward it to the emitter
    pub fn set_sound(&mut self, sound: TrackSound) {
        self.sound = sound;
        self.emitter.set_sound(&sound);
    }

    /// Map the shared master step onto this track's own step space
    ///
    /// `floor(master_step / 32 * steps) mod steps`: a track stretches its
    /// pattern over the whole master cycle whatever its length.
    pub fn local_step_index(&self, master_step: usize) -> usize {
        let steps = self.spec.steps();
        (master_step % MASTER_STEPS) * steps / MASTER_STEPS % steps
    }

    /// First master slot mapped to local step `local`
    fn onset_slot(&self, local: usize) -> usize {
        (local * MASTER_STEPS).div_ceil(self.spec.steps())
    }

    /// Whether `master_step` is the first master slot mapped to its local step
    pub fn is_step_onset(&self, master_step: usize) -> bool {
        let local = self.local_step_index(master_step);
        self.onset_slot(local) == master_step % MASTER_STEPS
    }

    /// Whether the track fires on this master step
    ///
    /// A note fires on the onset of a pulse step, at most once per master slot
    /// within a cycle.
    pub fn is_due_to_fire(&self, master_step: usize) -> bool {
        let local = self.local_step_index(master_step);
        self.pattern.is_pulse(local)
            && self.onset_slot(local) == master_step % MASTER_STEPS
            && self.last_fired_master_slot != Some(master_step)
    }

    /// Play a note at `timestamp` and remember the master slot it fired on
    pub fn emit_note(&mut self, timestamp: f64, master_step: usize) {
        self.emitter.emit_note(timestamp, NOTE_DURATION_SECONDS);
        self.last_fired_master_slot = Some(master_step);
    }

    /// Forget the last fired slot (transport start/stop, cycle wrap)
    pub fn reset(&mut self) {
        self.last_fired_master_slot = None;
    }
}

impl std::fmt::Debug for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Track")
            .field("id", &self.id)
            .field("spec", &self.spec)
            .field("pattern", &self.pattern.to_string())
            .field("sound", &self.sound)
            .field("last_fired_master_slot", &self.last_fired_master_slot)
            .finish()
    }
}
