// Voice emitter - Bridges fired notes from the scheduler to the audio callback

use crate::audio::timing::AudioTiming;
use crate::audio::voice::NoteEvent;
use crate::messaging::channels::NoteProducer;
use crate::sequencer::{NoteEmitter, TrackId, TrackSound};
use ringbuf::traits::Producer;
use std::sync::{Arc, Mutex};

/// Shared producer end of the note channel
/// Every track's emitter pushes into the same ring buffer
pub type SharedNoteProducer = Arc<Mutex<NoteProducer>>;

/// `NoteEmitter` for the cpal backend
///
/// Converts audio-clock seconds to an absolute sample position and
/// enqueues the note without blocking.
pub struct VoiceEmitter {
    track: TrackId,
    sound: TrackSound,
    timing: AudioTiming,
    producer: SharedNoteProducer,
}

impl VoiceEmitter {
    pub fn new(
        track: TrackId,
        sound: TrackSound,
        timing: AudioTiming,
        producer: SharedNoteProducer,
    ) -> Self {
        Self {
            track,
            sound,
            timing,
            producer,
        }
    }

    pub fn sound(&self) -> TrackSound {
        self.sound
    }
}

impl NoteEmitter for VoiceEmitter {
    fn emit_note(&mut self, timestamp: f64, duration: f64) {
        let event = NoteEvent {
            track: self.track,
            start_sample: self.timing.seconds_to_samples(timestamp),
            duration_samples: self.timing.seconds_to_samples(duration).min(u32::MAX as u64)
                as u32,
            sound: self.sound,
        };

        match self.producer.try_lock() {
            Ok(mut producer) => {
                if producer.try_push(event).is_err() {
                    log::warn!("Note queue full, dropping note for track {}", self.track);
                }
            }
            Err(_) => log::warn!("Note queue busy, dropping note for track {}", self.track),
        }
    }

    fn set_sound(&mut self, sound: &TrackSound) {
        self.sound = *sound;
    }
}
