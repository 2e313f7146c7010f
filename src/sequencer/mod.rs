// Sequencer module
// Euclidean pattern generation, tracks, transport clock and the look-ahead scheduler

pub mod host;
pub mod pattern;
pub mod scheduler;
pub mod timeline;
pub mod track;
pub mod transport;

pub use host::{SchedulerHost, spawn_scheduler};
pub use pattern::{Pattern, PatternSpec, generate};
pub use scheduler::Sequencer;
pub use timeline::{LOOKAHEAD_SECONDS, MASTER_STEPS, NOTE_DURATION_SECONDS, Tempo};
pub use track::{NoteEmitter, Track, TrackId, TrackSound};
pub use transport::{SharedTransportState, StartOutcome, TransportClock, TransportState};

use thiserror::Error;

/// Configuration-boundary errors
/// Nothing inside the tick loop produces these
#[derive(Debug, Error, PartialEq)]
pub enum SequencerError {
    #[error("Invalid tempo: {0} BPM (must be finite and > 0)")]
    InvalidTempo(f64),

    #[error("Invalid step count: {0} (must be between 1 and {})", MASTER_STEPS)]
    InvalidSteps(usize),

    #[error("Invalid rotation: {rotation} (must be < {steps})")]
    InvalidRotation { rotation: usize, steps: usize },

    #[error("Invalid frequency: {0} Hz (must be > 0)")]
    InvalidFrequency(f32),

    #[error("Track {0} already exists")]
    DuplicateTrack(TrackId),
}

pub type SequencerResult<T> = Result<T, SequencerError>;
