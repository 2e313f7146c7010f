// Audio module
// Audio clock, note emission and the CPAL output stage

pub mod dsp_utils;
pub mod emitter;
pub mod engine;
pub mod format_conversion;
pub mod timing;
pub mod voice;

pub use emitter::{SharedNoteProducer, VoiceEmitter};
pub use engine::AudioEngine;
pub use timing::{AudioClock, AudioTiming, ManualClock};
pub use voice::{NoteEvent, VoicePool};

use thiserror::Error;

/// Audio backend errors
/// Only raised while opening the device, never from the callback
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Unsupported sample format: {0}. Supported formats: F32, I16, U16")]
    UnsupportedFormat(String),

    #[error("Audio configuration error: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("Error in stream creation: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Error in stream beginning: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

pub type AudioResult<T> = Result<T, AudioError>;
