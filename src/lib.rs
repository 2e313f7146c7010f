// Polyrhythm - Library exports for the binary, tests and benchmarks

pub mod audio;
pub mod messaging;
pub mod sequencer;
pub mod session;

// Re-export commonly used types for convenience
pub use audio::{AudioClock, AudioEngine, AudioTiming, ManualClock, VoiceEmitter};
pub use messaging::channels::{create_command_channel, create_note_channel};
pub use messaging::command::Command;
pub use sequencer::{
    NoteEmitter, Pattern, PatternSpec, Sequencer, SequencerError, Tempo, TrackId, TrackSound,
    TransportState, generate,
};
pub use session::{SessionConfig, SessionError, TrackConfig};
