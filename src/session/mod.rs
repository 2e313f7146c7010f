// Session configuration
// The configuration boundary: everything here is validated before it reaches the sequencer

pub mod serialization;
pub mod types;

pub use serialization::{load_session, parse_session, save_session, serialize_session};
pub use types::{SessionConfig, TrackConfig, TrackSetup, ValidatedSession};

use crate::sequencer::SequencerError;

/// Session error types
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    #[error("Invalid track {index}: {source}")]
    InvalidTrack {
        index: usize,
        #[source]
        source: SequencerError,
    },

    #[error("Invalid session: {0}")]
    Invalid(#[from] SequencerError),

    #[error("Tick interval must be at least 1 ms")]
    InvalidTickInterval,
}

pub type SessionResult<T> = Result<T, SessionError>;
