// Control commands - UI → scheduler
// Values are validated before they are sent

use crate::sequencer::{PatternSpec, Tempo, TrackId, TrackSound};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Start,
    Pause,
    Stop,
    SetTempo(Tempo),
    UpdateTrack { id: TrackId, spec: PatternSpec },
    SetTrackSound { id: TrackId, sound: TrackSound },
    Quit,
}
