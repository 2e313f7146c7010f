// Types for session configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{SessionError, SessionResult};
use crate::sequencer::{PatternSpec, Tempo, TrackId, TrackSound};

fn default_bpm() -> f64 {
    120.0
}

fn default_tick_interval_ms() -> u64 {
    16
}

/// A whole session as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Tempo (BPM)
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    /// Scheduler callback period in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Tracks, created in order with ids 0, 1, 2...
    #[serde(default)]
    pub tracks: Vec<TrackConfig>,
}

/// One track as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackConfig {
    pub steps: usize,
    pub pulses: usize,
    pub rotation: usize,
    /// Oscillator frequency in Hz
    pub frequency: f32,
    pub gain: f32,
    pub pan: f32,
}

impl TrackConfig {
    pub fn new(steps: usize, pulses: usize, rotation: usize, frequency: f32) -> Self {
        Self {
            steps,
            pulses,
            rotation,
            frequency,
            ..Self::default()
        }
    }

    fn validate(&self) -> SessionResult<(PatternSpec, TrackSound)> {
        let spec = PatternSpec::new(self.steps, self.pulses, self.rotation)?;
        let sound = TrackSound::new(self.frequency, self.gain, self.pan)?;
        Ok((spec, sound))
    }
}

impl Default for TrackConfig {
    fn default() -> Self {
        let sound = TrackSound::default();
        Self {
            steps: 16,
            pulses: 4,
            rotation: 0,
            frequency: sound.frequency,
            gain: sound.gain,
            pan: sound.pan,
        }
    }
}

/// A validated track ready to be registered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSetup {
    pub id: TrackId,
    pub spec: PatternSpec,
    pub sound: TrackSound,
}

/// A session that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSession {
    pub tempo: Tempo,
    pub tick_interval: Duration,
    pub tracks: Vec<TrackSetup>,
}

impl SessionConfig {
    /// Validate at the configuration boundary
    ///
    /// Rejects invalid tempo, step counts, rotations and frequencies.
    /// Pulses above the step count are clamped.
    pub fn validate(&self) -> SessionResult<ValidatedSession> {
        let tempo = Tempo::new(self.bpm)?;
        if self.tick_interval_ms == 0 {
            return Err(SessionError::InvalidTickInterval);
        }

        let tracks = self
            .tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let (spec, sound) = track.validate().map_err(|e| match e {
                    SessionError::Invalid(source) => SessionError::InvalidTrack { index, source },
                    other => other,
                })?;
                Ok(TrackSetup {
                    id: index as TrackId,
                    spec,
                    sound,
                })
            })
            .collect::<SessionResult<Vec<_>>>()?;

        Ok(ValidatedSession {
            tempo,
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            tracks,
        })
    }
}

impl Default for SessionConfig {
    /// Four interlocking tracks: 16/4 kick, 8/3 low tom, 12/5 rim, 32/7 hat
    fn default() -> Self {
        Self {
            bpm: default_bpm(),
            tick_interval_ms: default_tick_interval_ms(),
            tracks: vec![
                TrackConfig {
                    gain: 0.9,
                    ..TrackConfig::new(16, 4, 0, 55.0)
                },
                TrackConfig {
                    pan: -0.4,
                    ..TrackConfig::new(8, 3, 0, 110.0)
                },
                TrackConfig {
                    gain: 0.5,
                    pan: 0.4,
                    ..TrackConfig::new(12, 5, 2, 440.0)
                },
                TrackConfig {
                    gain: 0.3,
                    pan: 0.2,
                    ..TrackConfig::new(32, 7, 1, 1760.0)
                },
            ],
        }
    }
}
