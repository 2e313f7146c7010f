// Console control - Parses text commands typed by the user
// Validation happens here, before anything is sent to the scheduler

use crate::messaging::command::Command;
use crate::sequencer::{PatternSpec, SequencerError, Tempo, TrackId, TrackSound};
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  play | start                              start or resume
  pause                                     pause, keeping phase
  stop                                      stop and rewind
  tempo <bpm>                               change tempo
  track <id> <steps> <pulses> <rotation>    change a track's rhythm
  sound <id> <freq> <gain> <pan>            change a track's sound
  step                                      show the current master step
  help                                      show this help
  quit                                      exit";

/// One parsed console line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleInput {
    Command(Command),
    ShowStep,
    Help,
    Empty,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConsoleError {
    #[error("Unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid number for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{0}")]
    Invalid(#[from] SequencerError),
}

fn arg<'a, T: FromStr>(
    words: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<T, ConsoleError> {
    let value = words.next().ok_or(ConsoleError::MissingArgument(name))?;
    value.parse().map_err(|_| ConsoleError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

/// Parse one line of console input
pub fn parse_console_line(line: &str) -> Result<ConsoleInput, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(ConsoleInput::Empty);
    };

    let input = match keyword.to_ascii_lowercase().as_str() {
        "play" | "start" => ConsoleInput::Command(Command::Start),
        "pause" => ConsoleInput::Command(Command::Pause),
        "stop" => ConsoleInput::Command(Command::Stop),
        "quit" | "exit" => ConsoleInput::Command(Command::Quit),
        "tempo" => {
            let bpm: f64 = arg(&mut words, "bpm")?;
            ConsoleInput::Command(Command::SetTempo(Tempo::new(bpm)?))
        }
        "track" => {
            let id: TrackId = arg(&mut words, "id")?;
            let steps = arg(&mut words, "steps")?;
            let pulses = arg(&mut words, "pulses")?;
            let rotation = arg(&mut words, "rotation")?;
            let spec = PatternSpec::new(steps, pulses, rotation)?;
            ConsoleInput::Command(Command::UpdateTrack { id, spec })
        }
        "sound" => {
            let id: TrackId = arg(&mut words, "id")?;
            let frequency = arg(&mut words, "freq")?;
            let gain = arg(&mut words, "gain")?;
            let pan = arg(&mut words, "pan")?;
            let sound = TrackSound::new(frequency, gain, pan)?;
            ConsoleInput::Command(Command::SetTrackSound { id, sound })
        }
        "step" => ConsoleInput::ShowStep,
        "help" | "?" => ConsoleInput::Help,
        other => return Err(ConsoleError::Unknown(other.to_string())),
    };

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_commands() {
        assert_eq!(
            parse_console_line("play"),
            Ok(ConsoleInput::Command(Command::Start))
        );
        assert_eq!(
            parse_console_line("  PAUSE "),
            Ok(ConsoleInput::Command(Command::Pause))
        );
        assert_eq!(
            parse_console_line("quit"),
            Ok(ConsoleInput::Command(Command::Quit))
        );
        assert_eq!(parse_console_line(""), Ok(ConsoleInput::Empty));
        assert_eq!(parse_console_line("step"), Ok(ConsoleInput::ShowStep));
    }

    #[test]
    fn test_track_command() {
        let expected = PatternSpec::new(8, 3, 1).unwrap();
        assert_eq!(
            parse_console_line("track 2 8 3 1"),
            Ok(ConsoleInput::Command(Command::UpdateTrack {
                id: 2,
                spec: expected
            }))
        );
    }

    #[test]
    fn test_track_command_validation() {
        assert_eq!(
            parse_console_line("track 0 8 3 9"),
            Err(ConsoleError::Invalid(SequencerError::InvalidRotation {
                rotation: 9,
                steps: 8
            }))
        );
        assert_eq!(
            parse_console_line("track 0 8 3"),
            Err(ConsoleError::MissingArgument("rotation"))
        );
        assert!(matches!(
            parse_console_line("track 0 eight 3 0"),
            Err(ConsoleError::InvalidNumber { name: "steps", .. })
        ));
    }

    #[test]
    fn test_tempo_command() {
        match parse_console_line("tempo 140") {
            Ok(ConsoleInput::Command(Command::SetTempo(tempo))) => assert_eq!(tempo.bpm(), 140.0),
            other => panic!("Expected SetTempo, got {:?}", other),
        }
        assert_eq!(
            parse_console_line("tempo -5"),
            Err(ConsoleError::Invalid(SequencerError::InvalidTempo(-5.0)))
        );
    }

    #[test]
    fn test_sound_command() {
        let sound = TrackSound::new(220.0, 0.5, -0.25).unwrap();
        assert_eq!(
            parse_console_line("sound 1 220 0.5 -0.25"),
            Ok(ConsoleInput::Command(Command::SetTrackSound { id: 1, sound }))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_console_line("rewind"),
            Err(ConsoleError::Unknown("rewind".to_string()))
        );
    }
}
