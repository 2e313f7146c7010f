use polyrhythm::audio::{AudioEngine, VoiceEmitter};
use polyrhythm::messaging::channels::{create_command_channel, create_note_channel};
use polyrhythm::messaging::command::Command;
use polyrhythm::messaging::console::{ConsoleInput, HELP, parse_console_line};
use polyrhythm::sequencer::{Sequencer, SequencerError, spawn_scheduler};
use polyrhythm::session::{SessionConfig, SessionError, load_session};
use ringbuf::traits::Producer;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// Ringbuffer capacity constants
// Commands come from a human typing, 64 is plenty.
// Notes: at most 32 tracks x a few look-ahead steps per pass, 512 leaves headroom.
const COMMAND_RINGBUFFER_CAPACITY: usize = 64;
const NOTE_RINGBUFFER_CAPACITY: usize = 512;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Audio error: {0}")]
    Audio(#[from] polyrhythm::audio::AudioError),

    #[error("Sequencer error: {0}")]
    Sequencer(#[from] SequencerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scheduler thread panicked")]
    SchedulerPanicked,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_session(&PathBuf::from(path))?,
        None => {
            log::info!("No session file given, using the built-in session");
            SessionConfig::default()
        }
    };
    let session = config.validate()?;

    let (mut command_tx, command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
    let (note_tx, note_rx) = create_note_channel(NOTE_RINGBUFFER_CAPACITY);
    let note_tx = Arc::new(Mutex::new(note_tx));

    // Without an audio clock there is nothing to schedule against
    let audio_engine = AudioEngine::new(note_rx)?;
    let timing = audio_engine.timing();

    let mut sequencer = Sequencer::new(timing.clone(), session.tempo);
    for track in &session.tracks {
        let emitter = VoiceEmitter::new(track.id, track.sound, timing.clone(), Arc::clone(&note_tx));
        sequencer.create_track_with_spec(track.id, track.spec, Box::new(emitter))?;
        sequencer.set_track_sound(track.id, track.sound);
        if let Some(created) = sequencer.track(track.id) {
            log::info!("Track {}: {} {}", track.id, track.spec, created.pattern());
        }
    }

    let host = spawn_scheduler(sequencer, command_rx, session.tick_interval)?;
    let shared_state = host.shared_state();

    if command_tx.try_push(Command::Start).is_err() {
        log::warn!("Command queue full, start ignored");
    }

    println!("{}", HELP);
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_console_line(&line) {
            Ok(ConsoleInput::Command(Command::Quit)) => break,
            Ok(ConsoleInput::Command(command)) => {
                if command_tx.try_push(command).is_err() {
                    log::warn!("Command queue full, '{}' ignored", line.trim());
                }
            }
            Ok(ConsoleInput::ShowStep) => {
                println!(
                    "{:?} - master step {}",
                    shared_state.state(),
                    shared_state.master_step()
                );
            }
            Ok(ConsoleInput::Help) => println!("{}", HELP),
            Ok(ConsoleInput::Empty) => {}
            Err(e) => println!("{}", e),
        }
    }

    // Also reached when stdin closes
    while command_tx.try_push(Command::Quit).is_err() && !host.is_finished() {
        std::thread::sleep(session.tick_interval);
    }
    host.join().map_err(|_| AppError::SchedulerPanicked)?;

    if audio_engine.dropped_notes() > 0 {
        log::warn!("{} notes dropped by the voice pool", audio_engine.dropped_notes());
    }
    log::info!("Bye");
    Ok(())
}
