// Scheduler host - Drives the sequencer from a periodic callback
// Drains pending commands, then runs one tick, once per interval

use super::scheduler::Sequencer;
use super::transport::SharedTransportState;
use crate::audio::timing::AudioClock;
use crate::messaging::channels::CommandConsumer;
use ringbuf::traits::Consumer;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default callback cadence (about one display refresh)
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// One host callback: apply every queued command, then tick
///
/// Commands are applied before the tick so a tick never sees half of an
/// update. Returns false once `Command::Quit` was received; the tick is
/// skipped in that case.
pub fn run_pass<C: AudioClock>(
    sequencer: &mut Sequencer<C>,
    commands: &mut CommandConsumer,
) -> bool {
    while let Some(command) = commands.try_pop() {
        if !sequencer.apply(command) {
            return false;
        }
    }
    sequencer.tick();
    true
}

/// Handle to a running scheduler thread
pub struct SchedulerHost<C: AudioClock> {
    handle: JoinHandle<Sequencer<C>>,
    shared_state: Arc<SharedTransportState>,
}

impl<C: AudioClock + 'static> SchedulerHost<C> {
    /// Transport snapshot published by the scheduler
    pub fn shared_state(&self) -> Arc<SharedTransportState> {
        Arc::clone(&self.shared_state)
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to exit (after `Command::Quit`) and get the sequencer back
    pub fn join(self) -> thread::Result<Sequencer<C>> {
        self.handle.join()
    }
}

/// Move the sequencer onto its own thread
///
/// The thread runs `run_pass` every `interval` until it receives `Command::Quit`.
pub fn spawn_scheduler<C: AudioClock + 'static>(
    mut sequencer: Sequencer<C>,
    mut commands: CommandConsumer,
    interval: Duration,
) -> std::io::Result<SchedulerHost<C>> {
    let shared_state = sequencer.shared_state();

    let handle = thread::Builder::new()
        .name("scheduler".to_string())
        .spawn(move || {
            log::debug!("Scheduler thread running every {:?}", interval);
            while run_pass(&mut sequencer, &mut commands) {
                thread::sleep(interval);
            }
            sequencer.stop();
            log::debug!("Scheduler thread exiting");
            sequencer
        })?;

    Ok(SchedulerHost {
        handle,
        shared_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::timing::ManualClock;
    use crate::messaging::channels::create_command_channel;
    use crate::messaging::command::Command;
    use crate::sequencer::{PatternSpec, Tempo, TransportState};
    use ringbuf::traits::Producer;
    use std::sync::Mutex;

    #[test]
    fn test_run_pass_applies_commands_before_tick() {
        let clock = ManualClock::new(0.0);
        let mut seq = Sequencer::new(clock.clone(), Tempo::default());
        let fired = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&fired);
        seq.create_track_with_spec(
            1,
            PatternSpec::new(4, 0, 0).unwrap(),
            Box::new(move |_: f64, _: f64| *sink.lock().unwrap() += 1),
        )
        .unwrap();

        let (mut tx, mut rx) = create_command_channel(8);
        tx.try_push(Command::Start).unwrap();
        tx.try_push(Command::UpdateTrack {
            id: 1,
            spec: PatternSpec::new(4, 4, 0).unwrap(),
        })
        .unwrap();

        assert!(run_pass(&mut seq, &mut rx));
        // Updated pattern was already in place for master step 0
        assert_eq!(*fired.lock().unwrap(), 1);
        assert_eq!(seq.state(), TransportState::Playing);
    }

    #[test]
    fn test_run_pass_stops_on_quit() {
        let mut seq = Sequencer::new(ManualClock::new(0.0), Tempo::default());
        let (mut tx, mut rx) = create_command_channel(8);
        tx.try_push(Command::Start).unwrap();
        tx.try_push(Command::Quit).unwrap();

        assert!(!run_pass(&mut seq, &mut rx));
        assert_eq!(seq.current_master_step(), 0);
    }

    #[test]
    fn test_spawned_scheduler_quits() {
        let seq = Sequencer::new(ManualClock::new(0.0), Tempo::default());
        let (mut tx, rx) = create_command_channel(8);

        let host = spawn_scheduler(seq, rx, Duration::from_millis(1)).unwrap();
        tx.try_push(Command::Start).unwrap();
        tx.try_push(Command::Quit).unwrap();

        let seq = host.join().unwrap();
        assert_eq!(seq.state(), TransportState::Stopped);
    }
}
