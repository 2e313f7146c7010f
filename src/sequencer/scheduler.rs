// Scheduler - Look-ahead tick loop driving every track from one clock
// Also the control surface used by the configuration layer

use super::pattern::PatternSpec;
use super::timeline::Tempo;
use super::track::{NoteEmitter, Track, TrackId, TrackSound};
use super::transport::{SharedTransportState, StartOutcome, TransportClock, TransportState};
use super::{SequencerError, SequencerResult};
use crate::audio::timing::AudioClock;
use crate::messaging::command::Command;
use std::sync::Arc;

/// Polyrhythmic sequencer
///
/// Owns the transport clock and all tracks. Everything here runs on one
/// execution context: commands are applied between ticks, never during one.
pub struct Sequencer<C: AudioClock> {
    clock: C,
    transport: TransportClock,
    tracks: Vec<Track>,
    shared_state: Arc<SharedTransportState>,
}

impl<C: AudioClock> Sequencer<C> {
    /// Create a stopped sequencer reading time from `clock`
    pub fn new(clock: C, tempo: Tempo) -> Self {
        Self {
            clock,
            transport: TransportClock::new(tempo),
            tracks: Vec::new(),
            shared_state: SharedTransportState::new(),
        }
    }

    /// Snapshot handle for display code on other threads
    pub fn shared_state(&self) -> Arc<SharedTransportState> {
        Arc::clone(&self.shared_state)
    }

    pub fn transport(&self) -> &TransportClock {
        &self.transport
    }

    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn tempo(&self) -> Tempo {
        self.transport.tempo()
    }

    /// Current master step (display only)
    pub fn current_master_step(&self) -> usize {
        self.transport.master_step()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id() == id)
    }

    fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id() == id)
    }

    /// Register a track with the default spec
    /// Returns the id as the track handle
    pub fn create_track(
        &mut self,
        id: TrackId,
        emitter: Box<dyn NoteEmitter>,
    ) -> SequencerResult<TrackId> {
        self.create_track_with_spec(id, PatternSpec::default(), emitter)
    }

    /// Register a track with an explicit spec
    pub fn create_track_with_spec(
        &mut self,
        id: TrackId,
        spec: PatternSpec,
        emitter: Box<dyn NoteEmitter>,
    ) -> SequencerResult<TrackId> {
        if self.track(id).is_some() {
            return Err(SequencerError::DuplicateTrack(id));
        }

        let track = Track::new(id, spec, emitter);
        log::debug!("Track {} created: {} {}", id, spec, track.pattern());
        self.tracks.push(track);
        Ok(id)
    }

    /// Validate and apply new pattern parameters
    ///
    /// Invalid parameters are rejected; an unknown id is ignored.
    pub fn update_track(
        &mut self,
        id: TrackId,
        steps: usize,
        pulses: usize,
        rotation: usize,
    ) -> SequencerResult<()> {
        let spec = PatternSpec::new(steps, pulses, rotation)?;
        self.set_track_spec(id, spec);
        Ok(())
    }

    /// Apply an already validated spec
    /// Returns false if the track does not exist
    pub fn set_track_spec(&mut self, id: TrackId, spec: PatternSpec) -> bool {
        match self.track_mut(id) {
            Some(track) => {
                track.update_spec(spec);
                log::debug!("Track {} updated: {} {}", id, spec, track.pattern());
                true
            }
            None => {
                log::warn!("Ignoring update for unknown track {}", id);
                false
            }
        }
    }

    /// Change a track's voice parameters
    /// Returns false if the track does not exist
    pub fn set_track_sound(&mut self, id: TrackId, sound: TrackSound) -> bool {
        match self.track_mut(id) {
            Some(track) => {
                track.set_sound(sound);
                true
            }
            None => {
                log::warn!("Ignoring sound change for unknown track {}", id);
                false
            }
        }
    }

    /// Start from Stopped or resume from Paused
    pub fn start(&mut self) {
        let now = self.clock.now();
        match self.transport.start(now) {
            StartOutcome::Started => {
                for track in &mut self.tracks {
                    track.reset();
                }
                log::info!("Transport started at {:.3}s ({})", now, self.tempo());
            }
            StartOutcome::Resumed => {
                log::info!(
                    "Transport resumed at {:.3}s, master step {}",
                    now,
                    self.transport.master_step()
                );
            }
            StartOutcome::AlreadyPlaying => {}
        }
        self.shared_state.publish(&self.transport);
    }

    pub fn pause(&mut self) {
        let now = self.clock.now();
        if self.transport.pause(now) {
            log::info!(
                "Transport paused at {:.3}s, master step {}",
                now,
                self.transport.master_step()
            );
        }
        self.shared_state.publish(&self.transport);
    }

    pub fn stop(&mut self) {
        self.transport.stop();
        for track in &mut self.tracks {
            track.reset();
        }
        self.shared_state.publish(&self.transport);
        log::info!("Transport stopped");
    }

    /// Change tempo, re-anchoring the next tick if playing
    pub fn set_tempo(&mut self, bpm: f64) -> SequencerResult<()> {
        let tempo = Tempo::new(bpm)?;
        self.apply_tempo(tempo);
        Ok(())
    }

    fn apply_tempo(&mut self, tempo: Tempo) {
        let now = self.clock.now();
        self.transport.set_tempo(tempo, now);
        log::info!("Tempo set to {}", tempo);
    }

    /// Apply a control command
    /// Returns false when the command asks the host to quit
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Stop => self.stop(),
            Command::SetTempo(tempo) => self.apply_tempo(tempo),
            Command::UpdateTrack { id, spec } => {
                self.set_track_spec(id, spec);
            }
            Command::SetTrackSound { id, sound } => {
                self.set_track_sound(id, sound);
            }
            Command::Quit => return false,
        }
        true
    }

    /// Run one scheduling pass
    ///
    /// Commits every master step whose time falls inside the look-ahead
    /// window, possibly several if the caller fell behind. Returns the number
    /// of master steps processed.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut processed = 0;

        while self.transport.is_tick_due(now) {
            let master_step = self.transport.master_step();
            let timestamp = self.transport.next_tick_time();

            for track in &mut self.tracks {
                if track.is_due_to_fire(master_step) {
                    track.emit_note(timestamp, master_step);
                }
            }

            self.transport.advance();
            processed += 1;

            // New cycle: slots from the previous one are no longer duplicates
            if self.transport.master_step() == 0 {
                for track in &mut self.tracks {
                    track.reset();
                }
            }
        }

        if processed > 0 {
            self.shared_state.publish(&self.transport);
        }
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::timing::ManualClock;
    use std::sync::Mutex;

    type Fired = Arc<Mutex<Vec<f64>>>;

    fn recorder() -> (Fired, Box<dyn NoteEmitter>) {
        let fired: Fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        let emitter: Box<dyn NoteEmitter> =
            Box::new(move |t: f64, _d: f64| sink.lock().unwrap().push(t));
        (fired, emitter)
    }

    fn sequencer(clock: &ManualClock) -> Sequencer<ManualClock> {
        Sequencer::new(clock.clone(), Tempo::new(120.0).unwrap())
    }

    #[test]
    fn test_tick_is_idle_when_stopped() {
        let clock = ManualClock::new(0.0);
        let mut seq = sequencer(&clock);
        let (fired, emitter) = recorder();
        seq.create_track(1, emitter).unwrap();

        assert_eq!(seq.tick(), 0);
        assert!(fired.lock().unwrap().is_empty());
    }

    #[test]
    fn test_first_tick_fires_downbeat() {
        let clock = ManualClock::new(2.0);
        let mut seq = sequencer(&clock);
        let (fired, emitter) = recorder();
        seq.create_track(1, emitter).unwrap();

        seq.start();
        assert_eq!(seq.tick(), 1);
        assert_eq!(*fired.lock().unwrap(), vec![2.0]);
        assert_eq!(seq.current_master_step(), 1);
        assert_eq!(seq.shared_state().master_step(), 1);
    }

    #[test]
    fn test_catch_up_processes_every_missed_step() {
        let clock = ManualClock::new(0.0);
        let mut seq = sequencer(&clock);
        let (fired, emitter) = recorder();
        seq.create_track_with_spec(1, PatternSpec::new(32, 32, 0).unwrap(), emitter)
            .unwrap();

        seq.start();
        clock.set(1.0);
        // steps at 0.0, 0.125, ... 1.0 are all before 1.1
        assert_eq!(seq.tick(), 9);
        assert_eq!(fired.lock().unwrap().len(), 9);
        assert_eq!(seq.current_master_step(), 9);
    }

    fn notes_over_cycles(steps: usize, pulses: usize, cycles: usize) -> Vec<f64> {
        let clock = ManualClock::new(0.0);
        let mut seq = sequencer(&clock);
        let (fired, emitter) = recorder();
        seq.create_track_with_spec(1, PatternSpec::new(steps, pulses, 0).unwrap(), emitter)
            .unwrap();

        seq.start();
        let end = seq.tempo().cycle_duration_seconds() * cycles as f64 - 0.2;
        while clock.now() < end {
            seq.tick();
            clock.advance(0.016);
        }
        fired.lock().unwrap().clone()
    }

    #[test]
    fn test_single_pulse_fires_every_cycle() {
        for steps in [1, 4, 32] {
            assert_eq!(
                notes_over_cycles(steps, 1, 3),
                vec![0.0, 4.0, 8.0],
                "steps = {}",
                steps
            );
        }
    }

    #[test]
    fn test_wrap_clears_last_fired() {
        let clock = ManualClock::new(0.0);
        let mut seq = sequencer(&clock);
        let (_, emitter) = recorder();
        seq.create_track_with_spec(1, PatternSpec::new(4, 1, 0).unwrap(), emitter)
            .unwrap();

        seq.start();
        seq.tick();
        assert_eq!(seq.track(1).unwrap().last_fired_master_slot(), Some(0));

        // 31 steps later the counter wraps back to 0
        clock.set(3.85);
        assert_eq!(seq.tick(), 31);
        assert_eq!(seq.current_master_step(), 0);
        assert_eq!(seq.track(1).unwrap().last_fired_master_slot(), None);
    }

    #[test]
    fn test_duplicate_track_rejected() {
        let clock = ManualClock::new(0.0);
        let mut seq = sequencer(&clock);
        let (_, first) = recorder();
        let (_, second) = recorder();

        assert_eq!(seq.create_track(4, first).unwrap(), 4);
        assert!(matches!(
            seq.create_track(4, second),
            Err(SequencerError::DuplicateTrack(4))
        ));
    }

    #[test]
    fn test_update_track_validation_and_unknown_id() {
        let clock = ManualClock::new(0.0);
        let mut seq = sequencer(&clock);
        let (_, emitter) = recorder();
        seq.create_track(1, emitter).unwrap();

        assert!(seq.update_track(1, 40, 3, 0).is_err());
        assert!(seq.update_track(1, 8, 3, 8).is_err());
        assert!(seq.update_track(99, 8, 3, 0).is_ok());

        seq.update_track(1, 8, 20, 1).unwrap();
        let track = seq.track(1).unwrap();
        assert_eq!(track.spec().pulses(), 8);
        assert_eq!(track.pattern().pulse_count(), 8);
    }

    #[test]
    fn test_set_tempo_rejects_invalid_bpm() {
        let clock = ManualClock::new(0.0);
        let mut seq = sequencer(&clock);

        assert!(seq.set_tempo(0.0).is_err());
        assert!(seq.set_tempo(-1.0).is_err());
        assert_eq!(seq.tempo().bpm(), 120.0);

        seq.set_tempo(90.0).unwrap();
        assert_eq!(seq.tempo().bpm(), 90.0);
    }

    #[test]
    fn test_stop_clears_last_fired() {
        let clock = ManualClock::new(0.0);
        let mut seq = sequencer(&clock);
        let (_, emitter) = recorder();
        seq.create_track(1, emitter).unwrap();

        seq.start();
        seq.tick();
        assert_eq!(seq.track(1).unwrap().last_fired_master_slot(), Some(0));

        seq.stop();
        assert_eq!(seq.track(1).unwrap().last_fired_master_slot(), None);
        assert_eq!(seq.state(), TransportState::Stopped);
        assert_eq!(seq.current_master_step(), 0);
    }

    #[test]
    fn test_apply_commands() {
        let clock = ManualClock::new(0.0);
        let mut seq = sequencer(&clock);
        let (_, emitter) = recorder();
        seq.create_track(1, emitter).unwrap();

        assert!(seq.apply(Command::Start));
        assert_eq!(seq.state(), TransportState::Playing);

        let spec = PatternSpec::new(5, 2, 1).unwrap();
        assert!(seq.apply(Command::UpdateTrack { id: 1, spec }));
        assert_eq!(seq.track(1).unwrap().spec(), spec);

        let sound = TrackSound::new(330.0, 0.4, 0.5).unwrap();
        assert!(seq.apply(Command::SetTrackSound { id: 1, sound }));
        assert_eq!(seq.track(1).unwrap().sound(), sound);

        assert!(seq.apply(Command::SetTempo(Tempo::new(100.0).unwrap())));
        assert_eq!(seq.tempo().bpm(), 100.0);

        assert!(seq.apply(Command::Pause));
        assert_eq!(seq.state(), TransportState::Paused);
        assert_eq!(seq.shared_state().state(), TransportState::Paused);

        assert!(seq.apply(Command::Stop));
        assert!(!seq.apply(Command::Quit));
    }
}
