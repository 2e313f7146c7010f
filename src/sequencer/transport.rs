// Transport - Playback state and the shared master clock
// Owns the master step counter and the look-ahead time of the next tick

use super::timeline::{LOOKAHEAD_SECONDS, MASTER_STEPS, Tempo};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Transport state (stop/play/pause)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }

    fn to_u8(self) -> u8 {
        match self {
            TransportState::Stopped => 0,
            TransportState::Playing => 1,
            TransportState::Paused => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => TransportState::Playing,
            2 => TransportState::Paused,
            _ => TransportState::Stopped,
        }
    }
}

/// What a `start` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Started from Stopped at master step 0
    Started,
    /// Resumed from Paused with the pre-pause phase
    Resumed,
    /// Was already playing
    AlreadyPlaying,
}

/// Transport clock
///
/// Single owner: only the scheduler mutates it, one tick at a time.
#[derive(Debug, Clone)]
pub struct TransportClock {
    state: TransportState,
    tempo: Tempo,
    master_step: usize,
    next_tick_time: f64,
    paused_at_time: Option<f64>,
}

impl TransportClock {
    pub fn new(tempo: Tempo) -> Self {
        Self {
            state: TransportState::Stopped,
            tempo,
            master_step: 0,
            next_tick_time: 0.0,
            paused_at_time: None,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn master_step(&self) -> usize {
        self.master_step
    }

    /// Audio-clock time the next master step is scheduled at
    pub fn next_tick_time(&self) -> f64 {
        self.next_tick_time
    }

    pub fn paused_at_time(&self) -> Option<f64> {
        self.paused_at_time
    }

    /// Start from Stopped, or resume from Paused keeping the phase
    ///
    /// On resume the time left until the next tick when pausing is carried
    /// over: `next' = now + (next - paused_at)`.
    pub fn start(&mut self, now: f64) -> StartOutcome {
        match self.state {
            TransportState::Playing => StartOutcome::AlreadyPlaying,
            TransportState::Stopped => {
                self.master_step = 0;
                self.next_tick_time = now;
                self.paused_at_time = None;
                self.state = TransportState::Playing;
                StartOutcome::Started
            }
            TransportState::Paused => {
                let paused_at = self.paused_at_time.take().unwrap_or(now);
                self.next_tick_time = now + (self.next_tick_time - paused_at);
                self.state = TransportState::Playing;
                StartOutcome::Resumed
            }
        }
    }

    /// Pause playback, keeping master step and next tick time
    /// Returns false if the transport was not playing
    pub fn pause(&mut self, now: f64) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.paused_at_time = Some(now);
        self.state = TransportState::Paused;
        true
    }

    /// Stop and rewind to master step 0
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.master_step = 0;
        self.next_tick_time = 0.0;
        self.paused_at_time = None;
    }

    /// Change tempo
    ///
    /// While playing, the next tick is re-anchored one 16th note after `now`
    /// at the new tempo; the previous phase offset is dropped.
    pub fn set_tempo(&mut self, tempo: Tempo, now: f64) {
        self.tempo = tempo;
        if self.state.is_playing() {
            self.next_tick_time = now + tempo.seconds_per_sixteenth();
        }
    }

    /// Whether the next tick falls inside the look-ahead window
    pub fn is_tick_due(&self, now: f64) -> bool {
        self.state.is_playing() && self.next_tick_time < now + LOOKAHEAD_SECONDS
    }

    /// Move to the next master step, one 16th note later
    pub fn advance(&mut self) {
        self.next_tick_time += self.tempo.seconds_per_sixteenth();
        self.master_step = (self.master_step + 1) % MASTER_STEPS;
    }
}

impl Default for TransportClock {
    fn default() -> Self {
        Self::new(Tempo::default())
    }
}

/// Transport snapshot readable from other threads
/// Written by the scheduler after every tick, read by display code
#[derive(Debug, Default)]
pub struct SharedTransportState {
    state: AtomicU8,
    master_step: AtomicUsize,
}

impl SharedTransportState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn state(&self) -> TransportState {
        TransportState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Current master step (display only)
    pub fn master_step(&self) -> usize {
        self.master_step.load(Ordering::Relaxed)
    }

    /// Publish the clock's current state
    pub fn publish(&self, clock: &TransportClock) {
        self.state.store(clock.state().to_u8(), Ordering::Relaxed);
        self.master_step
            .store(clock.master_step(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempo(bpm: f64) -> Tempo {
        Tempo::new(bpm).unwrap()
    }

    #[test]
    fn test_transport_state() {
        assert!(TransportState::Playing.is_playing());
        assert!(!TransportState::Paused.is_playing());
        assert!(!TransportState::Stopped.is_playing());
        assert_eq!(TransportState::default(), TransportState::Stopped);
    }

    #[test]
    fn test_start_from_stopped() {
        let mut clock = TransportClock::new(tempo(120.0));

        assert_eq!(clock.start(3.5), StartOutcome::Started);
        assert_eq!(clock.state(), TransportState::Playing);
        assert_eq!(clock.master_step(), 0);
        assert_eq!(clock.next_tick_time(), 3.5);

        assert_eq!(clock.start(4.0), StartOutcome::AlreadyPlaying);
        assert_eq!(clock.next_tick_time(), 3.5);
    }

    #[test]
    fn test_advance_wraps_master_step() {
        let mut clock = TransportClock::new(tempo(120.0));
        clock.start(0.0);

        for expected in 1..=MASTER_STEPS {
            clock.advance();
            assert_eq!(clock.master_step(), expected % MASTER_STEPS);
        }
        assert_eq!(clock.next_tick_time(), 4.0);
    }

    #[test]
    fn test_pause_resume_preserves_phase() {
        let mut clock = TransportClock::new(tempo(120.0));
        clock.state = TransportState::Playing;
        clock.next_tick_time = 10.0;
        clock.master_step = 5;

        assert!(clock.pause(9.95));
        assert_eq!(clock.state(), TransportState::Paused);
        assert_eq!(clock.paused_at_time(), Some(9.95));
        assert!(!clock.is_tick_due(100.0));

        assert_eq!(clock.start(20.0), StartOutcome::Resumed);
        assert!((clock.next_tick_time() - 20.05).abs() < 1e-9);
        assert_eq!(clock.master_step(), 5);
        assert_eq!(clock.paused_at_time(), None);
    }

    #[test]
    fn test_pause_when_not_playing() {
        let mut clock = TransportClock::default();
        assert!(!clock.pause(1.0));
        assert_eq!(clock.state(), TransportState::Stopped);
    }

    #[test]
    fn test_stop_resets() {
        let mut clock = TransportClock::new(tempo(120.0));
        clock.start(1.0);
        clock.advance();
        clock.advance();
        clock.pause(1.2);

        clock.stop();
        assert_eq!(clock.state(), TransportState::Stopped);
        assert_eq!(clock.master_step(), 0);
        assert_eq!(clock.next_tick_time(), 0.0);
        assert_eq!(clock.paused_at_time(), None);
    }

    #[test]
    fn test_set_tempo_reanchors_while_playing() {
        let mut clock = TransportClock::new(tempo(120.0));
        clock.start(0.0);
        clock.advance();

        clock.set_tempo(tempo(60.0), 0.11);
        assert_eq!(clock.tempo().bpm(), 60.0);
        assert!((clock.next_tick_time() - 0.36).abs() < 1e-9);
    }

    #[test]
    fn test_set_tempo_while_paused_keeps_deficit() {
        let mut clock = TransportClock::new(tempo(120.0));
        clock.start(0.0);
        clock.advance();
        clock.pause(0.1);

        clock.set_tempo(tempo(90.0), 0.2);
        assert_eq!(clock.next_tick_time(), 0.125);

        clock.start(5.0);
        assert!((clock.next_tick_time() - 5.025).abs() < 1e-9);
    }

    #[test]
    fn test_tick_due_uses_lookahead() {
        let mut clock = TransportClock::new(tempo(120.0));
        clock.start(1.0);

        assert!(clock.is_tick_due(0.95));
        assert!(!clock.is_tick_due(0.85));
    }

    #[test]
    fn test_shared_state_publish() {
        let shared = SharedTransportState::new();
        let mut clock = TransportClock::default();
        clock.start(0.0);
        clock.advance();

        shared.publish(&clock);
        assert_eq!(shared.state(), TransportState::Playing);
        assert_eq!(shared.master_step(), 1);

        clock.pause(0.2);
        shared.publish(&clock);
        assert_eq!(shared.state(), TransportState::Paused);
    }
}
