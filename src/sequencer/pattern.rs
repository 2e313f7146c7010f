// Pattern - Euclidean-style rhythm generation
// Turns (steps, pulses, rotation) into a boolean firing pattern

use super::timeline::MASTER_STEPS;
use super::{SequencerError, SequencerResult};
use std::fmt;

/// Parameters of a generated rhythm
///
/// Always valid once constructed: `1 <= steps <= 32`, `pulses <= steps`,
/// `rotation < steps`. A new spec replaces the old one on every edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternSpec {
    steps: usize,
    pulses: usize,
    rotation: usize,
}

impl PatternSpec {
    /// Create a validated spec
    ///
    /// `pulses` is clamped to `steps`; out-of-range `steps` or `rotation`
    /// are rejected.
    pub fn new(steps: usize, pulses: usize, rotation: usize) -> SequencerResult<Self> {
        if !(1..=MASTER_STEPS).contains(&steps) {
            return Err(SequencerError::InvalidSteps(steps));
        }
        if rotation >= steps {
            return Err(SequencerError::InvalidRotation { rotation, steps });
        }

        Ok(Self {
            steps,
            pulses: pulses.min(steps),
            rotation,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn pulses(&self) -> usize {
        self.pulses
    }

    pub fn rotation(&self) -> usize {
        self.rotation
    }

    /// Generate the pattern described by this spec
    pub fn generate(&self) -> Pattern {
        generate(self.steps, self.pulses, self.rotation)
    }
}

impl Default for PatternSpec {
    /// Four on the floor over 16 steps
    fn default() -> Self {
        Self {
            steps: 16,
            pulses: 4,
            rotation: 0,
        }
    }
}

impl fmt::Display for PatternSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E({},{})+{}", self.pulses, self.steps, self.rotation)
    }
}

/// A generated firing pattern, one entry per step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    slots: Vec<bool>,
}

impl Pattern {
    /// Number of steps
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the given step is a pulse (out-of-range steps never are)
    pub fn is_pulse(&self, step: usize) -> bool {
        self.slots.get(step).copied().unwrap_or(false)
    }

    /// Number of pulses
    pub fn pulse_count(&self) -> usize {
        self.slots.iter().filter(|&&slot| slot).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.slots
    }
}

impl fmt::Display for Pattern {
    /// Renders as `x..x..x.`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &slot in &self.slots {
            f.write_str(if slot { "x" } else { "." })?;
        }
        Ok(())
    }
}

/// Generate a rhythm of `pulses` onsets spread over `steps` slots,
/// rotated left by `rotation`
///
/// Pulse `i` lands on slot `floor(i * steps / pulses)`. This is a fixed-increment
/// spread, not Bjorklund: it is maximally even only when `pulses` divides `steps`.
/// Callers guarantee `pulses <= steps` and `rotation < steps`.
pub fn generate(steps: usize, pulses: usize, rotation: usize) -> Pattern {
    let mut base = vec![false; steps];

    if pulses > 0 && steps > 0 {
        for i in 0..pulses {
            base[(i * steps / pulses) % steps] = true;
        }
    }

    let slots = if steps == 0 {
        base
    } else {
        (0..steps).map(|j| base[(j + rotation) % steps]).collect()
    };

    Pattern { slots }
}
