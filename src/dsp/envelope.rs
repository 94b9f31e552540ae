use super::{curve::power_curve, smoother::LocalLinearSmoother};

/*
Linear ADSR Envelope
====================

The gain and filter envelopes of every voice. A linear ADSR in the classic
shape, with two twists that matter once voices get stolen and retriggered.

Vocabulary
----------

  counter     `value` runs from 1 down to 0 inside each timed stage. When it
              crosses 0 the state machine moves to the next stage and the
              counter is refilled. One counter serves every stage.

  delta       Per-sample decrement of the counter, 1 / (seconds * fs).

  offset      Level the attack starts from. A retriggered voice starts its
              attack at whatever it was outputting, so there is no jump
              back to zero.

  adaptive    Stage times shorter than one cycle of the note click, because
  time        the gain changes faster than the waveform. Each time is
              raised to at least one period of the note (capped at 100 ms
              for very low notes).

  curve       Optional bend of each ramp, see `curve::power_curve`.
              Zero keeps the stages straight lines.


The State Machine
-----------------

    trigger        value<=0        value<=0
      │   ┌────────┐      ┌───────┐       ┌─────────┐
      └──→│ Attack │─────→│ Decay │──────→│ Sustain │
          └────────┘      └───────┘       └─────────┘
               │              │                │
               └──────────────┴────────────────┘
                              │ release
                              ↓
                        ┌─────────┐ value<=0 ┌────────────┐
                        │ Release │─────────→│ Terminated │
                        └─────────┘          └────────────┘

Release scales down from the level at the moment of release, so it works
from any stage. The sustain level is smoothed, turning the knob while a
note is held does not click.
*/

const SUSTAIN_SMOOTHING_SECONDS: f32 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Attack,
    Decay,
    Sustain,
    Release,
    Terminated,
}

impl EnvelopeState {
    fn next(self) -> Self {
        match self {
            EnvelopeState::Attack => EnvelopeState::Decay,
            EnvelopeState::Decay => EnvelopeState::Sustain,
            EnvelopeState::Sustain => EnvelopeState::Release,
            EnvelopeState::Release | EnvelopeState::Terminated => EnvelopeState::Terminated,
        }
    }
}

/// Raises `seconds` to at least one cycle of `note_freq`, at most 100 ms.
pub fn adapt_time(seconds: f32, note_freq: f32) -> f32 {
    let cycle = 1.0 / note_freq;
    if seconds >= cycle {
        seconds
    } else {
        cycle.min(0.1)
    }
}

#[derive(Debug, Clone)]
pub struct LinearAdsr {
    sample_rate: f32,
    sustain: LocalLinearSmoother,
    attack_delta: f32,
    attack_offset: f32,
    attack_range: f32,
    decay_delta: f32,
    release_delta: f32,
    release_range: f32,
    curve: f32,
    value: f32,
    out: f32,
    state: EnvelopeState,
}

impl LinearAdsr {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            sustain: LocalLinearSmoother::new(sample_rate, SUSTAIN_SMOOTHING_SECONDS, 1.0),
            attack_delta: 0.01,
            attack_offset: 0.0,
            attack_range: 1.0,
            decay_delta: 0.01,
            release_delta: 0.01,
            release_range: 0.5,
            curve: 0.0,
            value: 0.0,
            out: 0.0,
            state: EnvelopeState::Terminated,
        }
    }

    pub fn setup(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.sustain.set_sample_rate(sample_rate);
    }

    fn seconds_to_delta(&self, seconds: f32) -> f32 {
        1.0 / (self.sample_rate * seconds)
    }

    /// Starts the attack from the current output level.
    pub fn trigger(&mut self, attack: f32, decay: f32, sustain: f32, release: f32, note_freq: f32) {
        self.attack_offset = if self.state == EnvelopeState::Terminated {
            0.0
        } else {
            self.out
        };
        self.attack_range = 1.0 - self.attack_offset;
        self.state = EnvelopeState::Attack;
        self.value = 1.0;
        self.sustain.reset(sustain.clamp(0.0, 1.0));
        self.set(attack, decay, sustain, release, note_freq);
    }

    /// Updates times and sustain level without restarting.
    pub fn set(&mut self, attack: f32, decay: f32, sustain: f32, release: f32, note_freq: f32) {
        self.sustain.push(sustain.clamp(0.0, 1.0));
        self.attack_delta = self.seconds_to_delta(adapt_time(attack, note_freq));
        self.decay_delta = self.seconds_to_delta(adapt_time(decay, note_freq));
        self.release_delta = self.seconds_to_delta(adapt_time(release, note_freq));
    }

    pub fn set_curve(&mut self, curve: f32) {
        self.curve = curve;
    }

    pub fn release(&mut self) {
        if self.state == EnvelopeState::Terminated {
            return;
        }
        self.state = EnvelopeState::Release;
        self.value = 1.0;
        self.release_range = self.out;
    }

    pub fn terminate(&mut self) {
        self.state = EnvelopeState::Terminated;
        self.out = 0.0;
    }

    pub fn reset(&mut self) {
        self.terminate();
        self.value = 0.0;
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn is_attacking(&self) -> bool {
        self.state == EnvelopeState::Attack
    }

    pub fn is_releasing(&self) -> bool {
        self.state == EnvelopeState::Release
    }

    pub fn is_terminated(&self) -> bool {
        self.state == EnvelopeState::Terminated
    }

    pub fn output(&self) -> f32 {
        self.out
    }

    pub fn process(&mut self) -> f32 {
        let sustain = self.sustain.process();

        if self.value <= 0.0 {
            self.state = self.state.next();
            self.value = 1.0;
        }

        self.out = match self.state {
            EnvelopeState::Attack => {
                self.value -= self.attack_delta;
                self.attack_offset + self.attack_range * power_curve(1.0 - self.value, self.curve)
            }
            EnvelopeState::Decay => {
                self.value -= self.decay_delta;
                (1.0 - sustain) * power_curve(self.value, self.curve) + sustain
            }
            EnvelopeState::Sustain => sustain,
            EnvelopeState::Release => {
                self.value -= self.release_delta;
                self.release_range * power_curve(self.value, self.curve)
            }
            EnvelopeState::Terminated => 0.0,
        }
        .clamp(0.0, 1.0);
        self.out
    }
}
