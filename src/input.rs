//! Input currents feeding the neuron models.
//!
//! An [`InputSpec`] is a plain description of the input of a run (and can be serialized).
//! At the beginning of each run, it is turned into a fresh [`InputSource`], which owns whatever per-run state
//! is needed, e.g., the seeded generator of the noise.
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::noise::{NoiseState, OuParameters};
use crate::stimulus::StimulusWindow;

/// A source of input current, queried once per step in increasing step order.
pub trait InputSource {
    /// Returns the input current at the given step.
    fn next_input(&mut self, step: usize, dt: f64) -> f64;
}

impl InputSource for StimulusWindow {
    fn next_input(&mut self, step: usize, dt: f64) -> f64 {
        self.value_at(step, dt)
    }
}

impl InputSource for NoiseState {
    fn next_input(&mut self, _step: usize, _dt: f64) -> f64 {
        let current = self.value();
        self.advance();
        current
    }
}

/// An Ornstein-Uhlenbeck current whose mean is shifted by a square-pulse stimulus.
#[derive(Debug)]
pub struct NoisyStimulus {
    stimulus: StimulusWindow,
    noise: NoiseState,
}

impl NoisyStimulus {
    /// Create a noisy stimulus, the mean of the noise at each step being `mu` plus the stimulus.
    pub fn new(stimulus: StimulusWindow, noise: NoiseState) -> Self {
        NoisyStimulus { stimulus, noise }
    }
}

impl InputSource for NoisyStimulus {
    fn next_input(&mut self, step: usize, dt: f64) -> f64 {
        let current = self.noise.value();
        let mean = self.noise.params().mu() + self.stimulus.value_at(step, dt);
        self.noise.advance_towards(mean);
        current
    }
}

/// Description of the input of a simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputSpec {
    /// A deterministic square pulse.
    Stimulus(StimulusWindow),
    /// An Ornstein-Uhlenbeck current, starting at its mean.
    Noise { params: OuParameters, seed: u64 },
    /// An Ornstein-Uhlenbeck current whose mean follows a square pulse.
    NoisyStimulus {
        stimulus: StimulusWindow,
        params: OuParameters,
        seed: u64,
    },
}

impl InputSpec {
    /// Check the input against a simulation of the given duration.
    pub fn validate(&self, duration: f64) -> Result<(), SimError> {
        match self {
            InputSpec::Stimulus(stimulus) => revalidate(stimulus, duration),
            InputSpec::Noise { params, .. } => params.validate(),
            InputSpec::NoisyStimulus {
                stimulus, params, ..
            } => {
                revalidate(stimulus, duration)?;
                params.validate()
            }
        }
    }

    /// Returns a fresh input source for one run with step size `dt`.
    pub fn source(&self, dt: f64) -> Result<Box<dyn InputSource>, SimError> {
        match self {
            InputSpec::Stimulus(stimulus) => Ok(Box::new(*stimulus)),
            InputSpec::Noise { params, seed } => Ok(Box::new(NoiseState::build(*params, dt, *seed)?)),
            InputSpec::NoisyStimulus {
                stimulus,
                params,
                seed,
            } => Ok(Box::new(NoisyStimulus::new(
                *stimulus,
                NoiseState::build(*params, dt, *seed)?,
            ))),
        }
    }
}

// Windows may come from deserialization, so the constructor checks are run again.
fn revalidate(stimulus: &StimulusWindow, duration: f64) -> Result<(), SimError> {
    StimulusWindow::build(stimulus.onset(), stimulus.offset(), stimulus.amplitude())?
        .check_duration(duration)
}
