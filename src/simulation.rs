//! Simulation of one or two neuron models sharing a single input current.
//!
//! A [`Simulation`] composes a [`SimulationConfig`], the [`Models`] to drive and an [`InputSpec`].
//! Running it steps every model with the stepper of [`crate::stepper`] over `floor((end - start) / dt)` steps and
//! records, at each step, the time, the input current, the state of every model before the update and, for the LIF
//! neuron, the index of the step if it is a spiking one.
//!
//! Runs are independent: each one builds its own input source (and noise generator) from the seed of its [`InputSpec`],
//! so running the same simulation twice yields bit-identical results.
use itertools::Itertools;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{check_finite, SimError};
use crate::input::{InputSource, InputSpec};
use crate::neuron::lif::LifNeuron;
use crate::neuron::rate::RateNeuron;
use crate::neuron::{Dynamics, Spiking};
use crate::stepper::{check_bounds, num_steps};
use crate::INSTABILITY_BOUND;

fn default_instability_bound() -> f64 {
    INSTABILITY_BOUND
}

/// Step size, interval and initial state of a simulation.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationConfig {
    dt: f64,
    start: f64,
    end: f64,
    /// The initial state of every model; when absent, each model starts at rest.
    #[serde(default)]
    initial_state: Option<f64>,
    /// The magnitude above which a state is flagged as numerically unstable.
    #[serde(default = "default_instability_bound")]
    instability_bound: f64,
}

impl SimulationConfig {
    /// Create a simulation config over `[start, end)` with step size `dt`, each model starting at rest.
    /// The function returns an error for a non-positive step size, an empty interval or more than [`crate::MAX_STEPS`] steps.
    pub fn build(dt: f64, start: f64, end: f64) -> Result<Self, SimError> {
        check_bounds(dt, start, end)?;
        Ok(SimulationConfig {
            dt,
            start,
            end,
            initial_state: None,
            instability_bound: INSTABILITY_BOUND,
        })
    }

    /// Returns the same config with every model starting at `initial_state`.
    /// The function returns an error for a non-finite initial state.
    pub fn with_initial_state(mut self, initial_state: f64) -> Result<Self, SimError> {
        check_finite("the initial state", initial_state)?;
        self.initial_state = Some(initial_state);
        Ok(self)
    }

    /// Returns the same config with the specified instability bound.
    /// The function returns an error for a non-positive bound.
    pub fn with_instability_bound(mut self, bound: f64) -> Result<Self, SimError> {
        if !(bound > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "the instability bound must be strictly positive, got {}",
                bound
            )));
        }
        self.instability_bound = bound;
        Ok(self)
    }

    /// Check a config obtained by other means than [`SimulationConfig::build`], e.g., deserialization.
    pub fn validate(&self) -> Result<(), SimError> {
        let config = SimulationConfig::build(self.dt, self.start, self.end)?
            .with_instability_bound(self.instability_bound)?;
        match self.initial_state {
            Some(initial_state) => config.with_initial_state(initial_state).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Returns the step size.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Returns the start of the simulation.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the end of the simulation.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns the duration of the simulation.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Returns the initial state, if any.
    pub fn initial_state(&self) -> Option<f64> {
        self.initial_state
    }

    /// Returns the instability bound.
    pub fn instability_bound(&self) -> f64 {
        self.instability_bound
    }

    /// Returns the number of recorded steps.
    pub fn num_steps(&self) -> usize {
        num_steps(self.dt, self.start, self.end)
    }
}

/// The models driven by a simulation.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Models {
    Rate(RateNeuron),
    Lif(LifNeuron),
    /// Both models, receiving the same input.
    RateAndLif { rate: RateNeuron, lif: LifNeuron },
}

impl Models {
    /// Returns the rate neuron, if any.
    pub fn rate(&self) -> Option<&RateNeuron> {
        match self {
            Models::Rate(rate) | Models::RateAndLif { rate, .. } => Some(rate),
            Models::Lif(_) => None,
        }
    }

    /// Returns the LIF neuron, if any.
    pub fn lif(&self) -> Option<&LifNeuron> {
        match self {
            Models::Lif(lif) | Models::RateAndLif { lif, .. } => Some(lif),
            Models::Rate(_) => None,
        }
    }

    fn validate(&self) -> Result<(), SimError> {
        if let Some(rate) = self.rate() {
            rate.validate()?;
        }
        if let Some(lif) = self.lif() {
            lif.validate()?;
        }
        Ok(())
    }
}

/// The model in which a numerical instability was detected.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Rate,
    Lif,
}

/// First state found beyond the instability bound (or non-finite) during a run.
/// This is advisory only: the run is carried out to the end anyway.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct NumericalInstability {
    pub model: ModelKind,
    pub step: usize,
    pub value: f64,
}

/// Recorded output of a simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    dt: f64,
    times: Vec<f64>,
    input: Vec<f64>,
    rate: Option<Vec<f64>>,
    potential: Option<Vec<f64>>,
    spikes: Vec<usize>,
    instability: Option<NumericalInstability>,
}

impl SimulationResult {
    /// Returns the time stamps, `start + i * dt` for step `i`.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Returns the input current at each step.
    pub fn input(&self) -> &[f64] {
        &self.input
    }

    /// Returns the trajectory of the rate neuron, if simulated.
    pub fn rate(&self) -> Option<&[f64]> {
        self.rate.as_deref()
    }

    /// Returns the trajectory of the LIF membrane potential, if simulated.
    pub fn potential(&self) -> Option<&[f64]> {
        self.potential.as_deref()
    }

    /// Returns the (sorted) steps at which the LIF neuron spiked.
    pub fn spikes(&self) -> &[usize] {
        &self.spikes
    }

    /// Returns the first numerical instability, if any.
    pub fn instability(&self) -> Option<&NumericalInstability> {
        self.instability.as_ref()
    }

    /// Returns the number of recorded steps.
    pub fn num_steps(&self) -> usize {
        self.times.len()
    }

    /// Returns the spike times.
    /// Spike indices outside the recorded steps, e.g., in a hand-edited result, are skipped.
    pub fn spike_times(&self) -> Vec<f64> {
        self.spikes
            .iter()
            .filter_map(|&i| self.times.get(i).copied())
            .collect()
    }

    /// Returns the time between consecutive spikes.
    pub fn interspike_intervals(&self) -> Vec<f64> {
        self.spikes
            .iter()
            .tuple_windows()
            .map(|(&i, &j)| (j as f64 - i as f64) * self.dt)
            .collect()
    }

    /// Returns the mean number of spikes per unit of time over the recorded steps.
    pub fn firing_rate(&self) -> f64 {
        if self.times.is_empty() {
            return 0.0;
        }
        self.spikes.len() as f64 / (self.times.len() as f64 * self.dt)
    }
}

// The trajectory of one model during a run.
struct Track<'a, D: Dynamics> {
    model: &'a D,
    kind: ModelKind,
    state: f64,
    trajectory: Vec<f64>,
}

impl<'a, D: Dynamics> Track<'a, D> {
    fn new(model: &'a D, kind: ModelKind, initial_state: Option<f64>, capacity: usize) -> Self {
        Track {
            model,
            kind,
            state: initial_state.unwrap_or_else(|| model.resting_state()),
            trajectory: Vec::with_capacity(capacity),
        }
    }

    /// Record the current state, flag it if unstable, and step the model.
    fn record_and_step(
        &mut self,
        step: usize,
        current: f64,
        dt: f64,
        bound: f64,
        instability: &mut Option<NumericalInstability>,
    ) {
        self.trajectory.push(self.state);
        if instability.is_none() && !(self.state.abs() <= bound) {
            *instability = Some(NumericalInstability {
                model: self.kind,
                step,
                value: self.state,
            });
        }
        self.state = self.model.step(self.state, current, dt);
    }
}

/// A complete description of a simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Simulation {
    config: SimulationConfig,
    models: Models,
    input: InputSpec,
}

impl Simulation {
    /// Create a simulation with the specified config, models and input.
    /// The function returns an error for invalid parameters, e.g., a stimulus window extending past the simulation.
    pub fn build(config: SimulationConfig, models: Models, input: InputSpec) -> Result<Self, SimError> {
        let simulation = Simulation {
            config,
            models,
            input,
        };
        simulation.validate()?;
        Ok(simulation)
    }

    /// Check a simulation obtained by other means than [`Simulation::build`], e.g., deserialization.
    pub fn validate(&self) -> Result<(), SimError> {
        self.config.validate()?;
        self.models.validate()?;
        self.input.validate(self.config.duration())
    }

    /// Returns the simulation config.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the simulated models.
    pub fn models(&self) -> &Models {
        &self.models
    }

    /// Returns the input description.
    pub fn input(&self) -> &InputSpec {
        &self.input
    }

    /// Run the simulation with a fresh input source built from its input description.
    pub fn run(&self) -> Result<SimulationResult, SimError> {
        self.validate()?;
        let mut source = self.input.source(self.config.dt)?;
        self.run_with(source.as_mut())
    }

    /// Run the simulation with the specified input source in place of its input description.
    pub fn run_with<S: InputSource + ?Sized>(&self, source: &mut S) -> Result<SimulationResult, SimError> {
        self.config.validate()?;
        self.models.validate()?;

        let SimulationConfig {
            dt,
            start,
            initial_state,
            instability_bound,
            ..
        } = self.config;
        let n = self.config.num_steps();

        let mut rate = self
            .models
            .rate()
            .map(|model| Track::new(model, ModelKind::Rate, initial_state, n));
        let mut lif = self
            .models
            .lif()
            .map(|model| Track::new(model, ModelKind::Lif, initial_state, n));

        let mut times = Vec::with_capacity(n);
        let mut input = Vec::with_capacity(n);
        let mut spikes = vec![];
        let mut instability = None;

        for i in 0..n {
            let current = source.next_input(i, dt);
            times.push(start + i as f64 * dt);
            input.push(current);

            if let Some(track) = rate.as_mut() {
                track.record_and_step(i, current, dt, instability_bound, &mut instability);
            }
            if let Some(track) = lif.as_mut() {
                if track.model.spiked(track.state) {
                    spikes.push(i);
                }
                track.record_and_step(i, current, dt, instability_bound, &mut instability);
            }
        }

        debug!(
            "Simulation over [{}, {}) completed: {} steps, {} spikes",
            start,
            self.config.end,
            n,
            spikes.len()
        );
        if let Some(NumericalInstability { model, step, value }) = instability {
            warn!(
                "Numerical instability in the {:?} model at step {}: state {} exceeds {}",
                model, step, value, instability_bound
            );
        }

        Ok(SimulationResult {
            dt,
            times,
            input,
            rate: rate.map(|track| track.trajectory),
            potential: lif.map(|track| track.trajectory),
            spikes,
            instability,
        })
    }
}

/// Run independent simulations in parallel.
/// Each run owns its input source, so the results are the same as if run one after the other, and are returned in the same order.
pub fn run_sweep(simulations: &[Simulation]) -> Vec<Result<SimulationResult, SimError>> {
    simulations
        .par_iter()
        .map(|simulation| simulation.run())
        .collect()
}
