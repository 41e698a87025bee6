//! This crate provides tools for simulating single neurons in Rust, with fixed-step explicit integration.
//!
//! Two models are available: a continuous firing-rate neuron ([`neuron::rate`]) and a spiking leaky
//! integrate-and-fire neuron ([`neuron::lif`]). They can be driven by a square-pulse stimulus ([`stimulus`]),
//! by an Ornstein-Uhlenbeck noisy current ([`noise`]), or by both.
//!
//! # Integrating Dynamics
//!
//! ```rust
//! use rusty_neuron::neuron::rate::RateNeuron;
//! use rusty_neuron::stepper::integrate_model;
//!
//! // A rate neuron with time constant 20, driven by a constant input of 10
//! let neuron = RateNeuron::build(20.0).unwrap();
//! let trajectory = integrate_model(&neuron, |_, _| 10.0, 0.1, 0.0, 0.0, 100.0).unwrap();
//!
//! assert_eq!(trajectory.len(), 1001);
//! assert!((trajectory[1000] - neuron.analytic(0.0, 10.0, 100.0)).abs() < 1e-2);
//! ```
//!
//! # Simulating a Spiking Neuron
//!
//! ```rust
//! use rusty_neuron::input::InputSpec;
//! use rusty_neuron::neuron::lif::LifNeuron;
//! use rusty_neuron::simulation::{Models, Simulation, SimulationConfig};
//! use rusty_neuron::stimulus::StimulusWindow;
//!
//! let config = SimulationConfig::build(0.1, 0.0, 100.0).unwrap();
//! let neuron = LifNeuron::build(10.0, -70.0, -50.0).unwrap();
//! let stimulus = StimulusWindow::build(10.0, 100.0, 50.0).unwrap();
//!
//! let simulation = Simulation::build(config, Models::Lif(neuron), InputSpec::Stimulus(stimulus)).unwrap();
//! let result = simulation.run().unwrap();
//!
//! assert_eq!(result.num_steps(), 1000);
//! assert!(!result.spikes().is_empty());
//! ```
//!
//! # Noisy Input
//!
//! ```rust
//! use rusty_neuron::input::InputSpec;
//! use rusty_neuron::neuron::lif::LifNeuron;
//! use rusty_neuron::noise::OuParameters;
//! use rusty_neuron::simulation::{Models, Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::build(0.1, 0.0, 500.0).unwrap();
//! let neuron = LifNeuron::build(10.0, -70.0, -50.0).unwrap();
//! let input = InputSpec::Noise { params: OuParameters::build(10.0, 25.0, 5.0).unwrap(), seed: 42 };
//!
//! // Same seed, same result
//! let simulation = Simulation::build(config, Models::Lif(neuron), input).unwrap();
//! assert_eq!(simulation.run().unwrap(), simulation.run().unwrap());
//! ```

pub mod error;
pub mod input;
pub mod neuron;
pub mod noise;
pub mod simulation;
pub mod stepper;
pub mod stimulus;

/// The tolerance, in steps, below which a ratio of times is taken as a whole number of steps.
pub const TIME_RESOLUTION: f64 = 1e-9;
/// The largest number of steps a simulation or an integration may take.
pub const MAX_STEPS: usize = 100_000_000;
/// The default magnitude above which a state is flagged as numerically unstable.
pub const INSTABILITY_BOUND: f64 = 1e6;
