//! Single-neuron models.
//!
//! Every model implements [`Dynamics`], i.e., it provides the derivative of its state variable given an input current.
//! Spiking models additionally implement [`Spiking`], which exposes threshold detection and the reset value as
//! separate capabilities.
//!
//! - [`rate`]: leaky firing-rate neuron.
//! - [`lif`]: leaky integrate-and-fire neuron.
pub mod lif;
pub mod rate;

/// The dynamics of a scalar state variable driven by an input current.
pub trait Dynamics {
    /// Returns the time derivative of the state for the given input.
    fn derivative(&self, state: f64, input: f64) -> f64;

    /// Returns the state in the absence of input.
    fn resting_state(&self) -> f64;

    /// Returns the state after one step of size `dt`.
    /// Defaults to an explicit Euler step on [`Dynamics::derivative`].
    fn step(&self, state: f64, input: f64, dt: f64) -> f64 {
        state + dt * self.derivative(state, input)
    }
}

/// A model whose state is reset after crossing a threshold.
pub trait Spiking: Dynamics {
    /// Returns true if the state is at or above the firing threshold.
    fn spiked(&self, state: f64) -> bool;

    /// Returns the value the state is reset to after a spike.
    fn reset_value(&self) -> f64;
}
