//! Leaky integrate-and-fire neuron, `tau dv/dt = (E_L - v) + I`, with a threshold-triggered reset.
//!
//! The threshold is checked once per step against the value reached at the previous step.
//! If `v >= theta_s`, the step is a reset step and the neuron is said to have spiked at that step.
//! How the reset is carried out is controlled by the [`ResetPolicy`]:
//! - [`ResetPolicy::Reference`] uses `E_L` in place of the derivative for one Euler step, i.e., `v + dt * E_L`.
//!   This reproduces the reference recurrence bit for bit, but is only an approximation of an instantaneous reset
//!   and depends on `dt`.
//! - [`ResetPolicy::Clamp`] sets the next value to `E_L` exactly.
use serde::{Deserialize, Serialize};

use super::{Dynamics, Spiking};
use crate::error::{check_finite, check_time_constant, SimError};

/// How the membrane potential is brought back after a spike.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// One Euler step with `E_L` used as the derivative.
    #[default]
    Reference,
    /// Exact reset to `E_L`.
    Clamp,
}

/// Represents a leaky integrate-and-fire neuron.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct LifNeuron {
    /// The membrane time constant.
    tau: f64,
    /// The resting (and reset) potential.
    e_l: f64,
    /// The firing threshold.
    theta_s: f64,
    /// The reset policy.
    #[serde(default)]
    reset: ResetPolicy,
}

impl LifNeuron {
    /// Create a LIF neuron with the specified parameters and the reference reset policy.
    /// The function returns an error for a non-positive time constant or non-finite potentials.
    pub fn build(tau: f64, e_l: f64, theta_s: f64) -> Result<Self, SimError> {
        check_time_constant("tau", tau)?;
        check_finite("the resting potential E_L", e_l)?;
        check_finite("the firing threshold theta_s", theta_s)?;
        Ok(LifNeuron {
            tau,
            e_l,
            theta_s,
            reset: ResetPolicy::default(),
        })
    }

    /// Returns the same neuron with the specified reset policy.
    pub fn with_reset(mut self, reset: ResetPolicy) -> Self {
        self.reset = reset;
        self
    }

    /// Check a neuron obtained by other means than [`LifNeuron::build`], e.g., deserialization.
    pub fn validate(&self) -> Result<(), SimError> {
        LifNeuron::build(self.tau, self.e_l, self.theta_s)?;
        Ok(())
    }

    /// Returns the membrane time constant.
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Returns the resting potential.
    pub fn e_l(&self) -> f64 {
        self.e_l
    }

    /// Returns the firing threshold.
    pub fn theta_s(&self) -> f64 {
        self.theta_s
    }

    /// Returns the reset policy.
    pub fn reset(&self) -> ResetPolicy {
        self.reset
    }

    /// Returns the time needed for the free membrane potential to reach the threshold from rest, under a constant input.
    /// Returns `None` if the input is too weak for the potential to ever reach the threshold.
    pub fn time_to_threshold(&self, input: f64) -> Option<f64> {
        let gap = self.theta_s - self.e_l;
        if gap <= 0.0 {
            return Some(0.0);
        }
        if input <= gap {
            return None;
        }
        Some(self.tau * (input / (input - gap)).ln())
    }
}

impl Dynamics for LifNeuron {
    fn derivative(&self, state: f64, input: f64) -> f64 {
        if self.spiked(state) && self.reset == ResetPolicy::Reference {
            return self.e_l;
        }
        ((self.e_l - state) + input) / self.tau
    }

    fn resting_state(&self) -> f64 {
        self.e_l
    }

    fn step(&self, state: f64, input: f64, dt: f64) -> f64 {
        if self.spiked(state) && self.reset == ResetPolicy::Clamp {
            return self.reset_value();
        }
        state + dt * self.derivative(state, input)
    }
}

impl Spiking for LifNeuron {
    fn spiked(&self, state: f64) -> bool {
        state >= self.theta_s
    }

    fn reset_value(&self) -> f64 {
        self.e_l
    }
}
