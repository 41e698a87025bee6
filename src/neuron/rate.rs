//! Leaky firing-rate neuron, `tau dr/dt = I - r`.
use serde::{Deserialize, Serialize};

use super::Dynamics;
use crate::error::{check_time_constant, SimError};

/// Represents a neuron whose state is a continuous firing rate relaxing towards its input.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct RateNeuron {
    /// The membrane time constant.
    tau: f64,
}

impl RateNeuron {
    /// Create a rate neuron with the specified time constant.
    /// The function returns an error for a non-positive time constant.
    pub fn build(tau: f64) -> Result<Self, SimError> {
        check_time_constant("tau", tau)?;
        Ok(RateNeuron { tau })
    }

    /// Check a neuron obtained by other means than [`RateNeuron::build`], e.g., deserialization.
    pub fn validate(&self) -> Result<(), SimError> {
        check_time_constant("tau", self.tau)
    }

    /// Returns the time constant of the neuron.
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Returns the exact rate at time `t` for a constant input, starting from `r0` at time 0.
    pub fn analytic(&self, r0: f64, input: f64, t: f64) -> f64 {
        input + (r0 - input) * (-t / self.tau).exp()
    }
}

impl Dynamics for RateNeuron {
    fn derivative(&self, state: f64, input: f64) -> f64 {
        (input - state) / self.tau
    }

    fn resting_state(&self) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stepper::integrate_model;
    use approx::assert_relative_eq;

    #[test]
    fn test_build() {
        assert_eq!(RateNeuron::build(10.0).unwrap().tau(), 10.0);
        assert!(matches!(RateNeuron::build(0.0), Err(SimError::DomainError(_))));
        assert!(matches!(RateNeuron::build(-5.0), Err(SimError::DomainError(_))));
        assert!(matches!(
            RateNeuron::build(f64::INFINITY),
            Err(SimError::DomainError(_))
        ));
    }

    #[test]
    fn test_derivative() {
        let neuron = RateNeuron::build(20.0).unwrap();
        assert_relative_eq!(neuron.derivative(0.0, 10.0), 0.5);
        assert_relative_eq!(neuron.derivative(10.0, 10.0), 0.0);
        assert_relative_eq!(neuron.derivative(10.0, 0.0), -0.5);
        assert_eq!(neuron.resting_state(), 0.0);
    }

    #[test]
    fn test_against_analytic_solution() {
        let neuron = RateNeuron::build(20.0).unwrap();
        let dt = 0.01;
        let trajectory = integrate_model(&neuron, |_, _| 10.0, dt, 0.0, 0.0, 100.0).unwrap();

        for (i, r) in trajectory.iter().enumerate().step_by(500) {
            let exact = neuron.analytic(0.0, 10.0, i as f64 * dt);
            assert_relative_eq!(*r, exact, epsilon = 1e-2);
        }
        assert_relative_eq!(*trajectory.last().unwrap(), 10.0, epsilon = 0.1);
    }

    #[test]
    fn test_halving_step_halves_error() {
        let neuron = RateNeuron::build(1.0).unwrap();
        let error = |dt: f64| {
            let trajectory = integrate_model(&neuron, |_, _| 1.0, dt, 0.0, 0.0, 1.0).unwrap();
            (trajectory.last().unwrap() - neuron.analytic(0.0, 1.0, 1.0)).abs()
        };

        let ratio = error(0.01) / error(0.005);
        assert!((1.9..2.1).contains(&ratio), "ratio {} is not ~2", ratio);
    }
}
