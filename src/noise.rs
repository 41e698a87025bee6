//! Ornstein-Uhlenbeck noisy current, integrated with the Euler-Maruyama scheme.
//!
//! The process follows
//! `eta[k+1] = eta[k] + (dt / tau) * theta * (mu - eta[k]) + sigma * sqrt(2 * dt / tau) * Z[k]`,
//! with `Z[k]` independent standard normal draws.
//! With this scaling, the stationary variance is `sigma^2 / theta` whatever the step size.
//!
//! Each [`NoiseState`] owns its own seeded generator, hence two states built with the same parameters and seed
//! produce bit-identical sequences.
//!
//! # Example
//!
//! ```rust
//! use rusty_neuron::noise::{NoiseState, OuParameters};
//!
//! let params = OuParameters::build(10.0, 0.0, 1.0).unwrap();
//! let mut noise_1 = NoiseState::build(params, 0.1, 42).unwrap();
//! let mut noise_2 = NoiseState::build(params, 0.1, 42).unwrap();
//! assert_eq!(noise_1.sample(100), noise_2.sample(100));
//! ```
use derivative::Derivative;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::error::{check_finite, check_time_constant, SimError};

/// Parameters of an Ornstein-Uhlenbeck process.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct OuParameters {
    /// The time constant.
    tau: f64,
    /// The mean.
    mu: f64,
    /// The fluctuation scale.
    sigma: f64,
    /// The mean-reversion rate.
    #[serde(default = "default_theta")]
    theta: f64,
}

fn default_theta() -> f64 {
    1.0
}

impl OuParameters {
    /// Create OU parameters with unit mean-reversion rate.
    /// The function returns an error for a non-positive time constant, a negative fluctuation scale or non-finite values.
    pub fn build(tau: f64, mu: f64, sigma: f64) -> Result<Self, SimError> {
        check_time_constant("tau", tau)?;
        check_finite("the noise mean mu", mu)?;
        check_finite("the noise scale sigma", sigma)?;
        if sigma < 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "the noise scale sigma must be non-negative, got {}",
                sigma
            )));
        }
        Ok(OuParameters {
            tau,
            mu,
            sigma,
            theta: default_theta(),
        })
    }

    /// Returns the same parameters with the specified mean-reversion rate.
    /// The function returns an error for a negative or non-finite rate.
    pub fn with_theta(mut self, theta: f64) -> Result<Self, SimError> {
        check_finite("the mean-reversion rate theta", theta)?;
        if theta < 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "the mean-reversion rate theta must be non-negative, got {}",
                theta
            )));
        }
        self.theta = theta;
        Ok(self)
    }

    /// Check parameters obtained by other means than [`OuParameters::build`], e.g., deserialization.
    pub fn validate(&self) -> Result<(), SimError> {
        OuParameters::build(self.tau, self.mu, self.sigma)?.with_theta(self.theta)?;
        Ok(())
    }

    /// Returns the time constant.
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Returns the mean.
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Returns the fluctuation scale.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Returns the mean-reversion rate.
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Returns the mean of the stationary distribution.
    pub fn stationary_mean(&self) -> f64 {
        self.mu
    }

    /// Returns the variance of the stationary distribution, infinite without mean reversion.
    pub fn stationary_variance(&self) -> f64 {
        if self.theta == 0.0 {
            return f64::INFINITY;
        }
        self.sigma * self.sigma / self.theta
    }
}

/// The state of an Ornstein-Uhlenbeck process during one simulation run.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct NoiseState {
    params: OuParameters,
    dt: f64,
    value: f64,
    #[derivative(Debug = "ignore")]
    rng: ChaCha8Rng,
}

impl NoiseState {
    /// Create a new process starting at its mean, with a generator seeded by `seed`.
    /// The function returns an error for a non-positive step size.
    pub fn build(params: OuParameters, dt: f64, seed: u64) -> Result<Self, SimError> {
        params.validate()?;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidParameter(format!(
                "the step size must be strictly positive and finite, got {}",
                dt
            )));
        }
        Ok(NoiseState {
            params,
            dt,
            value: params.mu,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Returns the same process starting at the specified value.
    pub fn with_initial(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// Returns the parameters of the process.
    pub fn params(&self) -> &OuParameters {
        &self.params
    }

    /// Returns the current value of the process.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Advance the process by one step towards its mean and returns the new value.
    pub fn advance(&mut self) -> f64 {
        self.advance_towards(self.params.mu)
    }

    /// Advance the process by one step towards the specified mean and returns the new value.
    pub fn advance_towards(&mut self, mu: f64) -> f64 {
        let OuParameters {
            tau, sigma, theta, ..
        } = self.params;
        let z: f64 = StandardNormal.sample(&mut self.rng);
        self.value += (self.dt / tau) * theta * (mu - self.value)
            + sigma * (2.0 * self.dt / tau).sqrt() * z;
        self.value
    }

    /// Returns the next `num_steps` values of the process, starting with the current one.
    pub fn sample(&mut self, num_steps: usize) -> Vec<f64> {
        let mut values = Vec::with_capacity(num_steps);
        for _ in 0..num_steps {
            values.push(self.value);
            self.advance();
        }
        values
    }
}
