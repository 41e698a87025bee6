//! Fixed-step explicit Euler integration of scalar dynamics.
//!
//! The stepper is agnostic of the neuron model: it only needs a derivative `f(state, input)`.
//! Neuron models plug in through the [`Dynamics`] trait, which lets a model override the
//! default Euler update (e.g., to apply an exact reset).
//!
//! # Example
//!
//! ```rust
//! use rusty_neuron::stepper::integrate;
//!
//! // dr/dt = -r, r(0) = 1, integrated over [0, 1] with dt = 0.5
//! let trajectory = integrate(|r, _| -r, |_, _| 0.0, 0.5, 1.0, 0.0, 1.0).unwrap();
//! assert_eq!(trajectory, vec![1.0, 0.5, 0.25]);
//! ```
use crate::error::SimError;
use crate::neuron::Dynamics;
use crate::{MAX_STEPS, TIME_RESOLUTION};

/// Returns the state after one explicit Euler step of size `dt`.
pub fn euler_step<F>(derivative: F, state: f64, input: f64, dt: f64) -> f64
where
    F: Fn(f64, f64) -> f64,
{
    state + dt * derivative(state, input)
}

/// Check the step size and the integration bounds, and that they take at most [`MAX_STEPS`] steps.
pub fn check_bounds(dt: f64, start: f64, end: f64) -> Result<(), SimError> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "the step size must be strictly positive and finite, got {}",
            dt
        )));
    }
    if !(start.is_finite() && end.is_finite()) || start >= end {
        return Err(SimError::InvalidParameter(format!(
            "the simulation interval [{}, {}] must be finite and non-empty",
            start, end
        )));
    }
    let ratio = (end - start) / dt;
    if !(ratio.is_finite() && ratio <= MAX_STEPS as f64) {
        return Err(SimError::InvalidParameter(format!(
            "the step size {} is too small for the interval [{}, {}], at most {} steps are allowed",
            dt, start, end, MAX_STEPS
        )));
    }
    Ok(())
}

/// Returns the nearest integer to `ratio` if it is within rounding error of it, and `ratio` itself otherwise.
/// The gap allowed is `TIME_RESOLUTION`, or a few ulps for large ratios.
pub(crate) fn snap(ratio: f64) -> f64 {
    let k = ratio.round();
    if (ratio - k).abs() <= TIME_RESOLUTION.max(4.0 * f64::EPSILON * k.abs()) {
        k
    } else {
        ratio
    }
}

/// Returns the number of whole steps of size `dt` fitting in `[start, end]`, i.e., `floor((end - start) / dt)`.
/// Ratios within rounding error of an integer are snapped to it first, so that `0.9 / 0.3` counts 3 steps.
pub fn num_steps(dt: f64, start: f64, end: f64) -> usize {
    snap((end - start) / dt).floor() as usize
}

/// Integrate `derivative` over the closed interval `[start, end]` with step size `dt`.
///
/// The input is queried as `input(i, t)` before the `i`-th step, with `t = start + i * dt`.
/// The returned trajectory has `floor((end - start) / dt) + 1` points and starts at `initial`.
/// The function returns an error for a non-positive step size or an empty interval, before any stepping.
pub fn integrate<F, I>(
    derivative: F,
    mut input: I,
    dt: f64,
    initial: f64,
    start: f64,
    end: f64,
) -> Result<Vec<f64>, SimError>
where
    F: Fn(f64, f64) -> f64,
    I: FnMut(usize, f64) -> f64,
{
    check_bounds(dt, start, end)?;
    let n = num_steps(dt, start, end);

    let mut trajectory = Vec::with_capacity(n + 1);
    trajectory.push(initial);
    let mut state = initial;
    for i in 0..n {
        let t = start + i as f64 * dt;
        state = euler_step(&derivative, state, input(i, t), dt);
        trajectory.push(state);
    }
    Ok(trajectory)
}

/// Integrate the dynamics of a model over the closed interval `[start, end]`.
/// Same contract as [`integrate`], except that each step goes through [`Dynamics::step`].
pub fn integrate_model<D, I>(
    model: &D,
    mut input: I,
    dt: f64,
    initial: f64,
    start: f64,
    end: f64,
) -> Result<Vec<f64>, SimError>
where
    D: Dynamics + ?Sized,
    I: FnMut(usize, f64) -> f64,
{
    check_bounds(dt, start, end)?;
    let n = num_steps(dt, start, end);

    let mut trajectory = Vec::with_capacity(n + 1);
    trajectory.push(initial);
    let mut state = initial;
    for i in 0..n {
        let t = start + i as f64 * dt;
        state = model.step(state, input(i, t), dt);
        trajectory.push(state);
    }
    Ok(trajectory)
}
