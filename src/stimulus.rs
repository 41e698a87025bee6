//! Deterministic square-pulse input current.
use serde::{Deserialize, Serialize};

use crate::error::{check_finite, SimError};
use crate::stepper::snap;

/// Represents a square pulse of current, switched on over `[onset, offset)`.
/// Times are measured from the start of the simulation.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct StimulusWindow {
    onset: f64,
    offset: f64,
    amplitude: f64,
}

impl StimulusWindow {
    /// Create a stimulus window with the specified parameters.
    /// The function returns an error for a negative onset, an empty window or non-finite values.
    pub fn build(onset: f64, offset: f64, amplitude: f64) -> Result<Self, SimError> {
        check_finite("the stimulus onset", onset)?;
        check_finite("the stimulus offset", offset)?;
        check_finite("the stimulus amplitude", amplitude)?;

        if onset < 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "the stimulus onset must be non-negative, got {}",
                onset
            )));
        }
        if onset >= offset {
            return Err(SimError::InvalidParameter(format!(
                "the stimulus onset ({}) must precede its offset ({})",
                onset, offset
            )));
        }

        Ok(StimulusWindow {
            onset,
            offset,
            amplitude,
        })
    }

    /// Returns the onset of the stimulus.
    pub fn onset(&self) -> f64 {
        self.onset
    }

    /// Returns the offset of the stimulus.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Returns the amplitude of the stimulus.
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Check that the window fits in a simulation of the given duration.
    pub fn check_duration(&self, duration: f64) -> Result<(), SimError> {
        if self.offset > duration {
            return Err(SimError::InvalidParameter(format!(
                "the stimulus offset ({}) exceeds the simulation duration ({})",
                self.offset, duration
            )));
        }
        Ok(())
    }

    /// Returns the current at the given step.
    /// The pulse covers the steps from `ceil(onset / dt)` up to `ceil(offset / dt)` excluded, after snapping both
    /// ratios to the nearest integer if within rounding error.
    pub fn value_at(&self, step: usize, dt: f64) -> f64 {
        let first = snap(self.onset / dt).ceil();
        let last = snap(self.offset / dt).ceil();
        let step = step as f64;
        if first <= step && step < last {
            self.amplitude
        } else {
            0.0
        }
    }

    /// Returns the current at each of the first `num_steps` steps.
    pub fn sample(&self, num_steps: usize, dt: f64) -> Vec<f64> {
        (0..num_steps).map(|i| self.value_at(i, dt)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build() {
        let stimulus = StimulusWindow::build(10.0, 50.0, 10.0).unwrap();
        assert_eq!(stimulus.onset(), 10.0);
        assert_eq!(stimulus.offset(), 50.0);
        assert_eq!(stimulus.amplitude(), 10.0);

        assert!(matches!(
            StimulusWindow::build(50.0, 10.0, 10.0),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            StimulusWindow::build(10.0, 10.0, 10.0),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            StimulusWindow::build(-1.0, 10.0, 10.0),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(matches!(
            StimulusWindow::build(0.0, 10.0, f64::NAN),
            Err(SimError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_windowing() {
        let stimulus = StimulusWindow::build(10.0, 50.0, 10.0).unwrap();
        let current = stimulus.sample(100, 1.0);

        assert_eq!(current.len(), 100);
        assert!(current[..10].iter().all(|&i| i == 0.0));
        assert!(current[10..50].iter().all(|&i| i == 10.0));
        assert!(current[50..].iter().all(|&i| i == 0.0));
    }

    #[test]
    fn test_window_edges_under_rounding() {
        // 3 * 0.3 and 6 * 0.3 both fall just short of 0.9 and 1.8
        let stimulus = StimulusWindow::build(0.9, 1.8, 2.0).unwrap();
        assert_eq!(stimulus.value_at(2, 0.3), 0.0);
        assert_eq!(stimulus.value_at(3, 0.3), 2.0);
        assert_eq!(stimulus.value_at(5, 0.3), 2.0);
        assert_eq!(stimulus.value_at(6, 0.3), 0.0);
        assert_eq!(stimulus.sample(8, 0.3), vec![0.0, 0.0, 0.0, 2.0, 2.0, 2.0, 0.0, 0.0]);

        // edges between two steps switch at the next one
        let stimulus = StimulusWindow::build(0.25, 0.55, 1.0).unwrap();
        assert_eq!(stimulus.sample(7, 0.1), vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_check_duration() {
        let stimulus = StimulusWindow::build(10.0, 50.0, 10.0).unwrap();
        assert_eq!(stimulus.check_duration(50.0), Ok(()));
        assert_eq!(stimulus.check_duration(100.0), Ok(()));
        assert!(matches!(
            stimulus.check_duration(40.0),
            Err(SimError::InvalidParameter(_))
        ));
    }
}
