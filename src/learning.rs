//! Per-epoch schedules for learning rates and neighborhood radii.
//!
//! Epochs are numbered from 1.

/// A value that varies with the training epoch.
pub trait Schedule: Send + Sync {
    /// Value at `epoch`.
    fn at(&self, epoch: usize) -> f64;
}

impl<F> Schedule for F
where
    F: Fn(usize) -> f64 + Send + Sync,
{
    fn at(&self, epoch: usize) -> f64 {
        self(epoch)
    }
}

/// The same value at every epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl Schedule for Constant {
    fn at(&self, _epoch: usize) -> f64 {
        self.0
    }
}

/// Geometric decay from `initial` at epoch 1 toward `final_value` at epoch
/// `epochs + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    /// Value at the first epoch.
    pub initial: f64,
    /// Asymptotic value after the last epoch.
    pub final_value: f64,
    /// Length of the schedule.
    pub epochs: usize,
}

impl ExponentialDecay {
    /// Creates a decay over `epochs` epochs.
    pub fn new(initial: f64, final_value: f64, epochs: usize) -> Self {
        Self {
            initial,
            final_value,
            epochs,
        }
    }
}

impl Schedule for ExponentialDecay {
    fn at(&self, epoch: usize) -> f64 {
        let t = epoch.saturating_sub(1) as f64 / self.epochs.max(1) as f64;
        self.initial * (self.final_value / self.initial).powf(t)
    }
}

/// Linear interpolation from `initial` at epoch 1 to `final_value` at epoch
/// `epochs`, constant afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDecay {
    /// Value at the first epoch.
    pub initial: f64,
    /// Value from the last epoch on.
    pub final_value: f64,
    /// Length of the schedule.
    pub epochs: usize,
}

impl Schedule for LinearDecay {
    fn at(&self, epoch: usize) -> f64 {
        if self.epochs <= 1 {
            return self.final_value;
        }
        let t = (epoch.saturating_sub(1) as f64 / (self.epochs - 1) as f64).min(1.0);
        self.initial + (self.final_value - self.initial) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        assert_eq!(Constant(0.6).at(1), 0.6);
        assert_eq!(Constant(0.6).at(1000), 0.6);
    }

    #[test]
    fn test_exponential_decay() {
        let decay = ExponentialDecay::new(0.1, 0.01, 100);
        assert!((decay.at(1) - 0.1).abs() < 1e-12);
        let last = decay.at(100);
        assert!(last < 0.1);
        assert!(last > 0.01);
        assert!((decay.at(101) - 0.01).abs() < 1e-12);
        assert!(decay.at(50) > decay.at(51));
    }

    #[test]
    fn test_linear_decay() {
        let decay = LinearDecay {
            initial: 1.0,
            final_value: 0.0,
            epochs: 5,
        };
        assert_eq!(decay.at(1), 1.0);
        assert_eq!(decay.at(3), 0.5);
        assert_eq!(decay.at(5), 0.0);
        assert_eq!(decay.at(9), 0.0);
    }

    #[test]
    fn test_closure() {
        let halving = |epoch: usize| 1.0 / (1u64 << epoch.min(63)) as f64;
        assert_eq!(halving.at(1), 0.5);
        assert_eq!(halving.at(2), 0.25);
    }
}
