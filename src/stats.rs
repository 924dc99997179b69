//! Normal-approximation helpers for project completion times.

use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

/// Abramowitz and Stegun 7.1.26, absolute error below 1.5e-7.
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal cumulative distribution function.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}

/// Completion time modelled as N(mean, standard_deviation²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionDistribution {
    pub mean: f64,
    pub standard_deviation: f64,
}

impl CompletionDistribution {
    /// `standard_deviation` is floored at `min_standard_deviation`.
    pub fn new(mean: f64, standard_deviation: f64, min_standard_deviation: f64) -> Self {
        Self {
            mean,
            standard_deviation: standard_deviation.max(min_standard_deviation),
        }
    }

    pub fn z_score(&self, target: f64) -> f64 {
        (target - self.mean) / self.standard_deviation
    }

    /// P(duration <= target)
    pub fn probability_at_most(&self, target: f64) -> f64 {
        normal_cdf(self.z_score(target))
    }

    /// P(duration >= target)
    pub fn probability_at_least(&self, target: f64) -> f64 {
        (1.0 - self.probability_at_most(target)).max(0.0)
    }

    /// P(lower <= duration <= upper), zero for an inverted range.
    pub fn probability_between(&self, lower: f64, upper: f64) -> f64 {
        (self.probability_at_most(upper) - self.probability_at_most(lower)).max(0.0)
    }

    /// P(duration <= lower or duration >= upper)
    pub fn probability_outside(&self, lower: f64, upper: f64) -> f64 {
        (self.probability_at_most(lower) + self.probability_at_least(upper)).clamp(0.0, 1.0)
    }

    /// Smallest deadline met with the given probability.
    ///
    /// Returns `None` unless `probability` lies strictly between 0 and 1.
    pub fn deadline_for_probability(&self, probability: f64) -> Option<f64> {
        if !(probability > 0.0 && probability < 1.0) {
            return None;
        }
        let mut low = self.mean - 10.0 * self.standard_deviation;
        let mut high = self.mean + 10.0 * self.standard_deviation;
        for _ in 0..200 {
            let mid = 0.5 * (low + high);
            if self.probability_at_most(mid) < probability {
                low = mid;
            } else {
                high = mid;
            }
        }
        Some(0.5 * (low + high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_matches_known_values() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.0) - 0.841_344_7).abs() < 1e-6);
        assert!((normal_cdf(-1.96) - 0.024_997_9).abs() < 1e-6);
        assert!((erf(-0.5) + erf(0.5)).abs() < 1e-12);
    }

    #[test]
    fn range_probabilities_are_consistent() {
        let dist = CompletionDistribution::new(10.0, 2.0, 1e-9);
        let inside = dist.probability_between(8.0, 12.0);
        let outside = dist.probability_outside(8.0, 12.0);
        assert!((inside + outside - 1.0).abs() < 1e-9);
        assert_eq!(dist.probability_between(12.0, 8.0), 0.0);
    }

    #[test]
    fn deterministic_duration_is_a_step() {
        let dist = CompletionDistribution::new(10.0, 0.0, 1e-9);
        assert_eq!(dist.standard_deviation, 1e-9);
        assert!(dist.probability_at_most(10.001) > 0.999_999);
        assert!(dist.probability_at_most(9.999) < 1e-6);
    }

    #[test]
    fn deadline_inverts_the_cdf() {
        let dist = CompletionDistribution::new(20.0, 3.0, 1e-9);
        let deadline = dist.deadline_for_probability(0.9).unwrap();
        assert!((dist.probability_at_most(deadline) - 0.9).abs() < 1e-6);
        assert!(dist.deadline_for_probability(1.0).is_none());
    }
}
