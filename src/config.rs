//! Tunables shared by the analyses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Slack magnitude below which an activity counts as critical.
    pub critical_tolerance: f64,
    /// Floor for the project standard deviation in probability queries.
    pub min_standard_deviation: f64,
    pub crashing: CrashingConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            critical_tolerance: 1e-9,
            min_standard_deviation: 1e-9,
            crashing: CrashingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrashingConfig {
    /// Largest compression applied to one activity per step.
    pub step_size: f64,
    /// Consecutive non-shortening compressions tolerated; `None` uses the activity count.
    pub stall_limit: Option<usize>,
    pub iteration_factor: usize,
}

impl Default for CrashingConfig {
    fn default() -> Self {
        Self {
            step_size: 1.0,
            stall_limit: None,
            iteration_factor: 10,
        }
    }
}

impl CrashingConfig {
    pub fn effective_step_size(&self) -> f64 {
        if self.step_size.is_finite() && self.step_size > 0.0 {
            self.step_size
        } else {
            1.0
        }
    }

    pub fn effective_stall_limit(&self, activity_count: usize) -> usize {
        self.stall_limit.unwrap_or(activity_count).max(1)
    }

    /// Upper bound on compression steps for a network.
    ///
    /// Every step compresses some activity by a full step or by its remainder,
    /// so the summed step counts already bound a terminating run.
    pub fn iteration_limit<'a, I>(&self, max_compressions: I) -> usize
    where
        I: IntoIterator<Item = &'a f64>,
    {
        let step = self.effective_step_size();
        let mut activity_count = 0usize;
        let mut compression_steps = 0usize;
        for amount in max_compressions {
            activity_count += 1;
            if *amount > 0.0 {
                compression_steps += (amount / step).ceil() as usize;
            }
        }
        (activity_count * self.iteration_factor).max(compression_steps)
    }
}
