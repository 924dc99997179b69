use crate::activity::{Activity, ActivityNode, DegenerateInputWarning};
use crate::config::AnalysisConfig;
use crate::error::AnalysisResult;
use crate::graph::ActivityDag;
use crate::schedule::{DurationSelector, schedule};
use crate::stats::CompletionDistribution;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Three-point estimate schedule plus the completion-time distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PertAnalysis {
    pub activities: Vec<ActivityNode>,
    pub critical_path: Vec<String>,
    pub project_duration: f64,
    pub project_variance: f64,
    /// Floored at the configured minimum.
    pub standard_deviation: f64,
    pub warnings: Vec<DegenerateInputWarning>,
}

impl PertAnalysis {
    pub fn distribution(&self) -> CompletionDistribution {
        // Already floored, so no further minimum applies
        CompletionDistribution::new(self.project_duration, self.standard_deviation, 0.0)
    }

    pub fn activity(&self, id: &str) -> Option<&ActivityNode> {
        self.activities.iter().find(|node| node.id == id)
    }

    pub fn probability_at_most(&self, target: f64) -> f64 {
        self.distribution().probability_at_most(target)
    }

    pub fn probability_at_least(&self, target: f64) -> f64 {
        self.distribution().probability_at_least(target)
    }

    pub fn probability_between(&self, lower: f64, upper: f64) -> f64 {
        self.distribution().probability_between(lower, upper)
    }

    pub fn probability_outside(&self, lower: f64, upper: f64) -> f64 {
        self.distribution().probability_outside(lower, upper)
    }

    pub fn deadline_for_probability(&self, probability: f64) -> Option<f64> {
        self.distribution().deadline_for_probability(probability)
    }
}

pub fn analyze_pert(activities: &[Activity]) -> AnalysisResult<PertAnalysis> {
    analyze_pert_with_config(activities, AnalysisConfig::default())
}

pub fn analyze_pert_with_config(
    activities: &[Activity],
    config: AnalysisConfig,
) -> AnalysisResult<PertAnalysis> {
    let min_standard_deviation = config.min_standard_deviation;
    let mut dag = ActivityDag::build_with_config(activities, config)?;
    let summary = schedule(&mut dag, DurationSelector::Expected)?;

    let project_variance: f64 = summary
        .critical_path
        .iter()
        .filter_map(|id| dag.activity(id))
        .map(|node| node.variance)
        .sum();
    let standard_deviation = project_variance.max(0.0).sqrt().max(min_standard_deviation);

    info!(
        activities = summary.activity_count,
        duration = summary.project_duration,
        variance = project_variance,
        "PERT analysis complete"
    );

    Ok(PertAnalysis {
        activities: dag.to_activity_nodes(),
        critical_path: summary.critical_path,
        project_duration: summary.project_duration,
        project_variance,
        standard_deviation,
        warnings: dag.warnings().to_vec(),
    })
}
