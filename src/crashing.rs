//! Greedy time-cost tradeoff.
//!
//! Each step compresses the cheapest compressible critical activity by at
//! most one step size and reschedules the whole network. Every step is kept,
//! including compressions that a parallel critical path absorbed, so the cost
//! curve stays complete. The optimum is the cheapest recorded step.

use crate::activity::{Activity, ActivityNode, COMPRESSION_EPSILON, DegenerateInputWarning};
use crate::config::AnalysisConfig;
use crate::error::AnalysisResult;
use crate::graph::ActivityDag;
use crate::schedule::{DurationSelector, schedule};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Project-level cost model applied on top of the activity costs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrashingParameters {
    /// Indirect cost per unit of project duration.
    pub fixed_cost_per_unit: f64,
    /// Penalty per unit of duration beyond `penalty_starts_after`.
    pub penalty_cost_per_unit: f64,
    pub penalty_starts_after: f64,
}

impl CrashingParameters {
    pub fn new(
        fixed_cost_per_unit: f64,
        penalty_cost_per_unit: f64,
        penalty_starts_after: f64,
    ) -> Self {
        Self {
            fixed_cost_per_unit,
            penalty_cost_per_unit,
            penalty_starts_after,
        }
    }

    pub fn cost_at(&self, project_duration: f64, activity_cost: f64) -> CostBreakdown {
        let fixed_cost = self.fixed_cost_per_unit * project_duration;
        let penalty_cost =
            self.penalty_cost_per_unit * (project_duration - self.penalty_starts_after).max(0.0);
        CostBreakdown {
            project_duration,
            activity_cost,
            fixed_cost,
            penalty_cost,
            total_cost: activity_cost + fixed_cost + penalty_cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub project_duration: f64,
    pub activity_cost: f64,
    pub fixed_cost: f64,
    pub penalty_cost: f64,
    pub total_cost: f64,
}

/// One point of the cost curve. Step 0 is the uncompressed network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashStep {
    #[serde(flatten)]
    pub cost: CostBreakdown,
    pub crashed_activity: Option<String>,
    pub compressed_by: f64,
    pub critical_path: Vec<String>,
}

impl CrashStep {
    pub fn project_duration(&self) -> f64 {
        self.cost.project_duration
    }

    pub fn total_cost(&self) -> f64 {
        self.cost.total_cost
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrashTermination {
    /// Every critical activity sits at its crash time.
    NoCompressibleCriticalActivity,
    NoFiniteCostCandidate,
    /// Too many consecutive compressions left the duration unchanged.
    Stalled,
    IterationLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashingAnalysis {
    pub parameters: CrashingParameters,
    pub steps: Vec<CrashStep>,
    pub initial_duration: f64,
    pub minimum_duration: f64,
    pub optimal_time: f64,
    pub optimal_cost: f64,
    pub termination: CrashTermination,
    /// Activity state after the last step.
    pub activities: Vec<ActivityNode>,
    pub warnings: Vec<DegenerateInputWarning>,
}

impl CrashingAnalysis {
    pub fn optimal_step(&self) -> Option<&CrashStep> {
        let mut best: Option<&CrashStep> = None;
        for step in &self.steps {
            // Strict comparison keeps the earliest of equal-cost steps
            if best.map_or(true, |current| step.total_cost() < current.total_cost()) {
                best = Some(step);
            }
        }
        best
    }

    /// Cheapest recorded way to finish within `target`, costed at `target`.
    pub fn cost_at_duration(&self, target: f64) -> Option<CostBreakdown> {
        if target < self.minimum_duration - COMPRESSION_EPSILON {
            return None;
        }
        self.steps
            .iter()
            .filter(|step| step.project_duration() <= target + COMPRESSION_EPSILON)
            .map(|step| step.cost.activity_cost)
            .min_by(f64::total_cmp)
            .map(|activity_cost| self.parameters.cost_at(target, activity_cost))
    }
}

pub fn analyze_crashing(
    activities: &[Activity],
    parameters: &CrashingParameters,
) -> AnalysisResult<CrashingAnalysis> {
    analyze_crashing_with_config(activities, parameters, AnalysisConfig::default())
}

pub fn analyze_crashing_with_config(
    activities: &[Activity],
    parameters: &CrashingParameters,
    config: AnalysisConfig,
) -> AnalysisResult<CrashingAnalysis> {
    let mut dag = ActivityDag::build_with_config(activities, config)?;

    let crashing = dag.config().crashing.clone();
    let step_size = crashing.effective_step_size();
    let stall_limit = crashing.effective_stall_limit(dag.len());
    let max_compressions: Vec<f64> = dag.activities().map(|node| node.max_compression).collect();
    let iteration_limit = crashing.iteration_limit(&max_compressions);

    let mut summary = schedule(&mut dag, DurationSelector::Current)?;
    let mut activity_cost: f64 = dag.activities().map(|node| node.normal_cost).sum();
    let initial_duration = summary.project_duration;

    let mut steps = vec![CrashStep {
        cost: parameters.cost_at(summary.project_duration, activity_cost),
        crashed_activity: None,
        compressed_by: 0.0,
        critical_path: summary.critical_path.clone(),
    }];

    let mut iterations = 0usize;
    let mut stalled = 0usize;
    let termination = loop {
        let candidates: Vec<&ActivityNode> = dag
            .activities()
            .filter(|node| node.is_critical && node.is_compressible())
            .collect();
        if candidates.is_empty() {
            break CrashTermination::NoCompressibleCriticalActivity;
        }

        // Cheapest first, then lexicographic id
        let chosen = candidates
            .into_iter()
            .filter_map(|node| {
                node.cost_per_unit_compression
                    .filter(|cost| cost.is_finite())
                    .map(|cost| (cost, node))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
        let (id, cost_per_unit, amount) = match chosen {
            Some((cost, node)) => (
                node.id.clone(),
                cost,
                step_size.min(node.remaining_compression()),
            ),
            None => break CrashTermination::NoFiniteCostCandidate,
        };
        if iterations >= iteration_limit {
            warn!(iteration_limit, "crashing stopped at the iteration limit");
            break CrashTermination::IterationLimit;
        }

        if let Some(node) = dag.activity_mut(&id) {
            node.current_duration = (node.current_duration - amount).max(node.crash_time);
        }
        activity_cost += cost_per_unit * amount;
        iterations += 1;

        let previous_duration = summary.project_duration;
        summary = schedule(&mut dag, DurationSelector::Current)?;
        let step = CrashStep {
            cost: parameters.cost_at(summary.project_duration, activity_cost),
            crashed_activity: Some(id.clone()),
            compressed_by: amount,
            critical_path: summary.critical_path.clone(),
        };
        debug!(
            activity = %id,
            amount,
            duration = step.project_duration(),
            total_cost = step.total_cost(),
            "crash step"
        );
        steps.push(step);

        if summary.project_duration < previous_duration - COMPRESSION_EPSILON {
            stalled = 0;
        } else {
            stalled += 1;
            debug!(activity = %id, stalled, "compression did not shorten the project");
            if stalled >= stall_limit {
                break CrashTermination::Stalled;
            }
        }
    };

    let minimum_duration = steps
        .iter()
        .map(CrashStep::project_duration)
        .fold(initial_duration, f64::min);

    let mut analysis = CrashingAnalysis {
        parameters: *parameters,
        steps,
        initial_duration,
        minimum_duration,
        optimal_time: initial_duration,
        optimal_cost: 0.0,
        termination,
        activities: dag.to_activity_nodes(),
        warnings: dag.warnings().to_vec(),
    };
    if let Some((time, cost)) = analysis
        .optimal_step()
        .map(|best| (best.project_duration(), best.total_cost()))
    {
        analysis.optimal_time = time;
        analysis.optimal_cost = cost;
    }

    info!(
        steps = analysis.steps.len(),
        initial = analysis.initial_duration,
        minimum = analysis.minimum_duration,
        optimal_time = analysis.optimal_time,
        optimal_cost = analysis.optimal_cost,
        termination = ?analysis.termination,
        "crashing analysis complete"
    );
    Ok(analysis)
}
