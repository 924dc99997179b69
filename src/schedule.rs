use crate::calculations::{BackwardPass, ForwardPass};
use crate::error::AnalysisResult;
use crate::graph::{ActivityDag, DagNode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which duration field the passes read from each activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DurationSelector {
    #[default]
    Normal,
    Expected,
    Current,
}

impl DurationSelector {
    /// Anchors always have zero duration.
    pub fn duration_of(&self, node: &DagNode) -> f64 {
        match node {
            DagNode::Start | DagNode::End => 0.0,
            DagNode::Activity(activity) => match self {
                DurationSelector::Normal => activity.normal_time,
                DurationSelector::Expected => activity.expected_duration,
                DurationSelector::Current => activity.current_duration,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub activity_count: usize,
    pub critical_count: usize,
    pub project_duration: f64,
    pub critical_path: Vec<String>,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("activities={}", self.activity_count));
        parts.push(format!("critical={}", self.critical_count));
        parts.push(format!("duration={:.4}", self.project_duration));
        if !self.critical_path.is_empty() {
            parts.push(format!("crit_path={}", self.critical_path.join("->")));
        }
        parts.join(", ")
    }
}

/// Runs both passes and writes the schedule fields back onto every activity.
///
/// Safe to call repeatedly: each run recomputes everything from the selected
/// durations, so mutating `current_duration` between calls is expected.
pub fn schedule(dag: &mut ActivityDag, selector: DurationSelector) -> AnalysisResult<ScheduleSummary> {
    let order = dag.topological_order()?;

    let early = ForwardPass::new(dag, selector).execute(&order);
    let project_duration = early.get(&dag.end()).map(|&(_, ef)| ef).unwrap_or(0.0);
    let late = BackwardPass::new(dag, selector).execute(&order, project_duration);

    let tolerance = dag.config().critical_tolerance;
    let indices = dag.activity_indices().to_vec();
    let mut critical: Vec<(f64, usize, String)> = Vec::new();

    for (position, node_ix) in indices.into_iter().enumerate() {
        let (es, ef) = early.get(&node_ix).copied().unwrap_or((0.0, 0.0));
        let (ls, lf) = late.get(&node_ix).copied().unwrap_or((es, ef));
        if let Some(node) = dag.activity_at_mut(node_ix) {
            node.earliest_start = es;
            node.earliest_finish = ef;
            node.latest_start = ls;
            node.latest_finish = lf;
            node.slack = ls - es;
            node.is_critical = (ls - es).abs() < tolerance || (lf - ef).abs() < tolerance;
            if node.is_critical {
                critical.push((es, position, node.id.clone()));
            }
        }
    }

    // Earliest start first, input order among equals
    critical.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let summary = ScheduleSummary {
        activity_count: dag.len(),
        critical_count: critical.len(),
        project_duration,
        critical_path: critical.into_iter().map(|(_, _, id)| id).collect(),
    };
    debug!(?selector, summary = %summary.to_cli_summary(), "schedule computed");
    Ok(summary)
}
