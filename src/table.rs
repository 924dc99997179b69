//! Tabular views of analysis results as polars frames, plus a plain-text renderer.

use crate::activity::ActivityNode;
use crate::crashing::CrashStep;
use crate::decision::DecisionAnalysis;
use crate::queuing::StateProbability;
use polars::prelude::*;
use std::collections::HashSet;

pub fn activities_frame(activities: &[ActivityNode]) -> PolarsResult<DataFrame> {
    let ids: Vec<String> = activities.iter().map(|a| a.id.clone()).collect();
    let preds: Vec<String> = activities.iter().map(|a| a.predecessors.join(",")).collect();
    let durations: Vec<f64> = activities.iter().map(|a| a.current_duration).collect();
    let expected: Vec<f64> = activities.iter().map(|a| a.expected_duration).collect();
    let variance: Vec<f64> = activities.iter().map(|a| a.variance).collect();
    let es: Vec<f64> = activities.iter().map(|a| a.earliest_start).collect();
    let ef: Vec<f64> = activities.iter().map(|a| a.earliest_finish).collect();
    let ls: Vec<f64> = activities.iter().map(|a| a.latest_start).collect();
    let lf: Vec<f64> = activities.iter().map(|a| a.latest_finish).collect();
    let slack: Vec<f64> = activities.iter().map(|a| a.slack).collect();
    let cpu: Vec<Option<f64>> = activities
        .iter()
        .map(|a| a.cost_per_unit_compression)
        .collect();
    let critical: Vec<bool> = activities.iter().map(|a| a.is_critical).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("predecessors"), preds).into_column(),
        Series::new(PlSmallStr::from_static("duration"), durations).into_column(),
        Series::new(PlSmallStr::from_static("expected"), expected).into_column(),
        Series::new(PlSmallStr::from_static("variance"), variance).into_column(),
        Series::new(PlSmallStr::from_static("es"), es).into_column(),
        Series::new(PlSmallStr::from_static("ef"), ef).into_column(),
        Series::new(PlSmallStr::from_static("ls"), ls).into_column(),
        Series::new(PlSmallStr::from_static("lf"), lf).into_column(),
        Series::new(PlSmallStr::from_static("slack"), slack).into_column(),
        Series::new(PlSmallStr::from_static("cost_per_unit"), cpu).into_column(),
        Series::new(PlSmallStr::from_static("critical"), critical).into_column(),
    ])
}

/// Rows of an activity frame whose `critical` flag is set.
pub fn critical_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.clone().lazy().filter(col("critical")).collect()
}

pub fn crash_steps_frame(steps: &[CrashStep]) -> PolarsResult<DataFrame> {
    let step: Vec<u32> = (0..steps.len() as u32).collect();
    let crashed: Vec<Option<String>> = steps.iter().map(|s| s.crashed_activity.clone()).collect();
    let by: Vec<f64> = steps.iter().map(|s| s.compressed_by).collect();
    let duration: Vec<f64> = steps.iter().map(|s| s.cost.project_duration).collect();
    let activity_cost: Vec<f64> = steps.iter().map(|s| s.cost.activity_cost).collect();
    let fixed: Vec<f64> = steps.iter().map(|s| s.cost.fixed_cost).collect();
    let penalty: Vec<f64> = steps.iter().map(|s| s.cost.penalty_cost).collect();
    let total: Vec<f64> = steps.iter().map(|s| s.cost.total_cost).collect();
    let path: Vec<String> = steps.iter().map(|s| s.critical_path.join("->")).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("step"), step).into_column(),
        Series::new(PlSmallStr::from_static("crashed"), crashed).into_column(),
        Series::new(PlSmallStr::from_static("compressed_by"), by).into_column(),
        Series::new(PlSmallStr::from_static("duration"), duration).into_column(),
        Series::new(PlSmallStr::from_static("activity_cost"), activity_cost).into_column(),
        Series::new(PlSmallStr::from_static("fixed_cost"), fixed).into_column(),
        Series::new(PlSmallStr::from_static("penalty_cost"), penalty).into_column(),
        Series::new(PlSmallStr::from_static("total_cost"), total).into_column(),
        Series::new(PlSmallStr::from_static("critical_path"), path).into_column(),
    ])
}

pub fn queue_distribution_frame(distribution: &[StateProbability]) -> PolarsResult<DataFrame> {
    let n: Vec<u32> = distribution.iter().map(|p| p.n as u32).collect();
    let pn: Vec<f64> = distribution.iter().map(|p| p.probability).collect();
    let cumulative: Vec<f64> = distribution.iter().map(|p| p.cumulative).collect();
    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("n"), n).into_column(),
        Series::new(PlSmallStr::from_static("p_n"), pn).into_column(),
        Series::new(PlSmallStr::from_static("cumulative"), cumulative).into_column(),
    ])
}

/// Payoff matrix with expected value per decision.
pub fn payoff_frame(analysis: &DecisionAnalysis) -> PolarsResult<DataFrame> {
    matrix_frame(analysis, &analysis.payoff, "expected_value", &analysis.expected_values)
}

/// Regret matrix with the worst regret per decision.
pub fn regret_frame(analysis: &DecisionAnalysis) -> PolarsResult<DataFrame> {
    matrix_frame(analysis, &analysis.regret, "max_regret", &analysis.max_regrets)
}

fn matrix_frame(
    analysis: &DecisionAnalysis,
    matrix: &[Vec<f64>],
    summary_name: &str,
    summary: &[f64],
) -> PolarsResult<DataFrame> {
    let mut columns = Vec::with_capacity(analysis.states.len() + 2);
    columns.push(
        Series::new(PlSmallStr::from_static("decision"), analysis.decisions.clone()).into_column(),
    );
    let mut taken: HashSet<String> = ["decision", summary_name]
        .into_iter()
        .map(str::to_string)
        .collect();
    for (c, state) in analysis.states.iter().enumerate() {
        let values: Vec<f64> = matrix.iter().map(|row| row[c]).collect();
        let name = state_column_name(&state.label(), c, &mut taken);
        columns.push(Series::new(name.into(), values).into_column());
    }
    columns.push(Series::new(summary_name.into(), summary.to_vec()).into_column());
    DataFrame::new(columns)
}

/// The state label, suffixed with its 1-based position while it clashes.
fn state_column_name(label: &str, position: usize, taken: &mut HashSet<String>) -> String {
    let mut name = label.to_string();
    let mut suffix = position + 1;
    while taken.contains(&name) {
        name = format!("{label}_{suffix}");
        suffix += 1;
    }
    taken.insert(name.clone());
    name
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float64(v) => format!("{v:.4}"),
        AnyValue::Float32(v) => format!("{v:.4}"),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Boolean(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Boxed ASCII table with padded columns.
pub fn render_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cells: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &col_names, &widths);
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_row(out: &mut String, values: &[String], widths: &[usize]) {
    out.push('|');
    for (s, w) in values.iter().zip(widths) {
        out.push(' ');
        out.push_str(s);
        out.push_str(&" ".repeat(w.saturating_sub(s.len())));
        out.push_str(" |");
    }
    out.push('\n');
}
