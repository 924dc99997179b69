use ops_analytics::{
    Activity, AnalysisConfig, CrashTermination, CrashingAnalysis, CrashingConfig,
    CrashingParameters, analyze_crashing, analyze_crashing_with_config,
};

fn two_in_series() -> Vec<Activity> {
    vec![
        Activity::new("A", 5.0, 100.0).with_crash(3.0, 300.0),
        Activity::new("B", 3.0, 50.0)
            .with_predecessors(["A"])
            .with_crash(1.5, 125.0),
    ]
}

fn durations(analysis: &CrashingAnalysis) -> Vec<f64> {
    analysis.steps.iter().map(|s| s.project_duration()).collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn series_network_crashes_to_its_minimum() {
    let analysis = analyze_crashing(&two_in_series(), &CrashingParameters::default()).unwrap();

    assert_eq!(analysis.initial_duration, 8.0);
    assert_eq!(durations(&analysis), vec![8.0, 7.0, 6.5, 5.5, 4.5]);
    assert_close(analysis.minimum_duration, 4.5);
    assert_eq!(
        analysis.termination,
        CrashTermination::NoCompressibleCriticalActivity
    );

    let crashed: Vec<Option<&str>> = analysis
        .steps
        .iter()
        .map(|s| s.crashed_activity.as_deref())
        .collect();
    assert_eq!(crashed, vec![None, Some("B"), Some("B"), Some("A"), Some("A")]);
    assert_eq!(analysis.steps[2].compressed_by, 0.5);

    let costs: Vec<f64> = analysis.steps.iter().map(|s| s.cost.activity_cost).collect();
    assert_eq!(costs, vec![150.0, 200.0, 225.0, 325.0, 425.0]);
    assert_eq!(analysis.steps[0].critical_path, vec!["A", "B"]);
}

#[test]
fn crashing_respects_crash_time_floors() {
    let analysis = analyze_crashing(&two_in_series(), &CrashingParameters::default()).unwrap();
    for node in &analysis.activities {
        assert!(node.current_duration >= node.crash_time);
    }
    let a = analysis.activities.iter().find(|n| n.id == "A").unwrap();
    let b = analysis.activities.iter().find(|n| n.id == "B").unwrap();
    assert_eq!(a.current_duration, 3.0);
    assert_eq!(b.current_duration, 1.5);
}

#[test]
fn fixed_cost_moves_the_optimum_inside_the_curve() {
    let params = CrashingParameters::new(80.0, 0.0, 0.0);
    let analysis = analyze_crashing(&two_in_series(), &params).unwrap();

    let totals: Vec<f64> = analysis.steps.iter().map(|s| s.total_cost()).collect();
    assert_eq!(totals, vec![790.0, 760.0, 745.0, 765.0, 785.0]);
    assert_close(analysis.optimal_time, 6.5);
    assert_close(analysis.optimal_cost, 745.0);

    let min_total = totals.iter().copied().fold(f64::INFINITY, f64::min);
    assert_eq!(analysis.optimal_cost, min_total);
}

#[test]
fn penalty_applies_only_past_its_threshold() {
    let params = CrashingParameters::new(0.0, 300.0, 6.0);
    let analysis = analyze_crashing(&two_in_series(), &params).unwrap();

    let penalties: Vec<f64> = analysis.steps.iter().map(|s| s.cost.penalty_cost).collect();
    assert_eq!(penalties, vec![600.0, 300.0, 150.0, 0.0, 0.0]);
    assert_close(analysis.optimal_time, 5.5);
    assert_close(analysis.optimal_cost, 325.0);
}

#[test]
fn parallel_paths_record_wasted_compressions() {
    let activities = vec![
        Activity::new("A", 5.0, 0.0).with_crash(3.0, 20.0),
        Activity::new("B", 5.0, 0.0).with_crash(4.0, 20.0),
    ];
    let analysis = analyze_crashing(&activities, &CrashingParameters::default()).unwrap();

    assert_eq!(durations(&analysis), vec![5.0, 5.0, 4.0, 4.0]);
    assert_eq!(analysis.minimum_duration, 4.0);
    let costs: Vec<f64> = analysis.steps.iter().map(|s| s.cost.activity_cost).collect();
    assert_eq!(costs, vec![0.0, 10.0, 30.0, 40.0]);

    // Non-increasing cost curve durations
    for pair in analysis.steps.windows(2) {
        assert!(pair[1].project_duration() <= pair[0].project_duration());
    }
}

#[test]
fn stalls_are_bounded_by_the_configured_limit() {
    let activities = vec![
        Activity::new("A", 5.0, 0.0).with_crash(3.0, 20.0),
        Activity::new("B", 5.0, 0.0).with_crash(3.0, 40.0),
        Activity::new("C", 5.0, 0.0).with_crash(3.0, 60.0),
    ];

    let unbounded = analyze_crashing(&activities, &CrashingParameters::default()).unwrap();
    assert_eq!(durations(&unbounded), vec![5.0, 5.0, 5.0, 4.0, 4.0, 4.0, 3.0]);
    assert_eq!(
        unbounded.termination,
        CrashTermination::NoCompressibleCriticalActivity
    );

    let config = AnalysisConfig {
        crashing: CrashingConfig {
            stall_limit: Some(1),
            ..CrashingConfig::default()
        },
        ..AnalysisConfig::default()
    };
    let bounded =
        analyze_crashing_with_config(&activities, &CrashingParameters::default(), config).unwrap();
    assert_eq!(durations(&bounded), vec![5.0, 5.0]);
    assert_eq!(bounded.termination, CrashTermination::Stalled);
}

#[test]
fn equal_costs_break_ties_by_id() {
    let activities = vec![
        Activity::new("Z", 4.0, 0.0).with_crash(2.0, 20.0),
        Activity::new("M", 1.0, 0.0),
        Activity::new("A", 3.0, 0.0)
            .with_predecessors(["M"])
            .with_crash(1.0, 20.0),
    ];
    let analysis = analyze_crashing(&activities, &CrashingParameters::default()).unwrap();
    assert_eq!(analysis.steps[1].crashed_activity.as_deref(), Some("A"));
}

#[test]
fn zero_cost_compression_is_a_finite_candidate() {
    let activities = vec![Activity::new("A", 3.0, 10.0).with_crash(1.0, 10.0)];
    let analysis = analyze_crashing(&activities, &CrashingParameters::default()).unwrap();
    assert_eq!(durations(&analysis), vec![3.0, 2.0, 1.0]);
    assert_eq!(analysis.optimal_time, 3.0);
    assert_eq!(analysis.optimal_cost, 10.0);
}

#[test]
fn smaller_steps_trace_a_finer_curve() {
    let config = AnalysisConfig {
        crashing: CrashingConfig {
            step_size: 0.5,
            iteration_factor: 1,
            stall_limit: None,
        },
        ..AnalysisConfig::default()
    };
    // Limit is max(1 * 1, ceil(2 / 0.5)) = 4 steps, exactly what the run needs
    let activities = vec![Activity::new("A", 4.0, 0.0).with_crash(2.0, 40.0)];
    let analysis =
        analyze_crashing_with_config(&activities, &CrashingParameters::default(), config).unwrap();
    assert_eq!(durations(&analysis), vec![4.0, 3.5, 3.0, 2.5, 2.0]);
    assert_eq!(
        analysis.termination,
        CrashTermination::NoCompressibleCriticalActivity
    );
    assert_eq!(analysis.steps[4].cost.activity_cost, 40.0);
}

#[test]
fn cost_at_duration_uses_the_cheapest_feasible_step() {
    let params = CrashingParameters::new(80.0, 0.0, 0.0);
    let analysis = analyze_crashing(&two_in_series(), &params).unwrap();

    let at_six = analysis.cost_at_duration(6.0).unwrap();
    assert_eq!(at_six.activity_cost, 325.0);
    assert_eq!(at_six.fixed_cost, 480.0);
    assert_eq!(at_six.total_cost, 805.0);

    let at_eight = analysis.cost_at_duration(8.0).unwrap();
    assert_eq!(at_eight.activity_cost, 150.0);
    assert!(analysis.cost_at_duration(4.0).is_none());
}
