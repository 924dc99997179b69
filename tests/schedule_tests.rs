use ops_analytics::calculations::{BackwardPass, ForwardPass};
use ops_analytics::{Activity, ActivityDag, DurationSelector, schedule};

fn network() -> Vec<Activity> {
    // A -> {B, C} -> D, plus E hanging off A
    vec![
        Activity::new("A", 2.0, 0.0),
        Activity::new("B", 3.0, 0.0).with_predecessors(["A"]),
        Activity::new("C", 1.0, 0.0).with_predecessors(["A"]),
        Activity::new("D", 2.0, 0.0).with_predecessors(["B", "C"]),
        Activity::new("E", 1.5, 0.0).with_predecessors(["A"]),
    ]
}

#[test]
fn forward_pass_sets_earliest_times() {
    let dag = ActivityDag::build(&network()).unwrap();
    let order = dag.topological_order().unwrap();
    let early = ForwardPass::new(&dag, DurationSelector::Normal).execute(&order);

    let at = |id: &str| {
        let ix = dag
            .activity_indices()
            .iter()
            .copied()
            .find(|&ix| dag.activity_at(ix).unwrap().id == id)
            .unwrap();
        early[&ix]
    };
    assert_eq!(at("A"), (0.0, 2.0));
    assert_eq!(at("B"), (2.0, 5.0));
    assert_eq!(at("C"), (2.0, 3.0));
    assert_eq!(at("D"), (5.0, 7.0));
    assert_eq!(early[&dag.start()], (0.0, 0.0));
    assert_eq!(early[&dag.end()], (7.0, 7.0));
}

#[test]
fn backward_pass_sets_latest_times() {
    let dag = ActivityDag::build(&network()).unwrap();
    let order = dag.topological_order().unwrap();
    let late = BackwardPass::new(&dag, DurationSelector::Normal).execute(&order, 7.0);

    let index_of = |id: &str| {
        dag.activity_indices()
            .iter()
            .copied()
            .find(|&ix| dag.activity_at(ix).unwrap().id == id)
            .unwrap()
    };
    assert_eq!(late[&index_of("D")], (5.0, 7.0));
    assert_eq!(late[&index_of("C")], (4.0, 5.0));
    assert_eq!(late[&index_of("E")], (5.5, 7.0));
    assert_eq!(late[&index_of("A")], (0.0, 2.0));
    assert_eq!(late[&dag.end()], (7.0, 7.0));
}

#[test]
fn schedule_writes_back_slack_and_critical_flags() {
    let mut dag = ActivityDag::build(&network()).unwrap();
    let summary = schedule(&mut dag, DurationSelector::Normal).unwrap();

    assert_eq!(summary.project_duration, 7.0);
    assert_eq!(summary.critical_path, vec!["A", "B", "D"]);
    assert_eq!(summary.critical_count, 3);
    assert_eq!(summary.activity_count, 5);

    for node in dag.activities() {
        assert!(node.earliest_start <= node.latest_start);
        assert!(node.earliest_finish <= node.latest_finish);
        assert!(node.earliest_finish <= summary.project_duration);
        if node.is_critical {
            assert!(node.slack.abs() < 1e-9, "{} should have zero slack", node.id);
        } else {
            assert!(node.slack > 0.0, "{} should have positive slack", node.id);
        }
    }
    assert_eq!(dag.activity("C").unwrap().slack, 2.0);
    assert_eq!(dag.activity("E").unwrap().slack, 3.5);
}

#[test]
fn parallel_critical_paths_keep_input_order_on_ties() {
    let activities = vec![
        Activity::new("X", 3.0, 0.0),
        Activity::new("W", 3.0, 0.0),
        Activity::new("Y", 1.0, 0.0).with_predecessors(["X", "W"]),
    ];
    let mut dag = ActivityDag::build(&activities).unwrap();
    let summary = schedule(&mut dag, DurationSelector::Normal).unwrap();
    assert_eq!(summary.critical_path, vec!["X", "W", "Y"]);
}

#[test]
fn fractional_durations_stay_critical_despite_rounding() {
    let activities = vec![
        Activity::new("A", 0.1, 0.0),
        Activity::new("B", 0.2, 0.0).with_predecessors(["A"]),
        Activity::new("C", 0.3, 0.0),
    ];
    let mut dag = ActivityDag::build(&activities).unwrap();
    let summary = schedule(&mut dag, DurationSelector::Normal).unwrap();
    // 0.1 + 0.2 and 0.3 differ in the last bit
    assert!(dag.activity("A").unwrap().is_critical);
    assert!(dag.activity("B").unwrap().is_critical);
    assert!(dag.activity("C").unwrap().is_critical);
    assert_eq!(summary.critical_count, 3);
}

#[test]
fn expected_selector_reads_three_point_means() {
    let activities = vec![
        Activity::new("A", 10.0, 0.0).with_estimates(1.0, 2.0, 3.0),
        Activity::new("B", 10.0, 0.0)
            .with_predecessors(["A"])
            .with_estimates(2.0, 3.0, 10.0),
    ];
    let mut dag = ActivityDag::build(&activities).unwrap();
    let normal = schedule(&mut dag, DurationSelector::Normal).unwrap();
    let expected = schedule(&mut dag, DurationSelector::Expected).unwrap();
    assert_eq!(normal.project_duration, 20.0);
    assert!((expected.project_duration - 6.0).abs() < 1e-12);
}
