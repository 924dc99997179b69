use ops_analytics::{
    ImportError, analyze_crashing, analyze_pert, load_activities_from_csv,
    load_activities_from_json, load_config_from_json, load_decision_table_from_json,
    load_project_from_json,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

#[test]
fn csv_sheet_feeds_the_crashing_analysis() {
    let file = temp_file(
        "id,predecessors,normalTime,normalCost,crashTime,crashCost\n\
         A,-,5,100,3,300\n\
         B,A,3,50,1.5,125\n",
    );
    let activities = load_activities_from_csv(file.path()).unwrap();
    assert_eq!(activities.len(), 2);
    assert!(activities[0].predecessors.is_empty());

    let analysis = analyze_crashing(&activities, &Default::default()).unwrap();
    assert_eq!(analysis.initial_duration, 8.0);
    assert_eq!(analysis.minimum_duration, 4.5);
}

#[test]
fn csv_accepts_quoted_predecessor_lists() {
    let file = temp_file(
        "id,predecessors,normalTime,a,m,b\n\
         A,,2,1,2,3\n\
         B,,1,,,\n\
         C,\"A, B\",4,2,4,6\n",
    );
    let activities = load_activities_from_csv(file.path()).unwrap();
    assert_eq!(activities[2].predecessors, vec!["A", "B"]);

    let pert = analyze_pert(&activities).unwrap();
    assert_eq!(pert.critical_path, vec!["A", "C"]);
    assert!((pert.project_duration - 6.0).abs() < 1e-12);
}

#[test]
fn empty_csv_is_invalid() {
    let file = temp_file("id,predecessors,normalTime\n");
    let err = load_activities_from_csv(file.path()).unwrap_err();
    assert!(matches!(err, ImportError::InvalidData(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_activities_from_csv("/definitely/not/here.csv").unwrap_err();
    assert!(matches!(err, ImportError::Io(_)));
}

#[test]
fn json_array_or_project_object() {
    let array = temp_file(
        r#"[{"id":"A","normalTime":2},{"id":"B","predecessors":"A","normalTime":3}]"#,
    );
    let activities = load_activities_from_json(array.path()).unwrap();
    assert_eq!(activities[1].predecessors, vec!["A"]);

    let project = temp_file(
        r#"{
            "activities": [{"id":"A","normalTime":5,"crashTime":3,"normalCost":100,"crashCost":300}],
            "crashing": {"fixedCostPerUnit": 80, "penaltyCostPerUnit": 10, "penaltyStartsAfter": 4}
        }"#,
    );
    let loaded = load_project_from_json(project.path()).unwrap();
    assert_eq!(loaded.activities.len(), 1);
    assert_eq!(loaded.crashing.fixed_cost_per_unit, 80.0);
    assert_eq!(loaded.crashing.penalty_starts_after, 4.0);
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let file = temp_file("{ not json");
    let err = load_project_from_json(file.path()).unwrap_err();
    assert!(matches!(err, ImportError::Serialization(_)));
}

#[test]
fn decision_table_and_config_files() {
    let table = temp_file(
        r#"{"decisions":[5,20,40],
            "demandStates":[{"name":"low","value":5,"probability":0.2},
                            {"name":"mid","value":20,"probability":0.5},
                            {"name":"high","value":40,"probability":0.3}],
            "payoff":{"unitPrice":100,"unitCost":20,"shortagePenalty":50}}"#,
    );
    let analysis = load_decision_table_from_json(table.path())
        .unwrap()
        .evaluate()
        .unwrap();
    assert_eq!(analysis.best_expected.decision, 40.0);

    let config = temp_file(r#"{"criticalTolerance":1e-6,"crashing":{"stepSize":0.5}}"#);
    let config = load_config_from_json(config.path()).unwrap();
    assert_eq!(config.critical_tolerance, 1e-6);
    assert_eq!(config.crashing.step_size, 0.5);
    assert_eq!(config.min_standard_deviation, 1e-9);
}
