use ops_analytics::formula::column_letter;
use ops_analytics::{
    DecisionFormulas, DecisionTable, DemandState, PayoffParameters, SheetLayout,
};

fn newsvendor() -> DecisionTable {
    DecisionTable::new(
        vec![5.0, 20.0, 40.0],
        vec![
            DemandState::new("low", 5.0, 0.2),
            DemandState::new("medium", 20.0, 0.5),
            DemandState::new("high", 40.0, 0.3),
        ],
        PayoffParameters {
            unit_price: 100.0,
            unit_cost: 20.0,
            shortage_penalty: 50.0,
        },
    )
    .unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn payoff_and_regret_matrices() {
    let analysis = newsvendor().evaluate().unwrap();

    assert_eq!(
        analysis.payoff,
        vec![
            vec![400.0, -350.0, -1350.0],
            vec![100.0, 1600.0, 600.0],
            vec![-300.0, 1200.0, 3200.0],
        ]
    );
    assert_eq!(analysis.best_payoff_per_state, vec![400.0, 1600.0, 3200.0]);
    assert_eq!(
        analysis.regret,
        vec![
            vec![0.0, 1950.0, 4550.0],
            vec![300.0, 0.0, 2600.0],
            vec![700.0, 400.0, 0.0],
        ]
    );
    assert_eq!(analysis.max_regrets, vec![4550.0, 2600.0, 700.0]);
}

#[test]
fn expected_value_selection() {
    let analysis = newsvendor().evaluate().unwrap();

    assert_close(analysis.expected_values[0], -500.0);
    assert_close(analysis.expected_values[1], 1000.0);
    assert_close(analysis.expected_values[2], 1500.0);
    assert_eq!(analysis.best_expected.index, 2);
    assert_eq!(analysis.best_expected.decision, 40.0);
    assert_close(analysis.best_expected.value, 1500.0);
}

#[test]
fn perfect_information_and_minimax() {
    let analysis = newsvendor().evaluate().unwrap();

    assert_close(analysis.expected_value_with_perfect_information, 1840.0);
    assert_close(analysis.value_of_perfect_information, 340.0);
    assert!(analysis.value_of_perfect_information >= 0.0);

    assert_eq!(analysis.minimax_regret.decision, 40.0);
    assert_eq!(analysis.minimax_regret.value, 700.0);
}

#[test]
fn formulas_follow_the_default_layout() {
    let analysis = newsvendor().evaluate().unwrap();
    let formulas = DecisionFormulas::annotate(&analysis, &SheetLayout::default());

    assert_eq!(
        formulas.payoff[0][0].formula,
        "=MIN($A9, B$8)*$B$2 - $A9*$B$3 - MAX(0, B$8-$A9)*$B$4"
    );
    assert_eq!(
        formulas.payoff[2][1].formula,
        "=MIN($A11, C$8)*$B$2 - $A11*$B$3 - MAX(0, C$8-$A11)*$B$4"
    );
    assert_eq!(formulas.payoff[2][1].value, 1200.0);
    assert_eq!(
        formulas.expected_values[1].formula,
        "=SUMPRODUCT(B10:D10, $B$7:$D$7)"
    );
    assert_eq!(
        formulas.expected_value_with_perfect_information.formula,
        "=SUMPRODUCT($B$7:$D$7, B12:D12)"
    );
    assert_eq!(formulas.regret[0][2].formula, "=D$12 - D9");
    assert_eq!(formulas.regret[0][2].value, 4550.0);
    assert_eq!(formulas.max_regrets[2].formula, "=MAX(B17:D17)");
}

#[test]
fn wide_tables_use_multi_letter_columns() {
    let states: Vec<DemandState> = (0..30)
        .map(|i| DemandState::new(format!("d{i}"), f64::from(i), 1.0 / 30.0))
        .collect();
    let table = DecisionTable::new(
        vec![10.0],
        states,
        PayoffParameters {
            unit_price: 5.0,
            unit_cost: 1.0,
            shortage_penalty: 0.0,
        },
    )
    .unwrap();
    let analysis = table.evaluate().unwrap();
    let formulas = DecisionFormulas::annotate(&analysis, &SheetLayout::default());

    let last = column_letter(30);
    assert_eq!(last, "AE");
    assert_eq!(
        formulas.expected_values[0].formula,
        format!("=SUMPRODUCT(B9:{last}9, $B$7:${last}$7)")
    );
}

#[test]
fn table_deserializes_short_field_names() {
    let json = r#"{
        "decisions": [5, 20],
        "demands": [{"name": "low", "value": 5, "prob": 0.4}, {"value": 20, "prob": 0.6}],
        "payoffs": {"price": 10, "cost": 4, "shortage": 1}
    }"#;
    let table: DecisionTable = serde_json::from_str(json).unwrap();
    assert_eq!(table.demand_states[1].label(), "20");
    assert_eq!(table.payoff.shortage_penalty, 1.0);
    assert!(table.evaluate().is_ok());
}
