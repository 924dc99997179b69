//! Spreadsheet formula annotations for decision results.
//!
//! Purely presentational: values are copied from a [`DecisionAnalysis`] and
//! paired with the sheet formula that would reproduce them under a given
//! [`SheetLayout`]. Nothing here feeds back into the numeric model.

use crate::decision::DecisionAnalysis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaCell {
    pub value: f64,
    pub formula: String,
}

impl FormulaCell {
    fn new(value: f64, formula: String) -> Self {
        Self { value, formula }
    }
}

/// Where each block of the decision sheet lives. Rows are 1-based, columns 0-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SheetLayout {
    pub decision_column: usize,
    pub first_state_column: usize,
    pub first_decision_row: usize,
    pub demand_header_row: usize,
    pub probability_row: usize,
    pub price_cell: String,
    pub cost_cell: String,
    pub shortage_cell: String,
    pub best_payoff_row: usize,
    pub first_regret_row: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            decision_column: 0,
            first_state_column: 1,
            first_decision_row: 9,
            demand_header_row: 8,
            probability_row: 7,
            price_cell: "$B$2".to_string(),
            cost_cell: "$B$3".to_string(),
            shortage_cell: "$B$4".to_string(),
            best_payoff_row: 12,
            first_regret_row: 15,
        }
    }
}

impl SheetLayout {
    fn state_column(&self, state: usize) -> String {
        column_letter(self.first_state_column + state)
    }

    fn decision_row(&self, decision: usize) -> usize {
        self.first_decision_row + decision
    }

    fn state_span(&self, states: usize) -> (String, String) {
        (
            self.state_column(0),
            self.state_column(states.saturating_sub(1)),
        )
    }
}

/// Column index to sheet letters: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionFormulas {
    pub payoff: Vec<Vec<FormulaCell>>,
    pub expected_values: Vec<FormulaCell>,
    pub expected_value_with_perfect_information: FormulaCell,
    pub regret: Vec<Vec<FormulaCell>>,
    pub max_regrets: Vec<FormulaCell>,
}

impl DecisionFormulas {
    pub fn annotate(analysis: &DecisionAnalysis, layout: &SheetLayout) -> Self {
        let state_count = analysis.states.len();
        let decision_col = column_letter(layout.decision_column);
        let (first_col, last_col) = layout.state_span(state_count);
        let probabilities = format!(
            "${first_col}${row}:${last_col}${row}",
            row = layout.probability_row
        );

        let payoff = analysis
            .payoff
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let q = format!("${decision_col}{}", layout.decision_row(r));
                row.iter()
                    .enumerate()
                    .map(|(c, &value)| {
                        let d = format!("{}${}", layout.state_column(c), layout.demand_header_row);
                        FormulaCell::new(
                            value,
                            format!(
                                "=MIN({q}, {d})*{price} - {q}*{cost} - MAX(0, {d}-{q})*{shortage}",
                                price = layout.price_cell,
                                cost = layout.cost_cell,
                                shortage = layout.shortage_cell,
                            ),
                        )
                    })
                    .collect()
            })
            .collect();

        let expected_values = analysis
            .expected_values
            .iter()
            .enumerate()
            .map(|(r, &value)| {
                let row = layout.decision_row(r);
                FormulaCell::new(
                    value,
                    format!("=SUMPRODUCT({first_col}{row}:{last_col}{row}, {probabilities})"),
                )
            })
            .collect();

        let expected_value_with_perfect_information = FormulaCell::new(
            analysis.expected_value_with_perfect_information,
            format!(
                "=SUMPRODUCT({probabilities}, {first_col}{row}:{last_col}{row})",
                row = layout.best_payoff_row
            ),
        );

        let regret = analysis
            .regret
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, &value)| {
                        let col = layout.state_column(c);
                        FormulaCell::new(
                            value,
                            format!(
                                "={col}${best} - {col}{pay}",
                                best = layout.best_payoff_row,
                                pay = layout.decision_row(r)
                            ),
                        )
                    })
                    .collect()
            })
            .collect();

        let max_regrets = analysis
            .max_regrets
            .iter()
            .enumerate()
            .map(|(r, &value)| {
                let row = layout.first_regret_row + r;
                FormulaCell::new(value, format!("=MAX({first_col}{row}:{last_col}{row})"))
            })
            .collect();

        Self {
            payoff,
            expected_values,
            expected_value_with_perfect_information,
            regret,
            max_regrets,
        }
    }
}
