use crate::activity_validation::ValidationError;
use crate::error::AnalysisResult;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Allowed gap between the probability total and 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandState {
    #[serde(default)]
    pub name: String,
    pub value: f64,
    #[serde(alias = "prob")]
    pub probability: f64,
}

impl DemandState {
    pub fn new(name: impl Into<String>, value: f64, probability: f64) -> Self {
        Self {
            name: name.into(),
            value,
            probability,
        }
    }

    /// Name for messages and headers, the demand value when unnamed.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.value.to_string()
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffParameters {
    #[serde(alias = "price")]
    pub unit_price: f64,
    #[serde(alias = "cost")]
    pub unit_cost: f64,
    #[serde(alias = "shortage", default)]
    pub shortage_penalty: f64,
}

/// Order quantities against uncertain demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTable {
    pub decisions: Vec<f64>,
    #[serde(alias = "demands")]
    pub demand_states: Vec<DemandState>,
    #[serde(alias = "payoffs")]
    pub payoff: PayoffParameters,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionChoice {
    /// Row in the decision list.
    pub index: usize,
    pub decision: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionAnalysis {
    pub decisions: Vec<f64>,
    pub states: Vec<DemandState>,
    /// `payoff[decision][state]`
    pub payoff: Vec<Vec<f64>>,
    /// `regret[decision][state]`
    pub regret: Vec<Vec<f64>>,
    pub expected_values: Vec<f64>,
    pub max_regrets: Vec<f64>,
    pub best_payoff_per_state: Vec<f64>,
    pub best_expected: DecisionChoice,
    pub expected_value_with_perfect_information: f64,
    pub minimax_regret: DecisionChoice,
    pub value_of_perfect_information: f64,
}

impl DecisionTable {
    pub fn new(
        decisions: Vec<f64>,
        demand_states: Vec<DemandState>,
        payoff: PayoffParameters,
    ) -> AnalysisResult<Self> {
        let table = Self {
            decisions,
            demand_states,
            payoff,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.decisions.is_empty() || self.demand_states.is_empty() {
            return Err(ValidationError::EmptyDecisionTable);
        }
        if self.decisions.iter().any(|q| !q.is_finite()) {
            return Err(ValidationError::NonFiniteParameter { name: "decision" });
        }
        for (name, value) in [
            ("unit price", self.payoff.unit_price),
            ("unit cost", self.payoff.unit_cost),
            ("shortage penalty", self.payoff.shortage_penalty),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteParameter { name });
            }
        }

        let mut total = 0.0;
        for state in &self.demand_states {
            if !state.value.is_finite() {
                return Err(ValidationError::NonFiniteParameter { name: "demand" });
            }
            if !(0.0..=1.0).contains(&state.probability) {
                return Err(ValidationError::InvalidProbability {
                    state: state.label(),
                    probability: state.probability,
                });
            }
            total += state.probability;
        }
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(ValidationError::ProbabilitiesDoNotSumToOne { total });
        }
        Ok(())
    }

    /// Profit of ordering `quantity` when `demand` materialises.
    pub fn payoff(&self, quantity: f64, demand: f64) -> f64 {
        let sold = quantity.min(demand);
        let missed = (demand - quantity).max(0.0);
        sold * self.payoff.unit_price
            - quantity * self.payoff.unit_cost
            - missed * self.payoff.shortage_penalty
    }

    pub fn evaluate(&self) -> AnalysisResult<DecisionAnalysis> {
        self.validate()?;

        let payoff: Vec<Vec<f64>> = self
            .decisions
            .iter()
            .map(|&q| {
                self.demand_states
                    .iter()
                    .map(|state| self.payoff(q, state.value))
                    .collect()
            })
            .collect();

        let best_payoff_per_state: Vec<f64> = (0..self.demand_states.len())
            .map(|col| {
                payoff
                    .iter()
                    .map(|row| row[col])
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .collect();

        let expected_values: Vec<f64> = payoff
            .iter()
            .map(|row| self.weighted(row))
            .collect();
        let expected_value_with_perfect_information = self.weighted(&best_payoff_per_state);

        let regret: Vec<Vec<f64>> = payoff
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&best_payoff_per_state)
                    .map(|(cell, best)| best - cell)
                    .collect()
            })
            .collect();
        let max_regrets: Vec<f64> = regret
            .iter()
            .map(|row| row.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect();

        let best_expected = self.select(&expected_values, |candidate, best| candidate > best);
        let minimax_regret = self.select(&max_regrets, |candidate, best| candidate < best);
        let value_of_perfect_information =
            expected_value_with_perfect_information - best_expected.value;

        info!(
            decisions = self.decisions.len(),
            states = self.demand_states.len(),
            best = best_expected.decision,
            minimax = minimax_regret.decision,
            "decision table evaluated"
        );

        Ok(DecisionAnalysis {
            decisions: self.decisions.clone(),
            states: self.demand_states.clone(),
            payoff,
            regret,
            expected_values,
            max_regrets,
            best_payoff_per_state,
            best_expected,
            expected_value_with_perfect_information,
            minimax_regret,
            value_of_perfect_information,
        })
    }

    fn weighted(&self, row: &[f64]) -> f64 {
        row.iter()
            .zip(&self.demand_states)
            .map(|(value, state)| value * state.probability)
            .sum()
    }

    /// First decision whose value beats every earlier one under `better`.
    fn select(&self, values: &[f64], better: impl Fn(f64, f64) -> bool) -> DecisionChoice {
        let mut index = 0;
        for (candidate, &value) in values.iter().enumerate().skip(1) {
            if better(value, values[index]) {
                index = candidate;
            }
        }
        DecisionChoice {
            index,
            decision: self.decisions[index],
            value: values[index],
        }
    }
}
