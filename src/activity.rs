use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// Below this a compressible amount is treated as zero.
pub(crate) const COMPRESSION_EPSILON: f64 = 1e-9;

/// Raw activity record as supplied by the host sheet.
///
/// Optional crash fields fall back to the normal values; the three-point
/// estimate (`a`, `m`, `b`) is only used when all three are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_predecessors")]
    pub predecessors: Vec<String>,
    #[serde(default)]
    pub normal_time: f64,
    #[serde(default)]
    pub normal_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crash_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crash_cost: Option<f64>,
    #[serde(default, rename = "a", skip_serializing_if = "Option::is_none")]
    pub optimistic: Option<f64>,
    #[serde(default, rename = "m", skip_serializing_if = "Option::is_none")]
    pub most_likely: Option<f64>,
    #[serde(default, rename = "b", skip_serializing_if = "Option::is_none")]
    pub pessimistic: Option<f64>,
}

impl Activity {
    pub fn new(id: impl Into<String>, normal_time: f64, normal_cost: f64) -> Self {
        Self {
            id: id.into().trim().to_string(),
            predecessors: Vec::new(),
            normal_time,
            normal_cost,
            crash_time: None,
            crash_cost: None,
            optimistic: None,
            most_likely: None,
            pessimistic: None,
        }
    }

    pub fn with_predecessors<I, S>(mut self, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predecessors = predecessors
            .into_iter()
            .map(|pred| pred.into().trim().to_string())
            .collect();
        self
    }

    pub fn with_crash(mut self, crash_time: f64, crash_cost: f64) -> Self {
        self.crash_time = Some(crash_time);
        self.crash_cost = Some(crash_cost);
        self
    }

    pub fn with_estimates(mut self, optimistic: f64, most_likely: f64, pessimistic: f64) -> Self {
        self.optimistic = Some(optimistic);
        self.most_likely = Some(most_likely);
        self.pessimistic = Some(pessimistic);
        self
    }

    /// Numeric fields paired with their names, for finiteness checks.
    pub(crate) fn numeric_fields(&self) -> [(&'static str, Option<f64>); 7] {
        [
            ("normalTime", Some(self.normal_time)),
            ("normalCost", Some(self.normal_cost)),
            ("crashTime", self.crash_time),
            ("crashCost", self.crash_cost),
            ("a", self.optimistic),
            ("m", self.most_likely),
            ("b", self.pessimistic),
        ]
    }
}

/// Splits a predecessor cell such as `"A, B"`; blanks and `-` mean none.
pub fn parse_predecessors(text: &str) -> Vec<String> {
    let mut predecessors: Vec<String> = Vec::new();
    for part in text.split(',') {
        let id = part.trim();
        if id.is_empty() || id == "-" {
            continue;
        }
        if !predecessors.iter().any(|existing| existing == id) {
            predecessors.push(id.to_string());
        }
    }
    predecessors
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = String::deserialize(deserializer)?;
    Ok(id.trim().to_string())
}

fn deserialize_predecessors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPredecessors {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Option::<RawPredecessors>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(RawPredecessors::Text(text)) => parse_predecessors(&text),
        Some(RawPredecessors::List(items)) => parse_predecessors(&items.join(",")),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegenerateInput {
    NegativeValue { field: String, value: f64 },
    CrashTimeExceedsNormal { crash_time: f64, normal_time: f64 },
    CrashCostBelowNormal { crash_cost: f64, normal_cost: f64 },
    CrashPremiumWithoutCompression { crash_cost: f64, normal_cost: f64 },
    EstimatesOutOfOrder { a: f64, m: f64, b: f64 },
}

/// Inconsistent input that was clamped rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegenerateInputWarning {
    pub activity: String,
    pub issue: DegenerateInput,
}

impl fmt::Display for DegenerateInputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            DegenerateInput::NegativeValue { field, value } => write!(
                f,
                "activity '{}' has negative {field} {value}; clamped to 0",
                self.activity
            ),
            DegenerateInput::CrashTimeExceedsNormal {
                crash_time,
                normal_time,
            } => write!(
                f,
                "activity '{}' crash time {crash_time} exceeds normal time {normal_time}; clamped",
                self.activity
            ),
            DegenerateInput::CrashCostBelowNormal {
                crash_cost,
                normal_cost,
            } => write!(
                f,
                "activity '{}' crash cost {crash_cost} is below normal cost {normal_cost}; clamped",
                self.activity
            ),
            DegenerateInput::CrashPremiumWithoutCompression {
                crash_cost,
                normal_cost,
            } => write!(
                f,
                "activity '{}' cannot be compressed but crash cost {crash_cost} exceeds normal cost {normal_cost}",
                self.activity
            ),
            DegenerateInput::EstimatesOutOfOrder { a, m, b } => write!(
                f,
                "activity '{}' estimates a={a}, m={m}, b={b} are not ordered; using normal time",
                self.activity
            ),
        }
    }
}

/// Derived per-activity record owned by one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityNode {
    pub id: String,
    pub predecessors: Vec<String>,
    pub successors: Vec<String>,
    pub normal_time: f64,
    pub crash_time: f64,
    pub normal_cost: f64,
    pub crash_cost: f64,
    pub expected_duration: f64,
    pub variance: f64,
    pub max_compression: f64,
    /// `None` when the activity cannot be compressed.
    pub cost_per_unit_compression: Option<f64>,
    pub current_duration: f64,
    pub earliest_start: f64,
    pub earliest_finish: f64,
    pub latest_start: f64,
    pub latest_finish: f64,
    pub slack: f64,
    pub is_critical: bool,
}

impl ActivityNode {
    /// Normalises a raw record, clamping inconsistent crash data.
    pub fn from_activity(activity: &Activity) -> (Self, Vec<DegenerateInputWarning>) {
        let mut issues = Vec::new();
        let mut non_negative = |field: &str, value: f64| {
            if value < 0.0 {
                issues.push(DegenerateInput::NegativeValue {
                    field: field.to_string(),
                    value,
                });
                0.0
            } else {
                value
            }
        };

        let normal_time = non_negative("normalTime", activity.normal_time);
        let normal_cost = non_negative("normalCost", activity.normal_cost);
        let raw_crash_time = activity
            .crash_time
            .map(|value| non_negative("crashTime", value))
            .unwrap_or(normal_time);
        let raw_crash_cost = activity
            .crash_cost
            .map(|value| non_negative("crashCost", value))
            .unwrap_or(normal_cost);

        let crash_time = if raw_crash_time > normal_time {
            issues.push(DegenerateInput::CrashTimeExceedsNormal {
                crash_time: raw_crash_time,
                normal_time,
            });
            normal_time
        } else {
            raw_crash_time
        };
        let crash_cost = if raw_crash_cost < normal_cost {
            issues.push(DegenerateInput::CrashCostBelowNormal {
                crash_cost: raw_crash_cost,
                normal_cost,
            });
            normal_cost
        } else {
            raw_crash_cost
        };

        let max_compression = normal_time - crash_time;
        let cost_per_unit_compression = if max_compression > COMPRESSION_EPSILON {
            Some((crash_cost - normal_cost) / max_compression)
        } else {
            if crash_cost > normal_cost {
                issues.push(DegenerateInput::CrashPremiumWithoutCompression {
                    crash_cost,
                    normal_cost,
                });
            }
            None
        };

        let (expected_duration, variance) = match (
            activity.optimistic,
            activity.most_likely,
            activity.pessimistic,
        ) {
            (Some(a), Some(m), Some(b)) if a <= m && m <= b => {
                let spread = (b - a) / 6.0;
                ((a + 4.0 * m + b) / 6.0, spread * spread)
            }
            (Some(a), Some(m), Some(b)) => {
                issues.push(DegenerateInput::EstimatesOutOfOrder { a, m, b });
                (normal_time, 0.0)
            }
            _ => (normal_time, 0.0),
        };

        let warnings: Vec<DegenerateInputWarning> = issues
            .into_iter()
            .map(|issue| DegenerateInputWarning {
                activity: activity.id.clone(),
                issue,
            })
            .collect();
        for warning in &warnings {
            warn!("{warning}");
        }

        let node = Self {
            id: activity.id.clone(),
            predecessors: activity.predecessors.clone(),
            successors: Vec::new(),
            normal_time,
            crash_time,
            normal_cost,
            crash_cost,
            expected_duration,
            variance,
            max_compression,
            cost_per_unit_compression,
            current_duration: normal_time,
            earliest_start: 0.0,
            earliest_finish: 0.0,
            latest_start: 0.0,
            latest_finish: 0.0,
            slack: 0.0,
            is_critical: false,
        };
        (node, warnings)
    }

    /// Remaining compression available at the current duration.
    pub fn remaining_compression(&self) -> f64 {
        (self.current_duration - self.crash_time).max(0.0)
    }

    pub fn is_compressible(&self) -> bool {
        self.current_duration > self.crash_time + COMPRESSION_EPSILON
    }
}
