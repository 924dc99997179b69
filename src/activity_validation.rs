use crate::activity::Activity;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("no activities supplied")]
    NoActivities,
    #[error("activity at position {position} has an empty id")]
    EmptyId { position: usize },
    #[error("duplicate activity id '{id}'")]
    DuplicateId { id: String },
    #[error("activity '{activity}' references unknown predecessor '{predecessor}'")]
    UnknownPredecessor {
        activity: String,
        predecessor: String,
    },
    #[error("activity '{activity}' has non-finite {field}")]
    NonFinite {
        activity: String,
        field: &'static str,
    },
    #[error("{name} must be positive (got {value})")]
    NonPositiveRate { name: &'static str, value: f64 },
    #[error("a queuing system needs at least one server")]
    NoServers,
    #[error("decision table needs at least one decision and one demand state")]
    EmptyDecisionTable,
    #[error("demand state '{state}' has invalid probability {probability}")]
    InvalidProbability { state: String, probability: f64 },
    #[error("demand probabilities must sum to 1 (got {total:.6})")]
    ProbabilitiesDoNotSumToOne { total: f64 },
    #[error("{name} must be finite")]
    NonFiniteParameter { name: &'static str },
}

impl ValidationError {
    pub fn activity(&self) -> Option<&str> {
        match self {
            ValidationError::DuplicateId { id } => Some(id.as_str()),
            ValidationError::UnknownPredecessor { activity, .. }
            | ValidationError::NonFinite { activity, .. } => Some(activity.as_str()),
            _ => None,
        }
    }
}

pub fn validate_activity(activity: &Activity, position: usize) -> Result<(), ValidationError> {
    if activity.id.trim().is_empty() {
        return Err(ValidationError::EmptyId { position });
    }
    for (field, value) in activity.numeric_fields() {
        if let Some(value) = value {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite {
                    activity: activity.id.clone(),
                    field,
                });
            }
        }
    }
    Ok(())
}

/// Checks ids and predecessor references. Cycles are left to the topological sort.
pub fn validate_activity_collection(activities: &[Activity]) -> Result<(), ValidationError> {
    if activities.is_empty() {
        return Err(ValidationError::NoActivities);
    }

    let mut seen_ids = HashSet::with_capacity(activities.len());
    for (position, activity) in activities.iter().enumerate() {
        validate_activity(activity, position)?;
        if !seen_ids.insert(activity.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: activity.id.clone(),
            });
        }
    }

    for activity in activities {
        if let Some(unknown) = activity
            .predecessors
            .iter()
            .find(|pred| !seen_ids.contains(pred.as_str()))
        {
            return Err(ValidationError::UnknownPredecessor {
                activity: activity.id.clone(),
                predecessor: unknown.clone(),
            });
        }
    }
    Ok(())
}
