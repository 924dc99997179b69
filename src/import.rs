//! Loaders for activity sheets, decision tables and analysis settings.

use crate::activity::{Activity, parse_predecessors};
use crate::config::AnalysisConfig;
use crate::crashing::CrashingParameters;
use crate::decision::DecisionTable;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Activity list plus optional crashing cost model, as stored in a project file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub crashing: CrashingParameters,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActivitiesDocument {
    List(Vec<Activity>),
    Project(ProjectFile),
}

/// One row of an activity sheet. Blank cells mean "not supplied".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityCsvRecord {
    id: String,
    #[serde(default)]
    predecessors: String,
    #[serde(default)]
    normal_time: String,
    #[serde(default)]
    normal_cost: String,
    #[serde(default)]
    crash_time: String,
    #[serde(default)]
    crash_cost: String,
    #[serde(default)]
    a: String,
    #[serde(default)]
    m: String,
    #[serde(default)]
    b: String,
}

impl ActivityCsvRecord {
    fn into_activity(self) -> ImportResult<Activity> {
        let id = self.id.trim().to_string();
        Ok(Activity {
            predecessors: parse_predecessors(&self.predecessors),
            normal_time: parse_f64(&self.normal_time)?.unwrap_or(0.0),
            normal_cost: parse_f64(&self.normal_cost)?.unwrap_or(0.0),
            crash_time: parse_f64(&self.crash_time)?,
            crash_cost: parse_f64(&self.crash_cost)?,
            optimistic: parse_f64(&self.a)?,
            most_likely: parse_f64(&self.m)?,
            pessimistic: parse_f64(&self.b)?,
            id,
        })
    }
}

fn parse_f64(input: &str) -> ImportResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| ImportError::InvalidData(format!("invalid number '{input}': {e}")))
}

/// Reads CSV with a header row `id,predecessors,normalTime,normalCost,crashTime,crashCost,a,m,b`.
///
/// Only `id` is required; missing columns read as blank.
pub fn read_activities_from_csv<R: Read>(reader: R) -> ImportResult<Vec<Activity>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut activities = Vec::new();
    for record in reader.deserialize::<ActivityCsvRecord>() {
        let record = record?;
        // Skip spacer rows
        if record.id.trim().is_empty() {
            continue;
        }
        activities.push(record.into_activity()?);
    }

    if activities.is_empty() {
        return Err(ImportError::InvalidData("CSV file contained no activities".into()));
    }
    Ok(activities)
}

pub fn load_activities_from_csv<P: AsRef<Path>>(path: P) -> ImportResult<Vec<Activity>> {
    let file = File::open(path)?;
    read_activities_from_csv(BufReader::new(file))
}

/// Accepts either a bare activity array or a project object.
pub fn load_activities_from_json<P: AsRef<Path>>(path: P) -> ImportResult<Vec<Activity>> {
    Ok(load_project_from_json(path)?.activities)
}

pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> ImportResult<ProjectFile> {
    let file = File::open(path)?;
    let document: ActivitiesDocument = serde_json::from_reader(BufReader::new(file))?;
    let project = match document {
        ActivitiesDocument::List(activities) => ProjectFile {
            activities,
            crashing: CrashingParameters::default(),
        },
        ActivitiesDocument::Project(project) => project,
    };
    if project.activities.is_empty() {
        return Err(ImportError::InvalidData("JSON file contained no activities".into()));
    }
    Ok(project)
}

pub fn load_decision_table_from_json<P: AsRef<Path>>(path: P) -> ImportResult<DecisionTable> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn load_config_from_json<P: AsRef<Path>>(path: P) -> ImportResult<AnalysisConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
