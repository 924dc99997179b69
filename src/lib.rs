pub mod activity;
pub mod activity_validation;
pub mod calculations;
pub mod config;
pub mod crashing;
pub mod decision;
pub mod error;
pub mod formula;
pub mod graph;
pub mod import;
pub mod pert;
pub mod queuing;
pub mod schedule;
pub mod stats;
pub mod table;

pub use activity::{
    Activity, ActivityNode, DegenerateInput, DegenerateInputWarning, parse_predecessors,
};
pub use activity_validation::{ValidationError, validate_activity, validate_activity_collection};
pub use config::{AnalysisConfig, CrashingConfig};
pub use crashing::{
    CostBreakdown, CrashStep, CrashTermination, CrashingAnalysis, CrashingParameters,
    analyze_crashing, analyze_crashing_with_config,
};
pub use decision::{
    DecisionAnalysis, DecisionChoice, DecisionTable, DemandState, PayoffParameters,
};
pub use error::{AnalysisError, AnalysisResult};
pub use formula::{DecisionFormulas, FormulaCell, SheetLayout};
pub use graph::{ActivityDag, DagNode};
pub use import::{
    ImportError, ImportResult, ProjectFile, load_activities_from_csv, load_activities_from_json,
    load_config_from_json, load_decision_table_from_json, load_project_from_json,
    read_activities_from_csv,
};
pub use pert::{PertAnalysis, analyze_pert, analyze_pert_with_config};
pub use queuing::{QueuingMetrics, QueuingModel, StateProbability, solve_mm1};
pub use schedule::{DurationSelector, ScheduleSummary, schedule};
pub use stats::CompletionDistribution;
