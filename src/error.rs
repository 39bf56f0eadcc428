//! Error types for the planning engine

use thiserror::Error;

/// Which loop tripped an iteration ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStage {
    Estimate,
    Schedule,
    Refinement,
}

impl std::fmt::Display for LimitStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitStage::Estimate => f.write_str("estimate"),
            LimitStage::Schedule => f.write_str("raid schedule"),
            LimitStage::Refinement => f.write_str("least-time refinement"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("{stage} for '{subject}' exceeded the iteration limit of {limit}")]
    IterationLimit {
        stage: LimitStage,
        subject: String,
        limit: usize,
    },
    #[error("no raid fits a {daily_energy} energy day; unscheduled: {subject}")]
    ScheduleStalled { subject: String, daily_energy: u32 },
    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
    #[error("unknown material '{0}'")]
    UnknownMaterial(String),
    #[error("invalid onslaught track selection: {0}")]
    InvalidTrackSelection(String),
    #[error("goal '{goal_id}' is invalid: {reason}")]
    InvalidGoal { goal_id: String, reason: String },
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl PlannerError {
    pub fn is_iteration_limit(&self) -> bool {
        matches!(self, PlannerError::IterationLimit { .. })
    }
}

pub type Result<T, E = PlannerError> = std::result::Result<T, E>;
