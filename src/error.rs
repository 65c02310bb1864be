use crate::types::SimulationReport;

pub type Result<T> = std::result::Result<T, SimError>;

/// Failures surfaced by the bracket engine
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    /// Caller-supplied data the engine refuses to run with
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Stopped by a cancellation hook or timeout. Carries the report built
    /// from the trials that did complete.
    #[error("{}", cancelled_message(.0))]
    Cancelled(Box<SimulationReport>),

    /// Engine defect, e.g. a match left without a live occupant
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

fn cancelled_message(report: &SimulationReport) -> String {
    format!(
        "simulation cancelled after {} of {} trials",
        report.trials_completed, report.trials_requested
    )
}

impl SimError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidInput(msg.into())
    }

    /// Partial report of a cancelled run
    pub fn partial_report(&self) -> Option<&SimulationReport> {
        match self {
            SimError::Cancelled(report) => Some(report),
            _ => None,
        }
    }

    pub fn into_partial_report(self) -> Option<SimulationReport> {
        match self {
            SimError::Cancelled(report) => Some(*report),
            _ => None,
        }
    }
}
