//! Pipeline run phases and transition rules.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    Idle,
    Running,
    Completed,
    Failed,
}

impl PipelinePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelinePhase::Completed | PipelinePhase::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelinePhase::Idle => "idle",
            PipelinePhase::Running => "running",
            PipelinePhase::Completed => "completed",
            PipelinePhase::Failed => "failed",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: PipelinePhase,
        to: PipelinePhase,
    },
    #[error("cannot transition from terminal state {state:?}")]
    FromTerminalState { state: PipelinePhase },
}

pub struct PhaseTransition;

impl PhaseTransition {
    /// `Idle -> Running -> {Completed, Failed}`; `Idle -> Failed` covers
    /// failures before the first task starts.
    pub fn validate(from: PipelinePhase, to: PipelinePhase) -> Result<(), TransitionError> {
        if from.is_terminal() {
            return Err(TransitionError::FromTerminalState { state: from });
        }

        let is_valid = matches!(
            (from, to),
            (PipelinePhase::Idle, PipelinePhase::Running)
                | (PipelinePhase::Idle, PipelinePhase::Failed)
                | (PipelinePhase::Running, PipelinePhase::Completed)
                | (PipelinePhase::Running, PipelinePhase::Failed)
        );

        if is_valid {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition { from, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(PhaseTransition::validate(PipelinePhase::Idle, PipelinePhase::Running).is_ok());
        assert!(PhaseTransition::validate(PipelinePhase::Running, PipelinePhase::Completed).is_ok());
        assert!(PhaseTransition::validate(PipelinePhase::Running, PipelinePhase::Failed).is_ok());
    }

    #[test]
    fn test_invalid_transitions() {
        assert_eq!(
            PhaseTransition::validate(PipelinePhase::Idle, PipelinePhase::Completed),
            Err(TransitionError::InvalidTransition {
                from: PipelinePhase::Idle,
                to: PipelinePhase::Completed
            })
        );
        assert_eq!(
            PhaseTransition::validate(PipelinePhase::Failed, PipelinePhase::Running),
            Err(TransitionError::FromTerminalState {
                state: PipelinePhase::Failed
            })
        );
    }
}
