use super::state::PipelinePhase;

/// Lifecycle events emitted by a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    RunStart {
        run_id: String,
        total_tasks: usize,
    },
    PhaseChanged {
        run_id: String,
        from: PipelinePhase,
        to: PipelinePhase,
    },
    TaskStart {
        run_id: String,
        task_id: String,
        index: usize,
        agent_role: String,
    },
    TaskComplete {
        run_id: String,
        task_id: String,
        duration_ms: u64,
        output_chars: usize,
    },
    TaskFailed {
        run_id: String,
        task_id: String,
        error: String,
    },
    RunEnd {
        run_id: String,
        success: bool,
        duration_ms: u64,
    },
}

pub trait PipelineObserver: Send + Sync {
    fn name(&self) -> &str;
    fn on_event(&self, event: &PipelineEvent);
}
