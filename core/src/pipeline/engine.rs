use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::error::{PipelineError, TaskFailure, ValidationError};
use crate::task::Task;

use super::graph::TaskGraph;
use super::observer::{PipelineEvent, PipelineObserver};
use super::state::{PhaseTransition, PipelinePhase};
use super::types::{ExecutionResult, Inputs, PipelineRun};

/// Ordered set of dependent tasks executed one at a time.
pub struct Pipeline {
    /// Tasks in execution (topological) order.
    tasks: Vec<Task>,
    observers: Vec<Arc<dyn PipelineObserver>>,
    output_override: Option<PathBuf>,
    persist: bool,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("tasks", &self.task_ids())
            .field("observers", &self.observers.len())
            .field("output_override", &self.output_override)
            .field("persist", &self.persist)
            .finish()
    }
}

impl Pipeline {
    /// Validates the dependency graph and fixes the execution order.
    pub fn new(tasks: Vec<Task>) -> Result<Self, PipelineError> {
        if tasks.is_empty() {
            return Err(PipelineError::Empty);
        }

        let graph = TaskGraph::from_tasks(&tasks)?;
        graph.validate()?;
        let order = graph.topological_order()?;

        let mut by_id = graph.nodes;
        let tasks = order
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect::<Vec<_>>();

        Ok(Self {
            tasks,
            observers: Vec::new(),
            output_override: None,
            persist: true,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Replaces the last task's output file.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_override = Some(path.into());
        self
    }

    /// Keeps the final output in memory only.
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.id.as_str()).collect()
    }

    /// Where the final output is persisted, if anywhere.
    pub fn output_file(&self) -> Option<&Path> {
        if !self.persist {
            return None;
        }
        self.output_override
            .as_deref()
            .or_else(|| self.tasks.last().and_then(|t| t.output_file.as_deref()))
    }

    /// Every placeholder referenced by any task.
    pub fn required_inputs(&self) -> BTreeSet<String> {
        self.tasks
            .iter()
            .flat_map(|t| t.placeholders())
            .map(str::to_string)
            .collect()
    }

    /// Reports every missing key and every key whose value is blank.
    pub fn validate_inputs(&self, inputs: &Inputs) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        let mut empty = Vec::new();
        for key in self.required_inputs() {
            match inputs.get(&key) {
                None => missing.push(key),
                Some(v) if v.is_blank() => empty.push(key),
                Some(_) => {}
            }
        }

        if missing.is_empty() && empty.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Inputs { missing, empty })
        }
    }

    pub async fn run(&self, inputs: &Inputs) -> Result<PipelineRun, PipelineError> {
        self.validate_inputs(inputs)?;

        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let mut phase = PipelinePhase::Idle;

        tracing::info!(run_id = %run_id, tasks = self.tasks.len(), "pipeline run start");
        self.emit(PipelineEvent::RunStart {
            run_id: run_id.clone(),
            total_tasks: self.tasks.len(),
        });
        self.advance(&run_id, &mut phase, PipelinePhase::Running)?;

        let mut results: Vec<ExecutionResult> = Vec::with_capacity(self.tasks.len());

        for (index, task) in self.tasks.iter().enumerate() {
            self.emit(PipelineEvent::TaskStart {
                run_id: run_id.clone(),
                task_id: task.id.clone(),
                index,
                agent_role: task.agent.role.clone(),
            });
            let task_started = Instant::now();

            match self.execute_task(task, inputs, &results).await {
                Ok(text) => {
                    self.emit(PipelineEvent::TaskComplete {
                        run_id: run_id.clone(),
                        task_id: task.id.clone(),
                        duration_ms: task_started.elapsed().as_millis() as u64,
                        output_chars: text.chars().count(),
                    });
                    results.push(ExecutionResult::new(task.id.clone(), text));
                }
                Err(failure) => {
                    self.emit(PipelineEvent::TaskFailed {
                        run_id: run_id.clone(),
                        task_id: task.id.clone(),
                        error: failure.to_string(),
                    });
                    self.fail(&run_id, &mut phase, started)?;
                    return Err(PipelineError::TaskFailed {
                        task_id: task.id.clone(),
                        source: failure,
                    });
                }
            }
        }

        let final_output = results
            .last()
            .map(|r| r.raw_text.clone())
            .unwrap_or_default();

        if let Some(path) = self.output_file() {
            if let Err(e) = persist(path, &final_output).await {
                self.fail(&run_id, &mut phase, started)?;
                return Err(e);
            }
            tracing::info!(run_id = %run_id, path = %path.display(), "final output written");
        }

        self.advance(&run_id, &mut phase, PipelinePhase::Completed)?;
        let duration_ms = started.elapsed().as_millis() as u64;
        self.emit(PipelineEvent::RunEnd {
            run_id: run_id.clone(),
            success: true,
            duration_ms,
        });

        Ok(PipelineRun {
            run_id,
            inputs: inputs.clone(),
            results,
            final_output,
            duration_ms,
        })
    }

    async fn execute_task(
        &self,
        task: &Task,
        inputs: &Inputs,
        completed: &[ExecutionResult],
    ) -> Result<String, TaskFailure> {
        let rendered = task.render(inputs)?;
        let context = task.gather_context(completed);
        let answer = task.agent.respond(&rendered, &context).await?;
        Ok(answer)
    }

    fn advance(
        &self,
        run_id: &str,
        phase: &mut PipelinePhase,
        to: PipelinePhase,
    ) -> Result<(), PipelineError> {
        PhaseTransition::validate(*phase, to)?;
        let from = std::mem::replace(phase, to);
        self.emit(PipelineEvent::PhaseChanged {
            run_id: run_id.to_string(),
            from,
            to,
        });
        Ok(())
    }

    fn fail(
        &self,
        run_id: &str,
        phase: &mut PipelinePhase,
        started: Instant,
    ) -> Result<(), PipelineError> {
        self.advance(run_id, phase, PipelinePhase::Failed)?;
        self.emit(PipelineEvent::RunEnd {
            run_id: run_id.to_string(),
            success: false,
            duration_ms: started.elapsed().as_millis() as u64,
        });
        Ok(())
    }

    fn emit(&self, event: PipelineEvent) {
        log_event(&event);
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}

fn log_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::RunStart { .. } => {}
        PipelineEvent::PhaseChanged { run_id, from, to } => {
            tracing::debug!(run_id = %run_id, from = from.as_str(), to = to.as_str(), "phase changed");
        }
        PipelineEvent::TaskStart {
            run_id,
            task_id,
            index,
            agent_role,
        } => {
            tracing::info!(run_id = %run_id, task_id = %task_id, index, agent = %agent_role, "task start");
        }
        PipelineEvent::TaskComplete {
            run_id,
            task_id,
            duration_ms,
            output_chars,
        } => {
            tracing::info!(run_id = %run_id, task_id = %task_id, duration_ms, output_chars, "task complete");
        }
        PipelineEvent::TaskFailed {
            run_id,
            task_id,
            error,
        } => {
            tracing::error!(run_id = %run_id, task_id = %task_id, error = %error, "task failed");
        }
        PipelineEvent::RunEnd {
            run_id,
            success,
            duration_ms,
        } => {
            tracing::info!(run_id = %run_id, success, duration_ms, "pipeline run end");
        }
    }
}

async fn persist(path: &Path, content: &str) -> Result<(), PipelineError> {
    let to_err = |source: std::io::Error| PipelineError::Persist {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(to_err)?;
    }
    tokio::fs::write(path, content).await.map_err(to_err)
}
