use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::observer::{PipelineEvent, PipelineObserver};

/// Visual progress monitor for task execution
///
/// One overall bar plus a spinner per running task.
pub struct ProgressMonitor {
    multi: MultiProgress,
    overall: ProgressBar,
    task_bars: HashMap<String, ProgressBar>,
    enabled: bool,
}

impl ProgressMonitor {
    /// `enabled = false` hides everything (JSON output, `--no-progress`).
    pub fn new(total_tasks: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                multi: MultiProgress::new(),
                overall: ProgressBar::hidden(),
                task_bars: HashMap::new(),
                enabled: false,
            };
        }

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total_tasks as u64));

        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tasks ({percent}%) {msg}")
        {
            overall.set_style(style.progress_chars("█▓▒░  "));
        }
        overall.set_message("Starting...");

        Self {
            multi,
            overall,
            task_bars: HashMap::new(),
            enabled: true,
        }
    }

    pub fn set_total(&self, total_tasks: usize) {
        if self.enabled {
            self.overall.set_length(total_tasks as u64);
        }
    }

    pub fn add_task(&mut self, task_id: &str, label: &str) {
        if !self.enabled {
            return;
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.green} {msg}") {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        bar.set_message(format!("⏳ {task_id} ({label})"));
        bar.enable_steady_tick(Duration::from_millis(100));

        self.task_bars.insert(task_id.to_string(), bar);
    }

    pub fn complete_task(&mut self, task_id: &str, success: bool, duration_ms: Option<u64>) {
        if !self.enabled {
            return;
        }

        if let Some(bar) = self.task_bars.remove(task_id) {
            let icon = if success { "✅" } else { "❌" };
            let msg = match duration_ms {
                Some(ms) => format!("{icon} {task_id} ({ms}ms)"),
                None => format!("{icon} {task_id}"),
            };
            bar.finish_with_message(msg);
        }

        if success {
            self.overall.inc(1);
        }
    }

    pub fn set_message(&self, msg: &str) {
        if self.enabled {
            self.overall.set_message(msg.to_string());
        }
    }

    pub fn finish(&self, success: bool) {
        if !self.enabled {
            return;
        }

        let msg = if success {
            "✅ Itinerary ready"
        } else {
            "❌ Planning failed"
        };
        self.overall.finish_with_message(msg.to_string());
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        for (_, bar) in self.task_bars.drain() {
            bar.finish_and_clear();
        }
    }
}

/// Drives a [`ProgressMonitor`] from pipeline events.
pub struct ProgressObserver {
    monitor: Mutex<ProgressMonitor>,
}

impl ProgressObserver {
    pub fn new(enabled: bool) -> Self {
        Self {
            monitor: Mutex::new(ProgressMonitor::new(0, enabled)),
        }
    }
}

impl PipelineObserver for ProgressObserver {
    fn name(&self) -> &str {
        "progress"
    }

    fn on_event(&self, event: &PipelineEvent) {
        let Ok(mut monitor) = self.monitor.lock() else {
            return;
        };
        match event {
            PipelineEvent::RunStart { total_tasks, .. } => {
                monitor.set_total(*total_tasks);
                monitor.set_message("Planning...");
            }
            PipelineEvent::TaskStart {
                task_id,
                agent_role,
                ..
            } => {
                monitor.add_task(task_id, agent_role);
                monitor.set_message(agent_role);
            }
            PipelineEvent::TaskComplete {
                task_id,
                duration_ms,
                ..
            } => monitor.complete_task(task_id, true, Some(*duration_ms)),
            PipelineEvent::TaskFailed { task_id, .. } => {
                monitor.complete_task(task_id, false, None)
            }
            PipelineEvent::RunEnd { success, .. } => monitor.finish(*success),
            PipelineEvent::PhaseChanged { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_monitor_disabled() {
        let mut monitor = ProgressMonitor::new(3, false);
        monitor.add_task("identify_city", "City Selection Expert");
        monitor.complete_task("identify_city", true, Some(100));
        monitor.set_message("test");
        monitor.finish(true);
    }

    #[test]
    fn test_progress_observer_handles_full_run() {
        let observer = ProgressObserver::new(true);
        let run_id = "r1".to_string();
        observer.on_event(&PipelineEvent::RunStart {
            run_id: run_id.clone(),
            total_tasks: 2,
        });
        observer.on_event(&PipelineEvent::TaskStart {
            run_id: run_id.clone(),
            task_id: "a".into(),
            index: 0,
            agent_role: "City Selection Expert".into(),
        });
        observer.on_event(&PipelineEvent::TaskComplete {
            run_id: run_id.clone(),
            task_id: "a".into(),
            duration_ms: 12,
            output_chars: 40,
        });
        observer.on_event(&PipelineEvent::TaskStart {
            run_id: run_id.clone(),
            task_id: "b".into(),
            index: 1,
            agent_role: "Local Expert at this city".into(),
        });
        observer.on_event(&PipelineEvent::TaskFailed {
            run_id: run_id.clone(),
            task_id: "b".into(),
            error: "boom".into(),
        });
        observer.on_event(&PipelineEvent::RunEnd {
            run_id,
            success: false,
            duration_ms: 20,
        });
    }
}
